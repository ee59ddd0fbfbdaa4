//! Shared test utilities for the portal workflows.
//!
//! Provides fixture builders with sensible defaults and [`FakePortal`], an
//! in-memory [`PortalApi`] that records every call it receives so tests can
//! assert that client-side validation failures issue no network calls.

use crate::{
    client::{
        Credentials, ForwardRequest, FundRequestPatch, NewFundRequest, NewTransaction, PortalApi,
        TokenPair, TransactionPatch,
    },
    errors::{Error, Result},
    models::{
        BankDetails, CashState, FundRequest, LinkedTransaction, Representative,
        RepresentativeUser, RequestStatus, Sender, Transaction, TransactionMode,
        VerificationState,
    },
};
use base64::{Engine as _, engine::general_purpose::URL_SAFE_NO_PAD};
use chrono::{NaiveDate, Utc};
use std::sync::Mutex;

/// Builds an unsigned-but-well-formed JWT whose payload carries the given
/// role tags and a far-future expiry. Only the payload segment matters to the
/// decoder.
pub fn fake_token(roles: &[&str]) -> String {
    token_with_exp(roles, 4_102_444_800) // 2100-01-01
}

/// Like [`fake_token`] but already expired.
pub fn expired_token(roles: &[&str]) -> String {
    token_with_exp(roles, 946_684_800) // 2000-01-01
}

fn token_with_exp(roles: &[&str], exp: i64) -> String {
    let payload = serde_json::json!({
        "token_type": "access",
        "exp": exp,
        "iat": 0,
        "jti": "test",
        "user_id": 1,
        "user_type": roles,
        "user": {
            "id": 1,
            "username": "tester",
            "first_name": "Test",
            "last_name": "User",
            "email": "tester@example.org",
        },
    });
    let header = URL_SAFE_NO_PAD.encode(br#"{"alg":"HS256","typ":"JWT"}"#);
    let body = URL_SAFE_NO_PAD.encode(payload.to_string().as_bytes());
    format!("{header}.{body}.signature")
}

/// An unprocessed cash transaction.
pub fn cash_transaction(id: i64, amount: f64) -> Transaction {
    Transaction {
        id,
        amount,
        mode: TransactionMode::Cash,
        state: Some(CashState::Initiated),
        verification_state: None,
        sender: Sender {
            name: "Sara Khan".to_string(),
            cms: "368853".to_string(),
        },
        created: Utc::now(),
        receipt: None,
        rejection_details: None,
    }
}

/// A cash transaction already picked up by a handover batch.
pub fn processing_cash_transaction(id: i64, amount: f64) -> Transaction {
    let mut tx = cash_transaction(id, amount);
    tx.state = Some(CashState::Processing);
    tx
}

/// An online transaction in the given review state.
pub fn online_transaction(id: i64, amount: f64, state: VerificationState) -> Transaction {
    Transaction {
        id,
        amount,
        mode: TransactionMode::Online,
        state: None,
        verification_state: Some(state),
        sender: Sender {
            name: "Ali Ahmed".to_string(),
            cms: "368854".to_string(),
        },
        created: Utc::now(),
        receipt: Some(format!("receipt{id}.pdf")),
        rejection_details: None,
    }
}

/// A directory entry holding the given group tags.
pub fn representative(id: i64, first_name: &str, last_name: &str, groups: &[&str]) -> Representative {
    Representative {
        id,
        cms: Some(format!("{:06}", 360_000 + id)),
        user: RepresentativeUser {
            first_name: first_name.to_string(),
            last_name: last_name.to_string(),
            groups: groups.iter().map(|g| (*g).to_string()).collect(),
        },
    }
}

/// A handover batch with no constituents listed; fill `transactions` when a
/// test needs the flattened ids.
pub fn linked_batch(id: i64, amount: f64, verified: bool, forwarded: bool) -> LinkedTransaction {
    LinkedTransaction {
        id,
        forwarder: representative(700 + id, "Zain", "Malik", &["BP"]),
        forwardee_id: 900,
        forwarded_amount: amount,
        transactions: Vec::new(),
        is_verified_by_forwardee: verified,
        is_forwarded: forwarded,
        created: Utc::now(),
    }
}

/// A fund request in the given gate state.
pub fn fund_request(id: i64, amount: f64, status: RequestStatus, approved_by_nsft: bool) -> FundRequest {
    FundRequest {
        id,
        student_name: "Qasim Shah".to_string(),
        cms: "362857".to_string(),
        amount,
        reason: "Semester fee assistance".to_string(),
        bank_details: test_bank_details(),
        request_date: NaiveDate::from_ymd_opt(2025, 3, 1).unwrap_or_default(),
        status,
        approved_by_nsft,
        comments: None,
        granted_amount: None,
        transfer_details: None,
        granted_date: None,
        rejection_reason: None,
        rejected_by: None,
        rejected_date: None,
    }
}

/// A complete, valid submission body.
pub fn new_fund_request(amount: f64) -> NewFundRequest {
    NewFundRequest {
        amount,
        reason: "Semester fee assistance".to_string(),
        bank_details: test_bank_details(),
    }
}

fn test_bank_details() -> BankDetails {
    BankDetails {
        bank_name: "HBL".to_string(),
        account_number: "PK36HABB0000001123456702".to_string(),
        account_holder: "Qasim Shah".to_string(),
        contact_number: "0300-1234567".to_string(),
    }
}

#[derive(Default)]
struct FakeState {
    transactions: Vec<Transaction>,
    linked: Vec<LinkedTransaction>,
    representatives: Vec<Representative>,
    fund_requests: Vec<FundRequest>,
    forward_requests: Vec<ForwardRequest>,
    calls: Vec<String>,
    next_id: i64,
    fail_next: Option<String>,
}

/// In-memory backend double. Every [`PortalApi`] call is appended to a log;
/// [`FakePortal::fail_next`] makes the next call fail with a remote error so
/// tests can check that local state survives a failed submission.
pub struct FakePortal {
    state: Mutex<FakeState>,
}

impl FakePortal {
    pub fn new() -> Self {
        FakePortal {
            state: Mutex::new(FakeState {
                next_id: 1000,
                ..FakeState::default()
            }),
        }
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, FakeState> {
        self.state.lock().unwrap_or_else(std::sync::PoisonError::into_inner)
    }

    pub fn add_transaction(&self, transaction: Transaction) {
        self.lock().transactions.push(transaction);
    }

    pub fn add_linked(&self, batch: LinkedTransaction) {
        self.lock().linked.push(batch);
    }

    pub fn add_representative(&self, representative: Representative) {
        self.lock().representatives.push(representative);
    }

    /// Seeds a fund request and returns it for use as the caller-held copy.
    pub fn seed_fund_request(&self, request: FundRequest) -> FundRequest {
        self.lock().fund_requests.push(request.clone());
        request
    }

    /// Every backend call recorded so far, in order.
    pub fn calls(&self) -> Vec<String> {
        self.lock().calls.clone()
    }

    /// Every forward payload received, in order.
    pub fn forward_requests(&self) -> Vec<ForwardRequest> {
        self.lock().forward_requests.clone()
    }

    /// Makes the next call fail with a 500 carrying `message`.
    pub fn fail_next(&self, message: &str) {
        self.lock().fail_next = Some(message.to_string());
    }

    fn enter(&self, call: impl Into<String>) -> Result<()> {
        let mut state = self.lock();
        state.calls.push(call.into());
        if let Some(message) = state.fail_next.take() {
            return Err(Error::Remote { status: 500, message });
        }
        Ok(())
    }
}

impl Default for FakePortal {
    fn default() -> Self {
        FakePortal::new()
    }
}

impl PortalApi for FakePortal {
    async fn obtain_token_pair(&self, credentials: &Credentials) -> Result<TokenPair> {
        self.enter(format!("POST token ({})", credentials.username))?;
        Ok(TokenPair {
            access: fake_token(&["Student"]),
            refresh: "refresh".to_string(),
        })
    }

    async fn list_transactions(&self) -> Result<Vec<Transaction>> {
        self.enter("GET transactions")?;
        Ok(self.lock().transactions.clone())
    }

    async fn create_transaction(&self, new: &NewTransaction) -> Result<Transaction> {
        self.enter("POST transactions")?;
        let mut state = self.lock();
        state.next_id += 1;
        let id = state.next_id;
        let transaction = match new.mode {
            TransactionMode::Cash => cash_transaction(id, new.amount),
            TransactionMode::Online => online_transaction(id, new.amount, VerificationState::Pending),
        };
        state.transactions.push(transaction.clone());
        Ok(transaction)
    }

    async fn update_transaction(&self, id: i64, patch: &TransactionPatch) -> Result<Transaction> {
        self.enter(format!("PATCH transactions/{id}"))?;
        let mut state = self.lock();
        let transaction = state
            .transactions
            .iter_mut()
            .find(|tx| tx.id == id)
            .ok_or(Error::Remote {
                status: 404,
                message: "transaction not found".to_string(),
            })?;
        if let Some(amount) = patch.amount {
            transaction.amount = amount;
        }
        if let Some(verification_state) = patch.verification_state {
            transaction.verification_state = Some(verification_state);
        }
        if let Some(rejection_details) = &patch.rejection_details {
            transaction.rejection_details = Some(rejection_details.clone());
        }
        Ok(transaction.clone())
    }

    async fn delete_transaction(&self, id: i64) -> Result<()> {
        self.enter(format!("DELETE transactions/{id}"))?;
        let mut state = self.lock();
        let Some(index) = state.transactions.iter().position(|tx| tx.id == id) else {
            return Err(Error::Remote {
                status: 404,
                message: "transaction not found".to_string(),
            });
        };
        if !state.transactions[index].is_unprocessed_cash()
            && !state.transactions[index].is_pending_online()
        {
            return Err(Error::Remote {
                status: 400,
                message: "only unprocessed transactions can be deleted".to_string(),
            });
        }
        state.transactions.remove(index);
        Ok(())
    }

    async fn list_linked_transactions(&self) -> Result<Vec<LinkedTransaction>> {
        self.enter("GET linked")?;
        Ok(self.lock().linked.clone())
    }

    async fn forward_transactions(&self, request: &ForwardRequest) -> Result<LinkedTransaction> {
        self.enter("POST forward")?;
        let mut state = self.lock();
        state.forward_requests.push(request.clone());

        // Consumed batches leave the forwarder's pending-handover view.
        for batch in &mut state.linked {
            if request.previous_transactions_ids.contains(&batch.id) {
                batch.is_forwarded = true;
            }
        }
        // Constituent cash advances to processing.
        for tx in &mut state.transactions {
            if request.transactions_ids.contains(&tx.id) && tx.mode == TransactionMode::Cash {
                tx.state = Some(CashState::Processing);
            }
        }

        state.next_id += 1;
        let batch = LinkedTransaction {
            id: state.next_id,
            forwarder: representative(1, "Test", "Forwarder", &["CR"]),
            forwardee_id: request.forwardee_id,
            forwarded_amount: request.forwarded_amount,
            transactions: request
                .transactions_ids
                .iter()
                .map(|&id| {
                    state
                        .transactions
                        .iter()
                        .find(|tx| tx.id == id)
                        .cloned()
                        .unwrap_or_else(|| cash_transaction(id, 0.0))
                })
                .collect(),
            is_verified_by_forwardee: false,
            is_forwarded: false,
            created: Utc::now(),
        };
        state.linked.push(batch.clone());
        Ok(batch)
    }

    async fn confirm_receipt(&self, linked_id: i64) -> Result<LinkedTransaction> {
        self.enter(format!("PATCH forwarded/{linked_id}"))?;
        let mut state = self.lock();
        let batch = state
            .linked
            .iter_mut()
            .find(|batch| batch.id == linked_id)
            .ok_or(Error::Remote {
                status: 404,
                message: "linked transaction not found".to_string(),
            })?;
        if batch.is_verified_by_forwardee {
            return Err(Error::Remote {
                status: 400,
                message: "batch already verified".to_string(),
            });
        }
        batch.is_verified_by_forwardee = true;
        Ok(batch.clone())
    }

    async fn list_representatives(&self) -> Result<Vec<Representative>> {
        self.enter("GET representatives")?;
        Ok(self.lock().representatives.clone())
    }

    async fn list_fund_requests(&self) -> Result<Vec<FundRequest>> {
        self.enter("GET fund-requests")?;
        Ok(self.lock().fund_requests.clone())
    }

    async fn submit_fund_request(&self, new: &NewFundRequest) -> Result<FundRequest> {
        self.enter("POST fund-requests")?;
        let mut state = self.lock();
        state.next_id += 1;
        let request = FundRequest {
            id: state.next_id,
            student_name: "Test Student".to_string(),
            cms: "000001".to_string(),
            amount: new.amount,
            reason: new.reason.clone(),
            bank_details: new.bank_details.clone(),
            request_date: Utc::now().date_naive(),
            status: RequestStatus::Pending,
            approved_by_nsft: false,
            comments: None,
            granted_amount: None,
            transfer_details: None,
            granted_date: None,
            rejection_reason: None,
            rejected_by: None,
            rejected_date: None,
        };
        state.fund_requests.push(request.clone());
        Ok(request)
    }

    async fn update_fund_request(&self, id: i64, patch: &FundRequestPatch) -> Result<FundRequest> {
        self.enter(format!("PATCH fund-requests/{id}"))?;
        let mut state = self.lock();
        let request = state
            .fund_requests
            .iter_mut()
            .find(|request| request.id == id)
            .ok_or(Error::Remote {
                status: 404,
                message: "fund request not found".to_string(),
            })?;
        if let Some(status) = patch.status {
            request.status = status;
        }
        if let Some(approved) = patch.approved_by_nsft {
            request.approved_by_nsft = approved;
        }
        if let Some(comments) = &patch.comments {
            request.comments = Some(comments.clone());
        }
        if let Some(granted_amount) = patch.granted_amount {
            request.granted_amount = Some(granted_amount);
        }
        if let Some(transfer_details) = &patch.transfer_details {
            request.transfer_details = Some(transfer_details.clone());
        }
        if let Some(granted_date) = patch.granted_date {
            request.granted_date = Some(granted_date);
        }
        if let Some(rejection_reason) = &patch.rejection_reason {
            request.rejection_reason = Some(rejection_reason.clone());
        }
        if let Some(rejected_by) = &patch.rejected_by {
            request.rejected_by = Some(rejected_by.clone());
        }
        if let Some(rejected_date) = patch.rejected_date {
            request.rejected_date = Some(rejected_date);
        }
        Ok(request.clone())
    }
}
