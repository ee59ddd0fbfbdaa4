//! Backend seam: the [`PortalApi`] trait and its request payload types.
//!
//! Workflow code is generic over this trait; [`http::HttpPortal`] is the
//! production implementation and the test suite substitutes an in-memory
//! fake. Implementations pass results through unmodified — the backend is the
//! sole authority on which state transitions are legal, and the client never
//! re-validates beyond its own fail-fast preconditions.

/// HTTP implementation of [`PortalApi`] against the fund-tracking backend.
pub mod http;

use crate::{
    errors::Result,
    models::{
        FundRequest, LinkedTransaction, Representative, RequestStatus, Transaction,
        TransactionMode, VerificationState,
    },
};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Username/password pair exchanged for a token pair.
#[derive(Debug, Clone, Serialize)]
pub struct Credentials {
    pub username: String,
    pub password: String,
}

/// Access and refresh tokens issued by the backend.
#[derive(Debug, Clone, Deserialize)]
pub struct TokenPair {
    pub access: String,
    pub refresh: String,
}

/// Body for creating a transaction. For cash mode the recording CR names the
/// student being credited via `sender_id`; for online mode the sender is the
/// authenticated student and `sender_id` stays unset.
#[derive(Debug, Clone, Serialize)]
pub struct NewTransaction {
    pub amount: f64,
    pub mode: TransactionMode,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sender_id: Option<i64>,
}

/// Partial update for a transaction. Only the set fields are sent.
#[derive(Debug, Clone, Default, Serialize)]
pub struct TransactionPatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub amount: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub verification_state: Option<VerificationState>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rejection_details: Option<String>,
}

impl TransactionPatch {
    /// Amend the amount of a still-unprocessed transaction.
    #[must_use]
    pub fn amount(amount: f64) -> Self {
        TransactionPatch {
            amount: Some(amount),
            ..TransactionPatch::default()
        }
    }

    /// Mark an online transaction verified at the (possibly corrected) final
    /// amount.
    #[must_use]
    pub fn verified(final_amount: f64) -> Self {
        TransactionPatch {
            amount: Some(final_amount),
            verification_state: Some(VerificationState::Verified),
            rejection_details: None,
        }
    }

    /// Mark an online transaction rejected with the reason shown to the
    /// student.
    #[must_use]
    pub fn rejected(reason: impl Into<String>) -> Self {
        TransactionPatch {
            amount: None,
            verification_state: Some(VerificationState::Rejected),
            rejection_details: Some(reason.into()),
        }
    }
}

/// Body for one custody hand-off. `transactions_ids` always names the
/// original transactions (flattened across hops); `previous_transactions_ids`
/// names the already-confirmed batches being consumed, empty on the first
/// hop.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ForwardRequest {
    pub transactions_ids: Vec<i64>,
    pub previous_transactions_ids: Vec<i64>,
    pub forwardee_id: i64,
    pub forwarded_amount: f64,
}

/// Body for a student's fund request submission.
#[derive(Debug, Clone, Serialize)]
pub struct NewFundRequest {
    pub amount: f64,
    pub reason: String,
    pub bank_details: crate::models::BankDetails,
}

/// Partial update for a fund request; used by both approval gates.
#[derive(Debug, Clone, Default, Serialize)]
pub struct FundRequestPatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<RequestStatus>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub approved_by_nsft: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub comments: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub granted_amount: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub transfer_details: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub granted_date: Option<NaiveDate>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rejection_reason: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rejected_by: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rejected_date: Option<NaiveDate>,
}

/// REST surface of the fund-tracking backend.
///
/// Every method maps to exactly one request; callers re-fetch lists after a
/// mutation instead of patching local state.
#[allow(async_fn_in_trait)]
pub trait PortalApi {
    /// `POST /base/token/obtain-pair/`
    async fn obtain_token_pair(&self, credentials: &Credentials) -> Result<TokenPair>;

    /// `GET /fund_tracking/transactions/` — server default order; any further
    /// filtering or sorting is the caller's job.
    async fn list_transactions(&self) -> Result<Vec<Transaction>>;

    /// `POST /fund_tracking/transactions/`
    async fn create_transaction(&self, new: &NewTransaction) -> Result<Transaction>;

    /// `PATCH /fund_tracking/transactions/{id}/`
    async fn update_transaction(&self, id: i64, patch: &TransactionPatch) -> Result<Transaction>;

    /// `DELETE /fund_tracking/transactions/{id}/` — legal only while the
    /// transaction is still unprocessed; otherwise the server rejects it.
    async fn delete_transaction(&self, id: i64) -> Result<()>;

    /// `GET /fund_tracking/transactions/linked/` — batches scoped to the
    /// caller's custody role.
    async fn list_linked_transactions(&self) -> Result<Vec<LinkedTransaction>>;

    /// `POST /fund_tracking/transactions/forward/`
    async fn forward_transactions(&self, request: &ForwardRequest) -> Result<LinkedTransaction>;

    /// `PATCH /fund_tracking/transactions/forwarded/{id}/` — sets
    /// `is_verified_by_forwardee`; false → true is the only transition.
    async fn confirm_receipt(&self, linked_id: i64) -> Result<LinkedTransaction>;

    /// `GET /base/representatives/`
    async fn list_representatives(&self) -> Result<Vec<Representative>>;

    /// `GET /fund_tracking/fund-requests/`
    async fn list_fund_requests(&self) -> Result<Vec<FundRequest>>;

    /// `POST /fund_tracking/fund-requests/`
    async fn submit_fund_request(&self, new: &NewFundRequest) -> Result<FundRequest>;

    /// `PATCH /fund_tracking/fund-requests/{id}/`
    async fn update_fund_request(&self, id: i64, patch: &FundRequestPatch) -> Result<FundRequest>;
}
