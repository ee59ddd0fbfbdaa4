//! Transaction and representative directory queries.
//!
//! The backend returns lists in its default (creation) order and does no
//! filtering for these views; mode/state filters, the name-or-CMS search box,
//! and the newest-first sort all happen client-side here.

use crate::{
    client::PortalApi,
    errors::Result,
    models::{CashState, Representative, Role, Transaction, TransactionMode, VerificationState},
};
use tracing::debug;

/// Client-side transaction filter. All criteria are conjunctive; `None`
/// means "don't care".
#[derive(Debug, Clone, Default)]
pub struct TransactionFilter {
    pub mode: Option<TransactionMode>,
    pub state: Option<CashState>,
    pub verification_state: Option<VerificationState>,
    /// Case-insensitive substring match on sender name or CMS id.
    pub search: Option<String>,
}

impl TransactionFilter {
    #[must_use]
    pub fn cash(state: Option<CashState>) -> Self {
        TransactionFilter {
            mode: Some(TransactionMode::Cash),
            state,
            ..TransactionFilter::default()
        }
    }

    #[must_use]
    pub fn online(verification_state: Option<VerificationState>) -> Self {
        TransactionFilter {
            mode: Some(TransactionMode::Online),
            verification_state,
            ..TransactionFilter::default()
        }
    }

    #[must_use]
    pub fn matches(&self, transaction: &Transaction) -> bool {
        if let Some(mode) = self.mode {
            if transaction.mode != mode {
                return false;
            }
        }
        if let Some(state) = self.state {
            if transaction.state != Some(state) {
                return false;
            }
        }
        if let Some(verification_state) = self.verification_state {
            if transaction.verification_state != Some(verification_state) {
                return false;
            }
        }
        if let Some(search) = &self.search {
            let needle = search.to_lowercase();
            let sender = &transaction.sender;
            if !sender.name.to_lowercase().contains(&needle)
                && !sender.cms.to_lowercase().contains(&needle)
            {
                return false;
            }
        }
        true
    }
}

/// Applies `filter` and sorts newest-first by creation time, the order every
/// student- and CR-facing view displays.
#[must_use]
pub fn filter_transactions(
    transactions: &[Transaction],
    filter: &TransactionFilter,
) -> Vec<Transaction> {
    let mut matched: Vec<Transaction> = transactions
        .iter()
        .filter(|tx| filter.matches(tx))
        .cloned()
        .collect();
    matched.sort_by(|a, b| b.created.cmp(&a.created));
    matched
}

/// Fetches the caller's transactions and applies `filter` in memory.
pub async fn fetch_transactions<A: PortalApi>(
    api: &A,
    filter: &TransactionFilter,
) -> Result<Vec<Transaction>> {
    let transactions = api.list_transactions().await?;
    debug!(total = transactions.len(), "fetched transactions");
    Ok(filter_transactions(&transactions, filter))
}

/// Directory entries holding the given role, by exact group-tag match.
#[must_use]
pub fn recipients_for(representatives: &[Representative], role: Role) -> Vec<Representative> {
    representatives
        .iter()
        .filter(|rep| rep.holds_role(role))
        .cloned()
        .collect()
}

/// Fetches the representative directory and keeps holders of `role`.
pub async fn fetch_recipients<A: PortalApi>(api: &A, role: Role) -> Result<Vec<Representative>> {
    let representatives = api.list_representatives().await?;
    let recipients = recipients_for(&representatives, role);
    debug!(
        total = representatives.len(),
        matching = recipients.len(),
        role = role.group_tag(),
        "fetched recipient directory"
    );
    Ok(recipients)
}
