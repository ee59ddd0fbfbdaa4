//! Cash custody-transfer workflow.
//!
//! Cash moves down the chain student → CR → BP → NSFT with an explicit
//! confirm-then-forward discipline at each hop. The current holder selects
//! eligible items (raw transactions on the first hop, already-confirmed
//! batches afterwards), picks exactly one recipient holding the next role,
//! and submits a single forward call for the whole selection. The recipient
//! later confirms receipt one batch at a time; only confirmed, not-yet-
//! forwarded batches become eligible for the next hop.
//!
//! All validation here is fail-fast and local: an empty selection, a missing
//! recipient, or a re-confirmation attempt is refused before any network
//! call. The backend remains the final arbiter of every transition.

use crate::{
    client::{ForwardRequest, PortalApi},
    errors::{Error, Result},
    models::{LinkedTransaction, Role, Transaction},
};
use std::collections::HashSet;
use tracing::info;

/// The role cash goes to next, or `None` at the top of the chain.
#[must_use]
pub const fn next_custodian(holder: Role) -> Option<Role> {
    match holder {
        Role::Cr => Some(Role::Bp),
        Role::Bp => Some(Role::Nsft),
        Role::Student | Role::Nsft => None,
    }
}

/// Cash transactions still eligible for a CR's first-hop handover.
#[must_use]
pub fn unprocessed_cash(transactions: &[Transaction]) -> Vec<Transaction> {
    transactions
        .iter()
        .filter(|tx| tx.is_unprocessed_cash())
        .cloned()
        .collect()
}

/// Batches the recipient has confirmed but not yet forwarded onward; these
/// are the only batches eligible for the next hop.
#[must_use]
pub fn confirmed_unforwarded(batches: &[LinkedTransaction]) -> Vec<LinkedTransaction> {
    batches
        .iter()
        .filter(|batch| batch.is_verified_by_forwardee && !batch.is_forwarded)
        .cloned()
        .collect()
}

/// Batches awaiting the recipient's receipt confirmation.
#[must_use]
pub fn awaiting_confirmation(batches: &[LinkedTransaction]) -> Vec<LinkedTransaction> {
    batches
        .iter()
        .filter(|batch| !batch.is_verified_by_forwardee)
        .cloned()
        .collect()
}

/// One selectable unit in a handover: a raw transaction on the CR's first
/// hop, or a confirmed batch on subsequent hops.
#[derive(Debug, Clone, PartialEq)]
pub enum HandoverItem {
    Original(Transaction),
    Batch(LinkedTransaction),
}

impl HandoverItem {
    #[must_use]
    pub fn id(&self) -> i64 {
        match self {
            HandoverItem::Original(tx) => tx.id,
            HandoverItem::Batch(batch) => batch.id,
        }
    }

    /// The amount this item contributes to the running total: the original
    /// `amount` for raw transactions, `forwarded_amount` for batches.
    #[must_use]
    pub fn amount(&self) -> f64 {
        match self {
            HandoverItem::Original(tx) => tx.amount,
            HandoverItem::Batch(batch) => batch.forwarded_amount,
        }
    }
}

/// Multi-select over the current holder's eligible items, with a select-all
/// convenience toggle and a running total.
#[derive(Debug, Clone, Default)]
pub struct HandoverSelection {
    items: Vec<HandoverItem>,
    selected: HashSet<i64>,
}

impl HandoverSelection {
    /// First-hop selection for a CR: keeps only unprocessed cash.
    #[must_use]
    pub fn from_transactions(transactions: &[Transaction]) -> Self {
        HandoverSelection {
            items: unprocessed_cash(transactions)
                .into_iter()
                .map(HandoverItem::Original)
                .collect(),
            selected: HashSet::new(),
        }
    }

    /// Re-forward selection for a BP: keeps only confirmed, unforwarded
    /// batches.
    #[must_use]
    pub fn from_batches(batches: &[LinkedTransaction]) -> Self {
        HandoverSelection {
            items: confirmed_unforwarded(batches)
                .into_iter()
                .map(HandoverItem::Batch)
                .collect(),
            selected: HashSet::new(),
        }
    }

    #[must_use]
    pub fn items(&self) -> &[HandoverItem] {
        &self.items
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.selected.is_empty()
    }

    #[must_use]
    pub fn is_selected(&self, id: i64) -> bool {
        self.selected.contains(&id)
    }

    /// Flips one item's selection; ids not in the eligible set are ignored.
    /// Returns whether the item is selected afterwards.
    pub fn toggle(&mut self, id: i64) -> bool {
        if !self.items.iter().any(|item| item.id() == id) {
            return false;
        }
        if self.selected.remove(&id) {
            false
        } else {
            self.selected.insert(id);
            true
        }
    }

    /// Select-all convenience toggle.
    pub fn set_all(&mut self, selected: bool) {
        if selected {
            self.selected = self.items.iter().map(HandoverItem::id).collect();
        } else {
            self.selected.clear();
        }
    }

    #[must_use]
    pub fn is_all_selected(&self) -> bool {
        !self.items.is_empty() && self.selected.len() == self.items.len()
    }

    pub fn clear(&mut self) {
        self.selected.clear();
    }

    fn selected_items(&self) -> impl Iterator<Item = &HandoverItem> {
        self.items
            .iter()
            .filter(|item| self.selected.contains(&item.id()))
    }

    /// Running total of the selected items' amounts.
    #[must_use]
    pub fn total_amount(&self) -> f64 {
        self.selected_items().map(HandoverItem::amount).sum()
    }

    /// Builds the single forward call for this handover.
    ///
    /// The selection is never split across calls: one handover action is one
    /// batch with one derived total. Batch items are unwound to their
    /// original transaction ids, and the consumed batch ids travel alongside
    /// for audit linkage. The total is computed here from the constituents;
    /// callers cannot assert an arbitrary amount.
    ///
    /// # Errors
    /// [`Error::Validation`] when nothing is selected or no recipient was
    /// chosen — refused before any network call.
    pub fn build_forward_request(&self, forwardee_id: Option<i64>) -> Result<ForwardRequest> {
        if self.selected.is_empty() {
            return Err(Error::validation("select at least one transaction to handover"));
        }
        let Some(forwardee_id) = forwardee_id else {
            return Err(Error::validation("select a recipient to handover the cash to"));
        };

        let mut transactions_ids = Vec::new();
        let mut previous_transactions_ids = Vec::new();
        for item in self.selected_items() {
            match item {
                HandoverItem::Original(tx) => transactions_ids.push(tx.id),
                HandoverItem::Batch(batch) => {
                    transactions_ids.extend(batch.transactions.iter().map(|tx| tx.id));
                    previous_transactions_ids.push(batch.id);
                }
            }
        }

        Ok(ForwardRequest {
            transactions_ids,
            previous_transactions_ids,
            forwardee_id,
            forwarded_amount: self.total_amount(),
        })
    }
}

/// Submits one handover as a single atomic forward call.
///
/// On failure the selection is untouched, so the holder can simply retry.
pub async fn submit_handover<A: PortalApi>(
    api: &A,
    selection: &HandoverSelection,
    forwardee_id: Option<i64>,
) -> Result<LinkedTransaction> {
    let request = selection.build_forward_request(forwardee_id)?;
    let batch = api.forward_transactions(&request).await?;
    info!(
        batch = batch.id,
        forwardee = request.forwardee_id,
        amount = request.forwarded_amount,
        constituents = request.transactions_ids.len(),
        "handover forwarded"
    );
    Ok(batch)
}

/// Confirms receipt of one batch; the only allowed transition is
/// `is_verified_by_forwardee` false → true, with no amount re-entry.
///
/// # Errors
/// [`Error::Validation`] when the batch is already confirmed — refused
/// client-side before any network call, though the server stays the final
/// authority.
pub async fn confirm_receipt<A: PortalApi>(
    api: &A,
    batch: &LinkedTransaction,
) -> Result<LinkedTransaction> {
    if batch.is_verified_by_forwardee {
        return Err(Error::validation("batch receipt is already confirmed"));
    }
    let confirmed = api.confirm_receipt(batch.id).await?;
    info!(batch = batch.id, amount = batch.forwarded_amount, "receipt confirmed");
    Ok(confirmed)
}
