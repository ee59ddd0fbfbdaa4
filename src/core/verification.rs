//! Online payment review.
//!
//! A CR reviews a pending online transaction's asserted amount and receipt,
//! then either verifies it (at a possibly corrected amount) or rejects it
//! with a reason the student will see. Once a transaction leaves pending it
//! is read-only here; there is no un-verify or un-reject path.

use crate::{
    client::{PortalApi, TransactionPatch},
    errors::{Error, Result},
    models::Transaction,
};
use tracing::info;

/// Marks a pending online transaction verified, persisting `final_amount`
/// (which may differ from the student-submitted amount, e.g. a corrected
/// typo).
///
/// # Errors
/// [`Error::Validation`] when the transaction is not a pending online
/// transaction or the amount is not a positive finite number; both are
/// refused before any network call.
pub async fn verify_online<A: PortalApi>(
    api: &A,
    transaction: &Transaction,
    final_amount: f64,
) -> Result<Transaction> {
    if !transaction.is_pending_online() {
        return Err(Error::validation(
            "only pending online transactions can be verified",
        ));
    }
    if !(final_amount.is_finite() && final_amount > 0.0) {
        return Err(Error::Validation {
            message: format!("final amount must be a positive number, got {final_amount}"),
        });
    }

    let verified = api
        .update_transaction(transaction.id, &TransactionPatch::verified(final_amount))
        .await?;
    info!(
        transaction = transaction.id,
        submitted = transaction.amount,
        verified = final_amount,
        "online transaction verified"
    );
    Ok(verified)
}

/// Rejects a pending online transaction with a mandatory reason.
///
/// # Errors
/// [`Error::Validation`] when the transaction is not pending or the trimmed
/// reason is empty — no network call is issued in either case.
pub async fn reject_online<A: PortalApi>(
    api: &A,
    transaction: &Transaction,
    reason: &str,
) -> Result<Transaction> {
    if !transaction.is_pending_online() {
        return Err(Error::validation(
            "only pending online transactions can be rejected",
        ));
    }
    let reason = reason.trim();
    if reason.is_empty() {
        return Err(Error::validation("a rejection reason is required"));
    }

    let rejected = api
        .update_transaction(transaction.id, &TransactionPatch::rejected(reason))
        .await?;
    info!(transaction = transaction.id, "online transaction rejected");
    Ok(rejected)
}
