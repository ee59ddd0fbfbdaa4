//! Fund request lifecycle.
//!
//! A student's disbursement request passes two independent gates: NSFT
//! approves or rejects the pending request, then the accountant grants (at a
//! possibly adjusted amount) or rejects the NSFT-approved one. Requests are
//! never deleted; a rejection at either gate is terminal and records who
//! rejected it.

use crate::{
    client::{FundRequestPatch, NewFundRequest, PortalApi},
    errors::{Error, Result},
    models::{FundRequest, RequestStatus},
};
use chrono::Utc;
use tracing::info;

/// NSFT's decision on a pending request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NsftDecision {
    Approve,
    Reject,
}

/// Submits a new fund request. The server creates it with status pending and
/// `approved_by_nsft` false.
///
/// # Errors
/// [`Error::Validation`] for a non-positive amount, an empty reason, or
/// incomplete bank details — refused before any network call.
pub async fn submit_request<A: PortalApi>(api: &A, new: &NewFundRequest) -> Result<FundRequest> {
    if !(new.amount.is_finite() && new.amount > 0.0) {
        return Err(Error::Validation {
            message: format!("requested amount must be a positive number, got {}", new.amount),
        });
    }
    if new.reason.trim().is_empty() {
        return Err(Error::validation("a reason for the request is required"));
    }
    let bank = &new.bank_details;
    if [
        &bank.bank_name,
        &bank.account_number,
        &bank.account_holder,
        &bank.contact_number,
    ]
    .iter()
    .any(|field| field.trim().is_empty())
    {
        return Err(Error::validation("all bank transfer details are required"));
    }

    let request = api.submit_fund_request(new).await?;
    info!(request = request.id, amount = request.amount, "fund request submitted");
    Ok(request)
}

/// NSFT gate: decides a pending request. Approval sets `approved_by_nsft`;
/// rejection leaves it false so the request never reaches the accountant.
///
/// # Errors
/// [`Error::Validation`] when the request is no longer pending.
pub async fn nsft_decide<A: PortalApi>(
    api: &A,
    request: &FundRequest,
    decision: NsftDecision,
    comments: Option<&str>,
) -> Result<FundRequest> {
    if request.status != RequestStatus::Pending {
        return Err(Error::validation("only pending requests can be decided by NSFT"));
    }

    let patch = match decision {
        NsftDecision::Approve => FundRequestPatch {
            status: Some(RequestStatus::Approved),
            approved_by_nsft: Some(true),
            comments: comments.map(str::to_string),
            ..FundRequestPatch::default()
        },
        NsftDecision::Reject => FundRequestPatch {
            status: Some(RequestStatus::Rejected),
            approved_by_nsft: Some(false),
            comments: comments.map(str::to_string),
            ..FundRequestPatch::default()
        },
    };

    let updated = api.update_fund_request(request.id, &patch).await?;
    info!(request = request.id, ?decision, "NSFT decided fund request");
    Ok(updated)
}

/// Accountant gate: grants an NSFT-approved request. The granted amount may
/// differ from the requested one (accountant discretion).
///
/// # Errors
/// [`Error::Validation`] when the request has not cleared the NSFT gate, is
/// already settled, or the amount is not a positive finite number.
pub async fn accountant_grant<A: PortalApi>(
    api: &A,
    request: &FundRequest,
    amount: f64,
    transfer_details: &str,
) -> Result<FundRequest> {
    if !request.awaits_accountant() {
        return Err(Error::validation(
            "only NSFT-approved, unsettled requests can be granted",
        ));
    }
    if !(amount.is_finite() && amount > 0.0) {
        return Err(Error::Validation {
            message: format!("granted amount must be a positive number, got {amount}"),
        });
    }

    let patch = FundRequestPatch {
        status: Some(RequestStatus::Granted),
        granted_amount: Some(amount),
        transfer_details: Some(transfer_details.to_string()),
        granted_date: Some(Utc::now().date_naive()),
        ..FundRequestPatch::default()
    };
    let granted = api.update_fund_request(request.id, &patch).await?;
    info!(
        request = request.id,
        requested = request.amount,
        granted = amount,
        "fund request granted"
    );
    Ok(granted)
}

/// Accountant gate: rejects an NSFT-approved request, recording that the
/// rejection happened at the accountant stage rather than at NSFT.
///
/// # Errors
/// [`Error::Validation`] when the request has not cleared the NSFT gate or is
/// already granted, or when the trimmed reason is empty.
pub async fn accountant_reject<A: PortalApi>(
    api: &A,
    request: &FundRequest,
    reason: &str,
) -> Result<FundRequest> {
    if !request.awaits_accountant() {
        return Err(Error::validation(
            "only NSFT-approved, ungranted requests can be rejected by the accountant",
        ));
    }
    let reason = reason.trim();
    if reason.is_empty() {
        return Err(Error::validation("a rejection reason is required"));
    }

    let patch = FundRequestPatch {
        status: Some(RequestStatus::Rejected),
        rejection_reason: Some(reason.to_string()),
        rejected_by: Some("accountant".to_string()),
        rejected_date: Some(Utc::now().date_naive()),
        ..FundRequestPatch::default()
    };
    let rejected = api.update_fund_request(request.id, &patch).await?;
    info!(request = request.id, "fund request rejected by accountant");
    Ok(rejected)
}

/// The accountant's work queue: requests that cleared the NSFT gate and are
/// not yet settled. NSFT-rejected requests never appear here.
#[must_use]
pub fn nsft_approved_queue(requests: &[FundRequest]) -> Vec<FundRequest> {
    requests
        .iter()
        .filter(|request| request.awaits_accountant())
        .cloned()
        .collect()
}
