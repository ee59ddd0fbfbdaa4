//! Core workflow logic - framework-agnostic custody, verification, and
//! fund-request operations.
//!
//! Functions here are generic over [`crate::client::PortalApi`] the same way
//! they would be over a database handle: each user-triggered action issues at
//! most one backend call, validates its own preconditions before any IO, and
//! leaves caller-held state untouched on failure so the action can simply be
//! retried.

/// Multi-hop cash handover state machine (CR → BP → NSFT).
pub mod custody;
/// Listing, filtering, and sorting of transactions and representatives.
pub mod directory;
/// Fund request lifecycle across the NSFT and accountant gates.
pub mod requests;
/// Online payment review: verify or reject pending transactions.
pub mod verification;
