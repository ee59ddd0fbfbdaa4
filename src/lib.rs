//! `nsef-portal` - Workflow core for the NUST Student Endowment Fund portal
//!
//! This crate provides the framework-agnostic core of a role-based
//! financial-assistance portal: session handling with role-gated access
//! checks, a typed REST client for the fund-tracking backend, and the
//! workflows that move donated cash down the custody chain
//! (student → CR → BP → NSFT), review online payments, and take fund
//! requests through the NSFT and accountant approval gates. All business
//! state lives in the backend; this crate owns the client-side state
//! machines and their fail-fast validation.

// Deny the most critical lints that could lead to bugs or security issues
#![deny(
    // Security and correctness
    unsafe_code,
    unsafe_op_in_unsafe_fn,

    // Code quality - things that are almost always bugs
    unreachable_code,
    unreachable_patterns,
    unused_must_use,

    // Documentation - broken links are bugs
    rustdoc::broken_intra_doc_links,
    rustdoc::private_intra_doc_links,
)]
// Warn on things that should be fixed but aren't necessarily bugs
#![warn(
    missing_docs,

    // Clippy categories for overall code quality
    clippy::all,
    clippy::pedantic,
    clippy::nursery,

    // Performance
    clippy::inefficient_to_string,
    clippy::large_types_passed_by_value,
    clippy::needless_pass_by_value,

    // Correctness
    clippy::clone_on_ref_ptr,
    clippy::dbg_macro,
    clippy::exit,
    clippy::expect_used,
    clippy::float_cmp,
    clippy::panic,
    clippy::todo,
    clippy::unimplemented,
    clippy::unwrap_used,

    // Complexity and readability
    clippy::cognitive_complexity,
    clippy::large_enum_variant,
    clippy::match_same_arms,

    // Style consistency
    clippy::enum_glob_use,
    clippy::inconsistent_struct_constructor,
    clippy::must_use_candidate,
    clippy::redundant_closure_for_method_calls,
    clippy::semicolon_if_nothing_returned,
    clippy::wildcard_imports,

    // Future compatibility
    future_incompatible,
    rust_2018_idioms,
)]
// Allow some pedantic lints that are too noisy or not applicable
#![allow(
    clippy::module_name_repetitions,  // Common pattern in Rust
    clippy::missing_errors_doc,        // Will add gradually
    clippy::missing_panics_doc,        // Will add gradually
)]

/// Backend seam: the REST client trait, payloads, and HTTP implementation
pub mod client;
/// Environment-based configuration (backend base URL)
pub mod config;
/// Core workflow logic - custody transfer, verification, fund requests
pub mod core;
/// Unified error types and result handling
pub mod errors;
/// Wire and domain models shared across workflows
pub mod models;
/// Session store: token pair, decoded roles, access checks, route guard
pub mod session;

#[cfg(test)]
pub mod test_utils;
