//! Smoke binary: signs in with credentials from the environment and prints
//! the caller's role set and pending work queues. Useful for checking a
//! deployment end to end without the web front-end.

use dotenvy::dotenv;
use nsef_portal::{
    client::{Credentials, PortalApi, http::HttpPortal},
    config,
    core::{custody, directory, requests},
    errors::{Error, Result},
    models::{CashState, Role, VerificationState},
    session::Session,
};
use std::env;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<()> {
    // 1. Initialize tracing (as early as possible)
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    // 2. Load .env file (as early as possible)
    dotenv().ok();
    info!("Attempted to load .env file.");

    // 3. Load the application configuration
    let app_config = config::load_app_configuration()
        .inspect_err(|e| error!("Failed to load configuration: {e}"))?;
    info!(backend = app_config.backend_url(), "Configuration loaded.");

    // 4. Authenticate. Credentials are read here, at point of use.
    let username = env::var("NSEF_USERNAME")
        .inspect_err(|e| error!("NSEF_USERNAME not found: {e}"))
        .map_err(Error::EnvVar)?;
    let password = env::var("NSEF_PASSWORD")
        .inspect_err(|e| error!("NSEF_PASSWORD not found: {e}"))
        .map_err(Error::EnvVar)?;

    let portal = HttpPortal::new(app_config);
    let tokens = portal
        .obtain_token_pair(&Credentials { username, password })
        .await
        .inspect_err(|e| error!("Login failed: {e}"))?;

    let session = Session::login(tokens.access.clone(), tokens.refresh)?;
    let portal = portal.with_access_token(tokens.access);
    info!(roles = ?session.roles(), "Signed in.");

    if let Some(user) = session.user() {
        println!("Signed in as {} ({:?})", user.full_name(), session.roles());
    }

    // 5. Print the pending queues for each role the caller can act as.
    if session.can_access(Role::Cr) {
        let unprocessed = directory::fetch_transactions(
            &portal,
            &directory::TransactionFilter::cash(Some(CashState::Initiated)),
        )
        .await?;
        let total: f64 = unprocessed.iter().map(|tx| tx.amount).sum();
        println!("Unprocessed cash: {} transaction(s), PKR {total}", unprocessed.len());

        let pending_online = directory::fetch_transactions(
            &portal,
            &directory::TransactionFilter::online(Some(VerificationState::Pending)),
        )
        .await?;
        println!("Online payments awaiting review: {}", pending_online.len());
    }

    if session.can_access(Role::Bp) {
        let batches = portal.list_linked_transactions().await?;
        let pending = custody::awaiting_confirmation(&batches);
        let ready = custody::confirmed_unforwarded(&batches);
        println!(
            "Handovers: {} awaiting confirmation, {} ready to forward onward",
            pending.len(),
            ready.len()
        );
    }

    if session.can_access(Role::Nsft) {
        let all = portal.list_fund_requests().await?;
        let queue = requests::nsft_approved_queue(&all);
        let pending = all
            .iter()
            .filter(|r| r.status == nsef_portal::models::RequestStatus::Pending)
            .count();
        println!(
            "Fund requests: {pending} pending NSFT decision, {} awaiting the accountant",
            queue.len()
        );
    }

    Ok(())
}
