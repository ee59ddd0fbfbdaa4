//! Reqwest-backed implementation of the [`PortalApi`] trait.
//!
//! Every authenticated call attaches `Authorization: Bearer <access_token>`
//! and is refused with [`Error::MissingToken`] before any IO when no token is
//! held. Non-2xx responses surface the backend's `message`/`detail` field
//! verbatim when present.

use crate::{
    client::{
        Credentials, ForwardRequest, FundRequestPatch, NewFundRequest, NewTransaction, PortalApi,
        TokenPair, TransactionPatch,
    },
    config::AppConfig,
    errors::{Error, Result},
    models::{FundRequest, LinkedTransaction, Representative, Transaction},
};
use serde::de::DeserializeOwned;
use tracing::debug;

const TOKEN_PATH: &str = "base/token/obtain-pair/";
const TRANSACTIONS_PATH: &str = "fund_tracking/transactions/";
const LINKED_PATH: &str = "fund_tracking/transactions/linked/";
const FORWARD_PATH: &str = "fund_tracking/transactions/forward/";
const FORWARDED_PATH: &str = "fund_tracking/transactions/forwarded/";
const REPRESENTATIVES_PATH: &str = "base/representatives/";
const FUND_REQUESTS_PATH: &str = "fund_tracking/fund-requests/";

/// HTTP client for the fund-tracking backend.
#[derive(Debug, Clone)]
pub struct HttpPortal {
    http: reqwest::Client,
    config: AppConfig,
    access_token: Option<String>,
}

impl HttpPortal {
    /// An unauthenticated client; only [`PortalApi::obtain_token_pair`] will
    /// succeed until a token is attached.
    #[must_use]
    pub fn new(config: AppConfig) -> Self {
        HttpPortal {
            http: reqwest::Client::new(),
            config,
            access_token: None,
        }
    }

    /// Returns the same client carrying a bearer token for subsequent calls.
    #[must_use]
    pub fn with_access_token(mut self, access_token: impl Into<String>) -> Self {
        self.access_token = Some(access_token.into());
        self
    }

    /// Replaces or clears the bearer token, e.g. after login or logout.
    pub fn set_access_token(&mut self, access_token: Option<String>) {
        self.access_token = access_token;
    }

    fn token(&self) -> Result<&str> {
        self.access_token.as_deref().ok_or(Error::MissingToken)
    }

    fn url(&self, path: &str) -> String {
        self.config.endpoint(path)
    }

    async fn get_authed<T: DeserializeOwned>(&self, path: &str) -> Result<T> {
        let token = self.token()?;
        debug!(path, "GET");
        let response = self.http.get(self.url(path)).bearer_auth(token).send().await?;
        read_json(response).await
    }
}

/// Builds the error for a non-2xx response, preferring the backend-provided
/// `message` or `detail` field over the raw body.
fn remote_error(status: u16, body: &str) -> Error {
    let message = serde_json::from_str::<serde_json::Value>(body)
        .ok()
        .and_then(|value| {
            value
                .get("message")
                .or_else(|| value.get("detail"))
                .and_then(|m| m.as_str().map(str::to_string))
        })
        .unwrap_or_else(|| {
            if body.trim().is_empty() {
                "request failed".to_string()
            } else {
                body.trim().to_string()
            }
        });
    Error::Remote { status, message }
}

async fn read_json<T: DeserializeOwned>(response: reqwest::Response) -> Result<T> {
    let status = response.status();
    let body = response.text().await?;
    if !status.is_success() {
        return Err(remote_error(status.as_u16(), &body));
    }
    serde_json::from_str(&body).map_err(|e| Error::MalformedResponse {
        message: e.to_string(),
    })
}

async fn read_empty(response: reqwest::Response) -> Result<()> {
    let status = response.status();
    if !status.is_success() {
        let body = response.text().await?;
        return Err(remote_error(status.as_u16(), &body));
    }
    Ok(())
}

impl PortalApi for HttpPortal {
    async fn obtain_token_pair(&self, credentials: &Credentials) -> Result<TokenPair> {
        debug!(username = %credentials.username, "POST {TOKEN_PATH}");
        let response = self
            .http
            .post(self.url(TOKEN_PATH))
            .json(credentials)
            .send()
            .await?;
        read_json(response).await
    }

    async fn list_transactions(&self) -> Result<Vec<Transaction>> {
        self.get_authed(TRANSACTIONS_PATH).await
    }

    async fn create_transaction(&self, new: &NewTransaction) -> Result<Transaction> {
        let token = self.token()?;
        debug!(amount = new.amount, mode = ?new.mode, "POST {TRANSACTIONS_PATH}");
        let response = self
            .http
            .post(self.url(TRANSACTIONS_PATH))
            .bearer_auth(token)
            .json(new)
            .send()
            .await?;
        read_json(response).await
    }

    async fn update_transaction(&self, id: i64, patch: &TransactionPatch) -> Result<Transaction> {
        let token = self.token()?;
        debug!(id, "PATCH {TRANSACTIONS_PATH}{{id}}/");
        let response = self
            .http
            .patch(self.url(&format!("{TRANSACTIONS_PATH}{id}/")))
            .bearer_auth(token)
            .json(patch)
            .send()
            .await?;
        read_json(response).await
    }

    async fn delete_transaction(&self, id: i64) -> Result<()> {
        let token = self.token()?;
        debug!(id, "DELETE {TRANSACTIONS_PATH}{{id}}/");
        let response = self
            .http
            .delete(self.url(&format!("{TRANSACTIONS_PATH}{id}/")))
            .bearer_auth(token)
            .send()
            .await?;
        read_empty(response).await
    }

    async fn list_linked_transactions(&self) -> Result<Vec<LinkedTransaction>> {
        self.get_authed(LINKED_PATH).await
    }

    async fn forward_transactions(&self, request: &ForwardRequest) -> Result<LinkedTransaction> {
        let token = self.token()?;
        debug!(
            forwardee = request.forwardee_id,
            amount = request.forwarded_amount,
            batch_size = request.transactions_ids.len(),
            "POST {FORWARD_PATH}"
        );
        let response = self
            .http
            .post(self.url(FORWARD_PATH))
            .bearer_auth(token)
            .json(request)
            .send()
            .await?;
        read_json(response).await
    }

    async fn confirm_receipt(&self, linked_id: i64) -> Result<LinkedTransaction> {
        let token = self.token()?;
        debug!(linked_id, "PATCH {FORWARDED_PATH}{{id}}/");
        let response = self
            .http
            .patch(self.url(&format!("{FORWARDED_PATH}{linked_id}/")))
            .bearer_auth(token)
            .json(&serde_json::json!({ "is_verified_by_forwardee": true }))
            .send()
            .await?;
        read_json(response).await
    }

    async fn list_representatives(&self) -> Result<Vec<Representative>> {
        self.get_authed(REPRESENTATIVES_PATH).await
    }

    async fn list_fund_requests(&self) -> Result<Vec<FundRequest>> {
        self.get_authed(FUND_REQUESTS_PATH).await
    }

    async fn submit_fund_request(&self, new: &NewFundRequest) -> Result<FundRequest> {
        let token = self.token()?;
        debug!(amount = new.amount, "POST {FUND_REQUESTS_PATH}");
        let response = self
            .http
            .post(self.url(FUND_REQUESTS_PATH))
            .bearer_auth(token)
            .json(new)
            .send()
            .await?;
        read_json(response).await
    }

    async fn update_fund_request(&self, id: i64, patch: &FundRequestPatch) -> Result<FundRequest> {
        let token = self.token()?;
        debug!(id, "PATCH {FUND_REQUESTS_PATH}{{id}}/");
        let response = self
            .http
            .patch(self.url(&format!("{FUND_REQUESTS_PATH}{id}/")))
            .bearer_auth(token)
            .json(patch)
            .send()
            .await?;
        read_json(response).await
    }
}
