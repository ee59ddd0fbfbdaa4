//! Application configuration loaded from the environment.
//!
//! The backend base URL comes from `NSEF_BACKEND_URL`. Credentials for the
//! smoke binary are read at point of use, not stored here.

use crate::errors::{Error, Result};

/// Environment variable naming the backend base URL.
pub const BACKEND_URL_VAR: &str = "NSEF_BACKEND_URL";

/// Runtime configuration for the portal client.
#[derive(Debug, Clone)]
pub struct AppConfig {
    backend_url: String,
}

impl AppConfig {
    /// Builds a config from an explicit base URL, normalizing away a trailing
    /// slash so endpoint paths join predictably.
    ///
    /// # Errors
    /// Returns [`Error::Config`] when the URL is empty or not http(s).
    pub fn new(backend_url: impl Into<String>) -> Result<Self> {
        let mut backend_url = backend_url.into().trim().to_string();
        if backend_url.is_empty() {
            return Err(Error::Config {
                message: "backend URL must not be empty".to_string(),
            });
        }
        if !backend_url.starts_with("http://") && !backend_url.starts_with("https://") {
            return Err(Error::Config {
                message: format!("backend URL must be http(s), got {backend_url}"),
            });
        }
        while backend_url.ends_with('/') {
            backend_url.pop();
        }
        Ok(AppConfig { backend_url })
    }

    /// The backend base URL without a trailing slash.
    #[must_use]
    pub fn backend_url(&self) -> &str {
        &self.backend_url
    }

    /// Joins an endpoint path onto the base URL.
    #[must_use]
    pub fn endpoint(&self, path: &str) -> String {
        format!("{}/{}", self.backend_url, path.trim_start_matches('/'))
    }
}

/// Loads the application configuration from the environment.
///
/// # Errors
/// Returns [`Error::EnvVar`] when `NSEF_BACKEND_URL` is unset and
/// [`Error::Config`] when it is malformed.
pub fn load_app_configuration() -> Result<AppConfig> {
    let url = std::env::var(BACKEND_URL_VAR)?;
    AppConfig::new(url)
}
