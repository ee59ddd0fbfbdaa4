use thiserror::Error;

/// Unified error type covering the portal's failure taxonomy.
///
/// Validation and missing-token failures are raised before any network call is
/// issued; `Remote` carries the backend's own message verbatim when one is
/// present.
#[derive(Debug, Error)]
pub enum Error {
    #[error("authentication token not found")]
    MissingToken,

    #[error("invalid authentication token: {message}")]
    InvalidToken { message: String },

    #[error("{message}")]
    Validation { message: String },

    #[error("backend rejected request ({status}): {message}")]
    Remote { status: u16, message: String },

    #[error("network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("malformed response: {message}")]
    MalformedResponse { message: String },

    #[error("configuration error: {message}")]
    Config { message: String },

    #[error("environment variable error: {0}")]
    EnvVar(#[from] std::env::VarError),
}

impl Error {
    /// Shorthand for a client-side precondition failure.
    pub fn validation(message: impl Into<String>) -> Self {
        Error::Validation {
            message: message.into(),
        }
    }
}

// Convenience `Result` type
pub type Result<T> = std::result::Result<T, Error>;
