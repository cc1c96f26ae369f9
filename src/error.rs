//! Error Types
//!
//! Errors surfaced by the SmartStart client.

use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

/// Client errors
#[derive(Debug, Error)]
pub enum Error {
    /// Username or password was absent when a login became necessary
    #[error("Missing parameter '{0}'")]
    MissingCredential(&'static str),

    #[error("Network error: {0}")]
    Network(String),

    /// Non-success HTTP status, carries the code and reason phrase.
    /// A 400 that survives the bounded re-authentication loop also
    /// surfaces through this variant.
    #[error("{code} {message}")]
    Status { code: u16, message: String },

    #[error("Parse error: {0}")]
    Parse(String),

    /// Device index out of range of the fetched asset list
    #[error("Invalid device index \"{0}\"")]
    DeviceIndex(usize),
}

impl From<reqwest::Error> for Error {
    fn from(e: reqwest::Error) -> Self {
        Error::Network(e.to_string())
    }
}
