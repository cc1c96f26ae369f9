//! Client Configuration
//!
//! Immutable configuration captured at construction. Each client instance
//! owns its own copy, so two instances never share option state.

use std::time::Duration;

use crate::session::SessionId;

pub const DEFAULT_API_URL: &str = "https://colt.calamp-ts.com/";

/// Attached to the HTTP client; enforcement is the transport's job.
const DEFAULT_TIMEOUT: Duration = Duration::from_secs(60);

#[derive(Debug, Clone)]
pub struct Config {
    /// Account username; required before the first login
    pub username: Option<String>,
    /// Account password; required before the first login
    pub password: Option<String>,
    /// Base URL of the vendor API
    pub api_url: String,
    /// Pre-supplied session id; skips the initial login when set
    pub session_id: Option<SessionId>,
    /// Request timeout handed to the HTTP client
    pub timeout: Duration,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            username: None,
            password: None,
            api_url: DEFAULT_API_URL.to_string(),
            session_id: None,
            timeout: DEFAULT_TIMEOUT,
        }
    }
}

impl Config {
    pub fn new(username: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            username: Some(username.into()),
            password: Some(password.into()),
            ..Default::default()
        }
    }

    pub fn with_api_url(mut self, api_url: impl Into<String>) -> Self {
        self.api_url = api_url.into();
        self
    }

    pub fn with_session_id(mut self, session_id: SessionId) -> Self {
        self.session_id = Some(session_id);
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }
}
