//! Session State
//!
//! Tracks the authentication state of a client instance. The session id is
//! acquired lazily on the first request, appended to every subsequent
//! request, and invalidated when the server answers HTTP 400.

use std::fmt;

use serde::de;
use serde::{Deserialize, Deserializer};
use serde_json::Value;

/// Opaque session token returned by the login endpoint.
///
/// The vendor serializes it as either a JSON string or a number depending on
/// the account, so deserialization accepts both and normalizes to a string.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionId(String);

impl SessionId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl<'de> Deserialize<'de> for SessionId {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        match Value::deserialize(deserializer)? {
            Value::String(s) => Ok(SessionId(s)),
            Value::Number(n) => Ok(SessionId(n.to_string())),
            other => Err(de::Error::custom(format!(
                "SessionID must be a string or number, got {other}"
            ))),
        }
    }
}

/// Authentication state of a client instance.
///
/// An explicit tagged state instead of a sentinel value: while a login
/// request is on the wire the state is [`SessionState::LoginInFlight`] and
/// no `sessid` parameter is appended.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum SessionState {
    /// No session held; the next request must log in first
    #[default]
    None,
    /// A login request is in flight
    LoginInFlight,
    /// A session id is held and appended to every request
    Active(SessionId),
}

impl SessionState {
    /// The held session id, if any
    pub fn active_id(&self) -> Option<&SessionId> {
        match self {
            SessionState::Active(id) => Some(id),
            _ => None,
        }
    }

    pub fn is_none(&self) -> bool {
        matches!(self, SessionState::None)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn session_id_from_string() {
        let id: SessionId = serde_json::from_value(serde_json::json!("abc123")).unwrap();
        assert_eq!(id.as_str(), "abc123");
    }

    #[test]
    fn session_id_from_number() {
        let id: SessionId = serde_json::from_value(serde_json::json!(91842)).unwrap();
        assert_eq!(id.as_str(), "91842");
    }

    #[test]
    fn session_id_rejects_other_types() {
        assert!(serde_json::from_value::<SessionId>(serde_json::json!({})).is_err());
    }

    #[test]
    fn active_id_only_for_active_state() {
        assert!(SessionState::None.active_id().is_none());
        assert!(SessionState::LoginInFlight.active_id().is_none());

        let state = SessionState::Active(SessionId::new("s1"));
        assert_eq!(state.active_id().map(SessionId::as_str), Some("s1"));
    }
}
