//! Wire Models
//!
//! Serde types for the vendor response envelope. Success payloads nest
//! under `Return.Results.*`.

use std::fmt;

use serde::de::{self, DeserializeOwned};
use serde::{Deserialize, Deserializer};
use serde_json::Value;

use crate::error::{Error, Result};
use crate::session::SessionId;

/// Unique identifier of one vehicle entry; a string or number on the wire
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeviceId(String);

impl DeviceId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for DeviceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl<'de> Deserialize<'de> for DeviceId {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        match Value::deserialize(deserializer)? {
            Value::String(s) => Ok(DeviceId(s)),
            Value::Number(n) => Ok(DeviceId(n.to_string())),
            other => Err(de::Error::custom(format!(
                "DeviceId must be a string or number, got {other}"
            ))),
        }
    }
}

/// One vehicle entry from the asset search
#[derive(Debug, Clone, Deserialize)]
pub struct Device {
    #[serde(rename = "DeviceId")]
    pub device_id: DeviceId,

    #[serde(rename = "Name")]
    pub name: String,

    /// Raw command names the device advertises, status variants included
    #[serde(rename = "AvailActions", default)]
    pub avail_actions: Vec<AvailAction>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AvailAction {
    #[serde(rename = "Name")]
    pub name: String,
}

#[derive(Debug, Deserialize)]
pub struct LoginResults {
    #[serde(rename = "SessionID")]
    pub session_id: SessionId,
}

#[derive(Debug, Deserialize)]
pub struct SearchResults {
    #[serde(rename = "Devices", default)]
    pub devices: Vec<Device>,
}

#[derive(Debug, Deserialize)]
struct Envelope<T> {
    #[serde(rename = "Return")]
    ret: Return<T>,
}

#[derive(Debug, Deserialize)]
struct Return<T> {
    #[serde(rename = "Results")]
    results: T,
}

/// Extract `Return.Results` from a raw response body
pub fn parse_results<T: DeserializeOwned>(body: Value) -> Result<T> {
    serde_json::from_value::<Envelope<T>>(body)
        .map(|envelope| envelope.ret.results)
        .map_err(|e| Error::Parse(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn parses_login_results() {
        let body = json!({"Return": {"Results": {"SessionID": 12345}}});
        let results: LoginResults = parse_results(body).unwrap();
        assert_eq!(results.session_id.as_str(), "12345");
    }

    #[test]
    fn parses_device_list() {
        let body = json!({"Return": {"Results": {"Devices": [
            {"DeviceId": "100", "Name": "My Car", "AvailActions": [{"Name": "ARM"}]},
            {"DeviceId": 200, "Name": "Work Van"},
        ]}}});
        let results: SearchResults = parse_results(body).unwrap();
        assert_eq!(results.devices.len(), 2);
        assert_eq!(results.devices[0].avail_actions[0].name, "ARM");
        assert_eq!(results.devices[1].device_id.as_str(), "200");
        assert!(results.devices[1].avail_actions.is_empty());
    }

    #[test]
    fn missing_envelope_is_a_parse_error() {
        let body = json!({"Results": {"Devices": []}});
        assert!(parse_results::<SearchResults>(body).is_err());
    }
}
