//! SmartStart Client
//!
//! Wraps the Calamp remote-command HTTP API behind async methods. A client
//! instance owns its session state and memoized asset data; the `&mut self`
//! receivers make the one-command-at-a-time contract a compile-time
//! guarantee.

use std::collections::HashMap;

use serde_json::Value;
use tracing::{debug, info, warn};

use crate::actions;
use crate::config::Config;
use crate::error::{Error, Result};
use crate::models::{parse_results, Device, DeviceId, LoginResults, SearchResults};
use crate::session::{SessionId, SessionState};

/// Attempts for one logical request while the server keeps answering 400
const MAX_ATTEMPTS: u32 = 3;

pub struct SmartStart {
    config: Config,
    http: reqwest::Client,
    session: SessionState,
    login_data: Option<Value>,
    assets: Option<Vec<Device>>,
    device_id: Option<DeviceId>,
    actions: HashMap<usize, Vec<String>>,
    attempts: u32,
}

impl SmartStart {
    pub fn new(config: Config) -> Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| Error::Network(format!("Failed to create HTTP client: {e}")))?;

        let session = match &config.session_id {
            Some(id) => SessionState::Active(id.clone()),
            None => SessionState::None,
        };

        Ok(Self {
            config,
            http,
            session,
            login_data: None,
            assets: None,
            device_id: None,
            actions: HashMap::new(),
            attempts: 0,
        })
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Raw body of the last successful login response
    pub fn login_data(&self) -> Option<&Value> {
        self.login_data.as_ref()
    }

    /// Generic GET against the vendor API.
    ///
    /// Logs in first when no session is held, sanitizes and percent-encodes
    /// each positional argument, and appends `sessid` while a session is
    /// active. HTTP 400 means the session went stale: the session is
    /// dropped and the whole request retried, [`MAX_ATTEMPTS`] attempts
    /// total. The final attempt's outcome is returned as-is.
    pub async fn request(&mut self, endpoint: &str, args: &[String]) -> Result<Value> {
        loop {
            if self.session.is_none() {
                self.ensure_session().await?;
            }

            let url = self.build_url(endpoint, args);
            debug!(url = %url, "GET");

            let result = self.execute(&url).await;

            if let Err(Error::Status { code: 400, .. }) = &result {
                self.attempts += 1;
                if self.attempts < MAX_ATTEMPTS {
                    warn!(attempt = self.attempts, "session rejected, re-authenticating");
                    self.session = SessionState::None;
                    continue;
                }
            }

            self.attempts = 0;
            return result;
        }
    }

    /// One HTTP attempt: only a 200 yields a body
    async fn execute(&self, url: &str) -> Result<Value> {
        let response = self
            .http
            .get(url)
            .send()
            .await
            .map_err(|e| Error::Network(e.to_string()))?;

        let status = response.status();
        if status != reqwest::StatusCode::OK {
            return Err(Error::Status {
                code: status.as_u16(),
                message: status.canonical_reason().unwrap_or("").to_string(),
            });
        }

        response
            .json::<Value>()
            .await
            .map_err(|e| Error::Parse(e.to_string()))
    }

    fn build_url(&self, endpoint: &str, args: &[String]) -> String {
        let encoded: Vec<String> = args
            .iter()
            .map(|arg| {
                let cleaned: String = arg.chars().filter(|c| *c != '\\' && *c != '\'').collect();
                urlencoding::encode(&cleaned).into_owned()
            })
            .collect();

        let sessid = match self.session.active_id() {
            Some(id) => format!("?sessid={id}"),
            None => String::new(),
        };

        let base = self.config.api_url.trim_end_matches('/');
        format!("{}/{}{}{}", base, endpoint, encoded.join("/"), sessid)
    }

    /// Return the held session id, logging in first if necessary.
    ///
    /// The session is never refreshed proactively; it is dropped by the
    /// 400-retry path in [`SmartStart::request`] and re-acquired here on
    /// the next call. On failure the state goes back to "no session" so a
    /// later call may retry.
    pub async fn ensure_session(&mut self) -> Result<SessionId> {
        if let SessionState::Active(id) = &self.session {
            return Ok(id.clone());
        }

        let username = match self.config.username.as_deref() {
            Some(u) if !u.is_empty() => u.to_string(),
            _ => return Err(Error::MissingCredential("username")),
        };
        let password = match self.config.password.as_deref() {
            Some(p) if !p.is_empty() => p.to_string(),
            _ => return Err(Error::MissingCredential("password")),
        };

        self.session = SessionState::LoginInFlight;

        let args = [username.clone(), password];
        let outcome = Box::pin(self.request("auth/login/", &args))
            .await
            .and_then(|body| {
                let results: LoginResults = parse_results(body.clone())?;
                Ok((body, results.session_id))
            });

        match outcome {
            Ok((body, session_id)) => {
                info!(user = %username, "session established");
                self.login_data = Some(body);
                self.session = SessionState::Active(session_id.clone());
                Ok(session_id)
            }
            Err(e) => {
                self.session = SessionState::None;
                Err(e)
            }
        }
    }

    /// The account's device list, fetched once per client lifetime
    pub async fn get_assets(&mut self) -> Result<&[Device]> {
        if self.assets.is_none() {
            let body = self.request("device/AdvancedSearch/", &[]).await?;
            let results: SearchResults = parse_results(body)?;
            debug!(count = results.devices.len(), "asset list fetched");
            self.assets = Some(results.devices);
        } else {
            debug!("asset list served from cache");
        }

        Ok(self.assets.as_deref().unwrap_or_default())
    }

    pub async fn get_device(&mut self, device_index: usize) -> Result<Device> {
        let assets = self.get_assets().await?;
        assets
            .get(device_index)
            .cloned()
            .ok_or(Error::DeviceIndex(device_index))
    }

    /// Id of the device at `device_index`; the resolved id is cached and
    /// shared with name resolution, first resolution wins
    pub async fn get_device_id(&mut self, device_index: usize) -> Result<DeviceId> {
        if let Some(id) = &self.device_id {
            return Ok(id.clone());
        }

        let device = self.get_device(device_index).await?;
        self.device_id = Some(device.device_id.clone());
        Ok(device.device_id)
    }

    /// Resolve a device by name, case-insensitively.
    ///
    /// Devices are scanned in fetched order; each device is checked for an
    /// exact match and then a substring match before moving to the next
    /// one, short-circuiting on the first hit. No match is a `None` result,
    /// not an error.
    pub async fn get_device_id_by_name(&mut self, device_name: &str) -> Result<Option<DeviceId>> {
        if let Some(id) = &self.device_id {
            return Ok(Some(id.clone()));
        }

        let needle = device_name.to_lowercase();
        let assets = self.get_assets().await?;

        let mut found = None;
        for asset in assets {
            let name = asset.name.to_lowercase();
            if name == needle {
                debug!(device = %asset.name, "resolved by exact match");
                found = Some(asset.device_id.clone());
                break;
            }
            if name.contains(&needle) {
                debug!(device = %asset.name, "resolved by substring match");
                found = Some(asset.device_id.clone());
                break;
            }
        }

        if let Some(id) = &found {
            self.device_id = Some(id.clone());
        }
        Ok(found)
    }

    /// Normalized action catalog for the device at `device_index`,
    /// memoized per index
    pub async fn get_actions(&mut self, device_index: usize) -> Result<Vec<String>> {
        if let Some(catalog) = self.actions.get(&device_index) {
            return Ok(catalog.clone());
        }

        let device = self.get_device(device_index).await?;
        let names: Vec<&str> = device.avail_actions.iter().map(|a| a.name.as_str()).collect();
        let catalog = actions::normalize(&names);

        self.actions.insert(device_index, catalog.clone());
        Ok(catalog)
    }

    /// Send a raw command to a device.
    ///
    /// With no device id the default device (index 0) is resolved first.
    /// Omitted arguments are rendered `null` and `0` on the wire. Returns
    /// the raw response body; callers extract the fields they need.
    pub async fn send_action(
        &mut self,
        device_id: Option<&DeviceId>,
        command: &str,
        arg1: Option<&str>,
        arg2: i64,
    ) -> Result<Value> {
        let device_id = match device_id {
            Some(id) => id.clone(),
            None => self.get_device_id(0).await?,
        };

        let args = [
            device_id.to_string(),
            command.to_string(),
            arg1.unwrap_or("null").to_string(),
            arg2.to_string(),
        ];
        self.request("device/SendCommand/", &args).await
    }

    /// Toggle the remote starter; `start` and `stop` are the same vendor
    /// action
    pub async fn remote(&mut self, device_id: Option<&DeviceId>) -> Result<Value> {
        self.send_action(device_id, "remote", None, 0).await
    }

    pub async fn start(&mut self, device_id: Option<&DeviceId>) -> Result<Value> {
        self.remote(device_id).await
    }

    pub async fn stop(&mut self, device_id: Option<&DeviceId>) -> Result<Value> {
        self.remote(device_id).await
    }

    pub async fn arm(&mut self, device_id: Option<&DeviceId>) -> Result<Value> {
        self.send_action(device_id, "arm", None, 0).await
    }

    pub async fn disarm(&mut self, device_id: Option<&DeviceId>) -> Result<Value> {
        self.send_action(device_id, "disarm", None, 0).await
    }

    pub async fn panic(&mut self, device_id: Option<&DeviceId>) -> Result<Value> {
        self.send_action(device_id, "panic", None, 0).await
    }

    pub async fn trunk(&mut self, device_id: Option<&DeviceId>) -> Result<Value> {
        self.send_action(device_id, "trunk", None, 0).await
    }

    pub async fn aux2(&mut self, device_id: Option<&DeviceId>) -> Result<Value> {
        self.send_action(device_id, "aux2", None, 0).await
    }

    pub async fn aux3(&mut self, device_id: Option<&DeviceId>) -> Result<Value> {
        self.send_action(device_id, "aux3", None, 0).await
    }

    pub async fn status(&mut self, device_id: Option<&DeviceId>) -> Result<Value> {
        self.send_action(device_id, "read_current", None, 0).await
    }

    pub async fn top_speed(&mut self, device_id: Option<&DeviceId>) -> Result<Value> {
        self.send_action(device_id, "fastest_speed", None, 0).await
    }

    pub async fn locate(&mut self, device_id: Option<&DeviceId>) -> Result<Value> {
        self.send_action(device_id, "locate", None, 0).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn client(config: Config) -> SmartStart {
        SmartStart::new(config).unwrap()
    }

    #[test]
    fn build_url_joins_args_and_appends_sessid() {
        let car = client(Config::default().with_session_id(SessionId::new("s1")));
        let args = ["100".to_string(), "arm".to_string()];
        assert_eq!(
            car.build_url("device/SendCommand/", &args),
            "https://colt.calamp-ts.com/device/SendCommand/100/arm?sessid=s1"
        );
    }

    #[test]
    fn build_url_omits_sessid_without_a_session() {
        let car = client(Config::default());
        assert_eq!(
            car.build_url("device/AdvancedSearch/", &[]),
            "https://colt.calamp-ts.com/device/AdvancedSearch/"
        );
    }

    #[test]
    fn build_url_strips_quotes_and_backslashes_then_encodes() {
        let car = client(Config::default());
        let args = [r"o'brien\".to_string(), "pa ss".to_string()];
        assert_eq!(
            car.build_url("auth/login/", &args),
            "https://colt.calamp-ts.com/auth/login/obrien/pa%20ss"
        );
    }

    #[test]
    fn build_url_tolerates_base_urls_without_trailing_slash() {
        let car = client(Config::default().with_api_url("http://localhost:9090"));
        assert_eq!(
            car.build_url("device/AdvancedSearch/", &[]),
            "http://localhost:9090/device/AdvancedSearch/"
        );
    }
}
