use crate::error::ClientError;
use crate::types::{EnvConfig, StepOutcome, TransactionAction};
use reqwest::blocking::{Client, Response};
use serde::de::DeserializeOwned;
use std::collections::HashMap;
use std::time::Duration;
use tracing::{debug, warn};

/// Where the simulation service listens by default.
pub const DEFAULT_BASE_URL: &str = "http://127.0.0.1:8080";

const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// The service answers some calls with plain text where JSON is expected.
/// Such bodies decode as the fallback value instead of failing the call.
fn decode_or<T: DeserializeOwned>(body: &str, endpoint: &str, fallback: T) -> T {
    match serde_json::from_str(body) {
        Ok(value) => value,
        Err(err) => {
            warn!(%err, endpoint, "response failed to decode, substituting defaults");
            fallback
        }
    }
}

/// Blocking client for the MASFD service. One method per endpoint, no retries
/// and no shared state beyond the connection pool inside `reqwest`.
#[derive(Debug, Clone)]
pub struct MasfdClient {
    client: Client,
    base_url: String,
}

impl Default for MasfdClient {
    fn default() -> Self {
        Self::new()
    }
}

impl MasfdClient {
    pub fn new() -> Self {
        Self::with_base_url(DEFAULT_BASE_URL)
    }

    pub fn with_base_url(base_url: impl Into<String>) -> Self {
        let client = Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .expect("Failed to create HTTP client");
        Self {
            client,
            base_url: base_url.into(),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn ensure_success(response: Response) -> Result<Response, ClientError> {
        let status = response.status();
        if status.is_success() {
            Ok(response)
        } else {
            let body = response.text().unwrap_or_default();
            Err(ClientError::service(status.as_u16(), body))
        }
    }

    /// `POST /createMASFDEnv`, answered with a plain text acknowledgment.
    pub fn create_env(&self, config: &EnvConfig) -> Result<String, ClientError> {
        let url = format!("{}/createMASFDEnv", self.base_url);
        debug!(?config, "creating environment");
        let response = self.client.post(&url).json(config).send()?;
        Ok(Self::ensure_success(response)?.text()?)
    }

    /// `GET /getState`, a JSON array of observation features. A body that
    /// fails to decode counts as an empty state rather than an error.
    pub fn get_state(&self) -> Result<Vec<f32>, ClientError> {
        let url = format!("{}/getState", self.base_url);
        let body = Self::ensure_success(self.client.get(&url).send()?)?.text()?;
        Ok(decode_or(&body, "getState", Vec::new()))
    }

    /// `POST /step` with a map of transaction id to flag decision. Decode
    /// failures substitute a default outcome, matching `get_state`.
    pub fn step(
        &self,
        actions: &HashMap<u64, TransactionAction>,
    ) -> Result<StepOutcome, ClientError> {
        let url = format!("{}/step", self.base_url);
        debug!(flags = actions.len(), "stepping environment");
        let body = Self::ensure_success(self.client.post(&url).json(actions).send()?)?.text()?;
        Ok(decode_or(&body, "step", StepOutcome::default()))
    }

    /// `GET /reset`, answered with a plain text acknowledgment.
    pub fn reset(&self) -> Result<String, ClientError> {
        let url = format!("{}/reset", self.base_url);
        Ok(Self::ensure_success(self.client.get(&url).send()?)?.text()?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn client_creation() {
        let client = MasfdClient::new();
        assert_eq!(client.base_url(), DEFAULT_BASE_URL);

        let client = MasfdClient::with_base_url("http://localhost:9999");
        assert_eq!(client.base_url(), "http://localhost:9999");
    }

    #[test]
    fn non_json_state_body_becomes_empty_state() {
        let state: Vec<f32> = decode_or("environment created", "getState", Vec::new());
        assert!(state.is_empty());

        let state: Vec<f32> = decode_or("[0.5, 1.0]", "getState", Vec::new());
        assert_eq!(state, vec![0.5, 1.0]);
    }

    #[test]
    fn non_json_step_body_becomes_default_outcome() {
        let outcome: StepOutcome = decode_or("ok", "step", StepOutcome::default());
        assert!(outcome.state.is_empty());
        assert!(outcome.rewards.is_empty());
        assert!(!outcome.done);
    }
}
