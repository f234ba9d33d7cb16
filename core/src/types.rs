//! Configuration and result types for the MsgGO client.

use std::time::Duration;

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Origin used when no base URL is configured.
pub const DEFAULT_BASE_URL: &str = "https://msggo.io";

/// Path of the event ingestion endpoint, appended to the base URL.
pub const INBOX_PATH: &str = "/inbox";

/// Header carrying the raw API key.
pub const API_KEY_HEADER: &str = "X-MsgGO-Key";

const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Client configuration.
///
/// Every field has a default, so a partial config section deserializes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClientConfig {
    /// Origin of the MsgGO API. Trailing slashes are stripped.
    pub base_url: String,
    /// Overall per-request timeout. `None` leaves the transport unbounded.
    pub timeout: Option<Duration>,
    /// Value of the `User-Agent` header.
    pub user_agent: String,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            timeout: Some(DEFAULT_TIMEOUT),
            user_agent: concat!("msggo-rust/", env!("CARGO_PKG_VERSION")).to_string(),
        }
    }
}

impl ClientConfig {
    pub fn base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    pub fn timeout(mut self, timeout: Option<Duration>) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = user_agent.into();
        self
    }
}

/// An event accepted by the API (`ok: true`).
#[derive(Debug, Clone, PartialEq)]
pub struct Accepted {
    /// HTTP status of the response.
    pub status: u16,
    /// The decoded response body.
    pub response: Value,
}
