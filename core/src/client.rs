//! Request builder, response parser, and blocking sender for the MsgGO inbox.
//!
//! # Design
//! `MsggoClient` holds the API key, the normalized base URL, and a transport.
//! Sending an event is split into `build_event` (produces an `HttpRequest`),
//! one `Transport::execute` round trip, and `parse_event` (consumes the
//! `HttpResponse`). The build and parse halves are pure, so hosts that do
//! their own I/O can skip the transport entirely.
//!
//! Responses follow the strict convention: only an explicit `"ok": true` is
//! success, and failure detail comes from the first entry of `errors`.

use std::fmt;

use serde::Serialize;
use serde_json::Value;

use crate::error::{ApiError, MsggoError, Result};
use crate::http::{HttpMethod, HttpRequest, HttpResponse};
use crate::transport::{Transport, UreqTransport};
use crate::types::{Accepted, ClientConfig, API_KEY_HEADER, INBOX_PATH};

/// Maximum number of characters of a non-JSON error body kept in diagnostics.
const BODY_EXCERPT_CHARS: usize = 200;

const UNKNOWN_ERROR_MESSAGE: &str = "Unknown error";
const UNKNOWN_ERROR_KIND: &str = "unknown_error";

/// Client for the MsgGO event ingestion API.
///
/// Carries no request-scoped state: every `send_event` call is an independent
/// round trip, and a single client may be shared across threads.
pub struct MsggoClient<T = UreqTransport> {
    api_key: String,
    base_url: String,
    user_agent: String,
    transport: T,
}

// The API key is a credential; keep it out of logs.
impl<T> fmt::Debug for MsggoClient<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MsggoClient")
            .field("api_key", &"<redacted>")
            .field("base_url", &self.base_url)
            .field("user_agent", &self.user_agent)
            .finish_non_exhaustive()
    }
}

impl MsggoClient<UreqTransport> {
    /// Client for the public API with default configuration.
    pub fn new(api_key: &str) -> Result<Self> {
        Self::with_config(api_key, ClientConfig::default())
    }

    pub fn with_config(api_key: &str, config: ClientConfig) -> Result<Self> {
        let transport = UreqTransport::new(config.timeout);
        Self::with_transport(api_key, config, transport)
    }
}

impl<T: Transport> MsggoClient<T> {
    /// Client sending through a caller-supplied transport.
    ///
    /// # Errors
    ///
    /// Returns `MsggoError::InvalidArgument` if `api_key` or the configured
    /// base URL is empty.
    pub fn with_transport(api_key: &str, config: ClientConfig, transport: T) -> Result<Self> {
        if api_key.is_empty() {
            return Err(MsggoError::InvalidArgument("API key cannot be empty".into()));
        }
        if config.base_url.is_empty() {
            return Err(MsggoError::InvalidArgument("API base URL cannot be empty".into()));
        }
        Ok(Self {
            api_key: api_key.to_string(),
            base_url: config.base_url.trim_end_matches('/').to_string(),
            user_agent: config.user_agent,
            transport,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    /// Full URL of the inbox endpoint.
    pub fn inbox_url(&self) -> String {
        format!("{}{INBOX_PATH}", self.base_url)
    }

    /// Build the POST request delivering `payload` to the inbox.
    ///
    /// The payload is sent verbatim; the API key travels only in the
    /// `X-MsgGO-Key` header.
    pub fn build_event<P>(&self, payload: &P) -> Result<HttpRequest>
    where
        P: Serialize + ?Sized,
    {
        let value =
            serde_json::to_value(payload).map_err(|e| MsggoError::Serialization(e.to_string()))?;
        if !value.is_object() {
            return Err(MsggoError::InvalidArgument(
                "event payload must serialize to a JSON object".into(),
            ));
        }
        let body =
            serde_json::to_string(&value).map_err(|e| MsggoError::Serialization(e.to_string()))?;

        Ok(HttpRequest {
            method: HttpMethod::Post,
            url: self.inbox_url(),
            headers: vec![
                ("Content-Type".to_string(), "application/json".to_string()),
                ("Accept".to_string(), "application/json".to_string()),
                (API_KEY_HEADER.to_string(), self.api_key.clone()),
                ("User-Agent".to_string(), self.user_agent.clone()),
            ],
            body: Some(body),
        })
    }

    /// Interpret an inbox response.
    pub fn parse_event(&self, response: HttpResponse) -> Result<Accepted> {
        let decoded: Value = match serde_json::from_str(&response.body) {
            Ok(value) => value,
            Err(_) if response.status >= 400 => {
                return Err(MsggoError::Transport(format!(
                    "failed to decode JSON response. status: {}. response: {}",
                    response.status,
                    excerpt(&response.body)
                )));
            }
            Err(e) => {
                return Err(MsggoError::Transport(format!(
                    "failed to decode JSON response: {e}"
                )));
            }
        };

        match decoded.get("ok").and_then(Value::as_bool) {
            None => Err(ApiError::malformed(decoded).into()),
            Some(false) => Err(rejection(response.status, decoded).into()),
            Some(true) => Ok(Accepted {
                status: response.status,
                response: decoded,
            }),
        }
    }

    /// Send one event and interpret the response.
    ///
    /// Performs exactly one round trip. On any failure the transport is
    /// closed before the error is returned; it is re-acquired on the next
    /// call.
    pub fn send_event<P>(&self, payload: &P) -> Result<Accepted>
    where
        P: Serialize + ?Sized,
    {
        let result = self.build_event(payload).and_then(|request| {
            tracing::debug!(
                url = %request.url,
                body_len = request.body.as_deref().map_or(0, str::len),
                "sending event"
            );
            let response = self.transport.execute(&request)?;
            tracing::debug!(status = response.status, "received inbox response");
            self.parse_event(response)
        });

        if let Err(err) = &result {
            match err {
                MsggoError::Api(api) => tracing::warn!(
                    status = api.status_code(),
                    kind = api.error_kind(),
                    "event rejected by API"
                ),
                other => tracing::warn!(reason = %other, "event delivery failed"),
            }
            self.transport.close();
        }
        result
    }

    /// Release the transport's connection resources. Idempotent.
    pub fn close(&self) {
        self.transport.close();
    }
}

/// Build the `ApiError` for an `ok: false` response from its first error entry.
fn rejection(status: u16, decoded: Value) -> ApiError {
    let first = decoded
        .get("errors")
        .and_then(Value::as_array)
        .and_then(|errors| errors.first());
    let field = |name: &str| first.and_then(|e| e.get(name)).and_then(Value::as_str);

    let message = field("message").unwrap_or(UNKNOWN_ERROR_MESSAGE).to_string();
    let kind = field("error").unwrap_or(UNKNOWN_ERROR_KIND).to_string();
    ApiError::new(message, status, kind, decoded)
}

/// First `BODY_EXCERPT_CHARS` characters of `body`, never splitting a char.
fn excerpt(body: &str) -> &str {
    match body.char_indices().nth(BODY_EXCERPT_CHARS) {
        Some((end, _)) => &body[..end],
        None => body,
    }
}
