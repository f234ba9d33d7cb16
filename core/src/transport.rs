//! Blocking HTTP transport executing `HttpRequest` values.
//!
//! # Design
//! `Transport` is the only seam that touches the network. `UreqTransport`
//! acquires its `ureq::Agent` lazily on first use and drops it on `close()`,
//! so a client that never sends holds no connection resources. The agent is
//! cloned out of the lock before the request runs; concurrent calls share
//! the agent's internal pool without serializing on the mutex.

use std::fmt;
use std::sync::{Mutex, PoisonError};
use std::time::Duration;

use ureq::Agent;

use crate::error::{MsggoError, Result};
use crate::http::{HttpMethod, HttpRequest, HttpResponse};

/// Executes one HTTP round trip.
pub trait Transport: Send + Sync {
    /// Send `request` and return the response, whatever its status.
    ///
    /// Returns `MsggoError::Transport` when no response was received.
    fn execute(&self, request: &HttpRequest) -> Result<HttpResponse>;

    /// Release any held connection resources. Must be idempotent.
    fn close(&self) {}
}

/// `Transport` backed by a lazily created `ureq::Agent`.
#[derive(Default)]
pub struct UreqTransport {
    timeout: Option<Duration>,
    agent: Mutex<Option<Agent>>,
}

impl fmt::Debug for UreqTransport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("UreqTransport")
            .field("timeout", &self.timeout)
            .field("open", &self.is_open())
            .finish()
    }
}

impl UreqTransport {
    pub fn new(timeout: Option<Duration>) -> Self {
        Self {
            timeout,
            agent: Mutex::new(None),
        }
    }

    /// Whether an agent is currently held.
    pub fn is_open(&self) -> bool {
        self.agent.lock().unwrap_or_else(PoisonError::into_inner).is_some()
    }

    fn agent(&self) -> Agent {
        let mut slot = self.agent.lock().unwrap_or_else(PoisonError::into_inner);
        slot.get_or_insert_with(|| {
            tracing::debug!(timeout = ?self.timeout, "creating HTTP agent");
            // 4xx/5xx must come back as data so the client can read the error body.
            Agent::config_builder()
                .timeout_global(self.timeout)
                .http_status_as_error(false)
                .build()
                .new_agent()
        })
        .clone()
    }
}

impl Transport for UreqTransport {
    fn execute(&self, request: &HttpRequest) -> Result<HttpResponse> {
        let agent = self.agent();

        let mut builder = match request.method {
            HttpMethod::Post => agent.post(&request.url),
        };
        for (name, value) in &request.headers {
            builder = builder.header(name.as_str(), value.as_str());
        }

        let body = request.body.as_deref().unwrap_or_default();
        let mut response = builder
            .send(body.as_bytes())
            .map_err(|e| MsggoError::Transport(e.to_string()))?;

        let status = response.status().as_u16();
        let headers = response
            .headers()
            .iter()
            .map(|(k, v)| {
                (
                    k.as_str().to_string(),
                    String::from_utf8_lossy(v.as_bytes()).into_owned(),
                )
            })
            .collect();
        let body = response
            .body_mut()
            .read_to_string()
            .map_err(|e| MsggoError::Transport(format!("failed to read response body: {e}")))?;

        Ok(HttpResponse {
            status,
            headers,
            body,
        })
    }

    fn close(&self) {
        let released = self
            .agent
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take();
        if released.is_some() {
            tracing::debug!("released HTTP agent");
        }
    }
}
