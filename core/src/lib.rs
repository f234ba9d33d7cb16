//! Blocking client for the MsgGO event ingestion API.
//!
//! # Overview
//! Sends one JSON event per call to `POST {base_url}/inbox`, authenticated by
//! the `X-MsgGO-Key` header, and turns the JSON response into either an
//! `Accepted` value or a typed `MsggoError`.
//!
//! # Design
//! - `MsggoClient::build_event` and `MsggoClient::parse_event` are pure; the
//!   network round trip sits behind the `Transport` trait (host-does-IO).
//! - `send_event` composes the three steps with exactly one round trip and
//!   no retries.
//! - `UreqTransport` acquires its agent lazily and releases it on `close()`,
//!   after a transport failure, or on drop.
//! - Types use owned `String` / `Vec` fields so the FFI crate can map them.

pub mod client;
pub mod error;
pub mod http;
pub mod transport;
pub mod types;

pub use client::MsggoClient;
pub use error::{ApiError, MsggoError, Result, MALFORMED_RESPONSE};
pub use http::{HttpMethod, HttpRequest, HttpResponse};
pub use transport::{Transport, UreqTransport};
pub use types::{Accepted, ClientConfig, API_KEY_HEADER, DEFAULT_BASE_URL, INBOX_PATH};
