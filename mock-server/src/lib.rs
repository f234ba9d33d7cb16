use std::sync::Arc;

use axum::{
    extract::State,
    http::{HeaderMap, StatusCode},
    routing::post,
    Json, Router,
};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tokio::{net::TcpListener, sync::RwLock};

pub const API_KEY_HEADER: &str = "x-msggo-key";

/// One entry of the `errors` array in a rejection.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct ErrorEntry {
    pub message: String,
    pub error: String,
}

/// Body of every inbox response.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct InboxReply {
    pub ok: bool,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub errors: Vec<ErrorEntry>,
}

impl InboxReply {
    fn accepted() -> Self {
        Self {
            ok: true,
            errors: Vec::new(),
        }
    }

    fn rejected(message: &str, error: &str) -> Self {
        Self {
            ok: false,
            errors: vec![ErrorEntry {
                message: message.to_string(),
                error: error.to_string(),
            }],
        }
    }
}

/// Shared state of the mock inbox: the accepted key and every recorded event.
#[derive(Clone, Debug)]
pub struct Inbox {
    api_key: Arc<str>,
    events: Arc<RwLock<Vec<Value>>>,
}

impl Inbox {
    pub fn new(api_key: &str) -> Self {
        Self {
            api_key: Arc::from(api_key),
            events: Arc::default(),
        }
    }

    /// Events accepted so far, in arrival order.
    pub async fn events(&self) -> Vec<Value> {
        self.events.read().await.clone()
    }
}

pub fn app(api_key: &str) -> Router {
    app_with_inbox(Inbox::new(api_key))
}

pub fn app_with_inbox(inbox: Inbox) -> Router {
    Router::new()
        .route("/inbox", post(receive_event))
        .with_state(inbox)
}

pub async fn run(listener: TcpListener, inbox: Inbox) -> Result<(), std::io::Error> {
    axum::serve(listener, app_with_inbox(inbox)).await
}

async fn receive_event(
    State(inbox): State<Inbox>,
    headers: HeaderMap,
    body: String,
) -> (StatusCode, Json<InboxReply>) {
    let key = headers.get(API_KEY_HEADER).and_then(|v| v.to_str().ok());
    if key != Some(&*inbox.api_key) {
        tracing::info!("rejected event: invalid key");
        return (
            StatusCode::UNAUTHORIZED,
            Json(InboxReply::rejected("Invalid key", "auth_error")),
        );
    }

    let event = match serde_json::from_str::<Value>(&body) {
        Ok(event @ Value::Object(_)) => event,
        _ => {
            tracing::info!("rejected event: payload is not a JSON object");
            return (
                StatusCode::BAD_REQUEST,
                Json(InboxReply::rejected(
                    "Payload must be a JSON object",
                    "validation_error",
                )),
            );
        }
    };

    inbox.events.write().await.push(event);
    tracing::debug!("accepted event");
    (StatusCode::OK, Json(InboxReply::accepted()))
}
