//! WebSocket server and wire envelopes
//!
//! One long-lived connection per client. On accept the server sends the
//! capability advertisement once, then answers each `invoke` envelope with
//! exactly one `response` envelope carrying the same correlation id.
//! Invocations are dispatched as independent tasks, so several may be in
//! flight on one connection and their responses may interleave in any
//! order. Malformed input produces an `error` envelope; the connection
//! stays open until the client closes it.

use axum::{
    extract::{
        ws::{Message, WebSocket, WebSocketUpgrade},
        State,
    },
    response::IntoResponse,
    routing::get,
    Router,
};
use futures_util::{FutureExt, SinkExt, StreamExt};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use tokio::sync::{mpsc, RwLock};

use crate::config::Config;
use crate::dispatch::{Dispatcher, Session};
use crate::types::SearchSettings;

pub const PROTOCOL_VERSION: &str = "1.0";

/// Incoming WebSocket message from a client
#[derive(Debug, Deserialize)]
pub struct InvokeRequest {
    /// Opaque correlation id, echoed back verbatim
    pub id: Value,
    /// Tool name to dispatch on
    pub tool: String,
    #[serde(default)]
    pub params: Value,
}

/// Outgoing WebSocket message to a client
#[derive(Debug, Serialize)]
#[serde(tag = "type")]
pub enum ServerMessage {
    /// Capability advertisement, sent once at connect time
    #[serde(rename = "capabilities")]
    Capabilities { version: String, capabilities: Value },
    /// Answer to one invoke, carrying its correlation id
    #[serde(rename = "response")]
    Response { id: Value, result: Value },
    /// Transport-level failure (malformed input, dispatch panic)
    #[serde(rename = "error")]
    Error { error: ErrorBody },
}

#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub code: String,
    pub message: String,
}

#[derive(Clone)]
struct AppState {
    dispatcher: Arc<Dispatcher>,
    session_defaults: SearchSettings,
}

/// Build the router serving the WebSocket endpoint and a health probe
pub fn app(config: &Config) -> anyhow::Result<Router> {
    let state = AppState {
        dispatcher: Arc::new(Dispatcher::new(config)?),
        session_defaults: config.session_defaults(),
    };

    Ok(Router::new()
        .route("/", get(ws_handler))
        .route("/health", get(|| async { "ok" }))
        .with_state(state))
}

/// Bind the configured port and serve until the process is stopped
pub async fn run(config: Config) -> anyhow::Result<()> {
    let port = config.server.port;
    let app = app(&config)?;

    let listener = tokio::net::TcpListener::bind(("0.0.0.0", port)).await?;
    tracing::info!("Google Images MCP server running on port {}", port);

    axum::serve(listener, app).await?;
    Ok(())
}

async fn ws_handler(ws: WebSocketUpgrade, State(state): State<AppState>) -> impl IntoResponse {
    ws.on_upgrade(move |socket| handle_socket(socket, state))
}

/// Handle one WebSocket connection
async fn handle_socket(socket: WebSocket, state: AppState) {
    tracing::info!("Client connected");

    let (mut sender, mut receiver) = socket.split();

    // All outbound traffic funnels through one writer task so concurrent
    // invocations never interleave frames
    let (tx, mut rx) = mpsc::channel::<ServerMessage>(64);
    let writer = tokio::spawn(async move {
        while let Some(msg) = rx.recv().await {
            let json = match serde_json::to_string(&msg) {
                Ok(j) => j,
                Err(e) => {
                    tracing::error!("Failed to serialize outbound message: {}", e);
                    continue;
                }
            };
            if sender.send(Message::Text(json.into())).await.is_err() {
                break;
            }
        }
    });

    let capabilities = ServerMessage::Capabilities {
        version: PROTOCOL_VERSION.to_string(),
        capabilities: Dispatcher::capabilities(),
    };
    if tx.send(capabilities).await.is_err() {
        return;
    }

    // Settings live for the duration of the connection; every invocation
    // on it, concurrent ones included, shares them
    let session: Session = Arc::new(RwLock::new(state.session_defaults.clone()));

    while let Some(Ok(msg)) = receiver.next().await {
        match msg {
            Message::Text(text) => {
                handle_text(&text, &state.dispatcher, &session, &tx).await;
            }
            Message::Close(_) => {
                tracing::info!("Client disconnected");
                break;
            }
            _ => {}
        }
    }

    drop(tx);
    let _ = writer.await;
}

/// Parse one text frame and, for an invoke envelope, spawn its dispatch
async fn handle_text(
    text: &str,
    dispatcher: &Arc<Dispatcher>,
    session: &Session,
    tx: &mpsc::Sender<ServerMessage>,
) {
    let value: Value = match serde_json::from_str(text) {
        Ok(v) => v,
        Err(e) => {
            tracing::warn!("Malformed message: {}", e);
            send_internal_error(tx, format!("Malformed message: {e}")).await;
            return;
        }
    };

    match value.get("type").and_then(Value::as_str) {
        Some("invoke") => {}
        other => {
            // Well-formed messages of other types carry nothing for us
            tracing::debug!("Ignoring message of type {:?}", other);
            return;
        }
    }

    let request: InvokeRequest = match serde_json::from_value(value) {
        Ok(r) => r,
        Err(e) => {
            tracing::warn!("Malformed invoke envelope: {}", e);
            send_internal_error(tx, format!("Malformed invoke envelope: {e}")).await;
            return;
        }
    };

    let dispatcher = Arc::clone(dispatcher);
    let session = Arc::clone(session);
    let tx = tx.clone();

    tokio::spawn(async move {
        let InvokeRequest { id, tool, params } = request;

        let outcome = AssertUnwindSafe(dispatcher.invoke(&tool, params, &session))
            .catch_unwind()
            .await;

        let reply = match outcome {
            Ok(result) => ServerMessage::Response { id, result },
            Err(_) => {
                tracing::error!("Tool '{}' panicked", tool);
                ServerMessage::Error {
                    error: ErrorBody {
                        code: "internal_error".to_string(),
                        message: format!("Tool '{tool}' failed unexpectedly"),
                    },
                }
            }
        };

        let _ = tx.send(reply).await;
    });
}

async fn send_internal_error(tx: &mpsc::Sender<ServerMessage>, message: String) {
    let _ = tx
        .send(ServerMessage::Error {
            error: ErrorBody {
                code: "internal_error".to_string(),
                message,
            },
        })
        .await;
}
