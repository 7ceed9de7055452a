//! HTTP and WebSocket connection handlers.

use std::sync::Arc;

use axum::{
    Form, Json,
    extract::{
        Path, State,
        ws::{Message as WsMessage, WebSocket, WebSocketUpgrade},
    },
    http::StatusCode,
    response::{Html, IntoResponse},
};
use futures_util::{sink::SinkExt, stream::StreamExt};
use serde::Deserialize;
use tokio::sync::mpsc;

use crate::domain::{ClientId, Message, RenderedMessage};

use super::render;
use super::state::AppState;

/// Form payload of `POST /room`
#[derive(Debug, Deserialize)]
pub struct RoomForm {
    pub handle: String,
}

/// One inbound chat frame (the htmx ws-send form payload). Extra fields such
/// as htmx's `HEADERS` are ignored.
#[derive(Debug, Deserialize)]
struct ChatPayload {
    chat_message: String,
}

/// `GET /` — the welcome page with the handle form.
pub async fn get_home() -> Html<String> {
    Html(render::welcome_page())
}

/// `POST /room` — exchange a display name for the room view.
pub async fn post_room(Form(form): Form<RoomForm>) -> Result<Html<String>, StatusCode> {
    match ClientId::try_from(form.handle) {
        Ok(client_id) => Ok(Html(render::chat_area(client_id.as_str()))),
        Err(e) => {
            tracing::warn!("Rejecting room join with invalid handle: {}", e);
            Err(StatusCode::BAD_REQUEST)
        }
    }
}

/// Health check endpoint
pub async fn health_check() -> Json<serde_json::Value> {
    Json(serde_json::json!({"status": "ok"}))
}

/// Debug endpoint returning the full stored history (for testing purposes)
pub async fn get_history(
    State(state): State<Arc<AppState>>,
) -> Result<Json<Vec<Message>>, StatusCode> {
    match state.service.store().scan_all().await {
        Ok(messages) => Ok(Json(messages)),
        Err(e) => {
            tracing::error!("Failed to scan message history: {}", e);
            Err(StatusCode::INTERNAL_SERVER_ERROR)
        }
    }
}

/// `GET /ws/{client_id}` — upgrade to WebSocket and drive a session.
pub async fn websocket_handler(
    ws: WebSocketUpgrade,
    State(state): State<Arc<AppState>>,
    Path(client_id): Path<String>,
) -> Result<impl IntoResponse, StatusCode> {
    let client_id = match ClientId::try_from(client_id) {
        Ok(id) => id,
        Err(e) => {
            tracing::warn!("Rejecting WebSocket connection with invalid client_id: {}", e);
            return Err(StatusCode::BAD_REQUEST);
        }
    };

    Ok(ws.on_upgrade(move |socket| handle_socket(socket, state, client_id)))
}

/// Spawn the task that drains this connection's outbound queue into the
/// socket, rendering each message to its htmx fragment on the way out.
///
/// Everything the core wants this client to see — history replay, echoes,
/// fan-out, server notices — flows through this single queue, which is what
/// keeps replay strictly before live traffic.
fn pusher_loop(
    mut rx: mpsc::UnboundedReceiver<RenderedMessage>,
    mut sender: futures_util::stream::SplitSink<WebSocket, WsMessage>,
) -> tokio::task::JoinHandle<()> {
    tokio::spawn(async move {
        while let Some(msg) = rx.recv().await {
            let html = render::message_fragment(&msg);
            if sender.send(WsMessage::Text(html.into())).await.is_err() {
                break;
            }
        }
    })
}

async fn handle_socket(socket: WebSocket, state: Arc<AppState>, client_id: ClientId) {
    let (ws_sender, mut ws_receiver) = socket.split();
    let (tx, rx) = mpsc::unbounded_channel();

    let mut session = state.service.open_session(client_id);

    // Register. Dropping a replaced sender ends the superseded session's
    // pusher loop; its read loop notices transport closure on its own.
    drop(session.connect(tx).await);

    let push_task = pusher_loop(rx, ws_sender);

    // Replay history before any live traffic. A storage failure here is
    // fatal to this session only.
    if session.sync().await.is_err() {
        push_task.abort();
        return;
    }

    // The live loop: strictly sequential per session.
    while let Some(frame) = ws_receiver.next().await {
        let frame = match frame {
            Ok(frame) => frame,
            Err(e) => {
                tracing::error!(
                    "WebSocket error for '{}': {}",
                    session.client_id().as_str(),
                    e
                );
                break;
            }
        };

        match frame {
            WsMessage::Text(text) => match serde_json::from_str::<ChatPayload>(&text) {
                Ok(payload) => session.handle_message(payload.chat_message).await,
                Err(e) => {
                    tracing::warn!(
                        "Ignoring unparseable frame from '{}': {}",
                        session.client_id().as_str(),
                        e
                    );
                }
            },
            WsMessage::Close(_) => {
                tracing::info!("Client '{}' requested close", session.client_id().as_str());
                break;
            }
            // Ping/pong is handled by the protocol layer; binary frames are
            // not part of the wire format.
            _ => {}
        }
    }

    session.close().await;
    push_task.abort();
}
