//! services/api/src/web/ws_handler.rs
//!
//! The live emotion feed. Each connection owns one `SessionState`; the editor
//! sends its text as the user types and receives the scored sample plus the
//! current dominant emotion in return.

use crate::web::{
    protocol::{ClientMessage, ServerMessage},
    state::SessionState,
};
use axum::{
    extract::{
        ws::{Message, WebSocket},
        WebSocketUpgrade,
    },
    response::Response,
    Extension,
};
use chrono::{DateTime, Utc};
use futures::{SinkExt, StreamExt};
use tracing::{debug, error, info, warn};
use uuid::Uuid;

/// The handler for upgrading HTTP requests to WebSocket connections.
pub async fn ws_handler(
    ws: WebSocketUpgrade,
    Extension(user_id): Extension<Uuid>,
) -> Response {
    ws.on_upgrade(move |socket| handle_socket(socket, user_id))
}

async fn handle_socket(socket: WebSocket, user_id: Uuid) {
    info!("New emotion feed connection for user: {}", user_id);

    let (mut sender, mut receiver) = socket.split();
    let mut session = SessionState::new(user_id);

    while let Some(Ok(msg)) = receiver.next().await {
        let reply = match msg {
            Message::Text(text) => handle_client_message(&mut session, text.as_str(), Utc::now()),
            Message::Close(_) => {
                info!("Client sent close message.");
                break;
            }
            _ => continue,
        };

        let json = match serde_json::to_string(&reply) {
            Ok(json) => json,
            Err(e) => {
                error!("Failed to serialize server message: {}", e);
                continue;
            }
        };
        if sender.send(Message::Text(json.into())).await.is_err() {
            warn!("Failed to send to client; closing the feed.");
            break;
        }
    }

    info!(
        "Emotion feed closed for user {} after {} samples.",
        session.user_id,
        session.tracker.len()
    );
}

/// Applies one client text frame to the session and builds the reply.
pub fn handle_client_message(
    session: &mut SessionState,
    raw: &str,
    at: DateTime<Utc>,
) -> ServerMessage {
    match serde_json::from_str::<ClientMessage>(raw) {
        Ok(ClientMessage::Content { text }) => match session.observe(&text, at) {
            Some(sample) => {
                debug!("Scored {} ({})", sample.emotion, sample.intensity);
                ServerMessage::Sample {
                    sample: sample.into(),
                    current: session.current().map(Into::into),
                }
            }
            None => ServerMessage::Idle {
                current: session.current().map(Into::into),
            },
        },
        Ok(ClientMessage::Reset) => {
            session.reset();
            ServerMessage::Idle { current: None }
        }
        Err(e) => {
            warn!("Failed to deserialize client message: {}", e);
            ServerMessage::Error {
                message: format!("Invalid message: {}", e),
            }
        }
    }
}
