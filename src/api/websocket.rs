//! WebSocket stream of game events
//!
//! Every connected client receives the current snapshot as a `tick` event,
//! followed by each [`GameEvent`] the runtime publishes.

use super::handlers::AppState;
use crate::game::GameEvent;
use axum::{
    extract::{
        ws::{Message, WebSocket, WebSocketUpgrade},
        State,
    },
    response::Response,
};
use futures_util::{SinkExt, StreamExt};
use std::sync::{
    atomic::{AtomicU64, Ordering},
    Arc,
};
use tokio::sync::broadcast::error::RecvError;
use tracing::{debug, error, info, warn};

static NEXT_CLIENT_ID: AtomicU64 = AtomicU64::new(1);

/// GET /ws
pub async fn websocket_handler(ws: WebSocketUpgrade, State(state): State<Arc<AppState>>) -> Response {
    ws.on_upgrade(move |socket| handle_connection(socket, state))
}

fn encode(event: &GameEvent) -> Option<Message> {
    match serde_json::to_string(event) {
        Ok(text) => Some(Message::Text(text)),
        Err(e) => {
            error!("Failed to serialize event: {}", e);
            None
        }
    }
}

async fn handle_connection(socket: WebSocket, state: Arc<AppState>) {
    let client_id = NEXT_CLIENT_ID.fetch_add(1, Ordering::Relaxed);
    info!("WebSocket client {} connected", client_id);

    let (mut sender, mut receiver) = socket.split();
    // subscribe before reading the snapshot so nothing falls in between
    let mut rx = state.game.subscribe();

    let welcome = GameEvent::Tick {
        snapshot: state.game.snapshot(),
    };
    if let Some(message) = encode(&welcome) {
        if let Err(e) = sender.send(message).await {
            warn!("Failed to send snapshot to client {}: {}", client_id, e);
            return;
        }
    }

    let mut send_task = tokio::spawn(async move {
        loop {
            match rx.recv().await {
                Ok(event) => {
                    let Some(message) = encode(&event) else { continue };
                    if sender.send(message).await.is_err() {
                        break;
                    }
                }
                Err(RecvError::Lagged(skipped)) => {
                    warn!("WebSocket client {} lagged, skipped {} events", client_id, skipped);
                }
                Err(RecvError::Closed) => break,
            }
        }
    });

    let mut receive_task = tokio::spawn(async move {
        while let Some(msg) = receiver.next().await {
            match msg {
                Ok(Message::Close(_)) => break,
                Ok(Message::Text(text)) => {
                    debug!("Ignoring message from client {}: {}", client_id, text);
                }
                Ok(_) => {}
                Err(e) => {
                    warn!("WebSocket error from client {}: {}", client_id, e);
                    break;
                }
            }
        }
    });

    tokio::select! {
        _ = &mut send_task => receive_task.abort(),
        _ = &mut receive_task => send_task.abort(),
    }

    info!("WebSocket client {} disconnected", client_id);
}
