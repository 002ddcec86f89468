//! WebSocket handler for real-time progress updates

use crate::AppState;
use axum::{
    extract::{
        ws::{Message, WebSocket, WebSocketUpgrade},
        Query, State,
    },
    response::IntoResponse,
};
use futures_util::{SinkExt, StreamExt};
use serde::Deserialize;
use std::sync::Arc;
use tokio::sync::broadcast::error::RecvError;
use tracing::{error, info, warn};

/// Optional filter on the progress stream
#[derive(Debug, Default, Deserialize)]
pub struct ProgressFilter {
    /// Only forward updates for this session
    pub session: Option<String>,
}

/// WebSocket upgrade handler
pub async fn ws_handler(
    ws: WebSocketUpgrade,
    State(state): State<Arc<AppState>>,
    Query(filter): Query<ProgressFilter>,
) -> impl IntoResponse {
    ws.on_upgrade(move |socket| handle_socket(socket, state, filter))
}

/// Handle WebSocket connection
async fn handle_socket(socket: WebSocket, state: Arc<AppState>, filter: ProgressFilter) {
    let (mut sender, mut receiver) = socket.split();

    // Subscribe to progress updates
    let mut progress_rx = state.sessions.subscribe();

    info!("WebSocket client connected");

    // Spawn task to forward progress updates to client
    let send_task = tokio::spawn(async move {
        loop {
            let update = match progress_rx.recv().await {
                Ok(update) => update,
                Err(RecvError::Lagged(skipped)) => {
                    warn!("WebSocket client lagging, skipped {} updates", skipped);
                    continue;
                }
                Err(RecvError::Closed) => break,
            };

            if let Some(session) = &filter.session {
                if &update.session_id != session {
                    continue;
                }
            }

            let msg = match serde_json::to_string(&update) {
                Ok(msg) => msg,
                Err(e) => {
                    error!("Failed to encode progress update: {}", e);
                    continue;
                }
            };
            if sender.send(Message::Text(msg.into())).await.is_err() {
                break;
            }
        }
    });

    // Drain incoming messages until the client goes away
    while let Some(msg) = receiver.next().await {
        match msg {
            Ok(Message::Close(_)) => {
                info!("WebSocket client disconnected");
                break;
            }
            Err(e) => {
                error!("WebSocket error: {}", e);
                break;
            }
            _ => {}
        }
    }

    // Cancel the send task when client disconnects
    send_task.abort();
}
