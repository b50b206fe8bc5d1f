//! WebSocket subscribe and control endpoint

use std::sync::Arc;
use axum::{
    extract::{
        ws::{Message, WebSocket, WebSocketUpgrade},
        Query, State,
    },
    response::IntoResponse,
};
use futures::{sink::SinkExt, stream::StreamExt};
use serde::Deserialize;
use tokio::sync::broadcast::error::RecvError;
use tracing::{debug, error, warn};

use crate::{
    control::{apply_command, SenderCredentials, TimerCommand},
    state::AppState,
};
use super::responses::TimeSync;

/// Optional connect-time credential, passed through to the control gate.
#[derive(Debug, Deserialize)]
pub struct WsParams {
    pub key: Option<String>,
}

/// Handle GET /ws - Upgrade to the time-sync push channel
pub async fn ws_handler(
    ws: WebSocketUpgrade,
    Query(params): Query<WsParams>,
    State(state): State<Arc<AppState>>,
) -> impl IntoResponse {
    let credentials = SenderCredentials { key: params.key };
    ws.on_upgrade(move |socket| handle_socket(socket, state, credentials))
}

/// Drive one viewer connection until it closes.
async fn handle_socket(socket: WebSocket, state: Arc<AppState>, credentials: SenderCredentials) {
    let (mut sender, mut receiver) = socket.split();

    let subscriber_id = match state.add_subscriber() {
        Ok(id) => id,
        Err(e) => {
            error!("Failed to register subscriber: {}", e);
            return;
        }
    };

    // Subscribe before the initial sync so no broadcast can fall in between.
    let mut sync_rx = state.subscribe();

    // A joining viewer gets the current state exactly once, immediately,
    // instead of waiting out the broadcast cadence.
    match state.snapshot() {
        Ok(snapshot) => {
            let initial = TimeSync::from_snapshot(snapshot);
            if let Ok(json) = serde_json::to_string(&initial) {
                if sender.send(Message::Text(json)).await.is_err() {
                    debug!("Subscriber {} left before initial sync", subscriber_id);
                    if let Err(e) = state.remove_subscriber(&subscriber_id) {
                        error!("Failed to remove subscriber: {}", e);
                    }
                    return;
                }
            }
        }
        Err(e) => error!("Failed to snapshot for initial sync: {}", e),
    }

    // Forward broadcast time-sync messages to this viewer
    let mut send_task = tokio::spawn(async move {
        loop {
            match sync_rx.recv().await {
                Ok(sync) => {
                    let json = match serde_json::to_string(&sync) {
                        Ok(json) => json,
                        Err(e) => {
                            error!("Failed to encode time-sync: {}", e);
                            continue;
                        }
                    };
                    if sender.send(Message::Text(json)).await.is_err() {
                        break;
                    }
                }
                // This viewer fell behind; skip the dropped backlog and
                // resume at the latest state.
                Err(RecvError::Lagged(skipped)) => {
                    warn!("Subscriber lagged, skipped {} updates", skipped);
                }
                Err(RecvError::Closed) => break,
            }
        }
    });

    // Apply control commands arriving from this connection
    let recv_state = Arc::clone(&state);
    let mut recv_task = tokio::spawn(async move {
        while let Some(Ok(msg)) = receiver.next().await {
            match msg {
                Message::Text(text) => match TimerCommand::parse(&text) {
                    Some(command) => {
                        apply_command(&recv_state, &subscriber_id, &credentials, command);
                    }
                    None => {
                        debug!("Ignoring unrecognized control message: {}", text);
                    }
                },
                Message::Close(_) => break,
                _ => {}
            }
        }
    });

    // Whichever side finishes first tears the connection down
    tokio::select! {
        _ = &mut send_task => recv_task.abort(),
        _ = &mut recv_task => send_task.abort(),
    }

    if let Err(e) = state.remove_subscriber(&subscriber_id) {
        error!("Failed to remove subscriber: {}", e);
    }
}
