/// Realtime channel endpoint (WebSocket)
///
/// Clients connect with their bearer token as a query parameter and
/// receive event envelopes for the topics they subscribe to. Every
/// session is implicitly subscribed to its own `user:<uid>` topic, so
/// notifications arrive without an explicit subscription.
///
/// # Endpoint
///
/// `GET /api/realtime?token=<jwt>`
///
/// The handshake is rejected before the upgrade when the token is absent
/// (401) or fails verification (403), mirroring the HTTP middleware.
///
/// # Messages
///
/// Server to client, one JSON envelope per text frame:
///
/// ```json
/// {"topic": "task:<uid>", "event": "task_status_updated",
///  "payload": {"task_uid": "<uid>", "status": "in_progress",
///              "updated_at": "2025-01-04T12:00:00Z"}}
/// ```
///
/// Client to server:
///
/// ```json
/// {"action": "subscribe", "topic": "task:<uid>"}
/// {"action": "unsubscribe", "topic": "task:<uid>"}
/// ```
///
/// # Delivery
///
/// Fire-and-forget. A session that falls behind the broadcast channel
/// capacity loses the lagged envelopes; the client is expected to
/// re-fetch state after reconnecting. Disconnecting simply removes the
/// session from the fan-out; nothing in flight is cancelled.
use crate::{app::AppState, error::ApiError};
use axum::{
    extract::{
        ws::{Message, WebSocket, WebSocketUpgrade},
        Query, State,
    },
    response::Response,
};
use serde::Deserialize;
use std::collections::HashSet;
use taskboard_shared::{
    auth::middleware::{authenticate_query, AuthUser},
    events::{ClientCommand, Topic},
};
use tokio::sync::broadcast::error::RecvError;

/// Handshake query parameters
#[derive(Debug, Deserialize)]
pub struct RealtimeQuery {
    /// Bearer token issued at login
    pub token: Option<String>,
}

/// Realtime channel handler
///
/// Authenticates the handshake, then upgrades and runs the session loop.
pub async fn realtime(
    State(state): State<AppState>,
    Query(query): Query<RealtimeQuery>,
    ws: WebSocketUpgrade,
) -> Result<Response, ApiError> {
    let user = authenticate_query(query.token.as_deref(), state.jwt_secret())?;

    tracing::info!(user_uid = %user.uid, "Realtime session connecting");

    let events = state.events.clone();
    Ok(ws.on_upgrade(move |socket| handle_session(socket, events, user)))
}

/// Runs one realtime session until the client disconnects
///
/// Forwards envelopes whose topic is in the session's subscription set
/// and applies subscribe/unsubscribe commands from the client.
async fn handle_session(mut socket: WebSocket, events: crate::broadcast::Broadcaster, user: AuthUser) {
    let mut rx = events.subscribe();

    let mut subscriptions: HashSet<Topic> = HashSet::new();
    subscriptions.insert(Topic::User(user.uid));

    loop {
        tokio::select! {
            envelope = rx.recv() => {
                match envelope {
                    Ok(envelope) => {
                        if !subscriptions.contains(&envelope.topic) {
                            continue;
                        }

                        let text = match serde_json::to_string(&envelope) {
                            Ok(text) => text,
                            Err(e) => {
                                tracing::error!(error = %e, "Failed to serialize envelope");
                                continue;
                            }
                        };

                        if socket.send(Message::Text(text)).await.is_err() {
                            break;
                        }
                    }
                    Err(RecvError::Lagged(missed)) => {
                        // The client re-fetches after a gap; just keep going.
                        tracing::warn!(
                            user_uid = %user.uid,
                            missed,
                            "Realtime session lagged behind the broadcast channel"
                        );
                    }
                    Err(RecvError::Closed) => break,
                }
            }

            msg = socket.recv() => {
                match msg {
                    Some(Ok(Message::Text(text))) => {
                        match serde_json::from_str::<ClientCommand>(&text) {
                            Ok(ClientCommand::Subscribe { topic }) => {
                                tracing::debug!(user_uid = %user.uid, topic = %topic, "Subscribed");
                                subscriptions.insert(topic);
                            }
                            Ok(ClientCommand::Unsubscribe { topic }) => {
                                tracing::debug!(user_uid = %user.uid, topic = %topic, "Unsubscribed");
                                subscriptions.remove(&topic);
                            }
                            Err(e) => {
                                tracing::debug!(error = %e, "Ignoring malformed client message");
                            }
                        }
                    }
                    Some(Ok(Message::Close(_))) | None => break,
                    Some(Ok(_)) => {
                        // Ping/pong handled by axum; binary frames ignored.
                    }
                    Some(Err(e)) => {
                        tracing::debug!(error = %e, "Realtime session read error");
                        break;
                    }
                }
            }
        }
    }

    tracing::info!(user_uid = %user.uid, "Realtime session disconnected");
}
