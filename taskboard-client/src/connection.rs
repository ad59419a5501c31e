/// Realtime connection
///
/// WebSocket client that connects to `/api/realtime` with the bearer
/// token as a query parameter, forwards inbound envelopes into the
/// [`ClientStore`](crate::store::ClientStore), and reconnects with a
/// fixed backoff when the connection drops.
///
/// Topic subscriptions are managed through a [`RealtimeHandle`]; the
/// connection re-sends the current subscription set after every
/// reconnect. Events emitted while the client was disconnected are gone;
/// callers re-fetch the data they care about when `connected` flips back
/// to true.
///
/// # Protocol
///
/// 1. Connect to `ws://<host>/api/realtime?token=<jwt>`
/// 2. Send a subscribe message per followed topic
/// 3. Apply inbound envelopes to the store
/// 4. Reconnect after 5 seconds on disconnect
use futures::{SinkExt, StreamExt};
use std::collections::HashSet;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tokio_tungstenite::tungstenite::Message;
use tokio_tungstenite::connect_async;

use taskboard_shared::events::{ClientCommand, Envelope, Topic};

use crate::store::ClientStore;

/// Delay between reconnect attempts
const RECONNECT_DELAY: Duration = Duration::from_secs(5);

/// Handle for controlling a running [`RealtimeConnection`]
#[derive(Debug, Clone)]
pub struct RealtimeHandle {
    cmd_tx: mpsc::UnboundedSender<ClientCommand>,
    shutdown: CancellationToken,
}

impl RealtimeHandle {
    /// Starts receiving events published to `topic`
    pub fn subscribe(&self, topic: Topic) {
        let _ = self.cmd_tx.send(ClientCommand::Subscribe { topic });
    }

    /// Stops receiving events published to `topic`
    pub fn unsubscribe(&self, topic: Topic) {
        let _ = self.cmd_tx.send(ClientCommand::Unsubscribe { topic });
    }

    /// Shuts the connection down
    pub fn shutdown(&self) {
        self.shutdown.cancel();
    }
}

/// Realtime connection manager
///
/// Owns the reconnect loop. Create one with [`RealtimeConnection::new`],
/// keep the handle, and drive [`run`](RealtimeConnection::run) in a
/// spawned task.
pub struct RealtimeConnection {
    url: String,
    store: Arc<Mutex<ClientStore>>,
    cmd_rx: mpsc::UnboundedReceiver<ClientCommand>,
    shutdown: CancellationToken,
    topics: HashSet<Topic>,
}

impl RealtimeConnection {
    /// Creates a connection for an HTTP base URL and bearer token
    ///
    /// The URL scheme is rewritten to ws/wss.
    pub fn new(
        base_url: &str,
        token: &str,
        store: Arc<Mutex<ClientStore>>,
    ) -> (Self, RealtimeHandle) {
        let ws_base = base_url
            .trim_end_matches('/')
            .replacen("https://", "wss://", 1)
            .replacen("http://", "ws://", 1);
        let url = format!("{}/api/realtime?token={}", ws_base, token);

        let (cmd_tx, cmd_rx) = mpsc::unbounded_channel();
        let shutdown = CancellationToken::new();

        let handle = RealtimeHandle {
            cmd_tx,
            shutdown: shutdown.clone(),
        };

        let connection = Self {
            url,
            store,
            cmd_rx,
            shutdown,
            topics: HashSet::new(),
        };

        (connection, handle)
    }

    /// Runs the connection until shutdown
    ///
    /// Reconnects with a fixed delay whenever the server goes away. Call
    /// this in a spawned task.
    pub async fn run(mut self) {
        loop {
            match self.connect_and_run().await {
                Ok(()) => {
                    tracing::info!("Realtime connection shut down");
                    break;
                }
                Err(e) => {
                    self.store.lock().unwrap().set_connected(false);
                    tracing::warn!(error = %e, "Realtime connection lost, reconnecting in 5s");
                }
            }

            tokio::select! {
                _ = self.shutdown.cancelled() => break,
                _ = tokio::time::sleep(RECONNECT_DELAY) => {}
            }
        }

        self.store.lock().unwrap().set_connected(false);
    }

    /// Connects once and runs the message loop
    ///
    /// Returns Ok on an orderly shutdown and Err when the connection
    /// should be retried.
    async fn connect_and_run(&mut self) -> anyhow::Result<()> {
        tracing::debug!("Connecting to realtime channel");

        let (ws_stream, _response) = connect_async(&self.url).await?;
        let (mut write, mut read) = ws_stream.split();

        self.store.lock().unwrap().set_connected(true);
        tracing::info!("Realtime channel connected");

        // Re-establish the subscription set; the server only remembers
        // subscriptions per connection.
        for topic in &self.topics {
            let msg = serde_json::to_string(&ClientCommand::Subscribe { topic: *topic })?;
            write.send(Message::Text(msg)).await?;
        }

        loop {
            tokio::select! {
                _ = self.shutdown.cancelled() => {
                    let _ = write.send(Message::Close(None)).await;
                    return Ok(());
                }

                cmd = self.cmd_rx.recv() => {
                    let Some(cmd) = cmd else {
                        // All handles dropped; treat as shutdown.
                        let _ = write.send(Message::Close(None)).await;
                        return Ok(());
                    };

                    match &cmd {
                        ClientCommand::Subscribe { topic } => {
                            self.topics.insert(*topic);
                        }
                        ClientCommand::Unsubscribe { topic } => {
                            self.topics.remove(topic);
                        }
                    }

                    let msg = serde_json::to_string(&cmd)?;
                    write.send(Message::Text(msg)).await?;
                }

                msg = read.next() => {
                    match msg {
                        Some(Ok(Message::Text(text))) => {
                            match serde_json::from_str::<Envelope>(&text) {
                                Ok(envelope) => {
                                    self.store.lock().unwrap().apply(&envelope);
                                }
                                Err(e) => {
                                    tracing::debug!(error = %e, "Ignoring malformed envelope");
                                }
                            }
                        }
                        Some(Ok(Message::Ping(data))) => {
                            write.send(Message::Pong(data)).await?;
                        }
                        Some(Ok(Message::Close(_))) | None => {
                            anyhow::bail!("Server closed connection");
                        }
                        Some(Err(e)) => {
                            anyhow::bail!("WebSocket error: {}", e);
                        }
                        _ => {}
                    }
                }
            }
        }
    }
}
