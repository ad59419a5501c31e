/// Realtime event fan-out
///
/// A single process-wide publish point for realtime events. The
/// broadcaster is owned by `AppState` and handed to handlers and realtime
/// sessions explicitly, so tests can subscribe to it and assert on what
/// was published.
///
/// Built on `tokio::sync::broadcast`: every subscribed session receives
/// every published envelope and filters by its own topic subscriptions.
/// Delivery is best-effort; there is no acknowledgment, no retry, and no
/// persistence. A session that falls behind the channel capacity loses
/// the lagged envelopes and the client recovers by re-fetching.
///
/// # Example
///
/// ```
/// use taskboard_api::broadcast::Broadcaster;
/// use taskboard_shared::events::{RealtimeEvent, TaskStatusUpdated, Topic};
/// use chrono::Utc;
/// use uuid::Uuid;
///
/// # #[tokio::main]
/// # async fn main() {
/// let broadcaster = Broadcaster::default();
/// let mut rx = broadcaster.subscribe();
///
/// let task_uid = Uuid::new_v4();
/// broadcaster.publish(
///     Topic::Task(task_uid),
///     RealtimeEvent::TaskStatusUpdated(TaskStatusUpdated {
///         task_uid,
///         status: "done".to_string(),
///         updated_at: Utc::now(),
///     }),
/// );
///
/// let envelope = rx.recv().await.unwrap();
/// assert_eq!(envelope.topic, Topic::Task(task_uid));
/// # }
/// ```
use tokio::sync::broadcast;

use taskboard_shared::events::{Envelope, RealtimeEvent, Topic};

/// Default capacity of the broadcast channel
///
/// Sessions that lag behind by more than this many envelopes lose the
/// oldest ones.
const DEFAULT_CAPACITY: usize = 256;

/// Process-wide realtime event fan-out
#[derive(Debug, Clone)]
pub struct Broadcaster {
    tx: broadcast::Sender<Envelope>,
}

impl Default for Broadcaster {
    fn default() -> Self {
        Self::with_capacity(DEFAULT_CAPACITY)
    }
}

impl Broadcaster {
    /// Creates a broadcaster with an explicit channel capacity
    pub fn with_capacity(capacity: usize) -> Self {
        let (tx, _) = broadcast::channel(capacity);
        Self { tx }
    }

    /// Publishes an event to a topic
    ///
    /// Returns the number of sessions the envelope was delivered to.
    /// Publishing with no connected sessions is not an error.
    pub fn publish(&self, topic: Topic, event: RealtimeEvent) -> usize {
        let name = event.name();
        let delivered = self.tx.send(Envelope { topic, event }).unwrap_or(0);

        tracing::debug!(event = name, topic = %topic, delivered, "Published realtime event");

        delivered
    }

    /// Subscribes to the event stream
    ///
    /// The receiver observes every envelope published after this call;
    /// topic filtering is up to the subscriber.
    pub fn subscribe(&self) -> broadcast::Receiver<Envelope> {
        self.tx.subscribe()
    }

    /// Number of currently subscribed sessions
    pub fn session_count(&self) -> usize {
        self.tx.receiver_count()
    }
}
