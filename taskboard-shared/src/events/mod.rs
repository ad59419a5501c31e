/// Realtime event envelopes and topics
///
/// Mutation handlers publish these events after their write commits; the
/// realtime channel delivers them to subscribed sessions, and the client
/// store consumes them. Delivery is fire-and-forget: no acknowledgment,
/// no retry, no persistence. A client that was disconnected recovers by
/// re-fetching state after it reconnects.
///
/// # Wire Format
///
/// Server to client, one JSON object per message:
///
/// ```json
/// {"topic": "task:550e8400-...", "event": "task_status_updated",
///  "payload": {"task_uid": "550e8400-...", "status": "in_progress",
///              "updated_at": "2025-01-04T12:00:00Z"}}
/// ```
///
/// Client to server control messages:
///
/// ```json
/// {"action": "subscribe", "topic": "task:550e8400-..."}
/// ```
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::models::notification::Notification;

/// A broadcast topic
///
/// Events are published to the narrowest topic that covers their
/// audience: task events to `task:<uid>` (and the owning
/// `project:<uid>`), notifications to the recipient's `user:<uid>`.
/// Serialized as `"<kind>:<uuid>"` strings on the wire.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum Topic {
    /// Events about one task
    Task(Uuid),

    /// Events about any task in a project
    Project(Uuid),

    /// Events addressed to one user
    User(Uuid),
}

impl std::fmt::Display for Topic {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Topic::Task(uid) => write!(f, "task:{}", uid),
            Topic::Project(uid) => write!(f, "project:{}", uid),
            Topic::User(uid) => write!(f, "user:{}", uid),
        }
    }
}

impl From<Topic> for String {
    fn from(topic: Topic) -> Self {
        topic.to_string()
    }
}

impl TryFrom<String> for Topic {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl std::str::FromStr for Topic {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (kind, uid) = s
            .split_once(':')
            .ok_or_else(|| format!("Malformed topic: {}", s))?;

        let uid = Uuid::parse_str(uid).map_err(|e| format!("Malformed topic id: {}", e))?;

        match kind {
            "task" => Ok(Topic::Task(uid)),
            "project" => Ok(Topic::Project(uid)),
            "user" => Ok(Topic::User(uid)),
            _ => Err(format!("Unknown topic kind: {}", kind)),
        }
    }
}

/// Payload for a task status change
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TaskStatusUpdated {
    /// Updated task
    pub task_uid: Uuid,

    /// New status
    pub status: String,

    /// Mutation time, as persisted on the row
    pub updated_at: DateTime<Utc>,
}

/// Payload for a new comment
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewCommentAdded {
    /// New comment id
    pub comment_uid: Uuid,

    /// Task the comment was left on
    pub task_uid: Uuid,

    /// Author
    pub user_uid: Uuid,

    /// Comment body
    pub content: String,

    /// Creation time, as persisted on the row
    pub created_at: DateTime<Utc>,
}

/// A realtime event
///
/// The serialized form carries the event name in `event` and the payload
/// in `payload`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "event", content = "payload", rename_all = "snake_case")]
pub enum RealtimeEvent {
    /// A task moved across the board
    TaskStatusUpdated(TaskStatusUpdated),

    /// A comment was added to a task
    NewCommentAdded(NewCommentAdded),

    /// A notification row was created for a user
    NotificationCreated(Notification),
}

impl RealtimeEvent {
    /// The event name as it appears on the wire
    pub fn name(&self) -> &'static str {
        match self {
            RealtimeEvent::TaskStatusUpdated(_) => "task_status_updated",
            RealtimeEvent::NewCommentAdded(_) => "new_comment_added",
            RealtimeEvent::NotificationCreated(_) => "notification_created",
        }
    }
}

/// A published event together with its topic
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Envelope {
    /// Topic the event was published to
    pub topic: Topic,

    /// The event itself
    #[serde(flatten)]
    pub event: RealtimeEvent,
}

/// Control message sent by a realtime client
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum ClientCommand {
    /// Start receiving events published to `topic`
    Subscribe {
        /// Topic to follow
        topic: Topic,
    },

    /// Stop receiving events published to `topic`
    Unsubscribe {
        /// Topic to drop
        topic: Topic,
    },
}
