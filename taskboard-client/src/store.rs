/// Client-side state store
///
/// A single state container mirroring what the server knows: the auth
/// session, the notification list with its derived unread count, the
/// realtime connection flag, and one bounded buffer per realtime event
/// type. Views drain a buffer when they re-fetch the data it refers to.
///
/// The buffers are ring buffers with a fixed capacity; when a buffer is
/// full the oldest event is dropped, since a view that re-fetches gets
/// the current state anyway.
///
/// # Example
///
/// ```
/// use taskboard_client::store::ClientStore;
/// use uuid::Uuid;
///
/// let mut store = ClientStore::new();
/// store.set_login("token".to_string(), Uuid::new_v4(), "member".to_string());
/// assert!(store.is_authenticated());
///
/// store.reset();
/// assert!(!store.is_authenticated());
/// assert!(store.token().is_none());
/// ```
use std::collections::VecDeque;

use taskboard_shared::events::{Envelope, NewCommentAdded, RealtimeEvent, TaskStatusUpdated};
use taskboard_shared::models::notification::Notification;
use uuid::Uuid;

/// Default capacity of each realtime event buffer
const DEFAULT_BUFFER_CAPACITY: usize = 256;

/// Bounded FIFO buffer for inbound realtime events
///
/// Pushing onto a full buffer drops the oldest entry.
#[derive(Debug, Clone)]
pub struct EventBuffer<T> {
    items: VecDeque<T>,
    capacity: usize,
}

impl<T> EventBuffer<T> {
    /// Creates a buffer holding at most `capacity` events
    pub fn new(capacity: usize) -> Self {
        Self {
            items: VecDeque::with_capacity(capacity),
            capacity,
        }
    }

    /// Appends an event, dropping the oldest one when full
    pub fn push(&mut self, item: T) {
        if self.items.len() == self.capacity {
            self.items.pop_front();
        }
        self.items.push_back(item);
    }

    /// Removes and returns all buffered events, oldest first
    pub fn drain(&mut self) -> Vec<T> {
        self.items.drain(..).collect()
    }

    /// Number of buffered events
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Whether the buffer is empty
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Maximum number of buffered events
    pub fn capacity(&self) -> usize {
        self.capacity
    }
}

/// The authenticated user, as known client-side
#[derive(Debug, Clone)]
pub struct CurrentUser {
    /// User id
    pub uid: Uuid,

    /// Role string
    pub role: String,
}

/// Client-side state container
#[derive(Debug, Clone)]
pub struct ClientStore {
    token: Option<String>,
    current_user: Option<CurrentUser>,
    authenticated: bool,
    notifications: Vec<Notification>,
    unread_count: usize,
    connected: bool,
    task_status_updates: EventBuffer<TaskStatusUpdated>,
    new_comments: EventBuffer<NewCommentAdded>,
}

impl Default for ClientStore {
    fn default() -> Self {
        Self::with_buffer_capacity(DEFAULT_BUFFER_CAPACITY)
    }
}

impl ClientStore {
    /// Creates an empty store with default buffer capacity
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates an empty store with an explicit buffer capacity
    pub fn with_buffer_capacity(capacity: usize) -> Self {
        Self {
            token: None,
            current_user: None,
            authenticated: false,
            notifications: Vec::new(),
            unread_count: 0,
            connected: false,
            task_status_updates: EventBuffer::new(capacity),
            new_comments: EventBuffer::new(capacity),
        }
    }

    /// Records a successful login
    pub fn set_login(&mut self, token: String, uid: Uuid, role: String) {
        self.token = Some(token);
        self.current_user = Some(CurrentUser { uid, role });
        self.authenticated = true;
    }

    /// Clears all auth state and buffered data
    ///
    /// The realtime connection reads the auth state through the store, so
    /// callers also shut the connection down when resetting.
    pub fn reset(&mut self) {
        self.token = None;
        self.current_user = None;
        self.authenticated = false;
        self.notifications.clear();
        self.unread_count = 0;
        self.connected = false;
        self.task_status_updates.drain();
        self.new_comments.drain();
    }

    /// Current bearer token, if logged in
    pub fn token(&self) -> Option<&str> {
        self.token.as_deref()
    }

    /// Current user, if logged in
    pub fn current_user(&self) -> Option<&CurrentUser> {
        self.current_user.as_ref()
    }

    /// Whether a login has succeeded
    pub fn is_authenticated(&self) -> bool {
        self.authenticated
    }

    /// Whether the realtime connection is up
    pub fn is_connected(&self) -> bool {
        self.connected
    }

    /// Updates the realtime connection flag
    pub fn set_connected(&mut self, connected: bool) {
        self.connected = connected;
    }

    /// Replaces the notification list (after a re-fetch)
    ///
    /// The unread count is derived from the list.
    pub fn set_notifications(&mut self, notifications: Vec<Notification>) {
        self.unread_count = notifications.iter().filter(|n| !n.is_read).count();
        self.notifications = notifications;
    }

    /// Marks one notification as read locally
    pub fn mark_notification_read(&mut self, uid: Uuid) {
        if let Some(notification) = self.notifications.iter_mut().find(|n| n.uid == uid) {
            if !notification.is_read {
                notification.is_read = true;
            }
        }
        self.unread_count = self.notifications.iter().filter(|n| !n.is_read).count();
    }

    /// Current notification list, newest first
    pub fn notifications(&self) -> &[Notification] {
        &self.notifications
    }

    /// Number of unread notifications
    pub fn unread_count(&self) -> usize {
        self.unread_count
    }

    /// Applies an inbound realtime envelope
    ///
    /// Task and comment events are buffered until a view drains them;
    /// notifications go straight into the list.
    pub fn apply(&mut self, envelope: &Envelope) {
        match &envelope.event {
            RealtimeEvent::TaskStatusUpdated(payload) => {
                self.task_status_updates.push(payload.clone());
            }
            RealtimeEvent::NewCommentAdded(payload) => {
                self.new_comments.push(payload.clone());
            }
            RealtimeEvent::NotificationCreated(notification) => {
                if !notification.is_read {
                    self.unread_count += 1;
                }
                self.notifications.insert(0, notification.clone());
            }
        }
    }

    /// Drains the buffered task status updates, oldest first
    pub fn drain_task_status_updates(&mut self) -> Vec<TaskStatusUpdated> {
        self.task_status_updates.drain()
    }

    /// Drains the buffered comments, oldest first
    pub fn drain_new_comments(&mut self) -> Vec<NewCommentAdded> {
        self.new_comments.drain()
    }

    /// Number of buffered task status updates
    pub fn pending_task_status_updates(&self) -> usize {
        self.task_status_updates.len()
    }

    /// Number of buffered comments
    pub fn pending_new_comments(&self) -> usize {
        self.new_comments.len()
    }
}
