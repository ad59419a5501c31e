/// API route handlers
///
/// Organized by resource:
///
/// - `health`: Health check endpoint
/// - `auth`: Registration and login
/// - `users`: Profile updates
/// - `projects`: Project CRUD and task listings
/// - `tasks`: Task creation, status updates, and comments
/// - `notifications`: Per-user notification list and read marking
/// - `team`: Team roster CRUD
/// - `realtime`: WebSocket channel for event fan-out
pub mod auth;
pub mod health;
pub mod notifications;
pub mod projects;
pub mod realtime;
pub mod tasks;
pub mod team;
pub mod users;
