/// Database models
///
/// This module contains all database models and their query operations.
///
/// # Models
///
/// - `user`: Accounts and authentication rows
/// - `project`: Projects grouping tasks
/// - `task`: Board tasks with open-ended status strings
/// - `comment`: Immutable task comments with optional mentions
/// - `activity`: Append-only audit trail of task mutations
/// - `notification`: Per-user notifications
/// - `team_member`: Team roster entries
pub mod activity;
pub mod comment;
pub mod notification;
pub mod project;
pub mod task;
pub mod team_member;
pub mod user;
