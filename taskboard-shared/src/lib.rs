//! # Taskboard Shared Library
//!
//! This crate contains the types and utilities shared between the Taskboard
//! API server and the native client.
//!
//! ## Module Organization
//!
//! - `models`: Database models and their query operations
//! - `auth`: Password hashing, bearer tokens, and request authentication
//! - `db`: Connection pool and migration runner
//! - `events`: Realtime event envelopes and topics

pub mod auth;
pub mod db;
pub mod events;
pub mod models;

/// Current version of the Taskboard shared library
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
