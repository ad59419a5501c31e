//! # Taskboard Client Library
//!
//! Native client for the Taskboard API: a typed REST client, a
//! client-side state store, and the realtime connection that feeds it.
//!
//! ## Modules
//!
//! - `store`: Client-side state container with bounded event buffers
//! - `api`: REST client
//! - `connection`: Realtime WebSocket connection with reconnect

pub mod api;
pub mod connection;
pub mod store;
