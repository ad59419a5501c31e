//! # Taskboard API Server Library
//!
//! Core functionality for the Taskboard API server.
//!
//! ## Modules
//!
//! - `app`: Application state and router builder
//! - `broadcast`: Realtime event fan-out
//! - `config`: Configuration management
//! - `error`: Error handling and HTTP response mapping
//! - `routes`: API route handlers

pub mod app;
pub mod broadcast;
pub mod config;
pub mod error;
pub mod routes;
