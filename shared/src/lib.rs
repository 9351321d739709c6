//! Shared types for the POS backend
//!
//! Error types, response envelope and the domain enums used across the
//! server and its clients.

pub mod error;
pub mod models;

// Re-exports
pub use axum::{Json, body};
pub use http;
pub use serde::{Deserialize, Serialize};
