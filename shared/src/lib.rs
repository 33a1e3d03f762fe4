//! Shared types for the Mesa platform
//!
//! Domain models, the unified error system, real-time event payloads and
//! small helpers used by the server and its clients.

pub mod error;
pub mod event;
pub mod models;
pub mod money;
pub mod util;

// Re-exports
pub use error::{ApiResponse, AppError, AppResult, ErrorCode};
pub use event::RealtimeEvent;
pub use http;
pub use serde::{Deserialize, Serialize};
