//! Data models
//!
//! DB row types use `#[cfg_attr(feature = "db", derive(sqlx::FromRow))]`.
//! All IDs are `i64` snowflakes; timestamps are epoch milliseconds.

pub mod auth;
pub mod dining_table;
pub mod loyalty;
pub mod menu;
pub mod order;
pub mod payment;
pub mod payroll;
pub mod restaurant;
pub mod session;
pub mod setting;
pub mod support;
pub mod user;

// Re-exports
pub use auth::*;
pub use dining_table::*;
pub use loyalty::*;
pub use menu::*;
pub use order::*;
pub use payment::*;
pub use payroll::*;
pub use restaurant::*;
pub use session::*;
pub use setting::{Setting, SettingsMap};
pub use support::*;
pub use user::*;
