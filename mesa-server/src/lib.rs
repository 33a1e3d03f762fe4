//! Mesa server - multi-tenant restaurant ordering backend
//!
//! # Module structure
//!
//! ```text
//! mesa-server/src/
//! ├── config.rs     # environment configuration
//! ├── logger.rs     # tracing subscriber, security_log!
//! ├── state.rs      # AppState shared by every handler
//! ├── error.rs      # ServiceError bridging sqlx / repository / AppError
//! ├── auth/         # JWT, sessions, passwords, one-time codes, rate limits
//! ├── db/           # SQLite pool, migrations, repositories
//! ├── services/     # ordering, payments, loyalty, payroll, settings, auth
//! ├── live/         # per-restaurant event hub
//! ├── api/          # HTTP and WebSocket routes
//! ├── tasks.rs      # background jobs
//! └── utils/        # input validation
//! ```

pub mod api;
pub mod auth;
pub mod config;
pub mod db;
pub mod error;
pub mod live;
pub mod logger;
pub mod services;
pub mod state;
pub mod tasks;
pub mod utils;

pub use auth::{CurrentUser, JwtService};
pub use config::Config;
pub use logger::init_logger;
pub use state::AppState;
