//! Application state

use sqlx::SqlitePool;
use std::sync::Arc;

use crate::auth::otp::{LogOtpSender, OtpSender};
use crate::auth::rate_limit::RateLimiter;
use crate::auth::JwtService;
use crate::config::Config;
use crate::db::DbService;
use crate::live::EventHub;

type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    /// SQLite connection pool
    pub pool: SqlitePool,
    pub config: Arc<Config>,
    pub jwt: JwtService,
    /// Real-time event fan-out
    pub hub: EventHub,
    /// Rate limiter for login / OTP / registration routes
    pub rate_limiter: RateLimiter,
    pub otp_sender: Arc<dyn OtpSender>,
}

impl AppState {
    /// Open the database (running migrations) and build the state
    pub async fn new(config: &Config) -> Result<Self, BoxError> {
        let db = DbService::new(&config.database_path).await?;
        Ok(Self::from_parts(config, db.pool, Arc::new(LogOtpSender)))
    }

    pub fn from_parts(config: &Config, pool: SqlitePool, otp_sender: Arc<dyn OtpSender>) -> Self {
        Self {
            pool,
            config: Arc::new(config.clone()),
            jwt: JwtService::new(&config.jwt_secret),
            hub: EventHub::new(),
            rate_limiter: RateLimiter::new(),
            otp_sender,
        }
    }

    /// Access token / session lifetime in milliseconds
    pub fn session_ttl_millis(&self) -> i64 {
        self.config.jwt_expiry_hours * 3_600_000
    }
}
