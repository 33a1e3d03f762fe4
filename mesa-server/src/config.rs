//! Server configuration

type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Server configuration, loaded once at startup
#[derive(Debug, Clone)]
pub struct Config {
    /// SQLite database file (`:memory:` for an in-memory database)
    pub database_path: String,
    /// HTTP port
    pub http_port: u16,
    /// Environment: development | staging | production
    pub environment: String,
    /// HMAC secret for access tokens
    pub jwt_secret: String,
    /// Access token and session lifetime
    pub jwt_expiry_hours: i64,
    /// Interval of the expired session / OTP purge job
    pub session_purge_interval_secs: u64,
    /// WebSocket ping period; the socket's session is rechecked on each ping
    pub ws_ping_interval_secs: u64,
    pub log_level: String,
    pub log_json: bool,
    /// Daily rolling log files are written here when set
    pub log_dir: Option<String>,
}

impl Config {
    /// Require a secret env var: must be set and non-empty in non-development environments.
    fn require_secret(name: &str, environment: &str) -> Result<String, BoxError> {
        let val = match std::env::var(name) {
            Ok(v) => v,
            Err(_) => {
                if environment != "development" {
                    return Err(format!("{name} must be set in {environment} environment").into());
                }
                format!("dev-{name}-not-for-production")
            }
        };
        if val.is_empty() && environment != "development" {
            return Err(format!("{name} must not be empty in {environment} environment").into());
        }
        Ok(val)
    }

    fn parse_or<T: std::str::FromStr>(name: &str, default: T) -> T {
        std::env::var(name)
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(default)
    }

    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self, BoxError> {
        let environment = std::env::var("ENVIRONMENT").unwrap_or_else(|_| "development".into());

        Ok(Self {
            database_path: std::env::var("DATABASE_PATH").unwrap_or_else(|_| "mesa.db".into()),
            http_port: Self::parse_or("HTTP_PORT", 8080),
            jwt_secret: Self::require_secret("JWT_SECRET", &environment)?,
            jwt_expiry_hours: Self::parse_or("JWT_EXPIRY_HOURS", 12),
            session_purge_interval_secs: Self::parse_or("SESSION_PURGE_INTERVAL_SECS", 3600),
            ws_ping_interval_secs: Self::parse_or("WS_PING_INTERVAL_SECS", 30),
            log_level: std::env::var("LOG_LEVEL").unwrap_or_else(|_| "info".into()),
            log_json: Self::parse_or("LOG_JSON", false),
            log_dir: std::env::var("LOG_DIR").ok().filter(|s| !s.is_empty()),
            environment,
        })
    }

    /// In-memory configuration for tests
    pub fn for_tests() -> Self {
        Self {
            database_path: ":memory:".into(),
            http_port: 0,
            environment: "test".into(),
            jwt_secret: "test-secret-with-enough-length-for-hs256".into(),
            jwt_expiry_hours: 1,
            session_purge_interval_secs: 3600,
            ws_ping_interval_secs: 30,
            log_level: "debug".into(),
            log_json: false,
            log_dir: None,
        }
    }

    pub fn is_production(&self) -> bool {
        self.environment == "production"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn development_gets_placeholder_secret() {
        let secret = Config::require_secret("MESA_TEST_UNSET_SECRET", "development").unwrap();
        assert_eq!(secret, "dev-MESA_TEST_UNSET_SECRET-not-for-production");
    }

    #[test]
    fn production_requires_secret() {
        assert!(Config::require_secret("MESA_TEST_UNSET_SECRET", "production").is_err());
    }

    #[test]
    fn parse_or_falls_back_on_missing_var() {
        assert_eq!(Config::parse_or("MESA_TEST_UNSET_PORT", 8080u16), 8080);
    }

    #[test]
    fn test_config_is_in_memory() {
        let config = Config::for_tests();
        assert_eq!(config.database_path, ":memory:");
        assert!(!config.is_production());
    }
}
