use std::path::PathBuf;

/// Default capacity of the event broadcast channel
pub const DEFAULT_EVENT_CAPACITY: usize = 1024;

/// Engine configuration
///
/// # Environment variables
///
/// Every field can be overridden through the environment; a `.env` file in
/// the working directory is loaded first when present.
///
/// | Variable | Default | Purpose |
/// |----------|---------|---------|
/// | STORE_ENV | development | Runtime environment |
/// | STORE_LOG_LEVEL | info | Log verbosity |
/// | STORE_LOG_DIR | (unset) | Directory for daily-rolling log files |
/// | STORE_SESSION_DB | store-session.redb | Session cache database path |
/// | STORE_EVENT_CAPACITY | 1024 | Event broadcast channel capacity |
/// | STORE_ADMIN_EMAIL | admin@circuitstore.local | Bootstrap admin email |
/// | STORE_ADMIN_FIRST_NAME | Store | Bootstrap admin first name |
/// | STORE_ADMIN_LAST_NAME | Admin | Bootstrap admin last name |
/// | STORE_ADMIN_PHONE | SYSTEM | Bootstrap admin phone |
/// | STORE_ADMIN_SECRET | change-me | Bootstrap admin secret |
///
/// # Example
///
/// ```ignore
/// STORE_ENV=production STORE_SESSION_DB=/data/session.redb cargo run
/// ```
#[derive(Debug, Clone)]
pub struct StoreConfig {
    /// Runtime environment: development | staging | production
    pub environment: String,
    /// Log verbosity passed to the logger on startup
    pub log_level: String,
    /// Directory for rolling log files; console-only when unset
    pub log_dir: Option<String>,
    /// Path of the redb session cache database
    pub session_db_path: PathBuf,
    /// Capacity of the event broadcast channel
    pub event_channel_capacity: usize,

    // === Bootstrap admin identity ===
    /// Email of the privileged account created at bootstrap
    pub admin_email: String,
    pub admin_first_name: String,
    pub admin_last_name: String,
    /// Phone recorded on the bootstrap account; not a reachable number
    pub admin_phone: String,
    /// Initial secret for the bootstrap account; rotate it after first run
    pub admin_secret: String,
}

impl StoreConfig {
    /// Load configuration from the environment.
    ///
    /// Unset variables fall back to their defaults.
    pub fn from_env() -> Self {
        dotenv::dotenv().ok();

        Self {
            environment: std::env::var("STORE_ENV").unwrap_or_else(|_| "development".into()),
            log_level: std::env::var("STORE_LOG_LEVEL").unwrap_or_else(|_| "info".into()),
            log_dir: std::env::var("STORE_LOG_DIR").ok(),
            session_db_path: std::env::var("STORE_SESSION_DB")
                .map(PathBuf::from)
                .unwrap_or_else(|_| PathBuf::from("store-session.redb")),
            event_channel_capacity: std::env::var("STORE_EVENT_CAPACITY")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(DEFAULT_EVENT_CAPACITY),
            admin_email: std::env::var("STORE_ADMIN_EMAIL")
                .unwrap_or_else(|_| "admin@circuitstore.local".into()),
            admin_first_name: std::env::var("STORE_ADMIN_FIRST_NAME")
                .unwrap_or_else(|_| "Store".into()),
            admin_last_name: std::env::var("STORE_ADMIN_LAST_NAME")
                .unwrap_or_else(|_| "Admin".into()),
            admin_phone: std::env::var("STORE_ADMIN_PHONE").unwrap_or_else(|_| "SYSTEM".into()),
            admin_secret: std::env::var("STORE_ADMIN_SECRET")
                .unwrap_or_else(|_| "change-me".into()),
        }
    }

    /// Override the values tests care about
    pub fn with_overrides(
        session_db_path: impl Into<PathBuf>,
        event_channel_capacity: usize,
    ) -> Self {
        let mut config = Self::from_env();
        config.session_db_path = session_db_path.into();
        config.event_channel_capacity = event_channel_capacity;
        config
    }

    /// Whether this is a production environment
    pub fn is_production(&self) -> bool {
        self.environment == "production"
    }

    /// Whether this is a development environment
    pub fn is_development(&self) -> bool {
        self.environment == "development"
    }
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self::from_env()
    }
}
