//! Web app configuration module.
//!
//! Configuration is loaded from environment variables with fallback to defaults.
//! A `.env` file in the working directory is read first (see `main.rs`).

use std::env;
use std::net::SocketAddr;
use std::path::PathBuf;
use std::time::Duration;

use directories::ProjectDirs;

use crate::state::SessionLimits;

/// Default listen address.
pub const DEFAULT_BIND_ADDR: &str = "127.0.0.1:8000";

/// Default sender for notification mail.
pub const DEFAULT_FROM_EMAIL: &str = "no-reply@pharmashelf.local";

/// Web app configuration.
#[derive(Debug, Clone)]
pub struct AppConfig {
    /// Address the HTTP server listens on
    pub bind_addr: SocketAddr,

    /// SQLite database file
    pub database_path: PathBuf,

    /// Connection pool size
    pub db_max_connections: u32,

    /// SendGrid API key. Out-of-stock mail is sent only when this is set.
    pub sendgrid_api_key: Option<String>,

    /// Sender address for notification mail
    pub default_from_email: String,

    /// Public base URL (e.g. `https://shelf.example.com`). When unset, links
    /// in mail are built from the request's `Host` header.
    pub app_base_url: Option<String>,

    /// Live sessions kept at once; the least recently seen is evicted first
    pub max_sessions: usize,

    /// Sessions unused for this long are dropped
    pub session_idle_timeout: Duration,
}

impl AppConfig {
    /// Load configuration from environment variables.
    pub fn load() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Builds the configuration from any key → value source.
    ///
    /// Empty values count as unset.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|value| !value.trim().is_empty());

        let config = AppConfig {
            bind_addr: get("PHARMA_BIND_ADDR")
                .unwrap_or_else(|| DEFAULT_BIND_ADDR.to_string())
                .parse()
                .map_err(|_| ConfigError::InvalidValue("PHARMA_BIND_ADDR".to_string()))?,

            database_path: match get("PHARMA_DB_PATH") {
                Some(path) => PathBuf::from(path),
                None => default_database_path()?,
            },

            db_max_connections: get("PHARMA_DB_MAX_CONNECTIONS")
                .unwrap_or_else(|| "5".to_string())
                .parse()
                .map_err(|_| ConfigError::InvalidValue("PHARMA_DB_MAX_CONNECTIONS".to_string()))?,

            sendgrid_api_key: get("SENDGRID_API_KEY"),

            default_from_email: get("DEFAULT_FROM_EMAIL")
                .unwrap_or_else(|| DEFAULT_FROM_EMAIL.to_string()),

            app_base_url: get("APP_BASE_URL").map(|url| url.trim_end_matches('/').to_string()),

            max_sessions: match get("PHARMA_MAX_SESSIONS") {
                Some(value) => value
                    .parse()
                    .map_err(|_| ConfigError::InvalidValue("PHARMA_MAX_SESSIONS".to_string()))?,
                None => SessionLimits::default().max_sessions,
            },

            session_idle_timeout: match get("PHARMA_SESSION_IDLE_SECS") {
                Some(value) => value
                    .parse()
                    .map(Duration::from_secs)
                    .map_err(|_| ConfigError::InvalidValue("PHARMA_SESSION_IDLE_SECS".to_string()))?,
                None => SessionLimits::default().idle_timeout,
            },
        };

        if config.db_max_connections == 0 {
            return Err(ConfigError::InvalidValue("PHARMA_DB_MAX_CONNECTIONS".to_string()));
        }

        if config.max_sessions == 0 {
            return Err(ConfigError::InvalidValue("PHARMA_MAX_SESSIONS".to_string()));
        }

        Ok(config)
    }

    /// Whether out-of-stock notifications are enabled.
    pub fn mail_enabled(&self) -> bool {
        self.sendgrid_api_key.is_some()
    }

    pub fn session_limits(&self) -> SessionLimits {
        SessionLimits {
            max_sessions: self.max_sessions,
            idle_timeout: self.session_idle_timeout,
        }
    }
}

/// Platform data directory, e.g. `~/.local/share/pharmashelf/pharmashelf.db`.
///
/// The directory itself is created by the binary at startup.
fn default_database_path() -> Result<PathBuf, ConfigError> {
    let dirs = ProjectDirs::from("com", "pharmashelf", "pharmashelf")
        .ok_or_else(|| ConfigError::MissingRequired("PHARMA_DB_PATH".to_string()))?;

    Ok(dirs.data_dir().join("pharmashelf.db"))
}

/// Configuration error types.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid value for {0}")]
    InvalidValue(String),

    #[error("Missing required configuration: {0}")]
    MissingRequired(String),
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn config_from(pairs: &[(&str, &str)]) -> Result<AppConfig, ConfigError> {
        let vars: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        AppConfig::from_lookup(|key| vars.get(key).cloned())
    }

    #[test]
    fn test_defaults() {
        let config = config_from(&[("PHARMA_DB_PATH", "/tmp/shelf.db")]).unwrap();

        assert_eq!(config.bind_addr.to_string(), DEFAULT_BIND_ADDR);
        assert_eq!(config.database_path, PathBuf::from("/tmp/shelf.db"));
        assert_eq!(config.db_max_connections, 5);
        assert_eq!(config.default_from_email, DEFAULT_FROM_EMAIL);
        assert!(config.sendgrid_api_key.is_none());
        assert!(config.app_base_url.is_none());
        assert!(!config.mail_enabled());
        assert_eq!(config.session_limits(), SessionLimits::default());
    }

    #[test]
    fn test_overrides() {
        let config = config_from(&[
            ("PHARMA_BIND_ADDR", "0.0.0.0:9000"),
            ("PHARMA_DB_PATH", "shelf.db"),
            ("PHARMA_DB_MAX_CONNECTIONS", "12"),
            ("SENDGRID_API_KEY", "SG.key"),
            ("DEFAULT_FROM_EMAIL", "alerts@example.com"),
            ("APP_BASE_URL", "https://shelf.example.com/"),
            ("PHARMA_MAX_SESSIONS", "250"),
            ("PHARMA_SESSION_IDLE_SECS", "3600"),
        ])
        .unwrap();

        assert_eq!(config.bind_addr.port(), 9000);
        assert_eq!(config.db_max_connections, 12);
        assert_eq!(config.sendgrid_api_key.as_deref(), Some("SG.key"));
        assert_eq!(config.default_from_email, "alerts@example.com");
        assert_eq!(config.app_base_url.as_deref(), Some("https://shelf.example.com"));
        assert!(config.mail_enabled());
        assert_eq!(config.session_limits().max_sessions, 250);
        assert_eq!(config.session_limits().idle_timeout, Duration::from_secs(3600));
    }

    #[test]
    fn test_empty_key_disables_mail() {
        let config = config_from(&[("PHARMA_DB_PATH", "shelf.db"), ("SENDGRID_API_KEY", "")]).unwrap();
        assert!(!config.mail_enabled());
    }

    #[test]
    fn test_invalid_values() {
        let err = config_from(&[("PHARMA_DB_PATH", "x.db"), ("PHARMA_BIND_ADDR", "nowhere")]).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidValue(ref key) if key == "PHARMA_BIND_ADDR"));

        let err = config_from(&[("PHARMA_DB_PATH", "x.db"), ("PHARMA_DB_MAX_CONNECTIONS", "0")]).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidValue(ref key) if key == "PHARMA_DB_MAX_CONNECTIONS"));

        let err = config_from(&[("PHARMA_DB_PATH", "x.db"), ("PHARMA_MAX_SESSIONS", "0")]).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidValue(ref key) if key == "PHARMA_MAX_SESSIONS"));

        let err = config_from(&[("PHARMA_DB_PATH", "x.db"), ("PHARMA_SESSION_IDLE_SECS", "soon")]).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidValue(ref key) if key == "PHARMA_SESSION_IDLE_SECS"));
    }
}
