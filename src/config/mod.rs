//! Configuration management
//!
//! Configuration is loaded from:
//! - config.yml file
//! - Environment variables with the `FRONTPAGE_` prefix (override file settings)
//!
//! Missing optional values are filled with sensible defaults.

use serde::{Deserialize, Serialize};

/// Main configuration structure
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// Server configuration
    #[serde(default)]
    pub server: ServerConfig,
    /// Database configuration
    #[serde(default)]
    pub database: DatabaseConfig,
    /// Site behaviour
    #[serde(default)]
    pub site: SiteConfig,
}

/// Server configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Host address to bind to
    #[serde(default = "default_host")]
    pub host: String,
    /// Port to listen on
    #[serde(default = "default_port")]
    pub port: u16,
    /// CORS allowed origin (for cookie-based auth)
    #[serde(default = "default_cors_origin")]
    pub cors_origin: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            cors_origin: default_cors_origin(),
        }
    }
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    5000
}

fn default_cors_origin() -> String {
    "http://localhost:3000".to_string()
}

/// Database configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    /// SQLite database path or URL (`:memory:` for an in-memory database)
    #[serde(default = "default_database_url")]
    pub url: String,
    /// Maximum pooled connections
    #[serde(default = "default_max_connections")]
    pub max_connections: u32,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            url: default_database_url(),
            max_connections: default_max_connections(),
        }
    }
}

fn default_database_url() -> String {
    "data/blog.db".to_string()
}

fn default_max_connections() -> u32 {
    20
}

/// Site behaviour configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SiteConfig {
    /// Articles per section on the home page
    #[serde(default = "default_home_section_size")]
    pub home_section_size: u32,
    /// Facets shown in the "top scopes" sidebar
    #[serde(default = "default_facet_limit")]
    pub facet_limit: usize,
    /// Session lifetime in days
    #[serde(default = "default_session_days")]
    pub session_days: i64,
    /// Validity of newly generated invite codes in days
    #[serde(default = "default_invite_valid_days")]
    pub invite_valid_days: i64,
}

impl Default for SiteConfig {
    fn default() -> Self {
        Self {
            home_section_size: default_home_section_size(),
            facet_limit: default_facet_limit(),
            session_days: default_session_days(),
            invite_valid_days: default_invite_valid_days(),
        }
    }
}

fn default_home_section_size() -> u32 {
    10
}

fn default_facet_limit() -> usize {
    crate::services::facets::DEFAULT_FACET_LIMIT
}

fn default_session_days() -> i64 {
    7
}

fn default_invite_valid_days() -> i64 {
    365
}

/// Error type for configuration parsing
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read config file '{path}': {source}")]
    FileRead {
        path: String,
        source: std::io::Error,
    },
    #[error("Failed to parse config file '{path}': {message}")]
    ParseError {
        path: String,
        message: String,
    },
    #[error("Invalid configuration: {0}")]
    ValidationError(String),
}

impl Config {
    /// Load configuration from file
    ///
    /// If the file doesn't exist or is empty, returns default configuration.
    /// If the file exists but is invalid YAML, returns an error with details.
    pub fn load(path: &std::path::Path) -> anyhow::Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }

        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::FileRead {
            path: path.display().to_string(),
            source: e,
        })?;

        if content.trim().is_empty() {
            return Ok(Self::default());
        }

        let config: Config = serde_yaml::from_str(&content).map_err(|e| ConfigError::ParseError {
            path: path.display().to_string(),
            message: format_yaml_error(&e),
        })?;

        Ok(config)
    }

    /// Load configuration from file, apply environment overrides and validate.
    ///
    /// Environment variables:
    /// - FRONTPAGE_SERVER_HOST, FRONTPAGE_SERVER_PORT, FRONTPAGE_SERVER_CORS_ORIGIN
    /// - FRONTPAGE_DATABASE_URL, FRONTPAGE_DATABASE_MAX_CONNECTIONS
    /// - FRONTPAGE_SITE_HOME_SECTION_SIZE, FRONTPAGE_SITE_FACET_LIMIT
    /// - FRONTPAGE_SITE_SESSION_DAYS, FRONTPAGE_SITE_INVITE_VALID_DAYS
    pub fn load_with_env(path: &std::path::Path) -> anyhow::Result<Self> {
        let mut config = Self::load(path)?;
        config.apply_env_overrides();
        config.validate()?;
        Ok(config)
    }

    /// Reject values the server cannot run with.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.server.port == 0 {
            return Err(ConfigError::ValidationError("server.port must not be 0".into()));
        }
        if self.database.url.trim().is_empty() {
            return Err(ConfigError::ValidationError("database.url must not be empty".into()));
        }
        if self.database.max_connections == 0 {
            return Err(ConfigError::ValidationError(
                "database.max_connections must be at least 1".into(),
            ));
        }
        if self.site.home_section_size == 0 {
            return Err(ConfigError::ValidationError(
                "site.home_section_size must be at least 1".into(),
            ));
        }
        if self.site.session_days <= 0 {
            return Err(ConfigError::ValidationError(
                "site.session_days must be positive".into(),
            ));
        }
        if self.site.invite_valid_days <= 0 {
            return Err(ConfigError::ValidationError(
                "site.invite_valid_days must be positive".into(),
            ));
        }
        Ok(())
    }

    /// Apply environment variable overrides to the configuration.
    /// Values that fail to parse are ignored.
    fn apply_env_overrides(&mut self) {
        if let Ok(host) = std::env::var("FRONTPAGE_SERVER_HOST") {
            self.server.host = host;
        }
        override_parsed("FRONTPAGE_SERVER_PORT", &mut self.server.port);
        if let Ok(cors_origin) = std::env::var("FRONTPAGE_SERVER_CORS_ORIGIN") {
            self.server.cors_origin = cors_origin;
        }

        if let Ok(url) = std::env::var("FRONTPAGE_DATABASE_URL") {
            self.database.url = url;
        }
        override_parsed(
            "FRONTPAGE_DATABASE_MAX_CONNECTIONS",
            &mut self.database.max_connections,
        );

        override_parsed(
            "FRONTPAGE_SITE_HOME_SECTION_SIZE",
            &mut self.site.home_section_size,
        );
        override_parsed("FRONTPAGE_SITE_FACET_LIMIT", &mut self.site.facet_limit);
        override_parsed("FRONTPAGE_SITE_SESSION_DAYS", &mut self.site.session_days);
        override_parsed(
            "FRONTPAGE_SITE_INVITE_VALID_DAYS",
            &mut self.site.invite_valid_days,
        );
    }
}

fn override_parsed<T: std::str::FromStr>(key: &str, target: &mut T) {
    if let Some(value) = std::env::var(key).ok().and_then(|v| v.parse().ok()) {
        *target = value;
    }
}

/// Format YAML parsing error with location and context
fn format_yaml_error(e: &serde_yaml::Error) -> String {
    if let Some(location) = e.location() {
        format!(
            "at line {}, column {}: {}",
            location.line(),
            location.column(),
            e
        )
    } else {
        e.to_string()
    }
}

// Shared by every test that touches process environment variables.
#[cfg(test)]
static CONFIG_ENV_MUTEX: std::sync::Mutex<()> = std::sync::Mutex::new(());

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    const ENV_KEYS: [&str; 9] = [
        "FRONTPAGE_SERVER_HOST",
        "FRONTPAGE_SERVER_PORT",
        "FRONTPAGE_SERVER_CORS_ORIGIN",
        "FRONTPAGE_DATABASE_URL",
        "FRONTPAGE_DATABASE_MAX_CONNECTIONS",
        "FRONTPAGE_SITE_HOME_SECTION_SIZE",
        "FRONTPAGE_SITE_FACET_LIMIT",
        "FRONTPAGE_SITE_SESSION_DAYS",
        "FRONTPAGE_SITE_INVITE_VALID_DAYS",
    ];

    fn lock_env() -> std::sync::MutexGuard<'static, ()> {
        super::CONFIG_ENV_MUTEX.lock().unwrap_or_else(|e| e.into_inner())
    }

    fn clear_env() {
        for key in ENV_KEYS {
            std::env::remove_var(key);
        }
    }

    #[test]
    fn test_load_missing_file_returns_defaults() {
        let path = std::path::Path::new("nonexistent_config.yml");
        let config = Config::load(path).unwrap();

        assert_eq!(config.server.host, "0.0.0.0");
        assert_eq!(config.server.port, 5000);
        assert_eq!(config.database.url, "data/blog.db");
        assert_eq!(config.database.max_connections, 20);
        assert_eq!(config.site.home_section_size, 10);
        assert_eq!(config.site.facet_limit, 5);
        assert_eq!(config.site.session_days, 7);
        assert_eq!(config.site.invite_valid_days, 365);
    }

    #[test]
    fn test_load_empty_file_returns_defaults() {
        let mut file = NamedTempFile::new().unwrap();
        write!(file, "   \n").unwrap();

        let config = Config::load(file.path()).unwrap();
        assert_eq!(config.server.port, 5000);
    }

    #[test]
    fn test_load_partial_config_fills_defaults() {
        let mut file = NamedTempFile::new().unwrap();
        write!(file, "site:\n  facet_limit: 8\n").unwrap();

        let config = Config::load(file.path()).unwrap();

        assert_eq!(config.site.facet_limit, 8);
        assert_eq!(config.site.session_days, 7);
        assert_eq!(config.server.host, "0.0.0.0");
    }

    #[test]
    fn test_load_full_config() {
        let mut file = NamedTempFile::new().unwrap();
        write!(
            file,
            r#"
server:
  host: "127.0.0.1"
  port: 9000
  cors_origin: "https://example.org"
database:
  url: "/var/lib/frontpage/blog.db"
  max_connections: 4
site:
  home_section_size: 15
  facet_limit: 3
  session_days: 30
  invite_valid_days: 90
"#
        )
        .unwrap();

        let config = Config::load(file.path()).unwrap();

        assert_eq!(config.server.host, "127.0.0.1");
        assert_eq!(config.server.port, 9000);
        assert_eq!(config.server.cors_origin, "https://example.org");
        assert_eq!(config.database.url, "/var/lib/frontpage/blog.db");
        assert_eq!(config.database.max_connections, 4);
        assert_eq!(config.site.home_section_size, 15);
        assert_eq!(config.site.facet_limit, 3);
        assert_eq!(config.site.session_days, 30);
        assert_eq!(config.site.invite_valid_days, 90);
    }

    #[test]
    fn test_load_invalid_yaml_returns_error() {
        let mut file = NamedTempFile::new().unwrap();
        write!(file, "server:\n  port: not_a_number\n").unwrap();

        let err = Config::load(file.path()).unwrap_err();
        let msg = err.to_string();
        assert!(msg.contains("Failed to parse config file"));
        assert!(msg.contains("line"));
    }

    #[test]
    fn test_load_malformed_yaml_returns_error() {
        let mut file = NamedTempFile::new().unwrap();
        write!(file, "server:\n  host: [invalid yaml").unwrap();

        assert!(Config::load(file.path()).is_err());
    }

    #[test]
    fn test_validate_rejects_zero_values() {
        let mut config = Config::default();
        assert!(config.validate().is_ok());

        config.site.session_days = 0;
        assert!(matches!(config.validate(), Err(ConfigError::ValidationError(_))));

        let mut config = Config::default();
        config.server.port = 0;
        assert!(config.validate().is_err());

        let mut config = Config::default();
        config.site.invite_valid_days = -5;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_env_overrides() {
        let _guard = lock_env();
        clear_env();

        std::env::set_var("FRONTPAGE_SERVER_HOST", "10.0.0.1");
        std::env::set_var("FRONTPAGE_SERVER_PORT", "8088");
        std::env::set_var("FRONTPAGE_DATABASE_URL", ":memory:");
        std::env::set_var("FRONTPAGE_SITE_SESSION_DAYS", "14");

        let config = Config::load_with_env(std::path::Path::new("nonexistent_config.yml")).unwrap();
        clear_env();

        assert_eq!(config.server.host, "10.0.0.1");
        assert_eq!(config.server.port, 8088);
        assert_eq!(config.database.url, ":memory:");
        assert_eq!(config.site.session_days, 14);
    }

    #[test]
    fn test_env_invalid_number_ignored() {
        let _guard = lock_env();
        clear_env();

        std::env::set_var("FRONTPAGE_SERVER_PORT", "not-a-port");
        std::env::set_var("FRONTPAGE_SITE_FACET_LIMIT", "-2");

        let config = Config::load_with_env(std::path::Path::new("nonexistent_config.yml")).unwrap();
        clear_env();

        assert_eq!(config.server.port, 5000);
        assert_eq!(config.site.facet_limit, 5);
    }

    #[test]
    fn test_env_takes_precedence_over_file() {
        let _guard = lock_env();
        clear_env();

        let mut file = NamedTempFile::new().unwrap();
        write!(file, "database:\n  url: from-file.db\n").unwrap();
        std::env::set_var("FRONTPAGE_DATABASE_URL", "from-env.db");

        let config = Config::load_with_env(file.path()).unwrap();
        clear_env();

        assert_eq!(config.database.url, "from-env.db");
    }

    #[test]
    fn test_env_override_failing_validation() {
        let _guard = lock_env();
        clear_env();

        std::env::set_var("FRONTPAGE_SITE_INVITE_VALID_DAYS", "0");
        let result = Config::load_with_env(std::path::Path::new("nonexistent_config.yml"));
        clear_env();

        assert!(result.is_err());
    }
}
