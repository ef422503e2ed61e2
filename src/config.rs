//! Application configuration
//!
//! Loaded from a TOML file (default `~/.config/slotkeeper/config.toml`).
//! Every section and field is optional; anything missing falls back to
//! the defaults below.
//!
//! ```toml
//! [server]
//! api_host = "0.0.0.0"
//! api_port = 8080
//!
//! [database]
//! url = "sqlite://./slotkeeper.db?mode=rwc"
//!
//! [security]
//! jwt_secret = "..."
//!
//! [scheduling]
//! require_known_resource = true
//! ```

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::application::SchedulerConfig;
use crate::infrastructure::{DatabaseConfig, JwtConfig};
use crate::shared::InfraError;

/// Environment variable naming an alternative config file.
pub const CONFIG_ENV_VAR: &str = "SLOTKEEPER_CONFIG";

/// Environment variable overriding `security.jwt_secret`.
pub const JWT_SECRET_ENV_VAR: &str = "SLOTKEEPER_JWT_SECRET";

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub server: ServerSection,
    pub database: DatabaseSection,
    pub security: SecuritySection,
    pub scheduling: SchedulingSection,
    pub logging: LoggingSection,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerSection {
    pub api_host: String,
    pub api_port: u16,
    /// Seconds to wait for in-flight requests on shutdown
    pub shutdown_timeout: u64,
}

impl Default for ServerSection {
    fn default() -> Self {
        Self {
            api_host: "0.0.0.0".to_string(),
            api_port: 8080,
            shutdown_timeout: 30,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DatabaseSection {
    /// SeaORM connection URL or a bare SQLite file path. `memory` selects
    /// the in-process store.
    pub url: String,
    pub max_connections: u32,
}

impl Default for DatabaseSection {
    fn default() -> Self {
        let db = DatabaseConfig::default();
        Self {
            url: db.url,
            max_connections: db.max_connections,
        }
    }
}

impl DatabaseSection {
    /// Whether the in-process store was requested instead of a database.
    pub fn is_in_memory(&self) -> bool {
        self.url.eq_ignore_ascii_case("memory")
    }
}

#[derive(Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SecuritySection {
    pub jwt_secret: String,
    pub jwt_issuer: String,
    pub jwt_expiration_hours: i64,
}

impl Default for SecuritySection {
    fn default() -> Self {
        let jwt = JwtConfig::default();
        Self {
            jwt_secret: jwt.secret,
            jwt_issuer: jwt.issuer,
            jwt_expiration_hours: jwt.expiration_hours,
        }
    }
}

impl std::fmt::Debug for SecuritySection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SecuritySection")
            .field("jwt_secret", &"<redacted>")
            .field("jwt_issuer", &self.jwt_issuer)
            .field("jwt_expiration_hours", &self.jwt_expiration_hours)
            .finish()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SchedulingSection {
    /// Reject reservations for resources missing from the catalog
    pub require_known_resource: bool,
    pub store_timeout_secs: u64,
    /// Insert the campus parking layout when the catalog is empty
    pub seed_default_catalog: bool,
}

impl Default for SchedulingSection {
    fn default() -> Self {
        Self {
            require_known_resource: false,
            store_timeout_secs: 10,
            seed_default_catalog: true,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingSection {
    /// EnvFilter directive; `RUST_LOG` takes precedence
    pub level: String,
    /// `text` or `json`
    pub format: String,
}

impl Default for LoggingSection {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: "text".to_string(),
        }
    }
}

impl AppConfig {
    /// Load from `path`, then apply environment overrides. A missing file
    /// yields the defaults.
    pub fn load(path: &Path) -> Result<Self, InfraError> {
        let mut cfg = if path.exists() {
            Self::parse(&std::fs::read_to_string(path)?)?
        } else {
            Self::default()
        };
        cfg.apply_env_overrides(|key| std::env::var(key).ok());
        cfg.validate()?;
        Ok(cfg)
    }

    pub fn from_toml(raw: &str) -> Result<Self, InfraError> {
        let cfg = Self::parse(raw)?;
        cfg.validate()?;
        Ok(cfg)
    }

    /// Defaults plus environment overrides, for when the file is unusable.
    pub fn fallback() -> Self {
        let mut cfg = Self::default();
        cfg.apply_env_overrides(|key| std::env::var(key).ok());
        cfg
    }

    fn parse(raw: &str) -> Result<Self, InfraError> {
        toml::from_str(raw).map_err(|e| InfraError::Config(e.to_string()))
    }

    fn apply_env_overrides(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        if let Some(secret) = lookup(JWT_SECRET_ENV_VAR).filter(|s| !s.trim().is_empty()) {
            self.security.jwt_secret = secret;
        }
    }

    pub fn validate(&self) -> Result<(), InfraError> {
        if self.security.jwt_secret.trim().is_empty() {
            return Err(InfraError::Config("security.jwt_secret must not be empty".into()));
        }
        if self.security.jwt_expiration_hours <= 0 {
            return Err(InfraError::Config(
                "security.jwt_expiration_hours must be positive".into(),
            ));
        }
        if self.scheduling.store_timeout_secs == 0 {
            return Err(InfraError::Config(
                "scheduling.store_timeout_secs must be positive".into(),
            ));
        }
        if !matches!(self.logging.format.to_lowercase().as_str(), "text" | "json") {
            return Err(InfraError::Config(format!(
                "logging.format must be 'text' or 'json', got '{}'",
                self.logging.format
            )));
        }
        Ok(())
    }

    pub fn database_config(&self) -> DatabaseConfig {
        let url = &self.database.url;
        let base = if url.contains(':') {
            DatabaseConfig {
                url: url.clone(),
                ..DatabaseConfig::default()
            }
        } else {
            DatabaseConfig::sqlite(url)
        };
        DatabaseConfig {
            max_connections: self.database.max_connections,
            ..base
        }
    }

    pub fn jwt_config(&self) -> JwtConfig {
        JwtConfig {
            secret: self.security.jwt_secret.clone(),
            expiration_hours: self.security.jwt_expiration_hours,
            issuer: self.security.jwt_issuer.clone(),
        }
    }

    pub fn scheduler_config(&self) -> SchedulerConfig {
        SchedulerConfig {
            require_known_resource: self.scheduling.require_known_resource,
            store_timeout: Duration::from_secs(self.scheduling.store_timeout_secs),
        }
    }

    pub fn api_address(&self) -> String {
        format!("{}:{}", self.server.api_host, self.server.api_port)
    }
}

/// `$SLOTKEEPER_CONFIG`, else `~/.config/slotkeeper/config.toml`.
pub fn default_config_path() -> PathBuf {
    if let Ok(path) = std::env::var(CONFIG_ENV_VAR) {
        return PathBuf::from(path);
    }
    dirs_next::config_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("slotkeeper")
        .join("config.toml")
}
