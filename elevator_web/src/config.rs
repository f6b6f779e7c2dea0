//! Server configuration.
//!
//! Values are layered: compiled defaults, then an optional TOML file, then the
//! environment (`ELEVATOR_SECRET_KEY`, or `SECRET_KEY`), then CLI flags.

use serde::Deserialize;
use std::net::SocketAddr;
use std::path::{Path, PathBuf};

/// Minimum secret length accepted for cookie key derivation.
pub const MIN_SECRET_LEN: usize = 32;

/// Database path that selects the in-memory counter store.
pub const IN_MEMORY_DATABASE: &str = ":memory:";

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read config {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("malformed config: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("secret key must be at least 32 bytes, got {0}")]
    SecretTooShort(usize),
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// TCP address to bind.
    pub bind: SocketAddr,

    /// Scenario catalog (JSON, or TOML by extension).
    pub catalog_path: PathBuf,

    /// SQLite file for aggregate statistics, or `:memory:`.
    pub database_path: PathBuf,

    /// Directory served under `/static`.
    pub static_dir: PathBuf,

    /// Master secret for the session cookie. A random per-process key is used
    /// when unset, which logs everyone out on restart.
    pub secret_key: Option<String>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind: SocketAddr::from(([127, 0, 0, 1], 5000)),
            catalog_path: PathBuf::from("data/scenarios.json"),
            database_path: PathBuf::from("elevator.db"),
            static_dir: PathBuf::from("static"),
            secret_key: None,
        }
    }
}

impl ServerConfig {
    /// Parse a TOML config document. Missing keys keep their defaults.
    pub fn from_toml_str(source: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(source)?)
    }

    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_toml_str(&content)
    }

    /// Apply a secret from the environment, if one is set.
    pub fn with_env_secret(mut self, lookup: impl Fn(&str) -> Option<String>) -> Self {
        if let Some(secret) = lookup("ELEVATOR_SECRET_KEY").or_else(|| lookup("SECRET_KEY")) {
            self.secret_key = Some(secret);
        }
        self
    }

    /// Check values that cannot be expressed in the types.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if let Some(secret) = &self.secret_key {
            if secret.len() < MIN_SECRET_LEN {
                return Err(ConfigError::SecretTooShort(secret.len()));
            }
        }
        Ok(())
    }

    pub fn uses_in_memory_database(&self) -> bool {
        self.database_path.as_os_str() == IN_MEMORY_DATABASE
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_toml_keeps_defaults() {
        let config = ServerConfig::from_toml_str(
            r#"
bind = "0.0.0.0:8080"
database_path = ":memory:"
"#,
        )
        .unwrap();

        assert_eq!(config.bind.port(), 8080);
        assert!(config.uses_in_memory_database());
        assert_eq!(config.catalog_path, PathBuf::from("data/scenarios.json"));
        assert!(config.secret_key.is_none());
    }

    #[test]
    fn test_malformed_toml() {
        assert!(matches!(
            ServerConfig::from_toml_str("bind = 12"),
            Err(ConfigError::Toml(_))
        ));
    }

    #[test]
    fn test_env_secret_precedence() {
        let env = |key: &str| match key {
            "ELEVATOR_SECRET_KEY" => Some("a".repeat(40)),
            "SECRET_KEY" => Some("b".repeat(40)),
            _ => None,
        };
        let config = ServerConfig::default().with_env_secret(env);
        assert_eq!(config.secret_key, Some("a".repeat(40)));

        let fallback = ServerConfig::default().with_env_secret(|key| {
            (key == "SECRET_KEY").then(|| "c".repeat(32))
        });
        assert_eq!(fallback.secret_key, Some("c".repeat(32)));
    }

    #[test]
    fn test_short_secret_rejected() {
        let config = ServerConfig {
            secret_key: Some("dev-secret-change-me".to_string()),
            ..Default::default()
        };
        assert!(matches!(config.validate(), Err(ConfigError::SecretTooShort(20))));
        assert!(ServerConfig::default().validate().is_ok());
    }

    #[test]
    fn test_example_config_parses() {
        let path = concat!(env!("CARGO_MANIFEST_DIR"), "/../elevator.example.toml");
        let config = ServerConfig::from_file(path).unwrap();
        assert_eq!(config, ServerConfig::default());
    }
}
