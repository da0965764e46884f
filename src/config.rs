// Node configuration, loaded from an optional TOML file

use serde::Deserialize;
use thiserror::Error;

use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Environment variable naming the configuration file
pub const CONFIG_PATH_VAR: &str = "LEDGER_CONFIG";

/// Errors that can occur while loading configuration
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid configuration: {0}")]
    Parse(#[from] toml::de::Error),
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct NodeConfig {
    #[serde(default = "default_host")]
    pub host: String,

    #[serde(default = "default_port")]
    pub port: u16,

    /// Upper bound on a single proof search, in seconds
    #[serde(default = "default_mining_timeout_secs")]
    pub mining_timeout_secs: u64,

    /// env_logger filter used when RUST_LOG is unset
    #[serde(default = "default_log_filter")]
    pub log_filter: String,
}

fn default_host() -> String {
    "127.0.0.1".to_string()
}

fn default_port() -> u16 {
    8080
}

fn default_mining_timeout_secs() -> u64 {
    30
}

fn default_log_filter() -> String {
    "info".to_string()
}

impl Default for NodeConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            mining_timeout_secs: default_mining_timeout_secs(),
            log_filter: default_log_filter(),
        }
    }
}

impl NodeConfig {
    /// Loads the file named by `LEDGER_CONFIG`, or the defaults when unset
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Same as [`NodeConfig::from_env`], through an arbitrary key lookup
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        match lookup(CONFIG_PATH_VAR) {
            Some(path) => Self::from_file(path),
            None => Ok(Self::default()),
        }
    }

    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let contents = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;

        Self::from_toml_str(&contents)
    }

    /// Parses TOML; missing keys take their defaults
    pub fn from_toml_str(contents: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(contents)?)
    }

    pub fn mining_timeout(&self) -> Duration {
        Duration::from_secs(self.mining_timeout_secs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_without_config_file() {
        let config = NodeConfig::from_lookup(|_| None).unwrap();

        assert_eq!(config, NodeConfig::default());
        assert_eq!(config.port, 8080);
        assert_eq!(config.mining_timeout(), Duration::from_secs(30));
    }

    #[test]
    fn test_full_file() {
        let config = NodeConfig::from_toml_str(
            r#"
            host = "0.0.0.0"
            port = 9000
            mining_timeout_secs = 5
            log_filter = "debug"
            "#,
        )
        .unwrap();

        assert_eq!(config.host, "0.0.0.0");
        assert_eq!(config.port, 9000);
        assert_eq!(config.mining_timeout_secs, 5);
        assert_eq!(config.log_filter, "debug");
    }

    #[test]
    fn test_partial_file_keeps_defaults() {
        let config = NodeConfig::from_toml_str("port = 3000").unwrap();

        assert_eq!(config.port, 3000);
        assert_eq!(config.host, "127.0.0.1");
        assert_eq!(config.mining_timeout_secs, 30);
    }

    #[test]
    fn test_invalid_values() {
        assert!(matches!(
            NodeConfig::from_toml_str(r#"port = "eighty""#),
            Err(ConfigError::Parse(_))
        ));
        assert!(matches!(
            NodeConfig::from_toml_str("port = 70000"),
            Err(ConfigError::Parse(_))
        ));
        assert!(matches!(
            NodeConfig::from_toml_str("difficulty = 4"),
            Err(ConfigError::Parse(_))
        ));
    }

    #[test]
    fn test_from_lookup_reads_file() {
        let path = env::temp_dir().join(format!("proof_ledger_config_{}.toml", std::process::id()));
        fs::write(&path, "port = 9100\nmining_timeout_secs = 2\n").unwrap();

        let lookup_path = path.to_string_lossy().into_owned();
        let config = NodeConfig::from_lookup(|key| {
            (key == CONFIG_PATH_VAR).then(|| lookup_path.clone())
        })
        .unwrap();
        fs::remove_file(&path).unwrap();

        assert_eq!(config.port, 9100);
        assert_eq!(config.mining_timeout(), Duration::from_secs(2));
    }

    #[test]
    fn test_missing_file() {
        let result = NodeConfig::from_file("/nonexistent/proof_ledger.toml");

        assert!(matches!(result, Err(ConfigError::Read { .. })));
    }
}
