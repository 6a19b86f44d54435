use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;

use crate::error::SyncError;
use crate::league::League;

pub const DEFAULT_CONFIG_PATH: &str = "config/default.toml";

#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    pub provider: ProviderConfig,
    pub rate_limit: RateLimitConfig,
    pub storage: StorageConfig,
    pub sync: SyncConfig,
    pub monitoring: MonitoringConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ProviderConfig {
    pub base_url: String,
    pub timeout_seconds: u64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RateLimitConfig {
    pub requests_per_second: u32,
    pub burst_size: u32,
}

#[derive(Debug, Clone, Deserialize)]
pub struct StorageConfig {
    pub data_dir: PathBuf,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SyncConfig {
    pub leagues: Vec<League>,
    pub transaction_days: u32,
    pub write_combined: bool,
    pub sweep_transactions: bool,
}

#[derive(Debug, Clone, Deserialize)]
pub struct MonitoringConfig {
    pub log_level: String,
    #[serde(default)]
    pub log_format: LogFormat,
}

/// `json` for scheduled runs whose output is collected, `pretty` at a terminal.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Json,
    Pretty,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            provider: ProviderConfig {
                base_url: "https://api.sportsdata.io/v3".to_string(),
                timeout_seconds: 30,
            },
            rate_limit: RateLimitConfig {
                requests_per_second: 5,
                burst_size: 10,
            },
            storage: StorageConfig {
                data_dir: PathBuf::from("data"),
            },
            sync: SyncConfig {
                leagues: League::ALL.to_vec(),
                transaction_days: 30,
                write_combined: true,
                sweep_transactions: true,
            },
            monitoring: MonitoringConfig {
                log_level: "info".to_string(),
                log_format: LogFormat::Json,
            },
        }
    }
}

/// Secrets loaded exclusively from environment variables.
/// Not serializable, not stored in config files.
pub struct Secrets {
    pub api_key: Option<SecretString>,
}

impl Secrets {
    pub fn from_env() -> Self {
        // `key=` is the legacy .env entry; the named variable wins.
        let api_key = ["SPORTSDATA_API_KEY", "key"]
            .iter()
            .filter_map(|name| std::env::var(name).ok())
            .map(|v| v.trim().to_string())
            .find(|v| !v.is_empty())
            .map(SecretString::from);
        Self { api_key }
    }

    /// The provider key, or the run-fatal configuration error.
    pub fn require_api_key(&self) -> std::result::Result<SecretString, SyncError> {
        self.api_key
            .as_ref()
            .map(|key| SecretString::from(key.expose_secret().to_string()))
            .ok_or_else(|| {
                SyncError::Config(
                    "missing API key: set SPORTSDATA_API_KEY or add key=YOUR_API_KEY to .env"
                        .to_string(),
                )
            })
    }
}

impl AppConfig {
    /// Load configuration from a TOML file, overlaying environment variables for secrets.
    pub fn load(config_path: &Path) -> Result<(Self, Secrets)> {
        dotenvy::dotenv().ok();

        let contents = std::fs::read_to_string(config_path)
            .with_context(|| format!("Failed to read config file: {}", config_path.display()))?;

        let config: AppConfig = toml::from_str(&contents)
            .with_context(|| format!("Failed to parse {}", config_path.display()))?;

        let secrets = Secrets::from_env();

        Ok((config, secrets))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_default_config() {
        let contents = std::fs::read_to_string(DEFAULT_CONFIG_PATH)
            .expect("config/default.toml should exist");
        let config: AppConfig = toml::from_str(&contents).expect("should parse");
        assert_eq!(config.sync.leagues, League::ALL.to_vec());
        assert_eq!(config.sync.transaction_days, 30);
        assert!(config.sync.write_combined);
        assert_eq!(config.storage.data_dir, PathBuf::from("data"));
        assert_eq!(config.provider.base_url, "https://api.sportsdata.io/v3");
    }

    #[test]
    fn test_default_matches_file_leagues() {
        let config = AppConfig::default();
        assert_eq!(config.sync.leagues.len(), 4);
        assert_eq!(config.sync.leagues[2], League::Nfl);
    }

    #[test]
    fn test_log_format_defaults_to_json() {
        let monitoring: MonitoringConfig = toml::from_str(r#"log_level = "debug""#).unwrap();
        assert_eq!(monitoring.log_format, LogFormat::Json);

        let monitoring: MonitoringConfig =
            toml::from_str("log_level = \"info\"\nlog_format = \"pretty\"").unwrap();
        assert_eq!(monitoring.log_format, LogFormat::Pretty);
        assert!(toml::from_str::<MonitoringConfig>("log_level = \"info\"\nlog_format = \"xml\"").is_err());
    }

    #[test]
    fn test_missing_key_is_config_error() {
        let secrets = Secrets { api_key: None };
        let err = secrets.require_api_key().unwrap_err();
        assert!(err.is_config());
    }
}
