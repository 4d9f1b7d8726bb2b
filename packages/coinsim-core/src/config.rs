//! Runtime configuration.
//!
//! Read from `$COINSIM_CONFIG` or `<config dir>/coinsim/config.toml`, then
//! overridden by environment variables:
//!
//! - `COINCAP_API_KEY` - API key for price lookups
//! - `COINSIM_API_URL` - price API base URL
//! - `COINSIM_LEDGER_FILE` - ledger file path

use crate::price::DEFAULT_API_BASE_URL;
use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::env;
use std::fs;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct Config {
    /// CoinCap API key
    #[serde(skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,
    /// Price API base URL
    pub api_base_url: String,
    /// Ledger file location
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ledger_file: Option<PathBuf>,
    /// Price request timeout in seconds
    pub request_timeout_secs: u64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api_key: None,
            api_base_url: DEFAULT_API_BASE_URL.to_string(),
            ledger_file: None,
            request_timeout_secs: 30,
        }
    }
}

impl Config {
    /// Load the config file (if any) and apply environment overrides.
    pub fn load() -> Result<Self> {
        let mut config = Self::load_from_path(&Self::default_path())?;
        config.apply_env(|key| env::var(key).ok());
        Ok(config)
    }

    /// Get the default config file path.
    pub fn default_path() -> PathBuf {
        if let Ok(path) = env::var("COINSIM_CONFIG") {
            return PathBuf::from(path);
        }

        directories::ProjectDirs::from("", "", "coinsim")
            .map(|dirs| dirs.config_dir().join("config.toml"))
            .unwrap_or_else(|| PathBuf::from("coinsim.toml"))
    }

    /// Load from a specific path. A missing file yields the defaults.
    pub fn load_from_path(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }

        let content = fs::read_to_string(path)?;
        Self::from_toml_str(&content)
    }

    pub fn from_toml_str(content: &str) -> Result<Self> {
        Ok(toml::from_str(content)?)
    }

    /// Apply overrides from `lookup` (normally the process environment).
    /// Empty values are ignored.
    pub fn apply_env(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        if let Some(key) = get("COINCAP_API_KEY") {
            self.api_key = Some(key);
        }
        if let Some(url) = get("COINSIM_API_URL") {
            self.api_base_url = url;
        }
        if let Some(path) = get("COINSIM_LEDGER_FILE") {
            self.ledger_file = Some(PathBuf::from(path));
        }
    }

    /// API key, required for price lookups.
    pub fn api_key(&self) -> Result<&str> {
        self.api_key
            .as_deref()
            .filter(|k| !k.trim().is_empty())
            .ok_or(Error::MissingApiKey)
    }

    /// Ledger file to use: configured path, else `~/.coinsim/portfolio.json`.
    pub fn ledger_path(&self) -> PathBuf {
        if let Some(path) = &self.ledger_file {
            return path.clone();
        }

        directories::BaseDirs::new()
            .map(|dirs| dirs.home_dir().join(".coinsim/portfolio.json"))
            .unwrap_or_else(|| PathBuf::from("portfolio.json"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use tempfile::tempdir;

    #[test]
    fn test_defaults() {
        let config = Config::default();
        assert_eq!(config.api_base_url, "https://rest.coincap.io/v3");
        assert_eq!(config.request_timeout_secs, 30);
        assert!(matches!(config.api_key(), Err(Error::MissingApiKey)));
    }

    #[test]
    fn test_partial_toml_keeps_defaults() {
        let config = Config::from_toml_str(
            r#"
            api_key = "secret"
            ledger_file = "/tmp/coinsim/ledger.json"
            "#,
        )
        .unwrap();

        assert_eq!(config.api_key().unwrap(), "secret");
        assert_eq!(config.ledger_path(), PathBuf::from("/tmp/coinsim/ledger.json"));
        assert_eq!(config.api_base_url, DEFAULT_API_BASE_URL);
        assert_eq!(config.request_timeout_secs, 30);
    }

    #[test]
    fn test_invalid_toml() {
        let result = Config::from_toml_str("request_timeout_secs = \"soon\"");
        assert!(matches!(result, Err(Error::Toml(_))));
    }

    #[test]
    fn test_env_overrides_file() {
        let mut config = Config::from_toml_str(r#"api_key = "from-file""#).unwrap();
        let env: HashMap<&str, &str> = [
            ("COINCAP_API_KEY", "from-env"),
            ("COINSIM_API_URL", "http://localhost:9000/v3"),
            ("COINSIM_LEDGER_FILE", ""),
        ]
        .into_iter()
        .collect();

        config.apply_env(|key| env.get(key).map(|v| v.to_string()));

        assert_eq!(config.api_key().unwrap(), "from-env");
        assert_eq!(config.api_base_url, "http://localhost:9000/v3");
        assert_eq!(config.ledger_file, None);
    }

    #[test]
    fn test_blank_api_key_is_missing() {
        let config = Config {
            api_key: Some("  ".to_string()),
            ..Default::default()
        };
        assert!(matches!(config.api_key(), Err(Error::MissingApiKey)));
    }

    #[test]
    fn test_load_missing_file_is_default() {
        let dir = tempdir().unwrap();
        let config = Config::load_from_path(&dir.path().join("absent.toml")).unwrap();
        assert_eq!(config, Config::default());
    }

    #[test]
    fn test_load_from_file() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("config.toml");
        fs::write(&path, "request_timeout_secs = 5\n").unwrap();

        let config = Config::load_from_path(&path).unwrap();
        assert_eq!(config.request_timeout_secs, 5);
    }
}
