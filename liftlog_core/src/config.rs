//! Configuration file support for Liftlog.
//!
//! Configuration is loaded from `$XDG_CONFIG_HOME/liftlog/config.toml`.
//! `LIFTLOG_GATEWAY_URL`, `LIFTLOG_GATEWAY_KEY` and `LIFTLOG_GATEWAY_TOKEN`
//! override the gateway section so credentials can stay out of the file.

use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

pub const GATEWAY_URL_ENV: &str = "LIFTLOG_GATEWAY_URL";
pub const GATEWAY_KEY_ENV: &str = "LIFTLOG_GATEWAY_KEY";
pub const GATEWAY_TOKEN_ENV: &str = "LIFTLOG_GATEWAY_TOKEN";

/// Application configuration
#[derive(Clone, Debug, Serialize, Deserialize, Default)]
pub struct Config {
    #[serde(default)]
    pub data: DataConfig,

    #[serde(default)]
    pub draft: DraftConfig,

    #[serde(default)]
    pub gateway: GatewayConfig,

    #[serde(default)]
    pub food: FoodConfig,
}

/// Data storage configuration
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct DataConfig {
    #[serde(default = "default_data_dir")]
    pub data_dir: PathBuf,
}

impl Default for DataConfig {
    fn default() -> Self {
        Self {
            data_dir: default_data_dir(),
        }
    }
}

/// Workout draft defaults
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct DraftConfig {
    #[serde(default = "default_namespace")]
    pub namespace: String,

    #[serde(default = "default_set_count")]
    pub default_set_count: u32,

    /// Seconds
    #[serde(default = "default_rest_time")]
    pub default_rest_time: u32,
}

impl Default for DraftConfig {
    fn default() -> Self {
        Self {
            namespace: default_namespace(),
            default_set_count: default_set_count(),
            default_rest_time: default_rest_time(),
        }
    }
}

/// Hosted backend connection
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct GatewayConfig {
    #[serde(default)]
    pub url: String,

    #[serde(default)]
    pub api_key: String,

    /// Signed-in user's access token; calls are anonymous without it
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub access_token: Option<String>,

    #[serde(default = "default_gateway_timeout")]
    pub timeout_secs: u64,
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            url: String::new(),
            api_key: String::new(),
            access_token: None,
            timeout_secs: default_gateway_timeout(),
        }
    }
}

impl GatewayConfig {
    /// Fail early when the backend has not been configured
    pub fn validate(&self) -> Result<()> {
        if self.url.trim().is_empty() {
            return Err(Error::Config(format!(
                "gateway.url is not set (set it in config.toml or {})",
                GATEWAY_URL_ENV
            )));
        }
        if self.api_key.trim().is_empty() {
            return Err(Error::Config(format!(
                "gateway.api_key is not set (set it in config.toml or {})",
                GATEWAY_KEY_ENV
            )));
        }
        Ok(())
    }
}

/// Public food-database upstream
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct FoodConfig {
    #[serde(default = "default_food_base_url")]
    pub base_url: String,

    #[serde(default = "default_food_timeout")]
    pub timeout_secs: u64,

    #[serde(default = "default_user_agent")]
    pub user_agent: String,

    #[serde(default = "default_search_limit")]
    pub search_limit: u32,
}

impl Default for FoodConfig {
    fn default() -> Self {
        Self {
            base_url: default_food_base_url(),
            timeout_secs: default_food_timeout(),
            user_agent: default_user_agent(),
            search_limit: default_search_limit(),
        }
    }
}

// Default value functions
fn default_data_dir() -> PathBuf {
    let base = dirs::data_local_dir()
        .or_else(|| dirs::home_dir().map(|home| home.join(".local/share")))
        .unwrap_or_else(|| PathBuf::from("."));
    base.join("liftlog")
}

fn default_namespace() -> String {
    "workout-draft".into()
}

fn default_set_count() -> u32 {
    1
}

fn default_rest_time() -> u32 {
    90
}

fn default_gateway_timeout() -> u64 {
    15
}

fn default_food_base_url() -> String {
    "https://world.openfoodfacts.org".into()
}

fn default_food_timeout() -> u64 {
    10
}

fn default_user_agent() -> String {
    format!("liftlog/{}", env!("CARGO_PKG_VERSION"))
}

fn default_search_limit() -> u32 {
    20
}

impl Config {
    /// Load configuration from the standard config path
    pub fn load() -> Result<Self> {
        let config_path = Self::default_config_path();
        let mut config = if config_path.exists() {
            Self::load_from(&config_path)?
        } else {
            tracing::debug!(
                "No config file found at {:?}, using defaults",
                config_path
            );
            Self::default()
        };
        config.apply_env();
        Ok(config)
    }

    /// Load configuration from a specific path
    pub fn load_from(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)?;
        let config: Config = toml::from_str(&contents)?;
        tracing::debug!("Loaded config from {:?}", path);
        Ok(config)
    }

    /// Apply environment overrides for the gateway section
    pub fn apply_env(&mut self) {
        if let Ok(url) = std::env::var(GATEWAY_URL_ENV) {
            self.gateway.url = url;
        }
        if let Ok(key) = std::env::var(GATEWAY_KEY_ENV) {
            self.gateway.api_key = key;
        }
        if let Ok(token) = std::env::var(GATEWAY_TOKEN_ENV) {
            self.gateway.access_token = Some(token);
        }
    }

    /// Get the default config file path
    pub fn default_config_path() -> PathBuf {
        let base = dirs::config_dir()
            .or_else(|| dirs::home_dir().map(|home| home.join(".config")))
            .unwrap_or_else(|| PathBuf::from("."));
        base.join("liftlog").join("config.toml")
    }

    /// Directory holding persisted drafts
    pub fn draft_dir(&self) -> PathBuf {
        self.data.data_dir.join("drafts")
    }

    /// Save the current configuration to a specific path
    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let contents = toml::to_string_pretty(self)
            .map_err(|e| Error::Config(format!("Failed to serialize config: {}", e)))?;
        std::fs::write(path, contents)?;
        tracing::info!("Saved config to {:?}", path);
        Ok(())
    }
}
