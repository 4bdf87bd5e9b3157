//! TOML configuration parsing and validation.
//!
//! Only `[db]` is required; every other section falls back to defaults.
//!
//! ```toml
//! [db]
//! path = "./data/stress.sqlite"
//!
//! [server]
//! bind = "127.0.0.1:7340"
//!
//! [meter]
//! default_email = "default@user.com"
//! default_name = "Асноўны Стрэсометр"
//!
//! [history]
//! recent_limit = 5
//! ```

use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};

use stressometer_core::context::{DefaultIdentity, DEFAULT_EMAIL, DEFAULT_METER_NAME};

#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    pub db: DbConfig,
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub meter: MeterConfig,
    #[serde(default)]
    pub history: HistoryConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct DbConfig {
    pub path: PathBuf,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    #[serde(default = "default_bind")]
    pub bind: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind: default_bind(),
        }
    }
}

fn default_bind() -> String {
    "127.0.0.1:7340".to_string()
}

/// Identity of the implicit user and meter.
#[derive(Debug, Deserialize, Clone)]
pub struct MeterConfig {
    #[serde(default = "default_email")]
    pub default_email: String,
    #[serde(default = "default_meter_name")]
    pub default_name: String,
}

impl Default for MeterConfig {
    fn default() -> Self {
        Self {
            default_email: default_email(),
            default_name: default_meter_name(),
        }
    }
}

fn default_email() -> String {
    DEFAULT_EMAIL.to_string()
}
fn default_meter_name() -> String {
    DEFAULT_METER_NAME.to_string()
}

#[derive(Debug, Deserialize, Clone)]
pub struct HistoryConfig {
    /// How many entries the "recent" views show.
    #[serde(default = "default_recent_limit")]
    pub recent_limit: usize,
}

impl Default for HistoryConfig {
    fn default() -> Self {
        Self {
            recent_limit: default_recent_limit(),
        }
    }
}

fn default_recent_limit() -> usize {
    5
}

impl MeterConfig {
    pub fn identity(&self) -> DefaultIdentity {
        DefaultIdentity {
            email: self.default_email.clone(),
            meter_name: self.default_name.clone(),
        }
    }
}

pub fn load_config(path: &Path) -> Result<Config> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file: {}", path.display()))?;

    let config: Config = toml::from_str(&content).with_context(|| "Failed to parse config file")?;

    validate(&config)?;
    Ok(config)
}

fn validate(config: &Config) -> Result<()> {
    if config.history.recent_limit == 0 {
        anyhow::bail!("history.recent_limit must be >= 1");
    }

    if !config.meter.default_email.contains('@') {
        anyhow::bail!(
            "meter.default_email must be an email address, got '{}'",
            config.meter.default_email
        );
    }

    if config.meter.default_name.trim().is_empty() {
        anyhow::bail!("meter.default_name must not be empty");
    }

    Ok(())
}
