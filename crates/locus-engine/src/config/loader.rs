use super::schema::LocusConfig;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::debug;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),
    #[error("Failed to parse config file: {0}")]
    Parse(#[from] serde_yaml::Error),
    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

pub struct ConfigLoader;

impl ConfigLoader {
    /// Load from default locations:
    /// 1. ./locus.yaml
    /// 2. ~/.locus/config.yaml
    /// 3. Default configuration
    pub async fn load_default() -> Result<LocusConfig, ConfigError> {
        let local_config = PathBuf::from("./locus.yaml");
        if local_config.exists() {
            return Self::load_from(&local_config).await;
        }

        if let Some(home) = dirs::home_dir() {
            let home_config = home.join(".locus").join("config.yaml");
            if home_config.exists() {
                return Self::load_from(&home_config).await;
            }
        }

        debug!("no config file found, using defaults");
        Ok(LocusConfig::default())
    }

    pub async fn load_from(path: &Path) -> Result<LocusConfig, ConfigError> {
        debug!(path = %path.display(), "loading config");
        let content = tokio::fs::read_to_string(path).await?;
        Self::parse(&content)
    }

    /// An empty document yields the defaults.
    pub fn parse(content: &str) -> Result<LocusConfig, ConfigError> {
        let config: LocusConfig = if content.trim().is_empty() {
            LocusConfig::default()
        } else {
            serde_yaml::from_str(content)?
        };
        config.resolver.validate().map_err(ConfigError::Invalid)?;
        Ok(config)
    }
}
