//! Configuration for zhcorpus

mod logging;
mod sources;

pub use logging::{LogFormat, LogLevel, LoggingConfig};
pub use sources::{CedictConfig, SyncConfig, TatoebaConfig};

use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Main configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Data directory for the embedded store
    #[serde(default = "default_data_dir")]
    pub data_dir: PathBuf,
    /// Pipeline-wide sync settings
    #[serde(default)]
    pub sync: SyncConfig,
    /// CEDICT source settings
    #[serde(default)]
    pub cedict: CedictConfig,
    /// Tatoeba source settings
    #[serde(default)]
    pub tatoeba: TatoebaConfig,
    /// Logging settings
    #[serde(default)]
    pub logging: LoggingConfig,
}

fn default_data_dir() -> PathBuf {
    directories::ProjectDirs::from("", "", "zhcorpus")
        .map(|d| d.data_dir().to_path_buf())
        .unwrap_or_else(|| PathBuf::from(".zhcorpus"))
}

impl Default for Config {
    fn default() -> Self {
        Self {
            data_dir: default_data_dir(),
            sync: SyncConfig::default(),
            cedict: CedictConfig::default(),
            tatoeba: TatoebaConfig::default(),
            logging: LoggingConfig::default(),
        }
    }
}

impl Config {
    /// Load configuration from a TOML file and validate it
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            anyhow::anyhow!("Failed to read config file '{}': {}", path.display(), e)
        })?;
        let config: Config = toml::from_str(&content).map_err(|e| {
            anyhow::anyhow!("Failed to parse config file '{}': {}", path.display(), e)
        })?;
        config.validate()?;
        Ok(config)
    }

    /// Validate all fields, reporting every problem at once
    pub fn validate(&self) -> Result<()> {
        let mut errors: Vec<String> = Vec::new();

        if self.sync.batch_size == 0 {
            errors.push("sync.batch_size must be positive".to_string());
        }
        if self.sync.freshness_days <= 0 {
            errors.push("sync.freshness_days must be positive".to_string());
        }
        if self.cedict.url.is_empty() {
            errors.push("cedict.url must not be empty".to_string());
        }
        if self.tatoeba.links_url.is_empty() {
            errors.push("tatoeba.links_url must not be empty".to_string());
        }
        if !self.tatoeba.sentences_url_template.contains("{lang}") {
            errors.push(
                "tatoeba.sentences_url_template must contain a {lang} placeholder".to_string(),
            );
        }
        for lang in &self.tatoeba.languages {
            if lang.len() != 3 || !lang.chars().all(|c| c.is_ascii_lowercase()) {
                errors.push(format!(
                    "tatoeba.languages entry '{}' is not an ISO 639-3 code",
                    lang
                ));
            }
        }

        if errors.is_empty() {
            Ok(())
        } else {
            anyhow::bail!("Invalid configuration:\n  - {}", errors.join("\n  - "))
        }
    }

    /// Serialize the default configuration as TOML
    pub fn default_toml() -> Result<String> {
        Ok(toml::to_string_pretty(&Config::default())?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        Config::default().validate().unwrap();
    }

    #[test]
    fn test_default_toml_round_trips() {
        let text = Config::default_toml().unwrap();
        let parsed: Config = toml::from_str(&text).unwrap();
        parsed.validate().unwrap();
        assert_eq!(parsed.sync.batch_size, Config::default().sync.batch_size);
    }

    #[test]
    fn test_validation_collects_all_errors() {
        let mut config = Config::default();
        config.sync.batch_size = 0;
        config.cedict.url = String::new();
        config.tatoeba.languages = vec!["english".to_string()];

        let err = config.validate().unwrap_err().to_string();
        assert!(err.contains("batch_size"));
        assert!(err.contains("cedict.url"));
        assert!(err.contains("ISO 639-3"));
    }

    #[test]
    fn test_partial_toml_uses_defaults() {
        let config: Config = toml::from_str("data_dir = \"/tmp/zh\"").unwrap();
        assert_eq!(config.data_dir, PathBuf::from("/tmp/zh"));
        assert_eq!(config.sync.batch_size, SyncConfig::default().batch_size);
        assert!(!config.tatoeba.languages.is_empty());
    }
}
