//! Application configuration management

use anyhow::{anyhow, Context, Result};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use super::fetcher::FetcherConfig;
use super::scoring::ScoringConfig;

/// Main application configuration structure
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AppConfig {
    pub fetch: FetcherConfig,
    pub scoring: ScoringConfig,
}

impl AppConfig {
    /// Load configuration from disk, creating the default file if absent.
    pub fn load() -> Result<Self> {
        let config_path = Self::get_config_path()?;

        if config_path.exists() {
            let config = Self::load_from(&config_path)?;
            tracing::info!("Loaded configuration from: {:?}", config_path);
            Ok(config)
        } else {
            let config = Self::default();
            config.save()?;
            tracing::info!("Created default configuration at: {:?}", config_path);
            Ok(config)
        }
    }

    /// Save configuration to its on-disk location.
    pub fn save(&self) -> Result<()> {
        let config_path = Self::get_config_path()?;
        self.save_to(&config_path)?;
        tracing::info!("Saved configuration to: {:?}", config_path);
        Ok(())
    }

    /// Read and validate a configuration file.
    pub fn load_from(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {:?}", path))?;

        let config: AppConfig =
            serde_json::from_str(&content).with_context(|| "Failed to parse config file")?;
        config.validate()?;

        Ok(config)
    }

    /// Write a configuration file, creating parent directories as needed.
    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create config directory: {:?}", parent))?;
        }

        let content =
            serde_json::to_string_pretty(self).with_context(|| "Failed to serialize config")?;

        std::fs::write(path, content)
            .with_context(|| format!("Failed to write config file: {:?}", path))?;

        Ok(())
    }

    /// Reject configurations no component could run with.
    pub fn validate(&self) -> Result<()> {
        if self.fetch.timeout_seconds == 0 {
            return Err(anyhow!("fetch.timeout_seconds must be at least 1"));
        }
        if self.fetch.output_dir.is_empty() {
            return Err(anyhow!("fetch.output_dir must not be empty"));
        }
        if self.scoring.batch_size == 0 {
            return Err(anyhow!("scoring.batch_size must be at least 1"));
        }
        Ok(())
    }

    /// Get the path to the configuration file
    pub fn get_config_path() -> Result<PathBuf> {
        let project_dirs = ProjectDirs::from("com", "thumbscore", "thumbscore")
            .with_context(|| "Failed to get project directories")?;

        Ok(project_dirs.config_dir().join("config.json"))
    }
}
