use crate::normalize::TimeUnit;
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub store: StoreConfig,

    #[serde(default)]
    pub display: DisplayConfig,
}

/// Where records live
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "backend", rename_all = "lowercase")]
pub enum StoreConfig {
    /// One JSON file per entity in `dir`
    Json { dir: PathBuf },

    /// Spreadsheet web app at `url`
    Sheets { url: String },
}

impl Default for StoreConfig {
    fn default() -> Self {
        StoreConfig::Json {
            dir: Config::app_dir()
                .map(|dir| dir.join("data"))
                .unwrap_or_else(|_| PathBuf::from("allotment-data")),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DisplayConfig {
    #[serde(default)]
    pub time_unit: TimeUnit,

    #[serde(default = "default_currency")]
    pub currency: String,
}

fn default_currency() -> String {
    "USD".to_string()
}

impl Default for DisplayConfig {
    fn default() -> Self {
        Self {
            time_unit: TimeUnit::default(),
            currency: default_currency(),
        }
    }
}

impl Config {
    /// Load configuration from `path`, writing defaults there on first use
    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            let config = Config::default();
            config.save_to(path)?;
            return Ok(config);
        }

        let contents = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file {}", path.display()))?;

        let config: Config = toml::from_str(&contents)
            .with_context(|| format!("Failed to parse config file {}", path.display()))?;

        Ok(config)
    }

    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).context("Failed to create config directory")?;
        }

        let toml_string = toml::to_string_pretty(self).context("Failed to serialize config")?;

        fs::write(path, toml_string).context("Failed to write config file")?;

        Ok(())
    }

    /// `~/.allotment`
    pub fn app_dir() -> Result<PathBuf> {
        let home = dirs::home_dir().context("Could not determine home directory")?;
        Ok(home.join(".allotment"))
    }

    /// Get the configuration file path
    pub fn config_path() -> Result<PathBuf> {
        Ok(Self::app_dir()?.join("config.toml"))
    }

    pub fn use_json_store(&mut self, dir: PathBuf) {
        self.store = StoreConfig::Json { dir };
    }

    pub fn use_sheets_store(&mut self, url: String) {
        self.store = StoreConfig::Sheets { url };
    }
}
