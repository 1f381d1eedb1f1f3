use anyhow::{Context, Result};
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::filter::GeoFilterSet;
use crate::resolver::{ResolverOptions, DEFAULT_RELOAD_DEBOUNCE};

#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    pub resolver: ResolverConfig,
    #[serde(default)]
    pub filters: GeoFilterSet,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ResolverConfig {
    pub dataset_path: PathBuf,
    #[serde(default)]
    pub watch: bool,
    #[serde(default = "default_debounce_ms")]
    pub debounce_ms: u64,
}

fn default_debounce_ms() -> u64 {
    DEFAULT_RELOAD_DEBOUNCE.as_millis() as u64
}

impl ResolverConfig {
    pub fn options(&self) -> ResolverOptions {
        ResolverOptions {
            debounce: Duration::from_millis(self.debounce_ms),
        }
    }
}

impl Config {
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = fs::read_to_string(path).context("Failed to read config file")?;
        Self::from_toml(&content)
    }

    pub fn from_toml(content: &str) -> Result<Self> {
        let config: Config = toml::from_str(content).context("Failed to parse config file")?;
        Ok(config)
    }
}
