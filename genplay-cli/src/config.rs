//! Configuration handling for the GenPlay CLI
//!
//! Supports loading configuration from genplay.toml files with CLI argument overrides.

use anyhow::{Context, Result};
use genplay_core::operation::{BinningMethod, IslandResult};
use genplay_core::pool::DEFAULT_STOP_CHECK_INTERVAL;
use genplay_core::{GenomicPos, PoolConfig, Score};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub general: GeneralConfig,
    #[serde(default)]
    pub pool: PoolSection,
    #[serde(default)]
    pub density: DensityConfig,
    #[serde(default)]
    pub islands: IslandConfig,
    #[serde(default)]
    pub binning: BinningConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeneralConfig {
    /// Run every operation on a single thread, in chromosome order
    #[serde(default)]
    pub deterministic: bool,

    /// Default number of worker threads
    #[serde(default = "default_threads")]
    pub threads: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PoolSection {
    /// Windows processed between two polls of the stop flag
    #[serde(default = "default_stop_check_interval")]
    pub stop_check_interval: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DensityConfig {
    /// Neighbours taken on each side of a window
    #[serde(default = "default_half_width")]
    pub half_width: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IslandConfig {
    #[serde(default = "default_island_threshold")]
    pub threshold: Score,

    /// Largest gap in bases inside one island
    #[serde(default)]
    pub max_gap: GenomicPos,

    /// Shortest island kept, in bases
    #[serde(default = "default_min_island_length")]
    pub min_island_length: GenomicPos,

    #[serde(default)]
    pub result: IslandResult,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BinningConfig {
    #[serde(default = "default_bin_size")]
    pub bin_size: GenomicPos,

    #[serde(default)]
    pub method: BinningMethod,
}

// Default value functions
fn default_threads() -> usize { num_cpus::get() }
fn default_stop_check_interval() -> usize { DEFAULT_STOP_CHECK_INTERVAL }
fn default_half_width() -> usize { genplay_core::operation::density::DEFAULT_HALF_WIDTH }
fn default_island_threshold() -> Score { 1.0 }
fn default_min_island_length() -> GenomicPos { 1 }
fn default_bin_size() -> GenomicPos { 1000 }

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            deterministic: false,
            threads: default_threads(),
        }
    }
}

impl Default for PoolSection {
    fn default() -> Self {
        Self {
            stop_check_interval: default_stop_check_interval(),
        }
    }
}

impl Default for DensityConfig {
    fn default() -> Self {
        Self {
            half_width: default_half_width(),
        }
    }
}

impl Default for IslandConfig {
    fn default() -> Self {
        Self {
            threshold: default_island_threshold(),
            max_gap: 0,
            min_island_length: default_min_island_length(),
            result: IslandResult::default(),
        }
    }
}

impl Default for BinningConfig {
    fn default() -> Self {
        Self {
            bin_size: default_bin_size(),
            method: BinningMethod::default(),
        }
    }
}

impl Config {
    /// Load configuration from file or use defaults
    pub fn load(config_path: Option<&Path>) -> Result<Self> {
        let config = match config_path {
            Some(path) => {
                log::info!("Loading configuration from: {}", path.display());
                Self::load_from_file(path)?
            }
            None => {
                let default_path = PathBuf::from("genplay.toml");
                if default_path.exists() {
                    log::info!("Loading configuration from: genplay.toml");
                    Self::load_from_file(&default_path)?
                } else {
                    log::debug!("Using default configuration");
                    Self::default()
                }
            }
        };

        Ok(config)
    }

    /// Load configuration from a specific TOML file
    pub fn load_from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read configuration file: {}", path.display()))?;

        let config: Config = toml::from_str(&content)
            .with_context(|| format!("Failed to parse configuration file: {}", path.display()))?;

        Ok(config)
    }

    /// Save configuration to a TOML file
    pub fn save_to_file(&self, path: &Path) -> Result<()> {
        let content = toml::to_string_pretty(self)
            .context("Failed to serialize configuration")?;

        std::fs::write(path, content)
            .with_context(|| format!("Failed to write configuration file: {}", path.display()))?;

        Ok(())
    }

    /// Generate example configuration file content
    pub fn example_toml() -> Result<String> {
        toml::to_string_pretty(&Self::default())
            .context("Failed to serialize default configuration")
    }

    /// Pool settings with an optional thread-count override
    pub fn pool_config(&self, threads: Option<usize>) -> PoolConfig {
        PoolConfig::new()
            .with_threads(threads.unwrap_or(self.general.threads))
            .with_stop_check_interval(self.pool.stop_check_interval)
    }
}
