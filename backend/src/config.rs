use std::{fs::File, io::Read, path::Path};

use serde::{Deserialize, Serialize};

use crate::{
    category::CategoryMap,
    geohash::{DEFAULT_PRECISION, MAX_PRECISION},
    polyline::Sampling,
    region::RegionTable,
    retry::RetryPolicy,
    trail::{DifficultyPolicy, DEFAULT_SPEED_KMH},
};

pub const CONFIG_ENV: &str = "TRAILGEO_CONFIG";

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read config file: {0}")]
    Io(#[from] std::io::Error),
    #[error("invalid config file: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("invalid config: {0}")]
    Invalid(String),
}

/// Lookup tables and tunables shared by the HTTP service and batch binaries.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub geohash_precision: usize,
    pub speed_kmh: f64,
    pub difficulty: DifficultyPolicy,
    pub regions: RegionTable,
    pub categories: CategoryMap,
    pub checkpoint_interval: usize,
    pub retry: RetryPolicy,
    /// Thinning for the flat `polyline` array stored on trail documents.
    pub sampling: Sampling,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            geohash_precision: DEFAULT_PRECISION,
            speed_kmh: DEFAULT_SPEED_KMH,
            difficulty: DifficultyPolicy::default(),
            regions: RegionTable::default(),
            categories: CategoryMap::default(),
            checkpoint_interval: 10,
            retry: RetryPolicy::default(),
            sampling: Sampling::default(),
        }
    }
}

impl AppConfig {
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let file = File::open(path)?;
        Self::from_reader(file)
    }

    pub fn from_reader<R: Read>(reader: R) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_reader(reader)?;
        config.validate()?;
        Ok(config)
    }

    /// Read the file named by `TRAILGEO_CONFIG`, or fall back to defaults.
    pub fn from_env() -> Result<Self, ConfigError> {
        match std::env::var(CONFIG_ENV) {
            Ok(path) => {
                tracing::info!("loading config from {path}");
                Self::from_file(path)
            }
            Err(_) => Ok(Self::default()),
        }
    }

    /// Load `path` when given, otherwise defer to [`AppConfig::from_env`].
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        match path {
            Some(path) => Self::from_file(path),
            None => Self::from_env(),
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.geohash_precision == 0 || self.geohash_precision > MAX_PRECISION {
            return Err(ConfigError::Invalid(format!(
                "geohash_precision must be between 1 and {MAX_PRECISION}, got {}",
                self.geohash_precision
            )));
        }
        if !self.speed_kmh.is_finite() || self.speed_kmh <= 0.0 {
            return Err(ConfigError::Invalid(format!(
                "speed_kmh must be positive, got {}",
                self.speed_kmh
            )));
        }
        if !self.difficulty.is_ascending() {
            return Err(ConfigError::Invalid(
                "difficulty thresholds must not decrease from easy to challenging".into(),
            ));
        }
        let inverted = self.regions.inverted_regions();
        if !inverted.is_empty() {
            return Err(ConfigError::Invalid(format!(
                "regions with inverted bounds: {}",
                inverted.join(", ")
            )));
        }
        if self.sampling.step == 0 {
            return Err(ConfigError::Invalid("sampling.step must be at least 1".into()));
        }
        if self.checkpoint_interval == 0 {
            return Err(ConfigError::Invalid(
                "checkpoint_interval must be at least 1".into(),
            ));
        }
        Ok(())
    }
}
