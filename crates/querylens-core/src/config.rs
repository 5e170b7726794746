//! Optimizer configuration
//!
//! Thresholds and history sizing, loadable from a TOML file:
//!
//! ```toml
//! max_history_size = 500
//! slow_query_threshold_ms = 250
//! expensive_sort_cost = 1000.0
//! inefficient_join_cost = 10000.0
//! leaderboard_size = 10
//! ```

use crate::{QueryLensError, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Configuration for the analyzer and its history
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OptimizerConfig {
    /// Maximum number of records kept in history (oldest evicted first)
    pub max_history_size: usize,
    /// Execution time above which a query counts as slow
    pub slow_query_threshold_ms: u64,
    /// Sort nodes costlier than this are reported as expensive
    pub expensive_sort_cost: f64,
    /// Nested loop nodes costlier than this are reported as inefficient
    pub inefficient_join_cost: f64,
    /// Length of the slow-query and frequent-query leaderboards
    pub leaderboard_size: usize,
}

impl Default for OptimizerConfig {
    fn default() -> Self {
        Self {
            max_history_size: 1000,
            slow_query_threshold_ms: 1000,
            expensive_sort_cost: 1000.0,
            inefficient_join_cost: 10_000.0,
            leaderboard_size: 10,
        }
    }
}

impl OptimizerConfig {
    /// Creates a new config with default values
    pub fn new() -> Self {
        Self::default()
    }

    /// Parses a config from TOML text; missing keys keep their defaults
    pub fn from_toml_str(text: &str) -> Result<Self> {
        let config: Self = toml::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    /// Loads and validates a config file
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        tracing::debug!(path = %path.display(), "loading optimizer config");
        let text = std::fs::read_to_string(path)?;
        Self::from_toml_str(&text)
    }

    /// Loads the config at [`default_config_path`], or defaults if there is none
    pub fn load_or_default() -> Result<Self> {
        match default_config_path() {
            Some(path) if path.exists() => Self::load(path),
            _ => Ok(Self::default()),
        }
    }

    /// Rejects values that would make the analyzer meaningless
    pub fn validate(&self) -> Result<()> {
        if self.max_history_size == 0 {
            return Err(QueryLensError::Configuration(
                "max_history_size must be at least 1".into(),
            ));
        }
        if self.expensive_sort_cost.is_nan() || self.expensive_sort_cost <= 0.0 {
            return Err(QueryLensError::Configuration(format!(
                "expensive_sort_cost must be positive, got {}",
                self.expensive_sort_cost
            )));
        }
        if self.inefficient_join_cost.is_nan() || self.inefficient_join_cost <= 0.0 {
            return Err(QueryLensError::Configuration(format!(
                "inefficient_join_cost must be positive, got {}",
                self.inefficient_join_cost
            )));
        }
        Ok(())
    }

    /// Slow-query threshold as a duration
    pub fn slow_query_threshold(&self) -> Duration {
        Duration::from_millis(self.slow_query_threshold_ms)
    }

    /// Sets the history capacity
    pub fn with_max_history_size(mut self, size: usize) -> Self {
        self.max_history_size = size;
        self
    }

    /// Sets the slow-query threshold
    pub fn with_slow_query_threshold_ms(mut self, ms: u64) -> Self {
        self.slow_query_threshold_ms = ms;
        self
    }

    /// Sets the expensive sort cost threshold
    pub fn with_expensive_sort_cost(mut self, cost: f64) -> Self {
        self.expensive_sort_cost = cost;
        self
    }

    /// Sets the inefficient join cost threshold
    pub fn with_inefficient_join_cost(mut self, cost: f64) -> Self {
        self.inefficient_join_cost = cost;
        self
    }

    /// Sets the leaderboard length
    pub fn with_leaderboard_size(mut self, size: usize) -> Self {
        self.leaderboard_size = size;
        self
    }
}

/// `<config dir>/querylens/config.toml`, if the platform has a config dir
pub fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|p| p.join("querylens").join("config.toml"))
}
