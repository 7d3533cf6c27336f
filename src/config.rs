//! Configuration management for the group detection pipeline

use crate::error::GroupError;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Thresholds and trace dimensions for a pipeline run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Minimum clique size K
    pub min_clique_size: usize,

    /// Consistency threshold gamma (also the Jaccard overlap threshold)
    pub gamma: f64,

    /// Member frequency threshold delta
    pub delta: f64,

    /// Mean contact duration threshold beta
    pub beta: f64,

    /// Length of one day bucket T_i, in seconds
    pub day_length: u64,

    /// Number of days N in the trace
    pub trace_days: u32,

    /// First day for which cliques are extracted (from day - 1 contacts)
    pub first_clique_day: u32,

    /// Denominator of the consistency ratio
    pub consistency_days: u32,

    /// Seed re-picks per day after the first seed
    pub max_update_attempts: usize,

    /// Groups smaller than this are discarded by the selector
    pub min_group_size: usize,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            min_clique_size: 3,
            gamma: 0.5,
            delta: 0.5,
            beta: 0.05,
            day_length: 86_400,
            trace_days: 11,
            first_clique_day: 2,
            consistency_days: 6,
            max_update_attempts: 4,
            min_group_size: 3,
        }
    }
}

impl Config {
    /// Load a configuration from a JSON file; missing keys take defaults
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self, GroupError> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|e| GroupError::io(path, e))?;
        let config: Config = serde_json::from_str(&text)?;
        Ok(config)
    }

    /// Days for which cliques are extracted
    pub fn clique_days(&self) -> std::ops::Range<u32> {
        self.first_clique_day..self.trace_days
    }

    pub fn validate(&self) -> Result<(), GroupError> {
        if self.min_clique_size < 2 {
            return Err(GroupError::invalid_config(
                "min_clique_size must be at least 2",
            ));
        }
        if !(0.0..=1.0).contains(&self.gamma) {
            return Err(GroupError::invalid_config("gamma must be within [0, 1]"));
        }
        if !(0.0..=1.0).contains(&self.delta) {
            return Err(GroupError::invalid_config("delta must be within [0, 1]"));
        }
        if !self.beta.is_finite() {
            return Err(GroupError::invalid_config("beta must be finite"));
        }
        if self.day_length == 0 {
            return Err(GroupError::invalid_config("day_length must be positive"));
        }
        if self.first_clique_day == 0 {
            return Err(GroupError::invalid_config(
                "first_clique_day must be at least 1",
            ));
        }
        if self.trace_days <= self.first_clique_day {
            return Err(GroupError::invalid_config(format!(
                "trace_days ({}) must exceed first_clique_day ({})",
                self.trace_days, self.first_clique_day
            )));
        }
        if self.consistency_days == 0 {
            return Err(GroupError::invalid_config(
                "consistency_days must be positive",
            ));
        }
        if self.min_group_size == 0 {
            return Err(GroupError::invalid_config("min_group_size must be positive"));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_default_config_is_valid() {
        let config = Config::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.min_clique_size, 3);
        assert_eq!(config.day_length, 86_400);
        assert_eq!(config.clique_days(), 2..11);
    }

    #[test]
    fn test_rejects_out_of_range_gamma() {
        let config = Config {
            gamma: 1.5,
            ..Config::default()
        };
        assert!(matches!(
            config.validate(),
            Err(GroupError::InvalidConfig { .. })
        ));
    }

    #[test]
    fn test_rejects_short_trace() {
        let config = Config {
            trace_days: 2,
            ..Config::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_partial_json_uses_defaults() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, r#"{{ "gamma": 0.6, "trace_days": 20 }}"#).unwrap();

        let config = Config::from_json_file(file.path()).unwrap();
        assert_eq!(config.gamma, 0.6);
        assert_eq!(config.trace_days, 20);
        assert_eq!(config.delta, 0.5);
        assert_eq!(config.max_update_attempts, 4);
    }

    #[test]
    fn test_missing_config_file_is_io_error() {
        let err = Config::from_json_file("/nonexistent/config.json").unwrap_err();
        assert!(matches!(err, GroupError::Io { .. }));
    }
}
