//! Configuration management for feature extraction
//!
//! This module provides runtime configuration loading from JSON files so the
//! cepstral resolution and roll-off threshold can be changed without
//! recompilation. The three DSP parameters determine the feature-vector
//! layout, so every row of one output table must share a single config.

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

use crate::error::ExtractionError;

/// Default number of cepstral coefficients
pub const DEFAULT_N_MFCC: usize = 13;

/// Default number of mel filters
pub const DEFAULT_N_MELS: usize = 26;

/// Default spectral roll-off fraction (85% of total magnitude)
pub const DEFAULT_ROLLOFF_FRACTION: f32 = 0.85;

/// Feature extraction parameters
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExtractorConfig {
    /// Number of cepstral coefficients kept per frame
    pub n_mfcc: usize,
    /// Number of triangular mel filters
    pub n_mels: usize,
    /// Fraction of total magnitude that defines the roll-off frequency
    pub rolloff_fraction: f32,
    /// Worker threads for batch extraction (0 = available parallelism)
    pub workers: usize,
}

impl Default for ExtractorConfig {
    /// Default configuration values (fallback if config file not found)
    fn default() -> Self {
        Self {
            n_mfcc: DEFAULT_N_MFCC,
            n_mels: DEFAULT_N_MELS,
            rolloff_fraction: DEFAULT_ROLLOFF_FRACTION,
            workers: 0,
        }
    }
}

impl ExtractorConfig {
    /// Load configuration from JSON file
    ///
    /// # Arguments
    /// * `path` - Path to JSON config file
    ///
    /// # Returns
    /// Loaded configuration, or the defaults if the file doesn't exist or
    /// its JSON is invalid
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Self {
        match fs::read_to_string(&path) {
            Ok(contents) => match serde_json::from_str(&contents) {
                Ok(config) => {
                    log::info!("[Config] Loaded configuration from {:?}", path.as_ref());
                    config
                }
                Err(err) => {
                    log::warn!(
                        "[Config] Failed to parse JSON from {:?}: {}. Using defaults.",
                        path.as_ref(),
                        err
                    );
                    Self::default()
                }
            },
            Err(err) => {
                log::warn!(
                    "[Config] Failed to read config file {:?}: {}. Using defaults.",
                    path.as_ref(),
                    err
                );
                Self::default()
            }
        }
    }

    /// Check that the parameters describe a usable extractor
    pub fn validate(&self) -> Result<(), ExtractionError> {
        if self.n_mfcc == 0 {
            return Err(ExtractionError::InvalidConfig {
                reason: "n_mfcc must be > 0".to_string(),
            });
        }
        if self.n_mels == 0 {
            return Err(ExtractionError::InvalidConfig {
                reason: "n_mels must be > 0".to_string(),
            });
        }
        if !(self.rolloff_fraction > 0.0 && self.rolloff_fraction <= 1.0) {
            return Err(ExtractionError::InvalidConfig {
                reason: format!(
                    "rolloff_fraction must be in (0, 1] (got {})",
                    self.rolloff_fraction
                ),
            });
        }
        Ok(())
    }

    /// Resolve the worker count, substituting available parallelism for 0
    pub fn effective_workers(&self) -> usize {
        if self.workers > 0 {
            return self.workers;
        }
        std::thread::available_parallelism()
            .map(|n| n.get())
            .unwrap_or(1)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_default_config() {
        let config = ExtractorConfig::default();
        assert_eq!(config.n_mfcc, 13);
        assert_eq!(config.n_mels, 26);
        assert_eq!(config.rolloff_fraction, 0.85);
        assert_eq!(config.workers, 0);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_json_roundtrip() {
        let config = ExtractorConfig {
            n_mfcc: 20,
            n_mels: 40,
            rolloff_fraction: 0.9,
            workers: 2,
        };
        let json = serde_json::to_string_pretty(&config).unwrap();
        let parsed: ExtractorConfig = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, config);
    }

    #[test]
    fn test_partial_json_fills_defaults() {
        let parsed: ExtractorConfig = serde_json::from_str(r#"{ "n_mfcc": 20 }"#).unwrap();
        assert_eq!(parsed.n_mfcc, 20);
        assert_eq!(parsed.n_mels, DEFAULT_N_MELS);
        assert_eq!(parsed.rolloff_fraction, DEFAULT_ROLLOFF_FRACTION);
    }

    #[test]
    fn test_load_missing_file_falls_back_to_defaults() {
        let config = ExtractorConfig::load_from_file("/definitely/not/here.json");
        assert_eq!(config, ExtractorConfig::default());
    }

    #[test]
    fn test_load_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, r#"{{ "n_mels": 40, "rolloff_fraction": 0.95 }}"#).unwrap();
        let config = ExtractorConfig::load_from_file(file.path());
        assert_eq!(config.n_mels, 40);
        assert_eq!(config.rolloff_fraction, 0.95);
        assert_eq!(config.n_mfcc, DEFAULT_N_MFCC);
    }

    #[test]
    fn test_validate_rejects_bad_values() {
        let mut config = ExtractorConfig::default();
        config.n_mfcc = 0;
        assert!(config.validate().is_err());

        let mut config = ExtractorConfig::default();
        config.n_mels = 0;
        assert!(config.validate().is_err());

        for fraction in [0.0, -0.5, 1.5, f32::NAN] {
            let mut config = ExtractorConfig::default();
            config.rolloff_fraction = fraction;
            assert!(config.validate().is_err(), "fraction {} accepted", fraction);
        }
    }

    #[test]
    fn test_effective_workers_never_zero() {
        assert!(ExtractorConfig::default().effective_workers() >= 1);
        let config = ExtractorConfig {
            workers: 3,
            ..ExtractorConfig::default()
        };
        assert_eq!(config.effective_workers(), 3);
    }
}
