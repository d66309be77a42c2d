// Vector module - fixed-width feature vector layout
//
// Layout, for each statistic in {mean, std, skew, kurt}:
//   mfcc01.._NN, mfcc01_delta.._NN_delta, mfcc01_delta2.._NN_delta2,
//   rms, zcr, crest, centroid, rolloff, bandwidth, flatness, flux
// followed by f0_mean, f0_std, voicing_rate, harmonicity_mean, harmonicity_std.

use serde::Serialize;

use super::features::{SCALAR_DESCRIPTOR_COUNT, SCALAR_DESCRIPTOR_NAMES};
use super::stats::FeatureStats;
use crate::error::ExtractionError;

/// Names of the trailing pitch-derived scalars
pub const PITCH_COLUMN_NAMES: [&str; 5] = [
    "f0_mean",
    "f0_std",
    "voicing_rate",
    "harmonicity_mean",
    "harmonicity_std",
];

/// Width of the feature vector for `n_mfcc` cepstral coefficients
///
/// D = 4 × (3 × n_mfcc + 8) + 5, independent of the recording length.
pub fn feature_dimension(n_mfcc: usize) -> usize {
    FeatureStats::NAMES.len() * (3 * n_mfcc + SCALAR_DESCRIPTOR_COUNT) + PITCH_COLUMN_NAMES.len()
}

/// Column names in vector order (without the `id` / `classe` prefix)
pub fn column_names(n_mfcc: usize) -> Vec<String> {
    let mut names = Vec::with_capacity(feature_dimension(n_mfcc));
    for stat in FeatureStats::NAMES {
        for suffix in ["", "_delta", "_delta2"] {
            for i in 1..=n_mfcc {
                names.push(format!("mfcc{:02}{}_{}", i, suffix, stat));
            }
        }
        for descriptor in SCALAR_DESCRIPTOR_NAMES {
            names.push(format!("{}_{}", descriptor, stat));
        }
    }
    names.extend(PITCH_COLUMN_NAMES.iter().map(|name| name.to_string()));
    names
}

/// Summary statistics of one recording, flattened in column order
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FeatureVector {
    values: Vec<f64>,
}

impl FeatureVector {
    /// Assemble and validate a vector
    ///
    /// # Errors
    /// `NonFiniteFeature` naming the first NaN/Inf column; the whole row is
    /// rejected rather than emitted partially.
    pub fn new(values: Vec<f64>) -> Result<Self, ExtractionError> {
        if let Some(column) = values.iter().position(|v| !v.is_finite()) {
            return Err(ExtractionError::NonFiniteFeature { column });
        }
        Ok(Self { values })
    }

    pub fn values(&self) -> &[f64] {
        &self.values
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Look up a value by column name
    pub fn get(&self, n_mfcc: usize, name: &str) -> Option<f64> {
        column_names(n_mfcc)
            .iter()
            .position(|column| column == name)
            .and_then(|index| self.values.get(index).copied())
    }
}
