// Temporal module - Time-domain feature extraction
//
// This module computes features directly from the raw (unwindowed) frame:
// energy, zero-crossing rate and crest factor.
//
// References:
// - Peeters, G. (2004). A large set of audio features for sound description
// - Lerch, A. (2012). An Introduction to Audio Content Analysis

/// RMS below which the crest factor is reported as 0
const CREST_RMS_FLOOR: f32 = 1e-9;

/// Temporal feature computation functions
pub struct TemporalFeatures;

impl TemporalFeatures {
    /// Compute root-mean-square amplitude
    ///
    /// Formula: RMS = sqrt(Σx[n]² / N)
    pub fn compute_rms(frame: &[f32]) -> f32 {
        if frame.is_empty() {
            return 0.0;
        }
        let sum_sq: f64 = frame.iter().map(|&x| x as f64 * x as f64).sum();
        (sum_sq / frame.len() as f64).sqrt() as f32
    }

    /// Compute zero-crossing rate (ZCR)
    ///
    /// Counts adjacent pairs whose signs differ, with zero counted as
    /// non-negative, normalized by the number of pairs.
    ///
    /// # Arguments
    /// * `frame` - Time-domain audio signal
    ///
    /// # Returns
    /// Zero-crossing rate (0.0 to 1.0)
    pub fn compute_zcr(frame: &[f32]) -> f32 {
        if frame.len() < 2 {
            return 0.0;
        }

        let crossings = frame
            .windows(2)
            .filter(|pair| (pair[0] >= 0.0) != (pair[1] >= 0.0))
            .count();

        crossings as f32 / (frame.len() - 1) as f32
    }

    /// Compute crest factor: max|x| / RMS
    ///
    /// Returns 0 when the RMS is below 1e-9.
    pub fn compute_crest(frame: &[f32], rms: f32) -> f32 {
        if rms < CREST_RMS_FLOOR {
            return 0.0;
        }
        let peak = frame.iter().fold(0.0f32, |acc, &x| acc.max(x.abs()));
        peak / rms
    }
}
