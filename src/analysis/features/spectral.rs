// Spectral module - Frequency-domain feature extraction
//
// This module computes spectral shape features from magnitude spectra.
// All features are based on the magnitude spectrum (absolute values of FFT bins),
// with bin k at frequency k × sample_rate / fft_size.
//
// References:
// - Peeters, G. (2004). A large set of audio features for sound description
// - Lerch, A. (2012). An Introduction to Audio Content Analysis

use super::types::SpectralShape;

/// Total magnitude below which the spectrum counts as silent
const SILENT_MAGNITUDE: f64 = 1e-9;

/// Offset inside the log of the geometric mean
const FLATNESS_LOG_EPSILON: f64 = 1e-9;

/// Spectral feature computation functions
pub struct SpectralFeatures {
    sample_rate: u32,
    fft_size: usize,
    rolloff_fraction: f32,
}

impl SpectralFeatures {
    /// Create a new spectral features processor
    ///
    /// # Arguments
    /// * `sample_rate` - Audio sample rate in Hz
    /// * `fft_size` - FFT window size
    /// * `rolloff_fraction` - Share of total magnitude defining the roll-off (e.g. 0.85)
    pub fn new(sample_rate: u32, fft_size: usize, rolloff_fraction: f32) -> Self {
        Self {
            sample_rate,
            fft_size,
            rolloff_fraction,
        }
    }

    fn bin_frequency(&self, bin: usize) -> f64 {
        bin as f64 * self.sample_rate as f64 / self.fft_size as f64
    }

    /// Compute centroid, roll-off, bandwidth and flatness in one pass set
    ///
    /// Formulas:
    /// - centroid = Σ(f_k × |X[k]|) / Σ|X[k]|
    /// - bandwidth = sqrt(Σ((f_k − centroid)² × |X[k]|) / Σ|X[k]|)
    /// - flatness = exp(mean(ln(|X[k]| + 1e-9))) / mean(|X[k]|)
    ///
    /// Centroid, bandwidth and flatness are 0 for a silent spectrum.
    ///
    /// # Arguments
    /// * `magnitude` - Magnitude spectrum (bins 0..=fft_size/2)
    pub fn compute_shape(&self, magnitude: &[f32]) -> SpectralShape {
        if magnitude.is_empty() {
            return SpectralShape::default();
        }

        let mut magnitude_sum = 0.0f64;
        let mut weighted_sum = 0.0f64;
        let mut log_sum = 0.0f64;
        for (k, &mag) in magnitude.iter().enumerate() {
            let mag = mag as f64;
            magnitude_sum += mag;
            weighted_sum += mag * self.bin_frequency(k);
            log_sum += (mag + FLATNESS_LOG_EPSILON).ln();
        }

        let rolloff = self.compute_rolloff(magnitude, magnitude_sum);

        if magnitude_sum <= SILENT_MAGNITUDE {
            return SpectralShape {
                rolloff,
                ..SpectralShape::default()
            };
        }

        let n = magnitude.len() as f64;
        let centroid = weighted_sum / magnitude_sum;
        let flatness = (log_sum / n).exp() / (magnitude_sum / n);

        let spread: f64 = magnitude
            .iter()
            .enumerate()
            .map(|(k, &mag)| {
                let deviation = self.bin_frequency(k) - centroid;
                deviation * deviation * mag as f64
            })
            .sum();
        let bandwidth = (spread / magnitude_sum).sqrt();

        SpectralShape {
            centroid: centroid as f32,
            rolloff,
            bandwidth: bandwidth as f32,
            flatness: flatness as f32,
        }
    }

    /// Compute spectral roll-off
    ///
    /// Lowest bin frequency at which the cumulative magnitude reaches
    /// `rolloff_fraction` of the total. Returns 0 for a silent spectrum or
    /// if rounding keeps the cumulative sum short of the target.
    fn compute_rolloff(&self, magnitude: &[f32], magnitude_sum: f64) -> f32 {
        if magnitude_sum <= SILENT_MAGNITUDE {
            return 0.0;
        }

        let target = magnitude_sum * self.rolloff_fraction as f64;
        let mut cumulative = 0.0f64;
        for (k, &mag) in magnitude.iter().enumerate() {
            cumulative += mag as f64;
            if cumulative >= target {
                return self.bin_frequency(k) as f32;
            }
        }
        0.0
    }

    /// Compute spectral flux against the previous frame
    ///
    /// Formula: flux = sqrt(Σ(|X_t[k]| − |X_(t−1)[k]|)² / n_bins)
    ///
    /// The division by n_bins makes flux depend on the FFT size, so values
    /// are only comparable between recordings sharing a frame length.
    ///
    /// # Arguments
    /// * `magnitude` - Current magnitude spectrum
    /// * `previous` - Previous frame's magnitude spectrum, `None` for the first frame
    pub fn compute_flux(magnitude: &[f32], previous: Option<&[f32]>) -> f32 {
        let Some(previous) = previous else {
            return 0.0;
        };
        if magnitude.is_empty() {
            return 0.0;
        }

        let sum_sq: f64 = magnitude
            .iter()
            .zip(previous)
            .map(|(&a, &b)| {
                let diff = a as f64 - b as f64;
                diff * diff
            })
            .sum();
        (sum_sq / magnitude.len() as f64).sqrt() as f32
    }
}
