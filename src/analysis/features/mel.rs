// Mel module - mel filterbank and cepstral projection (MFCC)
//
// Pipeline per frame:
// 1. Power spectrum → n_mels filter energies (triangular mel-spaced filters)
// 2. Floor each energy at 1e-10, natural log
// 3. DCT-II over the log energies → n_mfcc coefficients
//
// The DCT is deliberately unnormalized: mfcc[k] = Σ_m logE[m]·cos(πk(m+0.5)/n_mels)
// with no sqrt(2/n_mels) factor. Downstream statistics are computed on these
// exact magnitudes, so coefficients are not unit-energy.

use std::sync::Arc;

use ndarray::{Array2, ArrayView1};

/// Floor applied to filter energies before the log
const LOG_ENERGY_FLOOR: f64 = 1e-10;

/// Convert frequency in Hz to mels (HTK formula)
pub fn hz_to_mel(hz: f32) -> f32 {
    2595.0 * (1.0 + hz / 700.0).log10()
}

/// Convert mels back to Hz
pub fn mel_to_hz(mel: f32) -> f32 {
    700.0 * (10f32.powf(mel / 2595.0) - 1.0)
}

/// Triangular mel filterbank over the positive-frequency FFT bins
///
/// Built once per (sample_rate, fft_size, n_mels) and shared read-only
/// between every frame and every worker using that configuration.
#[derive(Debug, Clone, PartialEq)]
pub struct MelFilterbank {
    sample_rate: u32,
    fft_size: usize,
    /// n_mels + 2 edge bins; filter m spans edges[m]..=edges[m + 2]
    edges: Vec<usize>,
    /// n_mels × n_bins weights
    weights: Array2<f32>,
}

impl MelFilterbank {
    /// Build the filterbank
    ///
    /// # Arguments
    /// * `sample_rate` - Sample rate in Hz
    /// * `fft_size` - FFT size (power of two)
    /// * `n_mels` - Number of triangular filters
    pub fn new(sample_rate: u32, fft_size: usize, n_mels: usize) -> Self {
        let n_bins = fft_size / 2 + 1;
        let low_mel = hz_to_mel(0.0);
        let high_mel = hz_to_mel(sample_rate as f32 / 2.0);
        let mel_step = (high_mel - low_mel) / (n_mels + 1) as f32;

        let edges: Vec<usize> = (0..n_mels + 2)
            .map(|i| {
                let hz = mel_to_hz(low_mel + mel_step * i as f32);
                let bin = ((fft_size + 1) as f32 * hz / sample_rate as f32).floor();
                (bin.max(0.0) as usize).min(n_bins - 1)
            })
            .collect();

        let mut weights = Array2::<f32>::zeros((n_mels, n_bins));
        for m in 0..n_mels {
            let (left, center, right) = (edges[m], edges[m + 1], edges[m + 2]);

            // Empty ranges cover zero-width slopes, which keep weight 0
            for k in left..center {
                weights[[m, k]] = (k - left) as f32 / (center - left) as f32;
            }
            for k in center..right {
                weights[[m, k]] = (right - k) as f32 / (right - center) as f32;
            }
        }

        Self {
            sample_rate,
            fft_size,
            edges,
            weights,
        }
    }

    pub fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    pub fn fft_size(&self) -> usize {
        self.fft_size
    }

    pub fn n_mels(&self) -> usize {
        self.weights.nrows()
    }

    pub fn n_bins(&self) -> usize {
        self.weights.ncols()
    }

    /// FFT bin edges of the filters (n_mels + 2 entries)
    pub fn edges(&self) -> &[usize] {
        &self.edges
    }

    /// Weights of filter `m` across all bins
    pub fn filter(&self, m: usize) -> ArrayView1<'_, f32> {
        self.weights.row(m)
    }

    pub fn weights(&self) -> &Array2<f32> {
        &self.weights
    }

    /// Natural-log filter energies of a power spectrum
    pub fn log_energies(&self, power: &[f32]) -> Vec<f64> {
        self.weights
            .rows()
            .into_iter()
            .map(|filter| {
                let energy: f64 = filter
                    .iter()
                    .zip(power)
                    .map(|(&w, &p)| w as f64 * p as f64)
                    .sum();
                energy.max(LOG_ENERGY_FLOOR).ln()
            })
            .collect()
    }
}

/// Cosine basis of the unnormalized DCT-II (n_mfcc × n_mels)
#[derive(Debug, Clone)]
struct CepstralBasis {
    basis: Array2<f64>,
}

impl CepstralBasis {
    fn new(n_mfcc: usize, n_mels: usize) -> Self {
        let basis = Array2::from_shape_fn((n_mfcc, n_mels), |(k, m)| {
            (std::f64::consts::PI * k as f64 * (m as f64 + 0.5) / n_mels as f64).cos()
        });
        Self { basis }
    }

    fn project(&self, log_energies: &[f64]) -> Vec<f32> {
        self.basis
            .rows()
            .into_iter()
            .map(|row| {
                row.iter()
                    .zip(log_energies)
                    .map(|(&c, &e)| c * e)
                    .sum::<f64>() as f32
            })
            .collect()
    }
}

/// MFCC computation against a shared filterbank
pub struct MfccProcessor {
    filterbank: Arc<MelFilterbank>,
    basis: CepstralBasis,
}

impl MfccProcessor {
    pub fn new(filterbank: Arc<MelFilterbank>, n_mfcc: usize) -> Self {
        let basis = CepstralBasis::new(n_mfcc, filterbank.n_mels());
        Self { filterbank, basis }
    }

    pub fn n_mfcc(&self) -> usize {
        self.basis.basis.nrows()
    }

    /// Compute MFCCs from a power spectrum (length n_bins)
    pub fn compute(&self, power: &[f32]) -> Vec<f32> {
        let log_energies = self.filterbank.log_energies(power);
        self.basis.project(&log_energies)
    }
}
