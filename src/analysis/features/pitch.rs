// Pitch module - fundamental frequency and voicing via autocorrelation
//
// Algorithm:
// 1. Lag range from the F0 search band: lag = sample_rate / F0 for F0 in [75, 500] Hz,
//    max lag clamped to frame_len - 1
// 2. Zero-lag energy E = Σ x[i]²; below 1e-6 the frame is silent (unvoiced)
// 3. r(lag) = Σ x[i]·x[i+lag] / E for every lag in range; the best r is the harmonicity
// 4. Voiced iff harmonicity > 0.85, with F0 = sample_rate / best_lag
//
// Plain peak picking on the autocorrelation is prone to octave errors. That is
// an accepted approximation of this estimator.
//
// The normalization uses the full-frame energy, so r(lag) of a perfectly
// periodic frame is bounded by (frame_len - lag) / frame_len. Short frames
// therefore need several periods of the fundamental to cross the threshold.

use super::types::PitchEstimate;

/// Lowest fundamental searched (Hz)
pub const MIN_F0_HZ: f32 = 75.0;

/// Highest fundamental searched (Hz)
pub const MAX_F0_HZ: f32 = 500.0;

/// Autocorrelation peak required to call a frame voiced
pub const VOICING_THRESHOLD: f32 = 0.85;

/// Zero-lag energy below which a frame counts as silent
const SILENCE_ENERGY: f64 = 1e-6;

/// Autocorrelation pitch estimator for one sample rate
pub struct PitchEstimator {
    sample_rate: u32,
    min_lag: usize,
    max_lag: usize,
}

impl PitchEstimator {
    /// Create a pitch estimator
    ///
    /// # Arguments
    /// * `sample_rate` - Audio sample rate in Hz
    pub fn new(sample_rate: u32) -> Self {
        Self {
            sample_rate,
            min_lag: (sample_rate as f32 / MAX_F0_HZ) as usize,
            max_lag: (sample_rate as f32 / MIN_F0_HZ) as usize,
        }
    }

    /// Estimate F0 and harmonicity of one frame
    ///
    /// # Returns
    /// `PitchEstimate` with `f0_hz = 0` for unvoiced frames. Harmonicity is
    /// reported for unvoiced frames too, except silent ones where it is 0.
    pub fn estimate(&self, frame: &[f32]) -> PitchEstimate {
        if frame.len() < 2 {
            return PitchEstimate::unvoiced(0.0);
        }

        let max_lag = self.max_lag.min(frame.len() - 1);

        let energy: f64 = frame.iter().map(|&x| x as f64 * x as f64).sum();
        if energy < SILENCE_ENERGY {
            return PitchEstimate::unvoiced(0.0);
        }

        let mut best: Option<(usize, f32)> = None;
        for lag in self.min_lag..=max_lag {
            let sum: f64 = frame[..frame.len() - lag]
                .iter()
                .zip(&frame[lag..])
                .map(|(&a, &b)| a as f64 * b as f64)
                .sum();
            let normalized = (sum / energy) as f32;
            if best.map_or(true, |(_, value)| normalized > value) {
                best = Some((lag, normalized));
            }
        }

        match best {
            Some((lag, harmonicity)) if harmonicity > VOICING_THRESHOLD && lag > 0 => {
                PitchEstimate {
                    f0_hz: self.sample_rate as f32 / lag as f32,
                    harmonicity,
                    voiced: true,
                }
            }
            Some((_, harmonicity)) => PitchEstimate::unvoiced(harmonicity),
            // Frame too short for the lowest searched lag
            None => PitchEstimate::unvoiced(0.0),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sine(frequency: f32, sample_rate: u32, len: usize) -> Vec<f32> {
        (0..len)
            .map(|i| {
                (2.0 * std::f32::consts::PI * frequency * i as f32 / sample_rate as f32).sin()
            })
            .collect()
    }

    #[test]
    fn test_lag_range_for_16k() {
        let estimator = PitchEstimator::new(16_000);
        assert_eq!(estimator.min_lag, 32);
        assert_eq!(estimator.max_lag, 213);
    }

    #[test]
    fn test_200hz_sine_is_voiced() {
        let estimator = PitchEstimator::new(16_000);
        let frame = sine(200.0, 16_000, 1024);
        let estimate = estimator.estimate(&frame);

        assert!(estimate.voiced, "estimate: {:?}", estimate);
        assert!(
            (estimate.f0_hz - 200.0).abs() < 5.0,
            "f0 = {}",
            estimate.f0_hz
        );
        assert!(estimate.harmonicity > VOICING_THRESHOLD);
    }

    #[test]
    fn test_silence_is_unvoiced_with_zero_harmonicity() {
        let estimator = PitchEstimator::new(16_000);
        let estimate = estimator.estimate(&vec![0.0; 1024]);
        assert_eq!(estimate.f0_hz, 0.0);
        assert_eq!(estimate.harmonicity, 0.0);
        assert!(!estimate.voiced);
    }

    #[test]
    fn test_short_frame_reports_harmonicity_but_stays_unvoiced() {
        // 480 samples hold 6 periods of 200 Hz; the lag-80 peak is ~400/480
        let estimator = PitchEstimator::new(16_000);
        let estimate = estimator.estimate(&sine(200.0, 16_000, 480));
        assert!(!estimate.voiced);
        assert_eq!(estimate.f0_hz, 0.0);
        assert!(
            (estimate.harmonicity - 400.0 / 480.0).abs() < 0.02,
            "harmonicity = {}",
            estimate.harmonicity
        );
    }

    #[test]
    fn test_white_noise_is_unvoiced() {
        use rand::{rngs::StdRng, Rng, SeedableRng};

        let mut rng = StdRng::seed_from_u64(7);
        let frame: Vec<f32> = (0..1024).map(|_| rng.gen_range(-1.0..1.0)).collect();
        let estimate = PitchEstimator::new(16_000).estimate(&frame);
        assert!(!estimate.voiced, "estimate: {:?}", estimate);
        assert_eq!(estimate.f0_hz, 0.0);
        assert!(estimate.harmonicity < 0.5);
    }

    #[test]
    fn test_frame_shorter_than_min_lag() {
        let estimate = PitchEstimator::new(16_000).estimate(&sine(1000.0, 16_000, 20));
        assert_eq!(estimate, PitchEstimate::unvoiced(0.0));
    }

    #[test]
    fn test_max_lag_clamped_to_frame() {
        let estimator = PitchEstimator::new(16_000);
        // 100 samples: lags 32..=99 only, must not index past the frame
        let estimate = estimator.estimate(&sine(400.0, 16_000, 100));
        assert!(estimate.harmonicity.is_finite());
    }
}
