// Stats module - summary statistics of one scalar trajectory
//
// Mixed divisors: the standard deviation is the sample estimate (count - 1),
// while skewness and kurtosis use population moments (divisor count) scaled by
// that sample standard deviation. Everything accumulates in f64.

use ndarray::ArrayView1;

/// Standard deviation below which higher moments are reported as 0
const FLAT_STD: f64 = 1e-9;

/// Four statistics of one trajectory, in column order
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct FeatureStats {
    pub mean: f64,
    pub std: f64,
    pub skewness: f64,
    /// Excess kurtosis (0 for a normal distribution)
    pub kurtosis: f64,
}

impl FeatureStats {
    /// Column suffixes, matching [`FeatureStats::values`]
    pub const NAMES: [&'static str; 4] = ["mean", "std", "skew", "kurt"];

    pub fn values(&self) -> [f64; 4] {
        [self.mean, self.std, self.skewness, self.kurtosis]
    }

    /// Value for the statistic at position `index` of [`FeatureStats::NAMES`]
    pub fn get(&self, index: usize) -> f64 {
        self.values()[index]
    }
}

/// Summarize a trajectory
///
/// - empty: all zeros
/// - one value: mean = value, everything else 0
/// - flat (std < 1e-9): std = skewness = kurtosis = 0
pub fn compute_stats(values: ArrayView1<'_, f32>) -> FeatureStats {
    let count = values.len();
    if count == 0 {
        return FeatureStats::default();
    }

    let n = count as f64;
    let mean = values.iter().map(|&v| v as f64).sum::<f64>() / n;
    if count == 1 {
        return FeatureStats {
            mean,
            ..FeatureStats::default()
        };
    }

    let (mut m2, mut m3, mut m4) = (0.0f64, 0.0f64, 0.0f64);
    for &v in values.iter() {
        let d = v as f64 - mean;
        let d2 = d * d;
        m2 += d2;
        m3 += d2 * d;
        m4 += d2 * d2;
    }

    let std = (m2 / (n - 1.0)).sqrt();
    if std < FLAT_STD {
        return FeatureStats {
            mean,
            ..FeatureStats::default()
        };
    }

    FeatureStats {
        mean,
        std,
        skewness: (m3 / n) / std.powi(3),
        kurtosis: (m4 / n) / std.powi(4) - 3.0,
    }
}

/// Convenience wrapper over a plain slice
pub fn compute_stats_slice(values: &[f32]) -> FeatureStats {
    compute_stats(ArrayView1::from(values))
}
