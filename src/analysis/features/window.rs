// Window module - tapering weights applied before spectral analysis

/// Hamming window coefficients
const HAMMING_ALPHA: f32 = 0.54;
const HAMMING_BETA: f32 = 0.46;

/// Compute a Hamming window of `n` points
///
/// Formula: w[i] = 0.54 − 0.46 × cos(2πi / (n − 1))
///
/// Endpoints are 0.08 and the peak is 1.0. The formula is undefined for
/// `n <= 1`; those lengths get all-ones weights.
pub fn hamming_window(n: usize) -> Vec<f32> {
    if n <= 1 {
        return vec![1.0; n];
    }

    let denom = (n - 1) as f32;
    (0..n)
        .map(|i| {
            HAMMING_ALPHA
                - HAMMING_BETA * ((2.0 * std::f32::consts::PI * i as f32) / denom).cos()
        })
        .collect()
}
