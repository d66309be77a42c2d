// FFT module - Fast Fourier Transform computation
//
// This module handles FFT computation with Hamming windowing. The transform is
// an iterative radix-2 Cooley-Tukey FFT: bit-reversal permutation followed by
// log2(n) butterfly stages. Twiddle factors are advanced by recurrence within
// each stage; the recurrence runs in f64 so its drift stays far below f32
// resolution for any frame size the engine sees.
//
// Only bins 0..=n/2 are exposed (real-input symmetry).

use rustfft::num_complex::Complex;

use super::window::hamming_window;

/// Round `n` up to the next power of two (minimum 1)
pub fn next_pow2(n: usize) -> usize {
    n.max(1).next_power_of_two()
}

/// Forward DFT of a real buffer
///
/// # Arguments
/// * `input` - Real samples; length must be a power of two and at least 2
///
/// # Returns
/// Full complex spectrum (length = input length)
///
/// # Panics
/// If the length is not a power of two >= 2. Callers round the frame size
/// up with [`next_pow2`] and zero-pad.
pub fn fft_real(input: &[f32]) -> Vec<Complex<f32>> {
    let n = input.len();
    assert!(
        n >= 2 && n.is_power_of_two(),
        "radix-2 FFT needs a power-of-two length >= 2 (got {})",
        n
    );

    let mut buffer: Vec<Complex<f32>> = input.iter().map(|&x| Complex::new(x, 0.0)).collect();
    bit_reverse(&mut buffer);
    butterflies(&mut buffer);
    buffer
}

fn bit_reverse(buffer: &mut [Complex<f32>]) {
    let n = buffer.len();
    let mut j = 0usize;
    for i in 0..n {
        if i < j {
            buffer.swap(i, j);
        }
        let mut bit = n >> 1;
        while bit > 0 && (j & bit) != 0 {
            j ^= bit;
            bit >>= 1;
        }
        j |= bit;
    }
}

fn butterflies(buffer: &mut [Complex<f32>]) {
    let n = buffer.len();
    let mut len = 2;
    while len <= n {
        let angle = -2.0 * std::f64::consts::PI / len as f64;
        let step = Complex::new(angle.cos(), angle.sin());
        let half = len / 2;

        for start in (0..n).step_by(len) {
            let mut w = Complex::new(1.0f64, 0.0);
            for j in 0..half {
                let twiddle = Complex::new(w.re as f32, w.im as f32);
                let u = buffer[start + j];
                let v = buffer[start + j + half] * twiddle;
                buffer[start + j] = u + v;
                buffer[start + j + half] = u - v;
                w *= step;
            }
        }
        len <<= 1;
    }
}

/// Magnitude and power spectra over bins 0..=fft_size/2
#[derive(Debug, Clone, PartialEq)]
pub struct Spectrum {
    /// |X[k]|
    pub magnitude: Vec<f32>,
    /// |X[k]|²
    pub power: Vec<f32>,
}

/// FFT processor that computes spectra from frames of one fixed length
pub struct FftProcessor {
    fft_size: usize,
    /// Hamming window for the frame length (pre-computed)
    window: Vec<f32>,
}

impl FftProcessor {
    /// Create a new FFT processor
    ///
    /// # Arguments
    /// * `frame_len` - Frame length in samples; the FFT size is the next power of two
    pub fn new(frame_len: usize) -> Self {
        Self {
            fft_size: next_pow2(frame_len).max(2),
            window: hamming_window(frame_len),
        }
    }

    pub fn fft_size(&self) -> usize {
        self.fft_size
    }

    /// Number of meaningful bins (fft_size / 2 + 1)
    pub fn n_bins(&self) -> usize {
        self.fft_size / 2 + 1
    }

    /// Compute magnitude and power spectra of one frame
    ///
    /// Applies the Hamming window, zero-pads to the FFT size and returns
    /// the positive-frequency half.
    ///
    /// # Arguments
    /// * `frame` - Frame samples (length <= fft_size; extra samples are ignored)
    pub fn compute_spectrum(&self, frame: &[f32]) -> Spectrum {
        let mut padded = vec![0.0f32; self.fft_size];
        for ((slot, &sample), &weight) in padded.iter_mut().zip(frame).zip(&self.window) {
            *slot = sample * weight;
        }

        let bins = fft_real(&padded);
        let magnitude: Vec<f32> = bins[..self.n_bins()].iter().map(|c| c.norm()).collect();
        let power = magnitude.iter().map(|&m| m * m).collect();

        Spectrum { magnitude, power }
    }
}
