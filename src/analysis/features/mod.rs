// FrameAnalyzer - per-frame DSP descriptors for speech feature extraction
//
// This module computes everything the summary stage needs from a single
// frame: cepstral coefficients, energy and spectral shape, frame-to-frame
// flux and an autocorrelation pitch estimate.
//
// Module organization:
// - types: Data structures (FrameDescriptors, SpectralShape, PitchEstimate)
// - window: Hamming window
// - fft: Radix-2 FFT with windowing
// - mel: Mel filterbank and MFCC projection
// - spectral: Frequency-domain features (centroid, roll-off, bandwidth, flatness, flux)
// - temporal: Time-domain features (RMS, ZCR, crest factor)
// - pitch: F0 and harmonicity via autocorrelation
// - mod.rs: Coordinator (FrameAnalyzer)
//
// References:
// - Peeters, G. (2004). A large set of audio features for sound description
// - Lerch, A. (2012). An Introduction to Audio Content Analysis

mod fft;
mod mel;
mod pitch;
mod spectral;
mod temporal;
mod types;
mod window;

pub use fft::{fft_real, next_pow2, FftProcessor, Spectrum};
pub use mel::{hz_to_mel, mel_to_hz, MelFilterbank, MfccProcessor};
pub use pitch::{PitchEstimator, MAX_F0_HZ, MIN_F0_HZ, VOICING_THRESHOLD};
pub use spectral::SpectralFeatures;
pub use temporal::TemporalFeatures;
pub use types::{
    FrameDescriptors, PitchEstimate, SpectralShape, SCALAR_DESCRIPTOR_COUNT,
    SCALAR_DESCRIPTOR_NAMES,
};
pub use window::hamming_window;

use std::sync::Arc;

/// FrameAnalyzer coordinates the per-frame pipeline for one recording
///
/// The analyzer is stateful: spectral flux compares each frame against the
/// previous one, so frames must be fed in order and a fresh analyzer (or
/// [`FrameAnalyzer::reset`]) is needed per recording.
pub struct FrameAnalyzer {
    fft_processor: FftProcessor,
    mfcc_processor: MfccProcessor,
    spectral_features: SpectralFeatures,
    pitch_estimator: PitchEstimator,
    previous_magnitude: Option<Vec<f32>>,
}

impl FrameAnalyzer {
    /// Create an analyzer for frames of one length and sample rate
    ///
    /// # Arguments
    /// * `sample_rate` - Audio sample rate in Hz
    /// * `frame_len` - Samples per frame; the FFT size is the next power of two
    /// * `filterbank` - Shared mel filterbank built for that FFT size
    /// * `n_mfcc` - Number of cepstral coefficients to keep
    /// * `rolloff_fraction` - Roll-off share of total magnitude
    pub fn new(
        sample_rate: u32,
        frame_len: usize,
        filterbank: Arc<MelFilterbank>,
        n_mfcc: usize,
        rolloff_fraction: f32,
    ) -> Self {
        let fft_processor = FftProcessor::new(frame_len);
        debug_assert_eq!(fft_processor.fft_size(), filterbank.fft_size());

        Self {
            spectral_features: SpectralFeatures::new(
                sample_rate,
                fft_processor.fft_size(),
                rolloff_fraction,
            ),
            fft_processor,
            mfcc_processor: MfccProcessor::new(filterbank, n_mfcc),
            pitch_estimator: PitchEstimator::new(sample_rate),
            previous_magnitude: None,
        }
    }

    pub fn fft_size(&self) -> usize {
        self.fft_processor.fft_size()
    }

    /// Forget the previous frame so the next one is treated as the first
    pub fn reset(&mut self) {
        self.previous_magnitude = None;
    }

    /// Analyze the next frame of the recording
    ///
    /// 1. Time-domain descriptors on the raw frame
    /// 2. Windowed spectrum → MFCC, spectral shape and flux
    /// 3. Pitch on the raw frame
    ///
    /// # Arguments
    /// * `frame` - Frame samples (length = frame_len)
    pub fn analyze(&mut self, frame: &[f32]) -> FrameDescriptors {
        let rms = TemporalFeatures::compute_rms(frame);
        let zcr = TemporalFeatures::compute_zcr(frame);
        let crest = TemporalFeatures::compute_crest(frame, rms);

        let spectrum = self.fft_processor.compute_spectrum(frame);
        let mfcc = self.mfcc_processor.compute(&spectrum.power);
        let shape = self.spectral_features.compute_shape(&spectrum.magnitude);
        let flux = SpectralFeatures::compute_flux(
            &spectrum.magnitude,
            self.previous_magnitude.as_deref(),
        );
        self.previous_magnitude = Some(spectrum.magnitude);

        let pitch = self.pitch_estimator.estimate(frame);

        FrameDescriptors {
            mfcc,
            rms,
            zcr,
            crest,
            shape,
            flux,
            pitch,
        }
    }
}
