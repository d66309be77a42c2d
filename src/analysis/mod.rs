// Analysis module - per-recording feature extraction pipeline
//
// This module turns one recording's frame set into one fixed-width feature
// vector.
//
// Architecture:
// - FrameAnalyzer: per-frame descriptors (MFCC, spectral shape, energy, pitch)
// - deltas: delta and delta² of the MFCC trajectory
// - stats: mean / std / skewness / kurtosis of every trajectory column
// - vector: column layout and the final finiteness check
//
// Each recording walks Loaded → PerFrameAnalyzed → DeltasComputed → Summarized.
// Only a Summarized recording yields a vector; every earlier failure rejects
// the recording as a whole.
//
// The mel filterbank is the only state shared between recordings. It is
// cached per (sample_rate, fft_size) behind a mutex held only for lookup and
// insertion, then handed out as an immutable Arc.

use std::collections::HashMap;
use std::fmt;
use std::path::Path;
use std::sync::{Arc, Mutex};

use ndarray::Array2;

use crate::config::ExtractorConfig;
use crate::error::ExtractionError;
use crate::frames::FrameSet;

pub mod deltas;
pub mod features;
pub mod stats;
pub mod vector;

use deltas::compute_deltas;
use features::{FrameAnalyzer, MelFilterbank, SCALAR_DESCRIPTOR_COUNT};
use stats::{compute_stats, compute_stats_slice, FeatureStats};
pub use vector::{column_names, feature_dimension, FeatureVector};

/// Minimum frames per recording
///
/// Below three frames the interior delta is undefined and the higher
/// moments are meaningless.
pub const MIN_FRAMES: usize = 3;

/// Processing stage of a single recording
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecordingStage {
    Loaded,
    PerFrameAnalyzed,
    DeltasComputed,
    Summarized,
}

impl fmt::Display for RecordingStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            RecordingStage::Loaded => "loaded",
            RecordingStage::PerFrameAnalyzed => "per-frame analyzed",
            RecordingStage::DeltasComputed => "deltas computed",
            RecordingStage::Summarized => "summarized",
        };
        f.write_str(name)
    }
}

/// Per-frame trajectories of one recording
struct Trajectories {
    /// num_frames × n_mfcc
    mfcc: Array2<f32>,
    /// num_frames × 8, columns in SCALAR_DESCRIPTOR_NAMES order
    descriptors: Array2<f32>,
    /// F0 of voiced frames only
    voiced_f0: Vec<f32>,
    /// Harmonicity of every frame
    harmonicity: Vec<f32>,
}

/// Feature extractor for a fixed configuration
///
/// Thread-safe: one instance is shared by every batch worker.
pub struct FeatureExtractor {
    config: ExtractorConfig,
    filterbanks: Mutex<HashMap<(u32, usize), Arc<MelFilterbank>>>,
}

impl FeatureExtractor {
    /// Create an extractor
    ///
    /// # Errors
    /// `InvalidConfig` if the configuration fails validation
    pub fn new(config: ExtractorConfig) -> Result<Self, ExtractionError> {
        config.validate()?;
        Ok(Self {
            config,
            filterbanks: Mutex::new(HashMap::new()),
        })
    }

    pub fn config(&self) -> &ExtractorConfig {
        &self.config
    }

    /// Width of every vector this extractor produces
    pub fn feature_dimension(&self) -> usize {
        feature_dimension(self.config.n_mfcc)
    }

    pub fn column_names(&self) -> Vec<String> {
        column_names(self.config.n_mfcc)
    }

    /// Shared filterbank for a sample rate and FFT size, built on first use
    pub fn filterbank(
        &self,
        sample_rate: u32,
        fft_size: usize,
    ) -> Result<Arc<MelFilterbank>, ExtractionError> {
        let mut cache = self
            .filterbanks
            .lock()
            .map_err(|_| ExtractionError::LockPoisoned {
                component: "filterbank cache".to_string(),
            })?;

        let bank = cache.entry((sample_rate, fft_size)).or_insert_with(|| {
            tracing::debug!(
                "[FeatureExtractor] Building mel filterbank: sample_rate={} fft_size={} n_mels={}",
                sample_rate,
                fft_size,
                self.config.n_mels
            );
            Arc::new(MelFilterbank::new(sample_rate, fft_size, self.config.n_mels))
        });
        Ok(Arc::clone(bank))
    }

    /// Number of distinct filterbank configurations built so far
    pub fn cached_filterbanks(&self) -> usize {
        self.filterbanks.lock().map(|cache| cache.len()).unwrap_or(0)
    }

    /// Read a `.frames` file and extract its feature vector
    ///
    /// # Errors
    /// `RecordingMissing` if the file does not exist, `FrameSet` if it cannot
    /// be decoded, otherwise as [`FeatureExtractor::extract`]
    pub fn extract_file<P: AsRef<Path>>(&self, path: P) -> Result<FeatureVector, ExtractionError> {
        let path = path.as_ref();
        if !path.is_file() {
            return Err(ExtractionError::RecordingMissing {
                path: path.display().to_string(),
            });
        }
        let frames = FrameSet::read_file(path)?;
        self.extract(&frames)
    }

    /// Extract the feature vector of one recording
    ///
    /// # Errors
    /// - `TooFewFrames` for fewer than [`MIN_FRAMES`] frames
    /// - `NonFiniteFeature` if any summary value is NaN/Inf
    /// - `LockPoisoned` if the filterbank cache is unusable
    pub fn extract(&self, frames: &FrameSet) -> Result<FeatureVector, ExtractionError> {
        let mut stage = RecordingStage::Loaded;
        tracing::debug!(
            "[FeatureExtractor] {}: {} frames of {} samples at {} Hz",
            stage,
            frames.num_frames(),
            frames.frame_len(),
            frames.sample_rate()
        );

        if frames.num_frames() < MIN_FRAMES {
            return Err(ExtractionError::TooFewFrames {
                num_frames: frames.num_frames(),
                minimum: MIN_FRAMES,
            });
        }

        let trajectories = self.analyze_frames(frames)?;
        stage = RecordingStage::PerFrameAnalyzed;
        tracing::debug!(
            "[FeatureExtractor] {}: {} of {} frames voiced",
            stage,
            trajectories.voiced_f0.len(),
            frames.num_frames()
        );

        let delta = compute_deltas(&trajectories.mfcc);
        let delta2 = compute_deltas(&delta);
        stage = RecordingStage::DeltasComputed;
        tracing::debug!("[FeatureExtractor] {}", stage);

        let vector = self.summarize(&trajectories, &delta, &delta2)?;
        stage = RecordingStage::Summarized;
        tracing::debug!("[FeatureExtractor] {}: {} columns", stage, vector.len());

        Ok(vector)
    }

    fn analyze_frames(&self, frames: &FrameSet) -> Result<Trajectories, ExtractionError> {
        let header = frames.header();
        let filterbank = self.filterbank(header.sample_rate, header.fft_size())?;
        let mut analyzer = FrameAnalyzer::new(
            header.sample_rate,
            frames.frame_len(),
            filterbank,
            self.config.n_mfcc,
            self.config.rolloff_fraction,
        );

        let num_frames = frames.num_frames();
        let mut trajectories = Trajectories {
            mfcc: Array2::zeros((num_frames, self.config.n_mfcc)),
            descriptors: Array2::zeros((num_frames, SCALAR_DESCRIPTOR_COUNT)),
            voiced_f0: Vec::with_capacity(num_frames),
            harmonicity: Vec::with_capacity(num_frames),
        };

        for (t, frame) in frames.frames().enumerate() {
            let descriptors = analyzer.analyze(frame);

            for (slot, &value) in trajectories.mfcc.row_mut(t).iter_mut().zip(&descriptors.mfcc) {
                *slot = value;
            }
            for (slot, value) in trajectories
                .descriptors
                .row_mut(t)
                .iter_mut()
                .zip(descriptors.scalars())
            {
                *slot = value;
            }

            if descriptors.pitch.voiced {
                trajectories.voiced_f0.push(descriptors.pitch.f0_hz);
            }
            trajectories.harmonicity.push(descriptors.pitch.harmonicity);
        }

        Ok(trajectories)
    }

    fn summarize(
        &self,
        trajectories: &Trajectories,
        delta: &Array2<f32>,
        delta2: &Array2<f32>,
    ) -> Result<FeatureVector, ExtractionError> {
        let column_stats = |matrix: &Array2<f32>| -> Vec<FeatureStats> {
            matrix.columns().into_iter().map(compute_stats).collect()
        };

        let groups = [
            column_stats(&trajectories.mfcc),
            column_stats(delta),
            column_stats(delta2),
            column_stats(&trajectories.descriptors),
        ];

        let mut values = Vec::with_capacity(self.feature_dimension());
        for stat in 0..FeatureStats::NAMES.len() {
            for group in &groups {
                values.extend(group.iter().map(|stats| stats.get(stat)));
            }
        }

        let num_frames = trajectories.harmonicity.len();
        let f0 = compute_stats_slice(&trajectories.voiced_f0);
        let harmonicity = compute_stats_slice(&trajectories.harmonicity);
        let voicing_rate = if num_frames > 0 {
            trajectories.voiced_f0.len() as f64 / num_frames as f64
        } else {
            0.0
        };
        values.extend([
            f0.mean,
            f0.std,
            voicing_rate,
            harmonicity.mean,
            harmonicity.std,
        ]);

        debug_assert_eq!(values.len(), self.feature_dimension());
        FeatureVector::new(values)
    }
}
