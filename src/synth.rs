//! Deterministic synthetic recordings.
//!
//! Generates sample streams from simple waveform patterns and slices them
//! into frame sets, so tests and the CLI can produce `.frames` fixtures
//! without any recorded audio. Noise comes from a `StdRng` seeded from the
//! `SyntheticSpec`, so identical specs always yield identical samples.

use rand::{rngs::StdRng, Rng, SeedableRng};
use serde::{Deserialize, Serialize};
use std::f32::consts::PI;

use crate::error::FrameSetError;
use crate::frames::FrameSet;

/// Supported deterministic waveform patterns.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum SyntheticPattern {
    Sine,
    Square,
    WhiteNoise,
    Silence,
}

/// Configuration for one synthetic recording.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SyntheticSpec {
    pub pattern: SyntheticPattern,
    #[serde(default = "default_frequency_hz")]
    pub frequency_hz: f32,
    #[serde(default = "default_amplitude")]
    pub amplitude: f32,
    #[serde(default = "default_sample_rate")]
    pub sample_rate: u32,
    pub num_samples: usize,
    #[serde(default)]
    pub seed: u64,
}

fn default_frequency_hz() -> f32 {
    200.0
}

fn default_amplitude() -> f32 {
    0.5
}

fn default_sample_rate() -> u32 {
    16_000
}

/// Number of samples covering `duration_ms` at `sample_rate`.
pub fn duration_samples(duration_ms: u32, sample_rate: u32) -> usize {
    ((duration_ms as u64 * sample_rate as u64) / 1000) as usize
}

impl SyntheticSpec {
    /// Render the whole sample stream.
    pub fn generate(&self) -> Vec<f32> {
        let mut rng = StdRng::seed_from_u64(self.seed);
        let step = if self.sample_rate == 0 {
            0.0
        } else {
            self.frequency_hz.max(0.0) / self.sample_rate as f32
        };
        let amplitude = self.amplitude.abs();
        let mut phase = 0.0f32;

        (0..self.num_samples)
            .map(|_| {
                let value = match self.pattern {
                    SyntheticPattern::Sine => (2.0 * PI * phase).sin() * amplitude,
                    SyntheticPattern::Square => {
                        if phase < 0.5 {
                            amplitude
                        } else {
                            -amplitude
                        }
                    }
                    SyntheticPattern::WhiteNoise if amplitude > 0.0 => {
                        rng.gen_range(-amplitude..amplitude)
                    }
                    SyntheticPattern::WhiteNoise | SyntheticPattern::Silence => 0.0,
                };
                phase += step;
                if phase >= 1.0 {
                    phase -= phase.floor();
                }
                value
            })
            .collect()
    }

    /// Render and frame the stream in one step.
    pub fn to_frame_set(&self, frame_len: u32, hop_len: u32) -> Result<FrameSet, FrameSetError> {
        frame_samples(&self.generate(), self.sample_rate, frame_len, hop_len)
    }
}

/// Slice a sample stream into overlapping frames.
///
/// Frame `t` starts at `t * hop_len`; only full frames are kept, giving
/// `floor((len - frame_len) / hop_len) + 1` frames (0 if the stream is
/// shorter than one frame).
pub fn frame_samples(
    samples: &[f32],
    sample_rate: u32,
    frame_len: u32,
    hop_len: u32,
) -> Result<FrameSet, FrameSetError> {
    let (frame, hop) = (frame_len as usize, hop_len as usize);
    let num_frames = if frame == 0 || hop == 0 || samples.len() < frame {
        0
    } else {
        (samples.len() - frame) / hop + 1
    };

    let mut framed = Vec::with_capacity(num_frames * frame);
    for t in 0..num_frames {
        let start = t * hop;
        framed.extend_from_slice(&samples[start..start + frame]);
    }

    FrameSet::new(sample_rate, frame_len, hop_len, framed)
}
