// Types module - Data structures for per-frame descriptors
//
// This module defines the core data structures produced by the per-frame
// stage of the pipeline and consumed by the delta and summary stages.

/// Number of scalar (non-MFCC, non-pitch) descriptors per frame
pub const SCALAR_DESCRIPTOR_COUNT: usize = 8;

/// Names of the scalar descriptors, in feature-vector column order
pub const SCALAR_DESCRIPTOR_NAMES: [&str; SCALAR_DESCRIPTOR_COUNT] = [
    "rms",
    "zcr",
    "crest",
    "centroid",
    "rolloff",
    "bandwidth",
    "flatness",
    "flux",
];

/// Spectral shape of one magnitude spectrum
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct SpectralShape {
    /// Magnitude-weighted mean frequency in Hz
    pub centroid: f32,

    /// Lowest frequency (Hz) below which the roll-off fraction of total
    /// magnitude is contained
    pub rolloff: f32,

    /// Magnitude-weighted RMS deviation from the centroid in Hz
    pub bandwidth: f32,

    /// Geometric / arithmetic mean of magnitudes
    ///
    /// Near 0 for tonal frames, towards 1 for noise.
    pub flatness: f32,
}

/// Pitch estimate for one frame
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct PitchEstimate {
    /// Fundamental frequency in Hz (0.0 when unvoiced)
    pub f0_hz: f32,

    /// Peak normalized autocorrelation in the search band
    pub harmonicity: f32,

    /// Whether the frame passed the voicing threshold
    pub voiced: bool,
}

impl PitchEstimate {
    pub fn unvoiced(harmonicity: f32) -> Self {
        Self {
            f0_hz: 0.0,
            harmonicity,
            voiced: false,
        }
    }
}

/// Everything computed for a single frame
#[derive(Debug, Clone, PartialEq)]
pub struct FrameDescriptors {
    /// Cepstral coefficients (length n_mfcc)
    pub mfcc: Vec<f32>,

    /// Root-mean-square amplitude
    pub rms: f32,

    /// Fraction of adjacent sample pairs that change sign
    pub zcr: f32,

    /// Peak amplitude over RMS
    pub crest: f32,

    pub shape: SpectralShape,

    /// RMS magnitude change from the previous frame (0 for the first frame)
    pub flux: f32,

    pub pitch: PitchEstimate,
}

impl FrameDescriptors {
    /// Scalar descriptors in [`SCALAR_DESCRIPTOR_NAMES`] order
    pub fn scalars(&self) -> [f32; SCALAR_DESCRIPTOR_COUNT] {
        [
            self.rms,
            self.zcr,
            self.crest,
            self.shape.centroid,
            self.shape.rolloff,
            self.shape.bandwidth,
            self.shape.flatness,
            self.flux,
        ]
    }
}
