// Feature extraction error types and constants

use crate::error::{ErrorCode, FrameSetError};
use log::error;
use std::fmt;

/// Extraction error code constants
///
/// Error code range: 3001-3006
pub struct ExtractionErrorCodes {}

impl ExtractionErrorCodes {
    /// Recording has fewer frames than the engine needs
    pub const TOO_FEW_FRAMES: i32 = 3001;

    /// Extractor configuration is unusable
    pub const INVALID_CONFIG: i32 = 3002;

    /// Frame-set could not be decoded (see the wrapped frame-set code)
    pub const FRAME_SET: i32 = 3003;

    /// Shared filterbank cache lock was poisoned
    pub const LOCK_POISONED: i32 = 3004;

    /// A summarized feature came out NaN or infinite
    pub const NON_FINITE_FEATURE: i32 = 3005;

    /// Catalog entry points at a file that does not exist
    pub const RECORDING_MISSING: i32 = 3006;
}

/// Log an extraction error with structured context
///
/// The logging is non-blocking and will not panic on failure.
pub fn log_extraction_error(err: &ExtractionError, context: &str) {
    error!(
        "Extraction error in {}: code={}, component=FeatureExtractor, message={}",
        context,
        err.code(),
        err.message()
    );
}

/// Errors that stop a single recording from producing a feature row
///
/// None of these abort a batch: the recording is counted and skipped.
#[derive(Debug, Clone, PartialEq)]
pub enum ExtractionError {
    /// Fewer frames than required for deltas and statistics
    TooFewFrames { num_frames: usize, minimum: usize },

    /// Configuration rejected by validation
    InvalidConfig { reason: String },

    /// Frame-set decoding failed
    FrameSet(FrameSetError),

    /// Mutex was poisoned
    LockPoisoned { component: String },

    /// Final feature vector contained NaN/Inf
    NonFiniteFeature { column: usize },

    /// Recording file is absent
    RecordingMissing { path: String },
}

impl ErrorCode for ExtractionError {
    fn code(&self) -> i32 {
        match self {
            ExtractionError::TooFewFrames { .. } => ExtractionErrorCodes::TOO_FEW_FRAMES,
            ExtractionError::InvalidConfig { .. } => ExtractionErrorCodes::INVALID_CONFIG,
            ExtractionError::FrameSet(_) => ExtractionErrorCodes::FRAME_SET,
            ExtractionError::LockPoisoned { .. } => ExtractionErrorCodes::LOCK_POISONED,
            ExtractionError::NonFiniteFeature { .. } => ExtractionErrorCodes::NON_FINITE_FEATURE,
            ExtractionError::RecordingMissing { .. } => ExtractionErrorCodes::RECORDING_MISSING,
        }
    }

    fn message(&self) -> String {
        match self {
            ExtractionError::TooFewFrames {
                num_frames,
                minimum,
            } => format!(
                "Recording has {} frames, at least {} required",
                num_frames, minimum
            ),
            ExtractionError::InvalidConfig { reason } => {
                format!("Invalid extractor configuration: {}", reason)
            }
            ExtractionError::FrameSet(err) => {
                format!("Frame-set rejected (code {}): {}", err.code(), err.message())
            }
            ExtractionError::LockPoisoned { component } => {
                format!("Lock poisoned on {}", component)
            }
            ExtractionError::NonFiniteFeature { column } => {
                format!("Feature column {} is not finite", column)
            }
            ExtractionError::RecordingMissing { path } => {
                format!("Recording file not found: {}", path)
            }
        }
    }
}

impl fmt::Display for ExtractionError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "ExtractionError (code {}): {}",
            self.code(),
            self.message()
        )
    }
}

impl std::error::Error for ExtractionError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ExtractionError::FrameSet(err) => Some(err),
            _ => None,
        }
    }
}

impl From<FrameSetError> for ExtractionError {
    fn from(err: FrameSetError) -> Self {
        ExtractionError::FrameSet(err)
    }
}

impl ExtractionError {
    /// Whether the recording was rejected because its content is malformed
    ///
    /// Malformed recordings are counted as "rejected"; everything else
    /// (I/O, allocation, poisoned locks) counts as "failed".
    pub fn is_malformed_input(&self) -> bool {
        match self {
            ExtractionError::TooFewFrames { .. } | ExtractionError::NonFiniteFeature { .. } => {
                true
            }
            ExtractionError::FrameSet(err) => err.is_malformed_input(),
            _ => false,
        }
    }
}
