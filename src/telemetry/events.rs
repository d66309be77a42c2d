//! Outcome types describing what happened to each recording of a batch.

use serde::{Deserialize, Serialize};

use crate::error::ExtractionError;

/// Final classification of one recording.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum ExtractionOutcome {
    /// A feature row was written.
    Processed,
    /// The recording file does not exist.
    Missing,
    /// Malformed input: bad container, too few frames, non-finite features.
    Rejected,
    /// I/O or resource failure for this recording only.
    Failed,
}

impl ExtractionOutcome {
    /// Map an extraction error to the outcome it is counted under.
    pub fn from_error(err: &ExtractionError) -> Self {
        match err {
            ExtractionError::RecordingMissing { .. } => ExtractionOutcome::Missing,
            err if err.is_malformed_input() => ExtractionOutcome::Rejected,
            _ => ExtractionOutcome::Failed,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::FrameSetError;

    #[test]
    fn outcome_follows_error_taxonomy() {
        let missing = ExtractionError::RecordingMissing {
            path: "a/b.frames".to_string(),
        };
        let too_few = ExtractionError::TooFewFrames {
            num_frames: 1,
            minimum: 3,
        };
        let bad_magic = ExtractionError::FrameSet(FrameSetError::BadMagic { found: [0; 8] });
        let io = ExtractionError::FrameSet(FrameSetError::Io {
            details: "denied".to_string(),
        });
        let oom = ExtractionError::FrameSet(FrameSetError::AllocationFailed { samples: 1 << 40 });

        assert_eq!(ExtractionOutcome::from_error(&missing), ExtractionOutcome::Missing);
        assert_eq!(ExtractionOutcome::from_error(&too_few), ExtractionOutcome::Rejected);
        assert_eq!(ExtractionOutcome::from_error(&bad_magic), ExtractionOutcome::Rejected);
        assert_eq!(ExtractionOutcome::from_error(&io), ExtractionOutcome::Failed);
        assert_eq!(ExtractionOutcome::from_error(&oom), ExtractionOutcome::Failed);
    }

    #[test]
    fn outcome_serializes_snake_case() {
        let json = serde_json::to_string(&ExtractionOutcome::Rejected).unwrap();
        assert_eq!(json, "\"rejected\"");
    }
}
