// Frame-set decoding error types and constants

use crate::error::ErrorCode;
use log::error;
use std::fmt;

/// Frame-set error code constants
///
/// Single source of truth for the numeric codes reported by the batch
/// summary and the CLI.
///
/// Error code range: 2001-2009
pub struct FrameSetErrorCodes {}

impl FrameSetErrorCodes {
    /// Underlying I/O failure (open/read/write)
    pub const IO: i32 = 2001;

    /// Magic constant does not match the frame-set format tag
    pub const BAD_MAGIC: i32 = 2002;

    /// File ended before the fixed-size header was complete
    pub const TRUNCATED_HEADER: i32 = 2003;

    /// Payload shorter than `num_frames * frame_len` samples
    pub const TRUNCATED_PAYLOAD: i32 = 2004;

    /// Bytes left over after the declared payload
    pub const TRAILING_DATA: i32 = 2005;

    /// Header dimension is zero or otherwise unusable
    pub const INVALID_DIMENSION: i32 = 2006;

    /// Payload contains NaN or infinite samples
    pub const NON_FINITE_SAMPLE: i32 = 2007;

    /// Payload buffer could not be sized or allocated
    pub const ALLOCATION_FAILED: i32 = 2008;

    /// More frames than the `u32` header field can describe
    pub const TOO_MANY_FRAMES: i32 = 2009;
}

/// Log a frame-set error with structured context
///
/// The logging is non-blocking and will not panic on failure.
pub fn log_frame_set_error(err: &FrameSetError, context: &str) {
    error!(
        "Frame-set error in {}: code={}, component=FrameSetReader, message={}",
        context,
        err.code(),
        err.message()
    );
}

/// Errors raised while decoding or encoding a `.frames` container
///
/// All variants except `Io` and `AllocationFailed` describe malformed input:
/// the recording is skipped and processing continues with the next one.
#[derive(Debug, Clone, PartialEq)]
pub enum FrameSetError {
    /// I/O failure while reading or writing
    Io { details: String },

    /// Magic constant mismatch
    BadMagic { found: [u8; 8] },

    /// Header shorter than its fixed size
    TruncatedHeader { bytes_read: usize },

    /// Payload shorter than the header promises
    TruncatedPayload { expected: usize, actual: usize },

    /// Extra bytes after the payload
    TrailingData { extra_bytes: usize },

    /// Header field with an unusable value
    InvalidDimension { field: &'static str, value: u32 },

    /// NaN or infinite sample in the payload
    NonFiniteSample { frame: usize, index: usize },

    /// Payload size overflowed or allocation failed
    AllocationFailed { samples: usize },

    /// Frame count does not fit the header's `num_frames` field
    TooManyFrames { num_frames: usize },
}

impl ErrorCode for FrameSetError {
    fn code(&self) -> i32 {
        match self {
            FrameSetError::Io { .. } => FrameSetErrorCodes::IO,
            FrameSetError::BadMagic { .. } => FrameSetErrorCodes::BAD_MAGIC,
            FrameSetError::TruncatedHeader { .. } => FrameSetErrorCodes::TRUNCATED_HEADER,
            FrameSetError::TruncatedPayload { .. } => FrameSetErrorCodes::TRUNCATED_PAYLOAD,
            FrameSetError::TrailingData { .. } => FrameSetErrorCodes::TRAILING_DATA,
            FrameSetError::InvalidDimension { .. } => FrameSetErrorCodes::INVALID_DIMENSION,
            FrameSetError::NonFiniteSample { .. } => FrameSetErrorCodes::NON_FINITE_SAMPLE,
            FrameSetError::AllocationFailed { .. } => FrameSetErrorCodes::ALLOCATION_FAILED,
            FrameSetError::TooManyFrames { .. } => FrameSetErrorCodes::TOO_MANY_FRAMES,
        }
    }

    fn message(&self) -> String {
        match self {
            FrameSetError::Io { details } => format!("I/O error: {}", details),
            FrameSetError::BadMagic { found } => {
                format!("Unrecognized frame-set magic {:?}", found)
            }
            FrameSetError::TruncatedHeader { bytes_read } => {
                format!("Header truncated after {} bytes", bytes_read)
            }
            FrameSetError::TruncatedPayload { expected, actual } => {
                format!(
                    "Payload truncated: expected {} bytes, got {}",
                    expected, actual
                )
            }
            FrameSetError::TrailingData { extra_bytes } => {
                format!("{} unexpected bytes after payload", extra_bytes)
            }
            FrameSetError::InvalidDimension { field, value } => {
                format!("Invalid header field {} = {}", field, value)
            }
            FrameSetError::NonFiniteSample { frame, index } => {
                format!("Non-finite sample at frame {} index {}", frame, index)
            }
            FrameSetError::AllocationFailed { samples } => {
                format!("Cannot allocate payload of {} samples", samples)
            }
            FrameSetError::TooManyFrames { num_frames } => {
                format!("{} frames exceed the header limit of {}", num_frames, u32::MAX)
            }
        }
    }
}

impl fmt::Display for FrameSetError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "FrameSetError (code {}): {}",
            self.code(),
            self.message()
        )
    }
}

impl std::error::Error for FrameSetError {}

impl From<std::io::Error> for FrameSetError {
    fn from(err: std::io::Error) -> Self {
        FrameSetError::Io {
            details: err.to_string(),
        }
    }
}

impl FrameSetError {
    /// Whether the error describes malformed input rather than an environment failure
    pub fn is_malformed_input(&self) -> bool {
        !matches!(
            self,
            FrameSetError::Io { .. } | FrameSetError::AllocationFailed { .. }
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_frame_set_error_codes() {
        assert_eq!(
            FrameSetError::Io {
                details: "x".to_string()
            }
            .code(),
            FrameSetErrorCodes::IO
        );
        assert_eq!(
            FrameSetError::BadMagic { found: [0; 8] }.code(),
            FrameSetErrorCodes::BAD_MAGIC
        );
        assert_eq!(
            FrameSetError::TruncatedHeader { bytes_read: 3 }.code(),
            FrameSetErrorCodes::TRUNCATED_HEADER
        );
        assert_eq!(
            FrameSetError::TruncatedPayload {
                expected: 8,
                actual: 4
            }
            .code(),
            FrameSetErrorCodes::TRUNCATED_PAYLOAD
        );
        assert_eq!(
            FrameSetError::TrailingData { extra_bytes: 1 }.code(),
            FrameSetErrorCodes::TRAILING_DATA
        );
        assert_eq!(
            FrameSetError::InvalidDimension {
                field: "hop_len",
                value: 0
            }
            .code(),
            FrameSetErrorCodes::INVALID_DIMENSION
        );
        assert_eq!(
            FrameSetError::NonFiniteSample { frame: 0, index: 0 }.code(),
            FrameSetErrorCodes::NON_FINITE_SAMPLE
        );
        assert_eq!(
            FrameSetError::AllocationFailed { samples: 1 }.code(),
            FrameSetErrorCodes::ALLOCATION_FAILED
        );
        assert_eq!(
            FrameSetError::TooManyFrames { num_frames: 1 }.code(),
            FrameSetErrorCodes::TOO_MANY_FRAMES
        );
    }

    #[test]
    fn test_frame_set_error_display() {
        let err = FrameSetError::InvalidDimension {
            field: "sample_rate",
            value: 0,
        };
        let display = format!("{}", err);
        assert!(display.contains("FrameSetError"));
        assert!(display.contains("2006"));
        assert!(display.contains("sample_rate"));
    }

    #[test]
    fn test_from_io_error() {
        let io_err = std::io::Error::other("disk on fire");
        let err: FrameSetError = io_err.into();
        match &err {
            FrameSetError::Io { details } => assert!(details.contains("disk on fire")),
            _ => panic!("Expected Io"),
        }
        assert!(!err.is_malformed_input());
    }

    #[test]
    fn test_malformed_input_classification() {
        assert!(FrameSetError::BadMagic { found: [0; 8] }.is_malformed_input());
        assert!(FrameSetError::TrailingData { extra_bytes: 4 }.is_malformed_input());
        assert!(!FrameSetError::AllocationFailed { samples: 10 }.is_malformed_input());
    }
}
