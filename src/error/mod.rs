// Error types for the feature extraction engine
//
// This module defines custom error types for frame-set decoding and feature
// extraction, providing structured error handling with stable numeric codes
// that batch reports and the CLI can surface.

mod extraction;
mod frame_set;

pub use extraction::{log_extraction_error, ExtractionError, ExtractionErrorCodes};
pub use frame_set::{log_frame_set_error, FrameSetError, FrameSetErrorCodes};

/// Error codes for structured error reporting
///
/// This trait provides a standard way to get error codes and messages
/// from custom error types, enabling consistent error handling across
/// the library and the CLI.
pub trait ErrorCode {
    /// Get the numeric error code
    fn code(&self) -> i32;

    /// Get the human-readable error message
    fn message(&self) -> String;
}
