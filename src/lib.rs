// Voice Features Core - Rust feature extraction engine
// Per-recording speech descriptors for pathology classification datasets

// Module declarations
pub mod analysis;
pub mod batch;
pub mod catalog;
pub mod config;
pub mod error;
pub mod frames;
pub mod output;
pub mod synth;
pub mod telemetry;

// Re-exports for convenience
pub use analysis::{column_names, feature_dimension, FeatureExtractor, FeatureVector};
pub use batch::BatchExtractor;
pub use catalog::{RecordingCatalog, RecordingEntry};
pub use config::ExtractorConfig;
pub use error::{ErrorCode, ExtractionError, FrameSetError};
pub use frames::{FrameHeader, FrameSet};
pub use output::FeatureTableWriter;
pub use telemetry::ExtractionSummary;
