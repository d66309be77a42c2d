//! Extraction telemetry.
//!
//! Lock-free outcome counters shared by every batch worker, plus a
//! serializable summary for the CLI.

use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Instant;

use serde::{Deserialize, Serialize};

pub mod events;

pub use events::ExtractionOutcome;

/// Totals reported at the end of a batch.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct ExtractionSummary {
    pub processed: u64,
    pub missing: u64,
    pub rejected: u64,
    pub failed: u64,
    pub elapsed_ms: u64,
}

impl ExtractionSummary {
    pub fn total(&self) -> u64 {
        self.processed + self.missing + self.rejected + self.failed
    }
}

/// Per-outcome counters.
pub struct ExtractionCounters {
    processed: AtomicU64,
    missing: AtomicU64,
    rejected: AtomicU64,
    failed: AtomicU64,
    started_at: Instant,
}

impl ExtractionCounters {
    pub fn new() -> Self {
        Self {
            processed: AtomicU64::new(0),
            missing: AtomicU64::new(0),
            rejected: AtomicU64::new(0),
            failed: AtomicU64::new(0),
            started_at: Instant::now(),
        }
    }

    pub fn record(&self, outcome: ExtractionOutcome) {
        let counter = match outcome {
            ExtractionOutcome::Processed => &self.processed,
            ExtractionOutcome::Missing => &self.missing,
            ExtractionOutcome::Rejected => &self.rejected,
            ExtractionOutcome::Failed => &self.failed,
        };
        counter.fetch_add(1, Ordering::Relaxed);
    }

    pub fn snapshot(&self) -> ExtractionSummary {
        ExtractionSummary {
            processed: self.processed.load(Ordering::Relaxed),
            missing: self.missing.load(Ordering::Relaxed),
            rejected: self.rejected.load(Ordering::Relaxed),
            failed: self.failed.load(Ordering::Relaxed),
            elapsed_ms: self.started_at.elapsed().as_millis() as u64,
        }
    }
}

impl Default for ExtractionCounters {
    fn default() -> Self {
        Self::new()
    }
}
