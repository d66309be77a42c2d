// Batch module - parallel extraction over many recordings
//
// Architecture:
// - Workers: fixed pool of scoped threads pulling job indices from an atomic cursor
// - Each worker runs the whole pipeline for one recording at a time
// - Collector (calling thread): receives (index, result) over mpsc, buffers
//   out-of-order results and writes rows strictly in input order
//
// The FeatureExtractor (and its filterbank cache) is the only state the
// workers share.

use std::collections::BTreeMap;
use std::io::{self, Write};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::mpsc;
use std::thread;

use crate::analysis::{FeatureExtractor, FeatureVector};
use crate::catalog::RecordingEntry;
use crate::error::{log_extraction_error, log_frame_set_error, ExtractionError};
use crate::output::FeatureTableWriter;
use crate::telemetry::{ExtractionCounters, ExtractionOutcome, ExtractionSummary};

type JobResult = (usize, Result<FeatureVector, ExtractionError>);

/// Runs one extractor over a list of recordings.
pub struct BatchExtractor {
    extractor: FeatureExtractor,
    workers: usize,
}

impl BatchExtractor {
    /// Create a batch extractor using the extractor config's worker count
    pub fn new(extractor: FeatureExtractor) -> Self {
        let workers = extractor.config().effective_workers();
        Self { extractor, workers }
    }

    /// Override the worker count (minimum 1)
    pub fn with_workers(mut self, workers: usize) -> Self {
        self.workers = workers.max(1);
        self
    }

    pub fn extractor(&self) -> &FeatureExtractor {
        &self.extractor
    }

    pub fn workers(&self) -> usize {
        self.workers
    }

    /// Extract every entry and write one row per successful recording
    ///
    /// Recordings that fail are logged, counted and skipped; only an error
    /// writing the table aborts the batch.
    ///
    /// # Arguments
    /// * `entries` - Recordings in output order
    /// * `table` - Destination table (header already written)
    ///
    /// # Returns
    /// Outcome counts for the batch
    pub fn run<W: Write>(
        &self,
        entries: &[RecordingEntry],
        table: &mut FeatureTableWriter<W>,
    ) -> io::Result<ExtractionSummary> {
        let counters = ExtractionCounters::new();
        let cursor = AtomicUsize::new(0);
        let workers = self.workers.min(entries.len()).max(1);

        tracing::info!(
            "[BatchExtractor] Extracting {} recordings with {} workers",
            entries.len(),
            workers
        );

        thread::scope(|scope| -> io::Result<()> {
            let (tx, rx) = mpsc::channel::<JobResult>();

            for worker_id in 0..workers {
                let tx = tx.clone();
                let cursor = &cursor;
                scope.spawn(move || loop {
                    let index = cursor.fetch_add(1, Ordering::Relaxed);
                    let Some(entry) = entries.get(index) else {
                        break;
                    };

                    let span =
                        tracing::debug_span!("recording", worker = worker_id, id = %entry.id);
                    let _guard = span.enter();
                    let result = self.extractor.extract_file(&entry.path);

                    if tx.send((index, result)).is_err() {
                        // Collector stopped after a write failure
                        break;
                    }
                });
            }
            drop(tx);

            let mut pending = BTreeMap::new();
            let mut next = 0usize;
            for (index, result) in rx {
                pending.insert(index, result);
                while let Some(result) = pending.remove(&next) {
                    self.finish(&entries[next], result, table, &counters)?;
                    next += 1;
                }
            }
            Ok(())
        })?;

        table.flush()?;
        let summary = counters.snapshot();
        tracing::info!(
            "[BatchExtractor] Done: processed={} missing={} rejected={} failed={}",
            summary.processed,
            summary.missing,
            summary.rejected,
            summary.failed
        );
        Ok(summary)
    }

    fn finish<W: Write>(
        &self,
        entry: &RecordingEntry,
        result: Result<FeatureVector, ExtractionError>,
        table: &mut FeatureTableWriter<W>,
        counters: &ExtractionCounters,
    ) -> io::Result<()> {
        match result {
            Ok(vector) => {
                table.write_row(&entry.id, &entry.class_label, &vector)?;
                counters.record(ExtractionOutcome::Processed);
            }
            Err(err) => {
                let outcome = ExtractionOutcome::from_error(&err);
                match (&outcome, &err) {
                    (ExtractionOutcome::Missing, _) => {
                        tracing::warn!("[BatchExtractor] {}: missing recording", entry.id)
                    }
                    (_, ExtractionError::FrameSet(inner)) => log_frame_set_error(inner, &entry.id),
                    _ => log_extraction_error(&err, &entry.id),
                }
                counters.record(outcome);
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ExtractorConfig;
    use crate::synth::{SyntheticPattern, SyntheticSpec};
    use std::fs;
    use std::path::Path;
    use tempfile::TempDir;

    fn write_recording(
        root: &Path,
        class_label: &str,
        id: &str,
        frequency_hz: f32,
        num_samples: usize,
    ) -> RecordingEntry {
        let spec = SyntheticSpec {
            pattern: SyntheticPattern::Sine,
            frequency_hz,
            amplitude: 0.5,
            sample_rate: 16_000,
            num_samples,
            seed: 0,
        };
        let dir = root.join(class_label);
        fs::create_dir_all(&dir).unwrap();
        let path = dir.join(format!("{id}.frames"));
        spec.to_frame_set(480, 160).unwrap().write_file(&path).unwrap();
        RecordingEntry {
            id: id.to_string(),
            class_label: class_label.to_string(),
            path,
        }
    }

    fn read_ids(bytes: Vec<u8>) -> Vec<String> {
        String::from_utf8(bytes)
            .unwrap()
            .lines()
            .skip(1)
            .map(|line| line.split(',').next().unwrap().to_string())
            .collect()
    }

    #[test]
    fn rows_follow_input_order_with_many_workers() {
        let dir = TempDir::new().unwrap();
        let entries: Vec<RecordingEntry> = (0..12)
            .map(|i| {
                let frequency_hz = 100.0 + 20.0 * i as f32;
                write_recording(dir.path(), "a", &format!("r{i:02}"), frequency_hz, 4_000 + 500 * (i % 4))
            })
            .collect();

        let extractor = FeatureExtractor::new(ExtractorConfig::default()).unwrap();
        let batch = BatchExtractor::new(extractor).with_workers(4);
        let mut table =
            FeatureTableWriter::new(Vec::new(), &batch.extractor().column_names()).unwrap();
        let summary = batch.run(&entries, &mut table).unwrap();

        assert_eq!(summary.processed, 12);
        let expected: Vec<String> = entries.iter().map(|e| e.id.clone()).collect();
        assert_eq!(read_ids(table.into_inner().unwrap()), expected);
    }

    #[test]
    fn failures_are_counted_and_skipped() {
        let dir = TempDir::new().unwrap();
        let good = write_recording(dir.path(), "a", "good", 200.0, 4_000);
        // 640 samples at 480/160 yield 2 frames
        let short = write_recording(dir.path(), "a", "short", 200.0, 640);
        let corrupt_path = dir.path().join("a").join("corrupt.frames");
        fs::write(&corrupt_path, b"NOTFRAMES").unwrap();
        let corrupt = RecordingEntry {
            id: "corrupt".to_string(),
            class_label: "a".to_string(),
            path: corrupt_path,
        };
        // Header claims 2^40 samples, file holds 16 bytes of payload
        let huge_path = dir.path().join("a").join("huge.frames");
        let huge_header = crate::frames::FrameHeader {
            sample_rate: 16_000,
            frame_len: 1 << 20,
            hop_len: 160,
            num_frames: 1 << 20,
        };
        let mut huge_bytes = crate::frames::FRAME_MAGIC.to_vec();
        for field in [
            huge_header.sample_rate,
            huge_header.frame_len,
            huge_header.hop_len,
            huge_header.num_frames,
        ] {
            huge_bytes.extend_from_slice(&field.to_le_bytes());
        }
        huge_bytes.extend_from_slice(&[0u8; 16]);
        fs::write(&huge_path, huge_bytes).unwrap();
        let huge = RecordingEntry {
            id: "huge".to_string(),
            class_label: "a".to_string(),
            path: huge_path,
        };
        let missing = RecordingEntry {
            id: "missing".to_string(),
            class_label: "a".to_string(),
            path: dir.path().join("a").join("missing.frames"),
        };

        let extractor = FeatureExtractor::new(ExtractorConfig::default()).unwrap();
        let batch = BatchExtractor::new(extractor).with_workers(2);
        let mut table =
            FeatureTableWriter::new(Vec::new(), &batch.extractor().column_names()).unwrap();
        let summary = batch
            .run(&[short, missing, good, corrupt, huge], &mut table)
            .unwrap();

        assert_eq!(summary.processed, 1);
        assert_eq!(summary.missing, 1);
        assert_eq!(summary.rejected, 3);
        assert_eq!(summary.failed, 0);
        assert_eq!(read_ids(table.into_inner().unwrap()), vec!["good".to_string()]);
    }

    #[test]
    fn empty_batch_writes_header_only() {
        let extractor = FeatureExtractor::new(ExtractorConfig::default()).unwrap();
        let batch = BatchExtractor::new(extractor);
        let mut table =
            FeatureTableWriter::new(Vec::new(), &batch.extractor().column_names()).unwrap();
        let summary = batch.run(&[], &mut table).unwrap();
        assert_eq!(summary.total(), 0);
        assert_eq!(table.rows_written(), 0);
    }

    #[test]
    fn shares_one_filterbank_across_workers() {
        let dir = TempDir::new().unwrap();
        let entries: Vec<RecordingEntry> = (0..6)
            .map(|i| write_recording(dir.path(), "b", &format!("s{i}"), 150.0, 4_000))
            .collect();
        let extractor = FeatureExtractor::new(ExtractorConfig::default()).unwrap();
        let batch = BatchExtractor::new(extractor).with_workers(3);
        let mut table =
            FeatureTableWriter::new(Vec::new(), &batch.extractor().column_names()).unwrap();
        batch.run(&entries, &mut table).unwrap();
        assert_eq!(batch.extractor().cached_filterbanks(), 1);
    }
}
