//! Recording catalog for batch extraction.
//!
//! Recordings live at `<root>/<class>/<id>.frames`. The catalog either walks
//! that layout directly or resolves the rows of a metadata CSV (columns `id`
//! and `classe`/`class`, any case) against it. Metadata rows whose file is
//! absent are kept so the batch can count them as missing.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{anyhow, bail, Context, Result};
use csv::{ReaderBuilder, StringRecord, Trim};
use serde::Serialize;

/// File extension of frame-set recordings.
pub const FRAMES_EXTENSION: &str = "frames";

/// One recording to extract.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RecordingEntry {
    pub id: String,
    pub class_label: String,
    pub path: PathBuf,
}

impl RecordingEntry {
    pub fn exists(&self) -> bool {
        self.path.is_file()
    }
}

/// Catalog responsible for locating recordings on disk.
pub struct RecordingCatalog {
    root: PathBuf,
}

impl RecordingCatalog {
    pub fn new<P: Into<PathBuf>>(root: P) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Expected location of a recording.
    pub fn entry_path(&self, class_label: &str, id: &str) -> PathBuf {
        self.root
            .join(class_label)
            .join(format!("{id}.{FRAMES_EXTENSION}"))
    }

    /// List every `<root>/<class>/<id>.frames`, sorted by class then id.
    pub fn discover(&self) -> Result<Vec<RecordingEntry>> {
        let mut entries = Vec::new();
        if !self.root.exists() {
            return Ok(entries);
        }

        let read_root =
            fs::read_dir(&self.root).with_context(|| format!("reading {}", self.root.display()))?;
        for class_dir in read_root {
            let class_dir = class_dir?;
            if !class_dir.file_type()?.is_dir() {
                continue;
            }
            let class_label = class_dir.file_name().to_string_lossy().into_owned();

            for file in fs::read_dir(class_dir.path())? {
                let file = file?;
                let path = file.path();
                if !file.file_type()?.is_file()
                    || path.extension().and_then(|ext| ext.to_str()) != Some(FRAMES_EXTENSION)
                {
                    continue;
                }
                let Some(id) = path.file_stem().and_then(|s| s.to_str()) else {
                    continue;
                };
                entries.push(RecordingEntry {
                    id: id.to_string(),
                    class_label: class_label.clone(),
                    path: path.clone(),
                });
            }
        }

        entries.sort_by(|a, b| {
            a.class_label
                .cmp(&b.class_label)
                .then_with(|| a.id.cmp(&b.id))
        });
        Ok(entries)
    }

    /// Resolve the rows of a metadata CSV to recording paths, in file order.
    ///
    /// Fields may be quoted. Rows with an empty id or class, or too few
    /// fields, are skipped. Rows whose file does not exist are returned and
    /// logged as missing.
    pub fn from_metadata<P: AsRef<Path>>(&self, metadata: P) -> Result<Vec<RecordingEntry>> {
        let metadata = metadata.as_ref();
        let mut reader = ReaderBuilder::new()
            .has_headers(true)
            .flexible(true)
            .trim(Trim::All)
            .from_path(metadata)
            .with_context(|| format!("reading metadata {}", metadata.display()))?;

        let header = reader
            .headers()
            .with_context(|| format!("reading header of {}", metadata.display()))?
            .clone();
        if header.is_empty() {
            bail!("metadata {} is empty", metadata.display());
        }
        let column = |names: &[&str]| {
            header
                .iter()
                .position(|field| names.iter().any(|name| field.eq_ignore_ascii_case(name)))
        };
        let id_idx = column(&["id"])
            .ok_or_else(|| anyhow!("metadata {} has no 'id' column", metadata.display()))?;
        let class_idx = column(&["classe", "class"]).ok_or_else(|| {
            anyhow!("metadata {} has no 'classe' column", metadata.display())
        })?;

        let mut entries = Vec::new();
        let mut missing = 0usize;
        let mut record = StringRecord::new();
        while reader
            .read_record(&mut record)
            .with_context(|| format!("parsing {}", metadata.display()))?
        {
            let (Some(id), Some(class_label)) = (record.get(id_idx), record.get(class_idx)) else {
                continue;
            };
            if id.is_empty() || class_label.is_empty() {
                continue;
            }

            let entry = RecordingEntry {
                id: id.to_string(),
                class_label: class_label.to_string(),
                path: self.entry_path(class_label, id),
            };
            if !entry.exists() {
                log::warn!("Recording {} listed in metadata is missing: {}", id, entry.path.display());
                missing += 1;
            }
            entries.push(entry);
        }

        log::info!(
            "Resolved {} recordings from {} ({} missing)",
            entries.len(),
            metadata.display(),
            missing
        );
        Ok(entries)
    }
}
