//! JSONL dataset files.

use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use anyhow::Context;
use serde::Serialize;

/// `strftime` pattern of the run timestamp embedded in file names.
pub(crate) const RUN_STAMP_FORMAT: &str = "%Y%m%d_%H%M%S";

/// Where one harvest run writes its files.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct OutputPaths {
    pub(crate) raw: PathBuf,
    pub(crate) pairs: PathBuf,
}

impl OutputPaths {
    pub(crate) fn new(out_dir: &Path, location: &str, stamp: &str) -> Self {
        let loc = newsgen_core::safe_filename(location);
        Self {
            raw: out_dir
                .join("raw")
                .join(format!("kudago_events__{loc}__{stamp}.jsonl")),
            pairs: out_dir
                .join("processed")
                .join(format!("kudago_pairs__{loc}__{stamp}.jsonl")),
        }
    }
}

/// Writes one JSON object per line, creating parent directories. Non-ASCII
/// text is written as is.
pub(crate) fn write_jsonl<T: Serialize>(path: &Path, rows: &[T]) -> anyhow::Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)
            .with_context(|| format!("failed to create directory {}", parent.display()))?;
    }
    let file =
        File::create(path).with_context(|| format!("failed to create {}", path.display()))?;
    let mut writer = BufWriter::new(file);
    for row in rows {
        serde_json::to_writer(&mut writer, row)
            .with_context(|| format!("failed to serialize a row for {}", path.display()))?;
        writer.write_all(b"\n")?;
    }
    writer
        .flush()
        .with_context(|| format!("failed to write {}", path.display()))?;
    Ok(())
}
