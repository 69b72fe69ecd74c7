//! Compressed JSON-lines snapshots
//!
//! Used for the author table, which is the largest intermediate and is
//! reloaded whole by the author rollup.

use crate::storage::traits::{StorageError, StorageResult};
use flate2::read::GzDecoder;
use flate2::write::GzEncoder;
use flate2::Compression;
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::io::{BufRead, BufReader, BufWriter, Write};
use std::path::Path;

/// Writes one JSON object per line through a gzip encoder
pub fn write_snapshot<T: Serialize>(path: &Path, rows: &[T]) -> StorageResult<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }

    let file = std::fs::File::create(path)?;
    let mut encoder = GzEncoder::new(BufWriter::new(file), Compression::default());
    for row in rows {
        serde_json::to_writer(&mut encoder, row)?;
        encoder.write_all(b"\n")?;
    }
    encoder.finish()?.flush()?;

    tracing::debug!("Wrote snapshot of {} rows to {}", rows.len(), path.display());
    Ok(())
}

/// Reads a snapshot written by [`write_snapshot`]
pub fn read_snapshot<T: DeserializeOwned>(path: &Path) -> StorageResult<Vec<T>> {
    if !path.exists() {
        return Err(StorageError::MissingTable(path.display().to_string()));
    }

    let decoder = GzDecoder::new(std::fs::File::open(path)?);
    let mut rows = Vec::new();
    for line in BufReader::new(decoder).lines() {
        let line = line?;
        if line.trim().is_empty() {
            continue;
        }
        rows.push(serde_json::from_str(&line)?);
    }
    Ok(rows)
}
