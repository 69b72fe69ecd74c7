//! Newline-delimited residual failure keys

use crate::storage::traits::StorageResult;
use std::io::Write;
use std::path::Path;

/// Overwrites `path` with one key per line
pub fn write_keys(path: &Path, keys: &[String]) -> StorageResult<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let mut file = std::io::BufWriter::new(std::fs::File::create(path)?);
    for key in keys {
        writeln!(file, "{}", key)?;
    }
    file.flush()?;
    Ok(())
}

/// Reads the keys of the next pass
///
/// A missing file means nothing is pending.
pub fn read_keys(path: &Path) -> StorageResult<Vec<String>> {
    if !path.exists() {
        return Ok(Vec::new());
    }
    let content = std::fs::read_to_string(path)?;
    Ok(content
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(str::to_string)
        .collect())
}
