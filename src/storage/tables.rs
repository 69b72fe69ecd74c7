//! Tab-separated stage tables
//!
//! Every table is fully rewritten on save; a temporary sibling file is
//! renamed over the old one so a crash never leaves a half-written table.

use crate::storage::traits::{StorageError, StorageResult};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::path::{Path, PathBuf};

fn temp_sibling(path: &Path) -> PathBuf {
    let mut name = path.file_name().unwrap_or_default().to_os_string();
    name.push(".tmp");
    path.with_file_name(name)
}

/// Writes rows to `path` as a headed TSV table
pub fn write_table<T: Serialize>(path: &Path, rows: &[T]) -> StorageResult<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }

    let tmp = temp_sibling(path);
    {
        let mut writer = csv::WriterBuilder::new()
            .delimiter(b'\t')
            .has_headers(true)
            .from_path(&tmp)?;
        for row in rows {
            writer.serialize(row)?;
        }
        writer.flush()?;
    }
    std::fs::rename(&tmp, path)?;

    tracing::debug!("Wrote {} rows to {}", rows.len(), path.display());
    Ok(())
}

/// Reads a headed TSV table
///
/// # Returns
///
/// * `Err(StorageError::MissingTable)` - The table has not been produced yet
pub fn read_table<T: DeserializeOwned>(path: &Path) -> StorageResult<Vec<T>> {
    if !path.exists() {
        return Err(StorageError::MissingTable(path.display().to_string()));
    }

    let mut reader = csv::ReaderBuilder::new()
        .delimiter(b'\t')
        .has_headers(true)
        .from_path(path)?;

    let rows = reader
        .deserialize()
        .collect::<Result<Vec<T>, csv::Error>>()?;
    Ok(rows)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::records::{AuthorRollupRow, EmailStatus, WikiVolumeRecord};

    #[test]
    fn test_table_survives_disk() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("gene_wiki_vol_info.tsv");
        let rows = vec![
            WikiVolumeRecord {
                title: "Cyclin_D1".to_string(),
                page_length: 4_210,
                last_touched: "2021-05-01T10:00:00Z".to_string(),
                last_revision_id: 1_020_304,
            },
            WikiVolumeRecord {
                title: "AP-1, \"quoted\"".to_string(),
                page_length: 12,
                last_touched: String::new(),
                last_revision_id: 0,
            },
        ];

        write_table(&path, &rows).unwrap();
        let loaded: Vec<WikiVolumeRecord> = read_table(&path).unwrap();
        assert_eq!(loaded, rows);

        let header = std::fs::read_to_string(&path).unwrap();
        assert!(header.starts_with("title\tpage_length\tlast_touched\tlast_revision_id"));
    }

    #[test]
    fn test_optional_columns() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("potential_authors.tsv");
        let rows = vec![AuthorRollupRow {
            gene_id: "672".to_string(),
            author_short_name: "Smith J".to_string(),
            author_full_name: "Smith, Jane".to_string(),
            email: None,
            email_status: EmailStatus::NotAvailable,
            count: 3,
        }];

        write_table(&path, &rows).unwrap();
        let loaded: Vec<AuthorRollupRow> = read_table(&path).unwrap();
        assert_eq!(loaded[0].email, None);
        assert_eq!(loaded[0].email_status, EmailStatus::NotAvailable);

        let text = std::fs::read_to_string(&path).unwrap();
        assert!(text.contains("\tnot_available\t"));
    }

    #[test]
    fn test_missing_table() {
        let dir = tempfile::tempdir().unwrap();
        let result: StorageResult<Vec<WikiVolumeRecord>> =
            read_table(&dir.path().join("absent.tsv"));
        assert!(matches!(result, Err(StorageError::MissingTable(_))));
    }
}
