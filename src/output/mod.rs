//! Output module for run summaries and reports
//!
//! This module handles:
//! - Printing run and pass history from the ledger
//! - Generating the markdown summary of the result tables

mod markdown;
pub mod stats;

pub use markdown::{format_markdown_summary, generate_markdown_summary};
pub use stats::{load_statistics, print_statistics, LedgerStatistics};

use crate::pipeline::files;
use crate::records::GeneScore;
use crate::state::Stage;
use crate::storage::{read_keys, read_table, PassRecord, RunLedger, RunRecord, StorageResult};
use std::path::Path;

/// Everything the markdown summary reports
#[derive(Debug, Clone)]
pub struct RunSummary {
    /// Newest run in the ledger
    pub run: Option<RunRecord>,
    pub duration_seconds: Option<u64>,
    pub passes: Vec<PassRecord>,
    /// Row count per table, None if the table has not been written yet
    pub table_rows: Vec<(String, Option<usize>)>,
    /// Items listed in each residual failure file
    pub residual_failures: Vec<(String, usize)>,
    pub top_genes: Vec<GeneScore>,
}

/// Counts data rows of a TSV table
fn count_rows(path: &Path) -> StorageResult<Option<usize>> {
    if !path.exists() {
        return Ok(None);
    }
    let mut reader = csv::ReaderBuilder::new()
        .delimiter(b'\t')
        .has_headers(true)
        .from_path(path)?;
    let mut rows = 0;
    for record in reader.records() {
        record?;
        rows += 1;
    }
    Ok(Some(rows))
}

fn duration_seconds(run: &RunRecord) -> Option<u64> {
    let started = run.started_at.parse::<chrono::DateTime<chrono::Utc>>().ok()?;
    let finished = run
        .finished_at
        .as_ref()?
        .parse::<chrono::DateTime<chrono::Utc>>()
        .ok()?;
    Some((finished - started).num_seconds().max(0) as u64)
}

/// Builds a run summary from the ledger and the on-disk tables
///
/// # Arguments
///
/// * `ledger` - The run ledger
/// * `data_dir` - Intermediate tables and failure lists
/// * `result_dir` - Ranked outputs
/// * `top` - Number of genes from the score ranking to include
pub fn generate_summary(
    ledger: &dyn RunLedger,
    data_dir: &Path,
    result_dir: &Path,
    top: usize,
) -> crate::Result<RunSummary> {
    let run = ledger.get_latest_run()?;
    let passes = match &run {
        Some(run) => ledger.get_passes(run.id)?,
        None => Vec::new(),
    };

    let mut table_rows = Vec::new();
    for name in files::DATA_TABLES {
        table_rows.push((name.to_string(), count_rows(&data_dir.join(name))?));
    }
    for name in files::RESULT_TABLES {
        table_rows.push((name.to_string(), count_rows(&result_dir.join(name))?));
    }

    let mut residual_failures = Vec::new();
    for stage in Stage::all_stages() {
        if let Some(file) = stage.failure_file() {
            residual_failures.push((file.to_string(), read_keys(&data_dir.join(file))?.len()));
        }
    }
    if let Some(rows) = count_rows(&data_dir.join(files::PMID_FAILURES))? {
        residual_failures.push((files::PMID_FAILURES.to_string(), rows));
    }

    let by_score = result_dir.join(files::GENES_BY_SCORE);
    let top_genes = if by_score.exists() {
        let mut genes: Vec<GeneScore> = read_table(&by_score)?;
        genes.truncate(top);
        genes
    } else {
        Vec::new()
    };

    Ok(RunSummary {
        duration_seconds: run.as_ref().and_then(duration_seconds),
        run,
        passes,
        table_rows,
        residual_failures,
        top_genes,
    })
}
