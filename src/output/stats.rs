//! Statistics from the run ledger
//!
//! This module provides functionality for extracting and displaying run and
//! pass history from the ledger.

use crate::storage::{PassRecord, RunLedger, RunRecord, StorageResult};

/// Ledger statistics summary
#[derive(Debug, Clone)]
pub struct LedgerStatistics {
    /// Most recent runs, newest first
    pub runs: Vec<RunRecord>,

    /// Passes of the newest run
    pub latest_passes: Vec<PassRecord>,
}

impl LedgerStatistics {
    /// Items still quarantined after the last pass of each stage in the newest run
    pub fn residual_by_stage(&self) -> Vec<(String, u64)> {
        let mut residual: Vec<(String, u64)> = Vec::new();
        for pass in &self.latest_passes {
            let stage = pass.stage.to_db_string();
            match residual.iter_mut().find(|(s, _)| *s == stage) {
                Some(entry) => entry.1 = pass.failed,
                None => residual.push((stage.to_string(), pass.failed)),
            }
        }
        residual
    }
}

/// Loads statistics from the ledger
///
/// # Arguments
///
/// * `ledger` - The ledger to query
/// * `limit` - Number of runs to include
pub fn load_statistics(ledger: &dyn RunLedger, limit: usize) -> StorageResult<LedgerStatistics> {
    let runs = ledger.list_runs(limit)?;
    let latest_passes = match runs.first() {
        Some(run) => ledger.get_passes(run.id)?,
        None => Vec::new(),
    };

    Ok(LedgerStatistics {
        runs,
        latest_passes,
    })
}

/// Prints statistics to stdout in a formatted manner
///
/// # Arguments
///
/// * `stats` - The statistics to display
pub fn print_statistics(stats: &LedgerStatistics) {
    println!("=== Pipeline Statistics ===\n");

    if stats.runs.is_empty() {
        println!("No runs recorded yet.");
        return;
    }

    println!("Runs:");
    for run in &stats.runs {
        println!(
            "  #{} {} [{}] stage={} started={} finished={}",
            run.id,
            run.status.to_db_string(),
            &run.config_hash[..run.config_hash.len().min(12)],
            run.stage,
            run.started_at,
            run.finished_at.as_deref().unwrap_or("-")
        );
    }
    println!();

    println!("Passes of run #{}:", stats.runs[0].id);
    if stats.latest_passes.is_empty() {
        println!("  (none)");
    }
    for pass in &stats.latest_passes {
        let rate = if pass.attempted > 0 {
            (pass.succeeded as f64 / pass.attempted as f64) * 100.0
        } else {
            0.0
        };
        println!(
            "  {} pass {}: {} attempted, {} succeeded ({:.1}%), {} quarantined",
            pass.stage, pass.pass_number, pass.attempted, pass.succeeded, rate, pass.failed
        );
    }
    println!();

    let residual = stats.residual_by_stage();
    if !residual.is_empty() {
        println!("Residual failures:");
        for (stage, count) in residual {
            println!("  {}: {}", stage, count);
        }
    }
}
