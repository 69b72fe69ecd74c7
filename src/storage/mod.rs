//! Storage module for persisting pipeline state
//!
//! This module handles everything written to disk, including:
//! - Tab-separated stage tables (one canonical schema per record type)
//! - Newline-delimited residual failure lists per resumable stage
//! - The compressed author snapshot
//! - The SQLite run ledger (runs and quarantine passes)

mod failures;
mod ledger;
mod schema;
mod snapshot;
mod tables;
mod traits;

pub use failures::{read_keys, write_keys};
pub use ledger::SqliteLedger;
pub use snapshot::{read_snapshot, write_snapshot};
pub use tables::{read_table, write_table};
pub use traits::{RunLedger, StorageError, StorageResult};

use crate::state::{RunStatus, Stage};
use std::path::Path;

/// Initializes or opens the run ledger
///
/// # Arguments
///
/// * `path` - Path to the SQLite database file
pub fn open_ledger(path: &Path) -> StorageResult<SqliteLedger> {
    SqliteLedger::new(path)
}

/// Represents a pipeline run
#[derive(Debug, Clone)]
pub struct RunRecord {
    pub id: i64,
    pub started_at: String,
    pub finished_at: Option<String>,
    pub config_hash: String,
    /// CLI stage selection
    pub stage: String,
    pub status: RunStatus,
}

/// Represents one recorded quarantine pass
#[derive(Debug, Clone)]
pub struct PassRecord {
    pub run_id: i64,
    pub stage: Stage,
    pub pass_number: u32,
    pub attempted: u64,
    pub succeeded: u64,
    pub failed: u64,
    pub recorded_at: String,
}
