//! Ledger trait and storage error types

use crate::quarantine::PassSummary;
use crate::state::RunStatus;
use crate::storage::{PassRecord, RunRecord};
use thiserror::Error;

/// Errors that can occur during storage operations
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Run not found: {0}")]
    RunNotFound(i64),

    #[error("Missing table {0} (run the stage that produces it first)")]
    MissingTable(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    #[error("Table error: {0}")]
    Csv(#[from] csv::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Result type for storage operations
pub type StorageResult<T> = Result<T, StorageError>;

/// Record of pipeline runs and quarantine passes
pub trait RunLedger {
    // ===== Run Management =====

    /// Creates a new run
    ///
    /// # Arguments
    ///
    /// * `config_hash` - Hash of the configuration file
    /// * `stage` - CLI stage selection the run was started with
    ///
    /// # Returns
    ///
    /// The ID of the newly created run
    fn create_run(&mut self, config_hash: &str, stage: &str) -> StorageResult<i64>;

    /// Gets a run by ID
    fn get_run(&self, run_id: i64) -> StorageResult<RunRecord>;

    /// Gets the most recent run
    fn get_latest_run(&self) -> StorageResult<Option<RunRecord>>;

    /// Most recent runs first
    fn list_runs(&self, limit: usize) -> StorageResult<Vec<RunRecord>>;

    /// Updates the status of a run
    fn update_run_status(&mut self, run_id: i64, status: RunStatus) -> StorageResult<()>;

    /// Marks a run as completed with a finish timestamp
    fn complete_run(&mut self, run_id: i64) -> StorageResult<()>;

    // ===== Pass History =====

    /// Records the counts of one quarantine pass
    fn record_pass(&mut self, run_id: i64, pass: &PassSummary) -> StorageResult<()>;

    /// Gets every pass of a run in the order they were recorded
    fn get_passes(&self, run_id: i64) -> StorageResult<Vec<PassRecord>>;
}
