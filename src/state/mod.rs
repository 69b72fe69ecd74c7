//! State module for tracking pipeline progress
//!
//! # Components
//!
//! - `Stage`: Identifies which acquisition stage produced a failure or a pass
//! - `RunStatus`: Lifecycle of a pipeline run in the ledger

mod run_status;
mod stage;

// Re-export main types
pub use run_status::RunStatus;
pub use stage::Stage;
