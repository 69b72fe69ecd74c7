//! Per-item failure quarantine and iterative resume
//!
//! Any "fetch one item from a list" operation runs through [`run_pass`], which
//! attempts every key exactly once and splits the outcome into successes and
//! quarantined failures. An [`Accumulator`] carries the running result set and
//! the residual failure keys between passes (and, through the persisted
//! tables, between runs).
//!
//! # Example
//!
//! ```
//! use genewiki_priority::quarantine::{run_pass, Accumulator};
//! use genewiki_priority::{FetchError, Stage};
//!
//! # tokio_test_block(async {
//! let keys = vec!["a".to_string(), "b".to_string()];
//! let pass = run_pass(Stage::WikiVolume, &keys, 1, |key| async move {
//!     if key == "b" {
//!         Err(FetchError::NotFoundOrEmpty { item: key, reason: "missing".into() })
//!     } else {
//!         Ok(key.len())
//!     }
//! })
//! .await;
//!
//! let mut acc: Accumulator<Vec<usize>> = Accumulator::pending(keys);
//! acc.merge(pass);
//! assert_eq!(acc.results, vec![1]);
//! assert_eq!(acc.residual_keys(), vec!["b".to_string()]);
//! # });
//! # fn tokio_test_block<F: std::future::Future>(f: F) -> F::Output {
//! #     tokio::runtime::Runtime::new().unwrap().block_on(f)
//! # }
//! ```

mod accumulator;
mod pass;
mod resume;

pub use accumulator::{Accumulator, LiteratureTables};
pub use pass::{run_pass, PassOutcome, PassSummary};
pub use resume::{resume_until_settled, ResumePolicy};
