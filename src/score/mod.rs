//! Aggregation and scoring engine
//!
//! - Per-gene publication aggregates (count, median and max year)
//! - Priority score and the three ranked outputs
//! - Frequent-author rollup per gene
//! - Contact email extraction from affiliation text

mod aggregate;
mod authors;
mod email;
mod rank;

pub use aggregate::{extract_year, summarize_publications};
pub use authors::author_rollup;
pub use email::extract_email;
pub use rank::{prioritize, priority_score, Rankings, ScoreWeights};
