//! Multi-source merge and filter engine
//!
//! This module combines the knowledge-graph result sets with wiki metrics:
//! - Title normalization shared by every stage that keys on article titles
//! - Set intersection by count (genes lacking both a gene and a protein article)
//! - Union and dedup of the gene-side and protein-side link sets
//! - Length threshold filter and inner join on title

mod filter;
mod sets;
mod title;

pub use filter::{below_length_threshold, inner_join_on_title};
pub use sets::{genes_without_any_article, intersect_by_count, union_dedup, unique_titles};
pub use title::normalize_title;
