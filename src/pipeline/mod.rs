//! Pipeline module for stage orchestration
//!
//! This module contains the stage sequence of a run:
//! - Knowledge-graph existence queries and the no-article filter
//! - Article length, the length threshold and the title join
//! - Pageviews
//! - Linked publications, citations and their retries
//! - Scoring and the author rollup

mod coordinator;
pub mod files;

pub use coordinator::Pipeline;

use std::fmt;

/// A unit of work selectable from the command line
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Step {
    /// Every stage, in order
    All,
    KnowledgeGraph,
    WikiVolume,
    PageViews,
    Literature,
    /// Re-run the genes in the residual gene failure list
    RetryLiterature,
    /// Re-fetch the publications that failed inside successful genes
    RetryPublications,
    Prioritize,
    Authors,
}

impl Step {
    /// Name recorded in the run ledger
    pub fn name(&self) -> &'static str {
        match self {
            Self::All => "all",
            Self::KnowledgeGraph => "knowledge-graph",
            Self::WikiVolume => "wiki-volume",
            Self::PageViews => "page-views",
            Self::Literature => "literature",
            Self::RetryLiterature => "retry-literature",
            Self::RetryPublications => "retry-publications",
            Self::Prioritize => "prioritize",
            Self::Authors => "authors",
        }
    }

    /// True for steps that issue network requests
    pub fn fetches(&self) -> bool {
        !matches!(self, Self::Prioritize | Self::Authors)
    }
}

impl fmt::Display for Step {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
