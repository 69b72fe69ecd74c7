//! Acquisition stages whose per-item failures are quarantined
//!
//! The string form is what lands in the ledger and in `FailureRecord`s.

use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Stage {
    /// Existence queries against the knowledge graph
    KnowledgeGraph,

    /// Article length per normalized title
    WikiVolume,

    /// Pageview series per normalized title
    PageViews,

    /// Gene -> linked publications -> publication details
    GeneLiterature,

    /// A single publication detail fetch
    PublicationDetail,
}

impl Stage {
    /// Name of the newline-delimited residual failure file for this stage
    ///
    /// Stages without a resumable per-item loop return None.
    pub fn failure_file(&self) -> Option<&'static str> {
        match self {
            Self::KnowledgeGraph => None,
            Self::WikiVolume => Some("wiki_title_failures.txt"),
            Self::PageViews => Some("page_view_failures.txt"),
            Self::GeneLiterature => Some("gene_failures.txt"),
            Self::PublicationDetail => None,
        }
    }

    pub fn to_db_string(&self) -> &'static str {
        match self {
            Self::KnowledgeGraph => "knowledge_graph",
            Self::WikiVolume => "wiki_volume",
            Self::PageViews => "page_views",
            Self::GeneLiterature => "gene_literature",
            Self::PublicationDetail => "publication_detail",
        }
    }

    /// Returns None if the string doesn't match any known stage.
    pub fn from_db_string(s: &str) -> Option<Self> {
        match s {
            "knowledge_graph" => Some(Self::KnowledgeGraph),
            "wiki_volume" => Some(Self::WikiVolume),
            "page_views" => Some(Self::PageViews),
            "gene_literature" => Some(Self::GeneLiterature),
            "publication_detail" => Some(Self::PublicationDetail),
            _ => None,
        }
    }

    pub fn all_stages() -> Vec<Self> {
        vec![
            Self::KnowledgeGraph,
            Self::WikiVolume,
            Self::PageViews,
            Self::GeneLiterature,
            Self::PublicationDetail,
        ]
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_db_string())
    }
}
