use crate::merge::normalize_title;
use serde::{Deserialize, Serialize};

/// Knowledge-graph identity of a human gene and the protein it encodes
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ExternalEntityRef {
    pub qid: String,
    pub label: String,
    pub gene_id: String,
    pub protein_id: String,
}

/// A gene (or its protein) with an English-language article link
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct WikiLinkRecord {
    pub qid: String,
    pub label: String,
    pub gene_id: String,
    pub protein_id: String,
    pub wikilink: String,
    pub title: String,
}

impl WikiLinkRecord {
    /// Attaches an article link to an entity, deriving the normalized title
    pub fn new(entity: ExternalEntityRef, wikilink: impl Into<String>) -> Self {
        let wikilink = wikilink.into();
        let title = normalize_title(&wikilink);
        Self {
            qid: entity.qid,
            label: entity.label,
            gene_id: entity.gene_id,
            protein_id: entity.protein_id,
            wikilink,
            title,
        }
    }
}

/// Unique `(gene_id, protein_id, wikilink)` group after the union of the
/// gene-side and protein-side link sets
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WikiLinkGroup {
    pub gene_id: String,
    pub protein_id: String,
    pub wikilink: String,
    pub title: String,
    /// Rows that collapsed into this group (informational)
    pub count: usize,
}
