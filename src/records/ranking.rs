use crate::records::EmailStatus;
use serde::{Deserialize, Serialize};

/// A short article joined with the gene/protein link it was reached from
///
/// Rows of `priority_by_size.tsv`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SizedArticle {
    pub title: String,
    pub page_length: u64,
    pub last_touched: String,
    pub last_revision_id: u64,
    pub gene_id: String,
    pub protein_id: String,
    pub wikilink: String,
}

/// Per-gene publication aggregates
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PublicationSummary {
    pub gene_id: String,
    pub pubcount: u64,
    pub median_pub_year: i32,
    pub max_pub_year: i32,
}

/// A gene that survived every filter, with its priority score
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GeneScore {
    pub gene_id: String,
    pub title: String,
    pub page_length: u64,
    pub pubcount: u64,
    pub median_pub_year: i32,
    pub max_pub_year: i32,
    pub priority_score: f64,
}

/// A frequent author of one gene's publications
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthorRollupRow {
    pub gene_id: String,
    pub author_short_name: String,
    pub author_full_name: String,
    pub email: Option<String>,
    /// Separates "no affiliation on record" from "affiliation without an address"
    pub email_status: EmailStatus,
    pub count: usize,
}
