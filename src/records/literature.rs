use serde::{Deserialize, Serialize};

/// Which citation field a publication date came from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DateSource {
    /// The citation's own publication date (MEDLINE `DP`)
    ExplicitPublicationDate,
    /// Fallback to the index submission date (MEDLINE `EDAT`)
    RecordSubmissionDate,
}

/// A publication linked to a gene
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PublicationRecord {
    pub gene_id: String,
    pub pmid: String,
    /// Free text; `"?"` when neither date field was present
    pub publication_date: String,
    pub date_source: DateSource,
}

/// Whether an author row can be contacted
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EmailStatus {
    Found,
    /// Affiliation text exists but holds no address
    NotFound,
    /// No affiliation text at all
    NotAvailable,
}

/// One author of one publication
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct AuthorRecord {
    pub author_short_name: String,
    pub author_full_name: String,
    /// Older citations carry affiliation text for the first author only
    pub affiliation: Option<String>,
    pub pmid: String,
    pub publication_date: String,
    pub email: Option<String>,
}

impl AuthorRecord {
    pub fn email_status(&self) -> EmailStatus {
        match (&self.affiliation, &self.email) {
            (None, _) => EmailStatus::NotAvailable,
            (Some(_), Some(_)) => EmailStatus::Found,
            (Some(_), None) => EmailStatus::NotFound,
        }
    }
}

/// A publication detail fetch that failed inside an otherwise successful gene
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PmidFailure {
    pub gene_id: String,
    pub pmid: String,
}
