//! Literature index adapter (E-utilities)
//!
//! Two query shapes:
//! - `elink`: gene ID -> linked publication IDs
//! - `efetch`: publication ID -> MEDLINE citation
//!
//! Per-publication failures inside a gene are quarantined separately so one
//! bad PMID never costs the whole gene.

use crate::fetch::medline::parse_records;
use crate::fetch::{FetchClient, Pacer};
use crate::quarantine::{run_pass, LiteratureTables};
use crate::records::{AuthorRecord, DateSource, PmidFailure, PublicationRecord};
use crate::state::Stage;
use crate::{FetchError, FetchResult};
use serde::Deserialize;
use serde_json::Value;

/// Link set name for the gene -> citation association
const GENE_PUBMED_LINK: &str = "gene_pubmed";

#[derive(Debug, Deserialize)]
struct ElinkResponse {
    #[serde(default)]
    linksets: Vec<LinkSet>,
}

#[derive(Debug, Deserialize)]
struct LinkSet {
    #[serde(default)]
    linksetdbs: Vec<LinkSetDb>,
}

#[derive(Debug, Deserialize)]
struct LinkSetDb {
    #[serde(default)]
    linkname: String,
    #[serde(default)]
    links: Vec<Value>,
}

fn link_id(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

/// Identification sent with every request
#[derive(Debug, Clone)]
pub struct LiteratureCredentials {
    pub tool: String,
    pub email: String,
    pub api_key: Option<String>,
}

/// A fetched citation, not yet attached to a gene
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CitationDetail {
    pub pmid: String,
    pub publication_date: String,
    pub date_source: DateSource,
    pub authors: Vec<AuthorRecord>,
}

impl CitationDetail {
    pub fn publication_for(&self, gene_id: &str) -> PublicationRecord {
        PublicationRecord {
            gene_id: gene_id.to_string(),
            pmid: self.pmid.clone(),
            publication_date: self.publication_date.clone(),
            date_source: self.date_source,
        }
    }
}

/// Everything fetched for one gene
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GeneLiterature {
    pub gene_id: String,
    pub publications: Vec<PublicationRecord>,
    pub authors: Vec<AuthorRecord>,
    pub pmid_failures: Vec<PmidFailure>,
}

/// Client for the literature index
#[derive(Debug)]
pub struct LiteratureIndex {
    http: FetchClient,
    base_url: String,
    credentials: LiteratureCredentials,
    min_linked_publications: usize,
    pacer: Pacer,
}

impl LiteratureIndex {
    pub fn new(
        http: FetchClient,
        base_url: impl Into<String>,
        credentials: LiteratureCredentials,
        min_linked_publications: usize,
        pacer: Pacer,
    ) -> Self {
        Self {
            http,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            credentials,
            min_linked_publications,
            pacer,
        }
    }

    fn params<'a>(&'a self, extra: &[(&'a str, &'a str)]) -> Vec<(&'a str, &'a str)> {
        let mut params = extra.to_vec();
        params.push(("tool", self.credentials.tool.as_str()));
        params.push(("email", self.credentials.email.as_str()));
        if let Some(key) = &self.credentials.api_key {
            params.push(("api_key", key.as_str()));
        }
        params
    }

    /// Publication IDs linked to a gene
    ///
    /// Prefers the `gene_pubmed` link set and falls back to the first one.
    pub async fn linked_publications(&self, gene_id: &str) -> FetchResult<Vec<String>> {
        self.pacer.ready().await;

        let url = format!("{}/elink.fcgi", self.base_url);
        let params = self.params(&[
            ("dbfrom", "gene"),
            ("db", "pubmed"),
            ("id", gene_id),
            ("retmode", "json"),
        ]);
        let response: ElinkResponse = self
            .http
            .get_json(&url, &params)
            .await
            .map_err(|e| e.for_item(gene_id))?;

        let dbs: Vec<&LinkSetDb> = response
            .linksets
            .iter()
            .flat_map(|set| set.linksetdbs.iter())
            .collect();
        let chosen = dbs
            .iter()
            .find(|db| db.linkname == GENE_PUBMED_LINK)
            .or_else(|| dbs.first());

        Ok(chosen
            .map(|db| db.links.iter().filter_map(link_id).collect())
            .unwrap_or_default())
    }

    /// Fetches and parses one citation
    pub async fn citation(&self, pmid: &str) -> FetchResult<CitationDetail> {
        self.pacer.ready().await;

        let url = format!("{}/efetch.fcgi", self.base_url);
        let params = self.params(&[
            ("db", "pubmed"),
            ("id", pmid),
            ("rettype", "medline"),
            ("retmode", "text"),
        ]);
        let text = self
            .http
            .get_text(&url, &params)
            .await
            .map_err(|e| e.for_item(pmid))?;

        let record = parse_records(&text)
            .into_iter()
            .next()
            .ok_or_else(|| FetchError::NotFoundOrEmpty {
                item: pmid.to_string(),
                reason: "no MEDLINE record in response".to_string(),
            })?;

        let (publication_date, date_source) = record.publication_date();
        Ok(CitationDetail {
            pmid: pmid.to_string(),
            publication_date,
            date_source,
            authors: record.author_records(pmid),
        })
    }

    /// Fetches every citation in `pmids`, quarantining individual failures
    pub async fn citations(&self, pmids: &[String]) -> (Vec<CitationDetail>, Vec<String>) {
        let outcome = run_pass(Stage::PublicationDetail, pmids, 1, |pmid| async move {
            self.citation(&pmid).await
        })
        .await;
        let failed = outcome.failures.into_iter().map(|f| f.item_key).collect();
        (outcome.successes, failed)
    }

    /// Linked publications and their citations for one gene
    ///
    /// Genes with no more than `min_linked_publications` links are rejected
    /// before any citation is fetched.
    pub async fn gene(&self, gene_id: &str) -> FetchResult<GeneLiterature> {
        let pmids = self.linked_publications(gene_id).await?;
        if pmids.len() <= self.min_linked_publications {
            return Err(FetchError::NotFoundOrEmpty {
                item: gene_id.to_string(),
                reason: format!(
                    "{} linked publications, need more than {}",
                    pmids.len(),
                    self.min_linked_publications
                ),
            });
        }

        tracing::debug!("Gene {}: fetching {} citations", gene_id, pmids.len());
        let (citations, failed) = self.citations(&pmids).await;

        let mut literature = GeneLiterature {
            gene_id: gene_id.to_string(),
            ..GeneLiterature::default()
        };
        for citation in citations {
            literature.publications.push(citation.publication_for(gene_id));
            literature.authors.extend(citation.authors);
        }
        literature.pmid_failures = failed
            .into_iter()
            .map(|pmid| PmidFailure {
                gene_id: gene_id.to_string(),
                pmid,
            })
            .collect();

        Ok(literature)
    }
}

impl Extend<GeneLiterature> for LiteratureTables {
    fn extend<I: IntoIterator<Item = GeneLiterature>>(&mut self, iter: I) {
        for gene in iter {
            self.publications.extend(gene.publications);
            self.authors.extend(gene.authors);
            self.pmid_failures.extend(gene.pmid_failures);
        }
    }
}
