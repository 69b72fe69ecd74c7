//! Knowledge-graph existence queries
//!
//! Four queries select human genes (instance of gene, found in Homo sapiens,
//! with an Entrez gene ID and an encoded protein) split by whether the gene or
//! its protein has an English-language article. The "no article" sets are
//! computed server-side with `FILTER NOT EXISTS`.

use crate::fetch::FetchClient;
use crate::records::{ExternalEntityRef, WikiLinkRecord};
use crate::{FetchError, FetchResult};
use serde::Deserialize;
use std::collections::{HashMap, HashSet};

/// Prefix of knowledge-graph entity URIs
const ENTITY_PREFIX: &str = "http://www.wikidata.org/entity/";

/// Substring a sitelink must contain to count as English-language
const EN_WIKI_MARKER: &str = "en.wiki";

/// One of the four existence queries
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExistenceQuery {
    /// Genes with no article about the gene
    GenesWithoutArticle,
    /// Genes whose encoded protein has no article
    ProteinsWithoutArticle,
    /// Genes with an article about the gene
    GenesWithArticle,
    /// Genes whose encoded protein has an article
    ProteinsWithArticle,
}

impl ExistenceQuery {
    pub fn all() -> [Self; 4] {
        [
            Self::GenesWithoutArticle,
            Self::ProteinsWithoutArticle,
            Self::GenesWithArticle,
            Self::ProteinsWithArticle,
        ]
    }

    /// Table the result set is persisted to
    pub fn file_name(&self) -> &'static str {
        match self {
            Self::GenesWithoutArticle => "genes_no_wiki.tsv",
            Self::ProteinsWithoutArticle => "proteins_no_wiki.tsv",
            Self::GenesWithArticle => "genes_en_wiki.tsv",
            Self::ProteinsWithArticle => "proteins_en_wiki.tsv",
        }
    }

    pub fn from_file_name(name: &str) -> Option<Self> {
        Self::all().into_iter().find(|q| q.file_name() == name)
    }

    /// True for the queries that return a sitelink per row
    pub fn has_links(&self) -> bool {
        matches!(self, Self::GenesWithArticle | Self::ProteinsWithArticle)
    }

    /// Builds the SPARQL text
    pub fn sparql(&self) -> String {
        // The subject the article is about: the gene itself or its protein
        let subject = match self {
            Self::GenesWithoutArticle | Self::GenesWithArticle => "?item",
            Self::ProteinsWithoutArticle | Self::ProteinsWithArticle => "?proteinwdid",
        };
        let (select_link, sitelink_subject, filter) = if self.has_links() {
            (" ?sitelink", subject, "FILTER EXISTS")
        } else {
            ("", "?item", "FILTER NOT EXISTS")
        };

        format!(
            r#"SELECT ?item ?itemLabel ?geneID ?proteinwdid{select_link}
WHERE
{{
  ?item wdt:P31 wd:Q7187 .
  ?item wdt:P703 wd:Q15978631 .
  ?item wdt:P351 ?geneID .
  ?item wdt:P688 ?proteinwdid .
  ?sitelink schema:about {sitelink_subject} .
  {filter} {{
    ?article schema:about {subject} .
    ?article schema:isPartOf <https://en.wikipedia.org/> .
  }}
  SERVICE wikibase:label {{ bd:serviceParam wikibase:language "[AUTO_LANGUAGE],en" }}
}}"#
        )
    }
}

#[derive(Debug, Deserialize)]
struct SparqlResponse {
    results: SparqlResults,
}

#[derive(Debug, Deserialize)]
struct SparqlResults {
    bindings: Vec<HashMap<String, BindingValue>>,
}

#[derive(Debug, Deserialize)]
struct BindingValue {
    value: String,
}

type Binding = HashMap<String, BindingValue>;

/// Returns the trailing segment of an entity URI (`.../entity/Q123` -> `Q123`)
pub fn entity_id(uri: &str) -> String {
    uri.strip_prefix(ENTITY_PREFIX)
        .or_else(|| uri.rsplit('/').next())
        .unwrap_or(uri)
        .to_string()
}

fn binding_value<'a>(binding: &'a Binding, name: &str) -> Option<&'a str> {
    binding.get(name).map(|b| b.value.as_str())
}

fn entity_from_binding(binding: &Binding) -> Option<ExternalEntityRef> {
    let item = binding_value(binding, "item")?;
    let gene_id = binding_value(binding, "geneID")?;
    let protein = binding_value(binding, "proteinwdid")?;
    let qid = entity_id(item);
    let label = binding_value(binding, "itemLabel")
        .map(str::to_string)
        .unwrap_or_else(|| qid.clone());

    Some(ExternalEntityRef {
        qid,
        label,
        gene_id: gene_id.to_string(),
        protein_id: entity_id(protein),
    })
}

/// Client for the knowledge-graph query service
#[derive(Debug, Clone)]
pub struct KnowledgeGraph {
    http: FetchClient,
    endpoint: String,
}

impl KnowledgeGraph {
    pub fn new(http: FetchClient, endpoint: impl Into<String>) -> Self {
        Self {
            http,
            endpoint: endpoint.into(),
        }
    }

    async fn bindings(&self, query: ExistenceQuery) -> FetchResult<Vec<Binding>> {
        let text = query.sparql();
        let response: SparqlResponse = self
            .http
            .get_json(&self.endpoint, &[("format", "json"), ("query", &text)])
            .await
            .map_err(|e| e.for_item(query.file_name()))?;
        Ok(response.results.bindings)
    }

    /// Runs an existence query and returns deduplicated entity rows
    ///
    /// Rows missing a required binding are skipped.
    pub async fn entities(&self, query: ExistenceQuery) -> FetchResult<Vec<ExternalEntityRef>> {
        let bindings = self.bindings(query).await?;
        let total = bindings.len();

        let mut seen = HashSet::new();
        let entities: Vec<ExternalEntityRef> = bindings
            .iter()
            .filter_map(entity_from_binding)
            .filter(|e| seen.insert(e.clone()))
            .collect();

        tracing::info!(
            "{}: {} rows, {} unique entities",
            query.file_name(),
            total,
            entities.len()
        );
        Ok(entities)
    }

    /// Runs a linked query and returns deduplicated English-language link rows
    pub async fn wiki_links(&self, query: ExistenceQuery) -> FetchResult<Vec<WikiLinkRecord>> {
        if !query.has_links() {
            return Err(FetchError::Malformed {
                item: query.file_name().to_string(),
                reason: "query does not select sitelinks".to_string(),
            });
        }

        let bindings = self.bindings(query).await?;
        let mut seen = HashSet::new();
        let links: Vec<WikiLinkRecord> = bindings
            .iter()
            .filter_map(|binding| {
                let link = binding_value(binding, "sitelink")?;
                if !link.contains(EN_WIKI_MARKER) {
                    return None;
                }
                let entity = entity_from_binding(binding)?;
                Some(WikiLinkRecord::new(entity, link))
            })
            .filter(|r| seen.insert(r.clone()))
            .collect();

        tracing::info!(
            "{}: {} English-language links",
            query.file_name(),
            links.len()
        );
        Ok(links)
    }
}
