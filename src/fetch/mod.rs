//! Rate-limited access to the three upstream services
//!
//! # Components
//!
//! - `FetchClient`: GET with bounded retries and exponential backoff
//! - `Pacer`: minimum spacing between calls to one upstream
//! - `KnowledgeGraph`: gene/protein/article existence queries
//! - `WikiMetrics`: article length and pageviews
//! - `LiteratureIndex`: linked publications and MEDLINE citations

mod client;
mod literature;
mod medline;
mod pacer;
mod sparql;
mod wiki;

pub use client::{build_http_client, FetchClient};
pub use literature::{CitationDetail, GeneLiterature, LiteratureCredentials, LiteratureIndex};
pub use medline::{parse_records, MedlineRecord, ParsedAuthor};
pub use pacer::Pacer;
pub use sparql::{entity_id, ExistenceQuery, KnowledgeGraph};
pub use wiki::WikiMetrics;
