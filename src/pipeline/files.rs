//! Names of the persisted tables
//!
//! Intermediate tables and failure lists live in the data directory, ranked
//! outputs in the result directory.

pub const GENES_NO_WIKI: &str = "genes_no_wiki.tsv";
pub const PROTEINS_NO_WIKI: &str = "proteins_no_wiki.tsv";
pub const GENES_EN_WIKI: &str = "genes_en_wiki.tsv";
pub const PROTEINS_EN_WIKI: &str = "proteins_en_wiki.tsv";
pub const GENE_PROTEIN_WIKILINKS: &str = "gene_protein_wikilinks.tsv";
pub const WIKI_VOLUME: &str = "gene_wiki_vol_info.tsv";
pub const PAGE_VIEWS: &str = "page_views.tsv";
pub const PUBLICATION_DETAILS: &str = "publication_details.tsv";
pub const PMID_FAILURES: &str = "pmid_failures.tsv";
pub const AUTHOR_TABLE: &str = "author_table.jsonl.gz";

pub const GENES_WITHOUT_ANY_ARTICLE: &str = "genes_with_no_gene_protein_wiki.tsv";
pub const PRIORITY_BY_SIZE: &str = "priority_by_size.tsv";
pub const GENES_BY_SCORE: &str = "genes_by_score.tsv";
pub const GENES_BY_WIKI_LENGTH: &str = "genes_by_wiki_length.tsv";
pub const GENES_BY_PUBCOUNT: &str = "genes_by_pubcount.tsv";
pub const POTENTIAL_AUTHORS: &str = "potential_authors.tsv";
pub const SUMMARY: &str = "summary.md";

/// TSV tables in the data directory
pub const DATA_TABLES: [&str; 9] = [
    GENES_NO_WIKI,
    PROTEINS_NO_WIKI,
    GENES_EN_WIKI,
    PROTEINS_EN_WIKI,
    GENE_PROTEIN_WIKILINKS,
    WIKI_VOLUME,
    PAGE_VIEWS,
    PUBLICATION_DETAILS,
    PMID_FAILURES,
];

/// TSV tables in the result directory
pub const RESULT_TABLES: [&str; 6] = [
    GENES_WITHOUT_ANY_ARTICLE,
    PRIORITY_BY_SIZE,
    GENES_BY_SCORE,
    GENES_BY_WIKI_LENGTH,
    GENES_BY_PUBCOUNT,
    POTENTIAL_AUTHORS,
];
