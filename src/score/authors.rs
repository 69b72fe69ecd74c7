use crate::records::{AuthorRecord, AuthorRollupRow, PublicationRecord};
use std::collections::{HashMap, HashSet};

/// Frequent authors per gene
///
/// # Steps
///
/// 1. Drop authors whose short name occurs only once in the whole author table
/// 2. For each gene (first-appearance order) restrict authors to its PMIDs
/// 3. Count distinct `(short name, full name, pmid)` rows per short name
/// 4. Keep short names counted more than `min_count` times
/// 5. Emit one row per distinct `(short name, full name, email)`, most
///    frequent first
pub fn author_rollup(
    publications: &[PublicationRecord],
    authors: &[AuthorRecord],
    min_count: usize,
) -> Vec<AuthorRollupRow> {
    // Step 1
    let mut corpus_counts: HashMap<&str, usize> = HashMap::new();
    for author in authors {
        *corpus_counts.entry(author.author_short_name.as_str()).or_insert(0) += 1;
    }
    let recurring: Vec<&AuthorRecord> = authors
        .iter()
        .filter(|a| corpus_counts[a.author_short_name.as_str()] > 1)
        .collect();

    // Gene -> PMIDs, genes in first-appearance order
    let mut gene_order: Vec<&str> = Vec::new();
    let mut gene_pmids: HashMap<&str, HashSet<&str>> = HashMap::new();
    for publication in publications {
        let pmids = gene_pmids
            .entry(publication.gene_id.as_str())
            .or_insert_with(|| {
                gene_order.push(publication.gene_id.as_str());
                HashSet::new()
            });
        pmids.insert(publication.pmid.as_str());
    }

    let mut rows = Vec::new();
    for gene_id in gene_order {
        let pmids = &gene_pmids[gene_id];

        // Step 2
        let gene_authors: Vec<&AuthorRecord> = recurring
            .iter()
            .copied()
            .filter(|a| pmids.contains(a.pmid.as_str()))
            .collect();

        // Step 3
        let mut distinct = HashSet::new();
        let mut counts: HashMap<&str, usize> = HashMap::new();
        for author in &gene_authors {
            let key = (
                author.author_short_name.as_str(),
                author.author_full_name.as_str(),
                author.pmid.as_str(),
            );
            if distinct.insert(key) {
                *counts.entry(key.0).or_insert(0) += 1;
            }
        }

        // Step 4 and 5
        let mut emitted = HashSet::new();
        let mut gene_rows: Vec<AuthorRollupRow> = gene_authors
            .iter()
            .filter(|a| counts[a.author_short_name.as_str()] > min_count)
            .filter(|a| {
                emitted.insert((
                    a.author_short_name.as_str(),
                    a.author_full_name.as_str(),
                    a.email.as_deref(),
                ))
            })
            .map(|a| AuthorRollupRow {
                gene_id: gene_id.to_string(),
                author_short_name: a.author_short_name.clone(),
                author_full_name: a.author_full_name.clone(),
                email: a.email.clone(),
                email_status: a.email_status(),
                count: counts[a.author_short_name.as_str()],
            })
            .collect();

        // Stable: equal counts keep short-name then appearance order
        gene_rows.sort_by(|a, b| {
            b.count
                .cmp(&a.count)
                .then_with(|| a.author_short_name.cmp(&b.author_short_name))
        });
        rows.extend(gene_rows);
    }

    rows
}
