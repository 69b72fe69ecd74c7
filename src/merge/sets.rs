use crate::records::{ExternalEntityRef, WikiLinkGroup, WikiLinkRecord};
use std::collections::{BTreeMap, BTreeSet, HashSet};

/// Gene IDs present in both sets
///
/// Each side is deduplicated to its gene-ID set, the two sets are
/// concatenated, and IDs occurring exactly twice are kept. This equals a
/// direct set intersection for every input. The result is sorted.
pub fn intersect_by_count<'a, A, B>(left: A, right: B) -> Vec<String>
where
    A: IntoIterator<Item = &'a str>,
    B: IntoIterator<Item = &'a str>,
{
    let left: BTreeSet<&str> = left.into_iter().collect();
    let right: BTreeSet<&str> = right.into_iter().collect();

    let mut counts: BTreeMap<&str, usize> = BTreeMap::new();
    for gene_id in left.into_iter().chain(right) {
        *counts.entry(gene_id).or_insert(0) += 1;
    }

    counts
        .into_iter()
        .filter(|(_, count)| *count == 2)
        .map(|(gene_id, _)| gene_id.to_string())
        .collect()
}

/// Genes with neither a gene article nor a protein article
///
/// Returns the rows of `genes_no_article` whose gene also appears in
/// `proteins_no_article`, in their original order.
pub fn genes_without_any_article(
    genes_no_article: &[ExternalEntityRef],
    proteins_no_article: &[ExternalEntityRef],
) -> Vec<ExternalEntityRef> {
    let both: BTreeSet<String> = intersect_by_count(
        genes_no_article.iter().map(|e| e.gene_id.as_str()),
        proteins_no_article.iter().map(|e| e.gene_id.as_str()),
    )
    .into_iter()
    .collect();

    genes_no_article
        .iter()
        .filter(|e| both.contains(&e.gene_id))
        .cloned()
        .collect()
}

/// Union of the gene-side and protein-side link sets, one row per
/// `(gene_id, protein_id, wikilink)`
///
/// Groups come out in key order, so the result does not depend on the
/// order of the inputs.
pub fn union_dedup(
    gene_links: &[WikiLinkRecord],
    protein_links: &[WikiLinkRecord],
) -> Vec<WikiLinkGroup> {
    let mut groups: BTreeMap<(&str, &str, &str), (&str, usize)> = BTreeMap::new();

    for record in gene_links.iter().chain(protein_links) {
        let key = (
            record.gene_id.as_str(),
            record.protein_id.as_str(),
            record.wikilink.as_str(),
        );
        groups.entry(key).or_insert((record.title.as_str(), 0)).1 += 1;
    }

    groups
        .into_iter()
        .map(|((gene_id, protein_id, wikilink), (title, count))| WikiLinkGroup {
            gene_id: gene_id.to_string(),
            protein_id: protein_id.to_string(),
            wikilink: wikilink.to_string(),
            title: title.to_string(),
            count,
        })
        .collect()
}

/// Distinct titles in first-appearance order
pub fn unique_titles(groups: &[WikiLinkGroup]) -> Vec<String> {
    let mut seen = HashSet::new();
    groups
        .iter()
        .filter(|g| seen.insert(g.title.as_str()))
        .map(|g| g.title.clone())
        .collect()
}
