use crate::records::{SizedArticle, WikiLinkGroup, WikiVolumeRecord};
use std::collections::HashMap;

/// Keeps articles strictly shorter than `max_page_length`
pub fn below_length_threshold(
    volumes: &[WikiVolumeRecord],
    max_page_length: u64,
) -> Vec<WikiVolumeRecord> {
    volumes
        .iter()
        .filter(|v| v.page_length < max_page_length)
        .cloned()
        .collect()
}

/// Joins volume records with link groups on `title`
///
/// Rows without a match on the other side are dropped. Output is ordered by
/// `page_length` ascending; a title shared by several genes yields one row per
/// gene, in link-group order.
pub fn inner_join_on_title(
    volumes: &[WikiVolumeRecord],
    groups: &[WikiLinkGroup],
) -> Vec<SizedArticle> {
    let mut by_title: HashMap<&str, Vec<&WikiLinkGroup>> = HashMap::new();
    for group in groups {
        by_title.entry(group.title.as_str()).or_default().push(group);
    }

    let mut sorted: Vec<&WikiVolumeRecord> = volumes.iter().collect();
    sorted.sort_by_key(|v| v.page_length);

    sorted
        .into_iter()
        .flat_map(|volume| {
            by_title
                .get(volume.title.as_str())
                .into_iter()
                .flatten()
                .map(move |group| SizedArticle {
                    title: volume.title.clone(),
                    page_length: volume.page_length,
                    last_touched: volume.last_touched.clone(),
                    last_revision_id: volume.last_revision_id,
                    gene_id: group.gene_id.clone(),
                    protein_id: group.protein_id.clone(),
                    wikilink: group.wikilink.clone(),
                })
        })
        .collect()
}
