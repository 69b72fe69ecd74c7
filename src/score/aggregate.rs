use crate::records::{PublicationRecord, PublicationSummary};
use once_cell::sync::Lazy;
use regex::Regex;
use std::collections::{BTreeMap, HashSet};

static YEAR_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\d{4}").expect("year pattern is valid"));

/// First four-digit run of a free-text date, or 0
pub fn extract_year(date: &str) -> i32 {
    YEAR_PATTERN
        .find(date)
        .and_then(|m| m.as_str().parse().ok())
        .unwrap_or(0)
}

/// Median of a sorted slice, truncated toward zero
fn truncated_median(sorted: &[i32]) -> i32 {
    let n = sorted.len();
    if n == 0 {
        return 0;
    }
    if n % 2 == 1 {
        sorted[n / 2]
    } else {
        let sum = sorted[n / 2 - 1] as i64 + sorted[n / 2] as i64;
        (sum / 2) as i32
    }
}

/// Per-gene publication count and median/max publication year
///
/// Rows are deduplicated on `(gene_id, pmid)` first. Dates without a
/// parseable year count as year 0 and are included in the median and max.
/// Output is ordered by `gene_id`.
pub fn summarize_publications(publications: &[PublicationRecord]) -> Vec<PublicationSummary> {
    let mut seen = HashSet::new();
    let mut years: BTreeMap<&str, Vec<i32>> = BTreeMap::new();

    for publication in publications {
        if !seen.insert((publication.gene_id.as_str(), publication.pmid.as_str())) {
            continue;
        }
        years
            .entry(publication.gene_id.as_str())
            .or_default()
            .push(extract_year(&publication.publication_date));
    }

    years
        .into_iter()
        .map(|(gene_id, mut years)| {
            years.sort_unstable();
            PublicationSummary {
                gene_id: gene_id.to_string(),
                pubcount: years.len() as u64,
                median_pub_year: truncated_median(&years),
                max_pub_year: years.last().copied().unwrap_or(0),
            }
        })
        .collect()
}
