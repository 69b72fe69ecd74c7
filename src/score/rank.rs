use crate::config::ThresholdConfig;
use crate::records::{GeneScore, PublicationSummary, SizedArticle};
use std::cmp::Ordering;
use std::collections::HashMap;

/// Constants of the linear priority score
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScoreWeights {
    pub length_numerator: f64,
    pub pubcount_divisor: f64,
}

impl From<&ThresholdConfig> for ScoreWeights {
    fn from(config: &ThresholdConfig) -> Self {
        Self {
            length_numerator: config.length_numerator,
            pubcount_divisor: config.pubcount_divisor,
        }
    }
}

impl Default for ScoreWeights {
    fn default() -> Self {
        Self::from(&ThresholdConfig::default())
    }
}

/// `length_numerator / page_length + pubcount / pubcount_divisor`
///
/// Strictly decreasing in `page_length` and strictly increasing in `pubcount`.
pub fn priority_score(page_length: u64, pubcount: u64, weights: ScoreWeights) -> f64 {
    weights.length_numerator / page_length as f64 + pubcount as f64 / weights.pubcount_divisor
}

/// The filtered gene set in three orders, each truncated to `top_n`
#[derive(Debug, Clone, Default)]
pub struct Rankings {
    /// Priority score, highest first
    pub by_score: Vec<GeneScore>,
    /// Article length, shortest first
    pub by_length: Vec<GeneScore>,
    /// Publication count, highest first
    pub by_pubcount: Vec<GeneScore>,
}

/// Shortest article per gene, in first-appearance order of genes
fn shortest_per_gene(articles: &[SizedArticle]) -> Vec<&SizedArticle> {
    let mut index: HashMap<&str, usize> = HashMap::new();
    let mut shortest: Vec<&SizedArticle> = Vec::new();

    for article in articles {
        match index.get(article.gene_id.as_str()) {
            Some(&i) => {
                if article.page_length < shortest[i].page_length {
                    shortest[i] = article;
                }
            }
            None => {
                index.insert(article.gene_id.as_str(), shortest.len());
                shortest.push(article);
            }
        }
    }

    shortest
}

fn ranked<F>(genes: &[GeneScore], top_n: usize, mut order: F) -> Vec<GeneScore>
where
    F: FnMut(&GeneScore, &GeneScore) -> Ordering,
{
    let mut sorted = genes.to_vec();
    sorted.sort_by(|a, b| order(a, b).then_with(|| a.gene_id.cmp(&b.gene_id)));
    sorted.truncate(top_n);
    sorted
}

/// Joins short articles with publication summaries, filters and ranks
///
/// # Steps
///
/// 1. Collapse articles to the shortest one per gene
/// 2. Inner join with the summaries on `gene_id`
/// 3. Keep `pubcount > min_pubcount` and `page_length > min_page_length`
/// 4. Score, then emit the three orderings (ties break on `gene_id`)
pub fn prioritize(
    articles: &[SizedArticle],
    summaries: &[PublicationSummary],
    thresholds: &ThresholdConfig,
) -> Rankings {
    let weights = ScoreWeights::from(thresholds);
    let summaries: HashMap<&str, &PublicationSummary> =
        summaries.iter().map(|s| (s.gene_id.as_str(), s)).collect();

    let genes: Vec<GeneScore> = shortest_per_gene(articles)
        .into_iter()
        .filter_map(|article| {
            let summary = summaries.get(article.gene_id.as_str())?;
            Some(GeneScore {
                gene_id: article.gene_id.clone(),
                title: article.title.clone(),
                page_length: article.page_length,
                pubcount: summary.pubcount,
                median_pub_year: summary.median_pub_year,
                max_pub_year: summary.max_pub_year,
                priority_score: priority_score(article.page_length, summary.pubcount, weights),
            })
        })
        .filter(|g| {
            g.pubcount > thresholds.min_pubcount && g.page_length > thresholds.min_page_length
        })
        .collect();

    tracing::info!("{} genes pass the publication and length filters", genes.len());

    let top_n = thresholds.top_n;
    Rankings {
        by_score: ranked(&genes, top_n, |a, b| {
            b.priority_score.total_cmp(&a.priority_score)
        }),
        by_length: ranked(&genes, top_n, |a, b| a.page_length.cmp(&b.page_length)),
        by_pubcount: ranked(&genes, top_n, |a, b| b.pubcount.cmp(&a.pubcount)),
    }
}
