use crate::records::FailureRecord;
use crate::state::Stage;
use crate::FetchResult;
use futures::stream::{self, StreamExt};
use std::future::Future;

/// Successes and quarantined failures of one pass
#[derive(Debug, Clone)]
pub struct PassOutcome<T> {
    pub stage: Stage,
    pub successes: Vec<T>,
    /// In input order
    pub failures: Vec<FailureRecord>,
}

impl<T> PassOutcome<T> {
    pub fn attempted(&self) -> usize {
        self.successes.len() + self.failures.len()
    }

    pub fn failed_keys(&self) -> Vec<String> {
        self.failures.iter().map(|f| f.item_key.clone()).collect()
    }
}

/// Counts recorded in the run ledger for one pass
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PassSummary {
    pub stage: Stage,
    /// 1-based within the current run
    pub pass_number: u32,
    pub attempted: usize,
    pub succeeded: usize,
    pub failed: usize,
}

/// Attempts every key once and quarantines the ones that fail
///
/// A failure never prevents later keys from being attempted, and
/// `successes.len() + failures.len() == keys.len()`.
///
/// # Arguments
///
/// * `stage` - Stage the failures are attributed to
/// * `keys` - Item keys, attempted in order
/// * `concurrency` - Items in flight; 1 runs strictly sequentially
/// * `fetch_one` - Fetches one item
///
/// With `concurrency > 1` results are still reported in input order; request
/// pacing is the fetch function's concern.
pub async fn run_pass<T, F, Fut>(
    stage: Stage,
    keys: &[String],
    concurrency: usize,
    mut fetch_one: F,
) -> PassOutcome<T>
where
    F: FnMut(String) -> Fut,
    Fut: Future<Output = FetchResult<T>>,
{
    let results: Vec<(String, FetchResult<T>)> = stream::iter(keys.iter().cloned())
        .map(|key| {
            let fetch = fetch_one(key.clone());
            async move { (key, fetch.await) }
        })
        .buffered(concurrency.max(1))
        .collect()
        .await;

    let mut successes = Vec::with_capacity(results.len());
    let mut failures = Vec::new();

    for (key, result) in results {
        match result {
            Ok(value) => successes.push(value),
            Err(e) => {
                let retryable = e.is_retryable();
                tracing::warn!(
                    "[{}] quarantined {} ({}): {}",
                    stage,
                    key,
                    if retryable { "transient" } else { "permanent" },
                    e
                );
                failures.push(FailureRecord {
                    item_key: key,
                    stage,
                    reason: e.to_string(),
                    retryable,
                });
            }
        }
    }

    tracing::info!(
        "[{}] pass complete: {} succeeded, {} quarantined",
        stage,
        successes.len(),
        failures.len()
    );

    PassOutcome {
        stage,
        successes,
        failures,
    }
}
