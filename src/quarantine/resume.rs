use crate::config::{FetchConfig, ResumeConfig};
use crate::quarantine::{run_pass, Accumulator, PassSummary};
use crate::state::Stage;
use crate::FetchResult;
use std::future::Future;

/// When to stop re-running residual failures
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResumePolicy {
    /// Settled once fewer residual failures than this remain
    pub residual_threshold: usize,
    /// Hard cap on passes per accumulator
    pub max_passes: u32,
    pub concurrency: usize,
}

impl ResumePolicy {
    pub fn from_config(resume: &ResumeConfig, fetch: &FetchConfig) -> Self {
        Self {
            residual_threshold: resume.residual_threshold,
            max_passes: resume.max_passes,
            concurrency: fetch.concurrency,
        }
    }

    /// True when no further pass should run
    ///
    /// A fresh accumulator always gets at least one pass if it has keys.
    pub fn is_settled<S>(&self, acc: &Accumulator<S>) -> bool {
        if acc.residual_count() == 0 {
            return true;
        }
        if acc.passes() == 0 {
            return false;
        }
        acc.residual_count() < self.residual_threshold || acc.passes() >= self.max_passes
    }
}

/// Runs passes over the residual keys until the policy is satisfied
///
/// `on_pass` is called after every merged pass so the caller can persist the
/// accumulator and record the pass.
///
/// # Returns
///
/// The number of passes run by this call.
pub async fn resume_until_settled<S, T, F, Fut, P>(
    stage: Stage,
    acc: &mut Accumulator<S>,
    policy: ResumePolicy,
    mut fetch_one: F,
    mut on_pass: P,
) -> crate::Result<u32>
where
    S: Extend<T>,
    F: FnMut(String) -> Fut,
    Fut: Future<Output = FetchResult<T>>,
    P: FnMut(&Accumulator<S>, &PassSummary) -> crate::Result<()>,
{
    let mut run = 0;

    while !policy.is_settled(acc) {
        let keys = acc.residual_keys();
        tracing::info!(
            "[{}] pass {}: attempting {} items",
            stage,
            acc.passes() + 1,
            keys.len()
        );

        let outcome = run_pass(stage, &keys, policy.concurrency, &mut fetch_one).await;
        let summary = PassSummary {
            stage,
            pass_number: acc.passes() + 1,
            attempted: outcome.attempted(),
            succeeded: outcome.successes.len(),
            failed: outcome.failures.len(),
        };

        acc.merge(outcome);
        on_pass(acc, &summary)?;
        run += 1;
    }

    if acc.residual_count() > 0 {
        let permanent = acc.last_failures().iter().filter(|f| !f.retryable).count();
        tracing::warn!(
            "[{}] settled with {} residual failures ({} permanent) after {} passes",
            stage,
            acc.residual_count(),
            permanent,
            acc.passes()
        );
    }

    Ok(run)
}
