use crate::quarantine::PassOutcome;
use crate::records::{AuthorRecord, FailureRecord, PmidFailure, PublicationRecord};

/// Running result set of a resumable stage
///
/// `results` only grows; the residual key list is replaced by each pass.
#[derive(Debug, Clone, Default)]
pub struct Accumulator<S> {
    pub results: S,
    pending: Vec<String>,
    last_failures: Vec<FailureRecord>,
    passes: u32,
}

impl<S: Default> Accumulator<S> {
    /// Fresh accumulator with every key still to be attempted
    pub fn pending(keys: Vec<String>) -> Self {
        Self::resume(S::default(), keys)
    }
}

impl<S> Accumulator<S> {
    /// Accumulator reloaded from disk: earlier results plus residual keys
    pub fn resume(results: S, residual_keys: Vec<String>) -> Self {
        Self {
            results,
            pending: residual_keys,
            last_failures: Vec::new(),
            passes: 0,
        }
    }

    /// Folds a pass into the running result set
    pub fn merge<T>(&mut self, pass: PassOutcome<T>)
    where
        S: Extend<T>,
    {
        self.results.extend(pass.successes);
        self.pending = pass.failures.iter().map(|f| f.item_key.clone()).collect();
        self.last_failures = pass.failures;
        self.passes += 1;
    }

    /// Keys the next pass should attempt
    pub fn residual_keys(&self) -> Vec<String> {
        self.pending.clone()
    }

    pub fn residual_count(&self) -> usize {
        self.pending.len()
    }

    /// Failure records of the most recent pass
    pub fn last_failures(&self) -> &[FailureRecord] {
        &self.last_failures
    }

    /// Passes merged since this accumulator was created
    pub fn passes(&self) -> u32 {
        self.passes
    }

    pub fn into_results(self) -> S {
        self.results
    }
}

/// Accumulated output of the literature stage
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LiteratureTables {
    pub publications: Vec<PublicationRecord>,
    pub authors: Vec<AuthorRecord>,
    pub pmid_failures: Vec<PmidFailure>,
}
