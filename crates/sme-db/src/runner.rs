//! Last-request-wins database validation
//!
//! Every [`ValidationRunner::submit`] supersedes the previous request: the
//! in-flight task is aborted and only a result whose generation is still the
//! latest is ever published.

use crate::error::{DbError, DbResult};
use crate::targets::TargetSet;
use crate::validator::{DatabaseReport, DatabaseValidator};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};
use tokio::sync::watch;
use tokio::task::JoinHandle;

/// A published database report and the request that produced it
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunResult {
    pub generation: u64,
    pub report: DatabaseReport,
}

/// Runs database validation off the editing path, keeping only the newest
/// result
pub struct ValidationRunner {
    validator: DatabaseValidator,
    generation: Arc<AtomicU64>,
    results: Arc<watch::Sender<Option<RunResult>>>,
    in_flight: Mutex<Option<JoinHandle<()>>>,
}

impl ValidationRunner {
    pub fn new(validator: DatabaseValidator) -> Self {
        let (results, _) = watch::channel(None);
        Self {
            validator,
            generation: Arc::new(AtomicU64::new(0)),
            results: Arc::new(results),
            in_flight: Mutex::new(None),
        }
    }

    /// Start validating `targets`, superseding any earlier request
    ///
    /// Returns the new request's generation. Must be called from within a
    /// Tokio runtime.
    pub fn submit(&self, targets: TargetSet) -> DbResult<u64> {
        // Generation order must match abort order, so bump under the lock
        let mut in_flight = self
            .in_flight
            .lock()
            .map_err(|e| DbError::MutexPoisoned(e.to_string()))?;
        let generation = self.generation.fetch_add(1, Ordering::SeqCst) + 1;
        if let Some(previous) = in_flight.take() {
            if !previous.is_finished() {
                log::debug!("Superseding database validation before generation {}", generation);
            }
            previous.abort();
        }

        let validator = self.validator.clone();
        let latest = Arc::clone(&self.generation);
        let results = Arc::clone(&self.results);
        *in_flight = Some(tokio::spawn(async move {
            let report = validator.validate(&targets).await;
            let published = results.send_if_modified(|slot| {
                if latest.load(Ordering::SeqCst) != generation {
                    return false;
                }
                *slot = Some(RunResult { generation, report });
                true
            });
            if !published {
                log::debug!("Dropping stale database report for generation {}", generation);
            }
        }));

        Ok(generation)
    }

    /// Receiver that sees each published result
    pub fn subscribe(&self) -> watch::Receiver<Option<RunResult>> {
        self.results.subscribe()
    }

    /// Generation of the most recent submit, 0 before any
    pub fn latest_generation(&self) -> u64 {
        self.generation.load(Ordering::SeqCst)
    }

    /// Whether `generation` is still the newest request
    pub fn is_current(&self, generation: u64) -> bool {
        self.latest_generation() == generation
    }

    /// The last published result, if any
    pub fn latest(&self) -> Option<RunResult> {
        self.results.borrow().clone()
    }

    /// Wait until the result of the newest request is published
    pub async fn wait_latest(&self) -> DbResult<RunResult> {
        let mut rx = self.subscribe();
        let generation = Arc::clone(&self.generation);
        let result = rx
            .wait_for(|slot| {
                slot.as_ref()
                    .map_or(false, |r| r.generation == generation.load(Ordering::SeqCst))
            })
            .await
            .map_err(|e| DbError::Internal(e.to_string()))?;
        (*result)
            .clone()
            .ok_or_else(|| DbError::Internal("validation result slot is empty".to_string()))
    }
}

impl Drop for ValidationRunner {
    fn drop(&mut self) {
        if let Ok(mut in_flight) = self.in_flight.lock() {
            if let Some(handle) = in_flight.take() {
                handle.abort();
            }
        }
    }
}

#[cfg(test)]
#[path = "runner_test.rs"]
mod tests;
