//! Mutation coordinator
//!
//! Drives one write operation through the optimistic-update protocol against
//! an explicitly injected cache handle.

use std::future::Future;

use cheapalarms_domain::{BulkReport, ItemError, Result};
use serde_json::Value;
use tracing::{debug, info, warn};

use super::outcome::MutationOutcome;
use crate::cache::{Clock, QueryCache, QueryKey, SystemClock};

/// What a settled backend call reports back to the coordinator.
///
/// Partial success (some items succeeded, some failed) is a settlement, not
/// an error: the coordinator invalidates the whole key set either way and
/// surfaces the per-item errors for messaging.
pub trait SettlementReport {
    fn succeeded(&self) -> usize;
    fn into_errors(self) -> Vec<ItemError>;
}

impl SettlementReport for BulkReport {
    fn succeeded(&self) -> usize {
        self.succeeded
    }

    fn into_errors(self) -> Vec<ItemError> {
        self.errors
    }
}

/// Unit settlements (single restore, single delete) count as one success.
impl SettlementReport for () {
    fn succeeded(&self) -> usize {
        1
    }

    fn into_errors(self) -> Vec<ItemError> {
        Vec::new()
    }
}

/// Coordinates optimistic cache mutations for one cache handle.
pub struct MutationCoordinator<C = SystemClock>
where
    C: Clock + Clone,
{
    cache: QueryCache<C>,
}

impl<C> MutationCoordinator<C>
where
    C: Clock + Clone,
{
    pub fn new(cache: QueryCache<C>) -> Self {
        Self { cache }
    }

    /// The cache handle this coordinator writes through.
    pub fn cache(&self) -> &QueryCache<C> {
        &self.cache
    }

    /// Run one mutation invocation.
    ///
    /// Ordering is fixed: in-flight refetches for the affected keys are
    /// cancelled, the pre-mutation snapshot is taken, then the optimistic
    /// transform is applied (all under one cache write guard), and only then
    /// is the remote future awaited. On success the affected key set is
    /// invalidated as a whole; no per-item reconciliation is attempted. On
    /// failure every snapshotted key is restored verbatim, subject to the
    /// per-key version check, and the error propagates unchanged.
    pub async fn run<R, T, F>(
        &self,
        op: &'static str,
        keys: &[QueryKey],
        optimistic: T,
        remote: F,
    ) -> Result<MutationOutcome>
    where
        R: SettlementReport,
        T: Fn(&QueryKey, Option<Value>) -> Option<Value>,
        F: Future<Output = Result<R>>,
    {
        let staged = self.cache.stage(keys, optimistic).await;
        debug!(op, affected = keys.len(), "mutation pending");

        match remote.await {
            Ok(report) => {
                self.cache.commit(&staged).await;
                let succeeded = report.succeeded();
                let errors = report.into_errors();
                if errors.is_empty() {
                    info!(op, succeeded, "mutation settled");
                    Ok(MutationOutcome::AllSucceeded { succeeded })
                } else {
                    warn!(op, succeeded, failed = errors.len(), "mutation settled partially");
                    Ok(MutationOutcome::Partial { succeeded, errors })
                }
            }
            Err(err) => {
                let restored = self.cache.rollback(&staged).await;
                warn!(op, error = %err, restored, "mutation failed, rolled back");
                Err(err)
            }
        }
    }
}
