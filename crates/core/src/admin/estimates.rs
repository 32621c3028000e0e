//! Estimate admin operations

use std::sync::Arc;

use cheapalarms_domain::constants::{
    CONFIRM_BULK_DELETE, CONFIRM_BULK_RESTORE, CONFIRM_EMPTY_TRASH,
};
use cheapalarms_domain::{CheapAlarmsError, Result};
use serde_json::Value;

use super::ports::EstimatesPort;
use super::{remove_ids, require_confirmation, require_ids};
use crate::cache::QueryKey;
use crate::mutation::{MutationCoordinator, MutationGuard, MutationOutcome};

/// Bulk delete/restore, single restore, and empty-trash over estimates.
pub struct EstimateAdmin {
    coordinator: Arc<MutationCoordinator>,
    port: Arc<dyn EstimatesPort>,
    bulk_delete_guard: MutationGuard,
    bulk_restore_guard: MutationGuard,
    restore_guard: MutationGuard,
    empty_trash_guard: MutationGuard,
}

impl EstimateAdmin {
    pub fn new(coordinator: Arc<MutationCoordinator>, port: Arc<dyn EstimatesPort>) -> Self {
        Self {
            coordinator,
            port,
            bulk_delete_guard: MutationGuard::new(),
            bulk_restore_guard: MutationGuard::new(),
            restore_guard: MutationGuard::new(),
            empty_trash_guard: MutationGuard::new(),
        }
    }

    /// Soft-delete a set of estimates. Requires the `BULK_DELETE` token.
    ///
    /// The active list optimistically drops all ids immediately; both list
    /// views are invalidated on settlement so a refetch produces ground
    /// truth, including items the backend refused to trash.
    pub async fn bulk_delete(&self, ids: &[String], confirm: &str) -> Result<MutationOutcome> {
        require_confirmation(confirm, CONFIRM_BULK_DELETE)?;
        require_ids(ids)?;
        let _permit = self.bulk_delete_guard.try_begin()?;

        let keys = [QueryKey::estimates_active(), QueryKey::estimates_trash()];
        let owned = ids.to_vec();
        let port = Arc::clone(&self.port);
        self.coordinator
            .run(
                "estimates.bulk_delete",
                &keys,
                move |key, value| match key.param("view") {
                    Some("active") => remove_ids(value, &owned),
                    _ => value,
                },
                async move { port.bulk_trash(ids).await },
            )
            .await
    }

    /// Restore a set of trashed estimates. Requires the `BULK_RESTORE` token.
    pub async fn bulk_restore(&self, ids: &[String], confirm: &str) -> Result<MutationOutcome> {
        require_confirmation(confirm, CONFIRM_BULK_RESTORE)?;
        require_ids(ids)?;
        let _permit = self.bulk_restore_guard.try_begin()?;

        let keys = [QueryKey::estimates_trash(), QueryKey::estimates_active()];
        let owned = ids.to_vec();
        let port = Arc::clone(&self.port);
        self.coordinator
            .run(
                "estimates.bulk_restore",
                &keys,
                move |key, value| match key.param("view") {
                    Some("trash") => remove_ids(value, &owned),
                    _ => value,
                },
                async move { port.bulk_restore(ids).await },
            )
            .await
    }

    /// Restore a single estimate from the trash.
    ///
    /// Optimistic removal from the trash list happens immediately; a network
    /// failure rolls the trash list back exactly as it was.
    pub async fn restore(&self, id: &str) -> Result<MutationOutcome> {
        if id.is_empty() {
            return Err(CheapAlarmsError::validation("estimate id is required"));
        }
        let _permit = self.restore_guard.try_begin()?;

        let keys = [QueryKey::estimates_trash(), QueryKey::estimates_active()];
        let owned = vec![id.to_string()];
        let port = Arc::clone(&self.port);
        self.coordinator
            .run(
                "estimates.restore",
                &keys,
                move |key, value| match key.param("view") {
                    Some("trash") => remove_ids(value, &owned),
                    _ => value,
                },
                async move { port.restore(id).await },
            )
            .await
    }

    /// Permanently delete everything in the trash. Requires `EMPTY_TRASH`.
    pub async fn empty_trash(&self, confirm: &str) -> Result<MutationOutcome> {
        require_confirmation(confirm, CONFIRM_EMPTY_TRASH)?;
        let _permit = self.empty_trash_guard.try_begin()?;

        let keys = [QueryKey::estimates_trash()];
        let port = Arc::clone(&self.port);
        self.coordinator
            .run(
                "estimates.empty_trash",
                &keys,
                |_, value| value.map(|_| Value::Array(Vec::new())),
                async move { port.empty_trash().await },
            )
            .await
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    use async_trait::async_trait;
    use cheapalarms_domain::{BulkReport, ItemError};
    use serde_json::json;

    use super::*;
    use crate::cache::QueryCache;

    /// Port fake with scripted responses and call counting.
    struct FakeEstimates {
        trash_calls: AtomicUsize,
        response: std::sync::Mutex<Option<Result<BulkReport>>>,
        restore_response: std::sync::Mutex<Option<Result<()>>>,
    }

    impl FakeEstimates {
        fn new() -> Arc<Self> {
            Arc::new(Self {
                trash_calls: AtomicUsize::new(0),
                response: std::sync::Mutex::new(None),
                restore_response: std::sync::Mutex::new(None),
            })
        }

        fn respond(&self, response: Result<BulkReport>) {
            *self.response.lock().unwrap() = Some(response);
        }

        fn respond_restore(&self, response: Result<()>) {
            *self.restore_response.lock().unwrap() = Some(response);
        }
    }

    #[async_trait]
    impl EstimatesPort for FakeEstimates {
        async fn bulk_trash(&self, _ids: &[String]) -> Result<BulkReport> {
            self.trash_calls.fetch_add(1, Ordering::SeqCst);
            self.response.lock().unwrap().take().unwrap()
        }

        async fn bulk_restore(&self, _ids: &[String]) -> Result<BulkReport> {
            self.response.lock().unwrap().take().unwrap()
        }

        async fn restore(&self, _id: &str) -> Result<()> {
            self.restore_response.lock().unwrap().take().unwrap()
        }

        async fn empty_trash(&self) -> Result<BulkReport> {
            self.response.lock().unwrap().take().unwrap()
        }
    }

    fn setup(port: Arc<FakeEstimates>) -> (EstimateAdmin, Arc<MutationCoordinator>) {
        let coordinator =
            Arc::new(MutationCoordinator::new(QueryCache::new(Duration::from_secs(60))));
        (EstimateAdmin::new(Arc::clone(&coordinator), port), coordinator)
    }

    fn ids(values: &[&str]) -> Vec<String> {
        values.iter().map(|s| s.to_string()).collect()
    }

    #[tokio::test]
    async fn bulk_delete_drops_ids_and_reports_partial() {
        let port = FakeEstimates::new();
        port.respond(Ok(BulkReport {
            succeeded: 2,
            errors: vec![ItemError { id: "e3".into(), message: "not found".into() }],
        }));
        let (admin, coordinator) = setup(Arc::clone(&port));
        let active = QueryKey::estimates_active();
        coordinator
            .cache()
            .put(active.clone(), json!([{"id": "e1"}, {"id": "e2"}, {"id": "e3"}]))
            .await;

        let outcome =
            admin.bulk_delete(&ids(&["e1", "e2", "e3"]), CONFIRM_BULK_DELETE).await.unwrap();

        assert_eq!(outcome.describe("Deleted", "estimate"), "Deleted 2 estimates — 1 failed.");
        assert!(!coordinator.cache().is_fresh(&active).await);
        assert_eq!(port.trash_calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn bad_confirmation_makes_no_cache_or_port_effect() {
        let port = FakeEstimates::new();
        let (admin, coordinator) = setup(Arc::clone(&port));
        let active = QueryKey::estimates_active();
        coordinator.cache().put(active.clone(), json!([{"id": "e1"}])).await;

        let err = admin.bulk_delete(&ids(&["e1"]), "DELETE").await.unwrap_err();

        assert!(matches!(err, CheapAlarmsError::Validation { .. }));
        assert_eq!(coordinator.cache().get(&active).await, Some(json!([{"id": "e1"}])));
        assert!(coordinator.cache().is_fresh(&active).await);
        assert_eq!(port.trash_calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn empty_id_set_is_rejected() {
        let port = FakeEstimates::new();
        let (admin, _) = setup(port);
        let err = admin.bulk_delete(&[], CONFIRM_BULK_DELETE).await.unwrap_err();
        assert!(matches!(err, CheapAlarmsError::Validation { .. }));
    }

    #[tokio::test]
    async fn restore_offline_rolls_trash_list_back() {
        let port = FakeEstimates::new();
        port.respond_restore(Err(CheapAlarmsError::Network {
            message: "connection refused".into(),
        }));
        let (admin, coordinator) = setup(port);
        let trash = QueryKey::estimates_trash();
        let before = json!([{"id": "est_1", "trashed": true}, {"id": "est_2", "trashed": true}]);
        coordinator.cache().put(trash.clone(), before.clone()).await;

        let err = admin.restore("est_1").await.unwrap_err();

        assert!(matches!(err, CheapAlarmsError::Network { .. }));
        assert_eq!(coordinator.cache().get(&trash).await, Some(before));
    }

    #[tokio::test]
    async fn empty_trash_optimistically_clears_list() {
        let port = FakeEstimates::new();
        port.respond(Ok(BulkReport { succeeded: 4, errors: vec![] }));
        let (admin, coordinator) = setup(port);
        let trash = QueryKey::estimates_trash();
        coordinator.cache().put(trash.clone(), json!([{"id": "a"}, {"id": "b"}])).await;

        let outcome = admin.empty_trash(CONFIRM_EMPTY_TRASH).await.unwrap();

        assert_eq!(outcome.succeeded(), 4);
        assert!(!coordinator.cache().is_fresh(&trash).await);
    }
}
