//! Portal user admin operations

use std::sync::Arc;

use cheapalarms_domain::constants::{CONFIRM_BULK_DELETE, CONFIRM_DELETE};
use cheapalarms_domain::{CheapAlarmsError, Result, Scope};

use super::ports::UsersPort;
use super::{remove_ids, remove_matching, require_confirmation, require_ids};
use crate::cache::QueryKey;
use crate::mutation::{MutationCoordinator, MutationGuard, MutationOutcome};

/// Bulk delete and delete-by-email over portal users.
pub struct UserAdmin {
    coordinator: Arc<MutationCoordinator>,
    port: Arc<dyn UsersPort>,
    bulk_delete_guard: MutationGuard,
    delete_by_email_guard: MutationGuard,
}

impl UserAdmin {
    pub fn new(coordinator: Arc<MutationCoordinator>, port: Arc<dyn UsersPort>) -> Self {
        Self {
            coordinator,
            port,
            bulk_delete_guard: MutationGuard::new(),
            delete_by_email_guard: MutationGuard::new(),
        }
    }

    /// Delete a set of users in the system(s) selected by `scope`.
    /// Requires the `BULK_DELETE` token.
    pub async fn bulk_delete(
        &self,
        ids: &[String],
        scope: Scope,
        confirm: &str,
    ) -> Result<MutationOutcome> {
        require_confirmation(confirm, CONFIRM_BULK_DELETE)?;
        require_ids(ids)?;
        let _permit = self.bulk_delete_guard.try_begin()?;

        let keys = [QueryKey::users()];
        let owned = ids.to_vec();
        let port = Arc::clone(&self.port);
        self.coordinator
            .run(
                "users.bulk_delete",
                &keys,
                move |_, value| remove_ids(value, &owned),
                async move { port.bulk_delete(ids, scope).await },
            )
            .await
    }

    /// Delete a user by email address. Requires the `DELETE` token.
    ///
    /// Success is judged by the canonical scope predicate over the nested
    /// per-system reports; an unsatisfied scope is a failure and rolls the
    /// users list back.
    pub async fn delete_by_email(
        &self,
        email: &str,
        scope: Scope,
        confirm: &str,
    ) -> Result<MutationOutcome> {
        require_confirmation(confirm, CONFIRM_DELETE)?;
        if !email.contains('@') {
            return Err(CheapAlarmsError::validation("a valid email address is required"));
        }
        let _permit = self.delete_by_email_guard.try_begin()?;

        let keys = [QueryKey::users()];
        let needle = vec![email.to_string()];
        let port = Arc::clone(&self.port);
        self.coordinator
            .run(
                "users.delete_by_email",
                &keys,
                move |_, value| remove_matching(value, "email", &needle),
                async move {
                    let report = port.delete_by_email(email, scope).await?;
                    if scope.is_satisfied(&report) {
                        Ok(())
                    } else {
                        Err(CheapAlarmsError::Remote {
                            status: 502,
                            message: describe_scope_failure(scope, &report),
                        })
                    }
                },
            )
            .await
    }
}

fn describe_scope_failure(scope: Scope, report: &cheapalarms_domain::ScopedReport) -> String {
    let mut failures = Vec::new();
    for (system, outcome) in [("local", &report.local), ("ghl", &report.ghl)] {
        match outcome {
            Some(r) if r.ok => {}
            Some(r) => failures.push(format!(
                "{system}: {}",
                r.message.as_deref().unwrap_or("delete failed")
            )),
            None => failures.push(format!("{system}: no result reported")),
        }
    }
    format!("scope \"{scope}\" not satisfied ({})", failures.join("; "))
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use async_trait::async_trait;
    use cheapalarms_domain::{BulkReport, ScopedReport, SystemReport};
    use serde_json::json;

    use super::*;
    use crate::cache::QueryCache;

    struct FakeUsers {
        report: ScopedReport,
    }

    #[async_trait]
    impl UsersPort for FakeUsers {
        async fn bulk_delete(&self, ids: &[String], _scope: Scope) -> Result<BulkReport> {
            Ok(BulkReport { succeeded: ids.len(), errors: vec![] })
        }

        async fn delete_by_email(&self, _email: &str, _scope: Scope) -> Result<ScopedReport> {
            Ok(self.report.clone())
        }
    }

    fn setup(report: ScopedReport) -> (UserAdmin, Arc<MutationCoordinator>) {
        let coordinator =
            Arc::new(MutationCoordinator::new(QueryCache::new(Duration::from_secs(60))));
        (UserAdmin::new(Arc::clone(&coordinator), Arc::new(FakeUsers { report })), coordinator)
    }

    #[tokio::test]
    async fn delete_by_email_scope_both_fails_when_ghl_fails() {
        let report = ScopedReport {
            local: Some(SystemReport { ok: true, message: None }),
            ghl: Some(SystemReport { ok: false, message: Some("contact not found".into()) }),
        };
        let (admin, coordinator) = setup(report);
        let key = QueryKey::users();
        let before = json!([{"id": "u1", "email": "a@x.com"}]);
        coordinator.cache().put(key.clone(), before.clone()).await;

        let err = admin.delete_by_email("a@x.com", Scope::Both, "DELETE").await.unwrap_err();

        match err {
            CheapAlarmsError::Remote { status, message } => {
                assert_eq!(status, 502);
                assert!(message.contains("ghl: contact not found"));
            }
            other => unreachable!("expected remote error, got {other:?}"),
        }
        assert_eq!(coordinator.cache().get(&key).await, Some(before));
    }

    #[tokio::test]
    async fn delete_by_email_scope_local_ignores_ghl_failure() {
        let report = ScopedReport {
            local: Some(SystemReport { ok: true, message: None }),
            ghl: Some(SystemReport { ok: false, message: None }),
        };
        let (admin, coordinator) = setup(report);
        let key = QueryKey::users();
        coordinator.cache().put(key.clone(), json!([{"email": "a@x.com"}])).await;

        let outcome = admin.delete_by_email("a@x.com", Scope::Local, "DELETE").await.unwrap();

        assert_eq!(outcome.succeeded(), 1);
        assert!(!coordinator.cache().is_fresh(&key).await);
    }

    #[tokio::test]
    async fn invalid_email_rejected_before_any_effect() {
        let (admin, coordinator) = setup(ScopedReport::default());
        let key = QueryKey::users();
        coordinator.cache().put(key.clone(), json!([1])).await;

        let err = admin.delete_by_email("not-an-email", Scope::Local, "DELETE").await.unwrap_err();

        assert!(matches!(err, CheapAlarmsError::Validation { .. }));
        assert!(coordinator.cache().is_fresh(&key).await);
    }
}
