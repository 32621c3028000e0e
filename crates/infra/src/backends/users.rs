//! Scoped user backend
//!
//! Composes the WordPress and GoHighLevel clients behind the users port.
//! Bulk deletes are orchestrated by the WordPress backend in one call;
//! delete-by-email fans out to each system the scope selects and collects
//! the per-system reports for the caller to judge.

use async_trait::async_trait;
use cheapalarms_domain::{BulkReport, Result, Scope, ScopedReport};
use tracing::debug;

use cheapalarms_core::UsersPort;

use super::{GhlClient, WordPressClient};

/// Users port implementation spanning WordPress and the CRM.
#[derive(Clone)]
pub struct ScopedUserBackend {
    wp: WordPressClient,
    ghl: GhlClient,
}

impl ScopedUserBackend {
    pub fn new(wp: WordPressClient, ghl: GhlClient) -> Self {
        Self { wp, ghl }
    }
}

#[async_trait]
impl UsersPort for ScopedUserBackend {
    async fn bulk_delete(&self, ids: &[String], scope: Scope) -> Result<BulkReport> {
        self.wp.bulk_delete_users(ids, scope).await
    }

    async fn delete_by_email(&self, email: &str, scope: Scope) -> Result<ScopedReport> {
        let mut report = ScopedReport::default();

        if matches!(scope, Scope::Local | Scope::Both) {
            let local = self.wp.delete_user_by_email(email).await?;
            debug!(ok = local.ok, "local user delete");
            report.local = Some(local);
        }
        if matches!(scope, Scope::Ghl | Scope::Both) {
            let ghl = self.ghl.delete_contact_by_email(email).await?;
            debug!(ok = ghl.ok, "ghl contact delete");
            report.ghl = Some(ghl);
        }

        Ok(report)
    }
}
