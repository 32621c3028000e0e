//! Invoice admin operations

use std::sync::Arc;

use cheapalarms_domain::constants::CONFIRM_BULK_DELETE;
use cheapalarms_domain::{Result, Scope};

use super::ports::InvoicesPort;
use super::{remove_ids, require_confirmation, require_ids};
use crate::cache::QueryKey;
use crate::mutation::{MutationCoordinator, MutationGuard, MutationOutcome};

/// Bulk delete over invoices.
pub struct InvoiceAdmin {
    coordinator: Arc<MutationCoordinator>,
    port: Arc<dyn InvoicesPort>,
    bulk_delete_guard: MutationGuard,
}

impl InvoiceAdmin {
    pub fn new(coordinator: Arc<MutationCoordinator>, port: Arc<dyn InvoicesPort>) -> Self {
        Self { coordinator, port, bulk_delete_guard: MutationGuard::new() }
    }

    /// Delete a set of invoices in the system(s) selected by `scope`.
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

        let keys = [QueryKey::invoices()];
        let owned = ids.to_vec();
        let port = Arc::clone(&self.port);
        self.coordinator
            .run(
                "invoices.bulk_delete",
                &keys,
                move |_, value| remove_ids(value, &owned),
                async move { port.bulk_delete(ids, scope).await },
            )
            .await
    }
}
