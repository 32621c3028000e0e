//! Backend port interfaces for the admin operations
//!
//! Implemented by the infra crate against the WordPress and GHL APIs; tests
//! substitute in-memory fakes.

use async_trait::async_trait;
use cheapalarms_domain::{BulkReport, Result, Scope, ScopedReport};

/// Estimate write operations on the backend.
#[async_trait]
pub trait EstimatesPort: Send + Sync {
    /// Soft-delete a set of estimates (move to trash).
    async fn bulk_trash(&self, ids: &[String]) -> Result<BulkReport>;

    /// Restore a set of trashed estimates.
    async fn bulk_restore(&self, ids: &[String]) -> Result<BulkReport>;

    /// Restore a single trashed estimate.
    async fn restore(&self, id: &str) -> Result<()>;

    /// Permanently delete everything in the trash.
    async fn empty_trash(&self) -> Result<BulkReport>;
}

/// Invoice write operations on the backend.
#[async_trait]
pub trait InvoicesPort: Send + Sync {
    /// Delete invoices in the system(s) selected by `scope`.
    async fn bulk_delete(&self, ids: &[String], scope: Scope) -> Result<BulkReport>;
}

/// Portal user / CRM contact write operations.
#[async_trait]
pub trait UsersPort: Send + Sync {
    /// Delete users in the system(s) selected by `scope`.
    async fn bulk_delete(&self, ids: &[String], scope: Scope) -> Result<BulkReport>;

    /// Delete a user by email address, returning per-system outcomes.
    async fn delete_by_email(&self, email: &str, scope: Scope) -> Result<ScopedReport>;
}
