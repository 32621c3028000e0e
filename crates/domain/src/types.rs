//! Core domain types
//!
//! Authoritative storage for these entities lives in the WordPress backend;
//! these are the shapes the gateway observes and caches.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::errors::ItemError;

/// Estimate lifecycle status as reported by the backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EstimateStatus {
    Draft,
    Sent,
    Accepted,
    Rejected,
    UnderReview,
    Expired,
}

/// Discount applied to an estimate total.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DiscountKind {
    Percentage,
    Fixed,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Discount {
    pub kind: DiscountKind,
    pub value: f64,
}

/// Single line item on an estimate.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LineItem {
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    pub amount: f64,
    pub quantity: u32,
}

/// Customer-facing estimate.
///
/// Soft deletion moves an estimate to the trash (`trashed = true`); it stays
/// restorable for the retention window before permanent deletion.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Estimate {
    pub id: String,
    pub status: EstimateStatus,
    pub contact_id: String,
    pub line_items: Vec<LineItem>,
    #[serde(default)]
    pub discount: Option<Discount>,
    pub currency: String,
    pub issue_date: NaiveDate,
    #[serde(default)]
    pub expiry_date: Option<NaiveDate>,
    #[serde(default)]
    pub trashed: bool,
}

/// Payment status of an invoice.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PaymentStatus {
    Unpaid,
    Paid,
    Refunded,
}

/// Sync state of an invoice against the Xero ledger.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum XeroSyncState {
    NotSynced,
    Synced,
    Failed,
}

/// Invoice created from an accepted estimate.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Invoice {
    pub id: String,
    pub estimate_id: String,
    pub amount: f64,
    pub payment_status: PaymentStatus,
    #[serde(default = "default_xero_state")]
    pub xero_state: XeroSyncState,
}

fn default_xero_state() -> XeroSyncState {
    XeroSyncState::NotSynced
}

/// Portal user; exists locally (WordPress) and may have a linked CRM contact.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PortalUser {
    pub id: String,
    pub email: String,
    pub display_name: String,
    pub portal_access: bool,
    #[serde(default)]
    pub roles: Vec<String>,
    #[serde(default)]
    pub ghl_contact_id: Option<String>,
}

/// Which backend system(s) a destructive operation targets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Scope {
    Local,
    Ghl,
    Both,
}

impl Scope {
    /// Canonical success predicate for a scoped operation.
    ///
    /// Success is defined relative to the requested scope: `local` and `ghl`
    /// consult only their own system's report; `both` requires both systems
    /// to be present and ok. A missing report counts as failure.
    pub fn is_satisfied(self, report: &ScopedReport) -> bool {
        let local_ok = report.local.as_ref().is_some_and(|r| r.ok);
        let ghl_ok = report.ghl.as_ref().is_some_and(|r| r.ok);
        match self {
            Self::Local => local_ok,
            Self::Ghl => ghl_ok,
            Self::Both => local_ok && ghl_ok,
        }
    }
}

impl std::fmt::Display for Scope {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Self::Local => "local",
            Self::Ghl => "ghl",
            Self::Both => "both",
        };
        f.write_str(s)
    }
}

/// Per-system outcome of a scoped delete.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SystemReport {
    pub ok: bool,
    #[serde(default)]
    pub message: Option<String>,
}

/// Nested per-system reports for a scoped operation.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScopedReport {
    #[serde(default)]
    pub local: Option<SystemReport>,
    #[serde(default)]
    pub ghl: Option<SystemReport>,
}

/// Normalised backend response for a bulk operation.
///
/// `errors` is non-empty on partial success; the succeeded count plus the
/// per-item errors are everything the backend tells us.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BulkReport {
    pub succeeded: usize,
    #[serde(default)]
    pub errors: Vec<ItemError>,
}

impl BulkReport {
    /// Whether every item succeeded.
    pub fn is_complete(&self) -> bool {
        self.errors.is_empty()
    }

    /// Number of items that failed.
    pub fn failed(&self) -> usize {
        self.errors.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn report(local: Option<bool>, ghl: Option<bool>) -> ScopedReport {
        ScopedReport {
            local: local.map(|ok| SystemReport { ok, message: None }),
            ghl: ghl.map(|ok| SystemReport { ok, message: None }),
        }
    }

    #[test]
    fn scope_local_ignores_ghl_outcome() {
        assert!(Scope::Local.is_satisfied(&report(Some(true), Some(false))));
        assert!(Scope::Local.is_satisfied(&report(Some(true), None)));
        assert!(!Scope::Local.is_satisfied(&report(Some(false), Some(true))));
    }

    #[test]
    fn scope_both_requires_both_reports() {
        assert!(Scope::Both.is_satisfied(&report(Some(true), Some(true))));
        assert!(!Scope::Both.is_satisfied(&report(Some(true), Some(false))));
        assert!(!Scope::Both.is_satisfied(&report(Some(true), None)));
        assert!(!Scope::Both.is_satisfied(&report(None, Some(true))));
    }

    #[test]
    fn scope_serialises_lowercase() {
        assert_eq!(serde_json::to_string(&Scope::Both).unwrap(), "\"both\"");
        let parsed: Scope = serde_json::from_str("\"ghl\"").unwrap();
        assert_eq!(parsed, Scope::Ghl);
    }

    #[test]
    fn bulk_report_partial_detection() {
        let full = BulkReport { succeeded: 3, errors: vec![] };
        assert!(full.is_complete());

        let partial = BulkReport {
            succeeded: 2,
            errors: vec![ItemError { id: "e3".into(), message: "not found".into() }],
        };
        assert!(!partial.is_complete());
        assert_eq!(partial.failed(), 1);
    }
}
