//! Admin operations
//!
//! One service per entity, each method a mutation-coordinator instance with
//! confirmation-token validation up front. Validation failures happen before
//! any cache or network effect.

pub mod ports;

mod estimates;
mod invoices;
mod users;

pub use estimates::EstimateAdmin;
pub use invoices::InvoiceAdmin;
pub use users::UserAdmin;

use cheapalarms_domain::{CheapAlarmsError, Result};
use serde_json::Value;

/// Reject the operation unless the literal confirmation token was supplied.
fn require_confirmation(given: &str, expected: &'static str) -> Result<()> {
    if given == expected {
        Ok(())
    } else {
        Err(CheapAlarmsError::validation(format!(
            "confirmation token mismatch, expected \"{expected}\""
        )))
    }
}

/// Reject the operation when no ids were supplied.
fn require_ids(ids: &[String]) -> Result<()> {
    if ids.is_empty() {
        Err(CheapAlarmsError::validation("at least one id is required"))
    } else {
        Ok(())
    }
}

/// Optimistically drop items whose `id` field matches one of `ids` from a
/// cached JSON list. Non-array values are left unchanged.
fn remove_ids(value: Option<Value>, ids: &[String]) -> Option<Value> {
    remove_matching(value, "id", ids)
}

/// Drop items whose `field` matches one of `needles` from a cached JSON list.
fn remove_matching(value: Option<Value>, field: &str, needles: &[String]) -> Option<Value> {
    value.map(|v| match v {
        Value::Array(items) => Value::Array(
            items
                .into_iter()
                .filter(|item| {
                    item.get(field)
                        .and_then(Value::as_str)
                        .map_or(true, |found| !needles.iter().any(|n| n == found))
                })
                .collect(),
        ),
        other => other,
    })
}
