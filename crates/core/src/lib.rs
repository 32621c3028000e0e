//! # CheapAlarms Core
//!
//! Pure business logic layer - no infrastructure dependencies.
//!
//! This crate contains:
//! - The query cache store (versioned key-value store of backend responses)
//! - The mutation coordinator protocol (optimistic apply, reconcile, rollback)
//! - Port/adapter interfaces (traits) for the backend systems
//! - The per-operation admin services
//!
//! ## Architecture Principles
//! - Only depends on `cheapalarms-domain`
//! - No HTTP or platform code
//! - All external dependencies via traits
//! - The cache handle is always passed explicitly, never looked up ambiently

pub mod admin;
pub mod cache;
pub mod mutation;

// Re-export specific items to avoid ambiguity
pub use admin::ports::{EstimatesPort, InvoicesPort, UsersPort};
pub use admin::{EstimateAdmin, InvoiceAdmin, UserAdmin};
pub use cache::{CacheSnapshot, Clock, FetchTicket, MockClock, QueryCache, QueryKey, SystemClock};
pub use mutation::{MutationCoordinator, MutationGuard, MutationOutcome};
