//! Mutation coordinator protocol
//!
//! One reusable protocol, instantiated once per write operation. Each run
//! walks Idle -> Pending (cancel in-flight refetches, snapshot, optimistic
//! apply) -> Settled-Success (invalidate affected keys) or Settled-Failure
//! (restore every snapshotted key verbatim) -> Idle.

mod coordinator;
mod guard;
mod outcome;

pub use coordinator::{MutationCoordinator, SettlementReport};
pub use guard::{GuardPermit, MutationGuard};
pub use outcome::MutationOutcome;
