//! Query cache
//!
//! A shared, versioned key-value store of backend query results. Every write
//! goes through the mutation coordinator's snapshot / optimistic-apply /
//! reconcile-or-rollback sequence; the store itself only provides the
//! primitives (staging, commit, rollback, in-flight cancellation).

mod clock;
mod key;
mod store;

pub use clock::{Clock, MockClock, SystemClock};
pub use key::QueryKey;
pub use store::{CacheSnapshot, FetchTicket, QueryCache, StagedMutation};
