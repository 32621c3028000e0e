//! Backend clients
//!
//! Thin API clients over the JSON transport, implementing the core ports.
//! The WordPress backend is the source of truth; GoHighLevel holds the CRM
//! representation of contacts.

mod ghl;
mod users;
mod wordpress;

pub use ghl::GhlClient;
pub use users::ScopedUserBackend;
pub use wordpress::WordPressClient;
