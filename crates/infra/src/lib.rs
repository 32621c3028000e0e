//! # CheapAlarms Infra
//!
//! Infrastructure layer: the retrying HTTP client, the JSON transport
//! wrapper, the WordPress and GoHighLevel backend clients implementing the
//! core ports, and the configuration loader.

pub mod backends;
pub mod config;
pub mod http;
pub mod transport;

pub use backends::{GhlClient, ScopedUserBackend, WordPressClient};
pub use http::HttpClient;
pub use transport::{derive_bearer, RequestOptions, Transport, TransportError};
