//! # CheapAlarms API
//!
//! The axum HTTP service: proxy routes with method allow-lists and path
//! validation, admin mutation endpoints, and the application context.
//!
//! ## Architecture
//! - Depends on `domain`, `core`, and `infra`
//! - Wires up the ports-and-adapters layering
//! - The cache handle and backend clients are injected through
//!   [`AppContext`], never looked up ambiently

pub mod context;
pub mod error;
pub mod routes;

pub use context::AppContext;
pub use error::ApiError;
pub use routes::router;
