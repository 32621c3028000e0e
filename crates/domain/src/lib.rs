//! # CheapAlarms Domain
//!
//! Business domain types and models for the CheapAlarms admin gateway.
//!
//! This crate contains:
//! - Domain data types (Estimate, Invoice, PortalUser, ...)
//! - Domain error types and Result definitions
//! - Configuration structures
//! - Domain constants (confirmation tokens, identifier rules)
//!
//! ## Architecture
//! - No dependencies on other CheapAlarms crates
//! - Only external dependencies allowed
//! - Pure domain models and data structures

pub mod config;
pub mod constants;
pub mod errors;
pub mod types;

// Re-export commonly used items
pub use config::*;
pub use errors::*;
pub use types::*;
