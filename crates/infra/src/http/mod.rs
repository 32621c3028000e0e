//! HTTP client plumbing

mod client;

pub use client::{HttpClient, HttpClientBuilder};
