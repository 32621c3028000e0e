//! HTTP routes
//!
//! Proxy relays and the admin mutation endpoints, assembled into a single
//! router under `/api`.

pub mod estimates;
pub mod invoices;
pub mod proxy;
pub mod users;

use axum::Router;
use cheapalarms_core::MutationOutcome;
use cheapalarms_domain::ItemError;
use serde::Serialize;

use crate::context::AppContext;

/// JSON body for a settled admin mutation.
#[derive(Debug, Serialize)]
pub struct MutationResponse {
    pub ok: bool,
    pub succeeded: usize,
    pub failed: usize,
    pub errors: Vec<ItemError>,
    pub message: String,
}

impl MutationResponse {
    fn new(outcome: MutationOutcome, verb: &str, noun: &str) -> Self {
        Self {
            ok: outcome.failed() == 0,
            succeeded: outcome.succeeded(),
            failed: outcome.failed(),
            errors: outcome.errors().to_vec(),
            message: outcome.describe(verb, noun),
        }
    }
}

/// Build the full application router.
pub fn router(ctx: AppContext) -> Router {
    Router::new()
        .nest(
            "/api",
            Router::new()
                .merge(proxy::router())
                .merge(estimates::router())
                .merge(invoices::router())
                .merge(users::router()),
        )
        .with_state(ctx)
}
