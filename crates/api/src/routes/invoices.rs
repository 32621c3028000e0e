//! Admin invoice mutation endpoints

use axum::extract::State;
use axum::response::Json as ResponseJson;
use axum::routing::post;
use axum::{Json, Router};
use cheapalarms_domain::Scope;
use serde::Deserialize;

use crate::context::AppContext;
use crate::error::ApiError;
use crate::routes::MutationResponse;

#[derive(Debug, Deserialize)]
struct BulkDeleteRequest {
    ids: Vec<String>,
    scope: Scope,
    confirm: String,
}

pub fn router() -> Router<AppContext> {
    Router::new().route("/admin/invoices/bulk-delete", post(bulk_delete))
}

/// POST /api/admin/invoices/bulk-delete
async fn bulk_delete(
    State(ctx): State<AppContext>,
    Json(req): Json<BulkDeleteRequest>,
) -> Result<ResponseJson<MutationResponse>, ApiError> {
    let outcome = ctx.invoices.bulk_delete(&req.ids, req.scope, &req.confirm).await?;
    Ok(ResponseJson(MutationResponse::new(outcome, "Deleted", "invoice")))
}
