//! Admin estimate mutation endpoints

use axum::extract::{Path, State};
use axum::response::Json as ResponseJson;
use axum::routing::post;
use axum::{Json, Router};
use serde::Deserialize;

use crate::context::AppContext;
use crate::error::ApiError;
use crate::routes::MutationResponse;

#[derive(Debug, Deserialize)]
struct BulkRequest {
    ids: Vec<String>,
    confirm: String,
}

#[derive(Debug, Deserialize)]
struct ConfirmRequest {
    confirm: String,
}

pub fn router() -> Router<AppContext> {
    Router::new()
        .route("/admin/estimates/bulk-delete", post(bulk_delete))
        .route("/admin/estimates/bulk-restore", post(bulk_restore))
        .route("/admin/estimates/{estimate_id}/restore", post(restore))
        .route("/admin/estimates/trash/empty", post(empty_trash))
}

/// POST /api/admin/estimates/bulk-delete
async fn bulk_delete(
    State(ctx): State<AppContext>,
    Json(req): Json<BulkRequest>,
) -> Result<ResponseJson<MutationResponse>, ApiError> {
    let outcome = ctx.estimates.bulk_delete(&req.ids, &req.confirm).await?;
    Ok(ResponseJson(MutationResponse::new(outcome, "Deleted", "estimate")))
}

/// POST /api/admin/estimates/bulk-restore
async fn bulk_restore(
    State(ctx): State<AppContext>,
    Json(req): Json<BulkRequest>,
) -> Result<ResponseJson<MutationResponse>, ApiError> {
    let outcome = ctx.estimates.bulk_restore(&req.ids, &req.confirm).await?;
    Ok(ResponseJson(MutationResponse::new(outcome, "Restored", "estimate")))
}

/// POST /api/admin/estimates/{estimate_id}/restore
async fn restore(
    State(ctx): State<AppContext>,
    Path(estimate_id): Path<String>,
) -> Result<ResponseJson<MutationResponse>, ApiError> {
    let outcome = ctx.estimates.restore(&estimate_id).await?;
    Ok(ResponseJson(MutationResponse::new(outcome, "Restored", "estimate")))
}

/// POST /api/admin/estimates/trash/empty
async fn empty_trash(
    State(ctx): State<AppContext>,
    Json(req): Json<ConfirmRequest>,
) -> Result<ResponseJson<MutationResponse>, ApiError> {
    let outcome = ctx.estimates.empty_trash(&req.confirm).await?;
    Ok(ResponseJson(MutationResponse::new(outcome, "Deleted", "estimate")))
}
