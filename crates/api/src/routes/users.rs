//! Admin portal-user mutation endpoints

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

#[derive(Debug, Deserialize)]
struct DeleteByEmailRequest {
    email: String,
    scope: Scope,
    confirm: String,
}

pub fn router() -> Router<AppContext> {
    Router::new()
        .route("/admin/users/bulk-delete", post(bulk_delete))
        .route("/admin/users/delete-by-email", post(delete_by_email))
}

/// POST /api/admin/users/bulk-delete
async fn bulk_delete(
    State(ctx): State<AppContext>,
    Json(req): Json<BulkDeleteRequest>,
) -> Result<ResponseJson<MutationResponse>, ApiError> {
    let outcome = ctx.users.bulk_delete(&req.ids, req.scope, &req.confirm).await?;
    Ok(ResponseJson(MutationResponse::new(outcome, "Deleted", "user")))
}

/// POST /api/admin/users/delete-by-email
async fn delete_by_email(
    State(ctx): State<AppContext>,
    Json(req): Json<DeleteByEmailRequest>,
) -> Result<ResponseJson<MutationResponse>, ApiError> {
    let outcome = ctx.users.delete_by_email(&req.email, req.scope, &req.confirm).await?;
    Ok(ResponseJson(MutationResponse::new(outcome, "Deleted", "user")))
}
