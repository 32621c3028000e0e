//! Proxy relays to the WordPress backend
//!
//! Every route carries a static method allow-list checked before anything
//! else; a disallowed method gets a 405 with an `Allow` header. Path
//! segments taken from the request are validated against the safe-id
//! pattern and fail closed before any outbound call. The client's `Cookie`
//! header is forwarded and the bearer token derived from it; the backend's
//! status and JSON body are relayed unchanged.

use axum::extract::{Path, State};
use axum::http::{header, HeaderMap, HeaderValue, Method, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::any;
use axum::{Json, Router};
use cheapalarms_core::QueryKey;
use cheapalarms_domain::constants::SAFE_ID_PATTERN;
use cheapalarms_domain::CheapAlarmsError;
use cheapalarms_infra::TransportError;
use once_cell::sync::Lazy;
use regex::Regex;
use serde_json::{json, Value};
use tracing::debug;

use crate::context::AppContext;
use crate::error::ApiError;

static SAFE_SEGMENT: Lazy<Option<Regex>> = Lazy::new(|| Regex::new(SAFE_ID_PATTERN).ok());

pub fn router() -> Router<AppContext> {
    Router::new()
        .route("/portal/estimate/{estimate_id}", any(portal_estimate))
        .route("/admin/estimates", any(admin_estimates))
        .route("/admin/estimates/trash", any(admin_estimates_trash))
        .route("/admin/invoices", any(admin_invoices))
        .route("/admin/users", any(admin_users))
        .route("/admin/users/{user_id}/delete", any(admin_user_delete))
}

/// Reject request-derived path segments that are not plainly an identifier.
/// A missing pattern rejects everything rather than letting anything through.
fn require_safe_segment(segment: &str) -> Result<(), ApiError> {
    let safe = SAFE_SEGMENT.as_ref().is_some_and(|re| re.is_match(segment));
    if safe {
        Ok(())
    } else {
        Err(ApiError(CheapAlarmsError::validation("invalid path segment")))
    }
}

fn require_method(method: &Method, allowed: &[Method]) -> Result<(), Response> {
    if allowed.contains(method) {
        return Ok(());
    }
    let allow = allowed.iter().map(Method::as_str).collect::<Vec<_>>().join(", ");
    let mut response = StatusCode::METHOD_NOT_ALLOWED.into_response();
    if let Ok(value) = HeaderValue::from_str(&allow) {
        response.headers_mut().insert(header::ALLOW, value);
    }
    Err(response)
}

fn cookie_header(headers: &HeaderMap) -> Option<&str> {
    headers.get(header::COOKIE).and_then(|v| v.to_str().ok())
}

fn relayed(status: u16, body: Value) -> Response {
    let status = StatusCode::from_u16(status).unwrap_or(StatusCode::BAD_GATEWAY);
    (status, Json(body)).into_response()
}

fn relay_failure(err: TransportError) -> Response {
    match err {
        // The client gets a generic message, not transport internals.
        TransportError::Network { message } => {
            debug!(%message, "backend unreachable");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({"ok": false, "message": "backend request failed"})),
            )
                .into_response()
        }
        // A 2xx with an unreadable body is an upstream fault, not a success.
        TransportError::Decode { status, message } => {
            debug!(status, %message, "backend body was not JSON");
            (
                StatusCode::BAD_GATEWAY,
                Json(json!({"ok": false, "message": "backend returned an unreadable response"})),
            )
                .into_response()
        }
        err => ApiError(err.into()).into_response(),
    }
}

async fn portal_estimate(
    State(ctx): State<AppContext>,
    Path(estimate_id): Path<String>,
    method: Method,
    headers: HeaderMap,
) -> Response {
    if let Err(response) = require_method(&method, &[Method::GET]) {
        return response;
    }
    if let Err(err) = require_safe_segment(&estimate_id) {
        return err.into_response();
    }

    let path = format!("/portal/estimate/{estimate_id}");
    match ctx.wordpress.relay(Method::GET, &path, None, cookie_header(&headers)).await {
        Ok((status, body)) => relayed(status, body),
        Err(err) => relay_failure(err),
    }
}

/// Relay an admin list with the caller's credentials, keeping the cache
/// entry updated for the mutation coordinator. Every request reaches the
/// backend so its authentication decision is always consulted; a relay that
/// lands after a mutation cancelled it is discarded by the fetch generation
/// guard and the cached value is never served in its place.
async fn list_relay(ctx: &AppContext, key: QueryKey, path: &str, headers: &HeaderMap) -> Response {
    let ticket = ctx.cache.begin_fetch(&key).await;
    match ctx.wordpress.relay(Method::GET, path, None, cookie_header(headers)).await {
        Ok((status, body)) => {
            if (200..300).contains(&status) {
                ctx.cache.complete_fetch(ticket, body.clone()).await;
            }
            relayed(status, body)
        }
        Err(err) => relay_failure(err),
    }
}

async fn admin_estimates(
    State(ctx): State<AppContext>,
    method: Method,
    headers: HeaderMap,
) -> Response {
    if let Err(response) = require_method(&method, &[Method::GET]) {
        return response;
    }
    list_relay(&ctx, QueryKey::estimates_active(), "/estimates", &headers).await
}

async fn admin_estimates_trash(
    State(ctx): State<AppContext>,
    method: Method,
    headers: HeaderMap,
) -> Response {
    if let Err(response) = require_method(&method, &[Method::GET]) {
        return response;
    }
    list_relay(&ctx, QueryKey::estimates_trash(), "/estimates/trash", &headers).await
}

async fn admin_invoices(
    State(ctx): State<AppContext>,
    method: Method,
    headers: HeaderMap,
) -> Response {
    if let Err(response) = require_method(&method, &[Method::GET]) {
        return response;
    }
    list_relay(&ctx, QueryKey::invoices(), "/invoices", &headers).await
}

async fn admin_users(
    State(ctx): State<AppContext>,
    method: Method,
    headers: HeaderMap,
) -> Response {
    if let Err(response) = require_method(&method, &[Method::GET]) {
        return response;
    }
    list_relay(&ctx, QueryKey::users(), "/users", &headers).await
}

async fn admin_user_delete(
    State(ctx): State<AppContext>,
    Path(user_id): Path<String>,
    method: Method,
    headers: HeaderMap,
    body: Option<Json<Value>>,
) -> Response {
    if let Err(response) = require_method(&method, &[Method::POST]) {
        return response;
    }
    if let Err(err) = require_safe_segment(&user_id) {
        return err.into_response();
    }

    let path = format!("/users/{user_id}/delete");
    let body = body.map(|Json(value)| value);
    match ctx.wordpress.relay(Method::POST, &path, body.as_ref(), cookie_header(&headers)).await {
        Ok((status, body)) => {
            if (200..300).contains(&status) {
                ctx.cache.invalidate(&QueryKey::users()).await;
            }
            relayed(status, body)
        }
        Err(err) => relay_failure(err),
    }
}
