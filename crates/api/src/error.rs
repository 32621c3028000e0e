//! HTTP error mapping
//!
//! Wraps the domain error so handlers can use `?`, and maps each variant to
//! a status code. The tagged error is serialised into the response body so
//! callers can branch on `error.type`.

use axum::http::{header, HeaderValue, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::Json;
use cheapalarms_domain::CheapAlarmsError;
use serde_json::json;
use tracing::warn;

/// Handler-level error; converts into a JSON response.
#[derive(Debug)]
pub struct ApiError(pub CheapAlarmsError);

impl From<CheapAlarmsError> for ApiError {
    fn from(err: CheapAlarmsError) -> Self {
        Self(err)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = match &self.0 {
            CheapAlarmsError::Validation { .. } => StatusCode::BAD_REQUEST,
            CheapAlarmsError::Remote { status, .. } => {
                StatusCode::from_u16(*status).unwrap_or(StatusCode::BAD_GATEWAY)
            }
            CheapAlarmsError::PartialFailure { .. } => StatusCode::MULTI_STATUS,
            CheapAlarmsError::RateLimited { .. } => StatusCode::TOO_MANY_REQUESTS,
            CheapAlarmsError::Network { .. } => StatusCode::BAD_GATEWAY,
            CheapAlarmsError::Aborted => StatusCode::CONFLICT,
            CheapAlarmsError::Config { .. } | CheapAlarmsError::Internal { .. } => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        };

        if status.is_server_error() {
            warn!(error = %self.0, "request failed");
        }

        let body = json!({
            "ok": false,
            "message": self.0.to_string(),
            "error": self.0,
        });
        let mut response = (status, Json(body)).into_response();

        if let CheapAlarmsError::RateLimited { retry_after_secs } = self.0 {
            if let Ok(value) = HeaderValue::from_str(&retry_after_secs.to_string()) {
                response.headers_mut().insert(header::RETRY_AFTER, value);
            }
        }

        response
    }
}
