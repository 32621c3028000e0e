//! JSON transport wrapper
//!
//! Issues requests through the retrying [`HttpClient`](crate::HttpClient),
//! parses JSON, and normalises failures into a closed error type. Attaches
//! session credentials (forwarded cookie, derived bearer token) and the dev
//! marker header.

mod session;

use cheapalarms_domain::constants::{DEV_MARKER_HEADER, RATE_LIMITED_CODE};
use cheapalarms_domain::CheapAlarmsError;
use reqwest::{Method, StatusCode};
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use thiserror::Error;
use tracing::debug;

pub use session::{derive_bearer, SESSION_COOKIE_NAME};

use crate::http::HttpClient;

/// Transport-level failures, normalised from raw HTTP outcomes.
#[derive(Debug, Error)]
pub enum TransportError {
    /// Backend answered with a non-2xx status.
    #[error("backend returned {status}: {message}")]
    Status { status: u16, message: String, code: Option<String>, retry_after: Option<u64> },

    /// Backend answered 2xx but the body was not valid JSON.
    #[error("backend returned {status} with an invalid JSON body: {message}")]
    Decode { status: u16, message: String },

    /// Transport failed before a response was obtained.
    #[error("network failure: {message}")]
    Network { message: String },

    /// The request could not be constructed.
    #[error("request build failure: {message}")]
    Build { message: String },
}

impl From<TransportError> for CheapAlarmsError {
    fn from(err: TransportError) -> Self {
        match err {
            TransportError::Status { status, message, code, retry_after } => {
                let rate_limited =
                    status == 429 || code.as_deref() == Some(RATE_LIMITED_CODE);
                if rate_limited {
                    Self::RateLimited { retry_after_secs: retry_after.unwrap_or(60) }
                } else {
                    Self::Remote { status, message }
                }
            }
            TransportError::Decode { status, message } => Self::Remote {
                status,
                message: format!("invalid JSON response: {message}"),
            },
            TransportError::Network { message } => Self::Network { message },
            TransportError::Build { message } => Self::Internal { message },
        }
    }
}

/// Per-request credential and header options.
#[derive(Debug, Clone, Copy, Default)]
pub struct RequestOptions<'a> {
    /// `Cookie` header forwarded verbatim to the backend.
    pub cookie: Option<&'a str>,
    /// Bearer token for the `Authorization` header.
    pub bearer: Option<&'a str>,
    /// Attach the dev marker header (non-production environments).
    pub dev_marker: bool,
    /// Query parameters appended to the path.
    pub query: &'a [(&'a str, &'a str)],
}

/// JSON transport over a backend base URL.
#[derive(Clone)]
pub struct Transport {
    http: HttpClient,
    base_url: String,
}

impl Transport {
    pub fn new(http: HttpClient, base_url: impl Into<String>) -> Self {
        let mut base_url = base_url.into();
        while base_url.ends_with('/') {
            base_url.pop();
        }
        Self { http, base_url }
    }

    /// Issue a request and parse the 2xx JSON body into `T`.
    ///
    /// Non-2xx responses become [`TransportError::Status`] with the message,
    /// code, and retry-after hint parsed from the error body when present.
    pub async fn request<T, B>(
        &self,
        method: Method,
        path: &str,
        body: Option<&B>,
        opts: RequestOptions<'_>,
    ) -> Result<T, TransportError>
    where
        T: DeserializeOwned,
        B: Serialize + ?Sized,
    {
        let (status, value) = self.send(method, path, body, opts).await?;
        if !status.is_success() {
            return Err(status_error(status, &value));
        }
        serde_json::from_value(value)
            .map_err(|err| TransportError::Decode { status: status.as_u16(), message: err.to_string() })
    }

    /// Issue a request and relay the backend's status and JSON body verbatim.
    ///
    /// Non-2xx statuses are not classified here; only transport-level and
    /// decode failures error. Used by the proxy routes.
    pub async fn relay<B>(
        &self,
        method: Method,
        path: &str,
        body: Option<&B>,
        opts: RequestOptions<'_>,
    ) -> Result<(u16, Value), TransportError>
    where
        B: Serialize + ?Sized,
    {
        let (status, value) = self.send(method, path, body, opts).await?;
        Ok((status.as_u16(), value))
    }

    async fn send<B>(
        &self,
        method: Method,
        path: &str,
        body: Option<&B>,
        opts: RequestOptions<'_>,
    ) -> Result<(StatusCode, Value), TransportError>
    where
        B: Serialize + ?Sized,
    {
        let url = format!("{}{}", self.base_url, path);
        let mut builder = self.http.request(method, &url);

        if !opts.query.is_empty() {
            builder = builder.query(opts.query);
        }
        if let Some(cookie) = opts.cookie {
            builder = builder.header(reqwest::header::COOKIE, cookie);
        }
        if let Some(bearer) = opts.bearer {
            builder = builder.bearer_auth(bearer);
        }
        if opts.dev_marker {
            builder = builder.header(DEV_MARKER_HEADER, "1");
        }
        if let Some(body) = body {
            builder = builder.json(body);
        }

        let response = self.http.send(builder).await?;
        let status = response.status();
        let retry_after = header_retry_after(&response);
        let text = response
            .text()
            .await
            .map_err(|err| TransportError::Network { message: err.to_string() })?;

        debug!(%url, %status, "backend response");

        let mut value = if text.is_empty() {
            Value::Null
        } else {
            match serde_json::from_str(&text) {
                Ok(value) => value,
                Err(err) if status.is_success() => {
                    return Err(TransportError::Decode {
                        status: status.as_u16(),
                        message: err.to_string(),
                    });
                }
                // Non-JSON error bodies keep their raw text as the message.
                Err(_) => Value::String(text),
            }
        };

        // A Retry-After header fills in only when the body carries none.
        if let Some(secs) = retry_after {
            if let Value::Object(map) = &mut value {
                map.entry("retry_after").or_insert_with(|| Value::from(secs));
            }
        }

        Ok((status, value))
    }
}

fn header_retry_after(response: &reqwest::Response) -> Option<u64> {
    response
        .headers()
        .get(reqwest::header::RETRY_AFTER)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.parse().ok())
}

fn status_error(status: StatusCode, body: &Value) -> TransportError {
    let message = body
        .get("message")
        .or_else(|| body.get("error"))
        .and_then(Value::as_str)
        .map(str::to_string)
        .unwrap_or_else(|| match body {
            Value::String(text) => text.clone(),
            _ => status.canonical_reason().unwrap_or("request failed").to_string(),
        });
    let code = body.get("code").and_then(Value::as_str).map(str::to_string);
    let retry_after = body.get("retry_after").and_then(Value::as_u64);

    TransportError::Status { status: status.as_u16(), message, code, retry_after }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use serde_json::json;
    use wiremock::matchers::{body_json, header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    use super::*;

    fn transport(server: &MockServer) -> Transport {
        let http = HttpClient::builder()
            .base_backoff(Duration::from_millis(5))
            .max_attempts(1)
            .build()
            .expect("http client");
        Transport::new(http, server.uri())
    }

    #[tokio::test]
    async fn parses_json_on_success() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/wp-json/cheapalarms/v1/estimates"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"total": 3})))
            .mount(&server)
            .await;

        let value: Value = transport(&server)
            .request(
                Method::GET,
                "/wp-json/cheapalarms/v1/estimates",
                None::<&Value>,
                RequestOptions::default(),
            )
            .await
            .unwrap();
        assert_eq!(value, json!({"total": 3}));
    }

    #[tokio::test]
    async fn forwards_cookie_bearer_and_dev_marker() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(header("cookie", "ca_session=abc123"))
            .and(header("authorization", "Bearer abc123"))
            .and(header("x-cheapalarms-dev", "1"))
            .and(body_json(json!({"ids": ["a"]})))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"ok": true})))
            .expect(1)
            .mount(&server)
            .await;

        let opts = RequestOptions {
            cookie: Some("ca_session=abc123"),
            bearer: Some("abc123"),
            dev_marker: true,
            query: &[],
        };
        let value: Value = transport(&server)
            .request(Method::POST, "/anything", Some(&json!({"ids": ["a"]})), opts)
            .await
            .unwrap();
        assert_eq!(value["ok"], true);
    }

    #[tokio::test]
    async fn non_2xx_carries_status_and_body_message() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(
                ResponseTemplate::new(403).set_body_json(json!({"message": "forbidden for you"})),
            )
            .mount(&server)
            .await;

        let err = transport(&server)
            .request::<Value, Value>(Method::GET, "/x", None, RequestOptions::default())
            .await
            .unwrap_err();

        match err {
            TransportError::Status { status, message, .. } => {
                assert_eq!(status, 403);
                assert_eq!(message, "forbidden for you");
            }
            other => panic!("expected status error, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn rate_limit_body_maps_to_rate_limited_with_retry_after() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(429).set_body_json(
                json!({"code": "rate_limited", "message": "slow down", "retry_after": 45}),
            ))
            .mount(&server)
            .await;

        let err = transport(&server)
            .request::<Value, Value>(Method::POST, "/x", None, RequestOptions::default())
            .await
            .unwrap_err();
        let domain_err = CheapAlarmsError::from(err);

        assert_eq!(domain_err, CheapAlarmsError::RateLimited { retry_after_secs: 45 });
        assert!(domain_err.to_string().contains("45 seconds"));
    }

    #[tokio::test]
    async fn invalid_json_success_body_is_a_decode_error() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_string("<html>not json</html>"))
            .mount(&server)
            .await;

        let err = transport(&server)
            .request::<Value, Value>(Method::GET, "/x", None, RequestOptions::default())
            .await
            .unwrap_err();
        assert!(matches!(err, TransportError::Decode { status: 200, .. }));
    }

    #[tokio::test]
    async fn relay_returns_non_2xx_without_classifying() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(404).set_body_json(json!({"message": "nope"})))
            .mount(&server)
            .await;

        let (status, body) = transport(&server)
            .relay::<Value>(Method::GET, "/x", None, RequestOptions::default())
            .await
            .unwrap();
        assert_eq!(status, 404);
        assert_eq!(body, json!({"message": "nope"}));
    }
}
