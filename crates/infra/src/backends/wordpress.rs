//! WordPress backend client
//!
//! Implements the estimate and invoice ports against the path-prefixed
//! `/wp-json/cheapalarms/v1` REST namespace. The session cookie is forwarded
//! verbatim, the bearer token is derived from it, and the dev marker header
//! is attached outside production.

use async_trait::async_trait;
use cheapalarms_core::{EstimatesPort, InvoicesPort};
use cheapalarms_domain::{
    BulkReport, Environment, ItemError, Result, Scope, SystemReport, WordPressConfig,
};
use reqwest::Method;
use serde::Deserialize;
use serde_json::json;

use crate::http::HttpClient;
use crate::transport::{derive_bearer, RequestOptions, Transport};

const API_PREFIX: &str = "/wp-json/cheapalarms/v1";

/// Raw bulk-operation response from the backend.
#[derive(Debug, Deserialize)]
struct WpBulkResponse {
    #[serde(default, alias = "deleted", alias = "restored")]
    succeeded: usize,
    #[serde(default)]
    errors: Vec<WpItemError>,
}

#[derive(Debug, Deserialize)]
struct WpItemError {
    id: String,
    message: String,
}

impl From<WpBulkResponse> for BulkReport {
    fn from(raw: WpBulkResponse) -> Self {
        Self {
            succeeded: raw.succeeded,
            errors: raw
                .errors
                .into_iter()
                .map(|e| ItemError { id: e.id, message: e.message })
                .collect(),
        }
    }
}

/// Client for the WordPress REST backend.
#[derive(Clone)]
pub struct WordPressClient {
    transport: Transport,
    session_cookie: Option<String>,
    bearer: Option<String>,
    dev_marker: bool,
}

impl WordPressClient {
    /// Build a client from configuration.
    pub fn new(config: &WordPressConfig, environment: Environment) -> Result<Self> {
        let http = HttpClient::builder()
            .timeout(config.timeout())
            .user_agent("cheapalarms-gateway")
            .build()?;
        Ok(Self::with_transport(
            Transport::new(http, config.base_url.clone()),
            config.session_cookie.clone(),
            environment,
        ))
    }

    /// Build a client over an existing transport (used by tests).
    pub fn with_transport(
        transport: Transport,
        session_cookie: Option<String>,
        environment: Environment,
    ) -> Self {
        let bearer = session_cookie.as_deref().and_then(derive_bearer);
        Self {
            transport,
            session_cookie,
            bearer,
            dev_marker: environment.attach_dev_marker(),
        }
    }

    fn options(&self) -> RequestOptions<'_> {
        RequestOptions {
            cookie: self.session_cookie.as_deref(),
            bearer: self.bearer.as_deref(),
            dev_marker: self.dev_marker,
            query: &[],
        }
    }

    /// Relay a request to the backend namespace on behalf of a client,
    /// forwarding the client's own cookie and deriving a bearer from it.
    ///
    /// The backend's status and JSON body come back verbatim.
    pub async fn relay(
        &self,
        method: Method,
        path: &str,
        body: Option<&serde_json::Value>,
        cookie: Option<&str>,
    ) -> std::result::Result<(u16, serde_json::Value), crate::transport::TransportError> {
        let bearer = cookie.and_then(derive_bearer);
        let opts = RequestOptions {
            cookie,
            bearer: bearer.as_deref(),
            dev_marker: self.dev_marker,
            query: &[],
        };
        self.transport.relay(method, &format!("{API_PREFIX}{path}"), body, opts).await
    }

    async fn bulk_call(&self, path: &str, body: &serde_json::Value) -> Result<BulkReport> {
        let raw: WpBulkResponse = self
            .transport
            .request(Method::POST, path, Some(body), self.options())
            .await
            .map_err(cheapalarms_domain::CheapAlarmsError::from)?;
        Ok(raw.into())
    }

    /// Delete portal users in the selected scope; the backend orchestrates
    /// the CRM side for `ghl`/`both`.
    pub async fn bulk_delete_users(&self, ids: &[String], scope: Scope) -> Result<BulkReport> {
        self.bulk_call(
            &format!("{API_PREFIX}/users/bulk-delete"),
            &json!({"ids": ids, "scope": scope}),
        )
        .await
    }

    /// Delete the local (WordPress) user record for an email address.
    pub async fn delete_user_by_email(&self, email: &str) -> Result<SystemReport> {
        #[derive(Deserialize)]
        struct WpDeleteResponse {
            ok: bool,
            #[serde(default)]
            message: Option<String>,
        }

        let raw: WpDeleteResponse = self
            .transport
            .request(
                Method::POST,
                &format!("{API_PREFIX}/users/delete-by-email"),
                Some(&json!({"email": email})),
                self.options(),
            )
            .await
            .map_err(cheapalarms_domain::CheapAlarmsError::from)?;
        Ok(SystemReport { ok: raw.ok, message: raw.message })
    }
}

#[async_trait]
impl EstimatesPort for WordPressClient {
    async fn bulk_trash(&self, ids: &[String]) -> Result<BulkReport> {
        self.bulk_call(&format!("{API_PREFIX}/estimates/bulk-delete"), &json!({"ids": ids}))
            .await
    }

    async fn bulk_restore(&self, ids: &[String]) -> Result<BulkReport> {
        self.bulk_call(&format!("{API_PREFIX}/estimates/bulk-restore"), &json!({"ids": ids}))
            .await
    }

    async fn restore(&self, id: &str) -> Result<()> {
        let _: serde_json::Value = self
            .transport
            .request(
                Method::POST,
                &format!("{API_PREFIX}/estimates/{id}/restore"),
                None::<&serde_json::Value>,
                self.options(),
            )
            .await
            .map_err(cheapalarms_domain::CheapAlarmsError::from)?;
        Ok(())
    }

    async fn empty_trash(&self) -> Result<BulkReport> {
        self.bulk_call(&format!("{API_PREFIX}/estimates/trash/empty"), &json!({})).await
    }
}

#[async_trait]
impl InvoicesPort for WordPressClient {
    async fn bulk_delete(&self, ids: &[String], scope: Scope) -> Result<BulkReport> {
        self.bulk_call(
            &format!("{API_PREFIX}/invoices/bulk-delete"),
            &json!({"ids": ids, "scope": scope}),
        )
        .await
    }
}
