//! GoHighLevel CRM client
//!
//! Contact lookups and deletions against the GHL REST API, authenticated
//! with an api key. Only the operations the scoped delete path needs.

use cheapalarms_domain::{CheapAlarmsError, GhlConfig, Result, SystemReport};
use reqwest::Method;
use serde::Deserialize;
use tracing::debug;

use crate::http::HttpClient;
use crate::transport::{RequestOptions, Transport};

/// Client for the GoHighLevel CRM.
#[derive(Clone)]
pub struct GhlClient {
    transport: Transport,
    api_key: Option<String>,
}

impl GhlClient {
    pub fn new(config: &GhlConfig) -> Result<Self> {
        let http = HttpClient::builder().user_agent("cheapalarms-gateway").build()?;
        Ok(Self::with_transport(Transport::new(http, config.base_url.clone()), config.api_key.clone()))
    }

    /// Build a client over an existing transport (used by tests).
    pub fn with_transport(transport: Transport, api_key: Option<String>) -> Self {
        Self { transport, api_key }
    }

    fn options(&self) -> RequestOptions<'_> {
        RequestOptions { bearer: self.api_key.as_deref(), ..RequestOptions::default() }
    }

    /// Delete the CRM contact with the given email address.
    ///
    /// A missing contact counts as a failed report, not an error; the scope
    /// predicate decides whether that fails the overall operation.
    pub async fn delete_contact_by_email(&self, email: &str) -> Result<SystemReport> {
        let contact_id = match self.lookup_contact(email).await? {
            Some(id) => id,
            None => {
                return Ok(SystemReport {
                    ok: false,
                    message: Some("contact not found".to_string()),
                })
            }
        };

        debug!(contact_id, "deleting GHL contact");
        let result = self
            .transport
            .relay::<serde_json::Value>(
                Method::DELETE,
                &format!("/contacts/{contact_id}"),
                None,
                self.options(),
            )
            .await;

        match result {
            Ok((status, _)) if (200..300).contains(&status) => {
                Ok(SystemReport { ok: true, message: None })
            }
            Ok((status, body)) => Ok(SystemReport {
                ok: false,
                message: Some(format!(
                    "GHL returned {status}: {}",
                    body.get("message").and_then(serde_json::Value::as_str).unwrap_or("delete failed")
                )),
            }),
            Err(err) => Err(CheapAlarmsError::from(err)),
        }
    }

    async fn lookup_contact(&self, email: &str) -> Result<Option<String>> {
        #[derive(Deserialize)]
        struct LookupResponse {
            #[serde(default)]
            contacts: Vec<Contact>,
        }

        #[derive(Deserialize)]
        struct Contact {
            id: String,
        }

        let opts = RequestOptions { query: &[("email", email)], ..self.options() };
        let response: LookupResponse = self
            .transport
            .request(Method::GET, "/contacts/lookup", None::<&serde_json::Value>, opts)
            .await
            .map_err(CheapAlarmsError::from)?;
        Ok(response.contacts.into_iter().next().map(|c| c.id))
    }
}
