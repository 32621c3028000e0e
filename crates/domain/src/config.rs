//! Configuration management

use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Deployment environment; controls the dev marker header on backend calls.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Environment {
    Development,
    Staging,
    Production,
}

impl Environment {
    /// Whether the dev marker header should be attached to backend requests.
    pub fn attach_dev_marker(self) -> bool {
        !matches!(self, Self::Production)
    }
}

/// Application configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    pub server: ServerConfig,
    pub wordpress: WordPressConfig,
    pub ghl: GhlConfig,
    pub cache: CacheSettings,
}

/// HTTP server configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    pub bind_addr: String,
    pub environment: Environment,
}

/// WordPress backend configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WordPressConfig {
    pub base_url: String,
    pub timeout_seconds: u64,
    /// Gateway's own session cookie; the backend bearer token is derived
    /// from it. Never serialised back out.
    #[serde(skip_serializing)]
    pub session_cookie: Option<String>,
}

impl WordPressConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_seconds)
    }
}

/// GoHighLevel CRM configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GhlConfig {
    pub base_url: String,
    #[serde(skip_serializing)]
    pub api_key: Option<String>,
}

/// Query cache settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CacheSettings {
    /// Seconds a cached query result is considered fresh.
    pub freshness_seconds: u64,
}

impl CacheSettings {
    pub fn freshness_window(&self) -> Duration {
        Duration::from_secs(self.freshness_seconds)
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            server: ServerConfig {
                bind_addr: "127.0.0.1:8787".to_string(),
                environment: Environment::Development,
            },
            wordpress: WordPressConfig {
                base_url: "http://localhost:8080".to_string(),
                timeout_seconds: 30,
                session_cookie: None,
            },
            ghl: GhlConfig {
                base_url: "https://rest.gohighlevel.com/v1".to_string(),
                api_key: None,
            },
            cache: CacheSettings { freshness_seconds: 60 },
        }
    }
}
