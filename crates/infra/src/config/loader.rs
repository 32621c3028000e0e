//! Configuration loader
//!
//! Loads gateway configuration from environment variables or files.
//!
//! ## Loading Strategy
//! 1. First, attempts to load from environment variables
//! 2. If incomplete, falls back to loading from file
//! 3. Probes multiple paths for config files
//! 4. Supports JSON and TOML formats
//!
//! ## Environment Variables
//! - `CHEAPALARMS_BIND_ADDR`: Server bind address (`host:port`)
//! - `CHEAPALARMS_ENVIRONMENT`: `development`, `staging` or `production`
//! - `CHEAPALARMS_WP_BASE_URL`: WordPress backend base URL
//! - `CHEAPALARMS_WP_TIMEOUT`: WordPress request timeout in seconds
//! - `CHEAPALARMS_WP_SESSION_COOKIE`: Gateway session cookie (optional)
//! - `CHEAPALARMS_GHL_BASE_URL`: GoHighLevel API base URL
//! - `CHEAPALARMS_GHL_API_KEY`: GoHighLevel api key (optional)
//! - `CHEAPALARMS_CACHE_FRESHNESS`: Cache freshness window in seconds
//!
//! ## File Locations
//! The loader probes the following paths (in order):
//! 1. `./config.json` or `./config.toml` (current working directory)
//! 2. `./cheapalarms.json` or `./cheapalarms.toml`
//! 3. `../config.json` or `../config.toml` (parent directories, 2 levels)
//! 4. Relative to executable location

use std::path::{Path, PathBuf};

use cheapalarms_domain::{
    CacheSettings, CheapAlarmsError, Config, Environment, GhlConfig, Result, ServerConfig,
    WordPressConfig,
};

/// Load configuration with automatic fallback strategy
///
/// First attempts to load from environment variables. If the required
/// variables are missing, falls back to loading from a config file.
///
/// # Errors
/// Returns `CheapAlarmsError::Config` if configuration cannot be loaded
/// from either source.
pub fn load() -> Result<Config> {
    match load_from_env() {
        Ok(config) => {
            tracing::info!("Configuration loaded from environment variables");
            Ok(config)
        }
        Err(e) => {
            tracing::debug!(error = ?e, "Failed to load from environment, trying file");
            load_from_file(None)
        }
    }
}

/// Load configuration from environment variables
///
/// The bind address and both backend base URLs are required; the rest
/// fall back to defaults.
///
/// # Errors
/// Returns `CheapAlarmsError::Config` if required variables are missing
/// or have invalid values.
pub fn load_from_env() -> Result<Config> {
    let bind_addr = env_var("CHEAPALARMS_BIND_ADDR")?;
    let environment = parse_environment(&env_var("CHEAPALARMS_ENVIRONMENT")?)?;

    let wp_base_url = env_var("CHEAPALARMS_WP_BASE_URL")?;
    let wp_timeout = env_u64("CHEAPALARMS_WP_TIMEOUT", 30)?;
    let session_cookie = std::env::var("CHEAPALARMS_WP_SESSION_COOKIE").ok();

    let ghl_base_url = env_var("CHEAPALARMS_GHL_BASE_URL")?;
    let ghl_api_key = std::env::var("CHEAPALARMS_GHL_API_KEY").ok();

    let freshness = env_u64("CHEAPALARMS_CACHE_FRESHNESS", 60)?;

    Ok(Config {
        server: ServerConfig { bind_addr, environment },
        wordpress: WordPressConfig {
            base_url: wp_base_url,
            timeout_seconds: wp_timeout,
            session_cookie,
        },
        ghl: GhlConfig { base_url: ghl_base_url, api_key: ghl_api_key },
        cache: CacheSettings { freshness_seconds: freshness },
    })
}

/// Load configuration from a file
///
/// If `path` is `None`, probes multiple locations for config files.
/// Supports both JSON and TOML formats (detected by file extension).
///
/// # Errors
/// Returns `CheapAlarmsError::Config` if the file is missing, no probe
/// candidate exists, or the contents fail to parse.
pub fn load_from_file(path: Option<PathBuf>) -> Result<Config> {
    let config_path = match path {
        Some(p) => {
            if !p.exists() {
                return Err(CheapAlarmsError::config(format!(
                    "Config file not found: {}",
                    p.display()
                )));
            }
            p
        }
        None => probe_config_paths().ok_or_else(|| {
            CheapAlarmsError::config("No config file found in any of the standard locations")
        })?,
    };

    tracing::info!(path = %config_path.display(), "Loading configuration from file");

    let contents = std::fs::read_to_string(&config_path)
        .map_err(|e| CheapAlarmsError::config(format!("Failed to read config file: {e}")))?;

    parse_config(&contents, &config_path)
}

/// Parse configuration from string content
///
/// Format is detected by file extension (`.json` or `.toml`).
fn parse_config(contents: &str, path: &Path) -> Result<Config> {
    let extension = path.extension().and_then(|e| e.to_str()).unwrap_or("json");

    match extension {
        "toml" => toml::from_str(contents)
            .map_err(|e| CheapAlarmsError::config(format!("Invalid TOML format: {e}"))),
        "json" => serde_json::from_str(contents)
            .map_err(|e| CheapAlarmsError::config(format!("Invalid JSON format: {e}"))),
        _ => Err(CheapAlarmsError::config(format!("Unsupported config format: {extension}"))),
    }
}

/// Probe multiple paths for configuration files
///
/// # Returns
/// The first config file found, or `None` if no file exists.
pub fn probe_config_paths() -> Option<PathBuf> {
    let mut candidates = Vec::new();

    if let Ok(cwd) = std::env::current_dir() {
        candidates.extend(vec![
            cwd.join("config.json"),
            cwd.join("config.toml"),
            cwd.join("cheapalarms.json"),
            cwd.join("cheapalarms.toml"),
            cwd.join("../config.json"),
            cwd.join("../config.toml"),
            cwd.join("../../config.json"),
            cwd.join("../../config.toml"),
        ]);
    }

    if let Ok(exe_path) = std::env::current_exe() {
        if let Some(exe_dir) = exe_path.parent() {
            candidates.extend(vec![
                exe_dir.join("config.json"),
                exe_dir.join("config.toml"),
                exe_dir.join("cheapalarms.json"),
                exe_dir.join("cheapalarms.toml"),
            ]);
        }
    }

    candidates.into_iter().find(|path| path.exists())
}

fn parse_environment(value: &str) -> Result<Environment> {
    match value.to_ascii_lowercase().as_str() {
        "development" | "dev" => Ok(Environment::Development),
        "staging" => Ok(Environment::Staging),
        "production" | "prod" => Ok(Environment::Production),
        other => Err(CheapAlarmsError::config(format!("Unknown environment: {other}"))),
    }
}

/// Get required environment variable
fn env_var(key: &str) -> Result<String> {
    std::env::var(key)
        .map_err(|_| CheapAlarmsError::config(format!("Missing required environment variable: {key}")))
}

/// Parse a seconds value from an environment variable, with a default when
/// the variable is not set.
fn env_u64(key: &str, default: u64) -> Result<u64> {
    match std::env::var(key) {
        Ok(raw) => raw
            .parse::<u64>()
            .map_err(|e| CheapAlarmsError::config(format!("Invalid value for {key}: {e}"))),
        Err(_) => Ok(default),
    }
}

#[cfg(test)]
mod tests {
    use std::io::Write;
    use std::sync::Mutex;

    use once_cell::sync::Lazy;
    use tempfile::NamedTempFile;

    use super::*;

    static ENV_LOCK: Lazy<Mutex<()>> = Lazy::new(|| Mutex::new(()));

    fn clear_env() {
        for key in [
            "CHEAPALARMS_BIND_ADDR",
            "CHEAPALARMS_ENVIRONMENT",
            "CHEAPALARMS_WP_BASE_URL",
            "CHEAPALARMS_WP_TIMEOUT",
            "CHEAPALARMS_WP_SESSION_COOKIE",
            "CHEAPALARMS_GHL_BASE_URL",
            "CHEAPALARMS_GHL_API_KEY",
            "CHEAPALARMS_CACHE_FRESHNESS",
        ] {
            std::env::remove_var(key);
        }
    }

    #[test]
    fn load_from_env_all_vars_set() {
        let _guard = ENV_LOCK.lock().expect("env mutex poisoned");
        clear_env();

        std::env::set_var("CHEAPALARMS_BIND_ADDR", "0.0.0.0:9000");
        std::env::set_var("CHEAPALARMS_ENVIRONMENT", "staging");
        std::env::set_var("CHEAPALARMS_WP_BASE_URL", "https://wp.example.com");
        std::env::set_var("CHEAPALARMS_WP_TIMEOUT", "10");
        std::env::set_var("CHEAPALARMS_WP_SESSION_COOKIE", "ca_session=abc");
        std::env::set_var("CHEAPALARMS_GHL_BASE_URL", "https://ghl.example.com");
        std::env::set_var("CHEAPALARMS_CACHE_FRESHNESS", "120");

        let config = load_from_env().expect("config from env");
        assert_eq!(config.server.bind_addr, "0.0.0.0:9000");
        assert_eq!(config.server.environment, Environment::Staging);
        assert_eq!(config.wordpress.base_url, "https://wp.example.com");
        assert_eq!(config.wordpress.timeout_seconds, 10);
        assert_eq!(config.wordpress.session_cookie.as_deref(), Some("ca_session=abc"));
        assert_eq!(config.ghl.api_key, None);
        assert_eq!(config.cache.freshness_seconds, 120);

        clear_env();
    }

    #[test]
    fn load_from_env_defaults_optional_numbers() {
        let _guard = ENV_LOCK.lock().expect("env mutex poisoned");
        clear_env();

        std::env::set_var("CHEAPALARMS_BIND_ADDR", "127.0.0.1:8787");
        std::env::set_var("CHEAPALARMS_ENVIRONMENT", "production");
        std::env::set_var("CHEAPALARMS_WP_BASE_URL", "https://wp.example.com");
        std::env::set_var("CHEAPALARMS_GHL_BASE_URL", "https://ghl.example.com");

        let config = load_from_env().expect("config from env");
        assert_eq!(config.wordpress.timeout_seconds, 30);
        assert_eq!(config.cache.freshness_seconds, 60);
        assert!(!config.server.environment.attach_dev_marker());

        clear_env();
    }

    #[test]
    fn load_from_env_missing_var() {
        let _guard = ENV_LOCK.lock().expect("env mutex poisoned");
        clear_env();

        let err = load_from_env().unwrap_err();
        assert!(matches!(err, CheapAlarmsError::Config { .. }));
    }

    #[test]
    fn load_from_env_invalid_number() {
        let _guard = ENV_LOCK.lock().expect("env mutex poisoned");
        clear_env();

        std::env::set_var("CHEAPALARMS_BIND_ADDR", "127.0.0.1:8787");
        std::env::set_var("CHEAPALARMS_ENVIRONMENT", "development");
        std::env::set_var("CHEAPALARMS_WP_BASE_URL", "https://wp.example.com");
        std::env::set_var("CHEAPALARMS_GHL_BASE_URL", "https://ghl.example.com");
        std::env::set_var("CHEAPALARMS_WP_TIMEOUT", "not-a-number");

        let err = load_from_env().unwrap_err();
        assert!(matches!(err, CheapAlarmsError::Config { .. }));

        clear_env();
    }

    #[test]
    fn load_from_file_toml() {
        let toml_content = r#"
[server]
bind_addr = "127.0.0.1:8787"
environment = "development"

[wordpress]
base_url = "https://wp.example.com"
timeout_seconds = 15

[ghl]
base_url = "https://ghl.example.com"
api_key = "key-1"

[cache]
freshness_seconds = 90
"#;

        let mut temp_file = NamedTempFile::new().unwrap();
        temp_file.write_all(toml_content.as_bytes()).unwrap();
        let path = temp_file.path().with_extension("toml");
        std::fs::copy(temp_file.path(), &path).unwrap();

        let config = load_from_file(Some(path.clone())).expect("config from toml");
        assert_eq!(config.wordpress.timeout_seconds, 15);
        assert_eq!(config.ghl.api_key.as_deref(), Some("key-1"));
        assert_eq!(config.cache.freshness_seconds, 90);

        std::fs::remove_file(path).ok();
    }

    #[test]
    fn load_from_file_json() {
        let json_content = r#"{
            "server": { "bind_addr": "127.0.0.1:8787", "environment": "production" },
            "wordpress": { "base_url": "https://wp.example.com", "timeout_seconds": 20 },
            "ghl": { "base_url": "https://ghl.example.com" },
            "cache": { "freshness_seconds": 45 }
        }"#;

        let mut temp_file = NamedTempFile::new().unwrap();
        temp_file.write_all(json_content.as_bytes()).unwrap();
        let path = temp_file.path().with_extension("json");
        std::fs::copy(temp_file.path(), &path).unwrap();

        let config = load_from_file(Some(path.clone())).expect("config from json");
        assert_eq!(config.server.environment, Environment::Production);
        assert_eq!(config.wordpress.session_cookie, None);

        std::fs::remove_file(path).ok();
    }

    #[test]
    fn load_from_file_not_found() {
        let err = load_from_file(Some(PathBuf::from("/nonexistent/config.json"))).unwrap_err();
        assert!(matches!(err, CheapAlarmsError::Config { .. }));
    }

    #[test]
    fn parse_config_rejects_unsupported_format() {
        let err = parse_config("whatever", &PathBuf::from("config.yaml")).unwrap_err();
        assert!(matches!(err, CheapAlarmsError::Config { .. }));
    }
}
