//! Application configuration loaded from environment variables.
//!
//! A `.env` file is honored for local development builds of the mobile shell.

use std::env;
use std::path::PathBuf;
use std::time::Duration;

/// Default per-request timeout for agent API calls.
const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 15;

/// Application configuration, loaded once at startup.
#[derive(Debug, Clone)]
pub struct Config {
    /// Root of the SLM agent REST API (no trailing slash)
    pub api_base_url: String,
    /// Location of the file-backed session store
    pub store_path: PathBuf,
    /// Timeout applied to every agent API request
    pub request_timeout: Duration,
    /// Loopback bridge port
    pub port: u16,
    /// Mobile dev-server origin allowed by CORS
    pub frontend_url: String,
    /// Emit a (masked) trace event for every credential comparison.
    /// Development only.
    pub trace_credential_matches: bool,
}

impl Config {
    /// Load configuration from environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok(); // Load .env file if present

        let api_base_url = env::var("AGENT_API_BASE_URL")
            .map(|v| v.trim().trim_end_matches('/').to_string())
            .map_err(|_| ConfigError::Missing("AGENT_API_BASE_URL"))?;

        if api_base_url.is_empty() {
            return Err(ConfigError::Invalid("AGENT_API_BASE_URL"));
        }

        Ok(Self {
            api_base_url,
            store_path: env::var("SESSION_STORE_PATH")
                .map(PathBuf::from)
                .unwrap_or_else(|_| PathBuf::from("data/session.json")),
            request_timeout: Duration::from_secs(
                env::var("REQUEST_TIMEOUT_SECS")
                    .ok()
                    .and_then(|v| v.parse().ok())
                    // A zero timeout fails every request immediately
                    .filter(|&secs: &u64| secs > 0)
                    .unwrap_or(DEFAULT_REQUEST_TIMEOUT_SECS),
            ),
            port: env::var("PORT")
                .unwrap_or_else(|_| "8787".to_string())
                .parse()
                .unwrap_or(8787),
            frontend_url: env::var("FRONTEND_URL")
                .unwrap_or_else(|_| "http://localhost:8081".to_string()),
            trace_credential_matches: env::var("TRACE_CREDENTIAL_MATCHES")
                .map(|v| matches!(v.trim(), "1" | "true" | "yes"))
                .unwrap_or(false),
        })
    }

    /// Default config for testing only. The API root is a discard port.
    pub fn test_default() -> Self {
        Self {
            api_base_url: "http://127.0.0.1:9".to_string(),
            store_path: PathBuf::from("target/test-session.json"),
            request_timeout: Duration::from_secs(2),
            port: 8787,
            frontend_url: "http://localhost:8081".to_string(),
            trace_credential_matches: false,
        }
    }
}

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Missing required environment variable: {0}")]
    Missing(&'static str),

    #[error("Invalid value for environment variable: {0}")]
    Invalid(&'static str),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_from_env() {
        env::set_var("AGENT_API_BASE_URL", "https://api.example.test/v1/ ");
        env::remove_var("REQUEST_TIMEOUT_SECS");
        env::remove_var("PORT");
        env::remove_var("TRACE_CREDENTIAL_MATCHES");

        let config = Config::from_env().expect("Config should load");

        assert_eq!(config.api_base_url, "https://api.example.test/v1");
        assert_eq!(config.request_timeout, Duration::from_secs(15));
        assert_eq!(config.port, 8787);
        assert!(!config.trace_credential_matches);

        for bad in ["0", "soon", "-5"] {
            env::set_var("REQUEST_TIMEOUT_SECS", bad);
            let config = Config::from_env().expect("Config should load");
            assert_eq!(config.request_timeout, Duration::from_secs(15), "{}", bad);
        }

        env::set_var("REQUEST_TIMEOUT_SECS", "3");
        let config = Config::from_env().expect("Config should load");
        assert_eq!(config.request_timeout, Duration::from_secs(3));
        env::remove_var("REQUEST_TIMEOUT_SECS");
    }
}
