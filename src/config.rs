//! Runtime configuration, resolved once at process startup.
//!
//! Nothing here is read again during request handling; the resolved
//! `Config` is passed into the state that the router owns.

use std::net::SocketAddr;

pub const APP_NAME: &str = "caresnap";
pub const APP_VERSION: &str = env!("CARGO_PKG_VERSION");

const DEFAULT_BIND: &str = "127.0.0.1:8600";
const DEFAULT_FETCH_TIMEOUT_SECS: u64 = 20;
const DEFAULT_OLLAMA_MODEL: &str = "medgemma";

/// Local dev frontends allowed by default.
const DEFAULT_ALLOWED_ORIGINS: &[&str] = &[
    "http://localhost:5173",
    "http://127.0.0.1:5173",
    "http://localhost:5500",
    "http://127.0.0.1:5500",
];

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("HOSPITAL_BASE_URL not set. Add it to your .env and restart the server.")]
    MissingBaseUrl,
    #[error("invalid {name}: {value}")]
    Invalid { name: &'static str, value: String },
}

/// Startup configuration for the service.
#[derive(Debug, Clone)]
pub struct Config {
    /// Base URL of the hospital data API. Required.
    pub hospital_base_url: String,
    /// Optional bearer token sent on every table fetch.
    pub hospital_bearer_token: Option<String>,
    /// Listen address for the HTTP server.
    pub bind_addr: SocketAddr,
    /// Per-fetch timeout ceiling in seconds.
    pub fetch_timeout_secs: u64,
    /// Origins allowed by the CORS layer.
    pub allowed_origins: Vec<String>,
    /// Ollama base URL; when absent the assistant runs in mock mode.
    pub ollama_base_url: Option<String>,
    /// Model name used for assistant generation.
    pub ollama_model: String,
}

impl Config {
    /// Resolve configuration from the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let hospital_base_url = lookup("HOSPITAL_BASE_URL")
            .map(|v| v.trim().trim_end_matches('/').to_string())
            .filter(|v| !v.is_empty())
            .ok_or(ConfigError::MissingBaseUrl)?;

        let hospital_bearer_token = lookup("HOSPITAL_BEARER_TOKEN").filter(|v| !v.is_empty());

        let bind_raw = lookup("CARESNAP_BIND").unwrap_or_else(|| DEFAULT_BIND.to_string());
        let bind_addr = bind_raw.parse().map_err(|_| ConfigError::Invalid {
            name: "CARESNAP_BIND",
            value: bind_raw.clone(),
        })?;

        let fetch_timeout_secs = match lookup("CARESNAP_FETCH_TIMEOUT_SECS") {
            Some(raw) => raw.parse().map_err(|_| ConfigError::Invalid {
                name: "CARESNAP_FETCH_TIMEOUT_SECS",
                value: raw.clone(),
            })?,
            None => DEFAULT_FETCH_TIMEOUT_SECS,
        };

        let allowed_origins = match lookup("CARESNAP_ALLOWED_ORIGINS") {
            Some(raw) => raw
                .split(',')
                .map(|origin| origin.trim().to_string())
                .filter(|origin| !origin.is_empty())
                .collect(),
            None => DEFAULT_ALLOWED_ORIGINS
                .iter()
                .map(|origin| origin.to_string())
                .collect(),
        };

        let ollama_base_url = lookup("OLLAMA_BASE_URL").filter(|v| !v.is_empty());
        let ollama_model =
            lookup("OLLAMA_MODEL").unwrap_or_else(|| DEFAULT_OLLAMA_MODEL.to_string());

        Ok(Self {
            hospital_base_url,
            hospital_bearer_token,
            bind_addr,
            fetch_timeout_secs,
            allowed_origins,
            ollama_base_url,
            ollama_model,
        })
    }
}

/// Default tracing filter when RUST_LOG is unset.
pub fn default_log_filter() -> String {
    format!("info,{}=debug", env!("CARGO_PKG_NAME").replace('-', "_"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup_from(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> + '_ {
        let map: HashMap<&str, &str> = vars.iter().copied().collect();
        move |name| map.get(name).map(|v| v.to_string())
    }

    #[test]
    fn missing_base_url_is_fatal() {
        let result = Config::from_lookup(lookup_from(&[]));
        assert!(matches!(result, Err(ConfigError::MissingBaseUrl)));
    }

    #[test]
    fn empty_base_url_is_fatal() {
        let result = Config::from_lookup(lookup_from(&[("HOSPITAL_BASE_URL", "  ")]));
        assert!(matches!(result, Err(ConfigError::MissingBaseUrl)));
    }

    #[test]
    fn minimal_config_uses_defaults() {
        let config =
            Config::from_lookup(lookup_from(&[("HOSPITAL_BASE_URL", "http://hospital.test")]))
                .unwrap();

        assert_eq!(config.hospital_base_url, "http://hospital.test");
        assert!(config.hospital_bearer_token.is_none());
        assert_eq!(config.bind_addr.to_string(), DEFAULT_BIND);
        assert_eq!(config.fetch_timeout_secs, DEFAULT_FETCH_TIMEOUT_SECS);
        assert_eq!(config.allowed_origins.len(), DEFAULT_ALLOWED_ORIGINS.len());
        assert!(config.ollama_base_url.is_none());
        assert_eq!(config.ollama_model, DEFAULT_OLLAMA_MODEL);
    }

    #[test]
    fn base_url_trailing_slash_is_trimmed() {
        let config =
            Config::from_lookup(lookup_from(&[("HOSPITAL_BASE_URL", "http://hospital.test/")]))
                .unwrap();
        assert_eq!(config.hospital_base_url, "http://hospital.test");
    }

    #[test]
    fn invalid_bind_address_is_rejected() {
        let result = Config::from_lookup(lookup_from(&[
            ("HOSPITAL_BASE_URL", "http://hospital.test"),
            ("CARESNAP_BIND", "not-an-address"),
        ]));
        assert!(matches!(
            result,
            Err(ConfigError::Invalid {
                name: "CARESNAP_BIND",
                ..
            })
        ));
    }

    #[test]
    fn invalid_timeout_is_rejected() {
        let result = Config::from_lookup(lookup_from(&[
            ("HOSPITAL_BASE_URL", "http://hospital.test"),
            ("CARESNAP_FETCH_TIMEOUT_SECS", "twenty"),
        ]));
        assert!(result.is_err());
    }

    #[test]
    fn origins_csv_is_split_and_trimmed() {
        let config = Config::from_lookup(lookup_from(&[
            ("HOSPITAL_BASE_URL", "http://hospital.test"),
            ("CARESNAP_ALLOWED_ORIGINS", "http://a.test, http://b.test ,,"),
        ]))
        .unwrap();
        assert_eq!(config.allowed_origins, vec!["http://a.test", "http://b.test"]);
    }

    #[test]
    fn ollama_backend_is_optional() {
        let config = Config::from_lookup(lookup_from(&[
            ("HOSPITAL_BASE_URL", "http://hospital.test"),
            ("OLLAMA_BASE_URL", "http://localhost:11434"),
            ("OLLAMA_MODEL", "medgemma:4b"),
        ]))
        .unwrap();
        assert_eq!(
            config.ollama_base_url.as_deref(),
            Some("http://localhost:11434")
        );
        assert_eq!(config.ollama_model, "medgemma:4b");
    }

    #[test]
    fn app_version_matches_cargo() {
        assert_eq!(APP_VERSION, env!("CARGO_PKG_VERSION"));
    }
}
