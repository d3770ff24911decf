//! Context configuration.
//!
//! Loaded from YAML with environment overrides:
//!
//! - `WEBAPI_CONFIG` - path of a YAML file to load
//! - `WEBAPI_BASE_URL` - overrides `base_url`
//! - `WEBAPI_TIMEOUT_SECS` - overrides `timeout_secs`

use reqwest::Url;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;
use std::time::Duration;

pub const CONFIG_ENV: &str = "WEBAPI_CONFIG";
pub const BASE_URL_ENV: &str = "WEBAPI_BASE_URL";
pub const TIMEOUT_ENV: &str = "WEBAPI_TIMEOUT_SECS";

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct ContextConfig {
    /// Relative request URLs are joined onto this.
    #[serde(default = "default_base_url")]
    pub base_url: String,

    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,

    /// Scheme written before the encoded credentials, e.g. `Basic`.
    #[serde(default = "default_authorization_prefix")]
    pub authorization_prefix: String,

    /// Headers present on every request before any step adds its own.
    #[serde(default)]
    pub default_headers: BTreeMap<String, String>,
}

fn default_base_url() -> String {
    "http://localhost/".to_string()
}

fn default_timeout_secs() -> u64 {
    30
}

fn default_authorization_prefix() -> String {
    "Basic".to_string()
}

impl Default for ContextConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            timeout_secs: default_timeout_secs(),
            authorization_prefix: default_authorization_prefix(),
            default_headers: BTreeMap::new(),
        }
    }
}

impl ContextConfig {
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, anyhow::Error> {
        let contents = std::fs::read_to_string(path)?;
        let config: ContextConfig = serde_yaml::from_str(&contents)?;
        config.validate()?;
        Ok(config)
    }

    /// Load from `WEBAPI_CONFIG` if set, otherwise defaults, then apply the
    /// remaining environment overrides.
    pub fn from_env() -> Result<Self, anyhow::Error> {
        let base = match std::env::var(CONFIG_ENV) {
            Ok(path) if !path.is_empty() => Self::from_file(path)?,
            _ => Self::default(),
        };
        let config = base.with_overrides(|name| std::env::var(name).ok())?;
        config.validate()?;
        Ok(config)
    }

    /// Apply overrides looked up through `lookup`.
    pub fn with_overrides<F>(mut self, lookup: F) -> Result<Self, anyhow::Error>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(base_url) = lookup(BASE_URL_ENV).filter(|v| !v.is_empty()) {
            self.base_url = base_url;
        }
        if let Some(timeout) = lookup(TIMEOUT_ENV).filter(|v| !v.is_empty()) {
            self.timeout_secs = timeout.trim().parse().map_err(|e| {
                anyhow::anyhow!("Invalid {TIMEOUT_ENV} value '{timeout}': {e}")
            })?;
        }
        Ok(self)
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<(), anyhow::Error> {
        let url = Url::parse(&self.base_url)
            .map_err(|e| anyhow::anyhow!("Invalid base_url '{}': {e}", self.base_url))?;
        if !matches!(url.scheme(), "http" | "https") {
            anyhow::bail!(
                "Unsupported base_url scheme: '{}'. Currently supported: http, https",
                url.scheme()
            );
        }

        if self.timeout_secs == 0 {
            anyhow::bail!("timeout_secs must be greater than zero");
        }

        if self.authorization_prefix.trim().is_empty() {
            anyhow::bail!("authorization_prefix must not be empty");
        }

        Ok(())
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    /// The base URL with a trailing slash so relative joins keep its path.
    pub fn base(&self) -> Result<Url, anyhow::Error> {
        let mut raw = self.base_url.clone();
        if !raw.ends_with('/') {
            raw.push('/');
        }
        Ok(Url::parse(&raw)?)
    }
}
