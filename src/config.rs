//! Client configuration
//!
//! A [`ClientConfig`] is created once, validated, and read-only afterwards.
//! It can be assembled with the builder or deserialized from YAML:
//!
//! ```yaml
//! subdomain: school
//! token: "1234~abcd"
//! cache_dir: ./raw
//! quota:
//!   capacity: 700
//!   refill_rate: 10
//!   preflight_reserve: 50
//! ```

use reqwest::header::HeaderValue;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};
use std::time::Duration;
use url::Url;

use crate::error::{Error, Result};
use crate::http::QuotaConfig;

/// Configuration for a [`CanvasClient`](crate::CanvasClient)
#[derive(Clone, Serialize, Deserialize)]
pub struct ClientConfig {
    /// Institution subdomain, as in `{subdomain}.instructure.com`
    #[serde(default)]
    pub subdomain: String,

    /// API access token sent as a bearer credential
    pub token: String,

    /// Override for the API base URL (defaults to the instructure.com URL)
    #[serde(default)]
    pub base_url: Option<String>,

    /// Root folder for raw response caching; disabled when unset
    #[serde(default)]
    pub cache_dir: Option<PathBuf>,

    /// Quota tracking parameters
    #[serde(default)]
    pub quota: QuotaConfig,

    /// Per-exchange timeout
    #[serde(default = "default_timeout", with = "duration_secs")]
    pub timeout: Duration,

    /// User agent string
    #[serde(default = "default_user_agent")]
    pub user_agent: String,

    /// Maximum redirect hops followed per exchange
    #[serde(default = "default_max_redirects")]
    pub max_redirects: u32,
}

fn default_timeout() -> Duration {
    Duration::from_secs(30)
}

fn default_user_agent() -> String {
    format!("canvas-api/{}", env!("CARGO_PKG_VERSION"))
}

fn default_max_redirects() -> u32 {
    10
}

mod duration_secs {
    use serde::{Deserialize, Deserializer, Serializer};
    use std::time::Duration;

    pub fn serialize<S: Serializer>(value: &Duration, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_f64(value.as_secs_f64())
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Duration, D::Error> {
        let secs = f64::deserialize(deserializer)?;
        Duration::try_from_secs_f64(secs).map_err(serde::de::Error::custom)
    }
}

impl ClientConfig {
    /// Create a config for `{subdomain}.instructure.com`
    pub fn new(subdomain: impl Into<String>, token: impl Into<String>) -> Self {
        Self {
            subdomain: subdomain.into(),
            token: token.into(),
            base_url: None,
            cache_dir: None,
            quota: QuotaConfig::default(),
            timeout: default_timeout(),
            user_agent: default_user_agent(),
            max_redirects: default_max_redirects(),
        }
    }

    /// Create a new config builder
    pub fn builder(subdomain: impl Into<String>, token: impl Into<String>) -> ClientConfigBuilder {
        ClientConfigBuilder {
            config: Self::new(subdomain, token),
        }
    }

    /// Load a config from a YAML string
    pub fn from_yaml_str(yaml: &str) -> Result<Self> {
        let config: Self = serde_yaml::from_str(yaml)?;
        config.validate()?;
        Ok(config)
    }

    /// Load a config from a YAML file
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|e| {
            Error::config(format!(
                "Failed to read config file '{}': {e}",
                path.display()
            ))
        })?;
        Self::from_yaml_str(&content)
    }

    /// The effective API base URL, always ending in `/`
    pub fn api_base(&self) -> Result<Url> {
        let raw = match &self.base_url {
            Some(base) => base.clone(),
            None => format!("https://{}.instructure.com/api/v1/", self.subdomain),
        };
        let raw = if raw.ends_with('/') {
            raw
        } else {
            format!("{raw}/")
        };
        Ok(Url::parse(&raw)?)
    }

    /// Check the config for values the client cannot work with
    pub fn validate(&self) -> Result<()> {
        if self.base_url.is_none() {
            if self.subdomain.is_empty() {
                return Err(Error::invalid_value("subdomain", "cannot be empty"));
            }
            if !self
                .subdomain
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '-')
            {
                return Err(Error::invalid_value(
                    "subdomain",
                    "must contain only letters, digits and '-'",
                ));
            }
        }
        if self.token.is_empty() {
            return Err(Error::invalid_value("token", "cannot be empty"));
        }
        if HeaderValue::from_str(&format!("Bearer {}", self.token)).is_err() {
            return Err(Error::invalid_value(
                "token",
                "contains characters not allowed in a header",
            ));
        }
        if self.timeout.is_zero() {
            return Err(Error::invalid_value("timeout", "must be positive"));
        }
        self.quota.validate()?;
        let base = self.api_base()?;
        if base.cannot_be_a_base() || base.host_str().is_none() {
            return Err(Error::invalid_value("base_url", "must be an absolute URL with a host"));
        }
        Ok(())
    }
}

impl fmt::Debug for ClientConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ClientConfig")
            .field("subdomain", &self.subdomain)
            .field("token", &"<redacted>")
            .field("base_url", &self.base_url)
            .field("cache_dir", &self.cache_dir)
            .field("quota", &self.quota)
            .field("timeout", &self.timeout)
            .field("user_agent", &self.user_agent)
            .field("max_redirects", &self.max_redirects)
            .finish()
    }
}

/// Builder for [`ClientConfig`]
#[derive(Debug)]
pub struct ClientConfigBuilder {
    config: ClientConfig,
}

impl ClientConfigBuilder {
    /// Override the API base URL
    #[must_use]
    pub fn base_url(mut self, url: impl Into<String>) -> Self {
        self.config.base_url = Some(url.into());
        self
    }

    /// Enable raw response caching under `dir`
    #[must_use]
    pub fn cache_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.config.cache_dir = Some(dir.into());
        self
    }

    /// Set quota tracking parameters
    #[must_use]
    pub fn quota(mut self, quota: QuotaConfig) -> Self {
        self.config.quota = quota;
        self
    }

    /// Set the per-exchange timeout
    #[must_use]
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.config.timeout = timeout;
        self
    }

    /// Set user agent
    #[must_use]
    pub fn user_agent(mut self, agent: impl Into<String>) -> Self {
        self.config.user_agent = agent.into();
        self
    }

    /// Set the redirect hop limit
    #[must_use]
    pub fn max_redirects(mut self, limit: u32) -> Self {
        self.config.max_redirects = limit;
        self
    }

    /// Validate and build the config
    pub fn build(self) -> Result<ClientConfig> {
        self.config.validate()?;
        Ok(self.config)
    }
}
