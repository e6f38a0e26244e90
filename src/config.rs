//! Configuration management for docgate.
//!
//! Settings come from an optional YAML file, overridden by environment
//! variables of the form `DOCGATE__<SECTION>__<KEY>` (for example
//! `DOCGATE__RATE_LIMITING__REQUESTS_PER_UNIT=5`).

use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::info;

use crate::client::DEFAULT_ENDPOINT;
use crate::error::{DocgateError, Result};
use crate::ratelimit::{Quota, TimeUnit};

/// Main configuration for docgate.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DocgateConfig {
    /// Document API configuration
    #[serde(default)]
    pub api: ApiConfig,

    /// Rate limiting configuration
    #[serde(default)]
    pub rate_limiting: RateLimitingConfig,
}

/// Document API configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiConfig {
    /// Create-document endpoint URL
    #[serde(default = "default_endpoint")]
    pub endpoint: String,

    /// Per-call HTTP timeout in milliseconds
    #[serde(default = "default_request_timeout")]
    pub request_timeout_ms: u64,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            endpoint: default_endpoint(),
            request_timeout_ms: default_request_timeout(),
        }
    }
}

fn default_endpoint() -> String {
    DEFAULT_ENDPOINT.to_string()
}

fn default_request_timeout() -> u64 {
    30_000
}

/// Rate limiting configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RateLimitingConfig {
    /// Calls allowed per window
    #[serde(default = "default_requests_per_unit")]
    pub requests_per_unit: u32,

    /// Unit the window is measured in
    #[serde(default = "default_unit")]
    pub unit: TimeUnit,

    /// Window length, in `unit`s
    #[serde(default = "default_units")]
    pub units: u32,

    /// Optional cap on calls running at the same time
    #[serde(default)]
    pub max_in_flight: Option<usize>,

    /// Optional limit on how long a caller waits for admission
    #[serde(default)]
    pub acquire_timeout_ms: Option<u64>,
}

impl Default for RateLimitingConfig {
    fn default() -> Self {
        Self {
            requests_per_unit: default_requests_per_unit(),
            unit: default_unit(),
            units: default_units(),
            max_in_flight: None,
            acquire_timeout_ms: None,
        }
    }
}

fn default_requests_per_unit() -> u32 {
    10
}

fn default_unit() -> TimeUnit {
    TimeUnit::Second
}

fn default_units() -> u32 {
    1
}

impl RateLimitingConfig {
    /// Validate into a [`Quota`].
    pub fn quota(&self) -> Result<Quota> {
        Quota::per_units(self.unit, self.units, self.requests_per_unit)
    }
}

impl DocgateConfig {
    /// Load configuration from an optional YAML file plus `DOCGATE__*`
    /// environment overrides.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let mut builder = config::Config::builder();

        if let Some(path) = path {
            info!(path = %path.display(), "Loading configuration file");
            builder = builder.add_source(
                config::File::from(path).format(config::FileFormat::Yaml),
            );
        }

        let config = builder
            .add_source(
                config::Environment::with_prefix("DOCGATE")
                    .prefix_separator("__")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        let config: DocgateConfig = config.try_deserialize()?;
        config.validate()?;
        Ok(config)
    }

    /// Load configuration from a YAML string.
    pub fn from_yaml(yaml: &str) -> Result<Self> {
        let config: DocgateConfig = serde_yaml::from_str(yaml)
            .map_err(|e| DocgateError::Config(format!("Failed to parse config: {}", e)))?;
        config.validate()?;
        Ok(config)
    }

    /// Render the configuration as YAML.
    pub fn to_yaml(&self) -> Result<String> {
        serde_yaml::to_string(self).map_err(|e| DocgateError::Config(e.to_string()))
    }

    fn validate(&self) -> Result<()> {
        self.rate_limiting.quota()?;
        if self.rate_limiting.max_in_flight == Some(0) {
            return Err(DocgateError::InvalidConfiguration(
                "max_in_flight must be greater than zero".to_string(),
            ));
        }
        Ok(())
    }
}
