//! Configuration loading and representation.

use anyhow::{Context, bail};
use serde::{Deserialize, Serialize};

use miniforge_catalog::DEFAULT_PAGE_SIZE;
use miniforge_observability::LogFormat;

pub const ENV_PAGE_SIZE: &str = "MINIFORGE_PAGE_SIZE";
pub const ENV_REFRESH_AFTER_MUTATION: &str = "MINIFORGE_REFRESH_AFTER_MUTATION";
pub const ENV_LOG_FORMAT: &str = "MINIFORGE_LOG_FORMAT";

/// Catalog runtime settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CatalogConfig {
    /// Cards per page; one value shared by every caller.
    pub page_size: usize,
    /// Re-read the catalog from the store after a successful join/leave
    /// instead of patching the local snapshot.
    pub refresh_after_mutation: bool,
    pub log_format: LogFormat,
}

impl Default for CatalogConfig {
    fn default() -> Self {
        Self {
            page_size: DEFAULT_PAGE_SIZE,
            refresh_after_mutation: true,
            log_format: LogFormat::default(),
        }
    }
}

impl CatalogConfig {
    pub fn validate(&self) -> anyhow::Result<()> {
        if self.page_size == 0 {
            bail!("page_size must be greater than zero");
        }
        Ok(())
    }

    /// Parse a JSON document; missing keys keep their defaults.
    pub fn from_json_str(raw: &str) -> anyhow::Result<Self> {
        let config: Self = serde_json::from_str(raw).context("failed to parse catalog config")?;
        config.validate().context("invalid catalog config")?;
        Ok(config)
    }

    /// Read overrides from `MINIFORGE_*` environment variables.
    ///
    /// Invalid values are logged and the default is kept.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let mut config = Self::default();

        if let Some(raw) = lookup(ENV_PAGE_SIZE) {
            match raw.trim().parse::<usize>() {
                Ok(size) if size > 0 => config.page_size = size,
                _ => tracing::warn!(
                    value = %raw,
                    default = config.page_size,
                    "{ENV_PAGE_SIZE} is not a positive integer; using default"
                ),
            }
        }

        if let Some(raw) = lookup(ENV_REFRESH_AFTER_MUTATION) {
            match raw.trim().to_ascii_lowercase().as_str() {
                "1" | "true" | "yes" => config.refresh_after_mutation = true,
                "0" | "false" | "no" => config.refresh_after_mutation = false,
                _ => tracing::warn!(
                    value = %raw,
                    "{ENV_REFRESH_AFTER_MUTATION} is not a boolean; using default"
                ),
            }
        }

        if let Some(raw) = lookup(ENV_LOG_FORMAT) {
            match raw.parse::<LogFormat>() {
                Ok(format) => config.log_format = format,
                Err(err) => tracing::warn!(error = %err, "{ENV_LOG_FORMAT} invalid; using default"),
            }
        }

        config
    }

    /// Install the process-wide subscriber in the configured format.
    pub fn init_logging(&self) {
        miniforge_observability::init_with(self.log_format);
    }
}
