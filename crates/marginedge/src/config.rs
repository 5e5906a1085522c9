//! Environment configuration for the `marginedge` binary.
//!
//! Variables are read from the process environment after `.env` has been
//! loaded by the binary. [`MarginEdgeEnv::from_lookup`] takes any lookup
//! function so parsing can be exercised without touching the real
//! environment.

use crate::api::ClientConfig;
use crate::api::transport::MARGINEDGE_BASE_URL;
use thiserror::Error;

pub const API_KEY_VAR: &str = "MARGINEDGE_API_KEY";
pub const RESTAURANT_UNIT_VAR: &str = "RESTAURANT_UNIT_ID";
pub const BASE_URL_VAR: &str = "MARGINEDGE_BASE_URL";

/// Configuration failures.
#[derive(Debug, Error, PartialEq)]
pub enum ConfigError {
    /// A required variable is unset or blank.
    #[error("{0} environment variable is not set")]
    Missing(&'static str),

    #[error("invalid value for {var}: {reason}")]
    Invalid { var: &'static str, reason: String },
}

/// Credentials and target unit for the MarginEdge API.
#[derive(Debug, Clone, PartialEq)]
pub struct MarginEdgeEnv {
    pub api_key: String,
    pub restaurant_unit_id: String,
    pub base_url: String,
}

impl MarginEdgeEnv {
    /// Read from the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|var| std::env::var(var).ok())
    }

    /// Read through `lookup`. Blank values count as unset.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let get = |var: &str| lookup(var).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());

        let api_key = get(API_KEY_VAR).ok_or(ConfigError::Missing(API_KEY_VAR))?;
        let restaurant_unit_id =
            get(RESTAURANT_UNIT_VAR).ok_or(ConfigError::Missing(RESTAURANT_UNIT_VAR))?;
        let base_url = match get(BASE_URL_VAR) {
            Some(url) if url.starts_with("http://") || url.starts_with("https://") => {
                url.trim_end_matches('/').to_string()
            }
            Some(url) => {
                return Err(ConfigError::Invalid {
                    var: BASE_URL_VAR,
                    reason: format!("'{url}' is not an http(s) URL"),
                });
            }
            None => MARGINEDGE_BASE_URL.to_string(),
        };

        Ok(Self {
            api_key,
            restaurant_unit_id,
            base_url,
        })
    }

    /// Client settings for these credentials.
    pub fn client_config(&self) -> ClientConfig {
        ClientConfig::new(self.api_key.clone()).with_base_url(self.base_url.clone())
    }
}
