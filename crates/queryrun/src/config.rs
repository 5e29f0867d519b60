//! # Client Configuration
//!
//! Loaded from TOML:
//!
//! ```toml
//! authority = "ed0120...@wonderland"
//! default_fetch_size = 100
//! log_filter = "queryrun=debug"
//! ```
//!
//! Only `authority` is required.

use std::num::NonZeroU64;
use std::path::Path;

use querywire::AccountId;
use serde::Deserialize;
use serde::Deserializer;

use crate::error::Error;
use crate::error::Result;

pub const DEFAULT_LOG_FILTER: &str = "queryrun=info";

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ClientConfig {
    /// The account every request is made on behalf of.
    #[serde(deserialize_with = "account_from_text")]
    pub authority: AccountId,
    /// Batch size applied to queries that do not set one.
    #[serde(default)]
    pub default_fetch_size: Option<NonZeroU64>,
    #[serde(default = "default_log_filter")]
    pub log_filter: String,
}

fn default_log_filter() -> String {
    DEFAULT_LOG_FILTER.to_owned()
}

fn account_from_text<'de, D: Deserializer<'de>>(de: D) -> std::result::Result<AccountId, D::Error> {
    let text = String::deserialize(de)?;
    text.parse().map_err(serde::de::Error::custom)
}

impl ClientConfig {
    pub fn new(authority: AccountId) -> Self {
        Self {
            authority,
            default_fetch_size: None,
            log_filter: default_log_filter(),
        }
    }

    pub fn from_toml_str(text: &str) -> Result<Self> {
        toml::from_str(text).map_err(|e| Error::Config(e.to_string()))
    }

    pub fn from_path(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path)
            .map_err(|e| Error::Config(format!("{}: {}", path.display(), e)))?;
        Self::from_toml_str(&text)
    }
}
