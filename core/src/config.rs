//! Store configuration.

use serde::Deserialize;

use crate::error::ConfigError;

pub const DEFAULT_BASE_URL: &str = "https://dummyjson.com";
pub const DEFAULT_STORE_KEY: &str = "todo";
/// Owner tag attached to todos created by this client.
pub const DEFAULT_USER_ID: u64 = 5;
pub const DEFAULT_PAGE_SIZE: usize = 9;

#[derive(Deserialize, Debug, Clone, PartialEq, Eq)]
#[serde(default)]
pub struct StoreConfig {
    pub base_url: String,
    /// Key under which the persisted subset is stored.
    pub store_key: String,
    pub user_id: u64,
    /// Used until a persisted page size is loaded.
    pub page_size: usize,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            store_key: DEFAULT_STORE_KEY.to_string(),
            user_id: DEFAULT_USER_ID,
            page_size: DEFAULT_PAGE_SIZE,
        }
    }
}

impl StoreConfig {
    /// Defaults overridden by `TODO_API_URL`, `TODO_STORE_KEY`,
    /// `TODO_USER_ID` and `TODO_PAGE_SIZE` when set.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let mut config = Self::default();
        if let Some(url) = lookup("TODO_API_URL") {
            config.base_url = url;
        }
        if let Some(key) = lookup("TODO_STORE_KEY") {
            config.store_key = key;
        }
        if let Some(raw) = lookup("TODO_USER_ID") {
            config.user_id = raw.trim().parse().map_err(|_| ConfigError::InvalidValue {
                name: "TODO_USER_ID",
                value: raw.clone(),
            })?;
        }
        if let Some(raw) = lookup("TODO_PAGE_SIZE") {
            config.page_size = raw
                .trim()
                .parse()
                .ok()
                .filter(|size| *size >= 1)
                .ok_or_else(|| ConfigError::InvalidValue {
                    name: "TODO_PAGE_SIZE",
                    value: raw.clone(),
                })?;
        }
        Ok(config)
    }
}
