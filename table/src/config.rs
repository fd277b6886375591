//! Connection settings for the hosted table

use crate::error::{Result, TableError};
use std::time::Duration;

/// Environment variable holding the project URL
pub const URL_VAR: &str = "SUPABASE_URL";
/// Environment variable holding the anonymous API key
pub const KEY_VAR: &str = "SUPABASE_ANON_KEY";
/// Environment variable overriding the table name
pub const TABLE_VAR: &str = "TODO_TABLE";
/// Table used when none is configured
pub const DEFAULT_TABLE: &str = "TodoList";
/// Time allowed for one request, response body included
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

/// Where the task table lives and how to authenticate
#[derive(Clone, PartialEq, Eq)]
pub struct TableConfig {
    /// Project URL, e.g. `https://xyz.supabase.co`
    pub url: String,
    /// Anonymous (public) API key
    pub api_key: String,
    /// Table name
    pub table: String,
    /// Per-request timeout; an expired request fails like any other
    pub timeout: Duration,
}

impl TableConfig {
    /// Config for the default table
    #[must_use]
    pub fn new(url: impl Into<String>, api_key: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            api_key: api_key.into(),
            table: DEFAULT_TABLE.to_string(),
            timeout: DEFAULT_TIMEOUT,
        }
    }

    /// Use a different table
    #[must_use]
    pub fn with_table(mut self, table: impl Into<String>) -> Self {
        self.table = table.into();
        self
    }

    /// Give up on requests after `timeout`
    #[must_use]
    pub const fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Read settings from `SUPABASE_URL`, `SUPABASE_ANON_KEY` and `TODO_TABLE`
    ///
    /// # Errors
    ///
    /// Returns [`TableError::MissingConfig`] if the URL or key is unset.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Read settings through an arbitrary lookup function
    ///
    /// Empty values count as unset.
    ///
    /// # Errors
    ///
    /// Returns [`TableError::MissingConfig`] if the URL or key is unset.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |name: &str| lookup(name).filter(|v| !v.trim().is_empty());

        let url = get(URL_VAR).ok_or(TableError::MissingConfig(URL_VAR))?;
        let api_key = get(KEY_VAR).ok_or(TableError::MissingConfig(KEY_VAR))?;
        let table = get(TABLE_VAR).unwrap_or_else(|| DEFAULT_TABLE.to_string());

        Ok(Self {
            url,
            api_key,
            table,
            timeout: DEFAULT_TIMEOUT,
        })
    }

    /// REST endpoint of the configured table
    #[must_use]
    pub fn endpoint(&self) -> String {
        format!("{}/rest/v1/{}", self.url.trim_end_matches('/'), self.table)
    }
}

// Keep the key out of logs.
impl std::fmt::Debug for TableConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TableConfig")
            .field("url", &self.url)
            .field("api_key", &"<redacted>")
            .field("table", &self.table)
            .field("timeout", &self.timeout)
            .finish()
    }
}
