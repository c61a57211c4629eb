// ABOUTME: Parses the syncdb site configuration file
// ABOUTME: Converts TOML site definitions into validated connection specs

use crate::driver::{DbSpec, Driver};
use anyhow::{bail, Context, Result};
use serde::Deserialize;
use std::collections::HashMap;
use std::fs;

#[derive(Debug, Deserialize, Default)]
pub struct Config {
    #[serde(default)]
    sites: HashMap<String, SiteConfig>,
    #[serde(default)]
    pub sync: SyncSettings,
}

#[derive(Debug, Deserialize)]
pub struct SyncSettings {
    /// Maximum in-flight imports for the chunked strategy.
    #[serde(default = "default_concurrency")]
    pub concurrency: i64,
}

impl Default for SyncSettings {
    fn default() -> Self {
        Self {
            concurrency: default_concurrency(),
        }
    }
}

fn default_concurrency() -> i64 {
    crate::import::chunked::DEFAULT_CONCURRENCY
}

#[derive(Debug, Clone, Deserialize)]
pub struct SiteConfig {
    pub driver: String,
    pub database: String,
    #[serde(default)]
    pub user: Option<String>,
    #[serde(default)]
    pub password: Option<String>,
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default)]
    pub port: Option<u16>,
    /// SSH destination for sites on another machine, e.g. "deploy@prod".
    #[serde(default)]
    pub remote_host: Option<String>,
    /// Explicit data-table list. When set it is dumped verbatim; otherwise
    /// every table not listed below is a data table.
    #[serde(default)]
    pub data_tables: Option<Vec<String>>,
    /// Tables dumped with schema but no rows (caches, sessions, logs).
    #[serde(default)]
    pub structure_tables: Vec<String>,
    /// Tables left out of the dump entirely.
    #[serde(default)]
    pub skip_tables: Vec<String>,
    /// Overrides the resolved staging directory when set.
    #[serde(default)]
    pub staging_dir: Option<String>,
}

fn default_host() -> String {
    "localhost".to_string()
}

impl Config {
    pub fn load(path: &str) -> Result<Config> {
        let raw = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file at {}", path))?;
        toml::from_str(&raw).with_context(|| format!("Failed to parse TOML config at {}", path))
    }

    pub fn site(&self, name: &str) -> Result<&SiteConfig> {
        match self.sites.get(name) {
            Some(site) => Ok(site),
            None => {
                let mut known: Vec<&str> = self.sites.keys().map(String::as_str).collect();
                known.sort_unstable();
                bail!(
                    "No site named '{}' in config (known sites: {})",
                    name,
                    if known.is_empty() {
                        "none".to_string()
                    } else {
                        known.join(", ")
                    }
                )
            }
        }
    }
}

impl SiteConfig {
    /// Resolve the connection spec, rejecting an unsupported driver or an
    /// empty database name before any work starts.
    pub fn db_spec(&self) -> Result<DbSpec> {
        let driver = Driver::from_name(&self.driver)?;

        if self.database.trim().is_empty() {
            bail!("Site database name cannot be empty");
        }

        Ok(DbSpec {
            driver,
            database: self.database.clone(),
            user: self.user.clone(),
            password: self.password.clone(),
            host: self.host.clone(),
            port: self.port.unwrap_or_else(|| driver.default_port()),
            remote_host: self.remote_host.clone(),
        })
    }
}
