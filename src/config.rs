use serde::Deserialize;
use std::env;
use thiserror::Error;

/// Resolvers used for MX verification when none are configured
pub const DEFAULT_DNS_SERVERS: &[&str] = &["208.67.222.222", "208.67.220.220", "1.1.1.1"];

/// Well known providers that skip MX verification when none are configured
pub const DEFAULT_BYPASS_DOMAINS: &[&str] =
    &["gmail.com", "yahoo.com", "live.com", "outlook.com", "aol.com"];

pub const DEFAULT_CACHE_HOURS: u32 = 24;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("{0} environment variable not set")]
    Missing(&'static str),
    #[error("invalid value for {name}: '{value}'")]
    Invalid { name: &'static str, value: String },
}

/// # MX Verification Settings
///
/// Either list may be left empty, in which case the built-in defaults are
/// used for that list only.
///
/// ## Environment
/// - `MX_DNS_SERVERS`: comma-separated resolver IPs
/// - `MX_BYPASS_DOMAINS`: comma-separated domains that skip verification
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct MxConfig {
    pub dns_servers: Vec<String>,
    pub bypass_domains: Vec<String>,
}

impl MxConfig {
    /// Reads the settings from the environment (and `.env`, if present).
    pub fn from_env() -> Self {
        dotenv::dotenv().ok();
        Self::from_vars(|name| env::var(name).ok())
    }

    fn from_vars<F>(var: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        Self {
            dns_servers: var("MX_DNS_SERVERS")
                .map(|value| split_list(&value))
                .unwrap_or_default(),
            bypass_domains: var("MX_BYPASS_DOMAINS")
                .map(|value| split_list(&value))
                .unwrap_or_default(),
        }
    }

    /// Configured servers, or the defaults if none are configured
    pub fn effective_dns_servers(&self) -> Vec<String> {
        or_defaults(&self.dns_servers, DEFAULT_DNS_SERVERS)
    }

    /// Configured bypass domains, or the defaults if none are configured
    pub fn effective_bypass_domains(&self) -> Vec<String> {
        or_defaults(&self.bypass_domains, DEFAULT_BYPASS_DOMAINS)
    }
}

/// # Temporary Service List Settings
///
/// ## Environment
/// - `DISPOSABLE_LIST_URL` (required): newline-delimited domain list
/// - `DISPOSABLE_CACHE_HOURS` (optional, default 24): hours before re-download
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct DisposableListConfig {
    pub list_url: String,
    #[serde(default = "default_cache_hours")]
    pub cache_hours: u32,
}

impl DisposableListConfig {
    pub fn new(list_url: impl Into<String>, cache_hours: u32) -> Self {
        Self {
            list_url: list_url.into(),
            cache_hours,
        }
    }

    /// Reads the settings from the environment (and `.env`, if present).
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenv::dotenv().ok();
        Self::from_vars(|name| env::var(name).ok())
    }

    fn from_vars<F>(var: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let list_url = var("DISPOSABLE_LIST_URL")
            .filter(|url| !url.trim().is_empty())
            .ok_or(ConfigError::Missing("DISPOSABLE_LIST_URL"))?;

        let cache_hours = match var("DISPOSABLE_CACHE_HOURS") {
            Some(value) => value
                .trim()
                .parse::<u32>()
                .map_err(|_| ConfigError::Invalid {
                    name: "DISPOSABLE_CACHE_HOURS",
                    value,
                })?,
            None => DEFAULT_CACHE_HOURS,
        };

        Ok(Self::new(list_url.trim(), cache_hours))
    }
}

fn default_cache_hours() -> u32 {
    DEFAULT_CACHE_HOURS
}

fn split_list(value: &str) -> Vec<String> {
    value
        .split(',')
        .map(str::trim)
        .filter(|item| !item.is_empty())
        .map(str::to_string)
        .collect()
}

fn or_defaults(configured: &[String], defaults: &[&str]) -> Vec<String> {
    if configured.is_empty() {
        defaults.iter().map(|item| item.to_string()).collect()
    } else {
        configured.to_vec()
    }
}
