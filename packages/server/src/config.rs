use anyhow::{bail, Context, Result};
use dotenvy::dotenv;
use std::env;
use std::str::FromStr;
use std::time::Duration;

use llama_cloud_client::DEFAULT_BASE_URL;

/// Application configuration loaded from environment variables
#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    pub db_max_connections: u32,
    pub host: String,
    pub port: u16,
    pub llama_cloud_api_key: String,
    pub llama_cloud_base_url: String,
    /// Empty means any origin
    pub allowed_origins: Vec<String>,
    pub extraction_timeout: Duration,
    pub extraction_poll_interval: Duration,
    pub ws_send_timeout: Duration,
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self> {
        // Load .env file if present (development)
        let _ = dotenv();

        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build from an arbitrary key lookup.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let extraction_timeout =
            Duration::from_secs(parse_or(&lookup, "EXTRACTION_TIMEOUT_SECS", 120u64)?);
        let extraction_poll_interval =
            Duration::from_millis(parse_or(&lookup, "EXTRACTION_POLL_INTERVAL_MS", 2000u64)?);
        if extraction_timeout.is_zero() || extraction_poll_interval.is_zero() {
            bail!("EXTRACTION_TIMEOUT_SECS and EXTRACTION_POLL_INTERVAL_MS must be greater than zero");
        }

        Ok(Self {
            database_url: lookup("DATABASE_URL").context("DATABASE_URL must be set")?,
            db_max_connections: parse_or(&lookup, "DB_MAX_CONNECTIONS", 10)?,
            host: lookup("HOST").unwrap_or_else(|| "0.0.0.0".to_string()),
            port: parse_or(&lookup, "PORT", 8000)?,
            llama_cloud_api_key: lookup("LLAMA_CLOUD_API_KEY")
                .context("LLAMA_CLOUD_API_KEY must be set")?,
            llama_cloud_base_url: lookup("LLAMA_CLOUD_BASE_URL")
                .unwrap_or_else(|| DEFAULT_BASE_URL.to_string()),
            allowed_origins: parse_origins(
                &lookup("ALLOWED_ORIGINS").unwrap_or_else(|| "*".to_string()),
            ),
            extraction_timeout,
            extraction_poll_interval,
            ws_send_timeout: Duration::from_millis(parse_or(&lookup, "WS_SEND_TIMEOUT_MS", 5000u64)?),
        })
    }

    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

fn parse_or<T>(lookup: &impl Fn(&str) -> Option<String>, key: &str, default: T) -> Result<T>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match lookup(key) {
        Some(raw) => raw
            .trim()
            .parse()
            .with_context(|| format!("{key} must be a valid number, got {raw:?}")),
        None => Ok(default),
    }
}

fn parse_origins(raw: &str) -> Vec<String> {
    let origins: Vec<String> = raw
        .split(',')
        .map(str::trim)
        .filter(|o| !o.is_empty())
        .map(String::from)
        .collect();

    if origins.iter().any(|o| o == "*") {
        Vec::new()
    } else {
        origins
    }
}
