//! Runtime configuration, read from the environment at startup.

use anyhow::{Context, Result, bail};
use std::net::SocketAddr;
use std::thread;
use std::time::Duration;

const DEFAULT_BASE_URL: &str = "https://hacker-news.firebaseio.com";
const DEFAULT_BIND_ADDR: &str = "0.0.0.0:8080";
const DEFAULT_REFRESH_MINUTES: u64 = 5;

/// Service configuration. Every variable is optional and falls back to a
/// default that works against the real upstream.
#[derive(Debug, Clone)]
pub struct Config {
    /// How often a refresh cycle runs (`REFRESH_INTERVAL_MINUTES`, default 5).
    pub refresh_interval: Duration,
    /// Most detail fetches allowed in flight at once
    /// (`MAX_CONCURRENT_FETCHES`, default: available processing units).
    pub max_concurrent_fetches: usize,
    /// Upstream API base URL (`HN_BASE_URL`).
    pub base_url: String,
    /// Address the HTTP server listens on (`BIND_ADDR`).
    pub bind_addr: SocketAddr,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(get: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let minutes = match get("REFRESH_INTERVAL_MINUTES") {
            Some(raw) => raw
                .parse::<u64>()
                .context("REFRESH_INTERVAL_MINUTES must be a whole number of minutes")?,
            None => DEFAULT_REFRESH_MINUTES,
        };
        if minutes == 0 {
            bail!("REFRESH_INTERVAL_MINUTES must be at least 1");
        }

        let max_concurrent_fetches = match get("MAX_CONCURRENT_FETCHES") {
            Some(raw) => raw
                .parse::<usize>()
                .context("MAX_CONCURRENT_FETCHES must be a positive integer")?,
            None => default_parallelism(),
        };
        if max_concurrent_fetches == 0 {
            bail!("MAX_CONCURRENT_FETCHES must be at least 1");
        }

        let base_url = get("HN_BASE_URL").unwrap_or_else(|| DEFAULT_BASE_URL.to_string());

        let bind_addr = get("BIND_ADDR")
            .unwrap_or_else(|| DEFAULT_BIND_ADDR.to_string())
            .parse()
            .context("BIND_ADDR must be a socket address like 0.0.0.0:8080")?;

        Ok(Self {
            refresh_interval: Duration::from_secs(minutes * 60),
            max_concurrent_fetches,
            base_url,
            bind_addr,
        })
    }
}

fn default_parallelism() -> usize {
    thread::available_parallelism().map(|n| n.get()).unwrap_or(1)
}
