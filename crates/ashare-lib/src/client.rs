//! Throttled HTTP client for the upstream quote endpoints.
//!
//! All market data comes from Eastmoney's public JSON services: push2 for
//! real-time list snapshots, push2his for per-stock fund-flow history, and
//! datacenter-web for F10 holding reports. The endpoints are unauthenticated
//! but rate-limited by IP, so every request goes through a shared spacing
//! gate before it leaves the process.

use std::env;
use std::time::Duration;

use reqwest::Client;
use serde_json::Value;
use tokio::sync::Mutex;
use tokio::time::Instant;
use tracing::debug;

use crate::error::{Error, Result};

const PUSH2_BASE_ENV: &str = "ASHARE_PUSH2_BASE_URL";
const PUSH2HIS_BASE_ENV: &str = "ASHARE_PUSH2HIS_BASE_URL";
const DATACENTER_BASE_ENV: &str = "ASHARE_DATACENTER_BASE_URL";
const REQUEST_INTERVAL_ENV: &str = "ASHARE_MIN_REQUEST_INTERVAL_MS";

const DEFAULT_PUSH2_BASE: &str = "https://push2.eastmoney.com";
const DEFAULT_PUSH2HIS_BASE: &str = "https://push2his.eastmoney.com";
const DEFAULT_DATACENTER_BASE: &str = "https://datacenter-web.eastmoney.com";

/// Minimum spacing between upstream requests. The upstream services ban IPs
/// that hammer them; 200 ms matches what the public client libraries use.
const DEFAULT_REQUEST_INTERVAL: Duration = Duration::from_millis(200);

/// Configuration for a [`QuoteClient`], resolved from the environment by
/// default so tests can point the client at a local stub server.
#[derive(Debug, Clone)]
pub struct ClientConfig {
    pub push2_base: String,
    pub push2his_base: String,
    pub datacenter_base: String,
    pub min_request_interval: Duration,
}

impl ClientConfig {
    /// Resolve configuration from environment variables, falling back to the
    /// production endpoints and default spacing.
    pub fn from_env() -> Self {
        let interval = env::var(REQUEST_INTERVAL_ENV)
            .ok()
            .and_then(|raw| raw.parse::<u64>().ok())
            .map(Duration::from_millis)
            .unwrap_or(DEFAULT_REQUEST_INTERVAL);

        Self {
            push2_base: env::var(PUSH2_BASE_ENV).unwrap_or_else(|_| DEFAULT_PUSH2_BASE.into()),
            push2his_base: env::var(PUSH2HIS_BASE_ENV)
                .unwrap_or_else(|_| DEFAULT_PUSH2HIS_BASE.into()),
            datacenter_base: env::var(DATACENTER_BASE_ENV)
                .unwrap_or_else(|_| DEFAULT_DATACENTER_BASE.into()),
            min_request_interval: interval,
        }
    }
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            push2_base: DEFAULT_PUSH2_BASE.into(),
            push2his_base: DEFAULT_PUSH2HIS_BASE.into(),
            datacenter_base: DEFAULT_DATACENTER_BASE.into(),
            min_request_interval: DEFAULT_REQUEST_INTERVAL,
        }
    }
}

/// Async client over the upstream quote services with request spacing.
pub struct QuoteClient {
    http: Client,
    config: ClientConfig,
    last_request: Mutex<Option<Instant>>,
}

impl QuoteClient {
    /// Build a client from environment configuration.
    pub fn new() -> Result<Self> {
        Self::with_config(ClientConfig::from_env())
    }

    /// Build a client with explicit configuration.
    pub fn with_config(config: ClientConfig) -> Result<Self> {
        let http = Client::builder()
            .timeout(Duration::from_secs(30))
            .user_agent(user_agent())
            .build()
            .map_err(Error::Http)?;

        Ok(Self {
            http,
            config,
            last_request: Mutex::new(None),
        })
    }

    pub(crate) fn push2_base(&self) -> &str {
        &self.config.push2_base
    }

    pub(crate) fn push2his_base(&self) -> &str {
        &self.config.push2his_base
    }

    pub(crate) fn datacenter_base(&self) -> &str {
        &self.config.datacenter_base
    }

    /// Wait until the spacing gate allows the next request.
    async fn throttle(&self) {
        let mut last = self.last_request.lock().await;
        if let Some(previous) = *last {
            let elapsed = previous.elapsed();
            if elapsed < self.config.min_request_interval {
                tokio::time::sleep(self.config.min_request_interval - elapsed).await;
            }
        }
        *last = Some(Instant::now());
    }

    /// Issue a throttled GET and decode the body as JSON.
    pub(crate) async fn get_json(&self, url: &str, params: &[(&str, &str)]) -> Result<Value> {
        self.throttle().await;
        debug!(url, "fetching upstream payload");

        let response = self
            .http
            .get(url)
            .query(params)
            .send()
            .await?
            .error_for_status()?;

        Ok(response.json::<Value>().await?)
    }
}

fn user_agent() -> String {
    format!(
        "ashare-lib/{version} ({repo})",
        version = env!("CARGO_PKG_VERSION"),
        repo = "https://github.com/ashare-rs/ashare-rs"
    )
}
