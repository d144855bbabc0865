use std::env;
use std::time::Duration;

use dotenvy::dotenv;
use serde::Deserialize;

use crate::error::{BrowserError, Result};
use crate::query::RoutePair;
use crate::sources::types::DEFAULT_PAGE_SIZE;

const API_URL_ENV: &str = "LISTINGS_API_URL";
const PAGE_SIZE_ENV: &str = "LISTINGS_PAGE_SIZE";
const TIMEOUT_ENV: &str = "LISTINGS_TIMEOUT_SECONDS";
const THRESHOLD_ENV: &str = "LISTINGS_SCROLL_THRESHOLD_PX";
const INTERVAL_ENV: &str = "LISTINGS_SCROLL_INTERVAL_MS";

#[derive(Deserialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub struct BrowserConfig {
    pub api_url: String,
    pub page_size: u32,
    pub request_timeout_seconds: u64,
    /// Distance in px between sentinel and viewport bottom that triggers a load
    pub scroll_threshold_px: f64,
    /// Minimum time between two sentinel distance checks
    pub scroll_interval_ms: u64,
    pub routes: RoutePair,
}

impl Default for BrowserConfig {
    fn default() -> Self {
        Self {
            api_url: "http://localhost:4000".to_string(),
            page_size: DEFAULT_PAGE_SIZE,
            request_timeout_seconds: 30,
            scroll_threshold_px: 2000.0,
            scroll_interval_ms: 500,
            routes: RoutePair::default(),
        }
    }
}

impl BrowserConfig {
    /// Defaults overridden by `LISTINGS_*` variables, reading `.env` if present
    pub fn from_env() -> Result<Self> {
        dotenv().ok();
        let mut config = Self::default();

        if let Ok(url) = env::var(API_URL_ENV) {
            config.api_url = url;
        }
        if let Some(page_size) = parse_var::<u32>(PAGE_SIZE_ENV)? {
            config.page_size = page_size;
        }
        if let Some(timeout) = parse_var(TIMEOUT_ENV)? {
            config.request_timeout_seconds = timeout;
        }
        if let Some(threshold) = parse_var(THRESHOLD_ENV)? {
            config.scroll_threshold_px = threshold;
        }
        if let Some(interval) = parse_var(INTERVAL_ENV)? {
            config.scroll_interval_ms = interval;
        }

        config.validate()?;
        Ok(config)
    }

    /// Whether a listing API was configured explicitly
    pub fn api_configured() -> bool {
        env::var(API_URL_ENV).is_ok()
    }

    pub fn validate(&self) -> Result<()> {
        if self.page_size == 0 {
            return Err(BrowserError::Config(format!("{PAGE_SIZE_ENV} must be positive")));
        }
        if self.scroll_threshold_px.is_nan() || self.scroll_threshold_px < 0.0 {
            return Err(BrowserError::Config(format!(
                "{THRESHOLD_ENV} must be a non-negative number"
            )));
        }
        Ok(())
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_seconds)
    }

    pub fn scroll_interval(&self) -> Duration {
        Duration::from_millis(self.scroll_interval_ms)
    }
}

fn parse_var<T: std::str::FromStr>(name: &str) -> Result<Option<T>> {
    match env::var(name) {
        Ok(raw) => raw
            .trim()
            .parse()
            .map(Some)
            .map_err(|_| BrowserError::Config(format!("{name}={raw:?} is not a valid value"))),
        Err(_) => Ok(None),
    }
}
