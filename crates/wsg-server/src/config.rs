use std::time::Duration;

use wsg_common::http::PageClientConfig;

use crate::error::AppError;

pub const DEFAULT_GREEN_CHECK_URL: &str =
    "https://api.thegreenwebfoundation.org/api/v3/greencheck";

/// Application configuration loaded explicitly from environment variables.
///
/// Everything is optional. Redis enables the green-hosting cache; an empty
/// `GREEN_CHECK_URL` turns the hosting lookup off and every host counts as not green.
#[derive(Debug, Clone)]
pub struct Config {
    /// Redis connection URL (e.g. "redis://127.0.0.1:6379"). `None` disables caching.
    pub redis_url: Option<String>,
    /// Greencheck endpoint; the host name is appended as a path segment.
    pub green_check_url: Option<String>,
    pub respect_robots: bool,
    /// Minimum spacing between audits of one host; `None` means no throttling.
    pub host_interval: Option<Duration>,
    pub page_client: PageClientConfig,
}

impl Config {
    /// Load configuration from environment variables.
    ///
    /// - `REDIS_URL`: Redis connection string (omit to disable caching)
    /// - `GREEN_CHECK_URL`: greencheck API base (empty to disable)
    /// - `WSG_RESPECT_ROBOTS`: `false`/`0`/`no` to ignore robots.txt
    /// - `WSG_HOST_INTERVAL_MS`: positive integer, milliseconds between audits of a host
    /// - `WSG_*` fetch settings, see `PageClientConfig::from_env`
    pub fn from_env() -> Result<Self, AppError> {
        Self::from_lookup(|key| std::env::var(key).ok(), PageClientConfig::from_env())
    }

    fn from_lookup(
        lookup: impl Fn(&str) -> Option<String>,
        page_client: PageClientConfig,
    ) -> Result<Self, AppError> {
        let redis_url = lookup("REDIS_URL").filter(|s| !s.trim().is_empty());

        let green_check_url = match lookup("GREEN_CHECK_URL") {
            None => Some(DEFAULT_GREEN_CHECK_URL.to_string()),
            Some(raw) if raw.trim().is_empty() => None,
            Some(raw) => {
                let trimmed = raw.trim().trim_end_matches('/');
                if !(trimmed.starts_with("http://") || trimmed.starts_with("https://")) {
                    return Err(AppError::Config(format!(
                        "GREEN_CHECK_URL must be an http(s) URL, got {raw:?}"
                    )));
                }
                Some(trimmed.to_string())
            }
        };

        let respect_robots = lookup("WSG_RESPECT_ROBOTS")
            .map(|v| {
                !matches!(
                    v.trim().to_ascii_lowercase().as_str(),
                    "false" | "0" | "no" | "off"
                )
            })
            .unwrap_or(true);

        let host_interval = lookup("WSG_HOST_INTERVAL_MS")
            .and_then(|s| s.trim().parse::<u64>().ok())
            .filter(|&ms| ms > 0)
            .map(Duration::from_millis);

        Ok(Self {
            redis_url,
            green_check_url,
            respect_robots,
            host_interval,
            page_client,
        })
    }
}
