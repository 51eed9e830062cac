/// HTTP client for fetching audited pages.
///
/// Transient failures (timeouts, connection errors, 429, 5xx) are retried with capped
/// exponential backoff. Bodies are streamed and abandoned once they pass the size cap.
use std::collections::BTreeMap;
use std::time::{Duration, SystemTime, UNIX_EPOCH};

use futures::StreamExt;
use reqwest::header::{HeaderMap, ACCEPT_ENCODING};
use reqwest::{redirect, StatusCode, Url};
use tracing::{debug, warn};

use crate::error::FetchError;

const OFFERED_ENCODINGS: &str = "br, gzip, deflate";

#[derive(Clone, Debug)]
pub struct PageClientConfig {
    pub user_agent: String,
    pub timeout: Duration,
    pub max_retries: u32,
    pub initial_backoff: Duration,
    pub max_backoff: Duration,
    pub max_page_bytes: usize,
    pub max_redirects: usize,
}

impl Default for PageClientConfig {
    fn default() -> Self {
        Self {
            user_agent: format!("wsg-check/{}", env!("CARGO_PKG_VERSION")),
            timeout: Duration::from_secs(30),
            max_retries: 2,
            initial_backoff: Duration::from_millis(250),
            max_backoff: Duration::from_millis(4_000),
            max_page_bytes: 5 * 1024 * 1024,
            max_redirects: 10,
        }
    }
}

impl PageClientConfig {
    pub fn from_env() -> Self {
        let defaults = Self::default();

        let user_agent = std::env::var("WSG_USER_AGENT")
            .ok()
            .filter(|s| !s.trim().is_empty())
            .unwrap_or(defaults.user_agent);

        let timeout = env_parse::<u64>("WSG_FETCH_TIMEOUT_SECS")
            .map(Duration::from_secs)
            .unwrap_or(defaults.timeout);

        let max_retries = env_parse::<u32>("WSG_FETCH_MAX_RETRIES").unwrap_or(defaults.max_retries);

        let initial_backoff = env_parse::<u64>("WSG_RETRY_INITIAL_MS")
            .map(Duration::from_millis)
            .unwrap_or(defaults.initial_backoff);

        let max_backoff = env_parse::<u64>("WSG_RETRY_MAX_MS")
            .map(Duration::from_millis)
            .unwrap_or(defaults.max_backoff);

        let max_page_bytes =
            env_parse::<usize>("WSG_MAX_PAGE_BYTES").unwrap_or(defaults.max_page_bytes);

        let max_redirects =
            env_parse::<usize>("WSG_MAX_REDIRECTS").unwrap_or(defaults.max_redirects);

        Self {
            user_agent,
            timeout,
            max_retries,
            initial_backoff,
            max_backoff,
            max_page_bytes,
            max_redirects,
        }
    }
}

fn env_parse<T: std::str::FromStr>(key: &str) -> Option<T> {
    std::env::var(key).ok().and_then(|s| s.trim().parse::<T>().ok())
}

/// A successfully fetched response.
#[derive(Debug, Clone)]
pub struct FetchedPage {
    pub final_url: String,
    pub status: u16,
    /// Lower-cased header names; repeated headers are joined with ", ".
    pub headers: BTreeMap<String, String>,
    pub body: Vec<u8>,
    pub redirected: bool,
}

impl FetchedPage {
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(&name.to_ascii_lowercase()).map(|v| v.as_str())
    }

    pub fn text(&self) -> String {
        String::from_utf8_lossy(&self.body).into_owned()
    }
}

/// Parse and validate an audit target. Only absolute http(s) URLs are accepted.
pub fn parse_page_url(raw: &str) -> Result<Url, FetchError> {
    let url = Url::parse(raw.trim()).map_err(|e| FetchError::InvalidUrl(format!("{raw}: {e}")))?;
    match url.scheme() {
        "http" | "https" if url.host_str().is_some() => Ok(url),
        _ => Err(FetchError::InvalidUrl(format!("{raw}: expected an http(s) URL with a host"))),
    }
}

#[derive(Clone)]
pub struct PageClient {
    config: PageClientConfig,
    http: reqwest::Client,
}

impl PageClient {
    pub fn new(config: PageClientConfig) -> Result<Self, FetchError> {
        let http = reqwest::Client::builder()
            .user_agent(config.user_agent.clone())
            .redirect(redirect::Policy::limited(config.max_redirects))
            .build()?;
        Ok(Self { config, http })
    }

    pub fn config(&self) -> &PageClientConfig {
        &self.config
    }

    /// GET `url`, following redirects. Non-2xx responses are errors.
    pub async fn get(&self, url: &Url) -> Result<FetchedPage, FetchError> {
        self.request_with_retry(|| self.get_once(url)).await
    }

    /// GET `url` without retries. `None` on any failure or non-2xx status.
    pub async fn get_optional(&self, url: &Url) -> Option<FetchedPage> {
        self.get_once(url)
            .await
            .inspect_err(|e| debug!(url = %url, error = %e, "optional fetch failed"))
            .ok()
    }

    /// Response headers for `url` when compression is offered. The body is never read,
    /// so the encoded payload does not need decoding. `None` on any failure.
    pub async fn negotiated_headers(&self, url: &Url) -> Option<BTreeMap<String, String>> {
        let resp = self
            .http
            .get(url.clone())
            .header(ACCEPT_ENCODING, OFFERED_ENCODINGS)
            .timeout(self.config.timeout)
            .send()
            .await
            .inspect_err(|e| debug!(url = %url, error = %e, "encoding probe failed"))
            .ok()?;
        resp.status()
            .is_success()
            .then(|| collect_headers(resp.headers()))
    }

    async fn get_once(&self, url: &Url) -> Result<FetchedPage, FetchError> {
        let resp = self
            .http
            .get(url.clone())
            .timeout(self.config.timeout)
            .send()
            .await?;

        let status = resp.status();
        let final_url = resp.url().clone();
        if !status.is_success() {
            return Err(FetchError::Status {
                status: status.as_u16(),
                url: final_url.to_string(),
            });
        }

        let headers = collect_headers(resp.headers());
        let body = read_limited_body(resp, self.config.max_page_bytes).await?;

        Ok(FetchedPage {
            redirected: final_url != *url,
            final_url: final_url.to_string(),
            status: status.as_u16(),
            headers,
            body,
        })
    }

    async fn request_with_retry<T, Fut, F>(&self, mut f: F) -> Result<T, FetchError>
    where
        F: FnMut() -> Fut,
        Fut: std::future::Future<Output = Result<T, FetchError>>,
    {
        let mut attempt: u32 = 0;
        loop {
            attempt += 1;
            match f().await {
                Ok(v) => return Ok(v),
                Err(e) => {
                    if attempt > self.config.max_retries || !should_retry(&e) {
                        return Err(e);
                    }
                    let delay = backoff_delay(
                        self.config.initial_backoff,
                        self.config.max_backoff,
                        attempt - 1,
                    );
                    warn!(
                        attempt,
                        delay_ms = delay.as_millis(),
                        error = %e,
                        "page fetch failed, retrying"
                    );
                    tokio::time::sleep(delay).await;
                }
            }
        }
    }
}

fn collect_headers(map: &HeaderMap) -> BTreeMap<String, String> {
    let mut headers: BTreeMap<String, String> = BTreeMap::new();
    for (name, value) in map {
        let value = String::from_utf8_lossy(value.as_bytes()).into_owned();
        headers
            .entry(name.as_str().to_string())
            .and_modify(|existing| {
                existing.push_str(", ");
                existing.push_str(&value);
            })
            .or_insert(value);
    }
    headers
}

fn should_retry(err: &FetchError) -> bool {
    match err {
        FetchError::Request(e) => e.is_timeout() || e.is_connect(),
        FetchError::Status { status, .. } => StatusCode::from_u16(*status)
            .is_ok_and(|s| s == StatusCode::TOO_MANY_REQUESTS || s.is_server_error()),
        FetchError::RobotsDisallowed { .. }
        | FetchError::TooLarge { .. }
        | FetchError::InvalidUrl(_) => false,
    }
}

fn backoff_delay(initial: Duration, max: Duration, exponent: u32) -> Duration {
    let mult = 1u128.checked_shl(exponent).unwrap_or(u128::MAX);
    let base_ms = initial.as_millis().saturating_mul(mult);
    let capped_ms = std::cmp::min(base_ms, max.as_millis()) as u64;
    let jitter_cap = std::cmp::max(1, capped_ms / 4);
    Duration::from_millis(capped_ms.saturating_add(pseudo_jitter_ms(jitter_cap)))
}

fn pseudo_jitter_ms(max_inclusive: u64) -> u64 {
    let now = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_else(|_| Duration::from_secs(0));
    u64::from(now.subsec_nanos()) % (max_inclusive + 1)
}

async fn read_limited_body(
    resp: reqwest::Response,
    max_bytes: usize,
) -> Result<Vec<u8>, FetchError> {
    if resp
        .content_length()
        .is_some_and(|len| len > max_bytes as u64)
    {
        return Err(FetchError::TooLarge { limit: max_bytes });
    }

    let mut body = Vec::new();
    let mut stream = resp.bytes_stream();
    while let Some(chunk) = stream.next().await {
        let chunk = chunk?;
        if body.len() + chunk.len() > max_bytes {
            return Err(FetchError::TooLarge { limit: max_bytes });
        }
        body.extend_from_slice(&chunk);
    }
    Ok(body)
}
