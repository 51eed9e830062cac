/// `PageFetcher` over HTTP: robots.txt gate, fetch, content-type check, parse.
use futures::future::BoxFuture;
use reqwest::Url;
use tracing::{debug, info};

use wsg_check::page::{url_host, FetchMetadata, PageData, PageError, PageFetcher};
use wsg_common::error::FetchError;
use wsg_common::http::{parse_page_url, PageClient};
use wsg_common::robots::{robots_url, RobotsPolicy};

pub struct HttpPageFetcher {
    client: PageClient,
    respect_robots: bool,
}

impl HttpPageFetcher {
    pub fn new(client: PageClient, respect_robots: bool) -> Self {
        Self {
            client,
            respect_robots,
        }
    }

    async fn fetch_page(&self, raw_url: &str) -> Result<PageData, PageError> {
        let url = parse_page_url(raw_url).map_err(|e| fetch_error(raw_url, e))?;

        if self.respect_robots && !self.robots_policy(&url).await.is_url_allowed(&url) {
            return Err(fetch_error(
                raw_url,
                FetchError::RobotsDisallowed {
                    url: url.to_string(),
                },
            ));
        }

        let page = self.client.get(&url).await.map_err(|e| fetch_error(raw_url, e))?;

        if let Some(content_type) = page.header("content-type") {
            if !is_html(content_type) {
                return Err(PageError::Parse {
                    url: raw_url.to_string(),
                    reason: format!("unsupported content type {content_type}"),
                });
            }
        }

        let mut headers = page.headers.clone();
        if !headers.contains_key("content-encoding") {
            self.merge_negotiated_encoding(&page.final_url, &mut headers).await;
        }

        let fetch = FetchMetadata {
            requested_url: raw_url.to_string(),
            host: url_host(&page.final_url)
                .unwrap_or_default()
                .to_ascii_lowercase(),
            final_url: page.final_url.clone(),
            status: page.status,
            headers,
            redirected: page.redirected,
        };
        info!(
            url = raw_url,
            final_url = %fetch.final_url,
            bytes = page.body.len(),
            "page fetched"
        );
        PageData::assemble(fetch, &page.text())
    }

    /// The body is fetched without `Accept-Encoding` so it arrives as plain text. Whether
    /// the server would compress is learned from a second, header-only exchange; its
    /// encoding and encoded length replace the plain ones.
    async fn merge_negotiated_encoding(
        &self,
        final_url: &str,
        headers: &mut std::collections::BTreeMap<String, String>,
    ) {
        let Ok(url) = Url::parse(final_url) else {
            return;
        };
        let Some(negotiated) = self.client.negotiated_headers(&url).await else {
            return;
        };
        let Some(encoding) = negotiated.get("content-encoding") else {
            return;
        };
        headers.insert("content-encoding".to_string(), encoding.clone());
        match negotiated.get("content-length") {
            Some(len) => headers.insert("content-length".to_string(), len.clone()),
            None => headers.remove("content-length"),
        };
    }

    /// Missing or unreachable robots.txt allows everything.
    async fn robots_policy(&self, url: &Url) -> RobotsPolicy {
        let Some(robots) = robots_url(url) else {
            return RobotsPolicy::allow_all();
        };
        match self.client.get_optional(&robots).await {
            Some(file) => RobotsPolicy::parse(&file.text(), &self.client.config().user_agent),
            None => {
                debug!(robots = %robots, "no robots.txt, allowing all");
                RobotsPolicy::allow_all()
            }
        }
    }
}

impl PageFetcher for HttpPageFetcher {
    fn fetch<'a>(&'a self, url: &'a str) -> BoxFuture<'a, Result<PageData, PageError>> {
        Box::pin(self.fetch_page(url))
    }
}

fn fetch_error(url: &str, err: FetchError) -> PageError {
    PageError::Fetch {
        url: url.to_string(),
        reason: err.to_string(),
    }
}

fn is_html(content_type: &str) -> bool {
    let mime = content_type
        .split(';')
        .next()
        .unwrap_or_default()
        .trim()
        .to_ascii_lowercase();
    mime == "text/html" || mime == "application/xhtml+xml"
}
