/// Page data handed to every check, and the fetch seam that produces it.
///
/// `PageData` is assembled once per run and shared read-only between all checks.
use std::collections::BTreeMap;

use futures::future::BoxFuture;
use serde::Serialize;

use crate::document::{self, PageDocument};

/// Why page data could not be produced. These are the only errors that fail a run.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PageError {
    #[error("failed to fetch {url}: {reason}")]
    Fetch { url: String, reason: String },

    #[error("failed to parse {url}: {reason}")]
    Parse { url: String, reason: String },
}

impl PageError {
    pub fn url(&self) -> &str {
        match self {
            PageError::Fetch { url, .. } | PageError::Parse { url, .. } => url,
        }
    }
}

/// Produces page data for a URL. Implementations report failures as `PageError`.
pub trait PageFetcher: Send + Sync {
    fn fetch<'a>(&'a self, url: &'a str) -> BoxFuture<'a, Result<PageData, PageError>>;
}

/// HTTP-level facts about the retrieved document.
#[derive(Debug, Clone, Default, Serialize)]
pub struct FetchMetadata {
    pub requested_url: String,
    pub final_url: String,
    /// Host of `final_url`, lower-cased, without port.
    pub host: String,
    pub status: u16,
    /// Response headers keyed by lower-cased name. Repeated headers are joined with ", ".
    pub headers: BTreeMap<String, String>,
    pub redirected: bool,
}

impl FetchMetadata {
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .get(&name.to_ascii_lowercase())
            .map(|v| v.as_str())
    }

    pub fn has_header(&self, name: &str) -> bool {
        self.header(name).is_some_and(|v| !v.trim().is_empty())
    }
}

/// Resource metrics derived from the document and the response.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct PageWeight {
    /// Bytes transferred for the HTML document (Content-Length, else body length).
    pub document_bytes: u64,
    pub compressed: bool,
    pub script_count: usize,
    pub stylesheet_count: usize,
    pub image_count: usize,
    /// External resources served from a host other than the page's own.
    pub third_party_requests: usize,
}

impl PageWeight {
    pub fn analyze(fetch: &FetchMetadata, doc: &PageDocument) -> Self {
        let document_bytes = fetch
            .header("content-length")
            .and_then(|v| v.trim().parse::<u64>().ok())
            .unwrap_or(doc.html_bytes as u64);

        let compressed = fetch
            .header("content-encoding")
            .is_some_and(|v| !v.trim().is_empty() && !v.eq_ignore_ascii_case("identity"));

        let resource_urls = doc
            .scripts
            .iter()
            .filter_map(|s| s.src.as_deref())
            .chain(doc.stylesheets.iter().map(|s| s.href.as_str()))
            .chain(doc.images.iter().filter_map(|i| i.src.as_deref()));

        let third_party_requests = resource_urls
            .filter_map(url_host)
            .filter(|host| !host.eq_ignore_ascii_case(&fetch.host))
            .count();

        Self {
            document_bytes,
            compressed,
            script_count: doc.scripts.iter().filter(|s| s.src.is_some()).count(),
            stylesheet_count: doc.stylesheets.len(),
            image_count: doc.images.len(),
            third_party_requests,
        }
    }
}

/// Everything a check may look at.
#[derive(Debug, Clone, Default, Serialize)]
pub struct PageData {
    pub fetch: FetchMetadata,
    pub document: PageDocument,
    pub weight: PageWeight,
}

impl PageData {
    /// Parse `html` and derive the page weight for an already-fetched response.
    pub fn assemble(fetch: FetchMetadata, html: &str) -> Result<Self, PageError> {
        let document = document::parse_document(html).map_err(|e| PageError::Parse {
            url: fetch.final_url.clone(),
            reason: e.to_string(),
        })?;
        let weight = PageWeight::analyze(&fetch, &document);
        Ok(Self {
            fetch,
            document,
            weight,
        })
    }
}

/// Host part of an absolute or protocol-relative URL. Relative references yield `None`.
pub fn url_host(url: &str) -> Option<&str> {
    let url = url.trim();
    let rest = if let Some(pos) = url.find("://") {
        let scheme = &url[..pos];
        let valid = |c: char| c.is_ascii_alphanumeric() || "+-.".contains(c);
        if scheme.is_empty() || !scheme.chars().all(valid) {
            return None;
        }
        &url[pos + 3..]
    } else {
        url.strip_prefix("//")?
    };

    let authority = rest
        .split(['/', '?', '#'])
        .next()
        .unwrap_or_default();
    let authority = authority.rsplit('@').next().unwrap_or_default();
    let host = match authority.strip_prefix('[') {
        // IPv6 literal
        Some(v6) => v6.split(']').next().unwrap_or_default(),
        None => authority.split(':').next().unwrap_or_default(),
    };
    (!host.is_empty()).then_some(host)
}
