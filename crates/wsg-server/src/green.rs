/// Carbon estimation backed by the Green Web Foundation greencheck API.
///
/// Lookups are cached per host. Any lookup failure counts as "not green" and is not
/// cached, so a later run can still succeed.
use std::sync::Arc;

use futures::future::BoxFuture;
use reqwest::Url;
use serde::Deserialize;
use tracing::{debug, warn};

use wsg_check::carbon::{CarbonEstimate, CarbonEstimator};
use wsg_common::http::PageClient;

use crate::cache::GreenCache;

#[derive(Debug, Deserialize)]
struct GreenCheckResponse {
    #[serde(default)]
    green: bool,
}

pub struct GreenWebEstimator {
    client: PageClient,
    base_url: String,
    cache: Arc<GreenCache>,
}

impl GreenWebEstimator {
    pub fn new(client: PageClient, base_url: impl Into<String>, cache: Arc<GreenCache>) -> Self {
        Self {
            client,
            base_url: base_url.into(),
            cache,
        }
    }

    pub async fn is_green(&self, host: &str) -> bool {
        if host.is_empty() {
            return false;
        }
        if let Some(green) = self.cache.get_green(host).await {
            debug!(host, green, "green-hosting cache hit");
            return green;
        }

        match self.lookup(host).await {
            Some(green) => {
                self.cache.set_green(host, green).await;
                green
            }
            None => false,
        }
    }

    async fn lookup(&self, host: &str) -> Option<bool> {
        let url = Url::parse(&format!("{}/{host}", self.base_url))
            .inspect_err(|e| warn!(host, error = %e, "invalid greencheck url"))
            .ok()?;
        let page = self.client.get_optional(&url).await?;
        serde_json::from_slice::<GreenCheckResponse>(&page.body)
            .inspect_err(|e| warn!(host, error = %e, "unexpected greencheck response"))
            .ok()
            .map(|r| r.green)
    }
}

impl CarbonEstimator for GreenWebEstimator {
    fn estimate<'a>(&'a self, host: &'a str, bytes: u64) -> BoxFuture<'a, CarbonEstimate> {
        Box::pin(async move { CarbonEstimate::swd(bytes, self.is_green(host).await) })
    }
}
