/// Top-level `check(url)`: fetch, run checks, score, attach carbon figures.
///
/// Only a page fetch/parse failure fails the call. Check failures are already folded
/// into results by the runner, and the carbon estimator is infallible by contract.
use std::sync::Arc;
use std::time::Instant;

use chrono::{SecondsFormat, Utc};
use tracing::{info, warn};

use crate::carbon::CarbonEstimator;
use crate::model::RunResult;
use crate::page::{PageError, PageFetcher};
use crate::runner::CheckRunner;
use crate::scoring::score_results;

pub struct WsgChecker {
    fetcher: Arc<dyn PageFetcher>,
    carbon: Arc<dyn CarbonEstimator>,
    runner: CheckRunner,
}

impl WsgChecker {
    pub fn new(
        fetcher: Arc<dyn PageFetcher>,
        carbon: Arc<dyn CarbonEstimator>,
        runner: CheckRunner,
    ) -> Self {
        Self {
            fetcher,
            carbon,
            runner,
        }
    }

    pub fn runner(&self) -> &CheckRunner {
        &self.runner
    }

    pub async fn check(&self, url: &str) -> Result<RunResult, PageError> {
        let timestamp = Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true);
        let started = Instant::now();
        info!(url, checks = self.runner.len(), "starting WSG check");

        let page = self
            .fetcher
            .fetch(url)
            .await
            .inspect_err(|e| warn!(url, error = %e, "page could not be analyzed"))?;

        let checks = self.runner.run(&page).await;
        let scores = score_results(&checks);

        let carbon = self
            .carbon
            .estimate(&page.fetch.host, page.weight.document_bytes)
            .await;

        let duration_ms = started.elapsed().as_millis() as u64;
        info!(
            url,
            overall_score = scores.overall_score,
            duration_ms,
            green_hosting = carbon.green_hosting,
            "WSG check complete"
        );

        Ok(RunResult {
            url: url.to_string(),
            final_url: page.fetch.final_url.clone(),
            timestamp,
            duration_ms,
            overall_score: scores.overall_score,
            category_scores: scores.category_scores,
            checks,
            page_weight: page.weight.document_bytes,
            co2_per_page_view: carbon.grams_co2_per_view,
            co2_model: carbon.model,
            green_hosting: carbon.green_hosting,
        })
    }
}
