mod cache;
mod config;
mod error;
mod fetch;
mod green;
mod server;
mod throttle;

use std::sync::Arc;

use rmcp::{ServiceExt, transport::stdio};
use tracing::info;
use tracing_subscriber::EnvFilter;

use wsg_check::carbon::{CarbonEstimator, OfflineEstimator};
use wsg_check::{checks, CheckRunner, WsgChecker};
use wsg_common::http::PageClient;
use wsg_common::redis::RedisCache;

use cache::GreenCache;
use config::Config;
use fetch::HttpPageFetcher;
use green::GreenWebEstimator;
use error::AppError;
use server::WsgServer;
use throttle::HostThrottle;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // stdout is reserved for MCP JSON-RPC
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::from_default_env().add_directive(tracing::Level::INFO.into()),
        )
        .with_writer(std::io::stderr)
        .with_ansi(false)
        .init();

    info!("starting wsg MCP server");

    let config = Config::from_env()?;
    info!(
        redis = config.redis_url.is_some(),
        green_check = config.green_check_url.as_deref().unwrap_or("disabled"),
        respect_robots = config.respect_robots,
        host_interval_ms = config.host_interval.map(|d| d.as_millis() as u64),
        user_agent = %config.page_client.user_agent,
        timeout_ms = config.page_client.timeout.as_millis(),
        max_retries = config.page_client.max_retries,
        "configuration loaded"
    );

    let client = PageClient::new(config.page_client.clone()).map_err(AppError::from)?;

    let carbon: Arc<dyn CarbonEstimator> = match &config.green_check_url {
        Some(url) => {
            let redis_cache = RedisCache::new(config.redis_url.as_deref());
            if redis_cache.is_available().await {
                info!("redis connected");
            } else {
                info!("redis unavailable, running without cache");
            }
            let cache = Arc::new(GreenCache::new(redis_cache));
            Arc::new(GreenWebEstimator::new(client.clone(), url.clone(), cache))
        }
        None => Arc::new(OfflineEstimator),
    };

    let fetcher = Arc::new(HttpPageFetcher::new(client, config.respect_robots));

    let mut runner = CheckRunner::new();
    runner.register_all(checks::all());
    info!(checks = runner.len(), "checks registered");

    let checker = Arc::new(WsgChecker::new(fetcher, carbon, runner));
    let throttle = config.host_interval.and_then(HostThrottle::new);
    let server = WsgServer::new(checker, throttle);

    info!("MCP server ready, serving on stdio");
    let service = server.serve(stdio()).await.inspect_err(|e| {
        tracing::error!(error = %e, "MCP server error");
    })?;

    service.waiting().await?;
    info!("MCP server shut down");
    Ok(())
}
