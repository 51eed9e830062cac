/// MCP server exposing the WSG checker.
///
/// Tools:
/// - `check_url`: audit one page and return the full report
/// - `list_checks`: describe the registered guideline checks
use std::sync::Arc;

use rmcp::{
    Json, ServerHandler,
    handler::server::router::tool::ToolRouter,
    handler::server::wrapper::Parameters,
    model::*,
    tool, tool_handler, tool_router,
};
use schemars::JsonSchema;
use serde::Serialize;
use tracing::info;

use wsg_check::model::{CheckInfo, RunResult};
use wsg_check::page::url_host;
use wsg_check::WsgChecker;
use wsg_common::mcp_api::CheckUrlParams;

use crate::throttle::HostThrottle;

#[derive(Debug, Clone, Serialize, JsonSchema)]
pub struct ListChecksResponse {
    pub checks: Vec<CheckInfo>,
}

#[derive(Clone)]
pub struct WsgServer {
    checker: Arc<WsgChecker>,
    throttle: Option<HostThrottle>,
    tool_router: ToolRouter<WsgServer>,
}

impl WsgServer {
    pub fn new(checker: Arc<WsgChecker>, throttle: Option<HostThrottle>) -> Self {
        Self {
            checker,
            throttle,
            tool_router: Self::tool_router(),
        }
    }

    /// URLs without a host pass through; the fetcher reports them.
    async fn gate(&self, url: &str) -> Result<(), String> {
        if let (Some(throttle), Some(host)) = (&self.throttle, url_host(url)) {
            throttle.acquire(host).await.map_err(|e| e.to_string())?;
        }
        Ok(())
    }
}

#[tool_router]
impl WsgServer {
    #[tool(
        description = "Audit a web page against the W3C Web Sustainability Guidelines. \
                       Returns per-check results, impact-weighted overall and category \
                       scores (0-100), page weight and an estimated CO2 per page view."
    )]
    async fn check_url(
        &self,
        Parameters(params): Parameters<CheckUrlParams>,
    ) -> Result<Json<RunResult>, String> {
        let url = params.url.trim().to_string();
        if url.is_empty() {
            return Err("url must not be empty".to_string());
        }
        self.gate(&url).await?;

        let report = self
            .checker
            .check(&url)
            .await
            .map_err(|e| e.to_string())?;
        Ok(Json(report))
    }

    #[tool(
        description = "List the guideline checks this server runs, with their WSG \
                       guideline id, category and impact."
    )]
    async fn list_checks(&self) -> Result<Json<ListChecksResponse>, String> {
        let checks = self.checker.runner().infos();
        info!(checks = checks.len(), "listing checks");
        Ok(Json(ListChecksResponse { checks }))
    }
}

#[tool_handler]
impl ServerHandler for WsgServer {
    fn get_info(&self) -> ServerInfo {
        ServerInfo {
            protocol_version: ProtocolVersion::V_2025_06_18,
            capabilities: ServerCapabilities::builder().enable_tools().build(),
            server_info: Implementation {
                name: "wsg-server".to_string(),
                version: env!("CARGO_PKG_VERSION").to_string(),
                title: None,
                icons: None,
                website_url: None,
            },
            instructions: Some(
                "Web Sustainability Guidelines checker. Use check_url with an absolute \
                 http(s) URL to fetch the page and score it against the WSG checks; use \
                 list_checks to see which guidelines are evaluated. Pages disallowed by \
                 robots.txt are not fetched."
                    .to_string(),
            ),
        }
    }
}

#[cfg(test)]
mod tests {
    use futures::future::BoxFuture;
    use wsg_check::page::{FetchMetadata, PageData, PageError, PageFetcher};
    use wsg_check::{checks, CheckRunner, OfflineEstimator};

    use super::*;

    struct StaticPage;

    impl PageFetcher for StaticPage {
        fn fetch<'a>(&'a self, url: &'a str) -> BoxFuture<'a, Result<PageData, PageError>> {
            Box::pin(async move {
                let fetch = FetchMetadata {
                    requested_url: url.to_string(),
                    final_url: url.to_string(),
                    host: "example.org".to_string(),
                    status: 200,
                    ..Default::default()
                };
                PageData::assemble(fetch, "<html lang=\"en\"><title>t</title></html>")
            })
        }
    }

    fn server(throttle: Option<HostThrottle>) -> WsgServer {
        let mut runner = CheckRunner::new();
        runner.register_all(checks::all());
        let checker =
            WsgChecker::new(Arc::new(StaticPage), Arc::new(OfflineEstimator), runner);
        WsgServer::new(Arc::new(checker), throttle)
    }

    #[test]
    fn tools_publish_output_schemas() {
        let tools = WsgServer::tool_router().list_all();
        for name in ["check_url", "list_checks"] {
            let tool = tools
                .iter()
                .find(|t| t.name == name)
                .unwrap_or_else(|| panic!("missing tool: {name}"));
            assert!(
                tool.output_schema.is_some(),
                "tool {name} should publish output_schema"
            );
        }
    }

    #[tokio::test]
    async fn check_url_returns_a_report() {
        let server = server(None);
        let Json(report) = server
            .check_url(Parameters(CheckUrlParams {
                url: " https://example.org/ ".to_string(),
            }))
            .await
            .unwrap();
        assert_eq!(report.url, "https://example.org/");
        assert_eq!(report.checks.len(), checks::all().len());
    }

    #[tokio::test]
    async fn check_url_rejects_empty_urls() {
        let result = server(None)
            .check_url(Parameters(CheckUrlParams {
                url: "  ".to_string(),
            }))
            .await;
        match result {
            Err(err) => assert_eq!(err, "url must not be empty"),
            Ok(_) => panic!("empty url should be rejected"),
        }
    }

    #[tokio::test]
    async fn repeated_audits_of_one_host_are_throttled() {
        let server = server(HostThrottle::new(std::time::Duration::from_secs(60)));
        let params = |url: &str| {
            Parameters(CheckUrlParams {
                url: url.to_string(),
            })
        };
        assert!(server.check_url(params("https://example.org/")).await.is_ok());
        assert!(server.check_url(params("https://other.example/")).await.is_ok());

        match server.check_url(params("https://EXAMPLE.org/about")).await {
            Err(err) => assert!(err.starts_with("example.org was audited recently")),
            Ok(_) => panic!("second audit of example.org should be throttled"),
        }
    }

    #[tokio::test]
    async fn list_checks_matches_the_catalog() {
        let Json(response) = server(None).list_checks().await.unwrap();
        assert_eq!(response.checks, checks::catalog());
    }
}
