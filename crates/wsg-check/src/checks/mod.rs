/// Built-in guideline checks.
///
/// Each module evaluates one WSG guideline from markup and response headers only.
/// They are plain synchronous rules; `RuleCheck` adapts them to the async `Check`
/// contract so they can be registered next to checks that do their own I/O.
use std::sync::Arc;

use crate::check::{Check, CheckFuture};
use crate::model::{CheckInfo, CheckResult};
use crate::page::PageData;

pub mod accessibility;
pub mod assets;
pub mod caching;
pub mod compression;
pub mod deprecated;
pub mod metadata;
pub mod render_blocking;
pub mod security;
pub mod technical_indicators;
pub mod user_preferences;

pub const WSG_URL: &str = "https://www.w3.org/TR/web-sustainability-guidelines/";

/// A synchronous rule over page data.
pub trait Rule: Send + Sync + 'static {
    fn info(&self) -> &'static CheckInfo;
    fn apply(&self, page: &PageData) -> CheckResult;
}

pub struct RuleCheck<R>(pub R);

impl<R: Rule> Check for RuleCheck<R> {
    fn evaluate<'a>(&'a self, page: &'a PageData) -> CheckFuture<'a> {
        Box::pin(async move { Ok(self.0.apply(page)) })
    }

    fn info(&self) -> Option<&CheckInfo> {
        Some(self.0.info())
    }
}

pub fn rule<R: Rule>(rule: R) -> Arc<dyn Check> {
    Arc::new(RuleCheck(rule))
}

/// Every built-in check, in report order.
pub fn all() -> Vec<Arc<dyn Check>> {
    vec![
        rule(assets::OptimizedAssets),
        rule(technical_indicators::DocumentWeight),
        rule(accessibility::Accessible),
        rule(render_blocking::RenderBlocking),
        rule(metadata::Metadata),
        rule(user_preferences::UserPreferences),
        rule(security::SecurityHeaders),
        rule(deprecated::DeprecatedSyntax),
        rule(caching::BrowserCaching),
        rule(compression::Compression),
    ]
}

/// Metadata for every built-in check, in report order.
pub fn catalog() -> Vec<CheckInfo> {
    all().iter().filter_map(|c| c.info().copied()).collect()
}


#[cfg(test)]
mod tests {
    use std::collections::HashSet;

    use super::*;
    use crate::model::Category;
    use crate::runner::CheckRunner;

    #[test]
    fn catalog_ids_are_unique() {
        let infos = catalog();
        assert_eq!(infos.len(), all().len());
        let ids: HashSet<&str> = infos.iter().map(|i| i.guideline_id).collect();
        assert_eq!(ids.len(), infos.len());
    }

    #[tokio::test]
    async fn full_catalog_runs_in_order() {
        let mut runner = CheckRunner::new();
        runner.register_all(all());
        let page = test_support::page("<html><body></body></html>", &[]);

        let results = runner.run(&page).await;
        let ids: Vec<&str> = results.iter().map(|r| r.guideline_id.as_str()).collect();
        let expected: Vec<&str> = catalog().iter().map(|i| i.guideline_id).collect();
        assert_eq!(ids, expected);
        assert!(results.iter().all(|r| r.score == r.status.score()));
        assert!(results.iter().all(|r| r.category != Category::Business));
    }
}
