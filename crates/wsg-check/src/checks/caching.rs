/// 4.2: browser caching headers on the document.
use crate::model::{Category, CheckInfo, CheckResult, Impact};
use crate::page::PageData;

use super::{Rule, WSG_URL};

pub static INFO: CheckInfo = CheckInfo {
    guideline_id: "4.2",
    guideline_name: "Optimize Browser Caching",
    success_criterion: "Responses declare a caching policy.",
    category: Category::Hosting,
    impact: Impact::Medium,
    machine_testable: true,
};

pub struct BrowserCaching;

impl Rule for BrowserCaching {
    fn info(&self) -> &'static CheckInfo {
        &INFO
    }

    fn apply(&self, page: &PageData) -> CheckResult {
        let fetch = &page.fetch;
        let validators = ["etag", "last-modified", "expires"]
            .into_iter()
            .filter(|h| fetch.has_header(h))
            .collect::<Vec<_>>();

        let cache_control = fetch.header("cache-control").map(|v| v.to_ascii_lowercase());
        let Some(cache_control) = cache_control else {
            if validators.is_empty() {
                return CheckResult::fail(&INFO, "No Cache-Control header or cache validators.")
                    .with_recommendation("Send Cache-Control with a max-age suited to the content.")
                    .with_resource(
                        "https://developer.mozilla.org/en-US/docs/Web/HTTP/Headers/Cache-Control",
                    )
                    .with_resource(WSG_URL);
            }
            return CheckResult::warn(&INFO, "No Cache-Control header; relying on validators only.")
                .with_details(validators.join(", "))
                .with_recommendation("Add an explicit Cache-Control policy.")
                .with_resource(WSG_URL);
        };

        if cache_control.contains("no-store") {
            return CheckResult::warn(&INFO, "Cache-Control forbids storing the page (no-store).")
                .with_details(cache_control.clone())
                .with_recommendation("Allow caching for content that is not user-specific.")
                .with_resource(WSG_URL);
        }

        CheckResult::pass(&INFO, "A caching policy is declared.").with_details(cache_control)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::checks::test_support::page;
    use crate::model::Status;

    #[test]
    fn cache_control_passes() {
        let page = page("<html></html>", &[("Cache-Control", "public, max-age=600")]);
        let result = BrowserCaching.apply(&page);
        assert_eq!(result.status, Status::Pass);
        assert_eq!(result.details.as_deref(), Some("public, max-age=600"));
    }

    #[test]
    fn no_store_warns() {
        let result = BrowserCaching.apply(&page("<html></html>", &[("cache-control", "no-store")]));
        assert_eq!(result.status, Status::Warn);
    }

    #[test]
    fn validators_alone_warn() {
        let result = BrowserCaching.apply(&page("<html></html>", &[("etag", "\"abc\"")]));
        assert_eq!(result.status, Status::Warn);
        assert_eq!(result.details.as_deref(), Some("etag"));
    }

    #[test]
    fn nothing_fails() {
        assert_eq!(BrowserCaching.apply(&page("<html></html>", &[])).status, Status::Fail);
    }
}
