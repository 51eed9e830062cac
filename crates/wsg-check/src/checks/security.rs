/// 3.16: baseline security headers.
use crate::model::{Category, CheckInfo, CheckResult, Impact};
use crate::page::PageData;

use super::{Rule, WSG_URL};

const MDN_CSP: &str =
    "https://developer.mozilla.org/en-US/docs/Web/HTTP/Headers/Content-Security-Policy";
const MDN_HSTS: &str =
    "https://developer.mozilla.org/en-US/docs/Web/HTTP/Headers/Strict-Transport-Security";

pub static INFO: CheckInfo = CheckInfo {
    guideline_id: "3.16",
    guideline_name: "Ensure That Your Code Is Secure",
    success_criterion:
        "Responses carry HSTS, Content-Security-Policy and X-Content-Type-Options headers.",
    category: Category::WebDev,
    impact: Impact::High,
    machine_testable: true,
};

pub struct SecurityHeaders;

impl Rule for SecurityHeaders {
    fn info(&self) -> &'static CheckInfo {
        &INFO
    }

    fn apply(&self, page: &PageData) -> CheckResult {
        let fetch = &page.fetch;
        let https = fetch.final_url.to_ascii_lowercase().starts_with("https://");

        let mut missing = Vec::new();
        if https && !fetch.has_header("strict-transport-security") {
            missing.push("Strict-Transport-Security");
        }
        if !fetch.has_header("content-security-policy") {
            missing.push("Content-Security-Policy");
        }
        if !fetch
            .header("x-content-type-options")
            .is_some_and(|v| v.trim().eq_ignore_ascii_case("nosniff"))
        {
            missing.push("X-Content-Type-Options: nosniff");
        }

        let result = match missing.len() {
            0 => {
                let result = CheckResult::pass(&INFO, "Security headers are in place.");
                return if https {
                    result
                } else {
                    result.with_details("Served over plain HTTP; HSTS not applicable.")
                };
            }
            1 => CheckResult::warn(&INFO, format!("Missing security header: {}.", missing[0])),
            _ => CheckResult::fail(
                &INFO,
                format!("Missing security headers: {}.", missing.join(", ")),
            ),
        };
        result
            .with_recommendation("Send the missing headers from the server or CDN configuration.")
            .with_resource(MDN_CSP)
            .with_resource(MDN_HSTS)
            .with_resource(WSG_URL)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::checks::test_support::{page, page_at};
    use crate::model::Status;

    const ALL: [(&str, &str); 3] = [
        ("strict-transport-security", "max-age=31536000"),
        ("content-security-policy", "default-src 'self'"),
        ("x-content-type-options", "nosniff"),
    ];

    #[test]
    fn all_headers_pass() {
        assert_eq!(SecurityHeaders.apply(&page("<html></html>", &ALL)).status, Status::Pass);
    }

    #[test]
    fn one_missing_warns() {
        let result = SecurityHeaders.apply(&page("<html></html>", &ALL[1..]));
        assert_eq!(result.status, Status::Warn);
        assert_eq!(result.message, "Missing security header: Strict-Transport-Security.");
    }

    #[test]
    fn none_fails_with_high_impact() {
        let result = SecurityHeaders.apply(&page("<html></html>", &[]));
        assert_eq!(result.status, Status::Fail);
        assert_eq!(result.impact, Impact::High);
    }

    #[test]
    fn hsts_is_not_required_over_http() {
        let page = page_at("http://example.org/", "<html></html>", &ALL[1..]);
        let result = SecurityHeaders.apply(&page);
        assert_eq!(result.status, Status::Pass);
        assert!(result.details.is_some());
    }
}
