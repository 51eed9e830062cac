/// 3.1: keep the HTML document within a weight budget.
use crate::model::{Category, CheckInfo, CheckResult, Impact};
use crate::page::PageData;

use super::{Rule, WSG_URL};

pub static INFO: CheckInfo = CheckInfo {
    guideline_id: "3.1",
    guideline_name: "Identify Relevant Technical Indicators",
    success_criterion: "Page weight is measured and kept within a budget.",
    category: Category::WebDev,
    impact: Impact::High,
    machine_testable: true,
};

pub const PASS_BUDGET_BYTES: u64 = 100 * 1024;
pub const WARN_BUDGET_BYTES: u64 = 500 * 1024;

pub struct DocumentWeight;

impl Rule for DocumentWeight {
    fn info(&self) -> &'static CheckInfo {
        &INFO
    }

    fn apply(&self, page: &PageData) -> CheckResult {
        let weight = &page.weight;
        let kib = weight.document_bytes as f64 / 1024.0;
        let details = format!(
            "{} scripts, {} stylesheets, {} images, {} third-party requests.",
            weight.script_count,
            weight.stylesheet_count,
            weight.image_count,
            weight.third_party_requests
        );

        let result = if weight.document_bytes <= PASS_BUDGET_BYTES {
            CheckResult::pass(&INFO, format!("HTML document is {kib:.1} KiB, within budget."))
        } else if weight.document_bytes <= WARN_BUDGET_BYTES {
            CheckResult::warn(
                &INFO,
                format!("HTML document is {kib:.1} KiB, above the 100 KiB budget."),
            )
            .with_recommendation(
                "Trim inline scripts, styles and markup, or move them to cacheable files.",
            )
        } else {
            CheckResult::fail(
                &INFO,
                format!("HTML document is {kib:.1} KiB, above the 500 KiB ceiling."),
            )
            .with_recommendation(
                "Split the page or defer non-essential content; set a page weight budget.",
            )
        };
        result.with_details(details).with_resource(WSG_URL)
    }
}
