/// 3.12: title, description and viewport metadata.
use crate::model::{Category, CheckInfo, CheckResult, Impact};
use crate::page::PageData;

use super::{Rule, WSG_URL};

pub static INFO: CheckInfo = CheckInfo {
    guideline_id: "3.12",
    guideline_name: "Use Metadata Correctly",
    success_criterion: "The page has a title, a description and a viewport declaration.",
    category: Category::WebDev,
    impact: Impact::Low,
    machine_testable: true,
};

pub struct Metadata;

impl Rule for Metadata {
    fn info(&self) -> &'static CheckInfo {
        &INFO
    }

    fn apply(&self, page: &PageData) -> CheckResult {
        let doc = &page.document;
        let mut missing = Vec::new();
        if doc.title.is_none() {
            missing.push("<title>");
        }
        if doc.meta("description").is_none_or(|d| d.trim().is_empty()) {
            missing.push("meta description");
        }
        if !doc.has_viewport {
            missing.push("meta viewport");
        }

        if missing.is_empty() {
            return CheckResult::pass(&INFO, "Title, description and viewport are present.");
        }

        let message = format!("Missing: {}.", missing.join(", "));
        let result = if doc.title.is_none() {
            CheckResult::fail(&INFO, message)
        } else {
            CheckResult::warn(&INFO, message)
        };
        result
            .with_recommendation(
                "Describe the page with <title> and <meta name=\"description\">, \
                 and declare a viewport.",
            )
            .with_resource(WSG_URL)
    }
}
