/// 3.9: classic scripts in <head> block rendering.
use crate::model::{Category, CheckInfo, CheckResult, Impact};
use crate::page::PageData;

use super::{Rule, WSG_URL};

pub static INFO: CheckInfo = CheckInfo {
    guideline_id: "3.9",
    guideline_name: "Resolve Render Blocking Content",
    success_criterion: "Scripts do not block the first render of the page.",
    category: Category::WebDev,
    impact: Impact::High,
    machine_testable: true,
};

pub struct RenderBlocking;

impl Rule for RenderBlocking {
    fn info(&self) -> &'static CheckInfo {
        &INFO
    }

    fn apply(&self, page: &PageData) -> CheckResult {
        let scripts = &page.document.scripts;
        if scripts.is_empty() {
            return CheckResult::not_applicable(&INFO, "The page loads no scripts.");
        }

        let blocking: Vec<&str> = scripts
            .iter()
            .filter(|s| s.is_render_blocking())
            .filter_map(|s| s.src.as_deref())
            .collect();

        let result = match blocking.len() {
            0 => return CheckResult::pass(&INFO, "No render-blocking scripts in <head>."),
            n @ (1 | 2) => {
                CheckResult::warn(&INFO, format!("{n} render-blocking scripts in <head>."))
            }
            n => CheckResult::fail(&INFO, format!("{n} render-blocking scripts in <head>.")),
        };
        result
            .with_details(blocking.join(", "))
            .with_recommendation("Add defer or async to head scripts, or load them as modules.")
            .with_resource("https://developer.mozilla.org/en-US/docs/Web/HTML/Element/script")
            .with_resource(WSG_URL)
    }
}
