/// 3.20: deprecated and proprietary HTML elements.
use crate::model::{Category, CheckInfo, CheckResult, Impact};
use crate::page::PageData;

use super::{Rule, WSG_URL};

pub static INFO: CheckInfo = CheckInfo {
    guideline_id: "3.20",
    guideline_name: "Avoid Using Deprecated or Proprietary Syntax",
    success_criterion: "The markup uses no obsolete or vendor-specific elements.",
    category: Category::WebDev,
    impact: Impact::Low,
    machine_testable: true,
};

const OBSOLETE_ELEMENTS: &[&str] = &[
    "acronym", "applet", "basefont", "bgsound", "big", "blink", "center", "dir", "font", "frame",
    "frameset", "isindex", "keygen", "marquee", "nobr", "noframes", "plaintext", "spacer", "strike",
    "tt", "xmp",
];

pub struct DeprecatedSyntax;

impl Rule for DeprecatedSyntax {
    fn info(&self) -> &'static CheckInfo {
        &INFO
    }

    fn apply(&self, page: &PageData) -> CheckResult {
        let doc = &page.document;
        let found: Vec<(&str, usize)> = OBSOLETE_ELEMENTS
            .iter()
            .map(|&el| (el, doc.count(el)))
            .filter(|&(_, n)| n > 0)
            .collect();

        if found.is_empty() {
            return CheckResult::pass(&INFO, "No obsolete elements found.");
        }

        let total: usize = found.iter().map(|(_, n)| n).sum();
        let listing = found
            .iter()
            .map(|(el, n)| format!("<{el}> ×{n}"))
            .collect::<Vec<_>>()
            .join(", ");
        let message = format!("{total} obsolete elements found.");
        let result = if total <= 3 {
            CheckResult::warn(&INFO, message)
        } else {
            CheckResult::fail(&INFO, message)
        };
        result
            .with_details(listing)
            .with_recommendation("Replace obsolete elements with semantic HTML and CSS.")
            .with_resource("https://html.spec.whatwg.org/multipage/obsolete.html")
            .with_resource(WSG_URL)
    }
}
