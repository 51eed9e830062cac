/// 3.5: document language and image alternatives.
use crate::model::{Category, CheckInfo, CheckResult, Impact};
use crate::page::PageData;

use super::{Rule, WSG_URL};

pub static INFO: CheckInfo = CheckInfo {
    guideline_id: "3.5",
    guideline_name: "Ensure That Your Solutions Are Accessible",
    success_criterion: "The page declares its language and provides text alternatives for images.",
    category: Category::WebDev,
    impact: Impact::Medium,
    machine_testable: true,
};

pub struct Accessible;

impl Rule for Accessible {
    fn info(&self) -> &'static CheckInfo {
        &INFO
    }

    fn apply(&self, page: &PageData) -> CheckResult {
        let doc = &page.document;
        let missing_alt = doc.images.iter().filter(|img| img.alt.is_none()).count();

        if doc.lang.is_none() {
            return CheckResult::fail(&INFO, "The <html> element has no lang attribute.")
                .with_details(format!("{missing_alt} images have no alt attribute."))
                .with_recommendation("Declare the page language, e.g. <html lang=\"en\">.")
                .with_resource("https://www.w3.org/WAI/WCAG22/Understanding/language-of-page")
                .with_resource(WSG_URL);
        }

        if missing_alt > 0 {
            return CheckResult::warn(
                &INFO,
                format!("{missing_alt} of {} images have no alt attribute.", doc.images.len()),
            )
            .with_recommendation(
                "Give every image an alt attribute; use alt=\"\" for decorative images.",
            )
            .with_resource("https://www.w3.org/WAI/tutorials/images/")
            .with_resource(WSG_URL);
        }

        CheckResult::pass(&INFO, "Language is declared and all images have alt attributes.")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::checks::test_support::page;
    use crate::model::Status;

    #[test]
    fn missing_lang_fails() {
        let result = Accessible.apply(&page("<html><body></body></html>", &[]));
        assert_eq!(result.status, Status::Fail);
        assert_eq!(result.score, 0);
    }

    #[test]
    fn images_without_alt_warn() {
        let html = r#"<html lang="en"><img src="a.png" alt=""><img src="b.png"></html>"#;
        let result = Accessible.apply(&page(html, &[]));
        assert_eq!(result.status, Status::Warn);
        assert_eq!(result.message, "1 of 2 images have no alt attribute.");
    }

    #[test]
    fn complete_markup_passes() {
        let html = r#"<html lang="de"><img src="a.png" alt="Logo"></html>"#;
        assert_eq!(Accessible.apply(&page(html, &[])).status, Status::Pass);
    }
}
