/// 3.13: honour color-scheme and motion preferences.
///
/// Only markup, `<link media>` and inline `<style>` are visible here; external
/// stylesheets are not fetched, so absence is reported as a warning rather than a failure.
use crate::model::{Category, CheckInfo, CheckResult, Impact};
use crate::page::PageData;

use super::{Rule, WSG_URL};

pub static INFO: CheckInfo = CheckInfo {
    guideline_id: "3.13",
    guideline_name: "Adapt to User Preferences",
    success_criterion: "The page adapts to color-scheme and reduced-motion preferences.",
    category: Category::Ux,
    impact: Impact::Low,
    machine_testable: true,
};

const PREFERENCE_QUERIES: [&str; 3] = [
    "prefers-color-scheme",
    "prefers-reduced-motion",
    "prefers-reduced-data",
];

pub struct UserPreferences;

impl Rule for UserPreferences {
    fn info(&self) -> &'static CheckInfo {
        &INFO
    }

    fn apply(&self, page: &PageData) -> CheckResult {
        let doc = &page.document;
        let sources = doc
            .stylesheets
            .iter()
            .filter_map(|s| s.media.as_deref())
            .chain(doc.inline_styles.iter().map(|s| s.as_str()))
            .map(|s| s.to_ascii_lowercase())
            .collect::<Vec<_>>();

        let found: Vec<&str> = PREFERENCE_QUERIES
            .iter()
            .copied()
            .filter(|q| sources.iter().any(|s| s.contains(q)))
            .collect();
        let color_scheme_meta = doc.meta("color-scheme").is_some();

        if !found.is_empty() || color_scheme_meta {
            let mut adapted = found.join(", ");
            if color_scheme_meta {
                if !adapted.is_empty() {
                    adapted.push_str(", ");
                }
                adapted.push_str("meta color-scheme");
            }
            return CheckResult::pass(
                &INFO,
                format!("The page adapts to user preferences ({adapted})."),
            );
        }

        CheckResult::warn(
            &INFO,
            "No user-preference media queries found in the page markup.",
        )
        .with_details("External stylesheets are not inspected.")
        .with_recommendation("Provide prefers-color-scheme and prefers-reduced-motion variants.")
        .with_resource(
            "https://developer.mozilla.org/en-US/docs/Web/CSS/@media/prefers-color-scheme",
        )
        .with_resource(WSG_URL)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::checks::test_support::page;
    use crate::model::Status;

    #[test]
    fn media_attribute_counts() {
        let html = r#"<head>
            <link rel="stylesheet" href="d.css" media="(prefers-color-scheme: dark)">
        </head>"#;
        let result = UserPreferences.apply(&page(html, &[]));
        assert_eq!(result.status, Status::Pass);
        assert!(result.message.contains("prefers-color-scheme"));
    }

    #[test]
    fn inline_style_and_meta_count() {
        let html = r#"<head><meta name="color-scheme" content="light dark">
            <style>@media (PREFERS-REDUCED-MOTION: reduce) {}</style></head>"#;
        let result = UserPreferences.apply(&page(html, &[]));
        assert_eq!(
            result.message,
            "The page adapts to user preferences (prefers-reduced-motion, meta color-scheme)."
        );
    }

    #[test]
    fn nothing_found_warns() {
        let result = UserPreferences.apply(&page("<head><style>body{}</style></head>", &[]));
        assert_eq!(result.status, Status::Warn);
        assert_eq!(result.impact, Impact::Low);
    }
}
