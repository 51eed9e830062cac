/// 2.7: images below the first should load lazily and declare their dimensions.
use crate::model::{Category, CheckInfo, CheckResult, Impact};
use crate::page::PageData;

use super::{Rule, WSG_URL};

pub static INFO: CheckInfo = CheckInfo {
    guideline_id: "2.7",
    guideline_name: "Avoid Unnecessary or an Overabundance of Assets",
    success_criterion: "Media is deferred until needed and reserves its layout space.",
    category: Category::Ux,
    impact: Impact::Medium,
    machine_testable: true,
};

pub struct OptimizedAssets;

impl Rule for OptimizedAssets {
    fn info(&self) -> &'static CheckInfo {
        &INFO
    }

    fn apply(&self, page: &PageData) -> CheckResult {
        let images = &page.document.images;
        if images.is_empty() {
            return CheckResult::not_applicable(&INFO, "No images found on the page.");
        }

        // the first image is usually above the fold and should load eagerly
        let eager = images
            .iter()
            .skip(1)
            .filter(|img| img.loading.as_deref() != Some("lazy"))
            .count();
        let unsized_images = images.iter().filter(|img| !img.has_dimensions).count();

        if eager == 0 && unsized_images == 0 {
            return CheckResult::pass(
                &INFO,
                format!("All {} images are lazy-loaded where appropriate and sized.", images.len()),
            );
        }

        CheckResult::warn(
            &INFO,
            format!(
                "{eager} images load eagerly and {unsized_images} have no width/height out of {}.",
                images.len()
            ),
        )
        .with_details("Images after the first are expected to use loading=\"lazy\".")
        .with_recommendation(
            "Add loading=\"lazy\" to offscreen images and set width and height \
             attributes to avoid layout shifts.",
        )
        .with_resource("https://developer.mozilla.org/en-US/docs/Web/Performance/Lazy_loading")
        .with_resource(WSG_URL)
    }
}
