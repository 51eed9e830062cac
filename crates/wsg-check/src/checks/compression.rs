/// 4.3: the document is served compressed.
use crate::model::{Category, CheckInfo, CheckResult, Impact};
use crate::page::PageData;

use super::{Rule, WSG_URL};

pub static INFO: CheckInfo = CheckInfo {
    guideline_id: "4.3",
    guideline_name: "Compress Your Files",
    success_criterion: "Text responses are compressed in transit.",
    category: Category::Hosting,
    impact: Impact::High,
    machine_testable: true,
};

/// Below this size compression overhead outweighs the gain.
pub const MIN_COMPRESSIBLE_BYTES: u64 = 1024;

pub struct Compression;

impl Rule for Compression {
    fn info(&self) -> &'static CheckInfo {
        &INFO
    }

    fn apply(&self, page: &PageData) -> CheckResult {
        if page.weight.compressed {
            let encoding = page.fetch.header("content-encoding").unwrap_or_default();
            return CheckResult::pass(
                &INFO,
                format!("The document is served with {encoding} encoding."),
            );
        }
        if page.weight.document_bytes < MIN_COMPRESSIBLE_BYTES {
            return CheckResult::not_applicable(
                &INFO,
                "The document is too small to benefit from compression.",
            );
        }
        CheckResult::fail(&INFO, "The document is served uncompressed.")
            .with_recommendation("Enable Brotli or gzip compression for text responses.")
            .with_resource(
                "https://developer.mozilla.org/en-US/docs/Web/HTTP/Headers/Content-Encoding",
            )
            .with_resource(WSG_URL)
    }
}
