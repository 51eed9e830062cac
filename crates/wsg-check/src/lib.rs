pub mod carbon;
pub mod check;
pub mod checker;
pub mod checks;
pub mod document;
pub mod model;
pub mod page;
pub mod runner;
pub mod scoring;

pub use carbon::{CarbonEstimate, CarbonEstimator, OfflineEstimator};
pub use check::{Check, CheckError, CheckFuture};
pub use checker::WsgChecker;
pub use model::{Category, CategoryScore, CheckInfo, CheckResult, Impact, RunResult, Status};
pub use page::{FetchMetadata, PageData, PageError, PageFetcher};
pub use runner::CheckRunner;
pub use scoring::{calculate_category_score, calculate_overall_score, score_results};
