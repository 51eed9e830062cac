/// Impact-weighted scoring.
///
/// ```text
/// score = round_half_up( Σ points(status) × weight(impact) / Σ weight(impact) )
///
/// points:  pass 100, warn 50, fail 0   (info / not-applicable are skipped entirely)
/// weight:  high 3, medium 2, low 1
/// ```
///
/// With nothing to score the result is 100. The same rule applies per category and
/// overall; the category set is always the full `Category::ALL`.
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::model::{Category, CategoryScore, CheckResult, Impact, Status};

/// Overall score plus one entry per known category.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct ScoreSummary {
    pub overall_score: u8,
    pub category_scores: Vec<CategoryScore>,
}

/// Points a status contributes, or `None` when it is not scored.
pub fn status_points(status: Status) -> Option<u32> {
    match status {
        Status::Pass => Some(100),
        Status::Warn => Some(50),
        Status::Fail => Some(0),
        Status::Info | Status::NotApplicable => None,
    }
}

pub fn impact_weight(impact: Impact) -> u32 {
    match impact {
        Impact::High => 3,
        Impact::Medium => 2,
        Impact::Low => 1,
    }
}

fn weighted_score<'a>(results: impl IntoIterator<Item = &'a CheckResult>) -> u8 {
    let (points, weights) = results
        .into_iter()
        .filter_map(|r| status_points(r.status).map(|p| (p, impact_weight(r.impact))))
        .fold((0u64, 0u64), |(points, weights), (p, w)| {
            (points + u64::from(p) * u64::from(w), weights + u64::from(w))
        });

    if weights == 0 {
        return 100;
    }
    // half-up rounding in integers: floor((2p + w) / 2w)
    let rounded = (2 * points + weights) / (2 * weights);
    rounded.min(100) as u8
}

pub fn calculate_overall_score(results: &[CheckResult]) -> u8 {
    weighted_score(results)
}

pub fn calculate_category_score(results: &[CheckResult], category: Category) -> CategoryScore {
    let mut summary = CategoryScore::empty(category);
    let in_category: Vec<&CheckResult> =
        results.iter().filter(|r| r.category == category).collect();

    for r in &in_category {
        summary.total_checks += 1;
        match r.status {
            Status::Pass => summary.passed += 1,
            Status::Fail => summary.failed += 1,
            Status::Warn => summary.warned += 1,
            Status::Info | Status::NotApplicable => summary.not_applicable += 1,
        }
    }
    summary.scored_checks = summary.passed + summary.failed + summary.warned;
    summary.score = weighted_score(in_category);
    summary
}

pub fn score_results(results: &[CheckResult]) -> ScoreSummary {
    ScoreSummary {
        overall_score: calculate_overall_score(results),
        category_scores: Category::ALL
            .iter()
            .map(|&category| calculate_category_score(results, category))
            .collect(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn result(status: Status, impact: Impact, category: Category) -> CheckResult {
        CheckResult {
            guideline_id: "0.0".to_string(),
            guideline_name: "test".to_string(),
            success_criterion: String::new(),
            status,
            score: status.score(),
            message: String::new(),
            details: None,
            recommendation: None,
            resources: Vec::new(),
            impact,
            category,
            machine_testable: true,
        }
    }

    fn web(status: Status, impact: Impact) -> CheckResult {
        result(status, impact, Category::WebDev)
    }

    #[test]
    fn empty_input_is_neutral() {
        assert_eq!(calculate_overall_score(&[]), 100);

        for category in Category::ALL {
            assert_eq!(calculate_category_score(&[], category), CategoryScore::empty(category));
        }

        let summary = score_results(&[]);
        assert_eq!(summary.overall_score, 100);
        assert_eq!(summary.category_scores.len(), Category::ALL.len());
        assert!(summary.category_scores.iter().all(|c| c.score == 100 && c.total_checks == 0));
    }

    #[test]
    fn high_impact_failure_outweighs_medium_pass() {
        let results = [web(Status::Fail, Impact::High), web(Status::Pass, Impact::Medium)];
        // (0×3 + 100×2) / 5
        assert_eq!(calculate_overall_score(&results), 40);
    }

    #[test]
    fn info_and_not_applicable_are_invisible() {
        let results = [
            web(Status::Info, Impact::High),
            web(Status::NotApplicable, Impact::High),
            web(Status::Pass, Impact::Medium),
        ];
        assert_eq!(calculate_overall_score(&results), 100);

        let only_unscored = [
            web(Status::Info, Impact::High),
            web(Status::NotApplicable, Impact::Low),
        ];
        assert_eq!(calculate_overall_score(&only_unscored), 100);
    }

    #[test]
    fn rounds_to_nearest() {
        let results = [
            web(Status::Fail, Impact::Low),
            web(Status::Pass, Impact::Low),
            web(Status::Pass, Impact::Low),
        ];
        // 66.67
        assert_eq!(calculate_overall_score(&results), 67);

        let results = [
            web(Status::Fail, Impact::Low),
            web(Status::Pass, Impact::Low),
            web(Status::Fail, Impact::Low),
        ];
        // 33.33
        assert_eq!(calculate_overall_score(&results), 33);
    }

    #[test]
    fn exact_halves_round_up() {
        // (50×1 + 0×1 + 100×1 + 100×1) / 4 = 62.5
        let results = [
            web(Status::Warn, Impact::Low),
            web(Status::Fail, Impact::Low),
            web(Status::Pass, Impact::Low),
            web(Status::Pass, Impact::Low),
        ];
        assert_eq!(calculate_overall_score(&results), 63);
    }

    #[test]
    fn warn_counts_half() {
        assert_eq!(calculate_overall_score(&[web(Status::Warn, Impact::High)]), 50);
    }

    #[test]
    fn category_score_counts_by_status() {
        let results = [
            result(Status::Pass, Impact::High, Category::Hosting),
            result(Status::Fail, Impact::Low, Category::Hosting),
            result(Status::Warn, Impact::Medium, Category::Hosting),
            result(Status::NotApplicable, Impact::High, Category::Hosting),
            result(Status::Info, Impact::High, Category::Hosting),
            result(Status::Fail, Impact::High, Category::Ux),
        ];
        let hosting = calculate_category_score(&results, Category::Hosting);
        assert_eq!(hosting.total_checks, 5);
        assert_eq!(hosting.passed, 1);
        assert_eq!(hosting.failed, 1);
        assert_eq!(hosting.warned, 1);
        assert_eq!(hosting.not_applicable, 2);
        assert_eq!(hosting.scored_checks, 3);
        assert_eq!(
            hosting.passed + hosting.failed + hosting.warned + hosting.not_applicable,
            hosting.total_checks
        );
        // (100×3 + 0×1 + 50×2) / 6 = 66.67
        assert_eq!(hosting.score, 67);
    }

    #[test]
    fn every_category_is_reported() {
        let results = [
            result(Status::Fail, Impact::High, Category::Ux),
            result(Status::Pass, Impact::Low, Category::Ux),
        ];
        let summary = score_results(&results);
        let categories: Vec<Category> =
            summary.category_scores.iter().map(|c| c.category).collect();
        assert_eq!(categories, Category::ALL.to_vec());

        let ux = &summary.category_scores[0];
        assert_eq!(ux.total_checks, 2);
        assert_eq!(ux.score, 25);
        for untouched in &summary.category_scores[1..] {
            assert_eq!(untouched.score, 100);
            assert_eq!(untouched.total_checks, 0);
            assert_eq!(untouched.scored_checks, 0);
        }
        assert_eq!(summary.overall_score, 25);
    }
}
