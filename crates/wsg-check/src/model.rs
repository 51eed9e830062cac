/// Core data model for WSG audits.
///
/// A `CheckResult` is produced once per check per run and never changed afterwards.
/// The scorer only reads `status` and `impact`; `score` is derived from `status` by the
/// constructors and kept alongside it for report consumers.
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Outcome of one guideline evaluation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "kebab-case")]
pub enum Status {
    Pass,
    Fail,
    Warn,
    Info,
    NotApplicable,
}

impl Status {
    /// Canonical score for this status. Info and not-applicable get the neutral 100,
    /// which is never aggregated.
    pub fn score(self) -> u8 {
        match self {
            Status::Pass => 100,
            Status::Warn => 50,
            Status::Fail => 0,
            Status::Info | Status::NotApplicable => 100,
        }
    }

    /// Whether results with this status contribute to aggregate scores.
    pub fn is_scored(self) -> bool {
        matches!(self, Status::Pass | Status::Warn | Status::Fail)
    }
}

impl std::fmt::Display for Status {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Status::Pass => write!(f, "pass"),
            Status::Fail => write!(f, "fail"),
            Status::Warn => write!(f, "warn"),
            Status::Info => write!(f, "info"),
            Status::NotApplicable => write!(f, "not-applicable"),
        }
    }
}

/// Severity tier that scales a result's influence on aggregate scores.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema, Default,
)]
#[serde(rename_all = "lowercase")]
pub enum Impact {
    High,
    Medium,
    /// Also absorbs tiers this crate does not know.
    #[default]
    #[serde(other)]
    Low,
}

impl std::fmt::Display for Impact {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Impact::High => write!(f, "high"),
            Impact::Medium => write!(f, "medium"),
            Impact::Low => write!(f, "low"),
        }
    }
}

/// WSG guideline sections used to sub-aggregate scores. The set is closed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "kebab-case")]
pub enum Category {
    Ux,
    WebDev,
    Hosting,
    Business,
}

impl Category {
    /// Every known category, in report order.
    pub const ALL: [Category; 4] = [
        Category::Ux,
        Category::WebDev,
        Category::Hosting,
        Category::Business,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Category::Ux => "ux",
            Category::WebDev => "web-dev",
            Category::Hosting => "hosting",
            Category::Business => "business",
        }
    }

    pub fn display_name(self) -> &'static str {
        match self {
            Category::Ux => "User Experience Design",
            Category::WebDev => "Web Development",
            Category::Hosting => "Hosting, Infrastructure and Systems",
            Category::Business => "Business Strategy and Product Management",
        }
    }
}

impl std::fmt::Display for Category {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Static description of the guideline a check evaluates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, JsonSchema)]
pub struct CheckInfo {
    /// Stable WSG identifier, e.g. "3.8".
    pub guideline_id: &'static str,
    pub guideline_name: &'static str,
    pub success_criterion: &'static str,
    pub category: Category,
    pub impact: Impact,
    pub machine_testable: bool,
}

/// The outcome of evaluating one guideline against one page.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct CheckResult {
    pub guideline_id: String,
    pub guideline_name: String,
    pub success_criterion: String,
    pub status: Status,
    pub score: u8,
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub recommendation: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub resources: Vec<String>,
    #[serde(default)]
    pub impact: Impact,
    pub category: Category,
    pub machine_testable: bool,
}

impl CheckResult {
    /// Build a result for `info` with the score derived from `status`.
    pub fn new(info: &CheckInfo, status: Status, message: impl Into<String>) -> Self {
        Self {
            guideline_id: info.guideline_id.to_string(),
            guideline_name: info.guideline_name.to_string(),
            success_criterion: info.success_criterion.to_string(),
            status,
            score: status.score(),
            message: message.into(),
            details: None,
            recommendation: None,
            resources: Vec::new(),
            impact: info.impact,
            category: info.category,
            machine_testable: info.machine_testable,
        }
    }

    pub fn pass(info: &CheckInfo, message: impl Into<String>) -> Self {
        Self::new(info, Status::Pass, message)
    }

    pub fn warn(info: &CheckInfo, message: impl Into<String>) -> Self {
        Self::new(info, Status::Warn, message)
    }

    pub fn fail(info: &CheckInfo, message: impl Into<String>) -> Self {
        Self::new(info, Status::Fail, message)
    }

    pub fn info(info: &CheckInfo, message: impl Into<String>) -> Self {
        Self::new(info, Status::Info, message)
    }

    pub fn not_applicable(info: &CheckInfo, message: impl Into<String>) -> Self {
        Self::new(info, Status::NotApplicable, message)
    }

    /// Result standing in for a check that could not complete.
    ///
    /// Category and impact are fixed (web-dev, high) because the failing check's own
    /// metadata is generally not known at this point.
    pub fn execution_failure(
        guideline_id: impl Into<String>,
        error: impl std::fmt::Display,
    ) -> Self {
        Self {
            guideline_id: guideline_id.into(),
            guideline_name: "Check execution error".to_string(),
            success_criterion: "The check must complete without error.".to_string(),
            status: Status::Fail,
            score: Status::Fail.score(),
            message: format!("Check failed to run: {error}"),
            details: None,
            recommendation: None,
            resources: Vec::new(),
            impact: Impact::High,
            category: Category::WebDev,
            machine_testable: true,
        }
    }

    pub fn with_details(mut self, details: impl Into<String>) -> Self {
        self.details = Some(details.into());
        self
    }

    pub fn with_recommendation(mut self, recommendation: impl Into<String>) -> Self {
        self.recommendation = Some(recommendation.into());
        self
    }

    pub fn with_resource(mut self, link: impl Into<String>) -> Self {
        self.resources.push(link.into());
        self
    }
}

/// Aggregate for one category.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct CategoryScore {
    pub category: Category,
    pub score: u8,
    pub total_checks: usize,
    pub passed: usize,
    pub failed: usize,
    pub warned: usize,
    /// Info and not-applicable results; neither is scored.
    pub not_applicable: usize,
    pub scored_checks: usize,
}

impl CategoryScore {
    /// Neutral aggregate for a category where nothing ran.
    pub fn empty(category: Category) -> Self {
        Self {
            category,
            score: 100,
            total_checks: 0,
            passed: 0,
            failed: 0,
            warned: 0,
            not_applicable: 0,
            scored_checks: 0,
        }
    }
}

/// Full output of one `check(url)` pass.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct RunResult {
    pub url: String,
    pub final_url: String,
    /// RFC 3339 timestamp taken when the run started.
    pub timestamp: String,
    pub duration_ms: u64,
    pub overall_score: u8,
    pub category_scores: Vec<CategoryScore>,
    pub checks: Vec<CheckResult>,
    pub page_weight: u64,
    pub co2_per_page_view: f64,
    pub co2_model: String,
    pub green_hosting: bool,
}
