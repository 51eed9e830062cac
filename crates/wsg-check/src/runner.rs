/// Check runner.
///
/// Holds an ordered list of checks and evaluates all of them against one page. Every
/// check future is polled concurrently on the caller's task; results come back in
/// registration order, one per check, whatever order they settle in. A check that
/// returns an error or panics yields a synthesized `fail` result instead of aborting
/// the batch.
use std::panic::AssertUnwindSafe;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::{Duration, SystemTime, UNIX_EPOCH};

use futures::future::join_all;
use futures::FutureExt;
use sha2::{Digest, Sha256};
use tracing::{debug, info};

use crate::check::{Check, CheckError};
use crate::model::{CheckInfo, CheckResult};
use crate::page::PageData;

static FAILURE_COUNTER: AtomicU64 = AtomicU64::new(0);

/// Prefix of guideline ids synthesized for failures with no attribution.
pub const FAILURE_ID_PREFIX: &str = "check-error-";

#[derive(Clone, Default)]
pub struct CheckRunner {
    checks: Vec<Arc<dyn Check>>,
}

impl CheckRunner {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&mut self, check: impl Check + 'static) -> &mut Self {
        self.checks.push(Arc::new(check));
        self
    }

    pub fn register_all(&mut self, checks: impl IntoIterator<Item = Arc<dyn Check>>) -> &mut Self {
        self.checks.extend(checks);
        self
    }

    pub fn len(&self) -> usize {
        self.checks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.checks.is_empty()
    }

    /// Metadata of registered checks that publish it, in registration order.
    pub fn infos(&self) -> Vec<CheckInfo> {
        self.checks.iter().filter_map(|c| c.info().copied()).collect()
    }

    /// Evaluate every registered check against `page`.
    pub async fn run(&self, page: &PageData) -> Vec<CheckResult> {
        let outcomes = join_all(
            self.checks
                .iter()
                .map(|check| evaluate_guarded(check.as_ref(), page)),
        )
        .await;

        let mut failures = 0usize;
        let results: Vec<CheckResult> = outcomes
            .into_iter()
            .enumerate()
            .map(|(position, outcome)| {
                outcome.unwrap_or_else(|err| {
                    failures += 1;
                    let guideline_id = err
                        .guideline_id()
                        .map(str::to_string)
                        .unwrap_or_else(new_failure_id);
                    debug!(
                        position,
                        guideline_id = %guideline_id,
                        error = %err,
                        "check failed to run"
                    );
                    CheckResult::execution_failure(guideline_id, &err)
                })
            })
            .collect();

        info!(checks = results.len(), failures, "check run complete");
        results
    }
}

/// Run one check, folding errors and panics into `Err`. The call itself happens inside
/// the guarded future so a panic before the check's first await is caught too.
async fn evaluate_guarded(check: &dyn Check, page: &PageData) -> Result<CheckResult, CheckError> {
    AssertUnwindSafe(async move { check.evaluate(page).await })
        .catch_unwind()
        .await
        .unwrap_or_else(|payload| Err(CheckError::from_panic(payload)))
}

fn new_failure_id() -> String {
    let now = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_else(|_| Duration::from_secs(0));
    let counter = FAILURE_COUNTER.fetch_add(1, Ordering::Relaxed);

    let mut h = Sha256::new();
    h.update(now.as_nanos().to_le_bytes());
    h.update(std::process::id().to_le_bytes());
    h.update(counter.to_le_bytes());
    let digest = h.finalize();
    let hex: String = digest[..6].iter().map(|b| format!("{b:02x}")).collect();
    format!("{FAILURE_ID_PREFIX}{hex}")
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;
    use std::time::Duration;

    use super::*;
    use crate::check::CheckFuture;
    use crate::model::{Category, Impact, Status};

    const A: CheckInfo = CheckInfo {
        guideline_id: "3.1",
        guideline_name: "A",
        success_criterion: "a",
        category: Category::WebDev,
        impact: Impact::Medium,
        machine_testable: true,
    };
    const B: CheckInfo = CheckInfo {
        guideline_id: "4.2",
        guideline_name: "B",
        success_criterion: "b",
        category: Category::Hosting,
        impact: Impact::Low,
        machine_testable: true,
    };

    fn passing(info: &'static CheckInfo) -> impl Check {
        move |_: &PageData| -> Result<CheckResult, CheckError> { Ok(CheckResult::pass(info, "ok")) }
    }

    /// Yields to the executor before resolving.
    struct Delayed {
        info: &'static CheckInfo,
        delay: Duration,
    }

    impl Check for Delayed {
        fn evaluate<'a>(&'a self, _page: &'a PageData) -> CheckFuture<'a> {
            Box::pin(async move {
                tokio::time::sleep(self.delay).await;
                Ok(CheckResult::warn(self.info, "slow"))
            })
        }
    }

    struct Rejecting;

    impl Check for Rejecting {
        fn evaluate<'a>(&'a self, _page: &'a PageData) -> CheckFuture<'a> {
            Box::pin(async {
                tokio::task::yield_now().await;
                Err(CheckError::Failed("upstream timed out".to_string()))
            })
        }
    }

    #[tokio::test]
    async fn results_follow_registration_order() {
        let mut runner = CheckRunner::new();
        runner
            .register(Delayed {
                info: &A,
                delay: Duration::from_millis(50),
            })
            .register(passing(&B));

        let results = runner.run(&PageData::default()).await;
        assert_eq!(results.len(), 2);
        assert_eq!(results[0].guideline_id, "3.1");
        assert_eq!(results[0].status, Status::Warn);
        assert_eq!(results[1].guideline_id, "4.2");
    }

    #[tokio::test]
    async fn checks_run_concurrently() {
        let mut runner = CheckRunner::new();
        for _ in 0..5 {
            runner.register(Delayed {
                info: &A,
                delay: Duration::from_millis(100),
            });
        }
        let started = std::time::Instant::now();
        let results = runner.run(&PageData::default()).await;
        assert_eq!(results.len(), 5);
        assert!(started.elapsed() < Duration::from_millis(400));
    }

    #[tokio::test]
    async fn a_panicking_check_does_not_sink_the_batch() {
        let mut runner = CheckRunner::new();
        runner
            .register(passing(&A))
            .register(|_: &PageData| -> Result<CheckResult, CheckError> {
                panic!("selector exploded")
            })
            .register(passing(&B));

        let results = runner.run(&PageData::default()).await;
        let statuses: Vec<Status> = results.iter().map(|r| r.status).collect();
        assert_eq!(statuses, vec![Status::Pass, Status::Fail, Status::Pass]);

        let failed = &results[1];
        assert_eq!(failed.score, 0);
        assert_eq!(failed.impact, Impact::High);
        assert_eq!(failed.category, Category::WebDev);
        assert!(failed.machine_testable);
        assert!(failed.message.contains("selector exploded"));
        assert!(failed.guideline_id.starts_with(FAILURE_ID_PREFIX));
    }

    #[tokio::test]
    async fn async_rejection_is_converted() {
        let mut runner = CheckRunner::new();
        runner.register(passing(&A)).register(Rejecting).register(passing(&B));

        let results = runner.run(&PageData::default()).await;
        assert_eq!(results.len(), 3);
        assert_eq!(results[0].status, Status::Pass);
        assert_eq!(results[1].status, Status::Fail);
        assert!(results[1].message.contains("upstream timed out"));
        assert_eq!(results[2].status, Status::Pass);
    }

    #[tokio::test]
    async fn typed_errors_keep_their_guideline_id() {
        let mut runner = CheckRunner::new();
        runner
            .register(|_: &PageData| -> Result<CheckResult, CheckError> {
                Err(CheckError::for_guideline("3.5", "alt text unavailable"))
            })
            .register(|_: &PageData| -> Result<CheckResult, CheckError> {
                std::panic::panic_any(CheckError::for_guideline("3.9", "bad state"))
            });

        let results = runner.run(&PageData::default()).await;
        assert_eq!(results[0].guideline_id, "3.5");
        assert_eq!(results[0].status, Status::Fail);
        assert_eq!(results[0].score, 0);
        assert_eq!(results[1].guideline_id, "3.9");
    }

    #[tokio::test]
    async fn placeholder_ids_are_unique_per_failure() {
        let mut runner = CheckRunner::new();
        for _ in 0..4 {
            runner.register(|_: &PageData| -> Result<CheckResult, CheckError> {
                Err(CheckError::Failed("nope".to_string()))
            });
        }
        let first = runner.run(&PageData::default()).await;
        let second = runner.run(&PageData::default()).await;

        let ids: HashSet<&str> = first
            .iter()
            .chain(second.iter())
            .map(|r| r.guideline_id.as_str())
            .collect();
        assert_eq!(ids.len(), 8);
        assert!(ids.iter().all(|id| id.starts_with(FAILURE_ID_PREFIX)));
    }

    #[tokio::test]
    async fn registrations_persist_across_runs() {
        let mut runner = CheckRunner::new();
        let shared: Vec<Arc<dyn Check>> = vec![Arc::new(passing(&A)), Arc::new(passing(&B))];
        runner.register_all(shared);
        assert_eq!(runner.len(), 2);

        let first = runner.run(&PageData::default()).await;
        let second = runner.run(&PageData::default()).await;
        assert_eq!(first, second);
    }

    #[tokio::test]
    async fn empty_runner_yields_no_results() {
        let runner = CheckRunner::new();
        assert!(runner.is_empty());
        assert!(runner.run(&PageData::default()).await.is_empty());
    }
}
