/// The check contract.
///
/// A check maps read-only page data to one `CheckResult`, possibly asynchronously. Checks
/// should report problems as results and reserve `CheckError` for cases where they could
/// not evaluate at all; the runner turns errors and panics into `fail` results.
use std::any::Any;

use futures::future::BoxFuture;

use crate::model::{CheckInfo, CheckResult};
use crate::page::PageData;

pub type CheckFuture<'a> = BoxFuture<'a, Result<CheckResult, CheckError>>;

/// Why a check could not produce a result.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CheckError {
    #[error("guideline {guideline_id}: {message}")]
    Guideline {
        guideline_id: String,
        message: String,
    },

    #[error("{0}")]
    Failed(String),

    #[error("check panicked: {0}")]
    Panicked(String),
}

impl CheckError {
    pub fn for_guideline(guideline_id: impl Into<String>, message: impl Into<String>) -> Self {
        CheckError::Guideline {
            guideline_id: guideline_id.into(),
            message: message.into(),
        }
    }

    /// Guideline the failure is attributed to, if the check said so.
    pub fn guideline_id(&self) -> Option<&str> {
        match self {
            CheckError::Guideline { guideline_id, .. } => Some(guideline_id),
            CheckError::Failed(_) | CheckError::Panicked(_) => None,
        }
    }

    /// Recover an error from a panic payload. A payload raised with
    /// `std::panic::panic_any(CheckError)` keeps its guideline attribution.
    pub fn from_panic(payload: Box<dyn Any + Send>) -> Self {
        let payload = match payload.downcast::<CheckError>() {
            Ok(err) => return *err,
            Err(other) => other,
        };
        let message = if let Some(s) = payload.downcast_ref::<&'static str>() {
            (*s).to_string()
        } else if let Some(s) = payload.downcast_ref::<String>() {
            s.clone()
        } else {
            "non-string panic payload".to_string()
        };
        CheckError::Panicked(message)
    }
}

/// A single guideline evaluation.
pub trait Check: Send + Sync {
    fn evaluate<'a>(&'a self, page: &'a PageData) -> CheckFuture<'a>;

    /// Metadata for listing; ad-hoc checks may have none.
    fn info(&self) -> Option<&CheckInfo> {
        None
    }
}

/// Synchronous closures are checks.
impl<F> Check for F
where
    F: Fn(&PageData) -> Result<CheckResult, CheckError> + Send + Sync,
{
    fn evaluate<'a>(&'a self, page: &'a PageData) -> CheckFuture<'a> {
        Box::pin(async move { self(page) })
    }
}
