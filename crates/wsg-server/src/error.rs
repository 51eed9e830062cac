use std::time::Duration;

use wsg_common::error::FetchError;

#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error(transparent)]
    Fetch(#[from] FetchError),

    #[error("config error: {0}")]
    Config(String),

    #[error("{host} was audited recently, try again in ~{}ms", .retry_after.as_millis())]
    Throttled { host: String, retry_after: Duration },
}
