/// Error types for the shared infrastructure: page fetching and the Redis cache.
///
/// Server-level errors wrap these via `#[from]`.

#[derive(Debug, thiserror::Error)]
pub enum CommonError {
    #[error("redis error: {0}")]
    Redis(#[from] redis::RedisError),

    #[error("redis unavailable, degrading gracefully")]
    RedisUnavailable,
}

#[derive(Debug, thiserror::Error)]
pub enum FetchError {
    #[error("request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("{url} returned HTTP {status}")]
    Status { status: u16, url: String },

    #[error("robots.txt disallows fetching {url}")]
    RobotsDisallowed { url: String },

    #[error("response exceeds the {limit} byte limit")]
    TooLarge { limit: usize },

    #[error("invalid url: {0}")]
    InvalidUrl(String),
}
