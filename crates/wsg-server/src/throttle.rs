use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};

use tokio::sync::Mutex;
use tracing::debug;

use crate::error::AppError;

/// Keeps repeated audits of the same site apart.
///
/// Each audited host may be fetched at most once per `interval`; different hosts
/// never wait on each other. Hosts compare case-insensitively.
#[derive(Clone)]
pub struct HostThrottle {
    interval: Duration,
    last_audit: Arc<Mutex<HashMap<String, Instant>>>,
}

impl HostThrottle {
    /// `None` for a zero interval, which means no throttling.
    pub fn new(interval: Duration) -> Option<Self> {
        if interval.is_zero() {
            return None;
        }
        Some(Self {
            interval,
            last_audit: Arc::new(Mutex::new(HashMap::new())),
        })
    }

    /// Claims the next audit slot for `host`, or reports how long until it opens.
    pub async fn acquire(&self, host: &str) -> Result<(), AppError> {
        let host = host.to_ascii_lowercase();
        let now = Instant::now();
        let mut last_audit = self.last_audit.lock().await;
        last_audit.retain(|_, at| now.duration_since(*at) < self.interval);

        if let Some(at) = last_audit.get(&host) {
            let retry_after = self.interval.saturating_sub(now.duration_since(*at));
            debug!(
                host = %host,
                retry_after_ms = retry_after.as_millis() as u64,
                "audit throttled"
            );
            return Err(AppError::Throttled { host, retry_after });
        }
        last_audit.insert(host, now);
        Ok(())
    }
}
