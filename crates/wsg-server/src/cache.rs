/// Redis cache for green-hosting lookups.
///
/// Key schema:
/// - `wsg:v1:green:{host}`: `"1"` or `"0"` (TTL: 24h)
use tracing::warn;

use wsg_common::redis::RedisCache;

const KEY_PREFIX: &str = "wsg:v1:";
const GREEN_TTL_SECS: u64 = 24 * 3600;

pub struct GreenCache {
    redis: RedisCache,
}

impl GreenCache {
    pub fn new(redis: RedisCache) -> Self {
        Self { redis }
    }

    pub async fn get_green(&self, host: &str) -> Option<bool> {
        let key = green_key(host);
        match self.redis.get(&key).await?.as_str() {
            "1" => Some(true),
            "0" => Some(false),
            other => {
                warn!(key, value = other, "unexpected cached green-hosting value");
                None
            }
        }
    }

    pub async fn set_green(&self, host: &str, green: bool) {
        let value = if green { "1" } else { "0" };
        self.redis.set_with_ttl(&green_key(host), value, GREEN_TTL_SECS).await;
    }
}

fn green_key(host: &str) -> String {
    format!("{KEY_PREFIX}green:{}", host.to_ascii_lowercase())
}
