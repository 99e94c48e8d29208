use crate::latency::types::LatencyRecord;
use moka::sync::Cache;
use std::sync::Arc;
use std::time::Duration;

/// TTL cache for the loaded latency table, keyed by database path so
/// distinct databases never share an entry. Stores the immutable snapshot
/// the report pipeline works over; expiry is the only invalidation.
pub struct TableCache {
    inner: Cache<String, Arc<Vec<LatencyRecord>>>,
}

impl TableCache {
    pub fn new(ttl_secs: u64) -> Self {
        Self {
            inner: Cache::builder()
                .time_to_live(Duration::from_secs(ttl_secs))
                .max_capacity(16)
                .build(),
        }
    }

    pub fn get(&self, key: &str) -> Option<Arc<Vec<LatencyRecord>>> {
        self.inner.get(key)
    }

    pub fn insert(&self, key: String, records: Arc<Vec<LatencyRecord>>) {
        self.inner.insert(key, records);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn record(provider: &str) -> LatencyRecord {
        LatencyRecord {
            provider: provider.to_string(),
            latency: 1.0,
            created_at: Utc::now(),
        }
    }

    #[test]
    fn test_hit_within_ttl() {
        let cache = TableCache::new(60);
        cache.insert("a.db".to_string(), Arc::new(vec![record("openai")]));
        assert!(cache.get("a.db").is_some());
    }

    #[test]
    fn test_keys_are_isolated() {
        let cache = TableCache::new(60);
        cache.insert("a.db".to_string(), Arc::new(vec![record("openai")]));
        assert!(cache.get("b.db").is_none());
    }

    #[test]
    fn test_expires_after_ttl() {
        let cache = TableCache::new(1);
        cache.insert("a.db".to_string(), Arc::new(vec![record("openai")]));
        std::thread::sleep(Duration::from_millis(1300));
        assert!(cache.get("a.db").is_none());
    }
}
