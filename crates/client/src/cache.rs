#![forbid(unsafe_code)]

//! Session-owned response cache keyed by request signature.
//!
//! Owned by the session/view controller, not a process-wide singleton.
//! The session model is single-threaded, so there is no interior locking;
//! callers pass their millisecond clock, which keeps expiry deterministic
//! under test.

use indexmap::IndexMap;
use serde_json::Value;

struct CacheEntry {
    value: Value,
    expires_at_ms: i64,
}

pub struct ResponseCache {
    max_entries: usize,
    ttl_ms: i64,
    entries: IndexMap<String, CacheEntry>,
}

impl ResponseCache {
    pub fn new(max_entries: usize, ttl_ms: i64) -> Self {
        Self {
            max_entries: max_entries.max(1),
            ttl_ms: ttl_ms.max(1),
            entries: IndexMap::new(),
        }
    }

    /// Deterministic signature for a request: serde_json renders object
    /// keys in sorted order, so equal payloads produce equal keys.
    pub fn signature(tool_name: &str, payload: &Value) -> String {
        format!("{tool_name}:{payload}")
    }

    pub fn get(&mut self, key: &str, now_ms: i64) -> Option<Value> {
        let entry = self.entries.get(key)?;
        if entry.expires_at_ms <= now_ms {
            self.entries.shift_remove(key);
            return None;
        }
        Some(entry.value.clone())
    }

    pub fn insert(&mut self, key: String, value: Value, now_ms: i64) {
        self.evict_expired(now_ms);
        self.entries.insert(
            key,
            CacheEntry {
                value,
                expires_at_ms: now_ms + self.ttl_ms,
            },
        );
        while self.entries.len() > self.max_entries {
            self.entries.shift_remove_index(0);
        }
    }

    pub fn remove(&mut self, key: &str) -> bool {
        self.entries.shift_remove(key).is_some()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    fn evict_expired(&mut self, now_ms: i64) {
        self.entries.retain(|_, entry| entry.expires_at_ms > now_ms);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn entries_expire_after_the_ttl() {
        let mut cache = ResponseCache::new(8, 1_000);
        let key = ResponseCache::signature("team_context", &json!({ "team": "acme" }));
        cache.insert(key.clone(), json!({ "projects": [] }), 0);

        assert!(cache.get(&key, 999).is_some());
        assert!(cache.get(&key, 1_000).is_none(), "expired on the boundary");
        assert!(cache.is_empty(), "expired read evicts the entry");
    }

    #[test]
    fn capacity_evicts_the_oldest_entry_first() {
        let mut cache = ResponseCache::new(2, 10_000);
        cache.insert("a".to_string(), json!(1), 0);
        cache.insert("b".to_string(), json!(2), 1);
        cache.insert("c".to_string(), json!(3), 2);

        assert_eq!(cache.len(), 2);
        assert!(cache.get("a", 3).is_none(), "oldest entry fell out");
        assert!(cache.get("b", 3).is_some());
        assert!(cache.get("c", 3).is_some());
    }

    #[test]
    fn signatures_are_stable_across_key_order() {
        let first = ResponseCache::signature("tool", &json!({ "a": 1, "b": 2 }));
        let second = ResponseCache::signature("tool", &json!({ "b": 2, "a": 1 }));
        assert_eq!(first, second);
    }

    #[test]
    fn delete_one_and_clear_all() {
        let mut cache = ResponseCache::new(8, 1_000);
        cache.insert("a".to_string(), json!(1), 0);
        cache.insert("b".to_string(), json!(2), 0);

        assert!(cache.remove("a"));
        assert!(!cache.remove("a"));
        assert_eq!(cache.len(), 1);

        cache.clear();
        assert!(cache.is_empty());
    }
}
