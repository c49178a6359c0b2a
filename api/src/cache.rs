//! In-memory TTL cache for API payloads. Entries are evicted lazily:
//! an expired entry is dropped on the read that finds it.

use std::collections::HashMap;
use std::time::{Duration, Instant};

use crate::{Game, Team};

/// The two payload kinds the client caches.
#[derive(Debug, Clone)]
pub enum CachedValue {
    Games(Vec<Game>),
    Teams(Vec<Team>),
}

#[derive(Debug)]
struct CacheEntry {
    value: CachedValue,
    expires_at: Instant,
}

#[derive(Debug, Default)]
pub struct ApiCache {
    entries: HashMap<String, CacheEntry>,
}

impl ApiCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&mut self, key: &str) -> Option<CachedValue> {
        match self.entries.get(key) {
            Some(entry) if Instant::now() < entry.expires_at => Some(entry.value.clone()),
            Some(_) => {
                self.entries.remove(key);
                None
            }
            None => None,
        }
    }

    pub fn set(&mut self, key: &str, value: CachedValue, ttl: Duration) {
        self.entries.insert(
            key.to_string(),
            CacheEntry {
                value,
                expires_at: Instant::now() + ttl,
            },
        );
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }
}
