//! API credential storage. The key is shared between the client and any
//! settings surface, and can change at runtime; every request reads the
//! current value.

use std::sync::{Arc, RwLock};

/// TheSportsDB's shared free-tier key. Works for schedule and results
/// endpoints but not the v2 livescore feed.
pub const FREE_TIER_KEY: &str = "123";

#[derive(Debug, Clone)]
pub struct ApiKeyStore {
    key: Arc<RwLock<String>>,
}

impl ApiKeyStore {
    pub fn new(key: &str) -> Self {
        Self {
            key: Arc::new(RwLock::new(key.to_string())),
        }
    }

    pub fn get(&self) -> String {
        self.key
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .clone()
    }

    pub fn set(&self, key: &str) {
        let mut guard = self.key.write().unwrap_or_else(|e| e.into_inner());
        *guard = key.to_string();
    }

    /// Premium keys unlock the live-score feed. The free key and an
    /// empty key do not.
    pub fn is_premium(&self) -> bool {
        let key = self.get();
        !key.is_empty() && key != FREE_TIER_KEY
    }
}

impl Default for ApiKeyStore {
    fn default() -> Self {
        Self::new(FREE_TIER_KEY)
    }
}
