//! In-process cache for member settings and profile data
//!
//! Entries are JSON blobs keyed by string with a fixed time-to-live. When the
//! cache is disabled every read misses and every write or invalidation is
//! ignored, so callers never have to branch on it.

use std::collections::HashMap;
use std::fmt;
use std::time::{Duration, Instant};

use parking_lot::RwLock;
use serde::{de::DeserializeOwned, Serialize};
use tracing::{debug, warn};

use crate::toggle::{ProfileCache, UserId};

/// Cache entries that embed a member's theme
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum CacheKey {
    /// Per-request user settings (id, name, theme)
    UserSettings(UserId),
    /// Member profile as shown to other members
    MemberProfile(UserId),
}

impl fmt::Display for CacheKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CacheKey::UserSettings(id) => write!(f, "user_settings-{}", id),
            CacheKey::MemberProfile(id) => write!(f, "member_data-profile-{}", id),
        }
    }
}

struct Entry {
    value: serde_json::Value,
    expires_at: Instant,
}

/// Keyed blob cache with expiry
pub struct SettingsCache {
    enabled: bool,
    ttl: Duration,
    entries: RwLock<HashMap<String, Entry>>,
}

impl SettingsCache {
    /// Create a cache; `enabled = false` turns every operation into a no-op
    pub fn new(enabled: bool, ttl: Duration) -> Self {
        Self {
            enabled,
            ttl,
            entries: RwLock::new(HashMap::new()),
        }
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    /// Fetch a live entry, dropping it if it has expired or no longer parses
    pub fn get<T: DeserializeOwned>(&self, key: &CacheKey) -> Option<T> {
        if !self.enabled {
            return None;
        }
        let key = key.to_string();

        let value = {
            let entries = self.entries.read();
            match entries.get(&key) {
                Some(entry) if entry.expires_at > Instant::now() => Some(entry.value.clone()),
                Some(_) => None,
                None => return None,
            }
        };

        match value.map(serde_json::from_value) {
            Some(Ok(parsed)) => Some(parsed),
            Some(Err(e)) => {
                warn!("Dropping unreadable cache entry {}: {}", key, e);
                self.entries.write().remove(&key);
                None
            }
            None => {
                self.entries.write().remove(&key);
                None
            }
        }
    }

    /// Store a value under `key`, sweeping out expired entries
    pub fn put<T: Serialize>(&self, key: &CacheKey, value: &T) {
        if !self.enabled {
            return;
        }
        match serde_json::to_value(value) {
            Ok(value) => {
                let now = Instant::now();
                let entry = Entry {
                    value,
                    expires_at: now + self.ttl,
                };
                let mut entries = self.entries.write();
                entries.retain(|_, e| e.expires_at > now);
                entries.insert(key.to_string(), entry);
            }
            Err(e) => warn!("Not caching {}: {}", key, e),
        }
    }

    /// Remove `key` if present
    pub fn remove(&self, key: &CacheKey) {
        if !self.enabled {
            return;
        }
        if self.entries.write().remove(&key.to_string()).is_some() {
            debug!("Invalidated cache entry {}", key);
        }
    }

    /// Number of stored entries, expired ones included
    pub fn len(&self) -> usize {
        self.entries.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl ProfileCache for SettingsCache {
    fn invalidate(&self, key: &CacheKey) {
        self.remove(key);
    }
}
