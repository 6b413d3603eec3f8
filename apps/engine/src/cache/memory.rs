//! In-process cache with per-entry expiry.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Mutex, MutexGuard, PoisonError};
use std::time::{Duration, Instant};

use super::{CacheProvider, CacheStats};

const DEFAULT_MAX_ENTRIES: usize = 1024;

struct Entry {
    value: String,
    expires_at: Option<Instant>,
}

impl Entry {
    fn is_expired(&self, now: Instant) -> bool {
        self.expires_at.map_or(false, |at| at <= now)
    }
}

pub struct MemoryCache {
    entries: Mutex<HashMap<String, Entry>>,
    max_entries: usize,
    hits: AtomicU64,
    misses: AtomicU64,
    evictions: AtomicU64,
}

impl Default for MemoryCache {
    fn default() -> Self {
        Self::with_capacity(DEFAULT_MAX_ENTRIES)
    }
}

impl MemoryCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_capacity(max_entries: usize) -> Self {
        Self {
            entries: Mutex::new(HashMap::new()),
            max_entries: max_entries.max(1),
            hits: AtomicU64::new(0),
            misses: AtomicU64::new(0),
            evictions: AtomicU64::new(0),
        }
    }

    fn lock(&self) -> MutexGuard<'_, HashMap<String, Entry>> {
        self.entries.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Make room for one more entry: drop expired entries first, then the
    /// entry closest to expiring.
    fn make_room(&self, entries: &mut HashMap<String, Entry>, now: Instant) {
        let before = entries.len();
        entries.retain(|_, entry| !entry.is_expired(now));
        let mut evicted = (before - entries.len()) as u64;

        if entries.len() >= self.max_entries {
            let victim = entries
                .iter()
                .min_by_key(|(_, entry)| (entry.expires_at.is_none(), entry.expires_at))
                .map(|(key, _)| key.clone());
            if let Some(key) = victim {
                entries.remove(&key);
                evicted += 1;
            }
        }

        self.evictions.fetch_add(evicted, Ordering::Relaxed);
    }
}

impl CacheProvider for MemoryCache {
    fn get(&self, key: &str) -> Option<String> {
        let now = Instant::now();
        let mut entries = self.lock();

        let expired = match entries.get(key) {
            Some(entry) if !entry.is_expired(now) => {
                self.hits.fetch_add(1, Ordering::Relaxed);
                return Some(entry.value.clone());
            }
            Some(_) => true,
            None => false,
        };

        if expired {
            entries.remove(key);
            self.evictions.fetch_add(1, Ordering::Relaxed);
        }
        self.misses.fetch_add(1, Ordering::Relaxed);
        None
    }

    fn set(&self, key: &str, value: String, ttl: Duration) {
        let now = Instant::now();
        let mut entries = self.lock();

        if !entries.contains_key(key) && entries.len() >= self.max_entries {
            self.make_room(&mut entries, now);
        }

        let expires_at = if ttl.is_zero() {
            None
        } else {
            now.checked_add(ttl)
        };
        entries.insert(key.to_string(), Entry { value, expires_at });
    }

    fn delete(&self, key: &str) {
        self.lock().remove(key);
    }

    fn invalidate_prefix(&self, prefix: &str) -> usize {
        let mut entries = self.lock();
        let before = entries.len();
        entries.retain(|key, _| !key.starts_with(prefix));
        before - entries.len()
    }

    fn clear(&self) {
        self.lock().clear();
    }

    fn stats(&self) -> CacheStats {
        CacheStats {
            hits: self.hits.load(Ordering::Relaxed),
            misses: self.misses.load(Ordering::Relaxed),
            entries: self.lock().len(),
            evictions: self.evictions.load(Ordering::Relaxed),
        }
    }
}
