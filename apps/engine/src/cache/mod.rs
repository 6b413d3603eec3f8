//! Time-boxed cache in front of the repository.
//!
//! Values are stored as JSON. A miss, an expired entry or a payload that no
//! longer deserializes all read as "not cached"; undecodable payloads are
//! dropped on read.

pub mod keys;
pub mod memory;

use std::time::Duration;

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

pub use memory::MemoryCache;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CacheStats {
    pub hits: u64,
    pub misses: u64,
    pub entries: usize,
    pub evictions: u64,
}

pub trait CacheProvider: Send + Sync {
    fn get(&self, key: &str) -> Option<String>;

    /// Store `value` for `ttl`. A zero TTL never expires.
    fn set(&self, key: &str, value: String, ttl: Duration);

    fn delete(&self, key: &str);

    /// Remove every key starting with `prefix`, returning how many were removed.
    fn invalidate_prefix(&self, prefix: &str) -> usize;

    fn clear(&self);

    fn stats(&self) -> CacheStats;
}

pub fn get_json<T>(cache: &dyn CacheProvider, key: &str) -> Option<T>
where
    T: DeserializeOwned,
{
    let payload = cache.get(key)?;
    match serde_json::from_str(&payload) {
        Ok(value) => Some(value),
        Err(_) => {
            cache.delete(key);
            None
        }
    }
}

pub fn set_json<T>(cache: &dyn CacheProvider, key: &str, value: &T, ttl: Duration)
where
    T: Serialize,
{
    let payload = match serde_json::to_string(value) {
        Ok(p) => p,
        Err(_) => return,
    };
    cache.set(key, payload, ttl);
}

/// Cache that stores nothing.
#[derive(Debug, Default)]
pub struct NoopCache;

impl CacheProvider for NoopCache {
    fn get(&self, _key: &str) -> Option<String> {
        None
    }

    fn set(&self, _key: &str, _value: String, _ttl: Duration) {}

    fn delete(&self, _key: &str) {}

    fn invalidate_prefix(&self, _prefix: &str) -> usize {
        0
    }

    fn clear(&self) {}

    fn stats(&self) -> CacheStats {
        CacheStats::default()
    }
}
