// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! LRU cache for remote storage retrievals.
//!
//! Content ids never change what they point to, so a hit within the TTL
//! saves a gateway round trip.

use std::num::NonZeroUsize;
use std::sync::Mutex;
use std::time::{Duration, Instant};

use lru::LruCache;
use serde_json::Value;

struct CacheEntry {
    data: Value,
    inserted_at: Instant,
}

/// In-process LRU cache keyed by content id.
pub struct RetrievalCache {
    cache: Mutex<LruCache<String, CacheEntry>>,
    ttl: Duration,
}

impl RetrievalCache {
    /// - `capacity`: max number of payloads kept (at least 1; callers that want no
    ///   cache skip building one).
    /// - `ttl`: time-to-live for each entry.
    pub fn new(capacity: usize, ttl: Duration) -> Self {
        Self {
            cache: Mutex::new(LruCache::new(
                NonZeroUsize::new(capacity).unwrap_or(NonZeroUsize::MIN),
            )),
            ttl,
        }
    }

    /// Returns `None` if not cached or expired.
    pub fn get(&self, content_id: &str) -> Option<Value> {
        let mut cache = self.cache.lock().ok()?;
        if let Some(entry) = cache.get(content_id) {
            if entry.inserted_at.elapsed() < self.ttl {
                return Some(entry.data.clone());
            }
            cache.pop(content_id);
        }
        None
    }

    pub fn put(&self, content_id: &str, data: Value) {
        if let Ok(mut cache) = self.cache.lock() {
            cache.put(
                content_id.to_string(),
                CacheEntry {
                    data,
                    inserted_at: Instant::now(),
                },
            );
        }
    }

    pub fn invalidate(&self, content_id: &str) {
        if let Ok(mut cache) = self.cache.lock() {
            cache.pop(content_id);
        }
    }

    pub fn len(&self) -> usize {
        self.cache.lock().map(|cache| cache.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl std::fmt::Debug for RetrievalCache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RetrievalCache")
            .field("len", &self.len())
            .field("ttl", &self.ttl)
            .finish()
    }
}
