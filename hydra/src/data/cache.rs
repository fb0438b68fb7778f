//! In-memory byte cache with LRU eviction.

use parking_lot::Mutex;
use std::collections::HashMap;
use thiserror::Error;

/// Cache-related errors.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum CacheError {
    /// The payload alone exceeds the cache's capacity.
    #[error("cache entry of {size} bytes exceeds the {limit} byte limit")]
    EntryTooLarge { size: usize, limit: usize },
}

/// Counters for monitoring cache effectiveness.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CacheStats {
    pub hits: u64,
    pub misses: u64,
    pub evictions: u64,
    pub size_bytes: usize,
    pub entry_count: usize,
}

impl CacheStats {
    /// Hit rate between 0.0 and 1.0.
    pub fn hit_rate(&self) -> f64 {
        let total = self.hits + self.misses;
        if total == 0 {
            0.0
        } else {
            self.hits as f64 / total as f64
        }
    }
}

#[derive(Debug)]
struct CacheEntry {
    data: Vec<u8>,
    /// Logical clock value of the last read or write.
    last_used: u64,
}

#[derive(Debug, Default)]
struct CacheState {
    entries: HashMap<String, CacheEntry>,
    size_bytes: usize,
    clock: u64,
    stats: CacheStats,
}

impl CacheState {
    fn tick(&mut self) -> u64 {
        self.clock += 1;
        self.clock
    }

    fn sync_size_stats(&mut self) {
        self.stats.size_bytes = self.size_bytes;
        self.stats.entry_count = self.entries.len();
    }
}

/// Keyed byte payloads bounded by total size.
///
/// A write that would push the total past `max_size_bytes` first evicts the
/// least recently used entries. The total never exceeds the limit.
#[derive(Debug)]
pub struct DataCache {
    max_size_bytes: usize,
    state: Mutex<CacheState>,
}

impl DataCache {
    pub fn new(max_size_bytes: usize) -> Self {
        Self {
            max_size_bytes,
            state: Mutex::new(CacheState::default()),
        }
    }

    /// Cached payload for `key`; refreshes its recency on hit.
    pub fn get(&self, key: &str) -> Option<Vec<u8>> {
        let mut state = self.state.lock();
        let now = state.tick();

        match state.entries.get_mut(key) {
            Some(entry) => {
                entry.last_used = now;
                let data = entry.data.clone();
                state.stats.hits += 1;
                Some(data)
            }
            None => {
                state.stats.misses += 1;
                None
            }
        }
    }

    /// Store `data` under `key`, replacing any previous payload.
    ///
    /// Returns the number of entries evicted to make room.
    pub fn put(&self, key: impl Into<String>, data: Vec<u8>) -> Result<usize, CacheError> {
        let size = data.len();
        if size > self.max_size_bytes {
            return Err(CacheError::EntryTooLarge {
                size,
                limit: self.max_size_bytes,
            });
        }

        let key = key.into();
        let mut state = self.state.lock();

        if let Some(previous) = state.entries.remove(&key) {
            state.size_bytes -= previous.data.len();
        }

        let evicted = self.evict_until_fits(&mut state, size);

        let now = state.tick();
        state.entries.insert(
            key,
            CacheEntry {
                data,
                last_used: now,
            },
        );
        state.size_bytes += size;
        state.sync_size_stats();

        Ok(evicted)
    }

    fn evict_until_fits(&self, state: &mut CacheState, incoming: usize) -> usize {
        if state.size_bytes + incoming <= self.max_size_bytes {
            return 0;
        }

        // Oldest first
        let mut candidates: Vec<(u64, String)> = state
            .entries
            .iter()
            .map(|(key, entry)| (entry.last_used, key.clone()))
            .collect();
        candidates.sort_unstable();

        let mut evicted = 0;
        for (_, key) in candidates {
            if state.size_bytes + incoming <= self.max_size_bytes {
                break;
            }
            if let Some(entry) = state.entries.remove(&key) {
                state.size_bytes -= entry.data.len();
                evicted += 1;
            }
        }

        state.stats.evictions += evicted as u64;
        evicted
    }

    pub fn contains(&self, key: &str) -> bool {
        self.state.lock().entries.contains_key(key)
    }

    pub fn remove(&self, key: &str) -> bool {
        let mut state = self.state.lock();
        match state.entries.remove(key) {
            Some(entry) => {
                state.size_bytes -= entry.data.len();
                state.sync_size_stats();
                true
            }
            None => false,
        }
    }

    pub fn entry_count(&self) -> usize {
        self.state.lock().entries.len()
    }

    pub fn size_bytes(&self) -> usize {
        self.state.lock().size_bytes
    }

    pub fn max_size_bytes(&self) -> usize {
        self.max_size_bytes
    }

    pub fn stats(&self) -> CacheStats {
        self.state.lock().stats.clone()
    }

    /// Drop every entry. Hit and miss counters are kept.
    pub fn clear(&self) {
        let mut state = self.state.lock();
        state.entries.clear();
        state.size_bytes = 0;
        state.sync_size_stats();
    }
}
