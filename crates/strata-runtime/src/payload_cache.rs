use std::collections::VecDeque;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, RwLock};

use hashbrown::HashMap;
use strata_chunk::ChunkPayload;
use strata_world::ChunkCoord;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct PayloadCacheStats {
    pub hits: u64,
    pub misses: u64,
    pub evictions: u64,
    pub entries: usize,
}

/// LRU of freshly generated payloads. A capacity of zero disables caching.
pub struct PayloadCache {
    entries: RwLock<HashMap<ChunkCoord, Arc<ChunkPayload>>>,
    order: Mutex<VecDeque<ChunkCoord>>,
    capacity: usize,
    hits: AtomicU64,
    misses: AtomicU64,
    evictions: AtomicU64,
}

impl PayloadCache {
    pub fn new(capacity: usize) -> Self {
        Self {
            entries: RwLock::new(HashMap::new()),
            order: Mutex::new(VecDeque::new()),
            capacity,
            hits: AtomicU64::new(0),
            misses: AtomicU64::new(0),
            evictions: AtomicU64::new(0),
        }
    }

    pub fn get(&self, coord: ChunkCoord) -> Option<Arc<ChunkPayload>> {
        let found = self
            .entries
            .read()
            .ok()
            .and_then(|map| map.get(&coord).cloned());
        match found {
            Some(payload) => {
                self.hits.fetch_add(1, Ordering::Relaxed);
                self.touch(coord);
                Some(payload)
            }
            None => {
                self.misses.fetch_add(1, Ordering::Relaxed);
                None
            }
        }
    }

    pub fn insert(&self, payload: Arc<ChunkPayload>) {
        if self.capacity == 0 {
            return;
        }
        let coord = payload.position;
        if let Ok(mut entries) = self.entries.write() {
            entries.insert(coord, payload);
        }
        self.touch(coord);
        self.enforce_capacity();
    }

    pub fn stats(&self) -> PayloadCacheStats {
        PayloadCacheStats {
            hits: self.hits.load(Ordering::Relaxed),
            misses: self.misses.load(Ordering::Relaxed),
            evictions: self.evictions.load(Ordering::Relaxed),
            entries: self.entries.read().map(|m| m.len()).unwrap_or(0),
        }
    }

    /// Moves `coord` to the most recently used end.
    fn touch(&self, coord: ChunkCoord) {
        if let Ok(mut order) = self.order.lock() {
            if let Some(pos) = order.iter().position(|c| *c == coord) {
                order.remove(pos);
            }
            order.push_back(coord);
        }
    }

    fn enforce_capacity(&self) {
        let mut victims: Vec<ChunkCoord> = Vec::new();
        if let Ok(mut order) = self.order.lock() {
            while order.len() > self.capacity {
                if let Some(old) = order.pop_front() {
                    victims.push(old);
                }
            }
        }
        if victims.is_empty() {
            return;
        }
        if let Ok(mut entries) = self.entries.write() {
            for coord in victims {
                if entries.remove(&coord).is_some() {
                    self.evictions.fetch_add(1, Ordering::Relaxed);
                }
            }
        }
    }
}
