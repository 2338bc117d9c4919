//! Bounded LRU cache for instrument lookups at the front-end, invalidated
//! by a server push from the catalog rather than a TTL (§5). No crate in
//! the teacher workspace implements a cache data structure, so this reaches
//! for the same `lru` crate the rest of the pack's services use for the
//! same purpose.

use std::num::NonZeroUsize;
use std::sync::Mutex;

use lru::LruCache;
use tracing::debug;

use bourse_wire::Instrument;

pub struct StockCache {
    inner: Mutex<LruCache<String, Instrument>>,
}

impl StockCache {
    pub fn new(capacity: usize) -> Self {
        let capacity = NonZeroUsize::new(capacity).unwrap_or(NonZeroUsize::MIN);
        StockCache { inner: Mutex::new(LruCache::new(capacity)) }
    }

    /// Looks up a cached instrument, promoting it to most-recently-used on
    /// a hit.
    pub fn fetch(&self, name: &str) -> Option<Instrument> {
        self.inner.lock().unwrap().get(name).cloned()
    }

    /// Inserts or overwrites an entry as most-recently-used, evicting the
    /// least-recently-used entry if the cache is already full.
    pub fn insert(&self, name: String, instrument: Instrument) {
        let mut cache = self.inner.lock().unwrap();
        if let Some((evicted_name, _)) = cache.push(name.clone(), instrument) {
            if evicted_name != name {
                debug!(evicted = %evicted_name, "cache evicted entry to make room");
            }
        }
    }

    /// Removes an entry by name, per a server-initiated invalidation.
    /// Returns whether anything was actually cached.
    pub fn invalidate(&self, name: &str) -> bool {
        self.inner.lock().unwrap().pop(name).is_some()
    }

    /// Cached snapshots ordered `[LRU, ..., MRU]`, the ordering `/dump-cache`
    /// exposes — matching the original's `cache.cache`, a plain list of the
    /// full cached objects rather than just their names. The underlying
    /// crate iterates MRU-to-LRU, so this reverses it.
    pub fn dump_lru_to_mru(&self) -> Vec<Instrument> {
        let cache = self.inner.lock().unwrap();
        let mut entries: Vec<Instrument> = cache.iter().map(|(_, v)| v.clone()).collect();
        entries.reverse();
        entries
    }

    pub fn len(&self) -> usize {
        self.inner.lock().unwrap().len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.lock().unwrap().is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_log::test;

    fn stock(name: &str) -> Instrument {
        Instrument { name: name.to_string(), price: 1.0, quantity: 10 }
    }

    fn names(entries: Vec<Instrument>) -> Vec<String> {
        entries.into_iter().map(|i| i.name).collect()
    }

    #[test]
    fn insert_orders_are_lru_to_mru() {
        let cache = StockCache::new(3);
        cache.insert("AAA".into(), stock("AAA"));
        cache.insert("BBB".into(), stock("BBB"));
        cache.insert("CCC".into(), stock("CCC"));
        assert_eq!(names(cache.dump_lru_to_mru()), vec!["AAA", "BBB", "CCC"]);
    }

    #[test]
    fn fetch_promotes_to_mru() {
        let cache = StockCache::new(3);
        cache.insert("AAA".into(), stock("AAA"));
        cache.insert("BBB".into(), stock("BBB"));
        cache.insert("CCC".into(), stock("CCC"));
        assert!(cache.fetch("AAA").is_some());
        assert_eq!(names(cache.dump_lru_to_mru()), vec!["BBB", "CCC", "AAA"]);
    }

    #[test]
    fn capacity_evicts_the_lru_entry() {
        let cache = StockCache::new(2);
        cache.insert("AAA".into(), stock("AAA"));
        cache.insert("BBB".into(), stock("BBB"));
        cache.insert("CCC".into(), stock("CCC"));
        assert_eq!(names(cache.dump_lru_to_mru()), vec!["BBB", "CCC"]);
        assert!(cache.fetch("AAA").is_none());
    }

    #[test]
    fn invalidate_removes_the_entry() {
        let cache = StockCache::new(3);
        cache.insert("AAA".into(), stock("AAA"));
        assert!(cache.invalidate("AAA"));
        assert!(cache.fetch("AAA").is_none());
        assert!(!cache.invalidate("AAA"));
    }
}
