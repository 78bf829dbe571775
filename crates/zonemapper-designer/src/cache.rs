use std::sync::Arc;
use tracing::{debug, trace};

/// Rounds a float for use in a cache key. Non-finite values collapse to zero.
pub fn round_key(value: f64) -> f64 {
    if !value.is_finite() {
        return 0.0;
    }
    (value * 1e6).round() / 1e6
}

/// Single-slot memo for a derived layer.
///
/// The key is an immutable fingerprint of every input the layer depends on.
/// A lookup with a different key rebuilds; there is no explicit invalidation.
#[derive(Debug)]
pub struct LayerCache<K, V> {
    name: &'static str,
    slot: Option<(K, Arc<V>)>,
    hits: u64,
    misses: u64,
}

impl<K: PartialEq + Clone + std::fmt::Debug, V> LayerCache<K, V> {
    pub fn new(name: &'static str) -> Self {
        Self {
            name,
            slot: None,
            hits: 0,
            misses: 0,
        }
    }

    pub fn needs_update(&self, key: &K) -> bool {
        !matches!(&self.slot, Some((cached, _)) if cached == key)
    }

    /// Returns the cached value for `key`, building it on a miss.
    pub fn get_or_build(&mut self, key: &K, build: impl FnOnce() -> V) -> Arc<V> {
        if let Some((cached, value)) = &self.slot {
            if cached == key {
                self.hits += 1;
                trace!("{} cache hit", self.name);
                return Arc::clone(value);
            }
        }
        self.misses += 1;
        debug!("Rebuilding {} layer for {:?}", self.name, key);
        let value = Arc::new(build());
        self.slot = Some((key.clone(), Arc::clone(&value)));
        value
    }

    pub fn hits(&self) -> u64 {
        self.hits
    }

    pub fn misses(&self) -> u64 {
        self.misses
    }

    pub fn clear(&mut self) {
        self.slot = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_round_key() {
        assert_eq!(round_key(0.123_456_789), 0.123457);
        assert_eq!(round_key(f64::NAN), 0.0);
    }

    #[test]
    fn test_rebuild_on_key_change() {
        let mut cache: LayerCache<(u32, u32), String> = LayerCache::new("test");
        let mut builds = 0;
        let a = cache.get_or_build(&(1, 2), || {
            builds += 1;
            "a".to_string()
        });
        let again = cache.get_or_build(&(1, 2), || {
            builds += 1;
            "b".to_string()
        });
        assert!(Arc::ptr_eq(&a, &again));
        let b = cache.get_or_build(&(1, 3), || {
            builds += 1;
            "b".to_string()
        });
        assert_eq!(*b, "b");
        assert_eq!(builds, 2);
        assert_eq!(cache.hits(), 1);
        assert_eq!(cache.misses(), 2);
        assert!(!cache.needs_update(&(1, 3)));
        cache.clear();
        assert!(cache.needs_update(&(1, 3)));
    }
}
