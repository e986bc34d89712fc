//! Write-once, run-lifetime result cache.

use std::collections::HashMap;
use std::sync::{Mutex, PoisonError};

/// Thread-safe map where the first value stored for a key is final.
///
/// Entries live as long as the cache; there is no eviction.
#[derive(Debug)]
pub(crate) struct QueryCache<V> {
    entries: Mutex<HashMap<String, V>>,
}

impl<V> Default for QueryCache<V> {
    fn default() -> Self {
        Self {
            entries: Mutex::new(HashMap::new()),
        }
    }
}

impl<V: Clone> QueryCache<V> {
    pub(crate) fn get(&self, key: &str) -> Option<V> {
        self.entries
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .get(key)
            .cloned()
    }

    /// Store `value` unless `key` already has one; returns the stored value.
    pub(crate) fn insert_once(&self, key: String, value: V) -> V {
        self.entries
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .entry(key)
            .or_insert(value)
            .clone()
    }

    pub(crate) fn len(&self) -> usize {
        self.entries
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    fn first_write_wins() {
        let cache = QueryCache::default();
        assert_eq!(cache.insert_once("k".to_owned(), Some(1)), Some(1));
        assert_eq!(cache.insert_once("k".to_owned(), None), Some(1));
        assert_eq!(cache.get("k"), Some(Some(1)));
        assert_eq!(cache.len(), 1);
    }

    #[rstest]
    fn missing_keys_are_distinct_from_cached_misses() {
        let cache: QueryCache<Option<u8>> = QueryCache::default();
        cache.insert_once("miss".to_owned(), None);
        assert_eq!(cache.get("miss"), Some(None));
        assert_eq!(cache.get("absent"), None);
    }
}
