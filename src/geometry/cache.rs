use std::fmt;
use std::sync::{Arc, OnceLock};

use tracing::trace;

/// A single-assignment memo cell for a flattened result.
///
/// Only the owner's home key (its configured chord length) is published, so
/// a one-off request with another key never displaces the default result.
/// Other keys are computed fresh on every call. The cell is emptied only
/// through `&mut self`, so no reader can observe a value for stale control
/// data.
pub struct FlattenCache<K, V> {
    cell: OnceLock<(K, Arc<V>)>,
}

impl<K, V> FlattenCache<K, V>
where
    K: Copy + PartialEq + fmt::Debug,
{
    #[must_use]
    pub fn new() -> Self {
        Self {
            cell: OnceLock::new(),
        }
    }

    /// Returns the cached value when it was computed for `key`.
    #[must_use]
    pub fn get(&self, key: K) -> Option<Arc<V>> {
        match self.cell.get() {
            Some((cached, value)) if *cached == key => Some(Arc::clone(value)),
            _ => None,
        }
    }

    /// Returns the value for `key`, computing it first when needed.
    ///
    /// The value is published only when `key` is the owner's `home` key.
    pub fn get_or_compute(&self, key: K, home: K, compute: impl FnOnce() -> V) -> Arc<V> {
        if key != home {
            trace!(?key, ?home, "flatten cache bypassed");
            return Arc::new(compute());
        }
        if let Some(value) = self.get(key) {
            trace!(?key, "flatten cache hit");
            return value;
        }

        trace!(?key, "flatten cache miss");
        let value = Arc::new(compute());
        // A concurrent reader may have published first; its value is equal.
        let _ = self.cell.set((key, Arc::clone(&value)));
        value
    }

    /// Drops any cached value.
    pub fn invalidate(&mut self) {
        if self.cell.take().is_some() {
            trace!("flatten cache invalidated");
        }
    }

    #[must_use]
    pub fn is_populated(&self) -> bool {
        self.cell.get().is_some()
    }
}

impl<K, V> Default for FlattenCache<K, V>
where
    K: Copy + PartialEq + fmt::Debug,
{
    fn default() -> Self {
        Self::new()
    }
}

impl<K: Copy, V> Clone for FlattenCache<K, V> {
    fn clone(&self) -> Self {
        let cell = OnceLock::new();
        if let Some((key, value)) = self.cell.get() {
            let _ = cell.set((*key, Arc::clone(value)));
        }
        Self { cell }
    }
}

impl<K: fmt::Debug, V> fmt::Debug for FlattenCache<K, V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FlattenCache")
            .field("key", &self.cell.get().map(|(key, _)| key))
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use std::cell::Cell;

    use super::*;

    #[test]
    fn computes_once_per_key() {
        let cache: FlattenCache<u32, Vec<u8>> = FlattenCache::new();
        let calls = Cell::new(0);
        let compute = || {
            calls.set(calls.get() + 1);
            vec![1, 2, 3]
        };
        let a = cache.get_or_compute(1, 1, compute);
        let b = cache.get_or_compute(1, 1, || unreachable!());
        assert!(Arc::ptr_eq(&a, &b));
        assert_eq!(calls.get(), 1);
    }

    #[test]
    fn other_keys_are_not_published() {
        let cache: FlattenCache<u32, u32> = FlattenCache::new();
        cache.get_or_compute(1, 1, || 10);
        let other = cache.get_or_compute(2, 1, || 20);
        assert_eq!(*other, 20);
        assert_eq!(cache.get(1).as_deref(), Some(&10));
        assert!(cache.get(2).is_none());
    }

    #[test]
    fn other_key_first_leaves_home_slot_free() {
        let cache: FlattenCache<u32, u32> = FlattenCache::new();
        assert_eq!(*cache.get_or_compute(2, 1, || 20), 20);
        assert!(!cache.is_populated());
        let a = cache.get_or_compute(1, 1, || 10);
        let b = cache.get_or_compute(1, 1, || unreachable!());
        assert!(Arc::ptr_eq(&a, &b));
    }

    #[test]
    fn invalidate_empties_the_cell() {
        let mut cache: FlattenCache<u32, u32> = FlattenCache::new();
        cache.get_or_compute(1, 1, || 10);
        assert!(cache.is_populated());
        cache.invalidate();
        assert!(!cache.is_populated());
        assert_eq!(*cache.get_or_compute(1, 1, || 11), 11);
    }

    #[test]
    fn clones_do_not_share_later_invalidation() {
        let mut cache: FlattenCache<u32, u32> = FlattenCache::new();
        cache.get_or_compute(1, 1, || 10);
        let copy = cache.clone();
        cache.invalidate();
        assert_eq!(copy.get(1).as_deref(), Some(&10));
    }
}
