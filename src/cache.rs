use rustc_hash::FxHashMap;
use std::sync::{Arc, Mutex, MutexGuard};

fn lock<T>(m: &Mutex<T>) -> MutexGuard<'_, T> {
    m.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

/// Decides when a cache is dropped wholesale before the next insert.
pub trait EvictionPolicy: Send + Sync {
    fn should_clear(&self, len: usize) -> bool;
}

/// Clear once the cache already holds `max` entries.
#[derive(Debug, Clone, Copy)]
pub struct ClearPastThreshold(pub usize);

impl EvictionPolicy for ClearPastThreshold {
    fn should_clear(&self, len: usize) -> bool {
        len >= self.0
    }
}

impl<F> EvictionPolicy for F
where
    F: Fn(usize) -> bool + Send + Sync,
{
    fn should_clear(&self, len: usize) -> bool {
        self(len)
    }
}

/// Remembers the result for the most recent key only.
pub struct SingleSlotMemo<T> {
    slot: Mutex<Option<(String, Arc<T>)>>,
}

impl<T> Default for SingleSlotMemo<T> {
    fn default() -> Self {
        Self {
            slot: Mutex::new(None),
        }
    }
}

impl<T> SingleSlotMemo<T> {
    pub fn get_or_compute(&self, key: &str, compute: impl FnOnce() -> T) -> Arc<T> {
        if let Some((cached_key, value)) = &*lock(&self.slot) {
            if cached_key == key {
                tracing::trace!("memo hit");
                return value.clone();
            }
        }
        let value = Arc::new(compute());
        *lock(&self.slot) = Some((key.to_string(), value.clone()));
        value
    }

    pub fn reset(&self) {
        *lock(&self.slot) = None;
    }
}

pub struct CssCache {
    entries: Mutex<FxHashMap<String, Arc<str>>>,
    eviction: Box<dyn EvictionPolicy>,
}

impl CssCache {
    pub fn new(eviction: impl EvictionPolicy + 'static) -> Self {
        Self {
            entries: Mutex::new(FxHashMap::default()),
            eviction: Box::new(eviction),
        }
    }

    pub fn get(&self, key: &str) -> Option<Arc<str>> {
        lock(&self.entries).get(key).cloned()
    }

    pub fn insert(&self, key: String, css: Arc<str>) {
        let mut entries = lock(&self.entries);
        if !entries.contains_key(&key) && self.eviction.should_clear(entries.len()) {
            tracing::debug!(entries = entries.len(), "clearing css cache");
            entries.clear();
        }
        entries.insert(key, css);
    }

    pub fn len(&self) -> usize {
        lock(&self.entries).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn reset(&self) {
        lock(&self.entries).clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;

    #[test]
    fn memo_only_keeps_latest_key() {
        let memo = SingleSlotMemo::default();
        let runs = Cell::new(0);
        let compute = |v: usize| {
            runs.set(runs.get() + 1);
            v
        };
        assert_eq!(*memo.get_or_compute("a", || compute(1)), 1);
        assert_eq!(*memo.get_or_compute("a", || compute(99)), 1);
        assert_eq!(*memo.get_or_compute("b", || compute(2)), 2);
        assert_eq!(*memo.get_or_compute("a", || compute(3)), 3);
        assert_eq!(runs.get(), 3);
        memo.reset();
        assert_eq!(*memo.get_or_compute("a", || compute(4)), 4);
    }

    #[test]
    fn cache_clears_wholesale_past_threshold() {
        let cache = CssCache::new(ClearPastThreshold(2));
        cache.insert("a".into(), Arc::from(".a{}"));
        cache.insert("b".into(), Arc::from(".b{}"));
        assert_eq!(cache.len(), 2);
        cache.insert("c".into(), Arc::from(".c{}"));
        assert_eq!(cache.len(), 1);
        assert!(cache.get("a").is_none());
        assert_eq!(cache.get("c").as_deref(), Some(".c{}"));
    }

    #[test]
    fn overwriting_existing_key_does_not_evict() {
        let cache = CssCache::new(ClearPastThreshold(1));
        cache.insert("a".into(), Arc::from("1"));
        cache.insert("a".into(), Arc::from("2"));
        assert_eq!(cache.get("a").as_deref(), Some("2"));
    }

    #[test]
    fn injected_policy_controls_eviction() {
        let cache = CssCache::new(|_len: usize| true);
        cache.insert("a".into(), Arc::from("1"));
        cache.insert("b".into(), Arc::from("2"));
        assert_eq!(cache.len(), 1);
        cache.reset();
        assert!(cache.is_empty());
    }
}
