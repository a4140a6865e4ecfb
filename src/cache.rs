use std::{
    fmt,
    hash::{BuildHasher, Hash},
    num::NonZeroUsize,
    sync::atomic::{AtomicUsize, Ordering},
};

use dashmap::DashMap;
use parking_lot::Mutex;

use crate::{list::RecencyList, Error, RandomState, Release};

/// Sentinel slot value stored in the head mirror while the cache is empty.
const NO_SLOT: usize = usize::MAX;

/// A value together with the arena slot of its entry in the recency
/// sequence.
struct IndexEntry<V> {
    slot: usize,
    value: V,
}

/// A bounded, thread-safe, in-memory cache with least-recently-used
/// eviction.
///
/// The cache pairs a concurrent hash index with a mutex-guarded recency
/// sequence. Lookups read the index without any global lock; only operations
/// that change the shape of the sequence (promotion, insertion, removal,
/// eviction) serialize on the sequence mutex, and the critical sections are
/// limited to link manipulation. All methods take `&self`, so a cache is
/// typically shared across threads behind an [`Arc`](std::sync::Arc).
///
/// Entries are evicted from the least-recently-used end as soon as an insert
/// would push the live count past the fixed capacity; every hit and every
/// successful insert places its entry at the most-recently-used end. When the
/// disposal policy is enabled (the default), a value's [`Release`] hook runs
/// exactly once, at the moment the value leaves the cache.
///
/// # Type Parameters
///
/// * `K` - Key type. Keys are kept in both the index and the sequence, so
///   `Clone` is required; cheap-to-clone keys (integers, `Arc<str>`) work
///   best.
/// * `V` - Value type. [`get`](Self::get) hands out clones, so values are
///   usually small or wrapped in [`Arc`](std::sync::Arc).
/// * `S` - Pluggable hashing strategy, defaulting to `RandomState` (or
///   `ahash::RandomState` with the `ahash` feature).
///
/// # Examples
///
/// ```
/// use bounded_lru::LruCache;
///
/// let cache = LruCache::<&str, u32>::new(2).unwrap();
/// assert!(cache.try_insert("a", 1));
/// assert!(cache.try_insert("b", 2));
///
/// // A hit refreshes recency, so "b" is now the eviction candidate.
/// assert_eq!(cache.get(&"a"), Some(1));
/// assert!(cache.try_insert("c", 3));
///
/// assert_eq!(cache.get(&"b"), None);
/// assert_eq!(cache.get(&"a"), Some(1));
/// assert_eq!(cache.get(&"c"), Some(3));
/// ```
pub struct LruCache<K, V, S = RandomState> {
    index: DashMap<K, IndexEntry<V>, S>,
    list: Mutex<RecencyList<K>>,
    /// Mirror of the sequence head, updated under the list lock. Lets `get`
    /// skip the lock when the entry is already most-recent.
    head: AtomicUsize,
    capacity: NonZeroUsize,
    release_on_removal: bool,
}

impl<K: Hash + Eq + Clone, V> LruCache<K, V, RandomState> {
    /// Creates a cache bounded to `capacity` live entries, using the default
    /// hashing strategy and with the disposal policy enabled.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidCapacity`] if `capacity` is zero.
    ///
    /// # Examples
    ///
    /// ```
    /// use bounded_lru::{Error, LruCache};
    ///
    /// let cache = LruCache::<u32, String>::new(16).unwrap();
    /// assert_eq!(cache.capacity(), 16);
    /// assert!(cache.is_empty());
    ///
    /// assert_eq!(
    ///     LruCache::<u32, String>::new(0).unwrap_err(),
    ///     Error::InvalidCapacity
    /// );
    /// ```
    pub fn new(capacity: usize) -> Result<Self, Error> {
        Self::with_hasher(capacity, RandomState::default())
    }
}

impl<K: Hash + Eq + Clone, V, S: BuildHasher + Clone> LruCache<K, V, S> {
    /// Creates a cache bounded to `capacity` live entries, hashing keys with
    /// the supplied strategy.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidCapacity`] if `capacity` is zero.
    pub fn with_hasher(capacity: usize, hasher: S) -> Result<Self, Error> {
        let capacity = NonZeroUsize::new(capacity).ok_or(Error::InvalidCapacity)?;
        Ok(Self {
            index: DashMap::with_capacity_and_hasher(capacity.get(), hasher),
            list: Mutex::new(RecencyList::with_capacity(capacity.get())),
            head: AtomicUsize::new(NO_SLOT),
            capacity,
            release_on_removal: true,
        })
    }

    /// Sets whether values have their [`Release`] hook invoked when they
    /// leave the cache. Defaults to `true`.
    ///
    /// The policy is intended to be fixed at construction:
    ///
    /// ```
    /// use bounded_lru::LruCache;
    ///
    /// let cache = LruCache::<u32, String>::new(8)
    ///     .unwrap()
    ///     .release_on_removal(false);
    /// # let _ = cache;
    /// ```
    #[must_use]
    pub fn release_on_removal(mut self, enabled: bool) -> Self {
        self.release_on_removal = enabled;
        self
    }

    /// The maximum number of live entries the cache will hold.
    pub fn capacity(&self) -> usize {
        self.capacity.get()
    }

    /// The number of live entries.
    pub fn len(&self) -> usize {
        self.index.len()
    }

    /// Returns true if the cache holds no entries.
    pub fn is_empty(&self) -> bool {
        self.index.is_empty()
    }

    /// Returns true if the cache currently holds `key`, without refreshing
    /// its recency.
    pub fn contains_key(&self, key: &K) -> bool {
        self.index.contains_key(key)
    }

    /// Looks up `key`, returning a clone of its value and refreshing the
    /// entry's recency on a hit.
    ///
    /// A miss has no side effects. On a hit the entry is promoted to the
    /// most-recently-used position; if it is already there, the promotion is
    /// skipped entirely and the lookup touches only the index.
    ///
    /// The returned clone is independent of the cache: a concurrent
    /// [`remove`](Self::remove) or eviction of the same key may run the
    /// value's [`Release`] hook while the clone is still held. Callers that
    /// cannot tolerate that must synchronize around disposal-sensitive
    /// values themselves.
    ///
    /// # Examples
    ///
    /// ```
    /// use bounded_lru::LruCache;
    ///
    /// let cache = LruCache::<u32, String>::new(4).unwrap();
    /// cache.try_insert(1, "one".to_string());
    ///
    /// assert_eq!(cache.get(&1), Some("one".to_string()));
    /// assert_eq!(cache.get(&2), None);
    /// ```
    pub fn get(&self, key: &K) -> Option<V>
    where
        V: Clone,
    {
        // The shard guard must be dropped before taking the list lock;
        // mutating operations acquire them in the opposite order.
        let (slot, value) = {
            let entry = self.index.get(key)?;
            (entry.slot, entry.value.clone())
        };

        if self.head.load(Ordering::Acquire) != slot {
            let mut list = self.list.lock();
            // The entry may have been removed, and its slot recycled, between
            // the index read and acquiring the lock. Only promote if the slot
            // still carries the key we looked up.
            if list.key(slot) == Some(key) {
                list.move_to_front(slot);
                self.sync_head(&list);
            }
        }

        Some(value)
    }

    /// Inserts `key` at the most-recently-used position if it is absent.
    ///
    /// Returns `false` without touching the cache if the key is already
    /// present: the existing value and its recency position are left as they
    /// were. This is an insert-if-absent contract, not an upsert.
    ///
    /// If the insert pushes the live count past capacity, the entry at the
    /// least-recently-used end is evicted - exactly one per overflowing
    /// insert - and, with the disposal policy enabled, released after it has
    /// left both structures. A panic from the evicted value's [`Release`]
    /// hook propagates to this caller; the cache itself is already
    /// consistent by then.
    ///
    /// # Examples
    ///
    /// ```
    /// use bounded_lru::LruCache;
    ///
    /// let cache = LruCache::<&str, u32>::new(2).unwrap();
    /// assert!(cache.try_insert("a", 1));
    /// assert!(!cache.try_insert("a", 99));
    /// assert_eq!(cache.get(&"a"), Some(1));
    /// ```
    pub fn try_insert(&self, key: K, value: V) -> bool
    where
        V: Release,
    {
        let victim = {
            let mut list = self.list.lock();
            if self.index.contains_key(&key) {
                return false;
            }

            let slot = list.push_front(key.clone());
            self.index.insert(key, IndexEntry { slot, value });

            let victim = if list.len() > self.capacity.get() {
                list.pop_back()
                    .and_then(|(_, victim)| self.index.remove(&victim))
                    .map(|(_, entry)| entry.value)
            } else {
                None
            };
            self.sync_head(&list);
            victim
        };

        if let Some(mut value) = victim {
            if self.release_on_removal {
                value.release();
            }
        }
        true
    }

    /// Removes `key` from the cache.
    ///
    /// Returns `false` with no side effects if the key is absent. Otherwise
    /// the entry leaves the index and the recency sequence atomically with
    /// respect to other structural mutations, the value is released if the
    /// disposal policy is enabled, and `true` is returned.
    ///
    /// # Examples
    ///
    /// ```
    /// use bounded_lru::LruCache;
    ///
    /// let cache = LruCache::<&str, u32>::new(2).unwrap();
    /// cache.try_insert("a", 1);
    ///
    /// assert!(cache.remove(&"a"));
    /// assert!(!cache.remove(&"a"));
    /// assert_eq!(cache.get(&"a"), None);
    /// ```
    pub fn remove(&self, key: &K) -> bool
    where
        V: Release,
    {
        let mut value = {
            let mut list = self.list.lock();
            let Some((_, entry)) = self.index.remove(key) else {
                return false;
            };
            list.unlink(entry.slot);
            self.sync_head(&list);
            entry.value
        };

        if self.release_on_removal {
            value.release();
        }
        true
    }

    /// Removes every entry, releasing each value if the disposal policy is
    /// enabled. The capacity is unchanged.
    pub fn clear(&self)
    where
        V: Release,
    {
        let mut victims = Vec::new();
        {
            let mut list = self.list.lock();
            while let Some((_, key)) = list.pop_back() {
                if let Some((_, entry)) = self.index.remove(&key) {
                    victims.push(entry.value);
                }
            }
            self.sync_head(&list);
        }

        if self.release_on_removal {
            for mut value in victims {
                value.release();
            }
        }
    }

    fn sync_head(&self, list: &RecencyList<K>) {
        self.head
            .store(list.head_slot().unwrap_or(NO_SLOT), Ordering::Release);
    }
}

impl<K: Hash + Eq, V, S: BuildHasher + Clone> fmt::Debug for LruCache<K, V, S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LruCache")
            .field("len", &self.index.len())
            .field("capacity", &self.capacity)
            .field("release_on_removal", &self.release_on_removal)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::LruCache;
    use crate::Error;

    #[test]
    fn test_zero_capacity_rejected() {
        assert_eq!(
            LruCache::<u32, u32>::new(0).unwrap_err(),
            Error::InvalidCapacity
        );
    }

    #[test]
    fn test_insert_then_get() {
        let cache = LruCache::new(2).unwrap();
        assert!(cache.try_insert(1, "one"));
        assert_eq!(cache.get(&1), Some("one"));
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn test_insert_if_absent_contract() {
        let cache = LruCache::new(2).unwrap();
        assert!(cache.try_insert(1, 10));
        assert!(!cache.try_insert(1, 99));
        assert_eq!(cache.get(&1), Some(10));
    }

    #[test]
    fn test_overflow_evicts_least_recent() {
        let cache = LruCache::new(2).unwrap();
        cache.try_insert("a", 1);
        cache.try_insert("b", 2);
        cache.try_insert("c", 3);

        assert_eq!(cache.len(), 2);
        assert_eq!(cache.get(&"a"), None);
        assert_eq!(cache.get(&"b"), Some(2));
        assert_eq!(cache.get(&"c"), Some(3));
    }

    #[test]
    fn test_remove_then_get_misses() {
        let cache = LruCache::new(2).unwrap();
        cache.try_insert(1, 10);

        assert!(cache.remove(&1));
        assert_eq!(cache.get(&1), None);
        assert!(!cache.remove(&1));
        assert!(cache.is_empty());
    }

    #[test]
    fn test_contains_key_does_not_promote() {
        let cache = LruCache::new(2).unwrap();
        cache.try_insert(1, 10);
        cache.try_insert(2, 20);

        assert!(cache.contains_key(&1));
        cache.try_insert(3, 30);

        // 1 stayed least-recent despite the contains_key call.
        assert_eq!(cache.get(&1), None);
        assert_eq!(cache.get(&2), Some(20));
    }

    #[test]
    fn test_with_hasher() {
        let cache =
            LruCache::<u32, u32, _>::with_hasher(2, std::hash::RandomState::new()).unwrap();
        assert!(cache.try_insert(1, 10));
        assert_eq!(cache.get(&1), Some(10));
    }

    #[test]
    fn test_debug_reports_len_and_capacity() {
        let cache = LruCache::new(2).unwrap();
        cache.try_insert(1, 10);

        let rendered = format!("{cache:?}");
        assert!(rendered.contains("len: 1"));
        assert!(rendered.contains("capacity: 2"));
        assert!(rendered.contains("release_on_removal: true"));
    }

    #[test]
    fn test_clear() {
        let cache = LruCache::new(3).unwrap();
        cache.try_insert(1, 10);
        cache.try_insert(2, 20);

        cache.clear();

        assert!(cache.is_empty());
        assert_eq!(cache.capacity(), 3);
        assert_eq!(cache.get(&1), None);

        // The cache is usable after a clear.
        assert!(cache.try_insert(1, 11));
        assert_eq!(cache.get(&1), Some(11));
    }
}
