#![no_main]

use bounded_lru::LruCache;
use libfuzzer_sys::fuzz_target;

#[derive(Debug)]
enum CacheOperation {
    Insert(u16, u16),
    Get(u16),
    Remove(u16),
    Contains(u16),
    Clear,
}

impl<'a> arbitrary::Arbitrary<'a> for CacheOperation {
    fn arbitrary(u: &mut arbitrary::Unstructured<'a>) -> arbitrary::Result<Self> {
        match u.int_in_range(0..=4)? {
            0 => Ok(CacheOperation::Insert(u.arbitrary()?, u.arbitrary()?)),
            1 => Ok(CacheOperation::Get(u.arbitrary()?)),
            2 => Ok(CacheOperation::Remove(u.arbitrary()?)),
            3 => Ok(CacheOperation::Contains(u.arbitrary()?)),
            4 => Ok(CacheOperation::Clear),
            _ => unreachable!(),
        }
    }
}

/// Reference model: keys ordered most-recent-first.
struct Model {
    capacity: usize,
    entries: Vec<(u16, u16)>,
}

impl Model {
    fn position(&self, key: u16) -> Option<usize> {
        self.entries.iter().position(|&(k, _)| k == key)
    }

    fn insert(&mut self, key: u16, value: u16) -> bool {
        if self.position(key).is_some() {
            return false;
        }
        self.entries.insert(0, (key, value));
        if self.entries.len() > self.capacity {
            self.entries.pop();
        }
        true
    }

    fn get(&mut self, key: u16) -> Option<u16> {
        let position = self.position(key)?;
        let entry = self.entries.remove(position);
        self.entries.insert(0, entry);
        Some(entry.1)
    }

    fn remove(&mut self, key: u16) -> bool {
        match self.position(key) {
            Some(position) => {
                self.entries.remove(position);
                true
            }
            None => false,
        }
    }
}

fuzz_target!(|data: (u16, Vec<CacheOperation>)| {
    let (capacity_raw, operations) = data;

    let capacity = (capacity_raw % 8).max(1) as usize;
    let cache = LruCache::<u16, u16>::new(capacity).unwrap();
    let mut model = Model {
        capacity,
        entries: Vec::new(),
    };

    for op in operations {
        match op {
            CacheOperation::Insert(key, value) => {
                assert_eq!(cache.try_insert(key, value), model.insert(key, value));
            }
            CacheOperation::Get(key) => {
                assert_eq!(cache.get(&key), model.get(key));
            }
            CacheOperation::Remove(key) => {
                assert_eq!(cache.remove(&key), model.remove(key));
            }
            CacheOperation::Contains(key) => {
                assert_eq!(cache.contains_key(&key), model.position(key).is_some());
            }
            CacheOperation::Clear => {
                cache.clear();
                model.entries.clear();
            }
        }

        assert_eq!(cache.len(), model.entries.len());
        assert!(cache.len() <= cache.capacity());
        assert_eq!(cache.is_empty(), model.entries.is_empty());

        for &(key, _) in &model.entries {
            assert!(cache.contains_key(&key));
        }
    }
});
