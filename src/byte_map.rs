//! ByteMap: chained buckets over a slot arena, with an insertion-order list.

use crate::buckets::{self, BucketTable};
use crate::config::{MapConfig, DEFAULT_CAPACITY, DEFAULT_MIN_CAPACITY};
use crate::entry::{Entry, Handle, Slots};
use crate::error::Error;
use crate::hash::BuildPolyHasher;
use crate::iter::{Iter, Keys, Values};
use crate::order::OrderList;
use crate::reentrancy::DebugExclusive;
use core::fmt;
use core::hash::{BuildHasher, Hasher};
use slotmap::DefaultKey;

/// Structural state. Every insert and removal goes through `link`/`remove`,
/// which keep the bucket chains and the order list in step.
struct Table {
    slots: Slots,
    buckets: BucketTable,
    order: OrderList,
}

impl Table {
    fn new(buckets: BucketTable) -> Self {
        Self {
            slots: Slots::with_key(),
            buckets,
            order: OrderList::new(),
        }
    }

    fn find(&self, hash: u64, key: &[u8]) -> Option<DefaultKey> {
        self.buckets.find(&self.slots, hash, key)
    }

    /// Make room for `additional` more entries in the arena so a following
    /// `link` cannot allocate.
    fn reserve_slots(&mut self, additional: usize) -> Result<(), Error> {
        self.slots
            .try_reserve(additional)
            .map_err(Error::alloc("entry slot"))
    }

    fn link(&mut self, entry: Entry) -> DefaultKey {
        let k = self.slots.insert(entry);
        self.buckets.push_back(&mut self.slots, k);
        self.order.append(&mut self.slots, k);
        k
    }

    fn remove(&mut self, k: DefaultKey) -> Option<Entry> {
        if !self.slots.contains_key(k) {
            return None;
        }
        self.buckets.unlink(&mut self.slots, k);
        self.order.unlink(&mut self.slots, k);
        self.slots.remove(k)
    }

    fn resize(&mut self, capacity: usize) -> Result<(), Error> {
        let from = self.buckets.capacity();
        self.buckets
            .rebuild(&mut self.slots, self.order.head(), capacity)?;
        log::debug!(
            "resized bucket table from {from} to {capacity} buckets ({} entries)",
            self.slots.len()
        );
        Ok(())
    }

    fn clear(&mut self) {
        self.slots.clear();
        self.buckets.clear();
        self.order.clear();
    }
}

/// Hash map from non-empty byte-string keys to byte-string values.
///
/// Keys and values are copied in on [`put`](ByteMap::put) and owned by the
/// map. Iteration follows insertion order; overwriting a key moves it to the
/// end. The bucket table doubles when an insertion would bring the load
/// factor to 0.75 and only shrinks when [`optimize`](ByteMap::optimize) is
/// called.
pub struct ByteMap<S = BuildPolyHasher> {
    hasher: S,
    table: Table,
    min_capacity: usize,
    guard: DebugExclusive,
}

impl ByteMap {
    /// Empty map with 16 buckets.
    pub fn new() -> Self {
        Self::with_hasher(BuildPolyHasher)
    }

    /// Empty map with `capacity` buckets. `optimize` will not shrink below
    /// `capacity` or the default floor of 16, whichever is smaller.
    pub fn with_capacity(capacity: usize) -> Result<Self, Error> {
        if capacity == 0 {
            return Err(Error::InvalidConfig("capacity must be at least 1"));
        }
        Self::with_config(
            MapConfig::new()
                .with_initial_capacity(capacity)
                .with_min_capacity(capacity.min(DEFAULT_MIN_CAPACITY)),
        )
    }

    pub fn with_config(config: MapConfig) -> Result<Self, Error> {
        Self::with_config_and_hasher(config, BuildPolyHasher)
    }
}

impl Default for ByteMap {
    fn default() -> Self {
        Self::new()
    }
}

impl<S> ByteMap<S> {
    /// Live entry count.
    pub fn len(&self) -> usize {
        self.table.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.table.slots.is_empty()
    }

    /// Current bucket count.
    pub fn capacity(&self) -> usize {
        self.table.buckets.capacity()
    }

    /// Floor that `optimize` never shrinks below.
    pub fn min_capacity(&self) -> usize {
        self.min_capacity
    }

    pub fn load_factor(&self) -> f64 {
        self.len() as f64 / self.capacity() as f64
    }

    /// Entries in insertion order. The borrow on the map rules out mutation
    /// while the iterator is alive; `clone` restarts from the same position.
    pub fn iter(&self) -> Iter<'_> {
        Iter::new(&self.table.slots, self.table.order.head(), self.len())
    }

    pub fn keys(&self) -> Keys<'_> {
        Keys::new(self.iter())
    }

    pub fn values(&self) -> Values<'_> {
        Values::new(self.iter())
    }

    /// Oldest entry.
    pub fn first(&self) -> Option<(&[u8], &[u8])> {
        self.pair(self.table.order.head())
    }

    /// Most recently inserted or overwritten entry.
    pub fn last(&self) -> Option<(&[u8], &[u8])> {
        self.pair(self.table.order.tail())
    }

    fn pair(&self, k: Option<DefaultKey>) -> Option<(&[u8], &[u8])> {
        let e = &self.table.slots[k?];
        Some((&*e.key, &*e.value))
    }

    /// Drop every entry, keeping the current bucket count.
    pub fn clear(&mut self) {
        let _g = self.guard.enter("clear");
        log::trace!("clearing {} entries", self.table.slots.len());
        self.table.clear();
    }

    pub(crate) fn entry(&self, h: Handle) -> Option<&Entry> {
        let _g = self.guard.enter("handle");
        self.table.slots.get(h.raw_handle())
    }
}

impl<S> ByteMap<S>
where
    S: BuildHasher,
{
    /// Empty map with 16 buckets hashing keys through `hasher`. The hasher
    /// sees each key as a single `write` of its raw bytes.
    pub fn with_hasher(hasher: S) -> Self {
        log::trace!("new map with {DEFAULT_CAPACITY} buckets");
        Self {
            hasher,
            table: Table::new(BucketTable::new(DEFAULT_CAPACITY)),
            min_capacity: DEFAULT_MIN_CAPACITY,
            guard: DebugExclusive::new(),
        }
    }

    pub fn with_config_and_hasher(config: MapConfig, hasher: S) -> Result<Self, Error> {
        config.validate()?;
        let buckets = BucketTable::with_capacity(config.initial_capacity)?;
        log::trace!(
            "new map with {} buckets, floor {}",
            config.initial_capacity,
            config.min_capacity
        );
        Ok(Self {
            hasher,
            table: Table::new(buckets),
            min_capacity: config.min_capacity,
            guard: DebugExclusive::new(),
        })
    }

    fn make_hash(&self, key: &[u8]) -> u64 {
        let mut h = self.hasher.build_hasher();
        h.write(key);
        h.finish()
    }

    /// Insert `key -> value`, replacing any previous value for `key`.
    ///
    /// A replaced entry is removed from both its chain and the order list and
    /// the new one is appended, so the key moves to the end of iteration
    /// order. Growth is only considered when `key` is new.
    ///
    /// Errors leave the map unchanged.
    pub fn put(&mut self, key: &[u8], value: &[u8]) -> Result<(), Error> {
        let _g = self.guard.enter("put");
        if key.is_empty() {
            return Err(Error::EmptyKey);
        }
        let hash = self.make_hash(key);
        let entry = Entry::new(hash, key, value)?;

        match self.table.find(hash, key) {
            Some(old) => {
                self.table.remove(old);
            }
            None => {
                // An overwrite reuses the slot it frees; only new keys need one.
                self.table.reserve_slots(1)?;
                if let Some(target) = buckets::grow_target(self.len(), self.capacity())? {
                    self.table.resize(target)?;
                }
            }
        }
        self.table.link(entry);
        Ok(())
    }

    /// Store `value` as its 4 little-endian bytes.
    pub fn put_i32(&mut self, key: &[u8], value: i32) -> Result<(), Error> {
        self.put(key, &value.to_le_bytes())
    }

    /// Store the UTF-8 bytes of `value`.
    pub fn put_str(&mut self, key: &[u8], value: &str) -> Result<(), Error> {
        self.put(key, value.as_bytes())
    }

    pub fn get(&self, key: &[u8]) -> Option<&[u8]> {
        let k = self.find_raw(key, "get")?;
        Some(&*self.table.slots[k].value)
    }

    /// `None` if `key` is absent or its value is not exactly 4 bytes.
    pub fn get_i32(&self, key: &[u8]) -> Option<i32> {
        let bytes = self.get(key)?;
        Some(i32::from_le_bytes(bytes.try_into().ok()?))
    }

    /// `None` if `key` is absent or its value is not valid UTF-8.
    pub fn get_str(&self, key: &[u8]) -> Option<&str> {
        core::str::from_utf8(self.get(key)?).ok()
    }

    pub fn contains_key(&self, key: &[u8]) -> bool {
        self.find_raw(key, "contains_key").is_some()
    }

    /// Stable handle to the entry for `key`.
    pub fn find(&self, key: &[u8]) -> Option<Handle> {
        self.find_raw(key, "find").map(Handle::new)
    }

    fn find_raw(&self, key: &[u8], op: &'static str) -> Option<DefaultKey> {
        let _g = self.guard.enter(op);
        let hash = self.make_hash(key);
        self.table.find(hash, key)
    }

    /// Remove `key`, returning its value. Absent keys are a no-op. Never
    /// shrinks the bucket table.
    pub fn delete(&mut self, key: &[u8]) -> Option<Box<[u8]>> {
        let _g = self.guard.enter("delete");
        let hash = self.make_hash(key);
        let k = self.table.find(hash, key)?;
        self.table.remove(k).map(|e| e.value)
    }

    /// Resize the bucket table to fit the current entry count: grow while at
    /// or over the 0.75 load threshold, then halve while the halved table
    /// would stay under it and not drop below the floor.
    pub fn optimize(&mut self) -> Result<(), Error> {
        let _g = self.guard.enter("optimize");
        let capacity = self.capacity();
        let target = buckets::fit_target(self.len(), capacity, self.min_capacity)?;
        if target == capacity {
            log::debug!("optimize: {capacity} buckets already fit {} entries", self.len());
            return Ok(());
        }
        self.table.resize(target)
    }
}

impl<'a, S> IntoIterator for &'a ByteMap<S> {
    type Item = (&'a [u8], &'a [u8]);
    type IntoIter = Iter<'a>;

    fn into_iter(self) -> Iter<'a> {
        self.iter()
    }
}

impl<S> fmt::Debug for ByteMap<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_map().entries(self.iter()).finish()
    }
}

#[cfg(test)]
impl<S> ByteMap<S> {
    /// Walk both linked structures and check they agree with each other, with
    /// the arena and with bucket placement.
    pub(crate) fn assert_invariants(&self) {
        use std::collections::HashSet;

        let t = &self.table;
        assert!(self.capacity() >= self.min_capacity, "capacity below floor");

        let mut seen = HashSet::new();
        let mut prev = None;
        let mut cur = t.order.head();
        while let Some(k) = cur {
            let e = &t.slots[k];
            assert_eq!(e.order.prev, prev, "order back-link mismatch");
            assert!(seen.insert(e.key.clone()), "duplicate key in order list");
            prev = Some(k);
            cur = e.order.next;
        }
        assert_eq!(t.order.tail(), prev, "order tail mismatch");
        assert_eq!(seen.len(), self.len(), "order list length != len");

        let mut chained = 0;
        for offset in 0..self.capacity() {
            let mut prev = None;
            for k in t.buckets.chain(&t.slots, offset) {
                let e = &t.slots[k];
                assert_eq!(t.buckets.offset(e.hash), offset, "entry in wrong bucket");
                assert_eq!(e.chain.prev, prev, "chain back-link mismatch");
                prev = Some(k);
                chained += 1;
            }
        }
        assert_eq!(chained, self.len(), "chain membership != len");
    }
}
