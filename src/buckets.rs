//! Bucket table: chain heads addressed by `hash % capacity`, the per-bucket
//! collision chains threaded through `Entry::chain`, and the resize policy.
//!
//! The table only indexes entries; it never creates or frees them. Rebuilding
//! it for a new capacity resets chain links and leaves the arena and the
//! insertion-order list alone.

use crate::config::GROW_THRESHOLD;
use crate::entry::Slots;
use crate::error::Error;
use slotmap::DefaultKey;

#[derive(Debug)]
pub(crate) struct BucketTable {
    heads: Vec<Option<DefaultKey>>,
}

impl BucketTable {
    /// Infallible form for the fixed default size; aborts on OOM like `vec!`.
    pub(crate) fn new(capacity: usize) -> Self {
        Self {
            heads: vec![None; capacity],
        }
    }

    pub(crate) fn with_capacity(capacity: usize) -> Result<Self, Error> {
        Ok(Self {
            heads: alloc_heads(capacity)?,
        })
    }

    pub(crate) fn capacity(&self) -> usize {
        self.heads.len()
    }

    #[inline]
    pub(crate) fn offset(&self, hash: u64) -> usize {
        (hash % self.heads.len() as u64) as usize
    }

    pub(crate) fn chain<'a>(&self, slots: &'a Slots, offset: usize) -> Chain<'a> {
        Chain {
            slots,
            cur: self.heads[offset],
        }
    }

    /// First entry in `hash`'s chain whose stored hash and key bytes both match.
    pub(crate) fn find(&self, slots: &Slots, hash: u64, key: &[u8]) -> Option<DefaultKey> {
        self.chain(slots, self.offset(hash)).find(|&k| {
            let e = &slots[k];
            e.hash == hash && *e.key == *key
        })
    }

    /// Append `k` to the tail of its chain.
    pub(crate) fn push_back(&mut self, slots: &mut Slots, k: DefaultKey) {
        let offset = self.offset(slots[k].hash);
        let tail = self.chain(slots, offset).last();
        slots[k].chain.prev = tail;
        slots[k].chain.next = None;
        match tail {
            Some(t) => slots[t].chain.next = Some(k),
            None => self.heads[offset] = Some(k),
        }
    }

    /// Splice `k` out of its chain, leaving its own links cleared.
    pub(crate) fn unlink(&mut self, slots: &mut Slots, k: DefaultKey) {
        let offset = self.offset(slots[k].hash);
        let links = core::mem::take(&mut slots[k].chain);
        match links.prev {
            Some(p) => slots[p].chain.next = links.next,
            None => self.heads[offset] = links.next,
        }
        if let Some(n) = links.next {
            slots[n].chain.prev = links.prev;
        }
    }

    /// Replace the table with one of `capacity` buckets and re-chain every
    /// entry reachable from `order_head`. The new array is allocated before
    /// the old one is released, so on error nothing has changed.
    pub(crate) fn rebuild(
        &mut self,
        slots: &mut Slots,
        order_head: Option<DefaultKey>,
        capacity: usize,
    ) -> Result<(), Error> {
        self.heads = alloc_heads(capacity)?;
        let mut cur = order_head;
        while let Some(k) = cur {
            cur = slots[k].order.next;
            self.push_back(slots, k);
        }
        Ok(())
    }

    pub(crate) fn clear(&mut self) {
        self.heads.fill(None);
    }
}

fn alloc_heads(capacity: usize) -> Result<Vec<Option<DefaultKey>>, Error> {
    let mut heads = Vec::new();
    heads
        .try_reserve_exact(capacity)
        .map_err(Error::alloc("bucket array"))?;
    heads.resize(capacity, None);
    Ok(heads)
}

/// Walks one collision chain front to back.
pub(crate) struct Chain<'a> {
    slots: &'a Slots,
    cur: Option<DefaultKey>,
}

impl Iterator for Chain<'_> {
    type Item = DefaultKey;

    #[inline]
    fn next(&mut self) -> Option<DefaultKey> {
        let k = self.cur?;
        self.cur = self.slots[k].chain.next;
        Some(k)
    }
}

#[inline]
fn at_or_over_threshold(len: usize, capacity: usize) -> bool {
    len as f64 / capacity as f64 >= GROW_THRESHOLD
}

fn doubled(capacity: usize) -> Result<usize, Error> {
    capacity
        .checked_mul(2)
        .ok_or(Error::CapacityOverflow { capacity })
}

/// Capacity to grow to before inserting one more key into a map of `len`
/// entries, or `None` if the projected load stays under the threshold.
pub(crate) fn grow_target(len: usize, capacity: usize) -> Result<Option<usize>, Error> {
    if at_or_over_threshold(len + 1, capacity) {
        doubled(capacity).map(Some)
    } else {
        Ok(None)
    }
}

/// Capacity that fits `len` entries: doubled until under the threshold, then
/// halved while the halved table would still be under it and not below `min`.
pub(crate) fn fit_target(len: usize, capacity: usize, min: usize) -> Result<usize, Error> {
    let mut cap = capacity;
    while at_or_over_threshold(len, cap) {
        cap = doubled(cap)?;
    }
    while cap / 2 >= min && !at_or_over_threshold(len, cap / 2) {
        cap /= 2;
    }
    Ok(cap)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entry::Entry;
    use crate::order::OrderList;

    fn insert(
        slots: &mut Slots,
        order: &mut OrderList,
        table: &mut BucketTable,
        hash: u64,
        key: &[u8],
    ) -> DefaultKey {
        let k = slots.insert(Entry::new(hash, key, b"").unwrap());
        table.push_back(slots, k);
        order.append(slots, k);
        k
    }

    fn chain_keys(table: &BucketTable, slots: &Slots, offset: usize) -> Vec<Vec<u8>> {
        table.chain(slots, offset).map(|k| slots[k].key.to_vec()).collect()
    }

    #[test]
    fn growth_triggers_on_projected_load() {
        // 11 entries + 1 = 12/16 = 0.75
        assert_eq!(grow_target(10, 16).unwrap(), None);
        assert_eq!(grow_target(11, 16).unwrap(), Some(32));
        assert_eq!(grow_target(0, 1).unwrap(), Some(2));
    }

    #[test]
    fn growth_overflow_is_reported() {
        let cap = usize::MAX / 2 + 1;
        assert!(matches!(
            grow_target(cap, cap),
            Err(Error::CapacityOverflow { .. })
        ));
    }

    #[test]
    fn fit_shrinks_to_floor() {
        assert_eq!(fit_target(0, 256, 16).unwrap(), 16);
        assert_eq!(fit_target(5, 256, 1).unwrap(), 8);
        // 12/16 would hit the threshold, so 32 is the smallest fit.
        assert_eq!(fit_target(12, 256, 16).unwrap(), 32);
        assert_eq!(fit_target(11, 256, 16).unwrap(), 16);
    }

    #[test]
    fn fit_grows_when_overloaded() {
        assert_eq!(fit_target(40, 16, 16).unwrap(), 64);
        assert_eq!(fit_target(3, 4, 4).unwrap(), 8);
    }

    #[test]
    fn fit_is_stable_for_a_fitting_table() {
        assert_eq!(fit_target(20, 32, 16).unwrap(), 32);
        assert_eq!(fit_target(0, 16, 16).unwrap(), 16);
    }

    /// Colliding entries chain in insertion order; lookup compares bytes, not
    /// just the hash.
    #[test]
    fn chain_append_find_and_unlink() {
        let mut slots = Slots::with_key();
        let mut order = OrderList::new();
        let mut table = BucketTable::with_capacity(4).unwrap();
        let a = insert(&mut slots, &mut order, &mut table, 1, b"a");
        let b = insert(&mut slots, &mut order, &mut table, 5, b"b");
        let c = insert(&mut slots, &mut order, &mut table, 1, b"c");
        assert_eq!(
            chain_keys(&table, &slots, 1),
            vec![b"a".to_vec(), b"b".to_vec(), b"c".to_vec()]
        );

        assert_eq!(table.find(&slots, 1, b"a"), Some(a));
        assert_eq!(table.find(&slots, 1, b"c"), Some(c));
        assert_eq!(table.find(&slots, 5, b"b"), Some(b));
        // Same bucket, matching key bytes but a different hash.
        assert_eq!(table.find(&slots, 5, b"a"), None);
        assert_eq!(table.find(&slots, 1, b"zz"), None);

        table.unlink(&mut slots, b);
        assert_eq!(chain_keys(&table, &slots, 1), vec![b"a".to_vec(), b"c".to_vec()]);
        table.unlink(&mut slots, a);
        assert_eq!(chain_keys(&table, &slots, 1), vec![b"c".to_vec()]);
        assert_eq!(slots[c].chain.prev, None);
        table.unlink(&mut slots, c);
        assert!(chain_keys(&table, &slots, 1).is_empty());
    }

    #[test]
    fn rebuild_redistributes_by_new_capacity() {
        let mut slots = Slots::with_key();
        let mut order = OrderList::new();
        let mut table = BucketTable::with_capacity(2).unwrap();
        for (h, key) in [(0u64, b"w"), (1, b"x"), (2, b"y"), (3, b"z")] {
            insert(&mut slots, &mut order, &mut table, h, key);
        }
        assert_eq!(chain_keys(&table, &slots, 0), vec![b"w".to_vec(), b"y".to_vec()]);

        table.rebuild(&mut slots, order.head(), 4).unwrap();
        assert_eq!(table.capacity(), 4);
        for (off, key) in [(0, b"w"), (1, b"x"), (2, b"y"), (3, b"z")] {
            assert_eq!(chain_keys(&table, &slots, off), vec![key.to_vec()]);
        }
        // Order links are untouched by a rebuild.
        let first = order.head().unwrap();
        assert_eq!(&*slots[first].key, b"w");
    }

    #[test]
    fn clear_empties_every_bucket() {
        let mut slots = Slots::with_key();
        let mut order = OrderList::new();
        let mut table = BucketTable::with_capacity(3).unwrap();
        insert(&mut slots, &mut order, &mut table, 7, b"q");
        table.clear();
        assert_eq!(table.capacity(), 3);
        assert!((0..3).all(|o| table.chain(&slots, o).next().is_none()));
    }
}
