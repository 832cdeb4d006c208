//! Insertion-order list threaded through `Entry::order`.
//!
//! Independent of bucket placement: a rehash never touches these links, so
//! iteration order survives any number of resizes.

use crate::entry::Slots;
use slotmap::DefaultKey;

#[derive(Debug, Default)]
pub(crate) struct OrderList {
    head: Option<DefaultKey>,
    tail: Option<DefaultKey>,
}

impl OrderList {
    pub(crate) const fn new() -> Self {
        Self {
            head: None,
            tail: None,
        }
    }

    pub(crate) fn head(&self) -> Option<DefaultKey> {
        self.head
    }

    pub(crate) fn tail(&self) -> Option<DefaultKey> {
        self.tail
    }

    /// Link `k` after the current tail.
    pub(crate) fn append(&mut self, slots: &mut Slots, k: DefaultKey) {
        let prev = self.tail;
        {
            let e = &mut slots[k];
            e.order.prev = prev;
            e.order.next = None;
        }
        match prev {
            Some(p) => slots[p].order.next = Some(k),
            None => self.head = Some(k),
        }
        self.tail = Some(k);
    }

    /// Splice `k` out, leaving its own links cleared.
    pub(crate) fn unlink(&mut self, slots: &mut Slots, k: DefaultKey) {
        let links = core::mem::take(&mut slots[k].order);
        match links.prev {
            Some(p) => slots[p].order.next = links.next,
            None => self.head = links.next,
        }
        match links.next {
            Some(n) => slots[n].order.prev = links.prev,
            None => self.tail = links.prev,
        }
    }

    pub(crate) fn clear(&mut self) {
        self.head = None;
        self.tail = None;
    }
}
