//! Insertion-order iterators over a [`ByteMap`](crate::ByteMap).

use crate::entry::Slots;
use core::iter::FusedIterator;
use slotmap::DefaultKey;

/// Iterator over `(key, value)` pairs, oldest first.
#[derive(Clone)]
pub struct Iter<'a> {
    slots: &'a Slots,
    next: Option<DefaultKey>,
    remaining: usize,
}

impl<'a> Iter<'a> {
    pub(crate) fn new(slots: &'a Slots, head: Option<DefaultKey>, len: usize) -> Self {
        Self {
            slots,
            next: head,
            remaining: len,
        }
    }
}

impl<'a> Iterator for Iter<'a> {
    type Item = (&'a [u8], &'a [u8]);

    #[inline]
    fn next(&mut self) -> Option<Self::Item> {
        let k = self.next?;
        let e = &self.slots[k];
        self.next = e.order.next;
        self.remaining -= 1;
        Some((&*e.key, &*e.value))
    }

    #[inline]
    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}

impl ExactSizeIterator for Iter<'_> {}
impl FusedIterator for Iter<'_> {}

/// Keys in insertion order.
#[derive(Clone)]
pub struct Keys<'a> {
    it: Iter<'a>,
}

impl<'a> Keys<'a> {
    pub(crate) fn new(it: Iter<'a>) -> Self {
        Self { it }
    }
}

impl<'a> Iterator for Keys<'a> {
    type Item = &'a [u8];

    #[inline]
    fn next(&mut self) -> Option<&'a [u8]> {
        self.it.next().map(|(k, _)| k)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.it.size_hint()
    }
}

impl ExactSizeIterator for Keys<'_> {}
impl FusedIterator for Keys<'_> {}

/// Values in insertion order.
#[derive(Clone)]
pub struct Values<'a> {
    it: Iter<'a>,
}

impl<'a> Values<'a> {
    pub(crate) fn new(it: Iter<'a>) -> Self {
        Self { it }
    }
}

impl<'a> Iterator for Values<'a> {
    type Item = &'a [u8];

    #[inline]
    fn next(&mut self) -> Option<&'a [u8]> {
        self.it.next().map(|(_, v)| v)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.it.size_hint()
    }
}

impl ExactSizeIterator for Values<'_> {}
impl FusedIterator for Values<'_> {}
