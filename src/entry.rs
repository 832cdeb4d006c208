//! Arena entries and the handles that name them.

use crate::byte_map::ByteMap;
use crate::error::Error;
use slotmap::{DefaultKey, SlotMap};

/// Arena owning every live entry; all links are keys into it.
pub(crate) type Slots = SlotMap<DefaultKey, Entry>;

/// Stable reference to a live entry. Generational: once the entry is removed
/// (by `delete`, by an overwriting `put`, or by `clear`) the handle never
/// resolves again, even if its arena slot is reused.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub struct Handle(DefaultKey);

impl Handle {
    pub(crate) fn new(k: DefaultKey) -> Self {
        Handle(k)
    }
    pub(crate) fn raw_handle(&self) -> DefaultKey {
        self.0
    }

    pub fn key<'a, S>(&self, map: &'a ByteMap<S>) -> Option<&'a [u8]> {
        map.entry(*self).map(|e| &*e.key)
    }

    pub fn value<'a, S>(&self, map: &'a ByteMap<S>) -> Option<&'a [u8]> {
        map.entry(*self).map(|e| &*e.value)
    }

    /// The digest computed when the entry was inserted.
    pub fn hash<S>(&self, map: &ByteMap<S>) -> Option<u64> {
        map.entry(*self).map(|e| e.hash)
    }
}

/// Previous/next neighbours in one of the two intrusive lists.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub(crate) struct Links {
    pub(crate) prev: Option<DefaultKey>,
    pub(crate) next: Option<DefaultKey>,
}

#[derive(Debug)]
pub(crate) struct Entry {
    pub(crate) hash: u64,
    pub(crate) key: Box<[u8]>,
    pub(crate) value: Box<[u8]>,
    pub(crate) chain: Links,
    pub(crate) order: Links,
}

impl Entry {
    /// Copy `key` and `value` into owned buffers. Both reservations are made
    /// before anything is linked, so failure here leaves the map untouched.
    pub(crate) fn new(hash: u64, key: &[u8], value: &[u8]) -> Result<Self, Error> {
        Ok(Self {
            hash,
            key: copy_bytes(key, "entry key")?,
            value: copy_bytes(value, "entry value")?,
            chain: Links::default(),
            order: Links::default(),
        })
    }
}

fn copy_bytes(src: &[u8], what: &'static str) -> Result<Box<[u8]>, Error> {
    let mut buf = Vec::new();
    buf.try_reserve_exact(src.len()).map_err(Error::alloc(what))?;
    buf.extend_from_slice(src);
    Ok(buf.into_boxed_slice())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_entry_owns_copies_and_is_unlinked() {
        let key = b"k".to_vec();
        let value = vec![1u8, 2, 3];
        let e = Entry::new(7, &key, &value).unwrap();
        drop((key, value));
        assert_eq!(&*e.key, b"k");
        assert_eq!(&*e.value, &[1, 2, 3]);
        assert_eq!(e.hash, 7);
        assert_eq!(e.chain, Links::default());
        assert_eq!(e.order, Links::default());
    }

    #[test]
    fn empty_value_is_allowed() {
        let e = Entry::new(0, b"k", b"").unwrap();
        assert!(e.value.is_empty());
    }
}
