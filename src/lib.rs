//! ordered-bytemap: a single-threaded hash map over byte-string keys with
//! separate chaining and insertion-ordered iteration.
//!
//! Internal Design:
//!
//! Summary
//! - Goal: amortized O(1) put/get/delete on arbitrary byte keys, plus a
//!   traversal order that does not depend on bucket layout.
//! - Layers:
//!   - Arena: a `SlotMap` of entries. Each entry owns copies of its key and
//!     value bytes and the digest computed when it was inserted.
//!   - BucketTable: `capacity` chain heads; entries colliding on
//!     `hash % capacity` form a doubly linked chain through the arena.
//!   - OrderList: a second doubly linked list through the same entries, in
//!     insertion order. It is the authoritative membership list.
//!   - ByteMap: public API. Every insert and removal goes through one code
//!     path that updates both lists together.
//!
//! Constraints
//! - Single-threaded: `!Send`/`!Sync`.
//! - Keys are non-empty; equality is exact byte equality. Digest equality
//!   alone never identifies a key.
//! - Links are generational arena keys, never pointers. A removed entry's
//!   key cannot alias a later entry.
//!
//! Resize policy
//! - Before a new key is linked, if `(len + 1) / capacity >= 0.75` the table
//!   doubles. Overwrites and deletes never resize.
//! - `optimize` fits the table to `len`, shrinking by halves down to a
//!   configurable floor.
//! - A rehash walks the order list and re-chains every entry. It allocates
//!   only the new bucket array; entries and order links are untouched.
//!
//! Failure model
//! - Bucket arrays and entry byte buffers are reserved with `try_reserve`
//!   before any link changes, so an `Err` from a mutating call leaves the map
//!   exactly as it was.
//!
//! Hashing
//! - The default digest is a base-97 polynomial mod 1_000_000_009 (see
//!   [`hash`]). Any `BuildHasher` can be substituted; it receives each key as
//!   one `write` of the raw bytes. Debug builds panic if that hasher re-enters
//!   the map.

mod buckets;
mod byte_map;
mod byte_map_proptest;
pub mod config;
mod entry;
mod error;
pub mod hash;
pub mod iter;
mod order;
mod reentrancy;

// Public surface
pub use byte_map::ByteMap;
pub use config::MapConfig;
pub use entry::Handle;
pub use error::Error;
pub use hash::{poly_hash, BuildPolyHasher, PolyHasher};
