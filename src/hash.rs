//! Polynomial rolling hash over key bytes.
//!
//! `hash = Σ (byte_i - '!' + 1) * 97^i  (mod 1_000_000_009)`, evaluated left to
//! right. The digest is stable within a process and across runs, but callers
//! must not persist it: only bucket placement depends on it.

use core::hash::{BuildHasher, Hasher};

/// Polynomial base.
pub const BASE: u64 = 97;
/// Prime modulus; every digest is strictly below it.
pub const MODULUS: u64 = 1_000_000_009;

/// Hash a whole key in one call.
#[inline]
pub fn poly_hash(key: &[u8]) -> u64 {
    let mut h = PolyHasher::new();
    h.write(key);
    h.finish()
}

/// Streaming form of [`poly_hash`]. Successive `write` calls continue the
/// polynomial, so hashing `b"ab"` equals hashing `b"a"` then `b"b"`.
#[derive(Clone, Debug)]
pub struct PolyHasher {
    hash: u64,
    pow: u64,
}

impl PolyHasher {
    pub const fn new() -> Self {
        Self { hash: 0, pow: 1 }
    }
}

impl Default for PolyHasher {
    fn default() -> Self {
        Self::new()
    }
}

impl Hasher for PolyHasher {
    fn write(&mut self, bytes: &[u8]) {
        for &b in bytes {
            // Bytes below '!' give a negative coefficient; fold it into [0, MODULUS).
            let term = (i64::from(b) - i64::from(b'!') + 1).rem_euclid(MODULUS as i64) as u64;
            self.hash = (self.hash + term * self.pow) % MODULUS;
            self.pow = (self.pow * BASE) % MODULUS;
        }
    }

    #[inline]
    fn finish(&self) -> u64 {
        self.hash
    }
}

/// Default hasher builder for [`ByteMap`](crate::ByteMap).
#[derive(Copy, Clone, Debug, Default)]
pub struct BuildPolyHasher;

impl BuildHasher for BuildPolyHasher {
    type Hasher = PolyHasher;

    #[inline]
    fn build_hasher(&self) -> PolyHasher {
        PolyHasher::new()
    }
}
