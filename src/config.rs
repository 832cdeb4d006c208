//! Construction parameters for [`ByteMap`](crate::ByteMap).

use crate::error::Error;

/// Bucket count of a map built with `ByteMap::new`.
pub const DEFAULT_CAPACITY: usize = 16;
/// Default lower bound `optimize` never shrinks below.
pub const DEFAULT_MIN_CAPACITY: usize = 16;
/// Load factor at which the bucket table doubles. Not configurable.
pub const GROW_THRESHOLD: f64 = 0.75;

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct MapConfig {
    pub initial_capacity: usize,
    pub min_capacity: usize,
}

impl MapConfig {
    pub const fn new() -> Self {
        Self {
            initial_capacity: DEFAULT_CAPACITY,
            min_capacity: DEFAULT_MIN_CAPACITY,
        }
    }

    pub const fn with_initial_capacity(mut self, capacity: usize) -> Self {
        self.initial_capacity = capacity;
        self
    }

    pub const fn with_min_capacity(mut self, capacity: usize) -> Self {
        self.min_capacity = capacity;
        self
    }

    pub fn validate(&self) -> Result<(), Error> {
        if self.min_capacity == 0 {
            return Err(Error::InvalidConfig("min_capacity must be at least 1"));
        }
        if self.initial_capacity < self.min_capacity {
            return Err(Error::InvalidConfig(
                "initial_capacity must not be below min_capacity",
            ));
        }
        Ok(())
    }
}

impl Default for MapConfig {
    fn default() -> Self {
        Self::new()
    }
}
