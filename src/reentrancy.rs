//! Debug-only exclusive-use guard.
//!
//! A map runs exactly one piece of foreign code: the user's `Hasher`. If that
//! code reaches back into the same map while an operation is half-way through
//! relinking entries, debug builds panic and name both operations. Release
//! builds compile the guard away.

use core::cell::Cell;
use core::marker::PhantomData;

#[derive(Debug)]
pub(crate) struct DebugExclusive {
    #[cfg(debug_assertions)]
    active: Cell<Option<&'static str>>,
    // Keeps the map !Send + !Sync in every build profile, not just debug.
    _nosend: PhantomData<*mut ()>,
}

impl DebugExclusive {
    pub(crate) const fn new() -> Self {
        Self {
            #[cfg(debug_assertions)]
            active: Cell::new(None),
            _nosend: PhantomData,
        }
    }

    /// Mark `op` as running until the returned guard drops.
    #[inline]
    #[cfg_attr(not(debug_assertions), allow(unused_variables))]
    pub(crate) fn enter(&self, op: &'static str) -> ExclusiveGuard<'_> {
        #[cfg(debug_assertions)]
        {
            if let Some(running) = self.active.get() {
                panic!("reentrant call to `{op}` while `{running}` is in progress");
            }
            self.active.set(Some(op));
            return ExclusiveGuard { owner: self, op };
        }

        #[cfg(not(debug_assertions))]
        {
            return ExclusiveGuard { _z: PhantomData };
        }
    }
}

impl Default for DebugExclusive {
    fn default() -> Self {
        Self::new()
    }
}

/// Holds the name of the running operation until dropped.
pub(crate) struct ExclusiveGuard<'a> {
    #[cfg(debug_assertions)]
    owner: &'a DebugExclusive,
    #[cfg(debug_assertions)]
    op: &'static str,
    #[cfg(not(debug_assertions))]
    _z: PhantomData<&'a ()>,
}

impl ExclusiveGuard<'_> {
    /// Operation this guard was taken for; `None` in release builds.
    #[cfg(test)]
    pub(crate) fn op(&self) -> Option<&'static str> {
        #[cfg(debug_assertions)]
        {
            return Some(self.op);
        }

        #[cfg(not(debug_assertions))]
        {
            return None;
        }
    }
}

impl Drop for ExclusiveGuard<'_> {
    fn drop(&mut self) {
        #[cfg(debug_assertions)]
        {
            // Guards release in the order they were taken, so the slot still
            // names this guard's operation.
            debug_assert_eq!(self.owner.active.get(), Some(self.op));
            self.owner.active.set(None);
        }
    }
}
