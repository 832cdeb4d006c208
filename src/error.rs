use std::collections::TryReserveError;

/// Failures surfaced by mutating [`ByteMap`](crate::ByteMap) operations.
///
/// Every fallible allocation happens before the map is touched, so the map is
/// left exactly as it was when one of these is returned.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("key must not be empty")]
    EmptyKey,
    #[error("failed to allocate {what}")]
    Alloc {
        what: &'static str,
        #[source]
        source: TryReserveError,
    },
    #[error("bucket count overflows when growing past {capacity}")]
    CapacityOverflow { capacity: usize },
    #[error("invalid map configuration: {0}")]
    InvalidConfig(&'static str),
}

impl Error {
    pub(crate) fn alloc(what: &'static str) -> impl FnOnce(TryReserveError) -> Self {
        move |source| Error::Alloc { what, source }
    }
}
