//! Error types for this crate.

use alloc::collections::TryReserveError;
use core::fmt;

/// Memory for a map's bucket tables or key pairs could not be obtained.
///
/// Returned by the constructors of [`BiHashMap`](crate::BiHashMap) and by
/// insertions that need to allocate. A failed insertion leaves the map exactly
/// as it was before the call.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum AllocError {
    /// No power of two that fits in a `usize` is large enough for the
    /// requested number of buckets.
    CapacityOverflow {
        /// The smallest bucket count that would have been acceptable.
        requested: usize,
    },

    /// The allocator could not provide the memory, or the allocation size
    /// overflowed.
    Reserve(TryReserveError),
}

impl From<TryReserveError> for AllocError {
    fn from(error: TryReserveError) -> Self {
        AllocError::Reserve(error)
    }
}

impl fmt::Display for AllocError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AllocError::CapacityOverflow { requested } => write!(
                f,
                "bucket count overflow: no power of two in usize is at least \
                 {requested}"
            ),
            AllocError::Reserve(_) => {
                f.write_str("failed to allocate memory for map storage")
            }
        }
    }
}

impl core::error::Error for AllocError {
    fn source(&self) -> Option<&(dyn core::error::Error + 'static)> {
        match self {
            AllocError::CapacityOverflow { .. } => None,
            AllocError::Reserve(error) => Some(error),
        }
    }
}
