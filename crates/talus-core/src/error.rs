//! Container error types.
//!
//! Every failure here is a programming-contract violation surfaced
//! synchronously to the immediate caller — there are no transient
//! conditions and no retry paths. No operation partially mutates a
//! container and then fails: a mutator either completes or leaves the
//! container exactly as it was.

use std::error::Error;
use std::fmt;

/// Errors that can occur during container operations.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum StoreError {
    /// An element index outside `[0, len)` (or `[0, len]` for insertion
    /// points).
    IndexOutOfBounds {
        /// The offending index.
        index: usize,
        /// The container's logical length at the time of the call.
        len: usize,
    },
    /// A sub-range that does not lie within the container's live region.
    RangeOutOfBounds {
        /// Start of the requested range (inclusive).
        start: usize,
        /// End of the requested range (exclusive).
        end: usize,
        /// The container's logical length at the time of the call.
        len: usize,
    },
    /// A bulk copy would not fit in the destination.
    DestinationTooSmall {
        /// Number of element slots the copy needs.
        required: usize,
        /// Number of element slots actually available.
        available: usize,
    },
    /// A capacity change was requested below the current logical length.
    CapacityBelowLength {
        /// The requested capacity.
        requested: usize,
        /// The current logical length.
        len: usize,
    },
    /// Capacity arithmetic (doubling, or the byte size of the allocation)
    /// would exceed the representable element count.
    CapacityOverflow {
        /// The minimum capacity that was being grown towards.
        requested: usize,
    },
    /// Access attempted on a container whose backing memory was released.
    Released,
    /// Structural mutation attempted on a fixed-length container.
    FixedLength {
        /// Name of the rejected operation.
        op: &'static str,
    },
}

impl fmt::Display for StoreError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::IndexOutOfBounds { index, len } => {
                write!(f, "index {index} out of bounds for length {len}")
            }
            Self::RangeOutOfBounds { start, end, len } => {
                write!(f, "range {start}..{end} out of bounds for length {len}")
            }
            Self::DestinationTooSmall {
                required,
                available,
            } => {
                write!(
                    f,
                    "destination too small: {required} slots required, {available} available"
                )
            }
            Self::CapacityBelowLength { requested, len } => {
                write!(
                    f,
                    "requested capacity {requested} is below the current length {len}"
                )
            }
            Self::CapacityOverflow { requested } => {
                write!(f, "capacity overflow while growing towards {requested} elements")
            }
            Self::Released => write!(f, "container backing memory has been released"),
            Self::FixedLength { op } => {
                write!(f, "operation '{op}' is not supported on a fixed-length container")
            }
        }
    }
}

impl Error for StoreError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_includes_context() {
        let e = StoreError::IndexOutOfBounds { index: 7, len: 3 };
        assert_eq!(e.to_string(), "index 7 out of bounds for length 3");

        let e = StoreError::DestinationTooSmall {
            required: 10,
            available: 4,
        };
        assert!(e.to_string().contains("10 slots required"));
    }

    #[test]
    fn errors_are_comparable() {
        assert_eq!(StoreError::Released, StoreError::Released);
        assert_ne!(
            StoreError::Released,
            StoreError::FixedLength { op: "push" }
        );
    }
}
