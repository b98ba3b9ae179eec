//! Talus: manually-managed containers for flat value data.
//!
//! This is the top-level facade crate that re-exports the public API from
//! the talus sub-crates. For most users, adding `talus` as a single
//! dependency is sufficient.
//!
//! # Quick start
//!
//! ```rust
//! use talus::prelude::*;
//!
//! // Build up a list incrementally; capacity doubles as needed.
//! let mut readings: GrowList<f32> = GrowList::new();
//! for i in 0..1000 {
//!     readings.push(i as f32 * 0.5).unwrap();
//! }
//! assert_eq!(readings.len(), 1000);
//! assert!(readings.capacity() >= 1000);
//!
//! // Duplicate a window of the list into itself; aliasing is handled.
//! readings.insert_from_within(10, 0..10).unwrap();
//! assert_eq!(readings.len(), 1010);
//!
//! // Hand the buffer to a fixed array without copying, then free it
//! // deterministically.
//! let mut frozen: FixedArray<f32> = readings.transfer();
//! assert_eq!(readings.len(), 0);
//! assert_eq!(frozen.len(), 1010);
//! frozen.release();
//! assert!(frozen.as_slice().is_empty());
//! ```
//!
//! # Modules
//!
//! | Module | Sub-crate | Contents |
//! |--------|-----------|----------|
//! | [`types`] | `talus-core` | [`Flat`] contract, [`StoreError`], [`Store`] trait |
//! | crate root | `talus-alloc` | [`FixedArray`], [`GrowList`], [`LockedList`] |

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

pub use talus_alloc::{FixedArray, GrowList, LockedList, SharedList};
pub use talus_core::{Flat, Store, StoreError};

/// Element contracts, errors, and access traits (`talus-core`).
pub mod types {
    pub use talus_core::{Flat, Store, StoreError};
}

/// The most commonly used items in one import.
pub mod prelude {
    pub use talus_alloc::{FixedArray, GrowList};
    pub use talus_core::{Flat, Store, StoreError};
}
