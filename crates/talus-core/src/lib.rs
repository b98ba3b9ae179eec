//! Element contracts, errors, and access traits for the talus containers.
//!
//! This is the leaf crate with no internal dependencies. It defines the
//! [`Flat`] element contract (flat, pointer-free value types that are safe
//! to keep in manually-managed raw memory), the [`StoreError`] taxonomy
//! shared by every container operation, and the [`Store`] access trait that
//! both containers implement.

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

pub mod error;
pub mod flat;
pub mod traits;

pub use error::StoreError;
pub use flat::Flat;
pub use traits::Store;
