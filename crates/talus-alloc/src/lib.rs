//! Manually-allocated containers for flat value data.
//!
//! This crate is the allocation/growth/transfer engine behind the talus
//! containers, and the only crate in the workspace that contains `unsafe`
//! code.
//!
//! # Architecture
//!
//! ```text
//! GrowList<T> ──transfer (move, no copy)──▶ FixedArray<T>
//!      │                                         │
//!      └────────────── RawBlock<T> ◀─────────────┘
//!                 (NonNull<T> + capacity,
//!              exactly one live owner at a time)
//! ```
//!
//! - `RawBlock` (internal): an unchecked raw memory block — allocate,
//!   free, reinterpret as slice. No bounds checks, no ownership tracking.
//! - [`FixedArray`]: immutable-length container owning one block with
//!   `capacity == len` until explicitly released.
//! - [`GrowList`]: growable container with amortized-doubling capacity,
//!   aliasing-safe range insertion, and zero-copy ownership transfer of its
//!   block into a new [`FixedArray`].
//! - [`LockedList`]: optional fully-serialized wrapper (one mutex around a
//!   `GrowList`) for callers that need cross-thread mutation.
//!
//! # Unsafe policy
//!
//! All raw-pointer operations live in `raw.rs`; the two containers call
//! them through narrow `unsafe` blocks, each carrying a `// SAFETY:`
//! comment that names the `len <= capacity` invariant justifying it. The
//! public API is entirely safe.
//!
//! # Memory discipline
//!
//! Elements are [`Flat`](talus_core::Flat) values: byte-copyable, no drop
//! glue, valid when zeroed. A block is freed exactly once, by whichever
//! container owns it when `release` (or `Drop`) runs; ownership transfer
//! moves the block without copying and leaves the source container empty
//! but safely releasable.

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]

pub mod array;
pub mod list;
mod raw;
pub mod sync;

pub use array::FixedArray;
pub use list::GrowList;
pub use sync::{LockedList, SharedList};
