//! The uniform container access trait.

use crate::error::StoreError;
use crate::flat::Flat;

/// Fallible element access shared by the fixed-length and growable
/// containers.
///
/// The trait exists so that generic call sites (converters, debug views,
/// interop adapters) can address either container through one seam. Every
/// operation surfaces contract violations as [`StoreError`] values; none of
/// them panics on bad input. A fixed-length implementor answers every
/// structural mutator with [`StoreError::FixedLength`] rather than silently
/// ignoring the call.
pub trait Store<T: Flat> {
    /// Number of live elements. Reports 0 after release.
    fn len(&self) -> usize;

    /// Whether the container holds no live elements.
    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Read the element at `index`.
    fn get(&self, index: usize) -> Result<T, StoreError>;

    /// Overwrite the element at `index`.
    fn set(&mut self, index: usize, value: T) -> Result<(), StoreError>;

    /// Append `value` after the last element.
    fn push(&mut self, value: T) -> Result<(), StoreError>;

    /// Insert `value` at `index`, shifting `[index, len)` right.
    ///
    /// `index == len` is a valid insertion point (append).
    fn insert(&mut self, index: usize, value: T) -> Result<(), StoreError>;

    /// Remove and return the element at `index`, shifting the tail left.
    fn remove_at(&mut self, index: usize) -> Result<T, StoreError>;

    /// Remove the first element equal to `value`.
    ///
    /// Returns `Ok(false)` with no mutation when no element matches.
    fn remove(&mut self, value: &T) -> Result<bool, StoreError>
    where
        T: PartialEq;

    /// Index of the first element equal to `value`, if any.
    fn index_of(&self, value: &T) -> Result<Option<usize>, StoreError>
    where
        T: PartialEq;

    /// Whether any element equals `value`.
    fn contains(&self, value: &T) -> Result<bool, StoreError>
    where
        T: PartialEq,
    {
        Ok(self.index_of(value)?.is_some())
    }

    /// Drop all elements while keeping the backing storage.
    fn clear(&mut self) -> Result<(), StoreError>;

    /// Borrow the live elements as a contiguous slice.
    ///
    /// The borrow is valid only until the next mutating call on the
    /// container; after release the slice is empty.
    fn as_slice(&self) -> &[T];

    /// Release the backing memory. Idempotent: releasing an already
    /// released container is a no-op.
    fn release(&mut self);
}
