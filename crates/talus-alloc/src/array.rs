//! The fixed-length container.
//!
//! A [`FixedArray`] owns one raw block whose capacity equals its length for
//! the whole lifetime of the array, until an explicit [`FixedArray::release`]
//! (or `Drop`, which runs the same path). The length never changes after
//! construction; structural mutation is rejected at the [`Store`] seam with
//! [`StoreError::FixedLength`].
//!
//! # Use-after-release policy
//!
//! Exactly one policy, applied uniformly: after `release`, every
//! `Result`-returning accessor or mutator returns
//! [`StoreError::Released`], while the infallible views — [`len`],
//! [`as_slice`], [`iter`] — report 0 / empty. Releasing any number of
//! additional times is a no-op.
//!
//! [`len`]: FixedArray::len
//! [`as_slice`]: FixedArray::as_slice
//! [`iter`]: FixedArray::iter

use std::fmt;

use talus_core::{Flat, Store, StoreError};

use crate::raw::RawBlock;

/// An immutable-length container of flat values in manually-managed memory.
///
/// Created either by one of the allocating constructors (all of which fully
/// initialize every slot before returning) or by zero-copy ownership
/// transfer from a [`GrowList`](crate::GrowList). Element access is
/// bounds-checked and fallible; the length itself can never change.
pub struct FixedArray<T: Flat> {
    /// Backing block. The allocating constructors make `capacity == len`;
    /// a length-mode transfer may leave trailing capacity beyond `len`,
    /// which rides along and is freed with the rest on release.
    buf: RawBlock<T>,
    /// Fixed element count. Reset to 0 by release.
    len: usize,
    /// Set once by release; drives the use-after-release policy.
    released: bool,
}

impl<T: Flat> FixedArray<T> {
    /// The empty array: no allocation, length 0.
    ///
    /// Releasing an empty array (any number of times) is always a no-op.
    pub const fn empty() -> Self {
        Self {
            buf: RawBlock::sentinel(),
            len: 0,
            released: false,
        }
    }

    /// Allocate `len` zero-initialized slots.
    pub fn zeroed(len: usize) -> Result<Self, StoreError> {
        let buf = RawBlock::alloc_zeroed(len)?;
        Ok(Self {
            buf,
            len,
            released: false,
        })
    }

    /// Allocate `len` slots, each set to `value`.
    pub fn filled(value: T, len: usize) -> Result<Self, StoreError> {
        let mut buf = RawBlock::alloc(len)?;
        if len > 0 {
            // SAFETY: the block was just allocated with capacity `len`;
            // fill initializes every slot before anything reads it.
            unsafe { buf.slice_mut(0, len) }.fill(value);
        }
        Ok(Self {
            buf,
            len,
            released: false,
        })
    }

    /// Allocate and copy from a borrowed slice.
    pub fn from_slice(src: &[T]) -> Self {
        let mut buf = RawBlock::alloc(src.len())
            .expect("a live slice always fits in a single allocation");
        if !src.is_empty() {
            // SAFETY: capacity equals src.len() and a freshly allocated
            // block cannot alias a borrowed slice.
            unsafe { buf.copy_from_slice_at(src, 0) };
        }
        Self {
            buf,
            len: src.len(),
            released: false,
        }
    }

    /// Reinterpret the raw bytes of a flat value as an array of `T`.
    ///
    /// The element count is `size_of::<V>()` divided by `size_of::<T>()`,
    /// rounded up, so the array covers at least every byte of `value`. When
    /// the sizes do not divide evenly, the trailing bytes of the last
    /// element are zero. This is a byte-reinterpretation utility, not a
    /// semantic conversion; the result depends on `V`'s declared layout.
    pub fn from_flat_value<V: Flat>(value: &V) -> Self {
        let bytes = bytemuck::bytes_of(value);
        let len = bytes.len().div_ceil(std::mem::size_of::<T>());
        let mut buf = RawBlock::alloc_zeroed(len)
            .expect("a single flat value always fits in a single allocation");
        if len > 0 {
            // SAFETY: the block was just zero-allocated with capacity `len`,
            // which spans at least bytes.len() bytes.
            let slots = unsafe { buf.slice_mut(0, len) };
            bytemuck::cast_slice_mut::<T, u8>(slots)[..bytes.len()].copy_from_slice(bytes);
        }
        Self {
            buf,
            len,
            released: false,
        }
    }

    /// Take direct, uncopied ownership of a block.
    ///
    /// The caller guarantees that all `len` slots were initialized by the
    /// previous owner. This is the receiving end of ownership transfer;
    /// block capacity beyond `len` is carried (and eventually freed) as
    /// part of the same allocation.
    pub(crate) fn from_raw(buf: RawBlock<T>, len: usize) -> Self {
        debug_assert!(len <= buf.capacity());
        Self {
            buf,
            len,
            released: false,
        }
    }

    fn guard(&self) -> Result<(), StoreError> {
        if self.released {
            Err(StoreError::Released)
        } else {
            Ok(())
        }
    }

    /// Number of elements. Reports 0 after release.
    pub fn len(&self) -> usize {
        self.len
    }

    /// Whether the array holds no elements.
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Read the element at `index`.
    pub fn get(&self, index: usize) -> Result<T, StoreError> {
        self.guard()?;
        if index >= self.len {
            return Err(StoreError::IndexOutOfBounds {
                index,
                len: self.len,
            });
        }
        // SAFETY: index < len == capacity and every slot was initialized at
        // construction.
        Ok(unsafe { self.buf.read(index) })
    }

    /// Overwrite the element at `index`.
    pub fn set(&mut self, index: usize, value: T) -> Result<(), StoreError> {
        self.guard()?;
        if index >= self.len {
            return Err(StoreError::IndexOutOfBounds {
                index,
                len: self.len,
            });
        }
        // SAFETY: index < len == capacity.
        unsafe { self.buf.write(index, value) };
        Ok(())
    }

    /// Index of the first element equal to `value`, scanning from 0.
    pub fn index_of(&self, value: &T) -> Result<Option<usize>, StoreError>
    where
        T: PartialEq,
    {
        self.guard()?;
        Ok(self.as_slice().iter().position(|v| v == value))
    }

    /// Whether any element equals `value`.
    pub fn contains(&self, value: &T) -> Result<bool, StoreError>
    where
        T: PartialEq,
    {
        Ok(self.index_of(value)?.is_some())
    }

    /// Copy all elements into `dst` starting at `offset`.
    pub fn copy_to(&self, dst: &mut [T], offset: usize) -> Result<(), StoreError> {
        self.guard()?;
        if offset > dst.len() {
            return Err(StoreError::IndexOutOfBounds {
                index: offset,
                len: dst.len(),
            });
        }
        let available = dst.len() - offset;
        if available < self.len {
            return Err(StoreError::DestinationTooSmall {
                required: self.len,
                available,
            });
        }
        dst[offset..offset + self.len].copy_from_slice(self.as_slice());
        Ok(())
    }

    /// Copy a slice into this array starting at `offset`.
    ///
    /// Errors if the write would run past the fixed length.
    pub fn copy_from_slice_at(&mut self, src: &[T], offset: usize) -> Result<(), StoreError> {
        self.guard()?;
        if offset > self.len {
            return Err(StoreError::IndexOutOfBounds {
                index: offset,
                len: self.len,
            });
        }
        let available = self.len - offset;
        if available < src.len() {
            return Err(StoreError::DestinationTooSmall {
                required: src.len(),
                available,
            });
        }
        self.as_mut_slice()[offset..offset + src.len()].copy_from_slice(src);
        Ok(())
    }

    /// Copy the first `count` elements of `src` into this array at
    /// `offset`.
    pub fn copy_from(
        &mut self,
        src: &FixedArray<T>,
        offset: usize,
        count: usize,
    ) -> Result<(), StoreError> {
        src.guard()?;
        if count > src.len {
            return Err(StoreError::RangeOutOfBounds {
                start: 0,
                end: count,
                len: src.len,
            });
        }
        self.copy_from_slice_at(&src.as_slice()[..count], offset)
    }

    /// Borrow all elements as a contiguous slice. Empty after release.
    pub fn as_slice(&self) -> &[T] {
        if self.len == 0 {
            return &[];
        }
        // SAFETY: len == capacity and every slot was initialized at
        // construction; the borrow ends before any release can run.
        unsafe { self.buf.slice(0, self.len) }
    }

    /// Borrow all elements as a mutable slice. Empty after release.
    pub fn as_mut_slice(&mut self) -> &mut [T] {
        if self.len == 0 {
            return &mut [];
        }
        // SAFETY: same contract as `as_slice`; the exclusive borrow rules
        // out a concurrent release.
        unsafe { self.buf.slice_mut(0, self.len) }
    }

    /// Borrow `len` elements starting at `start`.
    pub fn slice_at(&self, start: usize, len: usize) -> Result<&[T], StoreError> {
        self.guard()?;
        let end = start
            .checked_add(len)
            .ok_or(StoreError::CapacityOverflow { requested: len })?;
        if end > self.len {
            return Err(StoreError::RangeOutOfBounds {
                start,
                end,
                len: self.len,
            });
        }
        Ok(&self.as_slice()[start..end])
    }

    /// Iterate over the elements in index order.
    ///
    /// Each call yields a fresh, restartable iterator. The borrow checker
    /// statically rules out structural mutation while an iterator is live,
    /// so no runtime modification guard exists.
    pub fn iter(&self) -> std::slice::Iter<'_, T> {
        self.as_slice().iter()
    }

    /// Release the backing memory.
    ///
    /// Idempotent: the first call frees the block; every further call is a
    /// no-op. Afterwards `len` reports 0, the slice views are empty, and
    /// the fallible accessors return [`StoreError::Released`].
    pub fn release(&mut self) {
        if self.released {
            return;
        }
        self.buf.free();
        self.len = 0;
        self.released = true;
    }
}

impl<T: Flat> Drop for FixedArray<T> {
    /// Last-resort cleanup through the same idempotent release path.
    /// Explicit [`FixedArray::release`] remains the primary contract.
    fn drop(&mut self) {
        self.release();
    }
}

impl<T: Flat> Default for FixedArray<T> {
    fn default() -> Self {
        Self::empty()
    }
}

// SAFETY: the array exclusively owns its block; sending or sharing it moves
// or shares plain flat data with no interior mutability.
unsafe impl<T: Flat + Send> Send for FixedArray<T> {}
// SAFETY: shared references only permit reads of plain flat data.
unsafe impl<T: Flat + Sync> Sync for FixedArray<T> {}

impl<T: Flat + PartialEq> PartialEq for FixedArray<T> {
    fn eq(&self, other: &Self) -> bool {
        self.as_slice() == other.as_slice()
    }
}

impl<T: Flat + fmt::Debug> fmt::Debug for FixedArray<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.as_slice()).finish()
    }
}

impl<'a, T: Flat> IntoIterator for &'a FixedArray<T> {
    type Item = &'a T;
    type IntoIter = std::slice::Iter<'a, T>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

impl<T: Flat> Store<T> for FixedArray<T> {
    fn len(&self) -> usize {
        FixedArray::len(self)
    }

    fn get(&self, index: usize) -> Result<T, StoreError> {
        FixedArray::get(self, index)
    }

    fn set(&mut self, index: usize, value: T) -> Result<(), StoreError> {
        FixedArray::set(self, index, value)
    }

    fn push(&mut self, _value: T) -> Result<(), StoreError> {
        Err(StoreError::FixedLength { op: "push" })
    }

    fn insert(&mut self, _index: usize, _value: T) -> Result<(), StoreError> {
        Err(StoreError::FixedLength { op: "insert" })
    }

    fn remove_at(&mut self, _index: usize) -> Result<T, StoreError> {
        Err(StoreError::FixedLength { op: "remove_at" })
    }

    fn remove(&mut self, _value: &T) -> Result<bool, StoreError>
    where
        T: PartialEq,
    {
        Err(StoreError::FixedLength { op: "remove" })
    }

    fn index_of(&self, value: &T) -> Result<Option<usize>, StoreError>
    where
        T: PartialEq,
    {
        FixedArray::index_of(self, value)
    }

    fn clear(&mut self) -> Result<(), StoreError> {
        Err(StoreError::FixedLength { op: "clear" })
    }

    fn as_slice(&self) -> &[T] {
        FixedArray::as_slice(self)
    }

    fn release(&mut self) {
        FixedArray::release(self);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zeroed_initializes_every_slot() {
        let arr = FixedArray::<u64>::zeroed(100).unwrap();
        assert_eq!(arr.len(), 100);
        assert!(arr.as_slice().iter().all(|&v| v == 0));
    }

    #[test]
    fn filled_writes_every_slot() {
        let arr = FixedArray::filled(0xAB_u8, 17).unwrap();
        assert!(arr.as_slice().iter().all(|&v| v == 0xAB));
    }

    #[test]
    fn from_slice_copies_elements() {
        let arr = FixedArray::from_slice(&[1u32, 2, 3]);
        assert_eq!(arr.as_slice(), &[1, 2, 3]);
    }

    #[test]
    fn get_and_set_round_trip() {
        let mut arr = FixedArray::<i32>::zeroed(4).unwrap();
        arr.set(2, -7).unwrap();
        assert_eq!(arr.get(2).unwrap(), -7);
    }

    #[test]
    fn get_at_len_is_out_of_bounds() {
        let arr = FixedArray::<u8>::zeroed(3).unwrap();
        assert_eq!(
            arr.get(3),
            Err(StoreError::IndexOutOfBounds { index: 3, len: 3 })
        );
    }

    #[test]
    fn set_at_len_is_out_of_bounds() {
        let mut arr = FixedArray::<u8>::zeroed(3).unwrap();
        assert_eq!(
            arr.set(3, 1),
            Err(StoreError::IndexOutOfBounds { index: 3, len: 3 })
        );
    }

    #[test]
    fn index_of_finds_first_match() {
        let arr = FixedArray::from_slice(&[5u32, 9, 5]);
        assert_eq!(arr.index_of(&5).unwrap(), Some(0));
        assert_eq!(arr.index_of(&9).unwrap(), Some(1));
        assert_eq!(arr.index_of(&1).unwrap(), None);
        assert!(arr.contains(&9).unwrap());
    }

    #[test]
    fn copy_to_rejects_short_destination() {
        let arr = FixedArray::from_slice(&[1u8, 2, 3, 4]);
        let mut dst = [0u8; 5];
        assert_eq!(
            arr.copy_to(&mut dst, 2),
            Err(StoreError::DestinationTooSmall {
                required: 4,
                available: 3
            })
        );
        arr.copy_to(&mut dst, 1).unwrap();
        assert_eq!(dst, [0, 1, 2, 3, 4]);
    }

    #[test]
    fn copy_from_slice_at_rejects_overflow_of_fixed_length() {
        let mut arr = FixedArray::<u8>::zeroed(4).unwrap();
        assert_eq!(
            arr.copy_from_slice_at(&[1, 2, 3], 2),
            Err(StoreError::DestinationTooSmall {
                required: 3,
                available: 2
            })
        );
        arr.copy_from_slice_at(&[1, 2], 2).unwrap();
        assert_eq!(arr.as_slice(), &[0, 0, 1, 2]);
    }

    #[test]
    fn copy_from_array_respects_count() {
        let src = FixedArray::from_slice(&[7u16, 8, 9]);
        let mut dst = FixedArray::<u16>::zeroed(3).unwrap();
        dst.copy_from(&src, 1, 2).unwrap();
        assert_eq!(dst.as_slice(), &[0, 7, 8]);
        assert!(matches!(
            dst.copy_from(&src, 0, 4),
            Err(StoreError::RangeOutOfBounds { .. })
        ));
    }

    #[test]
    fn slice_at_is_bounds_checked() {
        let arr = FixedArray::from_slice(&[1u32, 2, 3, 4, 5]);
        assert_eq!(arr.slice_at(1, 3).unwrap(), &[2, 3, 4]);
        assert!(matches!(
            arr.slice_at(3, 3),
            Err(StoreError::RangeOutOfBounds { .. })
        ));
    }

    #[test]
    fn release_is_idempotent_and_degrades_views() {
        let mut arr = FixedArray::from_slice(&[1u8, 2, 3]);
        arr.release();
        arr.release();
        assert_eq!(arr.len(), 0);
        assert!(arr.as_slice().is_empty());
        assert_eq!(arr.iter().count(), 0);
    }

    #[test]
    fn fallible_access_after_release_errors_uniformly() {
        let mut arr = FixedArray::from_slice(&[1u8, 2, 3]);
        arr.release();
        assert_eq!(arr.get(0), Err(StoreError::Released));
        assert_eq!(arr.set(0, 9), Err(StoreError::Released));
        assert_eq!(arr.index_of(&1), Err(StoreError::Released));
        assert_eq!(arr.slice_at(0, 0), Err(StoreError::Released));
        let mut dst = [0u8; 4];
        assert_eq!(arr.copy_to(&mut dst, 0), Err(StoreError::Released));
        assert_eq!(arr.copy_from_slice_at(&[1], 0), Err(StoreError::Released));
    }

    #[test]
    fn empty_array_survives_repeated_release() {
        let mut arr = FixedArray::<u32>::empty();
        assert_eq!(arr.len(), 0);
        arr.release();
        arr.release();
        assert!(arr.as_slice().is_empty());
    }

    #[test]
    fn structural_mutation_is_rejected_through_store() {
        let mut arr: FixedArray<u32> = FixedArray::from_slice(&[1, 2]);
        let store: &mut dyn Store<u32> = &mut arr;
        assert_eq!(
            store.push(3),
            Err(StoreError::FixedLength { op: "push" })
        );
        assert_eq!(
            store.insert(0, 3),
            Err(StoreError::FixedLength { op: "insert" })
        );
        assert_eq!(
            store.remove_at(0),
            Err(StoreError::FixedLength { op: "remove_at" })
        );
        assert_eq!(
            store.clear(),
            Err(StoreError::FixedLength { op: "clear" })
        );
        // Non-structural access still works through the trait.
        assert_eq!(store.get(1).unwrap(), 2);
    }

    #[test]
    fn from_flat_value_reads_packed_record_fields() {
        #[derive(Clone, Copy, bytemuck::Pod, bytemuck::Zeroable)]
        #[repr(C)]
        struct Record {
            a: u32,
            b: u32,
            c: u32,
        }
        let rec = Record { a: 10, b: 5, c: 90 };
        let arr: FixedArray<u32> = FixedArray::from_flat_value(&rec);
        assert_eq!(arr.len(), 3);
        assert_eq!(arr.get(0).unwrap(), 10);
        assert_eq!(arr.get(1).unwrap(), 5);
        assert_eq!(arr.get(2).unwrap(), 90);
    }

    #[test]
    fn from_flat_value_rounds_up_and_zero_fills_the_tail() {
        // 6 bytes of value into u32 elements: 2 elements, last half zero.
        #[derive(Clone, Copy, bytemuck::Pod, bytemuck::Zeroable)]
        #[repr(C)]
        struct Six {
            a: u16,
            b: u16,
            c: u16,
        }
        let six = Six {
            a: 0x1111,
            b: 0x2222,
            c: 0x3333,
        };
        let arr: FixedArray<u32> = FixedArray::from_flat_value(&six);
        assert_eq!(arr.len(), 2);
        // The first six bytes are the value; the two bytes past it are zero.
        let bytes = bytemuck::cast_slice::<u32, u8>(arr.as_slice());
        assert_eq!(&bytes[..6], bytemuck::bytes_of(&six));
        assert_eq!(&bytes[6..8], &[0, 0]);
    }

    #[test]
    fn equality_is_element_wise() {
        let a = FixedArray::from_slice(&[1u8, 2, 3]);
        let b = FixedArray::from_slice(&[1u8, 2, 3]);
        let c = FixedArray::from_slice(&[1u8, 2]);
        assert_eq!(a, b);
        assert_ne!(a, c);
    }
}
