//! The growable container.
//!
//! A [`GrowList`] owns one raw block whose capacity may exceed its logical
//! length. Capacity grows by doubling (with checked arithmetic) and never
//! shrinks implicitly; removal and [`GrowList::clear`] only move the logical
//! length. The list can hand its block to a new
//! [`FixedArray`](crate::FixedArray) without copying via
//! [`GrowList::transfer`].
//!
//! # Self-sourced insertion
//!
//! Inserting a range of the list into itself is the one place where a copy
//! source can alias the destination storage. An external `&[T]` argument to
//! a `&mut self` method can never alias the buffer (the exclusive borrow
//! forbids it), so the aliasing protocol lives entirely in
//! [`GrowList::insert_from_within`] and [`GrowList::extend_from_within`],
//! which take the source as a range of indices — the same shape as
//! `Vec::extend_from_within`.

use std::fmt;
use std::ops::Range;

use smallvec::SmallVec;
use talus_core::{Flat, Store, StoreError};

use crate::array::FixedArray;
use crate::raw::RawBlock;

/// Capacity a zero-capacity list jumps to on its first growth, so the
/// first few pushes avoid repeated reallocation.
pub const DEFAULT_CAPACITY: usize = 4;

/// Inline slots of the staging buffer used by [`GrowList::insert_exact`].
const STAGE_INLINE: usize = 16;

/// A growable container of flat values in manually-managed memory.
///
/// Single-writer by design: there is no internal synchronization (see
/// [`LockedList`](crate::LockedList) for the serialized variant). Borrowed
/// slices and references are valid only until the next mutating call, a
/// contract the borrow checker enforces statically.
///
/// [`release`](GrowList::release) is idempotent and resets the list to the
/// no-allocation state; a released list is indistinguishable from
/// [`GrowList::new`] and may be reused.
pub struct GrowList<T: Flat> {
    /// Backing block; `capacity >= len` always, sentinel when capacity 0.
    buf: RawBlock<T>,
    /// Logical element count.
    len: usize,
}

impl<T: Flat> GrowList<T> {
    /// Create an empty list without allocating.
    pub const fn new() -> Self {
        Self {
            buf: RawBlock::sentinel(),
            len: 0,
        }
    }

    /// Create an empty list with exactly `capacity` slots pre-allocated.
    ///
    /// `capacity == 0` does not allocate.
    pub fn with_capacity(capacity: usize) -> Result<Self, StoreError> {
        Ok(Self {
            buf: RawBlock::alloc(capacity)?,
            len: 0,
        })
    }

    /// Create a list holding a copy of `src`, with `capacity == len`.
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
        }
    }

    /// Logical element count.
    pub fn len(&self) -> usize {
        self.len
    }

    /// Whether the list holds no elements.
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Physical slots currently allocated. Always `>= len`.
    pub fn capacity(&self) -> usize {
        self.buf.capacity()
    }

    /// Bytes of backing storage currently allocated.
    pub fn memory_bytes(&self) -> usize {
        self.buf.capacity() * std::mem::size_of::<T>()
    }

    /// Read the element at `index`. Bounds-checked against `len`, not
    /// capacity.
    pub fn get(&self, index: usize) -> Result<T, StoreError> {
        if index >= self.len {
            return Err(StoreError::IndexOutOfBounds {
                index,
                len: self.len,
            });
        }
        // SAFETY: index < len <= capacity and slots below len are
        // initialized.
        Ok(unsafe { self.buf.read(index) })
    }

    /// Overwrite the element at `index`.
    pub fn set(&mut self, index: usize, value: T) -> Result<(), StoreError> {
        if index >= self.len {
            return Err(StoreError::IndexOutOfBounds {
                index,
                len: self.len,
            });
        }
        // SAFETY: index < len <= capacity.
        unsafe { self.buf.write(index, value) };
        Ok(())
    }

    /// Borrow the element at `index`.
    pub fn get_ref(&self, index: usize) -> Result<&T, StoreError> {
        if index >= self.len {
            return Err(StoreError::IndexOutOfBounds {
                index,
                len: self.len,
            });
        }
        Ok(&self.as_slice()[index])
    }

    /// Mutably borrow the element at `index`.
    pub fn get_mut(&mut self, index: usize) -> Result<&mut T, StoreError> {
        if index >= self.len {
            return Err(StoreError::IndexOutOfBounds {
                index,
                len: self.len,
            });
        }
        Ok(&mut self.as_mut_slice()[index])
    }

    /// Compute the post-growth capacity for a required minimum.
    ///
    /// Starts from the current capacity (or [`DEFAULT_CAPACITY`] when the
    /// list has never allocated) and doubles until the minimum is reached.
    /// Doubling uses checked multiplication; overflow surfaces as
    /// [`StoreError::CapacityOverflow`], never a wrap.
    fn grown_capacity(&self, min_cap: usize) -> Result<usize, StoreError> {
        let mut new_cap = if self.buf.capacity() == 0 {
            DEFAULT_CAPACITY
        } else {
            self.buf.capacity()
        };
        while new_cap < min_cap {
            new_cap = new_cap
                .checked_mul(2)
                .ok_or(StoreError::CapacityOverflow { requested: min_cap })?;
        }
        Ok(new_cap)
    }

    /// Reallocate to the doubled capacity, copying the `len` live elements.
    ///
    /// The old block is freed only after the copy completes, so a failed
    /// allocation leaves the list untouched.
    fn grow_to(&mut self, min_cap: usize) -> Result<(), StoreError> {
        let new_cap = self.grown_capacity(min_cap)?;
        let mut new_buf = RawBlock::alloc(new_cap)?;
        if self.len > 0 {
            // SAFETY: new_cap >= min_cap > len; the source range [0, len)
            // is initialized and the blocks are distinct allocations.
            unsafe { new_buf.copy_from_block(&self.buf, 0, 0, self.len) };
        }
        let mut old = std::mem::replace(&mut self.buf, new_buf);
        old.free();
        Ok(())
    }

    /// Grow-if-needed so at least `additional` more elements fit.
    ///
    /// Uses the doubling growth algorithm, so repeated reserves stay
    /// amortized; use [`GrowList::set_capacity`] for an exact size.
    pub fn reserve(&mut self, additional: usize) -> Result<(), StoreError> {
        let needed = self
            .len
            .checked_add(additional)
            .ok_or(StoreError::CapacityOverflow {
                requested: usize::MAX,
            })?;
        if needed > self.buf.capacity() {
            self.grow_to(needed)?;
        }
        Ok(())
    }

    /// Append `value`. Amortized O(1).
    pub fn push(&mut self, value: T) -> Result<(), StoreError> {
        if self.len == self.buf.capacity() {
            let min_cap = self
                .len
                .checked_add(1)
                .ok_or(StoreError::CapacityOverflow {
                    requested: usize::MAX,
                })?;
            self.grow_to(min_cap)?;
        }
        // SAFETY: len < capacity after growth.
        unsafe { self.buf.write(self.len, value) };
        self.len += 1;
        Ok(())
    }

    /// Insert `value` at `index`, shifting `[index, len)` one slot right.
    ///
    /// `index == len` appends.
    pub fn insert(&mut self, index: usize, value: T) -> Result<(), StoreError> {
        if index > self.len {
            return Err(StoreError::IndexOutOfBounds {
                index,
                len: self.len,
            });
        }
        let new_len = self
            .len
            .checked_add(1)
            .ok_or(StoreError::CapacityOverflow {
                requested: usize::MAX,
            })?;
        if new_len > self.buf.capacity() {
            self.grow_to(new_len)?;
        }
        // SAFETY: new_len <= capacity; the shift is a single overlap-safe
        // copy whose destination is one past its source.
        unsafe {
            self.buf.copy_within(index, index + 1, self.len - index);
            self.buf.write(index, value);
        }
        self.len = new_len;
        Ok(())
    }

    /// Insert all of `src` at `index`, shifting the tail right.
    ///
    /// The exclusive `&mut self` borrow guarantees `src` does not alias
    /// this list's storage; use [`GrowList::insert_from_within`] to insert
    /// a range of the list into itself.
    pub fn insert_slice(&mut self, index: usize, src: &[T]) -> Result<(), StoreError> {
        if index > self.len {
            return Err(StoreError::IndexOutOfBounds {
                index,
                len: self.len,
            });
        }
        let k = src.len();
        if k == 0 {
            return Ok(());
        }
        let new_len = self
            .len
            .checked_add(k)
            .ok_or(StoreError::CapacityOverflow {
                requested: usize::MAX,
            })?;
        if new_len > self.buf.capacity() {
            // Grow and place in one pass: head, source, tail each copied
            // once into the new block; the old block is freed last.
            let new_cap = self.grown_capacity(new_len)?;
            let mut new_buf = RawBlock::alloc(new_cap)?;
            // SAFETY: new_cap >= new_len bounds every destination range;
            // [0, len) of the old block is initialized; `src` cannot alias
            // either block (exclusive borrow, fresh allocation).
            unsafe {
                new_buf.copy_from_block(&self.buf, 0, 0, index);
                new_buf.copy_from_slice_at(src, index);
                new_buf.copy_from_block(&self.buf, index, index + k, self.len - index);
            }
            let mut old = std::mem::replace(&mut self.buf, new_buf);
            old.free();
        } else {
            // SAFETY: new_len <= capacity; the shift is overlap-safe and
            // `src` cannot alias the block (exclusive borrow).
            unsafe {
                self.buf.copy_within(index, index + k, self.len - index);
                self.buf.copy_from_slice_at(src, index);
            }
        }
        self.len = new_len;
        Ok(())
    }

    /// Append all of `src`.
    pub fn extend_slice(&mut self, src: &[T]) -> Result<(), StoreError> {
        self.insert_slice(self.len, src)
    }

    /// Insert a copy of the list's own `src` range at `index`.
    ///
    /// The result is element-wise identical to materializing an independent
    /// copy of `self[src]` first and inserting that copy — aliasing between
    /// the source range and the shifted storage is never observable.
    ///
    /// Two regimes:
    ///
    /// - **Growth required.** The new block is allocated while the old one
    ///   is still live; head `[0, index)` and tail `[index, len)` are copied
    ///   across first, then the source range is copied out of the *new*
    ///   block (a pre-insertion position `p` lands at `p`, a post-insertion
    ///   position at `p + k`), and only then is the old block freed.
    /// - **In place.** One overlap-safe copy shifts the tail right by `k`,
    ///   which leaves `[index, index + k)` untouched. The source is then
    ///   filled in with up to two disjoint copies, split at the insertion
    ///   point: the part of the range below `index` still sits at its
    ///   original offset, the part at or above it has moved right by `k`.
    ///   A range entirely on one side of the insertion point degenerates to
    ///   a single copy; a straddling range takes both.
    pub fn insert_from_within(
        &mut self,
        index: usize,
        src: Range<usize>,
    ) -> Result<(), StoreError> {
        if index > self.len {
            return Err(StoreError::IndexOutOfBounds {
                index,
                len: self.len,
            });
        }
        if src.start > src.end || src.end > self.len {
            return Err(StoreError::RangeOutOfBounds {
                start: src.start,
                end: src.end,
                len: self.len,
            });
        }
        let k = src.end - src.start;
        if k == 0 {
            return Ok(());
        }
        let new_len = self
            .len
            .checked_add(k)
            .ok_or(StoreError::CapacityOverflow {
                requested: usize::MAX,
            })?;
        // Source positions below the insertion point keep their offset;
        // positions at or above it are shifted right by k.
        let split = src.start.max(index).min(src.end);
        let head = split - src.start;
        if new_len > self.buf.capacity() {
            let new_cap = self.grown_capacity(new_len)?;
            let mut new_buf = RawBlock::alloc(new_cap)?;
            // SAFETY: new_cap >= new_len bounds every destination range;
            // the old block's [0, len) is initialized and stays live until
            // after the source copies; within the new block the source
            // ranges [src.start, split) and [split + k, src.end + k) are
            // disjoint from the destination [index, index + k).
            unsafe {
                new_buf.copy_from_block(&self.buf, 0, 0, index);
                new_buf.copy_from_block(&self.buf, index, index + k, self.len - index);
                if head > 0 {
                    new_buf.copy_within(src.start, index, head);
                }
                if k > head {
                    new_buf.copy_within(split + k, index + head, k - head);
                }
            }
            let mut old = std::mem::replace(&mut self.buf, new_buf);
            old.free();
        } else {
            // SAFETY: new_len <= capacity; the shift's destination starts
            // at index + k, leaving [index, index + k) with its old
            // content; both source copies then read from regions the shift
            // did not overwrite and write into [index, index + k) only.
            unsafe {
                self.buf.copy_within(index, index + k, self.len - index);
                if head > 0 {
                    self.buf.copy_within(src.start, index, head);
                }
                if k > head {
                    self.buf.copy_within(split + k, index + head, k - head);
                }
            }
        }
        self.len = new_len;
        Ok(())
    }

    /// Append a copy of the list's own `src` range.
    pub fn extend_from_within(&mut self, src: Range<usize>) -> Result<(), StoreError> {
        self.insert_from_within(self.len, src)
    }

    /// Insert every element of an opaque iterable at `index`.
    ///
    /// This is the slow path for sources with unknown length and no random
    /// access: repeated single-element insertion at an advancing index,
    /// O(len · k). Finite random-access sources should go through
    /// [`GrowList::insert_slice`] or [`GrowList::insert_exact`] instead.
    pub fn insert_iter<I>(&mut self, mut index: usize, iter: I) -> Result<(), StoreError>
    where
        I: IntoIterator<Item = T>,
    {
        if index > self.len {
            return Err(StoreError::IndexOutOfBounds {
                index,
                len: self.len,
            });
        }
        for value in iter {
            self.insert(index, value)?;
            index += 1;
        }
        Ok(())
    }

    /// Insert every element of an exactly-sized iterator at `index`.
    ///
    /// Stages the elements into a small scratch buffer, then takes the
    /// single-shift slice path — one tail move instead of one per element.
    pub fn insert_exact<I>(&mut self, index: usize, iter: I) -> Result<(), StoreError>
    where
        I: IntoIterator<Item = T>,
        I::IntoIter: ExactSizeIterator,
    {
        let staged: SmallVec<[T; STAGE_INLINE]> = iter.into_iter().collect();
        self.insert_slice(index, &staged)
    }

    /// Remove and return the element at `index`, shifting the tail left.
    ///
    /// Capacity is untouched.
    pub fn remove_at(&mut self, index: usize) -> Result<T, StoreError> {
        if index >= self.len {
            return Err(StoreError::IndexOutOfBounds {
                index,
                len: self.len,
            });
        }
        // SAFETY: index < len <= capacity; the left shift is overlap-safe
        // and reads only initialized slots.
        let value = unsafe { self.buf.read(index) };
        unsafe {
            self.buf.copy_within(index + 1, index, self.len - index - 1);
        }
        self.len -= 1;
        Ok(value)
    }

    /// Remove the first element equal to `value`.
    ///
    /// Returns `false` with no mutation when no element matches.
    pub fn remove(&mut self, value: &T) -> bool
    where
        T: PartialEq,
    {
        match self.index_of(value) {
            Some(index) => {
                // Index came from a scan of the live region just above.
                self.remove_at(index)
                    .expect("index from index_of is within bounds");
                true
            }
            None => false,
        }
    }

    /// Index of the first element equal to `value`, scanning from 0.
    pub fn index_of(&self, value: &T) -> Option<usize>
    where
        T: PartialEq,
    {
        self.as_slice().iter().position(|v| v == value)
    }

    /// Whether any element equals `value`.
    pub fn contains(&self, value: &T) -> bool
    where
        T: PartialEq,
    {
        self.index_of(value).is_some()
    }

    /// Set the logical length to 0 without releasing or shrinking.
    pub fn clear(&mut self) {
        self.len = 0;
    }

    /// Reallocate to exactly `new_cap` slots, copying the live elements.
    ///
    /// `new_cap < len` is an error; `new_cap == 0` (only reachable when the
    /// list is empty) releases the block back to the no-allocation state.
    pub fn set_capacity(&mut self, new_cap: usize) -> Result<(), StoreError> {
        if new_cap < self.len {
            return Err(StoreError::CapacityBelowLength {
                requested: new_cap,
                len: self.len,
            });
        }
        if new_cap == self.buf.capacity() {
            return Ok(());
        }
        let mut new_buf = RawBlock::alloc(new_cap)?;
        if self.len > 0 {
            // SAFETY: len <= new_cap and the blocks are distinct.
            unsafe { new_buf.copy_from_block(&self.buf, 0, 0, self.len) };
        }
        let mut old = std::mem::replace(&mut self.buf, new_buf);
        old.free();
        Ok(())
    }

    /// Borrow the live elements as a contiguous slice.
    pub fn as_slice(&self) -> &[T] {
        if self.len == 0 {
            return &[];
        }
        // SAFETY: [0, len) is initialized and len <= capacity.
        unsafe { self.buf.slice(0, self.len) }
    }

    /// Borrow the live elements as a mutable slice.
    pub fn as_mut_slice(&mut self) -> &mut [T] {
        if self.len == 0 {
            return &mut [];
        }
        // SAFETY: same contract as `as_slice` under an exclusive borrow.
        unsafe { self.buf.slice_mut(0, self.len) }
    }

    /// Iterate over the elements in index order.
    ///
    /// Each call yields a fresh, restartable iterator.
    pub fn iter(&self) -> std::slice::Iter<'_, T> {
        self.as_slice().iter()
    }

    /// Hand the backing block to a new [`FixedArray`] without copying.
    ///
    /// The array's fixed length is the list's logical length; slots beyond
    /// it ride along in the same allocation and are freed with it when the
    /// array is released. Afterwards this list is in the freshly-constructed
    /// empty state — length 0, capacity 0, nothing to free — and may be
    /// reused or released as usual.
    pub fn transfer(&mut self) -> FixedArray<T> {
        let len = std::mem::replace(&mut self.len, 0);
        FixedArray::from_raw(self.buf.take(), len)
    }

    /// Capacity-mode transfer: the array's fixed length is the list's full
    /// capacity.
    ///
    /// The tail `[len, capacity)` was never written by the list, so it is
    /// zero-filled before the handoff; every slot of the resulting array is
    /// a valid value.
    pub fn transfer_full(&mut self) -> FixedArray<T> {
        let cap = self.buf.capacity();
        let len = std::mem::replace(&mut self.len, 0);
        let mut block = self.buf.take();
        if cap > len {
            // SAFETY: [len, cap) is within the block, and the all-zero bit
            // pattern is valid for every Flat type.
            unsafe { block.fill_zero(len, cap - len) };
        }
        FixedArray::from_raw(block, cap)
    }

    /// Release the backing memory.
    ///
    /// Idempotent. Afterwards the list reports length 0 and capacity 0 and
    /// behaves exactly like [`GrowList::new`].
    pub fn release(&mut self) {
        self.buf.free();
        self.len = 0;
    }
}

impl<T: Flat> Drop for GrowList<T> {
    /// Last-resort cleanup through the same idempotent release path.
    fn drop(&mut self) {
        self.release();
    }
}

impl<T: Flat> Default for GrowList<T> {
    fn default() -> Self {
        Self::new()
    }
}

// SAFETY: the list exclusively owns its block; sending or sharing it moves
// or shares plain flat data with no interior mutability.
unsafe impl<T: Flat + Send> Send for GrowList<T> {}
// SAFETY: shared references only permit reads of plain flat data.
unsafe impl<T: Flat + Sync> Sync for GrowList<T> {}

impl<T: Flat + PartialEq> PartialEq for GrowList<T> {
    fn eq(&self, other: &Self) -> bool {
        self.as_slice() == other.as_slice()
    }
}

impl<T: Flat + fmt::Debug> fmt::Debug for GrowList<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.as_slice()).finish()
    }
}

impl<'a, T: Flat> IntoIterator for &'a GrowList<T> {
    type Item = &'a T;
    type IntoIter = std::slice::Iter<'a, T>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

impl<T: Flat> FromIterator<T> for GrowList<T> {
    fn from_iter<I: IntoIterator<Item = T>>(iter: I) -> Self {
        let iter = iter.into_iter();
        let (lower, _) = iter.size_hint();
        let mut list = GrowList::with_capacity(lower)
            .expect("iterator lower bound fits in a single allocation");
        for value in iter {
            list.push(value)
                .expect("element count stays within addressable capacity");
        }
        list
    }
}

impl<T: Flat> Extend<T> for GrowList<T> {
    fn extend<I: IntoIterator<Item = T>>(&mut self, iter: I) {
        for value in iter {
            self.push(value)
                .expect("element count stays within addressable capacity");
        }
    }
}

impl<T: Flat> Store<T> for GrowList<T> {
    fn len(&self) -> usize {
        GrowList::len(self)
    }

    fn get(&self, index: usize) -> Result<T, StoreError> {
        GrowList::get(self, index)
    }

    fn set(&mut self, index: usize, value: T) -> Result<(), StoreError> {
        GrowList::set(self, index, value)
    }

    fn push(&mut self, value: T) -> Result<(), StoreError> {
        GrowList::push(self, value)
    }

    fn insert(&mut self, index: usize, value: T) -> Result<(), StoreError> {
        GrowList::insert(self, index, value)
    }

    fn remove_at(&mut self, index: usize) -> Result<T, StoreError> {
        GrowList::remove_at(self, index)
    }

    fn remove(&mut self, value: &T) -> Result<bool, StoreError>
    where
        T: PartialEq,
    {
        Ok(GrowList::remove(self, value))
    }

    fn index_of(&self, value: &T) -> Result<Option<usize>, StoreError>
    where
        T: PartialEq,
    {
        Ok(GrowList::index_of(self, value))
    }

    fn clear(&mut self) -> Result<(), StoreError> {
        GrowList::clear(self);
        Ok(())
    }

    fn as_slice(&self) -> &[T] {
        GrowList::as_slice(self)
    }

    fn release(&mut self) {
        GrowList::release(self);
    }
}
