//! Unchecked raw memory blocks.
//!
//! [`RawBlock`] is the storage primitive beneath both containers: a raw
//! pointer plus an element capacity, with no bounds checking, no ownership
//! tracking, and no zero-initialization guarantee. Every `unsafe` operation
//! in the workspace either lives here or leans on the invariants this
//! module states. Each one carries a `// SAFETY:` comment.
//!
//! Invariant: `ptr` is the dangling sentinel if and only if `cap == 0`. A
//! non-sentinel pointer always refers to `cap * size_of::<T>()` bytes of
//! exclusively-owned memory obtained from the global allocator.
//!
//! A `RawBlock` has **no `Drop` impl** and is never implicitly copied. The
//! owning container frees it exactly once; [`RawBlock::take`] is the
//! move-out primitive behind ownership transfer.

use std::alloc::{self, Layout};
use std::ptr::{self, NonNull};

use talus_core::{Flat, StoreError};

/// An unchecked block of raw element storage.
pub(crate) struct RawBlock<T: Flat> {
    /// Start of the allocation, or `NonNull::dangling()` when `cap == 0`.
    ptr: NonNull<T>,
    /// Number of element slots the block can hold.
    cap: usize,
}

impl<T: Flat> RawBlock<T> {
    /// Elements must occupy at least one byte; evaluated at
    /// monomorphization when the allocation path is instantiated.
    const ELEMENT_IS_SIZED: () = assert!(
        std::mem::size_of::<T>() > 0,
        "zero-sized types are not supported as container elements"
    );

    /// The empty block: dangling pointer, capacity 0. Freeing it is a no-op.
    pub(crate) const fn sentinel() -> Self {
        Self {
            ptr: NonNull::dangling(),
            cap: 0,
        }
    }

    /// Allocate a block for `n` elements without initializing the contents.
    ///
    /// `n == 0` returns the sentinel without calling the allocator. The
    /// returned memory is NOT zeroed; callers must fully overwrite every
    /// slot they expose.
    pub(crate) fn alloc(n: usize) -> Result<Self, StoreError> {
        let () = Self::ELEMENT_IS_SIZED;
        if n == 0 {
            return Ok(Self::sentinel());
        }
        let layout =
            Layout::array::<T>(n).map_err(|_| StoreError::CapacityOverflow { requested: n })?;
        // SAFETY: n > 0 and T is not zero-sized, so the layout has
        // non-zero size.
        let raw = unsafe { alloc::alloc(layout) };
        let Some(ptr) = NonNull::new(raw.cast::<T>()) else {
            alloc::handle_alloc_error(layout);
        };
        Ok(Self { ptr, cap: n })
    }

    /// Allocate a zero-initialized block for `n` elements.
    ///
    /// The all-zero bit pattern is a valid value for every `Flat` type, so
    /// the returned block is fully initialized.
    pub(crate) fn alloc_zeroed(n: usize) -> Result<Self, StoreError> {
        let () = Self::ELEMENT_IS_SIZED;
        if n == 0 {
            return Ok(Self::sentinel());
        }
        let layout =
            Layout::array::<T>(n).map_err(|_| StoreError::CapacityOverflow { requested: n })?;
        // SAFETY: n > 0 and T is not zero-sized, so the layout has
        // non-zero size.
        let raw = unsafe { alloc::alloc_zeroed(layout) };
        let Some(ptr) = NonNull::new(raw.cast::<T>()) else {
            alloc::handle_alloc_error(layout);
        };
        Ok(Self { ptr, cap: n })
    }

    /// Release the block's memory and reset to the sentinel.
    ///
    /// The sentinel case is a no-op, and the reset is what makes the owning
    /// containers' `release` idempotent.
    pub(crate) fn free(&mut self) {
        if self.cap == 0 {
            return;
        }
        let layout = Layout::array::<T>(self.cap)
            .expect("layout was validated when the block was allocated");
        // SAFETY: cap != 0, so ptr came from the global allocator with this
        // exact layout and has not been freed since (free resets cap to 0).
        unsafe { alloc::dealloc(self.ptr.as_ptr().cast::<u8>(), layout) };
        *self = Self::sentinel();
    }

    /// Move the block out, leaving the sentinel behind.
    ///
    /// This is the ownership-transfer primitive: the caller becomes the
    /// block's sole owner, and `self` no longer owns any memory.
    pub(crate) fn take(&mut self) -> Self {
        std::mem::replace(self, Self::sentinel())
    }

    /// Number of element slots the block can hold.
    pub(crate) fn capacity(&self) -> usize {
        self.cap
    }

    /// Borrow `count` elements starting at `offset` as a slice.
    ///
    /// # Safety
    ///
    /// `offset + count <= cap` must hold and every slot in the range must
    /// have been initialized. No bounds checking is performed.
    pub(crate) unsafe fn slice(&self, offset: usize, count: usize) -> &[T] {
        std::slice::from_raw_parts(self.ptr.as_ptr().add(offset), count)
    }

    /// Borrow `count` elements starting at `offset` as a mutable slice.
    ///
    /// # Safety
    ///
    /// Same contract as [`RawBlock::slice`].
    pub(crate) unsafe fn slice_mut(&mut self, offset: usize, count: usize) -> &mut [T] {
        std::slice::from_raw_parts_mut(self.ptr.as_ptr().add(offset), count)
    }

    /// Read the element at `index`.
    ///
    /// # Safety
    ///
    /// `index < cap` must hold and the slot must have been initialized.
    pub(crate) unsafe fn read(&self, index: usize) -> T {
        ptr::read(self.ptr.as_ptr().add(index))
    }

    /// Write `value` into the slot at `index`.
    ///
    /// # Safety
    ///
    /// `index < cap` must hold.
    pub(crate) unsafe fn write(&mut self, index: usize, value: T) {
        ptr::write(self.ptr.as_ptr().add(index), value);
    }

    /// Copy `count` elements from `src` to `dst` within this block.
    ///
    /// Uses `ptr::copy`, so the two ranges may overlap in either direction.
    ///
    /// # Safety
    ///
    /// `src + count <= cap` and `dst + count <= cap` must hold, and the
    /// source range must be initialized.
    pub(crate) unsafe fn copy_within(&mut self, src: usize, dst: usize, count: usize) {
        let base = self.ptr.as_ptr();
        ptr::copy(base.add(src), base.add(dst), count);
    }

    /// Copy a slice into this block starting at `offset`.
    ///
    /// # Safety
    ///
    /// `offset + src.len() <= cap` must hold, and `src` must not alias this
    /// block (the copy is non-overlapping).
    pub(crate) unsafe fn copy_from_slice_at(&mut self, src: &[T], offset: usize) {
        ptr::copy_nonoverlapping(src.as_ptr(), self.ptr.as_ptr().add(offset), src.len());
    }

    /// Copy `count` elements from another block into this one.
    ///
    /// # Safety
    ///
    /// `src_offset + count <= src.cap`, `dst_offset + count <= cap`, the
    /// source range must be initialized, and the two blocks must be
    /// distinct allocations.
    pub(crate) unsafe fn copy_from_block(
        &mut self,
        src: &RawBlock<T>,
        src_offset: usize,
        dst_offset: usize,
        count: usize,
    ) {
        ptr::copy_nonoverlapping(
            src.ptr.as_ptr().add(src_offset),
            self.ptr.as_ptr().add(dst_offset),
            count,
        );
    }

    /// Zero `count` element slots starting at `offset`.
    ///
    /// # Safety
    ///
    /// `offset + count <= cap` must hold.
    pub(crate) unsafe fn fill_zero(&mut self, offset: usize, count: usize) {
        ptr::write_bytes(self.ptr.as_ptr().add(offset), 0, count);
    }
}
