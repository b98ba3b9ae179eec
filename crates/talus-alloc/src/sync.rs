//! The fully-serialized list variant.
//!
//! The containers in this crate carry no internal synchronization: they
//! assume a single writer, or external locking around every mutating call.
//! [`LockedList`] is the opt-in alternative — one mutex per list, taken by
//! every accessor and mutator including element reads, so the cost model is
//! fully serialized rather than lock-free. There is no silent mixing of the
//! two modes: a list is either a plain [`GrowList`] or permanently inside a
//! `LockedList`.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use talus_core::{Flat, StoreError};

use crate::array::FixedArray;
use crate::list::GrowList;

/// A [`GrowList`] behind a single mutex.
///
/// Every operation acquires the lock for its full duration. Borrowed views
/// are deliberately not exposed — a caller that needs a stable snapshot
/// takes a copying [`LockedList::snapshot`] or a consuming
/// [`LockedList::transfer`] instead, so no reference can outlive the lock.
pub struct LockedList<T: Flat> {
    inner: Mutex<GrowList<T>>,
}

/// Shared handle for cross-thread use of one serialized list.
pub type SharedList<T> = Arc<LockedList<T>>;

impl<T: Flat> LockedList<T> {
    /// Create an empty serialized list without allocating.
    pub fn new() -> Self {
        Self {
            inner: Mutex::new(GrowList::new()),
        }
    }

    /// Create a serialized list with `capacity` slots pre-allocated.
    pub fn with_capacity(capacity: usize) -> Result<Self, StoreError> {
        Ok(Self {
            inner: Mutex::new(GrowList::with_capacity(capacity)?),
        })
    }

    /// Wrap an existing list.
    pub fn from_list(list: GrowList<T>) -> Self {
        Self {
            inner: Mutex::new(list),
        }
    }

    /// Wrap this list in an `Arc` for sharing.
    pub fn into_shared(self) -> SharedList<T> {
        Arc::new(self)
    }

    /// Take the lock, recovering from poisoning.
    ///
    /// The guarded value is plain flat data whose invariants hold between
    /// statements, so a peer that panicked while holding the lock cannot
    /// have left it torn.
    fn lock(&self) -> MutexGuard<'_, GrowList<T>> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Logical element count.
    pub fn len(&self) -> usize {
        self.lock().len()
    }

    /// Whether the list holds no elements.
    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    /// Physical slots currently allocated.
    pub fn capacity(&self) -> usize {
        self.lock().capacity()
    }

    /// Read the element at `index`.
    pub fn get(&self, index: usize) -> Result<T, StoreError> {
        self.lock().get(index)
    }

    /// Overwrite the element at `index`.
    pub fn set(&self, index: usize, value: T) -> Result<(), StoreError> {
        self.lock().set(index, value)
    }

    /// Append `value`.
    pub fn push(&self, value: T) -> Result<(), StoreError> {
        self.lock().push(value)
    }

    /// Insert `value` at `index`.
    pub fn insert(&self, index: usize, value: T) -> Result<(), StoreError> {
        self.lock().insert(index, value)
    }

    /// Insert all of `src` at `index`.
    pub fn insert_slice(&self, index: usize, src: &[T]) -> Result<(), StoreError> {
        self.lock().insert_slice(index, src)
    }

    /// Remove and return the element at `index`.
    pub fn remove_at(&self, index: usize) -> Result<T, StoreError> {
        self.lock().remove_at(index)
    }

    /// Remove the first element equal to `value`.
    pub fn remove(&self, value: &T) -> bool
    where
        T: PartialEq,
    {
        self.lock().remove(value)
    }

    /// Index of the first element equal to `value`.
    pub fn index_of(&self, value: &T) -> Option<usize>
    where
        T: PartialEq,
    {
        self.lock().index_of(value)
    }

    /// Drop all elements, keeping capacity.
    pub fn clear(&self) {
        self.lock().clear();
    }

    /// Copy the current contents into a new fixed array.
    pub fn snapshot(&self) -> FixedArray<T> {
        FixedArray::from_slice(self.lock().as_slice())
    }

    /// Move the backing block into a new fixed array without copying,
    /// leaving this list empty (see [`GrowList::transfer`]).
    pub fn transfer(&self) -> FixedArray<T> {
        self.lock().transfer()
    }

    /// Release the backing memory. Idempotent; the list stays usable.
    pub fn release(&self) {
        self.lock().release();
    }

    /// Unwrap the serialized list back into a plain [`GrowList`].
    pub fn into_inner(self) -> GrowList<T> {
        self.inner
            .into_inner()
            .unwrap_or_else(PoisonError::into_inner)
    }
}

impl<T: Flat> Default for LockedList<T> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::thread;

    #[test]
    fn serialized_ops_behave_like_the_plain_list() {
        let list = LockedList::new();
        list.push(1u32).unwrap();
        list.push(3).unwrap();
        list.insert(1, 2).unwrap();
        assert_eq!(list.len(), 3);
        assert_eq!(list.get(1).unwrap(), 2);
        assert_eq!(list.remove_at(0).unwrap(), 1);
        assert!(list.remove(&3));
        assert_eq!(list.len(), 1);
    }

    #[test]
    fn concurrent_pushes_lose_nothing() {
        let shared = LockedList::new().into_shared();
        let mut handles = Vec::new();
        for t in 0..4u32 {
            let list = Arc::clone(&shared);
            handles.push(thread::spawn(move || {
                for i in 0..250 {
                    list.push(t * 1000 + i).unwrap();
                }
            }));
        }
        for h in handles {
            h.join().unwrap();
        }
        assert_eq!(shared.len(), 1000);
        for t in 0..4u32 {
            assert!(shared.index_of(&(t * 1000)).is_some());
        }
    }

    #[test]
    fn snapshot_copies_and_transfer_moves() {
        let list = LockedList::new();
        for v in 0..5u8 {
            list.push(v).unwrap();
        }
        let snap = list.snapshot();
        assert_eq!(snap.as_slice(), &[0, 1, 2, 3, 4]);
        assert_eq!(list.len(), 5);

        let moved = list.transfer();
        assert_eq!(moved.as_slice(), &[0, 1, 2, 3, 4]);
        assert_eq!(list.len(), 0);
        assert_eq!(list.capacity(), 0);
    }

    #[test]
    fn into_inner_returns_the_plain_list() {
        let list = LockedList::new();
        list.push(9u64).unwrap();
        let plain = list.into_inner();
        assert_eq!(plain.as_slice(), &[9]);
    }
}
