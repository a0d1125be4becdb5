//! Positional mutation of a `Sequence`: appending, inserting and erasing single values.

use crate::sequence::unwrap_infallible;
use crate::transfer::{InitGuard, TransferPolicy};
use crate::{ConstructError, RawStorage, Sequence, StorageError};
use std::convert::Infallible;
use std::ptr;

impl<T, P: TransferPolicy<T>> Sequence<T, P> {
    /// Constructs the value made by `make` at `index`, shifting later values right.
    ///
    /// When the sequence is full, `make` runs against a freshly allocated block and the
    /// existing values are transferred around the new one afterwards, so a failing `make`
    /// or transfer leaves the sequence unchanged.
    pub fn try_emplace_with<E, F>(&mut self, index: usize, make: F) -> Result<&mut T, ConstructError<E>>
        where F: FnOnce() -> Result<T, E>
    {
        assert!(index <= self.len, "insertion index {} is out of bounds for length {}", index, self.len);

        if self.len == self.capacity() {
            let new_storage = RawStorage::<T>::allocate(self.grown_capacity()?)?;
            let value = make().map_err(ConstructError::Element)?;
            unsafe {
                let src = self.storage.as_ptr();
                let dst = new_storage.as_ptr();
                dst.add(index).write(value);

                let mut built = InitGuard::new(dst.add(index), 1);
                P::transfer(src, dst, index);
                built.start = dst;
                built.len = index + 1;
                P::transfer(src.add(index), dst.add(index + 1), self.len - index);
                built.disarm();

                self.adopt(new_storage, self.len + 1, "insert");
            }
        } else {
            let value = make().map_err(ConstructError::Element)?;
            unsafe {
                let slot = self.storage.address(index);
                if index < self.len {
                    ptr::copy(slot, slot.add(1), self.len - index);
                }
                slot.write(value);
            }
            self.len += 1;
        }

        Ok(unsafe { &mut *self.storage.address(index) })
    }

    pub fn emplace_with<F: FnOnce() -> T>(&mut self, index: usize, make: F) -> &mut T {
        unwrap_infallible(self.try_emplace_with(index, || Ok::<T, Infallible>(make())))
    }

    /// Inserts `value` before position `index`, which may be `len()`.
    pub fn insert(&mut self, index: usize, value: T) -> &mut T {
        self.emplace_with(index, || value)
    }

    /// Like `insert`, but reports allocation failure instead of aborting. `value` is dropped
    /// on failure.
    pub fn try_insert(&mut self, index: usize, value: T) -> Result<&mut T, StorageError> {
        match self.try_emplace_with(index, || Ok::<T, Infallible>(value)) {
            Ok(slot) => Ok(slot),
            Err(ConstructError::Storage(e)) => Err(e),
            Err(ConstructError::Element(never)) => match never {},
        }
    }

    pub fn try_emplace_back_with<E, F>(&mut self, make: F) -> Result<&mut T, ConstructError<E>>
        where F: FnOnce() -> Result<T, E>
    {
        let end = self.len;
        self.try_emplace_with(end, make)
    }

    pub fn emplace_back_with<F: FnOnce() -> T>(&mut self, make: F) -> &mut T {
        let end = self.len;
        self.emplace_with(end, make)
    }

    /// Appends `value` and returns a reference to it in its final place.
    pub fn push_back(&mut self, value: T) -> &mut T {
        self.emplace_back_with(|| value)
    }

    pub fn try_push_back(&mut self, value: T) -> Result<&mut T, StorageError> {
        let end = self.len;
        self.try_insert(end, value)
    }
}

impl<T, P> Sequence<T, P> {
    /// Drops the last value. Panics when the sequence is empty.
    pub fn pop_back(&mut self) {
        assert!(self.len > 0, "pop_back on an empty sequence");
        self.len -= 1;
        unsafe { ptr::drop_in_place(self.storage.address(self.len)) };
    }

    /// Removes the value at `index`, shifting later values left, and returns the position of
    /// the value that now occupies `index` (equal to `len()` if the last value was erased).
    ///
    /// Values are moved bitwise, so only the erased value's destructor can fail. If it
    /// panics the sequence already has its new length and the remaining values in order.
    pub fn erase(&mut self, index: usize) -> usize {
        assert!(index < self.len, "erase index {} is out of bounds for length {}", index, self.len);
        unsafe {
            let slot = self.storage.address(index);
            let erased = ptr::read(slot);
            ptr::copy(slot.add(1), slot, self.len - index - 1);
            self.len -= 1;
            std::mem::drop(erased);
        }
        index
    }

    /// Drops every value past `new_len`. Capacity is unchanged.
    pub fn truncate(&mut self, new_len: usize) {
        if new_len >= self.len {
            return;
        }
        let tail = ptr::slice_from_raw_parts_mut(self.storage.address(new_len), self.len - new_len);
        // shorten first so a panicking destructor can not cause a second drop
        self.len = new_len;
        unsafe { ptr::drop_in_place(tail) };
    }

    pub fn clear(&mut self) {
        self.truncate(0)
    }
}
