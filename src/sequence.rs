use crate::transfer::{construct_n, Relocate, TransferPolicy};
use crate::{ConstructError, RawStorage, StorageError};
use std::convert::Infallible;
use std::marker::PhantomData;
use std::ops::{Deref, DerefMut, Index, IndexMut};
use std::slice::SliceIndex;

/// Contiguous growable sequence that keeps allocation separate from construction.
///
/// Slots `[0, len)` of the owned `RawStorage` hold live values, slots `[len, capacity)`
/// are uninitialized and never exposed. Growth doubles the capacity (starting at 1) and
/// moves the elements to the new block with the transfer policy `P`.
///
/// Every operation except `erase` leaves the sequence exactly as it was when a value
/// constructor fails, whether it panics or returns an error through a `try_` method.
/// Any reallocation invalidates raw pointers previously obtained into the sequence.
pub struct Sequence<T, P = Relocate> {
    pub(crate) storage: RawStorage<T>,
    pub(crate) len: usize,
    _policy: PhantomData<fn() -> P>,
}

pub(crate) fn unwrap_infallible<R>(result: Result<R, ConstructError<Infallible>>) -> R {
    match result {
        Ok(value) => value,
        Err(ConstructError::Storage(e)) => e.fail(),
        Err(ConstructError::Element(never)) => match never {},
    }
}

impl<T> Sequence<T> {
    /// Empty sequence. Does not allocate.
    pub const fn new() -> Sequence<T> {
        Sequence::new_with_policy()
    }
}

impl<T, P> Sequence<T, P> {
    /// Empty sequence using transfer policy `P`.
    pub const fn new_with_policy() -> Sequence<T, P> {
        Sequence {
            storage: RawStorage::new(),
            len: 0,
            _policy: PhantomData,
        }
    }

    /// Empty sequence with room for exactly `capacity` values.
    pub fn with_capacity(capacity: usize) -> Sequence<T, P> {
        Sequence::from_storage(RawStorage::<T>::with_capacity(capacity))
    }

    /// `len` default values, capacity exactly `len`.
    pub fn with_len(len: usize) -> Sequence<T, P> where T: Default {
        unwrap_infallible(Sequence::try_from_fn(len, |_| Ok(T::default())))
    }

    /// `len` values produced by `make(index)`, capacity exactly `len`.
    ///
    /// Stops at the first error; values constructed before it are dropped.
    pub fn try_from_fn<E, F>(len: usize, make: F) -> Result<Sequence<T, P>, ConstructError<E>>
        where F: FnMut(usize) -> Result<T, E>
    {
        let storage = RawStorage::<T>::allocate(len)?;
        unsafe { construct_n(storage.as_ptr(), len, make) }.map_err(ConstructError::Element)?;
        let mut seq = Sequence::from_storage(storage);
        seq.len = len;
        Ok(seq)
    }

    fn from_storage(storage: RawStorage<T>) -> Sequence<T, P> {
        Sequence {
            storage,
            len: 0,
            _policy: PhantomData,
        }
    }

    #[inline(always)]
    pub fn len(&self) -> usize {
        self.len
    }

    #[inline(always)]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    #[inline(always)]
    pub fn capacity(&self) -> usize {
        self.storage.capacity()
    }

    pub fn as_slice(&self) -> &[T] {
        // [0, len) is live
        unsafe { std::slice::from_raw_parts(self.storage.as_ptr(), self.len) }
    }

    pub fn as_mut_slice(&mut self) -> &mut [T] {
        unsafe { std::slice::from_raw_parts_mut(self.storage.as_ptr(), self.len) }
    }

    /// Moves the contents out, leaving this sequence empty with no capacity.
    pub fn take(&mut self) -> Sequence<T, P> {
        std::mem::take(self)
    }

    /// Exchanges contents and storage with `other`.
    pub fn swap(&mut self, other: &mut Sequence<T, P>) {
        self.storage.swap(&mut other.storage);
        std::mem::swap(&mut self.len, &mut other.len);
    }

    /// Same elements and storage, different transfer policy.
    pub fn into_policy<Q>(mut self) -> Sequence<T, Q> {
        let storage = std::mem::take(&mut self.storage);
        let len = std::mem::replace(&mut self.len, 0);
        let mut seq = Sequence::from_storage(storage);
        seq.len = len;
        seq
    }
}

impl<T, P: TransferPolicy<T>> Sequence<T, P> {
    /// Capacity after growing a full sequence.
    pub(crate) fn grown_capacity(&self) -> Result<usize, StorageError> {
        if self.len == 0 {
            Ok(1)
        } else {
            self.len.checked_mul(2).ok_or(StorageError::CapacityOverflow)
        }
    }

    /// Makes `new_storage` the live block. Its slots must already hold the `len` elements
    /// transferred out of the current block; the current block's sources are released.
    #[cfg_attr(not(feature = "logging"), allow(unused_variables))]
    pub(crate) unsafe fn adopt(&mut self, mut new_storage: RawStorage<T>, new_len: usize, reason: &'static str) {
        debug!("{}: reallocated {} -> {} slots", reason, self.storage.capacity(), new_storage.capacity());
        self.storage.swap(&mut new_storage);
        let old_len = std::mem::replace(&mut self.len, new_len);
        // the sequence is consistent already, the old block is freed even if a drop panics
        P::release_source(new_storage.as_ptr(), old_len);
    }

    /// Grows capacity to exactly `new_capacity` unless it is already at least that.
    pub fn try_reserve(&mut self, new_capacity: usize) -> Result<(), StorageError> {
        if new_capacity <= self.capacity() {
            return Ok(());
        }
        let new_storage = RawStorage::<T>::allocate(new_capacity)?;
        unsafe {
            P::transfer(self.storage.as_ptr(), new_storage.as_ptr(), self.len);
            self.adopt(new_storage, self.len, "reserve");
        }
        Ok(())
    }

    pub fn reserve(&mut self, new_capacity: usize) {
        if let Err(e) = self.try_reserve(new_capacity) {
            e.fail()
        }
    }

    /// Drops trailing values or appends values made by `make` until the length is `new_len`.
    ///
    /// Growing reserves exactly `new_len`. If `make` panics, the values it made are dropped
    /// and the length is unchanged.
    pub fn resize_with<F: FnMut() -> T>(&mut self, new_len: usize, mut make: F) {
        if new_len <= self.len {
            self.truncate(new_len);
            return;
        }
        self.reserve(new_len);
        let dst = self.storage.address(self.len);
        let made = unsafe { construct_n(dst, new_len - self.len, |_| Ok::<T, Infallible>(make())) };
        if let Err(never) = made {
            match never {}
        }
        self.len = new_len;
    }

    pub fn resize(&mut self, new_len: usize) where T: Default {
        self.resize_with(new_len, T::default)
    }
}

impl<T, P> Drop for Sequence<T, P> {
    fn drop(&mut self) {
        // storage is released by its own Drop afterwards
        unsafe { std::ptr::drop_in_place(self.as_mut_slice()) };
    }
}

impl<T, P> Default for Sequence<T, P> {
    fn default() -> Self {
        Sequence::new_with_policy()
    }
}

impl<T: Clone, P> Clone for Sequence<T, P> {
    fn clone(&self) -> Self {
        let storage = RawStorage::<T>::with_capacity(self.len);
        let src = self.as_slice();
        let cloned = unsafe { construct_n(storage.as_ptr(), src.len(), |i| Ok::<T, Infallible>(src[i].clone())) };
        if let Err(never) = cloned {
            match never {}
        }
        let mut seq = Sequence::from_storage(storage);
        seq.len = src.len();
        seq
    }

    fn clone_from(&mut self, rhs: &Self) {
        if rhs.len > self.capacity() {
            let mut copy = rhs.clone();
            self.swap(&mut copy);
            return;
        }

        if rhs.len < self.len {
            self.as_mut_slice()[..rhs.len].clone_from_slice(rhs.as_slice());
            self.truncate(rhs.len);
        } else {
            let common = self.len;
            self.as_mut_slice().clone_from_slice(&rhs[..common]);
            let tail = &rhs[common..];
            let dst = self.storage.address(common);
            let cloned = unsafe { construct_n(dst, tail.len(), |i| Ok::<T, Infallible>(tail[i].clone())) };
            if let Err(never) = cloned {
                match never {}
            }
            self.len = rhs.len;
        }
    }
}

impl<T, P> Deref for Sequence<T, P> {
    type Target = [T];

    fn deref(&self) -> &[T] {
        self.as_slice()
    }
}

impl<T, P> DerefMut for Sequence<T, P> {
    fn deref_mut(&mut self) -> &mut [T] {
        self.as_mut_slice()
    }
}

impl<T, P> AsRef<[T]> for Sequence<T, P> {
    fn as_ref(&self) -> &[T] {
        self.as_slice()
    }
}

impl<T, P, I: SliceIndex<[T]>> Index<I> for Sequence<T, P> {
    type Output = I::Output;

    #[inline]
    fn index(&self, index: I) -> &I::Output {
        Index::index(self.as_slice(), index)
    }
}

impl<T, P, I: SliceIndex<[T]>> IndexMut<I> for Sequence<T, P> {
    #[inline]
    fn index_mut(&mut self, index: I) -> &mut I::Output {
        IndexMut::index_mut(self.as_mut_slice(), index)
    }
}

impl<'a, T, P> IntoIterator for &'a Sequence<T, P> {
    type Item = &'a T;
    type IntoIter = std::slice::Iter<'a, T>;

    fn into_iter(self) -> Self::IntoIter {
        self.as_slice().iter()
    }
}

impl<'a, T, P> IntoIterator for &'a mut Sequence<T, P> {
    type Item = &'a mut T;
    type IntoIter = std::slice::IterMut<'a, T>;

    fn into_iter(self) -> Self::IntoIter {
        self.as_mut_slice().iter_mut()
    }
}

impl<T, P: TransferPolicy<T>> Extend<T> for Sequence<T, P> {
    fn extend<I: IntoIterator<Item=T>>(&mut self, iter: I) {
        let iter = iter.into_iter();
        let (lower, _) = iter.size_hint();
        let wanted = self.len.saturating_add(lower);
        if wanted > self.capacity() {
            self.reserve(wanted);
        }
        for item in iter {
            self.push_back(item);
        }
    }
}

impl<T, P: TransferPolicy<T>> std::iter::FromIterator<T> for Sequence<T, P> {
    fn from_iter<I: IntoIterator<Item=T>>(iter: I) -> Self {
        let mut seq = Sequence::new_with_policy();
        seq.extend(iter);
        seq
    }
}

impl<T: std::fmt::Debug, P> std::fmt::Debug for Sequence<T, P> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_list().entries(self.iter()).finish()
    }
}

impl<T: PartialEq, P, Q> PartialEq<Sequence<T, Q>> for Sequence<T, P> {
    fn eq(&self, other: &Sequence<T, Q>) -> bool {
        self.as_slice() == other.as_slice()
    }
}

impl<T: Eq, P> Eq for Sequence<T, P> {}

impl<T: PartialEq, P> PartialEq<[T]> for Sequence<T, P> {
    fn eq(&self, other: &[T]) -> bool {
        self.as_slice() == other
    }
}

impl<T: PartialEq, P> PartialEq<Vec<T>> for Sequence<T, P> {
    fn eq(&self, other: &Vec<T>) -> bool {
        self.as_slice() == other.as_slice()
    }
}
