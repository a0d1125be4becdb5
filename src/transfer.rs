//! How elements travel from an old block to a new one when a `Sequence` grows.
//!
//! A policy is chosen per sequence type at compile time. Moving a Rust value is a bitwise
//! copy that can not fail, so `Relocate` is always the policy that keeps the old block
//! intact on failure and it is the default. `CloneOnGrow` copies instead, leaving the
//! originals untouched until the whole transfer has succeeded.

use std::convert::Infallible;
use std::ptr;

/// Strategy used to populate a new block from the live elements of an old one.
///
/// # Safety
///
/// `Sequence` relies on this contract to keep every value dropped exactly once:
///
/// - after `transfer` returns, `dst[..count]` holds live values;
/// - if `transfer` unwinds, `dst[..count]` holds no live values and `src[..count]` is unchanged;
/// - after `release_source`, `src[..count]` must be treated as uninitialized.
pub unsafe trait TransferPolicy<T> {
    /// Fills `count` uninitialized slots at `dst` from the live values at `src`.
    unsafe fn transfer(src: *mut T, dst: *mut T, count: usize);

    /// Finishes with `count` source slots once every transfer out of them succeeded.
    unsafe fn release_source(src: *mut T, count: usize);
}

/// Bitwise move. Source slots are left logically uninitialized and are never dropped.
#[derive(Debug)]
pub enum Relocate {}

unsafe impl<T> TransferPolicy<T> for Relocate {
    #[inline]
    unsafe fn transfer(src: *mut T, dst: *mut T, count: usize) {
        ptr::copy_nonoverlapping(src, dst, count);
    }

    #[inline(always)]
    unsafe fn release_source(_src: *mut T, _count: usize) {}
}

/// Clones into the new block, then drops the originals.
///
/// If a `clone` panics, the clones made so far are dropped and the original elements
/// stay where they were.
#[derive(Debug)]
pub enum CloneOnGrow {}

unsafe impl<T: Clone> TransferPolicy<T> for CloneOnGrow {
    unsafe fn transfer(src: *mut T, dst: *mut T, count: usize) {
        let cloned = construct_n(dst, count, |i| Ok::<T, Infallible>((*src.add(i)).clone()));
        if let Err(never) = cloned {
            match never {}
        }
    }

    unsafe fn release_source(src: *mut T, count: usize) {
        ptr::drop_in_place(ptr::slice_from_raw_parts_mut(src, count));
    }
}

/// Drops `len` values starting at `start` unless forgotten.
pub(crate) struct InitGuard<T> {
    pub start: *mut T,
    pub len: usize,
}

impl<T> InitGuard<T> {
    pub fn new(start: *mut T, len: usize) -> InitGuard<T> {
        InitGuard { start, len }
    }

    /// Keeps the guarded values alive.
    pub fn disarm(self) {
        std::mem::forget(self);
    }
}

impl<T> Drop for InitGuard<T> {
    fn drop(&mut self) {
        trace!("dropping {} partially constructed values", self.len);
        unsafe { ptr::drop_in_place(ptr::slice_from_raw_parts_mut(self.start, self.len)) };
    }
}

/// Constructs `count` values at `dst`, value `i` produced by `make(i)`.
///
/// If `make` fails or unwinds, the values already constructed are dropped and `dst` is
/// left uninitialized.
pub(crate) unsafe fn construct_n<T, E>(
    dst: *mut T,
    count: usize,
    mut make: impl FnMut(usize) -> Result<T, E>,
) -> Result<(), E> {
    let mut built = InitGuard::new(dst, 0);
    for i in 0..count {
        dst.add(i).write(make(i)?);
        built.len += 1;
    }
    built.disarm();
    Ok(())
}
