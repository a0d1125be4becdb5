use crate::StorageError;
use std::alloc::Layout;
use std::marker::PhantomData;
use std::ptr::NonNull;

/// Owner of a block of memory with room for `capacity` values of `T`, none of which
/// are initialized.
///
/// The storage never knows how many slots hold live values, so it can not be cloned and
/// it never runs `T`'s destructor. Whoever constructs values inside it must drop them
/// before the storage goes away.
///
/// Zero-sized types and zero capacity never touch the allocator.
pub struct RawStorage<T> {
    ptr: NonNull<T>,
    capacity: usize,
    _owns: PhantomData<T>,
}

impl<T> RawStorage<T> {
    /// Empty storage, no allocation.
    pub const fn new() -> RawStorage<T> {
        RawStorage {
            ptr: NonNull::dangling(),
            capacity: 0,
            _owns: PhantomData,
        }
    }

    /// Allocates room for exactly `capacity` values.
    pub fn allocate(capacity: usize) -> Result<RawStorage<T>, StorageError> {
        let layout = Layout::array::<T>(capacity).map_err(|_| StorageError::CapacityOverflow)?;
        if layout.size() == 0 {
            return Ok(RawStorage {
                ptr: NonNull::dangling(),
                capacity,
                _owns: PhantomData,
            });
        }

        // layout.size() is non-zero here
        let block = unsafe { std::alloc::alloc(layout) };
        let ptr = NonNull::new(block as *mut T).ok_or(StorageError::AllocFailed { layout })?;
        trace!("allocate {} slots ({} bytes) at {:p}", capacity, layout.size(), ptr);

        Ok(RawStorage {
            ptr,
            capacity,
            _owns: PhantomData,
        })
    }

    /// Like `allocate`, but aborts the way `Vec` does when memory can not be obtained.
    pub fn with_capacity(capacity: usize) -> RawStorage<T> {
        match RawStorage::allocate(capacity) {
            Ok(storage) => storage,
            Err(e) => e.fail(),
        }
    }

    #[inline(always)]
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Pointer to slot `index`. `index == capacity` is allowed and points one past the end.
    ///
    /// Panics when `index` is past that.
    #[inline(always)]
    pub fn address(&self, index: usize) -> *mut T {
        assert!(index <= self.capacity, "slot {} is outside of capacity {}", index, self.capacity);
        // in bounds of the block (or a zero-byte offset for ZSTs and empty storage)
        unsafe { self.ptr.as_ptr().add(index) }
    }

    #[inline(always)]
    pub fn as_ptr(&self) -> *mut T {
        self.ptr.as_ptr()
    }

    /// Exchanges blocks with `other`. Never allocates.
    #[inline]
    pub fn swap(&mut self, other: &mut RawStorage<T>) {
        std::mem::swap(&mut self.ptr, &mut other.ptr);
        std::mem::swap(&mut self.capacity, &mut other.capacity);
    }

    fn layout(&self) -> Option<Layout> {
        match Layout::array::<T>(self.capacity) {
            Ok(layout) if layout.size() != 0 => Some(layout),
            _ => None,
        }
    }
}

impl<T> Default for RawStorage<T> {
    fn default() -> Self {
        RawStorage::new()
    }
}

impl<T> Drop for RawStorage<T> {
    fn drop(&mut self) {
        if let Some(layout) = self.layout() {
            trace!("release {} slots ({} bytes) at {:p}", self.capacity, layout.size(), self.ptr);
            // the block was obtained from `alloc` with this exact layout
            unsafe { std::alloc::dealloc(self.ptr.as_ptr() as *mut u8, layout) };
        }
    }
}

impl<T> std::fmt::Debug for RawStorage<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RawStorage")
            .field("ptr", &self.ptr)
            .field("capacity", &self.capacity)
            .finish()
    }
}

unsafe impl<T: Send> Send for RawStorage<T> {}
unsafe impl<T: Sync> Sync for RawStorage<T> {}
