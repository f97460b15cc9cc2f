//! Storage manager: raw block acquisition and release.
//!
//! A [`Storage`] hands out uninitialized byte blocks and takes them back.
//! It knows nothing about elements. [`RawBuffer`] is the owning handle for
//! one block: it acquires on construction and releases exactly once on
//! drop, and it never runs element destructors.

#![allow(unsafe_code)]

use std::alloc::{self, Layout};
use std::fmt;
use std::marker::PhantomData;
use std::mem;
use std::ptr::NonNull;

use growarr_core::ArrayError;

/// A storage manager could not satisfy a block request.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct AcquireError;

impl fmt::Display for AcquireError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "block acquisition failed")
    }
}

impl std::error::Error for AcquireError {}

/// Source of raw memory blocks.
///
/// Handles are cloned into every block they produce, so cloning must be
/// cheap and every clone must be able to release blocks acquired by any
/// other clone.
///
/// # Safety
///
/// Implementors must return blocks that are valid for reads and writes of
/// `layout.size()` bytes, aligned to `layout.align()`, and not aliased by
/// any other live block until they are released.
pub unsafe trait Storage: Clone {
    /// Acquire an uninitialized block for `layout`.
    ///
    /// # Safety
    ///
    /// `layout.size()` must be non-zero.
    unsafe fn acquire(&self, layout: Layout) -> Result<NonNull<u8>, AcquireError>;

    /// Return a block to the system without touching its contents.
    ///
    /// # Safety
    ///
    /// `ptr` must have been returned by `acquire` on this storage (or a
    /// clone of it) with the same `layout`, and must not be used again.
    unsafe fn release(&self, ptr: NonNull<u8>, layout: Layout);
}

/// The global allocator.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Heap;

// SAFETY: blocks come straight from the global allocator, which upholds
// the size/alignment/aliasing contract for non-zero layouts.
unsafe impl Storage for Heap {
    unsafe fn acquire(&self, layout: Layout) -> Result<NonNull<u8>, AcquireError> {
        // SAFETY: caller guarantees a non-zero layout size.
        let ptr = unsafe { alloc::alloc(layout) };
        NonNull::new(ptr).ok_or(AcquireError)
    }

    unsafe fn release(&self, ptr: NonNull<u8>, layout: Layout) {
        // SAFETY: caller guarantees `ptr` came from `acquire` with `layout`.
        unsafe { alloc::dealloc(ptr.as_ptr(), layout) }
    }
}

/// Exclusively-owned block of `capacity` slots of `T`.
///
/// Slot contents are the caller's responsibility: the buffer does not
/// know which slots are initialized and never drops any of them.
/// Zero-sized blocks (zero capacity or zero-sized `T`) never reach the
/// storage manager.
pub struct RawBuffer<T, S: Storage = Heap> {
    ptr: NonNull<T>,
    capacity: usize,
    layout: Layout,
    storage: S,
    _marker: PhantomData<T>,
}

// SAFETY: the buffer owns its block outright; sending it sends the `T`s in
// it and the storage handle along with it.
unsafe impl<T: Send, S: Storage + Send> Send for RawBuffer<T, S> {}

// SAFETY: shared access only hands out `&T` and `&S`.
unsafe impl<T: Sync, S: Storage + Sync> Sync for RawBuffer<T, S> {}

impl<T, S: Storage> RawBuffer<T, S> {
    /// Acquire an uninitialized block of `capacity` slots.
    ///
    /// Returns [`ArrayError::CapacityOverflow`] if the byte size does not
    /// fit in `isize`, and [`ArrayError::OutOfMemory`] if the storage
    /// manager refuses the request.
    pub fn acquire(capacity: usize, storage: S) -> Result<Self, ArrayError> {
        let layout = Layout::array::<T>(capacity).map_err(|_| ArrayError::CapacityOverflow {
            requested_capacity: capacity,
        })?;

        if layout.size() == 0 {
            return Ok(Self {
                ptr: NonNull::dangling(),
                capacity,
                layout,
                storage,
                _marker: PhantomData,
            });
        }

        // SAFETY: zero-sized layouts returned above.
        let ptr = unsafe { storage.acquire(layout) }.map_err(|_| {
            log::warn!(
                "storage refused {} bytes for {capacity} slots",
                layout.size()
            );
            ArrayError::OutOfMemory {
                requested_capacity: capacity,
                bytes: layout.size(),
            }
        })?;

        Ok(Self {
            ptr: ptr.cast(),
            capacity,
            layout,
            storage,
            _marker: PhantomData,
        })
    }

    /// Number of slots in the block.
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Size of the block in bytes (zero for zero-sized element types).
    pub fn memory_bytes(&self) -> usize {
        self.layout.size()
    }

    /// The storage manager that owns the block.
    pub fn storage(&self) -> &S {
        &self.storage
    }

    /// Pointer to slot `index`.
    ///
    /// The slot may be uninitialized; reading through the pointer is only
    /// valid for slots the caller has constructed.
    ///
    /// # Safety
    ///
    /// `index <= capacity` (one-past-the-end is allowed for range ends).
    pub(crate) unsafe fn slot_ptr(&self, index: usize) -> *mut T {
        debug_assert!(index <= self.capacity, "slot index past block end");
        // SAFETY: in-bounds (or one-past) offset within a single block;
        // zero-sized `T` makes every offset zero bytes.
        unsafe { self.ptr.as_ptr().add(index) }
    }

    /// Base pointer of the block, valid even for empty blocks.
    pub(crate) fn base_ptr(&self) -> *mut T {
        self.ptr.as_ptr()
    }
}

impl<T, S: Storage> Drop for RawBuffer<T, S> {
    fn drop(&mut self) {
        if self.layout.size() != 0 {
            // SAFETY: the block was acquired from `storage` with `layout`
            // and the buffer is the only owner, so this runs exactly once.
            unsafe { self.storage.release(self.ptr.cast(), self.layout) }
        }
    }
}

impl<T, S: Storage> fmt::Debug for RawBuffer<T, S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RawBuffer")
            .field("capacity", &self.capacity)
            .field("bytes", &self.layout.size())
            .field("element_size", &mem::size_of::<T>())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn acquire_reports_capacity_and_bytes() {
        let buf = RawBuffer::<u64>::acquire(8, Heap).unwrap();
        assert_eq!(buf.capacity(), 8);
        assert_eq!(buf.memory_bytes(), 64);
    }

    #[test]
    fn zero_sized_elements_use_no_memory() {
        let buf = RawBuffer::<()>::acquire(1_000_000, Heap).unwrap();
        assert_eq!(buf.capacity(), 1_000_000);
        assert_eq!(buf.memory_bytes(), 0);
    }

    #[test]
    fn zero_capacity_uses_no_memory() {
        let buf = RawBuffer::<u32>::acquire(0, Heap).unwrap();
        assert_eq!(buf.memory_bytes(), 0);
    }

    #[test]
    fn oversized_request_is_capacity_overflow_not_panic() {
        let result = RawBuffer::<u64>::acquire(usize::MAX / 4, Heap);
        assert_eq!(
            result.err(),
            Some(ArrayError::CapacityOverflow {
                requested_capacity: usize::MAX / 4
            })
        );
    }

    #[test]
    fn slots_are_writable_and_aligned() {
        let buf = RawBuffer::<u128>::acquire(4, Heap).unwrap();
        for i in 0..4 {
            // SAFETY: i < capacity.
            let p = unsafe { buf.slot_ptr(i) };
            assert_eq!(p as usize % mem::align_of::<u128>(), 0);
            // SAFETY: p is an in-bounds, aligned, exclusively-owned slot.
            unsafe { p.write(i as u128) };
        }
        // SAFETY: slot 3 was written above.
        assert_eq!(unsafe { buf.slot_ptr(3).read() }, 3);
    }

    #[test]
    fn debug_shows_capacity() {
        let buf = RawBuffer::<u16>::acquire(3, Heap).unwrap();
        let text = format!("{buf:?}");
        assert!(text.contains("capacity: 3"));
        assert!(text.contains("bytes: 6"));
    }
}
