//! Element lifecycle inside a [`RawBuffer`].
//!
//! These functions move a slot between its two states, uninitialized and
//! constructed. None of them acquire or release memory. The caller tracks
//! which slots are constructed and upholds each function's precondition.

#![allow(unsafe_code)]

use std::mem;
use std::ptr;
use std::slice;

use crate::raw::{RawBuffer, Storage};

/// Construct `value` in an uninitialized slot.
///
/// # Safety
///
/// `index < buf.capacity()` and the slot is uninitialized.
pub(crate) unsafe fn construct_at<T, S: Storage>(
    buf: &mut RawBuffer<T, S>,
    index: usize,
    value: T,
) {
    debug_assert!(index < buf.capacity(), "construct past block end");
    // SAFETY: in-bounds slot; overwriting uninitialized memory drops nothing.
    unsafe { ptr::write(buf.slot_ptr(index), value) }
}

/// Move the value out of a constructed slot, leaving it uninitialized.
///
/// # Safety
///
/// `index < buf.capacity()` and the slot is constructed. The caller must
/// treat the slot as uninitialized afterwards.
pub(crate) unsafe fn take_at<T, S: Storage>(buf: &mut RawBuffer<T, S>, index: usize) -> T {
    debug_assert!(index < buf.capacity(), "take past block end");
    // SAFETY: the slot holds a live value whose ownership moves to the caller.
    unsafe { ptr::read(buf.slot_ptr(index)) }
}

/// Run the destructor of one constructed slot without freeing memory.
///
/// # Safety
///
/// `index < buf.capacity()` and the slot is constructed. The slot is
/// uninitialized afterwards.
pub(crate) unsafe fn destroy_at<T, S: Storage>(buf: &mut RawBuffer<T, S>, index: usize) {
    // SAFETY: forwarded precondition.
    unsafe { destroy_range(buf, index, 1) }
}

/// Destroy `count` constructed slots starting at `first`.
///
/// # Safety
///
/// `first + count <= buf.capacity()` and every slot in the range is
/// constructed. The range is uninitialized afterwards.
pub(crate) unsafe fn destroy_range<T, S: Storage>(
    buf: &mut RawBuffer<T, S>,
    first: usize,
    count: usize,
) {
    if count == 0 || !mem::needs_drop::<T>() {
        return;
    }
    debug_assert!(first + count <= buf.capacity(), "destroy past block end");
    // SAFETY: the range is in bounds and fully constructed.
    unsafe {
        let run = ptr::slice_from_raw_parts_mut(buf.slot_ptr(first), count);
        ptr::drop_in_place(run);
    }
}

/// Move the first `count` values of `from` into the first `count` slots of `to`.
///
/// Infallible: values are relocated bitwise, so a transfer can never leave
/// a block half-populated.
///
/// # Safety
///
/// The first `count` slots of `from` are constructed, the first `count`
/// slots of `to` are uninitialized, and `count` fits both blocks. After
/// the call `from`'s prefix is logically uninitialized: it must be neither
/// read nor destroyed.
pub(crate) unsafe fn transfer<T, S: Storage>(
    from: &RawBuffer<T, S>,
    to: &mut RawBuffer<T, S>,
    count: usize,
) {
    debug_assert!(count <= from.capacity() && count <= to.capacity(), "transfer past block end");
    // SAFETY: distinct blocks (two owning buffers), both ranges in bounds.
    unsafe { ptr::copy_nonoverlapping(from.base_ptr(), to.base_ptr(), count) }
}

/// Borrow the constructed prefix as a slice.
///
/// # Safety
///
/// The first `len` slots are constructed.
pub(crate) unsafe fn prefix<T, S: Storage>(buf: &RawBuffer<T, S>, len: usize) -> &[T] {
    // SAFETY: non-null aligned base, `len` initialized values.
    unsafe { slice::from_raw_parts(buf.base_ptr(), len) }
}

/// Mutably borrow the constructed prefix as a slice.
///
/// # Safety
///
/// The first `len` slots are constructed.
pub(crate) unsafe fn prefix_mut<T, S: Storage>(
    buf: &mut RawBuffer<T, S>,
    len: usize,
) -> &mut [T] {
    // SAFETY: non-null aligned base, `len` initialized values, unique borrow.
    unsafe { slice::from_raw_parts_mut(buf.base_ptr(), len) }
}

/// Fills a fresh block front to back and destroys whatever it built if
/// the fill is abandoned (for example by a panicking `Clone`).
///
/// The block itself is not released here; its [`RawBuffer`] does that
/// when it goes out of scope.
pub(crate) struct PrefixGuard<'a, T, S: Storage> {
    buf: &'a mut RawBuffer<T, S>,
    constructed: usize,
}

impl<'a, T, S: Storage> PrefixGuard<'a, T, S> {
    /// Start filling an empty block.
    pub(crate) fn new(buf: &'a mut RawBuffer<T, S>) -> Self {
        Self {
            buf,
            constructed: 0,
        }
    }

    /// Construct the next slot.
    ///
    /// # Panics
    ///
    /// Panics if the block is already full.
    pub(crate) fn push(&mut self, value: T) {
        assert!(self.constructed < self.buf.capacity(), "prefix guard overflow");
        // SAFETY: slots at and beyond `constructed` are uninitialized.
        unsafe { construct_at(self.buf, self.constructed, value) };
        self.constructed += 1;
    }

    /// Commit the filled prefix and return its length.
    pub(crate) fn finish(self) -> usize {
        let constructed = self.constructed;
        mem::forget(self);
        constructed
    }
}

impl<T, S: Storage> Drop for PrefixGuard<'_, T, S> {
    fn drop(&mut self) {
        log::debug!("abandoning partial fill of {} slots", self.constructed);
        // SAFETY: exactly the first `constructed` slots were built by this guard.
        unsafe { destroy_range(self.buf, 0, self.constructed) }
    }
}
