//! The growable array: public sequence operations over a [`RawBuffer`].
//!
//! Every mutation follows the same shape: compute the size the operation
//! would produce, ask the [`GrowthPolicy`] whether that size calls for a
//! capacity transition, perform the transition (which may fail and leaves
//! the array untouched if it does), and only then touch the slot and
//! commit the new size.

#![allow(unsafe_code)]

use std::alloc::{self, Layout};
use std::fmt;
use std::mem;
use std::ops::{Index, IndexMut};

use growarr_core::{AppendError, ArrayError, ConfigError, GrowthPolicy};

use crate::iter::{IntoIter, Iter};
use crate::raw::{Heap, RawBuffer, Storage};
use crate::slot::{self, PrefixGuard};
use crate::stats::{ArrayStats, Transition};

/// Contiguous, dynamically-resized sequence built on raw storage.
///
/// Slots `[0, size)` hold live values; slots `[size, capacity)` are raw
/// memory. Capacity is always at least 1. The block is owned exclusively
/// and released exactly once, when the array is dropped or its contents
/// are replaced.
pub struct GrowableArray<T, S: Storage = Heap> {
    buf: RawBuffer<T, S>,
    size: usize,
    policy: GrowthPolicy,
    stats: ArrayStats,
}

impl<T> GrowableArray<T, Heap> {
    /// Create an empty array with capacity 1 and the default policy.
    ///
    /// # Panics
    ///
    /// Aborts through [`handle_alloc_error`](std::alloc::handle_alloc_error)
    /// if the initial block cannot be acquired. See [`try_new`](Self::try_new).
    pub fn new() -> Self {
        Self::try_new().unwrap_or_else(|e| storage_failure::<T>(&e))
    }

    /// Create an empty array with capacity 1 and the default policy.
    pub fn try_new() -> Result<Self, ArrayError> {
        Self::try_new_in(Heap)
    }

    /// Create an empty array sized for about `expected` elements.
    ///
    /// Reserves `max(expected * 2, 1)` slots so that `expected` appends
    /// stay below the default growth threshold.
    ///
    /// # Panics
    ///
    /// Panics on capacity overflow and aborts if the block cannot be
    /// acquired. See [`try_with_expected_size`](Self::try_with_expected_size).
    pub fn with_expected_size(expected: usize) -> Self {
        Self::try_with_expected_size(expected).unwrap_or_else(|e| storage_failure::<T>(&e))
    }

    /// Fallible form of [`with_expected_size`](Self::with_expected_size).
    pub fn try_with_expected_size(expected: usize) -> Result<Self, ArrayError> {
        let capacity = expected
            .checked_mul(2)
            .ok_or(ArrayError::CapacityOverflow {
                requested_capacity: expected,
            })?;
        Self::acquire_validated(capacity, GrowthPolicy::default(), Heap)
    }

    /// Create an empty array with capacity 1 and a custom policy.
    pub fn with_policy(policy: GrowthPolicy) -> Result<Self, ConfigError> {
        Self::try_with_policy_in(GrowthPolicy::MIN_CAPACITY, policy, Heap)
    }
}

impl<T, S: Storage> GrowableArray<T, S> {
    /// Create an empty array with capacity 1 and the default policy,
    /// drawing blocks from `storage`.
    pub fn try_new_in(storage: S) -> Result<Self, ArrayError> {
        Self::acquire_validated(GrowthPolicy::MIN_CAPACITY, GrowthPolicy::default(), storage)
    }

    /// Create an empty array with room for `capacity` elements (at least 1),
    /// a custom policy, and blocks drawn from `storage`.
    ///
    /// The policy is validated before any memory is requested.
    pub fn try_with_policy_in(
        capacity: usize,
        policy: GrowthPolicy,
        storage: S,
    ) -> Result<Self, ConfigError> {
        policy.validate()?;
        Ok(Self::acquire_validated(capacity, policy, storage)?)
    }

    fn acquire_validated(
        capacity: usize,
        policy: GrowthPolicy,
        storage: S,
    ) -> Result<Self, ArrayError> {
        let capacity = capacity.max(GrowthPolicy::MIN_CAPACITY);
        let buf = RawBuffer::acquire(capacity, storage)?;
        Ok(Self {
            buf,
            size: 0,
            policy,
            stats: ArrayStats::starting_at(capacity),
        })
    }

    // ── Observers ──────────────────────────────────────────────────

    /// Number of live elements.
    pub fn size(&self) -> usize {
        self.size
    }

    /// Number of reserved slots. Never below 1 or [`size`](Self::size).
    pub fn capacity(&self) -> usize {
        self.buf.capacity()
    }

    /// Whether the array holds no elements.
    pub fn is_empty(&self) -> bool {
        self.size == 0
    }

    /// Current `size / capacity`.
    pub fn load_factor(&self) -> f64 {
        GrowthPolicy::load_factor(self.size, self.capacity())
    }

    /// The policy driving capacity transitions.
    pub fn policy(&self) -> &GrowthPolicy {
        &self.policy
    }

    /// Cumulative transition counters for this instance.
    pub fn stats(&self) -> &ArrayStats {
        &self.stats
    }

    /// The storage manager blocks are drawn from.
    pub fn storage(&self) -> &S {
        self.buf.storage()
    }

    /// Bytes held by the current block.
    pub fn memory_bytes(&self) -> usize {
        self.buf.memory_bytes()
    }

    // ── Element access ─────────────────────────────────────────────

    /// The live elements as a slice.
    pub fn as_slice(&self) -> &[T] {
        // SAFETY: exactly the first `size` slots are constructed.
        unsafe { slot::prefix(&self.buf, self.size) }
    }

    /// The live elements as a mutable slice.
    pub fn as_mut_slice(&mut self) -> &mut [T] {
        // SAFETY: exactly the first `size` slots are constructed.
        unsafe { slot::prefix_mut(&mut self.buf, self.size) }
    }

    /// Element at `index`, or [`ArrayError::IndexOutOfRange`] if
    /// `index >= size`.
    pub fn at(&self, index: usize) -> Result<&T, ArrayError> {
        let size = self.size;
        self.as_slice()
            .get(index)
            .ok_or(ArrayError::IndexOutOfRange { index, size })
    }

    /// Mutable element at `index`, or [`ArrayError::IndexOutOfRange`] if
    /// `index >= size`.
    pub fn at_mut(&mut self, index: usize) -> Result<&mut T, ArrayError> {
        let size = self.size;
        self.as_mut_slice()
            .get_mut(index)
            .ok_or(ArrayError::IndexOutOfRange { index, size })
    }

    /// First element, if any.
    pub fn first(&self) -> Option<&T> {
        self.as_slice().first()
    }

    /// Last element, if any.
    pub fn last(&self) -> Option<&T> {
        self.as_slice().last()
    }

    // ── Mutation ───────────────────────────────────────────────────

    /// Append `value` after the last element.
    ///
    /// If the new size reaches the growth threshold the array first moves
    /// into a block `resize_factor` times larger. If that block cannot be
    /// acquired, the array is unchanged, `value` is dropped, and the error
    /// is returned. Use [`try_append`](Self::try_append) to get the value
    /// back instead.
    pub fn append(&mut self, value: T) -> Result<(), ArrayError> {
        self.try_append(value).map_err(|e| e.error)
    }

    /// Append `value`, handing it back inside the error if the array
    /// cannot make room for it.
    pub fn try_append(&mut self, value: T) -> Result<(), AppendError<T>> {
        let new_size = match self.make_room() {
            Ok(new_size) => new_size,
            Err(error) => return Err(AppendError { error, value }),
        };
        // SAFETY: `make_room` guarantees `new_size <= capacity`, so slot
        // `size` is in bounds, and it is past the constructed prefix.
        unsafe { slot::construct_at(&mut self.buf, self.size, value) };
        self.size = new_size;
        Ok(())
    }

    /// Grow if one more element reaches the threshold; returns the size
    /// the append will produce.
    fn make_room(&mut self) -> Result<usize, ArrayError> {
        let new_size = self
            .size
            .checked_add(1)
            .ok_or(ArrayError::CapacityOverflow {
                requested_capacity: usize::MAX,
            })?;
        let capacity = self.capacity();
        if self.policy.should_grow(new_size, capacity) {
            let target = self
                .policy
                .grown_capacity(capacity, new_size)
                .ok_or(ArrayError::CapacityOverflow {
                    requested_capacity: new_size,
                })?;
            self.relocate(target, Transition::Grow)?;
        }
        Ok(new_size)
    }

    /// Append `value`, aborting on allocation failure.
    ///
    /// # Panics
    ///
    /// Panics on capacity overflow and aborts through
    /// [`handle_alloc_error`](std::alloc::handle_alloc_error) when the
    /// storage manager refuses a block.
    pub fn push(&mut self, value: T) {
        if let Err(e) = self.append(value) {
            storage_failure::<T>(&e);
        }
    }

    /// Remove and return the last element.
    ///
    /// Returns [`ArrayError::EmptyContainer`] on an empty array. If the
    /// removal drops the load factor to the shrink threshold, the array
    /// moves into a smaller block, unless that block would have to grow
    /// again on the next append. Should the smaller block be refused, the
    /// element is put back and the error is returned instead.
    pub fn remove_last(&mut self) -> Result<T, ArrayError> {
        if self.size == 0 {
            return Err(ArrayError::EmptyContainer);
        }
        let new_size = self.size - 1;
        // SAFETY: slot `new_size` is the last constructed slot; it counts as
        // uninitialized once `size` drops below it.
        let value = unsafe { slot::take_at(&mut self.buf, new_size) };
        self.size = new_size;

        let capacity = self.capacity();
        if let Some(target) = self.policy.shrink_step(new_size, capacity) {
            if let Err(e) = self.relocate(target, Transition::Shrink) {
                // SAFETY: the block is unchanged and slot `new_size` was vacated above.
                unsafe { slot::construct_at(&mut self.buf, new_size, value) };
                self.size = new_size + 1;
                return Err(e);
            }
        }
        Ok(value)
    }

    /// Drop every element past `len`, last first.
    ///
    /// No-op when `len >= size`. Afterwards the shrink policy is consulted
    /// once; a refused shrink keeps the current block.
    pub fn truncate(&mut self, len: usize) {
        if len >= self.size {
            return;
        }
        while self.size > len {
            self.size -= 1;
            // SAFETY: slot `size` was the last constructed slot and `size`
            // already excludes it, so a panicking destructor cannot cause
            // a second drop.
            unsafe { slot::destroy_at(&mut self.buf, self.size) };
        }

        // Collapse repeated shrink steps into one transition.
        let capacity = self.capacity();
        let mut target = capacity;
        while let Some(next) = self.policy.shrink_step(self.size, target) {
            target = next;
        }
        if target < capacity {
            if let Err(e) = self.relocate(target, Transition::Shrink) {
                log::warn!("keeping {capacity} slots after truncate: {e}");
            }
        }
    }

    /// Drop every element. See [`truncate`](Self::truncate).
    pub fn clear(&mut self) {
        self.truncate(0);
    }

    /// Reset every live element to `T::default()`.
    ///
    /// Size and capacity are unchanged.
    pub fn nullify(&mut self)
    where
        T: Default,
    {
        for item in self.as_mut_slice() {
            *item = T::default();
        }
    }

    /// Ensure room for at least `requested` elements without changing size.
    ///
    /// No-op when `requested <= capacity`. On failure the array is intact.
    pub fn reserve(&mut self, requested: usize) -> Result<(), ArrayError> {
        if requested <= self.capacity() {
            log::trace!("reserve {requested} within capacity {}", self.capacity());
            return Ok(());
        }
        self.relocate(requested, Transition::Reserve)
    }

    /// Release unused slots down to `max(size, 1)`.
    pub fn shrink_to_fit(&mut self) -> Result<(), ArrayError> {
        let target = self.size.max(GrowthPolicy::MIN_CAPACITY);
        if target >= self.capacity() {
            return Ok(());
        }
        self.relocate(target, Transition::Fit)
    }

    /// Move the live prefix into a fresh block of `new_capacity` slots.
    ///
    /// Either the whole transition happens or nothing does: the new block
    /// is acquired before anything is moved, and moving cannot fail.
    fn relocate(&mut self, new_capacity: usize, transition: Transition) -> Result<(), ArrayError> {
        debug_assert!(new_capacity >= self.size, "relocation would drop live elements");
        let old_capacity = self.capacity();
        if new_capacity == old_capacity {
            return Ok(());
        }

        let mut fresh = match RawBuffer::acquire(new_capacity, self.buf.storage().clone()) {
            Ok(buf) => buf,
            Err(e) => {
                self.stats.record_failure();
                return Err(e);
            }
        };
        // SAFETY: the old prefix is constructed, the fresh block is empty
        // and large enough, and the old prefix is never read again.
        unsafe { slot::transfer(&self.buf, &mut fresh, self.size) };
        // Dropping the old buffer releases its block without running
        // destructors on the moved-from slots.
        drop(mem::replace(&mut self.buf, fresh));

        self.stats.record(transition, new_capacity, self.size);
        log::debug!(
            "{transition} capacity {old_capacity} -> {new_capacity} (size {})",
            self.size
        );
        Ok(())
    }

    // ── Iteration ──────────────────────────────────────────────────

    /// Iterator positioned at the first element.
    pub fn begin(&self) -> Iter<'_, T, S> {
        Iter::new(self, 0)
    }

    /// Iterator positioned one past the last element.
    pub fn end(&self) -> Iter<'_, T, S> {
        Iter::new(self, self.size)
    }

    /// Iterate over the elements in index order. Same as [`begin`](Self::begin).
    pub fn iter(&self) -> Iter<'_, T, S> {
        self.begin()
    }

    /// Iterate mutably over the elements in index order.
    pub fn iter_mut(&mut self) -> std::slice::IterMut<'_, T> {
        self.as_mut_slice().iter_mut()
    }

    /// Split into the block and its live length without dropping anything.
    pub(crate) fn into_raw_parts(self) -> (RawBuffer<T, S>, usize) {
        let this = mem::ManuallyDrop::new(self);
        // SAFETY: `this` is never dropped, so `buf` is moved out exactly
        // once. The remaining fields own no resources.
        let buf = unsafe { std::ptr::read(&this.buf) };
        (buf, this.size)
    }

    // ── Copy ───────────────────────────────────────────────────────

    /// Build an independent copy in a fresh block of `capacity` slots.
    ///
    /// A panicking `Clone` destroys the copies made so far and releases
    /// the fresh block before unwinding; `self` is never touched.
    fn clone_into_fresh(&self, capacity: usize) -> Result<Self, ArrayError>
    where
        T: Clone,
    {
        let capacity = capacity.max(self.size).max(GrowthPolicy::MIN_CAPACITY);
        let mut buf = RawBuffer::acquire(capacity, self.buf.storage().clone())?;
        let mut guard = PrefixGuard::new(&mut buf);
        for item in self.as_slice() {
            guard.push(item.clone());
        }
        let size = guard.finish();
        Ok(Self {
            buf,
            size,
            policy: self.policy.clone(),
            stats: ArrayStats::starting_at(capacity),
        })
    }

    /// Independent copy with the same capacity, policy, and storage manager.
    pub fn try_clone(&self) -> Result<Self, ArrayError>
    where
        T: Clone,
    {
        self.clone_into_fresh(self.capacity())
    }

    /// Replace the contents with an independent copy of `source`.
    ///
    /// The copy is built before the current block is released, so a
    /// failed acquisition or a panicking `Clone` leaves `self` as it was.
    /// Assigning an array to itself cannot be expressed: the borrow rules
    /// forbid `a.assign_from(&a)`.
    pub fn assign_from(&mut self, source: &Self) -> Result<(), ArrayError>
    where
        T: Clone,
    {
        *self = source.clone_into_fresh(source.capacity())?;
        Ok(())
    }
}

/// Report a storage failure from an infallible entry point.
fn storage_failure<T>(err: &ArrayError) -> ! {
    if let ArrayError::OutOfMemory { bytes, .. } = err {
        if let Ok(layout) = Layout::from_size_align(*bytes, mem::align_of::<T>()) {
            alloc::handle_alloc_error(layout);
        }
    }
    panic!("{err}");
}

impl<T, S: Storage> Drop for GrowableArray<T, S> {
    fn drop(&mut self) {
        // SAFETY: exactly the first `size` slots are constructed. The
        // block itself is released afterwards by `RawBuffer::drop`.
        unsafe { slot::destroy_range(&mut self.buf, 0, self.size) }
    }
}

impl<T> Default for GrowableArray<T, Heap> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Clone, S: Storage> Clone for GrowableArray<T, S> {
    fn clone(&self) -> Self {
        self.try_clone().unwrap_or_else(|e| storage_failure::<T>(&e))
    }

    fn clone_from(&mut self, source: &Self) {
        if let Err(e) = self.assign_from(source) {
            storage_failure::<T>(&e);
        }
    }
}

impl<T, S: Storage> Index<usize> for GrowableArray<T, S> {
    type Output = T;

    fn index(&self, index: usize) -> &T {
        match self.at(index) {
            Ok(value) => value,
            Err(e) => panic!("{e}"),
        }
    }
}

impl<T, S: Storage> IndexMut<usize> for GrowableArray<T, S> {
    fn index_mut(&mut self, index: usize) -> &mut T {
        match self.at_mut(index) {
            Ok(value) => value,
            Err(e) => panic!("{e}"),
        }
    }
}

impl<T: PartialEq, S: Storage> PartialEq for GrowableArray<T, S> {
    fn eq(&self, other: &Self) -> bool {
        self.as_slice() == other.as_slice()
    }
}

impl<T: Eq, S: Storage> Eq for GrowableArray<T, S> {}

impl<T: fmt::Debug, S: Storage> fmt::Debug for GrowableArray<T, S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.as_slice()).finish()
    }
}

/// Diagnostic rendering: `capacity: C size: S vector: < e0 e1 ... >`.
impl<T: fmt::Display, S: Storage> fmt::Display for GrowableArray<T, S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "capacity: {} size: {} vector: < ",
            self.capacity(),
            self.size()
        )?;
        for item in self {
            write!(f, "{item} ")?;
        }
        write!(f, ">")
    }
}

impl<T, S: Storage> Extend<T> for GrowableArray<T, S> {
    fn extend<I: IntoIterator<Item = T>>(&mut self, iter: I) {
        for value in iter {
            self.push(value);
        }
    }
}

impl<T> FromIterator<T> for GrowableArray<T, Heap> {
    fn from_iter<I: IntoIterator<Item = T>>(iter: I) -> Self {
        let mut array = Self::new();
        array.extend(iter);
        array
    }
}

impl<'a, T, S: Storage> IntoIterator for &'a GrowableArray<T, S> {
    type Item = &'a T;
    type IntoIter = Iter<'a, T, S>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

impl<'a, T, S: Storage> IntoIterator for &'a mut GrowableArray<T, S> {
    type Item = &'a mut T;
    type IntoIter = std::slice::IterMut<'a, T>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter_mut()
    }
}

impl<T, S: Storage> IntoIterator for GrowableArray<T, S> {
    type Item = T;
    type IntoIter = IntoIter<T, S>;

    fn into_iter(self) -> Self::IntoIter {
        let (buf, size) = self.into_raw_parts();
        IntoIter::new(buf, size)
    }
}
