//! Iterators over a [`GrowableArray`].
//!
//! [`Iter`] is a position inside one array: two iterators compare equal
//! when they point into the same array at the same index, so
//! `array.begin() == array.end()` exactly when the array is empty.
//! [`IntoIter`] takes ownership of the block and moves elements out one
//! at a time; whatever is left when it is dropped is destroyed then.

#![allow(unsafe_code)]

use std::fmt;
use std::iter::FusedIterator;
use std::ptr;

use crate::array::GrowableArray;
use crate::raw::{Heap, RawBuffer, Storage};
use crate::slot;

/// Borrowing iterator, yielding `&T` in index order.
///
/// Invalidated (at compile time) by any mutation of the array.
pub struct Iter<'a, T, S: Storage = Heap> {
    array: &'a GrowableArray<T, S>,
    index: usize,
    end: usize,
}

impl<'a, T, S: Storage> Iter<'a, T, S> {
    pub(crate) fn new(array: &'a GrowableArray<T, S>, index: usize) -> Self {
        Self {
            array,
            index,
            end: array.size(),
        }
    }

    /// Position of the next element to be yielded.
    pub fn index(&self) -> usize {
        self.index
    }

    /// Element at the current position without advancing, or `None` at
    /// the end.
    pub fn get(&self) -> Option<&'a T> {
        if self.index < self.end {
            self.array.as_slice().get(self.index)
        } else {
            None
        }
    }
}

impl<T, S: Storage> Clone for Iter<'_, T, S> {
    fn clone(&self) -> Self {
        Self {
            array: self.array,
            index: self.index,
            end: self.end,
        }
    }
}

impl<T, S: Storage> PartialEq for Iter<'_, T, S> {
    fn eq(&self, other: &Self) -> bool {
        ptr::eq(self.array, other.array) && self.index == other.index
    }
}

impl<T, S: Storage> Eq for Iter<'_, T, S> {}

impl<T, S: Storage> fmt::Debug for Iter<'_, T, S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Iter")
            .field("index", &self.index)
            .field("end", &self.end)
            .finish()
    }
}

impl<'a, T, S: Storage> Iterator for Iter<'a, T, S> {
    type Item = &'a T;

    fn next(&mut self) -> Option<&'a T> {
        let item = self.get()?;
        self.index += 1;
        Some(item)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = self.end.saturating_sub(self.index);
        (remaining, Some(remaining))
    }
}

impl<T, S: Storage> DoubleEndedIterator for Iter<'_, T, S> {
    fn next_back(&mut self) -> Option<Self::Item> {
        if self.index >= self.end {
            return None;
        }
        self.end -= 1;
        self.array.as_slice().get(self.end)
    }
}

impl<T, S: Storage> ExactSizeIterator for Iter<'_, T, S> {}

impl<T, S: Storage> FusedIterator for Iter<'_, T, S> {}

/// Owning iterator, moving elements out in index order.
pub struct IntoIter<T, S: Storage = Heap> {
    buf: RawBuffer<T, S>,
    front: usize,
    back: usize,
}

impl<T, S: Storage> IntoIter<T, S> {
    /// `buf` must have exactly its first `len` slots constructed.
    pub(crate) fn new(buf: RawBuffer<T, S>, len: usize) -> Self {
        Self {
            buf,
            front: 0,
            back: len,
        }
    }

    /// The elements not yet yielded.
    pub fn as_slice(&self) -> &[T] {
        // SAFETY: slots `[front, back)` are constructed.
        unsafe {
            let live = slot::prefix(&self.buf, self.back);
            &live[self.front..]
        }
    }
}

impl<T, S: Storage> Iterator for IntoIter<T, S> {
    type Item = T;

    fn next(&mut self) -> Option<T> {
        if self.front == self.back {
            return None;
        }
        // SAFETY: `front < back`, so the slot is constructed; advancing
        // `front` marks it vacated.
        let value = unsafe { slot::take_at(&mut self.buf, self.front) };
        self.front += 1;
        Some(value)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = self.back - self.front;
        (remaining, Some(remaining))
    }
}

impl<T, S: Storage> DoubleEndedIterator for IntoIter<T, S> {
    fn next_back(&mut self) -> Option<T> {
        if self.front == self.back {
            return None;
        }
        self.back -= 1;
        // SAFETY: slot `back` was the last constructed slot and is now
        // outside the live range.
        Some(unsafe { slot::take_at(&mut self.buf, self.back) })
    }
}

impl<T, S: Storage> ExactSizeIterator for IntoIter<T, S> {}

impl<T, S: Storage> FusedIterator for IntoIter<T, S> {}

impl<T: fmt::Debug, S: Storage> fmt::Debug for IntoIter<T, S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("IntoIter").field(&self.as_slice()).finish()
    }
}

impl<T, S: Storage> Drop for IntoIter<T, S> {
    fn drop(&mut self) {
        // SAFETY: exactly `[front, back)` is still constructed. The block
        // is released afterwards by the buffer's own drop.
        unsafe { slot::destroy_range(&mut self.buf, self.front, self.back - self.front) }
    }
}
