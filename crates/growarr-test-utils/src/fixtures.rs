//! Storage fixtures for exercising allocation-failure paths.

use std::alloc::Layout;
use std::ptr::NonNull;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use growarr_array::{AcquireError, Heap, Storage};

#[derive(Debug, Default)]
struct Ledger {
    attempts: AtomicUsize,
    acquisitions: AtomicUsize,
    releases: AtomicUsize,
    failures: AtomicUsize,
    limit: AtomicUsize,
}

/// Heap-backed storage that refuses every request past a budget.
///
/// Clones share one ledger, so the counters cover every block handed to
/// any array built on this storage. Uses atomics so the storage is `Send`.
#[derive(Clone, Debug)]
pub struct FailingStorage {
    ledger: Arc<Ledger>,
}

impl FailingStorage {
    /// Storage that never refuses.
    pub fn unlimited() -> Self {
        Self::failing_after(usize::MAX)
    }

    /// Storage that grants `succeed_count` requests, then refuses all others.
    pub fn failing_after(succeed_count: usize) -> Self {
        let ledger = Ledger::default();
        ledger.limit.store(succeed_count, Ordering::Relaxed);
        Self {
            ledger: Arc::new(ledger),
        }
    }

    /// Grant exactly `n` more requests from now on.
    pub fn allow_next(&self, n: usize) {
        let attempts = self.ledger.attempts.load(Ordering::Relaxed);
        self.ledger
            .limit
            .store(attempts.saturating_add(n), Ordering::Relaxed);
    }

    /// Refuse every request from now on.
    pub fn refuse_all(&self) {
        self.allow_next(0);
    }

    /// Stop refusing.
    pub fn allow_all(&self) {
        self.ledger.limit.store(usize::MAX, Ordering::Relaxed);
    }

    /// Blocks handed out.
    pub fn acquisitions(&self) -> usize {
        self.ledger.acquisitions.load(Ordering::Relaxed)
    }

    /// Blocks returned.
    pub fn releases(&self) -> usize {
        self.ledger.releases.load(Ordering::Relaxed)
    }

    /// Requests refused.
    pub fn failures(&self) -> usize {
        self.ledger.failures.load(Ordering::Relaxed)
    }

    /// Blocks handed out and not yet returned.
    pub fn live_blocks(&self) -> usize {
        self.acquisitions() - self.releases()
    }
}

#[allow(unsafe_code)]
// SAFETY: every granted block comes from `Heap` and is returned to it.
unsafe impl Storage for FailingStorage {
    unsafe fn acquire(&self, layout: Layout) -> Result<NonNull<u8>, AcquireError> {
        let n = self.ledger.attempts.fetch_add(1, Ordering::Relaxed);
        if n >= self.ledger.limit.load(Ordering::Relaxed) {
            self.ledger.failures.fetch_add(1, Ordering::Relaxed);
            log::debug!("refusing request {n} for {} bytes", layout.size());
            return Err(AcquireError);
        }
        // SAFETY: forwarded precondition (non-zero layout).
        let ptr = unsafe { Heap.acquire(layout) }?;
        self.ledger.acquisitions.fetch_add(1, Ordering::Relaxed);
        Ok(ptr)
    }

    unsafe fn release(&self, ptr: NonNull<u8>, layout: Layout) {
        self.ledger.releases.fetch_add(1, Ordering::Relaxed);
        // SAFETY: forwarded precondition; the block came from `Heap`.
        unsafe { Heap.release(ptr, layout) }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use growarr_array::RawBuffer;

    #[test]
    fn refuses_after_budget() {
        let storage = FailingStorage::failing_after(1);
        let first = RawBuffer::<u32, _>::acquire(4, storage.clone());
        assert!(first.is_ok());
        let second = RawBuffer::<u32, _>::acquire(4, storage.clone());
        assert!(second.is_err());
        assert_eq!(storage.failures(), 1);
        drop(first);
        assert_eq!(storage.live_blocks(), 0);
    }

    #[test]
    fn allow_next_resets_budget() {
        let storage = FailingStorage::unlimited();
        storage.refuse_all();
        assert!(RawBuffer::<u8, _>::acquire(1, storage.clone()).is_err());
        storage.allow_next(1);
        assert!(RawBuffer::<u8, _>::acquire(1, storage.clone()).is_ok());
        assert!(RawBuffer::<u8, _>::acquire(1, storage.clone()).is_err());
        storage.allow_all();
        assert!(RawBuffer::<u8, _>::acquire(1, storage.clone()).is_ok());
        assert_eq!(storage.acquisitions(), storage.releases());
    }

    #[test]
    fn zero_sized_blocks_bypass_storage() {
        let storage = FailingStorage::failing_after(0);
        assert!(RawBuffer::<(), _>::acquire(8, storage.clone()).is_ok());
        assert_eq!(storage.failures(), 0);
    }
}
