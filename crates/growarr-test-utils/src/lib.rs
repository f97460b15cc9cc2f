//! Test utilities and instrumented types for growarr development.
//!
//! Provides a storage manager that refuses blocks on demand
//! ([`FailingStorage`]), element types that count their own clones and
//! drops ([`DropCounter`], [`Tracked`], [`PanicOnClone`]), and a one-line
//! logger setup for tests that want to see capacity transitions.

#![deny(unsafe_code)]
#![allow(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]

pub mod fixtures;

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

pub use fixtures::FailingStorage;

/// Install a `simple_logger` at `Trace` level for the current test binary.
///
/// Safe to call from every test; only the first call installs a logger.
pub fn init_test_logging() {
    let _ = simple_logger::SimpleLogger::new()
        .without_timestamps()
        .with_level(log::LevelFilter::Trace)
        .init();
}

/// Shared ledger of [`Tracked`] values: how many were made, cloned, dropped.
#[derive(Clone, Debug, Default)]
pub struct DropCounter {
    created: Arc<AtomicUsize>,
    clones: Arc<AtomicUsize>,
    drops: Arc<AtomicUsize>,
}

impl DropCounter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a tracked value carrying `id`.
    pub fn tracked(&self, id: usize) -> Tracked {
        self.created.fetch_add(1, Ordering::Relaxed);
        Tracked {
            id,
            counter: self.clone(),
        }
    }

    /// Values created directly or by cloning.
    pub fn created(&self) -> usize {
        self.created.load(Ordering::Relaxed)
    }

    pub fn clones(&self) -> usize {
        self.clones.load(Ordering::Relaxed)
    }

    pub fn drops(&self) -> usize {
        self.drops.load(Ordering::Relaxed)
    }

    /// Values currently alive. Zero once everything has been cleaned up.
    pub fn live(&self) -> usize {
        self.created() - self.drops()
    }
}

/// A value that reports its clones and drops to a [`DropCounter`].
#[derive(Debug)]
pub struct Tracked {
    pub id: usize,
    counter: DropCounter,
}

impl Clone for Tracked {
    fn clone(&self) -> Self {
        self.counter.clones.fetch_add(1, Ordering::Relaxed);
        self.counter.tracked(self.id)
    }
}

impl PartialEq for Tracked {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Drop for Tracked {
    fn drop(&mut self) {
        self.counter.drops.fetch_add(1, Ordering::Relaxed);
    }
}

/// Number of clones a group of [`PanicOnClone`] values may still make.
#[derive(Clone, Debug)]
pub struct CloneBudget(Arc<AtomicUsize>);

impl CloneBudget {
    pub fn new(allowed: usize) -> Self {
        Self(Arc::new(AtomicUsize::new(allowed)))
    }

    pub fn remaining(&self) -> usize {
        self.0.load(Ordering::Relaxed)
    }

    fn spend(&self) -> bool {
        self.0
            .fetch_update(Ordering::Relaxed, Ordering::Relaxed, |n| n.checked_sub(1))
            .is_ok()
    }
}

/// A tracked value whose `clone` panics once its shared budget runs out.
#[derive(Debug)]
pub struct PanicOnClone {
    pub inner: Tracked,
    budget: CloneBudget,
}

impl PanicOnClone {
    pub fn new(inner: Tracked, budget: &CloneBudget) -> Self {
        Self {
            inner,
            budget: budget.clone(),
        }
    }
}

impl Clone for PanicOnClone {
    fn clone(&self) -> Self {
        if !self.budget.spend() {
            panic!("clone budget exhausted at element {}", self.inner.id);
        }
        Self {
            inner: self.inner.clone(),
            budget: self.budget.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tracked_values_balance() {
        let counter = DropCounter::new();
        let a = counter.tracked(1);
        let b = a.clone();
        assert_eq!(counter.created(), 2);
        assert_eq!(counter.clones(), 1);
        drop(a);
        drop(b);
        assert_eq!(counter.drops(), 2);
        assert_eq!(counter.live(), 0);
    }

    #[test]
    fn clone_budget_runs_out() {
        let counter = DropCounter::new();
        let budget = CloneBudget::new(1);
        let v = PanicOnClone::new(counter.tracked(7), &budget);
        let first = v.clone();
        assert_eq!(budget.remaining(), 0);
        let result = std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| v.clone()));
        assert!(result.is_err());
        drop(v);
        drop(first);
        assert_eq!(counter.live(), 0);
    }
}
