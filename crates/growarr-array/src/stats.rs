//! Cumulative capacity-transition counters.
//!
//! [`ArrayStats`] is updated by every block replacement and every refused
//! acquisition. Counters are per instance; a cloned array starts at zero.

use std::fmt;

/// Why a container replaced its block.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Transition {
    /// Load factor reached the growth threshold on append.
    Grow,
    /// Load factor fell to the shrink threshold on removal.
    Shrink,
    /// Explicit `reserve` above the current capacity.
    Reserve,
    /// Explicit `shrink_to_fit`.
    Fit,
}

impl fmt::Display for Transition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let verb = match self {
            Self::Grow => "growing",
            Self::Shrink => "shrinking",
            Self::Reserve => "reserving",
            Self::Fit => "fitting",
        };
        f.write_str(verb)
    }
}

/// Counters describing a container's allocation history.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ArrayStats {
    /// Policy-driven growth transitions.
    pub grow_events: u64,
    /// Policy-driven shrink transitions (including the one `clear` may do).
    pub shrink_events: u64,
    /// Explicit `reserve` transitions.
    pub reserve_events: u64,
    /// Explicit `shrink_to_fit` transitions.
    pub fit_events: u64,
    /// Block requests the storage manager refused.
    pub failed_acquisitions: u64,
    /// Elements moved between blocks across all transitions.
    pub elements_transferred: u64,
    /// Largest capacity ever held.
    pub peak_capacity: usize,
}

impl ArrayStats {
    /// Fresh counters for a container that starts at `capacity`.
    pub fn starting_at(capacity: usize) -> Self {
        Self {
            peak_capacity: capacity,
            ..Self::default()
        }
    }

    /// Total number of block replacements.
    pub fn transitions(&self) -> u64 {
        self.grow_events + self.shrink_events + self.reserve_events + self.fit_events
    }

    pub(crate) fn record(&mut self, transition: Transition, new_capacity: usize, moved: usize) {
        match transition {
            Transition::Grow => self.grow_events += 1,
            Transition::Shrink => self.shrink_events += 1,
            Transition::Reserve => self.reserve_events += 1,
            Transition::Fit => self.fit_events += 1,
        }
        self.elements_transferred += moved as u64;
        self.peak_capacity = self.peak_capacity.max(new_capacity);
    }

    pub(crate) fn record_failure(&mut self) {
        self.failed_acquisitions += 1;
    }
}
