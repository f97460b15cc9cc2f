//! Error types for growarr containers.
//!
//! Two families: [`ArrayError`] for container operations (precondition
//! violations and storage exhaustion) and [`ConfigError`] for growth
//! policy validation at construction time. [`AppendError`] wraps an
//! `ArrayError` together with the value an append could not place.

use std::error::Error;
use std::fmt;

/// Errors from container operations.
///
/// `IndexOutOfRange` and `EmptyContainer` are precondition violations and
/// are signaled at the call site. `OutOfMemory` and `CapacityOverflow` are
/// recoverable: the container is left exactly as it was before the call.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ArrayError {
    /// Access at an index that does not hold a live element.
    IndexOutOfRange {
        /// The rejected index.
        index: usize,
        /// Number of live elements at the time of the call.
        size: usize,
    },
    /// Removal from a container with no live elements.
    EmptyContainer,
    /// The storage manager could not supply a block of the requested size.
    OutOfMemory {
        /// Slot count of the block that was requested.
        requested_capacity: usize,
        /// Byte size of the block that was requested.
        bytes: usize,
    },
    /// The byte size of the requested block does not fit in `isize`.
    CapacityOverflow {
        /// Slot count of the block that was requested.
        requested_capacity: usize,
    },
}

impl ArrayError {
    /// Whether the error is a storage failure the caller may recover from.
    ///
    /// Precondition violations indicate a caller bug and return `false`.
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            Self::OutOfMemory { .. } | Self::CapacityOverflow { .. }
        )
    }
}

impl fmt::Display for ArrayError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::IndexOutOfRange { index, size } => {
                write!(f, "index {index} out of range for size {size}")
            }
            Self::EmptyContainer => write!(f, "container is empty"),
            Self::OutOfMemory {
                requested_capacity,
                bytes,
            } => {
                write!(
                    f,
                    "out of memory: requested {requested_capacity} slots ({bytes} bytes)"
                )
            }
            Self::CapacityOverflow { requested_capacity } => {
                write!(f, "capacity overflow: {requested_capacity} slots")
            }
        }
    }
}

impl Error for ArrayError {}

/// A failed append, carrying the rejected value back to the caller.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AppendError<T> {
    /// Why the container could not make room.
    pub error: ArrayError,
    /// The value that was not appended.
    pub value: T,
}

impl<T> AppendError<T> {
    /// Recover the rejected value.
    pub fn into_value(self) -> T {
        self.value
    }
}

impl<T> fmt::Display for AppendError<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "append rejected: {}", self.error)
    }
}

impl<T: fmt::Debug> Error for AppendError<T> {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        Some(&self.error)
    }
}

/// Errors detected during [`GrowthPolicy::validate()`](crate::GrowthPolicy::validate)
/// or while constructing a container from a policy.
#[derive(Clone, Debug, PartialEq)]
pub enum ConfigError {
    /// `max_load_factor` is NaN, non-positive, or above 1.0.
    InvalidMaxLoadFactor {
        /// The rejected value.
        value: f64,
    },
    /// `min_load_factor` is NaN, negative, or leaves no hysteresis gap
    /// below `max_load_factor / resize_factor`.
    InvalidMinLoadFactor {
        /// The rejected value.
        value: f64,
        /// Exclusive upper bound the value had to stay under.
        limit: f64,
    },
    /// `resize_factor` is below 2.
    InvalidResizeFactor {
        /// The rejected value.
        value: usize,
    },
    /// The policy was valid but the initial block could not be acquired.
    Allocation(ArrayError),
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidMaxLoadFactor { value } => {
                write!(f, "max_load_factor must be in (0.0, 1.0], got {value}")
            }
            Self::InvalidMinLoadFactor { value, limit } => {
                write!(f, "min_load_factor must be in [0.0, {limit}), got {value}")
            }
            Self::InvalidResizeFactor { value } => {
                write!(f, "resize_factor must be at least 2, got {value}")
            }
            Self::Allocation(e) => write!(f, "allocation: {e}"),
        }
    }
}

impl Error for ConfigError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Allocation(e) => Some(e),
            _ => None,
        }
    }
}

impl From<ArrayError> for ConfigError {
    fn from(e: ArrayError) -> Self {
        Self::Allocation(e)
    }
}
