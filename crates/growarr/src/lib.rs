//! Growarr: a contiguous, dynamically-resized sequence built on raw storage.
//!
//! This is the top-level facade crate that re-exports the public API from
//! the growarr sub-crates. Adding `growarr` as a single dependency is
//! enough for most users.
//!
//! # Quick start
//!
//! ```rust
//! use growarr::prelude::*;
//!
//! let mut a = GrowableArray::with_expected_size(2);
//! for i in 0..6 {
//!     a.append(i).unwrap();
//! }
//! assert_eq!(a.to_string(), "capacity: 16 size: 6 vector: < 0 1 2 3 4 5 >");
//!
//! assert_eq!(a.remove_last(), Ok(5));
//! assert_eq!(a.at(9), Err(ArrayError::IndexOutOfRange { index: 9, size: 5 }));
//!
//! // Capacity policy is configurable; shrinking can be switched off.
//! let mut keep = GrowableArray::with_policy(GrowthPolicy::without_shrink()).unwrap();
//! keep.extend(0..100);
//! keep.clear();
//! assert_eq!(keep.capacity(), 256);
//! ```
//!
//! # Modules
//!
//! | Module | Sub-crate | Contents |
//! |--------|-----------|----------|
//! | [`types`] | `growarr-core` | Error types and the growth policy |
//! | [`array`] | `growarr-array` | The array, its iterators, and the storage seam |

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

/// Error types and the load-factor growth policy (`growarr-core`).
pub use growarr_core as types;

/// The growable array and its storage layer (`growarr-array`).
///
/// Most users only need [`array::GrowableArray`]. Implement
/// [`array::Storage`] to draw blocks from somewhere other than the global
/// allocator.
pub use growarr_array as array;

/// Common imports for typical growarr usage.
///
/// ```rust
/// use growarr::prelude::*;
/// ```
pub mod prelude {
    pub use growarr_array::{ArrayStats, GrowableArray};
    pub use growarr_core::{AppendError, ArrayError, ConfigError, GrowthPolicy};
}
