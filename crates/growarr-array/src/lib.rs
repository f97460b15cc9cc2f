//! Hand-managed growable array over raw storage.
//!
//! [`GrowableArray`] keeps a contiguous block of slots acquired from a
//! [`Storage`] manager. Only the first `size` slots hold live values; the
//! tail is raw memory that is never read or dropped. Capacity transitions
//! follow a load-factor [`GrowthPolicy`](growarr_core::GrowthPolicy).
//!
//! # Architecture
//!
//! ```text
//! GrowableArray<T, S> (public operations, capacity policy)
//! ├── RawBuffer<T, S>  (owning handle: acquire on create, release on drop)
//! │   └── S: Storage   (Heap by default; block acquire/release only)
//! ├── slot             (construct / destroy / transfer inside a block)
//! └── ArrayStats       (cumulative transition counters)
//! ```
//!
//! Block lifetime and element lifetime are separate: a `RawBuffer` never
//! drops elements, and the array never frees memory directly.
//!
//! # Unsafe code
//!
//! `unsafe` is confined to `raw`, `slot`, `array`, and `iter`. Every
//! block carries a `// SAFETY:` comment naming the slot-state invariant
//! it relies on.

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![deny(unsafe_code)]

pub mod array;
pub mod iter;
pub mod raw;
mod slot;
pub mod stats;

// Public re-exports for the primary API surface.
pub use array::GrowableArray;
pub use growarr_core::{AppendError, ArrayError, ConfigError, GrowthPolicy};
pub use iter::{IntoIter, Iter};
pub use raw::{AcquireError, Heap, RawBuffer, Storage};
pub use stats::{ArrayStats, Transition};
