//! Core types for the growarr workspace.
//!
//! This is the leaf crate with zero internal dependencies. It defines
//! the error taxonomy shared by every container operation and the
//! validated [`GrowthPolicy`] that drives capacity transitions.

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

pub mod error;
pub mod policy;

pub use error::{AppendError, ArrayError, ConfigError};
pub use policy::GrowthPolicy;
