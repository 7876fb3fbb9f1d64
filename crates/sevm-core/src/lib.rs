//! Core types for the sevm value arena.
//!
//! This is the leaf crate with zero internal dependencies. It defines the
//! vocabulary shared by the arena and its embedders: the tagged value kind
//! table, arena addresses, function references, the error type, and the
//! registry traits through which host entities are resolved.

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

pub mod addr;
pub mod error;
pub mod kind;
pub mod traits;

pub use addr::{Addr, FunctionRef};
pub use error::{MemoryError, Result};
pub use kind::ValueKind;
pub use traits::{FunctionRegistry, NativeRegistry};
