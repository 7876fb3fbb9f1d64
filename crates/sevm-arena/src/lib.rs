//! Paged, tagged value arena for the sevm runtime.
//!
//! Stores dynamically-typed values as tag-prefixed byte sequences in a
//! growable list of pages, behind copyable [`Handle`]s. There is no
//! collector: values live until the [`Arena`] is dropped.
//!
//! # Architecture
//!
//! ```text
//! Arena
//! ├── PageList → Page[] (bump-allocated Vec<u8>, 4 KiB standard)
//! ├── codec (tag + little-endian payload, decode by tag)
//! ├── assign / arith (coercion engine, in-place Double arithmetic)
//! ├── List  (header + linked item nodes, cached host-side)
//! └── Object (keys List + values List in lockstep)
//! ```
//!
//! # Memory safety
//!
//! Every page is a zero-filled `Vec<u8>`. Addresses are resolved to
//! slices through bounds-checked lookups, so a foreign or stale address
//! yields [`MemoryError::InvalidAddress`] rather than undefined behaviour.
//! No `unsafe` code is used.

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![deny(unsafe_code)]

pub mod access;
pub mod arena;
pub mod arith;
pub mod assign;
mod codec;
pub mod config;
pub mod handle;
pub mod list;
pub mod object;
pub mod page;

// Public re-exports for the primary API surface.
pub use arena::Arena;
pub use assign::Source;
pub use config::ArenaConfig;
pub use handle::{Descriptor, Handle};
pub use list::List;
pub use object::Object;

pub use sevm_core::{Addr, FunctionRef, MemoryError, ValueKind};
