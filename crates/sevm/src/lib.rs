//! sevm: the value and memory substrate of an embeddable interpreter runtime.
//!
//! This is the top-level facade crate that re-exports the public API from
//! the sevm sub-crates. Adding `sevm` as a single dependency is enough for
//! most embedders.
//!
//! # Quick start
//!
//! ```rust
//! use sevm::prelude::*;
//!
//! let mut arena = Arena::new();
//! let mut obj = Object::create(&mut arena).unwrap();
//! obj.add_key(&mut arena, "name").unwrap();
//! let name = arena.create_string("lucky").unwrap();
//! obj.set_value(&mut arena, "name", name).unwrap();
//!
//! let got = obj.get_value(&arena, "name").unwrap();
//! assert_eq!(arena.read_as_string(got).unwrap(), "lucky");
//! ```
//!
//! # Modules
//!
//! | Module | Sub-crate | Contents |
//! |--------|-----------|----------|
//! | [`arena`] | `sevm-arena` | Arena, handles, coercion, lists, objects |
//! | [`types`] | `sevm-core` | Value kinds, addresses, errors, registry traits |

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

/// Paged value storage (`sevm-arena`).
///
/// [`arena::Arena`] owns all memory; [`arena::List`] and
/// [`arena::Object`] are cached views over arena-resident structures.
pub use sevm_arena as arena;

/// Value kinds, addresses, and errors (`sevm-core`).
///
/// Also holds the registry traits ([`types::FunctionRegistry`],
/// [`types::NativeRegistry`]) an embedder implements to resolve stored
/// indices.
pub use sevm_core as types;

/// Common imports for typical sevm usage.
///
/// ```rust
/// use sevm::prelude::*;
/// ```
pub mod prelude {
    pub use sevm_arena::{Arena, ArenaConfig, Handle, List, Object, Source};
    pub use sevm_core::{
        Addr, FunctionRef, FunctionRegistry, MemoryError, NativeRegistry, ValueKind,
    };
}
