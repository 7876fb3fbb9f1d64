//! Test utilities and mock types for sevm development.
//!
//! Provides [`MockRegistry`], an implementation of both registry traits
//! ([`FunctionRegistry`], [`NativeRegistry`]) over insertion-ordered maps,
//! and fixture builders in [`fixtures`] for common arena shapes.

#![forbid(unsafe_code)]
#![allow(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]

pub mod fixtures;

use indexmap::IndexMap;

use sevm_core::{FunctionRef, FunctionRegistry, NativeRegistry};

/// Mock host registry.
///
/// Entities are plain names, so tests can assert on which one a stored
/// index resolved to. Native objects and native functions share no index
/// space.
pub struct MockRegistry {
    functions: IndexMap<FunctionRef, String>,
    objects: IndexMap<u32, String>,
    natives: IndexMap<u32, String>,
}

impl MockRegistry {
    pub fn new() -> Self {
        Self {
            functions: IndexMap::new(),
            objects: IndexMap::new(),
            natives: IndexMap::new(),
        }
    }

    /// Register a script function under `(library, index)`.
    pub fn with_function(mut self, library: u32, index: u32, name: impl Into<String>) -> Self {
        self.functions
            .insert(FunctionRef::new(library, index), name.into());
        self
    }

    /// Register a host object under `index`.
    pub fn with_object(mut self, index: u32, name: impl Into<String>) -> Self {
        self.objects.insert(index, name.into());
        self
    }

    /// Register a host function under `index`.
    pub fn with_native_function(mut self, index: u32, name: impl Into<String>) -> Self {
        self.natives.insert(index, name.into());
        self
    }

    /// Total registered entities across all three tables.
    pub fn len(&self) -> usize {
        self.functions.len() + self.objects.len() + self.natives.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Default for MockRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl FunctionRegistry for MockRegistry {
    type Function = String;

    fn function(&self, reference: FunctionRef) -> Option<&String> {
        self.functions.get(&reference)
    }
}

impl NativeRegistry for MockRegistry {
    type Object = String;
    type Function = String;

    fn native_object(&self, index: u32) -> Option<&String> {
        self.objects.get(&index)
    }

    fn native_function(&self, index: u32) -> Option<&String> {
        self.natives.get(&index)
    }
}
