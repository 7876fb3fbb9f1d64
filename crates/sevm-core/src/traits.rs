//! Registry traits for resolving stored indices to host entities.
//!
//! The arena only stores and returns indices for `Function`, `NativeObject`
//! and `NativeFunction` values. Embedders implement these traits over
//! whatever tables hold the real entities.

use crate::addr::FunctionRef;

/// Resolves script function references.
pub trait FunctionRegistry {
    /// The entity a function reference resolves to.
    type Function;

    /// Look up a function by its (library, function) pair.
    ///
    /// Returns `None` if nothing is registered under the pair.
    fn function(&self, reference: FunctionRef) -> Option<&Self::Function>;
}

/// Resolves opaque host object and host function registry indices.
pub trait NativeRegistry {
    /// The host object type.
    type Object;
    /// The host function type.
    type Function;

    /// Look up a host object by registry index.
    fn native_object(&self, index: u32) -> Option<&Self::Object>;

    /// Look up a host function by registry index.
    fn native_function(&self, index: u32) -> Option<&Self::Function>;
}
