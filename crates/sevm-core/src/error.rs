//! Error type for arena operations.
//!
//! Every failure is surfaced to the caller immediately; nothing is retried
//! and no operation leaves a half-written value behind. Coercion failures
//! are detected from the kind pair before any byte is touched.

use std::error::Error;
use std::fmt;

use crate::addr::Addr;
use crate::kind::ValueKind;

/// Result alias used throughout the sevm crates.
pub type Result<T> = std::result::Result<T, MemoryError>;

/// Errors that can occur while creating, reading, or mutating values.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum MemoryError {
    /// A list index was at or past the list's count.
    OutOfBounds {
        /// The requested index.
        index: usize,
        /// The number of items in the list.
        count: usize,
    },
    /// An object lookup named a key the object does not have.
    KeyNotFound {
        /// The missing key.
        key: String,
    },
    /// Assignment or arithmetic between an unsupported pair of kinds.
    UnsupportedCoercion {
        /// Kind of the slot being written.
        target: ValueKind,
        /// Kind of the value being written into it.
        source: ValueKind,
    },
    /// A read or rendering was asked of a kind that has no such form.
    UnsupportedSourceType {
        /// The kind that could not be read.
        kind: ValueKind,
    },
    /// The page allocator could not reserve memory.
    AllocationFailed {
        /// Number of bytes requested for the new page.
        requested: usize,
        /// Bytes already reserved by the arena.
        reserved: usize,
    },
    /// An address outside every allocated region of the arena.
    InvalidAddress {
        /// The offending address.
        addr: Addr,
    },
    /// Decode found a tag byte that names no known kind.
    UnknownTag {
        /// The tag byte read.
        tag: u8,
        /// Where it was read.
        addr: Addr,
    },
    /// A handle of the wrong kind was passed where a specific kind is required.
    KindMismatch {
        /// The kind the operation requires.
        expected: ValueKind,
        /// The kind of the handle supplied.
        found: ValueKind,
    },
    /// Arena configuration was rejected.
    InvalidConfig {
        /// Why the configuration is invalid.
        reason: String,
    },
}

impl fmt::Display for MemoryError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::OutOfBounds { index, count } => {
                write!(f, "index {index} out of bounds for list of {count} items")
            }
            Self::KeyNotFound { key } => write!(f, "key '{key}' not found in object"),
            Self::UnsupportedCoercion { target, source } => {
                write!(f, "cannot assign a {source} value to a {target} slot")
            }
            Self::UnsupportedSourceType { kind } => {
                write!(f, "unsupported source type {kind}")
            }
            Self::AllocationFailed {
                requested,
                reserved,
            } => {
                write!(
                    f,
                    "page allocation failed: requested {requested} bytes with {reserved} bytes reserved"
                )
            }
            Self::InvalidAddress { addr } => write!(f, "invalid arena address {addr}"),
            Self::UnknownTag { tag, addr } => {
                write!(f, "unknown value tag {tag:#04x} at {addr}")
            }
            Self::KindMismatch { expected, found } => {
                write!(f, "expected a {expected} value, found {found}")
            }
            Self::InvalidConfig { reason } => write!(f, "invalid arena config: {reason}"),
        }
    }
}

impl Error for MemoryError {}
