//! Arena addresses and function references.

use std::fmt;

/// Location of a stored value within an arena.
///
/// The high 32 bits hold the page index plus one, the low 32 bits the byte
/// offset within that page. The all-zero address is [`Addr::NULL`], the
/// empty-slot sentinel stored in list links, and never names an
/// allocation. Addresses are stable for the arena's lifetime because pages
/// never move or shrink.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Addr(u64);

impl Addr {
    /// The empty-slot sentinel.
    pub const NULL: Addr = Addr(0);

    /// Build the address of `offset` within page `page`.
    ///
    /// # Panics
    ///
    /// Panics if `page` is `u32::MAX`, which has no encoding.
    pub const fn new(page: u32, offset: u32) -> Self {
        assert!(page < u32::MAX, "page index out of range");
        Self((((page as u64) + 1) << 32) | offset as u64)
    }

    /// Reinterpret a raw 64-bit field read from arena memory.
    pub const fn from_raw(raw: u64) -> Self {
        Self(raw)
    }

    /// The raw 64-bit encoding, as written into pointer fields.
    pub const fn raw(self) -> u64 {
        self.0
    }

    /// Whether this is the [`Addr::NULL`] sentinel.
    pub const fn is_null(self) -> bool {
        self.0 == 0
    }

    /// Page index, or `None` for the null address.
    pub const fn page(self) -> Option<u32> {
        match self.0 >> 32 {
            0 => None,
            hi => Some((hi - 1) as u32),
        }
    }

    /// Byte offset within the page.
    pub const fn offset(self) -> u32 {
        self.0 as u32
    }

    /// The address `delta` bytes further into the same page.
    ///
    /// Returns `None` for the null address or if the offset overflows.
    pub fn checked_add(self, delta: u32) -> Option<Self> {
        let page = self.page()?;
        let offset = self.offset().checked_add(delta)?;
        Some(Self::new(page, offset))
    }
}

impl fmt::Display for Addr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "0x{:016x}", self.0)
    }
}

/// A script function reference: the pair stored by a `Function` value.
///
/// Resolving the pair to a callable is the job of a
/// [`FunctionRegistry`](crate::FunctionRegistry).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct FunctionRef {
    /// Index of the library that defines the function.
    pub library: u32,
    /// Index of the function within its library.
    pub index: u32,
}

impl FunctionRef {
    /// Create a new function reference.
    pub const fn new(library: u32, index: u32) -> Self {
        Self { library, index }
    }
}

impl fmt::Display for FunctionRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.library, self.index)
    }
}
