//! Value handles and stored-value descriptors.
//!
//! A [`Handle`] is a transient, copyable view of a value. It never owns
//! memory: any number of handles may name the same address, and all of
//! them stay valid until the arena that issued them is dropped. Every
//! dereference goes through the arena, which bounds-checks the address.

use std::fmt;

use sevm_core::kind::TAG_SIZE;
use sevm_core::{Addr, MemoryError, ValueKind};

/// Location and shape of a value stored in arena memory.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Descriptor {
    kind: ValueKind,
    /// Payload size in bytes, excluding the tag.
    size: u32,
    addr: Addr,
}

impl Descriptor {
    pub(crate) const fn new(kind: ValueKind, size: u32, addr: Addr) -> Self {
        Self { kind, size, addr }
    }

    /// The stored value's kind.
    pub fn kind(&self) -> ValueKind {
        self.kind
    }

    /// Payload size in bytes, excluding the tag.
    pub fn size(&self) -> u32 {
        self.size
    }

    /// Address of the tag byte.
    pub fn addr(&self) -> Addr {
        self.addr
    }

    /// Address of the first payload byte (`addr + 1`).
    ///
    /// For fixed-size numeric kinds this is where the number lives.
    pub fn payload_addr(&self) -> Addr {
        self.addr.checked_add(TAG_SIZE).unwrap_or(Addr::NULL)
    }
}

/// A typed view over a value.
///
/// Small numeric literals travel as [`Handle::Immediate`] without touching
/// the arena; everything else is [`Handle::Stored`]. The empty slot of a
/// list or object is a stored `None` handle at [`Addr::NULL`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Handle {
    /// An immediate 64-bit integer carried in the handle itself.
    Immediate(i64),
    /// A value that lives in arena memory.
    Stored(Descriptor),
}

impl Handle {
    /// The empty-slot handle: kind `None`, no storage.
    pub const fn none() -> Self {
        Self::Stored(Descriptor::new(ValueKind::None, 0, Addr::NULL))
    }

    /// An immediate integer handle.
    pub const fn immediate(value: i64) -> Self {
        Self::Immediate(value)
    }

    /// The value's kind; immediates report [`ValueKind::Value`].
    pub fn kind(&self) -> ValueKind {
        match self {
            Self::Immediate(_) => ValueKind::Value,
            Self::Stored(desc) => desc.kind,
        }
    }

    /// Payload size in bytes; zero for immediates.
    pub fn size(&self) -> u32 {
        match self {
            Self::Immediate(_) => 0,
            Self::Stored(desc) => desc.size,
        }
    }

    /// Address of the stored value; [`Addr::NULL`] for immediates and empty slots.
    pub fn addr(&self) -> Addr {
        match self {
            Self::Immediate(_) => Addr::NULL,
            Self::Stored(desc) => desc.addr,
        }
    }

    /// The descriptor, if this handle names stored memory.
    pub fn descriptor(&self) -> Option<Descriptor> {
        match self {
            Self::Immediate(_) => None,
            Self::Stored(desc) if desc.addr.is_null() => None,
            Self::Stored(desc) => Some(*desc),
        }
    }

    /// Whether the handle is of kind `None` (empty slot or stored None).
    pub fn is_none(&self) -> bool {
        self.kind() == ValueKind::None
    }

    /// The immediate integer carried by a `Value` handle.
    pub fn value(&self) -> Result<i64, MemoryError> {
        match self {
            Self::Immediate(v) => Ok(*v),
            Self::Stored(desc) => Err(MemoryError::KindMismatch {
                expected: ValueKind::Value,
                found: desc.kind,
            }),
        }
    }

    /// The descriptor of a stored handle of exactly `kind`.
    pub(crate) fn require(&self, kind: ValueKind) -> Result<Descriptor, MemoryError> {
        match self.descriptor() {
            Some(desc) if desc.kind == kind => Ok(desc),
            _ => Err(MemoryError::KindMismatch {
                expected: kind,
                found: self.kind(),
            }),
        }
    }
}

impl Default for Handle {
    fn default() -> Self {
        Self::none()
    }
}

impl From<i64> for Handle {
    fn from(value: i64) -> Self {
        Self::Immediate(value)
    }
}

impl fmt::Display for Handle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Immediate(v) => write!(f, "{{Type:\"Value\", Size:0, Content:{v}}}"),
            Self::Stored(desc) => write!(
                f,
                "{{Type:\"{}\", Size:{}, Addr:{}}}",
                desc.kind, desc.size, desc.addr
            ),
        }
    }
}
