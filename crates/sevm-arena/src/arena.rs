//! The value arena: page ownership and tagged value creation.
//!
//! [`Arena`] is the sole owner of every byte it hands out. Values are
//! created through `create_*` methods that reserve `1 + payload` bytes,
//! write the tag and payload, and return a [`Handle`]. Nothing is ever
//! freed individually; dropping the arena releases every page at once.

use sevm_core::kind::{
    BYTE_SIZE, DOUBLE_SIZE, FLOAT_SIZE, FUNCTION_SIZE, INTEGER_SIZE, LONG_SIZE,
    NATIVE_FUNCTION_SIZE, NATIVE_OBJECT_SIZE, STRING_PREFIX_SIZE, TAG_SIZE,
};
use sevm_core::{Addr, MemoryError, ValueKind};
use tracing::{debug, trace};

use crate::codec;
use crate::config::ArenaConfig;
use crate::handle::{Descriptor, Handle};
use crate::page::PageList;

/// A growable, paged arena of tagged values.
///
/// Single-threaded by construction: every mutation takes `&mut self`, and
/// handles carry no borrow, so sharing an arena across threads requires
/// the caller's own synchronisation.
pub struct Arena {
    pub(crate) pages: PageList,
    config: ArenaConfig,
    /// Bumped on every structural list write; see [`Arena::generation`].
    generation: u64,
}

impl Arena {
    /// Create an arena with the default configuration.
    pub fn new() -> Self {
        let config = ArenaConfig::default();
        Self {
            pages: PageList::new(config.page_size, config.max_bytes),
            config,
            generation: 0,
        }
    }

    /// Create an arena with a validated configuration.
    pub fn with_config(config: ArenaConfig) -> Result<Self, MemoryError> {
        config.validate()?;
        Ok(Self {
            pages: PageList::new(config.page_size, config.max_bytes),
            config,
            generation: 0,
        })
    }

    /// The configuration this arena was built with.
    pub fn config(&self) -> &ArenaConfig {
        &self.config
    }

    // ── Creation ────────────────────────────────────────────────

    /// Reserve `1 + size` bytes and write the tag.
    pub(crate) fn alloc_value(
        &mut self,
        kind: ValueKind,
        size: u32,
    ) -> Result<Descriptor, MemoryError> {
        let addr = self.pages.reserve(TAG_SIZE as usize + size as usize)?;
        codec::write_u8(&mut self.pages, addr, kind.tag())?;
        trace!(%kind, size, %addr, "created value");
        Ok(Descriptor::new(kind, size, addr))
    }

    /// Allocate a stored `None` value (a lone tag byte).
    ///
    /// Unlike [`Handle::none`], the result has a real address.
    pub fn create_none(&mut self) -> Result<Handle, MemoryError> {
        self.alloc_value(ValueKind::None, 0).map(Handle::Stored)
    }

    /// Create a `Byte` value.
    pub fn create_byte(&mut self, content: u8) -> Result<Handle, MemoryError> {
        let desc = self.alloc_value(ValueKind::Byte, BYTE_SIZE)?;
        codec::write_u8(&mut self.pages, desc.payload_addr(), content)?;
        Ok(Handle::Stored(desc))
    }

    /// Create an `Integer` (signed 32-bit) value.
    pub fn create_integer(&mut self, content: i32) -> Result<Handle, MemoryError> {
        let desc = self.alloc_value(ValueKind::Integer, INTEGER_SIZE)?;
        codec::write_i32_le(&mut self.pages, desc.payload_addr(), content)?;
        Ok(Handle::Stored(desc))
    }

    /// Create a `Long` (signed 64-bit) value.
    pub fn create_long(&mut self, content: i64) -> Result<Handle, MemoryError> {
        let desc = self.alloc_value(ValueKind::Long, LONG_SIZE)?;
        codec::write_i64_le(&mut self.pages, desc.payload_addr(), content)?;
        Ok(Handle::Stored(desc))
    }

    /// Create a `Float` value.
    pub fn create_float(&mut self, content: f32) -> Result<Handle, MemoryError> {
        let desc = self.alloc_value(ValueKind::Float, FLOAT_SIZE)?;
        codec::write_f32_le(&mut self.pages, desc.payload_addr(), content)?;
        Ok(Handle::Stored(desc))
    }

    /// Create a `Double` value.
    pub fn create_double(&mut self, content: f64) -> Result<Handle, MemoryError> {
        let desc = self.alloc_value(ValueKind::Double, DOUBLE_SIZE)?;
        codec::write_f64_le(&mut self.pages, desc.payload_addr(), content)?;
        Ok(Handle::Stored(desc))
    }

    /// Create a `String` value holding a copy of `content`.
    ///
    /// The handle's size is the UTF-8 byte count plus the 4-byte prefix.
    pub fn create_string(&mut self, content: &str) -> Result<Handle, MemoryError> {
        let size = u32::try_from(content.len())
            .ok()
            .and_then(|len| len.checked_add(STRING_PREFIX_SIZE))
            .ok_or(MemoryError::AllocationFailed {
                requested: content.len(),
                reserved: self.pages.reserved_bytes(),
            })?;
        let desc = self.alloc_value(ValueKind::String, size)?;
        codec::write_length_prefixed_str(&mut self.pages, desc.addr(), content)?;
        Ok(Handle::Stored(desc))
    }

    /// Create a `Function` reference to function `index` of library `library`.
    pub fn create_function(&mut self, library: u32, index: u32) -> Result<Handle, MemoryError> {
        let desc = self.alloc_value(ValueKind::Function, FUNCTION_SIZE)?;
        codec::write_u32_le(
            &mut self.pages,
            codec::field(desc.addr(), codec::FUNCTION_LIBRARY)?,
            library,
        )?;
        codec::write_u32_le(
            &mut self.pages,
            codec::field(desc.addr(), codec::FUNCTION_INDEX)?,
            index,
        )?;
        Ok(Handle::Stored(desc))
    }

    /// Create a `NativeObject` holding a host registry index.
    pub fn create_native_object(&mut self, index: u32) -> Result<Handle, MemoryError> {
        let desc = self.alloc_value(ValueKind::NativeObject, NATIVE_OBJECT_SIZE)?;
        codec::write_u32_le(&mut self.pages, desc.payload_addr(), index)?;
        Ok(Handle::Stored(desc))
    }

    /// Create a `NativeFunction` holding a host registry index.
    pub fn create_native_function(&mut self, index: u32) -> Result<Handle, MemoryError> {
        let desc = self.alloc_value(ValueKind::NativeFunction, NATIVE_FUNCTION_SIZE)?;
        codec::write_u32_le(&mut self.pages, desc.payload_addr(), index)?;
        Ok(Handle::Stored(desc))
    }

    // ── Decode ──────────────────────────────────────────────────

    /// Rebuild a handle from a stored address by reading its tag.
    ///
    /// [`Addr::NULL`] is the empty-slot sentinel and decodes to
    /// [`Handle::none`]. Any other address must name the start of a value
    /// this arena allocated.
    pub fn decode(&self, addr: Addr) -> Result<Handle, MemoryError> {
        if addr.is_null() {
            return Ok(Handle::none());
        }
        codec::decode(&self.pages, addr).map(Handle::Stored)
    }

    // ── Counters ────────────────────────────────────────────────

    /// Cumulative bytes reserved across every page.
    pub fn space_occupied(&self) -> usize {
        self.pages.reserved_bytes()
    }

    /// Capacity of the active page (0 before the first allocation).
    pub fn page_size(&self) -> usize {
        self.pages.active_size()
    }

    /// Bytes used in the active page.
    pub fn offset(&self) -> usize {
        self.pages.active_offset()
    }

    /// Number of pages opened so far.
    pub fn page_count(&self) -> usize {
        self.pages.page_count()
    }

    /// Reserved bytes minus the unused tail of the active page.
    ///
    /// Abandoned tails of earlier pages still count as in use.
    pub fn bytes_in_use(&self) -> usize {
        self.space_occupied() - self.page_size() + self.offset()
    }

    /// Structural write counter.
    ///
    /// Every append or content rewrite on any list bumps this value. List
    /// wrappers record the generation their cache was built at and rebuild
    /// before serving a read if it has moved on.
    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub(crate) fn bump_generation(&mut self) {
        self.generation = self.generation.wrapping_add(1);
    }
}

impl Default for Arena {
    fn default() -> Self {
        Self::new()
    }
}

impl Drop for Arena {
    fn drop(&mut self) {
        debug!(
            pages = self.pages.page_count(),
            reserved = self.pages.reserved_bytes(),
            "released arena"
        );
    }
}
