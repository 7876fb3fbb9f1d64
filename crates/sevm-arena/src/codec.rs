//! Binary layout of stored values.
//!
//! Every value is a one-byte [`ValueKind`] tag followed by its payload.
//! All integers and floats are little-endian; pointer fields are the raw
//! 64-bit [`Addr`] encoding. Strings carry a `u32` byte-count prefix ahead
//! of their UTF-8 bytes. No alignment padding is ever inserted.
//!
//! ```text
//! List      [0x11][first: u64][last: u64][count: u32]
//! ListItem  [0x12][content: u64][next: u64]
//! Object    [0x13][keys: u64][values: u64]
//! Function  [0x14][library: u32][index: u32]
//! String    [0x06][len: u32][bytes; len]
//! ```

use sevm_core::kind::{STRING_PREFIX_SIZE, TAG_SIZE};
use sevm_core::{Addr, MemoryError, ValueKind};

use crate::handle::Descriptor;
use crate::page::PageList;

/// Offset of the payload (and of every kind's first field).
pub(crate) const PAYLOAD: u32 = TAG_SIZE;

pub(crate) const LIST_FIRST: u32 = 1;
pub(crate) const LIST_LAST: u32 = 9;
pub(crate) const LIST_COUNT: u32 = 17;

pub(crate) const ITEM_CONTENT: u32 = 1;
pub(crate) const ITEM_NEXT: u32 = 9;

pub(crate) const OBJECT_KEYS: u32 = 1;
pub(crate) const OBJECT_VALUES: u32 = 9;

pub(crate) const FUNCTION_LIBRARY: u32 = 1;
pub(crate) const FUNCTION_INDEX: u32 = 5;

pub(crate) const STRING_BYTES: u32 = TAG_SIZE + STRING_PREFIX_SIZE;

/// The address of the field `delta` bytes into the value at `addr`.
pub(crate) fn field(addr: Addr, delta: u32) -> Result<Addr, MemoryError> {
    addr.checked_add(delta)
        .ok_or(MemoryError::InvalidAddress { addr })
}

fn read_array<const N: usize>(pages: &PageList, addr: Addr) -> Result<[u8; N], MemoryError> {
    let mut buf = [0u8; N];
    buf.copy_from_slice(pages.slice(addr, N)?);
    Ok(buf)
}

fn write_array<const N: usize>(
    pages: &mut PageList,
    addr: Addr,
    bytes: [u8; N],
) -> Result<(), MemoryError> {
    pages.slice_mut(addr, N)?.copy_from_slice(&bytes);
    Ok(())
}

// ── Primitive readers ───────────────────────────────────────────

/// Read a single byte.
pub(crate) fn read_u8(pages: &PageList, addr: Addr) -> Result<u8, MemoryError> {
    Ok(read_array::<1>(pages, addr)?[0])
}

/// Read a little-endian u32.
pub(crate) fn read_u32_le(pages: &PageList, addr: Addr) -> Result<u32, MemoryError> {
    read_array(pages, addr).map(u32::from_le_bytes)
}

/// Read a little-endian i32.
pub(crate) fn read_i32_le(pages: &PageList, addr: Addr) -> Result<i32, MemoryError> {
    read_array(pages, addr).map(i32::from_le_bytes)
}

/// Read a little-endian i64.
pub(crate) fn read_i64_le(pages: &PageList, addr: Addr) -> Result<i64, MemoryError> {
    read_array(pages, addr).map(i64::from_le_bytes)
}

/// Read a little-endian f32.
pub(crate) fn read_f32_le(pages: &PageList, addr: Addr) -> Result<f32, MemoryError> {
    read_array(pages, addr).map(f32::from_le_bytes)
}

/// Read a little-endian f64.
pub(crate) fn read_f64_le(pages: &PageList, addr: Addr) -> Result<f64, MemoryError> {
    read_array(pages, addr).map(f64::from_le_bytes)
}

/// Read a pointer field.
pub(crate) fn read_addr(pages: &PageList, addr: Addr) -> Result<Addr, MemoryError> {
    read_array(pages, addr).map(|b| Addr::from_raw(u64::from_le_bytes(b)))
}

// ── Primitive writers ───────────────────────────────────────────

/// Write a single byte.
pub(crate) fn write_u8(pages: &mut PageList, addr: Addr, v: u8) -> Result<(), MemoryError> {
    write_array(pages, addr, [v])
}

/// Write a little-endian u32.
pub(crate) fn write_u32_le(pages: &mut PageList, addr: Addr, v: u32) -> Result<(), MemoryError> {
    write_array(pages, addr, v.to_le_bytes())
}

/// Write a little-endian i32.
pub(crate) fn write_i32_le(pages: &mut PageList, addr: Addr, v: i32) -> Result<(), MemoryError> {
    write_array(pages, addr, v.to_le_bytes())
}

/// Write a little-endian i64.
pub(crate) fn write_i64_le(pages: &mut PageList, addr: Addr, v: i64) -> Result<(), MemoryError> {
    write_array(pages, addr, v.to_le_bytes())
}

/// Write a little-endian f32.
pub(crate) fn write_f32_le(pages: &mut PageList, addr: Addr, v: f32) -> Result<(), MemoryError> {
    write_array(pages, addr, v.to_le_bytes())
}

/// Write a little-endian f64.
pub(crate) fn write_f64_le(pages: &mut PageList, addr: Addr, v: f64) -> Result<(), MemoryError> {
    write_array(pages, addr, v.to_le_bytes())
}

/// Write a pointer field.
pub(crate) fn write_addr(pages: &mut PageList, addr: Addr, v: Addr) -> Result<(), MemoryError> {
    write_array(pages, addr, v.raw().to_le_bytes())
}

/// Write a length-prefixed UTF-8 string payload (the tag is written separately).
pub(crate) fn write_length_prefixed_str(
    pages: &mut PageList,
    addr: Addr,
    s: &str,
) -> Result<(), MemoryError> {
    let len = u32::try_from(s.len()).map_err(|_| MemoryError::AllocationFailed {
        requested: s.len(),
        reserved: pages.reserved_bytes(),
    })?;
    write_u32_le(pages, field(addr, PAYLOAD)?, len)?;
    pages
        .slice_mut(field(addr, STRING_BYTES)?, s.len())?
        .copy_from_slice(s.as_bytes());
    Ok(())
}

/// Borrow the UTF-8 bytes of the string stored at `desc`.
pub(crate) fn string_bytes(pages: &PageList, desc: Descriptor) -> Result<&[u8], MemoryError> {
    let len = desc.size().saturating_sub(STRING_PREFIX_SIZE) as usize;
    pages.slice(field(desc.addr(), STRING_BYTES)?, len)
}

// ── Decode ──────────────────────────────────────────────────────

/// Rebuild a descriptor from the tag and payload stored at `addr`.
///
/// This is the only way a stored pointer field becomes a typed view again.
/// The whole value, including variable-length string contents, must lie
/// inside the allocated part of its page.
pub(crate) fn decode(pages: &PageList, addr: Addr) -> Result<Descriptor, MemoryError> {
    let tag = read_u8(pages, addr)?;
    let kind = match ValueKind::from_tag(tag) {
        Some(ValueKind::Value) | None => return Err(MemoryError::UnknownTag { tag, addr }),
        Some(kind) => kind,
    };
    let size = match kind {
        ValueKind::String => read_u32_le(pages, field(addr, PAYLOAD)?)?
            .checked_add(STRING_PREFIX_SIZE)
            .ok_or(MemoryError::InvalidAddress { addr })?,
        other => other.fixed_size(),
    };
    pages.slice(addr, TAG_SIZE as usize + size as usize)?;
    Ok(Descriptor::new(kind, size, addr))
}
