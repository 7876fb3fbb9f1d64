//! Contiguous memory pages and the growable page list.
//!
//! A [`Page`] is a fixed-capacity `Vec<u8>` with a bump cursor. A
//! [`PageList`] owns every page of an arena and hands out addresses from
//! the last one, opening a new page when a request does not fit. Pages are
//! never freed, moved, or resized individually; they are released together
//! when the list is dropped.

use sevm_core::{Addr, MemoryError};
use tracing::debug;

/// A single contiguous memory page with bump allocation.
pub struct Page {
    /// Backing storage. Allocated to full capacity at creation.
    data: Vec<u8>,
    /// Bump pointer: next free byte.
    cursor: usize,
}

impl Page {
    /// Create a zero-filled page of `capacity` bytes.
    ///
    /// Returns `None` if the system allocator refuses the reservation.
    pub fn new(capacity: usize) -> Option<Self> {
        let mut data = Vec::new();
        data.try_reserve_exact(capacity).ok()?;
        data.resize(capacity, 0);
        Some(Self { data, cursor: 0 })
    }

    /// Bump-allocate `len` bytes, returning their offset within the page.
    ///
    /// Returns `None` if there is insufficient remaining capacity.
    pub fn alloc(&mut self, len: usize) -> Option<u32> {
        let new_cursor = self.cursor.checked_add(len)?;
        if new_cursor > self.data.len() {
            return None;
        }
        let offset = u32::try_from(self.cursor).ok()?;
        self.cursor = new_cursor;
        Some(offset)
    }

    /// Shared view of `len` allocated bytes at `offset`.
    ///
    /// Returns `None` if the range reaches past the bump cursor.
    pub fn bytes(&self, offset: u32, len: usize) -> Option<&[u8]> {
        let start = offset as usize;
        let end = start.checked_add(len)?;
        if end > self.cursor {
            return None;
        }
        Some(&self.data[start..end])
    }

    /// Mutable view of `len` allocated bytes at `offset`.
    pub fn bytes_mut(&mut self, offset: u32, len: usize) -> Option<&mut [u8]> {
        let start = offset as usize;
        let end = start.checked_add(len)?;
        if end > self.cursor {
            return None;
        }
        Some(&mut self.data[start..end])
    }

    /// Bytes handed out so far.
    pub fn used(&self) -> usize {
        self.cursor
    }

    /// Total capacity in bytes.
    pub fn capacity(&self) -> usize {
        self.data.len()
    }

    /// Remaining free capacity in bytes.
    pub fn remaining(&self) -> usize {
        self.data.len() - self.cursor
    }
}

/// A growable list of [`Page`]s with overflow-based bump allocation.
///
/// The active page is always the last one. A request that does not fit in
/// it opens a new page of `max(len, page_size)` bytes; the unused tail of
/// the old page is abandoned. Allocations never span pages.
pub struct PageList {
    pages: Vec<Page>,
    page_size: usize,
    max_bytes: Option<usize>,
    /// Cumulative capacity of every page opened so far.
    reserved: usize,
}

impl PageList {
    /// Create an empty page list. The first page opens on first use.
    pub fn new(page_size: usize, max_bytes: Option<usize>) -> Self {
        Self {
            pages: Vec::new(),
            page_size,
            max_bytes,
            reserved: 0,
        }
    }

    /// Reserve `len` contiguous bytes and return their address.
    pub fn reserve(&mut self, len: usize) -> Result<Addr, MemoryError> {
        let fits = self.pages.last().is_some_and(|p| p.remaining() >= len);
        if !fits {
            self.open_page(len.max(self.page_size))?;
        }
        let page_index = self.pages.len() - 1;
        let failed = MemoryError::AllocationFailed {
            requested: len,
            reserved: self.reserved,
        };
        let Some(offset) = self.pages.last_mut().and_then(|p| p.alloc(len)) else {
            return Err(failed);
        };
        Ok(Addr::new(page_index as u32, offset))
    }

    /// Whether a sequence of reservations would all succeed against the
    /// ceiling, given the current active page.
    ///
    /// Mirrors [`PageList::reserve`] without touching memory, so callers
    /// that perform several reservations can refuse up front instead of
    /// failing halfway.
    pub fn would_fit(&self, lens: &[usize]) -> bool {
        let mut remaining = self.pages.last().map_or(0, Page::remaining);
        let mut reserved = self.reserved;
        for &len in lens {
            if remaining < len {
                let size = len.max(self.page_size);
                reserved = match reserved.checked_add(size) {
                    Some(r) => r,
                    None => return false,
                };
                if self.max_bytes.is_some_and(|max| reserved > max) {
                    return false;
                }
                remaining = size;
            }
            remaining -= len;
        }
        true
    }

    fn open_page(&mut self, size: usize) -> Result<(), MemoryError> {
        let failed = MemoryError::AllocationFailed {
            requested: size,
            reserved: self.reserved,
        };
        let reserved = self.reserved.checked_add(size).ok_or(failed.clone())?;
        if self.max_bytes.is_some_and(|max| reserved > max) {
            return Err(failed);
        }
        if u32::try_from(size).is_err() || self.pages.len() >= (u32::MAX - 1) as usize {
            return Err(failed);
        }
        let page = Page::new(size).ok_or(failed)?;
        self.pages.push(page);
        self.reserved = reserved;
        debug!(
            page = self.pages.len() - 1,
            size, reserved, "opened arena page"
        );
        Ok(())
    }

    /// Shared view of `len` bytes at `addr`.
    pub fn slice(&self, addr: Addr, len: usize) -> Result<&[u8], MemoryError> {
        addr.page()
            .and_then(|page| self.pages.get(page as usize))
            .and_then(|page| page.bytes(addr.offset(), len))
            .ok_or(MemoryError::InvalidAddress { addr })
    }

    /// Mutable view of `len` bytes at `addr`.
    pub fn slice_mut(&mut self, addr: Addr, len: usize) -> Result<&mut [u8], MemoryError> {
        addr.page()
            .and_then(|page| self.pages.get_mut(page as usize))
            .and_then(|page| page.bytes_mut(addr.offset(), len))
            .ok_or(MemoryError::InvalidAddress { addr })
    }

    /// Number of pages opened so far.
    pub fn page_count(&self) -> usize {
        self.pages.len()
    }

    /// Cumulative bytes reserved across every page.
    pub fn reserved_bytes(&self) -> usize {
        self.reserved
    }

    /// Capacity of the active page, or 0 before the first allocation.
    pub fn active_size(&self) -> usize {
        self.pages.last().map_or(0, Page::capacity)
    }

    /// Bytes used in the active page.
    pub fn active_offset(&self) -> usize {
        self.pages.last().map_or(0, Page::used)
    }
}
