//! Arena-resident singly-linked lists.
//!
//! A list is a 20-byte header (first item, last item, count) and a chain
//! of 16-byte item nodes (content address, next address). Content is
//! stored by address, so appending an existing value aliases it rather
//! than copying it.
//!
//! [`List`] is the host-side wrapper. It caches the item handles and the
//! decoded content handles so indexed reads are O(1). The cache is keyed
//! on [`Arena::generation`]: an append through the same wrapper extends
//! it in place, any other structural write forces a full traversal before
//! the next read. Reads never observe a stale cache.

use smallvec::SmallVec;

use sevm_core::kind::{DOUBLE_SIZE, LIST_ITEM_SIZE, LIST_SIZE, TAG_SIZE};
use sevm_core::{Addr, MemoryError, ValueKind};

use crate::arena::Arena;
use crate::codec::{self, ITEM_CONTENT, ITEM_NEXT, LIST_COUNT, LIST_FIRST, LIST_LAST};
use crate::handle::{Descriptor, Handle};

impl Arena {
    /// Create an empty list: count 0, first and last both null.
    pub fn create_list(&mut self) -> Result<Handle, MemoryError> {
        let desc = self.alloc_value(ValueKind::List, LIST_SIZE)?;
        let addr = desc.addr();
        codec::write_addr(&mut self.pages, codec::field(addr, LIST_FIRST)?, Addr::NULL)?;
        codec::write_addr(&mut self.pages, codec::field(addr, LIST_LAST)?, Addr::NULL)?;
        codec::write_u32_le(&mut self.pages, codec::field(addr, LIST_COUNT)?, 0)?;
        Ok(Handle::Stored(desc))
    }

    /// Stored item count of the list at `list`.
    pub(crate) fn list_count(&self, list: Descriptor) -> Result<usize, MemoryError> {
        codec::read_u32_le(&self.pages, codec::field(list.addr(), LIST_COUNT)?).map(|c| c as usize)
    }

    /// Resolve `content` to the address an item node should store.
    ///
    /// Immediates have no address and are promoted to a Double holding
    /// their integer value. Any None, stored or not, resolves to
    /// [`Addr::NULL`].
    fn materialize(&mut self, content: Handle) -> Result<(Addr, Handle), MemoryError> {
        match content {
            Handle::Immediate(v) => {
                let stored = self.create_double(v as f64)?;
                Ok((stored.addr(), stored))
            }
            Handle::Stored(desc) if desc.kind() == ValueKind::None => {
                Ok((Addr::NULL, Handle::none()))
            }
            Handle::Stored(desc) => Ok((desc.addr(), content)),
        }
    }

    /// Bytes `materialize` will reserve for `content`.
    fn promotion_size(content: Handle) -> usize {
        match content {
            Handle::Immediate(_) => (TAG_SIZE + DOUBLE_SIZE) as usize,
            Handle::Stored(_) => 0,
        }
    }

    /// Link a new item holding `content` as the list's tail.
    ///
    /// Returns the item handle and the handle of the content it stores.
    pub(crate) fn append_item(
        &mut self,
        list: Descriptor,
        content: Handle,
    ) -> Result<(Handle, Handle), MemoryError> {
        let header = list.addr();
        let count = codec::read_u32_le(&self.pages, codec::field(header, LIST_COUNT)?)?;
        let next_count = count
            .checked_add(1)
            .ok_or(MemoryError::AllocationFailed {
                requested: LIST_ITEM_SIZE as usize,
                reserved: self.pages.reserved_bytes(),
            })?;

        let promoted = Self::promotion_size(content);
        let item_len = (TAG_SIZE + LIST_ITEM_SIZE) as usize;
        if !self.pages.would_fit(&[promoted, item_len]) {
            return Err(MemoryError::AllocationFailed {
                requested: promoted + item_len,
                reserved: self.pages.reserved_bytes(),
            });
        }

        let (content_addr, content) = self.materialize(content)?;
        let item = self.alloc_value(ValueKind::ListItem, LIST_ITEM_SIZE)?;
        let item_addr = item.addr();
        codec::write_addr(&mut self.pages, codec::field(item_addr, ITEM_CONTENT)?, content_addr)?;
        codec::write_addr(&mut self.pages, codec::field(item_addr, ITEM_NEXT)?, Addr::NULL)?;

        let first = codec::read_addr(&self.pages, codec::field(header, LIST_FIRST)?)?;
        if first.is_null() {
            codec::write_addr(&mut self.pages, codec::field(header, LIST_FIRST)?, item_addr)?;
        } else {
            let last = codec::read_addr(&self.pages, codec::field(header, LIST_LAST)?)?;
            codec::write_addr(&mut self.pages, codec::field(last, ITEM_NEXT)?, item_addr)?;
        }
        codec::write_addr(&mut self.pages, codec::field(header, LIST_LAST)?, item_addr)?;
        codec::write_u32_le(&mut self.pages, codec::field(header, LIST_COUNT)?, next_count)?;
        self.bump_generation();
        Ok((Handle::Stored(item), content))
    }

    /// Point an item node at `value`, returning the stored content handle.
    pub(crate) fn set_item_content(
        &mut self,
        item: Handle,
        value: Handle,
    ) -> Result<Handle, MemoryError> {
        let item = item.require(ValueKind::ListItem)?;
        let (content_addr, content) = self.materialize(value)?;
        codec::write_addr(
            &mut self.pages,
            codec::field(item.addr(), ITEM_CONTENT)?,
            content_addr,
        )?;
        self.bump_generation();
        Ok(content)
    }
}

/// Cached view over an arena list.
///
/// Holds no borrow of the arena; every operation takes the arena it was
/// opened from.
#[derive(Clone, Debug)]
pub struct List {
    header: Descriptor,
    items: SmallVec<[Handle; 8]>,
    values: SmallVec<[Handle; 8]>,
    /// Arena generation the cache reflects, `None` before the first build.
    generation: Option<u64>,
}

impl List {
    /// Wrap a `List` handle and build its cache.
    pub fn open(arena: &Arena, handle: Handle) -> Result<Self, MemoryError> {
        let header = handle.require(ValueKind::List)?;
        let mut list = Self {
            header,
            items: SmallVec::new(),
            values: SmallVec::new(),
            generation: None,
        };
        list.refresh(arena)?;
        Ok(list)
    }

    /// Create a new empty list in `arena` and wrap it.
    pub fn create(arena: &mut Arena) -> Result<Self, MemoryError> {
        let handle = arena.create_list()?;
        Self::open(arena, handle)
    }

    /// The list's own handle.
    pub fn handle(&self) -> Handle {
        Handle::Stored(self.header)
    }

    /// Authoritative item count, read from the header.
    pub fn count(&self, arena: &Arena) -> Result<usize, MemoryError> {
        arena.list_count(self.header)
    }

    /// Whether the list has no items.
    pub fn is_empty(&self, arena: &Arena) -> Result<bool, MemoryError> {
        Ok(self.count(arena)? == 0)
    }

    /// Rebuild the cache by walking exactly `count` links from `first`.
    pub fn refresh(&mut self, arena: &Arena) -> Result<(), MemoryError> {
        self.items.clear();
        self.values.clear();
        self.generation = None;

        let count = self.count(arena)?;
        let mut addr = codec::read_addr(
            &arena.pages,
            codec::field(self.header.addr(), LIST_FIRST)?,
        )?;
        for index in 0..count {
            if addr.is_null() {
                return Err(MemoryError::OutOfBounds { index, count });
            }
            let item = arena.decode(addr)?;
            item.require(ValueKind::ListItem)?;
            let content = codec::read_addr(&arena.pages, codec::field(addr, ITEM_CONTENT)?)?;
            self.items.push(item);
            self.values.push(arena.decode(content)?);
            addr = codec::read_addr(&arena.pages, codec::field(addr, ITEM_NEXT)?)?;
        }
        self.generation = Some(arena.generation());
        Ok(())
    }

    fn ensure_fresh(&mut self, arena: &Arena) -> Result<(), MemoryError> {
        if self.generation != Some(arena.generation()) {
            self.refresh(arena)?;
        }
        Ok(())
    }

    // ── Mutation ────────────────────────────────────────────────

    /// Append `content` as the new tail, returning the new item handle.
    ///
    /// A `None` content stores an empty slot; an immediate is promoted to
    /// a fresh Double; anything else is aliased by address.
    pub fn append(&mut self, arena: &mut Arena, content: Handle) -> Result<Handle, MemoryError> {
        let was_fresh = self.generation == Some(arena.generation());
        let (item, stored) = arena.append_item(self.header, content)?;
        if was_fresh {
            self.items.push(item);
            self.values.push(stored);
            self.generation = Some(arena.generation());
        } else {
            self.refresh(arena)?;
        }
        Ok(item)
    }

    /// Append an empty (`None`) slot.
    pub fn append_empty(&mut self, arena: &mut Arena) -> Result<Handle, MemoryError> {
        self.append(arena, Handle::none())
    }

    /// Point `item` at `value`, then rebuild the cache.
    pub fn set_content(
        &mut self,
        arena: &mut Arena,
        item: Handle,
        value: Handle,
    ) -> Result<(), MemoryError> {
        arena.set_item_content(item, value)?;
        self.refresh(arena)
    }

    /// Point the item at `index` at `value`.
    pub fn set_content_at(
        &mut self,
        arena: &mut Arena,
        index: usize,
        value: Handle,
    ) -> Result<(), MemoryError> {
        let item = self.item(arena, index)?;
        self.set_content(arena, item, value)
    }

    // ── Reads ───────────────────────────────────────────────────

    /// The item node at `index`.
    pub fn item(&mut self, arena: &Arena, index: usize) -> Result<Handle, MemoryError> {
        self.ensure_fresh(arena)?;
        self.items
            .get(index)
            .copied()
            .ok_or(MemoryError::OutOfBounds {
                index,
                count: self.items.len(),
            })
    }

    /// The content stored at `index`; an empty slot is [`Handle::none`].
    pub fn get_content(&mut self, arena: &Arena, index: usize) -> Result<Handle, MemoryError> {
        self.ensure_fresh(arena)?;
        self.values
            .get(index)
            .copied()
            .ok_or(MemoryError::OutOfBounds {
                index,
                count: self.values.len(),
            })
    }

    /// Every item handle, in order.
    pub fn items(&mut self, arena: &Arena) -> Result<&[Handle], MemoryError> {
        self.ensure_fresh(arena)?;
        Ok(&self.items)
    }

    /// Every content handle, in order.
    pub fn values(&mut self, arena: &Arena) -> Result<&[Handle], MemoryError> {
        self.ensure_fresh(arena)?;
        Ok(&self.values)
    }

    /// Number of cached item handles, without refreshing.
    pub fn cached_items_len(&self) -> usize {
        self.items.len()
    }

    /// Number of cached content handles, without refreshing.
    pub fn cached_values_len(&self) -> usize {
        self.values.len()
    }

    /// Position of the first entry whose text form equals `needle`.
    ///
    /// Strings compare by bytes, numbers by their rendered form. Empty
    /// slots and kinds without a textual form are skipped.
    pub fn index_of_str(
        &mut self,
        arena: &Arena,
        needle: &str,
    ) -> Result<Option<usize>, MemoryError> {
        self.ensure_fresh(arena)?;
        for (index, &value) in self.values.iter().enumerate() {
            let found = match value.kind() {
                ValueKind::String => arena.str_eq(value, needle)?,
                kind if kind.is_numeric() => arena.read_as_string(value)? == needle,
                _ => false,
            };
            if found {
                return Ok(Some(index));
            }
        }
        Ok(None)
    }

    /// Position of the first numeric entry equal to `needle`.
    pub fn index_of_number(
        &mut self,
        arena: &Arena,
        needle: f64,
    ) -> Result<Option<usize>, MemoryError> {
        self.ensure_fresh(arena)?;
        for (index, &value) in self.values.iter().enumerate() {
            if value.kind().is_numeric() && arena.read_as_double(value)? == needle {
                return Ok(Some(index));
            }
        }
        Ok(None)
    }

    /// Concatenate the text form of every non-empty entry.
    ///
    /// Returns `None` for a list with no items.
    pub fn to_text(&mut self, arena: &Arena) -> Result<Option<String>, MemoryError> {
        self.ensure_fresh(arena)?;
        if self.values.is_empty() {
            return Ok(None);
        }
        let mut out = String::new();
        for &value in &self.values {
            if !value.is_none() {
                out.push_str(&arena.read_as_string(value)?);
            }
        }
        Ok(Some(out))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_list_header_is_zeroed() {
        let mut arena = Arena::new();
        let list = List::create(&mut arena).unwrap();
        let header = list.handle().addr();
        assert_eq!(list.count(&arena).unwrap(), 0);
        assert_eq!(
            codec::read_addr(&arena.pages, codec::field(header, LIST_FIRST).unwrap()).unwrap(),
            Addr::NULL
        );
        assert_eq!(
            codec::read_addr(&arena.pages, codec::field(header, LIST_LAST).unwrap()).unwrap(),
            Addr::NULL
        );
    }

    #[test]
    fn first_append_sets_first_and_last() {
        let mut arena = Arena::new();
        let mut list = List::create(&mut arena).unwrap();
        let v = arena.create_double(1.0).unwrap();
        let item = list.append(&mut arena, v).unwrap();
        let header = list.handle().addr();
        let first = codec::read_addr(&arena.pages, codec::field(header, LIST_FIRST).unwrap());
        let last = codec::read_addr(&arena.pages, codec::field(header, LIST_LAST).unwrap());
        assert_eq!(first.unwrap(), item.addr());
        assert_eq!(last.unwrap(), item.addr());
    }

    #[test]
    fn append_aliases_content() {
        let mut arena = Arena::new();
        let mut list = List::create(&mut arena).unwrap();
        let v = arena.create_double(1.0).unwrap();
        list.append(&mut arena, v).unwrap();
        arena.set_double(v, 2.0).unwrap();
        let content = list.get_content(&arena, 0).unwrap();
        assert_eq!(content, v);
        assert_eq!(arena.read_as_double(content).unwrap(), 2.0);
    }

    #[test]
    fn immediate_content_is_promoted() {
        let mut arena = Arena::new();
        let mut list = List::create(&mut arena).unwrap();
        list.append(&mut arena, Handle::immediate(7)).unwrap();
        let content = list.get_content(&arena, 0).unwrap();
        assert_eq!(content.kind(), ValueKind::Double);
        assert_eq!(arena.read_as_double(content).unwrap(), 7.0);
    }

    #[test]
    fn stored_none_content_links_as_empty_slot() {
        let mut arena = Arena::new();
        let mut list = List::create(&mut arena).unwrap();
        let none = arena.create_none().unwrap();
        assert!(!none.addr().is_null());
        let item = list.append(&mut arena, none).unwrap();
        let stored =
            codec::read_addr(&arena.pages, codec::field(item.addr(), ITEM_CONTENT).unwrap());
        assert_eq!(stored.unwrap(), Addr::NULL);
        assert_eq!(list.get_content(&arena, 0).unwrap(), Handle::none());

        let mut reopened = List::open(&arena, list.handle()).unwrap();
        assert_eq!(reopened.get_content(&arena, 0).unwrap(), Handle::none());

        let d = arena.create_double(1.0).unwrap();
        list.set_content_at(&mut arena, 0, d).unwrap();
        list.set_content_at(&mut arena, 0, none).unwrap();
        assert_eq!(list.get_content(&arena, 0).unwrap(), Handle::none());
    }

    #[test]
    fn failed_append_allocates_nothing() {
        let config = crate::ArenaConfig::new().with_page_size(64).with_max_bytes(64);
        let mut arena = Arena::with_config(config).unwrap();
        let mut list = List::create(&mut arena).unwrap();
        // Header 21 plus two items of 17 leaves 9 bytes.
        list.append_empty(&mut arena).unwrap();
        list.append_empty(&mut arena).unwrap();
        let used = arena.offset();
        assert_eq!(used, 55);
        // The promoted Double fits, the item after it does not.
        assert!(matches!(
            list.append(&mut arena, Handle::immediate(5)),
            Err(MemoryError::AllocationFailed { .. })
        ));
        assert_eq!(arena.offset(), used);
        assert_eq!(arena.page_count(), 1);
        assert_eq!(list.count(&arena).unwrap(), 2);
    }

    #[test]
    fn empty_slot_reads_as_none() {
        let mut arena = Arena::new();
        let mut list = List::create(&mut arena).unwrap();
        list.append_empty(&mut arena).unwrap();
        assert_eq!(list.get_content(&arena, 0).unwrap(), Handle::none());
    }

    #[test]
    fn index_past_count_is_out_of_bounds() {
        let mut arena = Arena::new();
        let mut list = List::create(&mut arena).unwrap();
        list.append_empty(&mut arena).unwrap();
        assert_eq!(
            list.get_content(&arena, 1),
            Err(MemoryError::OutOfBounds { index: 1, count: 1 })
        );
        assert!(list.item(&arena, 5).is_err());
    }

    #[test]
    fn second_wrapper_sees_appends_through_first() {
        let mut arena = Arena::new();
        let mut a = List::create(&mut arena).unwrap();
        let mut b = List::open(&arena, a.handle()).unwrap();
        a.append(&mut arena, Handle::immediate(1)).unwrap();
        a.append(&mut arena, Handle::immediate(2)).unwrap();
        assert_eq!(b.cached_values_len(), 0);
        assert_eq!(b.values(&arena).unwrap().len(), 2);
        assert_eq!(b.cached_values_len(), 2);
    }

    #[test]
    fn set_content_rewrites_slot() {
        let mut arena = Arena::new();
        let mut list = List::create(&mut arena).unwrap();
        list.append_empty(&mut arena).unwrap();
        let s = arena.create_string("x").unwrap();
        list.set_content_at(&mut arena, 0, s).unwrap();
        assert_eq!(list.get_content(&arena, 0).unwrap(), s);
        assert_eq!(list.count(&arena).unwrap(), 1);
    }

    #[test]
    fn index_of_skips_incomparable_entries() {
        let mut arena = Arena::new();
        let mut list = List::create(&mut arena).unwrap();
        let f = arena.create_function(0, 0).unwrap();
        let s = arena.create_string("b").unwrap();
        let d = arena.create_double(3.0).unwrap();
        list.append_empty(&mut arena).unwrap();
        list.append(&mut arena, f).unwrap();
        list.append(&mut arena, s).unwrap();
        list.append(&mut arena, d).unwrap();
        assert_eq!(list.index_of_str(&arena, "b").unwrap(), Some(2));
        assert_eq!(list.index_of_str(&arena, "3.0").unwrap(), Some(3));
        assert_eq!(list.index_of_number(&arena, 3.0).unwrap(), Some(3));
        assert_eq!(list.index_of_str(&arena, "zz").unwrap(), None);
    }

    #[test]
    fn to_text_concatenates_non_empty_entries() {
        let mut arena = Arena::new();
        let mut list = List::create(&mut arena).unwrap();
        assert_eq!(list.to_text(&arena).unwrap(), None);
        let a = arena.create_string("a").unwrap();
        let n = arena.create_double(1.5).unwrap();
        list.append(&mut arena, a).unwrap();
        list.append_empty(&mut arena).unwrap();
        list.append(&mut arena, n).unwrap();
        assert_eq!(list.to_text(&arena).unwrap().as_deref(), Some("a1.5"));
    }

    #[test]
    fn wrapping_a_non_list_fails() {
        let mut arena = Arena::new();
        let d = arena.create_double(0.0).unwrap();
        assert!(matches!(
            List::open(&arena, d),
            Err(MemoryError::KindMismatch {
                expected: ValueKind::List,
                found: ValueKind::Double
            })
        ));
    }

    #[cfg(not(miri))]
    mod proptests {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            #[test]
            fn appends_preserve_order(values in prop::collection::vec(-1e6f64..1e6, 0..64)) {
                let config = crate::ArenaConfig::new().with_page_size(128);
                let mut arena = Arena::with_config(config).unwrap();
                let mut list = List::create(&mut arena).unwrap();
                for &v in &values {
                    let h = arena.create_double(v).unwrap();
                    list.append(&mut arena, h).unwrap();
                }
                prop_assert_eq!(list.count(&arena).unwrap(), values.len());
                let mut fresh = List::open(&arena, list.handle()).unwrap();
                for (i, &v) in values.iter().enumerate() {
                    let h = fresh.get_content(&arena, i).unwrap();
                    prop_assert_eq!(arena.read_as_double(h).unwrap(), v);
                }
            }
        }
    }
}
