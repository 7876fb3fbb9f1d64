//! Insertion-ordered string-keyed objects.
//!
//! An object header holds the addresses of two lists kept at equal length:
//! keys (always Strings) and values (arbitrary slots, initially empty).
//! Lookup is a linear scan of the keys. Duplicate keys are accepted and
//! lookup returns the first match.

use sevm_core::kind::{LIST_ITEM_SIZE, OBJECT_SIZE, STRING_PREFIX_SIZE, TAG_SIZE};
use sevm_core::{MemoryError, ValueKind};

use crate::arena::Arena;
use crate::codec::{self, OBJECT_KEYS, OBJECT_VALUES};
use crate::handle::{Descriptor, Handle};
use crate::list::List;

impl Arena {
    /// Create an empty object along with its keys and values lists.
    pub fn create_object(&mut self) -> Result<Handle, MemoryError> {
        let keys = self.create_list()?;
        let values = self.create_list()?;
        let desc = self.alloc_value(ValueKind::Object, OBJECT_SIZE)?;
        codec::write_addr(
            &mut self.pages,
            codec::field(desc.addr(), OBJECT_KEYS)?,
            keys.addr(),
        )?;
        codec::write_addr(
            &mut self.pages,
            codec::field(desc.addr(), OBJECT_VALUES)?,
            values.addr(),
        )?;
        Ok(Handle::Stored(desc))
    }
}

/// Cached view over an arena object.
#[derive(Clone, Debug)]
pub struct Object {
    header: Descriptor,
    keys: List,
    values: List,
}

impl Object {
    /// Wrap an `Object` handle, opening both backing lists.
    pub fn open(arena: &Arena, handle: Handle) -> Result<Self, MemoryError> {
        let header = handle.require(ValueKind::Object)?;
        let keys_addr = codec::read_addr(&arena.pages, codec::field(header.addr(), OBJECT_KEYS)?)?;
        let values_addr =
            codec::read_addr(&arena.pages, codec::field(header.addr(), OBJECT_VALUES)?)?;
        Ok(Self {
            header,
            keys: List::open(arena, arena.decode(keys_addr)?)?,
            values: List::open(arena, arena.decode(values_addr)?)?,
        })
    }

    /// Create a new empty object in `arena` and wrap it.
    pub fn create(arena: &mut Arena) -> Result<Self, MemoryError> {
        let handle = arena.create_object()?;
        Self::open(arena, handle)
    }

    /// The object's own handle.
    pub fn handle(&self) -> Handle {
        Handle::Stored(self.header)
    }

    /// The keys list. Read-only so both lists stay the same length.
    pub fn keys(&self) -> &List {
        &self.keys
    }

    /// The values list.
    pub fn values(&self) -> &List {
        &self.values
    }

    /// Number of keys.
    pub fn len(&self, arena: &Arena) -> Result<usize, MemoryError> {
        self.keys.count(arena)
    }

    /// Whether the object has no keys.
    pub fn is_empty(&self, arena: &Arena) -> Result<bool, MemoryError> {
        Ok(self.len(arena)? == 0)
    }

    /// Append `name` to the keys and an empty slot to the values.
    ///
    /// Returns the new value slot's item handle. Fails before writing
    /// anything if the arena cannot hold the key string and both items.
    pub fn add_key(&mut self, arena: &mut Arena, name: &str) -> Result<Handle, MemoryError> {
        let item = (TAG_SIZE + LIST_ITEM_SIZE) as usize;
        let key = TAG_SIZE as usize + STRING_PREFIX_SIZE as usize + name.len();
        if !arena.pages.would_fit(&[key, item, item]) {
            return Err(MemoryError::AllocationFailed {
                requested: key + 2 * item,
                reserved: arena.space_occupied(),
            });
        }
        let key = arena.create_string(name)?;
        self.keys.append(arena, key)?;
        self.values.append_empty(arena)
    }

    /// Position of `name` among the keys.
    pub fn index_of(&mut self, arena: &Arena, name: &str) -> Result<Option<usize>, MemoryError> {
        self.keys.index_of_str(arena, name)
    }

    fn position(&mut self, arena: &Arena, name: &str) -> Result<usize, MemoryError> {
        self.index_of(arena, name)?
            .ok_or_else(|| MemoryError::KeyNotFound {
                key: name.to_owned(),
            })
    }

    /// Whether `name` is a key.
    pub fn has_key(&mut self, arena: &Arena, name: &str) -> Result<bool, MemoryError> {
        Ok(self.index_of(arena, name)?.is_some())
    }

    /// The value slot's item handle for `name`.
    pub fn slot(&mut self, arena: &Arena, name: &str) -> Result<Handle, MemoryError> {
        let index = self.position(arena, name)?;
        self.values.item(arena, index)
    }

    /// The value stored under `name`; an unset slot is [`Handle::none`].
    pub fn get_value(&mut self, arena: &Arena, name: &str) -> Result<Handle, MemoryError> {
        let index = self.position(arena, name)?;
        self.values.get_content(arena, index)
    }

    /// Point the value slot `item` (as returned by [`Object::add_key`] or
    /// [`Object::slot`]) at `value`.
    pub fn set_slot(
        &mut self,
        arena: &mut Arena,
        item: Handle,
        value: Handle,
    ) -> Result<(), MemoryError> {
        self.values.set_content(arena, item, value)
    }

    /// Point the slot for `name` at `value`. Never creates a key.
    pub fn set_value(
        &mut self,
        arena: &mut Arena,
        name: &str,
        value: Handle,
    ) -> Result<(), MemoryError> {
        let index = self.position(arena, name)?;
        self.values.set_content_at(arena, index, value)
    }
}
