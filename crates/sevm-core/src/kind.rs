//! The tagged value kind table.
//!
//! Every value stored in the arena starts with a one-byte tag identifying
//! its [`ValueKind`], followed by a kind-specific payload. The payload sizes
//! below are the de facto wire format: handles are rebuilt by reading the
//! tag at an address and looking the size up here.

use std::fmt;

/// Size of the tag byte that prefixes every stored value.
pub const TAG_SIZE: u32 = 1;
/// Payload size of a [`ValueKind::Byte`].
pub const BYTE_SIZE: u32 = 1;
/// Payload size of a [`ValueKind::Integer`] (signed 32-bit).
pub const INTEGER_SIZE: u32 = 4;
/// Payload size of a [`ValueKind::Long`] (signed 64-bit).
pub const LONG_SIZE: u32 = 8;
/// Payload size of a [`ValueKind::Float`].
pub const FLOAT_SIZE: u32 = 4;
/// Payload size of a [`ValueKind::Double`].
pub const DOUBLE_SIZE: u32 = 8;
/// Size of the byte-count prefix in front of string contents.
pub const STRING_PREFIX_SIZE: u32 = 4;
/// Payload size of a [`ValueKind::List`] header: first (8) + last (8) + count (4).
pub const LIST_SIZE: u32 = 20;
/// Payload size of a [`ValueKind::ListItem`]: content (8) + next (8).
pub const LIST_ITEM_SIZE: u32 = 16;
/// Payload size of a [`ValueKind::Object`]: keys list (8) + values list (8).
pub const OBJECT_SIZE: u32 = 16;
/// Payload size of a [`ValueKind::Function`]: library (4) + function (4).
pub const FUNCTION_SIZE: u32 = 8;
/// Payload size of a [`ValueKind::NativeObject`] registry index.
pub const NATIVE_OBJECT_SIZE: u32 = 4;
/// Payload size of a [`ValueKind::NativeFunction`] registry index.
pub const NATIVE_FUNCTION_SIZE: u32 = 4;

/// Kind of a value, encoded as the first byte of its arena allocation.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum ValueKind {
    /// Absence of a value.
    None = 0x00,
    /// Unsigned 8-bit integer.
    Byte = 0x01,
    /// Signed 32-bit integer.
    Integer = 0x02,
    /// Signed 64-bit integer.
    Long = 0x03,
    /// 32-bit float.
    Float = 0x04,
    /// 64-bit float.
    Double = 0x05,
    /// Length-prefixed UTF-8 text.
    String = 0x06,
    /// Linked list header.
    List = 0x11,
    /// Linked list node.
    ListItem = 0x12,
    /// Insertion-ordered string-keyed map.
    Object = 0x13,
    /// Script function reference (library index, function index).
    Function = 0x14,
    /// Opaque host object registry index.
    NativeObject = 0x21,
    /// Opaque host function registry index.
    NativeFunction = 0x22,
    /// Immediate 64-bit integer carried in the handle itself.
    ///
    /// Never written to arena memory.
    Value = 0x99,
}

impl ValueKind {
    /// The tag byte for this kind.
    pub const fn tag(self) -> u8 {
        self as u8
    }

    /// Map a tag byte back to its kind, or `None` for unknown tags.
    pub const fn from_tag(tag: u8) -> Option<Self> {
        Some(match tag {
            0x00 => Self::None,
            0x01 => Self::Byte,
            0x02 => Self::Integer,
            0x03 => Self::Long,
            0x04 => Self::Float,
            0x05 => Self::Double,
            0x06 => Self::String,
            0x11 => Self::List,
            0x12 => Self::ListItem,
            0x13 => Self::Object,
            0x14 => Self::Function,
            0x21 => Self::NativeObject,
            0x22 => Self::NativeFunction,
            0x99 => Self::Value,
            _ => return None,
        })
    }

    /// Fixed payload size in bytes, excluding the tag.
    ///
    /// For [`ValueKind::String`] this is only the length prefix; the full
    /// payload size depends on the stored byte count.
    pub const fn fixed_size(self) -> u32 {
        match self {
            Self::None | Self::Value => 0,
            Self::Byte => BYTE_SIZE,
            Self::Integer => INTEGER_SIZE,
            Self::Long => LONG_SIZE,
            Self::Float => FLOAT_SIZE,
            Self::Double => DOUBLE_SIZE,
            Self::String => STRING_PREFIX_SIZE,
            Self::List => LIST_SIZE,
            Self::ListItem => LIST_ITEM_SIZE,
            Self::Object => OBJECT_SIZE,
            Self::Function => FUNCTION_SIZE,
            Self::NativeObject => NATIVE_OBJECT_SIZE,
            Self::NativeFunction => NATIVE_FUNCTION_SIZE,
        }
    }

    /// Whether values of this kind are plain numbers.
    pub const fn is_numeric(self) -> bool {
        matches!(
            self,
            Self::Byte | Self::Integer | Self::Long | Self::Float | Self::Double | Self::Value
        )
    }

    /// Human-readable kind name used in diagnostics.
    pub const fn name(self) -> &'static str {
        match self {
            Self::None => "None",
            Self::Byte => "Byte",
            Self::Integer => "Integer",
            Self::Long => "Long",
            Self::Float => "Float",
            Self::Double => "Double",
            Self::String => "String",
            Self::List => "List",
            Self::ListItem => "ListItem",
            Self::Object => "Object",
            Self::Function => "Function",
            Self::NativeObject => "NativeObject",
            Self::NativeFunction => "NativeFunction",
            Self::Value => "Value",
        }
    }
}

impl fmt::Display for ValueKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tags_match_wire_table() {
        assert_eq!(ValueKind::None.tag(), 0x00);
        assert_eq!(ValueKind::String.tag(), 0x06);
        assert_eq!(ValueKind::List.tag(), 0x11);
        assert_eq!(ValueKind::Function.tag(), 0x14);
        assert_eq!(ValueKind::NativeFunction.tag(), 0x22);
        assert_eq!(ValueKind::Value.tag(), 0x99);
    }

    #[test]
    fn header_kinds_have_pointer_sized_fields() {
        assert_eq!(ValueKind::List.fixed_size(), 8 + 8 + 4);
        assert_eq!(ValueKind::ListItem.fixed_size(), 8 + 8);
        assert_eq!(ValueKind::Object.fixed_size(), 8 + 8);
        assert_eq!(ValueKind::Function.fixed_size(), 4 + 4);
    }

    #[test]
    fn unknown_tag_is_rejected() {
        assert_eq!(ValueKind::from_tag(0x07), None);
        assert_eq!(ValueKind::from_tag(0xff), None);
    }

    #[test]
    fn display_uses_kind_name() {
        assert_eq!(ValueKind::NativeObject.to_string(), "NativeObject");
    }

    #[cfg(not(miri))]
    mod proptests {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            #[test]
            fn known_tags_map_back_to_themselves(tag in any::<u8>()) {
                if let Some(kind) = ValueKind::from_tag(tag) {
                    prop_assert_eq!(kind.tag(), tag);
                }
            }
        }
    }
}
