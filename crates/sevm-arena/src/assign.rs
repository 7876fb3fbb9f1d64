//! Cross-kind assignment into existing slots.
//!
//! The rule set is keyed on the target's kind:
//!
//! | Target  | Accepts                                   | Effect                    |
//! |---------|-------------------------------------------|---------------------------|
//! | None    | numbers                                   | new Double, rebind        |
//! | None    | None, String, List, Object, native kinds  | alias the source address  |
//! | None    | text literal                              | new String, rebind        |
//! | Value   | Integer, Double, Value, number            | replace the immediate     |
//! | Integer | Integer, Double, Value, number            | overwrite 4 bytes in place|
//! | Double  | Integer, Double, Value, number            | overwrite 8 bytes in place|
//! | String  | Integer, Double, Value, String, text, number | new String, rebind     |
//!
//! Every other pair fails with `UnsupportedCoercion` before any byte is
//! written. A String rebind leaves the previous allocation in place as
//! unreachable garbage.

use sevm_core::{MemoryError, ValueKind};

use crate::access::render_double;
use crate::arena::Arena;
use crate::codec;
use crate::handle::Handle;

/// The right-hand side of an assignment or arithmetic operation.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Source<'a> {
    /// A numeric literal; behaves like a Double source.
    Number(f64),
    /// A text literal; behaves like a String source that is not yet stored.
    Text(&'a str),
    /// An existing value.
    Handle(Handle),
}

impl Source<'_> {
    /// The kind this source presents to the coercion rules.
    pub fn kind(&self) -> ValueKind {
        match self {
            Self::Number(_) => ValueKind::Double,
            Self::Text(_) => ValueKind::String,
            Self::Handle(h) => h.kind(),
        }
    }
}

impl From<f64> for Source<'_> {
    fn from(v: f64) -> Self {
        Self::Number(v)
    }
}

impl From<i64> for Source<'_> {
    fn from(v: i64) -> Self {
        Self::Handle(Handle::Immediate(v))
    }
}

impl From<i32> for Source<'_> {
    fn from(v: i32) -> Self {
        Self::Handle(Handle::Immediate(i64::from(v)))
    }
}

impl<'a> From<&'a str> for Source<'a> {
    fn from(s: &'a str) -> Self {
        Self::Text(s)
    }
}

impl From<Handle> for Source<'_> {
    fn from(h: Handle) -> Self {
        Self::Handle(h)
    }
}

fn is_assignable_number(kind: ValueKind) -> bool {
    matches!(
        kind,
        ValueKind::Integer | ValueKind::Double | ValueKind::Value
    )
}

impl Arena {
    /// Store `source` into the slot described by `target`.
    ///
    /// Numeric targets are overwritten in place, so every other handle to
    /// the same address observes the new value. None and String targets
    /// are rebound: `target` is updated to describe a fresh allocation
    /// (or, for reference-like sources, the source's own address).
    pub fn assign<'a>(
        &mut self,
        target: &mut Handle,
        source: impl Into<Source<'a>>,
    ) -> Result<(), MemoryError> {
        let source = source.into();
        let unsupported = MemoryError::UnsupportedCoercion {
            target: target.kind(),
            source: source.kind(),
        };
        match target.kind() {
            ValueKind::None => {
                *target = match source {
                    Source::Number(v) => self.create_double(v)?,
                    Source::Text(s) => self.create_string(s)?,
                    Source::Handle(h) if is_assignable_number(h.kind()) => {
                        let v = self.read_as_double(h)?;
                        self.create_double(v)?
                    }
                    Source::Handle(h)
                        if matches!(
                            h.kind(),
                            ValueKind::None
                                | ValueKind::String
                                | ValueKind::List
                                | ValueKind::Object
                                | ValueKind::NativeObject
                                | ValueKind::NativeFunction
                        ) =>
                    {
                        h
                    }
                    Source::Handle(_) => return Err(unsupported),
                };
            }
            ValueKind::Value => {
                let v = match source {
                    Source::Number(v) => v as i64,
                    Source::Handle(h) if is_assignable_number(h.kind()) => self.read_as_long(h)?,
                    _ => return Err(unsupported),
                };
                *target = Handle::Immediate(v);
            }
            ValueKind::Integer => {
                let desc = target.require(ValueKind::Integer)?;
                let v = match source {
                    Source::Number(v) => v as i32,
                    Source::Handle(h) if is_assignable_number(h.kind()) => {
                        self.read_as_integer(h)?
                    }
                    _ => return Err(unsupported),
                };
                codec::write_i32_le(&mut self.pages, desc.payload_addr(), v)?;
            }
            ValueKind::Double => {
                let desc = target.require(ValueKind::Double)?;
                let v = match source {
                    Source::Number(v) => v,
                    Source::Handle(h) if is_assignable_number(h.kind()) => {
                        self.read_as_double(h)?
                    }
                    _ => return Err(unsupported),
                };
                codec::write_f64_le(&mut self.pages, desc.payload_addr(), v)?;
            }
            ValueKind::String => {
                let text = match source {
                    Source::Number(v) => render_double(v),
                    Source::Text(s) => s.to_owned(),
                    Source::Handle(h)
                        if is_assignable_number(h.kind()) || h.kind() == ValueKind::String =>
                    {
                        self.read_as_string(h)?
                    }
                    Source::Handle(_) => return Err(unsupported),
                };
                *target = self.create_string(&text)?;
            }
            _ => return Err(unsupported),
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn none_target_adopts_number_as_double() {
        let mut arena = Arena::new();
        let mut slot = Handle::none();
        arena.assign(&mut slot, 5i64).unwrap();
        assert_eq!(slot.kind(), ValueKind::Double);
        assert_eq!(arena.read_as_double(slot).unwrap(), 5.0);
    }

    #[test]
    fn none_target_aliases_references() {
        let mut arena = Arena::new();
        let s = arena.create_string("abc").unwrap();
        let mut slot = Handle::none();
        arena.assign(&mut slot, s).unwrap();
        assert_eq!(slot, s);
    }

    #[test]
    fn none_target_rejects_function() {
        let mut arena = Arena::new();
        let f = arena.create_function(0, 1).unwrap();
        let mut slot = Handle::none();
        assert_eq!(
            arena.assign(&mut slot, f),
            Err(MemoryError::UnsupportedCoercion {
                target: ValueKind::None,
                source: ValueKind::Function
            })
        );
        assert_eq!(slot, Handle::none());
    }

    #[test]
    fn value_target_updates_immediate() {
        let mut arena = Arena::new();
        let d = arena.create_double(9.75).unwrap();
        let mut slot = Handle::immediate(1);
        arena.assign(&mut slot, d).unwrap();
        assert_eq!(slot, Handle::immediate(9));
        assert!(arena.assign(&mut slot, "x").is_err());
    }

    #[test]
    fn integer_target_truncates_in_place() {
        let mut arena = Arena::new();
        let mut target = arena.create_integer(0).unwrap();
        let before = target;
        let d = arena.create_double(-3.99).unwrap();
        arena.assign(&mut target, d).unwrap();
        assert_eq!(target, before);
        assert_eq!(arena.read_as_integer(target).unwrap(), -3);
    }

    #[test]
    fn double_target_widens_in_place() {
        let mut arena = Arena::new();
        let mut target = arena.create_double(0.0).unwrap();
        let alias = target;
        let i = arena.create_integer(i32::MAX).unwrap();
        arena.assign(&mut target, i).unwrap();
        assert_eq!(arena.read_as_double(alias).unwrap(), f64::from(i32::MAX));
    }

    #[test]
    fn string_target_rebinds_to_text_form() {
        let mut arena = Arena::new();
        let mut target = arena.create_string("old").unwrap();
        let old = target;
        arena.assign(&mut target, 24.0).unwrap();
        assert_ne!(target.addr(), old.addr());
        assert_eq!(arena.read_as_string(target).unwrap(), "24.0");
        assert_eq!(arena.read_as_string(old).unwrap(), "old");
    }

    #[test]
    fn list_target_is_unsupported() {
        let mut arena = Arena::new();
        let mut list = arena.create_list().unwrap();
        let offset = arena.offset();
        assert!(matches!(
            arena.assign(&mut list, 1.0),
            Err(MemoryError::UnsupportedCoercion {
                target: ValueKind::List,
                source: ValueKind::Double
            })
        ));
        assert_eq!(arena.offset(), offset);
    }
}
