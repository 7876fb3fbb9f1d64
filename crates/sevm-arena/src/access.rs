//! Typed reads, in-place setters, and registry resolution.
//!
//! Reads widen or truncate between numeric kinds the way the arithmetic
//! helpers expect; anything without a numeric (or textual) form fails with
//! `UnsupportedSourceType`. Setters write a payload in place and require a
//! handle of exactly the matching kind.

use sevm_core::{FunctionRef, FunctionRegistry, MemoryError, NativeRegistry, ValueKind};

use crate::arena::Arena;
use crate::codec;
use crate::handle::{Descriptor, Handle};

/// Render a double in its shortest round-trip form, always keeping a
/// fractional part (`24.0`, `0.1`).
pub(crate) fn render_double(v: f64) -> String {
    format!("{v:?}")
}

impl Arena {
    fn stored(&self, handle: Handle) -> Result<Descriptor, MemoryError> {
        handle
            .descriptor()
            .ok_or(MemoryError::UnsupportedSourceType {
                kind: handle.kind(),
            })
    }

    /// Read a numeric value as a signed 32-bit integer.
    ///
    /// Long and immediate values wrap; floating values truncate toward zero.
    pub fn read_as_integer(&self, handle: Handle) -> Result<i32, MemoryError> {
        match handle.kind() {
            ValueKind::Integer => {
                codec::read_i32_le(&self.pages, self.stored(handle)?.payload_addr())
            }
            ValueKind::Value => Ok(handle.value()? as i32),
            ValueKind::Float | ValueKind::Double => {
                self.read_as_double(handle).map(|v| v as i32)
            }
            _ => self.read_as_long(handle).map(|v| v as i32),
        }
    }

    /// Read a numeric value as a signed 64-bit integer.
    ///
    /// Floating values truncate toward zero, saturating at the range ends.
    pub fn read_as_long(&self, handle: Handle) -> Result<i64, MemoryError> {
        if let Handle::Immediate(v) = handle {
            return Ok(v);
        }
        let desc = self.stored(handle)?;
        let payload = desc.payload_addr();
        match desc.kind() {
            ValueKind::Byte => codec::read_u8(&self.pages, payload).map(i64::from),
            ValueKind::Integer => codec::read_i32_le(&self.pages, payload).map(i64::from),
            ValueKind::Long => codec::read_i64_le(&self.pages, payload),
            ValueKind::Float => codec::read_f32_le(&self.pages, payload).map(|v| v as i64),
            ValueKind::Double => codec::read_f64_le(&self.pages, payload).map(|v| v as i64),
            kind => Err(MemoryError::UnsupportedSourceType { kind }),
        }
    }

    /// Read a numeric value as a double.
    pub fn read_as_double(&self, handle: Handle) -> Result<f64, MemoryError> {
        if let Handle::Immediate(v) = handle {
            return Ok(v as f64);
        }
        let desc = self.stored(handle)?;
        let payload = desc.payload_addr();
        match desc.kind() {
            ValueKind::Byte => codec::read_u8(&self.pages, payload).map(f64::from),
            ValueKind::Integer => codec::read_i32_le(&self.pages, payload).map(f64::from),
            ValueKind::Long => codec::read_i64_le(&self.pages, payload).map(|v| v as f64),
            ValueKind::Float => codec::read_f32_le(&self.pages, payload).map(f64::from),
            ValueKind::Double => codec::read_f64_le(&self.pages, payload),
            kind => Err(MemoryError::UnsupportedSourceType { kind }),
        }
    }

    /// Render a value as text.
    ///
    /// Strings are returned verbatim; numbers are formatted, with floating
    /// kinds always carrying a fractional part.
    pub fn read_as_string(&self, handle: Handle) -> Result<String, MemoryError> {
        match handle.kind() {
            ValueKind::String => {
                let bytes = codec::string_bytes(&self.pages, self.stored(handle)?)?;
                Ok(String::from_utf8_lossy(bytes).into_owned())
            }
            ValueKind::Float => {
                let desc = self.stored(handle)?;
                let v = codec::read_f32_le(&self.pages, desc.payload_addr())?;
                Ok(format!("{v:?}"))
            }
            ValueKind::Double => self.read_as_double(handle).map(render_double),
            ValueKind::Byte | ValueKind::Integer | ValueKind::Long | ValueKind::Value => {
                self.read_as_long(handle).map(|v| v.to_string())
            }
            kind => Err(MemoryError::UnsupportedSourceType { kind }),
        }
    }

    /// Whether `handle` is a string whose bytes equal `needle`.
    pub(crate) fn str_eq(&self, handle: Handle, needle: &str) -> Result<bool, MemoryError> {
        match handle.descriptor() {
            Some(desc) if desc.kind() == ValueKind::String => {
                Ok(codec::string_bytes(&self.pages, desc)? == needle.as_bytes())
            }
            _ => Ok(false),
        }
    }

    // ── In-place setters ────────────────────────────────────────

    /// Overwrite the payload of an `Integer` value.
    pub fn set_integer(&mut self, handle: Handle, content: i32) -> Result<(), MemoryError> {
        let desc = handle.require(ValueKind::Integer)?;
        codec::write_i32_le(&mut self.pages, desc.payload_addr(), content)
    }

    /// Overwrite the payload of a `Long` value.
    pub fn set_long(&mut self, handle: Handle, content: i64) -> Result<(), MemoryError> {
        let desc = handle.require(ValueKind::Long)?;
        codec::write_i64_le(&mut self.pages, desc.payload_addr(), content)
    }

    /// Overwrite the payload of a `Double` value.
    pub fn set_double(&mut self, handle: Handle, content: f64) -> Result<(), MemoryError> {
        let desc = handle.require(ValueKind::Double)?;
        codec::write_f64_le(&mut self.pages, desc.payload_addr(), content)
    }

    // ── Registry indices ────────────────────────────────────────

    /// The (library, function) pair stored by a `Function` value.
    pub fn function_ref(&self, handle: Handle) -> Result<FunctionRef, MemoryError> {
        let desc = handle.require(ValueKind::Function)?;
        let library = codec::read_u32_le(
            &self.pages,
            codec::field(desc.addr(), codec::FUNCTION_LIBRARY)?,
        )?;
        let index = codec::read_u32_le(
            &self.pages,
            codec::field(desc.addr(), codec::FUNCTION_INDEX)?,
        )?;
        Ok(FunctionRef::new(library, index))
    }

    /// The registry index stored by a `NativeObject` or `NativeFunction`.
    pub fn native_index(&self, handle: Handle) -> Result<u32, MemoryError> {
        match handle.descriptor() {
            Some(desc)
                if matches!(
                    desc.kind(),
                    ValueKind::NativeObject | ValueKind::NativeFunction
                ) =>
            {
                codec::read_u32_le(&self.pages, desc.payload_addr())
            }
            _ => Err(MemoryError::KindMismatch {
                expected: ValueKind::NativeObject,
                found: handle.kind(),
            }),
        }
    }

    /// Look up the script function a `Function` value refers to.
    pub fn resolve_function<'r, R: FunctionRegistry>(
        &self,
        handle: Handle,
        registry: &'r R,
    ) -> Result<Option<&'r R::Function>, MemoryError> {
        Ok(registry.function(self.function_ref(handle)?))
    }

    /// Look up the host object a `NativeObject` value refers to.
    pub fn resolve_native_object<'r, R: NativeRegistry>(
        &self,
        handle: Handle,
        registry: &'r R,
    ) -> Result<Option<&'r R::Object>, MemoryError> {
        handle.require(ValueKind::NativeObject)?;
        Ok(registry.native_object(self.native_index(handle)?))
    }

    /// Look up the host function a `NativeFunction` value refers to.
    pub fn resolve_native_function<'r, R: NativeRegistry>(
        &self,
        handle: Handle,
        registry: &'r R,
    ) -> Result<Option<&'r R::Function>, MemoryError> {
        handle.require(ValueKind::NativeFunction)?;
        Ok(registry.native_function(self.native_index(handle)?))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn integer_reads_widen() {
        let mut arena = Arena::new();
        let h = arena.create_integer(-7).unwrap();
        assert_eq!(arena.read_as_integer(h).unwrap(), -7);
        assert_eq!(arena.read_as_long(h).unwrap(), -7);
        assert_eq!(arena.read_as_double(h).unwrap(), -7.0);
    }

    #[test]
    fn double_reads_truncate_toward_zero() {
        let mut arena = Arena::new();
        let h = arena.create_double(-2.9).unwrap();
        assert_eq!(arena.read_as_integer(h).unwrap(), -2);
        assert_eq!(arena.read_as_long(h).unwrap(), -2);
    }

    #[test]
    fn immediate_reads_without_storage() {
        let arena = Arena::new();
        let h = Handle::immediate(12);
        assert_eq!(arena.read_as_integer(h).unwrap(), 12);
        assert_eq!(arena.read_as_double(h).unwrap(), 12.0);
        assert_eq!(arena.read_as_string(h).unwrap(), "12");
    }

    #[test]
    fn strings_render_verbatim() {
        let mut arena = Arena::new();
        let h = arena.create_string("女").unwrap();
        assert_eq!(h.size(), 4 + 3);
        assert_eq!(arena.read_as_string(h).unwrap(), "女");
    }

    #[test]
    fn doubles_keep_a_fraction() {
        let mut arena = Arena::new();
        let a = arena.create_double(24.0).unwrap();
        let b = arena.create_double(0.1).unwrap();
        assert_eq!(arena.read_as_string(a).unwrap(), "24.0");
        assert_eq!(arena.read_as_string(b).unwrap(), "0.1");
    }

    #[test]
    fn structured_kinds_have_no_textual_form() {
        let mut arena = Arena::new();
        let f = arena.create_function(0, 0).unwrap();
        assert_eq!(
            arena.read_as_string(f),
            Err(MemoryError::UnsupportedSourceType {
                kind: ValueKind::Function
            })
        );
        assert!(arena.read_as_double(Handle::none()).is_err());
    }

    #[test]
    fn setters_require_exact_kind() {
        let mut arena = Arena::new();
        let d = arena.create_double(1.0).unwrap();
        arena.set_double(d, 3.5).unwrap();
        assert_eq!(arena.read_as_double(d).unwrap(), 3.5);
        assert_eq!(
            arena.set_integer(d, 1),
            Err(MemoryError::KindMismatch {
                expected: ValueKind::Integer,
                found: ValueKind::Double
            })
        );
        let l = arena.create_long(0).unwrap();
        arena.set_long(l, i64::MIN).unwrap();
        assert_eq!(arena.read_as_long(l).unwrap(), i64::MIN);
    }

    #[test]
    fn registry_indices_round_trip() {
        let mut arena = Arena::new();
        let f = arena.create_function(3, 11).unwrap();
        let o = arena.create_native_object(5).unwrap();
        let n = arena.create_native_function(6).unwrap();
        assert_eq!(arena.function_ref(f).unwrap(), FunctionRef::new(3, 11));
        assert_eq!(arena.native_index(o).unwrap(), 5);
        assert_eq!(arena.native_index(n).unwrap(), 6);
        assert!(arena.native_index(f).is_err());
        assert!(arena.function_ref(o).is_err());
    }
}
