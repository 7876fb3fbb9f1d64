//! In-place arithmetic on Double values.

use sevm_core::{MemoryError, ValueKind};

use crate::arena::Arena;
use crate::assign::Source;
use crate::codec;
use crate::handle::Handle;

#[derive(Clone, Copy)]
enum Op {
    Add,
    Sub,
    Mul,
    Div,
}

impl Arena {
    fn operand(&self, target: Handle, source: Source<'_>) -> Result<f64, MemoryError> {
        match source {
            Source::Number(v) => Ok(v),
            Source::Handle(h)
                if matches!(
                    h.kind(),
                    ValueKind::Integer | ValueKind::Long | ValueKind::Double
                ) =>
            {
                self.read_as_double(h)
            }
            other => Err(MemoryError::UnsupportedCoercion {
                target: target.kind(),
                source: other.kind(),
            }),
        }
    }

    fn apply(&mut self, target: Handle, source: Source<'_>, op: Op) -> Result<f64, MemoryError> {
        let desc = target.require(ValueKind::Double)?;
        let rhs = self.operand(target, source)?;
        let addr = desc.payload_addr();
        let lhs = codec::read_f64_le(&self.pages, addr)?;
        let result = match op {
            Op::Add => lhs + rhs,
            Op::Sub => lhs - rhs,
            Op::Mul => lhs * rhs,
            Op::Div => lhs / rhs,
        };
        codec::write_f64_le(&mut self.pages, addr, result)?;
        Ok(result)
    }

    /// `target += operand`, returning the new value.
    ///
    /// `target` must be a Double; `operand` a number or an Integer, Long,
    /// or Double value.
    pub fn add<'a>(
        &mut self,
        target: Handle,
        operand: impl Into<Source<'a>>,
    ) -> Result<f64, MemoryError> {
        self.apply(target, operand.into(), Op::Add)
    }

    /// `target -= operand`, returning the new value.
    pub fn sub<'a>(
        &mut self,
        target: Handle,
        operand: impl Into<Source<'a>>,
    ) -> Result<f64, MemoryError> {
        self.apply(target, operand.into(), Op::Sub)
    }

    /// `target *= operand`, returning the new value.
    pub fn mul<'a>(
        &mut self,
        target: Handle,
        operand: impl Into<Source<'a>>,
    ) -> Result<f64, MemoryError> {
        self.apply(target, operand.into(), Op::Mul)
    }

    /// `target /= operand`, returning the new value. Division by zero
    /// follows IEEE 754.
    pub fn div<'a>(
        &mut self,
        target: Handle,
        operand: impl Into<Source<'a>>,
    ) -> Result<f64, MemoryError> {
        self.apply(target, operand.into(), Op::Div)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn literal_operands() {
        let mut arena = Arena::new();
        let d = arena.create_double(10.0).unwrap();
        assert_eq!(arena.add(d, 2.5).unwrap(), 12.5);
        assert_eq!(arena.sub(d, 0.5).unwrap(), 12.0);
        assert_eq!(arena.mul(d, 2.0).unwrap(), 24.0);
        assert_eq!(arena.div(d, 4.0).unwrap(), 6.0);
        assert_eq!(arena.read_as_double(d).unwrap(), 6.0);
    }

    #[test]
    fn handle_operands_widen() {
        let mut arena = Arena::new();
        let d = arena.create_double(1.0).unwrap();
        let i = arena.create_integer(3).unwrap();
        let l = arena.create_long(4).unwrap();
        arena.add(d, i).unwrap();
        arena.mul(d, l).unwrap();
        assert_eq!(arena.read_as_double(d).unwrap(), 16.0);
    }

    #[test]
    fn division_by_zero_is_infinite() {
        let mut arena = Arena::new();
        let d = arena.create_double(1.0).unwrap();
        assert_eq!(arena.div(d, 0.0).unwrap(), f64::INFINITY);
    }

    #[test]
    fn string_operand_is_unsupported() {
        let mut arena = Arena::new();
        let d = arena.create_double(1.0).unwrap();
        let s = arena.create_string("2").unwrap();
        assert_eq!(
            arena.add(d, s),
            Err(MemoryError::UnsupportedCoercion {
                target: ValueKind::Double,
                source: ValueKind::String
            })
        );
        assert_eq!(arena.read_as_double(d).unwrap(), 1.0);
    }

    #[test]
    fn non_double_target_is_rejected() {
        let mut arena = Arena::new();
        let i = arena.create_integer(1).unwrap();
        assert!(matches!(
            arena.add(i, 1.0),
            Err(MemoryError::KindMismatch {
                expected: ValueKind::Double,
                ..
            })
        ));
    }
}
