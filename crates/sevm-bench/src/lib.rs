//! Benchmark workloads for the sevm value arena.
//!
//! - [`series_sum`]: the counter/accumulator loop driven through list
//!   content handles.
//! - [`keyed_object`]: an object with `n` numbered keys, each holding a Double.

#![forbid(unsafe_code)]
#![deny(rustdoc::broken_intra_doc_links)]

use sevm_arena::{Arena, List, MemoryError, Object};

/// Run `i += step; sum += i` through a two-entry list until `i > limit`.
///
/// Both counters are Doubles aliased by the list, so every read and write
/// goes through cached content handles. Returns the final `(i, sum)`.
pub fn series_sum(arena: &mut Arena, limit: f64, step: f64) -> Result<(f64, f64), MemoryError> {
    let i = arena.create_double(0.0)?;
    let sum = arena.create_double(0.0)?;
    let mut list = List::create(arena)?;
    list.append(arena, i)?;
    list.append(arena, sum)?;

    loop {
        let counter = list.get_content(arena, 0)?;
        if arena.read_as_double(counter)? > limit {
            break;
        }
        let acc = list.get_content(arena, 1)?;
        arena.add(acc, counter)?;
        arena.add(counter, step)?;
    }
    Ok((arena.read_as_double(i)?, arena.read_as_double(sum)?))
}

/// Build an object with keys `k0..k{n}`, each set to its index as a Double.
pub fn keyed_object(arena: &mut Arena, n: usize) -> Result<Object, MemoryError> {
    let mut obj = Object::create(arena)?;
    for k in 0..n {
        let name = format!("k{k}");
        obj.add_key(arena, &name)?;
        let v = arena.create_double(k as f64)?;
        obj.set_value(arena, &name, v)?;
    }
    Ok(obj)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn series_sum_small() {
        let mut arena = Arena::new();
        let (i, sum) = series_sum(&mut arena, 3.0, 1.0).unwrap();
        assert_eq!(i, 4.0);
        assert_eq!(sum, 0.0 + 1.0 + 2.0 + 3.0);
    }

    #[test]
    fn keyed_object_lookup() {
        let mut arena = Arena::new();
        let mut obj = keyed_object(&mut arena, 10).unwrap();
        let v = obj.get_value(&arena, "k7").unwrap();
        assert_eq!(arena.read_as_double(v).unwrap(), 7.0);
    }
}
