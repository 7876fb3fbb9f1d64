//! Reusable arena fixtures.
//!
//! - [`small_page_arena`]: an arena with tiny pages, so growth happens early.
//! - [`double_list`]: a list whose entries are freshly created Doubles.
//! - [`person_object`]: the name/age/sex object used across scenario tests.

use sevm_arena::{Arena, ArenaConfig, List, MemoryError, Object};

/// An arena whose standard page is the minimum accepted size.
pub fn small_page_arena() -> Arena {
    let config = ArenaConfig::new().with_page_size(ArenaConfig::MIN_PAGE_SIZE);
    Arena::with_config(config).expect("minimum page size is a valid config")
}

/// Build a list holding one new Double per entry of `values`, in order.
pub fn double_list(arena: &mut Arena, values: &[f64]) -> Result<List, MemoryError> {
    let mut list = List::create(arena)?;
    for &v in values {
        let h = arena.create_double(v)?;
        list.append(arena, h)?;
    }
    Ok(list)
}

/// Build `{name: "lucky", age: 24.0, sex: "女"}`.
pub fn person_object(arena: &mut Arena) -> Result<Object, MemoryError> {
    let mut obj = Object::create(arena)?;
    obj.add_key(arena, "name")?;
    let name = arena.create_string("lucky")?;
    obj.set_value(arena, "name", name)?;
    obj.add_key(arena, "age")?;
    let age = arena.create_double(24.0)?;
    obj.set_value(arena, "age", age)?;
    obj.add_key(arena, "sex")?;
    let sex = arena.create_string("女")?;
    obj.set_value(arena, "sex", sex)?;
    Ok(obj)
}
