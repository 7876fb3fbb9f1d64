//! Console walkthrough of the arena: a list-driven counter loop, then a
//! small object.
//!
//! Set `RUST_LOG=sevm_arena=trace` to see every allocation.

use std::time::Instant;

use sevm::prelude::*;
use tracing_subscriber::EnvFilter;

fn main() -> Result<(), MemoryError> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let mut arena = Arena::new();
    let started = Instant::now();

    let i = arena.create_double(0.0)?;
    println!("i:{i}");
    println!("Offset:{}", arena.offset());
    let sum = arena.create_double(0.0)?;
    println!("sum:{sum}");
    println!("Offset:{}", arena.offset());

    let mut list = List::create(&mut arena)?;
    println!("ls:{}", list.handle());
    println!("Offset:{}", arena.offset());

    list.append(&mut arena, i)?;
    println!("ls[0]:{}", list.item(&arena, 0)?);
    println!("Offset:{}", arena.offset());
    list.append(&mut arena, sum)?;
    println!("ls[1]:{}", list.item(&arena, 1)?);
    println!("Offset:{}", arena.offset());

    loop {
        let counter = list.get_content(&arena, 0)?;
        if arena.read_as_double(counter)? > 10_000.0 {
            break;
        }
        let acc = list.get_content(&arena, 1)?;
        arena.add(acc, counter)?;
        arena.add(counter, 0.01)?;
    }
    println!("{}", arena.read_as_double(i)?);
    println!("{}", arena.read_as_double(sum)?);
    tracing::info!(elapsed_ms = started.elapsed().as_millis() as u64, "loop finished");

    if let Some(text) = list.to_text(&arena)? {
        println!("{text}");
    }

    let mut obj = Object::create(&mut arena)?;
    obj.add_key(&mut arena, "name")?;
    let name = arena.create_string("lucky")?;
    obj.set_value(&mut arena, "name", name)?;
    obj.add_key(&mut arena, "age")?;
    let age = arena.create_double(24.0)?;
    obj.set_value(&mut arena, "age", age)?;
    obj.add_key(&mut arena, "sex")?;
    let sex = arena.create_string("女")?;
    obj.set_value(&mut arena, "sex", sex)?;

    let name_index = obj.index_of(&arena, "name")?;
    println!("name.index:{name_index:?}");
    let name = obj.get_value(&arena, "name")?;
    println!("name:\"{}\"", arena.read_as_string(name)?);
    println!("age.index:{:?}", obj.index_of(&arena, "age")?);
    println!("{}", arena.bytes_in_use());
    let age = obj.get_value(&arena, "age")?;
    println!("age:{}", arena.read_as_string(age)?);

    tracing::info!(
        pages = arena.page_count(),
        reserved = arena.space_occupied(),
        "arena usage"
    );
    Ok(())
}
