//! Storage primitives the cache is built on: a byte arena, a string table on
//! top of it, and a tagged slot table for admin and group records.

mod arena;
mod slots;
mod strings;

pub use arena::{Arena, ArenaHandle};
pub use slots::{Iter, SlotTable};
pub use strings::{StringHandle, StringTable};
