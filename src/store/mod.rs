//! Implementations of the remote document client.
//!
//! `MemoryStore` keeps the tree in process; `FileStore` layers a JSON file and
//! an optional filesystem watch on top of it.

mod file;
mod memory;

pub use file::FileStore;
pub use memory::MemoryStore;
