//! Typed remote document values for Rescue.
//!
//! The backend stores untyped nested maps. This crate gives them a closed
//! shape (`RemoteDocument`) and a slash-delimited address (`DocPath`) so that
//! decoders can pattern match instead of guessing at types. Keeping these in
//! their own crate lets the stores and the decoders share them without
//! depending on each other.

mod path;
mod value;

pub use path::{DocPath, PathError};
pub use value::{DocumentMap, RemoteDocument};
