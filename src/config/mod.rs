//! Sprite config persistence
//!
//! Types and JSON loading for the per-file sprite count overrides.

pub mod loader;
pub mod schema;

pub use loader::*;
pub use schema::*;
