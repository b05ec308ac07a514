//! Configuration types
//!
//! Board-agnostic configuration structures. Loaded from `board.toml` on
//! hosts, or stored as postcard binary data on boards without a filesystem.

pub mod loader;
pub mod types;

pub use loader::*;
pub use types::*;
