//! Response cache implementations.
//!
//! Available backends:
//! - `FileCache` - one file per entry under a cache directory
//! - `MemoryCache` - in-memory map for tests

pub mod file;
pub mod memory;

pub use file::FileCache;
pub use memory::MemoryCache;
