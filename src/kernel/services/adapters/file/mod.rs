//! File store adapters.

pub mod local;
pub mod memory;

pub use local::LocalFileStore;
pub use memory::MemoryFileStore;
