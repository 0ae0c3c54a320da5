//! Adapters implementing the generator's ports

mod in_memory;

pub use in_memory::InMemoryIndexer;
