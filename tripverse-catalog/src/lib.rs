pub mod fixtures;
pub mod memory_source;
pub mod memory_store;

pub use memory_source::InMemorySource;
pub use memory_store::MemoryStore;
