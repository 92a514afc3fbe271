//! Activity log adapters.

mod in_memory;

pub use in_memory::InMemoryActivityLog;
