pub mod journal;
pub mod memory;

pub use journal::JournalSink;
pub use memory::{MemorySink, MemoryStoreError};
