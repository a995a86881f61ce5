mod base;
mod file_backed;
mod memory;
mod sources;

pub use base::History;
pub use file_backed::FileBackedHistory;
pub use memory::MemoryHistory;
pub(crate) use sources::Sources;
