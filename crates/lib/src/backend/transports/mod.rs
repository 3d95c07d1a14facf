//! Concrete [`DocumentTransport`](super::DocumentTransport) implementations.

mod file;
mod gist;
mod memory;

pub use file::FileTransport;
pub use gist::GistTransport;
pub use memory::MemoryTransport;
