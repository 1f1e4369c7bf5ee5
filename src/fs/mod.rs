//! Filesystem module

pub mod entry;
pub mod ops;
pub mod utils;

pub use entry::FileEntry;
pub use ops::{list, read_entries};
