//! Navigation and file-operation backend for a file browser.
//!
//! [`NavigationStore`] tracks the current directory with browser-style
//! back/forward history; [`fs::ops`] performs listings and mutations relative
//! to a base directory; [`Session`] ties the two together for a UI.

pub mod config;
pub mod errors;
pub mod fs;
pub mod history;
pub mod opener;
pub mod state;

pub use config::Config;
pub use errors::{AppError, AppResult, ErrorKind};
pub use fs::FileEntry;
pub use history::NavHistory;
pub use opener::{HandlerOpener, NullOpener, Opener};
pub use state::{NavigationStore, Session};
