use std::io;
use std::path::{Path, PathBuf};

use thiserror::Error;

/// Flat classification of an [`AppError`], for callers that only need to
/// branch on the kind of failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    InvalidArgument,
    NotFound,
    AlreadyExists,
    PermissionDenied,
    NotADirectory,
    Config,
    Other,
}

/// Errors surfaced by navigation and file operations.
///
/// Filesystem failures are never swallowed or retried; each is classified
/// into one of the variants below and handed back to the caller.
#[derive(Error, Debug)]
pub enum AppError {
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    #[error("Not found: {}", .0.display())]
    NotFound(PathBuf),

    #[error("Already exists: {}", .0.display())]
    AlreadyExists(PathBuf),

    #[error("Permission denied: {}", .0.display())]
    PermissionDenied(PathBuf),

    #[error("Not a directory: {}", .0.display())]
    NotADirectory(PathBuf),

    /// Recursive delete stopped midway. Part of the tree may already be gone,
    /// so the caller should re-list instead of assuming either state.
    #[error("Partially deleted {}: {source}", path.display())]
    PartialDelete {
        path: PathBuf,
        #[source]
        source: Box<AppError>,
    },

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("I/O error on {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

pub type AppResult<T> = Result<T, AppError>;

impl AppError {
    /// Classify an OS error raised while operating on `path`.
    pub fn from_io(err: io::Error, path: &Path) -> Self {
        let path = path.to_path_buf();
        match err.kind() {
            io::ErrorKind::NotFound => AppError::NotFound(path),
            io::ErrorKind::AlreadyExists => AppError::AlreadyExists(path),
            io::ErrorKind::PermissionDenied => AppError::PermissionDenied(path),
            io::ErrorKind::NotADirectory => AppError::NotADirectory(path),
            _ => AppError::Io { path, source: err },
        }
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            AppError::InvalidArgument(_) => ErrorKind::InvalidArgument,
            AppError::NotFound(_) => ErrorKind::NotFound,
            AppError::AlreadyExists(_) => ErrorKind::AlreadyExists,
            AppError::PermissionDenied(_) => ErrorKind::PermissionDenied,
            AppError::NotADirectory(_) => ErrorKind::NotADirectory,
            AppError::PartialDelete { source, .. } => source.kind(),
            AppError::Config(_) => ErrorKind::Config,
            AppError::Io { .. } => ErrorKind::Other,
        }
    }

    /// True when the failed operation may have left the filesystem half-mutated.
    pub fn is_partial(&self) -> bool {
        matches!(self, AppError::PartialDelete { .. })
    }
}
