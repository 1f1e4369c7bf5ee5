//! Current directory plus back/forward history

use std::path::{Path, PathBuf};

use tracing::debug;

use crate::errors::{AppError, AppResult};
use crate::fs;
use crate::fs::utils::normalize_path;
use crate::history::{NavHistory, DEFAULT_HISTORY_LIMIT};

/// Where a session is and where it has been.
///
/// Every move lists the target first and only updates state once the listing
/// succeeded, so a failed move leaves the store untouched.
#[derive(Debug, Clone)]
pub struct NavigationStore {
    current: PathBuf,
    history: NavHistory,
}

impl NavigationStore {
    /// Start at `start` with empty history. The directory is not checked
    /// until the first listing; a relative `start` is taken from the cwd.
    pub fn new(start: PathBuf, history_limit: usize) -> Self {
        Self {
            current: normalize_path(&start),
            history: NavHistory::new(history_limit),
        }
    }

    /// Start at the process working directory
    pub fn from_cwd() -> AppResult<Self> {
        let cwd = std::env::current_dir().map_err(|e| AppError::from_io(e, Path::new(".")))?;
        Ok(Self::new(cwd, DEFAULT_HISTORY_LIMIT))
    }

    pub fn current_directory(&self) -> &Path {
        &self.current
    }

    /// Resolve `path` against the current directory (absolute paths pass
    /// through), with `.` and `..` collapsed
    pub fn resolve(&self, path: impl AsRef<Path>) -> PathBuf {
        normalize_path(&self.current.join(path))
    }

    /// Enter `path` and return its listing.
    ///
    /// Moving somewhere new pushes the old directory onto the back stack and
    /// drops the forward stack. Re-entering the current directory only re-lists.
    pub fn set_directory(&mut self, path: impl AsRef<Path>) -> AppResult<Vec<String>> {
        let target = self.resolve(path);
        let listing = fs::list(&target)?;

        if target != self.current {
            let previous = std::mem::replace(&mut self.current, target);
            debug!(from = %previous.display(), to = %self.current.display(), "Changed directory");
            self.history.visit(previous);
        }
        Ok(listing)
    }

    /// Step back. `Ok(None)` when there is nowhere to go.
    pub fn go_back(&mut self) -> AppResult<Option<Vec<String>>> {
        let Some(target) = self.history.back_target() else {
            return Ok(None);
        };
        let listing = fs::list(target)?;

        if let Some(previous) = self.history.back(self.current.clone()) {
            debug!(to = %previous.display(), "Went back");
            self.current = previous;
        }
        Ok(Some(listing))
    }

    /// Step forward. `Ok(None)` when there is nowhere to go.
    pub fn go_forward(&mut self) -> AppResult<Option<Vec<String>>> {
        let Some(target) = self.history.forward_target() else {
            return Ok(None);
        };
        let listing = fs::list(target)?;

        if let Some(next) = self.history.forward(self.current.clone()) {
            debug!(to = %next.display(), "Went forward");
            self.current = next;
        }
        Ok(Some(listing))
    }

    /// Enter the parent directory. `Ok(None)` at the filesystem root.
    pub fn go_parent(&mut self) -> AppResult<Option<Vec<String>>> {
        let Some(parent) = self.current.parent().map(Path::to_path_buf) else {
            return Ok(None);
        };
        self.set_directory(parent).map(Some)
    }

    /// Re-list the current directory without touching history
    pub fn refresh(&self) -> AppResult<Vec<String>> {
        fs::list(&self.current)
    }

    pub fn can_go_back(&self) -> bool {
        self.history.back_target().is_some()
    }

    pub fn can_go_forward(&self) -> bool {
        self.history.forward_target().is_some()
    }

    /// Back stack, most recent last
    pub fn back_history(&self) -> &[PathBuf] {
        self.history.back_entries()
    }

    /// Forward stack, most recent last
    pub fn forward_history(&self) -> &[PathBuf] {
        self.history.forward_entries()
    }
}
