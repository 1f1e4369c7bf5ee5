use std::path::{Path, PathBuf};

/// Default cap on the back stack
pub const DEFAULT_HISTORY_LIMIT: usize = 1000;

/// Browser-style back/forward stacks (most recent last).
///
/// Pure bookkeeping: the caller decides whether a move is allowed and hands
/// over the directory being left.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NavHistory {
    back: Vec<PathBuf>,
    forward: Vec<PathBuf>,
    /// Max back entries, 0 = unbounded
    limit: usize,
}

impl NavHistory {
    pub fn new(limit: usize) -> Self {
        Self {
            back: Vec::new(),
            forward: Vec::new(),
            limit,
        }
    }

    /// Record leaving `from` for a new location. Drops the forward trail.
    pub fn visit(&mut self, from: PathBuf) {
        self.push_back(from);
        self.forward.clear();
    }

    /// Peek at where `back` would go
    pub fn back_target(&self) -> Option<&Path> {
        self.back.last().map(PathBuf::as_path)
    }

    pub fn forward_target(&self) -> Option<&Path> {
        self.forward.last().map(PathBuf::as_path)
    }

    /// Step back from `current`, returning the new location
    pub fn back(&mut self, current: PathBuf) -> Option<PathBuf> {
        let target = self.back.pop()?;
        self.forward.push(current);
        Some(target)
    }

    /// Step forward from `current`, returning the new location
    pub fn forward(&mut self, current: PathBuf) -> Option<PathBuf> {
        let target = self.forward.pop()?;
        self.push_back(current);
        Some(target)
    }

    pub fn back_entries(&self) -> &[PathBuf] {
        &self.back
    }

    pub fn forward_entries(&self) -> &[PathBuf] {
        &self.forward
    }

    pub fn clear(&mut self) {
        self.back.clear();
        self.forward.clear();
    }

    fn push_back(&mut self, path: PathBuf) {
        self.back.push(path);
        if self.limit > 0 && self.back.len() > self.limit {
            let excess = self.back.len() - self.limit;
            self.back.drain(..excess);
        }
    }
}
