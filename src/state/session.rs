//! Browsing session: navigation plus file operations on the current directory

use std::path::{Path, PathBuf};

use crate::config::Config;
use crate::errors::AppResult;
use crate::fs::{self, FileEntry, ops};
use crate::opener::{NullOpener, Opener};

use super::navigation::NavigationStore;

/// One independent browsing session.
///
/// Names passed to the item operations are resolved against the current
/// directory. Sessions share nothing, so several can run side by side.
pub struct Session {
    nav: NavigationStore,
    config: Config,
    opener: Box<dyn Opener>,
}

impl std::fmt::Debug for Session {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Session")
            .field("current", &self.nav.current_directory())
            .field("back", &self.nav.back_history().len())
            .field("forward", &self.nav.forward_history().len())
            .finish()
    }
}

impl Session {
    /// Session starting at the configured directory (or the cwd)
    pub fn new(config: Config, opener: Box<dyn Opener>) -> AppResult<Self> {
        let start = config.start_dir()?;
        Ok(Self::with_start(start, config, opener))
    }

    pub fn with_start(start: PathBuf, config: Config, opener: Box<dyn Opener>) -> Self {
        Self {
            nav: NavigationStore::new(start, config.general.history_limit),
            config,
            opener,
        }
    }

    /// Session at `start` with default config and no opener
    pub fn headless(start: PathBuf) -> Self {
        Self::with_start(start, Config::default(), Box::new(NullOpener))
    }

    pub fn navigation(&self) -> &NavigationStore {
        &self.nav
    }

    pub fn navigation_mut(&mut self) -> &mut NavigationStore {
        &mut self.nav
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn current_directory(&self) -> &Path {
        self.nav.current_directory()
    }

    pub fn set_directory(&mut self, path: impl AsRef<Path>) -> AppResult<Vec<String>> {
        self.nav.set_directory(path)
    }

    pub fn go_back(&mut self) -> AppResult<Option<Vec<String>>> {
        self.nav.go_back()
    }

    pub fn go_forward(&mut self) -> AppResult<Option<Vec<String>>> {
        self.nav.go_forward()
    }

    pub fn go_parent(&mut self) -> AppResult<Option<Vec<String>>> {
        self.nav.go_parent()
    }

    /// Names in the current directory
    pub fn items(&self) -> AppResult<Vec<String>> {
        self.nav.refresh()
    }

    /// Entries of the current directory with metadata
    pub fn entries(&self) -> AppResult<Vec<FileEntry>> {
        fs::read_entries(self.current_directory())
    }

    pub fn create_file(&self, name: &str) -> AppResult<PathBuf> {
        ops::create_file(self.current_directory(), name)
    }

    pub fn create_directory(&self, name: &str) -> AppResult<PathBuf> {
        ops::create_directory(self.current_directory(), name)
    }

    pub fn rename_item(&self, old_name: &str, new_name: &str) -> AppResult<PathBuf> {
        ops::rename(self.current_directory(), old_name, new_name)
    }

    pub fn delete_item(&self, name: &str) -> AppResult<()> {
        ops::delete(self.current_directory(), name)
    }

    /// Copy `name` into `destination` (relative destinations resolve against
    /// the current directory)
    pub fn copy_item(&self, name: &str, destination: impl AsRef<Path>) -> AppResult<PathBuf> {
        let destination = self.nav.resolve(destination);
        ops::copy_with_attributes(
            self.current_directory(),
            name,
            &destination,
            self.config.general.preserve_attributes,
        )
    }

    pub fn change_permissions(&self, name: &str, mode: &str) -> AppResult<()> {
        ops::change_permissions(&self.nav.resolve(name), mode)
    }

    /// Hand `name` to the opener
    pub fn open(&self, name: &str) -> AppResult<()> {
        self.opener.open(&self.nav.resolve(name))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::{AppError, ErrorKind};
    use std::sync::{Arc, Mutex};
    use tempfile::TempDir;

    #[derive(Clone, Default)]
    struct RecordingOpener(Arc<Mutex<Vec<PathBuf>>>);

    impl Opener for RecordingOpener {
        fn open(&self, path: &Path) -> AppResult<()> {
            self.0.lock().expect("lock").push(path.to_path_buf());
            Ok(())
        }
    }

    #[test]
    fn test_item_ops_follow_current_directory() {
        let tmp = TempDir::new().expect("temp dir");
        let mut session = Session::headless(tmp.path().to_path_buf());

        session.create_directory("work").expect("mkdir");
        session.set_directory("work").expect("enter");
        session.create_file("todo.txt").expect("touch");
        assert!(tmp.path().join("work/todo.txt").exists());

        session.rename_item("todo.txt", "done.txt").expect("rename");
        assert_eq!(session.items().expect("items"), vec!["done.txt".to_string()]);

        session.copy_item("done.txt", "..").expect("copy");
        assert!(tmp.path().join("done.txt").exists());

        session.delete_item("done.txt").expect("delete");
        assert!(session.items().expect("items").is_empty());

        session.go_back().expect("back").expect("moved");
        assert_eq!(session.current_directory(), tmp.path());
    }

    #[test]
    fn test_bad_mode_does_not_touch_file() {
        let tmp = TempDir::new().expect("temp dir");
        let session = Session::headless(tmp.path().to_path_buf());
        session.create_file("f").expect("touch");
        let before = std::fs::metadata(tmp.path().join("f")).expect("meta").permissions();

        let err = session.change_permissions("f", "abc").unwrap_err();
        assert!(matches!(err, AppError::InvalidArgument(_)));
        let after = std::fs::metadata(tmp.path().join("f")).expect("meta").permissions();
        assert_eq!(before, after);
    }

    #[test]
    fn test_sessions_are_independent() {
        let tmp = TempDir::new().expect("temp dir");
        std::fs::create_dir(tmp.path().join("x")).expect("mkdir");
        let mut one = Session::headless(tmp.path().to_path_buf());
        let two = Session::headless(tmp.path().to_path_buf());

        one.set_directory("x").expect("enter");
        assert_eq!(one.current_directory(), tmp.path().join("x"));
        assert_eq!(two.current_directory(), tmp.path());
        assert!(!two.navigation().can_go_back());
    }

    #[test]
    fn test_open_goes_through_opener() {
        let tmp = TempDir::new().expect("temp dir");
        let opener = RecordingOpener::default();
        let session = Session::with_start(
            tmp.path().to_path_buf(),
            Config::default(),
            Box::new(opener.clone()),
        );
        session.open("photo.jpg").expect("open");
        assert_eq!(*opener.0.lock().expect("lock"), vec![tmp.path().join("photo.jpg")]);
    }

    #[test]
    fn test_history_limit_from_config() {
        let tmp = TempDir::new().expect("temp dir");
        for d in ["a", "b", "c"] {
            std::fs::create_dir(tmp.path().join(d)).expect("mkdir");
        }
        let mut config = Config::default();
        config.general.history_limit = 1;
        let mut session =
            Session::with_start(tmp.path().to_path_buf(), config, Box::new(NullOpener));

        for d in ["a", "b", "c"] {
            session.set_directory(tmp.path().join(d)).expect("enter");
        }
        assert_eq!(session.navigation().back_history(), &[tmp.path().join("b")]);
        session.go_back().expect("back").expect("moved");
        assert!(session.go_back().expect("back").is_none());
        assert_eq!(session.current_directory(), tmp.path().join("b"));
    }

    #[test]
    fn test_errors_are_typed() {
        let tmp = TempDir::new().expect("temp dir");
        let session = Session::headless(tmp.path().to_path_buf());
        let err = session.delete_item("ghost").unwrap_err();
        assert_eq!(err.kind(), ErrorKind::NotFound);
        let err = session.copy_item("ghost", tmp.path()).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::NotFound);
    }
}
