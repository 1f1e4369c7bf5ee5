//! Directory entry with metadata

use std::fs;
use std::path::{Path, PathBuf};
use std::time::SystemTime;

/// Snapshot of one directory entry, taken when the directory was read
#[derive(Clone, Debug)]
pub struct FileEntry {
    pub name: String,
    pub path: PathBuf,
    /// True for directories and for links pointing at one
    pub is_dir: bool,
    pub is_symlink: bool,
    /// Bytes; 0 for directories
    pub size: u64,
    pub modified: Option<SystemTime>,
    /// Permission bits as `change_permissions` sets them (0 where the
    /// platform has none)
    pub mode: u32,
}

impl FileEntry {
    /// Stat `path`. Links are described by their target, falling back to the
    /// link itself when it dangles.
    pub fn from_path(path: &Path) -> std::io::Result<Self> {
        let link_meta = fs::symlink_metadata(path)?;
        let is_symlink = link_meta.is_symlink();
        let meta = if is_symlink {
            fs::metadata(path).unwrap_or(link_meta)
        } else {
            link_meta
        };

        let name = match path.file_name() {
            Some(name) => name.to_string_lossy().into_owned(),
            None => path.to_string_lossy().into_owned(),
        };
        let is_dir = meta.is_dir();

        Ok(Self {
            name,
            path: path.to_path_buf(),
            is_dir,
            is_symlink,
            size: if is_dir { 0 } else { meta.len() },
            modified: meta.modified().ok(),
            mode: mode_bits(&meta),
        })
    }
}

#[cfg(unix)]
fn mode_bits(meta: &fs::Metadata) -> u32 {
    use std::os::unix::fs::PermissionsExt;
    meta.permissions().mode() & 0o7777
}

// Read-only maps to clearing the write bits, like change_permissions does
#[cfg(not(unix))]
fn mode_bits(meta: &fs::Metadata) -> u32 {
    if meta.permissions().readonly() { 0o444 } else { 0o666 }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_from_path_file() {
        let tmp = TempDir::new().expect("temp dir");
        let path = tmp.path().join("notes.txt");
        fs::write(&path, b"hello").expect("write");

        let entry = FileEntry::from_path(&path).expect("entry");
        assert_eq!(entry.name, "notes.txt");
        assert!(!entry.is_dir);
        assert!(!entry.is_symlink);
        assert_eq!(entry.size, 5);
        assert!(entry.modified.is_some());
    }

    #[test]
    fn test_from_path_dir() {
        let tmp = TempDir::new().expect("temp dir");
        let path = tmp.path().join("sub");
        fs::create_dir(&path).expect("mkdir");

        let entry = FileEntry::from_path(&path).expect("entry");
        assert!(entry.is_dir);
        assert_eq!(entry.size, 0);
    }

    #[cfg(unix)]
    #[test]
    fn test_mode_matches_chmod() {
        use std::os::unix::fs::PermissionsExt;

        let tmp = TempDir::new().expect("temp dir");
        let path = tmp.path().join("run.sh");
        fs::write(&path, b"#!/bin/sh").expect("write");
        fs::set_permissions(&path, fs::Permissions::from_mode(0o751)).expect("chmod");

        assert_eq!(FileEntry::from_path(&path).expect("entry").mode, 0o751);
    }

    #[cfg(unix)]
    #[test]
    fn test_symlink_and_dangling_link() {
        let tmp = TempDir::new().expect("temp dir");
        let target = tmp.path().join("real");
        fs::create_dir(&target).expect("mkdir");
        let link = tmp.path().join("link");
        std::os::unix::fs::symlink(&target, &link).expect("symlink");

        let entry = FileEntry::from_path(&link).expect("entry");
        assert!(entry.is_symlink);
        assert!(entry.is_dir);

        let dangling = tmp.path().join("dangling");
        std::os::unix::fs::symlink(tmp.path().join("gone"), &dangling).expect("symlink");
        let entry = FileEntry::from_path(&dangling).expect("entry");
        assert!(entry.is_symlink);
        assert!(!entry.is_dir);
    }
}
