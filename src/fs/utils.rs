use std::fs;
use std::path::{Component, Path, PathBuf};

use tracing::{trace, warn};

use crate::errors::{AppError, AppResult};

fn io_err(path: &Path) -> impl FnOnce(std::io::Error) -> AppError + '_ {
    move |e| AppError::from_io(e, path)
}

/// Collapse `.` and `..` without touching the filesystem. Relative paths
/// are anchored at the process working directory first.
pub fn normalize_path(path: &Path) -> PathBuf {
    let anchored = if path.is_absolute() {
        path.to_path_buf()
    } else {
        std::env::current_dir().map_or_else(|_| path.to_path_buf(), |cwd| cwd.join(path))
    };

    let mut out = PathBuf::new();
    for component in anchored.components() {
        match component {
            Component::CurDir => {}
            // `..` at the root stays at the root
            Component::ParentDir => {
                if matches!(out.components().next_back(), Some(Component::Normal(_))) {
                    out.pop();
                } else if !out.has_root() {
                    out.push("..");
                }
            }
            other => out.push(other.as_os_str()),
        }
    }
    out
}

/// Preserve modification time and permissions from src to dest.
/// Best-effort: the data is already written, so failures are only logged.
fn preserve_attributes(src: &Path, dest: &Path) {
    let meta = match fs::metadata(src) {
        Ok(meta) => meta,
        Err(e) => {
            warn!(path = %src.display(), error = %e, "Could not read attributes to preserve");
            return;
        }
    };

    // Windows keeps attributes through fs::copy already
    #[cfg(unix)]
    {
        if let Err(e) = fs::set_permissions(dest, meta.permissions()) {
            warn!(path = %dest.display(), error = %e, "Could not preserve permissions");
        }
    }

    if let Ok(mtime) = meta.modified()
        && let Err(e) = filetime::set_file_mtime(dest, filetime::FileTime::from_system_time(mtime))
    {
        warn!(path = %dest.display(), error = %e, "Could not preserve modification time");
    }
}

/// Copy a file or directory tree. `dest` must not exist yet.
pub fn copy_path(src: &Path, dest: &Path, preserve: bool) -> AppResult<()> {
    let meta = fs::symlink_metadata(src).map_err(io_err(src))?;

    if meta.is_symlink() {
        copy_symlink(src, dest, preserve)
    } else if meta.is_dir() {
        copy_dir_recursive(src, dest, preserve)
    } else {
        copy_file(src, dest, preserve)
    }
}

fn copy_file(src: &Path, dest: &Path, preserve: bool) -> AppResult<()> {
    fs::copy(src, dest).map_err(io_err(dest))?;
    if preserve {
        preserve_attributes(src, dest);
    }
    Ok(())
}

#[cfg(unix)]
fn copy_symlink(src: &Path, dest: &Path, _preserve: bool) -> AppResult<()> {
    let target = fs::read_link(src).map_err(io_err(src))?;
    std::os::unix::fs::symlink(&target, dest).map_err(io_err(dest))
}

#[cfg(not(unix))]
fn copy_symlink(src: &Path, dest: &Path, preserve: bool) -> AppResult<()> {
    if src.is_dir() {
        copy_dir_recursive(src, dest, preserve)
    } else {
        copy_file(src, dest, preserve)
    }
}

fn copy_dir_recursive(src: &Path, dest: &Path, preserve: bool) -> AppResult<()> {
    fs::create_dir(dest).map_err(io_err(dest))?;

    for entry in fs::read_dir(src).map_err(io_err(src))? {
        let entry = entry.map_err(io_err(src))?;
        copy_path(&entry.path(), &dest.join(entry.file_name()), preserve)?;
    }

    // Last, so creating children doesn't bump the directory mtime
    if preserve {
        preserve_attributes(src, dest);
    }
    trace!(src = %src.display(), dest = %dest.display(), "Copied directory");

    Ok(())
}

/// Delete a file, a symlink (not its target) or a whole directory tree.
///
/// Trees are removed best-effort: a failing entry doesn't stop its siblings
/// from going, and the first failure comes back as
/// [`AppError::PartialDelete`] since whatever was removed stays removed.
pub fn delete_path(path: &Path) -> AppResult<()> {
    let meta = fs::symlink_metadata(path).map_err(io_err(path))?;

    if meta.is_dir() {
        remove_tree(path).map_err(|source| AppError::PartialDelete {
            path: path.to_path_buf(),
            source: Box::new(source),
        })
    } else {
        remove_non_dir(path)
    }
}

fn remove_tree(dir: &Path) -> AppResult<()> {
    let mut first_error = None;

    for entry in fs::read_dir(dir).map_err(io_err(dir))? {
        let result = entry.map_err(io_err(dir)).and_then(|entry| {
            let path = entry.path();
            let file_type = entry.file_type().map_err(io_err(&path))?;
            if file_type.is_dir() {
                remove_tree(&path)
            } else {
                remove_non_dir(&path)
            }
        });
        if let Err(e) = result {
            warn!(error = %e, "Could not remove entry");
            if first_error.is_none() {
                first_error = Some(e);
            }
        }
    }

    match first_error {
        Some(e) => Err(e),
        None => fs::remove_dir(dir).map_err(io_err(dir)),
    }
}

#[cfg(unix)]
fn remove_non_dir(path: &Path) -> AppResult<()> {
    fs::remove_file(path).map_err(io_err(path))
}

// Windows directory symlinks have to go through remove_dir
#[cfg(not(unix))]
fn remove_non_dir(path: &Path) -> AppResult<()> {
    fs::remove_file(path)
        .or_else(|_| fs::remove_dir(path))
        .map_err(io_err(path))
}
