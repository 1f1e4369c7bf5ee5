//! Filesystem operations
//!
//! Every operation takes the base directory explicitly; names are joined onto
//! it, so an absolute name bypasses the base. Nothing here keeps state.

use std::fs;
use std::path::{Path, PathBuf};

use tracing::{debug, trace, warn};

use super::entry::FileEntry;
use super::utils::{copy_path, delete_path};
use crate::errors::{AppError, AppResult};

/// Join `name` onto `dir`, rejecting empty names
fn resolve(dir: &Path, name: &str) -> AppResult<PathBuf> {
    if name.is_empty() {
        return Err(AppError::InvalidArgument("empty name".to_string()));
    }
    Ok(dir.join(name))
}

/// Fail unless `dir` exists and is a directory
fn ensure_dir(dir: &Path) -> AppResult<()> {
    let meta = fs::metadata(dir).map_err(|e| AppError::from_io(e, dir))?;
    if meta.is_dir() {
        Ok(())
    } else {
        Err(AppError::NotADirectory(dir.to_path_buf()))
    }
}

/// True if something (including a dangling symlink) occupies `path`
fn occupied(path: &Path) -> bool {
    fs::symlink_metadata(path).is_ok()
}

/// Names of the entries directly inside `dir`, in directory order.
///
/// A missing `dir` is `NotFound`; an existing non-directory is reported
/// more precisely as `NotADirectory` rather than `NotFound`.
pub fn list(dir: &Path) -> AppResult<Vec<String>> {
    ensure_dir(dir)?;

    let mut names = Vec::new();
    for entry in fs::read_dir(dir).map_err(|e| AppError::from_io(e, dir))? {
        let entry = entry.map_err(|e| AppError::from_io(e, dir))?;
        names.push(entry.file_name().to_string_lossy().into_owned());
    }

    trace!(path = %dir.display(), count = names.len(), "Listed directory");
    Ok(names)
}

/// Directory contents with metadata. Entries that vanish or can't be
/// stat'ed between readdir and stat are skipped.
pub fn read_entries(dir: &Path) -> AppResult<Vec<FileEntry>> {
    ensure_dir(dir)?;

    let mut entries = Vec::new();
    for entry in fs::read_dir(dir).map_err(|e| AppError::from_io(e, dir))? {
        let entry = entry.map_err(|e| AppError::from_io(e, dir))?;
        let path = entry.path();
        match FileEntry::from_path(&path) {
            Ok(file_entry) => entries.push(file_entry),
            Err(e) => warn!(path = %path.display(), error = %e, "Skipping unreadable entry"),
        }
    }

    Ok(entries)
}

/// Create an empty file, truncating an existing regular file.
///
/// A directory or other non-regular target is `AlreadyExists`.
pub fn create_file(dir: &Path, name: &str) -> AppResult<PathBuf> {
    let path = resolve(dir, name)?;

    match fs::metadata(&path) {
        Ok(meta) if !meta.is_file() => return Err(AppError::AlreadyExists(path)),
        Ok(_) => {}
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
        Err(e) => return Err(AppError::from_io(e, &path)),
    }

    fs::OpenOptions::new()
        .write(true)
        .create(true)
        .truncate(true)
        .open(&path)
        .map_err(|e| AppError::from_io(e, &path))?;

    debug!(path = %path.display(), "Created file");
    Ok(path)
}

pub fn create_directory(dir: &Path, name: &str) -> AppResult<PathBuf> {
    let path = resolve(dir, name)?;
    fs::create_dir(&path).map_err(|e| AppError::from_io(e, &path))?;
    debug!(path = %path.display(), "Created directory");
    Ok(path)
}

/// Rename within `dir`. Never overwrites: an occupied target is
/// `AlreadyExists` whatever the platform's rename would do.
pub fn rename(dir: &Path, old_name: &str, new_name: &str) -> AppResult<PathBuf> {
    let from = resolve(dir, old_name)?;
    let to = resolve(dir, new_name)?;

    fs::symlink_metadata(&from).map_err(|e| AppError::from_io(e, &from))?;
    if from == to {
        return Ok(to);
    }
    if occupied(&to) {
        return Err(AppError::AlreadyExists(to));
    }

    rename_no_replace(&from, &to).map_err(|e| AppError::from_io(e, &to))?;
    debug!(from = %from.display(), to = %to.display(), "Renamed");
    Ok(to)
}

/// Atomic no-overwrite rename via renameat2(RENAME_NOREPLACE). Filesystems
/// without support get the plain rename after the caller's occupancy check.
#[cfg(target_os = "linux")]
fn rename_no_replace(from: &Path, to: &Path) -> std::io::Result<()> {
    use std::ffi::CString;
    use std::os::unix::ffi::OsStrExt;

    let c_path = |p: &Path| {
        CString::new(p.as_os_str().as_bytes())
            .map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidInput, e))
    };
    let from_c = c_path(from)?;
    let to_c = c_path(to)?;

    // SAFETY: both pointers come from live CStrings, AT_FDCWD resolves them
    // like rename(2) would
    let rc = unsafe {
        libc::renameat2(
            libc::AT_FDCWD,
            from_c.as_ptr(),
            libc::AT_FDCWD,
            to_c.as_ptr(),
            libc::RENAME_NOREPLACE,
        )
    };
    if rc == 0 {
        return Ok(());
    }

    let err = std::io::Error::last_os_error();
    match err.raw_os_error() {
        Some(libc::EINVAL) | Some(libc::ENOSYS) => fs::rename(from, to),
        _ => Err(err),
    }
}

#[cfg(not(target_os = "linux"))]
fn rename_no_replace(from: &Path, to: &Path) -> std::io::Result<()> {
    fs::rename(from, to)
}

/// Remove a file, or a directory with everything under it.
///
/// Not atomic: see [`AppError::PartialDelete`].
pub fn delete(dir: &Path, name: &str) -> AppResult<()> {
    let path = resolve(dir, name)?;
    delete_path(&path)?;
    debug!(path = %path.display(), "Deleted");
    Ok(())
}

/// Copy `name` from `source_dir` into `destination_dir` under the same name,
/// preserving timestamps and permissions.
pub fn copy(source_dir: &Path, name: &str, destination_dir: &Path) -> AppResult<PathBuf> {
    copy_with_attributes(source_dir, name, destination_dir, true)
}

pub fn copy_with_attributes(
    source_dir: &Path,
    name: &str,
    destination_dir: &Path,
    preserve: bool,
) -> AppResult<PathBuf> {
    let src = resolve(source_dir, name)?;
    let meta = fs::symlink_metadata(&src).map_err(|e| AppError::from_io(e, &src))?;
    let file_name = src
        .file_name()
        .ok_or_else(|| AppError::InvalidArgument(format!("cannot copy {}", src.display())))?;

    ensure_dir(destination_dir)?;
    let dest = destination_dir.join(file_name);
    if occupied(&dest) {
        return Err(AppError::AlreadyExists(dest));
    }

    if meta.is_dir() {
        let src_real = src.canonicalize().map_err(|e| AppError::from_io(e, &src))?;
        let dest_real = destination_dir
            .canonicalize()
            .map_err(|e| AppError::from_io(e, destination_dir))?;
        if dest_real.starts_with(&src_real) {
            return Err(AppError::InvalidArgument(format!(
                "cannot copy {} into itself",
                src.display()
            )));
        }
    }

    copy_path(&src, &dest, preserve)?;
    debug!(src = %src.display(), dest = %dest.display(), "Copied");
    Ok(dest)
}

/// Parse an octal permission string such as "755" or "0644".
///
/// Accepts one to four octal digits, surrounding whitespace ignored.
pub fn parse_mode(mode: &str) -> AppResult<u32> {
    let digits = mode.trim();
    let valid = !digits.is_empty()
        && digits.len() <= 4
        && digits.bytes().all(|b| (b'0'..=b'7').contains(&b));
    if !valid {
        return Err(AppError::InvalidArgument(format!(
            "invalid permissions '{mode}', expected an octal number like 755"
        )));
    }
    u32::from_str_radix(digits, 8)
        .map_err(|e| AppError::InvalidArgument(format!("invalid permissions '{mode}': {e}")))
}

/// Apply an octal mode to a single path (no recursion).
///
/// The mode string is validated before the filesystem is touched.
pub fn change_permissions(path: &Path, mode: &str) -> AppResult<()> {
    let bits = parse_mode(mode)?;
    let meta = fs::metadata(path).map_err(|e| AppError::from_io(e, path))?;

    #[cfg(unix)]
    let perms = {
        use std::os::unix::fs::PermissionsExt;
        let mut perms = meta.permissions();
        perms.set_mode(bits);
        perms
    };
    // Only the owner-write bit maps onto the read-only flag
    #[cfg(not(unix))]
    let perms = {
        let mut perms = meta.permissions();
        perms.set_readonly(bits & 0o200 == 0);
        perms
    };

    fs::set_permissions(path, perms).map_err(|e| AppError::from_io(e, path))?;
    debug!(path = %path.display(), mode = %format!("{bits:o}"), "Changed permissions");
    Ok(())
}

/// Render the low nine mode bits as `rwxr-xr-x`
pub fn mode_string(mode: u32) -> String {
    const FLAGS: [(u32, char); 9] = [
        (0o400, 'r'),
        (0o200, 'w'),
        (0o100, 'x'),
        (0o040, 'r'),
        (0o020, 'w'),
        (0o010, 'x'),
        (0o004, 'r'),
        (0o002, 'w'),
        (0o001, 'x'),
    ];
    FLAGS
        .iter()
        .map(|&(bit, c)| if mode & bit != 0 { c } else { '-' })
        .collect()
}
