//! Opening files with an external application
//!
//! The session never launches anything itself; it hands the path to an
//! [`Opener`] supplied by whoever builds it.

use std::path::Path;
use std::process::{Command, ExitStatus, Stdio};
use std::thread::JoinHandle;

use tracing::{debug, warn};

use crate::config::{default_open_command, expand_command, Config};
use crate::errors::{AppError, AppResult};

/// "Open this path with whatever the system uses for it"
pub trait Opener: Send {
    fn open(&self, path: &Path) -> AppResult<()>;
}

/// Does nothing. For headless sessions and tests.
#[derive(Debug, Default, Clone, Copy)]
pub struct NullOpener;

impl Opener for NullOpener {
    fn open(&self, _path: &Path) -> AppResult<()> {
        Ok(())
    }
}

/// Runs the first matching configured handler through the shell, detached.
#[derive(Debug, Clone)]
pub struct HandlerOpener {
    config: Config,
}

impl HandlerOpener {
    pub fn new(config: Config) -> Self {
        Self { config }
    }

    /// Command line that would be run for `path`
    pub fn command_for(&self, path: &Path) -> String {
        let name = path
            .file_name()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_default();
        self.config
            .find_handler(&name, path)
            .unwrap_or_else(|| expand_command(default_open_command(), path))
    }
}

impl HandlerOpener {
    /// Spawn the handler shell and reap it on a background thread so no
    /// zombie is left behind. The handle yields the shell's exit status.
    fn launch(&self, path: &Path) -> AppResult<JoinHandle<Option<ExitStatus>>> {
        if !path.exists() {
            return Err(AppError::NotFound(path.to_path_buf()));
        }
        let command = self.command_for(path);
        let (shell, flag) = if cfg!(windows) { ("cmd.exe", "/C") } else { ("/bin/sh", "-c") };

        let mut cmd = Command::new(shell);
        cmd.arg(flag)
            .arg(&command)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null());
        if let Some(dir) = path.parent() {
            cmd.current_dir(dir);
        }
        let mut child = cmd.spawn().map_err(|e| AppError::from_io(e, path))?;
        debug!(path = %path.display(), command = %command, "Launched handler");

        Ok(std::thread::spawn(move || match child.wait() {
            Ok(status) => Some(status),
            Err(e) => {
                warn!(error = %e, "Could not reap handler process");
                None
            }
        }))
    }
}

impl Opener for HandlerOpener {
    fn open(&self, path: &Path) -> AppResult<()> {
        self.launch(path).map(drop)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{FileHandler, GeneralConfig};

    #[cfg(not(windows))]
    #[test]
    fn test_command_for_uses_matching_handler() {
        let opener = HandlerOpener::new(Config {
            general: GeneralConfig::default(),
            handlers: vec![FileHandler {
                pattern: r"\.mp4$".to_string(),
                command: "mpv {}".to_string(),
            }],
        });
        assert_eq!(opener.command_for(Path::new("/v/a.mp4")), "mpv '/v/a.mp4'");
        // No match: platform default
        let fallback = opener.command_for(Path::new("/v/a.txt"));
        assert!(fallback.ends_with("'/v/a.txt'"));
    }

    #[cfg(unix)]
    #[test]
    fn test_handler_process_is_reaped() {
        let tmp = tempfile::TempDir::new().expect("temp dir");
        let path = tmp.path().join("clip.mp4");
        std::fs::write(&path, b"").expect("write");
        let opener = HandlerOpener::new(Config {
            general: GeneralConfig::default(),
            handlers: vec![FileHandler {
                pattern: r"\.mp4$".to_string(),
                command: "test -f {}".to_string(),
            }],
        });

        let status = opener.launch(&path).expect("launch").join().expect("join");
        assert!(status.expect("waited").success());
    }

    #[test]
    fn test_open_missing_path() {
        let opener = HandlerOpener::new(Config::default());
        let err = opener.open(Path::new("/definitely/not/here.txt")).unwrap_err();
        assert!(matches!(err, AppError::NotFound(_)));
    }
}
