//! Configuration management

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use tracing::warn;

use crate::errors::{AppError, AppResult};
use crate::fs::utils::normalize_path;
use crate::history::DEFAULT_HISTORY_LIMIT;

/// Main configuration structure
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub general: GeneralConfig,
    /// File handler rules (pattern -> command)
    #[serde(default = "default_handlers")]
    pub handlers: Vec<FileHandler>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneralConfig {
    /// Directory a new session starts in (None = process working directory)
    pub start_dir: Option<String>,
    /// Max entries kept on the back stack (0 = unbounded)
    pub history_limit: usize,
    /// Keep modification time and permissions when copying
    pub preserve_attributes: bool,
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            start_dir: None,
            history_limit: DEFAULT_HISTORY_LIMIT,
            preserve_attributes: true,
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            general: GeneralConfig::default(),
            handlers: default_handlers(),
        }
    }
}

/// File handler rule: maps a regex pattern to a command
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FileHandler {
    /// Regex matched against the file name (e.g. "\\.pdf$")
    pub pattern: String,
    /// Command to run, `{}` is replaced by the quoted file path
    pub command: String,
}

/// Platform command that opens a path with its default application
pub fn default_open_command() -> &'static str {
    #[cfg(target_os = "macos")]
    { "open {}" }
    #[cfg(target_os = "windows")]
    { "explorer {}" }
    #[cfg(not(any(target_os = "macos", target_os = "windows")))]
    { "setsid xdg-open {}" }
}

pub fn default_handlers() -> Vec<FileHandler> {
    vec![FileHandler {
        pattern: ".*".to_string(),
        command: default_open_command().to_string(),
    }]
}

/// Get the config directory path for the current platform
pub fn config_dir() -> Option<PathBuf> {
    #[cfg(target_os = "windows")]
    {
        std::env::var("APPDATA")
            .ok()
            .map(|p| PathBuf::from(p).join("bark-nav"))
    }

    #[cfg(not(target_os = "windows"))]
    {
        std::env::var("XDG_CONFIG_HOME")
            .ok()
            .filter(|s| !s.is_empty())
            .map(PathBuf::from)
            .or_else(|| std::env::var("HOME").ok().map(|p| PathBuf::from(p).join(".config")))
            .map(|p| p.join("bark-nav"))
    }
}

pub fn config_file() -> Option<PathBuf> {
    config_dir().map(|p| p.join("config.toml"))
}

impl Config {
    /// Load from the platform config file, falling back to defaults
    pub fn load() -> Self {
        let Some(path) = config_file() else {
            warn!("Could not determine config directory, using defaults");
            return Config::default();
        };
        match Self::load_from(&path) {
            Ok(config) => config,
            Err(e) => {
                warn!(error = %e, "Using default configuration");
                Config::default()
            }
        }
    }

    /// Load from `path`. A missing file yields the defaults.
    pub fn load_from(path: &Path) -> AppResult<Self> {
        let content = match fs::read_to_string(path) {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Config::default()),
            Err(e) => return Err(AppError::from_io(e, path)),
        };
        Self::parse(&content)
    }

    pub fn parse(content: &str) -> AppResult<Self> {
        toml_edit::de::from_str(content).map_err(|e| AppError::Config(e.to_string()))
    }

    pub fn save_to(&self, path: &Path) -> AppResult<()> {
        if let Some(dir) = path.parent() {
            fs::create_dir_all(dir).map_err(|e| AppError::from_io(e, dir))?;
        }
        let content =
            toml_edit::ser::to_string_pretty(self).map_err(|e| AppError::Config(e.to_string()))?;
        fs::write(path, content).map_err(|e| AppError::from_io(e, path))
    }

    /// Initial directory for a session: `start_dir` if set (relative to the
    /// cwd), else the cwd
    pub fn start_dir(&self) -> AppResult<PathBuf> {
        match &self.general.start_dir {
            Some(dir) if !dir.is_empty() => Ok(normalize_path(Path::new(dir))),
            _ => std::env::current_dir().map_err(|e| AppError::from_io(e, Path::new("."))),
        }
    }

    /// First handler command matching `filename`, with `{}` replaced by the
    /// quoted path. Handlers with invalid patterns are skipped.
    pub fn find_handler(&self, filename: &str, file_path: &Path) -> Option<String> {
        for handler in &self.handlers {
            match regex::Regex::new(&handler.pattern) {
                Ok(re) if re.is_match(filename) => {
                    return Some(expand_command(&handler.command, file_path));
                }
                Ok(_) => {}
                Err(e) => warn!(pattern = %handler.pattern, error = %e, "Invalid handler pattern"),
            }
        }
        None
    }
}

/// Replace `{}` in a handler template with the quoted path
pub fn expand_command(template: &str, file_path: &Path) -> String {
    template.replace("{}", &shell_quote(&file_path.to_string_lossy()))
}

/// Quote a string for shell use
#[cfg(not(windows))]
fn shell_quote(s: &str) -> String {
    format!("'{}'", s.replace('\'', "'\\''"))
}

/// Quote a string for cmd.exe use
#[cfg(windows)]
fn shell_quote(s: &str) -> String {
    format!("\"{}\"", s.replace('"', "\\\""))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_defaults() {
        let config = Config::default();
        assert_eq!(config.general.history_limit, DEFAULT_HISTORY_LIMIT);
        assert!(config.general.preserve_attributes);
        assert_eq!(config.handlers.len(), 1);
    }

    #[test]
    fn test_parse_partial() {
        let config = Config::parse(
            r#"
[general]
start_dir = "/srv"
history_limit = 5

[[handlers]]
pattern = "\\.pdf$"
command = "zathura {}"
"#,
        )
        .expect("parse");
        assert_eq!(config.general.start_dir.as_deref(), Some("/srv"));
        assert_eq!(config.general.history_limit, 5);
        assert!(config.general.preserve_attributes);
        assert_eq!(config.handlers.len(), 1);
        assert_eq!(config.start_dir().expect("start"), PathBuf::from("/srv"));
    }

    #[test]
    fn test_relative_start_dir_is_absolute() {
        let config = Config::parse("[general]\nstart_dir = \"some/../rel\"\n").expect("parse");
        let start = config.start_dir().expect("start");
        assert!(start.is_absolute());
        assert!(start.ends_with("rel"));
        assert!(!start.components().any(|c| c.as_os_str() == ".."));
    }

    #[test]
    fn test_parse_error() {
        let err = Config::parse("[general\nbroken").unwrap_err();
        assert!(matches!(err, AppError::Config(_)));
    }

    #[test]
    fn test_save_and_load() {
        let tmp = TempDir::new().expect("temp dir");
        let path = tmp.path().join("nested/config.toml");
        assert!(Config::load_from(&path).expect("missing ok").handlers.len() == 1);

        let mut config = Config::default();
        config.general.history_limit = 42;
        config.save_to(&path).expect("save");

        let loaded = Config::load_from(&path).expect("load");
        assert_eq!(loaded.general.history_limit, 42);
    }

    #[cfg(not(windows))]
    #[test]
    fn test_find_handler() {
        let config = Config {
            general: GeneralConfig::default(),
            handlers: vec![
                FileHandler { pattern: "[".to_string(), command: "bad {}".to_string() },
                FileHandler { pattern: r"\.pdf$".to_string(), command: "zathura {}".to_string() },
            ],
        };
        let cmd = config.find_handler("it's.pdf", Path::new("/tmp/it's.pdf"));
        assert_eq!(cmd.as_deref(), Some(r"zathura '/tmp/it'\''s.pdf'"));
        assert!(config.find_handler("notes.txt", Path::new("/tmp/notes.txt")).is_none());
    }
}
