//! OS directory resolution.
//!
//! Config and log locations follow the platform conventions (XDG on Linux,
//! Known Folders on Windows, Library on macOS) unless `--config` names a
//! directory explicitly.

use std::path::{Path, PathBuf};

/// Errors that can occur during platform operations.
#[derive(Debug, thiserror::Error)]
pub enum PlatformError {
    #[error("could not determine OS configuration directory")]
    NoConfigDir,

    #[error("platform I/O error: {0}")]
    Io(#[from] std::io::Error),
}

pub const APP_NAME: &str = "orrery";

/// Where the orrery keeps its files.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlatformDirs {
    /// Holds `config.ron`.
    pub config_dir: PathBuf,
    /// Holds the JSON log written by debug builds.
    pub log_dir: PathBuf,
}

impl PlatformDirs {
    /// Resolve platform-specific directories without creating them on disk.
    pub fn resolve() -> Result<Self, PlatformError> {
        let app_dir = dirs::config_dir()
            .ok_or(PlatformError::NoConfigDir)?
            .join(APP_NAME);
        let log_dir = dirs::state_dir()
            .map(|d| d.join(APP_NAME).join("logs"))
            .unwrap_or_else(|| app_dir.join("logs"));
        Ok(Self {
            config_dir: app_dir,
            log_dir,
        })
    }

    /// Use `dir` for the config file and `dir/logs` for logs.
    pub fn with_config_dir(dir: &Path) -> Self {
        Self {
            config_dir: dir.to_path_buf(),
            log_dir: dir.join("logs"),
        }
    }

    /// The `--config` directory if given, otherwise the platform default.
    pub fn from_override(config_override: Option<&Path>) -> Result<Self, PlatformError> {
        match config_override {
            Some(dir) => Ok(Self::with_config_dir(dir)),
            None => Self::resolve(),
        }
    }

    /// Create both directories on disk.
    pub fn create_dirs(&self) -> Result<(), PlatformError> {
        std::fs::create_dir_all(&self.config_dir)?;
        std::fs::create_dir_all(&self.log_dir)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resolved_dirs_are_absolute() {
        // Headless CI images may lack a home directory.
        let Ok(dirs) = PlatformDirs::resolve() else {
            return;
        };
        assert!(dirs.config_dir.is_absolute());
        assert!(dirs.log_dir.is_absolute());
        assert!(dirs.config_dir.ends_with(APP_NAME));
    }

    #[test]
    fn test_override_wins() {
        let tmp = tempfile::tempdir().unwrap();
        let dirs = PlatformDirs::from_override(Some(tmp.path())).unwrap();
        assert_eq!(dirs.config_dir, tmp.path());
        assert_eq!(dirs.log_dir, tmp.path().join("logs"));
    }

    #[test]
    fn test_directory_creation() {
        let tmp = tempfile::tempdir().unwrap();
        let dirs = PlatformDirs::with_config_dir(&tmp.path().join("nested").join(APP_NAME));
        dirs.create_dirs().unwrap();
        assert!(dirs.config_dir.is_dir());
        assert!(dirs.log_dir.is_dir());
    }
}
