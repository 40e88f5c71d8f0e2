//! Platform-specific paths.

use crate::config::OutputConfig;
use crate::constants::APP_NAME;
use crate::error::{Error, Result};
use directories::ProjectDirs;
use std::path::{Path, PathBuf};

/// Configuration directory for the current platform.
///
/// - Linux: `~/.config/litterwatch/`
/// - macOS: `~/Library/Application Support/litterwatch/`
/// - Windows: `%APPDATA%\litterwatch\`
pub fn config_dir() -> Result<PathBuf> {
    ProjectDirs::from("", "", APP_NAME)
        .map(|dirs| dirs.config_dir().to_path_buf())
        .ok_or(Error::ConfigDirNotFound)
}

/// Full path to the config file.
pub fn config_file_path() -> Result<PathBuf> {
    Ok(config_dir()?.join("config.toml"))
}

/// Directory annotated videos are written to.
///
/// An explicit directory (from the command line) wins over the configured
/// one; with neither, the system temporary directory is used.
pub fn output_dir(explicit: Option<&Path>, output: &OutputConfig) -> PathBuf {
    explicit
        .map(Path::to_path_buf)
        .or_else(|| output.dir.clone())
        .unwrap_or_else(std::env::temp_dir)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_config_file_path_ends_with_toml() {
        let result = config_file_path();
        assert!(result.is_ok());
        let path = result.ok().unwrap();
        assert!(path.to_string_lossy().contains(APP_NAME));
        assert!(path.to_string_lossy().ends_with("config.toml"));
    }

    #[test]
    fn test_output_dir_prefers_explicit() {
        let output = OutputConfig {
            dir: Some(PathBuf::from("/configured")),
            ..OutputConfig::default()
        };
        let dir = output_dir(Some(Path::new("/explicit")), &output);
        assert_eq!(dir, PathBuf::from("/explicit"));
    }

    #[test]
    fn test_output_dir_uses_configured_then_temp() {
        let configured = OutputConfig {
            dir: Some(PathBuf::from("/configured")),
            ..OutputConfig::default()
        };
        assert_eq!(output_dir(None, &configured), PathBuf::from("/configured"));
        assert_eq!(
            output_dir(None, &OutputConfig::default()),
            std::env::temp_dir()
        );
    }
}
