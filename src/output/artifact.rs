//! The finished, downloadable annotated video.

use crate::constants::output::{EXTENSION, MIME_TYPE, TIMESTAMP_FORMAT};
use crate::error::{Error, Result};
use chrono::{DateTime, Local};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::info;

/// Build `<dir>/<prefix><timestamp>.mp4`, adding `_N` when the name is taken.
pub fn timestamped_output_path(dir: &Path, prefix: &str, now: DateTime<Local>) -> PathBuf {
    let stem = format!("{prefix}{}", now.format(TIMESTAMP_FORMAT));
    let mut path = dir.join(format!("{stem}.{EXTENSION}"));
    let mut n = 1;
    while path.exists() {
        path = dir.join(format!("{stem}_{n}.{EXTENSION}"));
        n += 1;
    }
    path
}

/// A completed annotated video, ready to be handed to the user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AnnotatedVideo {
    path: PathBuf,
    download_name: String,
}

impl AnnotatedVideo {
    /// Wrap a finalized video file.
    pub fn new(path: PathBuf, download_name: impl Into<String>) -> Self {
        Self {
            path,
            download_name: download_name.into(),
        }
    }

    /// Where the video was written.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Suggested file name for downloads.
    pub fn download_name(&self) -> &str {
        &self.download_name
    }

    /// MIME type of the video.
    pub const fn mime_type(&self) -> &'static str {
        MIME_TYPE
    }

    /// Full file contents.
    pub fn bytes(&self) -> Result<Vec<u8>> {
        Ok(fs::read(&self.path)?)
    }

    /// Copy the video to `dest`. A directory destination receives the file
    /// under [`download_name`](Self::download_name).
    pub fn save_as(&self, dest: &Path) -> Result<PathBuf> {
        let target = if dest.is_dir() {
            dest.join(&self.download_name)
        } else {
            dest.to_path_buf()
        };

        fs::copy(&self.path, &target).map_err(|e| Error::OutputSave {
            path: target.clone(),
            source: e,
        })?;
        info!(path = %target.display(), "saved annotated video");
        Ok(target)
    }
}
