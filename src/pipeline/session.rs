//! Per-run parameters and pipeline state.

use crate::config::{OutputConfig, output_dir};
use crate::constants::confidence;
use crate::error::{Error, Result};
use std::path::{Path, PathBuf};

/// Settings fixed for the duration of one run.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SessionParams {
    confidence_threshold: f32,
    frame_skip: u32,
}

impl SessionParams {
    /// Validate and build session parameters.
    ///
    /// `confidence_threshold` must lie in `[0, 1]`; `frame_skip` must be at
    /// least 1.
    pub fn new(confidence_threshold: f32, frame_skip: u32) -> Result<Self> {
        if !(confidence::MIN..=confidence::MAX).contains(&confidence_threshold) {
            return Err(Error::ConfigValidation {
                message: format!(
                    "confidence threshold must be between {} and {}, got {confidence_threshold}",
                    confidence::MIN,
                    confidence::MAX
                ),
            });
        }
        if frame_skip == 0 {
            return Err(Error::ConfigValidation {
                message: "frame skip must be at least 1".to_string(),
            });
        }
        Ok(Self {
            confidence_threshold,
            frame_skip,
        })
    }

    /// Threshold handed to the detector.
    pub const fn confidence_threshold(&self) -> f32 {
        self.confidence_threshold
    }

    /// Detection interval in frames.
    pub const fn frame_skip(&self) -> u32 {
        self.frame_skip
    }

    /// Whether frame `index` goes through the detector.
    pub fn should_process(&self, index: u64) -> bool {
        index % u64::from(self.frame_skip) == 0
    }
}

/// Lifecycle of an [`AnnotationPipeline`](super::AnnotationPipeline).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PipelineState {
    /// No run started yet.
    #[default]
    Idle,
    /// Frames are being read, annotated and written.
    Streaming,
    /// Last run reached the end of the input.
    Done,
    /// Last run stopped on an error.
    Failed,
}

/// Where and under which names a file-level run writes its result.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutputSettings {
    /// Directory receiving the annotated video.
    pub dir: PathBuf,
    /// File name prefix before the timestamp.
    pub prefix: String,
    /// Suggested name for downloads.
    pub download_name: String,
}

impl OutputSettings {
    /// Resolve settings from config, with `explicit_dir` taking precedence.
    pub fn resolve(explicit_dir: Option<&Path>, output: &OutputConfig) -> Self {
        Self {
            dir: output_dir(explicit_dir, output),
            prefix: output.prefix.clone(),
            download_name: output.download_name.clone(),
        }
    }
}
