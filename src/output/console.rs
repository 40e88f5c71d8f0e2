//! Terminal observer: progress bar, alert warnings and the preview image.

use crate::error::{Error, Result};
use crate::output::RunSummary;
use crate::output::progress::{create_frame_progress, finish_progress, inc_progress};
use crate::pipeline::{Alert, FrameEvent, FrameObserver};
use crate::video::{Frame, VideoGeometry};
use image::{ColorType, ImageFormat};
use indicatif::ProgressBar;
use std::path::{Path, PathBuf};
use tracing::warn;

/// Write `frame` as a PNG image.
pub fn write_preview(path: &Path, frame: &Frame) -> Result<()> {
    image::save_buffer_with_format(
        path,
        frame.data(),
        frame.width(),
        frame.height(),
        ColorType::Rgb8,
        ImageFormat::Png,
    )
    .map_err(|e| Error::PreviewWrite {
        path: path.to_path_buf(),
        source: e,
    })
}

/// Observer used by the command line.
pub struct ConsoleObserver {
    file_name: String,
    progress_enabled: bool,
    progress: Option<ProgressBar>,
    preview_path: Option<PathBuf>,
    preview_failed: bool,
}

impl ConsoleObserver {
    /// Observer for the video named `file_name`.
    pub fn new(file_name: impl Into<String>, progress_enabled: bool) -> Self {
        Self {
            file_name: file_name.into(),
            progress_enabled,
            progress: None,
            preview_path: None,
            preview_failed: false,
        }
    }

    /// Keep the latest analyzed frame in `path` as a PNG.
    #[must_use]
    pub fn with_preview(mut self, path: impl Into<PathBuf>) -> Self {
        self.preview_path = Some(path.into());
        self
    }

    /// Run `f` with the progress bar hidden so log lines do not tear it.
    fn suspended(&self, f: impl FnOnce()) {
        match &self.progress {
            Some(pb) => pb.suspend(f),
            None => f(),
        }
    }
}

impl FrameObserver for ConsoleObserver {
    fn run_started(&mut self, _geometry: &VideoGeometry, frame_count: Option<u64>) {
        self.progress = create_frame_progress(frame_count, &self.file_name, self.progress_enabled);
    }

    fn frame_annotated(&mut self, event: &FrameEvent<'_>) {
        let Some(path) = &self.preview_path else {
            return;
        };
        if let Err(e) = write_preview(path, event.frame) {
            if !self.preview_failed {
                self.suspended(|| warn!(error = %e, "preview disabled"));
            }
            self.preview_failed = true;
            self.preview_path = None;
        }
    }

    fn alert(&mut self, alert: &Alert<'_>) {
        let labels = alert.labels().join(", ");
        let count = alert.detections.len();
        let frame = alert.frame_index;
        self.suspended(|| warn!(frame, detections = count, "garbage detected: {labels}"));
    }

    fn frame_written(&mut self, _index: u64) {
        inc_progress(self.progress.as_ref());
    }

    fn run_finished(&mut self, summary: &RunSummary) {
        let message = format!("{} alerts", summary.alerted_frames.len());
        finish_progress(self.progress.take().as_ref(), &message);
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::detect::{BoundingBox, Detection};
    use tempfile::TempDir;

    fn frame() -> Frame {
        let mut data = vec![0u8; 4 * 3 * 3];
        data[0..3].copy_from_slice(&[255, 0, 0]);
        Frame::new(4, 3, data, 0).unwrap()
    }

    #[test]
    fn test_write_preview_png() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("preview.png");

        write_preview(&path, &frame()).unwrap();

        let img = image::open(&path).unwrap().to_rgb8();
        assert_eq!(img.dimensions(), (4, 3));
        assert_eq!(img.get_pixel(0, 0).0, [255, 0, 0]);
    }

    #[test]
    fn test_preview_updated_on_annotated_frame() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("latest.png");
        let mut observer = ConsoleObserver::new("clip.mp4", false).with_preview(&path);

        let detections = [Detection::new("garbage_bag", 0.8, BoundingBox::new(0, 0, 1, 1))];
        let frame = frame();
        observer.frame_annotated(&FrameEvent {
            frame: &frame,
            detections: &detections,
        });

        assert!(path.exists());
    }

    #[test]
    fn test_unwritable_preview_is_disabled() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("missing").join("latest.png");
        let mut observer = ConsoleObserver::new("clip.mp4", false).with_preview(&path);

        let frame = frame();
        observer.frame_annotated(&FrameEvent {
            frame: &frame,
            detections: &[],
        });

        assert!(observer.preview_path.is_none());
        assert!(observer.preview_failed);
    }
}
