//! Video input and output.
//!
//! The pipeline only sees the [`FrameSource`] and [`FrameSink`] traits. The
//! FFmpeg-backed implementations live behind the `ffmpeg` feature; without
//! it, [`open_source`] and [`create_sink`] fail with
//! [`Error::VideoBackendUnavailable`](crate::Error::VideoBackendUnavailable).

#[cfg(feature = "ffmpeg")]
mod ffmpeg;
mod frame;

#[cfg(feature = "ffmpeg")]
pub use ffmpeg::{FfmpegSink, FfmpegSource};
pub use frame::{Frame, FrameRate, VideoGeometry};

use crate::constants::VIDEO_EXTENSIONS;
use crate::error::{Error, Result};
use std::path::Path;

/// Sequential reader of decoded frames.
pub trait FrameSource {
    /// Geometry every frame of this source has.
    fn geometry(&self) -> VideoGeometry;

    /// Read the next frame. `Ok(None)` marks the end of the stream.
    fn read_frame(&mut self) -> Result<Option<Frame>>;

    /// Frame count advertised by the container, if any.
    fn frame_count_hint(&self) -> Option<u64> {
        None
    }
}

/// Sequential writer of frames into an encoded stream.
pub trait FrameSink {
    /// Append one frame.
    fn write_frame(&mut self, frame: &Frame) -> Result<()>;

    /// Flush buffered data and finalize the container.
    fn finish(&mut self) -> Result<()>;
}

/// Check whether a path has a supported video container extension.
pub fn is_video_file(path: &Path) -> bool {
    path.extension().is_some_and(|ext| {
        VIDEO_EXTENSIONS
            .iter()
            .any(|known| ext.eq_ignore_ascii_case(std::ffi::OsStr::new(known)))
    })
}

/// Reject inputs whose extension is not a supported container.
pub fn check_extension(path: &Path) -> Result<()> {
    if is_video_file(path) {
        Ok(())
    } else {
        Err(Error::UnsupportedVideoFormat {
            path: path.to_path_buf(),
        })
    }
}

/// Open a video file for decoding.
#[cfg(feature = "ffmpeg")]
pub fn open_source(path: &Path) -> Result<Box<dyn FrameSource>> {
    Ok(Box::new(FfmpegSource::open(path)?))
}

/// Open a video file for decoding.
#[cfg(not(feature = "ffmpeg"))]
pub fn open_source(_path: &Path) -> Result<Box<dyn FrameSource>> {
    Err(crate::Error::VideoBackendUnavailable)
}

/// Create an encoded video file with the given geometry.
#[cfg(feature = "ffmpeg")]
pub fn create_sink(path: &Path, geometry: VideoGeometry) -> Result<Box<dyn FrameSink>> {
    Ok(Box::new(FfmpegSink::create(path, geometry)?))
}

/// Create an encoded video file with the given geometry.
#[cfg(not(feature = "ffmpeg"))]
pub fn create_sink(_path: &Path, _geometry: VideoGeometry) -> Result<Box<dyn FrameSink>> {
    Err(crate::Error::VideoBackendUnavailable)
}

/// Opens sources and creates sinks for file-level runs.
pub trait VideoBackend {
    /// Open `path` for decoding.
    fn open_source(&self, path: &Path) -> Result<Box<dyn FrameSource>>;

    /// Create `path` for encoding frames of `geometry`.
    fn create_sink(&self, path: &Path, geometry: VideoGeometry) -> Result<Box<dyn FrameSink>>;
}

/// Backend compiled into this binary ([`open_source`] / [`create_sink`]).
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemBackend;

impl VideoBackend for SystemBackend {
    fn open_source(&self, path: &Path) -> Result<Box<dyn FrameSource>> {
        open_source(path)
    }

    fn create_sink(&self, path: &Path, geometry: VideoGeometry) -> Result<Box<dyn FrameSink>> {
        create_sink(path, geometry)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_is_video_file() {
        assert!(is_video_file(Path::new("clip.mp4")));
        assert!(is_video_file(Path::new("clip.MOV")));
        assert!(is_video_file(Path::new("/tmp/street.avi")));
        assert!(!is_video_file(Path::new("clip.mkv")));
        assert!(!is_video_file(Path::new("notes")));
    }

    #[test]
    fn test_check_extension() {
        check_extension(Path::new("street.AVI")).unwrap();
        let err = check_extension(Path::new("street.webm")).unwrap_err();
        assert!(matches!(err, Error::UnsupportedVideoFormat { .. }));
    }

    #[test]
    fn test_is_video_file_with_unicode() {
        assert!(is_video_file(Path::new("roskaa_kadulla.mp4")));
        assert!(is_video_file(Path::new("ゴミ.mov")));
    }
}
