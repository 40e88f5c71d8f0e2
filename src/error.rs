//! Error types for litterwatch.

/// Result type alias for litterwatch operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Coarse classification of an [`Error`], used to decide how a failed run is
/// reported.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    /// Stream open/read/write failure or unusable input.
    Io,
    /// The detector could not be built or failed on a frame.
    Detector,
    /// Invalid configuration or run parameters.
    Config,
    /// Unexpected internal failure.
    Internal,
}

/// Top-level error type for litterwatch.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// I/O operation failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Configuration directory could not be determined.
    #[error("could not determine configuration directory for this platform")]
    ConfigDirNotFound,

    /// Failed to read configuration file.
    #[error("failed to read config file '{path}'")]
    ConfigRead {
        /// Path to the config file.
        path: std::path::PathBuf,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// Failed to parse configuration file.
    #[error("failed to parse config file '{path}'")]
    ConfigParse {
        /// Path to the config file.
        path: std::path::PathBuf,
        /// Underlying parse error.
        #[source]
        source: toml::de::Error,
    },

    /// Configuration validation failed.
    #[error("configuration validation failed: {message}")]
    ConfigValidation {
        /// Description of the validation failure.
        message: String,
    },

    /// Failed to write configuration file.
    #[error("failed to write config file '{path}'")]
    ConfigWrite {
        /// Path to the config file.
        path: std::path::PathBuf,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// Failed to serialize configuration.
    #[error("failed to serialize config")]
    ConfigSerialize {
        /// Underlying serialization error.
        #[source]
        source: toml::ser::Error,
    },

    /// Model file does not exist.
    #[error("model file does not exist: {path}")]
    ModelFileNotFound {
        /// Path to the missing model file.
        path: std::path::PathBuf,
    },

    /// Labels file does not exist.
    #[error("labels file does not exist: {path}")]
    LabelsFileNotFound {
        /// Path to the missing labels file.
        path: std::path::PathBuf,
    },

    /// Failed to read labels file.
    #[error("failed to read labels file '{path}'")]
    LabelsRead {
        /// Path to the labels file.
        path: std::path::PathBuf,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// Failed to build the detector.
    #[error("failed to build detector: {reason}")]
    DetectorBuild {
        /// Description of the build failure.
        reason: String,
    },

    /// Detector failed on a frame.
    #[error("detection failed on frame {frame_index}: {reason}")]
    Detection {
        /// Index of the frame being processed.
        frame_index: u64,
        /// Description of the inference failure.
        reason: String,
    },

    /// Input is not a supported video container.
    #[error("unsupported video format: {path} (expected mp4, mov or avi)")]
    UnsupportedVideoFormat {
        /// Path to the rejected input.
        path: std::path::PathBuf,
    },

    /// Failed to open the input video.
    #[error("failed to open video '{path}'")]
    VideoOpen {
        /// Path to the video file.
        path: std::path::PathBuf,
        /// Underlying error.
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    /// Input video has no usable geometry.
    #[error("invalid video geometry: {width}x{height} @ {fps_num}/{fps_den} fps")]
    InvalidGeometry {
        /// Frame width in pixels.
        width: u32,
        /// Frame height in pixels.
        height: u32,
        /// Frame rate numerator.
        fps_num: i32,
        /// Frame rate denominator.
        fps_den: i32,
    },

    /// Failed to read or decode a frame.
    #[error("failed to decode frame {frame_index}: {reason}")]
    VideoDecode {
        /// Index of the frame being read.
        frame_index: u64,
        /// Description of the decode failure.
        reason: String,
    },

    /// Failed to create the output video.
    #[error("failed to create output video '{path}'")]
    VideoCreate {
        /// Path to the output file.
        path: std::path::PathBuf,
        /// Underlying error.
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    /// Failed to encode or write a frame.
    #[error("failed to write frame {frame_index}: {reason}")]
    VideoEncode {
        /// Index of the frame being written.
        frame_index: u64,
        /// Description of the encode failure.
        reason: String,
    },

    /// Frame buffer does not match its declared dimensions.
    #[error("frame buffer has {actual} bytes, expected {expected} for {width}x{height} RGB")]
    FrameBufferSize {
        /// Frame width in pixels.
        width: u32,
        /// Frame height in pixels.
        height: u32,
        /// Expected buffer length.
        expected: usize,
        /// Actual buffer length.
        actual: usize,
    },

    /// Frame dimensions differ from the stream geometry.
    #[error("frame is {actual_width}x{actual_height}, stream is {width}x{height}")]
    FrameGeometryMismatch {
        /// Stream width.
        width: u32,
        /// Stream height.
        height: u32,
        /// Frame width.
        actual_width: u32,
        /// Frame height.
        actual_height: u32,
    },

    /// Binary was built without a video backend.
    #[error("video support is not available (rebuild with `--features ffmpeg`)")]
    VideoBackendUnavailable,

    /// Failed to load the caption font.
    #[error("failed to load font '{path}'")]
    FontLoad {
        /// Path to the font file.
        path: std::path::PathBuf,
        /// Underlying error.
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    /// Failed to write the preview image.
    #[error("failed to write preview image '{path}'")]
    PreviewWrite {
        /// Path to the preview image.
        path: std::path::PathBuf,
        /// Underlying error.
        #[source]
        source: image::ImageError,
    },

    /// Failed to copy the annotated video to its destination.
    #[error("failed to save annotated video to '{path}'")]
    OutputSave {
        /// Destination path.
        path: std::path::PathBuf,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// Failed to serialize the run summary.
    #[error("failed to serialize run summary")]
    SummarySerialize {
        /// Underlying serialization error.
        #[source]
        source: serde_json::Error,
    },

    /// Internal error (for unexpected failures).
    #[error("internal error: {message}")]
    Internal {
        /// Error message.
        message: String,
    },
}

impl Error {
    /// Classify this error.
    pub const fn category(&self) -> ErrorCategory {
        match self {
            Self::Io(_)
            | Self::UnsupportedVideoFormat { .. }
            | Self::VideoOpen { .. }
            | Self::InvalidGeometry { .. }
            | Self::VideoDecode { .. }
            | Self::VideoCreate { .. }
            | Self::VideoEncode { .. }
            | Self::FrameBufferSize { .. }
            | Self::FrameGeometryMismatch { .. }
            | Self::VideoBackendUnavailable
            | Self::PreviewWrite { .. }
            | Self::OutputSave { .. } => ErrorCategory::Io,
            Self::ModelFileNotFound { .. }
            | Self::LabelsFileNotFound { .. }
            | Self::LabelsRead { .. }
            | Self::DetectorBuild { .. }
            | Self::Detection { .. } => ErrorCategory::Detector,
            Self::ConfigDirNotFound
            | Self::ConfigRead { .. }
            | Self::ConfigParse { .. }
            | Self::ConfigValidation { .. }
            | Self::ConfigWrite { .. }
            | Self::ConfigSerialize { .. }
            | Self::FontLoad { .. } => ErrorCategory::Config,
            Self::SummarySerialize { .. } | Self::Internal { .. } => ErrorCategory::Internal,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_detection_error_is_detector_category() {
        let err = Error::Detection {
            frame_index: 3,
            reason: "session crashed".to_string(),
        };
        assert_eq!(err.category(), ErrorCategory::Detector);
        assert_eq!(
            err.to_string(),
            "detection failed on frame 3: session crashed"
        );
    }

    #[test]
    fn test_stream_errors_are_io_category() {
        let err = Error::InvalidGeometry {
            width: 0,
            height: 480,
            fps_num: 30,
            fps_den: 1,
        };
        assert_eq!(err.category(), ErrorCategory::Io);
        assert_eq!(Error::VideoBackendUnavailable.category(), ErrorCategory::Io);
    }
}
