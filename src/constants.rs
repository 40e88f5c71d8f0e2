//! Application-wide constants.
//!
//! All magic numbers and strings are defined here to ensure consistency
//! and make changes easy to track.

/// Application name used for config directories and user-facing messages.
pub const APP_NAME: &str = "litterwatch";

/// Default confidence threshold passed to the detector.
pub const DEFAULT_CONFIDENCE_THRESHOLD: f32 = 0.4;

/// Default frame-skip interval (run detection on every Nth frame).
pub const DEFAULT_FRAME_SKIP: u32 = 3;

/// Confidence value bounds.
pub mod confidence {
    /// Minimum valid confidence value.
    pub const MIN: f32 = 0.0;
    /// Maximum valid confidence value.
    pub const MAX: f32 = 1.0;
    /// Decimal places used in overlay captions.
    pub const CAPTION_DECIMAL_PLACES: usize = 2;
}

/// Frame-skip bounds offered by the command line.
pub mod frame_skip {
    /// Smallest interval (every frame is processed).
    pub const MIN: u32 = 1;
    /// Largest interval accepted on the command line.
    pub const MAX: u32 = 10;
}

/// Labels that trigger drawing and alerting, with their default RGB colors.
pub mod watch_labels {
    /// Someone caught in the act of throwing garbage.
    pub const GARBAGE_THROW: &str = "garbage_throw";
    /// A dumped garbage bag.
    pub const GARBAGE_BAG: &str = "garbage_bag";
    /// Default color for [`GARBAGE_THROW`] (red).
    pub const GARBAGE_THROW_COLOR: [u8; 3] = [255, 0, 0];
    /// Default color for [`GARBAGE_BAG`] (green).
    pub const GARBAGE_BAG_COLOR: [u8; 3] = [0, 255, 0];
}

/// Overlay drawing defaults.
pub mod overlay {
    /// Rectangle stroke width in pixels.
    pub const BOX_THICKNESS: u32 = 2;
    /// Caption glyph height in pixels.
    pub const TEXT_SCALE: f32 = 22.0;
    /// Gap between the caption baseline and the top edge of the box.
    pub const TEXT_OFFSET: i32 = 10;
}

/// Detector defaults.
pub mod detector {
    /// Square model input size in pixels.
    pub const INPUT_SIZE: u32 = 640;
    /// IoU threshold for non-maximum suppression.
    pub const IOU_THRESHOLD: f32 = 0.45;
    /// ONNX Runtime intra-op threads.
    pub const THREADS: usize = 1;
    /// Default model file name.
    pub const MODEL_FILE: &str = "best.onnx";
    /// Default labels file name.
    pub const LABELS_FILE: &str = "labels.txt";
}

/// Video encoder settings.
pub mod encoder {
    /// Codec written to the output container (the `mp4v` FourCC).
    pub const CODEC_NAME: &str = "mpeg4";
    /// Target bits per pixel per frame when deriving the bit rate.
    pub const BITS_PER_PIXEL: f64 = 0.2;
    /// Largest time base term the MPEG-4 Part 2 encoder accepts.
    pub const MAX_TIME_BASE_TERM: i32 = 65_535;
}

/// Output artifact naming.
pub mod output {
    /// Prefix of the annotated video file name.
    pub const FILE_PREFIX: &str = "annotated_";
    /// `chrono` format of the timestamp in the output file name.
    pub const TIMESTAMP_FORMAT: &str = "%Y%m%d_%H%M%S";
    /// Output container extension.
    pub const EXTENSION: &str = "mp4";
    /// Suggested name when the result is downloaded.
    pub const DOWNLOAD_NAME: &str = "garbage_detection_output.mp4";
    /// MIME type of the downloadable artifact.
    pub const MIME_TYPE: &str = "video/mp4";
}

/// Accepted input container extensions.
pub const VIDEO_EXTENSIONS: &[&str] = &["mp4", "mov", "avi"];

/// Exit code used when interrupted by Ctrl+C (128 + SIGINT).
pub const INTERRUPTED_EXIT_CODE: i32 = 130;
