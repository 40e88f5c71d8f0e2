//! Configuration type definitions.

use crate::constants::{
    DEFAULT_CONFIDENCE_THRESHOLD, DEFAULT_FRAME_SKIP, detector, output, overlay, watch_labels,
};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Complete application configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Detector model settings.
    #[serde(default)]
    pub model: ModelConfig,

    /// Default run settings.
    #[serde(default)]
    pub defaults: DefaultsConfig,

    /// Overlay drawing settings.
    #[serde(default)]
    pub overlay: OverlayConfig,

    /// Output settings.
    #[serde(default)]
    pub output: OutputConfig,
}

/// Detector model configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ModelConfig {
    /// Path to the ONNX model file.
    pub path: PathBuf,

    /// Path to the labels file (one class name per line).
    pub labels: PathBuf,

    /// Square input size the model was exported with.
    pub input_size: u32,

    /// IoU threshold for non-maximum suppression.
    pub iou_threshold: f32,

    /// ONNX Runtime intra-op thread count.
    pub threads: usize,
}

impl Default for ModelConfig {
    fn default() -> Self {
        Self {
            path: PathBuf::from(detector::MODEL_FILE),
            labels: PathBuf::from(detector::LABELS_FILE),
            input_size: detector::INPUT_SIZE,
            iou_threshold: detector::IOU_THRESHOLD,
            threads: detector::THREADS,
        }
    }
}

/// Default run settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DefaultsConfig {
    /// Confidence threshold handed to the detector.
    pub confidence_threshold: f32,

    /// Run detection on every Nth frame.
    pub frame_skip: u32,
}

impl Default for DefaultsConfig {
    fn default() -> Self {
        Self {
            confidence_threshold: DEFAULT_CONFIDENCE_THRESHOLD,
            frame_skip: DEFAULT_FRAME_SKIP,
        }
    }
}

/// One watched label and the color its boxes are drawn in.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LabelColor {
    /// Class name as produced by the detector.
    pub name: String,

    /// RGB draw color.
    pub color: [u8; 3],
}

/// Overlay drawing settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct OverlayConfig {
    /// Rectangle stroke width in pixels.
    pub box_thickness: u32,

    /// TrueType/OpenType font for captions. The bundled DejaVu Sans is used when unset.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub font_path: Option<PathBuf>,

    /// Caption glyph height in pixels.
    pub text_scale: f32,

    /// Gap between caption baseline and the box top edge.
    pub text_offset: i32,

    /// Watched labels. Detections with any other label are ignored.
    pub labels: Vec<LabelColor>,
}

impl Default for OverlayConfig {
    fn default() -> Self {
        Self {
            box_thickness: overlay::BOX_THICKNESS,
            font_path: None,
            text_scale: overlay::TEXT_SCALE,
            text_offset: overlay::TEXT_OFFSET,
            labels: vec![
                LabelColor {
                    name: watch_labels::GARBAGE_THROW.to_string(),
                    color: watch_labels::GARBAGE_THROW_COLOR,
                },
                LabelColor {
                    name: watch_labels::GARBAGE_BAG.to_string(),
                    color: watch_labels::GARBAGE_BAG_COLOR,
                },
            ],
        }
    }
}

/// Output settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    /// Directory for annotated videos (system temp dir when unset).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub dir: Option<PathBuf>,

    /// File name prefix for annotated videos.
    pub prefix: String,

    /// Suggested file name when saving the result elsewhere.
    pub download_name: String,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            dir: None,
            prefix: output::FILE_PREFIX.to_string(),
            download_name: output::DOWNLOAD_NAME.to_string(),
        }
    }
}

#[cfg(test)]
#[allow(clippy::float_cmp)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_config_default_values() {
        let defaults = DefaultsConfig::default();
        assert_eq!(defaults.confidence_threshold, 0.4);
        assert_eq!(defaults.frame_skip, 3);
    }

    #[test]
    fn test_default_overlay_watches_garbage_labels() {
        let overlay = OverlayConfig::default();
        let names: Vec<&str> = overlay.labels.iter().map(|l| l.name.as_str()).collect();
        assert_eq!(names, vec!["garbage_throw", "garbage_bag"]);
        assert_eq!(overlay.labels[1].color, [0, 255, 0]);
    }

    #[test]
    fn test_partial_toml_keeps_other_defaults() {
        let config: Config = toml::from_str(
            r#"
[defaults]
frame_skip = 5
"#,
        )
        .unwrap_or_default();
        assert_eq!(config.defaults.frame_skip, 5);
        assert_eq!(config.defaults.confidence_threshold, 0.4);
        assert_eq!(config.model.input_size, 640);
        assert_eq!(config.output.prefix, "annotated_");
    }
}
