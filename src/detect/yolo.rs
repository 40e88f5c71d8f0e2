//! YOLOv8-style ONNX detector.
//!
//! Expects an Ultralytics export with input `[1, 3, S, S]` (RGB, 0..1) and a
//! single output of `[1, 4 + C, N]` rows (`cx, cy, w, h`, then one score per
//! class). The transposed `[1, N, 4 + C]` layout is accepted too.

use crate::config::{ModelConfig, validate_model_config};
use crate::detect::{BoundingBox, Detection, Detector, read_labels};
use crate::error::{Error, Result};
use crate::video::Frame;
use image::imageops::{self, FilterType};
use image::{ImageBuffer, Rgb};
use ort::session::Session;
use ort::value::Tensor;
use std::path::Path;
use tracing::{debug, info, warn};

/// Number of box coordinates preceding the class scores.
const BOX_CHANNELS: usize = 4;

/// ONNX Runtime session plus the class names it was trained on.
pub struct YoloDetector {
    session: Session,
    labels: Vec<String>,
    input_size: u32,
    iou_threshold: f32,
    warned_unlabeled: bool,
}

impl YoloDetector {
    /// Load the model and labels named by `model`.
    pub fn from_config(model: &ModelConfig) -> Result<Self> {
        validate_model_config(model)?;
        let labels = read_labels(&model.labels)?;
        if labels.is_empty() {
            return Err(Error::DetectorBuild {
                reason: format!("labels file '{}' is empty", model.labels.display()),
            });
        }

        let session = build_session(&model.path, model.threads)?;
        info!(
            model = %model.path.display(),
            classes = labels.len(),
            input_size = model.input_size,
            "loaded detector"
        );

        Ok(Self {
            session,
            labels,
            input_size: model.input_size,
            iou_threshold: model.iou_threshold,
            warned_unlabeled: false,
        })
    }

    fn label_for(&mut self, class_id: usize) -> String {
        if let Some(label) = self.labels.get(class_id) {
            return label.clone();
        }
        if !self.warned_unlabeled {
            warn!(
                class_id,
                known = self.labels.len(),
                "model produced a class without a label; labels file may not match the model"
            );
            self.warned_unlabeled = true;
        }
        format!("class_{class_id}")
    }
}

impl Detector for YoloDetector {
    fn detect(&mut self, frame: &Frame, confidence_threshold: f32) -> Result<Vec<Detection>> {
        let inference_error = |reason: String| Error::Detection {
            frame_index: frame.index,
            reason,
        };

        let input = preprocess(frame, self.input_size).map_err(inference_error)?;

        let candidates = {
            let outputs = self
                .session
                .run(ort::inputs![input])
                .map_err(|e| inference_error(e.to_string()))?;

            let (_name, value) = outputs
                .iter()
                .next()
                .ok_or_else(|| inference_error("model produced no outputs".to_string()))?;
            let (shape, data) = value
                .try_extract_tensor::<f32>()
                .map_err(|e| inference_error(e.to_string()))?;

            let layout = OutputLayout::from_shape(shape).map_err(inference_error)?;

            #[allow(clippy::cast_precision_loss)]
            let scale = (
                frame.width() as f32 / self.input_size as f32,
                frame.height() as f32 / self.input_size as f32,
            );
            decode_predictions(data, layout, confidence_threshold, scale).map_err(inference_error)?
        };

        let kept = non_max_suppression(candidates, self.iou_threshold);
        debug!(
            frame = frame.index,
            detections = kept.len(),
            "detector pass complete"
        );

        Ok(kept
            .into_iter()
            .map(|c| {
                let label = self.label_for(c.class_id);
                Detection::new(label, c.confidence, c.to_bbox())
            })
            .collect())
    }
}

fn build_session(model_path: &Path, threads: usize) -> Result<Session> {
    let build_error = |e: &dyn std::fmt::Display| Error::DetectorBuild {
        reason: e.to_string(),
    };

    let builder = Session::builder().map_err(|e| build_error(&e))?;
    let mut builder = builder
        .with_intra_threads(threads)
        .map_err(|e| build_error(&e))?;
    builder
        .commit_from_file(model_path)
        .map_err(|e| build_error(&e))
}

/// Resize to the model's square input and lay out as NCHW floats in `[0, 1]`.
fn preprocess(frame: &Frame, size: u32) -> std::result::Result<Tensor<f32>, String> {
    let view: ImageBuffer<Rgb<u8>, &[u8]> =
        ImageBuffer::from_raw(frame.width(), frame.height(), frame.data())
            .ok_or_else(|| "frame buffer does not match its dimensions".to_string())?;
    let resized = imageops::resize(&view, size, size, FilterType::Triangle);

    let plane = (size * size) as usize;
    let mut tensor_data = vec![0f32; 3 * plane];
    for (idx, pixel) in resized.pixels().enumerate() {
        tensor_data[idx] = f32::from(pixel[0]) / 255.0;
        tensor_data[plane + idx] = f32::from(pixel[1]) / 255.0;
        tensor_data[2 * plane + idx] = f32::from(pixel[2]) / 255.0;
    }

    let shape = [1usize, 3, size as usize, size as usize];
    Tensor::from_array((shape, tensor_data.into_boxed_slice())).map_err(|e| e.to_string())
}

/// Shape of the raw prediction tensor.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct OutputLayout {
    /// Number of proposals (`N`).
    pub proposals: usize,
    /// Number of classes (`C`).
    pub classes: usize,
    /// `true` for `[1, N, 4 + C]`, `false` for `[1, 4 + C, N]`.
    pub transposed: bool,
}

impl OutputLayout {
    pub(crate) fn from_shape(shape: &[i64]) -> std::result::Result<Self, String> {
        let [_, a, b] = shape else {
            return Err(format!("expected a rank-3 output tensor, got {shape:?}"));
        };
        let (a, b) = (
            usize::try_from(*a).map_err(|_| format!("bad output dimension {a}"))?,
            usize::try_from(*b).map_err(|_| format!("bad output dimension {b}"))?,
        );

        // Channels (4 + C) are far fewer than proposals in every real export.
        let (channels, proposals, transposed) = if a <= b { (a, b, false) } else { (b, a, true) };
        if channels <= BOX_CHANNELS {
            return Err(format!("output has no class scores: {shape:?}"));
        }

        Ok(Self {
            proposals,
            classes: channels - BOX_CHANNELS,
            transposed,
        })
    }

    fn value(&self, data: &[f32], channel: usize, proposal: usize) -> f32 {
        let channels = BOX_CHANNELS + self.classes;
        if self.transposed {
            data[proposal * channels + channel]
        } else {
            data[channel * self.proposals + proposal]
        }
    }
}

/// A decoded proposal in frame coordinates.
#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) struct Candidate {
    pub class_id: usize,
    pub confidence: f32,
    pub x1: f32,
    pub y1: f32,
    pub x2: f32,
    pub y2: f32,
}

impl Candidate {
    fn area(&self) -> f32 {
        (self.x2 - self.x1).max(0.0) * (self.y2 - self.y1).max(0.0)
    }

    fn iou(&self, other: &Self) -> f32 {
        let ix1 = self.x1.max(other.x1);
        let iy1 = self.y1.max(other.y1);
        let ix2 = self.x2.min(other.x2);
        let iy2 = self.y2.min(other.y2);
        let inter = (ix2 - ix1).max(0.0) * (iy2 - iy1).max(0.0);
        if inter == 0.0 {
            return 0.0;
        }
        inter / (self.area() + other.area() - inter)
    }

    #[allow(clippy::cast_possible_truncation)]
    fn to_bbox(self) -> BoundingBox {
        BoundingBox::new(
            self.x1.round() as i32,
            self.y1.round() as i32,
            self.x2.round() as i32,
            self.y2.round() as i32,
        )
    }
}

/// Pick the best class of every proposal and keep those scoring at least
/// `threshold`. Boxes are scaled from model input space to frame pixels.
///
/// Fails when `data` holds fewer values than `layout` describes.
pub(crate) fn decode_predictions(
    data: &[f32],
    layout: OutputLayout,
    threshold: f32,
    (scale_x, scale_y): (f32, f32),
) -> std::result::Result<Vec<Candidate>, String> {
    let expected = (BOX_CHANNELS + layout.classes) * layout.proposals;
    if data.len() < expected {
        return Err(format!(
            "output tensor holds {} values, expected {expected}",
            data.len()
        ));
    }

    let candidates = (0..layout.proposals)
        .filter_map(|i| {
            let (class_id, score) = (0..layout.classes)
                .map(|c| (c, layout.value(data, BOX_CHANNELS + c, i)))
                .fold((0, f32::MIN), |best, cur| if cur.1 > best.1 { cur } else { best });

            if score < threshold {
                return None;
            }

            let cx = layout.value(data, 0, i);
            let cy = layout.value(data, 1, i);
            let w = layout.value(data, 2, i);
            let h = layout.value(data, 3, i);

            Some(Candidate {
                class_id,
                confidence: score,
                x1: (cx - w / 2.0) * scale_x,
                y1: (cy - h / 2.0) * scale_y,
                x2: (cx + w / 2.0) * scale_x,
                y2: (cy + h / 2.0) * scale_y,
            })
        })
        .collect();
    Ok(candidates)
}

/// Greedy per-class NMS: highest confidence first, drop same-class boxes
/// overlapping a kept one by more than `iou_threshold`.
pub(crate) fn non_max_suppression(mut boxes: Vec<Candidate>, iou_threshold: f32) -> Vec<Candidate> {
    boxes.sort_by(|a, b| {
        b.confidence
            .partial_cmp(&a.confidence)
            .unwrap_or(std::cmp::Ordering::Equal)
    });

    let mut kept: Vec<Candidate> = Vec::new();
    for candidate in boxes {
        let overlaps = kept
            .iter()
            .any(|k| k.class_id == candidate.class_id && k.iou(&candidate) > iou_threshold);
        if !overlaps {
            kept.push(candidate);
        }
    }
    kept
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    /// Build a `[1, 4 + C, N]` tensor from per-proposal rows.
    fn channel_major(rows: &[[f32; 6]]) -> Vec<f32> {
        let n = rows.len();
        let mut data = vec![0f32; 6 * n];
        for (i, row) in rows.iter().enumerate() {
            for (c, v) in row.iter().enumerate() {
                data[c * n + i] = *v;
            }
        }
        data
    }

    const LAYOUT_2: OutputLayout = OutputLayout {
        proposals: 2,
        classes: 2,
        transposed: false,
    };

    #[test]
    fn test_layout_from_shape() {
        let layout = OutputLayout::from_shape(&[1, 6, 8400]).ok();
        assert_eq!(
            layout,
            Some(OutputLayout {
                proposals: 8400,
                classes: 2,
                transposed: false
            })
        );
        let layout = OutputLayout::from_shape(&[1, 8400, 84]).ok();
        assert_eq!(layout.map(|l| (l.classes, l.transposed)), Some((80, true)));
        assert!(OutputLayout::from_shape(&[1, 8400]).is_err());
        assert!(OutputLayout::from_shape(&[1, 4, 8400]).is_err());
    }

    #[test]
    fn test_threshold_is_inclusive() {
        let data = channel_major(&[
            [100.0, 100.0, 20.0, 20.0, 0.4, 0.1],
            [300.0, 300.0, 20.0, 20.0, 0.1, 0.39],
        ]);
        let found = decode_predictions(&data, LAYOUT_2, 0.4, (1.0, 1.0)).unwrap();
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].class_id, 0);
    }

    #[test]
    fn test_threshold_one_excludes_high_confidence() {
        let data = channel_major(&[
            [100.0, 100.0, 20.0, 20.0, 0.0, 0.99],
            [300.0, 300.0, 20.0, 20.0, 0.2, 0.1],
        ]);
        assert!(decode_predictions(&data, LAYOUT_2, 1.0, (1.0, 1.0)).unwrap().is_empty());
    }

    #[test]
    fn test_boxes_scaled_to_frame() {
        let data = channel_major(&[
            [320.0, 320.0, 64.0, 32.0, 0.1, 0.9],
            [0.0, 0.0, 0.0, 0.0, 0.0, 0.0],
        ]);
        let found = decode_predictions(&data, LAYOUT_2, 0.5, (2.0, 0.5)).unwrap();
        assert_eq!(found.len(), 1);
        let bbox = found[0].to_bbox();
        assert_eq!(bbox, BoundingBox::new(576, 152, 704, 168));
        assert_eq!(found[0].class_id, 1);
    }

    #[test]
    fn test_transposed_layout_matches_channel_major() {
        let rows = [
            [50.0, 60.0, 10.0, 10.0, 0.7, 0.2],
            [10.0, 10.0, 4.0, 4.0, 0.1, 0.8],
        ];
        let transposed: Vec<f32> = rows.iter().flatten().copied().collect();
        let layout = OutputLayout {
            transposed: true,
            ..LAYOUT_2
        };
        let a = decode_predictions(&channel_major(&rows), LAYOUT_2, 0.5, (1.0, 1.0)).unwrap();
        let b = decode_predictions(&transposed, layout, 0.5, (1.0, 1.0)).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn test_short_output_tensor_is_an_error() {
        let data = channel_major(&[[100.0, 100.0, 20.0, 20.0, 0.9, 0.1]]);
        let err = decode_predictions(&data, LAYOUT_2, 0.4, (1.0, 1.0)).unwrap_err();
        assert!(err.contains("expected 12"), "{err}");
    }

    #[test]
    fn test_nms_is_per_class() {
        let base = Candidate {
            class_id: 0,
            confidence: 0.9,
            x1: 0.0,
            y1: 0.0,
            x2: 10.0,
            y2: 10.0,
        };
        let overlapping = Candidate {
            confidence: 0.8,
            x1: 1.0,
            ..base
        };
        let other_class = Candidate {
            class_id: 1,
            confidence: 0.7,
            ..base
        };
        let kept = non_max_suppression(vec![overlapping, other_class, base], 0.45);
        assert_eq!(kept.len(), 2);
        assert!((kept[0].confidence - 0.9).abs() < f32::EPSILON);
        assert_eq!(kept[1].class_id, 1);
    }
}
