//! Object detection on decoded frames.

mod labels;
mod types;
mod yolo;

pub use labels::read_labels;
pub use types::{BoundingBox, Detection};
pub use yolo::YoloDetector;

use crate::error::Result;
use crate::video::Frame;

/// Anything that can find labeled boxes in a frame.
///
/// Implementations return every detection scoring at least
/// `confidence_threshold`, for all classes they know; callers decide which
/// labels matter.
pub trait Detector {
    /// Run detection on one frame.
    fn detect(&mut self, frame: &Frame, confidence_threshold: f32) -> Result<Vec<Detection>>;
}

impl<D: Detector + ?Sized> Detector for Box<D> {
    fn detect(&mut self, frame: &Frame, confidence_threshold: f32) -> Result<Vec<Detection>> {
        (**self).detect(frame, confidence_threshold)
    }
}
