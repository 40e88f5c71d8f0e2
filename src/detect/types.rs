//! Detection result types.

use serde::Serialize;

/// Axis-aligned box in frame pixel coordinates. Coordinates may lie outside
/// the frame; drawing clips them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct BoundingBox {
    /// Left edge.
    pub x1: i32,
    /// Top edge.
    pub y1: i32,
    /// Right edge.
    pub x2: i32,
    /// Bottom edge.
    pub y2: i32,
}

impl BoundingBox {
    /// Create a box from its corners.
    pub const fn new(x1: i32, y1: i32, x2: i32, y2: i32) -> Self {
        Self { x1, y1, x2, y2 }
    }

    /// Width in pixels (zero for inverted boxes).
    pub fn width(&self) -> u32 {
        self.x2.saturating_sub(self.x1).max(0).unsigned_abs()
    }

    /// Height in pixels (zero for inverted boxes).
    pub fn height(&self) -> u32 {
        self.y2.saturating_sub(self.y1).max(0).unsigned_abs()
    }
}

/// One labeled, confidence-scored box returned by a detector.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Detection {
    /// Class name.
    pub label: String,
    /// Confidence in `[0, 1]`.
    pub confidence: f32,
    /// Location in frame pixels.
    pub bbox: BoundingBox,
}

impl Detection {
    /// Create a detection.
    pub fn new(label: impl Into<String>, confidence: f32, bbox: BoundingBox) -> Self {
        Self {
            label: label.into(),
            confidence,
            bbox,
        }
    }

    /// Overlay caption, e.g. `garbage_bag (0.80)`.
    pub fn caption(&self) -> String {
        format!(
            "{} ({:.prec$})",
            self.label,
            self.confidence,
            prec = crate::constants::confidence::CAPTION_DECIMAL_PLACES
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_caption_uses_two_decimals() {
        let det = Detection::new("garbage_bag", 0.8, BoundingBox::new(0, 0, 10, 10));
        assert_eq!(det.caption(), "garbage_bag (0.80)");
        let det = Detection::new("garbage_throw", 0.456, BoundingBox::new(0, 0, 1, 1));
        assert_eq!(det.caption(), "garbage_throw (0.46)");
    }

    #[test]
    fn test_inverted_box_has_zero_extent() {
        let bbox = BoundingBox::new(10, 10, 5, 20);
        assert_eq!(bbox.width(), 0);
        assert_eq!(bbox.height(), 10);
    }
}
