//! Watched labels and their draw colors.

use crate::config::LabelColor;
use crate::detect::Detection;

/// Ordered map from watched label to RGB color.
///
/// A label is "watched" exactly when it has a color here; detections with
/// other labels are neither drawn nor alerted on.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LabelPalette {
    entries: Vec<(String, [u8; 3])>,
}

impl LabelPalette {
    /// Build a palette from configured label colors. Later duplicates are ignored.
    pub fn new(labels: &[LabelColor]) -> Self {
        let mut entries: Vec<(String, [u8; 3])> = Vec::with_capacity(labels.len());
        for label in labels {
            if !entries.iter().any(|(name, _)| *name == label.name) {
                entries.push((label.name.clone(), label.color));
            }
        }
        Self { entries }
    }

    /// Color for `label`, or `None` when it is not watched.
    pub fn color_for(&self, label: &str) -> Option<[u8; 3]> {
        self.entries
            .iter()
            .find(|(name, _)| name == label)
            .map(|(_, color)| *color)
    }

    /// Whether `label` is watched.
    pub fn contains(&self, label: &str) -> bool {
        self.color_for(label).is_some()
    }

    /// Watched label names in configuration order.
    pub fn labels(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(name, _)| name.as_str())
    }

    /// Keep only detections with a watched label, preserving order.
    pub fn filter_watched(&self, detections: Vec<Detection>) -> Vec<Detection> {
        detections
            .into_iter()
            .filter(|d| self.contains(&d.label))
            .collect()
    }
}

impl Default for LabelPalette {
    fn default() -> Self {
        Self::new(&crate::config::OverlayConfig::default().labels)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::detect::BoundingBox;

    #[test]
    fn test_default_palette_colors() {
        let palette = LabelPalette::default();
        assert_eq!(palette.color_for("garbage_throw"), Some([255, 0, 0]));
        assert_eq!(palette.color_for("garbage_bag"), Some([0, 255, 0]));
        assert_eq!(palette.color_for("person"), None);
        assert_eq!(
            palette.labels().collect::<Vec<_>>(),
            vec!["garbage_throw", "garbage_bag"]
        );
    }

    #[test]
    fn test_filter_watched_keeps_order() {
        let bbox = BoundingBox::new(0, 0, 5, 5);
        let detections = vec![
            Detection::new("garbage_bag", 0.9, bbox),
            Detection::new("person", 0.95, bbox),
            Detection::new("garbage_throw", 0.5, bbox),
        ];
        let kept = LabelPalette::default().filter_watched(detections);
        let labels: Vec<&str> = kept.iter().map(|d| d.label.as_str()).collect();
        assert_eq!(labels, vec!["garbage_bag", "garbage_throw"]);
    }

    #[test]
    fn test_duplicate_labels_keep_first_color() {
        let palette = LabelPalette::new(&[
            LabelColor {
                name: "bottle".to_string(),
                color: [1, 2, 3],
            },
            LabelColor {
                name: "bottle".to_string(),
                color: [9, 9, 9],
            },
        ]);
        assert_eq!(palette.color_for("bottle"), Some([1, 2, 3]));
    }
}
