//! Annotation overlay: which labels are drawn, in which colors, and how.

mod overlay;
mod palette;

pub use overlay::OverlayRenderer;
pub use palette::LabelPalette;
