//! Box and caption drawing onto RGB frames.

use super::LabelPalette;
use crate::config::OverlayConfig;
use crate::detect::{BoundingBox, Detection};
use crate::error::{Error, Result};
use crate::video::Frame;
use ab_glyph::{FontArc, PxScale};
use image::{ImageBuffer, Rgb, RgbImage};
use imageproc::drawing::{draw_hollow_rect_mut, draw_text_mut, text_size};
use imageproc::rect::Rect;
use std::path::Path;
use tracing::debug;

/// DejaVu Sans, used for captions unless `overlay.font_path` is set.
static BUNDLED_FONT: &[u8] = include_bytes!("../../assets/fonts/DejaVuSans.ttf");

/// Draws watched detections as colored rectangles with a caption above.
pub struct OverlayRenderer {
    palette: LabelPalette,
    thickness: u32,
    font: FontArc,
    scale: PxScale,
    text_offset: i32,
}

impl OverlayRenderer {
    /// Renderer with the bundled caption font and default text layout.
    pub fn new(palette: LabelPalette, thickness: u32) -> Result<Self> {
        Ok(Self {
            palette,
            thickness: thickness.max(1),
            font: bundled_font()?,
            scale: PxScale::from(crate::constants::overlay::TEXT_SCALE),
            text_offset: crate::constants::overlay::TEXT_OFFSET,
        })
    }

    /// Build from overlay settings. A configured `font_path` must load.
    pub fn from_config(config: &OverlayConfig) -> Result<Self> {
        let mut renderer = Self::new(LabelPalette::new(&config.labels), config.box_thickness)?;
        if let Some(path) = &config.font_path {
            renderer.font = load_font(path)?;
        }
        renderer.scale = PxScale::from(config.text_scale);
        renderer.text_offset = config.text_offset;
        Ok(renderer)
    }

    /// Labels this renderer draws.
    pub const fn palette(&self) -> &LabelPalette {
        &self.palette
    }

    /// Draw every watched detection onto `frame`. Unwatched labels are skipped.
    pub fn draw(&self, frame: &mut Frame, detections: &[Detection]) -> Result<()> {
        if detections.is_empty() {
            return Ok(());
        }

        let (width, height) = (frame.width(), frame.height());
        let mut img: RgbImage = ImageBuffer::from_raw(width, height, frame.take_data())
            .ok_or_else(|| Error::Internal {
                message: format!("frame {} buffer does not match {width}x{height}", frame.index),
            })?;

        for detection in detections {
            let Some(color) = self.palette.color_for(&detection.label) else {
                continue;
            };
            self.draw_box(&mut img, &detection.bbox, Rgb(color));

            let caption = detection.caption();
            let size = text_size(self.scale, &self.font, &caption);
            if let Some((x, y)) = self.caption_origin(&detection.bbox, size, (width, height)) {
                draw_text_mut(&mut img, Rgb(color), x, y, self.scale, &self.font, &caption);
            }
        }

        frame.restore_data(img.into_raw());
        Ok(())
    }

    /// Stroke `thickness` concentric outlines centered on the box edges.
    /// Edges are inclusive of `(x2, y2)`.
    /// Each outline is clamped to one pixel outside the frame.
    fn draw_box(&self, img: &mut RgbImage, bbox: &BoundingBox, color: Rgb<u8>) {
        let (x1, y1) = (i64::from(bbox.x1), i64::from(bbox.y1));
        let x2 = i64::from(bbox.x2).max(x1 + 1);
        let y2 = i64::from(bbox.y2).max(y1 + 1);
        let (max_x, max_y) = (i64::from(img.width()), i64::from(img.height()));
        let half = i64::from(self.thickness / 2);

        for step in 0..i64::from(self.thickness) {
            let inset = step - half;
            let (left, right) = (x1 + inset, x2 - inset);
            let (top, bottom) = (y1 + inset, y2 - inset);
            if right < left || bottom < top {
                break;
            }

            let (left, right) = (left.clamp(-1, max_x), right.clamp(-1, max_x));
            let (top, bottom) = (top.clamp(-1, max_y), bottom.clamp(-1, max_y));
            let (Ok(x), Ok(y), Ok(w), Ok(h)) = (
                i32::try_from(left),
                i32::try_from(top),
                u32::try_from(right - left + 1),
                u32::try_from(bottom - top + 1),
            ) else {
                continue;
            };
            draw_hollow_rect_mut(img, Rect::at(x, y).of_size(w, h), color);
        }
    }

    /// Top-left corner of the caption, `text_offset` pixels above the box.
    /// `None` when the caption cannot touch the frame.
    fn caption_origin(
        &self,
        bbox: &BoundingBox,
        (text_width, text_height): (u32, u32),
        (width, height): (u32, u32),
    ) -> Option<(i32, i32)> {
        let (text_width, text_height) = (i64::from(text_width), i64::from(text_height));
        let left = i64::from(bbox.x1);
        let top = i64::from(bbox.y1) - i64::from(self.text_offset) - text_height;

        // Glyphs are laid out below the ascent line, so allow a full extra
        // text height of overhang.
        if left >= i64::from(width)
            || top >= i64::from(height)
            || left + text_width < 0
            || top + 2 * text_height < 0
        {
            return None;
        }
        Some((i32::try_from(left).ok()?, i32::try_from(top).ok()?))
    }
}

fn bundled_font() -> Result<FontArc> {
    FontArc::try_from_slice(BUNDLED_FONT).map_err(|e| Error::Internal {
        message: format!("bundled caption font is unreadable: {e}"),
    })
}

fn load_font(path: &Path) -> Result<FontArc> {
    let font_error = |source: Box<dyn std::error::Error + Send + Sync>| Error::FontLoad {
        path: path.to_path_buf(),
        source,
    };
    let bytes = std::fs::read(path).map_err(|e| font_error(Box::new(e)))?;
    let font = FontArc::try_from_vec(bytes).map_err(|e| font_error(Box::new(e)))?;
    debug!(path = %path.display(), "loaded caption font");
    Ok(font)
}
