//! Printer's marks rasterized onto sheets
//!
//! Crop marks sit on the trim corners of each placed face and reach past the
//! face raster; the fold line runs between the front and back columns.

use image::{Rgba, RgbaImage};

use crate::constants::{CROP_MARK_WIDTH_IN, FOLD_DASH_IN, FOLD_GAP_IN, FOLD_LINE_WIDTH_IN};
use crate::layout::PixelRect;
use crate::options::LayoutConfig;
use crate::types::Color;
use crate::units::px;

/// Raster style for crop marks
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CropMarkStyle {
    pub color: Color,
    /// Length of each arm in pixels
    pub length_px: u32,
    /// Stroke width in pixels
    pub thickness_px: u32,
    /// Draw beneath the faces instead of on top of them
    pub behind: bool,
}

impl CropMarkStyle {
    pub fn from_config(config: &LayoutConfig) -> Self {
        Self {
            color: config.crop_mark_color,
            length_px: px(config.crop_mark_length_in, config.ppi()),
            thickness_px: px(CROP_MARK_WIDTH_IN, config.ppi()).max(1),
            behind: config.crop_layer_behind,
        }
    }
}

/// Draw the four L-shaped corner marks around `trim`, a box inside a face
/// whose top-left corner sits at `origin` on the surface.
///
/// Each arm extends outward from a trim corner along the trim line; anything
/// beyond the surface is clipped.
pub fn draw_crop_marks(
    buffer: &mut RgbaImage,
    origin: (i64, i64),
    trim: PixelRect,
    style: &CropMarkStyle,
) {
    if style.length_px == 0 || trim.is_empty() {
        return;
    }
    let color = style.color.rgba();
    let len = style.length_px as i64;
    let t = style.thickness_px as i64;
    let (x0, y0) = (origin.0 + trim.x as i64, origin.1 + trim.y as i64);
    let (x1, y1) = (x0 + trim.width as i64, y0 + trim.height as i64);

    // Top-left
    fill_rect(buffer, x0 - len, y0 - t, len, t, color);
    fill_rect(buffer, x0 - t, y0 - len, t, len, color);

    // Top-right
    fill_rect(buffer, x1, y0 - t, len, t, color);
    fill_rect(buffer, x1, y0 - len, t, len, color);

    // Bottom-left
    fill_rect(buffer, x0 - len, y1, len, t, color);
    fill_rect(buffer, x0 - t, y1, t, len, color);

    // Bottom-right
    fill_rect(buffer, x1, y1, len, t, color);
    fill_rect(buffer, x1, y1, t, len, color);
}

/// Draw a dashed vertical fold line centered on column `x`, from `top` to `bottom`
pub fn draw_fold_line(surface: &mut RgbaImage, x: u32, top: u32, bottom: u32, ppi: f64) {
    let width = px(FOLD_LINE_WIDTH_IN, ppi).max(1) as i64;
    let dash = px(FOLD_DASH_IN, ppi).max(1);
    let gap = px(FOLD_GAP_IN, ppi).max(1);
    let color = Color::BLACK.rgba();
    let left = x as i64 - width / 2;

    let mut y = top;
    while y < bottom {
        let run = dash.min(bottom - y);
        fill_rect(surface, left, y as i64, width, run as i64, color);
        y = y.saturating_add(dash + gap);
    }
}

/// Fill a rectangle, clipping it to the buffer
pub(crate) fn fill_rect(buffer: &mut RgbaImage, x: i64, y: i64, w: i64, h: i64, color: Rgba<u8>) {
    let x_start = x.max(0);
    let y_start = y.max(0);
    let x_end = (x + w).min(buffer.width() as i64);
    let y_end = (y + h).min(buffer.height() as i64);
    for row in y_start..y_end {
        for col in x_start..x_end {
            buffer.put_pixel(col as u32, row as u32, color);
        }
    }
}
