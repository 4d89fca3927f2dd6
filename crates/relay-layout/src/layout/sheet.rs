//! Sheet assembly around the fold line
//!
//! Each card occupies one row: the front to the left of the fold, the back
//! to the right, both rotated so folding the sheet puts them back to back.

use image::{RgbaImage, imageops};

use super::cell::CardFaces;
use super::types::{PixelRect, RenderStatus};
use crate::marks::{CropMarkStyle, draw_crop_marks, draw_fold_line};
use crate::options::LayoutConfig;
use crate::render::FaceGeometry;
use crate::types::{Color, Face};
use crate::units::px;

/// Pixel geometry of one sheet
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SheetGeometry {
    pub page_width_px: u32,
    pub page_height_px: u32,
    pub margin_px: u32,
    /// Column of the fold line
    pub fold_x: u32,
    /// Half the gutter, kept clear on each side of the fold
    pub half_gutter_px: u32,
    /// Size of a face as placed on the sheet (after rotation)
    pub front_size: (u32, u32),
    pub back_size: (u32, u32),
    /// Trim box inside each placed face raster
    pub front_trim: PixelRect,
    pub back_trim: PixelRect,
}

impl SheetGeometry {
    pub fn from_config(config: &LayoutConfig) -> Self {
        let ppi = config.ppi();
        let (page_w_in, page_h_in) = config.paper_size.dimensions_in(config.orientation);
        let page_width_px = px(page_w_in, ppi);
        let page_height_px = px(page_h_in, ppi);
        let margin_px = px(config.margin_in(), ppi);
        let face = FaceGeometry::from_config(config);
        let front_rotation = config.card_orientation.rotation_for(Face::Front);
        let back_rotation = config.card_orientation.rotation_for(Face::Back);
        Self {
            page_width_px,
            page_height_px,
            margin_px,
            fold_x: page_width_px / 2,
            half_gutter_px: px(config.gutter_in() / 2.0, ppi),
            front_size: face.rotated_size(front_rotation),
            back_size: face.rotated_size(back_rotation),
            front_trim: face.rotated_trim(front_rotation),
            back_trim: face.rotated_trim(back_rotation),
        }
    }

    /// Height of one card row
    pub fn row_height(&self) -> u32 {
        self.front_size.1.max(self.back_size.1)
    }

    /// Top edge of card row `row`
    pub fn row_top(&self, row: usize) -> i64 {
        self.margin_px as i64 + row as i64 * self.row_height() as i64
    }

    /// Card rows that fit inside the margins; none when a column crosses a side margin
    pub fn rows_that_fit(&self) -> usize {
        if !self.fits_side_margins() {
            return 0;
        }
        let usable = self.page_height_px.saturating_sub(2 * self.margin_px);
        match self.row_height() {
            0 => 0,
            h => (usable / h) as usize,
        }
    }

    /// Left edge of the front face in any row
    pub fn front_x(&self) -> i64 {
        self.fold_x as i64 - self.half_gutter_px as i64 - self.front_size.0 as i64
    }

    /// Left edge of the back face in any row
    pub fn back_x(&self) -> i64 {
        self.fold_x as i64 + self.half_gutter_px as i64
    }

    /// Whether both face columns stay between the left and right margins
    pub fn fits_side_margins(&self) -> bool {
        let margin = self.margin_px as i64;
        let right_limit = self.page_width_px as i64 - margin;
        self.front_x() >= margin && self.back_x() + self.back_size.0 as i64 <= right_limit
    }
}

/// Layers of a sheet, drawn bottom to top
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SheetLayer {
    CropMarks,
    Faces,
    FoldLine,
}

/// Layer order for a sheet; marks behind the faces show only outside them
pub fn sheet_layers(marks_behind: bool) -> [SheetLayer; 3] {
    if marks_behind {
        [SheetLayer::CropMarks, SheetLayer::Faces, SheetLayer::FoldLine]
    } else {
        [SheetLayer::Faces, SheetLayer::CropMarks, SheetLayer::FoldLine]
    }
}

/// Compose card rows onto a fresh white page.
///
/// Rows that do not fit inside the margins are still drawn (clipped by the
/// page) and counted as overflow.
pub fn assemble_page(
    geometry: &SheetGeometry,
    cards: &[CardFaces],
    marks: &CropMarkStyle,
    ppi: f64,
) -> (RgbaImage, RenderStatus) {
    let mut surface = RgbaImage::from_pixel(
        geometry.page_width_px,
        geometry.page_height_px,
        Color::WHITE.rgba(),
    );
    let mut status = RenderStatus {
        crosses_side_margins: !cards.is_empty() && !geometry.fits_side_margins(),
        ..RenderStatus::default()
    };
    let fits = geometry.rows_that_fit();
    let (front_x, back_x) = (geometry.front_x(), geometry.back_x());

    for layer in sheet_layers(marks.behind) {
        match layer {
            SheetLayer::CropMarks => {
                for row in 0..cards.len() {
                    let y = geometry.row_top(row);
                    draw_crop_marks(&mut surface, (front_x, y), geometry.front_trim, marks);
                    draw_crop_marks(&mut surface, (back_x, y), geometry.back_trim, marks);
                }
            }
            SheetLayer::Faces => {
                for (row, card) in cards.iter().enumerate() {
                    let y = geometry.row_top(row);
                    imageops::overlay(&mut surface, &card.front, front_x, y);
                    imageops::overlay(&mut surface, &card.back, back_x, y);
                    status.cards_drawn += 1;
                    status.blank_faces += card.blank_faces;
                    if row >= fits {
                        status.overflow_rows += 1;
                    }
                }
            }
            SheetLayer::FoldLine if !cards.is_empty() => {
                let top = geometry.margin_px;
                let bottom = geometry
                    .row_top(cards.len())
                    .clamp(0, geometry.page_height_px as i64) as u32;
                draw_fold_line(&mut surface, geometry.fold_x, top, bottom, ppi);
            }
            SheetLayer::FoldLine => {}
        }
    }

    (surface, status)
}
