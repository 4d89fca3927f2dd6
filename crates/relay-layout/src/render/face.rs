//! Bleed compositing for a single card face

use image::{RgbaImage, imageops, imageops::FilterType};

use super::bleed::{extend_edges, smooth_bleed};
use crate::atlas::{AtlasImage, GridCell};
use crate::layout::PixelRect;
use crate::options::LayoutConfig;
use crate::types::{BleedSpec, Color, Face, Rotation};
use crate::units::px;

/// Pixel geometry of an upright face: full raster plus the trim box inside it
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FaceGeometry {
    pub width_px: u32,
    pub height_px: u32,
    /// Trim box, inset by the bleed on every side
    pub trim: PixelRect,
}

impl FaceGeometry {
    pub fn new(card_width_in: f64, card_height_in: f64, bleed_in: f64, ppi: f64) -> Self {
        let width_px = px(card_width_in + 2.0 * bleed_in, ppi);
        let height_px = px(card_height_in + 2.0 * bleed_in, ppi);
        // The trim keeps the card's own pixel size and is centered in the raster
        let trim_width = px(card_width_in, ppi).min(width_px);
        let trim_height = px(card_height_in, ppi).min(height_px);
        let trim = PixelRect::new(
            (width_px - trim_width) / 2,
            (height_px - trim_height) / 2,
            trim_width,
            trim_height,
        );
        Self {
            width_px,
            height_px,
            trim,
        }
    }

    pub fn from_config(config: &LayoutConfig) -> Self {
        Self::new(
            config.card_width_in(),
            config.card_height_in(),
            config.bleed_in(),
            config.ppi(),
        )
    }

    /// Bleed on the left edge; the right edge may carry one pixel more
    pub fn bleed_px(&self) -> u32 {
        self.trim.x
    }

    pub fn has_bleed(&self) -> bool {
        self.trim.width < self.width_px || self.trim.height < self.height_px
    }

    /// Raster size after a rotation is applied
    pub fn rotated_size(&self, rotation: Rotation) -> (u32, u32) {
        if rotation.is_quarter_turn() {
            (self.height_px, self.width_px)
        } else {
            (self.width_px, self.height_px)
        }
    }

    /// Trim box inside the raster after a rotation is applied
    pub fn rotated_trim(&self, rotation: Rotation) -> PixelRect {
        let (w, h, t) = (self.width_px, self.height_px, self.trim);
        match rotation {
            Rotation::None => t,
            Rotation::Clockwise90 => PixelRect::new(h - t.bottom(), t.x, t.height, t.width),
            Rotation::Clockwise180 => PixelRect::new(w - t.right(), h - t.bottom(), t.width, t.height),
            Rotation::Clockwise270 => PixelRect::new(t.y, w - t.right(), t.height, t.width),
        }
    }
}

/// Everything about a face that does not come from the atlas
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FaceStyle {
    pub bleed: BleedSpec,
    pub rotation: Rotation,
    /// Gaussian sigma for generated bleed smoothing; zero disables it
    pub blur_sigma: f32,
}

impl FaceStyle {
    pub fn for_face(config: &LayoutConfig, face: Face) -> Self {
        let bleed = match face {
            Face::Front => config.front_bleed,
            Face::Back => config.back_bleed,
        };
        Self {
            bleed,
            rotation: config.card_orientation.rotation_for(face),
            blur_sigma: config.generated_bleed_blur,
        }
    }
}

/// Where a face's artwork comes from
#[derive(Debug, Clone, Copy)]
pub struct FaceSource<'a> {
    pub atlas: &'a AtlasImage,
    pub cell: GridCell,
}

/// One step of face rendering, replayed in order
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum DrawStep {
    Fill(Color),
    CardImage,
    ExtendEdges,
    Smooth(f32),
    Rotate(Rotation),
}

/// Background a face starts from before the card is drawn
pub fn background_for(bleed: BleedSpec) -> Color {
    match bleed {
        BleedSpec::Solid(color) => color,
        BleedSpec::None | BleedSpec::Generated | BleedSpec::IncludedPreset => Color::WHITE,
    }
}

/// Build the ordered draw steps for a face.
///
/// Crop marks are not part of a face; they reach past the raster and are
/// drawn on the sheet.
pub fn plan_face(style: &FaceStyle, has_image: bool, has_bleed: bool) -> Vec<DrawStep> {
    let mut steps = vec![DrawStep::Fill(background_for(style.bleed))];
    if has_image {
        steps.push(DrawStep::CardImage);
        if style.bleed == BleedSpec::Generated && has_bleed {
            steps.push(DrawStep::ExtendEdges);
            if style.blur_sigma > 0.0 {
                steps.push(DrawStep::Smooth(style.blur_sigma));
            }
        }
    }
    if style.rotation != Rotation::None {
        steps.push(DrawStep::Rotate(style.rotation));
    }
    steps
}

/// Render one face into a new buffer.
///
/// A missing source, or a cell outside the atlas grid, yields a blank face
/// with its background; it is never an error.
pub fn render_face(
    geometry: &FaceGeometry,
    source: Option<FaceSource<'_>>,
    style: &FaceStyle,
) -> RgbaImage {
    let artwork = source.and_then(|s| s.atlas.cell_rect(s.cell).map(|rect| (s.atlas, rect)));
    let has_image = artwork.is_some() && !geometry.trim.is_empty();
    let steps = plan_face(style, has_image, geometry.has_bleed());

    let mut buffer = RgbaImage::new(geometry.width_px, geometry.height_px);
    for step in steps {
        match step {
            DrawStep::Fill(color) => {
                buffer.pixels_mut().for_each(|p| *p = color.rgba());
            }
            DrawStep::CardImage => {
                if let Some((atlas, cell)) = artwork {
                    draw_card_image(&mut buffer, geometry.trim, atlas, cell);
                }
            }
            DrawStep::ExtendEdges => extend_edges(&mut buffer, geometry.trim),
            DrawStep::Smooth(sigma) => smooth_bleed(&mut buffer, geometry.trim, sigma),
            DrawStep::Rotate(rotation) => buffer = rotate(&buffer, rotation),
        }
    }
    buffer
}

/// Scale an atlas cell to exactly fill the trim box
fn draw_card_image(buffer: &mut RgbaImage, trim: PixelRect, atlas: &AtlasImage, cell: PixelRect) {
    debug_assert!(trim.right() <= buffer.width() && trim.bottom() <= buffer.height());
    let source =
        imageops::crop_imm(atlas.image.as_ref(), cell.x, cell.y, cell.width, cell.height).to_image();
    let scaled = if (cell.width, cell.height) == (trim.width, trim.height) {
        source
    } else {
        imageops::resize(&source, trim.width, trim.height, FilterType::CatmullRom)
    };
    imageops::overlay(buffer, &scaled, trim.x as i64, trim.y as i64);
}

fn rotate(buffer: &RgbaImage, rotation: Rotation) -> RgbaImage {
    match rotation {
        Rotation::None => buffer.clone(),
        Rotation::Clockwise90 => imageops::rotate90(buffer),
        Rotation::Clockwise180 => imageops::rotate180(buffer),
        Rotation::Clockwise270 => imageops::rotate270(buffer),
    }
}
