//! Layout data types shared by rendering and sheet assembly

use image::RgbaImage;

/// An axis-aligned rectangle in raster pixels; origin top-left
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct PixelRect {
    pub x: u32,
    pub y: u32,
    pub width: u32,
    pub height: u32,
}

impl PixelRect {
    pub fn new(x: u32, y: u32, width: u32, height: u32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// Exclusive right edge
    pub fn right(&self) -> u32 {
        self.x + self.width
    }

    /// Exclusive bottom edge
    pub fn bottom(&self) -> u32 {
        self.y + self.height
    }

    pub fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0
    }

    pub fn contains(&self, x: u32, y: u32) -> bool {
        x >= self.x && x < self.right() && y >= self.y && y < self.bottom()
    }
}

/// What happened while rendering a page
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct RenderStatus {
    /// Cards placed on the page
    pub cards_drawn: usize,
    /// Faces drawn without an image (missing atlas or not loaded yet)
    pub blank_faces: usize,
    /// Card rows that extend past the printable area
    pub overflow_rows: usize,
    /// Face columns reach into the left or right margin
    pub crosses_side_margins: bool,
}

impl RenderStatus {
    pub fn is_complete(&self) -> bool {
        self.blank_faces == 0 && self.overflow_rows == 0 && !self.crosses_side_margins
    }
}

/// One rendered sheet, ready to hand to an exporter
#[derive(Debug, Clone)]
pub struct RenderedPage {
    /// Zero-based page index
    pub index: usize,
    pub surface: RgbaImage,
    pub status: RenderStatus,
}
