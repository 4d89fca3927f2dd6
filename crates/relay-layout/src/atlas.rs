//! Atlas grid resolution
//!
//! Maps a card id to the cell of a packed atlas image that holds its front
//! or back, and keeps the decoded atlas buffers that are available so far.

use image::RgbaImage;
use std::collections::BTreeMap;
use std::sync::Arc;

use crate::constants::CARD_ID_MODULUS;
use crate::layout::PixelRect;
use crate::manifest::{AtlasSpec, atlas_key};
use crate::types::Face;

/// Cell coordinates inside an atlas grid
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct GridCell {
    pub col: u32,
    pub row: u32,
}

impl GridCell {
    pub fn new(col: u32, row: u32) -> Self {
        Self { col, row }
    }
}

/// Resolve the grid cell for a card id in a grid `grid_width` cells wide.
///
/// Only the low two digits of the id select the cell; ids never fail, they wrap.
pub fn resolve_cell(card_id: u32, grid_width: u32) -> GridCell {
    let position = card_id % CARD_ID_MODULUS;
    let width = grid_width.max(1);
    GridCell::new(position % width, position / width)
}

/// Resolve the cell for one face of a card.
///
/// A shared back is a single image, so it always resolves to `(0, 0)`.
pub fn resolve_face_cell(card_id: u32, spec: &AtlasSpec, face: Face) -> GridCell {
    match face {
        Face::Front => resolve_cell(card_id, spec.grid_width),
        Face::Back if spec.unique_back => resolve_cell(card_id, spec.back_grid().0),
        Face::Back => GridCell::default(),
    }
}

/// Where a card's two faces come from. Recomputed on demand, never stored.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CardPlacement {
    pub card_id: u32,
    pub atlas_key: String,
    pub front: GridCell,
    pub back: GridCell,
}

impl CardPlacement {
    pub fn resolve(card_id: u32, spec: &AtlasSpec) -> Self {
        Self {
            card_id,
            atlas_key: atlas_key(card_id),
            front: resolve_face_cell(card_id, spec, Face::Front),
            back: resolve_face_cell(card_id, spec, Face::Back),
        }
    }

    pub fn cell(&self, face: Face) -> GridCell {
        match face {
            Face::Front => self.front,
            Face::Back => self.back,
        }
    }
}

/// A decoded atlas buffer together with the grid it is packed in
#[derive(Debug, Clone)]
pub struct AtlasImage {
    pub image: Arc<RgbaImage>,
    pub grid_width: u32,
    pub grid_height: u32,
}

impl AtlasImage {
    pub fn new(image: Arc<RgbaImage>, grid_width: u32, grid_height: u32) -> Self {
        Self {
            image,
            grid_width: grid_width.max(1),
            grid_height: grid_height.max(1),
        }
    }

    /// Nominal cell size: buffer size divided by the grid
    pub fn cell_size(&self) -> (f64, f64) {
        (
            self.image.width() as f64 / self.grid_width as f64,
            self.image.height() as f64 / self.grid_height as f64,
        )
    }

    /// Pixel rectangle of a cell, or `None` if the cell lies outside the grid.
    ///
    /// Edges are computed from the cell index so adjacent cells tile the
    /// buffer exactly, whatever the remainder of the division.
    pub fn cell_rect(&self, cell: GridCell) -> Option<PixelRect> {
        if cell.col >= self.grid_width || cell.row >= self.grid_height {
            return None;
        }
        let (w, h) = (self.image.width() as u64, self.image.height() as u64);
        let edge = |index: u32, extent: u64, cells: u32| (index as u64 * extent / cells as u64) as u32;
        let x0 = edge(cell.col, w, self.grid_width);
        let x1 = edge(cell.col + 1, w, self.grid_width);
        let y0 = edge(cell.row, h, self.grid_height);
        let y1 = edge(cell.row + 1, h, self.grid_height);
        let rect = PixelRect::new(x0, y0, x1 - x0, y1 - y0);
        (!rect.is_empty()).then_some(rect)
    }
}

/// Front and back buffers of one atlas; either may still be missing
#[derive(Debug, Clone, Default)]
pub struct AtlasFaces {
    pub front: Option<AtlasImage>,
    pub back: Option<AtlasImage>,
}

/// Decoded atlas buffers keyed by atlas key.
///
/// Tolerates partial availability: a face that has not arrived renders blank.
#[derive(Debug, Clone, Default)]
pub struct AtlasImages {
    atlases: BTreeMap<String, AtlasFaces>,
}

impl AtlasImages {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store a decoded face, deriving its grid from the atlas spec
    pub fn insert(&mut self, key: &str, face: Face, image: Arc<RgbaImage>, spec: &AtlasSpec) {
        let (grid_width, grid_height) = match face {
            Face::Front => (spec.grid_width, spec.grid_height),
            Face::Back => spec.back_grid(),
        };
        let atlas = AtlasImage::new(image, grid_width, grid_height);
        let entry = self.atlases.entry(key.to_string()).or_default();
        match face {
            Face::Front => entry.front = Some(atlas),
            Face::Back => entry.back = Some(atlas),
        }
    }

    pub fn get(&self, key: &str, face: Face) -> Option<&AtlasImage> {
        let faces = self.atlases.get(key)?;
        match face {
            Face::Front => faces.front.as_ref(),
            Face::Back => faces.back.as_ref(),
        }
    }

    pub fn is_loaded(&self, key: &str, face: Face) -> bool {
        self.get(key, face).is_some()
    }

    /// First available cell aspect ratio (width / height), fronts preferred
    pub fn cell_aspect_ratio(&self) -> Option<f64> {
        let fronts = self.atlases.values().filter_map(|a| a.front.as_ref());
        let backs = self.atlases.values().filter_map(|a| a.back.as_ref());
        fronts
            .chain(backs)
            .map(AtlasImage::cell_size)
            .find(|(w, h)| *w > 0.0 && *h > 0.0)
            .map(|(w, h)| w / h)
    }

    /// Number of loaded faces
    pub fn face_count(&self) -> usize {
        self.atlases
            .values()
            .map(|a| a.front.is_some() as usize + a.back.is_some() as usize)
            .sum()
    }

    pub fn clear(&mut self) {
        self.atlases.clear();
    }
}
