//! Rendering of one card's front/back pair

use image::RgbaImage;

use crate::atlas::{AtlasImages, CardPlacement};
use crate::manifest::Deck;
use crate::options::LayoutConfig;
use crate::render::{FaceGeometry, FaceSource, FaceStyle, render_face};
use crate::types::Face;

/// Both rendered faces of one card, already rotated for the sheet
#[derive(Debug, Clone)]
pub struct CardFaces {
    pub card_id: u32,
    pub front: RgbaImage,
    pub back: RgbaImage,
    /// Faces drawn without artwork
    pub blank_faces: usize,
}

/// Render the front and back of `card_id`.
///
/// A card whose atlas is missing from the manifest, or whose atlas image has
/// not been loaded yet, gets blank faces.
pub fn render_card(
    card_id: u32,
    deck: &Deck,
    config: &LayoutConfig,
    images: &AtlasImages,
) -> CardFaces {
    let geometry = FaceGeometry::from_config(config);
    let placement = deck
        .atlas_for(card_id)
        .map(|spec| CardPlacement::resolve(card_id, spec));
    if placement.is_none() {
        log::debug!("Card {} has no atlas entry, drawing blank faces", card_id);
    }

    let mut blank_faces = 0;
    let mut render = |face: Face| {
        let source = placement.as_ref().and_then(|p| {
            images.get(&p.atlas_key, face).map(|atlas| FaceSource {
                atlas,
                cell: p.cell(face),
            })
        });
        let drawn = source
            .map(|s| s.atlas.cell_rect(s.cell).is_some())
            .unwrap_or(false);
        if !drawn {
            blank_faces += 1;
        }
        render_face(&geometry, source, &FaceStyle::for_face(config, face))
    };

    let front = render(Face::Front);
    let back = render(Face::Back);
    CardFaces {
        card_id,
        front,
        back,
        blank_faces,
    }
}
