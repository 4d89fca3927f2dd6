use crate::atlas::AtlasImages;
use crate::layout::{SheetGeometry, page_count};
use crate::manifest::{Deck, atlas_key};
use crate::options::LayoutConfig;
use crate::types::*;

/// Calculate statistics for laying out `deck` with `config`
pub fn calculate_statistics(
    deck: &Deck,
    config: &LayoutConfig,
    images: &AtlasImages,
) -> LayoutStatistics {
    let card_count = deck.card_count();
    let per_page = config.cards_per_page();
    let page_count = page_count(card_count, per_page);
    let cards_on_last_page = match card_count % per_page {
        0 if card_count > 0 => per_page,
        remainder => remainder,
    };

    let mut cards_without_atlas = 0;
    let mut faces_not_loaded = 0;
    for &card_id in &deck.card_ids {
        if deck.atlas_for(card_id).is_none() {
            cards_without_atlas += 1;
            continue;
        }
        let key = atlas_key(card_id);
        for face in [Face::Front, Face::Back] {
            if !images.is_loaded(&key, face) {
                faces_not_loaded += 1;
            }
        }
    }

    let geometry = SheetGeometry::from_config(config);
    LayoutStatistics {
        card_count,
        page_count,
        cards_on_last_page,
        rows_that_fit: geometry.rows_that_fit(),
        fits_side_margins: geometry.fits_side_margins(),
        page_size_px: (geometry.page_width_px, geometry.page_height_px),
        cards_without_atlas,
        faces_not_loaded,
    }
}
