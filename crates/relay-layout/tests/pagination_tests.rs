use image::{Rgba, RgbaImage};
use relay_layout::layout::{SheetGeometry, SheetLayer, page_count, page_range, sheet_layers};
use relay_layout::*;
use std::collections::BTreeMap;
use std::sync::Arc;

fn atlas_spec() -> AtlasSpec {
    AtlasSpec {
        face_url: "faces.png".to_string(),
        back_url: "back.png".to_string(),
        grid_width: 10,
        grid_height: 1,
        unique_back: false,
    }
}

fn test_deck(card_count: u32) -> Deck {
    let mut atlases = BTreeMap::new();
    atlases.insert("1".to_string(), atlas_spec());
    Deck::new("Test", (100..100 + card_count).collect(), atlases)
}

/// Letter page at 10 ppi with 2.5 x 3.5 in cards
fn test_config() -> LayoutConfig {
    let mut config = LayoutConfig::default();
    config.set_resolution(10.0);
    config
}

fn test_images() -> AtlasImages {
    let mut images = AtlasImages::new();
    let spec = atlas_spec();
    images.insert(
        "1",
        Face::Front,
        Arc::new(RgbaImage::from_pixel(250, 35, Rgba([30, 90, 160, 255]))),
        &spec,
    );
    images.insert(
        "1",
        Face::Back,
        Arc::new(RgbaImage::from_pixel(25, 35, Rgba([160, 30, 30, 255]))),
        &spec,
    );
    images
}

#[test]
fn test_page_count() {
    assert_eq!(page_count(0, 4), 0);
    assert_eq!(page_count(1, 4), 1);
    assert_eq!(page_count(4, 4), 1);
    assert_eq!(page_count(10, 4), 3);
    assert_eq!(page_count(10, 0), 10);
}

#[test]
fn test_page_range() {
    assert_eq!(page_range(0, 10, 4), 0..4);
    assert_eq!(page_range(2, 10, 4), 8..10);
    assert_eq!(page_range(3, 10, 4), 10..10);
}

#[test]
fn test_pages_partition_the_deck() {
    let mut engine = PageLayoutEngine::new(4);
    engine.select_deck(test_deck(10));

    let sizes: Vec<usize> = engine.pages().iter().map(|p| p.len()).collect();
    assert_eq!(sizes, vec![4, 4, 2]);

    let flattened: Vec<u32> = engine.pages().concat();
    assert_eq!(flattened, (100..110).collect::<Vec<_>>());

    assert_eq!(engine.page_cards(2).unwrap(), &[108, 109]);
}

#[test]
fn test_engine_state_transitions() {
    let mut engine = PageLayoutEngine::new(4);
    assert_eq!(engine.state(), EngineState::Empty);
    assert_eq!(engine.page_count(), 0);
    assert!(matches!(engine.page_cards(0), Err(LayoutError::NoDeck)));

    engine.select_deck(test_deck(10));
    assert_eq!(
        engine.state(),
        EngineState::Paginated {
            page_count: 3,
            current_page: 0
        }
    );

    assert_eq!(engine.set_page(10), 2);
    assert_eq!(engine.next_page(), 2);
    assert_eq!(engine.previous_page(), 1);
    assert_eq!(engine.first_page(), 0);
    assert_eq!(engine.previous_page(), 0);
    assert_eq!(engine.last_page(), 2);

    // Fewer pages: the current page is pulled back into range
    engine.set_cards_per_page(5);
    assert_eq!(
        engine.state(),
        EngineState::Paginated {
            page_count: 2,
            current_page: 1
        }
    );

    engine.select_deck(test_deck(3));
    assert_eq!(engine.current_page(), 0);

    assert!(engine.clear_deck().is_some());
    assert_eq!(engine.state(), EngineState::Empty);
    assert_eq!(engine.current_page(), 0);
}

#[test]
fn test_page_out_of_range() {
    let mut engine = PageLayoutEngine::new(4);
    engine.select_deck(test_deck(10));
    match engine.page_cards(3) {
        Err(LayoutError::PageOutOfRange { page, page_count }) => {
            assert_eq!(page, 3);
            assert_eq!(page_count, 3);
        }
        other => panic!("expected PageOutOfRange, got {:?}", other),
    }
}

#[test]
fn test_zero_cards_per_page_is_clamped() {
    let mut engine = PageLayoutEngine::new(0);
    assert_eq!(engine.cards_per_page(), 1);
    engine.set_cards_per_page(0);
    assert_eq!(engine.cards_per_page(), 1);
}

#[test]
fn test_empty_deck_has_no_pages() {
    let mut engine = PageLayoutEngine::new(4);
    engine.select_deck(test_deck(0));
    assert_eq!(engine.page_count(), 0);
    assert!(engine.pages().is_empty());
    assert_eq!(engine.current_page(), 0);
}

#[test]
fn test_placements_and_atlas_usage() {
    let mut engine = PageLayoutEngine::new(4);
    let mut deck = test_deck(4);
    deck.card_ids.push(512);
    engine.select_deck(deck);

    let placements = engine.placements(1).unwrap();
    assert_eq!(placements, vec![None]);
    let placements = engine.placements(0).unwrap();
    let first = placements[0].as_ref().unwrap();
    assert_eq!(first.atlas_key, "1");
    assert_eq!(first.front, GridCell::new(0, 0));

    assert!(engine.page_uses_atlas(0, "1"));
    assert!(!engine.page_uses_atlas(0, "5"));
    assert!(engine.page_uses_atlas(1, "5"));
    assert!(!engine.page_uses_atlas(7, "1"));
}

#[test]
fn test_sheet_geometry() {
    let config = test_config();
    let geometry = SheetGeometry::from_config(&config);
    assert_eq!((geometry.page_width_px, geometry.page_height_px), (85, 110));
    assert_eq!(geometry.fold_x, 42);
    // Landscape cards lie on their side: 35 wide, 25 tall
    assert_eq!(geometry.front_size, (35, 25));
    assert_eq!(geometry.row_height(), 25);
    assert_eq!(geometry.rows_that_fit(), 4);
    assert_eq!(geometry.front_x(), 7);
    assert_eq!(geometry.back_x(), 42);
    assert!(geometry.fits_side_margins());
}

#[test]
fn test_columns_crossing_side_margins() {
    let mut config = test_config();
    // 4 in long landscape cards: front column starts at x = 2, inside the 5 px margin
    config.set_card_height(4.0);
    let geometry = SheetGeometry::from_config(&config);
    assert_eq!(geometry.front_x(), 2);
    assert_eq!(geometry.back_x() + geometry.back_size.0 as i64, 82);
    assert!(!geometry.fits_side_margins());
    assert_eq!(geometry.rows_that_fit(), 0);

    let mut engine = PageLayoutEngine::new(4);
    engine.select_deck(test_deck(4));
    let page = engine.render_page(0, &config, &test_images()).unwrap();
    assert!(page.status.crosses_side_margins);
    assert_eq!(page.status.overflow_rows, 4);
    assert!(!page.status.is_complete());
}

/// 2.0 x 3.0 in cards with a 0.2 in solid red bleed and 0.5 in crop marks.
///
/// Landscape faces are 34 x 24 px; the front sits at x = 8 and its trim box
/// starts at (10, 7) on the page.
fn marked_config(behind: bool) -> LayoutConfig {
    let mut config = test_config();
    config.set_card_width(2.0);
    config.set_card_height(3.0);
    config.set_bleed(0.2);
    config.set_crop_mark_length(0.5);
    config.front_bleed = BleedSpec::Solid(Color([255, 0, 0, 255]));
    config.crop_layer_behind = behind;
    config
}

#[test]
fn test_crop_marks_without_bleed() {
    let mut config = test_config();
    config.set_crop_mark_length(0.3);
    let mut engine = PageLayoutEngine::new(4);
    engine.select_deck(test_deck(1));

    let page = engine.render_page(0, &config, &test_images()).unwrap();
    let black = Color::BLACK.rgba();
    // Front face spans (7, 5)..(42, 30); its top-left mark lies in the margin
    assert_eq!(*page.surface.get_pixel(5, 4), black);
    assert_eq!(*page.surface.get_pixel(6, 3), black);
    // Back face's bottom-right mark below the row
    assert_eq!(*page.surface.get_pixel(77, 31), black);
    assert_eq!(*page.surface.get_pixel(20, 17), Rgba([30, 90, 160, 255]));
}

#[test]
fn test_crop_mark_stacking_order() {
    let mut engine = PageLayoutEngine::new(4);
    engine.select_deck(test_deck(1));
    let images = test_images();
    let red = Rgba([255, 0, 0, 255]);
    let black = Color::BLACK.rgba();

    let geometry = SheetGeometry::from_config(&marked_config(false));
    assert_eq!(geometry.front_x(), 8);
    assert_eq!(geometry.front_trim, relay_layout::layout::PixelRect::new(2, 2, 30, 20));

    let on_top = engine.render_page(0, &marked_config(false), &images).unwrap();
    let behind = engine.render_page(0, &marked_config(true), &images).unwrap();
    assert_ne!(on_top.surface, behind.surface);

    // Inside the bleed band: the mark shows on top, the bleed covers it behind
    assert_eq!(*on_top.surface.get_pixel(9, 6), black);
    assert_eq!(*behind.surface.get_pixel(9, 6), red);
    // Past the face raster the mark shows either way
    assert_eq!(*on_top.surface.get_pixel(6, 6), black);
    assert_eq!(*behind.surface.get_pixel(6, 6), black);
}

#[test]
fn test_sheet_layer_order() {
    assert_eq!(
        sheet_layers(true),
        [SheetLayer::CropMarks, SheetLayer::Faces, SheetLayer::FoldLine]
    );
    assert_eq!(
        sheet_layers(false),
        [SheetLayer::Faces, SheetLayer::CropMarks, SheetLayer::FoldLine]
    );
}

#[test]
fn test_render_page_places_faces_across_the_fold() {
    let config = test_config();
    let images = test_images();
    let mut engine = PageLayoutEngine::new(4);
    engine.select_deck(test_deck(10));

    let page = engine.render_page(0, &config, &images).unwrap();
    assert_eq!(page.index, 0);
    assert_eq!(page.surface.dimensions(), (85, 110));
    assert_eq!(page.status.cards_drawn, 4);
    assert!(page.status.is_complete());

    // Middle of the first row: front artwork left of the fold, back to the right
    let y = 5 + 12;
    assert_eq!(*page.surface.get_pixel(20, y), Rgba([30, 90, 160, 255]));
    assert_eq!(*page.surface.get_pixel(60, y), Rgba([160, 30, 30, 255]));
    // Below the last row the page stays white
    assert_eq!(*page.surface.get_pixel(20, 108), Color::WHITE.rgba());

    let last = engine.render_page(2, &config, &images).unwrap();
    assert_eq!(last.status.cards_drawn, 2);
}

#[test]
fn test_missing_atlas_renders_blank_cells() {
    let config = test_config();
    let mut engine = PageLayoutEngine::new(4);
    let mut deck = test_deck(1);
    // Atlas 2 is never listed in the manifest
    deck.card_ids.push(250);
    engine.select_deck(deck);

    let page = engine.render_page(0, &config, &test_images()).unwrap();
    assert_eq!(page.status.cards_drawn, 2);
    assert_eq!(page.status.blank_faces, 2);
    assert!(!page.status.is_complete());

    // Nothing loaded at all still renders
    let page = engine.render_page(0, &config, &AtlasImages::new()).unwrap();
    assert_eq!(page.status.blank_faces, 4);
}

#[test]
fn test_overflow_rows_are_counted() {
    let mut config = test_config();
    config.set_cards_per_page(6);
    let mut engine = PageLayoutEngine::new(4);
    engine.select_deck(test_deck(10));

    let page = engine.render_page(0, &config, &test_images()).unwrap();
    // Config wins over the engine's own cards per page
    assert_eq!(engine.cards_per_page(), 6);
    assert_eq!(page.status.cards_drawn, 6);
    assert_eq!(page.status.overflow_rows, 2);
}

#[test]
fn test_preview_matches_export() {
    let config = test_config();
    let images = test_images();
    let mut engine = PageLayoutEngine::new(4);
    engine.select_deck(test_deck(10));

    let all = render_all(&mut engine, &config, &images).unwrap();
    assert_eq!(all.len(), 3);
    for (index, page) in all.iter().enumerate() {
        assert_eq!(page.index, index);
    }

    engine.set_page(1);
    let preview = render_preview(&mut engine, &config, &images).unwrap();
    assert_eq!(preview.index, 1);
    assert_eq!(preview.surface, all[1].surface);
}

#[test]
fn test_render_without_deck() {
    let config = test_config();
    let mut engine = PageLayoutEngine::default();
    assert!(matches!(
        render_all(&mut engine, &config, &AtlasImages::new()),
        Err(LayoutError::NoDeck)
    ));
    assert!(matches!(
        render_preview(&mut engine, &config, &AtlasImages::new()),
        Err(LayoutError::NoDeck)
    ));
}
