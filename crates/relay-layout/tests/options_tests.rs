use relay_layout::*;
use tempfile::TempDir;

fn assert_close(actual: f64, expected: f64) {
    assert!(
        (actual - expected).abs() < 1e-9,
        "expected {}, got {}",
        expected,
        actual
    );
}

#[test]
fn test_defaults() {
    let config = LayoutConfig::default();
    assert_eq!(config.cards_per_page(), 4);
    assert_close(config.card_width_in(), 2.5);
    assert_close(config.card_height_in(), 3.5);
    assert_close(config.margin_in(), 0.5);
    assert_close(config.ppi(), 300.0);
    assert_close(config.aspect_ratio(), 2.5 / 3.5);
    assert_eq!(config.front_bleed, BleedSpec::Solid(Color::WHITE));
    assert_eq!(config.card_orientation, CardOrientation::Landscape);
    assert!(config.validate().is_ok());
}

#[test]
fn test_aspect_lock_derives_other_dimension() {
    let mut config = LayoutConfig::default();
    config.set_preserve_aspect_ratio(true);

    config.set_card_width(5.0);
    assert_close(config.card_width_in(), 5.0);
    assert_close(config.card_height_in(), 7.0);

    config.set_card_height(3.5);
    assert_close(config.card_height_in(), 3.5);
    assert_close(config.card_width_in(), 2.5);
}

#[test]
fn test_unlocked_dimensions_are_independent() {
    let mut config = LayoutConfig::default();
    config.set_card_width(3.0);
    assert_close(config.card_height_in(), 3.5);
    config.set_card_height(1.0);
    assert_close(config.card_width_in(), 3.0);
}

#[test]
fn test_locking_rederives_height() {
    let mut config = LayoutConfig::default();
    config.set_card_width(5.0);
    config.set_preserve_aspect_ratio(true);
    assert_close(config.card_height_in(), 7.0);
}

#[test]
fn test_invalid_aspect_ratio_is_ignored() {
    let mut config = LayoutConfig::default();
    config.set_aspect_ratio(0.0);
    config.set_aspect_ratio(f64::NAN);
    assert_close(config.aspect_ratio(), 2.5 / 3.5);
    config.set_aspect_ratio(1.0);
    assert_close(config.aspect_ratio(), 1.0);
}

#[test]
fn test_setters_clamp() {
    let mut config = LayoutConfig::default();
    config.set_bleed(2.0);
    assert_close(config.bleed_in(), 0.5);
    config.set_bleed(-1.0);
    assert_close(config.bleed_in(), 0.0);
    config.set_margin(f64::INFINITY);
    assert_close(config.margin_in(), 0.0);
    config.set_resolution(0.0);
    assert_close(config.ppi(), 1.0);
    config.set_cards_per_page(0);
    assert_eq!(config.cards_per_page(), 1);
    assert!(config.validate().is_ok());
}

#[test]
fn test_millimeter_setters() {
    let mut config = LayoutConfig::default();
    config.unit = Unit::Millimeters;
    config.set_card_width(63.5);
    assert_close(config.card_width_in(), 2.5);
    config.set_bleed(3.175);
    assert_close(config.bleed_in(), 0.125);
    assert_close(config.display(config.bleed_in()), 3.175);

    config.set_resolution(10.0);
    assert_close(config.ppi(), 254.0);
    assert_close(config.resolution(), 10.0);
}

#[test]
fn test_validate_rejects_bad_json_values() {
    let json = r#"{ "cards_per_page": 0 }"#;
    let config: LayoutConfig = serde_json::from_str(json).unwrap();
    assert!(matches!(config.validate(), Err(LayoutError::Config(_))));

    let json = r#"{ "bleed_in": 0.75 }"#;
    let config: LayoutConfig = serde_json::from_str(json).unwrap();
    assert!(config.validate().is_err());

    let json = r#"{ "ppi": 0.5 }"#;
    let config: LayoutConfig = serde_json::from_str(json).unwrap();
    assert!(config.validate().is_err());
}

#[test]
fn test_face_size_differs() {
    let base = LayoutConfig::default();
    let mut other = base.clone();
    other.crop_layer_behind = true;
    assert!(!base.face_size_differs(&other));
    other.set_bleed(0.125);
    assert!(base.face_size_differs(&other));
}

#[test]
fn test_derive_aspect_ratio_from_atlas() {
    use image::RgbaImage;
    use std::sync::Arc;

    let spec = AtlasSpec {
        face_url: String::new(),
        back_url: String::new(),
        grid_width: 2,
        grid_height: 1,
        unique_back: false,
    };
    let mut images = AtlasImages::new();
    images.insert("1", Face::Front, Arc::new(RgbaImage::new(200, 100)), &spec);

    let mut config = LayoutConfig::default();
    assert_eq!(config.derive_aspect_ratio_from(&images), None);

    // Derivation only applies while the ratio is locked
    config.derive_aspect_ratio = true;
    assert_eq!(config.derive_aspect_ratio_from(&images), None);
    assert_close(config.aspect_ratio(), 2.5 / 3.5);

    config.set_preserve_aspect_ratio(true);
    config.set_card_width(2.0);
    assert_eq!(config.derive_aspect_ratio_from(&images), Some(1.0));
    assert_close(config.card_height_in(), 2.0);
}

#[test]
fn test_bleed_spec_parse() {
    assert_eq!(BleedSpec::parse("none", None).unwrap(), BleedSpec::None);
    assert_eq!(BleedSpec::parse("gen", None).unwrap(), BleedSpec::Generated);
    assert_eq!(
        BleedSpec::parse("Generated", None).unwrap(),
        BleedSpec::Generated
    );
    assert_eq!(
        BleedSpec::parse("preset", None).unwrap(),
        BleedSpec::IncludedPreset
    );
    assert_eq!(
        BleedSpec::parse("solid", Some("#ff0000")).unwrap(),
        BleedSpec::Solid(Color([255, 0, 0, 255]))
    );
    // A solid bleed with no color falls back to white
    assert_eq!(
        BleedSpec::parse("solid", None).unwrap(),
        BleedSpec::Solid(Color::WHITE)
    );
    assert!(BleedSpec::parse("mirror", None).is_err());
    assert!(BleedSpec::parse("solid", Some("not-a-color")).is_err());
}

#[test]
fn test_color_parse() {
    assert_eq!("#000".parse::<Color>().unwrap(), Color::BLACK);
    assert_eq!("#FFFFFF".parse::<Color>().unwrap(), Color::WHITE);
    assert_eq!(
        "#11223380".parse::<Color>().unwrap(),
        Color([0x11, 0x22, 0x33, 0x80])
    );
    assert_eq!("red".parse::<Color>().unwrap(), Color([255, 0, 0, 255]));
    assert_eq!("".parse::<Color>().unwrap(), Color::WHITE);
    assert!("#12345".parse::<Color>().is_err());
    assert!("#gggggg".parse::<Color>().is_err());
    assert_eq!(Color([0x11, 0x22, 0x33, 0x80]).to_string(), "#11223380");
    assert_eq!(Color::BLACK.to_string(), "#000000");
}

#[test]
fn test_paper_dimensions() {
    let (w, h) = PaperSize::Letter.dimensions_in(Orientation::Portrait);
    assert_close(w, 8.5);
    assert_close(h, 11.0);
    let (w, h) = PaperSize::A4.dimensions_in(Orientation::Landscape);
    assert!(w > h);
    let (w, _) = PaperSize::Custom {
        width_mm: 254.0,
        height_mm: 100.0,
    }
    .dimensions_in(Orientation::Portrait);
    assert_close(w, 10.0);
}

#[tokio::test]
async fn test_save_and_load_round_trip() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("relay.json");

    let mut config = LayoutConfig::default();
    config.paper_size = PaperSize::A4;
    config.front_bleed = BleedSpec::Generated;
    config.back_bleed = BleedSpec::Solid(Color([10, 20, 30, 255]));
    config.crop_mark_color = Color([200, 0, 0, 255]);
    config.set_bleed(0.125);
    config.set_cards_per_page(3);

    config.save(&path).await.unwrap();
    let loaded = LayoutConfig::load(&path).await.unwrap();
    assert_eq!(loaded, config);
}

#[tokio::test]
async fn test_load_partial_file_uses_defaults() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("partial.json");
    tokio::fs::write(&path, r#"{ "crop_layer_behind": true }"#)
        .await
        .unwrap();

    let loaded = LayoutConfig::load(&path).await.unwrap();
    assert!(loaded.crop_layer_behind);
    assert_eq!(loaded.cards_per_page(), 4);
}

#[tokio::test]
async fn test_load_rejects_garbage() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("broken.json");
    tokio::fs::write(&path, "not json").await.unwrap();
    assert!(matches!(
        LayoutConfig::load(&path).await,
        Err(LayoutError::Config(_))
    ));
    assert!(matches!(
        LayoutConfig::load(dir.path().join("missing.json")).await,
        Err(LayoutError::Io(_))
    ));
}
