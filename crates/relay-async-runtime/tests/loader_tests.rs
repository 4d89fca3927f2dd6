use image::{Rgba, RgbaImage};
use relay_async_runtime::*;
use relay_layout::AtlasSpec;
use std::collections::BTreeMap;
use tempfile::TempDir;
use tokio::sync::mpsc;

#[tokio::test]
async fn test_each_face_reports_independently() {
    let dir = TempDir::new().unwrap();
    RgbaImage::from_pixel(60, 40, Rgba([255, 255, 0, 255]))
        .save(dir.path().join("faces.png"))
        .unwrap();

    let mut atlases = BTreeMap::new();
    atlases.insert(
        "3".to_string(),
        AtlasSpec {
            face_url: "faces.png".to_string(),
            back_url: "https://example.invalid/back.png".to_string(),
            grid_width: 3,
            grid_height: 2,
            unique_back: false,
        },
    );
    atlases.insert(
        "4".to_string(),
        AtlasSpec {
            face_url: "missing.png".to_string(),
            back_url: String::new(),
            grid_width: 1,
            grid_height: 1,
            unique_back: false,
        },
    );
    let deck = Deck::new("Loader", vec![300, 301, 400], atlases);

    let (command_tx, mut command_rx) = mpsc::unbounded_channel();
    let handles = spawn_atlas_loads(&deck, dir.path(), &command_tx);
    assert_eq!(handles.len(), 4);
    for handle in handles {
        handle.await.unwrap();
    }
    drop(command_tx);

    let mut loads = Vec::new();
    while let Some(cmd) = command_rx.recv().await {
        match cmd {
            RelayCommand::AtlasLoaded(load) => loads.push(load),
            other => panic!("unexpected command {:?}", other),
        }
    }
    loads.sort_by(|a, b| (&a.key, a.face == Face::Back).cmp(&(&b.key, b.face == Face::Back)));
    assert_eq!(loads.len(), 4);

    let front = &loads[0];
    assert_eq!((front.key.as_str(), front.face), ("3", Face::Front));
    assert_eq!(front.url, "faces.png");
    let image = front.image.as_ref().unwrap();
    assert_eq!(image.dimensions(), (60, 40));

    let remote = &loads[1];
    assert_eq!(remote.face, Face::Back);
    assert!(remote.image.as_ref().unwrap_err().contains("remote"));

    assert!(loads[2].image.is_err());
    assert_eq!(loads[3].image.as_ref().unwrap_err(), "no image listed");
}
