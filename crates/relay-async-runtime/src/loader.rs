//! Independent per-face atlas loading

use relay_layout::{Deck, Face, load_atlas_image, resolve_image_path};
use std::path::Path;
use std::sync::Arc;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

use crate::{AtlasLoad, RelayCommand};

/// Start one loading task per atlas face of `deck`.
///
/// Each task reports back with `RelayCommand::AtlasLoaded` as soon as its face
/// is decoded or has failed, in whatever order they finish.
pub fn spawn_atlas_loads(
    deck: &Deck,
    base_dir: &Path,
    command_tx: &mpsc::UnboundedSender<RelayCommand>,
) -> Vec<JoinHandle<()>> {
    let mut handles = Vec::with_capacity(deck.atlases.len() * 2);
    for (key, spec) in &deck.atlases {
        for (face, url) in [(Face::Front, &spec.face_url), (Face::Back, &spec.back_url)] {
            let load = AtlasLoad {
                key: key.clone(),
                face,
                url: url.clone(),
                image: Err(String::new()),
            };
            let path = resolve_image_path(url, base_dir);
            let tx = command_tx.clone();
            handles.push(tokio::spawn(async move {
                let image = match path {
                    Some(path) => load_atlas_image(&path)
                        .await
                        .map(Arc::new)
                        .map_err(|e| e.to_string()),
                    None if load.url.trim().is_empty() => Err("no image listed".to_string()),
                    None => Err("remote atlases are not fetched".to_string()),
                };
                log::debug!("Atlas {} {} finished loading", load.key, load.face);
                let _ = tx.send(RelayCommand::AtlasLoaded(AtlasLoad { image, ..load }));
            }));
        }
    }
    handles
}
