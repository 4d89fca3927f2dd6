//! Manifest, atlas and page I/O

use image::RgbaImage;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::atlas::AtlasImages;
use crate::layout::RenderedPage;
use crate::manifest::{Deck, Manifest};
use crate::types::*;

/// Parse a manifest from JSON bytes
pub fn parse_manifest(bytes: &[u8]) -> Result<Manifest> {
    Ok(serde_json::from_slice(bytes)?)
}

/// Load a manifest file
pub async fn load_manifest(path: impl AsRef<Path>) -> Result<Manifest> {
    let bytes = tokio::fs::read(path.as_ref()).await?;
    let manifest = tokio::task::spawn_blocking(move || parse_manifest(&bytes)).await??;
    Ok(manifest)
}

/// Resolve an atlas URL to a local file.
///
/// `file://` URLs and plain paths are accepted; relative paths are taken from
/// `base_dir`. Remote URLs return `None`: fetching them is the caller's job.
pub fn resolve_image_path(url: &str, base_dir: &Path) -> Option<PathBuf> {
    let url = url.trim();
    if url.is_empty() {
        return None;
    }
    let path = match url.strip_prefix("file://") {
        Some(rest) => PathBuf::from(rest),
        None if url.contains("://") => return None,
        None => PathBuf::from(url),
    };
    if path.is_absolute() {
        Some(path)
    } else {
        Some(base_dir.join(path))
    }
}

/// Decode an atlas image file into an RGBA buffer
pub async fn load_atlas_image(path: impl AsRef<Path>) -> Result<RgbaImage> {
    let path = path.as_ref().to_owned();
    let bytes = tokio::fs::read(&path).await?;
    let image = tokio::task::spawn_blocking(move || {
        let decoded = image::load_from_memory(&bytes)?;
        Ok::<_, LayoutError>(decoded.to_rgba8())
    })
    .await??;
    Ok(image)
}

/// Load every atlas face of `deck` one after another.
///
/// Faces that cannot be resolved or decoded are logged and left missing;
/// they render as blank cells.
pub async fn load_deck_images(deck: &Deck, base_dir: &Path) -> AtlasImages {
    let mut images = AtlasImages::new();
    for (key, spec) in &deck.atlases {
        for (face, url) in [(Face::Front, &spec.face_url), (Face::Back, &spec.back_url)] {
            let Some(path) = resolve_image_path(url, base_dir) else {
                log::warn!("Atlas {} {}: cannot load '{}', skipping", key, face, url);
                continue;
            };
            match load_atlas_image(&path).await {
                Ok(image) => {
                    log::debug!(
                        "Loaded atlas {} {} ({}x{})",
                        key,
                        face,
                        image.width(),
                        image.height()
                    );
                    images.insert(key, face, Arc::new(image), spec);
                }
                Err(e) => log::warn!("Atlas {} {}: {}", key, face, e),
            }
        }
    }
    images
}

/// File name used for an exported page
pub fn page_file_name(index: usize) -> String {
    format!("page-{:03}.png", index + 1)
}

/// Write one page as PNG into `dir`
pub async fn save_page(page: &RenderedPage, dir: impl AsRef<Path>) -> Result<PathBuf> {
    let path = dir.as_ref().join(page_file_name(page.index));
    let surface = page.surface.clone();
    let target = path.clone();
    tokio::task::spawn_blocking(move || surface.save_with_format(&target, image::ImageFormat::Png))
        .await??;
    Ok(path)
}

/// Write every page into `dir`, creating it if needed
pub async fn save_pages(pages: &[RenderedPage], dir: impl AsRef<Path>) -> Result<Vec<PathBuf>> {
    let dir = dir.as_ref();
    tokio::fs::create_dir_all(dir).await?;
    let mut paths = Vec::with_capacity(pages.len());
    for page in pages {
        paths.push(save_page(page, dir).await?);
    }
    log::info!("Saved {} page(s) to {}", paths.len(), dir.display());
    Ok(paths)
}
