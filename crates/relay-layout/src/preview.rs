use crate::atlas::AtlasImages;
use crate::layout::{PageLayoutEngine, RenderedPage};
use crate::options::LayoutConfig;
use crate::types::*;

/// Render only the engine's current page.
///
/// Preview and export share the same per-card path, so a previewed page is
/// pixel-identical to the same page in an export.
pub fn render_preview(
    engine: &mut PageLayoutEngine,
    config: &LayoutConfig,
    images: &AtlasImages,
) -> Result<RenderedPage> {
    engine.set_cards_per_page(config.cards_per_page());
    let page = engine.current_page();
    engine.render_page(page, config, images)
}

/// Render every page in order
pub fn render_all(
    engine: &mut PageLayoutEngine,
    config: &LayoutConfig,
    images: &AtlasImages,
) -> Result<Vec<RenderedPage>> {
    if engine.deck().is_none() {
        return Err(LayoutError::NoDeck);
    }
    engine.set_cards_per_page(config.cards_per_page());
    let pages = (0..engine.page_count())
        .map(|page| engine.render_page(page, config, images))
        .collect::<Result<Vec<_>>>()?;
    log::info!("Rendered {} page(s)", pages.len());
    Ok(pages)
}
