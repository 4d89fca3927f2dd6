//! Pagination of a deck into fixed-capacity sheets

use std::ops::Range;

use super::cell::render_card;
use super::sheet::{SheetGeometry, assemble_page};
use super::types::RenderedPage;
use crate::atlas::{AtlasImages, CardPlacement};
use crate::manifest::Deck;
use crate::marks::CropMarkStyle;
use crate::options::LayoutConfig;
use crate::types::*;

/// Number of pages needed for `card_count` cards
pub fn page_count(card_count: usize, cards_per_page: usize) -> usize {
    card_count.div_ceil(cards_per_page.max(1))
}

/// Card index range covered by page `page`
pub fn page_range(page: usize, card_count: usize, cards_per_page: usize) -> Range<usize> {
    let per_page = cards_per_page.max(1);
    let start = page.saturating_mul(per_page).min(card_count);
    let end = start.saturating_add(per_page).min(card_count);
    start..end
}

/// Observable state of the layout engine
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EngineState {
    /// No deck selected
    Empty,
    /// A deck is selected and paginated
    Paginated {
        page_count: usize,
        current_page: usize,
    },
}

/// Drives pagination and per-page rendering for the selected deck
#[derive(Debug, Clone)]
pub struct PageLayoutEngine {
    deck: Option<Deck>,
    cards_per_page: usize,
    current_page: usize,
}

impl PageLayoutEngine {
    pub fn new(cards_per_page: usize) -> Self {
        Self {
            deck: None,
            cards_per_page: cards_per_page.max(1),
            current_page: 0,
        }
    }

    pub fn state(&self) -> EngineState {
        match &self.deck {
            None => EngineState::Empty,
            Some(_) => EngineState::Paginated {
                page_count: self.page_count(),
                current_page: self.current_page,
            },
        }
    }

    pub fn deck(&self) -> Option<&Deck> {
        self.deck.as_ref()
    }

    /// Select a deck; the current page is clamped into the new range
    pub fn select_deck(&mut self, deck: Deck) {
        log::debug!(
            "Selected deck '{}' with {} cards",
            deck.name,
            deck.card_count()
        );
        self.deck = Some(deck);
        self.clamp_current_page();
    }

    /// Drop the deck and return to the first page
    pub fn clear_deck(&mut self) -> Option<Deck> {
        self.current_page = 0;
        self.deck.take()
    }

    pub fn cards_per_page(&self) -> usize {
        self.cards_per_page
    }

    pub fn set_cards_per_page(&mut self, cards_per_page: usize) {
        self.cards_per_page = cards_per_page.max(1);
        self.clamp_current_page();
    }

    /// Zero when no deck is selected
    pub fn page_count(&self) -> usize {
        self.deck
            .as_ref()
            .map(|d| page_count(d.card_count(), self.cards_per_page))
            .unwrap_or(0)
    }

    pub fn current_page(&self) -> usize {
        self.current_page
    }

    /// Move to `page`, clamped to the valid range. Returns the page selected.
    pub fn set_page(&mut self, page: usize) -> usize {
        self.current_page = page;
        self.clamp_current_page();
        self.current_page
    }

    pub fn next_page(&mut self) -> usize {
        self.set_page(self.current_page.saturating_add(1))
    }

    pub fn previous_page(&mut self) -> usize {
        self.set_page(self.current_page.saturating_sub(1))
    }

    pub fn first_page(&mut self) -> usize {
        self.set_page(0)
    }

    pub fn last_page(&mut self) -> usize {
        self.set_page(self.page_count().saturating_sub(1))
    }

    fn clamp_current_page(&mut self) {
        let last = self.page_count().saturating_sub(1);
        self.current_page = self.current_page.min(last);
    }

    fn checked_deck(&self, page: usize) -> Result<&Deck> {
        let deck = self.deck.as_ref().ok_or(LayoutError::NoDeck)?;
        let page_count = self.page_count();
        if page >= page_count {
            return Err(LayoutError::PageOutOfRange { page, page_count });
        }
        Ok(deck)
    }

    /// Card ids on `page`; the last page may be short
    pub fn page_cards(&self, page: usize) -> Result<&[u32]> {
        let deck = self.checked_deck(page)?;
        let range = page_range(page, deck.card_count(), self.cards_per_page);
        Ok(&deck.card_ids[range])
    }

    /// Card ids on every page, in order
    pub fn pages(&self) -> Vec<&[u32]> {
        match &self.deck {
            Some(deck) => deck.card_ids.chunks(self.cards_per_page).collect(),
            None => Vec::new(),
        }
    }

    /// Resolved atlas placements for `page`; `None` marks a card without an atlas
    pub fn placements(&self, page: usize) -> Result<Vec<Option<CardPlacement>>> {
        let deck = self.checked_deck(page)?;
        Ok(self
            .page_cards(page)?
            .iter()
            .map(|&id| deck.atlas_for(id).map(|spec| CardPlacement::resolve(id, spec)))
            .collect())
    }

    /// Whether any card on `page` lives in atlas `atlas_key`
    pub fn page_uses_atlas(&self, page: usize, atlas_key: &str) -> bool {
        self.page_cards(page)
            .map(|ids| ids.iter().any(|&id| crate::manifest::atlas_key(id) == atlas_key))
            .unwrap_or(false)
    }

    /// Render `page` into a page-sized surface.
    ///
    /// The configuration's cards-per-page governs rendering, so the engine
    /// follows it before slicing the deck.
    pub fn render_page(
        &mut self,
        page: usize,
        config: &LayoutConfig,
        images: &AtlasImages,
    ) -> Result<RenderedPage> {
        if config.cards_per_page() != self.cards_per_page {
            self.set_cards_per_page(config.cards_per_page());
        }
        let deck = self.checked_deck(page)?;
        let cards: Vec<_> = self
            .page_cards(page)?
            .iter()
            .map(|&id| render_card(id, deck, config, images))
            .collect();

        let geometry = SheetGeometry::from_config(config);
        let marks = CropMarkStyle::from_config(config);
        let (surface, status) = assemble_page(&geometry, &cards, &marks, config.ppi());
        if status.crosses_side_margins {
            log::warn!(
                "Page {}: card columns cross the {} px side margins",
                page + 1,
                geometry.margin_px
            );
        }
        if status.overflow_rows > 0 {
            log::warn!(
                "Page {}: {} card row(s) do not fit inside the margins",
                page + 1,
                status.overflow_rows
            );
        }
        log::debug!(
            "Rendered page {} ({} cards, {} blank faces)",
            page + 1,
            status.cards_drawn,
            status.blank_faces
        );
        Ok(RenderedPage {
            index: page,
            surface,
            status,
        })
    }
}

impl Default for PageLayoutEngine {
    fn default() -> Self {
        Self::new(crate::constants::DEFAULT_CARDS_PER_PAGE)
    }
}
