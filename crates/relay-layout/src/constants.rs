//! Shared constants for card layout
//!
//! This module centralizes magic numbers used throughout rendering.

// =============================================================================
// Card Identifiers
// =============================================================================

/// Card ids encode `atlas_index * 100 + position`; the low two digits pick the cell.
pub const CARD_ID_MODULUS: u32 = 100;

// =============================================================================
// Configuration Limits
// =============================================================================

/// Largest bleed accepted at the configuration boundary (inches)
pub const MAX_BLEED_IN: f64 = 0.5;

/// Smallest usable raster resolution (pixels per inch)
pub const MIN_PPI: f64 = 1.0;

// =============================================================================
// Defaults
// =============================================================================

pub const DEFAULT_CARDS_PER_PAGE: usize = 4;
pub const DEFAULT_CARD_WIDTH_IN: f64 = 2.5;
pub const DEFAULT_CARD_HEIGHT_IN: f64 = 3.5;
pub const DEFAULT_MARGIN_IN: f64 = 0.5;
pub const DEFAULT_PPI: f64 = 300.0;

/// Gaussian sigma (output pixels) used to soften generated bleed
pub const DEFAULT_BLEED_BLUR_SIGMA: f32 = 2.0;

// =============================================================================
// Printer's Marks
// =============================================================================

/// Length of each crop mark arm (inches)
pub const CROP_MARK_LENGTH_IN: f64 = 0.125;

/// Stroke width for crop marks (inches)
pub const CROP_MARK_WIDTH_IN: f64 = 0.01;

/// Stroke width for the fold line (inches)
pub const FOLD_LINE_WIDTH_IN: f64 = 0.01;

/// Fold line dash pattern: 6pt dash, 3pt gap
pub const FOLD_DASH_IN: f64 = 6.0 / 72.0;
pub const FOLD_GAP_IN: f64 = 3.0 / 72.0;
