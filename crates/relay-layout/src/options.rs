use serde::{Deserialize, Serialize};

use crate::atlas::AtlasImages;
use crate::constants::*;
use crate::types::*;

/// Complete layout configuration.
///
/// Lengths are stored in inches. Setters take values in `unit` and clamp them
/// to their valid domain; with the aspect ratio preserved, changing either
/// card dimension recomputes the other from the locked ratio.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LayoutConfig {
    /// Unit used by setters and for display
    pub unit: Unit,
    pub paper_size: PaperSize,
    pub orientation: Orientation,
    pub card_orientation: CardOrientation,
    cards_per_page: usize,
    margin_in: f64,
    /// Extra space between front and back columns, split around the fold
    gutter_in: f64,
    ppi: f64,
    card_width_in: f64,
    card_height_in: f64,
    bleed_in: f64,
    pub front_bleed: BleedSpec,
    pub back_bleed: BleedSpec,
    preserve_aspect_ratio: bool,
    aspect_ratio: f64,
    /// Take the aspect ratio from the first loaded atlas cell
    pub derive_aspect_ratio: bool,
    /// Draw crop marks beneath the card image
    pub crop_layer_behind: bool,
    pub crop_mark_color: Color,
    pub crop_mark_length_in: f64,
    /// Smoothing sigma (pixels) for generated bleed
    pub generated_bleed_blur: f32,
}

impl Default for LayoutConfig {
    fn default() -> Self {
        Self {
            unit: Unit::Inches,
            paper_size: PaperSize::Letter,
            orientation: Orientation::Portrait,
            card_orientation: CardOrientation::Landscape,
            cards_per_page: DEFAULT_CARDS_PER_PAGE,
            margin_in: DEFAULT_MARGIN_IN,
            gutter_in: 0.0,
            ppi: DEFAULT_PPI,
            card_width_in: DEFAULT_CARD_WIDTH_IN,
            card_height_in: DEFAULT_CARD_HEIGHT_IN,
            bleed_in: 0.0,
            front_bleed: BleedSpec::default(),
            back_bleed: BleedSpec::default(),
            preserve_aspect_ratio: false,
            aspect_ratio: DEFAULT_CARD_WIDTH_IN / DEFAULT_CARD_HEIGHT_IN,
            derive_aspect_ratio: false,
            crop_layer_behind: false,
            crop_mark_color: Color::BLACK,
            crop_mark_length_in: CROP_MARK_LENGTH_IN,
            generated_bleed_blur: DEFAULT_BLEED_BLUR_SIGMA,
        }
    }
}

/// Clamp a length to `[0, max]`, mapping non-finite input to zero
fn clamp_length(value: f64, max: f64) -> f64 {
    if value.is_finite() {
        value.clamp(0.0, max)
    } else {
        0.0
    }
}

impl LayoutConfig {
    /// Load a configuration from a JSON file
    pub async fn load(path: impl AsRef<std::path::Path>) -> Result<Self> {
        let bytes = tokio::fs::read(path).await?;
        let config: Self = serde_json::from_slice(&bytes)
            .map_err(|e| LayoutError::Config(format!("Failed to parse config: {}", e)))?;
        config.validate()?;
        Ok(config)
    }

    /// Save the configuration as pretty JSON
    pub async fn save(&self, path: impl AsRef<std::path::Path>) -> Result<()> {
        let json = serde_json::to_string_pretty(self)
            .map_err(|e| LayoutError::Config(format!("Failed to serialize config: {}", e)))?;
        tokio::fs::write(path, json).await?;
        Ok(())
    }

    /// Reject values the setters would never produce
    pub fn validate(&self) -> Result<()> {
        if self.cards_per_page == 0 {
            return Err(LayoutError::Config(
                "Cards per page must be at least 1".to_string(),
            ));
        }
        if !self.ppi.is_finite() || self.ppi < MIN_PPI {
            return Err(LayoutError::Config(format!(
                "Resolution must be at least {} pixels per inch",
                MIN_PPI
            )));
        }
        let lengths = [
            ("margin", self.margin_in),
            ("gutter", self.gutter_in),
            ("card width", self.card_width_in),
            ("card height", self.card_height_in),
            ("bleed", self.bleed_in),
            ("crop mark length", self.crop_mark_length_in),
        ];
        for (name, value) in lengths {
            if !value.is_finite() || value < 0.0 {
                return Err(LayoutError::Config(format!(
                    "{} must be a non-negative length",
                    name
                )));
            }
        }
        if self.bleed_in > MAX_BLEED_IN {
            return Err(LayoutError::Config(format!(
                "Bleed may not exceed {} in",
                MAX_BLEED_IN
            )));
        }
        if !self.aspect_ratio.is_finite() || self.aspect_ratio <= 0.0 {
            return Err(LayoutError::Config(
                "Aspect ratio must be positive".to_string(),
            ));
        }
        Ok(())
    }

    // -------------------------------------------------------------------------
    // Accessors (inches)
    // -------------------------------------------------------------------------

    pub fn cards_per_page(&self) -> usize {
        self.cards_per_page
    }

    pub fn margin_in(&self) -> f64 {
        self.margin_in
    }

    pub fn gutter_in(&self) -> f64 {
        self.gutter_in
    }

    /// Pixels per inch
    pub fn ppi(&self) -> f64 {
        self.ppi
    }

    pub fn card_width_in(&self) -> f64 {
        self.card_width_in
    }

    pub fn card_height_in(&self) -> f64 {
        self.card_height_in
    }

    pub fn bleed_in(&self) -> f64 {
        self.bleed_in
    }

    pub fn preserve_aspect_ratio(&self) -> bool {
        self.preserve_aspect_ratio
    }

    /// Locked width / height ratio
    pub fn aspect_ratio(&self) -> f64 {
        self.aspect_ratio
    }

    /// Display value of an inch length in the configured unit
    pub fn display(&self, inches: f64) -> f64 {
        self.unit.from_inches(inches)
    }

    // -------------------------------------------------------------------------
    // Setters (values in `unit`)
    // -------------------------------------------------------------------------

    pub fn set_cards_per_page(&mut self, count: usize) {
        self.cards_per_page = count.max(1);
    }

    pub fn set_margin(&mut self, value: f64) {
        self.margin_in = clamp_length(self.unit.to_inches(value), f64::MAX);
    }

    pub fn set_gutter(&mut self, value: f64) {
        self.gutter_in = clamp_length(self.unit.to_inches(value), f64::MAX);
    }

    /// Resolution in pixels per `unit`
    pub fn set_resolution(&mut self, pixels_per_unit: f64) {
        let ppi = match self.unit {
            Unit::Inches => pixels_per_unit,
            Unit::Millimeters => pixels_per_unit * crate::units::MM_PER_INCH,
        };
        self.ppi = if ppi.is_finite() { ppi.max(MIN_PPI) } else { MIN_PPI };
    }

    /// Resolution in pixels per `unit`
    pub fn resolution(&self) -> f64 {
        match self.unit {
            Unit::Inches => self.ppi,
            Unit::Millimeters => self.ppi / crate::units::MM_PER_INCH,
        }
    }

    pub fn set_bleed(&mut self, value: f64) {
        self.bleed_in = clamp_length(self.unit.to_inches(value), MAX_BLEED_IN);
    }

    pub fn set_crop_mark_length(&mut self, value: f64) {
        self.crop_mark_length_in = clamp_length(self.unit.to_inches(value), f64::MAX);
    }

    pub fn set_card_width(&mut self, value: f64) {
        self.card_width_in = clamp_length(self.unit.to_inches(value), f64::MAX);
        if self.preserve_aspect_ratio {
            self.card_height_in = self.card_width_in / self.aspect_ratio;
        }
    }

    pub fn set_card_height(&mut self, value: f64) {
        self.card_height_in = clamp_length(self.unit.to_inches(value), f64::MAX);
        if self.preserve_aspect_ratio {
            self.card_width_in = self.card_height_in * self.aspect_ratio;
        }
    }

    /// Lock or unlock the aspect ratio. Locking re-derives the height from the width.
    pub fn set_preserve_aspect_ratio(&mut self, preserve: bool) {
        self.preserve_aspect_ratio = preserve;
        if preserve {
            self.card_height_in = self.card_width_in / self.aspect_ratio;
        }
    }

    /// Replace the locked ratio (width / height). Non-positive ratios are ignored.
    pub fn set_aspect_ratio(&mut self, ratio: f64) {
        if !ratio.is_finite() || ratio <= 0.0 {
            return;
        }
        self.aspect_ratio = ratio;
        if self.preserve_aspect_ratio {
            self.card_height_in = self.card_width_in / ratio;
        }
    }

    /// Update the aspect ratio from atlas cells when derivation is requested
    /// and the ratio is locked.
    ///
    /// Returns the ratio that was applied, if any.
    pub fn derive_aspect_ratio_from(&mut self, images: &AtlasImages) -> Option<f64> {
        if !(self.derive_aspect_ratio && self.preserve_aspect_ratio) {
            return None;
        }
        let ratio = images.cell_aspect_ratio()?;
        self.set_aspect_ratio(ratio);
        Some(ratio)
    }

    /// Whether two configurations produce face rasters of different pixel sizes
    pub fn face_size_differs(&self, other: &LayoutConfig) -> bool {
        self.card_width_in != other.card_width_in
            || self.card_height_in != other.card_height_in
            || self.bleed_in != other.bleed_in
            || self.ppi != other.ppi
    }
}
