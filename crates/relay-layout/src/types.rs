use image::Rgba;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

use crate::units::{to_in, to_mm};

#[derive(Error, Debug)]
pub enum LayoutError {
    #[error("Image error: {0}")]
    Image(#[from] image::ImageError),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Manifest error: {0}")]
    Manifest(#[from] serde_json::Error),
    #[error("Invalid configuration: {0}")]
    Config(String),
    #[error("Task join error: {0}")]
    TaskJoin(#[from] tokio::task::JoinError),
    #[error("No deck selected")]
    NoDeck,
    #[error("Page {page} is out of range (deck has {page_count} pages)")]
    PageOutOfRange { page: usize, page_count: usize },
}

pub type Result<T> = std::result::Result<T, LayoutError>;

/// Physical length unit used at the configuration and display boundary.
///
/// Everything inside the crate is stored in inches.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Unit {
    #[default]
    #[serde(rename = "in")]
    Inches,
    #[serde(rename = "mm")]
    Millimeters,
}

impl Unit {
    pub fn name(self) -> &'static str {
        match self {
            Unit::Inches => "in",
            Unit::Millimeters => "mm",
        }
    }

    /// Convert a value expressed in this unit to inches
    pub fn to_inches(self, value: f64) -> f64 {
        match self {
            Unit::Inches => value,
            Unit::Millimeters => to_in(value),
        }
    }

    /// Convert a value in inches to this unit
    pub fn from_inches(self, value: f64) -> f64 {
        match self {
            Unit::Inches => value,
            Unit::Millimeters => to_mm(value),
        }
    }
}

impl FromStr for Unit {
    type Err = LayoutError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "in" | "inch" | "inches" => Ok(Unit::Inches),
            "mm" | "millimeters" => Ok(Unit::Millimeters),
            other => Err(LayoutError::Config(format!("Unknown unit: {}", other))),
        }
    }
}

/// Paper orientation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Orientation {
    /// Portrait: height > width
    #[default]
    Portrait,
    /// Landscape: width > height
    Landscape,
}

/// Standard paper sizes
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub enum PaperSize {
    #[default]
    Letter,
    Legal,
    A4,
    A5,
    Custom { width_mm: f64, height_mm: f64 },
}

impl PaperSize {
    /// Base dimensions in millimeters (always portrait)
    pub fn dimensions_mm(self) -> (f64, f64) {
        match self {
            PaperSize::Letter => (215.9, 279.4),
            PaperSize::Legal => (215.9, 355.6),
            PaperSize::A4 => (210.0, 297.0),
            PaperSize::A5 => (148.0, 210.0),
            PaperSize::Custom {
                width_mm,
                height_mm,
            } => (width_mm, height_mm),
        }
    }

    /// Dimensions in inches with orientation applied
    pub fn dimensions_in(self, orientation: Orientation) -> (f64, f64) {
        let (w, h) = self.dimensions_mm();
        let (w, h) = (to_in(w), to_in(h));
        match orientation {
            Orientation::Portrait => (w, h),
            Orientation::Landscape => (h, w),
        }
    }
}

/// Which face of a card
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Face {
    Front,
    Back,
}

impl fmt::Display for Face {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Face::Front => f.write_str("front"),
            Face::Back => f.write_str("back"),
        }
    }
}

/// Quarter-turn rotation applied to a rendered face
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Rotation {
    #[default]
    None,
    Clockwise90,
    Clockwise180,
    Clockwise270,
}

impl Rotation {
    pub fn degrees(self) -> i32 {
        match self {
            Rotation::None => 0,
            Rotation::Clockwise90 => 90,
            Rotation::Clockwise180 => 180,
            Rotation::Clockwise270 => 270,
        }
    }

    /// Whether this rotation swaps width and height
    pub fn is_quarter_turn(self) -> bool {
        matches!(self, Rotation::Clockwise90 | Rotation::Clockwise270)
    }
}

/// How cards sit on the sheet relative to the fold line.
///
/// Front and back of a card are always rotated 180° relative to each other so
/// that folding the sheet brings matching edges into register.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum CardOrientation {
    /// Cards lie on their side; the fold runs along their bottom edges.
    #[default]
    Landscape,
    /// Cards stand upright; the back is drawn upside down.
    Portrait,
}

impl CardOrientation {
    pub fn rotation_for(self, face: Face) -> Rotation {
        match (self, face) {
            (CardOrientation::Landscape, Face::Front) => Rotation::Clockwise270,
            (CardOrientation::Landscape, Face::Back) => Rotation::Clockwise90,
            (CardOrientation::Portrait, Face::Front) => Rotation::None,
            (CardOrientation::Portrait, Face::Back) => Rotation::Clockwise180,
        }
    }
}

/// An RGBA color, written as `#rrggbb` / `#rrggbbaa` or a handful of CSS names
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Color(pub [u8; 4]);

impl Color {
    pub const WHITE: Color = Color([255, 255, 255, 255]);
    pub const BLACK: Color = Color([0, 0, 0, 255]);
    pub const TRANSPARENT: Color = Color([0, 0, 0, 0]);

    pub fn rgba(self) -> Rgba<u8> {
        Rgba(self.0)
    }

    fn from_named(name: &str) -> Option<Self> {
        let rgba = match name {
            "white" => [255, 255, 255, 255],
            "black" => [0, 0, 0, 255],
            "red" => [255, 0, 0, 255],
            "green" => [0, 128, 0, 255],
            "blue" => [0, 0, 255, 255],
            "gray" | "grey" => [128, 128, 128, 255],
            "transparent" => [0, 0, 0, 0],
            _ => return None,
        };
        Some(Color(rgba))
    }

    fn from_hex(hex: &str) -> Option<Self> {
        let digits: Vec<u8> = hex
            .chars()
            .map(|c| c.to_digit(16).map(|d| d as u8))
            .collect::<Option<_>>()?;
        let pair = |i: usize| digits[i] * 16 + digits[i + 1];
        match digits.len() {
            3 => Some(Color([
                digits[0] * 17,
                digits[1] * 17,
                digits[2] * 17,
                255,
            ])),
            6 => Some(Color([pair(0), pair(2), pair(4), 255])),
            8 => Some(Color([pair(0), pair(2), pair(4), pair(6)])),
            _ => None,
        }
    }
}

impl FromStr for Color {
    type Err = LayoutError;

    /// An empty string means white, matching an untouched color field
    fn from_str(s: &str) -> Result<Self> {
        let s = s.trim().to_ascii_lowercase();
        if s.is_empty() {
            return Ok(Color::WHITE);
        }
        let parsed = match s.strip_prefix('#') {
            Some(hex) => Color::from_hex(hex),
            None => Color::from_named(&s),
        };
        parsed.ok_or_else(|| LayoutError::Config(format!("Unrecognized color: {}", s)))
    }
}

impl TryFrom<String> for Color {
    type Error = LayoutError;

    fn try_from(value: String) -> Result<Self> {
        value.parse()
    }
}

impl From<Color> for String {
    fn from(color: Color) -> Self {
        color.to_string()
    }
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let [r, g, b, a] = self.0;
        if a == 255 {
            write!(f, "#{:02x}{:02x}{:02x}", r, g, b)
        } else {
            write!(f, "#{:02x}{:02x}{:02x}{:02x}", r, g, b, a)
        }
    }
}

/// How the band beyond a card's trim box is filled
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "color", rename_all = "kebab-case")]
pub enum BleedSpec {
    /// Leave the bleed band as neutral background
    None,
    /// Flood the whole face with a color before drawing the card
    Solid(Color),
    /// Extend the card's own edge pixels outward and smooth the seam
    Generated,
    /// The artwork already carries its bleed. Rendered like `None`.
    IncludedPreset,
}

impl Default for BleedSpec {
    fn default() -> Self {
        BleedSpec::Solid(Color::WHITE)
    }
}

impl BleedSpec {
    /// Build a bleed spec from a type keyword and an optional color string
    pub fn parse(kind: &str, color: Option<&str>) -> Result<Self> {
        match kind.trim().to_ascii_lowercase().as_str() {
            "none" => Ok(BleedSpec::None),
            "solid" => Ok(BleedSpec::Solid(color.unwrap_or("").parse()?)),
            "gen" | "generated" => Ok(BleedSpec::Generated),
            "preset" | "included-preset" => Ok(BleedSpec::IncludedPreset),
            other => Err(LayoutError::Config(format!("Unknown bleed type: {}", other))),
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            BleedSpec::None => "none",
            BleedSpec::Solid(_) => "solid",
            BleedSpec::Generated => "generated",
            BleedSpec::IncludedPreset => "included-preset",
        }
    }
}

/// Statistics about a deck laid out with a given configuration
#[derive(Debug, Clone, PartialEq)]
pub struct LayoutStatistics {
    /// Number of cards in the deck
    pub card_count: usize,
    /// Number of output pages
    pub page_count: usize,
    /// Cards on the final (possibly partial) page
    pub cards_on_last_page: usize,
    /// Card rows that fit inside the printable area of one page
    pub rows_that_fit: usize,
    /// Both face columns stay inside the left and right margins
    pub fits_side_margins: bool,
    /// Page raster size in pixels
    pub page_size_px: (u32, u32),
    /// Cards whose atlas is not listed in the manifest
    pub cards_without_atlas: usize,
    /// Card faces whose atlas image is not available yet
    pub faces_not_loaded: usize,
}
