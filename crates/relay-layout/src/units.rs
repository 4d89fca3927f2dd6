//! Conversion between the two supported physical length units.
//!
//! Inches are canonical inside the crate; millimeters only appear at the
//! configuration and display boundary.

pub const MM_PER_INCH: f64 = 25.4;

/// Convert inches to millimeters
#[inline]
pub fn to_mm(inches: f64) -> f64 {
    inches * MM_PER_INCH
}

/// Convert millimeters to inches
#[inline]
pub fn to_in(mm: f64) -> f64 {
    mm / MM_PER_INCH
}

/// Rasterize a physical length at `ppi` pixels per inch
#[inline]
pub fn px(length_in: f64, ppi: f64) -> u32 {
    let value = (length_in * ppi).round();
    if value.is_finite() && value > 0.0 {
        value as u32
    } else {
        0
    }
}
