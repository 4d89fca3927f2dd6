//! Page layout for gutter-fold sheets
//!
//! - Pagination of the deck into fixed-capacity pages
//! - Per-card rendering of both faces
//! - Sheet assembly around the fold line

mod cell;
mod pagination;
mod sheet;
mod types;

pub use cell::*;
pub use pagination::*;
pub use sheet::*;
pub use types::*;
