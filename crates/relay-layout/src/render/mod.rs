//! Per-face rasterization
//!
//! A face is rendered by replaying an ordered list of draw steps against a
//! freshly allocated buffer; nothing is patched incrementally.

mod bleed;
mod face;

pub use bleed::{extend_edges, smooth_bleed};
pub use face::*;
