mod atlas;
mod constants;
mod io;
pub mod layout;
mod manifest;
pub mod marks;
mod options;
mod preview;
pub mod render;
mod stats;
mod types;
pub mod units;

pub use atlas::*;
pub use constants::*;
pub use io::{
    load_atlas_image, load_deck_images, load_manifest, page_file_name, parse_manifest,
    resolve_image_path, save_page, save_pages,
};
pub use layout::{EngineState, PageLayoutEngine, RenderStatus, RenderedPage};
pub use manifest::*;
pub use options::*;
pub use preview::{render_all, render_preview};
pub use stats::calculate_statistics;
pub use types::*;
