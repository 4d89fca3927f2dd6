use image::RgbaImage;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;

mod loader;
mod worker;

pub use loader::spawn_atlas_loads;
pub use worker::worker_task;

// Re-export types from the layout crate
pub use relay_layout::{Deck, Face, LayoutConfig, LayoutError, RenderStatus, RenderedPage};

/// Quiescence window for configuration edits
pub const DEFAULT_DEBOUNCE: Duration = Duration::from_millis(300);

#[derive(Error, Debug)]
pub enum RuntimeError {
    #[error(transparent)]
    Layout(#[from] LayoutError),
    #[error("Atlas {key} {face}: {message}")]
    AtlasLoad {
        key: String,
        face: Face,
        message: String,
    },
}

/// Outcome of loading one atlas face
#[derive(Debug, Clone)]
pub struct AtlasLoad {
    pub key: String,
    pub face: Face,
    /// URL the image was loaded from, as listed in the manifest
    pub url: String,
    pub image: Result<Arc<RgbaImage>, String>,
}

/// Commands sent from a front end to the worker
#[derive(Debug)]
pub enum RelayCommand {
    SelectDeck {
        deck: Deck,
    },
    ClearDeck,
    /// Coalesced: only the last configuration within the debounce window applies
    UpdateConfig {
        config: LayoutConfig,
    },
    AtlasLoaded(AtlasLoad),
    SetPage {
        page: usize,
    },
    RenderPreview,
    Export {
        output_dir: PathBuf,
    },
}

/// Updates sent from the worker to the front end
#[derive(Debug, Clone)]
pub enum RelayUpdate {
    Status {
        message: String,
    },
    PageCount {
        page_count: usize,
        current_page: usize,
    },
    /// Surfaces from an older generation are stale and should be dropped
    PreviewRendered {
        generation: u64,
        page: RenderedPage,
    },
    ExportComplete {
        paths: Vec<PathBuf>,
    },
    Error {
        message: String,
    },
}

/// Worker tuning
#[derive(Debug, Clone, Copy)]
pub struct WorkerOptions {
    pub debounce: Duration,
    /// Render the current page whenever the deck, configuration or atlases change
    pub auto_preview: bool,
}

impl Default for WorkerOptions {
    fn default() -> Self {
        Self {
            debounce: DEFAULT_DEBOUNCE,
            auto_preview: true,
        }
    }
}
