use relay_layout::{AtlasImages, Face, LayoutConfig, PageLayoutEngine, render_all, save_pages};
use std::path::{Path, PathBuf};
use tokio::sync::mpsc;
use tokio::time::timeout;

use crate::{AtlasLoad, RelayCommand, RelayUpdate, RuntimeError, WorkerOptions};

/// State owned by the worker between commands
struct WorkerState {
    engine: PageLayoutEngine,
    config: LayoutConfig,
    images: AtlasImages,
    /// Bumped for every preview render
    generation: u64,
    options: WorkerOptions,
}

/// Async worker task that applies layout commands in order and sends updates
pub async fn worker_task(
    mut command_rx: mpsc::UnboundedReceiver<RelayCommand>,
    update_tx: mpsc::UnboundedSender<RelayUpdate>,
    config: LayoutConfig,
    options: WorkerOptions,
) {
    let mut state = WorkerState {
        engine: PageLayoutEngine::new(config.cards_per_page()),
        config,
        images: AtlasImages::new(),
        generation: 0,
        options,
    };

    while let Some(cmd) = command_rx.recv().await {
        process_command(cmd, &mut state, &mut command_rx, &update_tx).await;
    }
    log::debug!("Command channel closed, worker exiting");
}

async fn process_command(
    cmd: RelayCommand,
    state: &mut WorkerState,
    command_rx: &mut mpsc::UnboundedReceiver<RelayCommand>,
    update_tx: &mpsc::UnboundedSender<RelayUpdate>,
) {
    match cmd {
        RelayCommand::SelectDeck { deck } => {
            let _ = update_tx.send(RelayUpdate::Status {
                message: format!("Selected deck '{}' ({} cards)", deck.name, deck.card_count()),
            });
            state.images.clear();
            state.engine.select_deck(deck);
            state.send_page_count(update_tx);
            state.auto_preview(update_tx);
        }
        RelayCommand::ClearDeck => {
            state.engine.clear_deck();
            state.images.clear();
            state.send_page_count(update_tx);
            let _ = update_tx.send(RelayUpdate::Status {
                message: "Deck cleared".to_string(),
            });
        }
        RelayCommand::UpdateConfig { mut config } => {
            // Keep receiving until the edits settle; the last configuration wins
            let mut interrupted = None;
            loop {
                match timeout(state.options.debounce, command_rx.recv()).await {
                    Ok(Some(RelayCommand::UpdateConfig { config: newer })) => {
                        log::debug!("Discarding intermediate configuration, using newer edit");
                        config = newer;
                    }
                    Ok(Some(other)) => {
                        interrupted = Some(other);
                        break;
                    }
                    Ok(None) | Err(_) => break,
                }
            }
            state.apply_config(config, update_tx);

            // A different command ended the window early; it runs after the config
            if let Some(next_cmd) = interrupted {
                Box::pin(process_command(next_cmd, state, command_rx, update_tx)).await;
            }
        }
        RelayCommand::AtlasLoaded(load) => {
            state.atlas_loaded(load, update_tx);
        }
        RelayCommand::SetPage { page } => {
            state.engine.set_page(page);
            state.send_page_count(update_tx);
            state.auto_preview(update_tx);
        }
        RelayCommand::RenderPreview => {
            // Drain any queued preview commands, keeping only the most recent
            while let Ok(next_cmd) = command_rx.try_recv() {
                if let RelayCommand::RenderPreview = next_cmd {
                    log::debug!("Discarding queued preview render, using newer request");
                } else {
                    Box::pin(process_command(next_cmd, state, command_rx, update_tx)).await;
                }
            }
            state.preview(update_tx);
        }
        RelayCommand::Export { output_dir } => match state.export(&output_dir).await {
            Ok(paths) => {
                let _ = update_tx.send(RelayUpdate::ExportComplete { paths });
            }
            Err(e) => {
                let _ = update_tx.send(RelayUpdate::Error {
                    message: format!("Export failed: {}", e),
                });
            }
        },
    }
}

impl WorkerState {
    fn send_page_count(&self, update_tx: &mpsc::UnboundedSender<RelayUpdate>) {
        let _ = update_tx.send(RelayUpdate::PageCount {
            page_count: self.engine.page_count(),
            current_page: self.engine.current_page(),
        });
    }

    fn apply_config(&mut self, mut config: LayoutConfig, update_tx: &mpsc::UnboundedSender<RelayUpdate>) {
        if let Some(ratio) = config.derive_aspect_ratio_from(&self.images) {
            log::debug!("Aspect ratio {:.4} taken from atlas", ratio);
        }
        if config.face_size_differs(&self.config) {
            log::debug!("Face raster size changed");
        }
        self.config = config;
        self.engine.set_cards_per_page(self.config.cards_per_page());
        self.send_page_count(update_tx);
        self.auto_preview(update_tx);
    }

    fn atlas_loaded(&mut self, load: AtlasLoad, update_tx: &mpsc::UnboundedSender<RelayUpdate>) {
        // Faces from a deck that has since been replaced are stale
        let spec = self
            .engine
            .deck()
            .and_then(|deck| deck.atlases.get(&load.key))
            .filter(|spec| {
                let url = match load.face {
                    Face::Front => &spec.face_url,
                    Face::Back => &spec.back_url,
                };
                *url == load.url
            })
            .cloned();
        let Some(spec) = spec else {
            log::debug!(
                "Discarding atlas {} {} from a deck that is no longer selected",
                load.key,
                load.face
            );
            return;
        };

        let image = match load.image {
            Ok(image) => image,
            Err(message) => {
                let error = RuntimeError::AtlasLoad {
                    key: load.key,
                    face: load.face,
                    message,
                };
                log::warn!("{}", error);
                let _ = update_tx.send(RelayUpdate::Status {
                    message: error.to_string(),
                });
                return;
            }
        };

        self.images.insert(&load.key, load.face, image, &spec);
        let ratio_before = self.config.aspect_ratio();
        let ratio_changed = self
            .config
            .derive_aspect_ratio_from(&self.images)
            .is_some_and(|ratio| ratio != ratio_before);

        if ratio_changed
            || self
                .engine
                .page_uses_atlas(self.engine.current_page(), &load.key)
        {
            self.auto_preview(update_tx);
        }
    }

    fn auto_preview(&mut self, update_tx: &mpsc::UnboundedSender<RelayUpdate>) {
        if self.options.auto_preview && self.engine.page_count() > 0 {
            self.preview(update_tx);
        }
    }

    fn preview(&mut self, update_tx: &mpsc::UnboundedSender<RelayUpdate>) {
        if self.engine.deck().is_some() && self.engine.page_count() == 0 {
            let _ = update_tx.send(RelayUpdate::Status {
                message: "Deck has no cards".to_string(),
            });
            return;
        }
        self.generation += 1;
        match relay_layout::render_preview(&mut self.engine, &self.config, &self.images) {
            Ok(page) => {
                log::debug!(
                    "Preview generation {} rendered page {}",
                    self.generation,
                    page.index + 1
                );
                let _ = update_tx.send(RelayUpdate::PreviewRendered {
                    generation: self.generation,
                    page,
                });
            }
            Err(e) => {
                let _ = update_tx.send(RelayUpdate::Error {
                    message: e.to_string(),
                });
            }
        }
    }

    async fn export(&mut self, output_dir: &Path) -> Result<Vec<PathBuf>, RuntimeError> {
        let pages = render_all(&mut self.engine, &self.config, &self.images)?;
        let blank_faces: usize = pages.iter().map(|p| p.status.blank_faces).sum();
        if blank_faces > 0 {
            log::warn!("Exporting with {} blank face(s)", blank_faces);
        }
        Ok(save_pages(&pages, output_dir).await?)
    }
}
