use anyhow::{Context, Result, anyhow, bail};
use clap::{Args, Parser, Subcommand, ValueEnum};
use log::LevelFilter;
use relay_async_runtime::{RelayCommand, RelayUpdate, WorkerOptions, spawn_atlas_loads, worker_task};
use relay_layout::{BleedSpec, Deck, LayoutConfig, RenderStatus};
use std::path::{Path, PathBuf};
use tokio::sync::mpsc;

mod logger;

#[derive(Parser)]
#[command(name = "relay", about = "Gutter-fold card sheet renderer", version)]
struct Cli {
    /// Log debug output
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Only log warnings and errors
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    quiet: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Render card sheets as PNG pages
    Render {
        #[command(flatten)]
        deck: DeckArgs,

        #[command(flatten)]
        layout: LayoutArgs,

        /// Output directory for page images
        #[arg(short, long)]
        output: PathBuf,

        /// Render a single page (1-based) instead of the whole deck
        #[arg(long)]
        page: Option<usize>,
    },

    /// Show layout statistics for a deck
    Stats {
        #[command(flatten)]
        deck: DeckArgs,

        #[command(flatten)]
        layout: LayoutArgs,
    },

    /// List the decks in a manifest
    Decks {
        /// Tabletop save file
        #[arg(short, long)]
        manifest: PathBuf,

        /// Also list every card with its nickname
        #[arg(long)]
        cards: bool,
    },

    /// Write the effective layout configuration as JSON
    Config {
        #[command(flatten)]
        layout: LayoutArgs,

        /// Output JSON file
        #[arg(short, long)]
        output: PathBuf,
    },
}

#[derive(Args)]
struct DeckArgs {
    /// Tabletop save file describing the deck
    #[arg(short, long)]
    manifest: PathBuf,

    /// Index of the object state holding the deck
    #[arg(long, default_value = "0")]
    deck: usize,
}

#[derive(Args)]
struct LayoutArgs {
    /// Start from a saved configuration file
    #[arg(long)]
    config: Option<PathBuf>,

    /// Unit for every length flag
    #[arg(long, value_enum)]
    unit: Option<UnitArg>,

    /// Output paper size
    #[arg(long, value_enum)]
    paper: Option<PaperArg>,

    /// Output page orientation
    #[arg(long, value_enum)]
    orientation: Option<OrientationArg>,

    /// How cards sit on either side of the fold
    #[arg(long, value_enum)]
    card_orientation: Option<CardOrientationArg>,

    /// Cards per page
    #[arg(long)]
    cards_per_page: Option<usize>,

    /// Resolution in pixels per unit
    #[arg(long)]
    ppi: Option<f64>,

    #[arg(long)]
    margin: Option<f64>,

    /// Extra space around the fold line
    #[arg(long)]
    gutter: Option<f64>,

    #[arg(long)]
    card_width: Option<f64>,

    #[arg(long)]
    card_height: Option<f64>,

    /// Bleed beyond the trim box on every side
    #[arg(long)]
    bleed: Option<f64>,

    /// Keep card width and height linked by the aspect ratio
    #[arg(long)]
    preserve_aspect_ratio: bool,

    /// Take the aspect ratio from the first atlas cell
    #[arg(long)]
    derive_aspect_ratio: bool,

    #[arg(long, value_enum)]
    front_bleed: Option<BleedArg>,

    /// Color for a solid front bleed (#rrggbb or a name)
    #[arg(long)]
    front_bleed_color: Option<String>,

    #[arg(long, value_enum)]
    back_bleed: Option<BleedArg>,

    /// Color for a solid back bleed (#rrggbb or a name)
    #[arg(long)]
    back_bleed_color: Option<String>,

    /// Smoothing radius for generated bleed, in output pixels
    #[arg(long)]
    bleed_blur: Option<f32>,

    /// Draw crop marks beneath the card image
    #[arg(long)]
    crop_behind: bool,

    #[arg(long)]
    crop_color: Option<String>,

    /// Crop mark arm length
    #[arg(long)]
    crop_length: Option<f64>,
}

#[derive(Clone, Copy, ValueEnum)]
enum UnitArg {
    In,
    Mm,
}

#[derive(Clone, Copy, ValueEnum)]
enum PaperArg {
    Letter,
    Legal,
    A4,
    A5,
}

#[derive(Clone, Copy, ValueEnum)]
enum OrientationArg {
    Portrait,
    Landscape,
}

#[derive(Clone, Copy, ValueEnum)]
enum CardOrientationArg {
    Landscape,
    Portrait,
}

#[derive(Clone, Copy, ValueEnum)]
enum BleedArg {
    None,
    Solid,
    #[value(alias = "gen")]
    Generated,
    #[value(alias = "preset")]
    IncludedPreset,
}

impl From<UnitArg> for relay_layout::Unit {
    fn from(arg: UnitArg) -> Self {
        match arg {
            UnitArg::In => Self::Inches,
            UnitArg::Mm => Self::Millimeters,
        }
    }
}

impl From<PaperArg> for relay_layout::PaperSize {
    fn from(arg: PaperArg) -> Self {
        match arg {
            PaperArg::Letter => Self::Letter,
            PaperArg::Legal => Self::Legal,
            PaperArg::A4 => Self::A4,
            PaperArg::A5 => Self::A5,
        }
    }
}

impl From<OrientationArg> for relay_layout::Orientation {
    fn from(arg: OrientationArg) -> Self {
        match arg {
            OrientationArg::Portrait => Self::Portrait,
            OrientationArg::Landscape => Self::Landscape,
        }
    }
}

impl From<CardOrientationArg> for relay_layout::CardOrientation {
    fn from(arg: CardOrientationArg) -> Self {
        match arg {
            CardOrientationArg::Landscape => Self::Landscape,
            CardOrientationArg::Portrait => Self::Portrait,
        }
    }
}

impl BleedArg {
    fn keyword(self) -> &'static str {
        match self {
            BleedArg::None => "none",
            BleedArg::Solid => "solid",
            BleedArg::Generated => "generated",
            BleedArg::IncludedPreset => "included-preset",
        }
    }
}

/// Bleed for one face: an explicit type wins, a lone color implies solid
fn bleed_spec(kind: Option<BleedArg>, color: Option<&str>, current: BleedSpec) -> Result<BleedSpec> {
    Ok(match (kind, color) {
        (Some(kind), color) => BleedSpec::parse(kind.keyword(), color)?,
        (None, Some(color)) => BleedSpec::Solid(color.parse()?),
        (None, None) => current,
    })
}

impl LayoutArgs {
    /// Start from the config file (or defaults) and apply every flag given
    async fn build(&self) -> Result<LayoutConfig> {
        let mut config = match &self.config {
            Some(path) => LayoutConfig::load(path)
                .await
                .with_context(|| format!("Failed to load config {}", path.display()))?,
            None => LayoutConfig::default(),
        };

        if let Some(unit) = self.unit {
            config.unit = unit.into();
        }
        if let Some(paper) = self.paper {
            config.paper_size = paper.into();
        }
        if let Some(orientation) = self.orientation {
            config.orientation = orientation.into();
        }
        if let Some(orientation) = self.card_orientation {
            config.card_orientation = orientation.into();
        }
        if let Some(count) = self.cards_per_page {
            config.set_cards_per_page(count);
        }
        if let Some(ppi) = self.ppi {
            config.set_resolution(ppi);
        }
        if let Some(margin) = self.margin {
            config.set_margin(margin);
        }
        if let Some(gutter) = self.gutter {
            config.set_gutter(gutter);
        }
        if let Some(bleed) = self.bleed {
            config.set_bleed(bleed);
        }

        if self.preserve_aspect_ratio {
            config.set_preserve_aspect_ratio(true);
        }
        config.derive_aspect_ratio |= self.derive_aspect_ratio;
        if let Some(width) = self.card_width {
            config.set_card_width(width);
        }
        if let Some(height) = self.card_height {
            if config.preserve_aspect_ratio() && self.card_width.is_some() {
                log::warn!("Aspect ratio is locked; --card-height overrides --card-width");
            }
            config.set_card_height(height);
        }

        config.front_bleed = bleed_spec(
            self.front_bleed,
            self.front_bleed_color.as_deref(),
            config.front_bleed,
        )?;
        config.back_bleed = bleed_spec(
            self.back_bleed,
            self.back_bleed_color.as_deref(),
            config.back_bleed,
        )?;
        if let Some(blur) = self.bleed_blur {
            config.generated_bleed_blur = blur.max(0.0);
        }

        config.crop_layer_behind |= self.crop_behind;
        if let Some(color) = &self.crop_color {
            config.crop_mark_color = color.parse()?;
        }
        if let Some(length) = self.crop_length {
            config.set_crop_mark_length(length);
        }

        config.validate()?;
        Ok(config)
    }
}

/// Load the manifest and pick one deck. Returns the manifest's directory too,
/// which relative atlas paths are resolved against.
async fn load_deck(args: &DeckArgs) -> Result<(PathBuf, Deck)> {
    let manifest = relay_layout::load_manifest(&args.manifest)
        .await
        .with_context(|| format!("Failed to read manifest {}", args.manifest.display()))?;
    let deck = manifest.deck(args.deck).ok_or_else(|| {
        anyhow!(
            "Manifest has {} object state(s); there is no deck {}",
            manifest.object_states.len(),
            args.deck
        )
    })?;
    let base_dir = args
        .manifest
        .parent()
        .map(Path::to_path_buf)
        .unwrap_or_default();
    Ok((base_dir, deck))
}

fn report_status(page: usize, status: &RenderStatus) {
    if status.blank_faces > 0 {
        log::warn!(
            "Page {}: {} face(s) drawn without an image",
            page + 1,
            status.blank_faces
        );
    }
}

async fn render(deck_args: &DeckArgs, layout: &LayoutArgs, output: &Path, page: Option<usize>) -> Result<()> {
    let (base_dir, deck) = load_deck(deck_args).await?;
    let config = layout.build().await?;

    let page_count = relay_layout::layout::page_count(deck.card_count(), config.cards_per_page());
    if page_count == 0 {
        bail!("Deck '{}' has no cards", deck.name);
    }
    let page_index = match page {
        Some(p) if p == 0 || p > page_count => {
            bail!("Page {} is out of range (1-{})", p, page_count)
        }
        Some(p) => Some(p - 1),
        None => None,
    };

    let (command_tx, command_rx) = mpsc::unbounded_channel();
    let (update_tx, mut update_rx) = mpsc::unbounded_channel();
    let options = WorkerOptions {
        auto_preview: false,
        ..Default::default()
    };
    let worker = tokio::spawn(worker_task(command_rx, update_tx, config, options));

    // The deck must be selected before any of its atlases arrive
    let send = |cmd| command_tx.send(cmd).map_err(|_| anyhow!("Render worker stopped"));
    send(RelayCommand::SelectDeck { deck: deck.clone() })?;
    for load in spawn_atlas_loads(&deck, &base_dir, &command_tx) {
        load.await?;
    }

    match page_index {
        Some(index) => {
            send(RelayCommand::SetPage { page: index })?;
            send(RelayCommand::RenderPreview)?;
        }
        None => send(RelayCommand::Export {
            output_dir: output.to_path_buf(),
        })?,
    }
    drop(send);
    drop(command_tx);

    let mut written = Vec::new();
    while let Some(update) = update_rx.recv().await {
        match update {
            RelayUpdate::Status { message } => log::info!("{}", message),
            RelayUpdate::PageCount { page_count, .. } => {
                log::debug!("Deck spans {} page(s)", page_count)
            }
            RelayUpdate::PreviewRendered { page, .. } => {
                report_status(page.index, &page.status);
                tokio::fs::create_dir_all(output).await?;
                written.push(relay_layout::save_page(&page, output).await?);
            }
            RelayUpdate::ExportComplete { paths } => written.extend(paths),
            RelayUpdate::Error { message } => bail!("{}", message),
        }
    }
    worker.await?;

    for path in &written {
        println!("Wrote {}", path.display());
    }
    Ok(())
}

async fn stats(deck_args: &DeckArgs, layout: &LayoutArgs) -> Result<()> {
    let (base_dir, deck) = load_deck(deck_args).await?;
    let mut config = layout.build().await?;
    let images = relay_layout::load_deck_images(&deck, &base_dir).await;
    config.derive_aspect_ratio_from(&images);

    let stats = relay_layout::calculate_statistics(&deck, &config, &images);
    println!("Layout Statistics for '{}':", deck.name);
    println!("  Cards: {}", stats.card_count);
    println!("  Pages: {}", stats.page_count);
    println!("  Cards on last page: {}", stats.cards_on_last_page);
    println!("  Rows that fit: {}", stats.rows_that_fit);
    println!(
        "  Card size: {:.3} x {:.3} {}",
        config.display(config.card_width_in()),
        config.display(config.card_height_in()),
        config.unit.name()
    );
    println!(
        "  Page size: {} x {} px",
        stats.page_size_px.0, stats.page_size_px.1
    );
    if stats.cards_without_atlas > 0 {
        println!("  Cards without an atlas: {}", stats.cards_without_atlas);
    }
    if stats.faces_not_loaded > 0 {
        println!("  Faces not loaded: {}", stats.faces_not_loaded);
    }
    if !stats.fits_side_margins {
        log::warn!("Card columns cross the left or right margin");
    } else if stats.rows_that_fit < config.cards_per_page() {
        log::warn!(
            "Only {} of {} cards per page fit inside the margins",
            stats.rows_that_fit,
            config.cards_per_page()
        );
    }
    Ok(())
}

async fn decks(manifest_path: &Path, cards: bool) -> Result<()> {
    let manifest = relay_layout::load_manifest(manifest_path)
        .await
        .with_context(|| format!("Failed to read manifest {}", manifest_path.display()))?;
    for (index, state) in manifest.object_states.iter().enumerate() {
        let deck = Deck::from_object_state(state);
        println!(
            "{:>3}  {} ({} cards, {} atlases)",
            index,
            deck.name,
            deck.card_count(),
            deck.atlases.len()
        );
        if cards {
            for card_id in &deck.card_ids {
                println!("       {:>6}  {}", card_id, state.nickname_for(*card_id).unwrap_or(""));
            }
        }
    }
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let level = if cli.verbose {
        LevelFilter::Debug
    } else if cli.quiet {
        LevelFilter::Warn
    } else {
        LevelFilter::Info
    };
    logger::StderrLogger::new(level).init()?;

    match cli.command {
        Commands::Render {
            deck,
            layout,
            output,
            page,
        } => render(&deck, &layout, &output, page).await?,

        Commands::Stats { deck, layout } => stats(&deck, &layout).await?,

        Commands::Decks { manifest, cards } => decks(&manifest, cards).await?,

        Commands::Config { layout, output } => {
            let config = layout.build().await?;
            config.save(&output).await?;
            println!("Wrote configuration → {}", output.display());
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn render_exports_every_page_unless_one_is_chosen() {
        let cli = Cli::try_parse_from(["relay", "render", "-m", "save.json", "-o", "out"]).unwrap();
        assert!(matches!(cli.command, Commands::Render { page: None, .. }));

        let cli = Cli::try_parse_from(["relay", "render", "-m", "save.json", "-o", "out", "--page", "2"])
            .unwrap();
        assert!(matches!(cli.command, Commands::Render { page: Some(2), .. }));

        assert!(Cli::try_parse_from(["relay", "render", "-m", "save.json", "-o", "out", "--all"]).is_err());
    }
}
