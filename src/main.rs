// src/main.rs
//! Property Map - terminal map explorer for rental properties

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use property_map::{
    display::TerminalDisplay,
    export::{ExportFormat, OverlayExporter},
    geo::distance_between,
    map::{build_overlays, MapScreen},
    MapConfig, MapType, MarkerSet, StoredConfig,
};
use std::io;
use std::path::PathBuf;
use tracing::{debug, info};

#[derive(Debug, Parser)]
#[command(name = "property-map", version, about = "Cluster property markers and find nearby rentals")]
struct Cli {
    /// Marker list (.json or .csv); defaults to the bundled list
    #[arg(long, global = true)]
    markers: Option<PathBuf>,

    /// Cluster cell size in degrees
    #[arg(long, global = true)]
    grid_size: Option<f64>,

    /// Search radius in kilometres
    #[arg(long, global = true)]
    radius: Option<f64>,

    /// Verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    #[command(flatten)]
    Screen(ScreenCommand),
    /// Show or save the configuration
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

/// Commands that run against the loaded marker list
#[derive(Debug, Subcommand)]
enum ScreenCommand {
    /// Print grid clusters
    Clusters,
    /// List properties near a marker
    Nearby { name: String },
    /// Great-circle distance between two markers
    Distance { from: String, to: String },
    /// Render the map screen once
    View {
        #[arg(long)]
        select: Option<String>,
        /// Measure from the selection to this marker
        #[arg(long, requires = "select")]
        measure: Option<String>,
        #[arg(long, value_enum)]
        map_type: Option<MapType>,
    },
    /// Interactive explorer reading commands from stdin
    Explore,
    /// Export the current overlays
    Export {
        #[arg(long, value_enum, default_value = "geojson")]
        format: ExportFormat,
        #[arg(long)]
        output: Option<PathBuf>,
        #[arg(long)]
        select: Option<String>,
    },
}

#[derive(Debug, Subcommand)]
enum ConfigAction {
    Show,
    /// Persist the current flags as the new defaults
    Save,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let level = if cli.verbose { tracing::Level::DEBUG } else { tracing::Level::INFO };
    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_writer(io::stderr)
        .init();

    let stored = StoredConfig::open().context("Cannot locate the configuration file")?;
    let config = build_config(&cli, stored.config())?;
    debug!("Effective configuration: {:?}", config);

    match &cli.command {
        Commands::Config { action } => run_config(action, &stored, &config),
        Commands::Screen(command) => {
            let markers = load_markers(&config)?;
            let screen = MapScreen::new(markers, &config).context("Invalid map configuration")?;
            run_command(command, screen)
        }
    }
}

/// Stored config overlaid with command-line flags
fn build_config(cli: &Cli, stored: &MapConfig) -> Result<MapConfig> {
    let mut config = stored.clone();

    if let Some(degrees) = cli.grid_size {
        config.update_grid_size(degrees)?;
    }
    if let Some(km) = cli.radius {
        config.update_search_radius(km);
    }
    if cli.markers.is_some() {
        config.update_markers_path(cli.markers.clone());
    }
    if let Commands::Screen(ScreenCommand::View { map_type: Some(map_type), .. }) = &cli.command {
        config.update_map_type(*map_type);
    }

    config.validate()?;
    Ok(config)
}

fn load_markers(config: &MapConfig) -> Result<MarkerSet> {
    match &config.markers_path {
        Some(path) => MarkerSet::load(path)
            .with_context(|| format!("Failed to load markers from {}", path.display())),
        None => {
            let set = MarkerSet::bundled().context("Bundled marker list is invalid")?;
            info!("Using {} bundled markers", set.len());
            Ok(set)
        }
    }
}

fn run_command(command: &ScreenCommand, mut screen: MapScreen) -> Result<()> {
    match command {
        ScreenCommand::Clusters => {
            screen.focus();
            println!("{:>10} {:>10} {:>6}  tier", "lat", "lng", "count");
            for cluster in screen.clusters() {
                println!(
                    "{:>10.4} {:>10.4} {:>6}  {}",
                    cluster.lat,
                    cluster.lng,
                    cluster.count,
                    cluster.tier().display_name()
                );
            }
        }
        ScreenCommand::Nearby { name } => {
            screen.select_by_name(name)?;
            match screen.nearby_panel() {
                Some(panel) => {
                    println!("{}", panel.title);
                    for (name, distance) in panel.rows {
                        println!("  {:<40} {}", name, distance);
                    }
                }
                None => println!("No properties within {} km of {}", screen.search_radius_km(), name),
            }
        }
        ScreenCommand::Distance { from, to } => {
            let markers = screen.markers();
            let a = markers.get(markers.find(from)?).context("marker index out of range")?;
            let b = markers.get(markers.find(to)?).context("marker index out of range")?;
            println!("{} -> {}: {:.2} km", a.name, b.name, distance_between(a, b));
        }
        ScreenCommand::View { select, measure, .. } => {
            screen.focus();
            if let Some(name) = select {
                screen.select_by_name(name)?;
            }
            if let Some(name) = measure {
                screen.toggle_measuring();
                screen.tap_by_name(name)?;
            }
            TerminalDisplay::new().render(&mut io::stdout(), &screen)?;
        }
        ScreenCommand::Explore => {
            let stdin = io::stdin();
            TerminalDisplay::clearing().run(&mut screen, stdin.lock(), &mut io::stdout())?;
        }
        ScreenCommand::Export { format, output, select } => {
            screen.focus();
            if let Some(name) = select {
                screen.select_by_name(name)?;
            }
            let exporter = OverlayExporter::new(build_overlays(&screen));
            debug!("Exporting {} overlays", exporter.overlay_count());
            match output {
                Some(path) if path.extension().is_none() => {
                    exporter.export_to_file(&path.with_extension(format.extension()), *format)?
                }
                Some(path) => exporter.export_to_file(path, *format)?,
                None => println!("{}", exporter.render(*format)?),
            }
        }
    }
    Ok(())
}

fn run_config(action: &ConfigAction, stored: &StoredConfig, config: &MapConfig) -> Result<()> {
    match action {
        ConfigAction::Show => {
            println!("# {}", stored.path().display());
            if let Some(e) = stored.load_error() {
                println!("# unreadable, showing defaults: {}", e);
            }
            println!("{}", serde_json::to_string_pretty(config)?);
        }
        ConfigAction::Save => {
            stored.save(config)?;
            println!("Configuration saved");
        }
    }
    Ok(())
}
