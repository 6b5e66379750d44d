//! Volmix CLI Application

mod render;

use anyhow::{bail, Context};
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;
use volmix_core::domain::{ConfigManager, Session, TargetDiscovery, TargetId, VolmixConfig};
use volmix_infra::discovery::WpctlDiscovery;

#[derive(Parser)]
#[command(name = "volmix")]
#[command(about = "Bind audio targets to hardware faders, layer by layer", long_about = None)]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Configuration file (default: ~/.config/volmix/config.toml)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Binding file, overriding the configured one
    #[arg(long, global = true)]
    bindings: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List the targets reported by the audio graph
    Targets,

    /// Print the binding grid of a layer
    Show {
        #[arg(short, long, default_value_t = 0)]
        layer: u32,

        /// Extra target id to display as a column (repeatable)
        #[arg(short = 'c', long = "column")]
        columns: Vec<String>,
    },

    /// Toggle a target on a fader and save
    Toggle {
        layer: u32,
        /// Fader number, 1 to 7
        fader: i64,
        target: String,
    },

    /// Replace the bindings with those of a file
    Import { path: PathBuf },

    /// Write the bindings to a file
    Export { path: PathBuf },

    /// Manage the configuration file
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[derive(Subcommand)]
enum ConfigAction {
    /// Write the default configuration if none exists
    Init,
    /// Print the resolved file locations
    Path,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let default_level = if cli.verbose { "debug" } else { "info" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    info!("🎚 Volmix starting...");

    let manager = match &cli.config {
        Some(path) => ConfigManager::with_path(path.clone()),
        None => ConfigManager::new(ConfigManager::default_config_dir()?),
    };
    let mut config = manager.load();
    if let Some(bindings) = &cli.bindings {
        config.bindings_file = bindings.clone();
    }

    match cli.command {
        Commands::Targets => list_targets(&config),
        Commands::Show { layer, columns } => show(&config, layer, columns),
        Commands::Toggle {
            layer,
            fader,
            target,
        } => toggle(&config, layer, fader, TargetId::new(target)),
        Commands::Import { path } => {
            let mut session = open_session(&config)?;
            let summary = session
                .import_from(&path)
                .with_context(|| format!("Failed to import {}", path.display()))?;
            println!(
                "Imported {} bindings, {} new columns",
                summary.bindings, summary.columns_added
            );
            Ok(())
        }
        Commands::Export { path } => {
            let session = open_session(&config)?;
            session
                .export_to(&path)
                .with_context(|| format!("Failed to export {}", path.display()))?;
            println!("Exported {} bindings to {}", session.store().len(), path.display());
            Ok(())
        }
        Commands::Config { action } => match action {
            ConfigAction::Init => {
                if manager.exists() {
                    println!("{} already exists", manager.config_path().display());
                } else {
                    manager
                        .save(&config)
                        .context("Failed to write configuration")?;
                    println!("Wrote {}", manager.config_path().display());
                }
                Ok(())
            }
            ConfigAction::Path => {
                println!("config:   {}", manager.config_path().display());
                println!("bindings: {}", config.bindings_file.display());
                Ok(())
            }
        },
    }
}

/// Load the default binding file and resolve target names.
///
/// Discovery failure only degrades names; it never stops the command.
fn open_session(config: &VolmixConfig) -> anyhow::Result<Session> {
    let mut session = Session::load_default(&config.bindings_file).with_context(|| {
        format!(
            "Failed to load bindings from {}",
            config.bindings_file.display()
        )
    })?;

    let discovery = WpctlDiscovery::from_config(&config.discovery);
    if let Err(e) = session.refresh_targets(&discovery) {
        warn!(error = %e, "Continuing without target names");
    }
    Ok(session)
}

fn list_targets(config: &VolmixConfig) -> anyhow::Result<()> {
    let directory = WpctlDiscovery::from_config(&config.discovery)
        .discover()
        .context("Target discovery failed")?;

    if directory.is_empty() {
        println!("No targets found");
    }
    for target in directory.iter() {
        println!("{:>6}  {}", target.id, target.display_name());
    }
    Ok(())
}

fn show(config: &VolmixConfig, layer: u32, columns: Vec<String>) -> anyhow::Result<()> {
    check_layer(config, layer)?;
    let mut session = open_session(config)?;
    for column in columns {
        session.add_column(TargetId::new(column))?;
    }
    print!("{}", render::grid(&session, layer));
    Ok(())
}

fn toggle(config: &VolmixConfig, layer: u32, fader: i64, target: TargetId) -> anyhow::Result<()> {
    check_layer(config, layer)?;
    let mut session = open_session(config)?;
    let change = session.toggle_binding(layer, fader, &target)?;

    let state = if change.is_bound() { "BOUND" } else { "UNBOUND" };
    println!(
        "{} {} on layer {} fader {}",
        session.column_label(&target),
        state,
        layer,
        fader
    );
    Ok(())
}

fn check_layer(config: &VolmixConfig, layer: u32) -> anyhow::Result<()> {
    if layer > config.layers.max_layer {
        bail!(
            "Layer {} out of range (0..={})",
            layer,
            config.layers.max_layer
        );
    }
    Ok(())
}
