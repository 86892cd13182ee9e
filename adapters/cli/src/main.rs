#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Command-line adapter that boots the Pokédex viewer.

mod config;
mod headless;
mod viewer;

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use pokedex_api::{HttpPageSource, PageLoader};
use pokedex_rendering::{Color, Presentation, RenderingBackend};
use pokedex_rendering_macroquad::MacroquadBackend;
use tracing::info;
use tracing_subscriber::EnvFilter;

use crate::{
    config::{FileConfig, Overrides, Settings},
    viewer::Viewer,
};

/// Browse the Pokédex catalog in a window or from the terminal.
#[derive(Debug, Parser)]
#[command(name = "pokedex", version, about)]
struct CliArgs {
    /// Settings file; defaults to `pokedex.toml` in the working directory.
    #[arg(long, global = true, value_name = "PATH")]
    config: Option<PathBuf>,

    /// Scheme and host of the catalog API.
    #[arg(long, global = true, value_name = "URL")]
    base_url: Option<String>,

    /// Collection path listing the records.
    #[arg(long, global = true, value_name = "NAME")]
    collection: Option<String>,

    /// Timeout applied to each page request, in seconds.
    #[arg(long, global = true, value_name = "SECONDS")]
    timeout_secs: Option<u64>,

    /// Log debug output unless `RUST_LOG` says otherwise.
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Option<CliCommand>,
}

#[derive(Debug, Subcommand)]
enum CliCommand {
    /// Open the catalog window (default).
    Browse,
    /// Load the catalog and print the grid.
    List {
        /// Only print records whose name or type contains this term.
        #[arg(long)]
        search: Option<String>,
        /// Stop after this many pages.
        #[arg(long, value_name = "N")]
        pages: Option<u32>,
    },
    /// Print the detail view of one record.
    Show {
        /// Pokédex number of the record.
        pokedex_id: u32,
        /// Give up after this many pages.
        #[arg(long, value_name = "N")]
        pages: Option<u32>,
    },
}

/// Entry point for the Pokédex command-line interface.
fn main() -> Result<()> {
    let args = CliArgs::parse();
    init_tracing(args.verbose)?;

    let file = FileConfig::load(args.config.as_deref()).context("failed to load settings")?;
    let settings = Settings::resolve(
        file,
        Overrides {
            base_url: args.base_url,
            collection: args.collection,
            timeout_secs: args.timeout_secs,
        },
    )
    .context("invalid settings")?;

    let source = HttpPageSource::new(settings.api.clone()).context("failed to build HTTP client")?;
    let loader = PageLoader::spawn(source).context("failed to start the page loader")?;
    let mut viewer = Viewer::new(loader);
    let timeout = settings.api.timeout;

    match args.command.unwrap_or(CliCommand::Browse) {
        CliCommand::Browse => browse(viewer, &settings),
        CliCommand::List { search, pages } => {
            let text = headless::list(&mut viewer, search, pages, timeout)?;
            print!("{text}");
            Ok(())
        }
        CliCommand::Show { pokedex_id, pages } => {
            let text = headless::show(&mut viewer, pokedex_id, pages, timeout)?;
            print!("{text}");
            Ok(())
        }
    }
}

fn init_tracing(verbose: bool) -> Result<()> {
    let default_directive = if verbose { "pokedex=debug" } else { "pokedex=info" };
    let filter = match EnvFilter::try_from_default_env() {
        Ok(filter) => filter,
        Err(_) => EnvFilter::new("warn").add_directive(default_directive.parse()?),
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
    Ok(())
}

fn browse(mut viewer: Viewer, settings: &Settings) -> Result<()> {
    info!(base_url = %settings.api.base_url, "opening catalog window");
    viewer.mount();

    let presentation = Presentation::new(
        settings.window.title.clone(),
        Color::from_rgb_u8(245, 245, 245),
        viewer.scene(),
    );
    let backend = MacroquadBackend::new()
        .with_vsync(settings.window.vsync)
        .with_window_size(settings.window.width, settings.window.height);

    backend.run(presentation, move |_, input, scene| {
        viewer.frame(input);
        *scene = viewer.scene();
    })
}
