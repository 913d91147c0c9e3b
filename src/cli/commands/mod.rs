//! CLI command definitions and dispatch.
//!
//! Each subcommand is implemented in its own submodule:
//! - `index`: Full reindex, listing and counting
//! - `export`: iTunes XML export
//! - `serve`: Sync server

mod export;
mod index;
mod serve;

use anyhow::Context;
use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};
use tokio::runtime::Runtime;

use crate::config::{self, Config};

pub use export::cmd_export;
pub use index::{cmd_count, cmd_index, cmd_list};
pub use serve::cmd_serve;

/// Music Sync CLI
#[derive(Parser)]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Library root (overrides the configured one)
    #[arg(short, long, global = true, env = "MUSIC_SYNC_LIBRARY")]
    pub library: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

/// Available subcommands
#[derive(Subcommand)]
pub enum Commands {
    /// Rebuild library.json from the files under the library root
    Index {
        /// Also write the iTunes XML after indexing
        #[arg(long)]
        export: bool,
    },
    /// Write "iTunes Music Library.xml" from the current index
    Export,
    /// Serve the index and audio files over HTTP
    Serve {
        /// Port to listen on (default from config: 9000)
        #[arg(short, long)]
        port: Option<u16>,
    },
    /// List all tracks in the index
    List,
    /// Count audio files under the library root
    Count,
    /// Remember the library root in the config file
    SetLibrary {
        /// Path to the music library root
        path: PathBuf,
    },
}

/// Run the specified CLI command.
pub fn run_command(cli: &Cli) -> anyhow::Result<()> {
    let config = config::load();
    let paths = || config.library_paths(cli.library.as_deref());

    match &cli.command {
        Commands::Index { export } => {
            let rt = Runtime::new()?;
            cmd_index(&rt, &paths()?, *export)
        }
        Commands::Export => cmd_export(&paths()?),
        Commands::Serve { port } => {
            let rt = Runtime::new()?;
            let mut server_config = config.server.clone();
            if let Some(port) = port {
                server_config.port = *port;
            }
            cmd_serve(&rt, &paths()?, &server_config)
        }
        Commands::List => cmd_list(&paths()?),
        Commands::Count => cmd_count(&paths()?),
        Commands::SetLibrary { path } => cmd_set_library(config.clone(), path),
    }
}

fn cmd_set_library(mut config: Config, path: &Path) -> anyhow::Result<()> {
    let root = path
        .canonicalize()
        .with_context(|| format!("Library root {} is not accessible", path.display()))?;

    config.library.root = Some(root.clone());
    config::save(&config)?;
    println!("Library root set to {}", root.display());
    Ok(())
}
