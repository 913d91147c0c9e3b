//! Music Sync - index a music folder and serve it to other devices.
//!
//! Scans the library root for audio files, persists a `library.json` index,
//! exports an iTunes-compatible library XML and serves the index and files
//! over a small local HTTP server.

pub mod cli;
pub mod config;
pub mod error;
pub mod itunes;
pub mod library;
pub mod metadata;
pub mod model;
pub mod scanner;
pub mod server;
#[cfg(test)]
pub mod test_utils;

use clap::Parser;
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

fn main() -> anyhow::Result<()> {
    let args = cli::Cli::parse();

    // Initialize logging
    tracing_subscriber::registry()
        .with(fmt::layer().with_target(true).with_writer(std::io::stderr))
        .with(EnvFilter::from_default_env().add_directive("music_sync=info".parse()?))
        .init();

    cli::run_command(&args)
}
