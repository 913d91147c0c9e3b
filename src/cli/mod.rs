//! Command-line interface for music-sync.
//!
//! The CLI is the presentation layer: it triggers indexing and export and
//! starts/stops the sync server. All behaviour lives in the library modules.

mod commands;

pub use commands::{Cli, Commands, run_command};
