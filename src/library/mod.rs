//! Library index construction and persistence.
//!
//! - [`Indexer`]: scan → extract → assign IDs → count → sort → save
//! - [`fill_track_counts`]: per-disc track counts
//! - [`store`]: `library.json` encoding and loading

mod indexer;
pub mod store;
mod track_count;

pub use indexer::{CancelFlag, IndexEvent, IndexPhase, Indexer, PROGRESS_INTERVAL};
pub use track_count::fill_track_counts;
