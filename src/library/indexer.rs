//! Full library reindex.
//!
//! A run walks the library root, extracts metadata file by file, computes
//! track counts, sorts by import date and persists `library.json`. Either the
//! whole pass completes and is saved, or nothing on disk changes.
//!
//! # Usage
//!
//! ```rust,ignore
//! let (tx, mut rx) = tokio::sync::mpsc::unbounded_channel();
//! let cancel = CancelFlag::new();
//! let indexer = Indexer::new(paths, LoftyExtractor).with_events(tx);
//!
//! let handle = tokio::task::spawn_blocking(move || indexer.run(&cancel));
//! while let Some(event) = rx.recv().await {
//!     if let IndexEvent::Progress(pct) = event {
//!         println!("{pct:.0}%");
//!     }
//! }
//! let library = handle.await??; // None when cancelled or nothing was found
//! ```

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use tokio::sync::mpsc::UnboundedSender;

use crate::config::LibraryPaths;
use crate::error::{Result, ResultExt};
use crate::metadata::MetadataExtractor;
use crate::model::{Library, persistent_id};
use crate::scanner;

use super::{store, track_count};

/// A progress notification is sent after every this-many files.
pub const PROGRESS_INTERVAL: usize = 30;

/// Cooperative cancellation for an index run.
///
/// Checked before each file, so a cancel takes effect within one metadata
/// extraction. Clones share the same flag.
#[derive(Debug, Clone, Default)]
pub struct CancelFlag(Arc<AtomicBool>);

impl CancelFlag {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::Relaxed);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::Relaxed)
    }
}

/// Phases of an index run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum IndexPhase {
    #[default]
    Idle,
    Scanning,
    ExtractingMetadata {
        total: usize,
    },
    Aggregating,
    Sorting,
    Persisting,
    Done,
    Cancelled,
}

/// Events published while indexing.
#[derive(Debug, Clone, PartialEq)]
pub enum IndexEvent {
    /// The run entered a new phase
    Phase(IndexPhase),
    /// Percentage of files processed (0.0 - 100.0)
    Progress(f64),
}

/// Rebuilds the library index from the files under the library root.
pub struct Indexer<E> {
    paths: LibraryPaths,
    extractor: E,
    events: Option<UnboundedSender<IndexEvent>>,
}

impl<E: MetadataExtractor> Indexer<E> {
    pub fn new(paths: LibraryPaths, extractor: E) -> Self {
        Self {
            paths,
            extractor,
            events: None,
        }
    }

    /// Publish phase changes and progress on `tx`.
    pub fn with_events(mut self, tx: UnboundedSender<IndexEvent>) -> Self {
        self.events = Some(tx);
        self
    }

    /// Run a full reindex.
    ///
    /// Returns `Ok(None)` when no audio files were found or the run was
    /// cancelled; in both cases `library.json` is left untouched.
    ///
    /// # Errors
    ///
    /// Scanning, extraction and persistence failures abort the run. A single
    /// unreadable file fails the whole pass.
    pub fn run(&self, cancel: &CancelFlag) -> Result<Option<Library>> {
        let root = self.paths.root();

        self.phase(IndexPhase::Scanning);
        let files =
            scanner::scan(root).with_context(format!("scanning {}", root.display()))?;

        if files.is_empty() {
            tracing::info!(root = %root.display(), "No audio files found, keeping existing index");
            self.phase(IndexPhase::Done);
            return Ok(None);
        }

        let total = files.len();
        tracing::info!(root = %root.display(), total, "Indexing library");
        self.phase(IndexPhase::ExtractingMetadata { total });

        let mut library = Library::new(Vec::with_capacity(total));
        for (i, path) in files.iter().enumerate() {
            if cancel.is_cancelled() {
                tracing::info!(processed = i, total, "Indexing cancelled");
                self.phase(IndexPhase::Cancelled);
                return Ok(None);
            }

            let mut track = self.extractor.extract(path)?.into_track(path);
            track.persistent_id = persistent_id(&track.path);
            tracing::trace!(path = %track.path, id = %track.persistent_id, "Indexed");
            library.tracks.push(track);

            if i % PROGRESS_INTERVAL == 0 {
                self.emit(IndexEvent::Progress(i as f64 / total as f64 * 100.0));
            }
        }

        self.phase(IndexPhase::Aggregating);
        track_count::fill_track_counts(&mut library.tracks);

        self.phase(IndexPhase::Sorting);
        library.sort_by_imported();

        self.phase(IndexPhase::Persisting);
        store::save(&self.paths, &library)?;

        tracing::info!(tracks = library.len(), "Indexing complete");
        self.phase(IndexPhase::Done);
        Ok(Some(library))
    }

    fn phase(&self, phase: IndexPhase) {
        self.emit(IndexEvent::Phase(phase));
    }

    fn emit(&self, event: IndexEvent) {
        if let Some(tx) = &self.events {
            // Receiver gone just means nobody is watching
            let _ = tx.send(event);
        }
    }
}
