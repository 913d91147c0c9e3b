//! Shared test utilities.
//!
//! Provides track builders, a scriptable [`MockExtractor`] and helpers for
//! laying out fake libraries on disk.

use chrono::{NaiveDate, NaiveDateTime};
use std::collections::{HashMap, HashSet};
use std::path::Path;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use crate::error::{Error, Result};
use crate::library::CancelFlag;
use crate::metadata::{MetadataExtractor, RawMetadata};
use crate::model::{Track, persistent_id};

/// A timestamp at the given date and hour.
pub fn at(year: i32, month: u32, day: u32, hour: u32) -> NaiveDateTime {
    NaiveDate::from_ymd_opt(year, month, day)
        .and_then(|d| d.and_hms_opt(hour, 0, 0))
        .expect("valid test timestamp")
}

/// Creates a mock Track at `path` with sensible defaults and a matching
/// persistent ID.
///
/// Customize using struct update syntax:
///
/// ```ignore
/// let track = Track {
///     name: "Custom".to_string(),
///     ..mock_track("/music/song.mp3")
/// };
/// ```
pub fn mock_track(path: &str) -> Track {
    Track {
        name: "Test Track".to_string(),
        album_artist: "Test Artist".to_string(),
        album_title: "Test Album".to_string(),
        artists: vec!["Test Artist".to_string()],
        genres: vec!["Test".to_string()],
        year: 2023,
        track_number: 1,
        track_count: 1,
        duration_ms: 180_000,
        format: "mp3".to_string(),
        channels: 2,
        sample_rate: 44_100,
        bitrate: 320_000,
        imported: at(2023, 1, 1, 12),
        path: path.to_string(),
        modified: at(2023, 1, 1, 12),
        created: at(2023, 1, 1, 12),
        size_bytes: 4_096,
        persistent_id: persistent_id(path),
        ..Default::default()
    }
}

/// A track on a given album and disc.
pub fn album_track(album_artist: &str, album_title: &str, disc: u32, path: &str) -> Track {
    Track {
        album_artist: album_artist.to_string(),
        album_title: album_title.to_string(),
        disc_number: disc,
        track_count: 0,
        ..mock_track(path)
    }
}

/// Create empty files with the given names under `root`.
pub fn touch_audio_files(root: &Path, names: &[&str]) {
    for name in names {
        std::fs::write(root.join(name), b"").expect("Failed to create test file");
    }
}

/// Extractor returning canned metadata keyed by file name.
///
/// Files without an entry get default metadata titled after the file stem.
#[derive(Default)]
pub struct MockExtractor {
    overrides: HashMap<String, RawMetadata>,
    failing: HashSet<String>,
    cancel_after: Option<(usize, CancelFlag)>,
    calls: Arc<AtomicUsize>,
}

impl MockExtractor {
    pub fn new() -> Self {
        Self::default()
    }

    /// Customize the metadata returned for `file_name`.
    pub fn with(mut self, file_name: &str, edit: impl FnOnce(&mut RawMetadata)) -> Self {
        let mut raw = RawMetadata::default();
        edit(&mut raw);
        self.overrides.insert(file_name.to_string(), raw);
        self
    }

    /// Make extraction of `file_name` fail.
    pub fn failing(mut self, file_name: &str) -> Self {
        self.failing.insert(file_name.to_string());
        self
    }

    /// Trip `flag` once `n` files have been extracted.
    pub fn cancel_after(mut self, n: usize, flag: CancelFlag) -> Self {
        self.cancel_after = Some((n, flag));
        self
    }

    /// Shared counter of extract calls.
    pub fn calls(&self) -> Arc<AtomicUsize> {
        Arc::clone(&self.calls)
    }
}

impl MetadataExtractor for MockExtractor {
    fn extract(&self, path: &Path) -> Result<RawMetadata> {
        let calls = self.calls.fetch_add(1, Ordering::Relaxed) + 1;
        if let Some((n, flag)) = &self.cancel_after {
            if calls >= *n {
                flag.cancel();
            }
        }

        let file_name = path
            .file_name()
            .and_then(|n| n.to_str())
            .unwrap_or_default()
            .to_string();

        if self.failing.contains(&file_name) {
            return Err(Error::metadata(path, "mock extraction failure"));
        }

        Ok(self.overrides.get(&file_name).cloned().unwrap_or_else(|| RawMetadata {
            title: path
                .file_stem()
                .and_then(|s| s.to_str())
                .unwrap_or_default()
                .to_string(),
            ..Default::default()
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mock_track_defaults() {
        let track = mock_track("/music/song.mp3");
        assert_eq!(track.path, "/music/song.mp3");
        assert_eq!(track.persistent_id.len(), 16);
        assert_eq!(track.persistent_id, persistent_id("/music/song.mp3"));
    }

    #[test]
    fn test_mock_extractor_overrides_and_failures() {
        let extractor = MockExtractor::new()
            .with("a.mp3", |m| m.title = "Custom".into())
            .failing("bad.mp3");

        let raw = extractor.extract(Path::new("/m/a.mp3")).unwrap();
        assert_eq!(raw.title, "Custom");

        let raw = extractor.extract(Path::new("/m/other.m4a")).unwrap();
        assert_eq!(raw.title, "other");

        assert!(extractor.extract(Path::new("/m/bad.mp3")).is_err());
        assert_eq!(extractor.calls().load(Ordering::Relaxed), 3);
    }
}
