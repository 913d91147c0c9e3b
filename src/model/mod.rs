//! Core data models for the music library.
//!
//! Defines the primary entities: [`Track`] and [`Library`].
//!
//! # Index Document
//!
//! The models map to `library.json` through explicit field names, so the
//! document layout does not drift when Rust field names change:
//!
//! ```json
//! {
//!   "Tracks": [
//!     { "Name": "...", "AlbumArtist": "...", "PersistentID": "0123456789ABCDEF", ... }
//!   ]
//! }
//! ```

mod persistent_id;

pub use persistent_id::persistent_id;

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

/// A track (audio file) in the music library.
///
/// Missing fields decode to their defaults: empty strings, zero, `false`
/// and the Unix epoch for timestamps.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Track {
    // Tags
    #[serde(rename = "Name")]
    pub name: String,
    #[serde(rename = "AlbumArtist")]
    pub album_artist: String,
    #[serde(rename = "AlbumTitle")]
    pub album_title: String,
    #[serde(rename = "Artists")]
    pub artists: Vec<String>,
    #[serde(rename = "Genre")]
    pub genres: Vec<String>,
    #[serde(rename = "Year")]
    pub year: u32,
    #[serde(rename = "TrackNumber")]
    pub track_number: u32,
    /// Number of tracks on the same album and disc (computed while indexing)
    #[serde(rename = "TrackCount")]
    pub track_count: u32,
    #[serde(rename = "DiscNumber")]
    pub disc_number: u32,
    #[serde(rename = "DiscCount")]
    pub disc_count: u32,
    #[serde(rename = "DurationMilliSeconds")]
    pub duration_ms: u64,

    // Audio
    /// Container format, derived from the file extension ("mp3", "m4a")
    #[serde(rename = "Format")]
    pub format: String,
    #[serde(rename = "Channels")]
    pub channels: u32,
    #[serde(rename = "IsVBR")]
    pub is_vbr: bool,
    /// Sample rate in Hz
    #[serde(rename = "SampleRate")]
    pub sample_rate: u32,
    /// Bitrate in bits per second
    #[serde(rename = "Bitrate")]
    pub bitrate: u32,
    /// When the track entered the collection; the library sort key
    #[serde(rename = "Imported")]
    pub imported: NaiveDateTime,

    // File
    /// Absolute file path
    #[serde(rename = "Path")]
    pub path: String,
    #[serde(rename = "Modified")]
    pub modified: NaiveDateTime,
    #[serde(rename = "Created")]
    pub created: NaiveDateTime,
    #[serde(rename = "SizeBytes")]
    pub size_bytes: u64,

    /// Stable 16-hex-character key derived from `path`
    #[serde(rename = "PersistentID")]
    pub persistent_id: String,
}

/// An ordered collection of tracks, rebuilt from scratch on every index run.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Library {
    #[serde(rename = "Tracks")]
    pub tracks: Vec<Track>,
}

impl Library {
    pub fn new(tracks: Vec<Track>) -> Self {
        Self { tracks }
    }

    pub fn len(&self) -> usize {
        self.tracks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tracks.is_empty()
    }

    /// Sort ascending by import timestamp. Equal timestamps keep their order.
    pub fn sort_by_imported(&mut self) {
        self.tracks.sort_by_key(|t| t.imported);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::{at, mock_track};

    #[test]
    fn test_sort_by_imported_is_non_decreasing() {
        let mut library = Library::new(vec![
            Track {
                imported: at(2023, 5, 1, 12),
                ..mock_track("/m/c.mp3")
            },
            Track {
                imported: at(2021, 1, 1, 0),
                ..mock_track("/m/a.mp3")
            },
            Track {
                imported: at(2022, 7, 9, 8),
                ..mock_track("/m/b.mp3")
            },
        ]);

        library.sort_by_imported();

        assert!(
            library
                .tracks
                .windows(2)
                .all(|w| w[0].imported <= w[1].imported)
        );
        assert_eq!(library.tracks[0].path, "/m/a.mp3");
        assert_eq!(library.tracks[2].path, "/m/c.mp3");
    }

    #[test]
    fn test_sort_keeps_order_of_equal_timestamps() {
        let same = at(2020, 1, 1, 0);
        let mut library = Library::new(vec![
            Track {
                imported: same,
                ..mock_track("/m/first.mp3")
            },
            Track {
                imported: same,
                ..mock_track("/m/second.mp3")
            },
        ]);

        library.sort_by_imported();
        assert_eq!(library.tracks[0].path, "/m/first.mp3");
    }

    #[test]
    fn test_len_and_is_empty() {
        let mut library = Library::default();
        assert!(library.is_empty());

        library.tracks.push(mock_track("/m/a.mp3"));
        assert!(!library.is_empty());
        assert_eq!(library.len(), 1);
    }

    #[test]
    fn test_missing_fields_decode_to_defaults() {
        let json = r#"{"Tracks":[{"Name":"Only a name"}]}"#;
        let library: Library = serde_json::from_str(json).unwrap();

        let track = &library.tracks[0];
        assert_eq!(track.name, "Only a name");
        assert_eq!(track.track_count, 0);
        assert!(track.artists.is_empty());
        assert_eq!(track.imported, NaiveDateTime::default());
    }
}
