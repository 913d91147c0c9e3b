//! Audio file metadata extraction.
//!
//! [`MetadataExtractor`] is the seam between the indexer and whatever reads
//! tags from disk. The default [`LoftyExtractor`] uses the lofty crate for
//! tags and audio properties and `std::fs` for file attributes. Tests swap in
//! a mock (see `test_utils`).
//!
//! Disc information arrives as a "part of set" string (`"1/2"`) and is parsed
//! here, so every extractor hands the indexer the same shape.

use chrono::{DateTime, Local, NaiveDateTime};
use lofty::file::{AudioFile, TaggedFileExt};
use lofty::probe::Probe;
use lofty::tag::{Accessor, ItemKey, Tag};
use std::path::Path;
use std::time::SystemTime;

use crate::error::{Error, Result};
use crate::model::Track;

/// Raw attributes for one file, as reported by an extractor.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RawMetadata {
    pub title: String,
    pub album_artist: String,
    pub album_title: String,
    pub artists: Vec<String>,
    pub genres: Vec<String>,
    pub year: u32,
    pub track_number: u32,
    pub duration_ms: u64,
    /// `"disc/discCount"`, possibly empty or malformed
    pub part_of_set: String,

    pub format: String,
    pub channels: u32,
    pub is_vbr: bool,
    pub sample_rate: u32,
    /// Bits per second
    pub bitrate: u32,
    pub imported: NaiveDateTime,

    pub modified: NaiveDateTime,
    pub created: NaiveDateTime,
    pub size_bytes: u64,
}

impl RawMetadata {
    /// Build a [`Track`] for `path`. Track count and persistent ID are left
    /// for the indexer to fill in.
    pub fn into_track(self, path: &Path) -> Track {
        let (disc_number, disc_count) = parse_part_of_set(&self.part_of_set);

        Track {
            name: self.title,
            album_artist: self.album_artist,
            album_title: self.album_title,
            artists: self.artists,
            genres: self.genres,
            year: self.year,
            track_number: self.track_number,
            track_count: 0,
            disc_number,
            disc_count,
            duration_ms: self.duration_ms,
            format: self.format,
            channels: self.channels,
            is_vbr: self.is_vbr,
            sample_rate: self.sample_rate,
            bitrate: self.bitrate,
            imported: self.imported,
            path: path.to_string_lossy().into_owned(),
            modified: self.modified,
            created: self.created,
            size_bytes: self.size_bytes,
            persistent_id: String::new(),
        }
    }
}

/// Reads raw metadata for a single audio file.
pub trait MetadataExtractor: Send + Sync {
    fn extract(&self, path: &Path) -> Result<RawMetadata>;
}

/// Parse a `"disc/discCount"` string.
///
/// Each half is parsed on its own; anything that is not exactly two
/// slash-separated parts yields `(0, 0)`.
pub fn parse_part_of_set(value: &str) -> (u32, u32) {
    let mut parts = value.split('/');
    match (parts.next(), parts.next(), parts.next()) {
        (Some(disc), Some(count), None) => (
            disc.trim().parse().unwrap_or(0),
            count.trim().parse().unwrap_or(0),
        ),
        _ => (0, 0),
    }
}

/// Extractor backed by lofty (tags, audio properties) and filesystem metadata.
#[derive(Debug, Clone, Copy, Default)]
pub struct LoftyExtractor;

impl MetadataExtractor for LoftyExtractor {
    fn extract(&self, path: &Path) -> Result<RawMetadata> {
        let file_meta = std::fs::metadata(path)?;

        let tagged_file = Probe::open(path)
            .and_then(|probe| probe.read())
            .map_err(|e| Error::metadata(path, e.to_string()))?;

        let tag = tagged_file
            .primary_tag()
            .or_else(|| tagged_file.first_tag());

        let properties = tagged_file.properties();

        let modified = file_meta.modified().map(to_local).unwrap_or_default();
        // Not every filesystem records birth time
        let created = file_meta.created().map(to_local).unwrap_or(modified);

        let mut raw = RawMetadata {
            duration_ms: properties.duration().as_millis() as u64,
            format: path
                .extension()
                .and_then(|e| e.to_str())
                .map(str::to_lowercase)
                .unwrap_or_default(),
            channels: properties.channels().map(u32::from).unwrap_or(0),
            sample_rate: properties.sample_rate().unwrap_or(0),
            bitrate: kbps_to_bps(properties.audio_bitrate().unwrap_or(0)),
            imported: created,
            modified,
            created,
            size_bytes: file_meta.len(),
            ..Default::default()
        };

        if let Some(tag) = tag {
            fill_from_tag(&mut raw, tag);
        }

        Ok(raw)
    }
}

fn fill_from_tag(raw: &mut RawMetadata, tag: &Tag) {
    raw.title = tag.title().map(|s| s.to_string()).unwrap_or_default();
    raw.album_title = tag.album().map(|s| s.to_string()).unwrap_or_default();
    raw.album_artist = tag
        .get_string(&ItemKey::AlbumArtist)
        .map(str::to_string)
        .unwrap_or_default();

    raw.artists = tag
        .get_strings(&ItemKey::TrackArtist)
        .map(str::to_string)
        .collect();
    raw.genres = tag.get_strings(&ItemKey::Genre).map(str::to_string).collect();

    raw.year = tag.year().unwrap_or(0);
    raw.track_number = tag.track().unwrap_or(0);

    // Keep the disc even without a total; the parser reads each half separately
    if let Some(disc) = tag.disk() {
        raw.part_of_set = match tag.disk_total() {
            Some(total) => format!("{}/{}", disc, total),
            None => format!("{}/", disc),
        };
    }
}

/// Corrupt headers can report absurd rates; clamp instead of overflowing.
fn kbps_to_bps(kbps: u32) -> u32 {
    kbps.saturating_mul(1000)
}

fn to_local(time: SystemTime) -> NaiveDateTime {
    DateTime::<Local>::from(time).naive_local()
}
