//! iTunes library XML export.
//!
//! Writes `iTunes Music Library.xml` next to the index so players that import
//! iTunes libraries can pick up the collection. The document is a plist with
//! a fixed header, one `<dict>` per track keyed by its position in the
//! library, an empty playlist array and the music folder URL.
//!
//! Integer fields are omitted when zero and string fields when empty, except
//! `Size` and `Total Time` which are always written.

mod format;

pub use format::{escape_xml, path_to_location, to_utc_string};

use chrono::{Local, NaiveDateTime};
use std::fs::File;
use std::io::{self, BufWriter, Write};

use crate::config::LibraryPaths;
use crate::error::{Result, ResultExt};
use crate::model::{Library, Track};

const APPLICATION_VERSION: &str = "12.13.8.3";
const LIBRARY_PERSISTENT_ID: &str = "38CAD4A721A4B4EB";

/// Per-track export record. `track_id` is the track's position in the
/// library at export time, not its persistent ID.
#[derive(Debug, Clone, Default, PartialEq)]
struct ExportTrack {
    track_id: usize,
    size: u64,
    total_time: u64,
    disc_number: u32,
    disc_count: u32,
    track_number: u32,
    track_count: u32,
    year: u32,
    date_modified: String,
    date_added: String,
    bit_rate: u32,
    sample_rate: u32,
    persistent_id: String,
    name: String,
    artist: String,
    album_artist: String,
    album: String,
    genre: String,
    location: String,
}

impl ExportTrack {
    fn from_track(track: &Track, track_id: usize) -> Self {
        Self {
            track_id,
            size: track.size_bytes,
            total_time: track.duration_ms,
            disc_number: track.disc_number,
            disc_count: track.disc_count,
            track_number: track.track_number,
            track_count: track.track_count,
            year: track.year,
            date_modified: to_utc_string(track.modified),
            date_added: to_utc_string(track.imported),
            bit_rate: track.bitrate,
            sample_rate: track.sample_rate,
            persistent_id: track.persistent_id.clone(),
            name: track.name.clone(),
            artist: track.artists.join(","),
            album_artist: track.album_artist.clone(),
            album: track.album_title.clone(),
            genre: track.genres.join(","),
            location: path_to_location(&track.path),
        }
    }

    fn write_to<W: Write>(&self, w: &mut W) -> io::Result<()> {
        writeln!(w, "\t\t<key>{}</key>", self.track_id)?;
        writeln!(w, "\t\t<dict>")?;

        integer_if_nonzero(w, "Track ID", self.track_id as u64)?;
        writeln!(w, "\t\t\t<key>Size</key><integer>{}</integer>", self.size)?;
        writeln!(w, "\t\t\t<key>Total Time</key><integer>{}</integer>", self.total_time)?;
        integer_if_nonzero(w, "Disc Number", self.disc_number.into())?;
        integer_if_nonzero(w, "Disc Count", self.disc_count.into())?;
        integer_if_nonzero(w, "Track Number", self.track_number.into())?;
        integer_if_nonzero(w, "Track Count", self.track_count.into())?;
        integer_if_nonzero(w, "Year", self.year.into())?;
        text_if_nonempty(w, "Date Modified", &self.date_modified, "date")?;
        text_if_nonempty(w, "Date Added", &self.date_added, "date")?;
        integer_if_nonzero(w, "Bit Rate", self.bit_rate.into())?;
        integer_if_nonzero(w, "Sample Rate", self.sample_rate.into())?;
        text_if_nonempty(w, "Persistent ID", &self.persistent_id, "string")?;
        text_if_nonempty(w, "Name", &self.name, "string")?;
        text_if_nonempty(w, "Artist", &self.artist, "string")?;
        text_if_nonempty(w, "Album Artist", &self.album_artist, "string")?;
        text_if_nonempty(w, "Album", &self.album, "string")?;
        text_if_nonempty(w, "Genre", &self.genre, "string")?;
        text_if_nonempty(w, "Location", &self.location, "string")?;

        writeln!(w, "\t\t</dict>")
    }
}

fn integer_if_nonzero<W: Write>(w: &mut W, key: &str, value: u64) -> io::Result<()> {
    if value == 0 {
        return Ok(());
    }
    writeln!(w, "\t\t\t<key>{}</key><integer>{}</integer>", key, value)
}

fn text_if_nonempty<W: Write>(w: &mut W, key: &str, value: &str, tag: &str) -> io::Result<()> {
    if value.is_empty() {
        return Ok(());
    }
    writeln!(
        w,
        "\t\t\t<key>{}</key><{tag}>{}</{tag}>",
        key,
        escape_xml(value),
        tag = tag
    )
}

fn write_header<W: Write>(w: &mut W, now: NaiveDateTime) -> io::Result<()> {
    writeln!(w, r#"<?xml version="1.0" encoding="UTF-8"?>"#)?;
    writeln!(
        w,
        r#"<!DOCTYPE plist PUBLIC "-//Apple Computer//DTD PLIST 1.0//EN" "http://www.apple.com/DTDs/PropertyList-1.0.dtd">"#
    )?;
    writeln!(w, r#"<plist version="1.0">"#)?;
    writeln!(w, "<dict>")?;
    writeln!(w, "\t<key>Major Version</key><integer>1</integer>")?;
    writeln!(w, "\t<key>Minor Version</key><integer>1</integer>")?;
    writeln!(
        w,
        "\t<key>Application Version</key><string>{}</string>",
        APPLICATION_VERSION
    )?;
    writeln!(w, "\t<key>Date</key><date>{}</date>", to_utc_string(now))?;
    writeln!(w, "\t<key>Features</key><integer>5</integer>")?;
    writeln!(w, "\t<key>Show Content Ratings</key><true/>")?;
    writeln!(
        w,
        "\t<key>Library Persistent ID</key><string>{}</string>",
        LIBRARY_PERSISTENT_ID
    )?;
    writeln!(w, "\t<key>Tracks</key>")?;
    writeln!(w, "\t<dict>")
}

fn write_footer<W: Write>(w: &mut W, music_folder: &str) -> io::Result<()> {
    writeln!(w, "\t</dict>")?;
    // Playlists are not exported
    writeln!(w, "\t<key>Playlists</key>")?;
    writeln!(w, "\t<array>")?;
    writeln!(w, "\t</array>")?;
    writeln!(
        w,
        "\t<key>Music Folder</key><string>{}/</string>",
        escape_xml(&path_to_location(music_folder))
    )?;
    writeln!(w, "</dict>")?;
    writeln!(w, "</plist>")
}

/// Write the full plist document for `library`.
///
/// `music_folder` is the library root; `now` becomes the header `Date`.
pub fn write_document<W: Write>(
    w: &mut W,
    library: &Library,
    music_folder: &str,
    now: NaiveDateTime,
) -> io::Result<()> {
    write_header(w, now)?;
    for (index, track) in library.tracks.iter().enumerate() {
        ExportTrack::from_track(track, index).write_to(w)?;
    }
    write_footer(w, music_folder)
}

/// Export `library` to `iTunes Music Library.xml` under the library root,
/// replacing any previous export.
pub fn export(paths: &LibraryPaths, library: &Library) -> Result<()> {
    let path = paths.itunes_xml();
    let file = File::create(&path).with_context(format!("creating {}", path.display()))?;
    let mut writer = BufWriter::new(file);

    let music_folder = paths.root().to_string_lossy();
    write_document(&mut writer, library, &music_folder, Local::now().naive_local())
        .and_then(|_| writer.flush())
        .with_context(format!("writing {}", path.display()))?;

    tracing::info!(path = %path.display(), tracks = library.len(), "Exported iTunes library");
    Ok(())
}
