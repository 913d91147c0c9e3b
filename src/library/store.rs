//! Persistence of the library index (`library.json`).
//!
//! Loading never fails: a missing or unreadable document means the library
//! has not been indexed yet, and callers respond by running a fresh index.

use std::fs::File;
use std::io::{BufReader, BufWriter, Read, Write};
use std::path::Path;

use crate::config::LibraryPaths;
use crate::error::{Result, ResultExt};
use crate::model::Library;

/// Encode the library as pretty-printed JSON.
pub fn write_json<W: Write>(writer: W, library: &Library) -> Result<()> {
    let mut writer = BufWriter::new(writer);
    serde_json::to_writer_pretty(&mut writer, library)?;
    writer.flush()?;
    Ok(())
}

/// Decode a library; `None` if the content does not parse.
pub fn read_json<R: Read>(reader: R) -> Option<Library> {
    match serde_json::from_reader(BufReader::new(reader)) {
        Ok(library) => Some(library),
        Err(e) => {
            tracing::warn!(error = %e, "Library index is malformed");
            None
        }
    }
}

/// Write the library to `library.json` under the library root.
///
/// The file is truncated and rewritten in place, so a crash mid-write can
/// leave a corrupt index; the next load then reports "no library".
pub fn save(paths: &LibraryPaths, library: &Library) -> Result<()> {
    let path = paths.index_file();
    let file = File::create(&path).with_context(format!("creating {}", path.display()))?;
    write_json(file, library).with_context(format!("writing {}", path.display()))?;

    tracing::info!(path = %path.display(), tracks = library.len(), "Saved library index");
    Ok(())
}

/// Load `library.json` from the library root.
pub fn load(paths: &LibraryPaths) -> Option<Library> {
    load_from(&paths.index_file())
}

/// Load a library index from an explicit file.
pub fn load_from(path: &Path) -> Option<Library> {
    let file = match File::open(path) {
        Ok(file) => file,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            tracing::info!(path = %path.display(), "No library index yet");
            return None;
        }
        Err(e) => {
            tracing::warn!(path = %path.display(), error = %e, "Failed to open library index");
            return None;
        }
    };

    let library = read_json(file)?;
    tracing::debug!(path = %path.display(), tracks = library.len(), "Loaded library index");
    Some(library)
}
