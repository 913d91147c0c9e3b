//! Audio file discovery.
//!
//! Walks the library root recursively and keeps files with a supported
//! extension. Unlike a best-effort scan, an unreadable root or subdirectory
//! is an error: an index built from a partial walk would silently drop tracks.

use std::io;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

/// Extensions indexed by the library (compared case-insensitively).
pub const AUDIO_EXTENSIONS: &[&str] = &["mp3", "m4a"];

/// Check whether a path has a supported audio extension.
pub fn is_audio_file(path: &Path) -> bool {
    path.extension()
        .and_then(|s| s.to_str())
        .map(|ext| {
            AUDIO_EXTENSIONS
                .iter()
                .any(|supported| ext.eq_ignore_ascii_case(supported))
        })
        .unwrap_or(false)
}

/// Scans the given root directory recursively for audio files.
///
/// Returns the matching paths in traversal order (no ordering guarantee).
///
/// # Errors
///
/// Fails if `root` does not exist, is not a directory, or any directory
/// below it cannot be read.
pub fn scan(root: &Path) -> io::Result<Vec<PathBuf>> {
    let meta = std::fs::metadata(root)?;
    if !meta.is_dir() {
        return Err(io::Error::new(
            io::ErrorKind::NotADirectory,
            format!("{} is not a directory", root.display()),
        ));
    }

    let mut files = Vec::new();
    for entry in WalkDir::new(root) {
        let entry = entry.map_err(io::Error::from)?;
        if entry.file_type().is_file() && is_audio_file(entry.path()) {
            files.push(entry.into_path());
        }
    }

    tracing::debug!(root = %root.display(), found = files.len(), "Scan finished");
    Ok(files)
}

/// Count the audio files under `root`.
pub fn count_audio_files(root: &Path) -> io::Result<usize> {
    scan(root).map(|files| files.len())
}
