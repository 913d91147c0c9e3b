//! iTunes XML export command.

use anyhow::anyhow;

use crate::config::LibraryPaths;
use crate::{itunes, library};

/// Export the current index as "iTunes Music Library.xml"
pub fn cmd_export(paths: &LibraryPaths) -> anyhow::Result<()> {
    let library = library::store::load(paths).ok_or_else(|| {
        anyhow!(
            "No library index at {}. Run `music-sync index` first.",
            paths.index_file().display()
        )
    })?;

    itunes::export(paths, &library)?;
    println!(
        "Exported {} tracks to {}",
        library.len(),
        paths.itunes_xml().display()
    );
    Ok(())
}
