//! Library indexing commands.

use std::io::Write;
use tokio::runtime::Runtime;
use tokio::sync::mpsc;
use tracing::{debug, info};

use crate::config::LibraryPaths;
use crate::itunes;
use crate::library::{self, CancelFlag, IndexEvent, IndexPhase, Indexer};
use crate::metadata::LoftyExtractor;
use crate::scanner;

/// Rebuild the library index, optionally exporting the iTunes XML afterwards.
///
/// Ctrl+C cancels cooperatively; the previous index is kept in that case.
pub fn cmd_index(rt: &Runtime, paths: &LibraryPaths, export: bool) -> anyhow::Result<()> {
    rt.block_on(async {
        println!("Indexing library: {}", paths.root().display());

        let (tx, mut rx) = mpsc::unbounded_channel();
        let cancel = CancelFlag::new();

        let indexer = Indexer::new(paths.clone(), LoftyExtractor).with_events(tx);
        let run_cancel = cancel.clone();
        let handle = tokio::task::spawn_blocking(move || indexer.run(&run_cancel));

        let ctrl_c_cancel = cancel.clone();
        tokio::spawn(async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                info!("Ctrl+C received, cancelling");
                ctrl_c_cancel.cancel();
            }
        });

        // The channel closes once the indexer is dropped at the end of the run
        let mut last_phase = IndexPhase::Idle;
        while let Some(event) = rx.recv().await {
            match event {
                IndexEvent::Progress(percent) => {
                    print!("\rIndexing... {:>3.0}%", percent);
                    std::io::stdout().flush()?;
                }
                IndexEvent::Phase(phase) => {
                    debug!(?phase, "Phase changed");
                    last_phase = phase;
                }
            }
        }
        println!();

        match handle.await?? {
            Some(library) => {
                println!(
                    "Indexed {} tracks into {}",
                    library.len(),
                    paths.index_file().display()
                );
                if export {
                    itunes::export(paths, &library)?;
                    println!("Exported {}", paths.itunes_xml().display());
                }
            }
            None if last_phase == IndexPhase::Cancelled => {
                println!("Indexing cancelled; the existing index was left unchanged.");
            }
            None => {
                println!("No audio files found; nothing to index.");
            }
        }

        Ok::<(), anyhow::Error>(())
    })
}

/// List all tracks in the index
pub fn cmd_list(paths: &LibraryPaths) -> anyhow::Result<()> {
    let Some(library) = library::store::load(paths) else {
        println!("No library index yet. Run `music-sync index` first.");
        return Ok(());
    };

    if library.is_empty() {
        println!("The library index holds no tracks.");
        return Ok(());
    }

    for track in &library.tracks {
        println!("{}  {} - {}", track.persistent_id, track.name, track.path);
    }
    println!("{} tracks", library.len());
    Ok(())
}

/// Count audio files under the library root
pub fn cmd_count(paths: &LibraryPaths) -> anyhow::Result<()> {
    let count = scanner::count_audio_files(paths.root())?;
    println!("{} audio files under {}", count, paths.root().display());
    Ok(())
}
