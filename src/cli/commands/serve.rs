//! Sync server command.

use anyhow::anyhow;
use tokio::runtime::Runtime;

use crate::config::{LibraryPaths, ServerConfig};
use crate::library;
use crate::server::SyncServer;

/// Serve the current index until Ctrl+C
pub fn cmd_serve(rt: &Runtime, paths: &LibraryPaths, config: &ServerConfig) -> anyhow::Result<()> {
    let library = library::store::load(paths).ok_or_else(|| {
        anyhow!(
            "No library index at {}. Run `music-sync index` first.",
            paths.index_file().display()
        )
    })?;

    rt.block_on(async {
        let mut server = SyncServer::new(&library, paths, config)?;
        let addr = server.start().await?;

        println!("Serving {} tracks on http://{}", library.len(), addr);
        println!("  GET /library.json");
        println!("  GET /track/<persistent id>");
        println!("Press Ctrl+C to stop.");

        tokio::signal::ctrl_c().await?;
        println!("\nStopping...");
        server.stop().await;
        Ok::<(), anyhow::Error>(())
    })
}
