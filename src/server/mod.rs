//! Local HTTP sync server.
//!
//! Serves `library.json` and the indexed audio files so another device can
//! pull the collection. There is no authentication; the server is meant for a
//! trusted local network.
//!
//! # Design
//!
//! - **Snapshot**: the library is captured when the server is constructed;
//!   reindexing while it runs does not change what it serves
//! - **Connection per task**: every accepted connection is handled on its own
//!   tokio task, so transfers run in parallel
//! - **Lifecycle**: [`SyncServer::start`] binds and spawns the accept loop,
//!   [`SyncServer::stop`] closes the listener, drains in-flight transfers for
//!   the configured grace period, then aborts whatever is left
//!
//! # Usage
//!
//! ```rust,ignore
//! let mut server = SyncServer::new(&library, &paths, &config.server)?;
//! let addr = server.start().await?;
//! println!("Listening on {addr}");
//! tokio::signal::ctrl_c().await?;
//! server.stop().await;
//! ```

mod routes;

pub use routes::{AppState, content_type, router};

use std::net::{IpAddr, SocketAddr};
use std::time::Duration;
use tokio::net::TcpListener;
use tokio::sync::oneshot;
use tokio::task::JoinHandle;

use crate::config::{LibraryPaths, ServerConfig};
use crate::error::{Error, Result, ResultExt};
use crate::model::Library;

/// A listening server's handles.
struct Running {
    local_addr: SocketAddr,
    shutdown: oneshot::Sender<()>,
    task: JoinHandle<std::io::Result<()>>,
}

/// Sync server with an explicit start/stop lifecycle.
pub struct SyncServer {
    state: AppState,
    addr: SocketAddr,
    grace: Duration,
    running: Option<Running>,
}

impl SyncServer {
    /// Create a stopped server for a library snapshot.
    pub fn new(library: &Library, paths: &LibraryPaths, config: &ServerConfig) -> Result<Self> {
        let ip: IpAddr = config.bind_address.parse().map_err(|e| {
            Error::config(format!(
                "invalid bind address {:?}: {}",
                config.bind_address, e
            ))
        })?;

        Ok(Self {
            state: AppState::new(library, paths.index_file()),
            addr: SocketAddr::new(ip, config.port),
            grace: Duration::from_secs(config.shutdown_grace_secs),
            running: None,
        })
    }

    pub fn is_listening(&self) -> bool {
        self.running.is_some()
    }

    /// Address actually bound, while listening.
    pub fn local_addr(&self) -> Option<SocketAddr> {
        self.running.as_ref().map(|r| r.local_addr)
    }

    /// Bind the listener and start accepting connections.
    pub async fn start(&mut self) -> Result<SocketAddr> {
        if self.running.is_some() {
            return Err(Error::server("already listening"));
        }

        let listener = TcpListener::bind(self.addr)
            .await
            .with_context(format!("binding {}", self.addr))?;
        let local_addr = listener.local_addr()?;

        let (shutdown, signal) = oneshot::channel::<()>();
        let app = router(self.state.clone());
        let task = tokio::spawn(async move {
            axum::serve(listener, app)
                .with_graceful_shutdown(async move {
                    let _ = signal.await;
                })
                .await
        });

        tracing::info!(addr = %local_addr, "Sync server listening");
        self.running = Some(Running {
            local_addr,
            shutdown,
            task,
        });
        Ok(local_addr)
    }

    /// Stop listening. No-op when already stopped.
    pub async fn stop(&mut self) {
        let Some(Running {
            local_addr,
            shutdown,
            mut task,
        }) = self.running.take()
        else {
            return;
        };

        let _ = shutdown.send(());

        match tokio::time::timeout(self.grace, &mut task).await {
            Ok(Ok(Ok(()))) => {}
            Ok(Ok(Err(e))) => {
                tracing::warn!(error = %e, "Sync server exited with error")
            }
            Ok(Err(e)) => tracing::warn!(error = %e, "Sync server task failed"),
            Err(_) => {
                tracing::warn!(grace = ?self.grace, "In-flight transfers did not finish, aborting");
                task.abort();
            }
        }

        tracing::info!(addr = %local_addr, "Sync server stopped");
    }
}

impl Drop for SyncServer {
    fn drop(&mut self) {
        if let Some(running) = self.running.take() {
            let _ = running.shutdown.send(());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::mock_track;
    use tempfile::tempdir;
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::TcpStream;

    fn local_config() -> ServerConfig {
        ServerConfig {
            port: 0,
            bind_address: "127.0.0.1".to_string(),
            shutdown_grace_secs: 1,
        }
    }

    async fn http_get(addr: SocketAddr, path: &str) -> String {
        let mut stream = TcpStream::connect(addr).await.unwrap();
        let request = format!(
            "GET {} HTTP/1.1\r\nHost: localhost\r\nConnection: close\r\n\r\n",
            path
        );
        stream.write_all(request.as_bytes()).await.unwrap();

        let mut response = Vec::new();
        stream.read_to_end(&mut response).await.unwrap();
        String::from_utf8_lossy(&response).into_owned()
    }

    #[tokio::test]
    async fn test_start_serve_stop() {
        let dir = tempdir().unwrap();
        let paths = LibraryPaths::new(dir.path());
        std::fs::write(paths.index_file(), "{\"Tracks\":[]}").unwrap();

        let mut server =
            SyncServer::new(&Library::default(), &paths, &local_config()).unwrap();
        assert!(!server.is_listening());

        let addr = server.start().await.unwrap();
        assert!(server.is_listening());
        assert_eq!(server.local_addr(), Some(addr));

        let response = http_get(addr, "/library.json").await;
        assert!(response.starts_with("HTTP/1.1 200"), "{}", response);
        assert!(response.to_lowercase().contains("content-length: 13"));
        assert!(response.ends_with("{\"Tracks\":[]}"));

        let response = http_get(addr, "/track/FFFFFFFFFFFFFFFF").await;
        assert!(response.starts_with("HTTP/1.1 404"), "{}", response);

        server.stop().await;
        assert!(!server.is_listening());
        assert!(TcpStream::connect(addr).await.is_err());
    }

    #[tokio::test]
    async fn test_serves_snapshot_taken_at_construction() {
        let dir = tempdir().unwrap();
        let paths = LibraryPaths::new(dir.path());
        let song = dir.path().join("song.mp3");
        std::fs::write(&song, b"ID3").unwrap();

        let mut library = Library::new(vec![mock_track(song.to_str().unwrap())]);
        let id = library.tracks[0].persistent_id.clone();

        let mut server = SyncServer::new(&library, &paths, &local_config()).unwrap();
        // Later changes to the caller's library are not seen by the server
        library.tracks.clear();

        let addr = server.start().await.unwrap();
        let response = http_get(addr, &format!("/track/{}", id)).await;
        assert!(response.starts_with("HTTP/1.1 200"), "{}", response);
        assert!(response.contains("audio/mpeg"));
        assert!(response.ends_with("ID3"));

        server.stop().await;
    }

    #[tokio::test]
    async fn test_transfers_run_concurrently() {
        let dir = tempdir().unwrap();
        let paths = LibraryPaths::new(dir.path());
        std::fs::write(paths.index_file(), "{\"Tracks\":[]}").unwrap();

        // Larger than the socket buffers, so the transfer stalls until read
        let song = dir.path().join("big.mp3");
        std::fs::write(&song, vec![0u8; 16 * 1024 * 1024]).unwrap();
        let library = Library::new(vec![mock_track(song.to_str().unwrap())]);
        let id = library.tracks[0].persistent_id.clone();

        let mut server = SyncServer::new(&library, &paths, &local_config()).unwrap();
        let addr = server.start().await.unwrap();

        let mut stalled = TcpStream::connect(addr).await.unwrap();
        let request = format!(
            "GET /track/{} HTTP/1.1\r\nHost: localhost\r\nConnection: close\r\n\r\n",
            id
        );
        stalled.write_all(request.as_bytes()).await.unwrap();
        let mut head = [0u8; 12];
        stalled.read_exact(&mut head).await.unwrap();
        assert_eq!(&head, b"HTTP/1.1 200");

        let response = tokio::time::timeout(
            Duration::from_secs(5),
            http_get(addr, "/library.json"),
        )
        .await
        .expect("index request blocked behind the open transfer");
        assert!(response.starts_with("HTTP/1.1 200"), "{}", response);
        assert!(response.ends_with("{\"Tracks\":[]}"));

        drop(stalled);
        server.stop().await;
    }

    #[tokio::test]
    async fn test_start_twice_is_error() {
        let dir = tempdir().unwrap();
        let paths = LibraryPaths::new(dir.path());
        let mut server =
            SyncServer::new(&Library::default(), &paths, &local_config()).unwrap();

        server.start().await.unwrap();
        assert!(matches!(server.start().await, Err(Error::Server(_))));

        server.stop().await;
        // Stopping twice is harmless
        server.stop().await;
    }

    #[test]
    fn test_invalid_bind_address() {
        let config = ServerConfig {
            bind_address: "not-an-ip".to_string(),
            ..local_config()
        };
        let result = SyncServer::new(&Library::default(), &LibraryPaths::new("/m"), &config);
        assert!(matches!(result, Err(Error::Config(_))));
    }
}
