//! Shared utilities for integration testing.

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use recon_listener::classify::AcceptabilityClassifier;
use recon_listener::config::ReconConfig;
use recon_listener::http::HttpServer;
use recon_listener::lifecycle::Shutdown;
use recon_listener::resolve::ConnectResolver;
use recon_listener::store::RecordStore;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};

/// A config with a fast, small tarpit so tests finish quickly.
pub fn quick_config() -> ReconConfig {
    let mut config = ReconConfig::default();
    config.tarpit.max_chunks = 3;
    config.tarpit.chunk_bytes = 256;
    config.tarpit.chunk_interval_ms = 5;
    config.tarpit.jitter_ms = 0;
    config
}

/// Start a listener with default collaborators on an ephemeral port.
#[allow(dead_code)]
pub async fn spawn_listener(config: ReconConfig) -> (SocketAddr, Shutdown) {
    let server = HttpServer::new(config).expect("server setup");
    spawn(server).await
}

/// Start a listener with explicit collaborators on an ephemeral port.
#[allow(dead_code)]
pub async fn spawn_listener_with(
    config: ReconConfig,
    store: Arc<dyn RecordStore>,
    classifier: Arc<dyn AcceptabilityClassifier>,
    resolver: Arc<dyn ConnectResolver>,
) -> (SocketAddr, Shutdown) {
    let server = HttpServer::with_parts(config, store, classifier, resolver);
    spawn(server).await
}

async fn spawn(server: HttpServer) -> (SocketAddr, Shutdown) {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    let shutdown = Shutdown::new();
    let server_shutdown = shutdown.subscribe();
    tokio::spawn(async move {
        let _ = server.run(listener, server_shutdown).await;
    });

    // Give the accept loop a beat to come up.
    tokio::time::sleep(Duration::from_millis(50)).await;
    (addr, shutdown)
}

/// Send a raw HTTP/1.1 request and collect the full response text.
///
/// Used for shapes reqwest cannot produce (CONNECT, garbage methods).
#[allow(dead_code)]
pub async fn raw_request(addr: SocketAddr, request: &str) -> String {
    let mut socket = TcpStream::connect(addr).await.unwrap();
    socket.write_all(request.as_bytes()).await.unwrap();

    let mut buf = Vec::new();
    let _ = tokio::time::timeout(Duration::from_secs(5), socket.read_to_end(&mut buf)).await;
    String::from_utf8_lossy(&buf).into_owned()
}
