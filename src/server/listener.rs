use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use tokio::net::TcpListener;
use tracing::info;

/// Pause before retrying after a failed accept (e.g. out of file descriptors).
const ACCEPT_BACKOFF: Duration = Duration::from_millis(100);

use crate::config::Config;
use crate::http::connection::Connection;
use crate::observe::{Observer, TracingObserver};
use crate::router::Router;

/// Binds the configured address and serves until the process exits.
///
/// Failing to bind is the only error returned.
pub async fn run(cfg: &Config) -> anyhow::Result<()> {
    let listener = TcpListener::bind(&cfg.server.listen_addr)
        .await
        .with_context(|| format!("failed to bind {}", cfg.server.listen_addr))?;
    info!("Listening on {}", listener.local_addr()?);

    let router = Arc::new(Router::with_directory(cfg.files.directory.clone()));
    if !router.serves_files() {
        info!("No --directory given; /files/ routes will answer 404");
    }

    serve(listener, router, Arc::new(TracingObserver), cfg.server.max_request_bytes).await
}

/// Accept loop. Each connection runs on its own task and never blocks the
/// loop; a failed accept is logged and retried after a short pause.
pub async fn serve(
    listener: TcpListener,
    router: Arc<Router>,
    observer: Arc<dyn Observer>,
    max_request_bytes: usize,
) -> anyhow::Result<()> {
    loop {
        let (socket, peer) = match listener.accept().await {
            Ok(accepted) => accepted,
            Err(e) => {
                tracing::error!("Failed to accept connection: {}", e);
                tokio::time::sleep(ACCEPT_BACKOFF).await;
                continue;
            }
        };
        info!("Accepted connection from {}", peer);

        let router = Arc::clone(&router);
        let observer = Arc::clone(&observer);
        tokio::spawn(async move {
            let mut conn = Connection::new(socket, peer.to_string(), router, observer)
                .with_max_request_bytes(max_request_bytes);
            if let Err(e) = conn.run().await {
                tracing::error!("Connection error from {}: {:#}", peer, e);
            }
        });
    }
}
