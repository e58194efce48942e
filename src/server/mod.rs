// src/server/mod.rs
mod handler;

pub use handler::RequestHandler;

use anyhow::Result;
use hyper::server::conn::Http;
use std::net::SocketAddr;
use tokio::net::TcpListener;
use tracing::{info, warn};

/// Accept loop for the status endpoint. Each connection gets its own task;
/// ctrl-c stops accepting and lets in-flight probes finish on their tasks.
pub async fn serve(addr: SocketAddr, handler: RequestHandler) -> Result<()> {
    let listener = TcpListener::bind(addr).await?;
    info!("HTTP server listening on {}", addr);

    loop {
        tokio::select! {
            accepted = listener.accept() => {
                let (stream, peer) = accepted?;
                let svc = handler.clone();
                tokio::spawn(async move {
                    if let Err(err) = Http::new().serve_connection(stream, svc).await {
                        warn!(%peer, %err, "connection error");
                    }
                });
            }
            _ = tokio::signal::ctrl_c() => {
                info!("Shutdown signal received");
                break;
            }
        }
    }

    Ok(())
}
