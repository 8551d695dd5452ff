//! TCP listener and per-connection loop.
//!
//! The accept loop spawns one task per connection, so a slow client never
//! blocks the others. Each task sends the greeting packet, then repeats
//! receive, dispatch, respond until the peer disconnects. All exit paths
//! fall out of the task and drop the socket; a failure on one connection is
//! logged and never propagates to the accept loop or to other connections.

use std::net::SocketAddr;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use pathscout_core::GREETING;
use thiserror::Error;
use tokio::net::{TcpListener, TcpStream};
use tokio::time::timeout;
use tracing::{info, warn};
use uuid::Uuid;

use super::framed::{read_packet, write_packet};
use crate::application::Dispatcher;

/// Error type for the network listener.
#[derive(Debug, Error)]
pub enum NetworkError {
    #[error("bind failed on {addr}: {source}")]
    BindFailed {
        addr: SocketAddr,
        #[source]
        source: std::io::Error,
    },
}

/// The connection server: owns the bound listener and the shared dispatcher.
pub struct Server {
    listener: TcpListener,
    dispatcher: Arc<Dispatcher>,
    mask_key: u8,
}

impl Server {
    /// Binds the TCP listener. Binding is separate from [`Server::run`] so
    /// callers can bind port 0 and read the assigned port first.
    ///
    /// # Errors
    ///
    /// Returns [`NetworkError::BindFailed`] when the address cannot be bound.
    pub async fn bind(
        addr: SocketAddr,
        dispatcher: Arc<Dispatcher>,
        mask_key: u8,
    ) -> Result<Self, NetworkError> {
        let listener = TcpListener::bind(addr)
            .await
            .map_err(|source| NetworkError::BindFailed { addr, source })?;
        Ok(Self {
            listener,
            dispatcher,
            mask_key,
        })
    }

    /// The address the listener is actually bound to.
    pub fn local_addr(&self) -> std::io::Result<SocketAddr> {
        self.listener.local_addr()
    }

    /// Accepts connections until `running` is cleared.
    ///
    /// The accept call is bounded by a short timeout so the shutdown flag is
    /// re-checked a few times per second.
    pub async fn run(self, running: Arc<AtomicBool>) {
        match self.local_addr() {
            Ok(addr) => info!(%addr, "server listening"),
            Err(e) => warn!(error = %e, "server listening on unknown address"),
        }

        while running.load(Ordering::Relaxed) {
            match timeout(Duration::from_millis(200), self.listener.accept()).await {
                Ok(Ok((stream, peer))) => {
                    let dispatcher = Arc::clone(&self.dispatcher);
                    let mask_key = self.mask_key;
                    tokio::spawn(async move {
                        handle_connection(stream, peer, dispatcher, mask_key).await;
                    });
                }
                Ok(Err(e)) => {
                    warn!(error = %e, "accept failed");
                }
                Err(_) => {
                    // Timeout tick: loop around and re-check the flag.
                }
            }
        }

        info!("server stopped accepting connections");
    }
}

/// Drives one client connection to completion.
async fn handle_connection(
    mut stream: TcpStream,
    peer: SocketAddr,
    dispatcher: Arc<Dispatcher>,
    mask_key: u8,
) {
    let conn = Uuid::new_v4();
    info!(%peer, %conn, "client connected");

    if let Err(e) = write_packet(&mut stream, GREETING, mask_key).await {
        warn!(%peer, %conn, error = %e, "failed to send greeting");
        return;
    }

    loop {
        let payload = match read_packet(&mut stream, mask_key).await {
            Ok(Some(payload)) => payload,
            Ok(None) => {
                info!(%peer, %conn, "client disconnected");
                break;
            }
            Err(e) => {
                warn!(%peer, %conn, error = %e, "read failed, closing connection");
                break;
            }
        };

        // A zero-length payload is "no command": skip it without replying.
        let Some(response) = dispatcher.dispatch(&payload).await else {
            continue;
        };

        if let Err(e) = write_packet(&mut stream, &response, mask_key).await {
            warn!(%peer, %conn, error = %e, "write failed, closing connection");
            break;
        }
    }
    // The stream drops here on every path, releasing the socket.
}

// ── Tests ─────────────────────────────────────────────────────────────────────
