//! # Connection Acceptor
//!
//! Accepts TCP connections and runs one session task per connection, at most
//! `max_sessions` at a time. Further connections wait in the listen backlog
//! until a permit frees up.
//!
//! Shutdown stops the accept loop. Sessions already running continue until
//! their peers disconnect or their idle timeout fires.

use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::{Context, Result};
use teller_telemetry::session_span;
use tokio::net::{TcpListener, TcpStream};
use tokio::sync::{watch, Semaphore};
use tracing::{debug, info, warn, Instrument};

use crate::container::TellerServices;
use crate::handlers::run_session;

/// The account service runtime.
pub struct TellerRuntime {
    services: Arc<TellerServices>,
    max_sessions: usize,
    shutdown_tx: watch::Sender<bool>,
    shutdown_rx: watch::Receiver<bool>,
}

impl TellerRuntime {
    pub fn new(services: TellerServices, max_sessions: usize) -> Self {
        let (shutdown_tx, shutdown_rx) = watch::channel(false);
        Self {
            services: Arc::new(services),
            max_sessions: max_sessions.max(1),
            shutdown_tx,
            shutdown_rx,
        }
    }

    /// Accept connections on `listener` until `shutdown` is called.
    pub async fn serve(&self, listener: TcpListener) -> Result<()> {
        let local = listener
            .local_addr()
            .context("Listener has no local address")?;
        info!(addr = %local, max_sessions = self.max_sessions, "Accepting connections");

        let permits = Arc::new(Semaphore::new(self.max_sessions));
        let mut shutdown = self.shutdown_rx.clone();

        while !*shutdown.borrow() {
            let permit = tokio::select! {
                _ = shutdown.changed() => break,
                permit = permits.clone().acquire_owned() => {
                    permit.context("Session semaphore closed")?
                }
            };

            let (socket, peer) = tokio::select! {
                _ = shutdown.changed() => break,
                accepted = listener.accept() => match accepted {
                    Ok(pair) => pair,
                    Err(e) => {
                        warn!(error = %e, "Accept failed");
                        continue;
                    }
                },
            };

            let services = Arc::clone(&self.services);
            tokio::spawn(
                async move {
                    let _permit = permit;
                    serve_connection(socket, peer, &services).await;
                }
                .instrument(session_span!(peer = %peer)),
            );
        }

        info!(addr = %local, "Acceptor stopped");
        Ok(())
    }

    /// Stop accepting new connections.
    pub fn shutdown(&self) {
        info!("Initiating graceful shutdown...");
        if let Err(e) = self.shutdown_tx.send(true) {
            warn!("Failed to send shutdown signal: {}", e);
        }
    }
}

async fn serve_connection(socket: TcpStream, peer: SocketAddr, services: &TellerServices) {
    if let Err(e) = socket.set_nodelay(true) {
        debug!(error = %e, "Could not set TCP_NODELAY");
    }
    debug!(%peer, "Connection accepted");

    let (reader, writer) = socket.into_split();
    // Failures are logged and counted inside the session.
    let _ = run_session(reader, writer, services).await;
}
