//! Gateway - TCP listener that accepts incoming connections.
//!
//! The Gateway binds the listen socket and spawns a Session task for each
//! incoming client, handing it a fresh handle.

use crate::network::{Session, SessionSettings};
use crate::server::ChatServerHandle;
use crate::state::HandleGenerator;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::TcpListener;
use tracing::{error, info, instrument};

/// Prefix of every session handle issued by this gateway.
const HANDLE_PREFIX: &str = "C";

/// The Gateway accepts incoming TCP connections and spawns sessions.
pub struct Gateway {
    listener: TcpListener,
    server: ChatServerHandle,
    settings: Arc<SessionSettings>,
    handles: HandleGenerator,
}

impl Gateway {
    /// Bind the gateway to the specified address.
    pub async fn bind(
        addr: SocketAddr,
        server: ChatServerHandle,
        settings: SessionSettings,
    ) -> anyhow::Result<Self> {
        let listener = TcpListener::bind(addr).await?;
        info!(address = %listener.local_addr()?, "Listener bound");

        Ok(Self {
            listener,
            server,
            settings: Arc::new(settings),
            handles: HandleGenerator::new(HANDLE_PREFIX),
        })
    }

    /// Address the listener actually bound (resolves port 0).
    pub fn local_addr(&self) -> std::io::Result<SocketAddr> {
        self.listener.local_addr()
    }

    /// Run the gateway, accepting connections forever.
    #[instrument(skip(self), name = "gateway")]
    pub async fn run(self) -> anyhow::Result<()> {
        loop {
            match self.listener.accept().await {
                Ok((stream, addr)) => {
                    let handle = self.handles.next();
                    info!(%handle, %addr, "Connection accepted");
                    crate::metrics::record_connection();

                    if let Err(e) = stream.set_nodelay(true) {
                        tracing::debug!(%addr, error = %e, "Failed to set TCP_NODELAY");
                    }

                    let session = Session::new(
                        handle.clone(),
                        stream,
                        addr,
                        self.server.clone(),
                        Arc::clone(&self.settings),
                    );

                    tokio::spawn(async move {
                        if let Err(e) = session.run().await {
                            error!(%handle, %addr, error = %e, "Session error");
                        }
                        info!(%handle, %addr, "Connection closed");
                    });
                }
                Err(e) => {
                    error!(error = %e, "Failed to accept connection");
                }
            }
        }
    }
}
