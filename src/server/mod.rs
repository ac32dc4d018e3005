//! Actor Model for the Chat Server.
//!
//! The `ChatServer` owns the participant registry and the liveness monitor
//! in a single Tokio task and processes [`ServerEvent`]s one at a time.
//!
//! # Architecture
//!
//! - **State Ownership**: only the server task touches the `Registry`; no lock
//!   is needed and no operation observes another half-applied.
//! - **Message Passing**: sessions talk to the server through a cloneable
//!   [`ChatServerHandle`]; the monitor feeds departures into the same mailbox.
//! - **Fan-out**: broadcasts are decided and sent inside the event that
//!   triggered them, against the registry as it is at that moment.

mod handlers;
mod monitor;
mod types;

pub use monitor::{Monitor, WatchId};
pub use types::*;

use crate::error::ServerGone;
use crate::state::{Handle, Outbox, Registry};
use tokio::sync::{mpsc, oneshot};
use tracing::{debug, info, trace};

/// The Chat Server actor.
pub struct ChatServer {
    registry: Registry,
    monitor: Monitor,
}

impl ChatServer {
    fn new(events: mpsc::WeakSender<ServerEvent>) -> Self {
        Self {
            registry: Registry::new(),
            monitor: Monitor::new(events),
        }
    }

    /// Create a new Chat Server and spawn it.
    ///
    /// The task runs until every [`ChatServerHandle`] has been dropped.
    pub fn spawn(mailbox: usize) -> ChatServerHandle {
        let (tx, rx) = mpsc::channel(mailbox);
        let server = Self::new(tx.downgrade());

        tokio::spawn(async move {
            server.run(rx).await;
        });

        ChatServerHandle { tx }
    }

    /// The main actor loop.
    pub async fn run(mut self, mut rx: mpsc::Receiver<ServerEvent>) {
        while let Some(event) = rx.recv().await {
            trace!(event = event.kind(), "Processing event");
            self.handle_event(event);
        }
        info!(
            participants = self.registry.len(),
            watches = self.monitor.len(),
            "Chat server stopped"
        );
    }

    fn handle_event(&mut self, event: ServerEvent) {
        match event {
            ServerEvent::Join {
                handle,
                nickname,
                outbox,
            } => {
                self.handle_join(handle, nickname, outbox);
            }
            ServerEvent::Chat {
                handle,
                nickname,
                body,
            } => {
                self.handle_chat(&handle, &nickname, &body);
            }
            ServerEvent::Leave { handle, body } => {
                self.handle_leave(&handle, &body);
            }
            ServerEvent::Departure { handle, watch } => {
                self.handle_departure(&handle, watch);
            }
            ServerEvent::List { reply_tx } => {
                let nicknames = self.handle_list();
                if reply_tx.send(nicknames).is_err() {
                    debug!("List requester went away before reply");
                }
            }
        }
    }
}

/// Cloneable front door to a running [`ChatServer`].
#[derive(Debug, Clone)]
pub struct ChatServerHandle {
    tx: mpsc::Sender<ServerEvent>,
}

impl ChatServerHandle {
    async fn send(&self, event: ServerEvent) -> Result<(), ServerGone> {
        self.tx.send(event).await.map_err(|_| ServerGone)
    }

    /// Register `handle` under `nickname`; broadcasts will be queued on `outbox`.
    pub async fn join(
        &self,
        handle: Handle,
        nickname: String,
        outbox: Outbox,
    ) -> Result<(), ServerGone> {
        self.send(ServerEvent::Join {
            handle,
            nickname,
            outbox,
        })
        .await
    }

    /// Relay `body` to every participant except `handle`.
    pub async fn chat(
        &self,
        handle: Handle,
        nickname: String,
        body: String,
    ) -> Result<(), ServerGone> {
        self.send(ServerEvent::Chat {
            handle,
            nickname,
            body,
        })
        .await
    }

    /// Remove `handle` and broadcast `body` as its farewell.
    pub async fn leave(&self, handle: Handle, body: String) -> Result<(), ServerGone> {
        self.send(ServerEvent::Leave { handle, body }).await
    }

    /// Snapshot of connected nicknames, in join order.
    pub async fn list(&self) -> Result<Vec<String>, ServerGone> {
        let (reply_tx, reply_rx) = oneshot::channel();
        self.send(ServerEvent::List { reply_tx }).await?;
        reply_rx.await.map_err(|_| ServerGone)
    }
}
