//! Session - one task per accepted connection.
//!
//! A session owns the socket and the receiving half of its outbox. It
//! forwards decoded requests to the chat server, writes queued relays back
//! to the client, and runs the ping keepalive. When the task ends for any
//! reason the outbox receiver is dropped, which is what the liveness
//! monitor watches for.

mod error_handling;
mod keepalive;

use crate::config::Config;
use crate::error::ServerGone;
use crate::server::ChatServerHandle;
use crate::state::{Handle, Outbox};
use error_handling::{ReadErrorAction, classify_read_error};
use futures_util::{SinkExt, StreamExt};
use keepalive::{Keepalive, KeepaliveAction};
use slchat_proto::{ClientMessage, ProtocolError, ServerCodec, ServerMessage};
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tokio::net::TcpStream;
use tokio::sync::mpsc;
use tokio::time::Instant;
use tokio_util::codec::{FramedRead, FramedWrite};
use tracing::{debug, info, instrument, trace, warn};

/// Upper bound on a single outbound frame; a peer list grows with membership.
const MAX_OUTBOUND_LINE_LEN: usize = 1 << 20;

/// Per-session limits, shared by every session the gateway spawns.
#[derive(Debug, Clone)]
pub struct SessionSettings {
    /// Maximum inbound line length in bytes.
    pub max_line_len: usize,
    /// Outbox capacity.
    pub sendq: usize,
    /// Idle time before a ping is sent.
    pub ping_interval: Duration,
    /// Time allowed after a ping before disconnect.
    pub ping_timeout: Duration,
}

impl SessionSettings {
    pub fn from_config(config: &Config) -> Self {
        Self {
            max_line_len: config.limits.max_line_len,
            sendq: config.limits.sendq,
            ping_interval: Duration::from_secs(config.server.idle_timeouts.ping),
            ping_timeout: Duration::from_secs(config.server.idle_timeouts.timeout),
        }
    }
}

/// What the loop does after one select round.
enum Step {
    Continue,
    Write(ServerMessage),
    Close(Option<ServerMessage>),
}

/// A client session.
pub struct Session {
    handle: Handle,
    stream: TcpStream,
    addr: SocketAddr,
    server: ChatServerHandle,
    settings: Arc<SessionSettings>,
}

impl Session {
    pub fn new(
        handle: Handle,
        stream: TcpStream,
        addr: SocketAddr,
        server: ChatServerHandle,
        settings: Arc<SessionSettings>,
    ) -> Self {
        Self {
            handle,
            stream,
            addr,
            server,
            settings,
        }
    }

    /// Run the session until the client leaves, disconnects, or times out.
    #[instrument(skip(self), fields(handle = %self.handle, addr = %self.addr), name = "session")]
    pub async fn run(self) -> anyhow::Result<()> {
        let Self {
            handle,
            stream,
            server,
            settings,
            ..
        } = self;

        let (read_half, write_half) = stream.into_split();
        let mut reader = FramedRead::new(
            read_half,
            ServerCodec::with_max_len(settings.max_line_len),
        );
        let mut writer = FramedWrite::new(
            write_half,
            ServerCodec::with_max_len(MAX_OUTBOUND_LINE_LEN),
        );

        // Relays from the chat server land here; the receiver lives exactly
        // as long as this task.
        let (outbox, mut outbox_rx) = mpsc::channel::<ServerMessage>(settings.sendq);
        let mut keepalive = Keepalive::new(
            settings.ping_interval,
            settings.ping_timeout,
            Instant::now(),
        );

        loop {
            let step = tokio::select! {
                result = reader.next() => {
                    keepalive.touch(Instant::now());
                    match result {
                        Some(Ok(Ok(msg))) => handle_request(&handle, &server, &outbox, msg).await,
                        Some(Ok(Err(e))) | Some(Err(e)) => handle_read_error(&e),
                        None => {
                            info!("Client disconnected");
                            Step::Close(None)
                        }
                    }
                }

                Some(msg) = outbox_rx.recv() => Step::Write(msg),

                _ = tokio::time::sleep_until(keepalive.deadline()) => {
                    match keepalive.expire(Instant::now()) {
                        KeepaliveAction::SendPing(token) => {
                            debug!(%token, "Sending ping to idle client");
                            Step::Write(ServerMessage::Ping { token })
                        }
                        KeepaliveAction::TimedOut { idle_secs } => {
                            warn!(idle_secs, "Ping timeout - disconnecting");
                            Step::Close(Some(ServerMessage::error(format!(
                                "Ping timeout: {idle_secs} seconds"
                            ))))
                        }
                    }
                }
            };

            match step {
                Step::Continue => continue,
                Step::Write(msg) => {
                    if let Err(e) = writer.send(msg).await {
                        debug!(error = %e, "Write error");
                        break;
                    }
                }
                Step::Close(last) => {
                    if let Some(msg) = last {
                        let _ = writer.send(msg).await;
                    }
                    break;
                }
            }
        }

        Ok(())
    }
}

/// Forward one decoded request to the chat server.
async fn handle_request(
    handle: &Handle,
    server: &ChatServerHandle,
    outbox: &Outbox,
    msg: ClientMessage,
) -> Step {
    trace!(kind = msg.kind(), "Request");

    let result = match msg {
        ClientMessage::Join { nickname } => {
            debug!(%nickname, "Join");
            server
                .join(handle.clone(), nickname, outbox.clone())
                .await
                .map(|()| Step::Continue)
        }
        ClientMessage::Chat { nickname, body } => server
            .chat(handle.clone(), nickname, body)
            .await
            .map(|()| Step::Continue),
        ClientMessage::Leave { body } => server.leave(handle.clone(), body).await.map(|()| {
            info!("Client left");
            Step::Close(None)
        }),
        ClientMessage::List => server
            .list()
            .await
            .map(|nicknames| Step::Write(ServerMessage::PeerList { nicknames })),
        ClientMessage::Pong { token } => {
            trace!(%token, "Pong");
            Ok(Step::Continue)
        }
    };

    result.unwrap_or_else(|ServerGone| {
        info!("Chat server stopped - closing session");
        Step::Close(None)
    })
}

fn handle_read_error(e: &ProtocolError) -> Step {
    match classify_read_error(e) {
        ReadErrorAction::InputTooLong => {
            warn!(error = %e, "Input line too long - client stays connected");
            Step::Write(ServerMessage::error(e.to_string()))
        }
        ReadErrorAction::FatalProtocolError { error_msg } => {
            warn!(error = %error_msg, "Protocol error");
            Step::Close(Some(ServerMessage::error(error_msg)))
        }
        ReadErrorAction::IoError => {
            debug!(error = %e, "I/O error");
            Step::Close(None)
        }
    }
}
