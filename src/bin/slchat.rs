//! slchat - interactive command-line client for slchatd.
//!
//! Usage: `slchat <nickname> [address]`
//!
//! Every stdin line is sent as chat. `/ls` lists connected peers and
//! `/quit [farewell]` leaves and exits.

use anyhow::Context;
use futures_util::{SinkExt, StreamExt};
use slchat_proto::{ClientCodec, ClientMessage, ServerMessage};
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::net::TcpStream;
use tokio_util::codec::{FramedRead, FramedWrite};
use tracing::warn;
use tracing_subscriber::EnvFilter;

const DEFAULT_ADDRESS: &str = "127.0.0.1:4242";
const DEFAULT_FAREWELL: &str = "bye";

/// Inbound frames are not bounded by the server's request limit.
const MAX_INBOUND_LINE_LEN: usize = 1 << 20;

/// One line of user input.
#[derive(Debug, PartialEq, Eq)]
enum Input<'a> {
    Say(&'a str),
    List,
    Quit(&'a str),
    Empty,
}

impl<'a> Input<'a> {
    fn parse(line: &'a str) -> Self {
        let trimmed = line.trim_end_matches(['\r', '\n']);
        if trimmed.trim().is_empty() {
            Self::Empty
        } else if trimmed == "/ls" {
            Self::List
        } else if let Some(rest) = trimmed.strip_prefix("/quit")
            && (rest.is_empty() || rest.starts_with(' '))
        {
            match rest.trim() {
                "" => Self::Quit(DEFAULT_FAREWELL),
                farewell => Self::Quit(farewell),
            }
        } else {
            Self::Say(trimmed)
        }
    }
}

fn render(msg: &ServerMessage) -> Option<String> {
    match msg {
        ServerMessage::Chat { nickname, body } => Some(format!("{nickname}: {body}")),
        ServerMessage::PeerList { nicknames } => {
            let mut out = String::from("Connected peers:");
            for nickname in nicknames {
                out.push('\n');
                out.push_str(nickname);
            }
            Some(out)
        }
        ServerMessage::Error { message } => Some(format!("server error: {message}")),
        ServerMessage::Ping { .. } => None,
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Logs go to stderr; stdout carries the conversation
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let mut args = std::env::args().skip(1);
    let nickname = args.next().context("usage: slchat <nickname> [address]")?;
    let address = args.next().unwrap_or_else(|| DEFAULT_ADDRESS.to_string());

    let stream = TcpStream::connect(&address)
        .await
        .with_context(|| format!("failed to connect to {address}"))?;
    let (read_half, write_half) = stream.into_split();
    let mut reader = FramedRead::new(
        read_half,
        ClientCodec::with_max_len(MAX_INBOUND_LINE_LEN),
    );
    let mut writer = FramedWrite::new(write_half, ClientCodec::new());

    writer.send(ClientMessage::join(nickname.as_str())).await?;

    let mut stdin = BufReader::new(tokio::io::stdin()).lines();

    loop {
        tokio::select! {
            line = stdin.next_line() => {
                let Some(line) = line? else {
                    // stdin closed: leave as if the user typed /quit
                    writer.send(ClientMessage::leave(DEFAULT_FAREWELL)).await?;
                    return Ok(());
                };
                match Input::parse(&line) {
                    Input::Say(body) => {
                        let msg = ClientMessage::chat(nickname.as_str(), body);
                        match writer.send(msg).await {
                            // Rejected before anything reached the socket
                            Err(e) if e.is_recoverable() => {
                                warn!(error = %e, "Message too long - not sent");
                            }
                            result => result?,
                        }
                    }
                    Input::List => writer.send(ClientMessage::List).await?,
                    Input::Quit(farewell) => {
                        writer.send(ClientMessage::leave(farewell)).await?;
                        return Ok(());
                    }
                    Input::Empty => {}
                }
            }

            frame = reader.next() => match frame {
                Some(Ok(Ok(ServerMessage::Ping { token }))) => {
                    writer.send(ClientMessage::Pong { token }).await?;
                }
                Some(Ok(Ok(msg))) => {
                    if let Some(text) = render(&msg) {
                        println!("{text}");
                    }
                }
                Some(Ok(Err(e))) => warn!(error = %e, "Ignoring unreadable frame"),
                Some(Err(e)) => return Err(e).context("connection failed"),
                None => anyhow::bail!("server closed the connection"),
            },
        }
    }
}
