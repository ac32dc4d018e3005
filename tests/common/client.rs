//! Test chat client.
//!
//! Speaks the line protocol directly so tests can send malformed input
//! and assert on every frame the server writes.

use slchat_proto::{ClientMessage, ServerMessage};
use std::time::Duration;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader, BufWriter};
use tokio::net::TcpStream;
use tokio::net::tcp::{OwnedReadHalf, OwnedWriteHalf};
use tokio::time::timeout;

/// A test chat client.
pub struct TestClient {
    reader: BufReader<OwnedReadHalf>,
    writer: BufWriter<OwnedWriteHalf>,
    nick: String,
}

impl TestClient {
    /// Connect to a test server.
    pub async fn connect(address: &str, nick: &str) -> anyhow::Result<Self> {
        let stream = TcpStream::connect(address).await?;

        let (read_half, write_half) = stream.into_split();
        let reader = BufReader::new(read_half);
        let writer = BufWriter::new(write_half);

        Ok(Self {
            reader,
            writer,
            nick: nick.to_string(),
        })
    }

    /// Send a raw line; a `\n` terminator is added if missing.
    pub async fn send_raw(&mut self, line: &str) -> anyhow::Result<()> {
        self.writer.write_all(line.as_bytes()).await?;
        if !line.ends_with('\n') {
            self.writer.write_all(b"\n").await?;
        }
        self.writer.flush().await?;
        Ok(())
    }

    /// Send a protocol frame.
    pub async fn send(&mut self, msg: ClientMessage) -> anyhow::Result<()> {
        let line = msg.to_json()?;
        self.send_raw(&line).await
    }

    /// Receive a single frame from the server.
    pub async fn recv(&mut self) -> anyhow::Result<ServerMessage> {
        self.recv_timeout(Duration::from_secs(5)).await
    }

    /// Receive a frame with a timeout.
    pub async fn recv_timeout(&mut self, dur: Duration) -> anyhow::Result<ServerMessage> {
        let mut line = String::new();
        let read = timeout(dur, self.reader.read_line(&mut line)).await??;
        if read == 0 {
            anyhow::bail!("connection closed by server");
        }
        line.parse::<ServerMessage>()
            .map_err(|e| anyhow::anyhow!("Parse error: {e} (line: {line:?})"))
    }

    /// Assert nothing arrives for `dur`.
    pub async fn expect_silence(&mut self, dur: Duration) -> anyhow::Result<()> {
        match self.recv_timeout(dur).await {
            Err(e) if e.is::<tokio::time::error::Elapsed>() => Ok(()),
            Err(e) => Err(e),
            Ok(msg) => anyhow::bail!("expected silence, got {msg:?}"),
        }
    }

    /// Assert the server closes the connection within `dur`.
    pub async fn expect_closed(&mut self, dur: Duration) -> anyhow::Result<()> {
        let mut line = String::new();
        let read = timeout(dur, self.reader.read_line(&mut line)).await?;
        match read {
            Ok(0) | Err(_) => Ok(()),
            Ok(_) => anyhow::bail!("expected close, got line {line:?}"),
        }
    }

    /// Join under this client's nickname and wait until the server has it.
    pub async fn join(&mut self) -> anyhow::Result<Vec<String>> {
        self.send(ClientMessage::join(self.nick.clone())).await?;
        self.list().await
    }

    /// Request the peer list and return it.
    pub async fn list(&mut self) -> anyhow::Result<Vec<String>> {
        self.send(ClientMessage::List).await?;
        match self.recv().await? {
            ServerMessage::PeerList { nicknames } => Ok(nicknames),
            other => anyhow::bail!("expected peer_list, got {other:?}"),
        }
    }

    /// Send a chat line under this client's nickname.
    pub async fn chat(&mut self, body: &str) -> anyhow::Result<()> {
        self.send(ClientMessage::chat(self.nick.clone(), body)).await
    }

    /// Send leave with a farewell.
    pub async fn leave(&mut self, body: &str) -> anyhow::Result<()> {
        self.send(ClientMessage::leave(body)).await
    }
}
