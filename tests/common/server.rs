//! Test server management.
//!
//! Spawns and manages slchatd instances for integration testing.

use std::path::Path;
use std::process::{Child, Command};
use std::time::Duration;
use tempfile::TempDir;
use tokio::time::sleep;

/// Knobs written into the generated config file.
#[derive(Debug, Clone)]
pub struct ServerOptions {
    pub ping: u64,
    pub timeout: u64,
    pub max_line_len: usize,
    pub sendq: usize,
    pub metrics_port: u16,
}

impl Default for ServerOptions {
    fn default() -> Self {
        Self {
            ping: 90,
            timeout: 120,
            max_line_len: 4096,
            sendq: 64,
            metrics_port: 0,
        }
    }
}

/// A test server instance.
pub struct TestServer {
    child: Child,
    port: u16,
    _data_dir: TempDir,
}

impl TestServer {
    /// Spawn a test server with default options.
    pub async fn spawn(port: u16) -> anyhow::Result<Self> {
        Self::spawn_with(port, ServerOptions::default()).await
    }

    /// Spawn a test server from a generated config file.
    pub async fn spawn_with(port: u16, options: ServerOptions) -> anyhow::Result<Self> {
        let data_dir = tempfile::tempdir()?;
        let config_path = data_dir.path().join("config.toml");
        let config_content = format!(
            r#"
[server]
name = "test.chat"
metrics_port = {metrics_port}

[server.idle_timeouts]
ping = {ping}
timeout = {timeout}

[listen]
address = "127.0.0.1:{port}"

[limits]
max_line_len = {max_line_len}
sendq = {sendq}
mailbox = 1024
"#,
            metrics_port = options.metrics_port,
            ping = options.ping,
            timeout = options.timeout,
            port = port,
            max_line_len = options.max_line_len,
            sendq = options.sendq,
        );
        std::fs::write(&config_path, config_content)?;

        Self::launch(&[config_arg(&config_path)?], port, data_dir).await
    }

    /// Spawn `slchatd --port N` with built-in defaults.
    pub async fn spawn_with_port_flag(port: u16) -> anyhow::Result<Self> {
        let data_dir = tempfile::tempdir()?;
        Self::launch(&["--port".to_string(), port.to_string()], port, data_dir).await
    }

    async fn launch(args: &[String], port: u16, data_dir: TempDir) -> anyhow::Result<Self> {
        let child = Command::new(env!("CARGO_BIN_EXE_slchatd"))
            .args(args)
            .current_dir(data_dir.path())
            .spawn()?;

        let server = Self {
            child,
            port,
            _data_dir: data_dir,
        };

        // Wait for server to start listening
        server.wait_until_ready().await?;

        Ok(server)
    }

    /// Wait until the server is accepting connections.
    async fn wait_until_ready(&self) -> anyhow::Result<()> {
        for _ in 0..50 {
            if tokio::net::TcpStream::connect(("127.0.0.1", self.port))
                .await
                .is_ok()
            {
                return Ok(());
            }
            sleep(Duration::from_millis(100)).await;
        }
        anyhow::bail!("Server failed to start within 5 seconds")
    }

    /// Get the server address.
    pub fn address(&self) -> String {
        format!("127.0.0.1:{}", self.port)
    }

    /// Create a new test client connected to this server.
    pub async fn connect(&self, nick: &str) -> anyhow::Result<super::client::TestClient> {
        super::client::TestClient::connect(&self.address(), nick).await
    }
}

fn config_arg(path: &Path) -> anyhow::Result<String> {
    path.to_str()
        .map(str::to_string)
        .ok_or_else(|| anyhow::anyhow!("config path is not UTF-8: {path:?}"))
}

impl Drop for TestServer {
    fn drop(&mut self) {
        // Kill the server process
        let _ = self.child.kill();
        let _ = self.child.wait();
    }
}
