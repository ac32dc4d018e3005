//! slchatd - Straylight Chat Daemon
//!
//! A membership-aware broadcast relay: every line a participant sends is
//! delivered to everyone else who is connected.

mod config;
mod error;
mod http;
mod metrics;
mod network;
mod server;
mod state;

use crate::config::Config;
use crate::network::{Gateway, SessionSettings};
use crate::server::ChatServer;
use anyhow::Context;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

/// Config file read when no arguments are given.
const DEFAULT_CONFIG_PATH: &str = "config.toml";

/// Parsed command line.
#[derive(Debug, Default, PartialEq, Eq)]
struct Args {
    config: Option<String>,
    port: Option<u16>,
}

/// Accepts `[CONFIG] [PORT]`, `--port N` and `-p N` in any combination.
fn parse_args<I: IntoIterator<Item = String>>(args: I) -> anyhow::Result<Args> {
    let mut parsed = Args::default();
    let mut positional = Vec::new();
    let mut iter = args.into_iter();

    while let Some(arg) = iter.next() {
        match arg.as_str() {
            "-p" | "--port" => {
                let value = iter.next().with_context(|| format!("{arg} requires a value"))?;
                parsed.port = Some(parse_port(&value)?);
            }
            _ => positional.push(arg),
        }
    }

    let mut positional = positional.into_iter();
    parsed.config = positional.next();
    if let Some(port) = positional.next() {
        parsed.port = Some(parse_port(&port)?);
    }
    if let Some(extra) = positional.next() {
        anyhow::bail!("unexpected argument: {extra}");
    }
    Ok(parsed)
}

fn parse_port(value: &str) -> anyhow::Result<u16> {
    value
        .parse()
        .with_context(|| format!("invalid port: {value}"))
}

fn load_config(args: &Args) -> anyhow::Result<Config> {
    let config = match (&args.config, args.port) {
        (None, Some(port)) => Config::with_port(port),
        (path, port) => {
            let path = path.as_deref().unwrap_or(DEFAULT_CONFIG_PATH);
            let mut config = Config::load(path).map_err(|e| {
                error!(path = %path, error = %e, "Failed to load config");
                e
            })?;
            if let Some(port) = port {
                config.override_port(port);
            }
            config
        }
    };

    if let Err(errors) = config::validate(&config) {
        for e in &errors {
            error!(error = %e, "Invalid configuration");
        }
        anyhow::bail!("configuration has {} error(s)", errors.len());
    }
    Ok(config)
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_target(true)
        .init();

    let args = parse_args(std::env::args().skip(1))?;
    let config = load_config(&args)?;

    info!(
        server = %config.server.name,
        listen = %config.listen.address,
        "Starting slchatd"
    );

    // Prometheus endpoint
    if let Some(port) = config.metrics_port() {
        metrics::init();
        tokio::spawn(http::run_http_server(port));
    }

    let server = ChatServer::spawn(config.limits.mailbox);
    let gateway = Gateway::bind(
        config.listen.address,
        server,
        SessionSettings::from_config(&config),
    )
    .await?;
    info!(address = %gateway.local_addr()?, "Accepting connections");

    tokio::select! {
        result = gateway.run() => result?,
        result = tokio::signal::ctrl_c() => {
            result.context("failed to listen for shutdown signal")?;
            info!("Shutdown signal received");
        }
    }

    Ok(())
}
