//! Network listener configuration.

use serde::Deserialize;
use std::net::{Ipv4Addr, SocketAddr};

/// Network listener configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct ListenConfig {
    /// Address to bind to (e.g., "0.0.0.0:4242").
    pub address: SocketAddr,
}

impl ListenConfig {
    /// Listen on every IPv4 interface at `port`.
    pub fn any(port: u16) -> Self {
        Self {
            address: SocketAddr::from((Ipv4Addr::UNSPECIFIED, port)),
        }
    }
}
