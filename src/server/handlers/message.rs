//! CHAT handling.

use super::{ChatServer, FanoutReport};
use crate::state::Handle;
use tracing::debug;

impl ChatServer {
    /// Relay a chat line from `handle` to everyone else.
    ///
    /// A sender that is no longer registered (it raced its own removal) is
    /// dropped silently and `None` is returned.
    pub(crate) fn handle_chat(
        &self,
        handle: &Handle,
        nickname: &str,
        body: &str,
    ) -> Option<FanoutReport> {
        if !self.registry.contains(handle) {
            debug!(%handle, "Chat from unregistered session dropped");
            return None;
        }

        crate::metrics::record_relayed();
        let report = self.broadcast(handle, nickname, body);
        debug!(%handle, delivered = report.delivered, failed = report.failed, "Chat relayed");
        Some(report)
    }
}
