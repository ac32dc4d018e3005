//! JOIN handling.

use super::{ChatServer, WatchId};
use crate::state::{Handle, Outbox};
use tracing::{debug, info};

impl ChatServer {
    /// Register `handle` and bind a liveness watch to its outbox.
    ///
    /// Last write wins on a duplicate handle; no broadcast either way.
    pub(crate) fn handle_join(
        &mut self,
        handle: Handle,
        nickname: String,
        outbox: Outbox,
    ) -> WatchId {
        let watch = self.monitor.watch(handle.clone(), &outbox);
        let is_new = self.registry.join(handle.clone(), nickname.clone(), outbox);

        if is_new {
            info!(%handle, %nickname, participants = self.registry.len(), "Participant joined");
            crate::metrics::set_participants(self.registry.len());
        } else {
            debug!(%handle, %nickname, "Participant re-joined, nickname updated");
        }
        watch
    }
}
