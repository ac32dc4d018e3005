//! LEAVE and connection-loss handling.
//!
//! Both triggers funnel into [`ChatServer::depart`]; only the reason tag and
//! the farewell text differ.

use super::{ChatServer, DepartureReason, FanoutReport, WatchId};
use crate::error::RegistryError;
use crate::state::Handle;
use tracing::{debug, info};

impl ChatServer {
    /// Explicit leave with a farewell body.
    pub(crate) fn handle_leave(&mut self, handle: &Handle, body: &str) -> Option<FanoutReport> {
        self.depart(handle, DepartureReason::Explicit, body)
    }

    /// A liveness watch fired. Equivalent to a leave with an empty farewell.
    pub(crate) fn handle_departure(
        &mut self,
        handle: &Handle,
        watch: WatchId,
    ) -> Option<FanoutReport> {
        if !self.monitor.fired(handle, watch) {
            return None;
        }
        self.depart(handle, DepartureReason::ConnectionLost, "")
    }

    /// Remove `handle` and broadcast `farewell` under its last known nickname.
    ///
    /// Returns `None` when the handle was already gone; that suppresses the
    /// farewell, so a leave racing a connection loss yields one broadcast.
    pub(crate) fn depart(
        &mut self,
        handle: &Handle,
        reason: DepartureReason,
        farewell: &str,
    ) -> Option<FanoutReport> {
        let nickname = match self.registry.leave(handle) {
            Ok(nickname) => nickname,
            Err(RegistryError::NotFound(_)) => {
                debug!(
                    %handle,
                    reason = reason.as_str(),
                    "Departure for unknown participant ignored"
                );
                return None;
            }
        };

        if reason == DepartureReason::Explicit {
            self.monitor.unwatch(handle);
        }

        info!(
            %handle,
            %nickname,
            reason = reason.as_str(),
            participants = self.registry.len(),
            "Participant departed"
        );
        crate::metrics::record_departure(reason.as_str());
        crate::metrics::set_participants(self.registry.len());

        Some(self.broadcast(handle, &nickname, farewell))
    }
}
