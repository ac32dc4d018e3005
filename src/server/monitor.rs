//! Liveness monitor.
//!
//! Each joined handle gets one watch: a task parked on its outbox's
//! `closed()` future. When the session task ends (clean close, peer crash,
//! network drop, ping timeout) the receiving half is dropped, the watch
//! fires, and a [`ServerEvent::Departure`] lands in the server mailbox.
//!
//! The monitor never touches the registry. It only decides whether a fired
//! watch is still the current one for its handle; everything else goes
//! through the same removal path as an explicit leave.

use super::ServerEvent;
use crate::state::{Handle, Outbox};
use std::collections::HashMap;
use tokio::sync::mpsc;
use tokio::task::AbortHandle;
use tracing::trace;

/// Identifies one watch; a re-join under the same handle gets a new id.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct WatchId(u64);

struct Watch {
    id: WatchId,
    task: AbortHandle,
}

pub struct Monitor {
    watches: HashMap<Handle, Watch>,
    next_id: u64,
    /// Weak so that outstanding watches do not keep the server alive.
    events: mpsc::WeakSender<ServerEvent>,
}

impl Monitor {
    pub fn new(events: mpsc::WeakSender<ServerEvent>) -> Self {
        Self {
            watches: HashMap::new(),
            next_id: 0,
            events,
        }
    }

    /// Start watching `outbox` on behalf of `handle`.
    ///
    /// Replaces (and cancels) any watch already bound to the handle.
    pub fn watch(&mut self, handle: Handle, outbox: &Outbox) -> WatchId {
        let id = WatchId(self.next_id);
        self.next_id += 1;

        let outbox = outbox.clone();
        let events = self.events.clone();
        let watched = handle.clone();
        let task = tokio::spawn(async move {
            outbox.closed().await;
            if let Some(tx) = events.upgrade() {
                let _ = tx
                    .send(ServerEvent::Departure {
                        handle: watched,
                        watch: id,
                    })
                    .await;
            }
        });

        if let Some(previous) = self.watches.insert(
            handle,
            Watch {
                id,
                task: task.abort_handle(),
            },
        ) {
            previous.task.abort();
        }
        id
    }

    /// Cancel the watch for `handle`. Returns `false` if there was none.
    pub fn unwatch(&mut self, handle: &Handle) -> bool {
        match self.watches.remove(handle) {
            Some(watch) => {
                watch.task.abort();
                true
            }
            None => false,
        }
    }

    /// Consume a fired watch.
    ///
    /// Returns `true` if `id` is still the live watch for `handle`, in which
    /// case the watch is dropped. A stale fire (the handle left explicitly
    /// or re-joined since) returns `false` and changes nothing.
    pub fn fired(&mut self, handle: &Handle, id: WatchId) -> bool {
        match self.watches.get(handle) {
            Some(watch) if watch.id == id => {
                self.watches.remove(handle);
                true
            }
            _ => {
                trace!(%handle, ?id, "Stale watch fire ignored");
                false
            }
        }
    }

    pub fn len(&self) -> usize {
        self.watches.len()
    }
}

impl Drop for Monitor {
    fn drop(&mut self) {
        for (_, watch) in self.watches.drain() {
            watch.task.abort();
        }
    }
}
