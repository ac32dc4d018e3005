//! Participant registry.
//!
//! The authoritative `handle → nickname` map. It is owned by the chat server
//! task and never shared, so every operation sees a consistent snapshot
//! without locking.

use super::Handle;
use crate::error::RegistryError;
use slchat_proto::ServerMessage;
use std::collections::HashMap;
use tokio::sync::mpsc;

/// Sending half of a session's outgoing queue.
pub type Outbox = mpsc::Sender<ServerMessage>;

/// A registered participant.
#[derive(Debug)]
pub struct Participant {
    pub nickname: String,
    pub outbox: Outbox,
    /// Join order; kept across a re-join so `list` stays stable.
    joined: u64,
}

/// Mapping of connected handles to participants.
#[derive(Debug, Default)]
pub struct Registry {
    participants: HashMap<Handle, Participant>,
    next_seq: u64,
}

impl Registry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or overwrite the entry for `handle`.
    ///
    /// A second join from the same handle replaces nickname and outbox in
    /// place. Returns `true` if the handle was not registered before.
    pub fn join(&mut self, handle: Handle, nickname: String, outbox: Outbox) -> bool {
        if let Some(existing) = self.participants.get_mut(&handle) {
            existing.nickname = nickname;
            existing.outbox = outbox;
            return false;
        }

        let joined = self.next_seq;
        self.next_seq += 1;
        self.participants.insert(
            handle,
            Participant {
                nickname,
                outbox,
                joined,
            },
        );
        true
    }

    /// Remove `handle`, returning the nickname it was registered under.
    pub fn leave(&mut self, handle: &Handle) -> Result<String, RegistryError> {
        self.participants
            .remove(handle)
            .map(|p| p.nickname)
            .ok_or_else(|| RegistryError::NotFound(handle.clone()))
    }

    /// Snapshot of all nicknames, in join order.
    pub fn list(&self) -> Vec<String> {
        let mut entries: Vec<&Participant> = self.participants.values().collect();
        entries.sort_by_key(|p| p.joined);
        entries.into_iter().map(|p| p.nickname.clone()).collect()
    }

    /// Every participant except `handle`: the fan-out set for its messages.
    pub fn others<'a>(
        &'a self,
        handle: &'a Handle,
    ) -> impl Iterator<Item = (&'a Handle, &'a Participant)> + 'a {
        self.participants.iter().filter(move |(h, _)| *h != handle)
    }

    pub fn contains(&self, handle: &Handle) -> bool {
        self.participants.contains_key(handle)
    }

    pub fn len(&self) -> usize {
        self.participants.len()
    }
}
