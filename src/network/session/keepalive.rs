//! Idle tracking for the ping keepalive.
//!
//! Two phases: after `interval` without inbound traffic the session sends a
//! ping; if still nothing has arrived `timeout` later the session is closed.
//! Any inbound frame resets both phases.

use std::time::Duration;
use tokio::time::Instant;

/// What to do when the keepalive deadline passes.
#[derive(Debug, PartialEq, Eq)]
pub(super) enum KeepaliveAction {
    /// Send a ping carrying this token.
    SendPing(String),
    /// Ping went unanswered - disconnect.
    TimedOut { idle_secs: u64 },
}

pub(super) struct Keepalive {
    interval: Duration,
    timeout: Duration,
    last_activity: Instant,
    ping_sent_at: Option<Instant>,
    pings_sent: u64,
}

impl Keepalive {
    pub(super) fn new(interval: Duration, timeout: Duration, now: Instant) -> Self {
        Self {
            interval,
            timeout,
            last_activity: now,
            ping_sent_at: None,
            pings_sent: 0,
        }
    }

    /// Record inbound traffic.
    pub(super) fn touch(&mut self, now: Instant) {
        self.last_activity = now;
        self.ping_sent_at = None;
    }

    /// When the session next needs attention.
    pub(super) fn deadline(&self) -> Instant {
        match self.ping_sent_at {
            Some(sent_at) => sent_at + self.timeout,
            None => self.last_activity + self.interval,
        }
    }

    /// Advance past an expired deadline.
    pub(super) fn expire(&mut self, now: Instant) -> KeepaliveAction {
        if self.ping_sent_at.is_some() {
            let idle_secs = now.duration_since(self.last_activity).as_secs();
            return KeepaliveAction::TimedOut { idle_secs };
        }
        self.ping_sent_at = Some(now);
        self.pings_sent += 1;
        KeepaliveAction::SendPing(self.pings_sent.to_string())
    }
}
