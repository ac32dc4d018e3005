//! Message broadcasting to participants.
//!
//! Fan-out is fire-and-forget: each recipient gets one `try_send`, and a
//! full or closed outbox only costs that recipient this message.

use super::{ChatServer, FanoutReport};
use crate::error::SendFailure;
use crate::state::Handle;
use slchat_proto::ServerMessage;
use tracing::{debug, warn};

impl ChatServer {
    /// Send `(nickname, body)` to every registered participant except `from`.
    pub(crate) fn broadcast(&self, from: &Handle, nickname: &str, body: &str) -> FanoutReport {
        let msg = ServerMessage::chat(nickname, body);
        let mut report = FanoutReport::default();

        for (handle, participant) in self.registry.others(from) {
            match participant.outbox.try_send(msg.clone()) {
                Ok(()) => report.delivered += 1,
                Err(err) => {
                    let failure = SendFailure::from(err);
                    report.failed += 1;
                    crate::metrics::record_send_failure(failure);
                    match failure {
                        SendFailure::Full => {
                            warn!(
                                %handle,
                                nickname = %participant.nickname,
                                "Outbox full, message dropped"
                            )
                        }
                        SendFailure::Closed => {
                            debug!(%handle, "Outbox closed, departure pending")
                        }
                    }
                }
            }
        }

        crate::metrics::record_fanout(report.delivered);
        report
    }
}
