//! Prometheus metrics collection for slchatd.
//!
//! Metrics are exposed on an HTTP endpoint when `server.metrics_port` is
//! non-zero. Every recording helper is a no-op until [`init`] has run, so
//! the chat server can be exercised in tests without a registry.
//!
//! - `chat_participants` - currently registered participants
//! - `chat_messages_relayed_total` - chat lines accepted for fan-out
//! - `chat_message_fanout` - recipients per broadcast (histogram)
//! - `chat_departures_total{reason}` - removals by trigger
//! - `chat_send_failures_total{error}` - per-recipient delivery failures
//! - `chat_connections_total` - accepted TCP connections

use crate::error::SendFailure;
use prometheus::{
    Encoder, Histogram, HistogramOpts, IntCounter, IntCounterVec, IntGauge, Opts, Registry,
    TextEncoder,
};
use std::sync::OnceLock;

/// Global Prometheus registry for all metrics.
pub static REGISTRY: OnceLock<Registry> = OnceLock::new();

pub fn registry() -> &'static Registry {
    REGISTRY.get_or_init(Registry::new)
}

// ========================================================================
// Counters (monotonic increasing)
// ========================================================================

/// Chat lines accepted for fan-out.
pub static MESSAGES_RELAYED: OnceLock<IntCounter> = OnceLock::new();

/// Accepted client connections.
pub static CONNECTIONS: OnceLock<IntCounter> = OnceLock::new();

/// Participant removals by reason (explicit, connection_lost).
pub static DEPARTURES: OnceLock<IntCounterVec> = OnceLock::new();

/// Per-recipient delivery failures by kind.
pub static SEND_FAILURES: OnceLock<IntCounterVec> = OnceLock::new();

// ========================================================================
// Gauges and histograms
// ========================================================================

/// Currently registered participants.
pub static PARTICIPANTS: OnceLock<IntGauge> = OnceLock::new();

/// Recipients per broadcast.
pub static MESSAGE_FANOUT: OnceLock<Histogram> = OnceLock::new();

/// Initialize the Prometheus metrics registry.
///
/// Must be called once at server startup before any metrics are recorded.
pub fn init() {
    let r = registry();

    macro_rules! register {
        ($metric:ident, $init:expr) => {
            match $init {
                Ok(m) => {
                    if let Err(e) = r.register(Box::new(m.clone())) {
                        tracing::warn!(
                            error = %e,
                            concat!("Failed to register metric ", stringify!($metric))
                        );
                    }
                    let _ = $metric.set(m);
                }
                Err(e) => {
                    tracing::warn!(
                        error = %e,
                        concat!("Failed to create metric ", stringify!($metric))
                    );
                }
            }
        };
    }

    register!(
        MESSAGES_RELAYED,
        IntCounter::new(
            "chat_messages_relayed_total",
            "Chat lines accepted for fan-out"
        )
    );
    register!(
        CONNECTIONS,
        IntCounter::new("chat_connections_total", "Accepted client connections")
    );
    register!(
        DEPARTURES,
        IntCounterVec::new(
            Opts::new("chat_departures_total", "Participant removals by reason"),
            &["reason"]
        )
    );
    register!(
        SEND_FAILURES,
        IntCounterVec::new(
            Opts::new("chat_send_failures_total", "Per-recipient delivery failures"),
            &["error"]
        )
    );
    register!(
        PARTICIPANTS,
        IntGauge::new("chat_participants", "Currently registered participants")
    );
    register!(
        MESSAGE_FANOUT,
        Histogram::with_opts(
            HistogramOpts::new("chat_message_fanout", "Recipients per broadcast").buckets(vec![
                0.0, 1.0, 5.0, 10.0, 25.0, 50.0, 100.0, 250.0, 500.0, 1000.0
            ])
        )
    );
}

/// Gather all metrics and encode them in Prometheus text format.
pub fn gather_metrics() -> String {
    let encoder = TextEncoder::new();
    let metric_families = registry().gather();
    let mut buffer = vec![];
    if let Err(e) = encoder.encode(&metric_families, &mut buffer) {
        tracing::error!(error = %e, "Failed to encode Prometheus metrics");
        return String::new();
    }
    match String::from_utf8(buffer) {
        Ok(s) => s,
        Err(e) => {
            tracing::error!(error = %e, "Prometheus metrics were not valid UTF-8");
            String::new()
        }
    }
}

// ============================================================================
// Recording helpers
// ============================================================================

#[inline]
pub fn record_relayed() {
    if let Some(c) = MESSAGES_RELAYED.get() {
        c.inc();
    }
}

#[inline]
pub fn record_connection() {
    if let Some(c) = CONNECTIONS.get() {
        c.inc();
    }
}

#[inline]
pub fn record_departure(reason: &str) {
    if let Some(c) = DEPARTURES.get() {
        c.with_label_values(&[reason]).inc();
    }
}

#[inline]
pub fn record_send_failure(failure: SendFailure) {
    if let Some(c) = SEND_FAILURES.get() {
        c.with_label_values(&[failure.error_code()]).inc();
    }
}

#[inline]
pub fn set_participants(count: usize) {
    if let Some(g) = PARTICIPANTS.get() {
        g.set(count as i64);
    }
}

/// Record message fan-out (how many recipients received a broadcast).
#[inline]
pub fn record_fanout(recipients: usize) {
    if let Some(h) = MESSAGE_FANOUT.get() {
        h.observe(recipients as f64);
    }
}
