//! Prometheus metrics for the account service.
//!
//! All metrics follow the naming convention: `st_<metric>_<unit>`
//!
//! ## Metric Types
//!
//! - **Counter**: Monotonically increasing value (e.g., sessions_opened_total)
//! - **Gauge**: Value that can go up or down (e.g., sessions_active)

use lazy_static::lazy_static;
use prometheus::{Counter, CounterVec, Encoder, Gauge, Opts, Registry, TextEncoder};

use crate::TelemetryError;

lazy_static! {
    /// Global metrics registry
    pub static ref REGISTRY: Registry = Registry::new();

    // =========================================================================
    // SESSION METRICS
    // =========================================================================

    /// Connections accepted
    pub static ref SESSIONS_OPENED: Counter = Counter::new(
        "st_sessions_opened_total",
        "Total number of connections accepted"
    ).expect("metric creation failed");

    /// Live sessions
    pub static ref SESSIONS_ACTIVE: Gauge = Gauge::new(
        "st_sessions_active",
        "Number of sessions currently being served"
    ).expect("metric creation failed");

    /// Handshake failures by reason
    pub static ref HANDSHAKE_FAILURES: CounterVec = CounterVec::new(
        Opts::new("st_handshake_failures_total", "Rejected or aborted handshakes"),
        &["reason"]  // reason: unknown_identity/invalid_key/nonce_mismatch/malformed/timeout/io
    ).expect("metric creation failed");

    // =========================================================================
    // CHANNEL METRICS
    // =========================================================================

    /// Requests dispatched by action
    pub static ref REQUESTS: CounterVec = CounterVec::new(
        Opts::new("st_requests_total", "Decoded requests dispatched"),
        &["action"]
    ).expect("metric creation failed");

    /// Envelope decode failures by kind
    pub static ref ENVELOPE_ERRORS: CounterVec = CounterVec::new(
        Opts::new("st_envelope_errors_total", "Envelope decode failures"),
        &["kind"]  // kind: truncated/integrity/padding/malformed
    ).expect("metric creation failed");

    /// MAC failures (for alerting)
    pub static ref INTEGRITY_VIOLATIONS: Counter = Counter::new(
        "st_integrity_violations_total",
        "Envelopes rejected for a MAC mismatch"
    ).expect("metric creation failed");
}

/// Handle proving the metrics were registered.
#[derive(Debug)]
pub struct MetricsHandle {
    registered: usize,
}

impl MetricsHandle {
    /// Number of collectors registered by this call.
    pub fn registered(&self) -> usize {
        self.registered
    }
}

/// Register all metrics with the global registry.
///
/// Calling this more than once is harmless: collectors that are already
/// registered are skipped.
pub fn register_metrics() -> Result<MetricsHandle, TelemetryError> {
    let metrics: Vec<Box<dyn prometheus::core::Collector>> = vec![
        Box::new(SESSIONS_OPENED.clone()),
        Box::new(SESSIONS_ACTIVE.clone()),
        Box::new(HANDSHAKE_FAILURES.clone()),
        Box::new(REQUESTS.clone()),
        Box::new(ENVELOPE_ERRORS.clone()),
        Box::new(INTEGRITY_VIOLATIONS.clone()),
    ];

    let mut registered = 0;
    for metric in metrics {
        match REGISTRY.register(metric) {
            Ok(()) => registered += 1,
            Err(prometheus::Error::AlreadyReg) => {}
            Err(e) => return Err(TelemetryError::MetricsInit(e.to_string())),
        }
    }

    Ok(MetricsHandle { registered })
}

/// Encode all metrics as Prometheus text format.
pub fn encode_metrics() -> Result<String, TelemetryError> {
    let encoder = TextEncoder::new();
    let metric_families = REGISTRY.gather();
    let mut buffer = Vec::new();
    encoder
        .encode(&metric_families, &mut buffer)
        .map_err(|e| TelemetryError::MetricsInit(e.to_string()))?;
    String::from_utf8(buffer).map_err(|e| TelemetryError::MetricsInit(e.to_string()))
}

/// Decrements `SESSIONS_ACTIVE` on drop.
#[derive(Debug)]
pub struct ActiveSessionGuard(());

impl ActiveSessionGuard {
    /// Count a new session as opened and active.
    pub fn open() -> Self {
        SESSIONS_OPENED.inc();
        SESSIONS_ACTIVE.inc();
        Self(())
    }
}

impl Drop for ActiveSessionGuard {
    fn drop(&mut self) {
        SESSIONS_ACTIVE.dec();
    }
}
