//! Structured logging helpers.
//!
//! Every session log line carries the same fields so a JSON log pipeline can
//! group them:
//! - `component`: `acceptor`, `session`, `handshake`, `client`
//! - `peer`: remote socket address
//! - `identity`: claimed identity, once known
//! - Additional context fields

/// Open an `info_span` for one connection.
///
/// # Example
///
/// ```rust,ignore
/// use teller_telemetry::session_span;
///
/// let span = session_span!(peer = %addr);
/// tokio::spawn(handle(stream).instrument(span));
/// ```
#[macro_export]
macro_rules! session_span {
    ($($field:tt)*) => {
        tracing::info_span!("session", $($field)*)
    };
}

/// Emit a session event with standard fields.
///
/// ```rust,ignore
/// log_session_event!(warn, "handshake", "Handshake rejected", identity = %id, error = %e);
/// ```
#[macro_export]
macro_rules! log_session_event {
    ($level:ident, $component:expr, $msg:expr $(, $($field:tt)*)?) => {
        tracing::$level!(
            component = $component,
            $($($field)*,)?
            $msg
        )
    };
}
