//! Per-connection session loop.
//!
//! ```text
//! handshake ──► loop { read envelope ─► decode ─► dispatch ─► encode reply }
//!     │                          │
//!     └─ any error: close        ├─ truncated / padding / malformed: encrypted error reply
//!                                └─ tampered, timeout, oversized: close
//! ```

use shared_types::{AccountRequest, AccountResponse, Identity};
use st_01_secure_channel::{SecureStream, SessionError};
use teller_telemetry::{
    log_session_event, metric_inc, ActiveSessionGuard, ENVELOPE_ERRORS, HANDSHAKE_FAILURES,
    INTEGRITY_VIOLATIONS,
};
use tokio::io::{AsyncRead, AsyncWrite};

use super::dispatcher::Dispatcher;
use crate::container::TellerServices;

/// How a session that got past the handshake ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionSummary {
    pub identity: Identity,
    pub requests: u64,
}

/// Serve one connection until the peer leaves or breaks the protocol.
///
/// Returns `Err` for a failed handshake or a fatal error afterwards; the
/// caller only has to drop the connection.
pub async fn run_session<R, W>(
    reader: R,
    writer: W,
    services: &TellerServices,
) -> Result<SessionSummary, SessionError>
where
    R: AsyncRead + Unpin,
    W: AsyncWrite + Unpin,
{
    let (identity, mut stream) =
        match SecureStream::accept(reader, writer, services.key_store.as_ref(), &services.limits)
            .await
        {
            Ok(accepted) => accepted,
            Err(e) => {
                metric_inc!(HANDSHAKE_FAILURES, &[e.kind()]);
                log_session_event!(warn, "handshake", "Handshake rejected", error = %e);
                return Err(e);
            }
        };

    let _active = ActiveSessionGuard::open();
    log_session_event!(info, "session", "Session established", identity = %identity);

    let dispatcher = Dispatcher::new(
        services.ledger.clone(),
        services.audit_sink.clone(),
        services.audit_reader.clone(),
    );
    let mut requests = 0u64;

    loop {
        let raw = match stream.recv_raw().await {
            Ok(raw) => raw,
            Err(SessionError::ConnectionClosed) => break,
            Err(e) => return Err(closing(&identity, e)),
        };

        let response = match stream.open::<AccountRequest>(&raw) {
            Ok(request) => {
                requests += 1;
                dispatcher.dispatch(&identity, &request).await
            }
            Err(e) if !e.is_fatal() => {
                metric_inc!(ENVELOPE_ERRORS, &[e.kind()]);
                log_session_event!(warn, "session", "Rejected request", identity = %identity, error = %e);
                AccountResponse::new(e.to_string())
            }
            Err(e) => return Err(closing(&identity, e)),
        };

        stream.send(&response).await.map_err(|e| closing(&identity, e))?;
    }

    log_session_event!(info, "session", "Session closed", identity = %identity, requests);
    Ok(SessionSummary { identity, requests })
}

fn closing(identity: &Identity, err: SessionError) -> SessionError {
    if err == SessionError::IntegrityViolation {
        metric_inc!(INTEGRITY_VIOLATIONS);
        log_session_event!(error, "session", "Integrity violation, closing session", identity = %identity);
    } else {
        log_session_event!(warn, "session", "Closing session", identity = %identity, error = %err);
    }
    err
}
