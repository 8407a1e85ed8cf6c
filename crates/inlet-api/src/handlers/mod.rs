//! HTTP API handlers — the transport boundary over the upload service.

pub mod records;
pub mod status;
pub mod uploads;

use std::sync::Arc;
use std::time::Instant;

use axum::http::StatusCode;

use inlet_core::TransportError;
use inlet_services::{ServiceError, SessionId, UploadService};

#[derive(Clone)]
pub struct ApiState {
    pub service: Arc<UploadService>,
    /// When the daemon started, for uptime reporting.
    pub started_at: Instant,
    /// Shutdown broadcast sender — signals graceful daemon shutdown.
    pub shutdown_tx: tokio::sync::broadcast::Sender<()>,
}

// ── Shared helpers ────────────────────────────────────────────────────────────

/// Parse a hex-encoded 32-byte session ID.
fn parse_session_id(hex_str: &str) -> Result<SessionId, (StatusCode, String)> {
    let bytes =
        hex::decode(hex_str).map_err(|_| (StatusCode::BAD_REQUEST, "invalid hex".to_string()))?;
    if bytes.len() != 32 {
        return Err((
            StatusCode::BAD_REQUEST,
            "session_id must be 32 bytes".to_string(),
        ));
    }
    let mut arr = [0u8; 32];
    arr.copy_from_slice(&bytes);
    Ok(arr)
}

/// Map service errors onto HTTP statuses: missing sessions are 404,
/// caller contract violations are 409, rejected deliveries are 4xx
/// with the transport error already recorded against the session.
fn service_error(err: ServiceError) -> (StatusCode, String) {
    match err {
        ServiceError::NotFound => (StatusCode::NOT_FOUND, "session not found".to_string()),
        ServiceError::Session(e) => (StatusCode::CONFLICT, e.to_string()),
        ServiceError::Rejected(e) => match e {
            TransportError::OverLimit { .. } => (StatusCode::PAYLOAD_TOO_LARGE, e.to_string()),
            _ => (StatusCode::BAD_REQUEST, e.to_string()),
        },
    }
}

// Re-export handler functions for use in router setup.
pub use records::handle_records;
pub use status::{handle_shutdown, handle_status};
pub use uploads::{
    handle_upload_abort, handle_upload_chunk, handle_upload_finalize, handle_upload_inspect,
    handle_upload_list, handle_upload_open,
};
