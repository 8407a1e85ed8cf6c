//! Session registry — tracks active upload sessions.

use std::sync::Arc;
use std::time::Instant;

use dashmap::DashMap;
use tokio::sync::Mutex;

use inlet_core::IngestSession;

/// Stable session identifier, derived at open time.
pub type SessionId = [u8; 32];

/// Immutable metadata about an active upload session.
#[derive(Debug, Clone)]
pub struct UploadMeta {
    pub session_id: SessionId,
    /// The handshake identity this session was opened with.
    pub user: String,
    /// When this session was opened.
    pub opened_at: Instant,
}

/// Mutable per-session state. One mutex guards it so chunk N is fully
/// applied before chunk N+1 is accepted.
pub struct UploadState {
    pub session: IngestSession,
    pub last_activity: Instant,
}

/// An active upload — metadata plus the guarded state machine.
pub struct ActiveUpload {
    pub meta: UploadMeta,
    pub state: Mutex<UploadState>,
}

/// The session table — shared across all tasks.
pub type UploadRegistry = Arc<DashMap<SessionId, ActiveUpload>>;

/// Create a new empty session table.
pub fn new_registry() -> UploadRegistry {
    Arc::new(DashMap::new())
}
