//! UploadService — bridges the transport boundary to the session core.
//!
//! The boundary calls `open` once per stream, `append` once per chunk,
//! and `finalize` exactly once at the end. Delivery failures reported
//! by the boundary (`report_error`, `abort`) and limits enforced here
//! are fed into the core as transport errors; the core decides the
//! terminal result.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant, SystemTime, UNIX_EPOCH};

use tokio::sync::Mutex;

use inlet_core::config::LimitsConfig;
use inlet_core::{
    digest, Chunk, ChunkOutcome, Finalized, Handshake, IngestSession, SessionError, SessionResult,
    SessionStatus, TransportError,
};

use crate::records::{UploadLog, UploadRecord};
use crate::registry::{new_registry, ActiveUpload, SessionId, UploadMeta, UploadRegistry, UploadState};
use crate::sink::UploadSink;

/// Boundary-enforced limits, reported into the core as transport errors.
#[derive(Debug, Clone)]
pub struct UploadLimits {
    pub max_chunk_bytes: u64,
    pub max_session_bytes: u64,
    pub idle_timeout: Duration,
}

impl Default for UploadLimits {
    fn default() -> Self {
        Self::from(&LimitsConfig::default())
    }
}

impl From<&LimitsConfig> for UploadLimits {
    fn from(limits: &LimitsConfig) -> Self {
        Self {
            max_chunk_bytes: limits.max_chunk_bytes,
            max_session_bytes: limits.max_session_bytes,
            idle_timeout: Duration::from_secs(limits.idle_timeout_secs),
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ServiceError {
    #[error("session not found")]
    NotFound,
    /// Caller contract violation — escapes to the boundary as a bug.
    #[error(transparent)]
    Session(SessionError),
    /// Delivery rejected; the error has been recorded against the
    /// session, which is now failed.
    #[error(transparent)]
    Rejected(TransportError),
}

/// Point-in-time view of an active session.
#[derive(Debug, Clone)]
pub struct UploadSnapshot {
    pub meta: UploadMeta,
    pub status: &'static str,
    pub chunks: usize,
    pub bytes: u64,
}

pub struct UploadService {
    registry: UploadRegistry,
    records: UploadLog,
    sink: Arc<dyn UploadSink>,
    limits: UploadLimits,
    counter: AtomicU64,
}

impl UploadService {
    pub fn new(sink: Arc<dyn UploadSink>, limits: UploadLimits, records_per_user: usize) -> Self {
        Self {
            registry: new_registry(),
            records: UploadLog::new(records_per_user),
            sink,
            limits,
            counter: AtomicU64::new(0),
        }
    }

    pub fn records(&self) -> &UploadLog {
        &self.records
    }

    pub fn active_count(&self) -> usize {
        self.registry.len()
    }

    /// Open a session for the given handshake. Returns its id.
    pub fn open(&self, handshake: Handshake) -> SessionId {
        let counter = self.counter.fetch_add(1, Ordering::Relaxed);
        let id = digest::session_id(&handshake.user, unix_ms_now(), counter);
        let meta = UploadMeta {
            session_id: id,
            user: handshake.user.clone(),
            opened_at: Instant::now(),
        };
        tracing::info!(
            session_id = hex::encode(&id[..8]),
            user = %meta.user,
            "upload session opened"
        );
        self.registry.insert(
            id,
            ActiveUpload {
                meta,
                state: Mutex::new(UploadState {
                    session: IngestSession::open(handshake),
                    last_activity: Instant::now(),
                }),
            },
        );
        id
    }

    /// Apply one chunk in arrival order.
    ///
    /// An oversized chunk or session is a delivery failure: the session
    /// transitions to Failed and the recorded error is returned as
    /// `Rejected`. A chunk pushed at a terminal session surfaces the
    /// core's `ProtocolViolation`.
    pub async fn append(&self, id: &SessionId, chunk: Chunk) -> Result<ChunkOutcome, ServiceError> {
        let entry = self.registry.get(id).ok_or(ServiceError::NotFound)?;
        let mut state = entry.state.lock().await;
        state.last_activity = Instant::now();

        if state.session.status() == SessionStatus::Open {
            let len = chunk.payload.len() as u64;
            if len > self.limits.max_chunk_bytes {
                let err = TransportError::OverLimit {
                    limit: self.limits.max_chunk_bytes,
                };
                state.session.fail(err.clone());
                tracing::warn!(
                    session_id = hex::encode(&id[..8]),
                    chunk_bytes = len,
                    "oversized chunk, session failed"
                );
                return Err(ServiceError::Rejected(err));
            }
            if state.session.byte_count() + len > self.limits.max_session_bytes {
                let err = TransportError::OverLimit {
                    limit: self.limits.max_session_bytes,
                };
                state.session.fail(err.clone());
                tracing::warn!(
                    session_id = hex::encode(&id[..8]),
                    "session exceeds byte limit, session failed"
                );
                return Err(ServiceError::Rejected(err));
            }
        }

        let outcome = state.session.accept(chunk).map_err(ServiceError::Session)?;
        tracing::debug!(
            session_id = hex::encode(&id[..8]),
            chunks = state.session.chunk_count(),
            bytes = state.session.byte_count(),
            closed = (outcome == ChunkOutcome::Closed),
            "chunk applied"
        );
        Ok(outcome)
    }

    /// Record a delivery failure reported by the boundary (decode
    /// error, connection reset). The session moves to Failed and stops
    /// accumulating; the first terminal transition wins.
    pub async fn report_error(
        &self,
        id: &SessionId,
        error: TransportError,
    ) -> Result<(), ServiceError> {
        let entry = self.registry.get(id).ok_or(ServiceError::NotFound)?;
        let mut state = entry.state.lock().await;
        state.last_activity = Instant::now();
        tracing::warn!(
            session_id = hex::encode(&id[..8]),
            error = %error,
            "transport failure recorded"
        );
        state.session.fail(error);
        Ok(())
    }

    /// Produce the terminal result, hand the outcome to the sink, and
    /// retire the session. A second finalize of the same session fails
    /// with the core's `InvalidState`.
    pub async fn finalize(&self, id: &SessionId) -> Result<SessionResult, ServiceError> {
        let Some((_, upload)) = self.registry.remove(id) else {
            // already retired — distinguish double finalize from an id
            // that never existed via the record log
            if self.records.find(&hex::encode(id)).is_some() {
                return Err(ServiceError::Session(SessionError::InvalidState));
            }
            return Err(ServiceError::NotFound);
        };
        let mut state = upload.state.into_inner();
        let chunks = state.session.chunk_count();
        let bytes = state.session.byte_count();
        let finalized = state.session.finalize().map_err(ServiceError::Session)?;
        Ok(self.retire(&upload.meta, chunks, bytes, finalized))
    }

    /// Abort a session — client disconnect or explicit cancel. An open
    /// session fails with `Cancelled`; a closed one retires complete
    /// (cancellation only applies while the stream is open).
    pub async fn abort(&self, id: &SessionId) -> Result<SessionResult, ServiceError> {
        let Some((_, upload)) = self.registry.remove(id) else {
            return Err(ServiceError::NotFound);
        };
        let mut state = upload.state.into_inner();
        state.session.fail(TransportError::Cancelled);
        let chunks = state.session.chunk_count();
        let bytes = state.session.byte_count();
        let finalized = state.session.finalize().map_err(ServiceError::Session)?;
        Ok(self.retire(&upload.meta, chunks, bytes, finalized))
    }

    /// Fail and retire sessions with no activity past the idle timeout.
    /// Returns how many were expired.
    pub async fn expire_idle(&self) -> usize {
        let mut stale: Vec<SessionId> = Vec::new();
        for entry in self.registry.iter() {
            // a session whose mutex is held is active by definition
            if let Ok(state) = entry.state.try_lock() {
                if state.last_activity.elapsed() > self.limits.idle_timeout {
                    stale.push(*entry.key());
                }
            }
        }

        let mut expired = 0;
        for id in stale {
            let Some((_, upload)) = self.registry.remove(&id) else {
                continue;
            };
            let mut state = upload.state.into_inner();
            tracing::warn!(
                session_id = hex::encode(&id[..8]),
                user = %upload.meta.user,
                "expiring idle session"
            );
            state
                .session
                .fail(TransportError::IdleTimeout(self.limits.idle_timeout.as_secs()));
            let chunks = state.session.chunk_count();
            let bytes = state.session.byte_count();
            if let Ok(finalized) = state.session.finalize() {
                self.retire(&upload.meta, chunks, bytes, finalized);
                expired += 1;
            }
        }
        expired
    }

    /// Point-in-time view of one active session.
    pub async fn inspect(&self, id: &SessionId) -> Option<UploadSnapshot> {
        let entry = self.registry.get(id)?;
        let state = entry.state.lock().await;
        Some(UploadSnapshot {
            meta: entry.meta.clone(),
            status: state.session.status().as_str(),
            chunks: state.session.chunk_count(),
            bytes: state.session.byte_count(),
        })
    }

    /// Snapshots of all active sessions.
    pub async fn list(&self) -> Vec<UploadSnapshot> {
        let ids: Vec<SessionId> = self.registry.iter().map(|entry| *entry.key()).collect();
        let mut snapshots = Vec::with_capacity(ids.len());
        for id in ids {
            if let Some(snapshot) = self.inspect(&id).await {
                snapshots.push(snapshot);
            }
        }
        snapshots
    }

    /// Dispatch the terminal outcome to the sink and the record log.
    fn retire(
        &self,
        meta: &UploadMeta,
        chunks: usize,
        bytes: u64,
        finalized: Finalized,
    ) -> SessionResult {
        let result = finalized.result();
        let digest = match &finalized {
            Finalized::Complete(payloads) => Some(hex::encode(digest::stream_digest(payloads))),
            _ => None,
        };
        let error = match &finalized {
            Finalized::Failed(err) => Some(err.to_string()),
            _ => None,
        };
        match &finalized {
            Finalized::Complete(payloads) => self.sink.on_complete(meta, payloads),
            Finalized::Failed(err) => self.sink.on_failure(meta, Some(err)),
            Finalized::Incomplete => self.sink.on_failure(meta, None),
        }
        self.records.add(UploadRecord {
            session_id: hex::encode(meta.session_id),
            user: meta.user.clone(),
            outcome: finalized.outcome().to_string(),
            chunks,
            bytes,
            digest,
            error,
            finished_unix_ms: unix_ms_now(),
        });
        result
    }
}

fn unix_ms_now() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_millis() as u64
}
