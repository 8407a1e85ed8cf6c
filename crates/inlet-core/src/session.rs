//! The ingest session state machine.
//!
//! One `IngestSession` owns the state of one client's upload from
//! handshake to completion or failure. The transport boundary pushes
//! chunks in via [`IngestSession::accept`] and asks for the terminal
//! result exactly once via [`IngestSession::finalize`]. The session
//! never performs I/O itself.

use bytes::Bytes;
use serde::{Deserialize, Serialize};

// ── Types ─────────────────────────────────────────────────────────────────────

/// Initial metadata accompanying a stream's opening, supplied once
/// before any chunk. Opaque to the session; validation is the
/// boundary's job.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Handshake {
    pub user: String,
}

/// One unit of streamed payload plus the stream-termination flag.
#[derive(Debug, Clone)]
pub struct Chunk {
    pub payload: Bytes,
    pub is_final: bool,
}

/// Terminal value returned exactly once per session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionResult {
    pub success: bool,
}

/// Session lifecycle state. `Closed` and `Failed` are terminal —
/// no transition leaves them.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionStatus {
    Open,
    Closed,
    Failed,
}

impl SessionStatus {
    pub fn is_terminal(self) -> bool {
        matches!(self, SessionStatus::Closed | SessionStatus::Failed)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            SessionStatus::Open => "open",
            SessionStatus::Closed => "closed",
            SessionStatus::Failed => "failed",
        }
    }
}

// ── Errors ────────────────────────────────────────────────────────────────────

/// A chunk delivery or processing failure reported by the transport.
/// Captured by the session and folded into the terminal result —
/// never surfaced as a fault.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TransportError {
    #[error("connection reset: {0}")]
    ConnectionReset(String),
    #[error("chunk decode failed: {0}")]
    Decode(String),
    #[error("client disconnected before completing the stream")]
    Cancelled,
    #[error("no activity for {0}s, session presumed dead")]
    IdleTimeout(u64),
    #[error("delivery exceeds {limit} byte limit")]
    OverLimit { limit: u64 },
}

/// Caller contract violations. These escape to the caller — they
/// indicate an integration bug, not a data condition.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SessionError {
    #[error("chunk delivered to a {status} session")]
    ProtocolViolation { status: &'static str },
    #[error("finalize called more than once")]
    InvalidState,
}

// ── Outcomes ──────────────────────────────────────────────────────────────────

/// What [`IngestSession::accept`] tells the transport to do next.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChunkOutcome {
    /// Chunk applied; keep delivering.
    Accepted,
    /// Final chunk applied; stop delivering and finalize.
    Closed,
}

/// The terminal disposition produced by [`IngestSession::finalize`].
#[derive(Debug)]
pub enum Finalized {
    /// Stream completed with a final chunk. Payloads are complete and
    /// in arrival order, ready for the sink collaborator.
    Complete(Vec<Bytes>),
    /// A transport or processing error ended the stream. Accumulated
    /// data has been discarded; the error is kept for diagnostics.
    Failed(TransportError),
    /// Stream ended without a final chunk. An expected outcome, not a
    /// defect.
    Incomplete,
}

impl Finalized {
    pub fn result(&self) -> SessionResult {
        SessionResult {
            success: matches!(self, Finalized::Complete(_)),
        }
    }

    /// Short label for record keeping.
    pub fn outcome(&self) -> &'static str {
        match self {
            Finalized::Complete(_) => "complete",
            Finalized::Failed(_) => "failed",
            Finalized::Incomplete => "incomplete",
        }
    }
}

// ── Session ───────────────────────────────────────────────────────────────────

/// State of one client's upload, handshake to terminal result.
pub struct IngestSession {
    handshake: Handshake,
    accumulated: Vec<Bytes>,
    status: SessionStatus,
    failure: Option<TransportError>,
    finalized: bool,
}

impl IngestSession {
    /// Start a session in `Open` with empty accumulation. Never fails;
    /// handshake validation belongs to the boundary.
    pub fn open(handshake: Handshake) -> Self {
        Self {
            handshake,
            accumulated: Vec::new(),
            status: SessionStatus::Open,
            failure: None,
            finalized: false,
        }
    }

    pub fn handshake(&self) -> &Handshake {
        &self.handshake
    }

    pub fn status(&self) -> SessionStatus {
        self.status
    }

    /// Chunks applied so far.
    pub fn chunk_count(&self) -> usize {
        self.accumulated.len()
    }

    /// Accumulated payload bytes so far.
    pub fn byte_count(&self) -> u64 {
        self.accumulated.iter().map(|p| p.len() as u64).sum()
    }

    /// Apply one chunk in arrival order.
    ///
    /// Returns [`ChunkOutcome::Closed`] when the chunk carried the
    /// final flag — the transport must stop delivering after that.
    /// A chunk delivered to a terminal session is a caller bug and is
    /// rejected without being applied.
    pub fn accept(&mut self, chunk: Chunk) -> Result<ChunkOutcome, SessionError> {
        if self.status != SessionStatus::Open {
            return Err(SessionError::ProtocolViolation {
                status: self.status.as_str(),
            });
        }
        self.accumulated.push(chunk.payload);
        if chunk.is_final {
            self.status = SessionStatus::Closed;
            return Ok(ChunkOutcome::Closed);
        }
        Ok(ChunkOutcome::Accepted)
    }

    /// Record a transport failure: `Open -> Failed`.
    ///
    /// Accumulation stops and the data already received is discarded —
    /// the result must reflect failure, not partial success. Reports
    /// against an already-terminal session are dropped; the first
    /// terminal transition wins.
    pub fn fail(&mut self, error: TransportError) {
        if self.status != SessionStatus::Open {
            return;
        }
        self.status = SessionStatus::Failed;
        self.accumulated.clear();
        self.failure = Some(error);
    }

    /// Produce the terminal result. Call exactly once; a second call
    /// fails with [`SessionError::InvalidState`].
    pub fn finalize(&mut self) -> Result<Finalized, SessionError> {
        if self.finalized {
            return Err(SessionError::InvalidState);
        }
        self.finalized = true;
        match self.status {
            SessionStatus::Closed => {
                Ok(Finalized::Complete(std::mem::take(&mut self.accumulated)))
            }
            SessionStatus::Failed => {
                // fail() records the error before entering Failed
                let error = self.failure.take().unwrap_or(TransportError::Cancelled);
                Ok(Finalized::Failed(error))
            }
            SessionStatus::Open => Ok(Finalized::Incomplete),
        }
    }
}
