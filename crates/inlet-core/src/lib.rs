//! inlet-core — the ingest session state machine, shared types, and
//! configuration. All other Inlet crates depend on this one.

pub mod config;
pub mod digest;
pub mod session;

pub use session::{
    Chunk, ChunkOutcome, Finalized, Handshake, IngestSession, SessionError, SessionResult,
    SessionStatus, TransportError,
};
