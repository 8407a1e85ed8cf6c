//! Sink trait for terminal upload outcomes.
//!
//! The session core guarantees a complete, ordered payload sequence on
//! success; what happens to it afterwards is a sink concern. The
//! service invokes exactly one sink callback per session.

use bytes::Bytes;

use inlet_core::{digest, TransportError};

use crate::registry::UploadMeta;

/// Consumes terminal upload outcomes.
///
/// Intentionally minimal. No storage abstraction — that's an
/// application concern layered on top of the callbacks.
pub trait UploadSink: Send + Sync {
    /// Called once for a stream that completed with a final chunk.
    /// `payloads` is complete and in arrival order.
    fn on_complete(&self, meta: &UploadMeta, payloads: &[Bytes]);

    /// Called once for a stream that ended in failure or without a
    /// final chunk. `error` is `None` for an incomplete stream.
    fn on_failure(&self, meta: &UploadMeta, error: Option<&TransportError>);
}

/// Sink that logs outcomes — the default collaborator when no consumer
/// is wired in.
pub struct LogSink;

impl UploadSink for LogSink {
    fn on_complete(&self, meta: &UploadMeta, payloads: &[Bytes]) {
        let bytes: u64 = payloads.iter().map(|p| p.len() as u64).sum();
        tracing::info!(
            session_id = hex::encode(&meta.session_id[..8]),
            user = %meta.user,
            chunks = payloads.len(),
            bytes,
            digest = hex::encode(digest::stream_digest(payloads)),
            "upload complete"
        );
    }

    fn on_failure(&self, meta: &UploadMeta, error: Option<&TransportError>) {
        match error {
            Some(err) => tracing::error!(
                session_id = hex::encode(&meta.session_id[..8]),
                user = %meta.user,
                error = %err,
                "upload failed"
            ),
            None => tracing::warn!(
                session_id = hex::encode(&meta.session_id[..8]),
                user = %meta.user,
                "upload ended without a final chunk"
            ),
        }
    }
}
