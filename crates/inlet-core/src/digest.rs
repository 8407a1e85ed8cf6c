//! Content digests and session-id derivation.

use bytes::Bytes;

/// BLAKE3 digest of a byte slice.
pub fn hash(data: &[u8]) -> [u8; 32] {
    *blake3::hash(data).as_bytes()
}

/// Digest of an ordered payload sequence, hashed as one logical stream.
pub fn stream_digest(payloads: &[Bytes]) -> [u8; 32] {
    let mut hasher = blake3::Hasher::new();
    for payload in payloads {
        hasher.update(payload);
    }
    *hasher.finalize().as_bytes()
}

/// Derive a session id from the handshake user, the open timestamp,
/// and a process-wide counter.
pub fn session_id(user: &str, unix_ms: u64, counter: u64) -> [u8; 32] {
    let mut hasher = blake3::Hasher::new();
    hasher.update(user.as_bytes());
    hasher.update(&unix_ms.to_le_bytes());
    hasher.update(&counter.to_le_bytes());
    *hasher.finalize().as_bytes()
}
