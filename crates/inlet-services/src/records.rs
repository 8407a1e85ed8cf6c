use dashmap::DashMap;
use serde::Serialize;
use std::sync::Arc;

/// Terminal outcome of one upload session, retained for diagnostics.
#[derive(Debug, Clone, Serialize)]
pub struct UploadRecord {
    /// Hex-encoded session id.
    pub session_id: String,
    pub user: String,
    /// "complete", "failed", or "incomplete".
    pub outcome: String,
    pub chunks: usize,
    pub bytes: u64,
    /// BLAKE3 digest of the accumulated payload. Complete uploads only.
    pub digest: Option<String>,
    pub error: Option<String>,
    pub finished_unix_ms: u64,
}

/// In-memory record log, bounded per user.
#[derive(Clone)]
pub struct UploadLog {
    /// Records per user: user -> Vec<UploadRecord>, oldest first.
    records: Arc<DashMap<String, Vec<UploadRecord>>>,
    per_user: usize,
}

impl UploadLog {
    pub fn new(per_user: usize) -> Self {
        Self {
            records: Arc::new(DashMap::new()),
            per_user: per_user.max(1),
        }
    }

    /// Add a record, evicting the oldest once the per-user bound is hit.
    pub fn add(&self, record: UploadRecord) {
        let mut entry = self.records.entry(record.user.clone()).or_default();
        entry.push(record);
        if entry.len() > self.per_user {
            let excess = entry.len() - self.per_user;
            entry.drain(..excess);
        }
    }

    /// All records for one user, oldest first.
    pub fn get(&self, user: &str) -> Vec<UploadRecord> {
        self.records
            .get(user)
            .map(|records| records.clone())
            .unwrap_or_default()
    }

    /// All records across users, most recent first.
    pub fn all(&self) -> Vec<UploadRecord> {
        let mut all: Vec<UploadRecord> = self
            .records
            .iter()
            .flat_map(|entry| entry.value().clone())
            .collect();
        all.sort_by(|a, b| b.finished_unix_ms.cmp(&a.finished_unix_ms));
        all
    }

    /// Look up a record by hex session id.
    pub fn find(&self, session_id: &str) -> Option<UploadRecord> {
        self.records.iter().find_map(|entry| {
            entry
                .value()
                .iter()
                .find(|r| r.session_id == session_id)
                .cloned()
        })
    }

    /// Total records retained.
    pub fn count(&self) -> usize {
        self.records.iter().map(|entry| entry.value().len()).sum()
    }

    /// Drop all records.
    pub fn clear(&self) {
        self.records.clear();
    }
}
