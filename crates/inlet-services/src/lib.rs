//! inlet-services — the service layer around the ingest core:
//! session registry, upload service, sinks, and the record log.

pub mod records;
pub mod registry;
pub mod service;
pub mod sink;

pub use records::{UploadLog, UploadRecord};
pub use registry::{new_registry, ActiveUpload, SessionId, UploadMeta, UploadRegistry, UploadState};
pub use service::{ServiceError, UploadLimits, UploadService, UploadSnapshot};
pub use sink::{LogSink, UploadSink};
