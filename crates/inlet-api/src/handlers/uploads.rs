//! /uploads handlers — session open, chunk push, finalize, abort,
//! inspect, list.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use bytes::Bytes;
use serde::{Deserialize, Serialize};

use inlet_core::{Chunk, ChunkOutcome, Handshake, TransportError};

use super::{parse_session_id, service_error, ApiState};

// ── /uploads (POST) ───────────────────────────────────────────────────────────

#[derive(Deserialize)]
pub struct OpenRequest {
    pub user: String,
}

#[derive(Serialize)]
pub struct OpenResponse {
    pub session_id: String,
}

pub async fn handle_upload_open(
    State(state): State<ApiState>,
    Json(req): Json<OpenRequest>,
) -> Result<(StatusCode, Json<OpenResponse>), (StatusCode, String)> {
    // handshake validation lives at the boundary, not in the core
    if req.user.trim().is_empty() {
        return Err((StatusCode::BAD_REQUEST, "user must not be empty".to_string()));
    }

    let id = state.service.open(Handshake { user: req.user });
    Ok((
        StatusCode::CREATED,
        Json(OpenResponse {
            session_id: hex::encode(id),
        }),
    ))
}

// ── /uploads/{id}/chunks (POST) ───────────────────────────────────────────────

#[derive(Deserialize)]
pub struct ChunkRequest {
    pub data: String,
    #[serde(default)]
    pub done: bool,
}

#[derive(Serialize)]
pub struct ChunkResponse {
    pub accepted: bool,
    pub closed: bool,
}

/// A body that fails to decode is a delivery failure, not a caller
/// contract violation: the session transitions to Failed and the
/// client still receives its terminal result from finalize.
pub async fn handle_upload_chunk(
    State(state): State<ApiState>,
    Path(session_id): Path<String>,
    body: Bytes,
) -> Result<Json<ChunkResponse>, (StatusCode, String)> {
    let id = parse_session_id(&session_id)?;

    let req: ChunkRequest = match serde_json::from_slice(&body) {
        Ok(req) => req,
        Err(e) => {
            let err = TransportError::Decode(e.to_string());
            state
                .service
                .report_error(&id, err.clone())
                .await
                .map_err(service_error)?;
            return Err((StatusCode::BAD_REQUEST, err.to_string()));
        }
    };

    let chunk = Chunk {
        payload: Bytes::from(req.data.into_bytes()),
        is_final: req.done,
    };
    let outcome = state
        .service
        .append(&id, chunk)
        .await
        .map_err(service_error)?;

    Ok(Json(ChunkResponse {
        accepted: true,
        closed: outcome == ChunkOutcome::Closed,
    }))
}

// ── /uploads/{id}/finalize (POST) ─────────────────────────────────────────────

#[derive(Serialize)]
pub struct FinalizeResponse {
    pub success: bool,
}

pub async fn handle_upload_finalize(
    State(state): State<ApiState>,
    Path(session_id): Path<String>,
) -> Result<Json<FinalizeResponse>, (StatusCode, String)> {
    let id = parse_session_id(&session_id)?;
    let result = state.service.finalize(&id).await.map_err(service_error)?;
    Ok(Json(FinalizeResponse {
        success: result.success,
    }))
}

// ── /uploads/{id} (DELETE) ────────────────────────────────────────────────────

#[derive(Serialize)]
pub struct AbortResponse {
    pub session_id: String,
    pub success: bool,
}

pub async fn handle_upload_abort(
    State(state): State<ApiState>,
    Path(session_id): Path<String>,
) -> Result<Json<AbortResponse>, (StatusCode, String)> {
    let id = parse_session_id(&session_id)?;
    let result = state.service.abort(&id).await.map_err(service_error)?;

    tracing::info!(session_id = %session_id, "session aborted via API");

    Ok(Json(AbortResponse {
        session_id,
        success: result.success,
    }))
}

// ── /uploads/{id} (GET) ───────────────────────────────────────────────────────

#[derive(Serialize)]
pub struct UploadInspectResponse {
    pub session_id: String,
    pub user: String,
    pub status: String,
    pub chunks: usize,
    pub bytes: u64,
    pub open_secs: u64,
}

pub async fn handle_upload_inspect(
    State(state): State<ApiState>,
    Path(session_id): Path<String>,
) -> Result<Json<UploadInspectResponse>, (StatusCode, String)> {
    let id = parse_session_id(&session_id)?;

    let snapshot = state
        .service
        .inspect(&id)
        .await
        .ok_or((StatusCode::NOT_FOUND, "session not found".to_string()))?;

    Ok(Json(UploadInspectResponse {
        session_id: hex::encode(snapshot.meta.session_id),
        user: snapshot.meta.user,
        status: snapshot.status.to_string(),
        chunks: snapshot.chunks,
        bytes: snapshot.bytes,
        open_secs: snapshot.meta.opened_at.elapsed().as_secs(),
    }))
}

// ── /uploads (GET) ────────────────────────────────────────────────────────────

#[derive(Serialize)]
pub struct UploadListResponse {
    pub uploads: Vec<UploadInspectResponse>,
}

pub async fn handle_upload_list(State(state): State<ApiState>) -> Json<UploadListResponse> {
    let uploads = state
        .service
        .list()
        .await
        .into_iter()
        .map(|snapshot| UploadInspectResponse {
            session_id: hex::encode(snapshot.meta.session_id),
            user: snapshot.meta.user,
            status: snapshot.status.to_string(),
            chunks: snapshot.chunks,
            bytes: snapshot.bytes,
            open_secs: snapshot.meta.opened_at.elapsed().as_secs(),
        })
        .collect();

    Json(UploadListResponse { uploads })
}
