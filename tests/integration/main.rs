//! Inlet integration test harness.
//!
//! Each test boots the full router in-process on an ephemeral port and
//! drives it over HTTP, exactly as a client would. No external daemon
//! is required.

use std::sync::Arc;
use std::time::Instant;

use anyhow::Result;

use inlet_services::{LogSink, UploadLimits, UploadService};

mod failures;
mod uploads;

// ── Harness ───────────────────────────────────────────────────────────────────

/// Spin up a full API server on an ephemeral port with default limits.
/// Returns its base URL, e.g. "http://127.0.0.1:43211/api".
pub async fn spawn_api() -> Result<String> {
    spawn_api_with_limits(UploadLimits::default()).await
}

pub async fn spawn_api_with_limits(limits: UploadLimits) -> Result<String> {
    let service = Arc::new(UploadService::new(Arc::new(LogSink), limits, 64));
    let (shutdown_tx, _) = tokio::sync::broadcast::channel(1);
    let state = inlet_api::ApiState {
        service,
        started_at: Instant::now(),
        shutdown_tx,
    };
    let app = inlet_api::router(state);

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await?;
    let addr = listener.local_addr()?;
    tokio::spawn(async move {
        let _ = axum::serve(listener, app).await;
    });

    Ok(format!("http://{}/api", addr))
}

pub async fn api_get(base: &str, path: &str) -> Result<serde_json::Value> {
    Ok(reqwest::get(format!("{base}{path}")).await?.json().await?)
}

/// POST a JSON body; returns (status, body). Non-JSON error bodies come
/// back as a JSON string value.
pub async fn api_post(
    base: &str,
    path: &str,
    body: serde_json::Value,
) -> Result<(u16, serde_json::Value)> {
    let resp = reqwest::Client::new()
        .post(format!("{base}{path}"))
        .json(&body)
        .send()
        .await?;
    read_response(resp).await
}

/// POST with an arbitrary raw body, to exercise decode failures.
pub async fn api_post_raw(
    base: &str,
    path: &str,
    body: &'static str,
) -> Result<(u16, serde_json::Value)> {
    let resp = reqwest::Client::new()
        .post(format!("{base}{path}"))
        .body(body)
        .send()
        .await?;
    read_response(resp).await
}

/// POST with no body at all (finalize takes none).
pub async fn api_post_empty(base: &str, path: &str) -> Result<(u16, serde_json::Value)> {
    let resp = reqwest::Client::new()
        .post(format!("{base}{path}"))
        .send()
        .await?;
    read_response(resp).await
}

pub async fn api_delete(base: &str, path: &str) -> Result<(u16, serde_json::Value)> {
    let resp = reqwest::Client::new()
        .delete(format!("{base}{path}"))
        .send()
        .await?;
    read_response(resp).await
}

async fn read_response(resp: reqwest::Response) -> Result<(u16, serde_json::Value)> {
    let status = resp.status().as_u16();
    let text = resp.text().await?;
    let value = serde_json::from_str(&text).unwrap_or(serde_json::Value::String(text));
    Ok((status, value))
}

/// Open a session for `user` and return its id.
pub async fn open_session(base: &str, user: &str) -> Result<String> {
    let (status, body) = api_post(base, "/uploads", serde_json::json!({ "user": user })).await?;
    assert_eq!(status, 201, "open failed: {body}");
    Ok(body["session_id"].as_str().unwrap().to_string())
}

// ── Smoke tests ───────────────────────────────────────────────────────────────

#[tokio::test]
async fn test_status_endpoint_shape() {
    let base = spawn_api().await.unwrap();

    let status = api_get(&base, "/status").await.unwrap();
    assert!(status["active_sessions"].is_number(), "missing active_sessions");
    assert!(status["records"].is_number(), "missing records");
    assert!(status["uptime_secs"].is_number(), "missing uptime_secs");
}

#[tokio::test]
async fn test_open_session_appears_in_status() {
    let base = spawn_api().await.unwrap();

    let _id = open_session(&base, "alice").await.unwrap();

    let status = api_get(&base, "/status").await.unwrap();
    assert_eq!(status["active_sessions"], 1);

    let uploads = api_get(&base, "/uploads").await.unwrap();
    let list = uploads["uploads"].as_array().unwrap();
    assert_eq!(list.len(), 1);
    assert_eq!(list[0]["user"], "alice");
    assert_eq!(list[0]["status"], "open");
}

#[tokio::test]
async fn test_shutdown_endpoint_responds() {
    let base = spawn_api().await.unwrap();
    let (status, body) = api_post_empty(&base, "/daemon/shutdown").await.unwrap();
    assert_eq!(status, 200);
    assert_eq!(body["message"], "Shutdown initiated");
}
