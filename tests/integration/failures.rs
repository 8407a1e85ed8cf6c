//! Failure-path tests — transport errors, contract violations, limits.

use inlet_services::UploadLimits;

use crate::*;

/// Handshake carl, one chunk, then a transport error → failure, and
/// chunks after the error are never applied.
#[tokio::test]
async fn test_transport_error_fails_upload() {
    let base = spawn_api().await.unwrap();
    let id = open_session(&base, "carl").await.unwrap();

    let (status, _) = api_post(
        &base,
        &format!("/uploads/{id}/chunks"),
        serde_json::json!({ "data": "x", "done": false }),
    )
    .await
    .unwrap();
    assert_eq!(status, 200);

    // an undecodable body is a delivery failure
    let (status, _) = api_post_raw(&base, &format!("/uploads/{id}/chunks"), "{not json")
        .await
        .unwrap();
    assert_eq!(status, 400);

    // a later valid chunk is a contract violation, never applied
    let (status, _) = api_post(
        &base,
        &format!("/uploads/{id}/chunks"),
        serde_json::json!({ "data": "y", "done": true }),
    )
    .await
    .unwrap();
    assert_eq!(status, 409);

    let (status, body) = api_post_empty(&base, &format!("/uploads/{id}/finalize"))
        .await
        .unwrap();
    assert_eq!(status, 200);
    assert_eq!(body["success"], false);

    let records = api_get(&base, "/records?user=carl").await.unwrap();
    let record = &records["records"][0];
    assert_eq!(record["outcome"], "failed");
    assert!(record["error"]
        .as_str()
        .unwrap()
        .contains("chunk decode failed"));
    // failed uploads discard their accumulation
    assert_eq!(record["chunks"], 0);
    assert_eq!(record["digest"], serde_json::Value::Null);
}

/// A chunk delivered after the final one is a contract violation.
#[tokio::test]
async fn test_chunk_after_done_is_conflict() {
    let base = spawn_api().await.unwrap();
    let id = open_session(&base, "alice").await.unwrap();

    api_post(
        &base,
        &format!("/uploads/{id}/chunks"),
        serde_json::json!({ "data": "a", "done": true }),
    )
    .await
    .unwrap();

    let (status, body) = api_post(
        &base,
        &format!("/uploads/{id}/chunks"),
        serde_json::json!({ "data": "b", "done": false }),
    )
    .await
    .unwrap();
    assert_eq!(status, 409);
    assert!(body.as_str().unwrap().contains("closed"));
}

/// Finalizing twice is a contract violation distinct from not-found.
#[tokio::test]
async fn test_double_finalize_is_conflict() {
    let base = spawn_api().await.unwrap();
    let id = open_session(&base, "alice").await.unwrap();

    api_post(
        &base,
        &format!("/uploads/{id}/chunks"),
        serde_json::json!({ "data": "a", "done": true }),
    )
    .await
    .unwrap();

    let (status, _) = api_post_empty(&base, &format!("/uploads/{id}/finalize"))
        .await
        .unwrap();
    assert_eq!(status, 200);

    let (status, body) = api_post_empty(&base, &format!("/uploads/{id}/finalize"))
        .await
        .unwrap();
    assert_eq!(status, 409, "{body}");
    assert!(body.as_str().unwrap().contains("finalize called more than once"));
}

/// Client disconnect (DELETE) on an open session → failure, discarded.
#[tokio::test]
async fn test_abort_discards_open_session() {
    let base = spawn_api().await.unwrap();
    let id = open_session(&base, "dave").await.unwrap();

    api_post(
        &base,
        &format!("/uploads/{id}/chunks"),
        serde_json::json!({ "data": "partial", "done": false }),
    )
    .await
    .unwrap();

    let (status, body) = api_delete(&base, &format!("/uploads/{id}")).await.unwrap();
    assert_eq!(status, 200);
    assert_eq!(body["success"], false);

    // gone from the active table, recorded as failed
    let status = api_get(&base, "/status").await.unwrap();
    assert_eq!(status["active_sessions"], 0);
    let records = api_get(&base, "/records?user=dave").await.unwrap();
    let record = &records["records"][0];
    assert_eq!(record["outcome"], "failed");
    assert!(record["error"].as_str().unwrap().contains("disconnected"));
}

/// Oversized chunks are rejected and fail the session.
#[tokio::test]
async fn test_oversized_chunk_rejected() {
    let limits = UploadLimits {
        max_chunk_bytes: 8,
        ..UploadLimits::default()
    };
    let base = spawn_api_with_limits(limits).await.unwrap();
    let id = open_session(&base, "eve").await.unwrap();

    let (status, _) = api_post(
        &base,
        &format!("/uploads/{id}/chunks"),
        serde_json::json!({ "data": "way past the byte limit", "done": false }),
    )
    .await
    .unwrap();
    assert_eq!(status, 413);

    let (_, body) = api_post_empty(&base, &format!("/uploads/{id}/finalize"))
        .await
        .unwrap();
    assert_eq!(body["success"], false);
}

/// Unknown and malformed session ids.
#[tokio::test]
async fn test_unknown_session_is_not_found() {
    let base = spawn_api().await.unwrap();
    let bogus = "0000000000000000000000000000000000000000000000000000000000000000";

    let (status, _) = api_post(
        &base,
        &format!("/uploads/{bogus}/chunks"),
        serde_json::json!({ "data": "x", "done": false }),
    )
    .await
    .unwrap();
    assert_eq!(status, 404);

    let (status, _) = api_post_empty(&base, &format!("/uploads/{bogus}/finalize"))
        .await
        .unwrap();
    assert_eq!(status, 404);

    let (status, _) = api_post(
        &base,
        "/uploads/nothex/chunks",
        serde_json::json!({ "data": "x", "done": false }),
    )
    .await
    .unwrap();
    assert_eq!(status, 400);
}

/// A blank handshake user is rejected at the boundary.
#[tokio::test]
async fn test_blank_user_rejected() {
    let base = spawn_api().await.unwrap();
    let (status, _) = api_post(&base, "/uploads", serde_json::json!({ "user": "  " }))
        .await
        .unwrap();
    assert_eq!(status, 400);
}
