//! Upload lifecycle tests — the happy paths.

use crate::*;

/// Handshake alice, chunks [a, b+done] → success, accumulated in order.
#[tokio::test]
async fn test_upload_happy_path() {
    let base = spawn_api().await.unwrap();
    let id = open_session(&base, "alice").await.unwrap();

    let (status, body) = api_post(
        &base,
        &format!("/uploads/{id}/chunks"),
        serde_json::json!({ "data": "a", "done": false }),
    )
    .await
    .unwrap();
    assert_eq!(status, 200, "{body}");
    assert_eq!(body["accepted"], true);
    assert_eq!(body["closed"], false);

    let (status, body) = api_post(
        &base,
        &format!("/uploads/{id}/chunks"),
        serde_json::json!({ "data": "b", "done": true }),
    )
    .await
    .unwrap();
    assert_eq!(status, 200, "{body}");
    assert_eq!(body["closed"], true);

    // closed but not yet finalized — still inspectable
    let inspect = api_get(&base, &format!("/uploads/{id}")).await.unwrap();
    assert_eq!(inspect["status"], "closed");
    assert_eq!(inspect["chunks"], 2);
    assert_eq!(inspect["bytes"], 2);

    let (status, body) = api_post_empty(&base, &format!("/uploads/{id}/finalize"))
        .await
        .unwrap();
    assert_eq!(status, 200, "{body}");
    assert_eq!(body["success"], true);

    // retired from the active table
    let status = api_get(&base, "/status").await.unwrap();
    assert_eq!(status["active_sessions"], 0);

    // the record carries the digest of the ordered payload "ab"
    let records = api_get(&base, "/records?user=alice").await.unwrap();
    let record = &records["records"].as_array().unwrap()[0];
    assert_eq!(record["outcome"], "complete");
    assert_eq!(record["chunks"], 2);
    assert_eq!(record["bytes"], 2);
    let expected = hex::encode(inlet_core::digest::hash(b"ab"));
    assert_eq!(record["digest"], serde_json::json!(expected));
}

/// Handshake bob, no chunks, stream closes immediately → failure.
#[tokio::test]
async fn test_empty_stream_is_not_success() {
    let base = spawn_api().await.unwrap();
    let id = open_session(&base, "bob").await.unwrap();

    let (status, body) = api_post_empty(&base, &format!("/uploads/{id}/finalize"))
        .await
        .unwrap();
    assert_eq!(status, 200, "{body}");
    assert_eq!(body["success"], false);

    let records = api_get(&base, "/records?user=bob").await.unwrap();
    assert_eq!(records["records"][0]["outcome"], "incomplete");
}

/// Chunks delivered without a final flag, then finalize → failure.
#[tokio::test]
async fn test_unterminated_stream_is_not_success() {
    let base = spawn_api().await.unwrap();
    let id = open_session(&base, "bob").await.unwrap();

    for data in ["x", "y"] {
        let (status, _) = api_post(
            &base,
            &format!("/uploads/{id}/chunks"),
            serde_json::json!({ "data": data, "done": false }),
        )
        .await
        .unwrap();
        assert_eq!(status, 200);
    }

    let (_, body) = api_post_empty(&base, &format!("/uploads/{id}/finalize"))
        .await
        .unwrap();
    assert_eq!(body["success"], false);
}

/// Two interleaved sessions accumulate independently.
#[tokio::test]
async fn test_concurrent_sessions_do_not_interfere() {
    let base = spawn_api().await.unwrap();
    let a = open_session(&base, "alice").await.unwrap();
    let b = open_session(&base, "bob").await.unwrap();
    assert_ne!(a, b);

    for (id, data, done) in [
        (&a, "a1", false),
        (&b, "b1", false),
        (&a, "a2", true),
        (&b, "b2", true),
    ] {
        let (status, _) = api_post(
            &base,
            &format!("/uploads/{id}/chunks"),
            serde_json::json!({ "data": data, "done": done }),
        )
        .await
        .unwrap();
        assert_eq!(status, 200);
    }

    for id in [&a, &b] {
        let (_, body) = api_post_empty(&base, &format!("/uploads/{id}/finalize"))
            .await
            .unwrap();
        assert_eq!(body["success"], true);
    }

    let records = api_get(&base, "/records?user=alice").await.unwrap();
    let expected = hex::encode(inlet_core::digest::hash(b"a1a2"));
    assert_eq!(records["records"][0]["digest"], serde_json::json!(expected));

    let records = api_get(&base, "/records?user=bob").await.unwrap();
    let expected = hex::encode(inlet_core::digest::hash(b"b1b2"));
    assert_eq!(records["records"][0]["digest"], serde_json::json!(expected));
}

/// Records endpoint without a user filter returns everything.
#[tokio::test]
async fn test_records_across_users() {
    let base = spawn_api().await.unwrap();

    for user in ["alice", "bob"] {
        let id = open_session(&base, user).await.unwrap();
        api_post(
            &base,
            &format!("/uploads/{id}/chunks"),
            serde_json::json!({ "data": "x", "done": true }),
        )
        .await
        .unwrap();
        api_post_empty(&base, &format!("/uploads/{id}/finalize"))
            .await
            .unwrap();
    }

    let records = api_get(&base, "/records").await.unwrap();
    assert_eq!(records["records"].as_array().unwrap().len(), 2);
}
