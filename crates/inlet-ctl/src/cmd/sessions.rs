//! Session management commands.

use anyhow::{Context, Result};
use serde::Deserialize;

use super::http::{base_url, get_json};

#[derive(Deserialize)]
struct SessionInfo {
    session_id: String,
    user: String,
    status: String,
    chunks: usize,
    bytes: u64,
    open_secs: u64,
}

#[derive(Deserialize)]
struct SessionListResponse {
    uploads: Vec<SessionInfo>,
}

pub async fn cmd_sessions_list(port: u16) -> Result<()> {
    let resp: SessionListResponse = get_json(&format!("{}/uploads", base_url(port))).await?;

    if resp.uploads.is_empty() {
        println!("No active upload sessions.");
        return Ok(());
    }

    println!("═══════════════════════════════════════");
    println!("  Active Upload Sessions ({})", resp.uploads.len());
    println!("═══════════════════════════════════════");

    for s in &resp.uploads {
        println!("  ┌─ {}", &s.session_id[..16]);
        println!("  │  user   : {}", s.user);
        println!("  │  status : {}", s.status);
        println!("  │  chunks : {}", s.chunks);
        println!("  │  bytes  : {}", s.bytes);
        println!("  └─ open   : {}s", s.open_secs);
    }

    Ok(())
}

pub async fn cmd_session_inspect(port: u16, session_id: &str) -> Result<()> {
    let resp: SessionInfo =
        get_json(&format!("{}/uploads/{}", base_url(port), session_id)).await?;

    println!("═══════════════════════════════════════");
    println!("  Session Details");
    println!("═══════════════════════════════════════");
    println!("  ID     : {}", resp.session_id);
    println!("  User   : {}", resp.user);
    println!("  Status : {}", resp.status);
    println!("  Chunks : {}", resp.chunks);
    println!("  Bytes  : {}", resp.bytes);
    println!("  Open   : {}s", resp.open_secs);

    Ok(())
}

pub async fn cmd_session_drop(port: u16, session_id: &str) -> Result<()> {
    #[derive(Deserialize)]
    struct AbortResponse {
        session_id: String,
        success: bool,
    }

    let resp = reqwest::Client::new()
        .delete(format!("{}/uploads/{}", base_url(port), session_id))
        .send()
        .await
        .context("failed to drop session")?;

    if resp.status() == reqwest::StatusCode::NOT_FOUND {
        println!("Session not found: {}", session_id);
        return Ok(());
    }

    let resp: AbortResponse = resp.json().await.context("failed to parse response")?;
    println!(
        "✓ Session aborted: {}... (success: {})",
        &resp.session_id[..16],
        resp.success
    );

    Ok(())
}
