//! Daemon status and shutdown commands.

use anyhow::Result;
use serde::Deserialize;

use super::http::{base_url, get_json, post_json};

#[derive(Deserialize)]
struct StatusResponse {
    active_sessions: usize,
    records: usize,
    uptime_secs: u64,
}

#[derive(Deserialize)]
struct ShutdownResponse {
    message: String,
}

pub async fn cmd_status(port: u16) -> Result<()> {
    let resp: StatusResponse = get_json(&format!("{}/status", base_url(port))).await?;

    println!("═══════════════════════════════════════");
    println!("  Inlet Daemon Status");
    println!("═══════════════════════════════════════");
    println!("  Active sessions : {}", resp.active_sessions);
    println!("  Records kept    : {}", resp.records);
    println!("  Uptime          : {}s", resp.uptime_secs);

    Ok(())
}

pub async fn cmd_shutdown(port: u16) -> Result<()> {
    let resp: ShutdownResponse = post_json(&format!("{}/daemon/shutdown", base_url(port))).await?;
    println!("{}", resp.message);
    Ok(())
}
