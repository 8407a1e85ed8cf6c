//! Recent upload outcome commands.

use anyhow::{bail, Context, Result};
use serde::Deserialize;

use super::http::{base_url, get_json};

#[derive(Deserialize)]
struct RecordInfo {
    session_id: String,
    user: String,
    outcome: String,
    chunks: usize,
    bytes: u64,
    digest: Option<String>,
    error: Option<String>,
}

#[derive(Deserialize)]
struct RecordsResponse {
    records: Vec<RecordInfo>,
}

pub async fn cmd_records(port: u16, args: &[&str]) -> Result<()> {
    let mut user: Option<&str> = None;
    let mut i = 0;
    while i < args.len() {
        match args[i] {
            "--user" => {
                i += 1;
                user = Some(args.get(i).context("--user requires a value")?);
            }
            other => bail!("unexpected argument: {}", other),
        }
        i += 1;
    }

    let url = match user {
        Some(user) => format!("{}/records?user={}", base_url(port), user),
        None => format!("{}/records", base_url(port)),
    };
    let resp: RecordsResponse = get_json(&url).await?;

    if resp.records.is_empty() {
        println!("No upload records yet.");
        return Ok(());
    }

    println!("═══════════════════════════════════════");
    println!("  Recent Uploads ({})", resp.records.len());
    println!("═══════════════════════════════════════");

    for r in &resp.records {
        let marker = if r.outcome == "complete" { "✓" } else { "✗" };
        println!("  {} {}  [{}]", marker, &r.session_id[..16], r.outcome);
        println!("      user   : {}", r.user);
        println!("      chunks : {}  bytes : {}", r.chunks, r.bytes);
        if let Some(digest) = &r.digest {
            println!("      digest : {}...", &digest[..16]);
        }
        if let Some(error) = &r.error {
            println!("      error  : {}", error);
        }
    }

    Ok(())
}
