//! Upload command — stream a local file as one session.

use anyhow::{bail, Context, Result};
use serde::Deserialize;

use super::http::{base_url, post_json_body};

const DEFAULT_CHUNK_BYTES: usize = 32 * 1024;

#[derive(Deserialize)]
struct OpenResponse {
    session_id: String,
}

#[derive(Deserialize)]
struct ChunkResponse {
    closed: bool,
}

#[derive(Deserialize)]
struct FinalizeResponse {
    success: bool,
}

pub async fn cmd_upload(port: u16, args: &[&str]) -> Result<()> {
    let mut file: Option<&str> = None;
    let mut user = std::env::var("USER").unwrap_or_else(|_| "anonymous".to_string());
    let mut chunk_bytes = DEFAULT_CHUNK_BYTES;

    let mut i = 0;
    while i < args.len() {
        match args[i] {
            "--user" => {
                i += 1;
                user = args.get(i).context("--user requires a value")?.to_string();
            }
            "--chunk-bytes" => {
                i += 1;
                chunk_bytes = args
                    .get(i)
                    .context("--chunk-bytes requires a value")?
                    .parse()
                    .context("--chunk-bytes must be a number")?;
            }
            other if file.is_none() => file = Some(other),
            other => bail!("unexpected argument: {}", other),
        }
        i += 1;
    }
    let path = file.context("usage: inlet-ctl upload <file> [--user <u>] [--chunk-bytes <n>]")?;
    if chunk_bytes == 0 {
        bail!("--chunk-bytes must be greater than zero");
    }

    let data = std::fs::read(path).with_context(|| format!("failed to read file: {}", path))?;
    let text = String::from_utf8_lossy(&data).into_owned();

    let client = reqwest::Client::new();

    let open: OpenResponse = post_json_body(
        &format!("{}/uploads", base_url(port)),
        &serde_json::json!({ "user": user }),
    )
    .await?;

    println!("Session opened: {}...", &open.session_id[..16]);

    let pieces = split_chunks(&text, chunk_bytes);
    let total_chunks = pieces.len();

    for (idx, piece) in pieces.iter().enumerate() {
        let done = idx + 1 == total_chunks;
        let resp = client
            .post(format!(
                "{}/uploads/{}/chunks",
                base_url(port),
                open.session_id
            ))
            .json(&serde_json::json!({ "data": piece, "done": done }))
            .send()
            .await
            .context("failed to send chunk")?;

        if !resp.status().is_success() {
            let status = resp.status();
            let body = resp.text().await.unwrap_or_default();
            bail!("chunk {} rejected ({}): {}", idx, status, body);
        }

        let chunk_resp: ChunkResponse =
            resp.json().await.context("failed to parse chunk response")?;
        if chunk_resp.closed {
            break;
        }
    }

    let fin = client
        .post(format!(
            "{}/uploads/{}/finalize",
            base_url(port),
            open.session_id
        ))
        .send()
        .await
        .context("failed to finalize upload")?;
    if !fin.status().is_success() {
        let status = fin.status();
        let body = fin.text().await.unwrap_or_default();
        bail!("finalize rejected ({}): {}", status, body);
    }
    let fin: FinalizeResponse = fin.json().await.context("failed to parse finalize response")?;

    if fin.success {
        println!("Upload complete:");
        println!("  File   : {}", path);
        println!("  Bytes  : {}", text.len());
        println!("  Chunks : {}", total_chunks);
        Ok(())
    } else {
        bail!("upload reported failure")
    }
}

/// Split text into pieces of at most `max_bytes`, never inside a UTF-8
/// character. An empty input still yields one (empty) final chunk so
/// the stream terminates with `done`.
fn split_chunks(text: &str, max_bytes: usize) -> Vec<String> {
    if text.is_empty() {
        return vec![String::new()];
    }

    let mut pieces = Vec::new();
    let mut start = 0;
    let mut current = 0;
    for (offset, ch) in text.char_indices() {
        if offset + ch.len_utf8() - start > max_bytes && current > start {
            pieces.push(text[start..current].to_string());
            start = current;
        }
        current = offset + ch.len_utf8();
    }
    pieces.push(text[start..].to_string());
    pieces
}
