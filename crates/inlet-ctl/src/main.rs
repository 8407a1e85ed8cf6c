//! inlet-ctl — command-line interface for the Inlet daemon.

use anyhow::{Context, Result};

mod cmd;

const DEFAULT_PORT: u16 = 9401;

fn print_usage() {
    println!("Usage: inlet-ctl [--port <port>] <command>");
    println!();
    println!("Commands:");
    println!("  status                     Show daemon status");
    println!("  upload <file> [--user <u>] [--chunk-bytes <n>]");
    println!("                             Stream a local file as one upload session");
    println!("  sessions                   List active upload sessions");
    println!("  sessions inspect <id>      Show one session");
    println!("  sessions drop <id>         Abort a session");
    println!("  records [--user <u>]       Show recent upload outcomes");
    println!("  shutdown                   Stop the daemon");
    println!();
    println!("Options:");
    println!("  --port <port>   API port (default: {})", DEFAULT_PORT);
}

// ── Entry point ───────────────────────────────────────────────────────────────

#[tokio::main]
async fn main() -> Result<()> {
    let args: Vec<String> = std::env::args().skip(1).collect();

    // Parse --port option
    let mut port = DEFAULT_PORT;
    let mut remaining: Vec<&str> = Vec::new();
    let mut i = 0;
    while i < args.len() {
        if args[i] == "--port" {
            i += 1;
            port = args
                .get(i)
                .context("--port requires a value")?
                .parse()
                .context("--port must be a number")?;
        } else {
            remaining.push(&args[i]);
        }
        i += 1;
    }

    match remaining.as_slice() {
        ["status"] | [] => cmd::status::cmd_status(port).await,
        ["upload", rest @ ..] => cmd::uploads::cmd_upload(port, rest).await,
        ["sessions"] => cmd::sessions::cmd_sessions_list(port).await,
        ["sessions", "inspect", id] => cmd::sessions::cmd_session_inspect(port, id).await,
        ["sessions", "drop", id] => cmd::sessions::cmd_session_drop(port, id).await,
        ["records", rest @ ..] => cmd::records::cmd_records(port, rest).await,
        ["shutdown"] => cmd::status::cmd_shutdown(port).await,
        ["help"] | ["--help"] | ["-h"] => {
            print_usage();
            Ok(())
        }
        other => {
            eprintln!("Unknown command: {}", other.join(" "));
            eprintln!();
            print_usage();
            std::process::exit(1);
        }
    }
}
