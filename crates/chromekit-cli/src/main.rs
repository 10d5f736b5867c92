//! chromekit CLI
//!
//! Single-shot front-end: reads one command document (stdin or `--input`),
//! runs it against an already-running Chrome instance, and writes the
//! response document to stdout. Chrome process discovery/launch is an
//! external collaborator's job (spec.md §1 Non-goals) — this binary only
//! ever connects to a debugging endpoint that's already listening.

use std::io::{IsTerminal, Read, Write};
use std::path::PathBuf;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::Parser;
use tracing_subscriber::EnvFilter;

use chromekit_core::{Command, Engine, EngineConfig};

/// chromekit - single-shot browser automation over CDP
#[derive(Parser, Debug)]
#[command(name = "chromekit")]
#[command(version)]
#[command(about = "Runs one JSON command document against a Chrome tab and prints the JSON response")]
struct Args {
    /// Chrome debugging host.
    #[arg(long, default_value = "localhost")]
    host: String,

    /// Chrome debugging port.
    #[arg(long, default_value_t = 9222)]
    port: u16,

    /// Target tab id to attach to (defaults to the first page target).
    #[arg(long, value_name = "ID")]
    tab: Option<String>,

    /// Read the command document from this file instead of stdin.
    #[arg(long, value_name = "PATH")]
    input: Option<PathBuf>,

    /// Inline-size limit (bytes) before a snapshot is routed to a file.
    #[arg(long, value_name = "BYTES")]
    inline_limit: Option<usize>,

    /// Per-step CDP command timeout, in milliseconds.
    #[arg(long, value_name = "MS")]
    command_timeout_ms: Option<u64>,

    /// Enable debug logging to stderr.
    #[arg(short, long)]
    verbose: bool,
}

fn read_command_document(args: &Args) -> Result<String> {
    if let Some(path) = &args.input {
        return std::fs::read_to_string(path).with_context(|| format!("reading {}", path.display()));
    }

    if std::io::stdin().is_terminal() {
        anyhow::bail!("no --input file given and stdin is a terminal; pipe a command document in");
    }

    let mut buffer = String::new();
    std::io::stdin()
        .read_to_string(&mut buffer)
        .context("reading command document from stdin")?;
    Ok(buffer)
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    let filter = if args.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::from_default_env()
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let document = read_command_document(&args)?;
    let command: Command = serde_json::from_str(&document).context("command document is not valid JSON")?;

    let mut config = EngineConfig {
        host: args.host,
        port: args.port,
        tab: args.tab,
        ..EngineConfig::default()
    };
    if let Some(limit) = args.inline_limit {
        config.inline_limit = limit;
    }
    if let Some(ms) = args.command_timeout_ms {
        config.command_timeout = Duration::from_millis(ms);
    }

    let mut engine = Engine::connect(config).await.context("connecting to Chrome")?;
    let response = engine.run_command(command).await;

    let rendered = serde_json::to_string_pretty(&response).context("serializing response")?;
    println!("{rendered}");
    std::io::stdout().flush().ok();

    if response.ok {
        Ok(())
    } else {
        std::process::exit(1);
    }
}
