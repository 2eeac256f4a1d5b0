mod calc;
mod engine;
mod error;
mod export;
mod insights;
mod ipc;
mod roster;

use clap::Parser;
use std::io::{self, BufRead, Write};
use std::path::PathBuf;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

/// Student roster analytics sidecar. Reads one JSON request per line on
/// stdin and writes one JSON response per line on stdout.
#[derive(Parser, Debug)]
#[command(version, about)]
struct Args {
    /// Roster file (JSON) to load at startup.
    #[arg(long)]
    roster: Option<PathBuf>,

    /// Load the built-in sample roster at startup. Ignored when --roster is set.
    #[arg(long)]
    sample: bool,

    /// Log filter directive; logs go to stderr.
    #[arg(long, env = "ROSTERD_LOG", default_value = "info")]
    log: String,
}

fn init_logging(filter: &str) {
    let filter = EnvFilter::try_new(filter).unwrap_or_else(|_| EnvFilter::new("info"));
    // stdout carries the protocol.
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .with_ansi(false)
        .try_init();
}

fn preload(engine: &mut engine::Engine, args: &Args) -> anyhow::Result<()> {
    if let Some(path) = args.roster.as_ref() {
        let text = roster::read_roster_file(path)?;
        let students = roster::parse_roster_text(&text)?;
        engine.load(students);
    } else if args.sample {
        engine.load(roster::sample_roster());
    }
    Ok(())
}

fn main() {
    let args = Args::parse();
    init_logging(&args.log);

    let mut engine = engine::Engine::new();
    if let Err(e) = preload(&mut engine, &args) {
        warn!(error = %format!("{e:#}"), "roster preload failed; starting empty");
    }
    let mut state = ipc::AppState::new(engine);
    info!(session = %state.session_id, "rosterd ready");

    let stdin = io::stdin();
    let mut stdout = io::stdout();

    for line in stdin.lock().lines() {
        let line = match line {
            Ok(v) => v,
            Err(_) => break,
        };
        if line.trim().is_empty() {
            continue;
        }

        let req: ipc::Request = match serde_json::from_str(&line) {
            Ok(v) => v,
            Err(e) => {
                // Can't reply without id.
                warn!(error = %e, "unparseable request line");
                let resp = serde_json::json!({
                    "ok": false,
                    "error": { "code": "bad_json", "message": e.to_string() }
                });
                let _ = writeln!(stdout, "{}", resp);
                let _ = stdout.flush();
                continue;
            }
        };

        let resp = ipc::handle_request(&mut state, req);
        let _ = writeln!(
            stdout,
            "{}",
            serde_json::to_string(&resp).unwrap_or_else(|_| "{\"ok\":false}".to_string())
        );
        let _ = stdout.flush();
    }
    info!("stdin closed; exiting");
}
