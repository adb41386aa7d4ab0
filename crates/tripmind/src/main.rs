use std::io::{BufRead, Read};
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use tokio_util::sync::CancellationToken;
use tracing::info;
use tracing_subscriber::EnvFilter;
use tripmind_agents::Orchestrator;
use tripmind_models::{PlanTripRequest, PlanTripResult};

#[derive(Parser, Debug)]
#[command(name = "tripmind", about = "Plan a trip: current weather and places to visit")]
struct Cli {
    /// Query to plan, e.g. "weather in Paris"
    query: Option<String>,

    /// Path to a TOML configuration file (defaults apply when omitted)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Read PlanTripRequest JSON from a file instead of stdin
    #[arg(short, long, conflicts_with = "query")]
    input: Option<PathBuf>,

    /// Pretty-print the output JSON
    #[arg(long)]
    pretty: bool,

    /// Read one query per line from stdin until EOF
    #[arg(long, conflicts_with_all = ["query", "input"])]
    repl: bool,

    /// Emit logs as JSON lines
    #[arg(long)]
    log_json: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Logs go to stderr so stdout stays pure JSON (respects RUST_LOG)
    let subscriber = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr);
    if cli.log_json {
        subscriber.json().init();
    } else {
        subscriber.init();
    }

    let config = tripmind::load_config(cli.config.as_deref())?;
    let orchestrator =
        tripmind::build_orchestrator(&config).context("Failed to build orchestrator")?;

    if cli.repl {
        return repl(&orchestrator, cli.pretty).await;
    }

    let request = match (&cli.query, &cli.input) {
        (Some(query), _) => PlanTripRequest::new(query.as_str()),
        (None, Some(path)) => {
            let raw = std::fs::read_to_string(path)
                .with_context(|| format!("Failed to read input: {}", path.display()))?;
            parse_request(&raw)?
        }
        (None, None) => {
            let mut buf = String::new();
            std::io::stdin()
                .read_to_string(&mut buf)
                .context("Failed to read from stdin")?;
            parse_request(&buf)?
        }
    };

    let cancel = CancellationToken::new();
    let on_signal = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            on_signal.cancel();
        }
    });

    let result = orchestrator
        .plan_trip_cancellable(&request, &cancel)
        .await
        .map_err(|e| anyhow::anyhow!("Plan-trip aborted: {e}"))?;
    print_result(&result, cli.pretty)
}

/// One query per line; blank lines are skipped. All lines share the
/// orchestrator, so repeated places are served from cache.
async fn repl(orchestrator: &Orchestrator, pretty: bool) -> Result<()> {
    info!("Reading queries from stdin");
    let (tx, mut rx) = tokio::sync::mpsc::channel::<String>(16);

    // Stdin is blocking; feed lines from a dedicated thread.
    tokio::task::spawn_blocking(move || {
        for line in std::io::stdin().lock().lines() {
            let Ok(line) = line else { break };
            if tx.blocking_send(line).is_err() {
                break;
            }
        }
    });

    while let Some(line) = rx.recv().await {
        if line.trim().is_empty() {
            continue;
        }
        let result = tripmind::plan_trip(orchestrator, &line).await;
        print_result(&result, pretty)?;
    }
    Ok(())
}

fn parse_request(raw: &str) -> Result<PlanTripRequest> {
    serde_json::from_str(raw).context("Failed to parse PlanTripRequest JSON")
}

fn print_result(result: &PlanTripResult, pretty: bool) -> Result<()> {
    let output = if pretty {
        serde_json::to_string_pretty(result)?
    } else {
        serde_json::to_string(result)?
    };
    println!("{output}");
    Ok(())
}
