use anyhow::Result;
use clap::Parser;
use std::path::PathBuf;
use tokio_util::sync::CancellationToken;
use trust_common::observability::init_logging;
use trust_config::{TrustConfig, TrustConfigLoader};
use wiring::{build_analyzer, log_config, read_request};
mod wiring;

const DEFAULT_CONFIG_FILE: &str = "trust.yaml";

/// Score the credibility of a web page.
///
/// Reads an analysis request (`{url, content, title, images?}`) as JSON and
/// prints the analysis result as JSON.
#[derive(Parser, Debug)]
#[command(name = "trust-issues", version)]
struct Args {
    /// YAML config file. Without it `trust.yaml` is used when present.
    #[arg(short, long, env = "TRUST_CONFIG")]
    config: Option<PathBuf>,

    /// Request JSON file; stdin when omitted.
    #[arg(short, long)]
    input: Option<PathBuf>,

    /// Pretty-print the result.
    #[arg(long)]
    pretty: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    // 1) Load config (env wins)
    let loader = match &args.config {
        Some(path) => TrustConfigLoader::new().with_file(path),
        None => TrustConfigLoader::new().with_optional_file(DEFAULT_CONFIG_FILE),
    };
    let cfg: TrustConfig = loader.load()?;

    let log_path = init_logging(log_config(&cfg.logging))?;
    tracing::debug!(log = %log_path.display(), "app.logging_ready");

    // 2) Clients are built once; credentials are checked before any work.
    let analyzer = build_analyzer(&cfg)?;
    let request = read_request(args.input.as_deref())?;

    let cancel = CancellationToken::new();
    let on_signal = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            tracing::warn!("app.interrupted");
            on_signal.cancel();
        }
    });

    let result = analyzer.analyze_with(&request, &cancel).await?;
    let json = if args.pretty {
        serde_json::to_string_pretty(&result)?
    } else {
        serde_json::to_string(&result)?
    };
    println!("{json}");
    Ok(())
}
