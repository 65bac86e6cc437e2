//! Drowsiness Monitor - Main Entry Point

use alerting::AlertDispatcher;
use anyhow::Context;
use clap::Parser;
use monitor::{init_logging, run, CliArgs, Settings};
use tokio::io::BufReader;
use tracing::{info, warn};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = CliArgs::parse();

    let mut settings = Settings::load(args.config.as_deref())?;
    if let Some(trace) = args.trace_path() {
        settings.input.source = Some(trace);
    }
    init_logging(settings.logging.format)?;

    info!("=== Drowsiness Monitor v{} ===", env!("CARGO_PKG_VERSION"));

    let dispatcher = AlertDispatcher::spawn(settings.input.alarm_sink.build(), settings.alarm.clone());
    let shutdown = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            warn!("Cannot listen for ctrl-c: {}", e);
            std::future::pending::<()>().await;
        }
    };

    let mut stdout = tokio::io::stdout();
    let summary = match &settings.input.source {
        Some(path) => {
            info!("Reading frames from {}", path.display());
            let file = tokio::fs::File::open(path)
                .await
                .with_context(|| format!("opening {}", path.display()))?;
            run(&settings, BufReader::new(file), &mut stdout, &dispatcher, shutdown).await?
        }
        None => {
            info!("Reading frames from stdin");
            run(&settings, BufReader::new(tokio::io::stdin()), &mut stdout, &dispatcher, shutdown).await?
        }
    };

    let stats = dispatcher.shutdown().await;
    info!(
        frames = summary.frames,
        face_frames = summary.face_frames,
        skipped_lines = summary.skipped_lines,
        blinks = summary.blinks,
        alerts = summary.alerts,
        alarms_sounded = stats.sounded,
        alarms_failed = stats.failed + stats.timed_out,
        "Shutting down"
    );
    Ok(())
}
