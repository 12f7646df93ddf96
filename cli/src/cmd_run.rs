//! `wikiwatch run`: stream the feed into the logs until interrupted.

use anyhow::{Context, Result};
use tracing::{info, warn};

use wikiwatch_core::sink::RecordSink;
use wikiwatch_core::WatchConfig;
use wikiwatch_sink::{CsvSink, LogOnlySink};
use wikiwatch_stream::{HttpFeed, SessionReport, StreamSession};

pub async fn run(config: &WatchConfig, dry_run: bool) -> Result<()> {
    let report = if dry_run {
        warn!("dry run: rows are logged, not written");
        stream(config, LogOnlySink::new()).await?
    } else {
        let sink = CsvSink::create(&config.output).context("initialise output logs")?;
        info!(
            events = %sink.events_path().display(),
            alerts = %sink.alerts_path().display(),
            "output logs ready"
        );
        stream(config, sink).await?
    };

    println!("Streaming stopped by user.");
    println!(
        "  {} lines read, {} events decoded, {} matched, {} alerts",
        report.metrics.lines_read,
        report.metrics.events_decoded,
        report.metrics.events_matched,
        report.metrics.alerts_raised,
    );
    Ok(())
}

async fn stream<S: RecordSink>(config: &WatchConfig, sink: S) -> Result<SessionReport> {
    let feed = HttpFeed::from_config(config).context("build HTTP client")?;
    let mut session = StreamSession::new(config, feed, sink);
    let report = session
        .run(shutdown_signal())
        .await
        .with_context(|| format!("stream session on {} ended", config.endpoint))?;
    Ok(report)
}

/// Resolves on Ctrl-C, or SIGTERM on Unix.
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            warn!(error = %e, "cannot listen for Ctrl-C");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        use tokio::signal::unix::{signal, SignalKind};
        match signal(SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                warn!(error = %e, "cannot listen for SIGTERM");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => info!("Ctrl-C received, stopping"),
        _ = terminate => info!("SIGTERM received, stopping"),
    }
}
