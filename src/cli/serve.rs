use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::Args;
use tokio::signal;
use tokio::task::JoinHandle;
use tokio::time::timeout;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

use zerowaste_catalog::Catalog;
use zerowaste_ranking::Ranker;
use zerowaste_scheduler::transport::ws::{self, WsConnection};
use zerowaste_scheduler::Pipeline;

use super::context::CliContext;
use crate::config::Config;
use crate::metrics;

const WRITER_FLUSH_TIMEOUT: Duration = Duration::from_secs(5);

#[derive(Args, Clone, Debug, Default)]
pub struct ServeArgs {
    /// Upstream WebSocket URL
    #[arg(long)]
    pub url: Option<String>,

    /// Recipe catalog CSV snapshot
    #[arg(long, value_name = "PATH")]
    pub catalog: Option<PathBuf>,

    /// Number of worker tasks
    #[arg(long)]
    pub workers: Option<usize>,

    /// Idle poll interval used to observe shutdown
    #[arg(long = "poll-interval-ms")]
    pub poll_interval_ms: Option<u64>,
}

impl ServeArgs {
    /// Command-line flags take precedence over every other layer.
    pub fn apply(&self, config: &mut Config) {
        if let Some(url) = &self.url {
            config.upstream_url = url.clone();
        }
        if let Some(catalog) = &self.catalog {
            config.catalog_path = catalog.clone();
        }
        if let Some(workers) = self.workers {
            config.workers = workers;
        }
        if let Some(poll) = self.poll_interval_ms {
            config.poll_interval_ms = poll;
        }
    }
}

pub async fn cmd_serve(args: ServeArgs, ctx: &CliContext) -> Result<()> {
    let mut config = ctx.config().clone();
    args.apply(&mut config);
    config.validate().context("invalid serve configuration")?;
    info!(
        config = %ctx.config_path().display(),
        upstream = %config.upstream_url,
        catalog = %config.catalog_path.display(),
        workers = config.workers,
        "starting serve"
    );

    let catalog = Catalog::load_csv(&config.catalog_path).with_context(|| {
        format!(
            "failed to load recipe catalog from {}",
            config.catalog_path.display()
        )
    })?;
    let ranker = Arc::new(Ranker::new(Arc::new(catalog)));

    let _metrics_server = metrics::spawn_metrics_server(ctx.metrics_port());

    let WsConnection {
        inbound,
        reply,
        writer,
    } = ws::connect(&config.upstream_url)
        .await
        .with_context(|| format!("failed to connect to {}", config.upstream_url))?;

    let pipeline = Pipeline::new(ranker, config.pipeline_config());
    let ctrl_c = forward_ctrl_c(pipeline.shutdown_token());
    let result = pipeline.run(inbound, reply).await;
    ctrl_c.abort();

    if timeout(WRITER_FLUSH_TIMEOUT, writer).await.is_err() {
        warn!("upstream writer did not finish flushing in time");
    }

    let report = result.context("request pipeline failed")?;
    info!(
        received = report.received,
        completed = report.completed(),
        failed = report.failed(),
        exit = ?report.exit,
        "serve finished"
    );
    Ok(())
}

fn forward_ctrl_c(token: CancellationToken) -> JoinHandle<()> {
    tokio::spawn(async move {
        tokio::select! {
            result = signal::ctrl_c() => match result {
                Ok(()) => {
                    info!("Ctrl+C received, draining requests");
                    token.cancel();
                }
                Err(err) => warn!(?err, "failed to listen for Ctrl+C"),
            },
            _ = token.cancelled() => {}
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn flags_override_config() {
        let mut config = Config::default();
        ServeArgs {
            url: Some("ws://upstream:9000/ws".into()),
            workers: Some(2),
            ..ServeArgs::default()
        }
        .apply(&mut config);
        assert_eq!(config.upstream_url, "ws://upstream:9000/ws");
        assert_eq!(config.workers, 2);
        assert_eq!(config.poll_interval_ms, 1000);
    }
}
