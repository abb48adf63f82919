use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Args;
use serde_json::Value;
use tokio::fs;

use zerowaste_catalog::Catalog;
use zerowaste_ranking::Ranker;
use zerowaste_scheduler::{OutboundMessage, RunRequest, RunResponse};

use super::context::CliContext;

#[derive(Args, Clone, Debug)]
pub struct RankArgs {
    /// Recipe catalog CSV snapshot (defaults to the configured catalog)
    #[arg(long, value_name = "PATH")]
    pub catalog: Option<PathBuf>,

    /// JSON file holding a run request envelope or a bare payload
    #[arg(long, value_name = "FILE")]
    pub request: PathBuf,
}

pub async fn cmd_rank(args: RankArgs, ctx: &CliContext) -> Result<()> {
    let catalog = args
        .catalog
        .clone()
        .unwrap_or_else(|| ctx.config().catalog_path.clone());
    let message = rank_file(&catalog, &args.request).await?;
    println!("{}", message.to_json()?);
    Ok(())
}

/// Accepts either `{"type": .., "payload": {..}}` or the payload alone.
pub fn parse_request(raw: &str) -> Result<RunRequest> {
    let value: Value = serde_json::from_str(raw).context("request is not valid JSON")?;
    if value.get("type").is_some() {
        return RunRequest::from_frame(raw).context("invalid request envelope");
    }
    serde_json::from_value(value).context("invalid request payload")
}

pub async fn rank_file(catalog: &Path, request: &Path) -> Result<OutboundMessage> {
    let catalog = Catalog::load_csv(catalog)
        .with_context(|| format!("failed to load recipe catalog from {}", catalog.display()))?;
    let raw = fs::read_to_string(request)
        .await
        .with_context(|| format!("failed to read {}", request.display()))?;
    let request = parse_request(&raw)?;

    let ranker = Ranker::new(Arc::new(catalog));
    let recipe_ids = ranker.rank(&request.to_query());
    Ok(OutboundMessage::Run(RunResponse {
        recipe_ids,
        email: request.email,
    }))
}
