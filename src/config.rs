use std::path::PathBuf;
use std::time::Duration;

use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};

use zerowaste_scheduler::PipelineConfig;

pub const UPSTREAM_URL_ENV: &str = "ZEROWASTE_UPSTREAM_URL";
pub const WORKERS_ENV: &str = "ZEROWASTE_WORKERS";

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
#[serde(default)]
pub struct Config {
    /// WebSocket endpoint of the backend that relays run requests.
    pub upstream_url: String,
    pub catalog_path: PathBuf,
    pub workers: usize,
    pub poll_interval_ms: u64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            upstream_url: "ws://localhost:8000/ws/python-script/".to_string(),
            catalog_path: PathBuf::from("data/recipes.csv"),
            workers: 5,
            poll_interval_ms: 1000,
        }
    }
}

impl Config {
    pub fn apply_env(&mut self) -> Result<()> {
        self.apply_env_from(|key| std::env::var(key).ok())
    }

    /// Overlay environment values looked up through `lookup`.
    pub fn apply_env_from<F>(&mut self, lookup: F) -> Result<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(url) = lookup(UPSTREAM_URL_ENV).filter(|value| !value.trim().is_empty()) {
            self.upstream_url = url.trim().to_string();
        }
        if let Some(raw) = lookup(WORKERS_ENV) {
            self.workers = raw
                .trim()
                .parse()
                .with_context(|| format!("{WORKERS_ENV} must be a positive integer, got `{raw}`"))?;
        }
        Ok(())
    }

    pub fn validate(&self) -> Result<()> {
        if self.workers == 0 {
            bail!("workers must be at least 1");
        }
        if self.poll_interval_ms == 0 {
            bail!("poll_interval_ms must be at least 1");
        }
        if self.upstream_url.trim().is_empty() {
            bail!("upstream_url must not be empty");
        }
        Ok(())
    }

    pub fn pipeline_config(&self) -> PipelineConfig {
        PipelineConfig {
            workers: self.workers,
            poll_interval: Duration::from_millis(self.poll_interval_ms),
        }
    }
}
