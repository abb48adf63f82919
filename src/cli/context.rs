use std::path::{Path, PathBuf};

use crate::config::Config;

pub struct CliContext {
    config: Config,
    config_path: PathBuf,
    metrics_port: u16,
}

impl CliContext {
    pub fn new(config: Config, config_path: PathBuf, metrics_port: u16) -> Self {
        Self {
            config,
            config_path,
            metrics_port,
        }
    }

    /// File and environment layers already applied.
    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn config_path(&self) -> &Path {
        &self.config_path
    }

    pub fn metrics_port(&self) -> u16 {
        self.metrics_port
    }
}
