//! ZeroWaste worker library
//!
//! Exposes the CLI, configuration and metrics modules for integration testing

pub mod cli;
pub mod config;
pub mod metrics;

pub use config::Config;
