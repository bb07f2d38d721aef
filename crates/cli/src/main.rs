//! # Sensor Overlay CLI
//!
//! 命令行接口入口点。
//!
//! 提供：
//! - 配置加载与验证
//! - 管道编排与生命周期管理
//! - Ctrl+C 优雅关闭

mod cli;
mod commands;
mod error;
mod pipeline;

use anyhow::{Context, Result};
use clap::Parser;
use observability::ObservabilityConfig;
use tracing::info;

use cli::Cli;
use commands::run_pipeline;

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file if present
    dotenvy::dotenv().ok();

    let cli = Cli::parse();

    init_observability(&cli)?;

    info!(
        version = env!("CARGO_PKG_VERSION"),
        "Sensor overlay starting"
    );

    let result = run_pipeline(&cli).await;

    if let Err(ref e) = result {
        tracing::error!(error = format!("{e:#}"), "Command failed");
    }

    result
}

/// Initialize file logging and the optional metrics endpoint
fn init_observability(cli: &Cli) -> Result<()> {
    let config = ObservabilityConfig {
        log_format: cli.log_format.into(),
        log_file: cli.log_file.clone(),
        metrics_port: (cli.metrics_port != 0).then_some(cli.metrics_port),
        default_log_level: cli.log_level().to_string(),
    };

    observability::init_with_config(config).context("Failed to initialize logging")
}
