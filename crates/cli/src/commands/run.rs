//! Run the overlay pipeline.

use anyhow::{Context, Result};
use compositor::StopSignal;
use config_loader::ConfigLoader;
use contracts::{PipelineBlueprint, Resolution, SensorKind};
use tracing::{info, warn};

use crate::cli::Cli;
use crate::error::CliError;
use crate::pipeline::{DisplaySettings, Pipeline, PipelineConfig};

/// Execute the pipeline described by the command line
pub async fn run_pipeline(cli: &Cli) -> Result<()> {
    let blueprint = build_blueprint(cli)?;

    info!(
        sensors = blueprint.sensors.len(),
        tick_delay_ms = blueprint.display.tick_delay_ms,
        canvas = %blueprint.display.canvas,
        "Configuration loaded"
    );

    if cli.dry_run {
        info!("Dry run mode - configuration is valid, exiting");
        print_config_summary(&blueprint)?;
        return Ok(());
    }

    let pipeline_config = PipelineConfig {
        blueprint,
        display: DisplaySettings::from_cli(cli),
    };

    let stop = StopSignal::new();
    let shutdown = stop.clone();
    tokio::spawn(async move {
        shutdown_signal().await;
        warn!("Received shutdown signal, stopping pipeline...");
        shutdown.trigger();
    });

    let stats = Pipeline::new(pipeline_config)
        .run(stop)
        .await
        .context("Pipeline execution failed")?;

    info!(
        ticks = stats.ticks,
        duration_secs = stats.duration.as_secs_f64(),
        tps = format!("{:.2}", stats.tps()),
        "Pipeline completed successfully"
    );
    stats.print_summary();

    Ok(())
}

/// Load or build the blueprint and apply the positional overrides
pub fn build_blueprint(cli: &Cli) -> Result<PipelineBlueprint> {
    let resolution = Resolution::new(cli.cam_width, cli.cam_height);

    let mut blueprint = match &cli.config {
        Some(path) => {
            if !path.exists() {
                return Err(CliError::config_not_found(path.display().to_string()).into());
            }
            info!(config = %path.display(), "Loading configuration");
            ConfigLoader::load_from_path(path)
                .with_context(|| format!("Failed to load config from {}", path.display()))?
        }
        None => PipelineBlueprint::standard(cli.cam_id, resolution, cli.update_delay),
    };

    blueprint.override_camera(cli.cam_id, resolution);
    blueprint.display.tick_delay_ms = cli.update_delay;
    if cli.max_ticks > 0 {
        blueprint.display.max_ticks = Some(cli.max_ticks);
    }

    ConfigLoader::validate(&blueprint).context("Invalid pipeline configuration")?;
    Ok(blueprint)
}

/// Wait for Ctrl+C or SIGTERM
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            warn!(error = %e, "Failed to install Ctrl+C handler");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                warn!(error = %e, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}

/// Print configuration summary for dry-run mode
fn print_config_summary(blueprint: &PipelineBlueprint) -> Result<()> {
    println!("\n=== Configuration Summary ===\n");
    println!("Sensors ({}):", blueprint.sensors.len());
    for sensor in &blueprint.sensors {
        match &sensor.kind {
            SensorKind::Numeric { delay_ms } => {
                println!("  - {} (numeric, every {} ms)", sensor.id, delay_ms)
            }
            SensorKind::Camera {
                device_id,
                resolution,
            } => println!("  - {} (camera {}, {})", sensor.id, device_id, resolution),
        }
    }

    println!("\nDisplay:");
    println!("  Tick delay: {} ms", blueprint.display.tick_delay_ms);
    println!("  Canvas: {}", blueprint.display.canvas);
    if let Some(max) = blueprint.display.max_ticks {
        println!("  Max ticks: {}", max);
    }

    println!("\n--- TOML ---\n{}", ConfigLoader::to_toml(blueprint)?);
    Ok(())
}
