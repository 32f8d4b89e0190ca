//! Headless runner: starts a flock and logs its summary once a second.
//!
//! Reads an optional JSON config path from `FLOCKBOX_CONFIG`. Log level comes
//! from `RUST_LOG` (default `info`).

use anyhow::{Context, Result};
use flockbox::{Simulation, SimulationConfig};
use std::time::Duration;
use tracing::info;

const RUN_FOR: Duration = Duration::from_secs(5);

#[tokio::main]
async fn main() -> Result<()> {
    init_logging("info")?;

    let config = match std::env::var("FLOCKBOX_CONFIG") {
        Ok(path) => {
            let json = std::fs::read_to_string(&path)
                .with_context(|| format!("Failed to read config file {}", path))?;
            SimulationConfig::from_json_str(&json)?
        }
        Err(_) => SimulationConfig::default(),
    };

    let sim = Simulation::from_config(config).start()?;

    let mut report = tokio::time::interval(Duration::from_secs(1));
    report.tick().await;
    let deadline = tokio::time::sleep(RUN_FOR);
    tokio::pin!(deadline);

    loop {
        tokio::select! {
            _ = &mut deadline => break,
            _ = report.tick() => {
                let summary = sim.summary();
                info!(
                    visible = summary.visible,
                    centroid_x = summary.centroid.x,
                    centroid_y = summary.centroid.y,
                    mean_speed = summary.mean_speed,
                    spread = summary.mean_pairwise_distance,
                    cadence = sim.cadence(),
                    "Flock"
                );
            }
        }
    }

    sim.stop().await?;
    Ok(())
}

/// Initialize tracing subscriber for logging
fn init_logging(level: &str) -> Result<()> {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .or_else(|_| tracing_subscriber::EnvFilter::try_new(level))
        .context("Failed to create log filter")?;

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .compact()
        .init();

    Ok(())
}
