mod blackboard; // shared entity state
mod config; // AppConfig + loader
mod map_file; // TOML tile maps
mod script; // scripted taps and lifecycle events
mod walk_task; // driver loop

use std::sync::Arc;

use anyhow::{Context, bail};
use parking_lot::RwLock;
use tokio::sync::mpsc;
use tracing::{error, info};
use tracing_subscriber::{self, EnvFilter};

use tilewalk_movement::{Topic, WalkDriver, WalkSignal};
use tilewalk_navigation::GridBuilder;

use blackboard::{Blackboard, State, snapshot};
use walk_task::{WalkCommand, signal_logger, walk_task};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive(tracing::Level::INFO.into()))
        .init();

    let config_path = std::env::args()
        .nth(1)
        .unwrap_or_else(|| config::DEFAULT_CONFIG_PATH.to_string());

    match run(&config_path).await {
        Ok(()) => {
            info!("Scenario finished successfully.");
            Ok(())
        }
        Err(e) => {
            error!("Scenario failed: {:?}", e);
            Err(e)
        }
    }
}

async fn run(config_path: &str) -> anyhow::Result<()> {
    let cfg = config::load_config(config_path).with_context(|| format!("loading {}", config_path))?;
    let map = map_file::load_map(&cfg.map_path)?;

    let grids = GridBuilder::new()
        .with_layer_names(cfg.layers.clone())
        .with_presence(cfg.presence)
        .build(&map)
        .context("building walk grids")?;
    let frame = *grids.frame();
    info!(
        cols = frame.cols(),
        rows = frame.rows(),
        blocked = grids.ground().count_set(),
        penalized = grids.walk().count_set(),
        "Walk grids ready"
    );

    if !frame.contains(cfg.spawn) {
        bail!("spawn tile {} is outside the {}x{} map", cfg.spawn, frame.cols(), frame.rows());
    }
    let bb: Blackboard = Arc::new(RwLock::new(State::spawned_at(frame.grid_to_world(cfg.spawn))));

    let signals: Topic<WalkSignal> = Topic::new(cfg.signal_capacity.max(1));
    let driver = WalkDriver::new(Arc::new(grids), cfg.walk, signals.clone())?;
    let signal_rx = signals.subscribe();
    // The driver keeps the only publisher so the logger sees the topic close.
    drop(signals);

    let (cmd_tx, cmd_rx) = mpsc::channel(32);
    let logger = tokio::spawn(signal_logger(signal_rx, bb.clone()));
    let walker = tokio::spawn(walk_task(driver, bb.clone(), cmd_rx, cfg.frame_hz));

    info!(spawn = %cfg.spawn, steps = cfg.script.len(), "Running script...");
    script::run_script(&cfg.script, &frame, &cmd_tx).await?;
    cmd_tx.send(WalkCommand::Shutdown).await?;

    walker.await??;
    logger.await?;

    let state = snapshot(&bb);
    let quiet_for = state.last_signal_ts.elapsed();
    match state.entity {
        Some(p) => info!(
            position = %p,
            tile = ?frame.world_to_grid(p),
            stops = state.stops,
            ?quiet_for,
            "Final state"
        ),
        None => info!(stops = state.stops, ?quiet_for, "Final state: entity gone"),
    }
    Ok(())
}
