use std::time::Duration;

use tokio::sync::{broadcast, mpsc};
use tokio::time::{self, Instant, MissedTickBehavior};

use tilewalk_movement::{LifecycleEvent, TapInput, WalkDriver, WalkSignal};

use crate::blackboard::{Blackboard, despawn, record_stop, set_position, snapshot, touch_signal};

/// Input for the walk task.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum WalkCommand {
    Tap(TapInput),
    Lifecycle(LifecycleEvent),
    Despawn,
    Shutdown,
}

/// Ticks the driver at `frame_hz` and applies commands between ticks.
/// Returns when `Shutdown` arrives or every command sender is dropped.
pub async fn walk_task(
    mut driver: WalkDriver,
    bb: Blackboard,
    mut commands: mpsc::Receiver<WalkCommand>,
    frame_hz: u32,
) -> anyhow::Result<()> {
    let frame_hz = frame_hz.max(1);
    tracing::info!(frame_hz, "Walk task started.");
    let mut ticker = time::interval(Duration::from_secs_f64(1.0 / f64::from(frame_hz)));
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
    let mut last_tick = Instant::now();

    loop {
        tokio::select! {
            _ = ticker.tick() => {
                let now = Instant::now();
                let dt = (now - last_tick).as_secs_f32();
                last_tick = now;

                let entity = snapshot(&bb).entity;
                if let Some(next) = driver.tick(entity, dt) {
                    set_position(&bb, next);
                }
            }
            cmd = commands.recv() => match cmd {
                Some(WalkCommand::Tap(tap)) => match snapshot(&bb).entity {
                    Some(entity) => {
                        let outcome = driver.tap(tap, entity);
                        tracing::debug!(?outcome, tap = %tap.world_position(), "Tap handled");
                    }
                    None => tracing::warn!("Tap ignored: no entity on the map"),
                },
                Some(WalkCommand::Lifecycle(event)) => driver.handle(event),
                Some(WalkCommand::Despawn) => {
                    tracing::info!("Entity despawned");
                    despawn(&bb);
                }
                Some(WalkCommand::Shutdown) | None => {
                    tracing::info!(phase = ?driver.phase(), "Walk task stopping.");
                    return Ok(());
                }
            },
        }
    }
}

/// Logs every signal and mirrors stops into the blackboard. Ends when the
/// driver's topic closes.
pub async fn signal_logger(mut rx: broadcast::Receiver<std::sync::Arc<WalkSignal>>, bb: Blackboard) {
    loop {
        match rx.recv().await {
            Ok(signal) => {
                match *signal {
                    WalkSignal::PositionUpdate(_) => {
                        tracing::trace!(%signal, "Signal");
                        touch_signal(&bb);
                    }
                    WalkSignal::Stopped => {
                        tracing::info!(%signal, "Signal");
                        record_stop(&bb);
                    }
                    WalkSignal::PathStarted { .. } => {
                        tracing::info!(%signal, "Signal");
                        touch_signal(&bb);
                    }
                }
            }
            Err(broadcast::error::RecvError::Lagged(n)) => {
                tracing::warn!(skipped = n, "Signal logger lagged behind");
            }
            Err(broadcast::error::RecvError::Closed) => {
                tracing::info!("Signal topic closed.");
                return;
            }
        }
    }
}
