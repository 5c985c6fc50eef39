use std::time::Duration;

use tokio::sync::mpsc;
use tracing::{info, warn};

use tilewalk_movement::TapInput;
use tilewalk_navigation::MapFrame;

use crate::config::ScriptStep;
use crate::walk_task::WalkCommand;

/// Turns one step into the commands it fires, in order.
pub fn step_commands(step: &ScriptStep, frame: &MapFrame) -> Vec<WalkCommand> {
    let mut out = Vec::new();
    if step.despawn {
        out.push(WalkCommand::Despawn);
    }
    if let Some(event) = step.event {
        out.push(WalkCommand::Lifecycle(event));
    }

    let position = match (step.tap, step.tap_world) {
        (Some(tile), _) => {
            if !frame.contains(tile) {
                warn!(%tile, "Scripted tap is outside the map");
            }
            Some(frame.grid_to_world(tile))
        }
        (None, world) => world,
    };
    if let Some(position) = position {
        let mut tap = TapInput::new(position);
        if let Some(offset) = step.camera_offset {
            // The camera offset is added back on the way in.
            tap.position = position - offset;
            tap = tap.with_camera_offset(offset);
        }
        out.push(WalkCommand::Tap(tap));
    }
    out
}

/// Plays the script against the walk task.
pub async fn run_script(
    steps: &[ScriptStep],
    frame: &MapFrame,
    commands: &mpsc::Sender<WalkCommand>,
) -> anyhow::Result<()> {
    for (i, step) in steps.iter().enumerate() {
        tokio::time::sleep(Duration::from_millis(step.after_ms)).await;
        for cmd in step_commands(step, frame) {
            info!(step = i, ?cmd, "Script");
            commands.send(cmd).await?;
        }
    }
    Ok(())
}
