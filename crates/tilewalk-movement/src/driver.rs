//! Tap-to-walk state machine.
//!
//! One [`WalkDriver`] per moving entity. Drivers share the immutable
//! [`WalkGrids`] through an `Arc` and own everything else: the current path,
//! the waypoint cursor and the round-over flag.

use std::sync::Arc;

use tracing::{debug, info, trace, warn};

use tilewalk_navigation::astar;
use tilewalk_navigation::{GridPoint, WalkGrids, WorldPoint};

use crate::bus::Topic;
use crate::error::MovementError;
use crate::events::{LifecycleEvent, TapInput, TapOutcome, WalkSignal};

/// Tunables for stepping along a path.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct WalkSettings {
    /// Movement speed in world units per second.
    pub move_speed: f32,
    /// A waypoint counts as reached once the entity is closer than
    /// `tile_size * switch_threshold_ratio`.
    pub switch_threshold_ratio: f32,
}

impl Default for WalkSettings {
    fn default() -> Self {
        Self {
            move_speed: 180.0,
            switch_threshold_ratio: 0.2,
        }
    }
}

impl WalkSettings {
    /// Checks that both values are usable.
    pub fn validate(&self) -> Result<(), MovementError> {
        if !(self.move_speed.is_finite() && self.move_speed > 0.0) {
            return Err(MovementError::InvalidMoveSpeed(self.move_speed));
        }
        let r = self.switch_threshold_ratio;
        if !(r.is_finite() && r > 0.0 && r <= 1.0) {
            return Err(MovementError::InvalidSwitchThreshold(r));
        }
        Ok(())
    }
}

/// Coarse state of a driver.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WalkPhase {
    /// No path.
    Idle,
    /// Following a path.
    Moving,
    /// Round ended; taps are ignored.
    Over,
}

/// Progress through the current path.
///
/// `current_waypoint` stays within `0..=path.len()`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MovementState {
    path: Vec<GridPoint>,
    current_waypoint: usize,
    over: bool,
}

impl MovementState {
    /// Tiles of the current path; empty when idle.
    pub fn path(&self) -> &[GridPoint] {
        &self.path
    }

    /// Index of the waypoint being walked towards.
    pub fn current_waypoint(&self) -> usize {
        self.current_waypoint
    }

    /// True after a win or fail until the next start or reset.
    pub fn is_over(&self) -> bool {
        self.over
    }

    /// True while a path is being followed.
    pub fn is_moving(&self) -> bool {
        !self.over && self.current_waypoint < self.path.len()
    }

    /// Derived phase.
    pub fn phase(&self) -> WalkPhase {
        if self.over {
            WalkPhase::Over
        } else if self.is_moving() {
            WalkPhase::Moving
        } else {
            WalkPhase::Idle
        }
    }

    fn start(&mut self, path: Vec<GridPoint>) {
        self.path = path;
        self.current_waypoint = 0;
    }

    /// Drops the path. Returns whether a path was being followed.
    fn clear_path(&mut self) -> bool {
        let was_moving = self.is_moving();
        self.path.clear();
        self.current_waypoint = 0;
        was_moving
    }
}

/// Turns taps into paths and paths into per-frame positions.
#[derive(Debug)]
pub struct WalkDriver {
    grids: Arc<WalkGrids>,
    settings: WalkSettings,
    state: MovementState,
    signals: Topic<WalkSignal>,
}

impl WalkDriver {
    /// Creates an idle driver.
    ///
    /// # Arguments
    /// * `grids` - Shared ground/walk grids for the map
    /// * `settings` - Speed and waypoint threshold
    /// * `signals` - Topic the driver publishes [`WalkSignal`]s on
    pub fn new(
        grids: Arc<WalkGrids>,
        settings: WalkSettings,
        signals: Topic<WalkSignal>,
    ) -> Result<Self, MovementError> {
        settings.validate()?;
        Ok(Self {
            grids,
            settings,
            state: MovementState::default(),
            signals,
        })
    }

    pub fn grids(&self) -> &Arc<WalkGrids> {
        &self.grids
    }

    pub fn settings(&self) -> &WalkSettings {
        &self.settings
    }

    pub fn state(&self) -> &MovementState {
        &self.state
    }

    pub fn signals(&self) -> &Topic<WalkSignal> {
        &self.signals
    }

    pub fn phase(&self) -> WalkPhase {
        self.state.phase()
    }

    pub fn path(&self) -> &[GridPoint] {
        self.state.path()
    }

    pub fn current_waypoint(&self) -> usize {
        self.state.current_waypoint()
    }

    pub fn is_over(&self) -> bool {
        self.state.is_over()
    }

    /// Distance under which the current waypoint counts as reached.
    pub fn switch_threshold(&self) -> f32 {
        self.grids.frame().tile_size() * self.settings.switch_threshold_ratio
    }

    /// Handles a tap while the entity stands at `entity`.
    ///
    /// A found path replaces the current one and publishes
    /// [`WalkSignal::PathStarted`]. An unreachable or off-map tap drops the
    /// current path and publishes [`WalkSignal::Stopped`]. While the round
    /// is over the tap is ignored without searching.
    pub fn tap(&mut self, tap: TapInput, entity: WorldPoint) -> TapOutcome {
        if self.state.over {
            debug!(tap = %tap.position, "Tap ignored, round is over");
            return TapOutcome::Ignored;
        }

        let frame = self.grids.frame();
        let target = tap.world_position();
        let path = match (frame.world_to_grid(entity), frame.world_to_grid(target)) {
            (Some(start), Some(goal)) => astar::find_path(&self.grids, start, goal),
            (start, goal) => {
                debug!(%entity, %target, ?start, ?goal, "Tap or entity outside map");
                Vec::new()
            }
        };

        match path.last().copied() {
            Some(goal) => {
                let waypoints = path.len();
                info!(%goal, waypoints, "Walking to tapped tile");
                self.state.start(path);
                self.signals.publish(WalkSignal::PathStarted { goal, waypoints });
                TapOutcome::Started { waypoints }
            }
            None => {
                debug!(%target, "No path to tapped position");
                self.state.clear_path();
                self.signals.publish(WalkSignal::Stopped);
                TapOutcome::Unreachable
            }
        }
    }

    /// Advances the entity by one frame.
    ///
    /// `entity` is the entity's current position, or `None` if the entity no
    /// longer exists, in which case nothing happens. Returns the new
    /// position, which is also published as [`WalkSignal::PositionUpdate`].
    /// Returns `None` when idle, over, or on the frame the path completes.
    pub fn tick(&mut self, entity: Option<WorldPoint>, dt: f32) -> Option<WorldPoint> {
        if !self.state.is_moving() {
            return None;
        }
        let Some(position) = entity else {
            trace!("Entity gone, skipping walk tick");
            return None;
        };
        if !(dt.is_finite() && dt >= 0.0) {
            warn!(dt, "Ignoring walk tick with invalid frame delta");
            return None;
        }

        let frame = *self.grids.frame();
        let mut target = frame.grid_to_world(self.state.path[self.state.current_waypoint]);

        if position.distance(target) < self.switch_threshold() {
            self.state.current_waypoint += 1;
            if self.state.current_waypoint >= self.state.path.len() {
                info!(%position, "Reached end of path");
                self.state.clear_path();
                self.signals.publish(WalkSignal::Stopped);
                return None;
            }
            target = frame.grid_to_world(self.state.path[self.state.current_waypoint]);
            trace!(
                waypoint = self.state.current_waypoint,
                %target,
                "Switched to next waypoint"
            );
        }

        let to_target = target - position;
        let step = (self.settings.move_speed * dt).min(to_target.length());
        let next = position + to_target.normalize().scale(step);

        self.signals.publish(WalkSignal::PositionUpdate(next));
        Some(next)
    }

    /// Reacts to a game lifecycle event.
    pub fn handle(&mut self, event: LifecycleEvent) {
        match event {
            LifecycleEvent::GameWin | LifecycleEvent::GameFail => {
                let was_moving = self.state.clear_path();
                self.state.over = true;
                info!(?event, was_moving, "Round over, walking disabled");
                if was_moving {
                    self.signals.publish(WalkSignal::Stopped);
                }
            }
            LifecycleEvent::GameStart | LifecycleEvent::GameReset => {
                let was_moving = self.state.clear_path();
                self.state.over = false;
                info!(?event, "Walking enabled");
                if was_moving {
                    self.signals.publish(WalkSignal::Stopped);
                }
            }
            LifecycleEvent::StopWalking => {
                if self.state.clear_path() {
                    debug!("Walking stopped externally");
                }
            }
        }
    }
}
