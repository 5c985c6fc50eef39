use std::fmt;

use tilewalk_navigation::{GridPoint, WorldPoint};

/// Signals published by the driver for whoever renders or reacts to
/// movement (click effect, position updater, footstep audio).
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum WalkSignal {
    /// A tap produced a path; play the click effect.
    PathStarted {
        /// Final tile of the new path.
        goal: GridPoint,
        /// Number of waypoints, start tile included.
        waypoints: usize,
    },
    /// New entity position for this frame.
    PositionUpdate(WorldPoint),
    /// The path ran out, was cancelled, or a tap found no path.
    Stopped,
}

impl fmt::Display for WalkSignal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            WalkSignal::PathStarted { goal, waypoints } => {
                write!(f, "PathStarted(goal: {}, waypoints: {})", goal, waypoints)
            }
            WalkSignal::PositionUpdate(p) => write!(f, "PositionUpdate{}", p),
            WalkSignal::Stopped => write!(f, "Stopped"),
        }
    }
}

/// Game lifecycle events the driver reacts to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum LifecycleEvent {
    /// Round started; taps are accepted again.
    GameStart,
    /// Round reset; taps are accepted again.
    GameReset,
    /// Player won; taps are ignored until start/reset.
    GameWin,
    /// Player lost; taps are ignored until start/reset.
    GameFail,
    /// Someone else halted the walker (cutscene, dialog). Drops the current
    /// path without publishing `Stopped`, since the sender already knows.
    StopWalking,
}

impl LifecycleEvent {
    /// True for the events that end a round.
    pub fn ends_round(&self) -> bool {
        matches!(self, LifecycleEvent::GameWin | LifecycleEvent::GameFail)
    }
}

/// One tap on the tile map.
///
/// `position` is already in the map node's local space; the host converts
/// from screen space before handing it over.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct TapInput {
    /// Tap location in map-local coordinates.
    pub position: WorldPoint,
    /// Camera translation to add, if the camera has scrolled.
    pub camera_offset: Option<WorldPoint>,
}

impl TapInput {
    /// Tap with no camera offset.
    pub fn new(position: WorldPoint) -> Self {
        Self {
            position,
            camera_offset: None,
        }
    }

    /// Adds a camera offset.
    pub fn with_camera_offset(mut self, offset: WorldPoint) -> Self {
        self.camera_offset = Some(offset);
        self
    }

    /// Tap location in world coordinates.
    pub fn world_position(&self) -> WorldPoint {
        match self.camera_offset {
            Some(offset) => self.position + offset,
            None => self.position,
        }
    }
}

/// What a tap did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TapOutcome {
    /// A new path replaced whatever was running.
    Started {
        /// Number of waypoints in the new path.
        waypoints: usize,
    },
    /// No path to the tapped tile; any running path was dropped.
    Unreachable,
    /// The round is over; the tap was not looked at.
    Ignored,
}
