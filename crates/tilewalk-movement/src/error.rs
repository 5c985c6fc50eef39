//! Error types for the `tilewalk-movement` crate.

use thiserror::Error;

/// Invalid driver settings, reported when the driver is created.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum MovementError {
    /// Move speed must be a positive, finite number of world units per second.
    #[error("invalid move speed {0}: must be positive and finite")]
    InvalidMoveSpeed(f32),
    /// The waypoint switch threshold is a fraction of the tile size in `(0, 1]`.
    #[error("invalid switch threshold ratio {0}: must be in (0, 1]")]
    InvalidSwitchThreshold(f32),
}
