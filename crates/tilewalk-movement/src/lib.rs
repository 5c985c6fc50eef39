//! Point-and-click walking on a tile map.
//!
//! A [`WalkDriver`] owns the movement state of one entity. Feed it taps and
//! lifecycle events, call [`WalkDriver::tick`] once per frame, and listen on
//! its [`Topic`] for [`WalkSignal`]s.

pub mod bus;
pub mod driver;
pub mod error;
pub mod events;

pub use bus::Topic;
pub use driver::{MovementState, WalkDriver, WalkPhase, WalkSettings};
pub use error::MovementError;
pub use events::{LifecycleEvent, TapInput, TapOutcome, WalkSignal};
