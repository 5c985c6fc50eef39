use parking_lot::RwLock;
use std::{sync::Arc, time::Instant};

use tilewalk_navigation::WorldPoint;

#[derive(Debug, Clone)]
pub struct State {
    /// Entity position; `None` once the entity is gone.
    pub entity: Option<WorldPoint>,
    pub stops: u32,
    pub last_signal_ts: Instant,
}

impl Default for State {
    fn default() -> Self {
        State {
            entity: None,
            stops: 0,
            last_signal_ts: Instant::now(),
        }
    }
}

impl State {
    pub fn spawned_at(position: WorldPoint) -> Self {
        State {
            entity: Some(position),
            ..State::default()
        }
    }
}

pub type Blackboard = Arc<RwLock<State>>;

pub fn snapshot(bb: &Blackboard) -> State {
    (*bb.read()).clone()
}

pub fn set_position(bb: &Blackboard, position: WorldPoint) {
    bb.write().entity = Some(position);
}

pub fn despawn(bb: &Blackboard) {
    bb.write().entity = None;
}

pub fn touch_signal(bb: &Blackboard) {
    bb.write().last_signal_ts = Instant::now();
}

pub fn record_stop(bb: &Blackboard) {
    let mut g = bb.write();
    g.stops += 1;
    g.last_signal_ts = Instant::now();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_position_and_despawn() {
        let bb: Blackboard = Arc::new(RwLock::new(State::spawned_at(WorldPoint::new(1.0, 2.0))));
        assert_eq!(snapshot(&bb).entity, Some(WorldPoint::new(1.0, 2.0)));

        set_position(&bb, WorldPoint::new(3.0, 4.0));
        assert_eq!(snapshot(&bb).entity, Some(WorldPoint::new(3.0, 4.0)));

        despawn(&bb);
        assert_eq!(snapshot(&bb).entity, None);
    }

    #[test]
    fn test_stops_counted() {
        let bb: Blackboard = Arc::default();
        record_stop(&bb);
        record_stop(&bb);
        assert_eq!(snapshot(&bb).stops, 2);
    }

    #[test]
    fn test_signals_refresh_timestamp() {
        let bb: Blackboard = Arc::default();
        let before = snapshot(&bb).last_signal_ts;

        touch_signal(&bb);
        let touched = snapshot(&bb).last_signal_ts;
        assert!(touched >= before);

        record_stop(&bb);
        assert!(snapshot(&bb).last_signal_ts >= touched);
    }
}
