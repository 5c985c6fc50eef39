//! Tile-map navigation for point-and-click movement.
//!
//! [`map::GridBuilder`] reads a ground layer (blocked tiles) and a walk layer
//! (costly tiles) into [`map::WalkGrids`]; [`astar::find_path`] searches them
//! with an octile heuristic, no corner cutting and a terrain bias that
//! favours tiles absent from the walk layer.

pub mod astar;
pub mod error;
pub mod map;

pub use astar::{PathResult, find_path, find_path_detailed, find_path_world, octile_distance};
pub use error::GridError;
pub use map::{
    GridBuilder, GridPoint, LayerNames, MapFrame, PresenceRule, TileGrid, TileLayer,
    TileLayerSource, TileMapData, WalkGrids, WorldPoint,
};
