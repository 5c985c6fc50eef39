//! Map-related functionality for tile walking.
//!
//! This module provides the binary tile grids, the world/tile frame
//! transform and the builder that reads both grids from tile layers.

pub mod builder;
pub mod frame;
pub mod point_types;
pub mod tile_grid;

pub use builder::{
    GridBuilder, LayerNames, PresenceRule, TileLayer, TileLayerSource, TileMapData, WalkGrids,
    layer_world_positions,
};
pub use frame::MapFrame;
pub use point_types::{GridPoint, WorldPoint};
pub use tile_grid::TileGrid;
