//! Conversion between scene coordinates and tile indices.
//!
//! The map is centered on the scene origin. World `y` grows upwards while
//! tile rows grow downwards, so row 0 is the top edge of the map.

use super::{GridPoint, WorldPoint};
use crate::error::GridError;

/// Fixed transform between [`WorldPoint`] and [`GridPoint`] for one map.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct MapFrame {
    cols: usize,
    rows: usize,
    tile_size: f32,
}

impl MapFrame {
    /// Creates a frame for a `cols x rows` map of square tiles.
    pub fn new(cols: usize, rows: usize, tile_size: f32) -> Result<Self, GridError> {
        if !(tile_size.is_finite() && tile_size > 0.0) {
            return Err(GridError::InvalidTileSize(tile_size));
        }
        crate::map::TileGrid::check_dims("frame", cols, rows)?;
        Ok(Self {
            cols,
            rows,
            tile_size,
        })
    }

    /// Number of tile columns.
    pub fn cols(&self) -> usize {
        self.cols
    }

    /// Number of tile rows.
    pub fn rows(&self) -> usize {
        self.rows
    }

    /// Side length of one tile in world units.
    pub fn tile_size(&self) -> f32 {
        self.tile_size
    }

    /// World position of the map's top-left corner.
    pub fn top_left(&self) -> WorldPoint {
        WorldPoint::new(
            -(self.cols as f32) * self.tile_size / 2.0,
            self.rows as f32 * self.tile_size / 2.0,
        )
    }

    /// Converts a world position to the tile containing it.
    ///
    /// Returns `None` when the position falls outside the map.
    pub fn world_to_grid(&self, p: WorldPoint) -> Option<GridPoint> {
        let origin = self.top_left();
        let gx = ((p.x - origin.x) / self.tile_size).floor();
        let gy = ((origin.y - p.y) / self.tile_size).floor();

        if !gx.is_finite() || !gy.is_finite() {
            return None;
        }
        if gx < 0.0 || gy < 0.0 || gx >= self.cols as f32 || gy >= self.rows as f32 {
            return None;
        }
        Some(GridPoint::new(gx as usize, gy as usize))
    }

    /// World position of the center of tile `g`.
    ///
    /// The conversion is defined for any index, including ones past the map
    /// edge; callers that need a bounds check use [`MapFrame::contains`].
    pub fn grid_to_world(&self, g: GridPoint) -> WorldPoint {
        let origin = self.top_left();
        let half = self.tile_size / 2.0;
        WorldPoint::new(
            origin.x + g.x as f32 * self.tile_size + half,
            origin.y - (g.y as f32 + 1.0) * self.tile_size + half,
        )
    }

    /// Returns true if `g` is a tile of this map.
    pub fn contains(&self, g: GridPoint) -> bool {
        g.x < self.cols && g.y < self.rows
    }

    /// Bottom-left and top-right corners of the map in world coordinates.
    pub fn world_bounds(&self) -> (WorldPoint, WorldPoint) {
        let top_left = self.top_left();
        (
            WorldPoint::new(top_left.x, -top_left.y),
            WorldPoint::new(-top_left.x, top_left.y),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn frame() -> MapFrame {
        MapFrame::new(4, 2, 50.0).unwrap()
    }

    #[test]
    fn test_invalid_frame() {
        assert!(matches!(MapFrame::new(4, 2, 0.0), Err(GridError::InvalidTileSize(_))));
        assert!(matches!(MapFrame::new(4, 2, f32::NAN), Err(GridError::InvalidTileSize(_))));
        assert!(matches!(MapFrame::new(0, 2, 50.0), Err(GridError::InvalidDimensions { .. })));
    }

    #[test]
    fn test_tile_centers() {
        let f = frame();
        // 4x2 map of 50px tiles spans x in [-100, 100], y in [-50, 50].
        assert_eq!(f.grid_to_world(GridPoint::new(0, 0)), WorldPoint::new(-75.0, 25.0));
        assert_eq!(f.grid_to_world(GridPoint::new(3, 1)), WorldPoint::new(75.0, -25.0));
    }

    #[test]
    fn test_world_to_grid() {
        let f = frame();
        assert_eq!(f.world_to_grid(WorldPoint::new(-99.0, 49.0)), Some(GridPoint::new(0, 0)));
        assert_eq!(f.world_to_grid(WorldPoint::new(0.0, 0.0)), Some(GridPoint::new(2, 1)));
        assert_eq!(f.world_to_grid(WorldPoint::new(99.0, -49.0)), Some(GridPoint::new(3, 1)));
        assert_eq!(f.world_to_grid(WorldPoint::new(-101.0, 0.0)), None);
        assert_eq!(f.world_to_grid(WorldPoint::new(0.0, 51.0)), None);
        assert_eq!(f.world_to_grid(WorldPoint::new(100.0, 0.0)), None);
    }

    #[test]
    fn test_round_trip_centers() {
        let f = frame();
        for y in 0..f.rows() {
            for x in 0..f.cols() {
                let g = GridPoint::new(x, y);
                assert_eq!(f.world_to_grid(f.grid_to_world(g)), Some(g));
            }
        }
    }

    #[test]
    fn test_world_bounds() {
        let (min, max) = frame().world_bounds();
        assert_eq!(min, WorldPoint::new(-100.0, -50.0));
        assert_eq!(max, WorldPoint::new(100.0, 50.0));
    }
}
