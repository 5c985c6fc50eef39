//! Builds the ground and walk grids from named tile layers.

#![warn(missing_docs)]

use tracing::{debug, info};

use super::{GridPoint, MapFrame, TileGrid, WorldPoint};
use crate::error::GridError;

/// One layer of tile ids, row-major, as exported by the map editor.
///
/// A gid of `0` means no tile is placed at that position.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct TileLayer {
    /// Layer name as authored in the map.
    pub name: String,
    /// Width in tiles.
    pub width: usize,
    /// Height in tiles.
    pub height: usize,
    /// Tile ids, index `y * width + x`.
    pub gids: Vec<u32>,
}

impl TileLayer {
    /// Creates a layer from raw tile ids.
    pub fn new(name: impl Into<String>, width: usize, height: usize, gids: Vec<u32>) -> Self {
        Self {
            name: name.into(),
            width,
            height,
            gids,
        }
    }

    /// Creates a layer from rows where `.` is an empty tile and any other
    /// character places tile id `1`.
    pub fn from_rows<S: AsRef<str>>(name: impl Into<String>, rows: &[S]) -> Self {
        let height = rows.len();
        let width = rows.first().map(|r| r.as_ref().trim().chars().count()).unwrap_or(0);
        let gids = rows
            .iter()
            .flat_map(|r| r.as_ref().trim().chars().map(|c| u32::from(c != '.')).collect::<Vec<_>>())
            .collect();
        Self::new(name, width, height, gids)
    }

    /// Tile id at `(x, y)`; `0` outside the layer.
    pub fn gid_at(&self, x: usize, y: usize) -> u32 {
        if x < self.width && y < self.height {
            self.gids.get(y * self.width + x).copied().unwrap_or(0)
        } else {
            0
        }
    }

    /// Returns true if a tile is placed at `(x, y)`.
    pub fn has_tile(&self, x: usize, y: usize) -> bool {
        self.gid_at(x, y) != 0
    }

    fn validate(&self) -> Result<(), GridError> {
        TileGrid::check_dims(&self.name, self.width, self.height)?;
        if self.gids.len() != self.width * self.height {
            return Err(GridError::InvalidDimensions {
                layer: self.name.clone(),
                reason: format!(
                    "expected {} tile ids for {}x{}, got {}",
                    self.width * self.height,
                    self.width,
                    self.height,
                    self.gids.len()
                ),
            });
        }
        Ok(())
    }
}

/// Anything that can hand out named tile layers.
pub trait TileLayerSource {
    /// Looks up a layer by name.
    fn layer(&self, name: &str) -> Option<&TileLayer>;

    /// Width of one tile in world units.
    fn tile_width(&self) -> f32;
}

/// A tile map held in memory: a tile size and a list of layers.
#[derive(Debug, Clone, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct TileMapData {
    /// Width of one tile in world units.
    pub tile_width: f32,
    /// Layers in authoring order.
    pub layers: Vec<TileLayer>,
}

impl TileMapData {
    /// Creates a map with no layers.
    pub fn new(tile_width: f32) -> Self {
        Self {
            tile_width,
            layers: Vec::new(),
        }
    }

    /// Adds a layer, builder style.
    pub fn with_layer(mut self, layer: TileLayer) -> Self {
        self.layers.push(layer);
        self
    }
}

impl TileLayerSource for TileMapData {
    fn layer(&self, name: &str) -> Option<&TileLayer> {
        self.layers.iter().find(|l| l.name == name)
    }

    fn tile_width(&self) -> f32 {
        self.tile_width
    }
}

/// Names of the two layers the builder reads.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct LayerNames {
    /// Layer whose tiles block movement.
    pub ground: String,
    /// Layer whose tiles make movement costlier.
    pub walk: String,
}

impl Default for LayerNames {
    fn default() -> Self {
        Self {
            ground: "ground".into(),
            walk: "walk".into(),
        }
    }
}

/// How a placed tile maps onto a grid flag.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum PresenceRule {
    /// A placed tile sets the flag (blocked / penalized).
    #[default]
    MarksCell,
    /// A placed tile clears the flag; empty positions are set. For maps
    /// authored by painting the walkable area instead of the obstacles.
    ClearsCell,
}

impl PresenceRule {
    fn flag(self, has_tile: bool) -> bool {
        match self {
            PresenceRule::MarksCell => has_tile,
            PresenceRule::ClearsCell => !has_tile,
        }
    }
}

/// The two same-shaped grids plus the frame used to place them in the world.
#[derive(Debug, Clone, PartialEq)]
pub struct WalkGrids {
    ground: TileGrid,
    walk: TileGrid,
    frame: MapFrame,
}

impl WalkGrids {
    /// Bundles two grids with a frame, checking that all three agree on size.
    pub fn new(ground: TileGrid, walk: TileGrid, frame: MapFrame) -> Result<Self, GridError> {
        if ground.dims() != walk.dims() {
            return Err(GridError::LayerSizeMismatch {
                ground: "ground".into(),
                ground_width: ground.width(),
                ground_height: ground.height(),
                walk: "walk".into(),
                walk_width: walk.width(),
                walk_height: walk.height(),
            });
        }
        if ground.dims() != (frame.cols(), frame.rows()) {
            return Err(GridError::InvalidDimensions {
                layer: "ground".into(),
                reason: format!(
                    "grid is {}x{} but frame is {}x{}",
                    ground.width(),
                    ground.height(),
                    frame.cols(),
                    frame.rows()
                ),
            });
        }
        Ok(Self { ground, walk, frame })
    }

    /// Builds grids from `.`/`#` rows, mostly for tests and demos.
    pub fn from_rows<S: AsRef<str>>(ground: &[S], walk: &[S], tile_size: f32) -> Result<Self, GridError> {
        let ground = TileGrid::from_rows(ground)?;
        let walk = TileGrid::from_rows(walk)?;
        let frame = MapFrame::new(ground.width(), ground.height(), tile_size)?;
        Self::new(ground, walk, frame)
    }

    /// Blocked tiles.
    pub fn ground(&self) -> &TileGrid {
        &self.ground
    }

    /// Penalized tiles.
    pub fn walk(&self) -> &TileGrid {
        &self.walk
    }

    /// World transform of the map.
    pub fn frame(&self) -> &MapFrame {
        &self.frame
    }

    /// `(cols, rows)` shared by both grids.
    pub fn dims(&self) -> (usize, usize) {
        self.ground.dims()
    }
}

/// Reads the ground and walk layers out of a map.
#[derive(Debug, Clone, Default)]
pub struct GridBuilder {
    names: LayerNames,
    presence: PresenceRule,
}

impl GridBuilder {
    /// Builder with the default layer names and presence rule.
    pub fn new() -> Self {
        Self::default()
    }

    /// Overrides the layer names.
    pub fn with_layer_names(mut self, names: LayerNames) -> Self {
        self.names = names;
        self
    }

    /// Overrides how placed tiles translate into flags.
    pub fn with_presence(mut self, presence: PresenceRule) -> Self {
        self.presence = presence;
        self
    }

    /// Builds both grids.
    ///
    /// # Errors
    /// * [`GridError::MissingLayer`] if either named layer is absent
    /// * [`GridError::LayerSizeMismatch`] if the layers differ in size
    /// * [`GridError::InvalidDimensions`] for empty or short layers
    /// * [`GridError::InvalidTileSize`] for a non-positive tile width
    pub fn build<S: TileLayerSource + ?Sized>(&self, source: &S) -> Result<WalkGrids, GridError> {
        let ground_layer = source
            .layer(&self.names.ground)
            .ok_or_else(|| GridError::MissingLayer(self.names.ground.clone()))?;
        let walk_layer = source
            .layer(&self.names.walk)
            .ok_or_else(|| GridError::MissingLayer(self.names.walk.clone()))?;

        ground_layer.validate()?;
        walk_layer.validate()?;

        if (ground_layer.width, ground_layer.height) != (walk_layer.width, walk_layer.height) {
            return Err(GridError::LayerSizeMismatch {
                ground: ground_layer.name.clone(),
                ground_width: ground_layer.width,
                ground_height: ground_layer.height,
                walk: walk_layer.name.clone(),
                walk_width: walk_layer.width,
                walk_height: walk_layer.height,
            });
        }

        let frame = MapFrame::new(ground_layer.width, ground_layer.height, source.tile_width())?;
        let ground = self.layer_grid(ground_layer)?;
        let walk = self.layer_grid(walk_layer)?;

        info!(
            cols = frame.cols(),
            rows = frame.rows(),
            tile_size = frame.tile_size(),
            "Built walk grids"
        );
        debug!(
            blocked = ground.count_set(),
            penalized = walk.count_set(),
            "Walk grid cell counts"
        );

        WalkGrids::new(ground, walk, frame)
    }

    fn layer_grid(&self, layer: &TileLayer) -> Result<TileGrid, GridError> {
        let mut flags = Vec::with_capacity(layer.width * layer.height);
        for y in 0..layer.height {
            for x in 0..layer.width {
                flags.push(self.presence.flag(layer.has_tile(x, y)));
            }
        }
        TileGrid::from_flags(layer.width, layer.height, flags)
    }
}

/// World positions (tile centers) of every placed tile in a layer.
pub fn layer_world_positions<S: TileLayerSource + ?Sized>(
    source: &S,
    layer_name: &str,
    frame: &MapFrame,
) -> Result<Vec<WorldPoint>, GridError> {
    let layer = source
        .layer(layer_name)
        .ok_or_else(|| GridError::MissingLayer(layer_name.to_string()))?;

    let mut positions = Vec::new();
    for y in 0..layer.height {
        for x in 0..layer.width {
            if layer.has_tile(x, y) {
                positions.push(frame.grid_to_world(GridPoint::new(x, y)));
            }
        }
    }
    Ok(positions)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_map() -> TileMapData {
        TileMapData::new(50.0)
            .with_layer(TileLayer::from_rows("ground", &["..#", "...", "#.."]))
            .with_layer(TileLayer::from_rows("walk", &["...", ".#.", "..."]))
    }

    #[test]
    fn test_build_marks_present_tiles() {
        let grids = GridBuilder::new().build(&sample_map()).unwrap();
        assert_eq!(grids.ground().dims(), grids.walk().dims());
        assert_eq!(grids.dims(), (3, 3));
        assert!(grids.ground().is_set(GridPoint::new(2, 0)));
        assert!(grids.ground().is_set(GridPoint::new(0, 2)));
        assert!(!grids.ground().is_set(GridPoint::new(1, 1)));
        assert!(grids.walk().is_set(GridPoint::new(1, 1)));
        assert_eq!(grids.walk().count_set(), 1);
        assert_eq!(grids.frame().tile_size(), 50.0);
    }

    #[test]
    fn test_build_inverted_presence() {
        let grids = GridBuilder::new()
            .with_presence(PresenceRule::ClearsCell)
            .build(&sample_map())
            .unwrap();
        assert!(!grids.ground().is_set(GridPoint::new(2, 0)));
        assert!(grids.ground().is_set(GridPoint::new(1, 1)));
        assert_eq!(grids.walk().count_set(), 8);
    }

    #[test]
    fn test_missing_layer_fails() {
        let map = TileMapData::new(50.0).with_layer(TileLayer::from_rows("ground", &["..."]));
        let err = GridBuilder::new().build(&map).unwrap_err();
        assert_eq!(err, GridError::MissingLayer("walk".into()));

        let renamed = GridBuilder::new().with_layer_names(LayerNames {
            ground: "obstacles".into(),
            walk: "ground".into(),
        });
        assert_eq!(
            renamed.build(&map).unwrap_err(),
            GridError::MissingLayer("obstacles".into())
        );
    }

    #[test]
    fn test_custom_layer_names() {
        let map = TileMapData::new(32.0)
            .with_layer(TileLayer::from_rows("walls", &["#.", ".."]))
            .with_layer(TileLayer::from_rows("mud", &["..", ".#"]));
        let grids = GridBuilder::new()
            .with_layer_names(LayerNames {
                ground: "walls".into(),
                walk: "mud".into(),
            })
            .build(&map)
            .unwrap();
        assert!(grids.ground().is_set(GridPoint::new(0, 0)));
        assert!(grids.walk().is_set(GridPoint::new(1, 1)));
    }

    #[test]
    fn test_size_mismatch_fails() {
        let map = TileMapData::new(50.0)
            .with_layer(TileLayer::from_rows("ground", &["...", "..."]))
            .with_layer(TileLayer::from_rows("walk", &["..", ".."]));
        assert!(matches!(
            GridBuilder::new().build(&map),
            Err(GridError::LayerSizeMismatch { .. })
        ));
    }

    #[test]
    fn test_short_layer_and_bad_tile_size() {
        let map = TileMapData::new(50.0)
            .with_layer(TileLayer::new("ground", 2, 2, vec![0, 0, 0]))
            .with_layer(TileLayer::new("walk", 2, 2, vec![0; 4]));
        assert!(matches!(
            GridBuilder::new().build(&map),
            Err(GridError::InvalidDimensions { .. })
        ));

        let mut zero_tiles = sample_map();
        zero_tiles.tile_width = 0.0;
        assert!(matches!(
            GridBuilder::new().build(&zero_tiles),
            Err(GridError::InvalidTileSize(_))
        ));
    }

    #[test]
    fn test_layer_world_positions() {
        let map = sample_map();
        let grids = GridBuilder::new().build(&map).unwrap();
        let positions = layer_world_positions(&map, "ground", grids.frame()).unwrap();
        // 3x3 map of 50px tiles: tile (2, 0) is top-right, (0, 2) bottom-left.
        assert_eq!(positions, vec![WorldPoint::new(50.0, 50.0), WorldPoint::new(-50.0, -50.0)]);
        assert!(matches!(
            layer_world_positions(&map, "props", grids.frame()),
            Err(GridError::MissingLayer(_))
        ));
    }

    #[test]
    fn test_walk_grids_checks_dims() {
        let err = WalkGrids::from_rows(&["...", "..."], &["..", ".."], 10.0).unwrap_err();
        assert!(matches!(err, GridError::LayerSizeMismatch { .. }));
    }
}
