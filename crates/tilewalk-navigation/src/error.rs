//! Error types for the `tilewalk-navigation` crate.

#![warn(missing_docs)]

use thiserror::Error;

/// Errors raised while turning tile-map data into walk grids.
///
/// Every variant is a configuration problem: a map that fails here would
/// otherwise produce grids on which no path can ever be found, so the
/// builder refuses to produce them at all.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum GridError {
    /// A named tile layer does not exist in the map.
    #[error("tile layer `{0}` not found in map")]
    MissingLayer(String),
    /// The ground and walk layers do not cover the same number of cells.
    #[error(
        "layer size mismatch: `{ground}` is {ground_width}x{ground_height}, `{walk}` is {walk_width}x{walk_height}"
    )]
    LayerSizeMismatch {
        /// Name of the ground layer.
        ground: String,
        /// Width of the ground layer in tiles.
        ground_width: usize,
        /// Height of the ground layer in tiles.
        ground_height: usize,
        /// Name of the walk layer.
        walk: String,
        /// Width of the walk layer in tiles.
        walk_width: usize,
        /// Height of the walk layer in tiles.
        walk_height: usize,
    },
    /// A layer is empty or its tile data does not fill `width * height`.
    #[error("invalid layer dimensions for `{layer}`: {reason}")]
    InvalidDimensions {
        /// Name of the offending layer.
        layer: String,
        /// Human readable description of what is wrong.
        reason: String,
    },
    /// Tile width is zero, negative or not a number.
    #[error("invalid tile size {0}: must be positive")]
    InvalidTileSize(f32),
}
