//! Binary tile grids.
//!
//! A [`TileGrid`] holds one flag per tile. The walk planner uses two of them
//! over the same map: one where a set flag means the tile is blocked, one
//! where a set flag means the tile is walkable but costly.

#![warn(missing_docs)]

use super::GridPoint;
use crate::error::GridError;

/// A `width x height` matrix of flags stored row-major.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct TileGrid {
    /// Width of the grid in tiles
    width: usize,
    /// Height of the grid in tiles
    height: usize,
    /// One flag per tile, index `y * width + x`
    data: Vec<bool>,
}

impl TileGrid {
    /// Creates a grid with every flag cleared.
    ///
    /// # Arguments
    /// * `width` - Width of the grid in tiles
    /// * `height` - Height of the grid in tiles
    ///
    /// # Returns
    /// * `Result<Self, GridError>` - The grid or an error if a dimension is zero
    pub fn new(width: usize, height: usize) -> Result<Self, GridError> {
        Self::check_dims("grid", width, height)?;
        Ok(TileGrid {
            width,
            height,
            data: vec![false; width * height],
        })
    }

    /// Creates a grid from row-major flags.
    pub fn from_flags(width: usize, height: usize, data: Vec<bool>) -> Result<Self, GridError> {
        Self::check_dims("grid", width, height)?;
        if data.len() != width * height {
            return Err(GridError::InvalidDimensions {
                layer: "grid".into(),
                reason: format!("expected {} cells, got {}", width * height, data.len()),
            });
        }
        Ok(TileGrid {
            width,
            height,
            data,
        })
    }

    /// Parses rows of `.` (clear) and `#` (set); any other non-space
    /// character also counts as set. Handy in tests and demos.
    pub fn from_rows<S: AsRef<str>>(rows: &[S]) -> Result<Self, GridError> {
        let height = rows.len();
        let width = rows.first().map(|r| r.as_ref().trim().chars().count()).unwrap_or(0);
        Self::check_dims("grid", width, height)?;

        let mut data = Vec::with_capacity(width * height);
        for (y, row) in rows.iter().enumerate() {
            let row = row.as_ref().trim();
            if row.chars().count() != width {
                return Err(GridError::InvalidDimensions {
                    layer: "grid".into(),
                    reason: format!("row {} has {} cells, expected {}", y, row.chars().count(), width),
                });
            }
            data.extend(row.chars().map(|c| c != '.'));
        }
        Ok(TileGrid {
            width,
            height,
            data,
        })
    }

    pub(crate) fn check_dims(layer: &str, width: usize, height: usize) -> Result<(), GridError> {
        if width == 0 || height == 0 {
            return Err(GridError::InvalidDimensions {
                layer: layer.to_string(),
                reason: "width and height must be non-zero".into(),
            });
        }
        if width.checked_mul(height).is_none() {
            return Err(GridError::InvalidDimensions {
                layer: layer.to_string(),
                reason: "dimensions too large, would overflow".into(),
            });
        }
        Ok(())
    }

    fn get_index(&self, p: GridPoint) -> usize {
        p.y * self.width + p.x
    }

    /// Width of the grid in tiles.
    pub fn width(&self) -> usize {
        self.width
    }

    /// Height of the grid in tiles.
    pub fn height(&self) -> usize {
        self.height
    }

    /// `(width, height)` in tiles.
    pub fn dims(&self) -> (usize, usize) {
        (self.width, self.height)
    }

    /// Returns true if `p` lies inside the grid.
    pub fn contains(&self, p: GridPoint) -> bool {
        p.x < self.width && p.y < self.height
    }

    /// Returns the flag at `p`, or `None` outside the grid.
    pub fn get(&self, p: GridPoint) -> Option<bool> {
        if self.contains(p) {
            Some(self.data[self.get_index(p)])
        } else {
            None
        }
    }

    /// Returns true if `p` is inside the grid and its flag is set.
    pub fn is_set(&self, p: GridPoint) -> bool {
        self.get(p).unwrap_or(false)
    }

    /// Returns the cell as the 0/1 value used by tile tooling.
    pub fn cell_at(&self, p: GridPoint) -> Option<u8> {
        self.get(p).map(u8::from)
    }

    /// Sets the flag at `p`. Points outside the grid are ignored and
    /// reported by the return value.
    pub fn set(&mut self, p: GridPoint, flag: bool) -> bool {
        if !self.contains(p) {
            return false;
        }
        let index = self.get_index(p);
        self.data[index] = flag;
        true
    }

    /// Number of set flags.
    pub fn count_set(&self) -> usize {
        self.data.iter().filter(|f| **f).count()
    }

    /// Iterates over every set point in row-major order.
    pub fn iter_set(&self) -> impl Iterator<Item = GridPoint> + '_ {
        self.data
            .iter()
            .enumerate()
            .filter(|(_, f)| **f)
            .map(|(i, _)| GridPoint::new(i % self.width, i / self.width))
    }
}

impl std::fmt::Display for TileGrid {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "TileGrid ({}x{})", self.width, self.height)?;
        for y in 0..self.height {
            for x in 0..self.width {
                let c = if self.data[y * self.width + x] { '#' } else { '.' };
                write!(f, "{}", c)?;
            }
            writeln!(f)?;
        }
        Ok(())
    }
}
