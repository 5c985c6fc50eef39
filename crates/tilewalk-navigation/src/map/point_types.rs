use std::fmt;
use std::ops::{Add, Sub};

/// Represents a point in grid coordinates (cell indices).
///
/// `x` is the column and `y` the row, counted from the top-left tile of the
/// layer.
#[derive(Debug, Default, Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct GridPoint {
    /// The x-coordinate (column index) in the grid.
    pub x: usize,
    /// The y-coordinate (row index) in the grid.
    pub y: usize,
}

impl GridPoint {
    /// Creates a new `GridPoint`.
    #[must_use]
    pub const fn new(x: usize, y: usize) -> Self {
        Self { x, y }
    }

    /// Returns true if `other` is one of the eight cells surrounding `self`.
    pub fn is_adjacent(&self, other: &GridPoint) -> bool {
        let dx = self.x.abs_diff(other.x);
        let dy = self.y.abs_diff(other.y);
        dx <= 1 && dy <= 1 && (dx, dy) != (0, 0)
    }
}

impl From<(usize, usize)> for GridPoint {
    fn from((x, y): (usize, usize)) -> Self {
        Self::new(x, y)
    }
}

impl fmt::Display for GridPoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.x, self.y)
    }
}

/// Represents a point in the scene's local coordinate space (pixels, y up).
#[derive(Debug, Default, Clone, Copy, PartialEq, PartialOrd)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct WorldPoint {
    /// The x-coordinate.
    pub x: f32,
    /// The y-coordinate.
    pub y: f32,
}

impl WorldPoint {
    /// Creates a new `WorldPoint`.
    #[must_use]
    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    /// Euclidean length of the point taken as a vector.
    pub fn length(&self) -> f32 {
        self.x.hypot(self.y)
    }

    /// Euclidean distance to `other`.
    pub fn distance(&self, other: WorldPoint) -> f32 {
        (other - *self).length()
    }

    /// Unit vector in the same direction, or zero for a zero-length input.
    pub fn normalize(&self) -> WorldPoint {
        let len = self.length();
        if len > 0.0 {
            WorldPoint::new(self.x / len, self.y / len)
        } else {
            WorldPoint::default()
        }
    }

    /// Multiplies both components by `s`.
    pub fn scale(&self, s: f32) -> WorldPoint {
        WorldPoint::new(self.x * s, self.y * s)
    }
}

impl Add for WorldPoint {
    type Output = WorldPoint;

    fn add(self, rhs: WorldPoint) -> WorldPoint {
        WorldPoint::new(self.x + rhs.x, self.y + rhs.y)
    }
}

impl Sub for WorldPoint {
    type Output = WorldPoint;

    fn sub(self, rhs: WorldPoint) -> WorldPoint {
        WorldPoint::new(self.x - rhs.x, self.y - rhs.y)
    }
}

impl fmt::Display for WorldPoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({:.2}, {:.2})", self.x, self.y)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_adjacency() {
        let p = GridPoint::new(1, 1);
        assert!(p.is_adjacent(&GridPoint::new(0, 0)));
        assert!(p.is_adjacent(&GridPoint::new(2, 1)));
        assert!(!p.is_adjacent(&GridPoint::new(1, 1)));
        assert!(!p.is_adjacent(&GridPoint::new(3, 1)));
    }

    #[test]
    fn test_normalize_zero() {
        assert_eq!(WorldPoint::default().normalize(), WorldPoint::default());
        let n = WorldPoint::new(3.0, 4.0).normalize();
        assert!((n.x - 0.6).abs() < 1e-6);
        assert!((n.y - 0.8).abs() < 1e-6);
    }
}
