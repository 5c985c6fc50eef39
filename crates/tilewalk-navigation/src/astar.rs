/*

A* over the ground grid, biased by the walk grid.

    f(n) = g(n) + h(n)

    g: accumulated edge cost. An edge costs 1 (cardinal) or sqrt(2)
       (diagonal), times 0.5 when the destination tile is not penalized in
       the walk grid and times 1.5 when it is.
    h: octile distance to the goal, max(dx, dy) + (sqrt(2) - 1) * min(dx, dy).

Loop:
    - pop the open entry with the lowest f; equal f pops in insertion order
    - skip it if the tile was already expanded
    - if it is the goal, walk the parent links back to the start
    - otherwise mark it expanded and relax its 8 neighbours; a diagonal step
      needs both cardinal tiles beside it to be open (no corner cutting)

*/

use std::cmp::Ordering;
use std::collections::BinaryHeap;
use std::fmt;

use tracing::trace;

use crate::map::{GridPoint, WalkGrids, WorldPoint};

const DIAGONAL_COST: f32 = std::f32::consts::SQRT_2;
const PREFERRED_FACTOR: f32 = 0.5;
const PENALIZED_FACTOR: f32 = 1.5;

/// Neighbour expansion order: four cardinal steps, then four diagonals.
const DIRECTIONS: [(isize, isize); 8] = [
    (0, 1),
    (1, 0),
    (0, -1),
    (-1, 0),
    (1, 1),
    (-1, 1),
    (1, -1),
    (-1, -1),
];

/// Represents the result of an A* search with metadata.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct PathResult {
    /// Tiles from start to goal, both inclusive. Empty when no path exists.
    pub path: Vec<GridPoint>,
    /// Accumulated weighted cost of the path.
    pub total_cost: Option<f32>,
    /// Number of tiles expanded during the search.
    pub nodes_explored: usize,
}

impl PathResult {
    /// Creates a new PathResult for a successful search.
    pub fn success(path: Vec<GridPoint>, total_cost: f32, nodes_explored: usize) -> Self {
        Self {
            path,
            total_cost: Some(total_cost),
            nodes_explored,
        }
    }

    /// Creates a new PathResult for a failed search.
    pub fn failure(nodes_explored: usize) -> Self {
        Self {
            path: Vec::new(),
            total_cost: None,
            nodes_explored,
        }
    }

    /// Returns true if a path was found.
    pub fn is_success(&self) -> bool {
        !self.path.is_empty()
    }

    /// Number of waypoints.
    pub fn len(&self) -> usize {
        self.path.len()
    }

    /// Returns true if no path was found.
    pub fn is_empty(&self) -> bool {
        self.path.is_empty()
    }

    /// Consumes the result, returning the path.
    pub fn into_path(self) -> Vec<GridPoint> {
        self.path
    }
}

impl fmt::Display for PathResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.total_cost {
            Some(cost) if self.is_success() => write!(
                f,
                "PathResult {{ success: true, path_length: {}, total_cost: {:.3}, nodes_explored: {} }}",
                self.path.len(),
                cost,
                self.nodes_explored
            ),
            _ => write!(
                f,
                "PathResult {{ success: false, nodes_explored: {} }}",
                self.nodes_explored
            ),
        }
    }
}

/// Octile distance between two tiles.
pub fn octile_distance(a: GridPoint, b: GridPoint) -> f32 {
    let dx = a.x.abs_diff(b.x) as f32;
    let dy = a.y.abs_diff(b.y) as f32;
    dx.max(dy) + (DIAGONAL_COST - 1.0) * dx.min(dy)
}

#[derive(Copy, Clone, Debug)]
struct State {
    f: f32,
    seq: u64,
    position: GridPoint,
}

// The priority queue depends on `Ord`. Flip both keys so the max-heap pops
// the lowest f first and, among equal f, the earliest insertion.
impl Ord for State {
    fn cmp(&self, other: &Self) -> Ordering {
        other
            .f
            .total_cmp(&self.f)
            .then_with(|| other.seq.cmp(&self.seq))
    }
}

impl PartialOrd for State {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl PartialEq for State {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for State {}

fn offset(p: GridPoint, (dx, dy): (isize, isize), width: usize, height: usize) -> Option<GridPoint> {
    let x = p.x.checked_add_signed(dx)?;
    let y = p.y.checked_add_signed(dy)?;
    (x < width && y < height).then_some(GridPoint::new(x, y))
}

fn reconstruct_path(parents: &[Option<GridPoint>], width: usize, goal: GridPoint) -> Vec<GridPoint> {
    let mut path = vec![goal];
    let mut current = goal;
    while let Some(previous) = parents[current.y * width + current.x] {
        path.push(previous);
        current = previous;
    }
    path.reverse();
    path
}

/// Finds a path between two tiles.
///
/// Returns the tiles from `start` to `goal` inclusive, or an empty vector if
/// the goal is blocked, either end lies outside the map, or no route exists.
pub fn find_path(grids: &WalkGrids, start: GridPoint, goal: GridPoint) -> Vec<GridPoint> {
    find_path_detailed(grids, start, goal).into_path()
}

/// Same as [`find_path`], with search metadata.
pub fn find_path_detailed(grids: &WalkGrids, start: GridPoint, goal: GridPoint) -> PathResult {
    let ground = grids.ground();
    let walk = grids.walk();
    let (width, height) = ground.dims();

    if !ground.contains(start) || !ground.contains(goal) {
        trace!(%start, %goal, "Path endpoint outside map");
        return PathResult::failure(0);
    }
    if ground.is_set(goal) {
        trace!(%goal, "Path goal is blocked");
        return PathResult::failure(0);
    }

    let index = |p: GridPoint| p.y * width + p.x;
    let mut g_score = vec![f32::INFINITY; width * height];
    let mut parents: Vec<Option<GridPoint>> = vec![None; width * height];
    let mut expanded = vec![false; width * height];
    let mut open_set = BinaryHeap::new();
    let mut seq: u64 = 0;
    let mut nodes_explored = 0;

    g_score[index(start)] = 0.0;
    open_set.push(State {
        f: octile_distance(start, goal),
        seq,
        position: start,
    });

    while let Some(State { position: current, .. }) = open_set.pop() {
        let current_index = index(current);
        if expanded[current_index] {
            continue;
        }
        nodes_explored += 1;

        if current == goal {
            let path = reconstruct_path(&parents, width, goal);
            let cost = g_score[current_index];
            trace!(len = path.len(), cost, nodes_explored, "Path found");
            return PathResult::success(path, cost, nodes_explored);
        }
        expanded[current_index] = true;

        for dir in DIRECTIONS {
            let Some(next) = offset(current, dir, width, height) else {
                continue;
            };
            let next_index = index(next);
            if ground.is_set(next) || expanded[next_index] {
                continue;
            }

            let diagonal = dir.0 != 0 && dir.1 != 0;
            if diagonal
                && (ground.is_set(GridPoint::new(next.x, current.y))
                    || ground.is_set(GridPoint::new(current.x, next.y)))
            {
                continue;
            }

            let base = if diagonal { DIAGONAL_COST } else { 1.0 };
            let factor = if walk.is_set(next) {
                PENALIZED_FACTOR
            } else {
                PREFERRED_FACTOR
            };
            let tentative_g_score = g_score[current_index] + base * factor;

            if tentative_g_score < g_score[next_index] {
                g_score[next_index] = tentative_g_score;
                parents[next_index] = Some(current);
                seq += 1;
                open_set.push(State {
                    f: tentative_g_score + octile_distance(next, goal),
                    seq,
                    position: next,
                });
            }
        }
    }

    trace!(%start, %goal, nodes_explored, "No path found");
    PathResult::failure(nodes_explored)
}

/// Finds a path between two world positions.
///
/// Both positions are snapped to the tile containing them first; a position
/// outside the map yields an empty path.
pub fn find_path_world(grids: &WalkGrids, start: WorldPoint, goal: WorldPoint) -> Vec<GridPoint> {
    let frame = grids.frame();
    match (frame.world_to_grid(start), frame.world_to_grid(goal)) {
        (Some(s), Some(g)) => find_path(grids, s, g),
        _ => Vec::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::{Rng, SeedableRng};

    use crate::map::{MapFrame, TileGrid};

    fn open_grids(width: usize, height: usize) -> WalkGrids {
        let ground = TileGrid::new(width, height).unwrap();
        let walk = TileGrid::new(width, height).unwrap();
        let frame = MapFrame::new(width, height, 50.0).unwrap();
        WalkGrids::new(ground, walk, frame).unwrap()
    }

    fn pts(cells: &[(usize, usize)]) -> Vec<GridPoint> {
        cells.iter().copied().map(GridPoint::from).collect()
    }

    fn assert_valid_path(grids: &WalkGrids, path: &[GridPoint], start: GridPoint, goal: GridPoint) {
        assert_eq!(path.first(), Some(&start), "path must begin at start");
        assert_eq!(path.last(), Some(&goal), "path must end at goal");
        for pair in path.windows(2) {
            let (a, b) = (pair[0], pair[1]);
            assert!(a.is_adjacent(&b), "{} and {} are not adjacent", a, b);
            assert!(!grids.ground().is_set(b), "{} is blocked", b);
            if a.x != b.x && a.y != b.y {
                assert!(
                    !grids.ground().is_set(GridPoint::new(b.x, a.y))
                        && !grids.ground().is_set(GridPoint::new(a.x, b.y)),
                    "diagonal {} -> {} cuts a corner",
                    a,
                    b
                );
            }
        }
    }

    #[test]
    fn test_open_grid_diagonal() {
        let grids = open_grids(3, 3);
        let result = find_path_detailed(&grids, GridPoint::new(0, 0), GridPoint::new(2, 2));
        assert_eq!(result.path, pts(&[(0, 0), (1, 1), (2, 2)]));
        // Two diagonal steps onto preferred tiles: 2 * sqrt(2) * 0.5.
        let cost = result.total_cost.unwrap();
        assert!((cost - std::f32::consts::SQRT_2).abs() < 1e-5);
    }

    #[test]
    fn test_start_equals_goal() {
        let grids = open_grids(4, 4);
        let p = GridPoint::new(2, 1);
        assert_eq!(find_path(&grids, p, p), vec![p]);
    }

    #[test]
    fn test_goal_blocked() {
        let grids = WalkGrids::from_rows(&["...", ".#.", "..."], &["...", "...", "..."], 50.0).unwrap();
        let result = find_path_detailed(&grids, GridPoint::new(0, 0), GridPoint::new(1, 1));
        assert!(!result.is_success());
        assert_eq!(result.nodes_explored, 0);
    }

    #[test]
    fn test_endpoint_out_of_bounds() {
        let grids = open_grids(3, 3);
        assert!(find_path(&grids, GridPoint::new(0, 0), GridPoint::new(3, 0)).is_empty());
        assert!(find_path(&grids, GridPoint::new(0, 7), GridPoint::new(1, 1)).is_empty());
    }

    #[test]
    fn test_wall_means_no_path() {
        let grids = WalkGrids::from_rows(
            &["..#..", "..#..", "..#..", "..#..", "..#.."],
            &[".....", ".....", ".....", ".....", "....."],
            50.0,
        )
        .unwrap();
        let result = find_path_detailed(&grids, GridPoint::new(0, 0), GridPoint::new(4, 4));
        assert!(result.path.is_empty());
        assert!(result.total_cost.is_none());
        assert!(result.nodes_explored > 0);
        assert!(format!("{}", result).contains("success: false"));
    }

    #[test]
    fn test_blocked_start_still_searches() {
        let grids = WalkGrids::from_rows(&["#..", "...", "..."], &["...", "...", "..."], 50.0).unwrap();
        let path = find_path(&grids, GridPoint::new(0, 0), GridPoint::new(2, 0));
        assert_eq!(path.first(), Some(&GridPoint::new(0, 0)));
        assert_eq!(path.last(), Some(&GridPoint::new(2, 0)));
    }

    #[test]
    fn test_no_corner_cutting() {
        let grids = WalkGrids::from_rows(&[".#.", "...", "..."], &["...", "...", "..."], 50.0).unwrap();
        let path = find_path(&grids, GridPoint::new(0, 0), GridPoint::new(1, 1));
        assert_eq!(path, pts(&[(0, 0), (0, 1), (1, 1)]));
    }

    #[test]
    fn test_sealed_diagonal_gap() {
        // The only opening is a diagonal squeeze between two blocked tiles.
        let grids = WalkGrids::from_rows(&[".#", "#."], &["..", ".."], 50.0).unwrap();
        assert!(find_path(&grids, GridPoint::new(0, 0), GridPoint::new(1, 1)).is_empty());
    }

    #[test]
    fn test_avoids_penalized_corridor() {
        let ground = [".....", ".....", ".....", ".....", "....."];
        let walk = [".....", ".....", ".###.", ".....", "....."];
        let grids = WalkGrids::from_rows(&ground, &walk, 50.0).unwrap();
        let start = GridPoint::new(0, 2);
        let goal = GridPoint::new(4, 2);

        let result = find_path_detailed(&grids, start, goal);
        assert_valid_path(&grids, &result.path, start, goal);
        for p in &result.path {
            assert!(!grids.walk().is_set(*p), "path crosses penalized tile {}", p);
        }

        // The straight corridor would cost 3 * 1.5 + 0.5 = 5.0.
        assert!(result.total_cost.unwrap() < 5.0);
    }

    #[test]
    fn test_equal_cost_tie_breaks_by_insertion() {
        // Two mirror-image routes around the blocked center. The route whose
        // first step was queued first, (0, 1), is the one returned.
        let grids = WalkGrids::from_rows(&["...", ".#.", "..."], &["...", "...", "..."], 50.0).unwrap();
        let path = find_path(&grids, GridPoint::new(0, 0), GridPoint::new(2, 2));
        assert_eq!(path, pts(&[(0, 0), (0, 1), (0, 2), (1, 2), (2, 2)]));
    }

    #[test]
    fn test_repeat_query_is_deterministic() {
        let grids = WalkGrids::from_rows(
            &["......", "..##..", "......", ".#..#.", "......"],
            &["..#...", "......", ".##...", "......", "...#.."],
            40.0,
        )
        .unwrap();
        let a = find_path_detailed(&grids, GridPoint::new(0, 0), GridPoint::new(5, 4));
        let b = find_path_detailed(&grids, GridPoint::new(0, 0), GridPoint::new(5, 4));
        assert!(a.is_success());
        assert_eq!(a, b);
    }

    #[test]
    fn test_random_grids_produce_valid_paths() {
        let mut rng = StdRng::seed_from_u64(0x711e);
        let (width, height) = (12, 10);

        for _ in 0..40 {
            let mut ground = TileGrid::new(width, height).unwrap();
            let mut walk = TileGrid::new(width, height).unwrap();
            for y in 0..height {
                for x in 0..width {
                    ground.set(GridPoint::new(x, y), rng.random_bool(0.25));
                    walk.set(GridPoint::new(x, y), rng.random_bool(0.3));
                }
            }
            let frame = MapFrame::new(width, height, 32.0).unwrap();
            let grids = WalkGrids::new(ground, walk, frame).unwrap();

            for _ in 0..10 {
                let start = GridPoint::new(rng.random_range(0..width), rng.random_range(0..height));
                let goal = GridPoint::new(rng.random_range(0..width), rng.random_range(0..height));
                let path = find_path(&grids, start, goal);

                if grids.ground().is_set(goal) {
                    assert!(path.is_empty());
                } else if !path.is_empty() {
                    assert_valid_path(&grids, &path, start, goal);
                }
            }
        }
    }

    #[test]
    fn test_world_coordinates() {
        let grids = open_grids(4, 4);
        // 4x4 map of 50px tiles, top-left tile center at (-75, 75).
        let path = find_path_world(&grids, WorldPoint::new(-75.0, 75.0), WorldPoint::new(75.0, -75.0));
        assert_eq!(path, pts(&[(0, 0), (1, 1), (2, 2), (3, 3)]));
        assert!(find_path_world(&grids, WorldPoint::new(0.0, 0.0), WorldPoint::new(500.0, 0.0)).is_empty());
    }

    #[test]
    fn test_octile_distance() {
        assert_eq!(octile_distance(GridPoint::new(0, 0), GridPoint::new(3, 0)), 3.0);
        let d = octile_distance(GridPoint::new(0, 0), GridPoint::new(3, 4));
        assert!((d - (4.0 + (std::f32::consts::SQRT_2 - 1.0) * 3.0)).abs() < 1e-6);
    }
}
