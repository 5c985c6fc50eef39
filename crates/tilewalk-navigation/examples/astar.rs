use std::collections::HashSet;

use tilewalk_navigation::astar::find_path_detailed;
use tilewalk_navigation::map::{GridBuilder, GridPoint, TileLayer, TileMapData, WalkGrids};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    // `#` in ground blocks a tile, `~` in walk makes it costlier to cross.
    let map = TileMapData::new(64.0)
        .with_layer(TileLayer::from_rows(
            "ground",
            &[
                "..........",
                ".##....##.",
                "....#.....",
                "..####.#..",
                ".....#.#..",
                ".###.#.##.",
                "...#......",
                ".#.#.###..",
                ".#......#.",
                "...###....",
            ],
        ))
        .with_layer(TileLayer::from_rows(
            "walk",
            &[
                "..~~~~....",
                "..........",
                "~~~.......",
                "..........",
                "..~~~.....",
                "..........",
                "~~~.~~~~..",
                "..........",
                "..~~~~~...",
                "..........",
            ],
        ));

    let grids = GridBuilder::new().build(&map)?;

    let start = GridPoint::new(0, 0);
    let goal = GridPoint::new(9, 9);

    println!("Grid:");
    print_grids(&grids, start, goal, None);
    println!("\nStart: {}", start);
    println!("Goal: {}", goal);

    let result = find_path_detailed(&grids, start, goal);
    println!("\n{}", result);

    if result.is_success() {
        let path_set: HashSet<GridPoint> = result.path.iter().copied().collect();
        println!("\nGrid with path:");
        print_grids(&grids, start, goal, Some(&path_set));
    } else {
        println!("\nNo path found.");
    }

    Ok(())
}

fn print_grids(grids: &WalkGrids, start: GridPoint, goal: GridPoint, path: Option<&HashSet<GridPoint>>) {
    let (cols, rows) = grids.dims();

    for y in 0..rows {
        print!("{} ", y);
        for x in 0..cols {
            let p = GridPoint::new(x, y);
            let c = if p == start {
                'S'
            } else if p == goal {
                'G'
            } else if path.is_some_and(|set| set.contains(&p)) {
                '*'
            } else if grids.ground().is_set(p) {
                'X'
            } else if grids.walk().is_set(p) {
                '~'
            } else {
                '.'
            };
            print!("{} ", c);
        }
        println!();
    }

    print!("  ");
    for x in 0..cols {
        print!("{} ", x);
    }
    println!();
}
