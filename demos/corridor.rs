//! Horizontal corridor demo: refine a route across a 9×27 grid whose first
//! and last rows are walls, then print it over the grid it was found on.
//!
//! Run: cargo run --bin corridor [iterations]

use skelpath_core::{CellState, OccupancyGrid, Position};
use skelpath_paths::SkeletonRefiner;

const N_ROWS: usize = 9;
const N_COLS: usize = 27;

fn run(iterations: usize) -> Result<(), Box<dyn std::error::Error>> {
    let mut grid = OccupancyGrid::new(N_ROWS, N_COLS)?;
    for col in 0..N_COLS as i32 {
        grid.set(Position::new(0, col), CellState::Blocked)?;
        grid.set(Position::new(-1, col), CellState::Blocked)?;
    }

    let src = Position::new(N_ROWS as i32 / 2 - 1, 0);
    let dest = Position::new(N_ROWS as i32 / 2 + 1, N_COLS as i32 - 1);
    let refined = SkeletonRefiner::new(iterations)?.run(&grid, src, dest)?;

    println!("{}", refined.route);
    println!();
    let on_route = |p: Position| refined.route.iter().any(|&r| r == p);
    for (p, state) in refined.grid.iter() {
        let ch = if on_route(p) { '*' } else { state.glyph() };
        print!("{ch}");
        if p.col as usize == N_COLS - 1 {
            println!();
        }
    }

    if refined.route.len() > 4 {
        let sub = refined
            .route
            .sample_subroute(2, refined.route.len() - 2, &mut rand::rng())?;
        println!("\nsampled sub-route: {sub}");
    }
    Ok(())
}

fn main() {
    let iterations = std::env::args()
        .nth(1)
        .and_then(|s| s.parse().ok())
        .unwrap_or(2);

    if let Err(e) = run(iterations) {
        eprintln!("Error: {e}");
        std::process::exit(1);
    }
}
