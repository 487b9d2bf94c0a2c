//! **skelpath-core**: core types for skeleton path planning.
//!
//! This crate provides the data model shared by the *skelpath* workspace:
//! grid positions, the blocked/unblocked occupancy grid, and routes through
//! it.

pub mod geom;
pub mod grid;
pub mod route;

pub use geom::Position;
pub use grid::{CellState, GridError, OccupancyGrid};
pub use route::{Route, RouteError};
