//! Path planning on occupancy grids.
//!
//! This crate provides:
//!
//! - **A\*** shortest-path search with deterministic tie-breaking
//!   ([`search`], or [`astar_path`] over any [`AstarPather`])
//! - **Skeleton refinement**, which alternates search with an erosion pass
//!   that thins open space towards a one-cell-wide corridor ([`refine`],
//!   [`SkeletonRefiner`], [`erode`])
//!
//! All entry points are pure: the input grid is borrowed and never modified.
//!
//! # Trait hierarchy
//!
//! | Trait | Required for |
//! |---|---|
//! | [`Pather`] | neighbour enumeration |
//! | [`AstarPather`] : [`Pather`] | A* |

mod astar;
mod distance;
mod error;
mod skeleton;
mod traits;

pub use astar::{astar_path, search};
pub use distance::{euclidean, manhattan};
pub use error::PathError;
pub use skeleton::{
    Erosion, Neighborhood, Refinement, Side, SkeletonRefiner, erode, erosion_decision, refine,
};
pub use traits::{AstarPather, Pather};
