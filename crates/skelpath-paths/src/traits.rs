use skelpath_core::Position;

/// Minimal pathfinding interface: neighbor enumeration.
pub trait Pather {
    /// Append neighbors of `p` into `buf`. The caller clears `buf` before calling.
    fn neighbors(&self, p: Position, buf: &mut Vec<Position>);
}

/// Pather with step costs and an admissible heuristic, as required by A*.
pub trait AstarPather: Pather {
    /// Cost of moving from `from` to adjacent `to`. Must be > 0.
    fn cost(&self, from: Position, to: Position) -> f64;

    /// Heuristic estimate of distance from `from` to `to`.
    /// Must never overestimate the true cost (admissible).
    fn estimate(&self, from: Position, to: Position) -> f64;
}
