use std::cmp::Ordering;
use std::collections::{BinaryHeap, HashMap};

use skelpath_core::{CellState, OccupancyGrid, Position, Route};

use crate::PathError;
use crate::distance::euclidean;
use crate::traits::{AstarPather, Pather};

// ---------------------------------------------------------------------------
// Internal search state
// ---------------------------------------------------------------------------

/// Best-known node for a position during one search.
#[derive(Clone, Copy, Debug)]
struct SearchNode {
    parent: Position,
    g: f64,
    h: f64,
}

impl SearchNode {
    #[inline]
    fn f(&self) -> f64 {
        self.g + self.h
    }
}

/// Frontier entry ordered by `(f, pos)` for use in `BinaryHeap`.
#[derive(Clone, Copy, Debug)]
struct NodeRef {
    f: f64,
    pos: Position,
}

impl Ord for NodeRef {
    fn cmp(&self, other: &Self) -> Ordering {
        // Reverse so BinaryHeap (max-heap) pops smallest (f, pos) first.
        other
            .f
            .total_cmp(&self.f)
            .then_with(|| other.pos.cmp(&self.pos))
    }
}

impl PartialOrd for NodeRef {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl PartialEq for NodeRef {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for NodeRef {}

// ---------------------------------------------------------------------------
// Grid pather
// ---------------------------------------------------------------------------

impl Pather for OccupancyGrid {
    fn neighbors(&self, p: Position, buf: &mut Vec<Position>) {
        buf.extend(
            p.neighbors_4()
                .into_iter()
                .filter(|&n| self.at(n) == Some(CellState::Unblocked)),
        );
    }
}

impl AstarPather for OccupancyGrid {
    #[inline]
    fn cost(&self, _from: Position, _to: Position) -> f64 {
        1.0
    }

    #[inline]
    fn estimate(&self, from: Position, to: Position) -> f64 {
        euclidean(from, to)
    }
}

// ---------------------------------------------------------------------------
// Search
// ---------------------------------------------------------------------------

/// Shortest 4-connected route on `grid` from `src` to `dest`.
///
/// Fails if either endpoint is outside the grid or blocked, or if they are
/// the same cell. An empty route means no path exists; that is not an error.
///
/// Frontier ties on `f` are broken by the smaller position, so the result is
/// deterministic.
pub fn search(grid: &OccupancyGrid, src: Position, dest: Position) -> Result<Route, PathError> {
    for pos in [src, dest] {
        if !grid.is_valid(pos) {
            return Err(PathError::InvalidPosition { pos });
        }
    }
    for pos in [src, dest] {
        if grid.at(pos) == Some(CellState::Blocked) {
            return Err(PathError::BlockedEndpoint { pos });
        }
    }
    if src == dest {
        return Err(PathError::DegenerateRequest { pos: src });
    }
    Ok(Route::new(astar_path(grid, src, dest)))
}

/// Compute the shortest path from `from` to `to` using A*.
///
/// Returns the full path (including both endpoints), or an empty vector if
/// `to` is unreachable. Endpoints are not validated.
pub fn astar_path<P: AstarPather>(pather: &P, from: Position, to: Position) -> Vec<Position> {
    let mut nodes: HashMap<Position, SearchNode> = HashMap::new();
    let start = SearchNode {
        parent: from,
        g: 0.0,
        h: pather.estimate(from, to),
    };
    nodes.insert(from, start);

    let mut open: BinaryHeap<NodeRef> = BinaryHeap::new();
    open.push(NodeRef {
        f: start.f(),
        pos: from,
    });

    let mut nbuf = Vec::with_capacity(4);
    let mut expanded = 0usize;

    let found = 'search: loop {
        let Some(current) = open.pop() else {
            break 'search false;
        };

        let node = nodes[&current.pos];
        // Skip stale entries.
        if current.f > node.f() {
            continue;
        }

        if current.pos == to {
            break 'search true;
        }
        expanded += 1;

        nbuf.clear();
        pather.neighbors(current.pos, &mut nbuf);

        for &np in nbuf.iter() {
            let candidate = SearchNode {
                parent: current.pos,
                g: node.g + pather.cost(current.pos, np),
                h: pather.estimate(np, to),
            };
            if let Some(best) = nodes.get(&np) {
                if best.f() <= candidate.f() {
                    continue;
                }
            }
            nodes.insert(np, candidate);
            open.push(NodeRef {
                f: candidate.f(),
                pos: np,
            });
        }
    };

    if !found {
        log::trace!("astar {from} -> {to}: unreachable after {expanded} expansions");
        return Vec::new();
    }

    let path = trace_path(&nodes, from, to);
    log::trace!(
        "astar {from} -> {to}: {} cells after {expanded} expansions",
        path.len()
    );
    path
}

/// Follow parent links from `to` back to `from` and reverse.
fn trace_path(nodes: &HashMap<Position, SearchNode>, from: Position, to: Position) -> Vec<Position> {
    let mut path = Vec::new();
    let mut cur = to;
    while cur != from {
        path.push(cur);
        cur = nodes[&cur].parent;
    }
    path.push(from);
    path.reverse();
    path
}

#[cfg(test)]
mod tests {
    use std::collections::VecDeque;

    use rand::rngs::StdRng;
    use rand::{RngExt, SeedableRng};

    use super::*;
    use crate::distance::manhattan;

    /// Reference shortest-path length (in cells) by breadth-first search.
    fn bfs_len(grid: &OccupancyGrid, src: Position, dest: Position) -> Option<usize> {
        let mut dist = HashMap::from([(src, 1usize)]);
        let mut queue = VecDeque::from([src]);
        let mut buf = Vec::new();
        while let Some(p) = queue.pop_front() {
            if p == dest {
                return Some(dist[&p]);
            }
            let next = dist[&p] + 1;
            buf.clear();
            grid.neighbors(p, &mut buf);
            for &n in &buf {
                if !dist.contains_key(&n) {
                    dist.insert(n, next);
                    queue.push_back(n);
                }
            }
        }
        None
    }

    fn avoids_blocked(grid: &OccupancyGrid, route: &Route) -> bool {
        route
            .iter()
            .all(|&p| grid.at(p) == Some(CellState::Unblocked))
    }

    const MAZE: &str = "\
        ..........
        .########.
        .#......#.
        .#.####.#.
        .#.#..#.#.
        ...#..#...
        ####.##.##
        ..........";

    #[test]
    fn open_grid_routes_are_manhattan() {
        let grid = OccupancyGrid::new(7, 9).unwrap();
        let pairs = [
            (Position::new(0, 0), Position::new(6, 8)),
            (Position::new(6, 8), Position::new(0, 0)),
            (Position::new(3, 1), Position::new(3, 7)),
            (Position::new(5, 2), Position::new(1, 2)),
            (Position::new(2, 6), Position::new(4, 0)),
        ];
        for (src, dest) in pairs {
            let route = search(&grid, src, dest).unwrap();
            assert_eq!(route.len(), 1 + manhattan(src, dest) as usize);
            assert_eq!(route.first(), Some(src));
            assert_eq!(route.last(), Some(dest));
            assert!(route.is_contiguous());
        }
    }

    #[test]
    fn tie_break_follows_position_order() {
        let grid = OccupancyGrid::new(5, 5).unwrap();
        let route = search(&grid, Position::new(0, 0), Position::new(4, 4)).unwrap();
        let expected: Vec<Position> = [
            (0, 0),
            (0, 1),
            (1, 1),
            (1, 2),
            (2, 2),
            (2, 3),
            (3, 3),
            (3, 4),
            (4, 4),
        ]
        .into_iter()
        .map(Position::from)
        .collect();
        assert_eq!(route.positions(), expected.as_slice());
    }

    #[test]
    fn search_is_deterministic() {
        let grid = OccupancyGrid::parse(MAZE).unwrap();
        let a = search(&grid, Position::new(0, 0), Position::new(4, 4)).unwrap();
        let b = search(&grid, Position::new(0, 0), Position::new(4, 4)).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn maze_route_is_shortest_and_clear() {
        let grid = OccupancyGrid::parse(MAZE).unwrap();
        let cases = [
            (Position::new(0, 0), Position::new(4, 4)),
            (Position::new(7, 0), Position::new(2, 2)),
            (Position::new(4, 5), Position::new(7, 9)),
            (Position::new(5, 0), Position::new(5, 9)),
        ];
        for (src, dest) in cases {
            let route = search(&grid, src, dest).unwrap();
            assert_eq!(Some(route.len()), bfs_len(&grid, src, dest), "{src} -> {dest}");
            assert!(route.is_contiguous());
            assert!(avoids_blocked(&grid, &route));
        }
    }

    #[test]
    fn random_grids_match_breadth_first_lengths() {
        let mut rng = StdRng::seed_from_u64(0x5eed);
        for _ in 0..200 {
            let n_rows = rng.random_range(2..12);
            let n_cols = rng.random_range(2..12);
            let grid = OccupancyGrid::from_fn(n_rows, n_cols, |_| {
                if rng.random_range(0..4) == 0 {
                    CellState::Blocked
                } else {
                    CellState::Unblocked
                }
            })
            .unwrap();
            let free: Vec<Position> = grid
                .iter()
                .filter(|&(_, state)| state == CellState::Unblocked)
                .map(|(p, _)| p)
                .collect();
            if free.len() < 2 {
                continue;
            }
            let src = free[rng.random_range(0..free.len())];
            let dest = free[rng.random_range(0..free.len())];
            if src == dest {
                continue;
            }

            let route = search(&grid, src, dest).unwrap();
            match bfs_len(&grid, src, dest) {
                Some(len) => {
                    assert_eq!(route.len(), len, "{src} -> {dest} on\n{grid}");
                    assert_eq!(route.first(), Some(src));
                    assert_eq!(route.last(), Some(dest));
                    assert!(route.is_contiguous());
                    assert!(avoids_blocked(&grid, &route));
                }
                None => assert!(route.is_empty(), "{src} -> {dest} on\n{grid}"),
            }
        }
    }

    #[test]
    fn walled_off_destination_gives_empty_route() {
        let grid = OccupancyGrid::parse(
            "\
            ..#..
            ..#..
            ..#..",
        )
        .unwrap();
        let route = search(&grid, Position::new(0, 0), Position::new(2, 4)).unwrap();
        assert!(route.is_empty());
    }

    #[test]
    fn invalid_positions_rejected() {
        let grid = OccupancyGrid::new(3, 3).unwrap();
        let ok = Position::new(1, 1);
        for bad in [
            Position::new(-1, 0),
            Position::new(0, -1),
            Position::new(3, 0),
            Position::new(0, 3),
        ] {
            assert_eq!(
                search(&grid, bad, ok),
                Err(PathError::InvalidPosition { pos: bad })
            );
            assert_eq!(
                search(&grid, ok, bad),
                Err(PathError::InvalidPosition { pos: bad })
            );
        }
    }

    #[test]
    fn blocked_endpoints_rejected() {
        let grid = OccupancyGrid::parse("#..\n...\n..#").unwrap();
        let before = grid.clone();
        assert_eq!(
            search(&grid, Position::new(0, 0), Position::new(1, 1)),
            Err(PathError::BlockedEndpoint {
                pos: Position::new(0, 0)
            })
        );
        assert_eq!(
            search(&grid, Position::new(1, 1), Position::new(2, 2)),
            Err(PathError::BlockedEndpoint {
                pos: Position::new(2, 2)
            })
        );
        assert_eq!(grid, before);
    }

    #[test]
    fn invalid_position_checked_before_blocked() {
        let grid = OccupancyGrid::parse("#..\n...\n...").unwrap();
        assert_eq!(
            search(&grid, Position::new(0, 0), Position::new(5, 5)),
            Err(PathError::InvalidPosition {
                pos: Position::new(5, 5)
            })
        );
    }

    #[test]
    fn degenerate_request_rejected() {
        let grid = OccupancyGrid::new(3, 3).unwrap();
        let p = Position::new(2, 2);
        assert_eq!(
            search(&grid, p, p),
            Err(PathError::DegenerateRequest { pos: p })
        );
    }

    #[test]
    fn astar_path_same_endpoint() {
        let grid = OccupancyGrid::new(2, 2).unwrap();
        let p = Position::new(1, 1);
        assert_eq!(astar_path(&grid, p, p), vec![p]);
    }

    #[test]
    fn grid_neighbors_skip_blocked_and_outside() {
        let grid = OccupancyGrid::parse(".#\n..").unwrap();
        let mut buf = Vec::new();
        grid.neighbors(Position::new(0, 0), &mut buf);
        assert_eq!(buf, vec![Position::new(1, 0)]);
    }
}
