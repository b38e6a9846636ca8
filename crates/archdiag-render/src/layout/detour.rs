//! Orthogonal detours around boxes.
//!
//! The search runs on a sparse grid: one line along every obstacle side, one through the
//! middle of every channel between two such lines, plus the route endpoints. Moves follow grid
//! lines, never enter an obstacle, and pay extra for every bend.

use crate::model::{Bounds, LayoutPoint};
use std::cmp::Ordering;
use std::collections::BinaryHeap;

/// Space kept between a route and the boxes it avoids.
pub(super) const CLEARANCE: f64 = 6.0;
/// Cost of one bend, in pixels of route length.
const BEND_COST: f64 = 24.0;
/// Cost of arriving at the target along the wrong axis.
const WRONG_ENTRY_COST: f64 = 4.0 * BEND_COST;
const EPS: f64 = 1e-6;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(super) enum Heading {
    Left,
    Right,
    Up,
    Down,
}

impl Heading {
    const ALL: [Heading; 4] = [Heading::Left, Heading::Right, Heading::Up, Heading::Down];

    fn index(self) -> usize {
        self as usize
    }

    fn opposite(self) -> Heading {
        match self {
            Heading::Left => Heading::Right,
            Heading::Right => Heading::Left,
            Heading::Up => Heading::Down,
            Heading::Down => Heading::Up,
        }
    }

    fn step(self) -> (isize, isize) {
        match self {
            Heading::Left => (-1, 0),
            Heading::Right => (1, 0),
            Heading::Up => (0, -1),
            Heading::Down => (0, 1),
        }
    }
}

/// `b` grown by [`CLEARANCE`] on every side.
pub(super) fn inflate(b: &Bounds) -> Bounds {
    Bounds {
        min_x: b.min_x - CLEARANCE,
        min_y: b.min_y - CLEARANCE,
        max_x: b.max_x + CLEARANCE,
        max_y: b.max_y + CLEARANCE,
    }
}

fn inside(b: &Bounds, x: f64, y: f64) -> bool {
    x > b.min_x + EPS && x < b.max_x - EPS && y > b.min_y + EPS && y < b.max_y - EPS
}

/// Whether the axis-aligned segment `a`-`b` passes through the interior of `bx`. Running along
/// a side does not count.
fn crosses(bx: &Bounds, a: &LayoutPoint, b: &LayoutPoint) -> bool {
    let (x0, x1) = (a.x.min(b.x), a.x.max(b.x));
    let (y0, y1) = (a.y.min(b.y), a.y.max(b.y));
    x0 < bx.max_x - EPS && x1 > bx.min_x + EPS && y0 < bx.max_y - EPS && y1 > bx.min_y + EPS
}

/// Whether no segment of the orthogonal polyline `points` enters an obstacle.
pub(super) fn is_clear(points: &[LayoutPoint], obstacles: &[Bounds]) -> bool {
    points
        .windows(2)
        .all(|w| !obstacles.iter().any(|o| crosses(o, &w[0], &w[1])))
}

fn grid_lines(ends: [f64; 2], sides: impl Iterator<Item = f64>) -> Vec<f64> {
    let mut lines: Vec<f64> = ends.into_iter().chain(sides).collect();
    lines.sort_by(f64::total_cmp);
    lines.dedup_by(|a, b| (*a - *b).abs() < 0.5);
    let channels: Vec<f64> = lines.windows(2).map(|w| (w[0] + w[1]) / 2.0).collect();
    lines.extend(channels);
    lines.sort_by(f64::total_cmp);
    lines
}

fn nearest(lines: &[f64], v: f64) -> usize {
    lines
        .iter()
        .enumerate()
        .min_by(|a, b| (a.1 - v).abs().total_cmp(&(b.1 - v).abs()))
        .map(|(i, _)| i)
        .unwrap_or(0)
}

#[derive(Debug, Clone, Copy)]
struct Visit {
    cost: f64,
    state: usize,
}

impl PartialEq for Visit {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for Visit {}

impl PartialOrd for Visit {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Visit {
    fn cmp(&self, other: &Self) -> Ordering {
        // Min-heap on cost; ties resolve on the state index so routes are deterministic.
        other
            .cost
            .total_cmp(&self.cost)
            .then_with(|| other.state.cmp(&self.state))
    }
}

/// Cheapest orthogonal route from `start` (leaving along `exit`) to `end` (arriving along
/// `entry`) that avoids `obstacles`. Collinear points are merged. `None` when the endpoints
/// are walled in.
pub(super) fn detour(
    start: LayoutPoint,
    exit: Heading,
    end: LayoutPoint,
    entry: Heading,
    obstacles: &[Bounds],
) -> Option<Vec<LayoutPoint>> {
    let xs = grid_lines([start.x, end.x], obstacles.iter().flat_map(|o| [o.min_x, o.max_x]));
    let ys = grid_lines([start.y, end.y], obstacles.iter().flat_map(|o| [o.min_y, o.max_y]));
    let (cols, rows) = (xs.len(), ys.len());
    let point = |cell: usize| LayoutPoint {
        x: xs[cell % cols],
        y: ys[cell / cols],
    };
    let free: Vec<bool> = (0..cols * rows)
        .map(|cell| {
            let p = point(cell);
            !obstacles.iter().any(|o| inside(o, p.x, p.y))
        })
        .collect();

    let source = nearest(&ys, start.y) * cols + nearest(&xs, start.x);
    let target = nearest(&ys, end.y) * cols + nearest(&xs, end.x);
    if source == target {
        return Some(vec![start, end]);
    }

    // A state is a cell plus the heading it was reached with.
    let state = |cell: usize, h: Heading| cell * 4 + h.index();
    let mut best = vec![f64::INFINITY; cols * rows * 4];
    let mut parent: Vec<Option<usize>> = vec![None; cols * rows * 4];
    let mut heap = BinaryHeap::new();
    best[state(source, exit)] = 0.0;
    heap.push(Visit {
        cost: 0.0,
        state: state(source, exit),
    });

    let mut arrival: Option<(f64, usize)> = None;
    while let Some(Visit { cost, state: s }) = heap.pop() {
        if cost > best[s] {
            continue;
        }
        if arrival.is_some_and(|(c, _)| cost >= c) {
            break;
        }
        let (cell, heading) = (s / 4, Heading::ALL[s % 4]);
        if cell == target {
            let total = cost + if heading == entry { 0.0 } else { WRONG_ENTRY_COST };
            if arrival.is_none_or(|(c, _)| total < c) {
                arrival = Some((total, s));
            }
            continue;
        }

        let (col, row) = ((cell % cols) as isize, (cell / cols) as isize);
        for h in Heading::ALL {
            if h == heading.opposite() {
                continue;
            }
            let (dc, dr) = h.step();
            let (nc, nr) = (col + dc, row + dr);
            if nc < 0 || nr < 0 || nc >= cols as isize || nr >= rows as isize {
                continue;
            }
            let next = nr as usize * cols + nc as usize;
            if !free[next] && next != target {
                continue;
            }
            let (a, b) = (point(cell), point(next));
            if obstacles.iter().any(|o| crosses(o, &a, &b)) {
                continue;
            }
            let step = (b.x - a.x).abs() + (b.y - a.y).abs();
            let bend = if h == heading { 0.0 } else { BEND_COST };
            let ns = state(next, h);
            let next_cost = cost + step + bend;
            if next_cost < best[ns] {
                best[ns] = next_cost;
                parent[ns] = Some(s);
                heap.push(Visit {
                    cost: next_cost,
                    state: ns,
                });
            }
        }
    }

    let (_, mut s) = arrival?;
    let mut cells = vec![s / 4];
    while let Some(p) = parent[s] {
        cells.push(p / 4);
        s = p;
    }
    cells.reverse();

    let mut points: Vec<LayoutPoint> = Vec::with_capacity(cells.len());
    points.push(start);
    points.extend(cells[1..cells.len() - 1].iter().map(|&c| point(c)));
    points.push(end);
    Some(merge_collinear(points))
}

fn merge_collinear(points: Vec<LayoutPoint>) -> Vec<LayoutPoint> {
    let mut out: Vec<LayoutPoint> = Vec::with_capacity(points.len());
    for p in points {
        if let [.., a, b] = out.as_slice() {
            let same_x = (a.x - b.x).abs() < EPS && (b.x - p.x).abs() < EPS;
            let same_y = (a.y - b.y).abs() < EPS && (b.y - p.y).abs() < EPS;
            if same_x || same_y {
                out.pop();
            }
        }
        out.push(p);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pt(x: f64, y: f64) -> LayoutPoint {
        LayoutPoint { x, y }
    }

    fn boxed(min_x: f64, min_y: f64, max_x: f64, max_y: f64) -> Bounds {
        Bounds {
            min_x,
            min_y,
            max_x,
            max_y,
        }
    }

    #[test]
    fn open_space_keeps_the_straight_line() {
        let route =
            detour(pt(0.0, 0.0), Heading::Right, pt(100.0, 0.0), Heading::Right, &[]).unwrap();
        assert_eq!(route, vec![pt(0.0, 0.0), pt(100.0, 0.0)]);
    }

    #[test]
    fn a_box_in_the_way_is_walked_around() {
        let wall = boxed(40.0, -20.0, 60.0, 30.0);
        let route = detour(
            pt(0.0, 0.0),
            Heading::Right,
            pt(100.0, 0.0),
            Heading::Right,
            &[wall],
        )
        .unwrap();
        assert!(is_clear(&route, &[wall]), "{route:?}");
        assert_eq!(route.first(), Some(&pt(0.0, 0.0)));
        assert_eq!(route.last(), Some(&pt(100.0, 0.0)));
        // Up and over the shorter side, then back down.
        assert!(route.iter().any(|p| p.y <= -20.0));
        let [.., before, last] = route.as_slice() else {
            panic!("route too short");
        };
        assert_eq!(before.y, last.y, "arrives horizontally");
    }

    #[test]
    fn the_gap_between_two_boxes_is_used() {
        let upper = boxed(40.0, -100.0, 60.0, -5.0);
        let lower = boxed(40.0, 25.0, 60.0, 120.0);
        let route = detour(
            pt(0.0, -30.0),
            Heading::Right,
            pt(100.0, 50.0),
            Heading::Right,
            &[upper, lower],
        )
        .unwrap();
        assert!(is_clear(&route, &[upper, lower]), "{route:?}");
        let through_gap = route
            .windows(2)
            .any(|w| w[0].y == w[1].y && w[0].y >= -5.0 && w[0].y <= 25.0);
        assert!(through_gap, "{route:?}");
    }

    #[test]
    fn walled_in_endpoints_have_no_detour() {
        let ring = [
            boxed(-20.0, -20.0, 20.0, -10.0),
            boxed(-20.0, 10.0, 20.0, 20.0),
            boxed(-20.0, -20.0, -10.0, 20.0),
            boxed(10.0, -20.0, 20.0, 20.0),
        ];
        let route = detour(
            pt(0.0, 0.0),
            Heading::Right,
            pt(100.0, 0.0),
            Heading::Right,
            &ring,
        );
        assert!(route.is_none());
    }

    #[test]
    fn sliding_along_a_side_is_clear() {
        let b = boxed(0.0, 0.0, 10.0, 10.0);
        assert!(is_clear(&[pt(-5.0, 0.0), pt(15.0, 0.0)], &[b]));
        assert!(!is_clear(&[pt(-5.0, 5.0), pt(15.0, 5.0)], &[b]));
    }
}
