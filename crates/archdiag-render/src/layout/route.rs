//! Edge routing between placed nodes.

use super::detour::{self, Heading};
use crate::model::{Bounds, EdgeCurve, LayoutPoint};
use archdiag_core::Direction;

/// Edge drawing style, from the Graphviz `splines` attribute.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Splines {
    #[default]
    Ortho,
    Curved,
    Line,
}

impl Splines {
    pub fn from_attr(value: Option<&str>) -> Self {
        match value.map(|v| v.trim().to_ascii_lowercase()).as_deref() {
            Some("spline" | "splines" | "curved" | "true") => Splines::Curved,
            Some("line" | "polyline" | "false" | "none" | "") => Splines::Line,
            _ => Splines::Ortho,
        }
    }
}

/// Connection geometry of one node: the icon square (horizontal attachment) inside the full
/// icon + label block (vertical attachment and gap tests).
#[derive(Debug, Clone, Copy)]
pub(super) struct Port {
    pub block: Bounds,
    pub icon: Bounds,
}

impl Port {
    fn center(&self) -> (f64, f64) {
        (
            (self.block.min_x + self.block.max_x) / 2.0,
            (self.block.min_y + self.block.max_y) / 2.0,
        )
    }

    fn icon_cy(&self) -> f64 {
        (self.icon.min_y + self.icon.max_y) / 2.0
    }
}

fn pt(x: f64, y: f64) -> LayoutPoint {
    LayoutPoint { x, y }
}

/// Routes one edge between two node ports.
///
/// Orthogonal routes keep the single elbow halfway between the endpoints when it is clear of
/// `obstacles`, and otherwise detour around them.
pub(super) fn route(
    src: &Port,
    dst: &Port,
    direction: Direction,
    splines: Splines,
    obstacles: &[Bounds],
) -> (EdgeCurve, Vec<LayoutPoint>) {
    if splines == Splines::Line {
        let (sx, sy) = src.center();
        let (tx, ty) = dst.center();
        let start = clip_to_box(&src.block, (sx, sy), (tx, ty));
        let end = clip_to_box(&dst.block, (tx, ty), (sx, sy));
        return (EdgeCurve::Polyline, vec![start, end]);
    }

    let x_gap = dst.block.min_x >= src.block.max_x || src.block.min_x >= dst.block.max_x;
    let y_gap = dst.block.min_y >= src.block.max_y || src.block.min_y >= dst.block.max_y;
    let horizontal = match (x_gap, y_gap) {
        (true, true) => direction.is_horizontal(),
        (true, false) => true,
        (false, true) => false,
        (false, false) => {
            let (sx, sy) = src.center();
            let (tx, ty) = dst.center();
            return (EdgeCurve::Polyline, vec![pt(sx, sy), pt(tx, ty)]);
        }
    };

    let (start, end, heading) = if horizontal {
        if dst.block.min_x >= src.block.max_x {
            let start = pt(src.icon.max_x, src.icon_cy());
            (start, pt(dst.icon.min_x, dst.icon_cy()), Heading::Right)
        } else {
            let start = pt(src.icon.min_x, src.icon_cy());
            (start, pt(dst.icon.max_x, dst.icon_cy()), Heading::Left)
        }
    } else {
        let sx = src.center().0;
        let tx = dst.center().0;
        if dst.block.min_y >= src.block.max_y {
            (pt(sx, src.block.max_y), pt(tx, dst.block.min_y), Heading::Down)
        } else {
            (pt(sx, src.block.min_y), pt(tx, dst.block.max_y), Heading::Up)
        }
    };

    let (c1, c2) = if horizontal {
        let mid = (start.x + end.x) / 2.0;
        (pt(mid, start.y), pt(mid, end.y))
    } else {
        let mid = (start.y + end.y) / 2.0;
        (pt(start.x, mid), pt(end.x, mid))
    };

    match splines {
        Splines::Curved => (EdgeCurve::Cubic, vec![start, c1, c2, end]),
        _ => {
            let aligned = if horizontal {
                (start.y - end.y).abs() < 0.5
            } else {
                (start.x - end.x).abs() < 0.5
            };
            let elbow = if aligned {
                vec![start, end]
            } else {
                vec![start, c1, c2, end]
            };
            if detour::is_clear(&elbow, obstacles) {
                return (EdgeCurve::Polyline, elbow);
            }
            let points = detour::detour(start, heading, end, heading, obstacles).unwrap_or(elbow);
            (EdgeCurve::Polyline, points)
        }
    }
}

/// A small loop on the icon's trailing side, entering back into the node.
pub(super) fn self_loop(port: &Port, direction: Direction) -> Vec<LayoutPoint> {
    let size = (port.icon.height() / 4.0).max(6.0);
    if direction.is_horizontal() {
        let x0 = port.icon.max_x;
        let x1 = x0 + size;
        let cy = port.icon_cy();
        vec![
            pt(x0, cy - size),
            pt(x1, cy - size),
            pt(x1, cy + size),
            pt(x0, cy + size),
        ]
    } else {
        let y0 = port.block.max_y;
        let y1 = y0 + size;
        let cx = port.center().0;
        vec![
            pt(cx - size, y0),
            pt(cx - size, y1),
            pt(cx + size, y1),
            pt(cx + size, y0),
        ]
    }
}

/// Point where the segment from `from` (inside `b`) towards `to` leaves `b`.
fn clip_to_box(b: &Bounds, from: (f64, f64), to: (f64, f64)) -> LayoutPoint {
    let (dx, dy) = (to.0 - from.0, to.1 - from.1);
    let hw = b.width() / 2.0;
    let hh = b.height() / 2.0;
    let tx = if dx.abs() > 1e-9 { hw / dx.abs() } else { f64::INFINITY };
    let ty = if dy.abs() > 1e-9 { hh / dy.abs() } else { f64::INFINITY };
    let t = tx.min(ty).min(1.0);
    if !t.is_finite() {
        return pt(from.0, from.1);
    }
    pt(from.0 + dx * t, from.1 + dy * t)
}

/// Spacing of the label positions tried along a route, in pixels.
const LABEL_STEP: f64 = 4.0;

fn cubic_at(p: [&LayoutPoint; 4], t: f64) -> (f64, f64) {
    let u = 1.0 - t;
    let (a, b, c, d) = (u * u * u, 3.0 * u * u * t, 3.0 * u * t * t, t * t * t);
    (
        a * p[0].x + b * p[1].x + c * p[2].x + d * p[3].x,
        a * p[0].y + b * p[1].y + c * p[2].y + d * p[3].y,
    )
}

fn polyline_length(points: &[LayoutPoint]) -> f64 {
    points
        .windows(2)
        .map(|w| (w[1].x - w[0].x).hypot(w[1].y - w[0].y))
        .sum()
}

/// The point `dist` pixels along the polyline.
fn point_along(points: &[LayoutPoint], dist: f64) -> Option<(f64, f64)> {
    let mut remaining = dist;
    for w in points.windows(2) {
        let len = (w[1].x - w[0].x).hypot(w[1].y - w[0].y);
        if len >= remaining && len > 0.0 {
            let t = remaining / len;
            return Some((
                w[0].x + (w[1].x - w[0].x) * t,
                w[0].y + (w[1].y - w[0].y) * t,
            ));
        }
        remaining -= len;
    }
    points.last().map(|p| (p.x, p.y))
}

/// Midpoint of the drawn route, used to anchor the edge label.
pub(super) fn label_anchor(curve: EdgeCurve, points: &[LayoutPoint]) -> Option<(f64, f64)> {
    match (curve, points) {
        (EdgeCurve::Cubic, [p0, p1, p2, p3]) => Some(cubic_at([p0, p1, p2, p3], 0.5)),
        (_, []) => None,
        (_, [only]) => Some((only.x, only.y)),
        _ => point_along(points, polyline_length(points) / 2.0),
    }
}

/// Label anchors along the route, the midpoint first and then alternating outwards.
pub(super) fn label_anchors(curve: EdgeCurve, points: &[LayoutPoint]) -> Vec<(f64, f64)> {
    let Some(mid) = label_anchor(curve, points) else {
        return Vec::new();
    };
    let mut out = vec![mid];
    match (curve, points) {
        (EdgeCurve::Cubic, [p0, p1, p2, p3]) => {
            let n = 20;
            for k in 1..=n {
                let dt = 0.5 * k as f64 / n as f64;
                out.push(cubic_at([p0, p1, p2, p3], 0.5 - dt));
                out.push(cubic_at([p0, p1, p2, p3], 0.5 + dt));
            }
        }
        _ => {
            let half = polyline_length(points) / 2.0;
            let mut offset = LABEL_STEP;
            while offset <= half {
                out.extend(point_along(points, half - offset));
                out.extend(point_along(points, half + offset));
                offset += LABEL_STEP;
            }
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn port(x: f64, y: f64) -> Port {
        let block = Bounds::from_center(x, y, 40.0, 60.0);
        let icon = Bounds {
            min_x: x - 20.0,
            min_y: y - 30.0,
            max_x: x + 20.0,
            max_y: y + 10.0,
        };
        Port { block, icon }
    }

    fn ortho(src: &Port, dst: &Port, direction: Direction) -> (EdgeCurve, Vec<LayoutPoint>) {
        route(src, dst, direction, Splines::Ortho, &[])
    }

    #[test]
    fn ortho_routes_bend_halfway_between_ranks() {
        let (curve, points) = ortho(&port(0.0, 0.0), &port(100.0, 50.0), Direction::LR);
        assert_eq!(curve, EdgeCurve::Polyline);
        assert_eq!(points.len(), 4);
        assert_eq!((points[0].x, points[0].y), (20.0, -10.0));
        assert_eq!((points[1].x, points[1].y), (50.0, -10.0));
        assert_eq!((points[2].x, points[2].y), (50.0, 40.0));
        assert_eq!((points[3].x, points[3].y), (80.0, 40.0));
    }

    #[test]
    fn aligned_ortho_routes_are_straight() {
        let (_, points) = ortho(&port(0.0, 0.0), &port(100.0, 0.0), Direction::LR);
        assert_eq!(points.len(), 2);
    }

    #[test]
    fn vertical_routes_leave_below_the_label() {
        let (_, points) = ortho(&port(0.0, 0.0), &port(0.0, 200.0), Direction::TB);
        assert_eq!((points[0].x, points[0].y), (0.0, 30.0));
        assert_eq!((points[1].x, points[1].y), (0.0, 170.0));
    }

    #[test]
    fn straight_lines_are_clipped_to_the_blocks() {
        let (_, points) = route(
            &port(0.0, 0.0),
            &port(100.0, 0.0),
            Direction::LR,
            Splines::Line,
            &[],
        );
        assert_eq!((points[0].x, points[1].x), (20.0, 80.0));
    }

    #[test]
    fn blocked_elbows_detour_around_obstacles() {
        let blocker = detour::inflate(&Bounds::from_center(50.0, 10.0, 20.0, 60.0));
        let (src, dst) = (port(0.0, 0.0), port(100.0, 0.0));
        let (curve, points) = route(&src, &dst, Direction::LR, Splines::Ortho, &[blocker]);
        assert_eq!(curve, EdgeCurve::Polyline);
        assert!(points.len() > 2, "{points:?}");
        assert!(detour::is_clear(&points, &[blocker]));
        assert_eq!(points.first(), Some(&pt(20.0, -10.0)));
        assert_eq!(points.last(), Some(&pt(80.0, -10.0)));
    }

    #[test]
    fn splines_attr_parsing() {
        assert_eq!(Splines::from_attr(Some("ortho")), Splines::Ortho);
        assert_eq!(Splines::from_attr(Some("Curved")), Splines::Curved);
        assert_eq!(Splines::from_attr(Some("polyline")), Splines::Line);
        assert_eq!(Splines::from_attr(None), Splines::Ortho);
    }

    #[test]
    fn label_anchor_is_the_path_midpoint() {
        let points = [pt(0.0, 0.0), pt(10.0, 0.0), pt(10.0, 10.0), pt(20.0, 10.0)];
        assert_eq!(label_anchor(EdgeCurve::Polyline, &points), Some((10.0, 5.0)));
        let cubic = [pt(0.0, 0.0), pt(10.0, 0.0), pt(10.0, 10.0), pt(20.0, 10.0)];
        assert_eq!(label_anchor(EdgeCurve::Cubic, &cubic), Some((10.0, 5.0)));
    }

    #[test]
    fn label_anchors_walk_outwards_from_the_midpoint() {
        let points = [pt(0.0, 0.0), pt(20.0, 0.0)];
        let anchors = label_anchors(EdgeCurve::Polyline, &points);
        assert_eq!(&anchors[..3], &[(10.0, 0.0), (6.0, 0.0), (14.0, 0.0)]);
        assert!(anchors.iter().all(|&(x, _)| (0.0..=20.0).contains(&x)));
    }
}
