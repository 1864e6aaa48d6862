//! Polygon kernel: pure functions over an ordered vertex sequence.
//!
//! Rings may repeat their first vertex at the end (closed-ring form) or not.
//! Cyclic formulas (area, perimeter, centroid) treat the list as implicitly
//! closed, so a repeated closing vertex only adds a zero-length edge.

use super::types::{
    AngleClass, BoundaryCfg, Bounds, Compass, EdgeDirection, InteriorAngle, Point, Segment,
    SegmentDirection, Vertex,
};
use crate::precision::{approx_eq, round_display, round_half_up};

/// Two points closer than this are the same vertex when detecting a closing duplicate.
const DUPLICATE_EPS: f64 = 1e-9;

#[inline]
fn cross(p: Point, q: Point) -> f64 {
    p.x * q.y - q.x * p.y
}

/// Drop a duplicated closing vertex, if present.
pub fn strip_closing(points: &[Point]) -> &[Point] {
    match (points.first(), points.last()) {
        (Some(first), Some(last)) if points.len() > 1 && (first - last).norm() < DUPLICATE_EPS => {
            &points[..points.len() - 1]
        }
        _ => points,
    }
}

/// Signed shoelace area; positive when `x→y` turns counterclockwise in
/// standard axes.
pub fn signed_area(points: &[Point]) -> f64 {
    let n = points.len();
    if n < 3 {
        return 0.0;
    }
    let mut acc = 0.0;
    for i in 0..n {
        acc += cross(points[i], points[(i + 1) % n]);
    }
    acc / 2.0
}

/// Shoelace area, independent of winding. 0 for fewer than 3 vertices.
#[inline]
pub fn area(points: &[Point]) -> f64 {
    signed_area(points).abs()
}

/// Sum of Euclidean edge lengths over cyclic adjacent pairs.
pub fn perimeter(points: &[Point]) -> f64 {
    let n = points.len();
    (0..n)
        .map(|i| (points[(i + 1) % n] - points[i]).norm())
        .sum()
}

fn vertex_mean(points: &[Point]) -> Point {
    if points.is_empty() {
        return Point::zeros();
    }
    points.iter().fold(Point::zeros(), |acc, p| acc + p) / points.len() as f64
}

/// Area-weighted centroid `(1/6A) Σ (pᵢ + pᵢ₊₁) · cross(pᵢ, pᵢ₊₁)`.
///
/// Falls back to the vertex mean for fewer than 3 distinct vertices or when
/// `|signed area| < degenerate_area` (collinear or self-cancelling rings).
/// Returns the origin for an empty list.
pub fn centroid(points: &[Point], degenerate_area: f64) -> Point {
    let ring = strip_closing(points);
    if ring.len() < 3 {
        return vertex_mean(ring);
    }
    let a = signed_area(ring);
    if a.abs() < degenerate_area {
        return vertex_mean(ring);
    }
    let n = ring.len();
    let mut c = Point::zeros();
    for i in 0..n {
        let p = ring[i];
        let q = ring[(i + 1) % n];
        c += (p + q) * cross(p, q);
    }
    c / (6.0 * a)
}

/// Bounding box; `None` for an empty list.
pub fn bounds(points: &[Point]) -> Option<Bounds> {
    let first = points.first()?;
    let (mut min_x, mut max_x, mut min_y, mut max_y) = (first.x, first.x, first.y, first.y);
    for p in &points[1..] {
        min_x = min_x.min(p.x);
        max_x = max_x.max(p.x);
        min_y = min_y.min(p.y);
        max_y = max_y.max(p.y);
    }
    Some(Bounds {
        min_x,
        max_x,
        min_y,
        max_y,
        width: max_x - min_x,
        height: max_y - min_y,
    })
}

/// Map an angle (0° = East, clockwise) onto the eight-point compass.
pub fn angle_to_compass(angle_deg: f64) -> Compass {
    let a = angle_deg.rem_euclid(360.0);
    if !(22.5..337.5).contains(&a) {
        Compass::East
    } else if a < 67.5 {
        Compass::SouthEast
    } else if a < 112.5 {
        Compass::South
    } else if a < 157.5 {
        Compass::SouthWest
    } else if a < 202.5 {
        Compass::West
    } else if a < 247.5 {
        Compass::NorthWest
    } else if a < 292.5 {
        Compass::North
    } else {
        Compass::NorthEast
    }
}

/// Classify a segment delta by axis (within `axis_tol`) or as diagonal.
pub fn classify_direction(dx: f64, dy: f64, axis_tol: f64) -> SegmentDirection {
    if dx.abs() < axis_tol {
        if dy > 0.0 {
            SegmentDirection::Down
        } else {
            SegmentDirection::Up
        }
    } else if dy.abs() < axis_tol {
        if dx > 0.0 {
            SegmentDirection::Right
        } else {
            SegmentDirection::Left
        }
    } else {
        SegmentDirection::Diagonal {
            angle_deg: dy.atan2(dx).to_degrees(),
        }
    }
}

/// Analyse the segment from `from` to `to`.
pub fn analyze_segment(index: usize, from: &Vertex, to: &Vertex, cfg: &BoundaryCfg) -> Segment {
    let d = to.point() - from.point();
    let angle = d.y.atan2(d.x).to_degrees();
    Segment {
        index,
        from_vertex: from.id.clone(),
        to_vertex: to.id.clone(),
        from: (from.x, from.y),
        to: (to.x, to.y),
        length: round_display(d.norm()),
        direction: classify_direction(d.x, d.y, cfg.axis_tol),
        dx: round_display(d.x),
        dy: round_display(d.y),
        angle_deg: round_half_up(angle, 1),
        compass: angle_to_compass(angle),
    }
}

/// Segments between consecutive vertices of an open chain. A closed ring that
/// repeats its first vertex yields every edge exactly once.
pub fn segments(vertices: &[Vertex], cfg: &BoundaryCfg) -> Vec<Segment> {
    vertices
        .windows(2)
        .enumerate()
        .map(|(i, w)| analyze_segment(i, &w[0], &w[1], cfg))
        .collect()
}

/// Angle at `vertex`, swept counterclockwise (standard axes) from the
/// direction of `next` to the direction of `prev`, in `[0, 360)` and rounded
/// to 0.1°. This is the interior angle for rings with positive signed area.
pub fn interior_angle(prev: Point, vertex: Point, next: Point) -> f64 {
    let v1 = prev - vertex;
    let v2 = next - vertex;
    sweep_deg(v2.y.atan2(v2.x), v1.y.atan2(v1.x))
}

fn sweep_deg(from_rad: f64, to_rad: f64) -> f64 {
    let deg = round_half_up((to_rad - from_rad).to_degrees().rem_euclid(360.0), 1);
    if deg >= 360.0 {
        deg - 360.0
    } else {
        deg
    }
}

/// Classify an interior angle with landmark tolerance `tol_deg`.
pub fn classify_angle(angle_deg: f64, tol_deg: f64) -> AngleClass {
    if approx_eq(angle_deg, 90.0, tol_deg) {
        AngleClass::RightAngle
    } else if approx_eq(angle_deg, 180.0, tol_deg) {
        AngleClass::Straight
    } else if approx_eq(angle_deg, 270.0, tol_deg) {
        AngleClass::ReflexRight
    } else if angle_deg < 90.0 {
        AngleClass::Acute
    } else if angle_deg < 180.0 {
        AngleClass::Obtuse
    } else if angle_deg < 270.0 {
        AngleClass::ReflexObtuse
    } else {
        AngleClass::ReflexAcute
    }
}

/// Interior angles at every vertex of a ring (closing duplicate dropped).
///
/// The sweep is oriented by the ring's signed area, so convex corners read
/// below 180° for either winding.
pub fn interior_angles(points: &[Point], cfg: &BoundaryCfg) -> Vec<InteriorAngle> {
    let ring = strip_closing(points);
    let n = ring.len();
    if n < 3 {
        return Vec::new();
    }
    let positive = signed_area(ring) >= 0.0;
    (0..n)
        .map(|i| {
            let prev = ring[(i + n - 1) % n];
            let next = ring[(i + 1) % n];
            let angle = if positive {
                interior_angle(prev, ring[i], next)
            } else {
                interior_angle(next, ring[i], prev)
            };
            InteriorAngle {
                vertex_index: i,
                angle_deg: angle,
                classification: classify_angle(angle, cfg.angle_tol_deg),
            }
        })
        .collect()
}

/// Walk directional edges from `start`; returns `edges.len() + 1` points.
pub fn walk(start: Point, edges: &[(EdgeDirection, f64)]) -> Vec<Point> {
    let mut out = Vec::with_capacity(edges.len() + 1);
    let mut cur = start;
    out.push(cur);
    for &(dir, len) in edges {
        cur += dir.delta(len);
        out.push(cur);
    }
    out
}

/// Number of vertices left after dropping a closing duplicate.
#[inline]
pub fn usable_vertex_count(points: &[Point]) -> usize {
    strip_closing(points).len()
}
