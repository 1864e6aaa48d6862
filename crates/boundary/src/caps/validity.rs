//! Polygon validity checks backed by `geo` segment intersection.

use geo::algorithm::line_intersection::{line_intersection, LineIntersection};
use geo::{Coord, Line};
use serde::Serialize;

use crate::geom::{signed_area, strip_closing, Point};

/// Outcome of a validity check on one ring.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub struct GeometryReport {
    /// Usable as a polygon: simple and with non-zero area.
    pub is_valid: bool,
    /// No two edges meet except adjacent edges at their shared vertex.
    pub is_simple: bool,
}

/// A polygon validity check.
pub trait GeometryCheck {
    fn check(&self, points: &[Point]) -> GeometryReport;

    fn name(&self) -> &'static str;
}

/// Pairwise edge-intersection test on the ring (closing duplicate dropped).
///
/// Zero-length edges are skipped. Adjacent edges may only share their common
/// vertex; a collinear overlap (a spike folding back on itself) makes the ring
/// non-simple.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct GeoValidity;

fn to_line(p: Point, q: Point) -> Line<f64> {
    Line::new(Coord { x: p.x, y: p.y }, Coord { x: q.x, y: q.y })
}

fn rings_cross(edges: &[Line<f64>]) -> bool {
    let m = edges.len();
    for i in 0..m {
        for j in i + 1..m {
            let adjacent = j == i + 1 || (i == 0 && j == m - 1);
            match line_intersection(edges[i], edges[j]) {
                None => {}
                Some(LineIntersection::SinglePoint { .. }) if adjacent => {}
                Some(LineIntersection::Collinear { intersection })
                    if adjacent && intersection.start == intersection.end => {}
                Some(_) => return true,
            }
        }
    }
    false
}

impl GeometryCheck for GeoValidity {
    fn check(&self, points: &[Point]) -> GeometryReport {
        let ring = strip_closing(points);
        let n = ring.len();
        if n < 3 {
            return GeometryReport {
                is_valid: false,
                is_simple: false,
            };
        }
        let edges: Vec<Line<f64>> = (0..n)
            .map(|i| (ring[i], ring[(i + 1) % n]))
            .filter(|(p, q)| (q - p).norm() > 0.0)
            .map(|(p, q)| to_line(p, q))
            .collect();
        let is_simple = edges.len() >= 3 && !rings_cross(&edges);
        GeometryReport {
            is_valid: is_simple && signed_area(ring) != 0.0,
            is_simple,
        }
    }

    fn name(&self) -> &'static str {
        "geo_validity"
    }
}
