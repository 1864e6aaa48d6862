//! Closure, validity and measured-vs-expected checks.
//!
//! Problems are collected into result records; only an empty vertex list for
//! `validate_closure` is an error.

use serde::Serialize;

use crate::caps::Capabilities;
use crate::error::{BoundaryError, Result};
use crate::geom::{usable_vertex_count, BoundaryCfg, Point, Segment};
use crate::precision::{approx_eq, round_display, round_half_up, CALC_PRECISION};

/// First-to-last gap of a vertex list.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct ClosureResult {
    pub is_closed: bool,
    pub error_x: f64,
    pub error_y: f64,
    pub total_error: f64,
    pub tolerance: f64,
    pub first_point: (f64, f64),
    pub last_point: (f64, f64),
}

/// Polygon validation outcome.
#[derive(Clone, Debug, Default, PartialEq, Serialize)]
pub struct ValidationResult {
    /// No blocking errors were recorded.
    pub is_valid: bool,
    /// `None` when no geometry capability was available.
    pub is_simple: Option<bool>,
    pub is_closed: bool,
    pub geometry_checked: bool,
    pub errors: Vec<String>,
    pub warnings: Vec<String>,
}

/// Expected-vs-calculated comparison of one measurement.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct MeasurementCheck {
    pub expected: f64,
    pub calculated: f64,
    pub difference: f64,
    pub matches: bool,
    pub tolerance: f64,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct EdgeCheck {
    pub edge_index: usize,
    pub edge_name: String,
    #[serde(flatten)]
    pub check: MeasurementCheck,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct VerificationSummary {
    pub edge_results: Vec<EdgeCheck>,
    pub matches: usize,
    pub total: usize,
    pub mismatches: Vec<usize>,
    pub all_verified: bool,
    pub accuracy_percent: f64,
}

/// Gap between the first and last vertex; closed when within `tolerance`.
pub fn validate_closure(points: &[Point], tolerance: f64) -> Result<ClosureResult> {
    let (Some(first), Some(last)) = (points.first(), points.last()) else {
        return Err(BoundaryError::DegenerateGeometry {
            found: 0,
            required: 1,
        });
    };
    let d = last - first;
    let total = d.norm();
    Ok(ClosureResult {
        is_closed: total <= tolerance,
        error_x: round_half_up(d.x.abs(), CALC_PRECISION),
        error_y: round_half_up(d.y.abs(), CALC_PRECISION),
        total_error: round_half_up(total, CALC_PRECISION),
        tolerance,
        first_point: (first.x, first.y),
        last_point: (last.x, last.y),
    })
}

/// Validate a closed-ring vertex list.
///
/// Fewer than 3 vertices, not counting a repeated closing vertex, stops
/// immediately with a blocking error. A ring that
/// does not close within `cfg.closure_tol` is an error. With a geometry
/// capability, an invalid ring is an error and a non-simple ring a warning;
/// without one both checks are skipped. Open-chain segments shorter than
/// `cfg.min_segment` are warnings.
pub fn validate_polygon(points: &[Point], cfg: &BoundaryCfg, caps: &Capabilities) -> ValidationResult {
    let mut out = ValidationResult::default();
    let usable = usable_vertex_count(points);
    if usable < 3 {
        out.errors
            .push(format!("polygon requires at least 3 vertices (found {usable})"));
        return out;
    }

    out.is_closed = true;
    if let Ok(closure) = validate_closure(points, cfg.closure_tol) {
        if !closure.is_closed {
            out.is_closed = false;
            out.errors
                .push(format!("polygon not closed (gap: {})", closure.total_error));
        }
    }

    if let Some(check) = caps.geometry() {
        let report = check.check(points);
        out.geometry_checked = true;
        out.is_simple = Some(report.is_simple);
        if !report.is_valid {
            out.errors
                .push("invalid geometry (possible self-intersection)".to_string());
        }
        if !report.is_simple {
            out.warnings.push("polygon has self-intersections".to_string());
        }
    } else {
        tracing::debug!("no geometry capability, simplicity not verified");
    }

    for (i, w) in points.windows(2).enumerate() {
        if (w[1] - w[0]).norm() < cfg.min_segment {
            out.warnings.push(format!("near-zero segment at index {i}"));
        }
    }

    out.is_valid = out.errors.is_empty();
    out
}

/// Compare one calculated value against its expected value.
pub fn verify_measurement(expected: f64, calculated: f64, tolerance: f64) -> MeasurementCheck {
    MeasurementCheck {
        expected: round_display(expected),
        calculated: round_display(calculated),
        difference: round_half_up((expected - calculated).abs(), CALC_PRECISION),
        matches: approx_eq(expected, calculated, tolerance),
        tolerance,
    }
}

/// Check segment lengths against `expected`, pairwise in order.
///
/// Extra entries on either side are ignored.
pub fn verify_all_edges(segments: &[Segment], expected: &[f64], tolerance: f64) -> VerificationSummary {
    if segments.len() != expected.len() {
        tracing::warn!(
            segments = segments.len(),
            expected = expected.len(),
            "edge count differs from expected lengths"
        );
    }
    let edge_results: Vec<EdgeCheck> = segments
        .iter()
        .zip(expected)
        .enumerate()
        .map(|(i, (seg, &exp))| EdgeCheck {
            edge_index: i,
            edge_name: format!("{}-{}", seg.from_vertex, seg.to_vertex),
            check: verify_measurement(exp, seg.length, tolerance),
        })
        .collect();
    let mismatches: Vec<usize> = edge_results
        .iter()
        .filter(|r| !r.check.matches)
        .map(|r| r.edge_index)
        .collect();
    let total = edge_results.len();
    let matches = total - mismatches.len();
    VerificationSummary {
        accuracy_percent: if total > 0 {
            round_display(100.0 * matches as f64 / total as f64)
        } else {
            0.0
        },
        all_verified: matches == total,
        edge_results,
        matches,
        total,
        mismatches,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::caps::GeoValidity;
    use crate::geom::{segments, Vertex};

    fn pts(coords: &[(f64, f64)]) -> Vec<Point> {
        coords.iter().map(|&(x, y)| Point::new(x, y)).collect()
    }

    #[test]
    fn closure_depends_on_tolerance() {
        let ring = pts(&[(0.0, 0.0), (10.0, 0.0), (10.0, 10.0), (0.0, 0.05)]);
        let loose = validate_closure(&ring, 0.1).unwrap();
        assert!(loose.is_closed);
        assert_eq!(loose.error_x, 0.0);
        assert_eq!(loose.error_y, 0.05);
        assert_eq!(loose.total_error, 0.05);
        assert_eq!(loose.last_point, (0.0, 0.05));
        assert!(!validate_closure(&ring, 0.01).unwrap().is_closed);
        assert!(validate_closure(&[], 0.1).is_err());
    }

    #[test]
    fn too_few_vertices_stops_early() {
        let v = validate_polygon(&pts(&[(0.0, 0.0), (1.0, 0.0)]), &BoundaryCfg::default(), &Capabilities::seeded(0));
        assert!(!v.is_valid);
        assert_eq!(v.errors.len(), 1);
        assert!(!v.geometry_checked);
        assert_eq!(v.is_simple, None);
    }

    #[test]
    fn closing_duplicate_does_not_count_as_a_vertex() {
        let two = pts(&[(0.0, 0.0), (10.0, 0.0), (0.0, 0.0)]);
        let v = validate_polygon(&two, &BoundaryCfg::default(), &Capabilities::none());
        assert!(!v.is_valid);
        assert_eq!(
            v.errors,
            vec!["polygon requires at least 3 vertices (found 2)".to_string()]
        );
        assert!(v.warnings.is_empty());

        let triangle = pts(&[(0.0, 0.0), (10.0, 0.0), (0.0, 10.0), (0.0, 0.0)]);
        assert!(validate_polygon(&triangle, &BoundaryCfg::default(), &Capabilities::none()).is_valid);
    }

    #[test]
    fn closed_square_is_valid_with_and_without_geometry() {
        let ring = pts(&[(0.0, 0.0), (10.0, 0.0), (10.0, 10.0), (0.0, 10.0), (0.0, 0.0)]);
        let cfg = BoundaryCfg::default();
        let checked = validate_polygon(&ring, &cfg, &Capabilities::none().with_geometry(GeoValidity));
        assert!(checked.is_valid && checked.is_closed);
        assert_eq!(checked.is_simple, Some(true));
        assert!(checked.warnings.is_empty());

        let unchecked = validate_polygon(&ring, &cfg, &Capabilities::none());
        assert!(unchecked.is_valid);
        assert_eq!(unchecked.is_simple, None);
        assert!(!unchecked.geometry_checked);
    }

    #[test]
    fn open_ring_and_bowtie_are_blocking() {
        let cfg = BoundaryCfg::default();
        let open = pts(&[(0.0, 0.0), (10.0, 0.0), (10.0, 10.0), (0.0, 10.0)]);
        let v = validate_polygon(&open, &cfg, &Capabilities::none());
        assert!(!v.is_valid);
        assert!(!v.is_closed);
        assert_eq!(v.errors, vec!["polygon not closed (gap: 10)".to_string()]);

        let bowtie = pts(&[(0.0, 0.0), (10.0, 10.0), (10.0, 0.0), (0.0, 10.0), (0.0, 0.0)]);
        let v = validate_polygon(&bowtie, &cfg, &Capabilities::none().with_geometry(GeoValidity));
        assert!(!v.is_valid);
        assert_eq!(v.is_simple, Some(false));
        assert_eq!(v.warnings, vec!["polygon has self-intersections".to_string()]);
    }

    #[test]
    fn near_zero_segments_warn() {
        let ring = pts(&[(0.0, 0.0), (10.0, 0.0), (10.0, 0.001), (10.0, 10.0), (0.0, 10.0), (0.0, 0.0)]);
        let v = validate_polygon(&ring, &BoundaryCfg::default(), &Capabilities::none());
        assert!(v.is_valid);
        assert_eq!(v.warnings, vec!["near-zero segment at index 1".to_string()]);
    }

    #[test]
    fn verification_counts_mismatches() {
        let cfg = BoundaryCfg::default();
        let verts = vec![
            Vertex::new("A", 0.0, 0.0),
            Vertex::new("B", 10.0, 0.0),
            Vertex::new("C", 10.0, 7.5),
            Vertex::new("D", 0.0, 7.5),
            Vertex::new("A", 0.0, 0.0),
        ];
        let segs = segments(&verts, &cfg);
        let summary = verify_all_edges(&segs, &[10.0, 7.5, 10.2, 7.5], cfg.verify_tol);
        assert_eq!(summary.total, 4);
        assert_eq!(summary.matches, 3);
        assert_eq!(summary.mismatches, vec![2]);
        assert!(!summary.all_verified);
        assert_eq!(summary.accuracy_percent, 75.0);
        assert_eq!(summary.edge_results[2].edge_name, "C-D");
        assert_eq!(summary.edge_results[2].check.difference, 0.2);

        let empty = verify_all_edges(&[], &[], 0.01);
        assert_eq!(empty.accuracy_percent, 0.0);
        assert!(empty.all_verified);
    }

    #[test]
    fn single_measurement_check() {
        let c = verify_measurement(7.9, 7.905, 0.01);
        assert!(c.matches);
        assert_eq!(c.difference, 0.005);
        assert!(!verify_measurement(7.9, 8.0, 0.01).matches);
    }
}
