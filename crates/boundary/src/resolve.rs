//! Closure-constrained resolution of one unknown measurement.
//!
//! Two strategies:
//! - `optimize_unknown_measurement`: bounded 1-D search for the value that
//!   makes a constraint function hit its target, using the injected minimizer.
//! - `estimate_measurement_from_geometry`: closed-form correction of a single
//!   axis-aligned edge from the closure gap of a best-estimate walk.
//!
//! `resolve_edge` runs both for one edge of a directional edge list.

use serde::Serialize;

use crate::caps::Capabilities;
use crate::error::{BoundaryError, Result};
use crate::geom::{walk, EdgeDirection, Point};
use crate::measure::MeasurementRange;
use crate::precision::{round_display, round_half_up};

const FALLBACK: &str = "fallback";
const GEOMETRIC: &str = "geometric_closure_constraint";

/// Result of a bounded search for the unknown value.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct OptimizeOutcome {
    pub optimized_value: f64,
    /// Minimised squared miss `(f - target)²`; `None` without a minimizer.
    pub residual: Option<f64>,
    pub success: bool,
    /// Optimum lies strictly inside the bracket (farther than 10 tolerances
    /// from either end). A pinned endpoint means the target is not reachable
    /// inside the range.
    pub within_range: bool,
    pub evaluations: usize,
    pub method: String,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum EstimateConfidence {
    High,
    Medium,
}

/// Closed-form estimate from the closure gap.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct GeometryEstimate {
    pub estimated_value: f64,
    /// Signed change applied to the best estimate before clamping.
    pub closure_adjustment: f64,
    /// Position of the clamped estimate in `[min, max]`, 0.5 for a zero-width range.
    pub range_position: f64,
    /// The unclamped estimate already lay inside `[min, max]`.
    pub within_range: bool,
    pub method: &'static str,
    pub confidence: EstimateConfidence,
}

/// Both estimates for one edge of an edge walk.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct EdgeResolution {
    pub edge_index: usize,
    pub optimized: OptimizeOutcome,
    /// `None` for diagonal edges.
    pub geometric: Option<GeometryEstimate>,
}

/// Find `x ∈ [unknown.min, unknown.max]` minimising
/// `(constraint(known_best ++ [x]) - target)²`.
///
/// Never fails: without a minimizer the bracket midpoint is returned with
/// `success = false`.
pub fn optimize_unknown_measurement<F>(
    known: &[MeasurementRange],
    constraint: F,
    target: f64,
    unknown: &MeasurementRange,
    caps: &Capabilities,
) -> OptimizeOutcome
where
    F: Fn(&[f64]) -> f64,
{
    let Some(minimizer) = caps.minimizer() else {
        tracing::warn!("no minimizer, returning midpoint of the unknown range");
        return OptimizeOutcome {
            optimized_value: round_display(unknown.best_estimate()),
            residual: None,
            success: false,
            within_range: false,
            evaluations: 0,
            method: FALLBACK.to_string(),
        };
    };
    let mut values: Vec<f64> = known.iter().map(|m| m.best_estimate()).collect();
    values.push(unknown.best_estimate());
    let last = values.len() - 1;
    let mut objective = |x: f64| {
        values[last] = x;
        (constraint(&values) - target).powi(2)
    };
    let (lo, hi) = (unknown.min(), unknown.max());
    let found = minimizer.minimize(&mut objective, lo, hi);
    let margin = 10.0 * minimizer.tolerance();
    let success = found.converged && found.x.is_finite() && found.fx.is_finite();
    if !success {
        tracing::warn!(evaluations = found.evaluations, "bounded search did not converge");
    }
    tracing::debug!(x = found.x, residual = found.fx, "bounded search done");
    OptimizeOutcome {
        optimized_value: round_display(found.x),
        residual: Some(round_half_up(found.fx, 6)),
        success,
        within_range: found.x - lo > margin && hi - found.x > margin,
        evaluations: found.evaluations,
        method: minimizer.name().to_string(),
    }
}

/// Correct a cardinal edge so the best-estimate walk closes.
///
/// `vertices` is the walk built with the edge at its best estimate. The
/// closure error `e = last - first` is removed along the edge direction `û`:
/// `estimate = best - e·û`, clamped into the range.
pub fn estimate_measurement_from_geometry(
    vertices: &[Point],
    edge_range: &MeasurementRange,
    direction: EdgeDirection,
) -> Result<GeometryEstimate> {
    if !direction.is_cardinal() {
        return Err(BoundaryError::UnsupportedDirection {
            direction: direction.to_string(),
        });
    }
    let (Some(first), Some(last)) = (vertices.first(), vertices.last()) else {
        return Err(BoundaryError::DegenerateGeometry {
            found: 0,
            required: 1,
        });
    };
    let gap = last - first;
    let adjustment = -gap.dot(&direction.unit_vector());
    let raw = edge_range.best_estimate() + adjustment;
    let (lo, hi) = (edge_range.min(), edge_range.max());
    let estimated = raw.clamp(lo, hi);
    let width = edge_range.range_width();
    let position = if width > 0.0 {
        (estimated - lo) / width
    } else {
        0.5
    };
    Ok(GeometryEstimate {
        estimated_value: round_display(estimated),
        closure_adjustment: round_display(adjustment),
        range_position: round_display(position),
        within_range: (lo..=hi).contains(&raw),
        method: GEOMETRIC,
        confidence: if (0.2..=0.8).contains(&position) {
            EstimateConfidence::High
        } else {
            EstimateConfidence::Medium
        },
    })
}

/// Closure distance of a walk from the origin.
fn closure_gap(directions: &[EdgeDirection], lengths: &[f64]) -> f64 {
    let steps: Vec<(EdgeDirection, f64)> =
        directions.iter().copied().zip(lengths.iter().copied()).collect();
    let pts = walk(Point::zeros(), &steps);
    match (pts.first(), pts.last()) {
        (Some(a), Some(b)) => (b - a).norm(),
        _ => 0.0,
    }
}

/// Resolve edge `index` of a directional edge list so that the closure gap
/// hits `target` (0 for a closed boundary).
pub fn resolve_edge(
    edges: &[(EdgeDirection, MeasurementRange)],
    index: usize,
    target: f64,
    caps: &Capabilities,
) -> Result<EdgeResolution> {
    let Some((direction, unknown)) = edges.get(index) else {
        return Err(BoundaryError::config(format!(
            "edge index {index} out of range for {} edges",
            edges.len()
        )));
    };
    let known: Vec<MeasurementRange> = edges
        .iter()
        .enumerate()
        .filter(|&(i, _)| i != index)
        .map(|(_, (_, m))| m.clone())
        .collect();
    let directions: Vec<EdgeDirection> = edges.iter().map(|(d, _)| *d).collect();
    // Optimizer arguments are `known ++ [unknown]`; put the unknown back in place.
    let constraint = |values: &[f64]| {
        let (rest, x) = values.split_at(values.len() - 1);
        let mut lengths = rest.to_vec();
        lengths.insert(index, x[0]);
        closure_gap(&directions, &lengths)
    };
    let optimized = optimize_unknown_measurement(&known, constraint, target, unknown, caps);

    let geometric = if direction.is_cardinal() {
        let steps: Vec<(EdgeDirection, f64)> =
            edges.iter().map(|(d, m)| (*d, m.best_estimate())).collect();
        Some(estimate_measurement_from_geometry(
            &walk(Point::zeros(), &steps),
            unknown,
            *direction,
        )?)
    } else {
        None
    };
    Ok(EdgeResolution {
        edge_index: index,
        optimized,
        geometric,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::caps::BrentBounded;

    /// The eleven edges of the "West Mid" lot; index 7 is the 7-10 ft range.
    fn west_mid() -> Vec<(EdgeDirection, MeasurementRange)> {
        use EdgeDirection::*;
        let exact = |v: f64| MeasurementRange::exact(v).unwrap();
        vec![
            (Right, exact(31.4)),
            (Down, exact(22.5)),
            (Down, exact(6.0)),
            (Left, exact(14.4)),
            (Down, exact(27.3)),
            (Left, exact(12.0)),
            (Up, exact(4.2)),
            (Left, MeasurementRange::between(7.0, 10.0).unwrap()),
            (Up, exact(26.6)),
            (Right, exact(2.9)),
            (Up, exact(25.0)),
        ]
    }

    #[test]
    fn bounded_search_recovers_interior_solution() {
        let known = vec![
            MeasurementRange::exact(10.0).unwrap(),
            MeasurementRange::exact(12.0).unwrap(),
        ];
        let unknown = MeasurementRange::between(5.0, 15.0).unwrap();
        let caps = Capabilities::none().with_minimizer(BrentBounded::default());
        let sum = |v: &[f64]| v.iter().sum::<f64>();
        let out = optimize_unknown_measurement(&known, sum, 30.0, &unknown, &caps);
        assert!(out.success);
        assert!(out.within_range);
        assert_eq!(out.optimized_value, 8.0);
        assert_eq!(out.residual, Some(0.0));
        assert_eq!(out.method, "brent_bounded");
    }

    #[test]
    fn unreachable_target_pins_to_endpoint() {
        let known = vec![MeasurementRange::exact(10.0).unwrap()];
        let unknown = MeasurementRange::between(5.0, 15.0).unwrap();
        let caps = Capabilities::seeded(0);
        let sum = |v: &[f64]| v.iter().sum::<f64>();
        let out = optimize_unknown_measurement(&known, sum, 100.0, &unknown, &caps);
        assert!(out.success);
        assert!(!out.within_range);
        assert_eq!(out.optimized_value, 15.0);
        assert!(out.residual.unwrap() > 5000.0);
    }

    #[test]
    fn missing_minimizer_returns_midpoint() {
        let unknown = MeasurementRange::between(7.0, 10.0).unwrap();
        let out =
            optimize_unknown_measurement(&[], |v| v[0], 7.9, &unknown, &Capabilities::none());
        assert_eq!(out.optimized_value, 8.5);
        assert_eq!(out.residual, None);
        assert!(!out.success);
        assert_eq!(out.method, "fallback");
    }

    #[test]
    fn west_mid_closes_at_seven_point_nine() {
        let edges = west_mid();
        let res = resolve_edge(&edges, 7, 0.0, &Capabilities::seeded(0)).unwrap();
        assert!(res.optimized.success);
        assert!(res.optimized.within_range);
        assert_eq!(res.optimized.optimized_value, 7.9);

        let geo = res.geometric.unwrap();
        assert_eq!(geo.estimated_value, 7.9);
        assert_eq!(geo.closure_adjustment, -0.6);
        assert_eq!(geo.range_position, 0.3);
        assert!(geo.within_range);
        assert_eq!(geo.confidence, EstimateConfidence::High);
    }

    #[test]
    fn geometric_estimate_is_clamped() {
        // Square walk 10/10/10/10 with the last edge measured as 2..4.
        let pts = walk(
            Point::zeros(),
            &[
                (EdgeDirection::Right, 10.0),
                (EdgeDirection::Down, 10.0),
                (EdgeDirection::Left, 10.0),
                (EdgeDirection::Up, 3.0),
            ],
        );
        let range = MeasurementRange::between(2.0, 4.0).unwrap();
        let est = estimate_measurement_from_geometry(&pts, &range, EdgeDirection::Up).unwrap();
        assert_eq!(est.closure_adjustment, 7.0);
        assert_eq!(est.estimated_value, 4.0);
        assert_eq!(est.range_position, 1.0);
        assert!(!est.within_range);
        assert_eq!(est.confidence, EstimateConfidence::Medium);
    }

    #[test]
    fn geometric_estimate_rejects_bad_inputs() {
        let range = MeasurementRange::between(2.0, 4.0).unwrap();
        let err = estimate_measurement_from_geometry(&[], &range, EdgeDirection::Up).unwrap_err();
        assert!(matches!(err, BoundaryError::DegenerateGeometry { .. }));
        let pts = vec![Point::zeros(), Point::new(1.0, 1.0)];
        let err =
            estimate_measurement_from_geometry(&pts, &range, EdgeDirection::NorthEast).unwrap_err();
        assert!(matches!(err, BoundaryError::UnsupportedDirection { .. }));

        let exact = MeasurementRange::exact(3.0).unwrap();
        let est = estimate_measurement_from_geometry(&pts, &exact, EdgeDirection::Down).unwrap();
        assert_eq!(est.range_position, 0.5);
        assert_eq!(est.estimated_value, 3.0);
    }

    #[test]
    fn resolve_edge_checks_index() {
        let err = resolve_edge(&west_mid(), 11, 0.0, &Capabilities::none()).unwrap_err();
        assert!(err.is_config_error());
    }
}
