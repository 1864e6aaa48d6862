//! Complete boundary analyses.
//!
//! Purpose
//! - Combine kernel, validation, resolution inputs and Monte Carlo results
//!   into serializable records.
//!
//! Conventions
//! - Numeric record fields are rounded half-up to 2 decimals; closure errors
//!   and standard deviations to 4.
//! - Edge walks start at `P0 = (0, 0)` and use best estimates.

use serde::{Deserialize, Serialize};

use crate::caps::Capabilities;
use crate::error::Result;
use crate::geom::{
    area, bounds, centroid, interior_angles, perimeter, segments, walk, BoundaryCfg, Bounds,
    EdgeDirection, InteriorAngle, Point, Segment, Vertex,
};
use crate::measure::{MeasurementRange, MeasurementRecord, MeasurementSpec};
use crate::montecarlo::{
    area_from_edges_with_uncertainty, area_with_uncertainty, perimeter_from_vertices_with_uncertainty,
    perimeter_with_uncertainty, McCfg, UncertainQuantity, UncertainVertex,
};
use crate::precision::round_display;
use crate::validate::{
    validate_closure, validate_polygon, verify_all_edges, ClosureResult, ValidationResult,
    VerificationSummary,
};

/// Edge length input: a number, a `[min, max]` pair or a loose measurement.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum LengthInput {
    Exact(f64),
    Pair([f64; 2]),
    Spec(MeasurementSpec),
}

impl LengthInput {
    pub fn to_range(&self, unit: &str) -> Result<MeasurementRange> {
        match self {
            Self::Exact(v) => Ok(MeasurementRange::exact(*v)?.with_unit(unit)),
            Self::Pair([lo, hi]) => Ok(MeasurementRange::between(*lo, *hi)?.with_unit(unit)),
            Self::Spec(spec) => MeasurementRange::from_spec(spec, unit),
        }
    }
}

impl From<f64> for LengthInput {
    fn from(v: f64) -> Self {
        Self::Exact(v)
    }
}

impl From<[f64; 2]> for LengthInput {
    fn from(pair: [f64; 2]) -> Self {
        Self::Pair(pair)
    }
}

/// One directional edge of a boundary walk.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct EdgeInput {
    #[serde(default)]
    pub name: Option<String>,
    pub direction: EdgeDirection,
    pub length: LengthInput,
}

impl EdgeInput {
    pub fn new(name: impl Into<String>, direction: EdgeDirection, length: impl Into<LengthInput>) -> Self {
        Self {
            name: Some(name.into()),
            direction,
            length: length.into(),
        }
    }

    pub fn display_name(&self, index: usize) -> String {
        self.name.clone().unwrap_or_else(|| format!("Edge {index}"))
    }
}

/// Convert edge inputs into `(direction, range)` pairs.
pub fn edge_ranges(edges: &[EdgeInput], unit: &str) -> Result<Vec<(EdgeDirection, MeasurementRange)>> {
    edges
        .iter()
        .map(|e| Ok((e.direction, e.length.to_range(unit)?)))
        .collect()
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Quantity {
    pub value: f64,
    pub unit: String,
}

#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
pub struct Coord2 {
    pub x: f64,
    pub y: f64,
}

/// Deterministic analysis of an exact vertex list.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct BoundaryAnalysis {
    pub unit: String,
    pub vertex_count: usize,
    pub vertices: Vec<Vertex>,
    pub area: Quantity,
    pub perimeter: Quantity,
    pub centroid: Coord2,
    /// `None` for an empty vertex list.
    pub bounds: Option<Bounds>,
    pub segments: Vec<Segment>,
    pub interior_angles: Vec<InteriorAngle>,
    pub validation: ValidationResult,
    /// `None` for an empty vertex list.
    pub closure: Option<ClosureResult>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub verification: Option<VerificationSummary>,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct EdgeRecord {
    pub name: String,
    pub direction: EdgeDirection,
    pub measurement: MeasurementRecord,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct UncertainEdge {
    pub index: usize,
    pub name: String,
    pub range: MeasurementRecord,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct UncertaintySummary {
    pub total_edges: usize,
    pub exact_measurements: usize,
    pub range_measurements: usize,
    pub uncertain_edges: Vec<UncertainEdge>,
}

/// Analysis of a directional edge walk with ranged lengths.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct UncertainEdgeAnalysis {
    pub unit: String,
    pub n_samples: usize,
    pub edges: Vec<EdgeRecord>,
    pub vertices: Vec<Vertex>,
    pub perimeter: UncertainQuantity,
    pub area: UncertainQuantity,
    pub closure: ClosureResult,
    pub validation: ValidationResult,
    pub uncertainty_summary: UncertaintySummary,
}

/// Analysis of a vertex list whose coordinates may carry ranges.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct UncertainVertexAnalysis {
    /// Deterministic analysis on best-estimate coordinates.
    pub best_estimate: BoundaryAnalysis,
    pub n_samples: usize,
    pub area: UncertainQuantity,
    pub perimeter: UncertainQuantity,
}

fn points_of(vertices: &[Vertex]) -> Vec<Point> {
    vertices.iter().map(Vertex::point).collect()
}

fn rounded_bounds(b: Bounds) -> Bounds {
    Bounds {
        min_x: round_display(b.min_x),
        max_x: round_display(b.max_x),
        min_y: round_display(b.min_y),
        max_y: round_display(b.max_y),
        width: round_display(b.width),
        height: round_display(b.height),
    }
}

/// Area, perimeter, centroid, bounds, segments, angles, validation and closure
/// of an exact vertex list (closed-ring form, first vertex repeated, is
/// expected but not required).
///
/// Too few vertices, including none, is reported through `validation` rather
/// than as an error.
pub fn analyze_boundary(
    vertices: &[Vertex],
    unit: &str,
    cfg: &BoundaryCfg,
    caps: &Capabilities,
) -> Result<BoundaryAnalysis> {
    let pts = points_of(vertices);
    tracing::debug!(vertices = pts.len(), unit, "analyzing boundary");
    let c = centroid(&pts, cfg.degenerate_area);
    let validation = validate_polygon(&pts, cfg, caps);
    for msg in &validation.errors {
        tracing::warn!(error = %msg, "boundary validation");
    }
    Ok(BoundaryAnalysis {
        unit: unit.to_string(),
        vertex_count: vertices.len(),
        vertices: vertices.to_vec(),
        area: Quantity {
            value: round_display(area(&pts)),
            unit: format!("sq {unit}"),
        },
        perimeter: Quantity {
            value: round_display(perimeter(&pts)),
            unit: unit.to_string(),
        },
        centroid: Coord2 {
            x: round_display(c.x),
            y: round_display(c.y),
        },
        bounds: bounds(&pts).map(rounded_bounds),
        segments: segments(vertices, cfg),
        interior_angles: interior_angles(&pts, cfg),
        validation,
        closure: validate_closure(&pts, cfg.closure_tol).ok(),
        verification: None,
    })
}

/// `analyze_boundary` plus segment lengths checked against `expected`.
pub fn analyze_boundary_with_verification(
    vertices: &[Vertex],
    expected: &[f64],
    unit: &str,
    cfg: &BoundaryCfg,
    caps: &Capabilities,
) -> Result<BoundaryAnalysis> {
    let mut analysis = analyze_boundary(vertices, unit, cfg, caps)?;
    let summary = verify_all_edges(&analysis.segments, expected, cfg.verify_tol);
    if !summary.all_verified {
        tracing::warn!(mismatches = ?summary.mismatches, "edge lengths differ from expected");
    }
    analysis.verification = Some(summary);
    Ok(analysis)
}

/// Walk ranged edges from the origin and quantify perimeter and area spread.
pub fn analyze_edges_with_uncertainty(
    edges: &[EdgeInput],
    unit: &str,
    mc: &McCfg,
    cfg: &BoundaryCfg,
    caps: &mut Capabilities,
) -> Result<UncertainEdgeAnalysis> {
    let ranges = edge_ranges(edges, unit)?;
    let lengths: Vec<MeasurementRange> = ranges.iter().map(|(_, m)| m.clone()).collect();

    let records: Vec<EdgeRecord> = edges
        .iter()
        .zip(&lengths)
        .enumerate()
        .map(|(i, (e, m))| EdgeRecord {
            name: e.display_name(i),
            direction: e.direction,
            measurement: m.to_record(),
        })
        .collect();

    let perimeter_mc = perimeter_with_uncertainty(&lengths, mc, caps, unit)?;
    let area_mc = area_from_edges_with_uncertainty(&ranges, mc, caps, unit)?;

    let steps: Vec<(EdgeDirection, f64)> =
        ranges.iter().map(|(d, m)| (*d, m.best_estimate())).collect();
    let vertices: Vec<Vertex> = walk(Point::zeros(), &steps)
        .into_iter()
        .enumerate()
        .map(|(i, p)| Vertex::new(format!("P{i}"), round_display(p.x), round_display(p.y)))
        .collect();
    let pts = points_of(&vertices);
    let closure = validate_closure(&pts, cfg.closure_tol)?;
    if !closure.is_closed {
        tracing::warn!(gap = closure.total_error, "best-estimate walk does not close");
    }

    let uncertain_edges: Vec<UncertainEdge> = lengths
        .iter()
        .zip(&records)
        .enumerate()
        .filter(|(_, (m, _))| m.is_range())
        .map(|(i, (m, r))| UncertainEdge {
            index: i,
            name: r.name.clone(),
            range: m.to_record(),
        })
        .collect();
    let range_count = uncertain_edges.len();

    Ok(UncertainEdgeAnalysis {
        unit: unit.to_string(),
        n_samples: mc.n_samples,
        edges: records,
        perimeter: perimeter_mc.summary(perimeter_mc.mean),
        area: area_mc.summary(area(&pts)),
        closure,
        validation: validate_polygon(&pts, cfg, caps),
        uncertainty_summary: UncertaintySummary {
            total_edges: lengths.len(),
            exact_measurements: lengths.len() - range_count,
            range_measurements: range_count,
            uncertain_edges,
        },
        vertices,
    })
}

/// Deterministic analysis on best-estimate coordinates plus area and perimeter
/// spread from coordinate ranges.
pub fn analyze_vertices_with_uncertainty(
    vertices: &[UncertainVertex],
    unit: &str,
    mc: &McCfg,
    cfg: &BoundaryCfg,
    caps: &mut Capabilities,
) -> Result<UncertainVertexAnalysis> {
    let best: Vec<Vertex> = vertices
        .iter()
        .enumerate()
        .map(|(i, v)| {
            let id = v.id.clone().unwrap_or_else(|| format!("P{i}"));
            Ok(Vertex::new(
                id,
                v.x.to_range(unit)?.best_estimate(),
                v.y.to_range(unit)?.best_estimate(),
            ))
        })
        .collect::<Result<_>>()?;
    let deterministic = analyze_boundary(&best, unit, cfg, caps)?;
    let pts = points_of(&best);

    let area_mc = area_with_uncertainty(vertices, mc, caps, unit)?;
    let perimeter_mc = perimeter_from_vertices_with_uncertainty(vertices, mc, caps, unit)?;

    Ok(UncertainVertexAnalysis {
        n_samples: mc.n_samples,
        area: area_mc.summary(area(&pts)),
        perimeter: perimeter_mc.summary(perimeter(&pts)),
        best_estimate: deterministic,
    })
}
