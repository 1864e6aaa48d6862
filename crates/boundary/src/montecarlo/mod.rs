//! Monte Carlo propagation of measurement ranges.
//!
//! Purpose
//! - Push every `MeasurementRange` through a deterministic formula (perimeter,
//!   shoelace area, any caller closure) and summarize the spread.
//!
//! Conventions
//! - Measurements are sampled independently, one after another from the single
//!   injected random source, so seeded runs are reproducible regardless of
//!   thread count. Coordinates of one vertex are independent too; correlated
//!   errors are not modelled.
//! - Sample rows are evaluated in parallel with `rayon` once `n_samples`
//!   reaches `ParallelCfg::min_rows`.
//! - Without a random source the formula runs once on best estimates and the
//!   result carries `SampleMethod::Fallback`.

mod stats;

use nalgebra::{DMatrix, DVector};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};

use crate::caps::{Capabilities, GeometryCheck};
use crate::error::{BoundaryError, Result};
use crate::geom::{area, perimeter, strip_closing, walk, EdgeDirection, Point};
use crate::measure::{MeasurementRange, MeasurementSpec, SampleMethod};

pub use stats::{percentile, UncertainQuantity, UncertaintyRecord, UncertaintyResult};

/// Row-parallel evaluation settings.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParallelCfg {
    pub enabled: bool,
    /// Below this many rows evaluation stays sequential.
    pub min_rows: usize,
}

impl Default for ParallelCfg {
    fn default() -> Self {
        Self {
            enabled: true,
            min_rows: 2048,
        }
    }
}

impl ParallelCfg {
    #[inline]
    fn use_parallel(&self, rows: usize) -> bool {
        self.enabled && rows >= self.min_rows
    }
}

/// Monte Carlo settings.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct McCfg {
    pub n_samples: usize,
    pub parallel: ParallelCfg,
}

impl Default for McCfg {
    fn default() -> Self {
        Self {
            n_samples: 10_000,
            parallel: ParallelCfg::default(),
        }
    }
}

impl McCfg {
    pub fn with_samples(n_samples: usize) -> Self {
        Self {
            n_samples,
            ..Self::default()
        }
    }

    fn validate(&self) -> Result<()> {
        if self.n_samples == 0 {
            return Err(BoundaryError::config("n_samples must be >= 1"));
        }
        Ok(())
    }
}

/// A vertex coordinate: exact, a `[min, max]` pair, or a loose measurement.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Coordinate {
    Exact(f64),
    Pair([f64; 2]),
    Range(MeasurementSpec),
}

impl Coordinate {
    pub fn to_range(&self, unit: &str) -> Result<MeasurementRange> {
        match self {
            Self::Exact(v) => Ok(MeasurementRange::exact(*v)?.with_unit(unit)),
            Self::Pair([lo, hi]) => Ok(MeasurementRange::between(*lo, *hi)?.with_unit(unit)),
            Self::Range(spec) => MeasurementRange::from_spec(spec, unit),
        }
    }
}

impl From<f64> for Coordinate {
    fn from(v: f64) -> Self {
        Self::Exact(v)
    }
}

/// Vertex whose coordinates may carry ranges.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct UncertainVertex {
    #[serde(default)]
    pub id: Option<String>,
    pub x: Coordinate,
    pub y: Coordinate,
}

impl UncertainVertex {
    pub fn new(x: impl Into<Coordinate>, y: impl Into<Coordinate>) -> Self {
        Self {
            id: None,
            x: x.into(),
            y: y.into(),
        }
    }

    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = Some(id.into());
        self
    }
}

/// Propagate `measurements` through `f` (one argument per measurement, in
/// order).
///
/// Errors only on `n_samples == 0`.
pub fn propagate<F>(
    f: F,
    measurements: &[MeasurementRange],
    cfg: &McCfg,
    caps: &mut Capabilities,
    name: &str,
    unit: &str,
) -> Result<UncertaintyResult>
where
    F: Fn(&[f64]) -> f64 + Sync,
{
    cfg.validate()?;
    let m = measurements.len();
    let Some(rng) = caps.rng_mut() else {
        tracing::warn!(quantity = name, "no random source, propagating best estimates only");
        let best: Vec<f64> = measurements.iter().map(|x| x.best_estimate()).collect();
        return UncertaintyResult::from_samples(vec![f(&best)], name, unit, SampleMethod::Fallback);
    };
    let n = cfg.n_samples;
    tracing::debug!(quantity = name, measurements = m, n_samples = n, "monte carlo propagation");

    let values: Vec<f64> = if m == 0 {
        vec![f(&[]); n]
    } else {
        let columns: Vec<Vec<f64>> = measurements
            .iter()
            .map(|x| x.sample(n, Some(&mut *rng)).values)
            .collect();
        // m x n, column-major: each sample row is a contiguous column.
        let rows = DMatrix::from_fn(m, n, |j, i| columns[j][i]);
        let data = rows.as_slice();
        if cfg.parallel.use_parallel(n) {
            data.par_chunks(m).map(|row| f(row)).collect()
        } else {
            data.chunks(m).map(|row| f(row)).collect()
        }
    };
    let result = UncertaintyResult::from_samples(values, name, unit, SampleMethod::MonteCarlo)?;
    tracing::debug!(quantity = name, mean = result.mean, std = result.std, "propagation done");
    Ok(result)
}

/// Perimeter as the sum of edge lengths.
pub fn perimeter_with_uncertainty(
    edge_lengths: &[MeasurementRange],
    cfg: &McCfg,
    caps: &mut Capabilities,
    unit: &str,
) -> Result<UncertaintyResult> {
    propagate(|v| v.iter().sum(), edge_lengths, cfg, caps, "Perimeter", unit)
}

fn coordinate_ranges(
    vertices: &[UncertainVertex],
    unit: &str,
) -> Result<(Vec<MeasurementRange>, Vec<MeasurementRange>)> {
    let mut xs = Vec::with_capacity(vertices.len());
    let mut ys = Vec::with_capacity(vertices.len());
    for v in vertices {
        xs.push(v.x.to_range(unit)?);
        ys.push(v.y.to_range(unit)?);
    }
    // A repeated closing vertex would be sampled independently of the first.
    let best: Vec<Point> = xs
        .iter()
        .zip(&ys)
        .map(|(x, y)| Point::new(x.best_estimate(), y.best_estimate()))
        .collect();
    let keep = strip_closing(&best).len();
    xs.truncate(keep);
    ys.truncate(keep);
    Ok((xs, ys))
}

/// Column-wise shoelace: one area per sample row of `xs`/`ys`.
fn shoelace_columns(xs: &DMatrix<f64>, ys: &DMatrix<f64>) -> DVector<f64> {
    let (n, v) = xs.shape();
    let mut acc = DVector::<f64>::zeros(n);
    if v < 3 {
        return acc;
    }
    for j in 0..v {
        let k = (j + 1) % v;
        acc += xs.column(j).component_mul(&ys.column(k));
        acc -= xs.column(k).component_mul(&ys.column(j));
    }
    acc.map(|s| (s / 2.0).abs())
}

fn count_invalid(
    check: &(dyn GeometryCheck + Send + Sync),
    xs: &DMatrix<f64>,
    ys: &DMatrix<f64>,
    parallel: bool,
) -> usize {
    let (n, v) = xs.shape();
    let invalid = |i: usize| {
        let pts: Vec<Point> = (0..v).map(|j| Point::new(xs[(i, j)], ys[(i, j)])).collect();
        !check.check(&pts).is_valid
    };
    if parallel {
        (0..n).into_par_iter().filter(|&i| invalid(i)).count()
    } else {
        (0..n).filter(|&i| invalid(i)).count()
    }
}

/// Polygon area with coordinate uncertainty.
///
/// Samples every x coordinate, then every y coordinate, and evaluates the
/// shoelace formula over the whole sample matrix at once. With a geometry
/// capability each sampled ring is checked; invalid rings keep their
/// shoelace area and are tallied in `degenerate_samples`.
pub fn area_with_uncertainty(
    vertices: &[UncertainVertex],
    cfg: &McCfg,
    caps: &mut Capabilities,
    unit: &str,
) -> Result<UncertaintyResult> {
    cfg.validate()?;
    let (xr, yr) = coordinate_ranges(vertices, unit)?;
    let v = xr.len();
    let area_unit = format!("sq {unit}");
    let n = cfg.n_samples;

    let sampled = caps.rng_mut().map(|rng| {
        let mut xs = DMatrix::<f64>::zeros(n, v);
        let mut ys = DMatrix::<f64>::zeros(n, v);
        for (j, r) in xr.iter().enumerate() {
            xs.set_column(j, &DVector::from_vec(r.sample(n, Some(&mut *rng)).values));
        }
        for (j, r) in yr.iter().enumerate() {
            ys.set_column(j, &DVector::from_vec(r.sample(n, Some(&mut *rng)).values));
        }
        (xs, ys)
    });

    let Some((xs, ys)) = sampled else {
        tracing::warn!("no random source, area from best-estimate coordinates");
        let best: Vec<Point> = xr
            .iter()
            .zip(&yr)
            .map(|(x, y)| Point::new(x.best_estimate(), y.best_estimate()))
            .collect();
        let mut result = UncertaintyResult::from_samples(
            vec![area(&best)],
            "Area",
            area_unit,
            SampleMethod::Fallback,
        )?;
        result.degenerate_samples = caps
            .geometry()
            .map(|g| usize::from(!g.check(&best).is_valid));
        return Ok(result);
    };

    tracing::debug!(vertices = v, n_samples = n, "monte carlo area");
    let areas = shoelace_columns(&xs, &ys);
    let degenerate = caps
        .geometry()
        .map(|g| count_invalid(g, &xs, &ys, cfg.parallel.use_parallel(n)));
    if let Some(bad) = degenerate.filter(|&d| d > 0) {
        tracing::warn!(degenerate = bad, n_samples = n, "sampled rings failed the validity check");
    }
    let mut result = UncertaintyResult::from_samples(
        areas.as_slice().to_vec(),
        "Area",
        area_unit,
        SampleMethod::MonteCarlo,
    )?;
    result.degenerate_samples = degenerate;
    Ok(result)
}

/// Perimeter of a ring whose vertex coordinates carry ranges.
pub fn perimeter_from_vertices_with_uncertainty(
    vertices: &[UncertainVertex],
    cfg: &McCfg,
    caps: &mut Capabilities,
    unit: &str,
) -> Result<UncertaintyResult> {
    let (xr, yr) = coordinate_ranges(vertices, unit)?;
    // Interleaved as x0, y0, x1, y1, ...
    let coords: Vec<MeasurementRange> = xr
        .into_iter()
        .zip(yr)
        .flat_map(|(x, y)| [x, y])
        .collect();
    let f = |v: &[f64]| {
        let pts: Vec<Point> = v.chunks(2).map(|c| Point::new(c[0], c[1])).collect();
        perimeter(&pts)
    };
    propagate(f, &coords, cfg, caps, "Perimeter", unit)
}

/// Area of the ring walked from the origin along directional edges whose
/// lengths carry ranges.
pub fn area_from_edges_with_uncertainty(
    edges: &[(EdgeDirection, MeasurementRange)],
    cfg: &McCfg,
    caps: &mut Capabilities,
    unit: &str,
) -> Result<UncertaintyResult> {
    let directions: Vec<EdgeDirection> = edges.iter().map(|(d, _)| *d).collect();
    let lengths: Vec<MeasurementRange> = edges.iter().map(|(_, l)| l.clone()).collect();
    let f = |lens: &[f64]| {
        let steps: Vec<(EdgeDirection, f64)> =
            directions.iter().copied().zip(lens.iter().copied()).collect();
        area(&walk(Point::zeros(), &steps))
    };
    propagate(f, &lengths, cfg, caps, "Area", &format!("sq {unit}"))
}
