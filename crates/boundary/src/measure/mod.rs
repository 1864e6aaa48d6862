//! Measurements with uncertainty.
//!
//! A `MeasurementRange` is one real-world measurement: exact, or a bounded
//! range `[min, max]` with a best estimate and a sampling distribution.
//!
//! Sampling
//! - Exact measurements sample as constants regardless of distribution.
//! - `Normal` picks `std` so that the declared `confidence` interval spans
//!   `[min, max]`, then clamps draws into `[min, max]`. Clamping piles the
//!   clipped tail mass onto the bounds; the resulting spread is narrower than
//!   the unclamped normal. This keeps physical bounds strict and is kept as is.
//! - Without a random source (`rng = None`) every draw is the best estimate and
//!   the returned `Draws` is marked `SampleMethod::Fallback`.

mod normal;

use std::fmt;

use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::caps::DynRng;
use crate::error::{BoundaryError, Result};
use crate::precision::round_display;

pub use normal::normal_quantile;

/// Range widths strictly below this are exact; strictly above are ranges.
pub const EXACT_TOL: f64 = 0.01;
/// Confidence level used when none is given.
pub const DEFAULT_CONFIDENCE: f64 = 0.95;
/// Unit tag used when none is given.
pub const DEFAULT_UNIT: &str = "FT";

/// Sampling distribution of a ranged measurement.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Distribution {
    #[default]
    Uniform,
    Normal,
    Triangular,
}

/// How a batch of values was produced.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SampleMethod {
    MonteCarlo,
    /// Point estimate repeated; no random source was available.
    Fallback,
}

/// Values drawn from one measurement.
#[derive(Clone, Debug, PartialEq)]
pub struct Draws {
    pub values: Vec<f64>,
    pub method: SampleMethod,
}

/// Loose measurement description, as found in JSON inputs.
///
/// Resolution order: `min`+`max`, then `value`+`uncertainty`, then `value`.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct MeasurementSpec {
    #[serde(default, alias = "min_val")]
    pub min: Option<f64>,
    #[serde(default, alias = "max_val")]
    pub max: Option<f64>,
    #[serde(default)]
    pub value: Option<f64>,
    #[serde(default)]
    pub uncertainty: Option<f64>,
    #[serde(default)]
    pub distribution: Distribution,
    #[serde(default)]
    pub confidence: Option<f64>,
    #[serde(default)]
    pub unit: Option<String>,
}

/// Display form of a measurement, numeric fields rounded half-up to 2 places.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct MeasurementRecord {
    pub min: f64,
    pub max: f64,
    pub best_estimate: f64,
    pub uncertainty: f64,
    pub range_width: f64,
    pub is_exact: bool,
    pub is_range: bool,
    pub distribution: Distribution,
    pub confidence: f64,
    pub unit: String,
}

/// One measurement, exact or ranged. Immutable once built.
#[derive(Clone, Debug, PartialEq)]
pub struct MeasurementRange {
    min: f64,
    max: f64,
    best: f64,
    distribution: Distribution,
    confidence: f64,
    unit: String,
}

fn finite(name: &str, v: f64) -> Result<f64> {
    if v.is_finite() {
        Ok(v)
    } else {
        Err(BoundaryError::config(format!("{name} must be finite, got {v}")))
    }
}

impl MeasurementRange {
    fn from_bounds(min: f64, max: f64, best: f64) -> Self {
        Self {
            min,
            max,
            best,
            distribution: Distribution::Uniform,
            confidence: DEFAULT_CONFIDENCE,
            unit: DEFAULT_UNIT.to_string(),
        }
    }

    /// Range `[min, max]` with the midpoint as best estimate. Reversed bounds
    /// are reordered.
    pub fn between(min: f64, max: f64) -> Result<Self> {
        let a = finite("min", min)?;
        let b = finite("max", max)?;
        let (lo, hi) = if a <= b { (a, b) } else { (b, a) };
        Ok(Self::from_bounds(lo, hi, (lo + hi) / 2.0))
    }

    /// `value ± uncertainty`.
    pub fn around(value: f64, uncertainty: f64) -> Result<Self> {
        let v = finite("value", value)?;
        let u = finite("uncertainty", uncertainty)?;
        if u < 0.0 {
            return Err(BoundaryError::config(format!(
                "uncertainty must be >= 0, got {u}"
            )));
        }
        Ok(Self::from_bounds(v - u, v + u, v))
    }

    /// Exact measurement, `min = max = best = value`.
    pub fn exact(value: f64) -> Result<Self> {
        let v = finite("value", value)?;
        Ok(Self::from_bounds(v, v, v))
    }

    /// Build from a loose spec; `default_unit` applies when the spec has none.
    pub fn from_spec(spec: &MeasurementSpec, default_unit: &str) -> Result<Self> {
        let base = match (spec.min, spec.max, spec.value, spec.uncertainty) {
            (Some(lo), Some(hi), _, _) => Self::between(lo, hi)?,
            (_, _, Some(v), Some(u)) => Self::around(v, u)?,
            (_, _, Some(v), None) => Self::exact(v)?,
            _ => {
                return Err(BoundaryError::config(
                    "must specify (min, max), (value, uncertainty) or value",
                ))
            }
        };
        let unit = spec.unit.as_deref().unwrap_or(default_unit);
        base.with_distribution(spec.distribution)
            .with_confidence(spec.confidence.unwrap_or(DEFAULT_CONFIDENCE))
            .map(|m| m.with_unit(unit))
    }

    /// Rebuild from a record; keeps `min`, `max` and the midpoint best estimate.
    pub fn from_record(rec: &MeasurementRecord) -> Result<Self> {
        Ok(Self::between(rec.min, rec.max)?
            .with_distribution(rec.distribution)
            .with_confidence(rec.confidence)?
            .with_unit(rec.unit.as_str()))
    }

    pub fn with_distribution(mut self, distribution: Distribution) -> Self {
        self.distribution = distribution;
        self
    }

    /// Confidence level in `(0, 1]`.
    pub fn with_confidence(mut self, confidence: f64) -> Result<Self> {
        if !(confidence > 0.0 && confidence <= 1.0) {
            return Err(BoundaryError::config(format!(
                "confidence must be in (0, 1], got {confidence}"
            )));
        }
        self.confidence = confidence;
        Ok(self)
    }

    pub fn with_unit(mut self, unit: impl Into<String>) -> Self {
        self.unit = unit.into();
        self
    }

    #[inline]
    pub fn min(&self) -> f64 {
        self.min
    }
    #[inline]
    pub fn max(&self) -> f64 {
        self.max
    }
    #[inline]
    pub fn best_estimate(&self) -> f64 {
        self.best
    }
    #[inline]
    pub fn range_width(&self) -> f64 {
        self.max - self.min
    }
    #[inline]
    pub fn uncertainty(&self) -> f64 {
        self.range_width() / 2.0
    }
    #[inline]
    pub fn distribution(&self) -> Distribution {
        self.distribution
    }
    #[inline]
    pub fn confidence(&self) -> f64 {
        self.confidence
    }
    #[inline]
    pub fn unit(&self) -> &str {
        &self.unit
    }

    /// Width below `EXACT_TOL`.
    #[inline]
    pub fn is_exact(&self) -> bool {
        self.range_width().abs() < EXACT_TOL
    }

    /// Width above `EXACT_TOL`. Widths of exactly `EXACT_TOL` are neither.
    #[inline]
    pub fn is_range(&self) -> bool {
        self.range_width() > EXACT_TOL
    }

    /// Standard deviation of the normal model: the two-sided `confidence`
    /// interval spans the range. Zero at `confidence = 1`.
    pub fn normal_std(&self) -> f64 {
        let z = normal_quantile((1.0 + self.confidence) / 2.0);
        if z.is_finite() && z > 0.0 {
            self.range_width() / (2.0 * z)
        } else {
            0.0
        }
    }

    /// Draw `n` independent values. See the module docs for the policy.
    pub fn sample(&self, n: usize, rng: Option<&mut DynRng>) -> Draws {
        let Some(rng) = rng else {
            tracing::debug!(best = self.best, n, "no random source, sampling point estimate");
            return Draws {
                values: vec![self.best; n],
                method: SampleMethod::Fallback,
            };
        };
        if self.is_exact() {
            return Draws {
                values: vec![self.best; n],
                method: SampleMethod::MonteCarlo,
            };
        }
        let (lo, hi, mode) = (self.min, self.max, self.best);
        let width = self.range_width();
        let values = match self.distribution {
            Distribution::Uniform => (0..n).map(|_| lo + rng.gen::<f64>() * width).collect(),
            Distribution::Normal => {
                let sd = self.normal_std();
                (0..n)
                    .map(|_| (mode + sd * normal::standard_normal(&mut *rng)).clamp(lo, hi))
                    .collect()
            }
            Distribution::Triangular => {
                let fc = (mode - lo) / width;
                (0..n)
                    .map(|_| {
                        let u: f64 = rng.gen();
                        if u < fc {
                            lo + (u * width * (mode - lo)).sqrt()
                        } else {
                            hi - ((1.0 - u) * width * (hi - mode)).sqrt()
                        }
                    })
                    .collect()
            }
        };
        Draws {
            values,
            method: SampleMethod::MonteCarlo,
        }
    }

    /// Rounded display record.
    pub fn to_record(&self) -> MeasurementRecord {
        MeasurementRecord {
            min: round_display(self.min),
            max: round_display(self.max),
            best_estimate: round_display(self.best),
            uncertainty: round_display(self.uncertainty()),
            range_width: round_display(self.range_width()),
            is_exact: self.is_exact(),
            is_range: self.is_range(),
            distribution: self.distribution,
            confidence: self.confidence,
            unit: self.unit.clone(),
        }
    }
}

impl fmt::Display for MeasurementRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_exact() {
            write!(f, "{:.2} {}", self.best, self.unit)
        } else {
            write!(
                f,
                "{:.1}-{:.1} {} (best: {:.2})",
                self.min, self.max, self.unit, self.best
            )
        }
    }
}

#[cfg(test)]
mod tests;
