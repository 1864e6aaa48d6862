//! Summary statistics of a propagated quantity.

use std::fmt;

use serde::Serialize;

use crate::error::{BoundaryError, Result};
use crate::measure::SampleMethod;
use crate::precision::{round_display, round_half_up, CALC_PRECISION};

/// Samples of a derived quantity plus their summary statistics.
///
/// `std` uses the `n - 1` divisor (0 for a single sample). Percentiles
/// interpolate linearly between order statistics.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct UncertaintyResult {
    #[serde(skip)]
    pub samples: Vec<f64>,
    pub name: String,
    pub unit: String,
    pub mean: f64,
    pub std: f64,
    pub min: f64,
    pub max: f64,
    pub median: f64,
    pub p5: f64,
    pub p25: f64,
    pub p75: f64,
    pub p95: f64,
    pub ci_95: (f64, f64),
    /// `std / mean`, 0 when the mean is 0.
    pub cv: f64,
    pub method: SampleMethod,
    /// Samples flagged by the geometry capability; `None` when not checked.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub degenerate_samples: Option<usize>,
}

/// Rounded statistics for display.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct UncertaintyRecord {
    pub name: String,
    pub mean: f64,
    pub std: f64,
    pub min: f64,
    pub max: f64,
    pub median: f64,
    pub ci_95_lower: f64,
    pub ci_95_upper: f64,
    pub cv_percent: f64,
    pub unit: String,
    pub n_samples: usize,
    pub method: SampleMethod,
}

/// Compact rounded summary used inside analysis records.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct UncertainQuantity {
    pub best_estimate: f64,
    pub uncertainty: f64,
    pub ci_95: [f64; 2],
    pub min: f64,
    pub max: f64,
    pub unit: String,
    pub method: SampleMethod,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub degenerate_samples: Option<usize>,
}

/// Percentile `q` in `[0, 100]` of ascending `sorted`, linear interpolation.
pub fn percentile(sorted: &[f64], q: f64) -> f64 {
    match sorted.len() {
        0 => f64::NAN,
        1 => sorted[0],
        n => {
            let pos = (q / 100.0).clamp(0.0, 1.0) * (n - 1) as f64;
            let lo = pos.floor() as usize;
            let hi = (lo + 1).min(n - 1);
            let frac = pos - lo as f64;
            sorted[lo] + frac * (sorted[hi] - sorted[lo])
        }
    }
}

impl UncertaintyResult {
    pub fn from_samples(
        samples: Vec<f64>,
        name: impl Into<String>,
        unit: impl Into<String>,
        method: SampleMethod,
    ) -> Result<Self> {
        let n = samples.len();
        if n == 0 {
            return Err(BoundaryError::config("cannot summarize zero samples"));
        }
        let mean = samples.iter().sum::<f64>() / n as f64;
        let std = if n > 1 {
            let ss: f64 = samples.iter().map(|x| (x - mean).powi(2)).sum();
            (ss / (n - 1) as f64).sqrt()
        } else {
            0.0
        };
        let mut sorted = samples.clone();
        sorted.sort_by(f64::total_cmp);
        let p5 = percentile(&sorted, 5.0);
        let p95 = percentile(&sorted, 95.0);
        Ok(Self {
            name: name.into(),
            unit: unit.into(),
            mean,
            std,
            min: sorted[0],
            max: sorted[n - 1],
            median: percentile(&sorted, 50.0),
            p5,
            p25: percentile(&sorted, 25.0),
            p75: percentile(&sorted, 75.0),
            p95,
            ci_95: (p5, p95),
            cv: if mean != 0.0 { std / mean } else { 0.0 },
            method,
            degenerate_samples: None,
            samples,
        })
    }

    #[inline]
    pub fn n_samples(&self) -> usize {
        self.samples.len()
    }

    pub fn to_record(&self) -> UncertaintyRecord {
        UncertaintyRecord {
            name: self.name.clone(),
            mean: round_display(self.mean),
            std: round_half_up(self.std, CALC_PRECISION),
            min: round_display(self.min),
            max: round_display(self.max),
            median: round_display(self.median),
            ci_95_lower: round_display(self.ci_95.0),
            ci_95_upper: round_display(self.ci_95.1),
            cv_percent: round_display(self.cv * 100.0),
            unit: self.unit.clone(),
            n_samples: self.n_samples(),
            method: self.method,
        }
    }

    /// Rounded summary around `best_estimate`.
    pub fn summary(&self, best_estimate: f64) -> UncertainQuantity {
        UncertainQuantity {
            best_estimate: round_display(best_estimate),
            uncertainty: round_half_up(self.std, CALC_PRECISION),
            ci_95: [round_display(self.ci_95.0), round_display(self.ci_95.1)],
            min: round_display(self.min),
            max: round_display(self.max),
            unit: self.unit.clone(),
            method: self.method,
            degenerate_samples: self.degenerate_samples,
        }
    }
}

impl fmt::Display for UncertaintyResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{:.2} ± {:.2} {} (95% CI: {:.2} - {:.2})",
            self.mean, self.std, self.unit, self.ci_95.0, self.ci_95.1
        )
    }
}
