//! Injected capabilities.
//!
//! Purpose
//! - Carry the optional collaborators the engine can use: a random source for
//!   sampling, a polygon validity check and a bounded scalar minimizer.
//! - Make absence explicit. Each consumer documents its fallback: point
//!   estimates instead of sampling, skipped validity checks, bracket midpoint
//!   instead of a search.
//!
//! Conventions
//! - `Capabilities::default()` has every slot empty.
//! - `Capabilities::seeded(seed)` fills every slot with the in-crate
//!   implementations (`StdRng`, `GeoValidity`, `BrentBounded`).
//! - There is no global state; callers own the value and pass it down.

mod brent;
mod validity;

use std::fmt;

use rand::rngs::StdRng;
use rand::{RngCore, SeedableRng};
use serde::Serialize;

pub use brent::{BoundedMinimizer, BrentBounded, Minimum};
pub use validity::{GeoValidity, GeometryCheck, GeometryReport};

/// Random source used for sampling.
pub type DynRng = dyn RngCore + Send;

/// Optional collaborators, injected by the caller.
#[derive(Default)]
pub struct Capabilities {
    stats: Option<Box<DynRng>>,
    geometry: Option<Box<dyn GeometryCheck + Send + Sync>>,
    minimizer: Option<Box<dyn BoundedMinimizer + Send + Sync>>,
}

/// Which capabilities are present, for logs and provenance.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct CapabilityReport {
    pub stats: bool,
    pub geometry: Option<&'static str>,
    pub minimizer: Option<&'static str>,
}

impl Capabilities {
    /// No capabilities; every consumer takes its fallback path.
    pub fn none() -> Self {
        Self::default()
    }

    /// All capabilities, with a `StdRng` seeded from `seed`.
    pub fn seeded(seed: u64) -> Self {
        Self::none()
            .with_rng(StdRng::seed_from_u64(seed))
            .with_geometry(GeoValidity)
            .with_minimizer(BrentBounded::default())
    }

    pub fn with_rng<R: RngCore + Send + 'static>(mut self, rng: R) -> Self {
        self.stats = Some(Box::new(rng));
        self
    }

    pub fn with_geometry<G: GeometryCheck + Send + Sync + 'static>(mut self, check: G) -> Self {
        self.geometry = Some(Box::new(check));
        self
    }

    pub fn with_minimizer<M: BoundedMinimizer + Send + Sync + 'static>(mut self, m: M) -> Self {
        self.minimizer = Some(Box::new(m));
        self
    }

    /// Drop the random source (forces point-estimate sampling).
    pub fn without_rng(mut self) -> Self {
        self.stats = None;
        self
    }

    /// Drop the validity check (simplicity is reported as unknown).
    pub fn without_geometry(mut self) -> Self {
        self.geometry = None;
        self
    }

    #[inline]
    pub fn rng_mut(&mut self) -> Option<&mut DynRng> {
        self.stats.as_deref_mut()
    }

    #[inline]
    pub fn geometry(&self) -> Option<&(dyn GeometryCheck + Send + Sync)> {
        self.geometry.as_deref()
    }

    #[inline]
    pub fn minimizer(&self) -> Option<&(dyn BoundedMinimizer + Send + Sync)> {
        self.minimizer.as_deref()
    }

    pub fn report(&self) -> CapabilityReport {
        CapabilityReport {
            stats: self.stats.is_some(),
            geometry: self.geometry().map(|g| g.name()),
            minimizer: self.minimizer().map(|m| m.name()),
        }
    }
}

impl fmt::Debug for Capabilities {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let r = self.report();
        f.debug_struct("Capabilities")
            .field("stats", &r.stats)
            .field("geometry", &r.geometry)
            .field("minimizer", &r.minimizer)
            .finish()
    }
}

#[cfg(test)]
mod tests;
