//! Boundary geometry with measurement uncertainty.
//!
//! Layout (leaf-first)
//! - `geom`: deterministic polygon kernel (shoelace area, perimeter, centroid,
//!   bounds, segments, interior angles, compass mapping).
//! - `measure`: `MeasurementRange`, a scalar that is exact or a bounded range
//!   with a sampling distribution.
//! - `caps`: injected capabilities (random source, geometry validity check,
//!   bounded minimizer). Absent capabilities select documented fallbacks.
//! - `montecarlo`: propagation of ranges through kernel formulas.
//! - `resolve`: closure-constrained estimation of one unknown edge.
//! - `validate`: closure, validity and measured-vs-expected checks.
//! - `analysis`: complete records combining the above.
//!
//! Conventions
//! - Coordinates follow drawing order: `x` grows to the right and `y` grows
//!   downwards, so a "down" edge adds `+length` to `y`.
//! - Geometry and validation problems are collected into result records.
//!   Only malformed construction (`BoundaryError::Configuration`) is fatal.

pub mod analysis;
pub mod caps;
pub mod error;
pub mod geom;
pub mod measure;
pub mod montecarlo;
pub mod precision;
pub mod resolve;
pub mod validate;

/// Library version string.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

pub use error::{BoundaryError, Result};
pub use nalgebra::Vector2;

/// Common exports for quick imports in callers.
pub mod prelude {
    pub use crate::analysis::{
        analyze_boundary, analyze_boundary_with_verification, analyze_edges_with_uncertainty,
        analyze_vertices_with_uncertainty, EdgeInput, LengthInput,
    };
    pub use crate::caps::{BoundedMinimizer, BrentBounded, Capabilities, GeoValidity, GeometryCheck};
    pub use crate::geom::{BoundaryCfg, EdgeDirection, Point, Vertex};
    pub use crate::measure::{Distribution, MeasurementRange, MeasurementSpec};
    pub use crate::montecarlo::{
        propagate, Coordinate, McCfg, ParallelCfg, UncertainVertex, UncertaintyResult,
    };
    pub use crate::resolve::{
        estimate_measurement_from_geometry, optimize_unknown_measurement, resolve_edge,
    };
    pub use crate::validate::{validate_closure, validate_polygon};
    pub use crate::{BoundaryError, Result};
}
