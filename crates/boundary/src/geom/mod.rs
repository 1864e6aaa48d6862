//! Polygon geometry kernel.
//!
//! Purpose
//! - Deterministic quantities of an ordered vertex sequence: shoelace area,
//!   perimeter, area-weighted centroid, bounding box, segment analysis,
//!   interior angles and compass mapping.
//! - No dependency on measurement or sampling code; the Monte Carlo engine
//!   reuses these formulas as its sampled functions.
//!
//! Conventions
//! - Input order defines winding and adjacency. `y` grows downwards, so
//!   compass angles increase clockwise on screen (0° = E, 90° = S).
//! - Operations that need a polygon require 3 distinct vertices after a
//!   duplicated closing vertex is dropped; below that they return neutral
//!   values (area 0, vertex-mean centroid, no angles).

mod kernel;
mod types;

pub use kernel::{
    analyze_segment, angle_to_compass, area, bounds, centroid, classify_angle,
    classify_direction, interior_angle, interior_angles, perimeter, segments, signed_area,
    strip_closing, usable_vertex_count, walk,
};
pub use types::{
    AngleClass, BoundaryCfg, Bounds, Compass, EdgeDirection, InteriorAngle, Point, Segment,
    SegmentDirection, Vertex,
};
