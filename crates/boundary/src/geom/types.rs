//! Basic 2D types and tolerances for boundary geometry.
//!
//! - `BoundaryCfg`: centralizes tolerances for closure, axis
//!   classification, angle landmarks and degeneracy checks.
//! - `Vertex`, `Segment`, `Bounds`, `InteriorAngle`: plain records produced by
//!   the kernel.
//! - `EdgeDirection`: direction tags of edge-walk inputs.

use std::fmt;
use std::str::FromStr;

use nalgebra::Vector2;
use serde::{Deserialize, Serialize, Serializer};

use crate::error::BoundaryError;

/// A boundary point. Units are implied by the caller (feet, millimetres).
pub type Point = Vector2<f64>;

/// Boundary configuration (tolerances).
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct BoundaryCfg {
    /// Maximum first-to-last gap for a ring to count as closed.
    pub closure_tol: f64,
    /// Perpendicular delta below which a segment is axis-aligned.
    pub axis_tol: f64,
    /// Tolerance around the 90/180/270 degree landmarks.
    pub angle_tol_deg: f64,
    /// Segments shorter than this are flagged.
    pub min_segment: f64,
    /// `|signed area|` below this makes the centroid fall back to the vertex mean.
    pub degenerate_area: f64,
    /// Tolerance for measured-vs-expected edge verification.
    pub verify_tol: f64,
}

impl Default for BoundaryCfg {
    fn default() -> Self {
        Self {
            closure_tol: 0.1,
            axis_tol: 0.01,
            angle_tol_deg: 0.5,
            min_segment: 0.01,
            degenerate_area: 1e-10,
            verify_tol: 0.01,
        }
    }
}

/// Labelled boundary vertex.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Vertex {
    pub id: String,
    pub x: f64,
    pub y: f64,
}

impl Vertex {
    pub fn new(id: impl Into<String>, x: f64, y: f64) -> Self {
        Self { id: id.into(), x, y }
    }

    #[inline]
    pub fn point(&self) -> Point {
        Point::new(self.x, self.y)
    }
}

/// Axis-aligned bounding box.
#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
pub struct Bounds {
    pub min_x: f64,
    pub max_x: f64,
    pub min_y: f64,
    pub max_y: f64,
    pub width: f64,
    pub height: f64,
}

/// Direction classification of a segment.
///
/// Serialized as `up`, `down`, `left`, `right` or `diagonal_<angle>deg`.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum SegmentDirection {
    Up,
    Down,
    Left,
    Right,
    Diagonal { angle_deg: f64 },
}

impl fmt::Display for SegmentDirection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Up => f.write_str("up"),
            Self::Down => f.write_str("down"),
            Self::Left => f.write_str("left"),
            Self::Right => f.write_str("right"),
            Self::Diagonal { angle_deg } => write!(f, "diagonal_{angle_deg:.1}deg"),
        }
    }
}

impl Serialize for SegmentDirection {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

/// Eight-point compass. 0° = East, angles increase clockwise (y grows down).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub enum Compass {
    #[serde(rename = "E")]
    East,
    #[serde(rename = "SE")]
    SouthEast,
    #[serde(rename = "S")]
    South,
    #[serde(rename = "SW")]
    SouthWest,
    #[serde(rename = "W")]
    West,
    #[serde(rename = "NW")]
    NorthWest,
    #[serde(rename = "N")]
    North,
    #[serde(rename = "NE")]
    NorthEast,
}

impl fmt::Display for Compass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::East => "E",
            Self::SouthEast => "SE",
            Self::South => "S",
            Self::SouthWest => "SW",
            Self::West => "W",
            Self::NorthWest => "NW",
            Self::North => "N",
            Self::NorthEast => "NE",
        })
    }
}

/// One analysed boundary segment between consecutive vertices.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Segment {
    pub index: usize,
    pub from_vertex: String,
    pub to_vertex: String,
    pub from: (f64, f64),
    pub to: (f64, f64),
    pub length: f64,
    pub direction: SegmentDirection,
    pub dx: f64,
    pub dy: f64,
    /// Signed angle from +x in degrees, `(-180, 180]`.
    pub angle_deg: f64,
    pub compass: Compass,
}

/// Interior angle classes, with landmarks at 90/180/270 degrees.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum AngleClass {
    RightAngle,
    Straight,
    ReflexRight,
    Acute,
    Obtuse,
    ReflexObtuse,
    ReflexAcute,
}

/// Interior angle at one vertex of a ring.
#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
pub struct InteriorAngle {
    pub vertex_index: usize,
    pub angle_deg: f64,
    pub classification: AngleClass,
}

/// Direction tag of an edge-walk input.
///
/// Parsed case-insensitively from `up/down/left/right`, `n/s/e/w`,
/// `north/south/east/west` and the diagonals `ne/se/sw/nw`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum EdgeDirection {
    Up,
    Down,
    Left,
    Right,
    NorthEast,
    SouthEast,
    SouthWest,
    NorthWest,
}

impl EdgeDirection {
    /// Coordinate change for an edge of `length` (y grows down).
    pub fn delta(self, length: f64) -> Point {
        self.unit_vector() * length
    }

    pub fn unit_vector(self) -> Point {
        let d = std::f64::consts::FRAC_1_SQRT_2;
        match self {
            Self::Right => Point::new(1.0, 0.0),
            Self::Left => Point::new(-1.0, 0.0),
            Self::Down => Point::new(0.0, 1.0),
            Self::Up => Point::new(0.0, -1.0),
            Self::NorthEast => Point::new(d, -d),
            Self::SouthEast => Point::new(d, d),
            Self::SouthWest => Point::new(-d, d),
            Self::NorthWest => Point::new(-d, -d),
        }
    }

    #[inline]
    pub fn is_cardinal(self) -> bool {
        matches!(self, Self::Up | Self::Down | Self::Left | Self::Right)
    }

    pub fn name(self) -> &'static str {
        match self {
            Self::Up => "up",
            Self::Down => "down",
            Self::Left => "left",
            Self::Right => "right",
            Self::NorthEast => "ne",
            Self::SouthEast => "se",
            Self::SouthWest => "sw",
            Self::NorthWest => "nw",
        }
    }
}

impl fmt::Display for EdgeDirection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for EdgeDirection {
    type Err = BoundaryError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "up" | "n" | "north" => Ok(Self::Up),
            "down" | "s" | "south" => Ok(Self::Down),
            "left" | "w" | "west" => Ok(Self::Left),
            "right" | "e" | "east" => Ok(Self::Right),
            "ne" | "northeast" => Ok(Self::NorthEast),
            "se" | "southeast" => Ok(Self::SouthEast),
            "sw" | "southwest" => Ok(Self::SouthWest),
            "nw" | "northwest" => Ok(Self::NorthWest),
            _ => Err(BoundaryError::UnknownDirection { name: s.to_string() }),
        }
    }
}

impl TryFrom<String> for EdgeDirection {
    type Error = BoundaryError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<EdgeDirection> for String {
    fn from(value: EdgeDirection) -> Self {
        value.name().to_string()
    }
}
