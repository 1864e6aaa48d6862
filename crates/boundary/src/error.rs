//! Error type for the boundary crate.
//!
//! Only construction problems surface as errors. Capability absence and
//! optimizer non-convergence are reported inside result records instead.

use thiserror::Error;

/// Errors raised by constructors and input-contract checks.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum BoundaryError {
    /// A measurement or engine configuration could not be built.
    #[error("configuration error: {reason}")]
    Configuration {
        /// What was wrong with the inputs.
        reason: String,
    },

    /// Too few usable vertices for an operation that needs a polygon.
    #[error("degenerate geometry: {found} usable vertices, need at least {required}")]
    DegenerateGeometry {
        /// Number of vertices supplied.
        found: usize,
        /// Minimum number of vertices the operation needs.
        required: usize,
    },

    /// The operation only supports the four cardinal directions.
    #[error("direction {direction} is not cardinal (up/down/left/right)")]
    UnsupportedDirection {
        /// Name of the rejected direction.
        direction: String,
    },

    /// A direction tag could not be parsed.
    #[error("unknown direction: {name}")]
    UnknownDirection {
        /// The unparsed tag.
        name: String,
    },
}

/// A specialized `Result` type for boundary operations.
pub type Result<T> = std::result::Result<T, BoundaryError>;

impl BoundaryError {
    pub(crate) fn config(reason: impl Into<String>) -> Self {
        Self::Configuration {
            reason: reason.into(),
        }
    }

    /// Returns `true` if this is a construction/configuration error.
    pub fn is_config_error(&self) -> bool {
        matches!(self, BoundaryError::Configuration { .. })
    }
}
