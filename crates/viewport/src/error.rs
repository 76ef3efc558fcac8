//! Viewport error types.

use thiserror::Error;

/// Rejected viewport input.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ViewportError {
    /// Zoom must be finite and positive.
    #[error("Invalid zoom {0}: must be finite and > 0")]
    InvalidZoom(f64),

    /// Pan coordinates must be finite.
    #[error("Invalid pan ({x}, {y}): coordinates must be finite")]
    InvalidPan { x: f64, y: f64 },

    /// Zoom bounds are inverted or non-positive.
    #[error("Invalid zoom bounds: min {min} must be > 0 and <= max {max}")]
    InvalidBounds { min: f64, max: f64 },
}

impl ViewportError {
    /// Get an error code for this error type.
    pub fn code(&self) -> &'static str {
        match self {
            Self::InvalidZoom(_) => "INVALID_ZOOM",
            Self::InvalidPan { .. } => "INVALID_PAN",
            Self::InvalidBounds { .. } => "INVALID_BOUNDS",
        }
    }
}
