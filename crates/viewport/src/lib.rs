//! Viewport state for the graph view
//!
//! - [`ViewportTracker`] remembers the latest pan/zoom of every displayed model
//!   and hands the recorded viewport back when the view switches away from it
//! - [`retina`] converts between stored points and canvas pixels
//! - [`ZoomBounds`] keeps zoom inside the canvas limits

mod error;
pub mod retina;
mod state;

pub use error::ViewportError;
pub use state::{ViewportDisplay, ViewportTracker, ZoomBounds};

/// Default minimum zoom (1/16)
pub const DEFAULT_MIN_ZOOM: f64 = 1.0 / 16.0;

/// Default maximum zoom
pub const DEFAULT_MAX_ZOOM: f64 = 6.0;
