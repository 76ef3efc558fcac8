//! Viewport memory per displayed model
//!
//! The canvas reports pan/zoom continuously. The tracker keeps the latest value
//! for each model so it can be persisted when the view moves on to another
//! model (or shuts down), and decides which viewport the next render applies.

use std::collections::HashMap;

use graph_view_types::Viewport;
use serde::{Deserialize, Serialize};

use crate::error::ViewportError;
use crate::{DEFAULT_MAX_ZOOM, DEFAULT_MIN_ZOOM};

/// Allowed zoom range.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ZoomBounds {
    pub min: f64,
    pub max: f64,
}

impl Default for ZoomBounds {
    fn default() -> Self {
        Self {
            min: DEFAULT_MIN_ZOOM,
            max: DEFAULT_MAX_ZOOM,
        }
    }
}

impl ZoomBounds {
    pub fn new(min: f64, max: f64) -> Result<Self, ViewportError> {
        if !(min > 0.0) || !(min <= max) || !max.is_finite() {
            return Err(ViewportError::InvalidBounds { min, max });
        }
        Ok(Self { min, max })
    }

    pub fn clamp(&self, zoom: f64) -> f64 {
        zoom.clamp(self.min, self.max)
    }
}

/// Viewport the next render should apply.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct ViewportDisplay {
    /// `Some` only when a model is first displayed and has a stored viewport
    pub viewport: Option<Viewport>,
    /// True until the displayed model has rendered once
    pub initial_display: bool,
}

/// Tracks the live viewport of every model shown in this view.
#[derive(Debug, Clone, Default)]
pub struct ViewportTracker {
    /// Latest pan/zoom reported per model id
    current: HashMap<String, Viewport>,
    bounds: ZoomBounds,
    display: ViewportDisplay,
}

impl ViewportTracker {
    pub fn new(bounds: ZoomBounds) -> Self {
        Self {
            current: HashMap::new(),
            bounds,
            display: ViewportDisplay {
                viewport: None,
                initial_display: true,
            },
        }
    }

    pub fn bounds(&self) -> ZoomBounds {
        self.bounds
    }

    /// Record a pan/zoom change reported by the canvas
    pub fn record(
        &mut self,
        model_id: &str,
        viewport: Viewport,
    ) -> Result<Viewport, ViewportError> {
        if !viewport.zoom.is_finite() || viewport.zoom <= 0.0 {
            return Err(ViewportError::InvalidZoom(viewport.zoom));
        }
        if !viewport.pan.x.is_finite() || !viewport.pan.y.is_finite() {
            return Err(ViewportError::InvalidPan {
                x: viewport.pan.x,
                y: viewport.pan.y,
            });
        }
        let clamped = Viewport::new(viewport.pan, self.bounds.clamp(viewport.zoom));
        self.current.insert(model_id.to_string(), clamped);
        Ok(clamped)
    }

    /// Latest recorded viewport of `model_id`
    pub fn current(&self, model_id: &str) -> Option<Viewport> {
        self.current.get(model_id).copied()
    }

    /// Remove and return the recorded viewport of `model_id` for persistence
    pub fn take_for_save(&mut self, model_id: &str) -> Option<Viewport> {
        let saved = self.current.remove(model_id);
        if let Some(vp) = saved {
            tracing::debug!(model_id, zoom = vp.zoom, "saving viewport");
        }
        saved
    }

    /// A different model is now displayed: apply its stored viewport once
    pub fn show_model(&mut self, stored: Option<Viewport>) {
        self.display = ViewportDisplay {
            viewport: stored.map(|vp| Viewport::new(vp.pan, self.bounds.clamp(vp.zoom))),
            initial_display: true,
        };
    }

    /// The same model re-rendered: leave the canvas viewport alone
    pub fn keep_model(&mut self) {
        self.display = ViewportDisplay {
            viewport: None,
            initial_display: false,
        };
    }

    pub fn display(&self) -> ViewportDisplay {
        self.display
    }
}
