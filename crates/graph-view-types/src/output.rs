//! Intents the view emits back to the owning application.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use uuid::Uuid;

use crate::geometry::{Point, Viewport};

/// Handle of an open detail-preview popover.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PreviewHandle(pub Uuid);

impl PreviewHandle {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for PreviewHandle {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for PreviewHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "preview-{}", self.0)
    }
}

/// Everything the view asks of the application or the canvas.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ViewOutput {
    SetSelection {
        vertices: Vec<String>,
        edges: Vec<String>,
    },
    ClearSelection,
    /// Node positions in points
    UpdatePositions {
        model_id: String,
        positions: BTreeMap<String, Point>,
    },
    UpdateViewport {
        model_id: String,
        viewport: Viewport,
    },
    UpdatePreview {
        model_id: String,
        image_data: String,
    },
    RequestVertexMenu {
        origin: Option<String>,
        vertex_id: String,
        screen_pos: Point,
    },
    RequestEdgeMenu {
        origin: Option<String>,
        edge_ids: Vec<String>,
        screen_pos: Point,
    },
    /// Add elements to the displayed model, optionally at a canvas position (points)
    DropElements {
        vertex_ids: Vec<String>,
        edge_ids: Vec<String>,
        canvas_pos: Option<Point>,
    },
    RemoveElements {
        vertex_ids: Vec<String>,
        edge_ids: Vec<String>,
    },
    NotifyUser {
        message: String,
    },
    /// Lock or unlock node dragging on the canvas
    SetGrabLocked {
        locked: bool,
    },
    ShowConnectionPopover {
        from_vertex_id: String,
        to_vertex_id: String,
        connection_type: Option<String>,
    },
    OpenPreview {
        vertex_id: String,
        handle: PreviewHandle,
    },
    ClosePreview {
        vertex_id: String,
        handle: PreviewHandle,
    },
    OpenExport {
        identifier: String,
        component_path: String,
        model_id: String,
    },
    /// Add vertices found through the add-related dialog to the model
    AddRelated {
        model_id: String,
        vertex_ids: Vec<String>,
    },
    /// The element list is out of date; render again
    Rerender,
}

impl ViewOutput {
    pub fn notify(message: impl Into<String>) -> Self {
        ViewOutput::NotifyUser {
            message: message.into(),
        }
    }
}
