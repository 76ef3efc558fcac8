//! Per-render payload for the canvas backend.

use serde::{Deserialize, Serialize};

use crate::element::ElementList;
use crate::geometry::Viewport;

/// In-progress connection drawing: an edge follows the mouse from `vertex_id`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DrawEdge {
    pub vertex_id: String,
    #[serde(default)]
    pub to_vertex_id: Option<String>,
}

/// Highlighted paths between two vertices.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PathFocus {
    pub paths: Vec<Vec<String>>,
    #[serde(default)]
    pub source_id: Option<String>,
    #[serde(default)]
    pub target_id: Option<String>,
}

/// A plugin-contributed UI component (canvas tools, exporters, overlay views).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ComponentExtension {
    pub identifier: String,
    pub component_path: String,
}

impl ComponentExtension {
    pub fn new(identifier: impl Into<String>, component_path: impl Into<String>) -> Self {
        Self {
            identifier: identifier.into(),
            component_path: component_path.into(),
        }
    }
}

/// Everything the backend needs for one render.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RenderFrame {
    pub model_id: String,
    pub elements: ElementList,
    pub draw_edge_to_mouse_from: Option<DrawEdge>,
    pub draw_paths: Option<PathFocus>,
    /// Viewport to apply; only set when a model is first displayed
    pub viewport: Option<Viewport>,
    pub initial_display: bool,
    pub has_preview: bool,
    pub editable: bool,
    pub tools: Vec<ComponentExtension>,
    pub extension_views: Vec<ComponentExtension>,
    /// Stylesheet fragments contributed by style plugins, in registration order
    pub style_extensions: Vec<String>,
}
