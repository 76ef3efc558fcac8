//! Renderer-ready element lists.
//!
//! Node and edge records mirror what the canvas backend consumes: a `data`
//! payload, a space-separated class string and interaction flags. Plugin
//! contributions land in the flattened `extra` maps.

use serde::{Deserialize, Serialize};

use crate::domain::EdgeMembership;
use crate::geometry::Point;

/// Key/value patch returned by transformer plugins and decoration providers
pub type DataPatch = serde_json::Map<String, serde_json::Value>;

// =============================================================================
// NODES
// =============================================================================

/// Target of a ghost node's relocation animation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnimateTo {
    /// Id of the real node being animated
    pub id: String,
    /// Final position of the real node (pixels)
    pub pos: Point,
}

/// Placement of a decoration relative to its parent node.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DecorationAlignment {
    /// `left`, `center` or `right`
    pub h: String,
    /// `top`, `center` or `bottom`
    pub v: String,
}

/// Extra spacing around a decoration.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DecorationPadding {
    pub x: f64,
    pub y: f64,
}

/// Data payload of a rendered node.
///
/// Real vertex nodes fill the title/image fields, partial nodes carry only an
/// id, decoration nodes carry alignment/padding and the decorated vertex id.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct NodeData {
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parent: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_truncated: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub truncated_title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub concept_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_src: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub selected_image_src: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub animate_to: Option<AnimateTo>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub alignment: Option<DecorationAlignment>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub padding: Option<DecorationPadding>,
    /// Vertex a decoration node is attached to
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub vertex_id: Option<String>,
    #[serde(flatten)]
    pub extra: DataPatch,
}

impl NodeData {
    /// Data carrying nothing but an id (partial nodes, decoration parents)
    pub fn bare(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            ..Self::default()
        }
    }

    /// Merge a plugin patch into the extra fields; later keys win
    pub fn apply_patch(&mut self, patch: DataPatch) {
        self.extra.extend(patch);
    }
}

/// A node in the element list.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RenderedNode {
    pub data: NodeData,
    pub classes: String,
    /// Position in pixels; `None` lets the backend place compound parents
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub position: Option<Point>,
    pub selected: bool,
    pub selectable: bool,
    pub grabbable: bool,
}

impl RenderedNode {
    pub fn id(&self) -> &str {
        &self.data.id
    }

    /// Whether `class` is one of the node's class tokens
    pub fn has_class(&self, class: &str) -> bool {
        self.classes.split_whitespace().any(|c| c == class)
    }
}

// =============================================================================
// EDGES
// =============================================================================

/// Data payload of a rendered (possibly compound) edge.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EdgeData {
    pub id: String,
    pub source: String,
    pub target: String,
    /// Relationship label shared by every collapsed edge
    #[serde(rename = "type")]
    pub edge_type: String,
    /// Human-readable label, with a count suffix for compound edges
    pub label: String,
    pub edge_infos: Vec<EdgeMembership>,
    /// Ids of the collapsed domain edges whose data has resolved
    pub edge_ids: Vec<String>,
    #[serde(flatten)]
    pub extra: DataPatch,
}

impl EdgeData {
    pub fn apply_patch(&mut self, patch: DataPatch) {
        self.extra.extend(patch);
    }

    /// Every domain edge id collapsed into this rendered edge
    pub fn member_edge_ids(&self) -> impl Iterator<Item = &str> {
        self.edge_infos.iter().map(|info| info.edge_id.as_str())
    }
}

/// An edge in the element list.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RenderedEdge {
    pub data: EdgeData,
    pub classes: String,
    pub selected: bool,
}

impl RenderedEdge {
    pub fn id(&self) -> &str {
        &self.data.id
    }

    pub fn has_class(&self, class: &str) -> bool {
        self.classes.split_whitespace().any(|c| c == class)
    }
}

/// Full element list handed to the backend each render.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ElementList {
    pub nodes: Vec<RenderedNode>,
    pub edges: Vec<RenderedEdge>,
}

impl ElementList {
    pub fn node(&self, id: &str) -> Option<&RenderedNode> {
        self.nodes.iter().find(|n| n.id() == id)
    }

    pub fn edge(&self, id: &str) -> Option<&RenderedEdge> {
        self.edges.iter().find(|e| e.id() == id)
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty() && self.edges.is_empty()
    }
}
