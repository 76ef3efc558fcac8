//! Domain model as handed over by the external store.
//!
//! Vertices and edges are shared as `Arc`. The store replaces the `Arc` when an
//! element changes, so pointer identity doubles as content identity for the
//! engine's caches. A `None` value in the element maps is a tombstone: the
//! element was authoritatively deleted but membership may still refer to it.

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::sync::Arc;

use crate::geometry::{Point, Viewport};

// =============================================================================
// ELEMENTS
// =============================================================================

/// A graph vertex.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Vertex {
    pub id: String,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub concept_type: Option<String>,
    #[serde(default)]
    pub image_src: Option<String>,
    #[serde(default)]
    pub selected_image_src: Option<String>,
    #[serde(default)]
    pub properties: BTreeMap<String, serde_json::Value>,
}

impl Vertex {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            title: None,
            concept_type: None,
            image_src: None,
            selected_image_src: None,
            properties: BTreeMap::new(),
        }
    }

    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    pub fn with_concept_type(mut self, concept_type: impl Into<String>) -> Self {
        self.concept_type = Some(concept_type.into());
        self
    }

    pub fn with_property(mut self, name: impl Into<String>, value: serde_json::Value) -> Self {
        self.properties.insert(name.into(), value);
        self
    }

    /// Title shown on the canvas; falls back to the id when untitled
    pub fn display_title(&self) -> &str {
        self.title
            .as_deref()
            .filter(|t| !t.trim().is_empty())
            .unwrap_or(&self.id)
    }

    /// Image shown when the node is selected; falls back to the normal image
    pub fn display_selected_image(&self) -> Option<&str> {
        self.selected_image_src
            .as_deref()
            .or(self.image_src.as_deref())
    }
}

/// A directed, labeled graph edge.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Edge {
    pub id: String,
    pub out_vertex_id: String,
    pub in_vertex_id: String,
    pub label: String,
    #[serde(default)]
    pub properties: BTreeMap<String, serde_json::Value>,
}

impl Edge {
    pub fn new(
        id: impl Into<String>,
        out_vertex_id: impl Into<String>,
        in_vertex_id: impl Into<String>,
        label: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            out_vertex_id: out_vertex_id.into(),
            in_vertex_id: in_vertex_id.into(),
            label: label.into(),
            properties: BTreeMap::new(),
        }
    }
}

// =============================================================================
// MEMBERSHIP
// =============================================================================

/// A vertex that belongs to the displayed view, with its stored position (points).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VertexMembership {
    pub id: String,
    #[serde(default)]
    pub pos: Point,
}

impl VertexMembership {
    pub fn new(id: impl Into<String>, pos: Point) -> Self {
        Self { id: id.into(), pos }
    }
}

/// An edge that belongs to the displayed view.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct EdgeMembership {
    pub edge_id: String,
    pub out_vertex_id: String,
    pub in_vertex_id: String,
    pub label: String,
}

impl EdgeMembership {
    pub fn new(
        edge_id: impl Into<String>,
        out_vertex_id: impl Into<String>,
        in_vertex_id: impl Into<String>,
        label: impl Into<String>,
    ) -> Self {
        Self {
            edge_id: edge_id.into(),
            out_vertex_id: out_vertex_id.into(),
            in_vertex_id: in_vertex_id.into(),
            label: label.into(),
        }
    }

    /// Membership entry describing `edge`
    pub fn for_edge(edge: &Edge) -> Self {
        Self::new(
            edge.id.clone(),
            edge.out_vertex_id.clone(),
            edge.in_vertex_id.clone(),
            edge.label.clone(),
        )
    }

    /// Id of the rendered edge this entry collapses into.
    ///
    /// Both endpoint ids carry a byte-length prefix so that distinct
    /// `(out, in, label)` triples never share an id (`a`→`bc` vs `ab`→`c`).
    pub fn compound_id(&self) -> String {
        format!(
            "{}:{}{}:{}{}",
            self.out_vertex_id.len(),
            self.out_vertex_id,
            self.in_vertex_id.len(),
            self.in_vertex_id,
            self.label
        )
    }
}

/// Ordered membership lists of the displayed view (display-insertion order).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Membership {
    #[serde(default)]
    pub vertices: Vec<VertexMembership>,
    #[serde(default)]
    pub edges: Vec<EdgeMembership>,
}

// =============================================================================
// ID SETS
// =============================================================================

/// Which half of an [`ElementIdSet`] an id belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ElementType {
    Vertices,
    Edges,
}

/// Vertex and edge ids, kept sorted for deterministic output.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ElementIdSet {
    #[serde(default)]
    pub vertices: BTreeSet<String>,
    #[serde(default)]
    pub edges: BTreeSet<String>,
}

/// Externally confirmed selection
pub type SelectionSet = ElementIdSet;

/// Path-highlighted elements
pub type FocusSet = ElementIdSet;

impl ElementIdSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_vertices<I, S>(mut self, ids: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.vertices.extend(ids.into_iter().map(Into::into));
        self
    }

    pub fn with_edges<I, S>(mut self, ids: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.edges.extend(ids.into_iter().map(Into::into));
        self
    }

    pub fn ids(&self, element_type: ElementType) -> &BTreeSet<String> {
        match element_type {
            ElementType::Vertices => &self.vertices,
            ElementType::Edges => &self.edges,
        }
    }

    pub fn ids_mut(&mut self, element_type: ElementType) -> &mut BTreeSet<String> {
        match element_type {
            ElementType::Vertices => &mut self.vertices,
            ElementType::Edges => &mut self.edges,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.vertices.is_empty() && self.edges.is_empty()
    }

    pub fn clear(&mut self) {
        self.vertices.clear();
        self.edges.clear();
    }
}

// =============================================================================
// MODEL SNAPSHOT
// =============================================================================

/// Everything the domain store hands the view for one displayed model.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ModelSnapshot {
    pub model_id: String,
    #[serde(default)]
    pub editable: bool,
    #[serde(default)]
    pub vertices: HashMap<String, Option<Arc<Vertex>>>,
    #[serde(default)]
    pub edges: HashMap<String, Option<Arc<Edge>>>,
    #[serde(default)]
    pub membership: Membership,
    #[serde(default)]
    pub selection: SelectionSet,
    #[serde(default)]
    pub focusing: FocusSet,
    /// Ontology relationship display names keyed by edge label
    #[serde(default)]
    pub relationships: BTreeMap<String, String>,
    /// Model-level extended data (layout hints, plugin state, ...)
    #[serde(default)]
    pub extended_data: BTreeMap<String, serde_json::Value>,
    /// Viewport stored for this model, applied when the model is first shown
    #[serde(default)]
    pub viewport: Option<Viewport>,
    #[serde(default)]
    pub preview_md5: Option<String>,
}

impl ModelSnapshot {
    pub fn new(model_id: impl Into<String>) -> Self {
        Self {
            model_id: model_id.into(),
            ..Self::default()
        }
    }

    /// Add a vertex to the store and to the view at `pos`
    pub fn with_vertex(mut self, vertex: Vertex, pos: Point) -> Self {
        self.membership
            .vertices
            .push(VertexMembership::new(vertex.id.clone(), pos));
        self.vertices.insert(vertex.id.clone(), Some(Arc::new(vertex)));
        self
    }

    /// Add an edge to the store and to the view
    pub fn with_edge(mut self, edge: Edge) -> Self {
        self.membership.edges.push(EdgeMembership::for_edge(&edge));
        self.edges.insert(edge.id.clone(), Some(Arc::new(edge)));
        self
    }

    /// Stored vertex for `id`: `None` if unknown, `Some(None)` if tombstoned
    pub fn vertex(&self, id: &str) -> Option<Option<&Arc<Vertex>>> {
        self.vertices.get(id).map(Option::as_ref)
    }

    /// Stored edge for `id`: `None` if unknown, `Some(None)` if tombstoned
    pub fn edge(&self, id: &str) -> Option<Option<&Arc<Edge>>> {
        self.edges.get(id).map(Option::as_ref)
    }
}
