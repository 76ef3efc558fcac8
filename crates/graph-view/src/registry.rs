//! Plugin registry
//!
//! Plugins are pure functions: transformers return a patch that is merged into
//! the element data, classifiers return class tokens. Lists keep registration
//! order and every fold runs in that order.
//!
//! The registry is shared as `Arc<PluginRegistry>`. Handing the view a new
//! `Arc` means "the plugins changed" and drops every memoized element.

use std::fmt;
use std::sync::Arc;

use graph_view_types::{
    ComponentExtension, DataPatch, DecorationAlignment, DecorationPadding, Edge, EdgeData,
    ElementIdSet, ElementList, NodeData, SelectionSet, Vertex,
};

use crate::decoration::DecorationResolution;
use crate::error::PluginError;

// =============================================================================
// PLUGIN FUNCTION TYPES
// =============================================================================

/// Adds fields to a vertex node's data
pub type NodeTransformer =
    Arc<dyn Fn(&Vertex, &NodeData) -> Result<DataPatch, PluginError> + Send + Sync>;

/// Adds class tokens to a vertex node
pub type NodeClassifier = Arc<dyn Fn(&Vertex) -> Result<Vec<String>, PluginError> + Send + Sync>;

/// Adds fields to a (compound) edge's data
pub type EdgeTransformer = Arc<dyn Fn(&EdgeData) -> Result<DataPatch, PluginError> + Send + Sync>;

/// Adds class tokens to a (compound) edge, given its resolved domain edges and label
pub type EdgeClassifier =
    Arc<dyn Fn(&[Arc<Edge>], &str) -> Result<Vec<String>, PluginError> + Send + Sync>;

/// Whether a decoration applies to a vertex
pub type DecorationPredicate = Arc<dyn Fn(&Vertex) -> bool + Send + Sync>;

/// Produces decoration data for a vertex, now or later
pub type DecorationProvider = Arc<dyn Fn(&Vertex) -> DecorationResolution + Send + Sync>;

/// Computes decoration classes for a vertex
pub type DecorationClassFn = Arc<dyn Fn(&Vertex) -> Vec<String> + Send + Sync>;

/// Reacts to pointer interaction with a rendered decoration
pub type DecorationHandler = Arc<dyn Fn(&DecorationEventContext<'_>) + Send + Sync>;

/// Computes ids to add to the selection from the rendered elements and current selection
pub type SelectionActionFn =
    Arc<dyn Fn(&ElementList, &SelectionSet) -> ElementIdSet + Send + Sync>;

// =============================================================================
// DECORATIONS
// =============================================================================

/// Where decoration data comes from.
#[derive(Clone)]
pub enum DecorationData {
    Static(DataPatch),
    Provider(DecorationProvider),
}

/// Classes a decoration adds besides `decoration`.
#[derive(Clone)]
pub enum DecorationClasses {
    None,
    /// Whitespace-separated tokens
    Static(String),
    Computed(DecorationClassFn),
}

/// Passed to decoration event handlers.
#[derive(Debug, Clone, Copy)]
pub struct DecorationEventContext<'a> {
    pub decoration_id: &'a str,
    pub vertex: &'a Vertex,
}

/// A plugin-supplied visual attached to vertices.
///
/// Decorations are identified by their `Arc`: the same `Arc<Decoration>` on
/// the same vertex always renders with the same element id.
#[derive(Clone)]
pub struct Decoration {
    pub applies_to: Option<DecorationPredicate>,
    pub data: DecorationData,
    pub classes: DecorationClasses,
    pub alignment: DecorationAlignment,
    pub padding: Option<DecorationPadding>,
    pub on_click: Option<DecorationHandler>,
    pub on_mouse_over: Option<DecorationHandler>,
    pub on_mouse_out: Option<DecorationHandler>,
}

impl fmt::Debug for Decoration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Decoration")
            .field("alignment", &self.alignment)
            .field("padding", &self.padding)
            .finish_non_exhaustive()
    }
}

impl Decoration {
    /// Decoration with static data, shown on every vertex at the top right
    pub fn new(data: DataPatch) -> Self {
        Self {
            applies_to: None,
            data: DecorationData::Static(data),
            classes: DecorationClasses::None,
            alignment: DecorationAlignment {
                h: "right".to_string(),
                v: "top".to_string(),
            },
            padding: None,
            on_click: None,
            on_mouse_over: None,
            on_mouse_out: None,
        }
    }

    /// Decoration whose data is produced per vertex
    pub fn with_provider(
        provider: impl Fn(&Vertex) -> DecorationResolution + Send + Sync + 'static,
    ) -> Self {
        Self {
            data: DecorationData::Provider(Arc::new(provider)),
            ..Self::new(DataPatch::new())
        }
    }

    pub fn applies_when(
        mut self,
        predicate: impl Fn(&Vertex) -> bool + Send + Sync + 'static,
    ) -> Self {
        self.applies_to = Some(Arc::new(predicate));
        self
    }

    pub fn with_classes(mut self, classes: impl Into<String>) -> Self {
        self.classes = DecorationClasses::Static(classes.into());
        self
    }

    pub fn with_class_fn(
        mut self,
        classes: impl Fn(&Vertex) -> Vec<String> + Send + Sync + 'static,
    ) -> Self {
        self.classes = DecorationClasses::Computed(Arc::new(classes));
        self
    }

    pub fn aligned(mut self, h: impl Into<String>, v: impl Into<String>) -> Self {
        self.alignment = DecorationAlignment {
            h: h.into(),
            v: v.into(),
        };
        self
    }

    pub fn with_padding(mut self, x: f64, y: f64) -> Self {
        self.padding = Some(DecorationPadding { x, y });
        self
    }

    pub fn on_click(
        mut self,
        handler: impl Fn(&DecorationEventContext<'_>) + Send + Sync + 'static,
    ) -> Self {
        self.on_click = Some(Arc::new(handler));
        self
    }

    pub fn on_mouse_over(
        mut self,
        handler: impl Fn(&DecorationEventContext<'_>) + Send + Sync + 'static,
    ) -> Self {
        self.on_mouse_over = Some(Arc::new(handler));
        self
    }

    pub fn on_mouse_out(
        mut self,
        handler: impl Fn(&DecorationEventContext<'_>) + Send + Sync + 'static,
    ) -> Self {
        self.on_mouse_out = Some(Arc::new(handler));
        self
    }

    pub fn applies(&self, vertex: &Vertex) -> bool {
        self.applies_to.as_ref().map_or(true, |p| p(vertex))
    }

    /// Class tokens for a decoration node on `vertex`, `decoration` first
    pub fn class_string(&self, vertex: &Vertex) -> String {
        let mut classes = vec!["decoration".to_string()];
        match &self.classes {
            DecorationClasses::None => {}
            DecorationClasses::Static(s) => {
                classes.extend(s.split_whitespace().map(str::to_string));
            }
            DecorationClasses::Computed(f) => classes.extend(f(vertex)),
        }
        classes.join(" ")
    }
}

// =============================================================================
// OTHER EXTENSIONS
// =============================================================================

/// Stylesheet fragment contributed by a plugin.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StyleExtension {
    pub identifier: String,
    pub stylesheet: String,
}

/// Named context-menu action that extends the selection.
#[derive(Clone)]
pub struct SelectionAction {
    pub identifier: String,
    pub label: String,
    pub select: SelectionActionFn,
}

impl fmt::Debug for SelectionAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SelectionAction")
            .field("identifier", &self.identifier)
            .field("label", &self.label)
            .finish_non_exhaustive()
    }
}

// =============================================================================
// REGISTRY
// =============================================================================

/// Ordered plugin lists consulted by the view.
#[derive(Clone, Default)]
pub struct PluginRegistry {
    pub node_transformers: Vec<NodeTransformer>,
    pub node_classifiers: Vec<NodeClassifier>,
    pub node_decorations: Vec<Arc<Decoration>>,
    pub edge_transformers: Vec<EdgeTransformer>,
    pub edge_classifiers: Vec<EdgeClassifier>,
    pub styles: Vec<StyleExtension>,
    /// Canvas option tools
    pub options: Vec<ComponentExtension>,
    pub selection_actions: Vec<SelectionAction>,
    pub export_actions: Vec<ComponentExtension>,
    pub extension_views: Vec<ComponentExtension>,
}

impl fmt::Debug for PluginRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PluginRegistry")
            .field("node_transformers", &self.node_transformers.len())
            .field("node_classifiers", &self.node_classifiers.len())
            .field("node_decorations", &self.node_decorations.len())
            .field("edge_transformers", &self.edge_transformers.len())
            .field("edge_classifiers", &self.edge_classifiers.len())
            .field("styles", &self.styles)
            .field("options", &self.options)
            .field("selection_actions", &self.selection_actions)
            .field("export_actions", &self.export_actions)
            .field("extension_views", &self.extension_views)
            .finish()
    }
}

impl PluginRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register_node_transformer(
        &mut self,
        f: impl Fn(&Vertex, &NodeData) -> Result<DataPatch, PluginError>
            + Send
            + Sync
            + 'static,
    ) -> &mut Self {
        self.node_transformers.push(Arc::new(f));
        self
    }

    pub fn register_node_classifier(
        &mut self,
        f: impl Fn(&Vertex) -> Result<Vec<String>, PluginError> + Send + Sync + 'static,
    ) -> &mut Self {
        self.node_classifiers.push(Arc::new(f));
        self
    }

    /// Register a decoration; returns the `Arc` that identifies it
    pub fn register_decoration(&mut self, decoration: Decoration) -> Arc<Decoration> {
        let decoration = Arc::new(decoration);
        self.node_decorations.push(Arc::clone(&decoration));
        decoration
    }

    pub fn register_edge_transformer(
        &mut self,
        f: impl Fn(&EdgeData) -> Result<DataPatch, PluginError> + Send + Sync + 'static,
    ) -> &mut Self {
        self.edge_transformers.push(Arc::new(f));
        self
    }

    pub fn register_edge_classifier(
        &mut self,
        f: impl Fn(&[Arc<Edge>], &str) -> Result<Vec<String>, PluginError> + Send + Sync + 'static,
    ) -> &mut Self {
        self.edge_classifiers.push(Arc::new(f));
        self
    }

    pub fn register_style(
        &mut self,
        identifier: impl Into<String>,
        stylesheet: impl Into<String>,
    ) -> &mut Self {
        self.styles.push(StyleExtension {
            identifier: identifier.into(),
            stylesheet: stylesheet.into(),
        });
        self
    }

    pub fn register_option(&mut self, option: ComponentExtension) -> &mut Self {
        self.options.push(option);
        self
    }

    pub fn register_selection_action(
        &mut self,
        identifier: impl Into<String>,
        label: impl Into<String>,
        select: impl Fn(&ElementList, &SelectionSet) -> ElementIdSet + Send + Sync + 'static,
    ) -> &mut Self {
        self.selection_actions.push(SelectionAction {
            identifier: identifier.into(),
            label: label.into(),
            select: Arc::new(select),
        });
        self
    }

    pub fn register_export_action(&mut self, export: ComponentExtension) -> &mut Self {
        self.export_actions.push(export);
        self
    }

    pub fn register_extension_view(&mut self, view: ComponentExtension) -> &mut Self {
        self.extension_views.push(view);
        self
    }

    pub fn selection_action(&self, identifier: &str) -> Option<&SelectionAction> {
        self.selection_actions
            .iter()
            .find(|a| a.identifier == identifier)
    }

    /// Exporter whose component lives at `component_path`
    pub fn export_action(&self, component_path: &str) -> Option<&ComponentExtension> {
        self.export_actions
            .iter()
            .find(|a| a.component_path == component_path)
    }

    /// Stylesheet fragments in registration order
    pub fn stylesheets(&self) -> Vec<String> {
        self.styles.iter().map(|s| s.stylesheet.clone()).collect()
    }
}
