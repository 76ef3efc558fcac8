//! Domain model -> renderer element list
//!
//! Walks the membership lists in display order and produces nodes (real,
//! partial, ghost, decoration parent, decoration) and compound edges. Every
//! per-element computation that depends only on a domain record goes through
//! the memo cache, so an unchanged `Arc` costs a hash lookup.
//!
//! # Node order per membership entry
//! 1. ghost (`<id>-ANIMATING`) when the vertex is being relocated
//! 2. decoration parent (`decP<id>`) when any decoration applies
//! 3. the vertex node itself
//! 4. decoration children with resolved data

use std::collections::{BTreeMap, HashMap, HashSet};
use std::sync::Arc;

use graph_view_types::{
    AnimateTo, DataPatch, Edge, EdgeData, EdgeMembership, ElementList, ModelSnapshot, NodeData,
    Point, RenderedEdge, RenderedNode, Vertex,
};
use viewport::retina::points_to_pixels;

use crate::decoration::DecorationStore;
use crate::decoration_ids::{decoration_parent_id, DecorationIds};
use crate::error::ProjectionError;
use crate::format::{pretty_number, truncate_words};
use crate::memo::{MemoCache, MemoInput, MemoStats};
use crate::registry::{Decoration, PluginRegistry};

// =============================================================================
// MEMO KEYS
// =============================================================================

pub const NODE_DATA: &str = "node.data";
pub const NODE_CLASS: &str = "node.class";
pub const DECORATION_APPLY: &str = "decoration.apply";
pub const EDGE_DATA: &str = "edge.data";
pub const EDGE_CLASS: &str = "edge.class";

/// Suffix of a ghost node's id
pub const GHOST_SUFFIX: &str = "-ANIMATING";

/// Decoration data keys the engine owns
const RESERVED_DECORATION_KEYS: [&str; 5] = ["id", "parent", "alignment", "padding", "vertex_id"];

// =============================================================================
// CONTEXT
// =============================================================================

/// Caches and id arenas that outlive a single projection pass.
#[derive(Debug)]
pub struct ProjectionContext {
    memo: MemoCache,
    decoration_ids: DecorationIds,
    decorations: DecorationStore,
    title_truncate_words: usize,
    pixel_ratio: f64,
}

impl ProjectionContext {
    pub fn new(title_truncate_words: usize, pixel_ratio: f64) -> Self {
        Self {
            memo: MemoCache::new(),
            decoration_ids: DecorationIds::new(),
            decorations: DecorationStore::new(),
            title_truncate_words,
            pixel_ratio,
        }
    }

    pub fn pixel_ratio(&self) -> f64 {
        self.pixel_ratio
    }

    /// Drop memoized elements; all of them when `prefixes` is empty
    pub fn clear_memo(&mut self, prefixes: &[&str]) {
        self.memo.clear(prefixes);
    }

    /// Plugins changed: nothing memoized or resolved is valid anymore
    pub fn reset_plugins(&mut self) {
        self.memo.clear(&[]);
        self.decorations.clear();
    }

    pub fn memo_len(&self) -> usize {
        self.memo.len()
    }

    pub fn memo_stats(&self) -> MemoStats {
        self.memo.stats()
    }

    /// Poll pending decoration data; true when a render is due
    pub fn poll_decorations(&mut self) -> bool {
        self.decorations.poll()
    }

    pub fn pending_decorations(&self) -> usize {
        self.decorations.pending_count()
    }

    /// Decoration and vertex id behind a decoration element id
    pub fn decoration_for(&self, element_id: &str) -> Option<(Arc<Decoration>, &str)> {
        self.decoration_ids.decoration_for(element_id)
    }
}

/// Per-render UI inputs.
#[derive(Debug, Clone, Copy)]
pub struct ViewState<'a> {
    /// Vertex whose full title is shown
    pub hovering: Option<&'a str>,
    /// Vertex id -> ghost start position (points)
    pub ghosts: &'a BTreeMap<String, Point>,
}

// =============================================================================
// PROJECTION
// =============================================================================

/// Build the element list for `snapshot`.
///
/// Plugin failures abort the pass; decoration data that is not ready yet is
/// left out and shows up on a later render.
pub fn project(
    snapshot: &ModelSnapshot,
    registry: &PluginRegistry,
    ui: &ViewState<'_>,
    ctx: &mut ProjectionContext,
) -> Result<ElementList, ProjectionError> {
    let mut nodes = Vec::with_capacity(snapshot.membership.vertices.len());
    let mut node_ids: HashSet<&str> = HashSet::new();
    let mut live_vertices: HashSet<&str> = HashSet::new();

    for entry in &snapshot.membership.vertices {
        let id = entry.id.as_str();
        let vertex = match snapshot.vertex(id) {
            Some(None) => continue,
            Some(Some(vertex)) => Some(vertex),
            None => None,
        };

        let focused = snapshot.focusing.vertices.contains(id);
        let mut node = RenderedNode {
            data: NodeData::bare(id),
            classes: String::new(),
            position: Some(points_to_pixels(entry.pos, ctx.pixel_ratio)),
            selected: snapshot.selection.vertices.contains(id),
            selectable: true,
            grabbable: snapshot.editable,
        };

        let Some(vertex) = vertex else {
            node.classes = with_focus("partial".to_string(), focused);
            push_ghost(&mut nodes, &node, ui, ctx.pixel_ratio);
            nodes.push(node);
            node_ids.insert(id);
            continue;
        };

        node.data = vertex_data(ctx, registry, vertex)?;
        if ui.hovering == Some(id) {
            node.data.truncated_title = Some(vertex.display_title().to_string());
        }
        node.classes = with_focus(vertex_classes(ctx, registry, vertex)?, focused);
        push_ghost(&mut nodes, &node, ui, ctx.pixel_ratio);

        let applicable: Vec<Arc<Decoration>> =
            ctx.memo.get(DECORATION_APPLY, vertex, |v: &Arc<Vertex>| {
                Ok::<_, ProjectionError>(
                    registry
                        .node_decorations
                        .iter()
                        .filter(|d| d.applies(v))
                        .cloned()
                        .collect(),
                )
            })?;

        if applicable.is_empty() {
            nodes.push(node);
        } else {
            let parent_id = decoration_parent_id(id);
            node.data.parent = Some(parent_id.clone());
            nodes.push(RenderedNode {
                data: NodeData::bare(parent_id.clone()),
                classes: "decorationParent".to_string(),
                position: None,
                selected: false,
                selectable: false,
                grabbable: false,
            });
            nodes.push(node);
            for decoration in &applicable {
                if let Some(child) = decoration_node(ctx, decoration, vertex, &parent_id) {
                    nodes.push(child);
                }
            }
        }
        node_ids.insert(id);
        live_vertices.insert(id);
    }

    ctx.decorations.retain_vertices(|id| live_vertices.contains(id));

    let edges = project_edges(snapshot, registry, &node_ids, ctx)?;
    Ok(ElementList { nodes, edges })
}

fn with_focus(mut classes: String, focused: bool) -> String {
    if focused {
        classes.push_str(" focus");
    }
    classes
}

fn push_ghost(
    nodes: &mut Vec<RenderedNode>,
    node: &RenderedNode,
    ui: &ViewState<'_>,
    pixel_ratio: f64,
) {
    let Some(from) = ui.ghosts.get(node.id()) else {
        return;
    };
    let Some(target) = node.position else {
        return;
    };
    let mut data = node.data.clone();
    data.id = format!("{}{GHOST_SUFFIX}", node.id());
    data.parent = None;
    data.animate_to = Some(AnimateTo {
        id: node.id().to_string(),
        pos: target,
    });
    nodes.push(RenderedNode {
        data,
        classes: node.classes.clone(),
        position: Some(points_to_pixels(*from, pixel_ratio)),
        selected: node.selected,
        selectable: false,
        grabbable: false,
    });
}

fn vertex_data(
    ctx: &mut ProjectionContext,
    registry: &PluginRegistry,
    vertex: &Arc<Vertex>,
) -> Result<NodeData, ProjectionError> {
    let words = ctx.title_truncate_words;
    ctx.memo.get(NODE_DATA, vertex, |v: &Arc<Vertex>| {
        let (truncated_title, is_truncated) = truncate_words(v.display_title(), words);
        let mut data = NodeData {
            id: v.id.clone(),
            is_truncated: Some(is_truncated),
            truncated_title: Some(truncated_title),
            concept_type: v.concept_type.clone(),
            image_src: v.image_src.clone(),
            selected_image_src: v.display_selected_image().map(str::to_string),
            ..NodeData::default()
        };
        for transform in &registry.node_transformers {
            let patch = transform(v, &data).map_err(|e| ProjectionError::plugin(&v.id, e))?;
            data.apply_patch(patch);
        }
        Ok(data)
    })
}

fn vertex_classes(
    ctx: &mut ProjectionContext,
    registry: &PluginRegistry,
    vertex: &Arc<Vertex>,
) -> Result<String, ProjectionError> {
    ctx.memo.get(NODE_CLASS, vertex, |v: &Arc<Vertex>| {
        let mut classes = Vec::new();
        for classify in &registry.node_classifiers {
            classes.extend(classify(v).map_err(|e| ProjectionError::plugin(&v.id, e))?);
        }
        classes.push("v".to_string());
        Ok(classes.join(" "))
    })
}

fn decoration_node(
    ctx: &mut ProjectionContext,
    decoration: &Arc<Decoration>,
    vertex: &Arc<Vertex>,
    parent_id: &str,
) -> Option<RenderedNode> {
    let id = ctx.decoration_ids.id_for(decoration, &vertex.id);
    let mut extra = ctx.decorations.resolve(&id, decoration, vertex)?;
    for key in RESERVED_DECORATION_KEYS {
        extra.remove(key);
    }
    Some(RenderedNode {
        data: NodeData {
            id,
            parent: Some(parent_id.to_string()),
            alignment: Some(decoration.alignment.clone()),
            padding: decoration.padding,
            vertex_id: Some(vertex.id.clone()),
            extra,
            ..NodeData::default()
        },
        classes: decoration.class_string(vertex),
        position: Some(Point::new(-1.0, -1.0)),
        selected: false,
        selectable: false,
        grabbable: false,
    })
}

// =============================================================================
// EDGES
// =============================================================================

/// Memo input of a compound edge: its membership entries and resolved edges.
#[derive(Debug, Clone)]
struct EdgeGroupInput {
    infos: Vec<EdgeMembership>,
    edges: Vec<Arc<Edge>>,
}

impl MemoInput for EdgeGroupInput {
    fn memo_id(&self) -> Option<String> {
        None
    }

    fn is_same(&self, other: &Self) -> bool {
        self.infos == other.infos && self.edges.is_same(&other.edges)
    }
}

fn project_edges(
    snapshot: &ModelSnapshot,
    registry: &PluginRegistry,
    node_ids: &HashSet<&str>,
    ctx: &mut ProjectionContext,
) -> Result<Vec<RenderedEdge>, ProjectionError> {
    let mut groups: Vec<Vec<EdgeMembership>> = Vec::new();
    let mut group_index: HashMap<String, usize> = HashMap::new();

    for info in &snapshot.membership.edges {
        let tombstoned = matches!(snapshot.edge(&info.edge_id), Some(None));
        let endpoints = node_ids.contains(info.out_vertex_id.as_str())
            && node_ids.contains(info.in_vertex_id.as_str());
        if tombstoned || !endpoints {
            continue;
        }
        let key = info.compound_id();
        match group_index.get(&key) {
            Some(idx) => groups[*idx].push(info.clone()),
            None => {
                group_index.insert(key, groups.len());
                groups.push(vec![info.clone()]);
            }
        }
    }

    let mut rendered = Vec::with_capacity(groups.len());
    for infos in groups {
        let edges: Vec<Arc<Edge>> = infos
            .iter()
            .filter_map(|info| snapshot.edge(&info.edge_id).flatten().cloned())
            .collect();
        let compound_id = infos[0].compound_id();
        let label = infos[0].label.clone();

        let focused = infos
            .iter()
            .any(|info| snapshot.focusing.edges.contains(&info.edge_id));
        let selected = infos
            .iter()
            .any(|info| snapshot.selection.edges.contains(&info.edge_id));

        let classes = if edges.is_empty() {
            "partial".to_string()
        } else {
            ctx.memo.get_with(
                EDGE_CLASS,
                &edges,
                |edges| {
                    let mut ids: Vec<&str> = edges.iter().map(|e| e.id.as_str()).collect();
                    ids.sort_unstable();
                    ids.join(",")
                },
                |edges| {
                    let mut classes = Vec::new();
                    for classify in &registry.edge_classifiers {
                        classes.extend(
                            classify(edges.as_slice(), label.as_str())
                                .map_err(|e| ProjectionError::plugin(&compound_id, e))?,
                        );
                    }
                    classes.push("e".to_string());
                    Ok::<_, ProjectionError>(classes.join(" "))
                },
            )?
        };

        let input = EdgeGroupInput { infos, edges };
        let data = ctx.memo.get_with(
            EDGE_DATA,
            &input,
            |_| compound_id.clone(),
            |input| edge_data(&compound_id, input, &snapshot.relationships, registry),
        )?;

        rendered.push(RenderedEdge {
            data,
            classes: with_focus(classes, focused),
            selected,
        });
    }
    Ok(rendered)
}

fn edge_data(
    compound_id: &str,
    input: &EdgeGroupInput,
    relationships: &BTreeMap<String, String>,
    registry: &PluginRegistry,
) -> Result<EdgeData, ProjectionError> {
    let first = &input.infos[0];
    let mut label = relationships
        .get(&first.label)
        .cloned()
        .unwrap_or_else(|| first.label.clone());
    if input.infos.len() > 1 {
        label.push_str(&format!(" ({})", pretty_number(input.infos.len())));
    }

    let mut data = EdgeData {
        id: compound_id.to_string(),
        source: first.out_vertex_id.clone(),
        target: first.in_vertex_id.clone(),
        edge_type: first.label.clone(),
        label,
        edge_infos: input.infos.clone(),
        edge_ids: input.edges.iter().map(|e| e.id.clone()).collect(),
        extra: DataPatch::new(),
    };

    if !input.edges.is_empty() {
        for transform in &registry.edge_transformers {
            let patch = transform(&data).map_err(|e| ProjectionError::plugin(compound_id, e))?;
            data.apply_patch(patch);
        }
    }
    Ok(data)
}
