//! GraphView - the controller between store, engine and canvas
//!
//! # Inputs
//! - `update_model`: a new snapshot from the domain store
//! - `handle_event`: raw backend events
//! - app requests (`focus_paths`, `preview_vertices`, `select_all`, `menu_select`, ...)
//! - `tick`: the caller's clock, driving debounce, hover and decoration polling
//!
//! # Outputs
//! Every input returns the [`ViewOutput`]s it produced. `Rerender` means the
//! frame changed and `render()` should be called again.

use std::collections::{BTreeMap, BTreeSet};
use std::sync::Arc;

use graph_view::element_index::ElementRole;
use graph_view::projector::{EDGE_DATA, NODE_DATA};
use graph_view::{
    project, DecorationEventContext, DrawRelease, ElementIndex, EngineConfig, GhostTracker,
    InteractionController, MemoStats, PluginRegistry, ProjectionContext, ReleaseTarget,
    SelectionCoalescer, SelectionIntent, SelectionTarget, ViewState,
};
use graph_view_types::{
    BackendEvent, DecorationEventKind, ElementIdSet, ElementList, ElementRef, ModelSnapshot,
    PathFocus, Point, PointerInfo, RenderFrame, ViewOutput, Viewport,
};
use viewport::retina::{page_to_model, pixels_to_points};
use viewport::ViewportTracker;

use crate::error::ViewError;

/// Extended-data keys that describe membership rather than model settings
const MEMBERSHIP_EXTENDED_KEYS: [&str; 3] = ["vertices", "edges", "unauthorizedEdgeIds"];

pub struct GraphView {
    config: EngineConfig,
    registry: Arc<PluginRegistry>,
    snapshot: Option<ModelSnapshot>,
    ctx: ProjectionContext,
    selection: SelectionCoalescer,
    interaction: InteractionController,
    ghosts: GhostTracker,
    viewports: ViewportTracker,
    index: ElementIndex,
    elements: ElementList,
    /// Moved nodes not yet reported (pixels)
    moved: BTreeMap<String, Point>,
}

impl GraphView {
    pub fn new(config: EngineConfig, registry: Arc<PluginRegistry>) -> Result<Self, ViewError> {
        config.validate()?;
        let bounds = config.zoom_bounds()?;
        Ok(Self {
            ctx: ProjectionContext::new(config.title_truncate_words, config.pixel_ratio),
            selection: SelectionCoalescer::new(config.selection_debounce_ms),
            interaction: InteractionController::new(
                config.max_focus_paths,
                config.hover_expand_ms,
                config.max_preview_popovers,
            ),
            ghosts: GhostTracker::new(),
            viewports: ViewportTracker::new(bounds),
            index: ElementIndex::default(),
            elements: ElementList::default(),
            moved: BTreeMap::new(),
            snapshot: None,
            registry,
            config,
        })
    }

    // =========================================================================
    // MODEL RECONCILIATION
    // =========================================================================

    /// Take a new snapshot from the store
    pub fn update_model(
        &mut self,
        snapshot: ModelSnapshot,
        registry: Arc<PluginRegistry>,
    ) -> Vec<ViewOutput> {
        let mut outputs = Vec::new();

        if !Arc::ptr_eq(&self.registry, &registry) {
            tracing::debug!("plugin registry replaced, clearing element caches");
            self.ctx.reset_plugins();
            self.registry = registry;
        }

        match self.snapshot.as_ref() {
            Some(prev) if prev.model_id != snapshot.model_id => {
                tracing::debug!(from = %prev.model_id, to = %snapshot.model_id, "model switched");
                outputs.extend(self.interaction.reset_for_model_switch());
                if let Some(viewport) = self.viewports.take_for_save(&prev.model_id) {
                    outputs.push(ViewOutput::UpdateViewport {
                        model_id: prev.model_id.clone(),
                        viewport,
                    });
                }
                self.ghosts.reset();
                self.moved.clear();
                self.viewports.show_model(snapshot.viewport);
                self.selection.reset(Some(&snapshot.selection));
            }
            Some(prev) => {
                if prev.selection != snapshot.selection {
                    self.selection.reset(Some(&snapshot.selection));
                }
                if prev.relationships != snapshot.relationships {
                    self.ctx.clear_memo(&[NODE_DATA, EDGE_DATA]);
                }
                if model_settings(prev) != model_settings(&snapshot) {
                    self.ctx.clear_memo(&[NODE_DATA]);
                }
            }
            None => {
                tracing::debug!(model_id = %snapshot.model_id, "first model displayed");
                self.viewports.show_model(snapshot.viewport);
                self.selection.reset(Some(&snapshot.selection));
            }
        }

        self.ghosts.observe_membership(&snapshot.membership.vertices);
        self.snapshot = Some(snapshot);
        outputs
    }

    /// Project the current snapshot into a frame for the backend
    pub fn render(&mut self) -> Result<RenderFrame, ViewError> {
        let snapshot = self.snapshot.as_ref().ok_or(ViewError::NoModel)?;
        let ui = ViewState {
            hovering: self.interaction.hovering(),
            ghosts: self.ghosts.ghosts(),
        };
        let elements = project(snapshot, &self.registry, &ui, &mut self.ctx)?;

        let display = self.viewports.display();
        let frame = RenderFrame {
            model_id: snapshot.model_id.clone(),
            elements: elements.clone(),
            draw_edge_to_mouse_from: self.interaction.draw_state().draw_edge(),
            draw_paths: self.interaction.paths().cloned(),
            viewport: display.viewport,
            initial_display: display.initial_display,
            has_preview: snapshot.preview_md5.is_some(),
            editable: snapshot.editable,
            tools: self.registry.options.clone(),
            extension_views: self.registry.extension_views.clone(),
            style_extensions: self.registry.stylesheets(),
        };

        self.index = ElementIndex::from_elements(&elements);
        self.elements = elements;
        self.viewports.keep_model();
        Ok(frame)
    }

    // =========================================================================
    // BACKEND EVENTS
    // =========================================================================

    pub fn handle_event(&mut self, event: BackendEvent, now: u64) -> Vec<ViewOutput> {
        let mut outputs = Vec::new();
        match event {
            BackendEvent::Select { target } => {
                if let Some(target) = self.selection_target(&target) {
                    self.selection.apply(SelectionIntent::Add(target), now);
                }
            }
            BackendEvent::Unselect { target } | BackendEvent::Remove { target } => {
                if let Some(target) = self.selection_target(&target) {
                    self.selection.apply(SelectionIntent::Remove(target), now);
                }
            }
            BackendEvent::Position { target, position } => {
                if self.role(&target).is_some_and(ElementRole::is_positionable) {
                    self.moved.insert(target.id, position);
                }
            }
            BackendEvent::Free | BackendEvent::LayoutStop => {
                outputs.extend(self.flush_positions());
            }
            BackendEvent::TapStart { target, pointer } => {
                if let Some(target) = target.filter(|t| self.is_vertex_node(t)) {
                    outputs.extend(self.interaction.press_node(&target.id, pointer.ctrl));
                }
            }
            BackendEvent::Tap { target, pointer } => {
                outputs.extend(self.tap(target.as_ref(), &pointer, now));
            }
            BackendEvent::ContextTap { target, pointer } => {
                outputs.extend(self.context_menu(target.as_ref(), &pointer));
            }
            BackendEvent::ContextTapEnd { target, pointer } => {
                if target.is_some() && pointer.ctrl {
                    outputs.extend(self.tap(target.as_ref(), &pointer, now));
                }
            }
            BackendEvent::TapHold { target } => {
                if let Some(target) = target.filter(|t| self.is_vertex_node(t)) {
                    outputs.extend(self.interaction.preview(&[target.id]));
                }
            }
            BackendEvent::PointerOver { target } => match target {
                Some(t) if matches!(self.role(&t), Some(ElementRole::Vertex { .. })) => {
                    self.interaction.pointer_over(&t.id, now);
                }
                _ => {
                    self.interaction.pointer_out(false);
                }
            },
            BackendEvent::PointerOut { target } => {
                let left_vertex = target
                    .as_ref()
                    .is_some_and(|t| matches!(self.role(t), Some(ElementRole::Vertex { .. })));
                if self.interaction.pointer_out(left_vertex) {
                    outputs.push(ViewOutput::Rerender);
                }
            }
            BackendEvent::Pan { viewport } | BackendEvent::Zoom { viewport } => {
                self.record_viewport(viewport);
            }
            BackendEvent::Decoration {
                kind,
                decoration_id,
            } => self.dispatch_decoration_event(kind, &decoration_id),
            BackendEvent::GhostFinished { vertex_id } => {
                if self.ghosts.finish(&vertex_id) {
                    outputs.push(ViewOutput::Rerender);
                }
            }
            BackendEvent::PreviewRendered { image_data } => {
                if let Some(model_id) = self.model_id() {
                    outputs.push(ViewOutput::UpdatePreview {
                        model_id: model_id.to_string(),
                        image_data,
                    });
                }
            }
        }
        outputs
    }

    /// Advance timers to `now` and poll pending decoration data
    pub fn tick(&mut self, now: u64) -> Vec<ViewOutput> {
        let mut outputs = Vec::new();
        if let Some(settled) = self.selection.poll(now) {
            outputs.push(settled);
        }

        let index = &self.index;
        let hover_changed = self
            .interaction
            .poll_hover(now, |id| index.is_truncated(id));
        let decorations_ready = self.ctx.poll_decorations();
        if hover_changed || decorations_ready {
            outputs.push(ViewOutput::Rerender);
        }
        outputs
    }

    /// Tear down previews and hand back the viewport for persistence
    pub fn shutdown(&mut self) -> Vec<ViewOutput> {
        let mut outputs = self.interaction.teardown_previews();
        if let Some(model_id) = self.model_id().map(str::to_string) {
            if let Some(viewport) = self.viewports.take_for_save(&model_id) {
                outputs.push(ViewOutput::UpdateViewport { model_id, viewport });
            }
        }
        outputs
    }

    // =========================================================================
    // APP REQUESTS
    // =========================================================================

    pub fn focus_paths(&mut self, paths: PathFocus) -> Vec<ViewOutput> {
        let mut outputs = self.interaction.focus_paths(paths);
        outputs.push(ViewOutput::Rerender);
        outputs
    }

    pub fn defocus_paths(&mut self) -> Vec<ViewOutput> {
        if self.interaction.defocus_paths() {
            vec![ViewOutput::Rerender]
        } else {
            Vec::new()
        }
    }

    /// Add every vertex of the focused paths to the view
    pub fn focus_paths_add(&self) -> Vec<ViewOutput> {
        self.interaction.focus_paths_add().into_iter().collect()
    }

    pub fn start_vertex_connection(
        &mut self,
        vertex_id: &str,
        connection_type: Option<String>,
    ) -> Vec<ViewOutput> {
        let mut outputs = self
            .interaction
            .start_connection(vertex_id, connection_type);
        outputs.push(ViewOutput::Rerender);
        outputs
    }

    /// The connection popover closed, with or without creating an edge
    pub fn finish_vertex_connection(&mut self) -> Vec<ViewOutput> {
        let mut outputs = self.interaction.cancel_draw();
        outputs.push(ViewOutput::Rerender);
        outputs
    }

    pub fn preview_vertices(&mut self, vertex_ids: &[String]) -> Vec<ViewOutput> {
        self.interaction.preview(vertex_ids)
    }

    pub fn close_preview(&mut self, vertex_id: &str) -> Vec<ViewOutput> {
        self.interaction.close_preview(vertex_id).into_iter().collect()
    }

    /// Files dropped at `page` onto a canvas whose top-left is at `container_origin`
    pub fn import_dropped(
        &self,
        vertex_ids: Vec<String>,
        page: Point,
        container_origin: Point,
    ) -> Vec<ViewOutput> {
        let viewport = self.current_viewport();
        let canvas_pos = page_to_model(page, container_origin, &viewport, self.config.pixel_ratio);
        vec![ViewOutput::DropElements {
            vertex_ids,
            edge_ids: Vec::new(),
            canvas_pos: Some(canvas_pos),
        }]
    }

    pub fn elements_pasted(&self, ids: ElementIdSet) -> Vec<ViewOutput> {
        vec![ViewOutput::DropElements {
            vertex_ids: ids.vertices.into_iter().collect(),
            edge_ids: ids.edges.into_iter().collect(),
            canvas_pos: None,
        }]
    }

    pub fn elements_cut(&self, vertex_ids: Vec<String>) -> Vec<ViewOutput> {
        vec![ViewOutput::RemoveElements {
            vertex_ids,
            edge_ids: Vec::new(),
        }]
    }

    /// Run the registered selection action `identifier` against the rendered elements
    pub fn menu_select(&mut self, identifier: &str, now: u64) -> Vec<ViewOutput> {
        let Some(action) = self.registry.selection_action(identifier) else {
            tracing::warn!(identifier, "unknown selection action");
            return Vec::new();
        };
        let current = self
            .snapshot
            .as_ref()
            .map(|s| s.selection.clone())
            .unwrap_or_default();
        let ids = (action.select)(&self.elements, &current);
        if !ids.is_empty() {
            self.selection.add_all(&ids, now);
        }
        Vec::new()
    }

    /// Select every selectable element of the last rendered frame
    pub fn select_all(&mut self, now: u64) {
        let targets: Vec<SelectionTarget> = self
            .elements
            .nodes
            .iter()
            .map(|n| ElementRef::node(n.id()))
            .chain(self.elements.edges.iter().map(|e| ElementRef::edge(e.id())))
            .filter_map(|element| self.selection_target(&element))
            .collect();
        for target in targets {
            self.selection.apply(SelectionIntent::Add(target), now);
        }
    }

    /// Move the selection onto its neighbourhood.
    ///
    /// Vertices adjacent to a selected vertex and both endpoints of a selected
    /// edge become selected; the originally selected elements are released,
    /// even when they are also a neighbour of another selected element.
    pub fn select_connected(&mut self, now: u64) {
        let selected_nodes: BTreeSet<&str> = self
            .elements
            .nodes
            .iter()
            .filter(|n| n.selected)
            .map(|n| n.id())
            .collect();

        let mut neighbours = BTreeSet::new();
        for edge in &self.elements.edges {
            let (source, target) = (edge.data.source.as_str(), edge.data.target.as_str());
            if edge.selected {
                neighbours.extend([source, target]);
            }
            if selected_nodes.contains(source) {
                neighbours.insert(target);
            }
            if selected_nodes.contains(target) {
                neighbours.insert(source);
            }
        }

        let add: Vec<SelectionTarget> = neighbours
            .into_iter()
            .filter_map(|id| self.selection_target(&ElementRef::node(id)))
            .collect();
        let remove: Vec<SelectionTarget> = selected_nodes
            .iter()
            .map(|id| ElementRef::node(*id))
            .chain(
                self.elements
                    .edges
                    .iter()
                    .filter(|e| e.selected)
                    .map(|e| ElementRef::edge(e.id())),
            )
            .filter_map(|element| self.selection_target(&element))
            .collect();
        if add.is_empty() && remove.is_empty() {
            return;
        }

        for target in add {
            self.selection.apply(SelectionIntent::Add(target), now);
        }
        for target in remove {
            self.selection.apply(SelectionIntent::Remove(target), now);
        }
    }

    /// Forward vertices chosen in the add-related dialog to the store
    pub fn add_related(&self, vertex_ids: Vec<String>) -> Vec<ViewOutput> {
        match self.model_id() {
            Some(model_id) if !vertex_ids.is_empty() => vec![ViewOutput::AddRelated {
                model_id: model_id.to_string(),
                vertex_ids,
            }],
            _ => Vec::new(),
        }
    }

    pub fn menu_export(&self, component_path: &str) -> Vec<ViewOutput> {
        let (Some(model_id), Some(export)) =
            (self.model_id(), self.registry.export_action(component_path))
        else {
            return Vec::new();
        };
        vec![ViewOutput::OpenExport {
            identifier: export.identifier.clone(),
            component_path: export.component_path.clone(),
            model_id: model_id.to_string(),
        }]
    }

    // =========================================================================
    // ACCESSORS
    // =========================================================================

    pub fn model_id(&self) -> Option<&str> {
        self.snapshot.as_ref().map(|s| s.model_id.as_str())
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Elements of the last rendered frame
    pub fn elements(&self) -> &ElementList {
        &self.elements
    }

    pub fn interaction(&self) -> &InteractionController {
        &self.interaction
    }

    pub fn selection(&self) -> &SelectionCoalescer {
        &self.selection
    }

    pub fn ghosts(&self) -> &GhostTracker {
        &self.ghosts
    }

    pub fn memo_stats(&self) -> MemoStats {
        self.ctx.memo_stats()
    }

    // =========================================================================
    // INTERNALS
    // =========================================================================

    fn role(&self, target: &ElementRef) -> Option<&ElementRole> {
        self.index.role(&target.id)
    }

    fn is_vertex_node(&self, target: &ElementRef) -> bool {
        target.is_node() && self.role(target).is_some_and(ElementRole::is_positionable)
    }

    /// Domain-level selection target; ghosts and decorations never select
    fn selection_target(&self, target: &ElementRef) -> Option<SelectionTarget> {
        match self.role(target).filter(|role| role.is_selectable())? {
            ElementRole::Edge { edge_ids } => Some(SelectionTarget::CompoundEdge(edge_ids.clone())),
            _ => Some(SelectionTarget::Vertex(target.id.clone())),
        }
    }

    fn tap(
        &mut self,
        target: Option<&ElementRef>,
        pointer: &PointerInfo,
        now: u64,
    ) -> Vec<ViewOutput> {
        let mut outputs = Vec::new();

        if target.is_none() && self.interaction.paths().is_some() {
            let selection_empty = self
                .snapshot
                .as_ref()
                .map_or(true, |s| s.selection.is_empty());
            if self.interaction.tap_canvas(selection_empty) {
                outputs.push(ViewOutput::Rerender);
            }
        }

        let release_target = match target.and_then(|t| self.role(t).map(|role| (t, role))) {
            Some((t, ElementRole::Vertex { .. } | ElementRole::Partial)) => {
                ReleaseTarget::Node(&t.id)
            }
            Some((t, ElementRole::Edge { .. })) => ReleaseTarget::Edge(&t.id),
            _ => ReleaseTarget::Canvas,
        };
        let (release, released) = self.interaction.release(release_target, pointer.ctrl);
        outputs.extend(released);

        match release {
            DrawRelease::Targeted => outputs.push(ViewOutput::Rerender),
            DrawRelease::Cancelled { ctrl_on_element } => {
                outputs.push(ViewOutput::Rerender);
                if ctrl_on_element {
                    outputs.extend(self.context_menu(target, pointer));
                }
            }
            DrawRelease::NotDrawing => {
                if pointer.ctrl {
                    outputs.extend(self.context_menu(target, pointer));
                } else if !pointer.shift && target.is_none() {
                    self.selection.apply(SelectionIntent::Clear, now);
                    outputs.push(ViewOutput::ClearSelection);
                }
            }
        }
        outputs
    }

    fn context_menu(
        &self,
        target: Option<&ElementRef>,
        pointer: &PointerInfo,
    ) -> Option<ViewOutput> {
        let target = target?;
        match self.role(target)? {
            ElementRole::Vertex { .. } | ElementRole::Partial => {
                Some(ViewOutput::RequestVertexMenu {
                    origin: pointer.origin.clone(),
                    vertex_id: target.id.clone(),
                    screen_pos: pointer.page,
                })
            }
            ElementRole::Edge { edge_ids } => Some(ViewOutput::RequestEdgeMenu {
                origin: pointer.origin.clone(),
                edge_ids: edge_ids.clone(),
                screen_pos: pointer.page,
            }),
            _ => None,
        }
    }

    fn flush_positions(&mut self) -> Option<ViewOutput> {
        if self.moved.is_empty() {
            return None;
        }
        let model_id = self.model_id()?.to_string();
        let ratio = self.config.pixel_ratio;
        let positions: BTreeMap<String, Point> = std::mem::take(&mut self.moved)
            .into_iter()
            .map(|(id, pixels)| (id, pixels_to_points(pixels, ratio)))
            .collect();
        self.ghosts.record_reported(&positions);
        Some(ViewOutput::UpdatePositions {
            model_id,
            positions,
        })
    }

    fn record_viewport(&mut self, viewport: Viewport) {
        let Some(model_id) = self.model_id().map(str::to_string) else {
            return;
        };
        if let Err(err) = self.viewports.record(&model_id, viewport) {
            tracing::warn!(code = err.code(), error = %err, "ignoring viewport change");
        }
    }

    fn current_viewport(&self) -> Viewport {
        self.model_id()
            .and_then(|id| self.viewports.current(id))
            .or_else(|| self.snapshot.as_ref().and_then(|s| s.viewport))
            .unwrap_or_default()
    }

    fn dispatch_decoration_event(&self, kind: DecorationEventKind, decoration_id: &str) {
        let Some((decoration, vertex_id)) = self.ctx.decoration_for(decoration_id) else {
            tracing::warn!(decoration_id, "event for unknown decoration");
            return;
        };
        let handler = match kind {
            DecorationEventKind::Tap => decoration.on_click.as_ref(),
            DecorationEventKind::MouseOver => decoration.on_mouse_over.as_ref(),
            DecorationEventKind::MouseOut => decoration.on_mouse_out.as_ref(),
        };
        let Some(handler) = handler else {
            return;
        };
        let vertex = self
            .snapshot
            .as_ref()
            .and_then(|s| s.vertex(vertex_id))
            .flatten();
        match vertex {
            Some(vertex) => handler(&DecorationEventContext {
                decoration_id,
                vertex: &**vertex,
            }),
            None => tracing::warn!(decoration_id, vertex_id, "decorated vertex is gone"),
        }
    }
}

/// Extended data minus membership bookkeeping
fn model_settings(snapshot: &ModelSnapshot) -> BTreeMap<&str, &serde_json::Value> {
    snapshot
        .extended_data
        .iter()
        .filter(|(k, _)| !MEMBERSHIP_EXTENDED_KEYS.contains(&k.as_str()))
        .map(|(k, v)| (k.as_str(), v))
        .collect()
}
