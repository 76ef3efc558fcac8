//! Transient canvas interaction state
//!
//! - Connection drawing: ctrl-press on a node (or an app request) starts an
//!   edge that follows the mouse until released on another node
//! - Path focus: highlighted paths between two vertices, capped
//! - Hover expansion: a truncated title expands after the pointer dwells
//! - Detail previews: a bounded pool of open preview popovers
//!
//! No callbacks: the view feeds inputs in and polls `poll_hover(now)` from its
//! tick. Every method returns the outputs it wants emitted.

use std::collections::{BTreeMap, BTreeSet};

use graph_view_types::{DrawEdge, PathFocus, PreviewHandle, ViewOutput};

use crate::timer::DeadlineTimer;

// =============================================================================
// CONNECTION DRAWING
// =============================================================================

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum DrawState {
    #[default]
    Idle,
    Drawing {
        from_id: String,
        connection_type: Option<String>,
    },
    /// Released on a target; the connection popover is open
    Targeted {
        from_id: String,
        to_id: String,
        connection_type: Option<String>,
    },
}

impl DrawState {
    pub fn from_id(&self) -> Option<&str> {
        match self {
            Self::Idle => None,
            Self::Drawing { from_id, .. } | Self::Targeted { from_id, .. } => Some(from_id),
        }
    }

    fn connection_type(&self) -> Option<String> {
        match self {
            Self::Idle => None,
            Self::Drawing {
                connection_type, ..
            }
            | Self::Targeted {
                connection_type, ..
            } => connection_type.clone(),
        }
    }

    /// Edge-to-mouse request for the backend
    pub fn draw_edge(&self) -> Option<DrawEdge> {
        match self {
            Self::Idle => None,
            Self::Drawing { from_id, .. } => Some(DrawEdge {
                vertex_id: from_id.clone(),
                to_vertex_id: None,
            }),
            Self::Targeted { from_id, to_id, .. } => Some(DrawEdge {
                vertex_id: from_id.clone(),
                to_vertex_id: Some(to_id.clone()),
            }),
        }
    }
}

/// What a primary release landed on
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReleaseTarget<'a> {
    Canvas,
    Node(&'a str),
    Edge(&'a str),
}

/// Outcome of a primary release while drawing
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DrawRelease {
    NotDrawing,
    /// Drawing stopped; `ctrl_on_element` asks for that element's context menu
    Cancelled { ctrl_on_element: bool },
    Targeted,
}

// =============================================================================
// PREVIEW POOL
// =============================================================================

/// Open detail previews, bounded.
#[derive(Debug, Clone)]
pub struct PreviewPool {
    open: BTreeMap<String, PreviewHandle>,
    capacity: usize,
}

impl PreviewPool {
    pub fn new(capacity: usize) -> Self {
        Self {
            open: BTreeMap::new(),
            capacity,
        }
    }

    /// Toggle previews: open ids close, new ids open while slots remain
    pub fn request(&mut self, vertex_ids: &[String]) -> Vec<ViewOutput> {
        let mut outputs = Vec::new();
        let requested: Vec<&String> = {
            let mut seen = BTreeSet::new();
            vertex_ids.iter().filter(|id| seen.insert(id.as_str())).collect()
        };

        let (close, mut add): (Vec<&String>, Vec<&String>) =
            requested.into_iter().partition(|id| self.is_open(id));

        for id in close {
            outputs.extend(self.close(id));
        }

        let available = self.capacity.saturating_sub(self.open.len());
        if add.len() > available {
            tracing::warn!(
                requested = add.len(),
                available,
                "preview capacity exceeded, dropping requests"
            );
            outputs.push(ViewOutput::notify(format!(
                "Too many previews open, at most {} can be shown",
                self.capacity
            )));
            add.truncate(available);
        }

        for id in add {
            let handle = PreviewHandle::new();
            self.open.insert(id.clone(), handle);
            outputs.push(ViewOutput::OpenPreview {
                vertex_id: id.clone(),
                handle,
            });
        }
        outputs
    }

    pub fn close(&mut self, vertex_id: &str) -> Option<ViewOutput> {
        self.open
            .remove(vertex_id)
            .map(|handle| ViewOutput::ClosePreview {
                vertex_id: vertex_id.to_string(),
                handle,
            })
    }

    pub fn teardown(&mut self) -> Vec<ViewOutput> {
        std::mem::take(&mut self.open)
            .into_iter()
            .map(|(vertex_id, handle)| ViewOutput::ClosePreview { vertex_id, handle })
            .collect()
    }

    pub fn is_open(&self, vertex_id: &str) -> bool {
        self.open.contains_key(vertex_id)
    }

    pub fn len(&self) -> usize {
        self.open.len()
    }

    pub fn is_empty(&self) -> bool {
        self.open.is_empty()
    }
}

// =============================================================================
// CONTROLLER
// =============================================================================

#[derive(Debug, Clone)]
pub struct InteractionController {
    draw: DrawState,
    grab_locked: bool,
    paths: Option<PathFocus>,
    max_focus_paths: usize,
    hover_timer: DeadlineTimer<String>,
    hover_expand_ms: u64,
    hovering: Option<String>,
    previews: PreviewPool,
}

impl InteractionController {
    pub fn new(max_focus_paths: usize, hover_expand_ms: u64, max_previews: usize) -> Self {
        Self {
            draw: DrawState::Idle,
            grab_locked: false,
            paths: None,
            max_focus_paths,
            hover_timer: DeadlineTimer::new(),
            hover_expand_ms,
            hovering: None,
            previews: PreviewPool::new(max_previews),
        }
    }

    // ---- drawing ----

    pub fn draw_state(&self) -> &DrawState {
        &self.draw
    }

    pub fn is_grab_locked(&self) -> bool {
        self.grab_locked
    }

    /// Primary press on node `id`; ctrl starts drawing from it
    pub fn press_node(&mut self, id: &str, ctrl: bool) -> Vec<ViewOutput> {
        if !ctrl || self.draw != DrawState::Idle {
            return Vec::new();
        }
        self.draw = DrawState::Drawing {
            from_id: id.to_string(),
            connection_type: None,
        };
        self.lock_grab()
    }

    /// App-requested connection from `from_id`
    pub fn start_connection(
        &mut self,
        from_id: &str,
        connection_type: Option<String>,
    ) -> Vec<ViewOutput> {
        self.draw = DrawState::Drawing {
            from_id: from_id.to_string(),
            connection_type,
        };
        self.lock_grab()
    }

    pub fn release(
        &mut self,
        target: ReleaseTarget<'_>,
        ctrl: bool,
    ) -> (DrawRelease, Vec<ViewOutput>) {
        let Some(from_id) = self.draw.from_id().map(str::to_string) else {
            return (DrawRelease::NotDrawing, Vec::new());
        };

        match target {
            ReleaseTarget::Canvas => (
                DrawRelease::Cancelled {
                    ctrl_on_element: false,
                },
                self.cancel_draw(),
            ),
            ReleaseTarget::Node(id) if id == from_id => (
                DrawRelease::Cancelled {
                    ctrl_on_element: ctrl,
                },
                self.cancel_draw(),
            ),
            ReleaseTarget::Edge(_) => (
                DrawRelease::Cancelled {
                    ctrl_on_element: false,
                },
                self.cancel_draw(),
            ),
            ReleaseTarget::Node(to_id) => {
                let connection_type = self.draw.connection_type();
                self.draw = DrawState::Targeted {
                    from_id: from_id.clone(),
                    to_id: to_id.to_string(),
                    connection_type: connection_type.clone(),
                };
                (
                    DrawRelease::Targeted,
                    vec![ViewOutput::ShowConnectionPopover {
                        from_vertex_id: from_id,
                        to_vertex_id: to_id.to_string(),
                        connection_type,
                    }],
                )
            }
        }
    }

    /// Stop drawing and restore node dragging
    pub fn cancel_draw(&mut self) -> Vec<ViewOutput> {
        self.draw = DrawState::Idle;
        if self.grab_locked {
            self.grab_locked = false;
            vec![ViewOutput::SetGrabLocked { locked: false }]
        } else {
            Vec::new()
        }
    }

    fn lock_grab(&mut self) -> Vec<ViewOutput> {
        if self.grab_locked {
            return Vec::new();
        }
        self.grab_locked = true;
        vec![ViewOutput::SetGrabLocked { locked: true }]
    }

    // ---- path focus ----

    pub fn paths(&self) -> Option<&PathFocus> {
        self.paths.as_ref()
    }

    pub fn focus_paths(&mut self, mut focus: PathFocus) -> Vec<ViewOutput> {
        let mut outputs = Vec::new();
        if focus.paths.len() > self.max_focus_paths {
            focus.paths.truncate(self.max_focus_paths);
            tracing::warn!(max = self.max_focus_paths, "path focus truncated");
            outputs.push(ViewOutput::notify(format!(
                "Too many paths to show, will display the first {}",
                self.max_focus_paths
            )));
        }
        self.paths = Some(focus);
        outputs
    }

    pub fn defocus_paths(&mut self) -> bool {
        self.paths.take().is_some()
    }

    /// Empty-canvas tap: drops path focus when nothing is selected
    pub fn tap_canvas(&mut self, selection_empty: bool) -> bool {
        selection_empty && self.defocus_paths()
    }

    /// Ask the app to add every vertex on the focused paths to the view
    pub fn focus_paths_add(&self) -> Option<ViewOutput> {
        let paths = self.paths.as_ref()?;
        let mut seen = BTreeSet::new();
        let vertex_ids: Vec<String> = paths
            .paths
            .iter()
            .take(self.max_focus_paths)
            .flatten()
            .filter(|id| seen.insert(id.as_str()))
            .cloned()
            .collect();
        Some(ViewOutput::DropElements {
            vertex_ids,
            edge_ids: Vec::new(),
            canvas_pos: None,
        })
    }

    // ---- hover ----

    pub fn hovering(&self) -> Option<&str> {
        self.hovering.as_deref()
    }

    /// Pointer entered a real vertex node
    pub fn pointer_over(&mut self, vertex_id: &str, now: u64) {
        self.hover_timer
            .schedule(now, self.hover_expand_ms, vertex_id.to_string());
    }

    /// Pointer left an element; true when an expansion was undone
    pub fn pointer_out(&mut self, left_vertex: bool) -> bool {
        self.hover_timer.cancel();
        left_vertex && self.hovering.take().is_some()
    }

    /// Expand the hovered node once the dwell has passed; true when it changed
    pub fn poll_hover(&mut self, now: u64, is_truncated: impl Fn(&str) -> bool) -> bool {
        match self.hover_timer.fire(now) {
            Some(id) if is_truncated(&id) => {
                let changed = self.hovering.as_deref() != Some(id.as_str());
                self.hovering = Some(id);
                changed
            }
            _ => false,
        }
    }

    // ---- previews ----

    pub fn previews(&self) -> &PreviewPool {
        &self.previews
    }

    pub fn preview(&mut self, vertex_ids: &[String]) -> Vec<ViewOutput> {
        self.previews.request(vertex_ids)
    }

    pub fn close_preview(&mut self, vertex_id: &str) -> Option<ViewOutput> {
        self.previews.close(vertex_id)
    }

    pub fn teardown_previews(&mut self) -> Vec<ViewOutput> {
        self.previews.teardown()
    }

    /// A different model is displayed: drop everything tied to the old one
    pub fn reset_for_model_switch(&mut self) -> Vec<ViewOutput> {
        let mut outputs = self.teardown_previews();
        outputs.extend(self.cancel_draw());
        self.paths = None;
        self.hover_timer.cancel();
        self.hovering = None;
        outputs
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn controller() -> InteractionController {
        InteractionController::new(100, 500, 5)
    }

    fn ids(ids: &[&str]) -> Vec<String> {
        ids.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_ctrl_press_starts_drawing_and_locks_grab() {
        let mut ctl = controller();
        assert!(ctl.press_node("a", false).is_empty());
        assert_eq!(ctl.draw_state(), &DrawState::Idle);

        let out = ctl.press_node("a", true);
        assert_eq!(out, vec![ViewOutput::SetGrabLocked { locked: true }]);
        assert_eq!(ctl.draw_state().from_id(), Some("a"));
        assert!(ctl.is_grab_locked());
    }

    #[test]
    fn test_release_on_other_node_targets() {
        let mut ctl = controller();
        ctl.start_connection("a", Some("knows".into()));

        let (release, out) = ctl.release(ReleaseTarget::Node("b"), false);
        assert_eq!(release, DrawRelease::Targeted);
        assert_eq!(
            out,
            vec![ViewOutput::ShowConnectionPopover {
                from_vertex_id: "a".into(),
                to_vertex_id: "b".into(),
                connection_type: Some("knows".into()),
            }]
        );
        assert_eq!(
            ctl.draw_state().draw_edge(),
            Some(DrawEdge {
                vertex_id: "a".into(),
                to_vertex_id: Some("b".into())
            })
        );

        let out = ctl.cancel_draw();
        assert_eq!(out, vec![ViewOutput::SetGrabLocked { locked: false }]);
        assert_eq!(ctl.draw_state(), &DrawState::Idle);
    }

    #[test]
    fn test_release_cancellations() {
        let mut ctl = controller();
        ctl.press_node("a", true);
        let (release, _) = ctl.release(ReleaseTarget::Canvas, false);
        assert_eq!(
            release,
            DrawRelease::Cancelled {
                ctrl_on_element: false
            }
        );

        ctl.press_node("a", true);
        let (release, _) = ctl.release(ReleaseTarget::Node("a"), true);
        assert_eq!(
            release,
            DrawRelease::Cancelled {
                ctrl_on_element: true
            }
        );

        ctl.press_node("a", true);
        let (release, out) = ctl.release(ReleaseTarget::Edge("ab"), false);
        assert!(matches!(release, DrawRelease::Cancelled { .. }));
        assert_eq!(out, vec![ViewOutput::SetGrabLocked { locked: false }]);

        let (release, out) = ctl.release(ReleaseTarget::Canvas, false);
        assert_eq!(release, DrawRelease::NotDrawing);
        assert!(out.is_empty());
    }

    #[test]
    fn test_focus_paths_truncates_with_one_notice() {
        let mut ctl = controller();
        let paths = (0..150)
            .map(|i| {
                let mid = format!("m{i}");
                ids(&["a", mid.as_str(), "b"])
            })
            .collect();
        let out = ctl.focus_paths(PathFocus {
            paths,
            source_id: Some("a".into()),
            target_id: Some("b".into()),
        });

        assert_eq!(ctl.paths().map(|p| p.paths.len()), Some(100));
        assert_eq!(
            out,
            vec![ViewOutput::notify(
                "Too many paths to show, will display the first 100"
            )]
        );
    }

    #[test]
    fn test_focus_paths_add_drops_unique_vertices() {
        let mut ctl = controller();
        assert_eq!(ctl.focus_paths_add(), None);

        ctl.focus_paths(PathFocus {
            paths: vec![ids(&["a", "x", "b"]), ids(&["a", "y", "b"])],
            ..PathFocus::default()
        });
        assert_eq!(
            ctl.focus_paths_add(),
            Some(ViewOutput::DropElements {
                vertex_ids: ids(&["a", "x", "b", "y"]),
                edge_ids: vec![],
                canvas_pos: None,
            })
        );
    }

    #[test]
    fn test_canvas_tap_defocuses_only_without_selection() {
        let mut ctl = controller();
        ctl.focus_paths(PathFocus::default());
        assert!(!ctl.tap_canvas(false));
        assert!(ctl.paths().is_some());
        assert!(ctl.tap_canvas(true));
        assert!(ctl.paths().is_none());
    }

    #[test]
    fn test_hover_expands_after_full_delay() {
        let mut ctl = controller();
        ctl.pointer_over("a", 1_000);
        assert!(!ctl.poll_hover(1_499, |_| true));
        assert!(ctl.poll_hover(1_500, |_| true));
        assert_eq!(ctl.hovering(), Some("a"));

        assert!(ctl.pointer_out(true));
        assert_eq!(ctl.hovering(), None);
    }

    #[test]
    fn test_hover_cancelled_by_pointer_out() {
        let mut ctl = controller();
        ctl.pointer_over("a", 0);
        ctl.pointer_out(true);
        assert!(!ctl.poll_hover(1_000, |_| true));
        assert_eq!(ctl.hovering(), None);
    }

    #[test]
    fn test_hover_ignores_untruncated_titles() {
        let mut ctl = controller();
        ctl.pointer_over("a", 0);
        assert!(!ctl.poll_hover(500, |_| false));
        assert_eq!(ctl.hovering(), None);
    }

    #[test]
    fn test_preview_pool_capacity_and_toggle() {
        let mut pool = PreviewPool::new(5);
        let out = pool.request(&ids(&["a", "b", "c", "d", "e", "f", "g"]));

        let opened = out
            .iter()
            .filter(|o| matches!(o, ViewOutput::OpenPreview { .. }))
            .count();
        let notices = out
            .iter()
            .filter(|o| matches!(o, ViewOutput::NotifyUser { .. }))
            .count();
        assert_eq!(opened, 5);
        assert_eq!(notices, 1);
        assert_eq!(pool.len(), 5);
        assert!(!pool.is_open("f"));

        // Requesting an open id closes it and frees the slot
        let out = pool.request(&ids(&["a", "f"]));
        assert!(matches!(&out[0], ViewOutput::ClosePreview { vertex_id, .. } if vertex_id == "a"));
        assert!(matches!(&out[1], ViewOutput::OpenPreview { vertex_id, .. } if vertex_id == "f"));
        assert!(!pool.is_open("a"));
        assert_eq!(pool.len(), 5);

        assert_eq!(pool.teardown().len(), 5);
        assert!(pool.is_empty());
    }

    #[test]
    fn test_model_switch_resets_transient_state() {
        let mut ctl = controller();
        ctl.press_node("a", true);
        ctl.focus_paths(PathFocus::default());
        ctl.preview(&ids(&["a"]));

        let out = ctl.reset_for_model_switch();
        assert_eq!(out.len(), 2);
        assert_eq!(ctl.draw_state(), &DrawState::Idle);
        assert!(ctl.paths().is_none());
        assert!(ctl.previews().is_empty());
    }
}
