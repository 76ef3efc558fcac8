//! Interaction Integration Tests
//!
//! Selection coalescing, connection drawing, path focus, hover expansion,
//! previews and menus, driven through backend events and the caller's clock.
//!
//! Run with: cargo test --test interaction_integration

use std::sync::Arc;

use graph_view_sync::graph_view::{Decoration, EngineConfig, PluginRegistry};
use graph_view_sync::types::{
    BackendEvent, ComponentExtension, DataPatch, DrawEdge, Edge, ElementIdSet, ElementRef,
    ModelSnapshot, PathFocus, Point, PointerInfo, SelectionSet, Vertex, ViewOutput,
};
use graph_view_sync::GraphView;
use pretty_assertions::assert_eq;

/// Test helper: rendered view of A -knows-> B with a long title on A
fn rendered_view(registry: PluginRegistry) -> GraphView {
    let registry = Arc::new(registry);
    let mut view = GraphView::new(EngineConfig::default(), Arc::clone(&registry)).unwrap();
    let mut snapshot = ModelSnapshot::new("m1")
        .with_vertex(
            Vertex::new("A").with_title("Acme Holdings International Limited"),
            Point::new(0.0, 0.0),
        )
        .with_vertex(Vertex::new("B"), Point::new(10.0, 10.0))
        .with_edge(Edge::new("e1", "A", "B", "knows"));
    snapshot.editable = true;
    view.update_model(snapshot, registry);
    view.render().unwrap();
    view
}

/// Test helper: rendered chain A-B-C-D with `selection` confirmed by the store
fn chain_view(selection: SelectionSet) -> GraphView {
    let registry = Arc::new(PluginRegistry::new());
    let mut view = GraphView::new(EngineConfig::default(), Arc::clone(&registry)).unwrap();
    let mut snapshot = ModelSnapshot::new("m1");
    for (i, id) in ["A", "B", "C", "D"].into_iter().enumerate() {
        snapshot = snapshot.with_vertex(Vertex::new(id), Point::new(i as f64 * 10.0, 0.0));
    }
    snapshot = snapshot
        .with_edge(Edge::new("e1", "A", "B", "knows"))
        .with_edge(Edge::new("e2", "B", "C", "knows"))
        .with_edge(Edge::new("e3", "C", "D", "knows"));
    snapshot.selection = selection;
    view.update_model(snapshot, registry);
    view.render().unwrap();
    view
}

fn tap(target: Option<ElementRef>, ctrl: bool, shift: bool) -> BackendEvent {
    BackendEvent::Tap {
        target,
        pointer: PointerInfo {
            page: Point::new(100.0, 200.0),
            ctrl,
            shift,
            ..PointerInfo::default()
        },
    }
}

fn tap_start(id: &str, ctrl: bool) -> BackendEvent {
    BackendEvent::TapStart {
        target: Some(ElementRef::node(id)),
        pointer: PointerInfo {
            ctrl,
            ..PointerInfo::default()
        },
    }
}

fn ids(ids: &[&str]) -> Vec<String> {
    ids.iter().map(|s| s.to_string()).collect()
}

// =============================================================================
// SELECTION
// =============================================================================

#[test]
fn test_select_events_settle_into_one_update() {
    let mut view = rendered_view(PluginRegistry::new());

    view.handle_event(
        BackendEvent::Select {
            target: ElementRef::node("A"),
        },
        0,
    );
    view.handle_event(
        BackendEvent::Select {
            target: ElementRef::edge("1:A1:Bknows"),
        },
        50,
    );
    assert!(view.tick(100).is_empty());
    assert!(view.selection().is_accumulating());

    assert_eq!(
        view.tick(150),
        vec![ViewOutput::SetSelection {
            vertices: ids(&["A"]),
            edges: ids(&["e1"]),
        }]
    );
    assert!(view.tick(400).is_empty());
}

#[test]
fn test_unselect_cancels_pending_add() {
    let mut view = rendered_view(PluginRegistry::new());
    let a = ElementRef::node("A");

    view.handle_event(BackendEvent::Select { target: a.clone() }, 0);
    view.handle_event(BackendEvent::Unselect { target: a }, 10);
    assert_eq!(view.tick(110), vec![ViewOutput::ClearSelection]);
}

#[test]
fn test_unknown_ids_never_select() {
    let mut view = rendered_view(PluginRegistry::new());
    view.handle_event(
        BackendEvent::Select {
            target: ElementRef::node("nope"),
        },
        0,
    );
    assert!(!view.selection().is_accumulating());
}

#[test]
fn test_empty_canvas_tap_clears_selection() {
    let mut view = rendered_view(PluginRegistry::new());
    view.handle_event(
        BackendEvent::Select {
            target: ElementRef::node("B"),
        },
        0,
    );

    let outputs = view.handle_event(tap(None, false, false), 20);
    assert_eq!(outputs, vec![ViewOutput::ClearSelection]);
    assert_eq!(view.tick(120), vec![ViewOutput::ClearSelection]);
}

#[test]
fn test_shift_tap_on_canvas_keeps_selection() {
    let mut view = rendered_view(PluginRegistry::new());
    assert!(view.handle_event(tap(None, false, true), 0).is_empty());
    assert!(!view.selection().is_accumulating());
}

#[test]
fn test_selection_action_extends_selection() {
    let mut registry = PluginRegistry::new();
    registry.register_selection_action("all-vertices", "Select all vertices", |elements, _| {
        ElementIdSet::new().with_vertices(
            elements
                .nodes
                .iter()
                .filter(|n| n.has_class("v"))
                .map(|n| n.id().to_string()),
        )
    });
    let mut view = rendered_view(registry);

    assert!(view.menu_select("all-vertices", 0).is_empty());
    assert!(view.menu_select("missing", 0).is_empty());
    assert_eq!(
        view.tick(100),
        vec![ViewOutput::SetSelection {
            vertices: ids(&["A", "B"]),
            edges: Vec::new(),
        }]
    );
}

#[test]
fn test_select_all_skips_decorations() {
    let mut registry = PluginRegistry::new();
    registry.register_decoration(
        Decoration::new(DataPatch::new()).applies_when(|v| v.id == "A"),
    );
    let mut view = rendered_view(registry);
    assert!(view.elements().nodes.len() > 2);

    view.select_all(0);
    assert!(view.selection().is_accumulating());
    assert_eq!(
        view.tick(100),
        vec![ViewOutput::SetSelection {
            vertices: ids(&["A", "B"]),
            edges: ids(&["e1"]),
        }]
    );
}

#[test]
fn test_select_connected_moves_selection_to_neighbours() {
    let mut view = chain_view(SelectionSet::new().with_vertices(["B"]));

    view.select_connected(0);
    assert_eq!(
        view.tick(100),
        vec![ViewOutput::SetSelection {
            vertices: ids(&["A", "C"]),
            edges: Vec::new(),
        }]
    );
}

#[test]
fn test_select_connected_takes_edge_endpoints_and_drops_originals() {
    let mut view = chain_view(
        SelectionSet::new()
            .with_vertices(["B", "C"])
            .with_edges(["e3"]),
    );

    view.select_connected(0);
    // B and C neighbour each other but were selected, so both are released
    assert_eq!(
        view.tick(100),
        vec![ViewOutput::SetSelection {
            vertices: ids(&["A", "D"]),
            edges: Vec::new(),
        }]
    );
}

#[test]
fn test_select_connected_without_selection_is_quiet() {
    let mut view = chain_view(SelectionSet::new());

    view.select_connected(0);
    assert!(!view.selection().is_accumulating());
    assert!(view.tick(100).is_empty());
}

#[test]
fn test_add_related_forwards_vertices_for_model() {
    let view = rendered_view(PluginRegistry::new());

    assert_eq!(
        view.add_related(ids(&["X", "Y"])),
        vec![ViewOutput::AddRelated {
            model_id: "m1".to_string(),
            vertex_ids: ids(&["X", "Y"]),
        }]
    );
    assert!(view.add_related(Vec::new()).is_empty());
}

// =============================================================================
// CONTEXT MENUS
// =============================================================================

#[test]
fn test_ctrl_tap_opens_vertex_menu() {
    let mut view = rendered_view(PluginRegistry::new());
    let outputs = view.handle_event(tap(Some(ElementRef::node("A")), true, false), 0);
    assert_eq!(
        outputs,
        vec![ViewOutput::RequestVertexMenu {
            origin: None,
            vertex_id: "A".to_string(),
            screen_pos: Point::new(100.0, 200.0),
        }]
    );
}

#[test]
fn test_context_tap_on_edge_lists_member_ids() {
    let mut view = rendered_view(PluginRegistry::new());
    let outputs = view.handle_event(
        BackendEvent::ContextTap {
            target: Some(ElementRef::edge("1:A1:Bknows")),
            pointer: PointerInfo {
                origin: Some("canvas".to_string()),
                ..PointerInfo::default()
            },
        },
        0,
    );
    assert_eq!(
        outputs,
        vec![ViewOutput::RequestEdgeMenu {
            origin: Some("canvas".to_string()),
            edge_ids: ids(&["e1"]),
            screen_pos: Point::default(),
        }]
    );

    let on_canvas = view.handle_event(
        BackendEvent::ContextTap {
            target: None,
            pointer: PointerInfo::default(),
        },
        0,
    );
    assert!(on_canvas.is_empty());
}

// =============================================================================
// CONNECTION DRAWING
// =============================================================================

#[test]
fn test_ctrl_press_then_tap_other_node_targets_connection() {
    let mut view = rendered_view(PluginRegistry::new());

    let outputs = view.handle_event(tap_start("A", true), 0);
    assert_eq!(outputs, vec![ViewOutput::SetGrabLocked { locked: true }]);
    assert_eq!(
        view.render().unwrap().draw_edge_to_mouse_from,
        Some(DrawEdge {
            vertex_id: "A".to_string(),
            to_vertex_id: None,
        })
    );

    let outputs = view.handle_event(tap(Some(ElementRef::node("B")), false, false), 10);
    assert_eq!(
        outputs,
        vec![
            ViewOutput::ShowConnectionPopover {
                from_vertex_id: "A".to_string(),
                to_vertex_id: "B".to_string(),
                connection_type: None,
            },
            ViewOutput::Rerender,
        ]
    );
    assert_eq!(
        view.render().unwrap().draw_edge_to_mouse_from,
        Some(DrawEdge {
            vertex_id: "A".to_string(),
            to_vertex_id: Some("B".to_string()),
        })
    );

    let outputs = view.finish_vertex_connection();
    assert_eq!(
        outputs,
        vec![ViewOutput::SetGrabLocked { locked: false }, ViewOutput::Rerender]
    );
    assert_eq!(view.render().unwrap().draw_edge_to_mouse_from, None);
}

#[test]
fn test_canvas_tap_cancels_drawing_without_clearing_selection() {
    let mut view = rendered_view(PluginRegistry::new());
    view.start_vertex_connection("A", Some("owns".to_string()));

    let outputs = view.handle_event(tap(None, false, false), 0);
    assert_eq!(
        outputs,
        vec![ViewOutput::SetGrabLocked { locked: false }, ViewOutput::Rerender]
    );
    assert!(!view.selection().is_accumulating());
}

#[test]
fn test_ctrl_tap_on_source_cancels_and_opens_menu() {
    let mut view = rendered_view(PluginRegistry::new());
    view.handle_event(tap_start("A", true), 0);

    let outputs = view.handle_event(tap(Some(ElementRef::node("A")), true, false), 10);
    assert!(outputs.contains(&ViewOutput::SetGrabLocked { locked: false }));
    assert!(outputs
        .iter()
        .any(|o| matches!(o, ViewOutput::RequestVertexMenu { vertex_id, .. } if vertex_id == "A")));
}

#[test]
fn test_plain_press_does_not_draw() {
    let mut view = rendered_view(PluginRegistry::new());
    assert!(view.handle_event(tap_start("A", false), 0).is_empty());
    assert!(!view.interaction().is_grab_locked());
}

// =============================================================================
// PATH FOCUS
// =============================================================================

#[test]
fn test_path_focus_truncates_with_one_notice() {
    let mut view = rendered_view(PluginRegistry::new());
    let paths: Vec<Vec<String>> = (0..150)
        .map(|i| {
            let mid = format!("mid{i}");
            ids(&["A", mid.as_str(), "B"])
        })
        .collect();

    let outputs = view.focus_paths(PathFocus {
        paths,
        source_id: Some("A".to_string()),
        target_id: Some("B".to_string()),
    });
    assert_eq!(
        outputs,
        vec![
            ViewOutput::notify("Too many paths to show, will display the first 100"),
            ViewOutput::Rerender,
        ]
    );
    assert_eq!(view.render().unwrap().draw_paths.unwrap().paths.len(), 100);

    let ViewOutput::DropElements { vertex_ids, .. } = &view.focus_paths_add()[0] else {
        panic!("expected drop request");
    };
    assert_eq!(vertex_ids.len(), 102);

    assert_eq!(
        view.handle_event(tap(None, false, false), 0),
        vec![ViewOutput::Rerender, ViewOutput::ClearSelection]
    );
    assert_eq!(view.render().unwrap().draw_paths, None);
}

#[test]
fn test_defocus_without_paths_is_quiet() {
    let mut view = rendered_view(PluginRegistry::new());
    assert!(view.defocus_paths().is_empty());
}

// =============================================================================
// HOVER
// =============================================================================

#[test]
fn test_hover_expands_truncated_title_after_delay() {
    let mut view = rendered_view(PluginRegistry::new());
    let title = |view: &mut GraphView| {
        view.render()
            .unwrap()
            .elements
            .node("A")
            .and_then(|n| n.data.truncated_title.clone())
    };
    assert_eq!(title(&mut view).as_deref(), Some("Acme Holdings International…"));

    view.handle_event(
        BackendEvent::PointerOver {
            target: Some(ElementRef::node("A")),
        },
        1_000,
    );
    assert!(view.tick(1_499).is_empty());
    assert_eq!(view.tick(1_500), vec![ViewOutput::Rerender]);
    assert_eq!(
        title(&mut view).as_deref(),
        Some("Acme Holdings International Limited")
    );

    let outputs = view.handle_event(
        BackendEvent::PointerOut {
            target: Some(ElementRef::node("A")),
        },
        1_600,
    );
    assert_eq!(outputs, vec![ViewOutput::Rerender]);
    assert_eq!(title(&mut view).as_deref(), Some("Acme Holdings International…"));
}

#[test]
fn test_hover_on_short_title_never_expands() {
    let mut view = rendered_view(PluginRegistry::new());
    view.handle_event(
        BackendEvent::PointerOver {
            target: Some(ElementRef::node("B")),
        },
        0,
    );
    assert!(view.tick(600).is_empty());
    assert_eq!(view.interaction().hovering(), None);
}

#[test]
fn test_leaving_before_delay_cancels_hover() {
    let mut view = rendered_view(PluginRegistry::new());
    view.handle_event(
        BackendEvent::PointerOver {
            target: Some(ElementRef::node("A")),
        },
        0,
    );
    view.handle_event(
        BackendEvent::PointerOut {
            target: Some(ElementRef::node("A")),
        },
        100,
    );
    assert!(view.tick(600).is_empty());
}

// =============================================================================
// PREVIEWS
// =============================================================================

#[test]
fn test_preview_capacity_and_toggle() {
    let mut view = rendered_view(PluginRegistry::new());
    let requested: Vec<String> = (0..7).map(|i| format!("v{i}")).collect();

    let outputs = view.preview_vertices(&requested);
    let opened = outputs
        .iter()
        .filter(|o| matches!(o, ViewOutput::OpenPreview { .. }))
        .count();
    assert_eq!(opened, 5);
    assert!(outputs.contains(&ViewOutput::notify(
        "Too many previews open, at most 5 can be shown"
    )));

    let outputs = view.preview_vertices(&ids(&["v0"]));
    assert!(matches!(
        outputs.as_slice(),
        [ViewOutput::ClosePreview { vertex_id, .. }] if vertex_id == "v0"
    ));
    assert_eq!(view.interaction().previews().len(), 4);
}

#[test]
fn test_tap_hold_previews_vertex_and_switch_closes_it() {
    let mut view = rendered_view(PluginRegistry::new());
    let outputs = view.handle_event(
        BackendEvent::TapHold {
            target: Some(ElementRef::node("B")),
        },
        0,
    );
    assert!(matches!(
        outputs.as_slice(),
        [ViewOutput::OpenPreview { vertex_id, .. }] if vertex_id == "B"
    ));

    let registry = Arc::new(PluginRegistry::new());
    let outputs = view.update_model(ModelSnapshot::new("m2"), registry);
    assert!(matches!(
        outputs.as_slice(),
        [ViewOutput::ClosePreview { vertex_id, .. }] if vertex_id == "B"
    ));
    assert!(view.interaction().previews().is_empty());
}

// =============================================================================
// CLIPBOARD AND EXPORT
// =============================================================================

#[test]
fn test_cut_and_paste_requests() {
    let view = rendered_view(PluginRegistry::new());

    assert_eq!(
        view.elements_cut(ids(&["A"])),
        vec![ViewOutput::RemoveElements {
            vertex_ids: ids(&["A"]),
            edge_ids: Vec::new(),
        }]
    );

    let pasted = ElementIdSet::new().with_vertices(["C"]).with_edges(["e9"]);
    assert_eq!(
        view.elements_pasted(pasted),
        vec![ViewOutput::DropElements {
            vertex_ids: ids(&["C"]),
            edge_ids: ids(&["e9"]),
            canvas_pos: None,
        }]
    );
}

#[test]
fn test_menu_export_opens_registered_exporter() {
    let mut registry = PluginRegistry::new();
    registry.register_export_action(ComponentExtension::new("png", "exports/PngExporter"));
    let view = rendered_view(registry);

    assert_eq!(
        view.menu_export("exports/PngExporter"),
        vec![ViewOutput::OpenExport {
            identifier: "png".to_string(),
            component_path: "exports/PngExporter".to_string(),
            model_id: "m1".to_string(),
        }]
    );
    assert!(view.menu_export("exports/Unknown").is_empty());
}

#[test]
fn test_preview_image_forwarded_to_store() {
    let mut view = rendered_view(PluginRegistry::new());
    let outputs = view.handle_event(
        BackendEvent::PreviewRendered {
            image_data: "data:image/png;base64,AAAA".to_string(),
        },
        0,
    );
    assert_eq!(
        outputs,
        vec![ViewOutput::UpdatePreview {
            model_id: "m1".to_string(),
            image_data: "data:image/png;base64,AAAA".to_string(),
        }]
    );
}
