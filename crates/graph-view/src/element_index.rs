//! What each rendered element id stands for.
//!
//! Backend events only carry ids; the index built from the last projection
//! tells the view whether an id is a real vertex, a placeholder, a ghost or a
//! decoration, and which domain edges a rendered edge collapses.

use std::collections::HashMap;

use graph_view_types::ElementList;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ElementRole {
    Vertex { is_truncated: bool },
    Partial,
    Ghost { vertex_id: String },
    DecorationParent { vertex_id: String },
    Decoration { vertex_id: String },
    Edge { edge_ids: Vec<String> },
}

impl ElementRole {
    /// Elements that take part in selection and context menus
    pub fn is_selectable(&self) -> bool {
        matches!(self, Self::Vertex { .. } | Self::Partial | Self::Edge { .. })
    }

    /// Vertex nodes whose moves are reported back to the store
    pub fn is_positionable(&self) -> bool {
        matches!(self, Self::Vertex { .. } | Self::Partial)
    }
}

#[derive(Debug, Clone, Default)]
pub struct ElementIndex {
    roles: HashMap<String, ElementRole>,
}

impl ElementIndex {
    pub fn from_elements(elements: &ElementList) -> Self {
        let mut roles = HashMap::with_capacity(elements.nodes.len() + elements.edges.len());

        for node in &elements.nodes {
            let role = if let Some(animate) = &node.data.animate_to {
                ElementRole::Ghost {
                    vertex_id: animate.id.clone(),
                }
            } else if node.has_class("decorationParent") {
                ElementRole::DecorationParent {
                    vertex_id: node.id().trim_start_matches("decP").to_string(),
                }
            } else if node.has_class("decoration") {
                ElementRole::Decoration {
                    vertex_id: node.data.vertex_id.clone().unwrap_or_default(),
                }
            } else if node.has_class("partial") {
                ElementRole::Partial
            } else {
                ElementRole::Vertex {
                    is_truncated: node.data.is_truncated.unwrap_or(false),
                }
            };
            roles.insert(node.id().to_string(), role);
        }

        for edge in &elements.edges {
            roles.insert(
                edge.id().to_string(),
                ElementRole::Edge {
                    edge_ids: edge.data.member_edge_ids().map(str::to_string).collect(),
                },
            );
        }

        Self { roles }
    }

    pub fn role(&self, id: &str) -> Option<&ElementRole> {
        self.roles.get(id)
    }

    pub fn is_truncated(&self, id: &str) -> bool {
        matches!(
            self.roles.get(id),
            Some(ElementRole::Vertex { is_truncated: true })
        )
    }

    /// Domain edge ids behind a rendered edge
    pub fn edge_ids(&self, id: &str) -> Option<&[String]> {
        match self.roles.get(id) {
            Some(ElementRole::Edge { edge_ids }) => Some(edge_ids),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::projector::{project, ProjectionContext, ViewState};
    use crate::registry::{Decoration, PluginRegistry};
    use graph_view_types::{DataPatch, Edge, ModelSnapshot, Point, Vertex};
    use pretty_assertions::assert_eq;
    use std::collections::BTreeMap;

    fn index_for(snapshot: &ModelSnapshot, ghosts: &BTreeMap<String, Point>) -> ElementIndex {
        let mut registry = PluginRegistry::new();
        registry.register_decoration(
            Decoration::new(DataPatch::new()).applies_when(|v| v.id == "A"),
        );
        let mut ctx = ProjectionContext::new(1, 1.0);
        let ui = ViewState {
            hovering: None,
            ghosts,
        };
        let elements = project(snapshot, &registry, &ui, &mut ctx).unwrap();
        ElementIndex::from_elements(&elements)
    }

    #[test]
    fn test_roles_from_projection() {
        let mut snapshot = ModelSnapshot::new("m1")
            .with_vertex(Vertex::new("A").with_title("two words"), Point::new(0.0, 0.0))
            .with_vertex(Vertex::new("B"), Point::new(5.0, 5.0))
            .with_edge(Edge::new("e1", "A", "B", "knows"));
        snapshot.vertices.remove("B");
        let ghosts = BTreeMap::from([("A".to_string(), Point::new(9.0, 9.0))]);

        let index = index_for(&snapshot, &ghosts);
        assert_eq!(index.role("A"), Some(&ElementRole::Vertex { is_truncated: true }));
        assert!(index.is_truncated("A"));
        assert_eq!(index.role("B"), Some(&ElementRole::Partial));
        assert_eq!(
            index.role("A-ANIMATING"),
            Some(&ElementRole::Ghost {
                vertex_id: "A".to_string()
            })
        );
        assert_eq!(
            index.role("decPA"),
            Some(&ElementRole::DecorationParent {
                vertex_id: "A".to_string()
            })
        );
        assert_eq!(index.edge_ids("1:A1:Bknows"), Some(&["e1".to_string()][..]));
        assert_eq!(index.role("missing"), None);
    }

    #[test]
    fn test_edges_with_shifted_endpoints_keep_their_own_members() {
        let snapshot = ModelSnapshot::new("m1")
            .with_vertex(Vertex::new("a"), Point::new(0.0, 0.0))
            .with_vertex(Vertex::new("bc"), Point::new(1.0, 0.0))
            .with_vertex(Vertex::new("ab"), Point::new(2.0, 0.0))
            .with_vertex(Vertex::new("c"), Point::new(3.0, 0.0))
            .with_edge(Edge::new("e1", "a", "bc", "knows"))
            .with_edge(Edge::new("e2", "ab", "c", "knows"));

        let index = index_for(&snapshot, &BTreeMap::new());
        assert_eq!(index.edge_ids("1:a2:bcknows"), Some(&["e1".to_string()][..]));
        assert_eq!(index.edge_ids("2:ab1:cknows"), Some(&["e2".to_string()][..]));
    }

    #[test]
    fn test_only_vertices_partials_and_edges_are_selectable() {
        let selectable = [
            ElementRole::Vertex { is_truncated: false },
            ElementRole::Partial,
            ElementRole::Edge { edge_ids: vec![] },
        ];
        let inert = [
            ElementRole::Ghost {
                vertex_id: "A".into(),
            },
            ElementRole::DecorationParent {
                vertex_id: "A".into(),
            },
            ElementRole::Decoration {
                vertex_id: "A".into(),
            },
        ];
        assert!(selectable.iter().all(ElementRole::is_selectable));
        assert!(!inert.iter().any(ElementRole::is_selectable));
        assert!(!ElementRole::Edge { edge_ids: vec![] }.is_positionable());
    }
}
