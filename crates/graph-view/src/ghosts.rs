//! Relocation ghosts
//!
//! When the store moves a vertex that was already on screen (another user
//! rearranged the view, an undo, ...), the canvas would jump. Instead a ghost
//! node is drawn at the old position and animated to the new one; the real
//! node keeps its identity. Moves this view made itself come back from the
//! store as well and must not create ghosts.

use std::collections::{BTreeMap, HashMap, VecDeque};

use graph_view_types::{Point, VertexMembership};

#[derive(Debug, Clone, Default)]
pub struct GhostTracker {
    /// Membership positions seen on the previous update (points)
    previous: HashMap<String, Point>,
    /// Vertex id -> position the ghost starts from (points)
    ghosts: BTreeMap<String, Point>,
    /// Positions this view sent to the store and has not seen back yet,
    /// oldest first
    reported: HashMap<String, VecDeque<Point>>,
}

impl GhostTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Compare a new membership list against the previous one
    pub fn observe_membership(&mut self, membership: &[VertexMembership]) {
        let current: HashMap<String, Point> = membership
            .iter()
            .map(|entry| (entry.id.clone(), entry.pos))
            .collect();

        for (id, pos) in &current {
            let Some(&prev) = self.previous.get(id) else {
                continue;
            };
            if prev == *pos {
                continue;
            }
            if self.consume_echo(id, pos) {
                continue;
            }
            tracing::debug!(vertex_id = %id, "vertex moved remotely, adding ghost");
            self.ghosts.insert(id.clone(), prev);
        }

        self.ghosts.retain(|id, _| current.contains_key(id));
        self.reported.retain(|id, _| current.contains_key(id));
        self.previous = current;
    }

    /// Remember positions this view is about to send to the store
    pub fn record_reported(&mut self, positions: &BTreeMap<String, Point>) {
        for (id, pos) in positions {
            self.reported.entry(id.clone()).or_default().push_back(*pos);
        }
    }

    /// The store echoes reports in the order they were sent, so an echo of
    /// `pos` also settles every report queued before it.
    fn consume_echo(&mut self, id: &str, pos: &Point) -> bool {
        let Some(queue) = self.reported.get_mut(id) else {
            return false;
        };
        let Some(idx) = queue.iter().position(|p| p == pos) else {
            return false;
        };
        queue.drain(..=idx);
        if queue.is_empty() {
            self.reported.remove(id);
        }
        true
    }

    /// The ghost's animation completed
    pub fn finish(&mut self, vertex_id: &str) -> bool {
        self.ghosts.remove(vertex_id).is_some()
    }

    pub fn ghost(&self, vertex_id: &str) -> Option<Point> {
        self.ghosts.get(vertex_id).copied()
    }

    pub fn ghosts(&self) -> &BTreeMap<String, Point> {
        &self.ghosts
    }

    pub fn reset(&mut self) {
        self.previous.clear();
        self.ghosts.clear();
        self.reported.clear();
    }
}
