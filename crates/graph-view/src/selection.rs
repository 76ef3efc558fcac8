//! Selection coalescing
//!
//! The canvas reports select/unselect one element at a time, often dozens in
//! a single gesture (box select, select-all). The coalescer folds them into a
//! pending delta and emits the settled selection once, after a quiet period.
//!
//! # State
//! - idle: timer not armed
//! - accumulating: timer armed, each intent pushes the deadline out
//!
//! Invariant: an id is never in both `add` and `remove` of the same type.

use graph_view_types::{ElementIdSet, ElementType, SelectionSet, ViewOutput};

use crate::timer::DeadlineTimer;

/// What a selection intent refers to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SelectionTarget {
    Vertex(String),
    Edge(String),
    /// A rendered edge standing for several domain edges
    CompoundEdge(Vec<String>),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SelectionIntent {
    Add(SelectionTarget),
    Remove(SelectionTarget),
    Clear,
}

/// Net selection change accumulated since the last reset.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PendingSelectionDelta {
    pub add: ElementIdSet,
    pub remove: ElementIdSet,
}

impl PendingSelectionDelta {
    fn insert_add(&mut self, element_type: ElementType, id: &str) {
        self.remove.ids_mut(element_type).remove(id);
        self.add.ids_mut(element_type).insert(id.to_string());
    }

    fn insert_remove(&mut self, element_type: ElementType, id: &str) {
        self.add.ids_mut(element_type).remove(id);
        self.remove.ids_mut(element_type).insert(id.to_string());
    }

    pub fn clear(&mut self) {
        self.add.clear();
        self.remove.clear();
    }
}

#[derive(Debug, Clone)]
pub struct SelectionCoalescer {
    delta: PendingSelectionDelta,
    flush: DeadlineTimer<()>,
    debounce_ms: u64,
}

impl SelectionCoalescer {
    pub fn new(debounce_ms: u64) -> Self {
        Self {
            delta: PendingSelectionDelta::default(),
            flush: DeadlineTimer::new(),
            debounce_ms,
        }
    }

    /// Seed the delta from externally confirmed selection.
    ///
    /// A flush that is already scheduled stays scheduled.
    pub fn reset(&mut self, initial: Option<&SelectionSet>) {
        self.delta.clear();
        if let Some(selection) = initial {
            self.delta.add = selection.clone();
        }
    }

    pub fn apply(&mut self, intent: SelectionIntent, now: u64) {
        match intent {
            SelectionIntent::Add(target) => {
                for_each_id(&target, |ty, id| self.delta.insert_add(ty, id));
            }
            SelectionIntent::Remove(target) => {
                for_each_id(&target, |ty, id| self.delta.insert_remove(ty, id));
            }
            SelectionIntent::Clear => self.delta.clear(),
        }
        self.flush.schedule(now, self.debounce_ms, ());
    }

    /// Add a whole id set (selection actions, pasted elements)
    pub fn add_all(&mut self, ids: &ElementIdSet, now: u64) {
        for id in &ids.vertices {
            self.delta.insert_add(ElementType::Vertices, id);
        }
        for id in &ids.edges {
            self.delta.insert_add(ElementType::Edges, id);
        }
        self.flush.schedule(now, self.debounce_ms, ());
    }

    /// The settled selection, once the quiet period has passed
    pub fn poll(&mut self, now: u64) -> Option<ViewOutput> {
        self.flush.fire(now)?;
        let add = &self.delta.add;
        let output = if add.is_empty() {
            ViewOutput::ClearSelection
        } else {
            ViewOutput::SetSelection {
                vertices: add.vertices.iter().cloned().collect(),
                edges: add.edges.iter().cloned().collect(),
            }
        };
        tracing::debug!(
            vertices = add.vertices.len(),
            edges = add.edges.len(),
            "selection settled"
        );
        Some(output)
    }

    pub fn delta(&self) -> &PendingSelectionDelta {
        &self.delta
    }

    pub fn is_accumulating(&self) -> bool {
        self.flush.is_armed()
    }
}

fn for_each_id(target: &SelectionTarget, mut f: impl FnMut(ElementType, &str)) {
    match target {
        SelectionTarget::Vertex(id) => f(ElementType::Vertices, id),
        SelectionTarget::Edge(id) => f(ElementType::Edges, id),
        SelectionTarget::CompoundEdge(ids) => {
            for id in ids {
                f(ElementType::Edges, id);
            }
        }
    }
}
