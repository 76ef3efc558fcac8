//! Stable element ids for decoration nodes
//!
//! Two arenas hand out dense indices: one per decoration (by `Arc` identity),
//! one per vertex id. A decoration node's id composes both as `dec<v>-<d>`.
//! Indices are never reused, so an id always names the same pair.

use std::collections::HashMap;
use std::hash::{Hash, Hasher};
use std::sync::Arc;

use crate::registry::Decoration;

/// Bidirectional key <-> index map with monotonically increasing indices.
#[derive(Debug, Clone)]
pub struct IdArena<K> {
    index: HashMap<K, u32>,
    keys: Vec<K>,
}

impl<K> Default for IdArena<K> {
    fn default() -> Self {
        Self {
            index: HashMap::new(),
            keys: Vec::new(),
        }
    }
}

impl<K: Clone + Eq + Hash> IdArena<K> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Index of `key`, allocating the next one on first sight
    pub fn intern(&mut self, key: &K) -> u32 {
        if let Some(idx) = self.index.get(key) {
            return *idx;
        }
        let idx = self.keys.len() as u32;
        self.keys.push(key.clone());
        self.index.insert(key.clone(), idx);
        idx
    }

    pub fn get(&self, key: &K) -> Option<u32> {
        self.index.get(key).copied()
    }

    pub fn resolve(&self, idx: u32) -> Option<&K> {
        self.keys.get(idx as usize)
    }

    pub fn len(&self) -> usize {
        self.keys.len()
    }

    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }
}

/// A decoration compared and hashed by pointer.
#[derive(Debug, Clone)]
pub struct DecorationKey(pub Arc<Decoration>);

impl PartialEq for DecorationKey {
    fn eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.0, &other.0)
    }
}

impl Eq for DecorationKey {}

impl Hash for DecorationKey {
    fn hash<H: Hasher>(&self, state: &mut H) {
        (Arc::as_ptr(&self.0) as *const () as usize).hash(state);
    }
}

/// Decoration node ids, stable across renders.
#[derive(Debug, Clone, Default)]
pub struct DecorationIds {
    decorations: IdArena<DecorationKey>,
    vertices: IdArena<String>,
}

impl DecorationIds {
    pub fn new() -> Self {
        Self::default()
    }

    /// Element id of `decoration` on vertex `vertex_id`
    pub fn id_for(&mut self, decoration: &Arc<Decoration>, vertex_id: &str) -> String {
        let d = self.decorations.intern(&DecorationKey(Arc::clone(decoration)));
        let v = self.vertices.intern(&vertex_id.to_string());
        format!("dec{v}-{d}")
    }

    /// Reverse lookup: the decoration and vertex id behind an element id
    pub fn decoration_for(&self, element_id: &str) -> Option<(Arc<Decoration>, &str)> {
        let (v, d) = element_id.strip_prefix("dec")?.split_once('-')?;
        let v: u32 = v.parse().ok()?;
        let d: u32 = d.parse().ok()?;
        let decoration = self.decorations.resolve(d)?;
        let vertex_id = self.vertices.resolve(v)?;
        Some((Arc::clone(&decoration.0), vertex_id.as_str()))
    }
}

/// Id of the compound parent that holds a decorated vertex
pub fn decoration_parent_id(vertex_id: &str) -> String {
    format!("decP{vertex_id}")
}
