//! Keyed memoization with identity-based staleness
//!
//! Entries are addressed as `<key>-<identity>`. An entry is fresh while the
//! stored input is the *same* input as the current one: pointer identity for
//! shared records, element-wise pointer identity (and equal length) for
//! collections. Content is never compared, so a stale hit is impossible as
//! long as the store replaces the `Arc` whenever a record changes.
//!
//! Keys use dotted kinds (`node.data`, `edge.class`, ...) so that a whole kind
//! can be dropped with [`MemoCache::clear`] when an upstream registry changes.

use std::any::Any;
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use graph_view_types::{Edge, Vertex};
use thiserror::Error;

// =============================================================================
// ERRORS
// =============================================================================

/// Incorrect use of the cache. These are programming errors.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MemoError {
    #[error("Memo key must not be empty")]
    EmptyKey,

    #[error("Memo input for key {key} has no identity and no identity function was given")]
    MissingIdentity { key: String },
}

impl MemoError {
    pub fn code(&self) -> &'static str {
        match self {
            Self::EmptyKey => "MEMO_EMPTY_KEY",
            Self::MissingIdentity { .. } => "MEMO_MISSING_IDENTITY",
        }
    }
}

// =============================================================================
// INPUT IDENTITY
// =============================================================================

/// Records that carry their own id.
pub trait MemoIdentity {
    fn memo_identity(&self) -> &str;
}

impl MemoIdentity for Vertex {
    fn memo_identity(&self) -> &str {
        &self.id
    }
}

impl MemoIdentity for Edge {
    fn memo_identity(&self) -> &str {
        &self.id
    }
}

/// Something a memo entry can be computed from.
pub trait MemoInput: Clone + 'static {
    /// Own identity, if the input has one
    fn memo_id(&self) -> Option<String>;

    /// Whether `other` is the very same input (not merely equal content)
    fn is_same(&self, other: &Self) -> bool;
}

impl<T: MemoIdentity + 'static> MemoInput for Arc<T> {
    fn memo_id(&self) -> Option<String> {
        Some(self.memo_identity().to_string())
    }

    fn is_same(&self, other: &Self) -> bool {
        Arc::ptr_eq(self, other)
    }
}

impl<T: MemoInput> MemoInput for Vec<T> {
    fn memo_id(&self) -> Option<String> {
        None
    }

    fn is_same(&self, other: &Self) -> bool {
        self.len() == other.len() && self.iter().zip(other).all(|(a, b)| a.is_same(b))
    }
}

// =============================================================================
// CACHE
// =============================================================================

struct MemoEntry {
    elements: Box<dyn Any>,
    value: Box<dyn Any>,
}

/// Hit/miss counters since creation.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MemoStats {
    pub hits: u64,
    pub misses: u64,
}

#[derive(Default)]
pub struct MemoCache {
    entries: HashMap<String, MemoEntry>,
    stats: MemoStats,
}

impl fmt::Debug for MemoCache {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MemoCache")
            .field("entries", &self.entries.len())
            .field("stats", &self.stats)
            .finish()
    }
}

impl MemoCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Memoize `compute(elements)` under `key` and the input's own id
    pub fn get<E, V, Err, F>(&mut self, key: &str, elements: &E, compute: F) -> Result<V, Err>
    where
        E: MemoInput,
        V: Clone + 'static,
        Err: From<MemoError>,
        F: FnOnce(&E) -> Result<V, Err>,
    {
        let id = elements.memo_id().ok_or_else(|| MemoError::MissingIdentity {
            key: key.to_string(),
        })?;
        self.lookup(key, &id, elements, compute)
    }

    /// Memoize `compute(elements)` under `key` and `identity(elements)`
    pub fn get_with<E, V, Err, I, F>(
        &mut self,
        key: &str,
        elements: &E,
        identity: I,
        compute: F,
    ) -> Result<V, Err>
    where
        E: MemoInput,
        V: Clone + 'static,
        Err: From<MemoError>,
        I: FnOnce(&E) -> String,
        F: FnOnce(&E) -> Result<V, Err>,
    {
        let id = identity(elements);
        self.lookup(key, &id, elements, compute)
    }

    fn lookup<E, V, Err, F>(
        &mut self,
        key: &str,
        id: &str,
        elements: &E,
        compute: F,
    ) -> Result<V, Err>
    where
        E: MemoInput,
        V: Clone + 'static,
        Err: From<MemoError>,
        F: FnOnce(&E) -> Result<V, Err>,
    {
        if key.is_empty() {
            return Err(MemoError::EmptyKey.into());
        }
        let full_key = format!("{key}-{id}");

        if let Some(entry) = self.entries.get(&full_key) {
            let stored = entry.elements.downcast_ref::<E>();
            let value = entry.value.downcast_ref::<V>();
            if let (Some(stored), Some(value)) = (stored, value) {
                if stored.is_same(elements) {
                    self.stats.hits += 1;
                    tracing::trace!(key = %full_key, "memo hit");
                    return Ok(value.clone());
                }
            }
        }

        self.stats.misses += 1;
        tracing::trace!(key = %full_key, "memo miss");
        let value = compute(elements)?;
        self.entries.insert(
            full_key,
            MemoEntry {
                elements: Box::new(elements.clone()),
                value: Box::new(value.clone()),
            },
        );
        Ok(value)
    }

    /// Drop entries whose key starts with one of `prefixes`; everything when empty
    pub fn clear(&mut self, prefixes: &[&str]) {
        let before = self.entries.len();
        if prefixes.is_empty() {
            self.entries.clear();
        } else {
            self.entries
                .retain(|key, _| !prefixes.iter().any(|p| key.starts_with(p)));
        }
        tracing::debug!(
            ?prefixes,
            removed = before - self.entries.len(),
            "memo cleared"
        );
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn stats(&self) -> MemoStats {
        self.stats
    }
}
