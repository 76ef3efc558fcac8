//! Decoration data resolution
//!
//! A decoration provider answers either immediately or through a oneshot
//! channel. Pending answers are polled with `try_recv` on every render and
//! tick; nothing blocks. Answers are kept per decoration id until the vertex
//! record changes, at which point the provider is asked again.
//!
//! A provider that fails (or answers with something that is not an object)
//! is logged and its decoration is left out of the render.

use std::collections::HashMap;
use std::sync::Arc;

use futures::channel::oneshot;
use graph_view_types::{DataPatch, Vertex};

use crate::error::PluginError;
use crate::registry::{Decoration, DecorationData};

/// What a provider eventually answers with
pub type DecorationReply = Result<serde_json::Value, PluginError>;

/// A provider's answer: ready now, or later through a channel.
#[derive(Debug)]
pub enum DecorationResolution {
    Ready(DecorationReply),
    Deferred(oneshot::Receiver<DecorationReply>),
}

impl DecorationResolution {
    pub fn ready(value: serde_json::Value) -> Self {
        Self::Ready(Ok(value))
    }

    /// A resolution completed later through the returned sender
    pub fn deferred() -> (oneshot::Sender<DecorationReply>, Self) {
        let (tx, rx) = oneshot::channel();
        (tx, Self::Deferred(rx))
    }
}

#[derive(Debug)]
enum SlotState {
    Resolved(DataPatch),
    Pending(oneshot::Receiver<DecorationReply>),
    Failed,
}

#[derive(Debug)]
struct Slot {
    vertex: Arc<Vertex>,
    state: SlotState,
}

/// Provider answers keyed by decoration element id.
#[derive(Debug, Default)]
pub struct DecorationStore {
    slots: HashMap<String, Slot>,
}

impl DecorationStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Data for `decoration` rendered as `decoration_id` on `vertex`, if resolved
    pub fn resolve(
        &mut self,
        decoration_id: &str,
        decoration: &Decoration,
        vertex: &Arc<Vertex>,
    ) -> Option<DataPatch> {
        let provider = match &decoration.data {
            DecorationData::Static(data) => return Some(data.clone()),
            DecorationData::Provider(provider) => provider,
        };

        let current = self
            .slots
            .get(decoration_id)
            .is_some_and(|slot| Arc::ptr_eq(&slot.vertex, vertex));
        if !current {
            let state = match provider(vertex) {
                DecorationResolution::Ready(reply) => settle(decoration_id, reply),
                DecorationResolution::Deferred(rx) => SlotState::Pending(rx),
            };
            self.slots.insert(
                decoration_id.to_string(),
                Slot {
                    vertex: Arc::clone(vertex),
                    state,
                },
            );
        }

        let slot = self.slots.get_mut(decoration_id)?;
        poll_slot(decoration_id, slot);
        match &slot.state {
            SlotState::Resolved(data) => Some(data.clone()),
            SlotState::Pending(_) | SlotState::Failed => None,
        }
    }

    /// Poll pending answers; true when one resolved to data and a render is due
    pub fn poll(&mut self) -> bool {
        let mut resolved = false;
        for (id, slot) in self.slots.iter_mut() {
            resolved |= poll_slot(id, slot);
        }
        resolved
    }

    /// Forget answers for vertices that left the view, cancelling pending ones
    pub fn retain_vertices(&mut self, is_live: impl Fn(&str) -> bool) {
        let before = self.slots.len();
        let mut cancelled = 0usize;
        self.slots.retain(|_, slot| {
            let keep = is_live(&slot.vertex.id);
            if !keep && matches!(slot.state, SlotState::Pending(_)) {
                cancelled += 1;
            }
            keep
        });
        if before != self.slots.len() {
            tracing::debug!(
                removed = before - self.slots.len(),
                cancelled,
                "dropped decoration data for departed vertices"
            );
        }
    }

    pub fn pending_count(&self) -> usize {
        self.slots
            .values()
            .filter(|slot| matches!(slot.state, SlotState::Pending(_)))
            .count()
    }

    pub fn clear(&mut self) {
        self.slots.clear();
    }
}

/// Advance a pending slot; true when it just resolved to data
fn poll_slot(decoration_id: &str, slot: &mut Slot) -> bool {
    let SlotState::Pending(rx) = &mut slot.state else {
        return false;
    };
    let next = match rx.try_recv() {
        Ok(Some(reply)) => settle(decoration_id, reply),
        Ok(None) => return false,
        Err(oneshot::Canceled) => settle(decoration_id, Err(PluginError::Abandoned)),
    };
    let resolved = matches!(next, SlotState::Resolved(_));
    slot.state = next;
    resolved
}

fn settle(decoration_id: &str, reply: DecorationReply) -> SlotState {
    match reply {
        Ok(serde_json::Value::Object(data)) => SlotState::Resolved(data),
        Ok(other) => {
            let err = PluginError::NotAnObject(json_kind(&other).to_string());
            tracing::error!(decoration_id, error = %err, "decoration data rejected");
            SlotState::Failed
        }
        Err(err) => {
            tracing::error!(decoration_id, error = %err, "decoration data rejected");
            SlotState::Failed
        }
    }
}

fn json_kind(value: &serde_json::Value) -> &'static str {
    match value {
        serde_json::Value::Null => "null",
        serde_json::Value::Bool(_) => "boolean",
        serde_json::Value::Number(_) => "number",
        serde_json::Value::String(_) => "string",
        serde_json::Value::Array(_) => "array",
        serde_json::Value::Object(_) => "object",
    }
}
