//! Graph View Engine
//!
//! Everything between the domain store and the canvas backend except the
//! controller that wires it together:
//!
//! - [`projector`] turns a [`ModelSnapshot`](graph_view_types::ModelSnapshot)
//!   into an element list, memoized through [`memo::MemoCache`]
//! - [`selection`] coalesces per-element select/unselect into one update
//! - [`interaction`] holds drawing, path focus, hover and preview state
//! - [`ghosts`] detects remote relocations to animate
//! - [`registry`] holds the plugins every fold runs through
//!
//! # Time
//! Nothing here owns a clock. Timers are deadlines polled with the caller's
//! `now` (milliseconds), so the engine is deterministic under test.

pub mod config;
pub mod decoration;
pub mod decoration_ids;
pub mod element_index;
pub mod error;
pub mod format;
pub mod ghosts;
pub mod interaction;
pub mod memo;
pub mod projector;
pub mod registry;
pub mod selection;
pub mod timer;

pub use config::{ConfigError, EngineConfig};
pub use decoration::{DecorationReply, DecorationResolution};
pub use element_index::{ElementIndex, ElementRole};
pub use error::{PluginError, ProjectionError};
pub use ghosts::GhostTracker;
pub use interaction::{DrawRelease, DrawState, InteractionController, ReleaseTarget};
pub use memo::{MemoCache, MemoError, MemoStats};
pub use projector::{project, ProjectionContext, ViewState};
pub use registry::{Decoration, DecorationEventContext, PluginRegistry};
pub use selection::{SelectionCoalescer, SelectionIntent, SelectionTarget};
pub use timer::DeadlineTimer;
