//! Graph View Synchronization
//!
//! Keeps a canvas scene graph in step with a remotely sourced domain graph.
//!
//! ```text
//! ModelSnapshot ──► GraphView::update_model ──► GraphView::render ──► RenderFrame
//!                         ▲                                              │
//!                         │                                              ▼
//!  ViewOutput ◄── GraphView::handle_event / tick ◄────────────── BackendEvent
//! ```
//!
//! [`GraphView`] owns the projection caches, the selection coalescer, the
//! interaction state machines, ghost detection and viewport memory. The
//! application owns the domain data, the clock and the canvas.

mod error;
pub mod view;

pub use error::ViewError;
pub use view::GraphView;

pub use graph_view;
pub use graph_view_types as types;
pub use viewport;
