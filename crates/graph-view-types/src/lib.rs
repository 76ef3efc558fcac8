//! Shared Boundary Types for the Graph View
//!
//! This crate is the single source of truth for every type that crosses a
//! boundary of the view engine.
//!
//! ## Boundaries
//!
//! ```text
//! ┌──────────────────┐ ModelSnapshot ┌──────────────────┐ RenderFrame  ┌──────────────────┐
//! │  Domain store    │ ────────────► │  GraphView       │ ───────────► │  Render backend  │
//! │  (application)   │ ◄──────────── │  (engine)        │ ◄─────────── │  (canvas)        │
//! └──────────────────┘  ViewOutput   └──────────────────┘ BackendEvent └──────────────────┘
//! ```
//!
//! ## Rules
//!
//! 1. Domain data is read-only here; the store owns it and shares it as `Arc`
//! 2. Tagged enums only: `#[serde(tag = "type")]`
//! 3. Positions in snapshots and outputs are points; positions in element
//!    lists and backend events are pixels

pub mod domain;
pub mod element;
pub mod event;
pub mod frame;
pub mod geometry;
pub mod output;

pub use domain::{
    EdgeMembership, ElementIdSet, ElementType, Edge, FocusSet, Membership, ModelSnapshot,
    SelectionSet, Vertex, VertexMembership,
};
pub use element::{
    AnimateTo, DataPatch, DecorationAlignment, DecorationPadding, EdgeData, ElementList,
    NodeData, RenderedEdge, RenderedNode,
};
pub use event::{BackendEvent, DecorationEventKind, ElementKind, ElementRef, PointerInfo};
pub use frame::{ComponentExtension, DrawEdge, PathFocus, RenderFrame};
pub use geometry::{Point, Viewport};
pub use output::{PreviewHandle, ViewOutput};
