//! Raw interaction events emitted by the rendering backend.

use serde::{Deserialize, Serialize};

use crate::geometry::{Point, Viewport};

/// Node or edge
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ElementKind {
    Node,
    Edge,
}

/// Reference to a rendered element by id.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ElementRef {
    pub id: String,
    pub kind: ElementKind,
}

impl ElementRef {
    pub fn node(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            kind: ElementKind::Node,
        }
    }

    pub fn edge(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            kind: ElementKind::Edge,
        }
    }

    pub fn is_node(&self) -> bool {
        self.kind == ElementKind::Node
    }
}

/// Pointer state captured with a tap-like event.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PointerInfo {
    /// Page coordinates (screen space)
    #[serde(default)]
    pub page: Point,
    /// Canvas coordinates (pixels, model space)
    #[serde(default)]
    pub canvas: Point,
    #[serde(default)]
    pub ctrl: bool,
    #[serde(default)]
    pub shift: bool,
    /// Opaque token for the originating UI element, echoed in menu requests
    #[serde(default)]
    pub origin: Option<String>,
}

/// Pointer interaction with a decoration node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DecorationEventKind {
    Tap,
    MouseOver,
    MouseOut,
}

/// Events from the canvas. `target: None` means the empty canvas.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum BackendEvent {
    Select {
        target: ElementRef,
    },
    Unselect {
        target: ElementRef,
    },
    Remove {
        target: ElementRef,
    },
    /// A node moved (pixels)
    Position {
        target: ElementRef,
        position: Point,
    },
    /// A dragged node was released
    Free,
    LayoutStop,
    TapStart {
        target: Option<ElementRef>,
        #[serde(default)]
        pointer: PointerInfo,
    },
    Tap {
        target: Option<ElementRef>,
        #[serde(default)]
        pointer: PointerInfo,
    },
    TapHold {
        target: Option<ElementRef>,
    },
    ContextTap {
        target: Option<ElementRef>,
        #[serde(default)]
        pointer: PointerInfo,
    },
    ContextTapEnd {
        target: Option<ElementRef>,
        #[serde(default)]
        pointer: PointerInfo,
    },
    PointerOver {
        target: Option<ElementRef>,
    },
    PointerOut {
        target: Option<ElementRef>,
    },
    Pan {
        viewport: Viewport,
    },
    Zoom {
        viewport: Viewport,
    },
    Decoration {
        kind: DecorationEventKind,
        decoration_id: String,
    },
    /// A ghost's relocation animation completed
    GhostFinished {
        vertex_id: String,
    },
    /// The backend rendered a new thumbnail of the canvas
    PreviewRendered {
        image_data: String,
    },
}
