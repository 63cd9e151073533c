//! The host document boundary.
//!
//! The pipeline never touches a scene graph directly. Everything it needs
//! from the surrounding editor goes through [`HostDocument`], a narrow
//! view of a vector document: node inspection, frame and text creation,
//! markup import/export, and the three destructive geometry primitives
//! (stroke outlining, flattening, stroke removal).
//!
//! Node handles are generational. Destructive operations consume nodes and
//! invalidate their handles; holding a [`NodeId`] across such an operation
//! is safe but the handle may go stale, which every read method tolerates
//! by returning an empty answer.

use slotmap::new_key_type;

use crate::error::HostError;

pub mod memory;

pub use memory::{FaultInjection, MemoryDocument};

new_key_type! {
    /// Generational handle to a node in the host document.
    ///
    /// Handles never dangle: once the node behind one is removed or
    /// consumed by a geometry primitive, the handle merely stops
    /// resolving.
    pub struct NodeId;
}

// ============================================================================
// Node classification
// ============================================================================

/// What a node in the host document is.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NodeKind {
    /// Layout container with its own bounds and optional auto-layout.
    Frame,
    /// Plain grouping node.
    Group,
    /// Filled or stroked vector geometry.
    Vector,
    /// A boolean combination of vector shapes.
    Boolean,
    /// A text run.
    Text,
    /// A reusable asset definition.
    Component,
    /// A placed copy of a component.
    Instance,
    /// An assembled set of size variants.
    VariantSet,
    /// Anything else the host can hold.
    Other,
}

impl NodeKind {
    /// Whether the node holds children the host exposes structurally.
    pub fn is_container(self) -> bool {
        matches!(
            self,
            NodeKind::Frame
                | NodeKind::Group
                | NodeKind::Component
                | NodeKind::Instance
                | NodeKind::VariantSet
        )
    }

    /// Composed nodes are reusable assets; selection resolution takes
    /// them whole instead of unwrapping their internals.
    pub fn is_composed(self) -> bool {
        matches!(
            self,
            NodeKind::Component | NodeKind::Instance | NodeKind::VariantSet
        )
    }
}

/// Stacking direction for auto-layout containers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LayoutDirection {
    Horizontal,
    Vertical,
}

// ============================================================================
// Rect
// ============================================================================

/// Axis-aligned bounding rectangle in document coordinates.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rect {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

impl Rect {
    pub fn new(x: f32, y: f32, width: f32, height: f32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// The smallest rectangle containing both inputs.
    pub fn union(self, other: Rect) -> Rect {
        let left = self.x.min(other.x);
        let top = self.y.min(other.y);
        let right = (self.x + self.width).max(other.x + other.width);
        let bottom = (self.y + self.height).max(other.y + other.height);
        Rect::new(left, top, right - left, bottom - top)
    }

    /// The y coordinate of the bottom edge.
    pub fn bottom(self) -> f32 {
        self.y + self.height
    }
}

// ============================================================================
// HostDocument
// ============================================================================

/// A host vector document the pipeline can read and rearrange.
///
/// Implementations adapt a real editor document. [`MemoryDocument`]
/// provides a self-contained in-memory host for tests and headless use.
///
/// # Handle semantics
///
/// Read methods ([`is_alive`], [`kind`], [`name`], [`children`], ...)
/// never fail; a stale handle yields `false`, `None`, or an empty
/// collection. Mutating methods return [`HostError::StaleNode`] when
/// handed a dead handle, except [`clear_strokes`] which treats staleness
/// as "nothing to remove".
///
/// [`is_alive`]: HostDocument::is_alive
/// [`kind`]: HostDocument::kind
/// [`name`]: HostDocument::name
/// [`children`]: HostDocument::children
/// [`clear_strokes`]: HostDocument::clear_strokes
pub trait HostDocument {
    // ----- Inspection -------------------------------------------------------

    /// The insertion context for new top-level nodes, typically the
    /// current page.
    fn root(&self) -> NodeId;

    /// Whether the handle still resolves to a live node.
    fn is_alive(&self, id: NodeId) -> bool;

    fn kind(&self, id: NodeId) -> Option<NodeKind>;

    fn name(&self, id: NodeId) -> Option<String>;

    fn is_visible(&self, id: NodeId) -> bool;

    /// Whether the node carries content the host can render to markup.
    fn supports_export(&self, id: NodeId) -> bool;

    /// Direct children in paint order. Empty for leaves and stale handles.
    fn children(&self, id: NodeId) -> Vec<NodeId>;

    /// Number of strokes painted directly on this node.
    fn stroke_count(&self, id: NodeId) -> usize;

    fn bounding_box(&self, id: NodeId) -> Option<Rect>;

    /// The user's current selection, in selection order.
    fn selection(&self) -> Vec<NodeId>;

    // ----- Document state ---------------------------------------------------

    /// Replaces the current selection. Stale handles are skipped.
    fn set_selection(&mut self, ids: &[NodeId]);

    /// Scrolls and zooms the viewport to show the given nodes.
    fn focus_viewport(&mut self, ids: &[NodeId]);

    /// Shows a transient message to the user.
    fn notify(&mut self, message: &str);

    // ----- Markup -----------------------------------------------------------

    /// Renders the node's subtree to SVG markup.
    fn export_markup(&self, id: NodeId) -> Result<String, HostError>;

    /// Parses SVG markup into a new wrapper node under `parent` and
    /// returns its handle.
    fn import_markup(&mut self, markup: &str, parent: NodeId) -> Result<NodeId, HostError>;

    // ----- Structure --------------------------------------------------------

    fn create_frame(
        &mut self,
        name: &str,
        parent: NodeId,
        width: f32,
        height: f32,
    ) -> Result<NodeId, HostError>;

    fn create_text(
        &mut self,
        content: &str,
        parent: NodeId,
        font_size: f32,
    ) -> Result<NodeId, HostError>;

    fn set_name(&mut self, id: NodeId, name: &str) -> Result<(), HostError>;

    fn set_position(&mut self, id: NodeId, x: f32, y: f32) -> Result<(), HostError>;

    /// Whether children outside the node's bounds are clipped.
    fn set_clips_content(&mut self, id: NodeId, clips: bool) -> Result<(), HostError>;

    fn clear_fills(&mut self, id: NodeId) -> Result<(), HostError>;

    /// Applies auto-layout with the given stacking direction and item gap.
    fn set_layout(
        &mut self,
        id: NodeId,
        direction: LayoutDirection,
        gap: f32,
    ) -> Result<(), HostError>;

    /// Moves the node under `new_parent`, appended after its existing
    /// children.
    fn reparent(&mut self, id: NodeId, new_parent: NodeId) -> Result<(), HostError>;

    /// Removes the node and its entire subtree, invalidating all their
    /// handles.
    fn remove_node(&mut self, id: NodeId) -> Result<(), HostError>;

    // ----- Geometry primitives ----------------------------------------------

    /// Strips all strokes painted directly on the node and returns how
    /// many were removed.
    fn clear_strokes(&mut self, id: NodeId) -> usize;

    /// Converts the node's strokes to filled geometry.
    ///
    /// Returns the replacement node, or `None` when the node has nothing
    /// to outline. On `Some`, the original handle is dead and the result
    /// may itself still carry strokes the host could not absorb in one
    /// application.
    fn outline_stroke(&mut self, id: NodeId) -> Result<Option<NodeId>, HostError>;

    /// Merges the given nodes into a single vector under `parent`.
    ///
    /// All source handles are dead afterwards.
    fn flatten(&mut self, ids: &[NodeId], parent: NodeId) -> Result<NodeId, HostError>;

    /// Wraps the given frames into one variant set under `parent`.
    ///
    /// The frames survive as children of the returned set.
    fn combine_as_variants(&mut self, ids: &[NodeId], parent: NodeId)
    -> Result<NodeId, HostError>;
}

/// Collects the subtree below `root` in paint order, excluding `root`
/// itself.
pub fn descendants<H: HostDocument + ?Sized>(doc: &H, root: NodeId) -> Vec<NodeId> {
    let mut out = Vec::new();
    let mut stack = doc.children(root);
    stack.reverse();
    while let Some(id) = stack.pop() {
        out.push(id);
        let mut kids = doc.children(id);
        kids.reverse();
        stack.append(&mut kids);
    }
    out
}

// ============================================================================
// Tests
// ============================================================================
