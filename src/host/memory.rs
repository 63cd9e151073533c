//! Self-contained in-memory host document.
//!
//! [`MemoryDocument`] implements [`HostDocument`] over a slotmap arena.
//! It parses imported markup with `usvg` and synthesizes minimal SVG on
//! export, so a full export / normalize / re-import cycle works without
//! any real editor attached. Tests drive it directly; embedders can use
//! it as a headless document.
//!
//! Fidelity is deliberately shallow. Geometry is tracked as absolute
//! bounding boxes, paints as presence flags, and auto-layout is recorded
//! but never simulated.

use slotmap::SlotMap;
use tracing::debug;

use crate::error::HostError;
use crate::host::{HostDocument, LayoutDirection, NodeId, NodeKind, Rect, descendants};

// ============================================================================
// FaultInjection
// ============================================================================

/// Switches that make individual host primitives fail on demand.
#[derive(Debug, Clone, Default)]
pub struct FaultInjection {
    /// Export fails for any node whose name contains this marker.
    pub export_failure_marker: Option<String>,
    /// All imports fail regardless of markup.
    pub fail_import: bool,
    /// Stroke outlining fails for every node.
    pub fail_outlining: bool,
    /// Reparenting fails for every node.
    pub fail_reparent: bool,
    /// Flattening fails for every node set.
    pub fail_flatten: bool,
    /// Variant grouping fails for every node set.
    pub fail_grouping: bool,
}

// ============================================================================
// NodeData
// ============================================================================

#[derive(Debug, Clone)]
struct NodeData {
    kind: NodeKind,
    name: String,
    parent: Option<NodeId>,
    children: Vec<NodeId>,
    x: f32,
    y: f32,
    width: f32,
    height: f32,
    visible: bool,
    exportable: bool,
    strokes: usize,
    has_fill: bool,
    clips_content: bool,
    layout: Option<(LayoutDirection, f32)>,
    /// How many outline applications this node needs before its strokes
    /// are fully absorbed into fills.
    outline_depth: usize,
}

impl NodeData {
    fn new(kind: NodeKind, name: impl Into<String>) -> Self {
        Self {
            kind,
            name: name.into(),
            parent: None,
            children: Vec::new(),
            x: 0.0,
            y: 0.0,
            width: 0.0,
            height: 0.0,
            visible: true,
            exportable: !matches!(kind, NodeKind::Other),
            strokes: 0,
            has_fill: false,
            clips_content: false,
            layout: None,
            outline_depth: 1,
        }
    }
}

// ============================================================================
// MemoryDocument
// ============================================================================

/// An in-memory [`HostDocument`] backed by a slotmap arena.
pub struct MemoryDocument {
    nodes: SlotMap<NodeId, NodeData>,
    root: NodeId,
    selection: Vec<NodeId>,
    focused: Vec<NodeId>,
    notifications: Vec<String>,
    faults: FaultInjection,
}

impl MemoryDocument {
    /// Creates an empty document with a single page node as root.
    pub fn new() -> Self {
        let mut nodes = SlotMap::with_key();
        let mut page = NodeData::new(NodeKind::Frame, "Page");
        page.width = 1920.0;
        page.height = 1080.0;
        let root = nodes.insert(page);

        Self {
            nodes,
            root,
            selection: Vec::new(),
            focused: Vec::new(),
            notifications: Vec::new(),
            faults: FaultInjection::default(),
        }
    }

    /// Mutable access to the fault switches.
    pub fn faults_mut(&mut self) -> &mut FaultInjection {
        &mut self.faults
    }

    // ----- Scene construction -----------------------------------------------

    /// Adds a fill-only vector leaf.
    pub fn add_vector(&mut self, name: impl Into<String>, parent: NodeId) -> NodeId {
        let id = self.insert_node(NodeKind::Vector, name, parent);
        let node = &mut self.nodes[id];
        node.has_fill = true;
        node.width = 16.0;
        node.height = 16.0;
        id
    }

    /// Adds a vector leaf carrying the given number of strokes.
    pub fn add_stroked_vector(
        &mut self,
        name: impl Into<String>,
        parent: NodeId,
        strokes: usize,
    ) -> NodeId {
        let id = self.add_vector(name, parent);
        self.nodes[id].strokes = strokes;
        id
    }

    pub fn add_group(&mut self, name: impl Into<String>, parent: NodeId) -> NodeId {
        self.insert_node(NodeKind::Group, name, parent)
    }

    /// Adds a placed component instance.
    pub fn add_instance(&mut self, name: impl Into<String>, parent: NodeId) -> NodeId {
        let id = self.insert_node(NodeKind::Instance, name, parent);
        let node = &mut self.nodes[id];
        node.width = 24.0;
        node.height = 24.0;
        id
    }

    /// Adds a boolean combination of shapes as a filled leaf.
    pub fn add_boolean(&mut self, name: impl Into<String>, parent: NodeId) -> NodeId {
        let id = self.insert_node(NodeKind::Boolean, name, parent);
        let node = &mut self.nodes[id];
        node.has_fill = true;
        node.width = 16.0;
        node.height = 16.0;
        id
    }

    /// Adds a node the host cannot render to markup.
    pub fn add_unexportable(&mut self, name: impl Into<String>, parent: NodeId) -> NodeId {
        self.insert_node(NodeKind::Other, name, parent)
    }

    pub fn set_visible(&mut self, id: NodeId, visible: bool) {
        if let Some(node) = self.nodes.get_mut(id) {
            node.visible = visible;
        }
    }

    pub fn set_exportable(&mut self, id: NodeId, exportable: bool) {
        if let Some(node) = self.nodes.get_mut(id) {
            node.exportable = exportable;
        }
    }

    /// Overrides the number of strokes painted on a node.
    pub fn set_strokes(&mut self, id: NodeId, strokes: usize) {
        if let Some(node) = self.nodes.get_mut(id) {
            node.strokes = strokes;
        }
    }

    /// Makes a node require several outline applications before its
    /// strokes are gone, imitating hosts where one application exposes
    /// further stroked geometry.
    pub fn set_outline_depth(&mut self, id: NodeId, depth: usize) {
        if let Some(node) = self.nodes.get_mut(id) {
            node.outline_depth = depth.max(1);
        }
    }

    pub fn set_bounds(&mut self, id: NodeId, rect: Rect) {
        if let Some(node) = self.nodes.get_mut(id) {
            node.x = rect.x;
            node.y = rect.y;
            node.width = rect.width;
            node.height = rect.height;
        }
    }

    // ----- Observation ------------------------------------------------------

    /// Messages shown to the user so far, oldest first.
    pub fn notifications(&self) -> &[String] {
        &self.notifications
    }

    /// Nodes the viewport was last focused on.
    pub fn focused(&self) -> &[NodeId] {
        self.focused.as_slice()
    }

    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.nodes.get(id).and_then(|node| node.parent)
    }

    /// Auto-layout settings recorded for the node, if any.
    pub fn layout(&self, id: NodeId) -> Option<(LayoutDirection, f32)> {
        self.nodes.get(id).and_then(|node| node.layout)
    }

    pub fn clips_content(&self, id: NodeId) -> bool {
        self.nodes.get(id).is_some_and(|node| node.clips_content)
    }

    pub fn has_fill(&self, id: NodeId) -> bool {
        self.nodes.get(id).is_some_and(|node| node.has_fill)
    }

    /// Total number of live nodes, the root included.
    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    /// Strokes on the node and everything below it.
    pub fn total_strokes(&self, id: NodeId) -> usize {
        if !self.nodes.contains_key(id) {
            return 0;
        }
        let mut sum = self.stroke_count(id);
        for child in descendants(self, id) {
            sum += self.stroke_count(child);
        }
        sum
    }

    // ----- Internals --------------------------------------------------------

    fn insert_node(&mut self, kind: NodeKind, name: impl Into<String>, parent: NodeId) -> NodeId {
        let (px, py) = {
            let parent_node = &self.nodes[parent];
            (parent_node.x, parent_node.y)
        };
        let mut data = NodeData::new(kind, name);
        data.parent = Some(parent);
        data.x = px;
        data.y = py;
        let id = self.nodes.insert(data);
        self.nodes[parent].children.push(id);
        id
    }

    fn ensure_alive(&self, id: NodeId) -> Result<(), HostError> {
        if self.nodes.contains_key(id) {
            Ok(())
        } else {
            Err(HostError::StaleNode(id))
        }
    }

    fn subtree_has_fill(&self, id: NodeId) -> bool {
        if self.nodes.get(id).is_some_and(|node| node.has_fill) {
            return true;
        }
        descendants(self, id)
            .into_iter()
            .any(|child| self.nodes.get(child).is_some_and(|node| node.has_fill))
    }

    fn union_bounds(&self, ids: &[NodeId]) -> Option<Rect> {
        let mut bounds: Option<Rect> = None;
        for &id in ids {
            if let Some(rect) = self.bounding_box(id) {
                bounds = Some(match bounds {
                    Some(current) => current.union(rect),
                    None => rect,
                });
            }
        }
        bounds
    }

    /// Mirrors a parsed markup group into the arena.
    fn mirror_group(&mut self, group: &usvg::Group, parent: NodeId) {
        for child in group.children() {
            match child {
                usvg::Node::Group(nested) => {
                    let id = self.insert_node(NodeKind::Group, "group", parent);
                    self.mirror_group(nested, id);
                }
                usvg::Node::Path(path) => {
                    let id = self.insert_node(NodeKind::Vector, "path", parent);
                    let bbox = child.abs_bounding_box();
                    let node = &mut self.nodes[id];
                    node.strokes = usize::from(path.stroke().is_some());
                    node.has_fill = path.fill().is_some();
                    node.x = bbox.x();
                    node.y = bbox.y();
                    node.width = bbox.width();
                    node.height = bbox.height();
                }
                _ => {
                    self.insert_node(NodeKind::Other, "embedded", parent);
                }
            }
        }
    }

    fn push_subtree_markup(&self, id: NodeId, origin: (f32, f32), out: &mut String) {
        let Some(node) = self.nodes.get(id) else {
            return;
        };
        if !node.visible {
            return;
        }
        match node.kind {
            NodeKind::Vector | NodeKind::Boolean | NodeKind::Text => {
                let x = node.x - origin.0;
                let y = node.y - origin.1;
                let width = node.width.max(1.0);
                let height = node.height.max(1.0);
                let filled = node.has_fill || node.kind == NodeKind::Text;
                let fill = if filled { "#000" } else { "none" };
                if !filled && node.strokes == 0 {
                    return;
                }
                out.push_str(&format!(
                    r#"<rect x="{x}" y="{y}" width="{width}" height="{height}" fill="{fill}""#
                ));
                if node.strokes > 0 {
                    out.push_str(r##" stroke="#000" stroke-width="1""##);
                }
                out.push_str("/>");
            }
            _ => {
                if node.children.is_empty() {
                    return;
                }
                out.push_str("<g>");
                for &child in &node.children {
                    self.push_subtree_markup(child, origin, out);
                }
                out.push_str("</g>");
            }
        }
    }
}

impl Default for MemoryDocument {
    fn default() -> Self {
        Self::new()
    }
}

// ============================================================================
// HostDocument implementation
// ============================================================================

impl HostDocument for MemoryDocument {
    fn root(&self) -> NodeId {
        self.root
    }

    fn is_alive(&self, id: NodeId) -> bool {
        self.nodes.contains_key(id)
    }

    fn kind(&self, id: NodeId) -> Option<NodeKind> {
        self.nodes.get(id).map(|node| node.kind)
    }

    fn name(&self, id: NodeId) -> Option<String> {
        self.nodes.get(id).map(|node| node.name.clone())
    }

    fn is_visible(&self, id: NodeId) -> bool {
        self.nodes.get(id).is_some_and(|node| node.visible)
    }

    fn supports_export(&self, id: NodeId) -> bool {
        self.nodes.get(id).is_some_and(|node| node.exportable)
    }

    fn children(&self, id: NodeId) -> Vec<NodeId> {
        self.nodes
            .get(id)
            .map(|node| node.children.clone())
            .unwrap_or_default()
    }

    fn stroke_count(&self, id: NodeId) -> usize {
        self.nodes.get(id).map(|node| node.strokes).unwrap_or(0)
    }

    fn bounding_box(&self, id: NodeId) -> Option<Rect> {
        let node = self.nodes.get(id)?;
        match node.kind {
            // Groups have no intrinsic size, only their contents do.
            NodeKind::Group => self.union_bounds(&node.children),
            _ => Some(Rect::new(node.x, node.y, node.width, node.height)),
        }
    }

    fn selection(&self) -> Vec<NodeId> {
        self.selection
            .iter()
            .copied()
            .filter(|&id| self.is_alive(id))
            .collect()
    }

    fn set_selection(&mut self, ids: &[NodeId]) {
        self.selection = ids
            .iter()
            .copied()
            .filter(|&id| self.is_alive(id))
            .collect();
    }

    fn focus_viewport(&mut self, ids: &[NodeId]) {
        self.focused = ids
            .iter()
            .copied()
            .filter(|&id| self.is_alive(id))
            .collect();
    }

    fn notify(&mut self, message: &str) {
        self.notifications.push(message.to_string());
    }

    fn export_markup(&self, id: NodeId) -> Result<String, HostError> {
        self.ensure_alive(id)?;
        let node = &self.nodes[id];
        if let Some(marker) = &self.faults.export_failure_marker {
            if node.name.contains(marker.as_str()) {
                return Err(HostError::ExportFailed(format!(
                    "failed to render `{}`",
                    node.name
                )));
            }
        }
        if !node.exportable {
            return Err(HostError::ExportFailed(format!(
                "`{}` has no renderable content",
                node.name
            )));
        }

        let bounds = self
            .bounding_box(id)
            .unwrap_or(Rect::new(node.x, node.y, 1.0, 1.0));
        let width = bounds.width.max(1.0);
        let height = bounds.height.max(1.0);

        let mut body = String::new();
        if matches!(node.kind, NodeKind::Vector | NodeKind::Boolean | NodeKind::Text) {
            self.push_subtree_markup(id, (bounds.x, bounds.y), &mut body);
        } else {
            for &child in &node.children {
                self.push_subtree_markup(child, (bounds.x, bounds.y), &mut body);
            }
        }

        Ok(format!(
            r#"<svg xmlns="http://www.w3.org/2000/svg" width="{width}" height="{height}" viewBox="0 0 {width} {height}">{body}</svg>"#
        ))
    }

    fn import_markup(&mut self, markup: &str, parent: NodeId) -> Result<NodeId, HostError> {
        self.ensure_alive(parent)?;
        if self.faults.fail_import {
            return Err(HostError::ImportFailed("injected import failure".into()));
        }

        let tree = usvg::Tree::from_str(markup, &usvg::Options::default())
            .map_err(|e| HostError::ImportFailed(e.to_string()))?;

        let wrapper = self.insert_node(NodeKind::Frame, "markup", parent);
        let size = tree.size();
        {
            let node = &mut self.nodes[wrapper];
            node.width = size.width();
            node.height = size.height();
        }
        self.mirror_group(tree.root(), wrapper);
        debug!(
            "imported markup as {} node(s)",
            descendants(self, wrapper).len() + 1
        );
        Ok(wrapper)
    }

    fn create_frame(
        &mut self,
        name: &str,
        parent: NodeId,
        width: f32,
        height: f32,
    ) -> Result<NodeId, HostError> {
        self.ensure_alive(parent)?;
        if !(width.is_finite() && height.is_finite()) || width <= 0.0 || height <= 0.0 {
            return Err(HostError::CreateFailed(format!(
                "frame `{name}` has invalid size {width}x{height}"
            )));
        }
        let id = self.insert_node(NodeKind::Frame, name, parent);
        let node = &mut self.nodes[id];
        node.width = width;
        node.height = height;
        node.has_fill = true;
        Ok(id)
    }

    fn create_text(
        &mut self,
        content: &str,
        parent: NodeId,
        font_size: f32,
    ) -> Result<NodeId, HostError> {
        self.ensure_alive(parent)?;
        if !font_size.is_finite() || font_size <= 0.0 {
            return Err(HostError::CreateFailed(format!(
                "invalid font size {font_size}"
            )));
        }
        let id = self.insert_node(NodeKind::Text, content, parent);
        let node = &mut self.nodes[id];
        node.has_fill = true;
        node.width = font_size * 0.6 * content.chars().count().max(1) as f32;
        node.height = font_size;
        Ok(id)
    }

    fn set_name(&mut self, id: NodeId, name: &str) -> Result<(), HostError> {
        self.ensure_alive(id)?;
        self.nodes[id].name = name.to_string();
        Ok(())
    }

    fn set_position(&mut self, id: NodeId, x: f32, y: f32) -> Result<(), HostError> {
        self.ensure_alive(id)?;
        let (dx, dy) = {
            let node = &self.nodes[id];
            (x - node.x, y - node.y)
        };
        let mut targets = vec![id];
        targets.extend(descendants(self, id));
        for target in targets {
            let node = &mut self.nodes[target];
            node.x += dx;
            node.y += dy;
        }
        Ok(())
    }

    fn set_clips_content(&mut self, id: NodeId, clips: bool) -> Result<(), HostError> {
        self.ensure_alive(id)?;
        self.nodes[id].clips_content = clips;
        Ok(())
    }

    fn clear_fills(&mut self, id: NodeId) -> Result<(), HostError> {
        self.ensure_alive(id)?;
        self.nodes[id].has_fill = false;
        Ok(())
    }

    fn set_layout(
        &mut self,
        id: NodeId,
        direction: LayoutDirection,
        gap: f32,
    ) -> Result<(), HostError> {
        self.ensure_alive(id)?;
        self.nodes[id].layout = Some((direction, gap));
        Ok(())
    }

    fn reparent(&mut self, id: NodeId, new_parent: NodeId) -> Result<(), HostError> {
        self.ensure_alive(id)?;
        self.ensure_alive(new_parent)?;
        if self.faults.fail_reparent {
            return Err(HostError::MoveFailed("injected reparent failure".into()));
        }
        if id == new_parent || descendants(self, id).contains(&new_parent) {
            return Err(HostError::MoveFailed(
                "cannot move a node into its own subtree".into(),
            ));
        }
        let Some(old_parent) = self.nodes[id].parent else {
            return Err(HostError::MoveFailed("cannot move the document root".into()));
        };
        self.nodes[old_parent].children.retain(|&child| child != id);
        self.nodes[new_parent].children.push(id);
        self.nodes[id].parent = Some(new_parent);
        Ok(())
    }

    fn remove_node(&mut self, id: NodeId) -> Result<(), HostError> {
        self.ensure_alive(id)?;
        let Some(parent) = self.nodes[id].parent else {
            return Err(HostError::MoveFailed(
                "cannot remove the document root".into(),
            ));
        };
        self.nodes[parent].children.retain(|&child| child != id);
        for child in descendants(self, id) {
            self.nodes.remove(child);
        }
        self.nodes.remove(id);
        Ok(())
    }

    fn clear_strokes(&mut self, id: NodeId) -> usize {
        let Some(node) = self.nodes.get_mut(id) else {
            return 0;
        };
        std::mem::take(&mut node.strokes)
    }

    fn outline_stroke(&mut self, id: NodeId) -> Result<Option<NodeId>, HostError> {
        self.ensure_alive(id)?;
        if self.faults.fail_outlining {
            return Err(HostError::OutlineFailed("injected outline failure".into()));
        }

        let (strokes, depth, parent, name) = {
            let node = &self.nodes[id];
            (
                node.strokes,
                node.outline_depth,
                node.parent,
                node.name.clone(),
            )
        };
        if strokes == 0 {
            return Ok(None);
        }
        let Some(parent) = parent else {
            return Err(HostError::OutlineFailed(
                "cannot outline the document root".into(),
            ));
        };

        // The replacement takes the original's slot in paint order.
        let index = self.nodes[parent]
            .children
            .iter()
            .position(|&child| child == id);
        let bounds = self
            .bounding_box(id)
            .unwrap_or(Rect::new(0.0, 0.0, 1.0, 1.0));
        self.remove_node(id)?;

        let replacement = self.insert_node(NodeKind::Vector, name, parent);
        {
            let node = &mut self.nodes[replacement];
            node.x = bounds.x;
            node.y = bounds.y;
            node.width = bounds.width;
            node.height = bounds.height;
            node.has_fill = true;
            // One application absorbs the strokes only when the depth is
            // exhausted; otherwise the result is stroked again.
            node.strokes = if depth <= 1 { 0 } else { strokes };
            node.outline_depth = depth.saturating_sub(1).max(1);
        }
        if let Some(index) = index {
            let children = &mut self.nodes[parent].children;
            children.pop();
            children.insert(index, replacement);
        }
        Ok(Some(replacement))
    }

    fn flatten(&mut self, ids: &[NodeId], parent: NodeId) -> Result<NodeId, HostError> {
        self.ensure_alive(parent)?;
        if self.faults.fail_flatten {
            return Err(HostError::FlattenFailed("injected flatten failure".into()));
        }
        if ids.is_empty() {
            return Err(HostError::FlattenFailed("nothing to flatten".into()));
        }
        for &id in ids {
            self.ensure_alive(id)?;
        }

        let bounds = self
            .union_bounds(ids)
            .unwrap_or(Rect::new(0.0, 0.0, 1.0, 1.0));
        // Strokes the sources still carried survive the merge.
        let strokes: usize = ids.iter().map(|&id| self.total_strokes(id)).sum();
        let has_fill = ids.iter().any(|&id| self.subtree_has_fill(id));
        for &id in ids {
            self.remove_node(id)?;
        }

        let merged = self.insert_node(NodeKind::Vector, "flattened", parent);
        let node = &mut self.nodes[merged];
        node.x = bounds.x;
        node.y = bounds.y;
        node.width = bounds.width;
        node.height = bounds.height;
        node.strokes = strokes;
        node.has_fill = has_fill;
        Ok(merged)
    }

    fn combine_as_variants(
        &mut self,
        ids: &[NodeId],
        parent: NodeId,
    ) -> Result<NodeId, HostError> {
        self.ensure_alive(parent)?;
        if self.faults.fail_grouping {
            return Err(HostError::GroupingFailed(
                "injected grouping failure".into(),
            ));
        }
        if ids.is_empty() {
            return Err(HostError::GroupingFailed("nothing to combine".into()));
        }
        for &id in ids {
            self.ensure_alive(id)?;
        }

        let set = self.insert_node(NodeKind::VariantSet, "variants", parent);
        for &id in ids {
            self.reparent(id, set)?;
        }
        if let Some(bounds) = self.union_bounds(ids) {
            let node = &mut self.nodes[set];
            node.x = bounds.x;
            node.y = bounds.y;
            node.width = bounds.width;
            node.height = bounds.height;
        }
        Ok(set)
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn doc_with_icon() -> (MemoryDocument, NodeId) {
        let mut doc = MemoryDocument::new();
        let root = doc.root();
        let frame = doc.create_frame("home", root, 24.0, 24.0).unwrap();
        doc.add_stroked_vector("ring", frame, 1);
        doc.add_vector("dot", frame);
        (doc, frame)
    }

    #[test]
    fn descendants_walk_in_paint_order() {
        let mut doc = MemoryDocument::new();
        let root = doc.root();
        let group = doc.add_group("g", root);
        let a = doc.add_vector("a", group);
        let b = doc.add_vector("b", root);

        assert_eq!(descendants(&doc, root), vec![group, a, b]);
    }

    #[test]
    fn export_then_import_preserves_stroke_presence() {
        let (doc, frame) = doc_with_icon();
        let markup = doc.export_markup(frame).unwrap();
        assert!(markup.contains("stroke=\"#000\""));

        let mut doc = doc;
        let root = doc.root();
        let wrapper = doc.import_markup(&markup, root).unwrap();
        assert_eq!(doc.total_strokes(wrapper), 1);
    }

    #[test]
    fn import_mirrors_nested_groups() {
        let mut doc = MemoryDocument::new();
        let root = doc.root();
        let markup = r##"<svg xmlns="http://www.w3.org/2000/svg" width="24" height="24">
            <g><rect width="10" height="10" fill="#f00"/></g>
            <rect width="8" height="8" fill="none" stroke="#000"/>
        </svg>"##;

        let wrapper = doc.import_markup(markup, root).unwrap();
        assert_eq!(doc.kind(wrapper), Some(NodeKind::Frame));
        assert_eq!(doc.total_strokes(wrapper), 1);

        let vectors = descendants(&doc, wrapper)
            .into_iter()
            .filter(|&id| doc.kind(id) == Some(NodeKind::Vector))
            .count();
        assert_eq!(vectors, 2);
    }

    #[test]
    fn import_rejects_malformed_markup() {
        let mut doc = MemoryDocument::new();
        let root = doc.root();
        let err = doc.import_markup("<svg><unclosed", root).unwrap_err();
        assert!(matches!(err, HostError::ImportFailed(_)));
    }

    #[test]
    fn export_fails_for_marked_nodes() {
        let (mut doc, frame) = doc_with_icon();
        doc.faults_mut().export_failure_marker = Some("home".into());

        let err = doc.export_markup(frame).unwrap_err();
        assert!(matches!(err, HostError::ExportFailed(_)));
    }

    #[test]
    fn outline_replaces_the_node_and_kills_its_handle() {
        let mut doc = MemoryDocument::new();
        let root = doc.root();
        let vector = doc.add_stroked_vector("ring", root, 2);

        let replacement = doc.outline_stroke(vector).unwrap().unwrap();
        assert!(!doc.is_alive(vector));
        assert!(doc.is_alive(replacement));
        assert_eq!(doc.stroke_count(replacement), 0);
        assert!(doc.has_fill(replacement));
    }

    #[test]
    fn outline_without_strokes_is_a_no_op() {
        let mut doc = MemoryDocument::new();
        let root = doc.root();
        let vector = doc.add_vector("dot", root);

        assert!(doc.outline_stroke(vector).unwrap().is_none());
        assert!(doc.is_alive(vector));
    }

    #[test]
    fn outline_depth_requires_repeated_applications() {
        let mut doc = MemoryDocument::new();
        let root = doc.root();
        let vector = doc.add_stroked_vector("ring", root, 1);
        doc.set_outline_depth(vector, 3);

        let second = doc.outline_stroke(vector).unwrap().unwrap();
        assert_eq!(doc.stroke_count(second), 1);
        let third = doc.outline_stroke(second).unwrap().unwrap();
        assert_eq!(doc.stroke_count(third), 1);
        let done = doc.outline_stroke(third).unwrap().unwrap();
        assert_eq!(doc.stroke_count(done), 0);
    }

    #[test]
    fn flatten_merges_and_keeps_residual_strokes() {
        let mut doc = MemoryDocument::new();
        let root = doc.root();
        let frame = doc.create_frame("icon", root, 24.0, 24.0).unwrap();
        let a = doc.add_stroked_vector("a", frame, 1);
        let b = doc.add_vector("b", frame);
        doc.set_bounds(a, Rect::new(0.0, 0.0, 10.0, 10.0));
        doc.set_bounds(b, Rect::new(5.0, 5.0, 10.0, 10.0));

        let merged = doc.flatten(&[a, b], frame).unwrap();
        assert!(!doc.is_alive(a));
        assert!(!doc.is_alive(b));
        assert_eq!(doc.kind(merged), Some(NodeKind::Vector));
        assert_eq!(doc.stroke_count(merged), 1);
        assert_eq!(
            doc.bounding_box(merged),
            Some(Rect::new(0.0, 0.0, 15.0, 15.0))
        );
    }

    #[test]
    fn combine_as_variants_wraps_the_frames() {
        let mut doc = MemoryDocument::new();
        let root = doc.root();
        let small = doc.create_frame("icon_16", root, 16.0, 16.0).unwrap();
        let large = doc.create_frame("icon_32", root, 32.0, 32.0).unwrap();

        let set = doc.combine_as_variants(&[small, large], root).unwrap();
        assert_eq!(doc.kind(set), Some(NodeKind::VariantSet));
        assert_eq!(doc.children(set), vec![small, large]);
        assert_eq!(doc.parent(small), Some(set));
    }

    #[test]
    fn remove_node_invalidates_the_subtree() {
        let mut doc = MemoryDocument::new();
        let root = doc.root();
        let group = doc.add_group("g", root);
        let leaf = doc.add_vector("leaf", group);

        doc.remove_node(group).unwrap();
        assert!(!doc.is_alive(group));
        assert!(!doc.is_alive(leaf));
        assert!(doc.children(root).is_empty());
    }

    #[test]
    fn clear_strokes_reports_what_it_removed() {
        let mut doc = MemoryDocument::new();
        let root = doc.root();
        let vector = doc.add_stroked_vector("ring", root, 2);

        assert_eq!(doc.clear_strokes(vector), 2);
        assert_eq!(doc.clear_strokes(vector), 0);
    }

    #[test]
    fn selection_drops_dead_handles() {
        let mut doc = MemoryDocument::new();
        let root = doc.root();
        let a = doc.add_vector("a", root);
        let b = doc.add_vector("b", root);
        doc.set_selection(&[a, b]);

        doc.remove_node(a).unwrap();
        assert_eq!(doc.selection(), vec![b]);
    }

    #[test]
    fn moving_a_node_shifts_its_subtree() {
        let mut doc = MemoryDocument::new();
        let root = doc.root();
        let frame = doc.create_frame("icon", root, 24.0, 24.0).unwrap();
        let leaf = doc.add_vector("leaf", frame);
        doc.set_bounds(frame, Rect::new(0.0, 0.0, 24.0, 24.0));
        doc.set_bounds(leaf, Rect::new(4.0, 4.0, 16.0, 16.0));

        doc.set_position(frame, 100.0, 50.0).unwrap();
        let moved = doc.bounding_box(leaf).unwrap();
        assert_eq!((moved.x, moved.y), (104.0, 54.0));
    }

    #[test]
    fn mutations_reject_stale_handles() {
        let mut doc = MemoryDocument::new();
        let root = doc.root();
        let vector = doc.add_vector("a", root);
        doc.remove_node(vector).unwrap();

        let err = doc.set_name(vector, "b").unwrap_err();
        assert!(matches!(err, HostError::StaleNode(_)));
    }

    #[test]
    fn reparent_rejects_cycles() {
        let mut doc = MemoryDocument::new();
        let root = doc.root();
        let outer = doc.add_group("outer", root);
        let inner = doc.add_group("inner", outer);

        let err = doc.reparent(outer, inner).unwrap_err();
        assert!(matches!(err, HostError::MoveFailed(_)));
    }
}
