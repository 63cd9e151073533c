//! Resolving the user's selection into exportable icon nodes.
//!
//! Two selection styles are supported. Selecting a single plain
//! container (a frame or group full of icons) processes its children;
//! any other selection processes the selected nodes themselves.
//! Composed nodes such as component instances are taken whole rather
//! than unwrapped, and a container whose children all drop out is
//! reconsidered as an icon in its own right. Either way, invisible
//! nodes and nodes the host cannot render are dropped.

use tracing::debug;

use crate::error::PipelineError;
use crate::host::{HostDocument, NodeId};

/// Resolves the current selection into the list of nodes to normalize,
/// in selection order.
pub fn resolve_selection<H: HostDocument>(doc: &H) -> Result<Vec<NodeId>, PipelineError> {
    let selection = doc.selection();
    if selection.is_empty() {
        return Err(PipelineError::EmptySelection);
    }

    if let [only] = selection.as_slice() {
        let unwrappable = doc
            .kind(*only)
            .is_some_and(|kind| kind.is_container() && !kind.is_composed());
        if unwrappable {
            let children = filter_exportable(doc, doc.children(*only));
            if !children.is_empty() {
                debug!("resolved {} icon(s) from the selected container", children.len());
                return Ok(children);
            }
            // Nothing usable inside; fall through and treat the
            // container itself as the candidate.
        }
    }

    let exportable = filter_exportable(doc, selection);
    if exportable.is_empty() {
        return Err(PipelineError::NoExportableContent);
    }
    debug!("resolved {} exportable node(s) from selection", exportable.len());
    Ok(exportable)
}

fn filter_exportable<H: HostDocument>(doc: &H, ids: Vec<NodeId>) -> Vec<NodeId> {
    ids.into_iter()
        .filter(|&id| doc.is_alive(id) && doc.is_visible(id) && doc.supports_export(id))
        .collect()
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::host::MemoryDocument;

    #[test]
    fn empty_selection_is_an_error() {
        let doc = MemoryDocument::new();
        let err = resolve_selection(&doc).unwrap_err();
        assert!(matches!(err, PipelineError::EmptySelection));
    }

    #[test]
    fn lone_container_contributes_its_children() {
        let mut doc = MemoryDocument::new();
        let root = doc.root();
        let tray = doc.create_frame("icons", root, 200.0, 50.0).unwrap();
        let a = doc.add_vector("home", tray);
        let b = doc.add_vector("search", tray);
        doc.set_selection(&[tray]);

        assert_eq!(resolve_selection(&doc).unwrap(), vec![a, b]);
    }

    #[test]
    fn lone_group_contributes_its_children() {
        let mut doc = MemoryDocument::new();
        let root = doc.root();
        let group = doc.add_group("library", root);
        let icon = doc.add_vector("star", group);
        doc.set_selection(&[group]);

        assert_eq!(resolve_selection(&doc).unwrap(), vec![icon]);
    }

    #[test]
    fn lone_instance_is_never_unwrapped() {
        let mut doc = MemoryDocument::new();
        let root = doc.root();
        let instance = doc.add_instance("ic_home", root);
        doc.add_vector("roof", instance);
        doc.add_vector("door", instance);
        doc.set_selection(&[instance]);

        assert_eq!(resolve_selection(&doc).unwrap(), vec![instance]);
    }

    #[test]
    fn multiple_selected_nodes_are_used_directly() {
        let mut doc = MemoryDocument::new();
        let root = doc.root();
        let icon = doc.add_vector("home", root);
        let tray = doc.create_frame("icons", root, 50.0, 50.0).unwrap();
        doc.add_vector("inside", tray);
        doc.set_selection(&[icon, tray]);

        // The container counts as one icon here, not as a tray.
        assert_eq!(resolve_selection(&doc).unwrap(), vec![icon, tray]);
    }

    #[test]
    fn lone_leaf_is_its_own_candidate() {
        let mut doc = MemoryDocument::new();
        let root = doc.root();
        let icon = doc.add_vector("home", root);
        doc.set_selection(&[icon]);

        assert_eq!(resolve_selection(&doc).unwrap(), vec![icon]);
    }

    #[test]
    fn boolean_shapes_are_leaf_candidates() {
        let mut doc = MemoryDocument::new();
        let root = doc.root();
        let shape = doc.add_boolean("union", root);
        let icon = doc.add_vector("home", root);
        doc.set_selection(&[shape, icon]);

        assert_eq!(resolve_selection(&doc).unwrap(), vec![shape, icon]);
    }

    #[test]
    fn invisible_nodes_are_dropped() {
        let mut doc = MemoryDocument::new();
        let root = doc.root();
        let shown = doc.add_vector("shown", root);
        let hidden = doc.add_vector("hidden", root);
        doc.set_visible(hidden, false);
        doc.set_selection(&[shown, hidden]);

        assert_eq!(resolve_selection(&doc).unwrap(), vec![shown]);
    }

    #[test]
    fn unexportable_nodes_are_dropped() {
        let mut doc = MemoryDocument::new();
        let root = doc.root();
        let icon = doc.add_vector("home", root);
        let guide = doc.add_unexportable("guide", root);
        doc.set_selection(&[icon, guide]);

        assert_eq!(resolve_selection(&doc).unwrap(), vec![icon]);
    }

    #[test]
    fn container_with_no_usable_children_is_taken_whole() {
        let mut doc = MemoryDocument::new();
        let root = doc.root();
        let tray = doc.create_frame("icons", root, 50.0, 50.0).unwrap();
        let hidden = doc.add_vector("hidden", tray);
        doc.set_visible(hidden, false);
        doc.set_selection(&[tray]);

        assert_eq!(resolve_selection(&doc).unwrap(), vec![tray]);
    }

    #[test]
    fn hidden_container_of_hidden_content_fails() {
        let mut doc = MemoryDocument::new();
        let root = doc.root();
        let tray = doc.create_frame("icons", root, 50.0, 50.0).unwrap();
        let inner = doc.add_vector("hidden", tray);
        doc.set_visible(inner, false);
        doc.set_visible(tray, false);
        doc.set_selection(&[tray]);

        let err = resolve_selection(&doc).unwrap_err();
        assert!(matches!(err, PipelineError::NoExportableContent));
    }
}
