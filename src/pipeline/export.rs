//! Turning resolved nodes into a markup batch.
//!
//! Each node is rendered to SVG markup by the host and paired with its
//! layer name. A node the host refuses to render is logged and skipped
//! rather than failing the batch; only a batch with no survivors at all
//! is an error.

use tracing::warn;

use crate::error::PipelineError;
use crate::host::{HostDocument, NodeId};
use crate::icon::IconSource;

/// Exports every node to markup, skipping individual failures.
pub fn export_batch<H: HostDocument>(
    doc: &H,
    nodes: &[NodeId],
) -> Result<Vec<IconSource>, PipelineError> {
    let mut batch = Vec::with_capacity(nodes.len());
    for &id in nodes {
        let name = doc.name(id).unwrap_or_default();
        match doc.export_markup(id) {
            Ok(markup) => batch.push(IconSource::new(name, markup)),
            Err(e) => warn!("skipping `{}`: {}", name, e),
        }
    }

    if batch.is_empty() {
        return Err(PipelineError::NoExportableContent);
    }
    Ok(batch)
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::host::MemoryDocument;
    use crate::icon::FALLBACK_ICON_NAME;

    #[test]
    fn exports_every_node_in_order() {
        let mut doc = MemoryDocument::new();
        let root = doc.root();
        let a = doc.add_vector("home", root);
        let b = doc.add_vector("search", root);

        let batch = export_batch(&doc, &[a, b]).unwrap();

        assert_eq!(batch.len(), 2);
        assert_eq!(batch[0].display_name, "home");
        assert_eq!(batch[1].display_name, "search");
        assert!(batch[0].raw_markup.starts_with("<svg"));
    }

    #[test]
    fn failing_node_is_skipped_not_fatal() {
        let mut doc = MemoryDocument::new();
        let root = doc.root();
        let good = doc.add_vector("home", root);
        let bad = doc.add_vector("broken", root);
        doc.faults_mut().export_failure_marker = Some("broken".into());

        let batch = export_batch(&doc, &[good, bad]).unwrap();

        assert_eq!(batch.len(), 1);
        assert_eq!(batch[0].display_name, "home");
    }

    #[test]
    fn batch_with_no_survivors_is_an_error() {
        let mut doc = MemoryDocument::new();
        let root = doc.root();
        let a = doc.add_vector("broken-a", root);
        let b = doc.add_vector("broken-b", root);
        doc.faults_mut().export_failure_marker = Some("broken".into());

        let err = export_batch(&doc, &[a, b]).unwrap_err();
        assert!(matches!(err, PipelineError::NoExportableContent));
    }

    #[test]
    fn blank_layer_names_fall_back() {
        let mut doc = MemoryDocument::new();
        let root = doc.root();
        let icon = doc.add_vector("   ", root);

        let batch = export_batch(&doc, &[icon]).unwrap();
        assert_eq!(batch[0].display_name, FALLBACK_ICON_NAME);
    }
}
