//! Stroke and shape normalization for a single variant frame.
//!
//! Icon geometry arrives in whatever form the markup parser produced:
//! stroked paths, nested groups, leftover frames. This pass reduces a
//! frame's content to fill-only geometry in three steps:
//!
//! 1. repeated stroke outlining until no stroked node remains, capped at
//!    [`MAX_OUTLINE_PASSES`] because some hosts expose new stroked
//!    geometry each time a composite is outlined,
//! 2. a single flatten of the frame's content into one vector,
//! 3. an unconditional stroke strip over everything left.
//!
//! Steps 1 and 2 are best-effort; a host refusing either is logged and
//! tolerated. Step 3 is what actually guarantees the frame ends up
//! stroke-free.

use tracing::{debug, warn};

use crate::host::{HostDocument, NodeId, descendants};

/// Upper bound on outline applications per frame.
pub const MAX_OUTLINE_PASSES: usize = 5;

/// What a normalization pass did to a frame.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct GeometryOutcome {
    /// Outline passes that ran because stroked nodes were present.
    pub outline_passes: usize,
    /// Nodes successfully converted by the outline primitive.
    pub outlined_nodes: usize,
    /// Whether the frame's content was merged into a single vector.
    pub flattened: bool,
    /// Strokes removed by the final strip, frame border included.
    pub stripped_strokes: usize,
}

/// Normalizes the geometry inside `frame` until it carries no strokes.
///
/// Never fails; host refusals degrade the result but the stroke-free
/// guarantee holds regardless.
pub fn normalize_geometry<H: HostDocument>(doc: &mut H, frame: NodeId) -> GeometryOutcome {
    let mut outcome = GeometryOutcome::default();

    for _ in 0..MAX_OUTLINE_PASSES {
        // Outlining replaces nodes, so the stroked set is re-resolved
        // from scratch every pass.
        let stroked: Vec<NodeId> = descendants(doc, frame)
            .into_iter()
            .filter(|&id| doc.stroke_count(id) > 0)
            .collect();
        if stroked.is_empty() {
            break;
        }
        outcome.outline_passes += 1;

        for id in stroked {
            // A sibling's outline may have consumed this node already.
            if !doc.is_alive(id) {
                continue;
            }
            match doc.outline_stroke(id) {
                Ok(Some(_)) => outcome.outlined_nodes += 1,
                Ok(None) => {}
                Err(e) => warn!("stroke outlining failed: {}", e),
            }
        }
    }

    let content = doc.children(frame);
    if content.is_empty() {
        debug!("frame has no content to flatten");
    } else {
        match doc.flatten(&content, frame) {
            Ok(_) => outcome.flattened = true,
            Err(e) => warn!("flatten failed, keeping layered content: {}", e),
        }
    }

    // Whatever outlining and flattening left behind is stripped here,
    // including strokes on the frame itself.
    let mut stripped = doc.clear_strokes(frame);
    for id in descendants(doc, frame) {
        stripped += doc.clear_strokes(id);
    }
    outcome.stripped_strokes = stripped;

    debug!(
        "geometry normalized in {} pass(es), {} node(s) outlined, {} stroke(s) stripped",
        outcome.outline_passes, outcome.outlined_nodes, outcome.stripped_strokes
    );
    outcome
}

// ============================================================================
// Tests
// ============================================================================
