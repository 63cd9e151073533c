//! Closing out a pipeline run.
//!
//! On success the output container becomes the new selection, the
//! viewport moves to it, and the user gets a one-line summary. When
//! nothing at all was produced the empty output container is removed
//! again and the run ends in [`PipelineError::AllFailed`].

use tracing::{info, warn};

use crate::error::PipelineError;
use crate::host::{HostDocument, NodeId};
use crate::pipeline::assemble::AssembledSet;

/// What a completed pipeline run produced.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PipelineSummary {
    /// Base names of the assembled variant sets, in output order.
    pub created: Vec<String>,
    /// Display names of icons that produced no set.
    pub failed: Vec<String>,
    /// The container frame holding every created set.
    pub container: NodeId,
}

impl PipelineSummary {
    /// One-line summary suitable for a host notification.
    pub fn message(&self) -> String {
        let mut message = format!("Created {}", count(self.created.len(), "icon variant set"));
        if !self.failed.is_empty() {
            message.push_str(&format!(", {} failed", count(self.failed.len(), "icon")));
        }
        message
    }
}

pub(crate) fn count(n: usize, noun: &str) -> String {
    if n == 1 {
        format!("1 {noun}")
    } else {
        format!("{n} {noun}s")
    }
}

/// Reports the outcome of a run and leaves the document tidy.
pub fn report_outcome<H: HostDocument>(
    doc: &mut H,
    container: NodeId,
    sets: &[AssembledSet],
    failed: Vec<String>,
) -> Result<PipelineSummary, PipelineError> {
    if sets.is_empty() {
        if doc.is_alive(container) {
            let _ = doc.remove_node(container);
        }
        warn!("no variant sets were produced");
        doc.notify("No icons could be normalized");
        return Err(PipelineError::AllFailed);
    }

    doc.set_selection(&[container]);
    doc.focus_viewport(&[container]);

    let summary = PipelineSummary {
        created: sets.iter().map(|set| set.base_name.clone()).collect(),
        failed,
        container,
    };
    info!("{}", summary.message());
    doc.notify(&summary.message());
    Ok(summary)
}

// ============================================================================
// Tests
// ============================================================================
