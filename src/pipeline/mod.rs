//! The icon normalization pipeline.
//!
//! A run is one straight pass over the user's selection:
//!
//! 1. [`selection`] resolves the selection into exportable icon nodes,
//! 2. [`export`] renders each node to markup,
//! 3. the batch makes a single round trip through the
//!    [`NormalizationChannel`] to wherever markup optimization runs,
//! 4. [`assemble`] builds a fixed-size variant set per surviving icon
//!    inside a shared output container, normalizing geometry via
//!    [`geometry`],
//! 5. [`report`] selects the output container, focuses the viewport,
//!    and notifies the user.
//!
//! Stages run sequentially on one task; assembly yields to the executor
//! between icons. Failures of individual icons never abort the run, only
//! the errors in [`PipelineError`](crate::error::PipelineError) do, and
//! every abort surfaces as a host notification before it returns.

use tokio::task::yield_now;
use tracing::{info, warn};

use crate::channel::NormalizationChannel;
use crate::error::{HostError, PipelineError};
use crate::host::{HostDocument, LayoutDirection, NodeId, Rect};

pub mod assemble;
pub mod export;
pub mod geometry;
pub mod report;
pub mod selection;

pub use assemble::{AssembledSet, PLACEHOLDER_GLYPH, VARIANT_ITEM_GAP, assemble_variant_set};
pub use export::export_batch;
pub use geometry::{GeometryOutcome, MAX_OUTLINE_PASSES, normalize_geometry};
pub use report::{PipelineSummary, report_outcome};
pub use selection::resolve_selection;

use report::count;

/// Name of the frame that receives every assembled variant set.
pub const OUTPUT_CONTAINER_NAME: &str = "Normalized Icons";

/// Vertical distance between the source selection and the output
/// container.
pub const CONTAINER_OFFSET: f32 = 64.0;

/// Gap between variant sets inside the output container.
pub const CONTAINER_ITEM_GAP: f32 = 32.0;

/// Nominal container size before host layout takes over.
const CONTAINER_INITIAL_SIZE: f32 = 400.0;

// ============================================================================
// IconPipeline
// ============================================================================

/// Drives a full normalization run against a host document.
///
/// The pipeline owns its side of the normalization channel and can run
/// any number of times, once per invocation.
pub struct IconPipeline {
    channel: NormalizationChannel,
}

impl IconPipeline {
    pub fn new(channel: NormalizationChannel) -> Self {
        Self { channel }
    }

    /// Runs the pipeline over the document's current selection.
    ///
    /// Source nodes are left untouched; all output lands in a fresh
    /// container frame positioned below the selection.
    pub async fn run<H: HostDocument>(
        &mut self,
        doc: &mut H,
    ) -> Result<PipelineSummary, PipelineError> {
        let outcome = self.run_stages(doc).await;
        if let Err(error) = &outcome {
            notify_abort(doc, error);
        }
        outcome
    }

    async fn run_stages<H: HostDocument>(
        &mut self,
        doc: &mut H,
    ) -> Result<PipelineSummary, PipelineError> {
        let nodes = resolve_selection(doc)?;
        // The container anchors below what the user selected, which for
        // a lone tray reaches lower than the icons resolved out of it.
        // Captured before anything mutates.
        let anchor = doc
            .selection()
            .iter()
            .filter_map(|&id| doc.bounding_box(id))
            .reduce(Rect::union);
        let batch = export_batch(doc, &nodes)?;

        doc.notify(&format!("Normalizing {}...", count(batch.len(), "icon")));
        info!("normalizing {}", count(batch.len(), "icon"));
        let results = self.channel.round_trip(batch).await?;

        let container = create_output_container(doc, anchor)?;
        let mut sets = Vec::new();
        let mut failed = Vec::new();
        for result in &results {
            if let Some(reason) = &result.error {
                warn!("`{}` failed to normalize: {}", result.display_name, reason);
                failed.push(result.display_name.clone());
            } else {
                match assemble_variant_set(doc, container, result) {
                    Ok(set) => sets.push(set),
                    Err(e) => {
                        warn!("could not assemble `{}`: {}", result.display_name, e);
                        failed.push(result.display_name.clone());
                    }
                }
            }
            // Cooperative yield between icons.
            yield_now().await;
        }

        report_outcome(doc, container, &sets, failed)
    }
}

/// Tells the user why the run stopped. [`PipelineError::AllFailed`] is
/// already announced by [`report_outcome`].
fn notify_abort<H: HostDocument>(doc: &mut H, error: &PipelineError) {
    let message = match error {
        PipelineError::EmptySelection => "Select at least one icon to normalize",
        PipelineError::NoExportableContent => "The selection contains no exportable icons",
        PipelineError::Channel(_) => "The normalization stage is not responding",
        PipelineError::Host(_) => "The document rejected the normalization output",
        PipelineError::AllFailed => return,
    };
    doc.notify(message);
}

fn create_output_container<H: HostDocument>(
    doc: &mut H,
    anchor: Option<Rect>,
) -> Result<NodeId, HostError> {
    let container = doc.create_frame(
        OUTPUT_CONTAINER_NAME,
        doc.root(),
        CONTAINER_INITIAL_SIZE,
        CONTAINER_INITIAL_SIZE,
    )?;
    if let Some(anchor) = anchor {
        doc.set_position(container, anchor.x, anchor.bottom() + CONTAINER_OFFSET)?;
    }
    doc.set_layout(container, LayoutDirection::Vertical, CONTAINER_ITEM_GAP)?;
    Ok(container)
}

// ============================================================================
// Tests
// ============================================================================
