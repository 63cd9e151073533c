//! varico: Icon variant-set normalization for vector documents
//!
//! This crate takes the icons selected in a host vector document, ships
//! their markup through an async normalization channel, and rebuilds
//! each icon as a named variant set with one fixed-size frame per
//! target size (16, 24, and 32 px), all geometry reduced to fills.
//!
//! The surrounding editor is abstracted behind the [`HostDocument`]
//! trait; the bundled [`MemoryDocument`] implements it in memory so the
//! whole round trip runs headless. The markup optimizer itself stays
//! outside the crate: it holds the [`StageEndpoint`] half of the
//! [`NormalizationChannel`] and answers one batch request per run.
//!
//! # Example
//!
//! ```
//! use varico::{
//!     HostDocument, IconPipeline, MemoryDocument, NormalizationChannel,
//!     NormalizationResult, TargetSize,
//! };
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let mut doc = MemoryDocument::new();
//! let root = doc.root();
//! let icon = doc.add_vector("home", root);
//! doc.set_selection(&[icon]);
//!
//! let (channel, mut stage) = NormalizationChannel::pair(8);
//!
//! let runtime = tokio::runtime::Builder::new_current_thread().build()?;
//! let summary = runtime.block_on(async {
//!     // Stand-in for a real markup optimizer: echo every icon back
//!     // at each target size.
//!     let worker = tokio::spawn(async move {
//!         let icons = stage.next_request().await.unwrap().unwrap();
//!         let results = icons
//!             .iter()
//!             .map(|icon| {
//!                 TargetSize::ALL.iter().fold(
//!                     NormalizationResult::success(&icon.display_name),
//!                     |result, &size| result.with_markup(size, icon.raw_markup.clone()),
//!                 )
//!             })
//!             .collect();
//!         stage.respond(results).await.unwrap();
//!     });
//!
//!     let summary = IconPipeline::new(channel).run(&mut doc).await;
//!     worker.await.unwrap();
//!     summary
//! })?;
//!
//! assert_eq!(summary.created, vec!["home"]);
//! # Ok(())
//! # }
//! ```
//!
//! # Wire Format
//!
//! The channel carries JSON envelopes tagged by a `type` field, either
//! `normalize-icons` (the request batch) or `normalize-results` (the
//! response batch). [`ChannelMessage`] defines both shapes; stages that
//! produce envelope JSON themselves can bypass the typed constructors
//! with [`StageEndpoint::respond_raw`].

mod channel;
mod error;
mod host;
mod icon;
mod pipeline;
mod protocol;

pub use channel::{NormalizationChannel, StageEndpoint};
pub use error::{ChannelError, HostError, PipelineError};
pub use host::{
    FaultInjection, HostDocument, LayoutDirection, MemoryDocument, NodeId, NodeKind, Rect,
    descendants,
};
pub use icon::{
    FALLBACK_ICON_NAME, IconSource, NormalizationResult, TargetSize, size_node_name,
    variant_base_name,
};
pub use pipeline::{
    AssembledSet, CONTAINER_ITEM_GAP, CONTAINER_OFFSET, GeometryOutcome, IconPipeline,
    MAX_OUTLINE_PASSES, OUTPUT_CONTAINER_NAME, PLACEHOLDER_GLYPH, PipelineSummary,
    VARIANT_ITEM_GAP, assemble_variant_set, export_batch, normalize_geometry, report_outcome,
    resolve_selection,
};
pub use protocol::ChannelMessage;
