//! Error types for the normalization pipeline.
//!
//! Errors come in three tiers matching how far a failure is allowed to
//! propagate:
//!
//! - [`HostError`]: a single host primitive failed. Call sites treat these
//!   as recoverable per-node or per-size events, log them, and move on.
//! - [`ChannelError`]: the round-trip to the external normalization stage
//!   broke. The stage is a single point of contact, so these abort the
//!   invocation.
//! - [`PipelineError`]: the invocation as a whole could not produce output.
//!
//! Per-icon failures (a result carrying an error, an assembly step
//! throwing) never surface as error values at the pipeline boundary; they
//! are counted and reported in the final summary instead.

use thiserror::Error;

use crate::host::NodeId;

// ============================================================================
// PipelineError
// ============================================================================

/// Fatal outcome of a pipeline invocation.
///
/// Every other failure mode is absorbed at the item boundary; only these
/// end the run without output.
#[derive(Debug, Error)]
pub enum PipelineError {
    /// Nothing was selected when the pipeline started.
    #[error("nothing is selected")]
    EmptySelection,

    /// The selection resolved to zero exportable icons, or every export
    /// attempt failed.
    #[error("selection contains no exportable icon content")]
    NoExportableContent,

    /// Every icon in the batch failed normalization or assembly; no
    /// variant sets were produced.
    #[error("no icons survived normalization")]
    AllFailed,

    /// The normalization channel broke during the round-trip.
    #[error(transparent)]
    Channel(#[from] ChannelError),

    /// The host rejected a document operation the pipeline cannot work
    /// around, such as creating the output container.
    #[error(transparent)]
    Host(#[from] HostError),
}

// ============================================================================
// ChannelError
// ============================================================================

/// Failure of the request/response exchange with the normalization stage.
#[derive(Debug, Error)]
pub enum ChannelError {
    /// The other side of the channel is gone. There is no timeout on the
    /// round-trip, so this is the only way a dead stage becomes visible.
    #[error("normalization stage disconnected")]
    Closed,

    /// An inbound message was not valid JSON for the protocol envelope.
    #[error("malformed channel message: {0}")]
    Malformed(#[from] serde_json::Error),

    /// The single expected response carried the wrong message type.
    #[error("unexpected channel message type `{0}`")]
    Unexpected(String),
}

// ============================================================================
// HostError
// ============================================================================

/// Failure of a single host document primitive.
///
/// Hosts may reject malformed input at any mutation; the pipeline treats
/// each of these as a recoverable event scoped to one node, one size, or
/// one icon.
#[derive(Debug, Error)]
pub enum HostError {
    /// The handle refers to a node that no longer exists, usually because
    /// a destructive primitive replaced it.
    #[error("stale node handle {0:?}")]
    StaleNode(NodeId),

    /// Vector markup could not be parsed into a node subtree.
    #[error("markup import failed: {0}")]
    ImportFailed(String),

    /// A node could not be serialized to vector markup.
    #[error("markup export failed: {0}")]
    ExportFailed(String),

    /// The stroke-to-fill primitive rejected a node.
    #[error("stroke outlining failed: {0}")]
    OutlineFailed(String),

    /// The boolean-flatten primitive rejected a node set.
    #[error("flatten failed: {0}")]
    FlattenFailed(String),

    /// The variant-grouping primitive rejected a node set.
    #[error("variant grouping failed: {0}")]
    GroupingFailed(String),

    /// A node could not be moved to a new parent.
    #[error("node move failed: {0}")]
    MoveFailed(String),

    /// A node-creation primitive failed.
    #[error("node creation failed: {0}")]
    CreateFailed(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn channel_error_converts_into_pipeline_error() {
        let err: PipelineError = ChannelError::Closed.into();
        assert!(matches!(err, PipelineError::Channel(ChannelError::Closed)));
    }

    #[test]
    fn error_messages_are_user_readable() {
        assert_eq!(
            PipelineError::EmptySelection.to_string(),
            "nothing is selected"
        );
        assert_eq!(
            ChannelError::Unexpected("normalize-icons".into()).to_string(),
            "unexpected channel message type `normalize-icons`"
        );
        assert!(
            HostError::ImportFailed("bad root".into())
                .to_string()
                .contains("bad root")
        );
    }
}
