//! Async plumbing between the pipeline and the normalization stage.
//!
//! The pipeline owns a [`NormalizationChannel`] and performs exactly one
//! round trip per invocation: it sends the full icon batch, then suspends
//! until the stage answers with a result batch. The stage side holds a
//! [`StageEndpoint`]; embedders drive it from wherever their markup
//! optimizer runs.
//!
//! Results are correlated with requests by position. A response that is
//! shorter than the request is padded with failure entries, a longer one
//! is truncated, and both conditions are logged.

use tokio::sync::mpsc;
use tracing::{debug, warn};

use crate::error::ChannelError;
use crate::icon::{IconSource, NormalizationResult};
use crate::protocol::ChannelMessage;

// ============================================================================
// NormalizationChannel
// ============================================================================

/// The pipeline-side handle of the normalization channel.
pub struct NormalizationChannel {
    outbound: mpsc::Sender<String>,
    inbound: mpsc::Receiver<String>,
}

impl NormalizationChannel {
    /// Creates a connected channel/endpoint pair with the given buffer
    /// capacity per direction.
    pub fn pair(buffer: usize) -> (NormalizationChannel, StageEndpoint) {
        let (to_stage, from_pipeline) = mpsc::channel(buffer);
        let (to_pipeline, from_stage) = mpsc::channel(buffer);

        let channel = NormalizationChannel {
            outbound: to_stage,
            inbound: from_stage,
        };
        let endpoint = StageEndpoint {
            inbound: from_pipeline,
            outbound: to_pipeline,
        };
        (channel, endpoint)
    }

    /// Sends one batch request and awaits the matching batch response.
    ///
    /// The returned vector always has one entry per requested icon, in
    /// request order. Entries the stage failed to produce come back as
    /// failure results rather than being dropped. A result whose name
    /// disagrees with the request at the same position is kept as sent;
    /// position, not name, is authoritative.
    pub async fn round_trip(
        &mut self,
        icons: Vec<IconSource>,
    ) -> Result<Vec<NormalizationResult>, ChannelError> {
        let requested: Vec<String> = icons
            .iter()
            .map(|icon| icon.display_name.clone())
            .collect();

        let request = ChannelMessage::NormalizeIcons { icons };
        self.outbound
            .send(request.to_json()?)
            .await
            .map_err(|_| ChannelError::Closed)?;
        debug!("sent normalization request for {} icon(s)", requested.len());

        let raw = self.inbound.recv().await.ok_or(ChannelError::Closed)?;
        match ChannelMessage::from_json(&raw)? {
            ChannelMessage::NormalizeResults { results } => {
                debug!("received {} normalization result(s)", results.len());
                Ok(correlate(&requested, results))
            }
            other => Err(ChannelError::Unexpected(other.type_name().to_string())),
        }
    }
}

/// Aligns a response batch with the request batch by position.
fn correlate(
    requested: &[String],
    mut results: Vec<NormalizationResult>,
) -> Vec<NormalizationResult> {
    if results.len() > requested.len() {
        warn!(
            "normalization stage returned {} extra result(s), ignoring them",
            results.len() - requested.len()
        );
        results.truncate(requested.len());
    }

    for (result, name) in results.iter().zip(requested) {
        if result.display_name != *name {
            warn!(
                "result named `{}` arrived where `{}` was expected",
                result.display_name, name
            );
        }
    }

    while results.len() < requested.len() {
        let name = &requested[results.len()];
        warn!("normalization stage returned no result for `{}`", name);
        results.push(NormalizationResult::failure(
            name,
            "icon was dropped by the normalization stage",
        ));
    }

    results
}

// ============================================================================
// StageEndpoint
// ============================================================================

/// The stage-side handle of the normalization channel.
pub struct StageEndpoint {
    inbound: mpsc::Receiver<String>,
    outbound: mpsc::Sender<String>,
}

impl StageEndpoint {
    /// Receives the next batch request.
    ///
    /// Returns `Ok(None)` once the pipeline side has been dropped.
    pub async fn next_request(&mut self) -> Result<Option<Vec<IconSource>>, ChannelError> {
        let Some(raw) = self.inbound.recv().await else {
            return Ok(None);
        };
        match ChannelMessage::from_json(&raw)? {
            ChannelMessage::NormalizeIcons { icons } => Ok(Some(icons)),
            other => Err(ChannelError::Unexpected(other.type_name().to_string())),
        }
    }

    /// Sends a batch of results back to the pipeline side.
    pub async fn respond(
        &mut self,
        results: Vec<NormalizationResult>,
    ) -> Result<(), ChannelError> {
        let response = ChannelMessage::NormalizeResults { results };
        self.respond_raw(response.to_json()?).await
    }

    /// Sends a pre-encoded frame back to the pipeline side.
    ///
    /// Useful when the stage already produces envelope JSON itself.
    pub async fn respond_raw(&mut self, json: impl Into<String>) -> Result<(), ChannelError> {
        self.outbound
            .send(json.into())
            .await
            .map_err(|_| ChannelError::Closed)
    }
}

// ============================================================================
// Tests
// ============================================================================
