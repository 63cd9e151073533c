//! Wire protocol for the normalization channel.
//!
//! The channel speaks JSON envelopes tagged by a `type` field. There are
//! exactly two message types: one outbound batch request and one inbound
//! batch response. No retries, no sequence numbers; a pipeline invocation
//! sends one request and expects one matching response.
//!
//! # JSON Format
//!
//! ```json
//! { "type": "normalize-icons",
//!   "icons": [ { "displayName": "home", "rawMarkup": "<svg .../>" } ] }
//! ```
//!
//! ```json
//! { "type": "normalize-results",
//!   "results": [ { "displayName": "home",
//!                  "perSizeMarkup": { "16": "<svg .../>" } } ] }
//! ```

use serde::{Deserialize, Serialize};

use crate::icon::{IconSource, NormalizationResult};

// ============================================================================
// ChannelMessage
// ============================================================================

/// An envelope travelling over the normalization channel, either direction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "jsonschema", derive(schemars::JsonSchema))]
#[serde(tag = "type", rename_all = "kebab-case")]
pub enum ChannelMessage {
    /// Outbound: the full icon batch, sent exactly once per invocation.
    NormalizeIcons {
        /// Requested icons, in selection order.
        icons: Vec<IconSource>,
    },

    /// Inbound: one result per requested icon, in request order.
    NormalizeResults {
        /// Per-icon outcomes, positionally correlated with the request.
        results: Vec<NormalizationResult>,
    },
}

impl ChannelMessage {
    /// The envelope's `type` tag value.
    pub fn type_name(&self) -> &'static str {
        match self {
            ChannelMessage::NormalizeIcons { .. } => "normalize-icons",
            ChannelMessage::NormalizeResults { .. } => "normalize-results",
        }
    }

    /// Serializes the envelope to a JSON string.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }

    /// Serializes the envelope to a pretty-printed JSON string.
    pub fn to_json_pretty(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    /// Deserializes an envelope from a JSON string.
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }
}

// ============================================================================
// Tests
// ============================================================================
