//! Core data model for icon normalization.
//!
//! This module defines the unit of work ([`IconSource`]), the per-icon
//! outcome returned by the normalization stage ([`NormalizationResult`]),
//! the fixed set of output sizes ([`TargetSize`]), and the naming rules
//! shared by every variant set.

use std::collections::BTreeMap;
use std::fmt;
use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

/// Display name used when a selected node has an empty or whitespace label.
pub const FALLBACK_ICON_NAME: &str = "icon";

// ============================================================================
// TargetSize
// ============================================================================

/// One of the fixed output sizes every variant set contains.
///
/// The set is a system-wide constant: every successfully normalized icon
/// becomes exactly one node per size, in [`TargetSize::ALL`] order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum TargetSize {
    /// 16 density-independent pixels.
    Small,
    /// 24 density-independent pixels.
    Medium,
    /// 32 density-independent pixels.
    Large,
}

impl TargetSize {
    /// All target sizes, smallest first. Variant sets are built in this order.
    pub const ALL: [TargetSize; 3] = [TargetSize::Small, TargetSize::Medium, TargetSize::Large];

    /// The square side length in density-independent pixels.
    pub const fn px(self) -> u32 {
        match self {
            TargetSize::Small => 16,
            TargetSize::Medium => 24,
            TargetSize::Large => 32,
        }
    }

    /// Looks up the size for a pixel value, if it is one of the fixed set.
    pub fn from_px(px: u32) -> Option<TargetSize> {
        TargetSize::ALL.into_iter().find(|size| size.px() == px)
    }
}

impl fmt::Display for TargetSize {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.px())
    }
}

// ============================================================================
// IconSource
// ============================================================================

/// One exported icon: a display name plus its raw vector markup.
///
/// Created by the exporter from one selected node and immutable afterwards.
/// Serializes with camelCase keys because the batch travels over the
/// normalization channel as JSON.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "jsonschema", derive(schemars::JsonSchema))]
#[serde(rename_all = "camelCase")]
pub struct IconSource {
    /// The node's trimmed label, or [`FALLBACK_ICON_NAME`] when empty.
    pub display_name: String,

    /// The exported scalable vector markup, untouched.
    pub raw_markup: String,
}

impl IconSource {
    /// Creates a source from a node label and its exported markup.
    ///
    /// The label is whitespace-trimmed; an empty result falls back to
    /// [`FALLBACK_ICON_NAME`].
    pub fn new(label: impl Into<String>, markup: impl Into<String>) -> Self {
        let label = label.into();
        let trimmed = label.trim();
        let display_name = if trimmed.is_empty() {
            FALLBACK_ICON_NAME.to_string()
        } else {
            trimmed.to_string()
        };
        Self {
            display_name,
            raw_markup: markup.into(),
        }
    }
}

// ============================================================================
// NormalizationResult
// ============================================================================

/// Per-icon outcome returned by the normalization stage.
///
/// `error` non-`None` marks total failure for that icon, in which case
/// `per_size_markup` is not consulted. Otherwise the map is expected to
/// hold one markup string per [`TargetSize`], keyed by pixel size.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "jsonschema", derive(schemars::JsonSchema))]
#[serde(rename_all = "camelCase")]
pub struct NormalizationResult {
    /// Echo of the requested icon's display name.
    pub display_name: String,

    /// Corrected markup per target pixel size. May be absent on failure.
    #[serde(default, with = "size_key_map")]
    #[cfg_attr(feature = "jsonschema", schemars(with = "BTreeMap<String, String>"))]
    pub per_size_markup: BTreeMap<u32, String>,

    /// Failure reason for this icon; `None` means success.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl NormalizationResult {
    /// Creates a successful result with no markup yet.
    pub fn success(display_name: impl Into<String>) -> Self {
        Self {
            display_name: display_name.into(),
            per_size_markup: BTreeMap::new(),
            error: None,
        }
    }

    /// Creates a failed result carrying a reason.
    pub fn failure(display_name: impl Into<String>, reason: impl Into<String>) -> Self {
        Self {
            display_name: display_name.into(),
            per_size_markup: BTreeMap::new(),
            error: Some(reason.into()),
        }
    }

    /// Attaches markup for one target size.
    pub fn with_markup(mut self, size: TargetSize, markup: impl Into<String>) -> Self {
        self.per_size_markup.insert(size.px(), markup.into());
        self
    }

    /// Returns the markup for one target size, if present.
    pub fn markup_for(&self, size: TargetSize) -> Option<&str> {
        self.per_size_markup.get(&size.px()).map(String::as_str)
    }

    /// Returns true if the stage reported failure for this icon.
    pub fn is_failure(&self) -> bool {
        self.error.is_some()
    }
}

/// Codec for the per-size markup map. JSON object keys are strings, so
/// the pixel keys travel in decimal form and are parsed back on the way
/// in.
mod size_key_map {
    use std::collections::BTreeMap;

    use serde::de::{self, Deserializer};
    use serde::ser::Serializer;
    use serde::{Deserialize, Serialize};

    pub fn serialize<S: Serializer>(
        map: &BTreeMap<u32, String>,
        serializer: S,
    ) -> Result<S::Ok, S::Error> {
        let keyed: BTreeMap<String, &String> = map
            .iter()
            .map(|(px, markup)| (px.to_string(), markup))
            .collect();
        keyed.serialize(serializer)
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(
        deserializer: D,
    ) -> Result<BTreeMap<u32, String>, D::Error> {
        BTreeMap::<String, String>::deserialize(deserializer)?
            .into_iter()
            .map(|(px, markup)| {
                px.parse::<u32>()
                    .map(|px| (px, markup))
                    .map_err(|_| de::Error::custom(format!("invalid size key `{px}`")))
            })
            .collect()
    }
}

// ============================================================================
// Variant base naming
// ============================================================================

/// Matches a trailing size suffix: optional `_`/`-` separator, one of the
/// target size numerals, optional unit letters. Case-insensitive.
static SIZE_SUFFIX: LazyLock<Regex> = LazyLock::new(|| {
    let numerals = TargetSize::ALL
        .map(|size| size.px().to_string())
        .join("|");
    Regex::new(&format!(r"(?i)[_-]?(?:{numerals})(?:dp|px)?$")).unwrap()
});

/// Derives the canonical variant-set name from an icon's display name.
///
/// A trailing size suffix such as `_16`, `-24dp`, or a bare `32` is
/// stripped (case-insensitive); a name without one passes through
/// unchanged. The result is also used as the size-node naming prefix.
///
/// # Example
///
/// ```
/// use varico::variant_base_name;
///
/// assert_eq!(variant_base_name("home_24"), "home");
/// assert_eq!(variant_base_name("Search-32DP"), "Search");
/// assert_eq!(variant_base_name("settings"), "settings");
/// ```
pub fn variant_base_name(display_name: &str) -> String {
    let trimmed = display_name.trim();
    let base = SIZE_SUFFIX.replace(trimmed, "");
    let base = base.trim();
    if base.is_empty() {
        FALLBACK_ICON_NAME.to_string()
    } else {
        base.to_string()
    }
}

/// Formats the name of one size node: the base name plus a pixel suffix.
pub fn size_node_name(base: &str, size: TargetSize) -> String {
    format!("{}_{}", base, size.px())
}

// ============================================================================
// Tests
// ============================================================================
