//! Building a variant set from one normalization result.
//!
//! Each successfully normalized icon becomes a set of fixed-size frames,
//! one per target size, wrapped into a single variant-set node. The
//! frames are named `{base}_{px}` where the base name is the icon's
//! display name with any existing size suffix stripped, so `home_24`
//! and `home` both produce a set called `home`.
//!
//! Markup that fails to import, or a size the stage returned no markup
//! for, yields a placeholder glyph instead of an empty frame. Assembly
//! is transactional per icon: if the host rejects any step, everything
//! built for that icon so far is removed again.

use tracing::warn;

use crate::error::HostError;
use crate::host::{HostDocument, LayoutDirection, NodeId};
use crate::icon::{NormalizationResult, TargetSize, size_node_name, variant_base_name};
use crate::pipeline::geometry::normalize_geometry;

/// Gap between size frames inside an assembled set.
pub const VARIANT_ITEM_GAP: f32 = 16.0;

/// Glyph shown in place of missing or unparseable markup.
pub const PLACEHOLDER_GLYPH: &str = "?";

/// Placeholder font size relative to the frame edge.
const PLACEHOLDER_SCALE: f32 = 0.6;

/// A variant set produced by [`assemble_variant_set`].
#[derive(Debug, Clone)]
pub struct AssembledSet {
    /// The variant-set node inside the output container.
    pub node: NodeId,
    /// The suffix-free name shared by the set and its frames.
    pub base_name: String,
}

/// Assembles one icon's variant set inside `container`.
///
/// The caller is expected to skip results that carry an error; this
/// function only looks at the markup map.
pub fn assemble_variant_set<H: HostDocument>(
    doc: &mut H,
    container: NodeId,
    result: &NormalizationResult,
) -> Result<AssembledSet, HostError> {
    let base = variant_base_name(&result.display_name);
    let mut created: Vec<NodeId> = Vec::new();

    match try_assemble(doc, container, &base, result, &mut created) {
        Ok(node) => Ok(AssembledSet {
            node,
            base_name: base,
        }),
        Err(e) => {
            // Partial output would litter the container. The set node is
            // removed first since it owns the frames once combined.
            for &id in created.iter().rev() {
                if doc.is_alive(id) {
                    if let Err(remove_error) = doc.remove_node(id) {
                        warn!("could not remove partial output for `{}`: {}", base, remove_error);
                    }
                }
            }
            Err(e)
        }
    }
}

fn try_assemble<H: HostDocument>(
    doc: &mut H,
    container: NodeId,
    base: &str,
    result: &NormalizationResult,
    created: &mut Vec<NodeId>,
) -> Result<NodeId, HostError> {
    let mut frames = Vec::with_capacity(TargetSize::ALL.len());
    for size in TargetSize::ALL {
        let frame =
            build_size_frame(doc, container, base, size, result.markup_for(size), created)?;
        frames.push(frame);
    }

    let set = doc.combine_as_variants(&frames, container)?;
    created.push(set);
    doc.set_name(set, base)?;
    doc.set_layout(set, LayoutDirection::Horizontal, VARIANT_ITEM_GAP)?;
    doc.clear_fills(set)?;
    Ok(set)
}

/// Builds one size frame and normalizes its geometry.
///
/// The frame is recorded in `created` as soon as it exists, so a host
/// refusal partway through still leaves it reachable for cleanup.
fn build_size_frame<H: HostDocument>(
    doc: &mut H,
    container: NodeId,
    base: &str,
    size: TargetSize,
    markup: Option<&str>,
    created: &mut Vec<NodeId>,
) -> Result<NodeId, HostError> {
    let px = size.px() as f32;
    let name = size_node_name(base, size);
    let frame = doc.create_frame(&name, container, px, px)?;
    created.push(frame);
    doc.set_clips_content(frame, true)?;
    doc.clear_fills(frame)?;

    match markup {
        Some(markup) => match doc.import_markup(markup, frame) {
            Ok(wrapper) => {
                // Lift the parsed content out of its import wrapper.
                for child in doc.children(wrapper) {
                    doc.reparent(child, frame)?;
                }
                doc.remove_node(wrapper)?;
            }
            Err(e) => {
                warn!("markup for `{}` failed to import: {}", name, e);
                place_placeholder(doc, frame, px)?;
            }
        },
        None => {
            warn!("normalization returned no {}px markup for `{}`", size.px(), base);
            place_placeholder(doc, frame, px)?;
        }
    }

    normalize_geometry(doc, frame);
    Ok(frame)
}

fn place_placeholder<H: HostDocument>(
    doc: &mut H,
    frame: NodeId,
    px: f32,
) -> Result<(), HostError> {
    doc.create_text(PLACEHOLDER_GLYPH, frame, px * PLACEHOLDER_SCALE)?;
    Ok(())
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::host::{MemoryDocument, NodeKind, descendants};

    fn plain_markup(px: u32) -> String {
        format!(
            r##"<svg xmlns="http://www.w3.org/2000/svg" width="{px}" height="{px}" viewBox="0 0 {px} {px}"><rect width="{px}" height="{px}" fill="#000"/></svg>"##
        )
    }

    fn stroked_markup(px: u32) -> String {
        format!(
            r##"<svg xmlns="http://www.w3.org/2000/svg" width="{px}" height="{px}" viewBox="0 0 {px} {px}"><rect width="{px}" height="{px}" fill="none" stroke="#000"/></svg>"##
        )
    }

    fn full_result(display_name: &str) -> NormalizationResult {
        TargetSize::ALL
            .iter()
            .fold(NormalizationResult::success(display_name), |result, &size| {
                result.with_markup(size, plain_markup(size.px()))
            })
    }

    fn container(doc: &mut MemoryDocument) -> NodeId {
        let root = doc.root();
        doc.create_frame("out", root, 400.0, 400.0).unwrap()
    }

    #[test]
    fn builds_one_frame_per_size_inside_a_set() {
        let mut doc = MemoryDocument::new();
        let out = container(&mut doc);

        let set = assemble_variant_set(&mut doc, out, &full_result("home")).unwrap();

        assert_eq!(set.base_name, "home");
        assert_eq!(doc.kind(set.node), Some(NodeKind::VariantSet));
        assert_eq!(doc.name(set.node).as_deref(), Some("home"));
        assert_eq!(doc.parent(set.node), Some(out));
        assert_eq!(
            doc.layout(set.node),
            Some((LayoutDirection::Horizontal, VARIANT_ITEM_GAP))
        );

        let frames = doc.children(set.node);
        assert_eq!(frames.len(), 3);
        let names: Vec<_> = frames
            .iter()
            .map(|&id| doc.name(id).unwrap_or_default())
            .collect();
        assert_eq!(names, vec!["home_16", "home_24", "home_32"]);

        let widths: Vec<_> = frames
            .iter()
            .map(|&id| doc.bounding_box(id).unwrap().width)
            .collect();
        assert_eq!(widths, vec![16.0, 24.0, 32.0]);

        for &frame in &frames {
            assert!(doc.clips_content(frame));
            assert!(!doc.has_fill(frame));
        }
    }

    #[test]
    fn size_suffix_in_the_display_name_collapses() {
        let mut doc = MemoryDocument::new();
        let out = container(&mut doc);

        let set = assemble_variant_set(&mut doc, out, &full_result("home_24")).unwrap();

        assert_eq!(set.base_name, "home");
        let names: Vec<_> = doc
            .children(set.node)
            .iter()
            .map(|&id| doc.name(id).unwrap_or_default())
            .collect();
        assert_eq!(names, vec!["home_16", "home_24", "home_32"]);
    }

    #[test]
    fn stroked_markup_comes_out_stroke_free() {
        let mut doc = MemoryDocument::new();
        let out = container(&mut doc);
        let result = TargetSize::ALL
            .iter()
            .fold(NormalizationResult::success("ring"), |result, &size| {
                result.with_markup(size, stroked_markup(size.px()))
            });

        let set = assemble_variant_set(&mut doc, out, &result).unwrap();
        assert_eq!(doc.total_strokes(set.node), 0);
    }

    #[test]
    fn missing_size_markup_becomes_a_placeholder() {
        let mut doc = MemoryDocument::new();
        let out = container(&mut doc);
        // Flattening is disabled so the placeholder text survives as-is.
        doc.faults_mut().fail_flatten = true;
        let result = NormalizationResult::success("home")
            .with_markup(TargetSize::Small, plain_markup(16))
            .with_markup(TargetSize::Medium, plain_markup(24));

        let set = assemble_variant_set(&mut doc, out, &result).unwrap();

        let large = doc.children(set.node)[2];
        let glyphs: Vec<_> = descendants(&doc, large)
            .into_iter()
            .filter(|&id| doc.kind(id) == Some(NodeKind::Text))
            .collect();
        assert_eq!(glyphs.len(), 1);
        assert_eq!(doc.name(glyphs[0]).as_deref(), Some(PLACEHOLDER_GLYPH));
        assert_eq!(doc.bounding_box(glyphs[0]).unwrap().height, 32.0 * 0.6);
    }

    #[test]
    fn unparseable_markup_becomes_a_placeholder() {
        let mut doc = MemoryDocument::new();
        let out = container(&mut doc);
        doc.faults_mut().fail_flatten = true;
        let result = NormalizationResult::success("home")
            .with_markup(TargetSize::Small, "<svg never closed")
            .with_markup(TargetSize::Medium, plain_markup(24))
            .with_markup(TargetSize::Large, plain_markup(32));

        let set = assemble_variant_set(&mut doc, out, &result).unwrap();

        let small = doc.children(set.node)[0];
        let has_glyph = descendants(&doc, small)
            .into_iter()
            .any(|id| doc.kind(id) == Some(NodeKind::Text));
        assert!(has_glyph);
    }

    #[test]
    fn refused_import_fills_every_frame_with_placeholders() {
        let mut doc = MemoryDocument::new();
        let out = container(&mut doc);
        doc.faults_mut().fail_import = true;
        doc.faults_mut().fail_flatten = true;

        let set = assemble_variant_set(&mut doc, out, &full_result("home")).unwrap();

        for &frame in &doc.children(set.node) {
            let glyphs = descendants(&doc, frame)
                .into_iter()
                .filter(|&id| doc.kind(id) == Some(NodeKind::Text))
                .count();
            assert_eq!(glyphs, 1);
        }
    }

    #[test]
    fn refusal_inside_a_frame_removes_the_frame_too() {
        let mut doc = MemoryDocument::new();
        let out = container(&mut doc);
        // The first frame's import succeeds, then lifting its content
        // out of the wrapper is refused mid-build.
        doc.faults_mut().fail_reparent = true;
        let baseline = doc.node_count();

        let err = assemble_variant_set(&mut doc, out, &full_result("home")).unwrap_err();

        assert!(matches!(err, HostError::MoveFailed(_)));
        assert!(doc.children(out).is_empty());
        assert_eq!(doc.node_count(), baseline);
    }

    #[test]
    fn host_refusal_removes_partial_output() {
        let mut doc = MemoryDocument::new();
        let out = container(&mut doc);
        doc.faults_mut().fail_grouping = true;
        let baseline = doc.node_count();

        let err = assemble_variant_set(&mut doc, out, &full_result("home")).unwrap_err();

        assert!(matches!(err, HostError::GroupingFailed(_)));
        assert!(doc.children(out).is_empty());
        assert_eq!(doc.node_count(), baseline);
    }
}
