//! Layout driver: owns the adapter handles and runs the two passes
//! (normal flow, then out-of-flow positioning) over a box tree.

use crate::block;
use crate::config::PageConfig;
use crate::floats::FloatContext;
use crate::positioned;
use crate::style::ComputedStyle;
use crate::tree::BoxTree;
use folio_style::Dimension;
use folio_traits::{IntrinsicSize, ReplacedSizer, TextMeasurer};
use folio_types::{ContentRef, Rect, Size};
use log::debug;

/// The containing block a box resolves its widths and offsets against.
#[derive(Debug, Clone, Copy)]
pub(crate) struct ContainingBlock {
    /// Content box of the containing block, in document coordinates.
    pub rect: Rect,
    /// Definite height for percentage resolution; `None` while the height
    /// is still being computed bottom-up.
    pub height: Option<f32>,
}

pub struct LayoutEngine<'a> {
    pub measurer: &'a dyn TextMeasurer,
    pub sizer: &'a dyn ReplacedSizer,
}

impl<'a> LayoutEngine<'a> {
    pub fn new(measurer: &'a dyn TextMeasurer, sizer: &'a dyn ReplacedSizer) -> Self {
        Self { measurer, sizer }
    }

    /// Lays out the whole tree against the page content area described by
    /// `config`. Geometry is written in place; the tree is ready for
    /// pagination afterwards.
    ///
    /// Document coordinates put the origin at the top-left of the content
    /// area; the block axis is unbounded until pagination slices it.
    pub fn layout(&self, tree: &mut BoxTree, config: &PageConfig) {
        let content = config.content_size();
        let cb = ContainingBlock {
            rect: Rect::new(0.0, 0.0, content.width, content.height),
            height: Some(content.height),
        };
        let mut floats = FloatContext::new(0.0, content.width);

        let root = tree.root;
        let border_top = block::leading_margin(tree, root, content.width).resolve();
        block::layout_block_level(self, tree, root, &cb, border_top, &mut floats);

        positioned::layout_out_of_flow(self, tree, config);
    }

    /// Used size of a replaced box from its specified and intrinsic
    /// dimensions (CSS 10.3.2, aspect-ratio preserving).
    pub(crate) fn replaced_used_size(
        &self,
        style: &ComputedStyle,
        content: &ContentRef,
        cb_width: f32,
    ) -> Size {
        let intrinsic = self.sizer.intrinsic_size(content).unwrap_or_else(|| {
            debug!("replaced content '{}' unavailable, substituting 0x0", content);
            IntrinsicSize {
                width: 0.0,
                height: 0.0,
                aspect_ratio: None,
            }
        });

        let spec_w = style.box_model.width.resolve(cb_width);
        // Percentage heights resolve against the containing block height,
        // which is not plumbed here; they degrade to auto.
        let spec_h = match style.box_model.height {
            Dimension::Pt(h) => Some(h),
            _ => None,
        };

        let (width, height) = match (spec_w, spec_h) {
            (Some(w), Some(h)) => (w, h),
            (Some(w), None) => match intrinsic.aspect_ratio {
                Some(ratio) if ratio > 0.0 => (w, w / ratio),
                _ => (w, intrinsic.height),
            },
            (None, Some(h)) => match intrinsic.aspect_ratio {
                Some(ratio) => (h * ratio, h),
                None => (intrinsic.width, h),
            },
            (None, None) => (intrinsic.width, intrinsic.height),
        };

        let min_w = style.box_model.min_width.resolve_or(cb_width, 0.0);
        let max_w = style
            .box_model
            .max_width
            .resolve(cb_width)
            .unwrap_or(f32::INFINITY);
        let min_h = style.box_model.min_height.resolve_or(0.0, 0.0);
        let max_h = style
            .box_model
            .max_height
            .resolve(0.0)
            .unwrap_or(f32::INFINITY);

        Size::new(
            width.clamp(min_w.min(max_w), max_w).max(0.0),
            height.clamp(min_h.min(max_h), max_h).max(0.0),
        )
    }
}
