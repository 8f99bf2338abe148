//! Block formatting context layout.
//!
//! Widths resolve top-down against the containing block (CSS 10.3.3);
//! children stack along the block axis with collapsed margins; heights
//! resolve bottom-up from the children. Floats register into the owning
//! BFC's `FloatContext` and clearance pushes boxes below them.

use crate::engine::{ContainingBlock, LayoutEngine};
use crate::floats::FloatContext;
use crate::inline;
use crate::intrinsic;
use crate::margin::CollapsedMargin;
use crate::table;
use crate::tree::{BoxContent, BoxId, BoxKind, BoxTree};
use folio_style::{Clear, Dimension, Float};
use folio_types::{Edges, Rect, Size};
use log::debug;

#[derive(Debug, Clone, Copy)]
pub(crate) struct BlockResult {
    /// Document y of the border-box bottom edge.
    pub border_bottom: f32,
    /// Margin set hanging below the border box, ready to collapse with
    /// whatever follows.
    pub trailing: CollapsedMargin,
}

struct InteriorResult {
    content_height: f32,
    trailing: CollapsedMargin,
    is_ifc: bool,
}

/// Lays out one in-flow block-level box whose border-box top sits at
/// `border_top_y`.
pub(crate) fn layout_block_level(
    eng: &LayoutEngine,
    tree: &mut BoxTree,
    id: BoxId,
    cb: &ContainingBlock,
    border_top_y: f32,
    floats: &mut FloatContext,
) -> BlockResult {
    match tree.get(id).kind {
        BoxKind::Table => table::layout_table(eng, tree, id, cb, border_top_y, floats),
        BoxKind::Replaced => layout_block_replaced(eng, tree, id, cb, border_top_y),
        _ => layout_in_flow_container(eng, tree, id, cb, border_top_y, floats),
    }
}

fn layout_in_flow_container(
    eng: &LayoutEngine,
    tree: &mut BoxTree,
    id: BoxId,
    cb: &ContainingBlock,
    border_top_y: f32,
    floats: &mut FloatContext,
) -> BlockResult {
    let style = tree.get(id).style.clone();
    let cb_width = cb.rect.width;

    let padding = style.padding_edges(cb_width);
    let border = style.border_edges();
    let (content_width, margin_left, margin_right) =
        resolve_block_width(&style, cb_width, &padding, &border);
    let margin_top = style.box_model.margin.top.resolve_or(cb_width, 0.0);
    let margin_bottom = style.box_model.margin.bottom.resolve_or(cb_width, 0.0);

    let establishes = style.establishes_bfc() || id == tree.root;

    // A box that starts its own BFC must not overlap floats in the outer
    // one: shift it into (or below) the first band that fits. The slack
    // an over-constrained auto margin absorbs does not block placement,
    // so only the specified margins count here.
    let mut margin_x = cb.rect.x;
    let mut border_top = border_top_y;
    if establishes && !floats.is_empty() {
        let raw_margins = style.box_model.margin.resolve(cb_width);
        let margin_box_width = content_width
            + padding.horizontal()
            + border.horizontal()
            + raw_margins.horizontal();
        let (band_x, band_y) = floats.avoid_overlap(margin_box_width, border_top_y);
        margin_x = band_x.max(cb.rect.x);
        border_top = band_y.max(border_top_y);
    }

    let content_x = margin_x + margin_left + border.left + padding.left;
    let content_top = border_top + border.top + padding.top;
    let content_rect = Rect::new(content_x, content_top, content_width, 0.0);

    let top_open = top_edge_open(tree, id, cb_width);

    let mut inner_floats = FloatContext::new(content_x, content_x + content_width);
    let interior = if establishes {
        layout_interior(eng, tree, id, &content_rect, cb.height, &mut inner_floats, top_open)
    } else {
        layout_interior(eng, tree, id, &content_rect, cb.height, floats, top_open)
    };

    let bottom_open = !interior.is_ifc
        && border.bottom == 0.0
        && padding.bottom == 0.0
        && style.box_model.height.is_auto()
        && !establishes;

    let mut content_height = interior.content_height;
    if !interior.is_ifc && !bottom_open {
        // The last child's bottom margin stays inside this box.
        content_height += interior.trailing.resolve();
    }

    // A BFC root stretches around the floats it contains.
    if establishes && !inner_floats.is_empty() {
        content_height = content_height.max(inner_floats.floats_bottom() - content_top);
    }

    if let Some(resolved) = resolve_height(&style, cb) {
        content_height = resolved;
    }
    content_height = apply_height_bounds(&style, cb, content_height);
    if content_height < 0.0 {
        debug!("negative resolved height clamped to zero");
        content_height = 0.0;
    }

    let margins = Edges {
        top: margin_top,
        right: margin_right,
        bottom: margin_bottom,
        left: margin_left,
    };
    set_geometry(tree, id, content_rect, content_height, margins, border, padding);
    apply_relative_offset(tree, id, cb);

    let trailing = if bottom_open {
        interior.trailing.adjoin_margin(margin_bottom)
    } else {
        CollapsedMargin::from_margin(margin_bottom)
    };

    BlockResult {
        border_bottom: content_top + content_height + padding.bottom + border.bottom,
        trailing,
    }
}

/// Lays out the children of a block container: an inline formatting
/// context when the in-flow children are inline-level, block flow
/// otherwise.
fn layout_interior(
    eng: &LayoutEngine,
    tree: &mut BoxTree,
    id: BoxId,
    content_rect: &Rect,
    cb_height: Option<f32>,
    floats: &mut FloatContext,
    top_open: bool,
) -> InteriorResult {
    if has_inline_flow(tree, id) {
        let height = inline::layout_ifc(eng, tree, id, content_rect, floats);
        return InteriorResult {
            content_height: height,
            trailing: CollapsedMargin::zero(),
            is_ifc: true,
        };
    }

    let children = tree.children(id);
    let outcome = layout_flow_children(
        eng,
        tree,
        &children,
        content_rect,
        cb_height,
        floats,
        top_open,
    );
    InteriorResult {
        content_height: (outcome.end_y - content_rect.y).max(0.0),
        trailing: outcome.trailing,
        is_ifc: false,
    }
}

struct FlowOutcome {
    end_y: f32,
    trailing: CollapsedMargin,
}

fn layout_flow_children(
    eng: &LayoutEngine,
    tree: &mut BoxTree,
    children: &[BoxId],
    content_rect: &Rect,
    cb_height: Option<f32>,
    floats: &mut FloatContext,
    top_open: bool,
) -> FlowOutcome {
    let cb = ContainingBlock {
        rect: *content_rect,
        height: cb_height,
    };
    let mut cursor = content_rect.y;
    let mut pending = CollapsedMargin::zero();
    let mut placed_any = false;

    for &child in children {
        match tree.get(child).kind {
            BoxKind::Positioned(_) => {
                // Record the static position hint for the second pass.
                let hint_y = cursor + pending.resolve();
                let geom = &mut tree.get_mut(child).geom;
                geom.content.x = content_rect.x;
                geom.content.y = hint_y;
                continue;
            }
            BoxKind::Floated(side) => {
                let flow_y = cursor + pending.resolve();
                layout_float(eng, tree, child, &cb, side, flow_y, floats);
                continue;
            }
            BoxKind::ListMarker => {
                layout_outside_marker(eng, tree, child, content_rect.x, cursor + pending.resolve());
                continue;
            }
            _ => {}
        }

        let lead = leading_margin(tree, child, content_rect.width);
        let margin_set = pending.adjoin(lead);

        let at_content_top = !placed_any && cursor == content_rect.y;
        let mut border_top = if top_open && at_content_top {
            // The whole leading margin set was consumed when the parent
            // itself was positioned.
            cursor
        } else {
            cursor + margin_set.resolve()
        };

        let clear = tree.get(child).style.flow.clear;
        if clear != Clear::None {
            let clear_y = floats.clearance_for(clear);
            if clear_y > border_top {
                border_top = clear_y;
                pending = CollapsedMargin::zero();
            }
        }

        if collapses_through(tree, child, content_rect.width) {
            let result = layout_block_level(eng, tree, child, &cb, border_top, floats);
            // The box occupies no space; its whole margin set keeps
            // collapsing with the neighbors.
            pending = margin_set.adjoin(result.trailing);
            continue;
        }

        let result = layout_block_level(eng, tree, child, &cb, border_top, floats);
        cursor = result.border_bottom;
        pending = result.trailing;
        placed_any = true;
    }

    FlowOutcome {
        end_y: cursor,
        trailing: pending,
    }
}

/// Resolves the constraint `margin-left + border + padding + width +
/// padding + border + margin-right = containing width` (CSS 10.3.3),
/// honoring `auto` margins for centering and clamping negative widths.
fn resolve_block_width(
    style: &crate::style::ComputedStyle,
    cb_width: f32,
    padding: &Edges,
    border: &Edges,
) -> (f32, f32, f32) {
    let edges = padding.horizontal() + border.horizontal();
    let margin_left = &style.box_model.margin.left;
    let margin_right = &style.box_model.margin.right;

    let width = style.box_model.width.resolve(cb_width);

    let (mut used_width, used_ml, used_mr) = match width {
        None => {
            // Auto width fills whatever the margins leave over.
            let ml = margin_left.resolve_or(cb_width, 0.0);
            let mr = margin_right.resolve_or(cb_width, 0.0);
            (cb_width - ml - mr - edges, ml, mr)
        }
        Some(w) => {
            let w = apply_width_bounds(style, cb_width, w);
            let remaining = cb_width - w - edges;
            match (margin_left.is_auto(), margin_right.is_auto()) {
                (true, true) => (w, remaining / 2.0, remaining / 2.0),
                (true, false) => {
                    let mr = margin_right.resolve_or(cb_width, 0.0);
                    (w, remaining - mr, mr)
                }
                (false, true) => {
                    let ml = margin_left.resolve_or(cb_width, 0.0);
                    (w, ml, remaining - ml)
                }
                (false, false) => {
                    // Over-constrained: margin-right gives way (LTR).
                    let ml = margin_left.resolve_or(cb_width, 0.0);
                    (w, ml, remaining - ml)
                }
            }
        }
    };

    if width.is_none() {
        used_width = apply_width_bounds(style, cb_width, used_width);
    }
    if used_width < 0.0 {
        debug!("negative resolved width clamped to zero");
        used_width = 0.0;
    }
    (used_width, used_ml, used_mr)
}

fn apply_width_bounds(style: &crate::style::ComputedStyle, cb_width: f32, width: f32) -> f32 {
    let min = style.box_model.min_width.resolve_or(cb_width, 0.0);
    let max = style
        .box_model
        .max_width
        .resolve(cb_width)
        .unwrap_or(f32::INFINITY);
    width.clamp(min.min(max), max)
}

fn resolve_height(style: &crate::style::ComputedStyle, cb: &ContainingBlock) -> Option<f32> {
    match style.box_model.height {
        Dimension::Pt(h) => Some(h),
        Dimension::Percent(p) => cb.height.map(|base| p / 100.0 * base),
        Dimension::Auto => None,
    }
}

fn apply_height_bounds(
    style: &crate::style::ComputedStyle,
    cb: &ContainingBlock,
    height: f32,
) -> f32 {
    let base = cb.height.unwrap_or(0.0);
    let min = style.box_model.min_height.resolve_or(base, 0.0);
    let max = style
        .box_model
        .max_height
        .resolve(base)
        .unwrap_or(f32::INFINITY);
    height.clamp(min.min(max), max)
}

fn set_geometry(
    tree: &mut BoxTree,
    id: BoxId,
    content_rect: Rect,
    content_height: f32,
    margins: Edges,
    border: Edges,
    padding: Edges,
) {
    let geom = &mut tree.get_mut(id).geom;
    geom.content = Rect {
        height: content_height,
        ..content_rect
    };
    geom.margin = margins;
    geom.border = border;
    geom.padding = padding;
}

/// Relative positioning shifts the box (and everything inside it) after
/// normal flow has placed it; the space it occupied is unaffected.
fn apply_relative_offset(tree: &mut BoxTree, id: BoxId, cb: &ContainingBlock) {
    let style = tree.get(id).style.clone();
    if style.flow.position != folio_style::Position::Relative {
        return;
    }
    let offset = &style.flow.offset;
    let dx = match offset.left.resolve(cb.rect.width) {
        Some(left) => left,
        None => -offset.right.resolve_or(cb.rect.width, 0.0),
    };
    let base = cb.height.unwrap_or(0.0);
    let dy = match offset.top.resolve(base) {
        Some(top) => top,
        None => -offset.bottom.resolve_or(base, 0.0),
    };
    tree.translate_subtree(id, dx, dy);
}

fn layout_block_replaced(
    eng: &LayoutEngine,
    tree: &mut BoxTree,
    id: BoxId,
    cb: &ContainingBlock,
    border_top_y: f32,
) -> BlockResult {
    let style = tree.get(id).style.clone();
    let content = match &tree.get(id).content {
        BoxContent::Replaced(reference) => reference.clone(),
        _ => unreachable!("replaced box without content"),
    };
    let size = eng.replaced_used_size(&style, &content, cb.rect.width);

    let padding = style.padding_edges(cb.rect.width);
    let border = style.border_edges();
    let remaining = cb.rect.width - size.width - padding.horizontal() - border.horizontal();
    let (ml, mr) = match (
        style.box_model.margin.left.is_auto(),
        style.box_model.margin.right.is_auto(),
    ) {
        (true, true) => (remaining / 2.0, remaining / 2.0),
        _ => (
            style.box_model.margin.left.resolve_or(cb.rect.width, 0.0),
            style.box_model.margin.right.resolve_or(cb.rect.width, 0.0),
        ),
    };
    let margins = Edges {
        top: style.box_model.margin.top.resolve_or(cb.rect.width, 0.0),
        right: mr,
        bottom: style.box_model.margin.bottom.resolve_or(cb.rect.width, 0.0),
        left: ml,
    };

    let content_rect = Rect::new(
        cb.rect.x + ml + border.left + padding.left,
        border_top_y + border.top + padding.top,
        size.width,
        size.height,
    );
    set_geometry(tree, id, content_rect, size.height, margins, border, padding);
    apply_relative_offset(tree, id, cb);

    BlockResult {
        border_bottom: content_rect.bottom() + padding.bottom + border.bottom,
        trailing: CollapsedMargin::from_margin(margins.bottom),
    }
}

/// Lays out a float's subtree with the margin-box corner at the origin,
/// then moves it into the first band where it fits and registers it.
fn layout_float(
    eng: &LayoutEngine,
    tree: &mut BoxTree,
    id: BoxId,
    cb: &ContainingBlock,
    side: Float,
    flow_y: f32,
    floats: &mut FloatContext,
) {
    let style = tree.get(id).style.clone();
    let padding = style.padding_edges(cb.rect.width);
    let border = style.border_edges();
    let margin = style.box_model.margin.resolve(cb.rect.width);
    let edges = padding.horizontal() + border.horizontal();

    let content_width = match style.box_model.width.resolve(cb.rect.width) {
        Some(w) => apply_width_bounds(&style, cb.rect.width, w),
        None => {
            let available = cb.rect.width - margin.horizontal() - edges;
            let preferred = intrinsic::shrink_to_fit(eng, tree, id, available + edges);
            apply_width_bounds(&style, cb.rect.width, (preferred - edges).max(0.0))
        }
    };

    let size = layout_independent(eng, tree, id, cb, (0.0, 0.0), content_width);

    // `clear` on the float itself keeps it below earlier floats.
    let mut min_y = flow_y;
    let clear = style.flow.clear;
    if clear != Clear::None {
        min_y = min_y.max(floats.clearance_for(clear));
    }

    let target = floats.place(size, side, min_y);
    tree.translate_subtree(id, target.x, target.y);
    floats.register(target, side);
}

/// An outside list marker hangs to the left of the principal box's
/// content edge, aligned with its top.
fn layout_outside_marker(
    eng: &LayoutEngine,
    tree: &mut BoxTree,
    id: BoxId,
    content_x: f32,
    top_y: f32,
) {
    let style = tree.get(id).style.clone();
    let text = match &tree.get(id).content {
        BoxContent::Text(text) => text.clone(),
        _ => return,
    };
    let run = eng.measurer.measure(&text, &style.font());
    let width = run.total_advance();
    let geom = &mut tree.get_mut(id).geom;
    geom.content = Rect::new(content_x - width, top_y, width, run.ascent + run.descent);
    geom.baseline = Some(run.ascent);
}

/// Lays out a box whose content width was decided by the caller (floats,
/// inline-block atoms, table cells, absolutely positioned boxes) with its
/// margin-box corner at `origin`. Returns the margin-box size.
pub(crate) fn layout_independent(
    eng: &LayoutEngine,
    tree: &mut BoxTree,
    id: BoxId,
    cb: &ContainingBlock,
    origin: (f32, f32),
    content_width: f32,
) -> Size {
    let style = tree.get(id).style.clone();
    let cb_width = cb.rect.width;
    let padding = style.padding_edges(cb_width);
    let border = style.border_edges();
    let margin = style.box_model.margin.resolve(cb_width);

    let content_x = origin.0 + margin.left + border.left + padding.left;
    let content_top = origin.1 + margin.top + border.top + padding.top;
    let content_rect = Rect::new(content_x, content_top, content_width, 0.0);

    let mut content_height = match &tree.get(id).content {
        BoxContent::Replaced(reference) => {
            let size = eng.replaced_used_size(&style, reference, cb_width);
            size.height
        }
        _ => {
            let mut inner_floats = FloatContext::new(content_x, content_x + content_width);
            let interior = layout_interior(
                eng,
                tree,
                id,
                &content_rect,
                cb.height,
                &mut inner_floats,
                false,
            );
            let mut height = interior.content_height;
            if !interior.is_ifc {
                height += interior.trailing.resolve();
            }
            if !inner_floats.is_empty() {
                height = height.max(inner_floats.floats_bottom() - content_top);
            }
            height
        }
    };

    if let Some(resolved) = resolve_height(&style, cb) {
        content_height = resolved;
    }
    content_height = apply_height_bounds(&style, cb, content_height).max(0.0);

    set_geometry(tree, id, content_rect, content_height, margin, border, padding);

    Size::new(
        content_width + padding.horizontal() + border.horizontal() + margin.horizontal(),
        content_height + padding.vertical() + border.vertical() + margin.vertical(),
    )
}

/// The margin set that sits above a box's border edge: its own top margin
/// plus, when nothing separates them, the leading margins of its first
/// in-flow block child, recursively.
pub(crate) fn leading_margin(tree: &BoxTree, id: BoxId, cb_width: f32) -> CollapsedMargin {
    let node = tree.get(id);
    let style = &node.style;
    let mut set =
        CollapsedMargin::from_margin(style.box_model.margin.top.resolve_or(cb_width, 0.0));

    if top_edge_open(tree, id, cb_width) {
        if let Some(first) = first_in_flow_child(tree, id) {
            if tree.get(first).style.flow.clear == Clear::None {
                let inner_width = inner_content_width(style, cb_width);
                set = set.adjoin(leading_margin(tree, first, inner_width));
            }
        }
    }
    set
}

/// Whether the box's top margin and its first child's top margin are
/// adjoining: no top border or padding, same BFC, block flow inside.
fn top_edge_open(tree: &BoxTree, id: BoxId, cb_width: f32) -> bool {
    let node = tree.get(id);
    if !matches!(node.kind, BoxKind::Block | BoxKind::AnonymousBlock) {
        return false;
    }
    let style = &node.style;
    style.border_edges().top == 0.0
        && style.padding_edges(cb_width).top == 0.0
        && !style.establishes_bfc()
        && id != tree.root
        && !has_inline_flow(tree, id)
        && first_in_flow_child(tree, id).is_some()
}

/// A box collapses through when it has no in-flow content, no vertical
/// edges and no definite height: its top and bottom margins join into one
/// set shared with its neighbors.
fn collapses_through(tree: &BoxTree, id: BoxId, cb_width: f32) -> bool {
    let node = tree.get(id);
    if !matches!(node.kind, BoxKind::Block | BoxKind::AnonymousBlock) {
        return false;
    }
    let style = &node.style;
    if style.establishes_bfc()
        || style.border_edges().vertical() != 0.0
        || style.padding_edges(cb_width).vertical() != 0.0
        || !matches!(style.box_model.height, Dimension::Auto)
        || style.box_model.min_height.resolve_or(0.0, 0.0) > 0.0
        || has_inline_flow(tree, id)
    {
        return false;
    }
    node.children.iter().all(|&child| {
        tree.get(child).kind.is_out_of_flow() || collapses_through(tree, child, cb_width)
    })
}

fn first_in_flow_child(tree: &BoxTree, id: BoxId) -> Option<BoxId> {
    tree.get(id)
        .children
        .iter()
        .copied()
        .find(|&child| {
            let kind = tree.get(child).kind;
            !kind.is_out_of_flow() && kind != BoxKind::ListMarker
        })
}

/// Whether the container's in-flow children are inline-level, i.e. it
/// establishes an inline formatting context for them.
pub(crate) fn has_inline_flow(tree: &BoxTree, id: BoxId) -> bool {
    tree.get(id).children.iter().any(|&child| {
        let node = tree.get(child);
        node.kind.is_inline_level()
            || node.kind == BoxKind::Line
            || (node.kind == BoxKind::ListMarker
                && node.style.list.style_position == folio_style::ListStylePosition::Inside)
    })
}

fn inner_content_width(style: &crate::style::ComputedStyle, cb_width: f32) -> f32 {
    let margin = style.box_model.margin.resolve(cb_width);
    let inner = cb_width
        - margin.horizontal()
        - style.border_edges().horizontal()
        - style.padding_edges(cb_width).horizontal();
    inner.max(0.0)
}
