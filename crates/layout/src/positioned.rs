//! Out-of-flow layout: absolutely and fixed-positioned boxes.
//!
//! These boxes were skipped by normal flow (which only recorded a static
//! position hint). After the in-flow pass completes, each is resolved
//! against its containing block: the padding box of the nearest positioned
//! ancestor for `absolute`, the page box for `fixed`.

use crate::block;
use crate::config::PageConfig;
use crate::engine::{ContainingBlock, LayoutEngine};
use crate::intrinsic;
use crate::tree::{BoxId, BoxKind, BoxTree};
use folio_style::Position;
use folio_types::Rect;

pub(crate) fn layout_out_of_flow(eng: &LayoutEngine, tree: &mut BoxTree, config: &PageConfig) {
    let content = config.content_size();
    let initial_cb = Rect::new(0.0, 0.0, content.width, content.height);
    let page = config.page_size();
    let page_box = Rect::new(0.0, 0.0, page.width, page.height);

    let root = tree.root;
    walk(eng, tree, root, initial_cb, page_box);
}

fn walk(eng: &LayoutEngine, tree: &mut BoxTree, id: BoxId, abs_cb: Rect, page_box: Rect) {
    match tree.get(id).kind {
        BoxKind::Positioned(Position::Absolute) => {
            layout_positioned(eng, tree, id, abs_cb);
        }
        BoxKind::Positioned(Position::Fixed) => {
            // Fixed boxes resolve against the page box itself; their
            // geometry is expressed in page coordinates and pagination
            // repeats them on every page.
            layout_positioned(eng, tree, id, page_box);
        }
        _ => {}
    }

    // A positioned box is the containing block for absolute descendants;
    // its padding box is the reference rectangle.
    let next_cb = if tree.get(id).style.flow.position.is_positioned() {
        tree.get(id).geom.padding_box()
    } else {
        abs_cb
    };

    for child in tree.children(id) {
        walk(eng, tree, child, next_cb, page_box);
    }
}

fn layout_positioned(eng: &LayoutEngine, tree: &mut BoxTree, id: BoxId, cb_rect: Rect) {
    let style = tree.get(id).style.clone();
    let cb = ContainingBlock {
        rect: cb_rect,
        height: Some(cb_rect.height),
    };

    let padding = style.padding_edges(cb_rect.width);
    let border = style.border_edges();
    let margin = style.box_model.margin.resolve(cb_rect.width);
    let edges_h = padding.horizontal() + border.horizontal();

    let left = style.flow.offset.left.resolve(cb_rect.width);
    let right = style.flow.offset.right.resolve(cb_rect.width);
    let top = style.flow.offset.top.resolve(cb_rect.height);
    let bottom = style.flow.offset.bottom.resolve(cb_rect.height);

    let content_width = match style.box_model.width.resolve(cb_rect.width) {
        Some(w) => w.max(0.0),
        None => match (left, right) {
            (Some(l), Some(r)) => {
                (cb_rect.width - l - r - edges_h - margin.horizontal()).max(0.0)
            }
            _ => {
                let available = cb_rect.width - margin.horizontal();
                let preferred = intrinsic::shrink_to_fit(eng, tree, id, available);
                (preferred - edges_h).max(0.0)
            }
        },
    };

    // The static-position hint recorded by normal flow, used when both
    // insets of an axis are auto.
    let hint = tree.get(id).geom.content;

    let size = block::layout_independent(eng, tree, id, &cb, (0.0, 0.0), content_width);

    let target_x = match (left, right) {
        (Some(l), _) => cb_rect.x + l,
        (None, Some(r)) => cb_rect.right() - r - size.width,
        (None, None) => hint.x,
    };
    let target_y = match (top, bottom) {
        (Some(t), _) => cb_rect.y + t,
        (None, Some(b)) => cb_rect.bottom() - b - size.height,
        (None, None) => hint.y,
    };

    tree.translate_subtree(id, target_x, target_y);
}
