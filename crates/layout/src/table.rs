//! Table formatting context.
//!
//! Column widths come from either the fixed algorithm (column widths are
//! read off the first row and content is ignored) or the automatic
//! algorithm (per-column minimum/preferred content widths, with the
//! deficit or surplus distributed proportionally). Row heights are the
//! maximum of the row's cell heights; cells stretch to the row.

use crate::block::{self, BlockResult};
use crate::engine::{ContainingBlock, LayoutEngine};
use crate::floats::FloatContext;
use crate::intrinsic::{self, IntrinsicWidths};
use crate::margin::CollapsedMargin;
use crate::tree::{BoxId, BoxTree};
use folio_style::TableLayout;
use folio_types::{Edges, Rect};
use log::debug;

#[cfg(feature = "parallel")]
use rayon::prelude::*;

pub(crate) fn layout_table(
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
    let edges_h = padding.horizontal() + border.horizontal();
    let spacing = style.table.border_spacing.max(0.0);

    let margin_top = style.box_model.margin.top.resolve_or(cb_width, 0.0);
    let margin_bottom = style.box_model.margin.bottom.resolve_or(cb_width, 0.0);
    let ml_auto = style.box_model.margin.left.is_auto();
    let mr_auto = style.box_model.margin.right.is_auto();

    // Used table width: specified, or shrink-to-fit against the
    // containing block.
    let inner = intrinsic_table_widths(eng, tree, id);
    let min_content = (inner.min - edges_h).max(0.0);
    let max_content = (inner.max - edges_h).max(0.0);
    let fixed_margins = style.box_model.margin.left.resolve_or(cb_width, 0.0)
        + style.box_model.margin.right.resolve_or(cb_width, 0.0);
    let available = (cb_width - edges_h - fixed_margins).max(0.0);
    let content_width = match style.box_model.width.resolve(cb_width) {
        Some(w) => w.max(0.0),
        None => max_content.min(available).max(min_content),
    };

    // Auto margins center the table.
    let remaining = cb_width - content_width - edges_h;
    let (margin_left, margin_right) = match (ml_auto, mr_auto) {
        (true, true) => ((remaining / 2.0).max(0.0), (remaining / 2.0).max(0.0)),
        _ => (
            style.box_model.margin.left.resolve_or(cb_width, 0.0),
            style.box_model.margin.right.resolve_or(cb_width, 0.0),
        ),
    };

    // Tables establish a BFC: they may not overlap outer floats.
    let mut margin_x = cb.rect.x;
    let mut border_top = border_top_y;
    if !floats.is_empty() {
        let margin_box_width = content_width + edges_h + fixed_margins;
        let (band_x, band_y) = floats.avoid_overlap(margin_box_width, border_top_y);
        margin_x = band_x.max(cb.rect.x);
        border_top = band_y.max(border_top_y);
    }

    let content_x = margin_x + margin_left + border.left + padding.left;
    let content_top = border_top + border.top + padding.top;

    let rows: Vec<(BoxId, Vec<BoxId>)> = tree
        .children(id)
        .into_iter()
        .map(|group| (group, tree.children(group)))
        .collect();
    let column_count = count_columns(tree, &rows);

    let columns = if column_count == 0 {
        Vec::new()
    } else {
        match style.table.layout {
            TableLayout::Fixed => {
                fixed_columns(tree, &rows, column_count, content_width, spacing)
            }
            TableLayout::Auto => {
                auto_columns(eng, tree, &rows, column_count, content_width, spacing)
            }
        }
    };

    // Lay rows out top to bottom; each row is as tall as its tallest
    // cell and cells stretch to the row.
    let mut y = content_top;
    if !rows.iter().all(|(_, group_rows)| group_rows.is_empty()) {
        y += spacing;
    }
    for (group, group_rows) in &rows {
        let group_top = y;
        for &row in group_rows {
            y = layout_row(eng, tree, row, &columns, spacing, content_x, y, content_width);
            y += spacing;
        }
        let group_height = (y - group_top - spacing).max(0.0);
        let geom = &mut tree.get_mut(*group).geom;
        geom.content = Rect::new(content_x, group_top, content_width, group_height);
    }

    let mut content_height = (y - content_top).max(0.0);
    if let Some(resolved) = style.box_model.height.resolve(cb.height.unwrap_or(0.0)) {
        if resolved > content_height {
            content_height = resolved;
        }
    }

    let geom = &mut tree.get_mut(id).geom;
    geom.content = Rect::new(content_x, content_top, content_width, content_height);
    geom.margin = Edges {
        top: margin_top,
        right: margin_right,
        bottom: margin_bottom,
        left: margin_left,
    };
    geom.border = border;
    geom.padding = padding;

    BlockResult {
        border_bottom: content_top + content_height + padding.bottom + border.bottom,
        trailing: CollapsedMargin::from_margin(margin_bottom),
    }
}

fn layout_row(
    eng: &LayoutEngine,
    tree: &mut BoxTree,
    row: BoxId,
    columns: &[f32],
    spacing: f32,
    content_x: f32,
    row_top: f32,
    table_width: f32,
) -> f32 {
    let cells = tree.children(row);
    let mut row_height = 0.0f32;
    let mut column = 0usize;
    let mut placed: Vec<(BoxId, f32)> = Vec::new();

    for &cell in &cells {
        let span = (tree.get(cell).style.table.col_span as usize).max(1);
        if column >= columns.len() {
            debug!("table row has more cells than columns, dropping overflow cell");
            break;
        }
        let end = (column + span).min(columns.len());
        let cell_width: f32 =
            columns[column..end].iter().sum::<f32>() + spacing * (end - column - 1) as f32;
        let x = content_x
            + spacing
            + columns[..column].iter().sum::<f32>()
            + spacing * column as f32;

        let cell_style = tree.get(cell).style.clone();
        let cell_edges = cell_style.border_edges().horizontal()
            + cell_style.padding_edges(cell_width).horizontal();
        let cell_content_width = (cell_width - cell_edges).max(0.0);

        let cell_cb = ContainingBlock {
            rect: Rect::new(x, row_top, cell_width, 0.0),
            height: None,
        };
        let size =
            block::layout_independent(eng, tree, cell, &cell_cb, (x, row_top), cell_content_width);
        row_height = row_height.max(size.height);
        placed.push((cell, size.height));
        column = end;
    }

    // Stretch every cell's border box to the row height.
    for (cell, _) in &placed {
        let style = tree.get(*cell).style.clone();
        let vertical_edges =
            style.border_edges().vertical() + style.padding_edges(table_width).vertical();
        let geom = &mut tree.get_mut(*cell).geom;
        geom.content.height = (row_height - vertical_edges).max(0.0);
    }

    let geom = &mut tree.get_mut(row).geom;
    geom.content = Rect::new(content_x, row_top, table_width, row_height);
    row_top + row_height
}

fn count_columns(tree: &BoxTree, rows: &[(BoxId, Vec<BoxId>)]) -> usize {
    let mut count = 0;
    for (_, group_rows) in rows {
        for &row in group_rows {
            let row_span: usize = tree
                .get(row)
                .children
                .iter()
                .map(|&cell| (tree.get(cell).style.table.col_span as usize).max(1))
                .sum();
            count = count.max(row_span);
        }
    }
    count
}

/// Fixed algorithm: the first row's cell widths set the columns; content
/// never changes them. Unsized columns share the leftover evenly.
fn fixed_columns(
    tree: &BoxTree,
    rows: &[(BoxId, Vec<BoxId>)],
    column_count: usize,
    content_width: f32,
    spacing: f32,
) -> Vec<f32> {
    let usable = (content_width - spacing * (column_count + 1) as f32).max(0.0);
    let mut widths = vec![None::<f32>; column_count];

    if let Some(first_row) = rows
        .iter()
        .flat_map(|(_, group_rows)| group_rows.iter())
        .next()
    {
        let mut column = 0usize;
        for &cell in &tree.get(*first_row).children {
            if column >= column_count {
                break;
            }
            let style = &tree.get(cell).style;
            let span = (style.table.col_span as usize).max(1);
            if let Some(w) = style.box_model.width.resolve(usable) {
                let per_column = w / span as f32;
                for slot in widths.iter_mut().skip(column).take(span) {
                    *slot = Some(per_column);
                }
            }
            column += span;
        }
    }

    let taken: f32 = widths.iter().flatten().sum();
    let unsized_count = widths.iter().filter(|w| w.is_none()).count();
    let share = if unsized_count > 0 {
        ((usable - taken) / unsized_count as f32).max(0.0)
    } else {
        0.0
    };
    widths.into_iter().map(|w| w.unwrap_or(share)).collect()
}

/// Automatic algorithm: each column's minimum and preferred width is the
/// maximum over its cells; the available width is then distributed
/// proportionally between those two bounds.
fn auto_columns(
    eng: &LayoutEngine,
    tree: &BoxTree,
    rows: &[(BoxId, Vec<BoxId>)],
    column_count: usize,
    content_width: f32,
    spacing: f32,
) -> Vec<f32> {
    let usable = (content_width - spacing * (column_count + 1) as f32).max(0.0);

    // Gather (column, span, cell) and measure. The measurement of one
    // cell is a pure function of immutable inputs, so the pass is
    // parallelizable.
    let mut cell_slots = Vec::new();
    for (_, group_rows) in rows {
        for &row in group_rows {
            let mut column = 0usize;
            for &cell in &tree.get(row).children {
                let span = (tree.get(cell).style.table.col_span as usize).max(1);
                cell_slots.push((column, span, cell));
                column += span;
            }
        }
    }

    #[cfg(feature = "parallel")]
    let measured: Vec<(usize, usize, IntrinsicWidths)> = cell_slots
        .par_iter()
        .map(|&(column, span, cell)| (column, span, intrinsic::intrinsic_widths(eng, tree, cell)))
        .collect();
    #[cfg(not(feature = "parallel"))]
    let measured: Vec<(usize, usize, IntrinsicWidths)> = cell_slots
        .iter()
        .map(|&(column, span, cell)| (column, span, intrinsic::intrinsic_widths(eng, tree, cell)))
        .collect();

    let mut min_widths = vec![0.0f32; column_count];
    let mut max_widths = vec![0.0f32; column_count];
    for (column, span, widths) in measured {
        let end = (column + span).min(column_count);
        if end <= column {
            continue;
        }
        let share = (end - column) as f32;
        for i in column..end {
            min_widths[i] = min_widths[i].max(widths.min / share);
            max_widths[i] = max_widths[i].max(widths.max / share);
        }
    }

    let total_min: f32 = min_widths.iter().sum();
    let total_max: f32 = max_widths.iter().sum();

    if total_max <= usable {
        // Surplus: grow columns in proportion to their preferred width.
        let extra = usable - total_max;
        if total_max > 0.0 {
            max_widths
                .iter()
                .map(|w| w + extra * (w / total_max))
                .collect()
        } else {
            vec![usable / column_count as f32; column_count]
        }
    } else if total_min >= usable {
        // Deficit below the minimum: scale the minimums down rather than
        // overflow the table edge.
        if total_min > 0.0 {
            let factor = usable / total_min;
            min_widths.iter().map(|w| w * factor).collect()
        } else {
            vec![0.0; column_count]
        }
    } else {
        // In between: interpolate each column between min and preferred.
        let range = total_max - total_min;
        let fraction = if range > 0.0 {
            (usable - total_min) / range
        } else {
            0.0
        };
        min_widths
            .iter()
            .zip(max_widths.iter())
            .map(|(min, max)| min + (max - min) * fraction)
            .collect()
    }
}

/// Table intrinsic widths, including border spacing and table edges.
fn intrinsic_table_widths(eng: &LayoutEngine, tree: &BoxTree, id: BoxId) -> IntrinsicWidths {
    intrinsic::intrinsic_widths(eng, tree, id)
}
