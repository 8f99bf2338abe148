//! Bottom-up preferred-width computation.
//!
//! Shrink-to-fit sizing (floats, inline-blocks, absolutely positioned
//! boxes, table cells) needs min-content and max-content widths before the
//! top-down width pass runs. This is the explicit side-channel traversal;
//! it never recurses back into layout.

use crate::engine::LayoutEngine;
use crate::tree::{BoxContent, BoxId, BoxKind, BoxTree};
use folio_traits::BreakClass;

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub(crate) struct IntrinsicWidths {
    /// Narrowest width that avoids overflow: the widest unbreakable unit.
    pub min: f32,
    /// Width with no line breaking at all.
    pub max: f32,
}

impl IntrinsicWidths {
    fn union(self, other: IntrinsicWidths) -> IntrinsicWidths {
        IntrinsicWidths {
            min: self.min.max(other.min),
            max: self.max.max(other.max),
        }
    }
}

/// Preferred widths of one box, margins excluded, edges included.
pub(crate) fn intrinsic_widths(eng: &LayoutEngine, tree: &BoxTree, id: BoxId) -> IntrinsicWidths {
    let node = tree.get(id);
    let style = &node.style;

    // A definite point width short-circuits content measurement.
    if let folio_style::Dimension::Pt(w) = style.box_model.width {
        let edges = style.border_edges().horizontal() + style.padding_edges(0.0).horizontal();
        return IntrinsicWidths {
            min: w + edges,
            max: w + edges,
        };
    }

    let inner = match &node.content {
        BoxContent::Text(text) => text_widths(eng, tree, id, text),
        BoxContent::Replaced(reference) => {
            let size = eng.replaced_used_size(style, reference, 0.0);
            IntrinsicWidths {
                min: size.width,
                max: size.width,
            }
        }
        BoxContent::None => match node.kind {
            BoxKind::Table => table_widths(eng, tree, id),
            _ => container_widths(eng, tree, id),
        },
    };

    let edges = style.border_edges().horizontal() + style.padding_edges(0.0).horizontal();
    IntrinsicWidths {
        min: inner.min + edges,
        max: inner.max + edges,
    }
}

fn text_widths(eng: &LayoutEngine, tree: &BoxTree, id: BoxId, text: &str) -> IntrinsicWidths {
    let style = &tree.get(id).style;
    let run = eng.measurer.measure(text, &style.font());
    let mut widths = IntrinsicWidths::default();
    let mut word = 0.0f32;
    let mut line = 0.0f32;
    for (advance, class) in run.advances.iter().zip(run.breaks.iter()) {
        match class {
            BreakClass::None => {
                word += advance;
                line += advance;
            }
            BreakClass::Opportunity => {
                widths.min = widths.min.max(word);
                word = 0.0;
                line += advance;
            }
            BreakClass::Mandatory => {
                widths.min = widths.min.max(word);
                widths.max = widths.max.max(line);
                word = 0.0;
                line = 0.0;
            }
        }
    }
    widths.min = widths.min.max(word);
    widths.max = widths.max.max(line);
    widths
}

fn container_widths(eng: &LayoutEngine, tree: &BoxTree, id: BoxId) -> IntrinsicWidths {
    let children = &tree.get(id).children;
    let inline_flow = children
        .iter()
        .any(|&c| tree.get(c).kind.is_inline_level());

    let mut widths = IntrinsicWidths::default();
    if inline_flow {
        // Inline content concatenates on one hypothetical line for
        // max-content; min-content is the widest single unit.
        let mut line = 0.0f32;
        for &child in children {
            if tree.get(child).kind.is_out_of_flow() {
                continue;
            }
            let child_widths = intrinsic_widths(eng, tree, child);
            widths.min = widths.min.max(child_widths.min);
            line += child_widths.max;
        }
        widths.max = widths.max.max(line);
    } else {
        for &child in children {
            let child_box = tree.get(child);
            if matches!(child_box.kind, BoxKind::Positioned(_)) {
                continue;
            }
            let child_widths = intrinsic_widths(eng, tree, child);
            let margins = horizontal_margins(tree, child);
            widths = widths.union(IntrinsicWidths {
                min: child_widths.min + margins,
                max: child_widths.max + margins,
            });
        }
    }
    widths
}

fn table_widths(eng: &LayoutEngine, tree: &BoxTree, id: BoxId) -> IntrinsicWidths {
    let spacing = tree.get(id).style.table.border_spacing;
    let mut widths = IntrinsicWidths::default();
    for group in tree.get(id).children.iter() {
        for row in tree.get(*group).children.iter() {
            let cells = &tree.get(*row).children;
            let mut row_min = 0.0f32;
            let mut row_max = 0.0f32;
            for &cell in cells {
                let cell_widths = intrinsic_widths(eng, tree, cell);
                row_min += cell_widths.min;
                row_max += cell_widths.max;
            }
            if !cells.is_empty() {
                let gaps = spacing * (cells.len() + 1) as f32;
                row_min += gaps;
                row_max += gaps;
            }
            widths = widths.union(IntrinsicWidths {
                min: row_min,
                max: row_max,
            });
        }
    }
    widths
}

fn horizontal_margins(tree: &BoxTree, id: BoxId) -> f32 {
    let margin = &tree.get(id).style.box_model.margin;
    margin.left.resolve_or(0.0, 0.0) + margin.right.resolve_or(0.0, 0.0)
}

/// CSS shrink-to-fit: clamp the preferred width between the minimum
/// content width and the available space.
pub(crate) fn shrink_to_fit(
    eng: &LayoutEngine,
    tree: &BoxTree,
    id: BoxId,
    available: f32,
) -> f32 {
    let widths = intrinsic_widths(eng, tree, id);
    widths.min.max(widths.max.min(available.max(0.0)))
}
