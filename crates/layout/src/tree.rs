//! The box tree: arena storage, box kinds and per-box geometry.
//!
//! All boxes live in one arena (`Vec` indexed by `BoxId`), so parent and
//! child references are plain indices and the tree can be mutated in place
//! while layout walks it.

use crate::style::ComputedStyle;
use folio_dom::TextStr;
use folio_style::{Float, Position};
use folio_types::{ContentRef, Edges, Rect};
use std::sync::Arc;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct BoxId(u32);

impl BoxId {
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

/// Which table row-group a `TableRowGroup` box represents. Header and
/// footer groups are re-emitted on every page their table spans.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RowGroupKind {
    Header,
    Body,
    Footer,
}

/// The closed set of box variants the formatting context engine matches on.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum BoxKind {
    Block,
    AnonymousBlock,
    Inline,
    InlineBlock,
    /// A line box produced by inline layout; children are the line's
    /// fragments.
    Line,
    Table,
    TableRowGroup(RowGroupKind),
    TableRow,
    TableCell,
    Replaced,
    Floated(Float),
    Positioned(Position),
    ListMarker,
}

impl BoxKind {
    /// Whether the box participates in its parent's block-axis stacking.
    pub fn is_block_level(&self) -> bool {
        matches!(
            self,
            BoxKind::Block | BoxKind::AnonymousBlock | BoxKind::Table
        )
    }

    pub fn is_inline_level(&self) -> bool {
        matches!(self, BoxKind::Inline | BoxKind::InlineBlock | BoxKind::Replaced)
    }

    /// Out-of-flow boxes are skipped by normal flow and handled by float
    /// placement or the positioned-layout pass.
    pub fn is_out_of_flow(&self) -> bool {
        matches!(self, BoxKind::Floated(_) | BoxKind::Positioned(_))
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum BoxContent {
    None,
    /// A text run. Before inline layout this is the collapsed source text;
    /// after layout, line fragments carry the per-line slices.
    Text(TextStr),
    Replaced(ContentRef),
}

/// Geometry fields populated progressively during layout. `content` is in
/// document coordinates: the origin is the top-left of the first page's
/// content area and the block axis grows without bound until pagination.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct BoxGeometry {
    pub content: Rect,
    pub margin: Edges,
    pub border: Edges,
    pub padding: Edges,
    /// Distance from the content-box top to the alphabetic baseline, for
    /// line boxes and text fragments.
    pub baseline: Option<f32>,
}

impl BoxGeometry {
    pub fn padding_box(&self) -> Rect {
        self.content.outset(&self.padding)
    }

    pub fn border_box(&self) -> Rect {
        self.padding_box().outset(&self.border)
    }

    pub fn margin_box(&self) -> Rect {
        self.border_box().outset(&self.margin)
    }
}

#[derive(Debug, Clone)]
pub struct LayoutBox {
    pub kind: BoxKind,
    pub style: Arc<ComputedStyle>,
    pub children: Vec<BoxId>,
    pub content: BoxContent,
    pub geom: BoxGeometry,
    /// Pre-order index of the originating styled node, for diagnostics.
    pub source: Option<usize>,
}

impl LayoutBox {
    pub fn new(kind: BoxKind, style: Arc<ComputedStyle>) -> Self {
        Self {
            kind,
            style,
            children: Vec::new(),
            content: BoxContent::None,
            geom: BoxGeometry::default(),
            source: None,
        }
    }

    pub fn with_content(kind: BoxKind, style: Arc<ComputedStyle>, content: BoxContent) -> Self {
        Self {
            content,
            ..Self::new(kind, style)
        }
    }
}

#[derive(Debug)]
pub struct BoxTree {
    nodes: Vec<LayoutBox>,
    pub root: BoxId,
}

impl BoxTree {
    /// Creates a tree whose root is the given box.
    pub fn with_root(root_box: LayoutBox) -> Self {
        Self {
            nodes: vec![root_box],
            root: BoxId(0),
        }
    }

    pub fn alloc(&mut self, node: LayoutBox) -> BoxId {
        let id = BoxId(self.nodes.len() as u32);
        self.nodes.push(node);
        id
    }

    pub fn get(&self, id: BoxId) -> &LayoutBox {
        &self.nodes[id.index()]
    }

    pub fn get_mut(&mut self, id: BoxId) -> &mut LayoutBox {
        &mut self.nodes[id.index()]
    }

    pub fn children(&self, id: BoxId) -> Vec<BoxId> {
        self.get(id).children.clone()
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Shifts a box and its whole subtree by (dx, dy). Used to move
    /// independently laid out subtrees (floats, atoms, positioned boxes)
    /// to their final position.
    pub fn translate_subtree(&mut self, id: BoxId, dx: f32, dy: f32) {
        if dx == 0.0 && dy == 0.0 {
            return;
        }
        let mut stack = vec![id];
        while let Some(current) = stack.pop() {
            let node = self.get_mut(current);
            node.geom.content.x += dx;
            node.geom.content.y += dy;
            stack.extend(node.children.iter().copied());
        }
    }
}
