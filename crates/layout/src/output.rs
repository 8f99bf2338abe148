//! The page output model: the immutable result of pagination.
//!
//! Pages own fragments; a fragment is a box (or a slice of a box that
//! crossed a page boundary) with page-relative geometry. Painting
//! backends consume this read-only structure and nothing else.

use crate::style::ComputedStyle;
use crate::tree::BoxKind;
use folio_dom::TextStr;
use folio_types::{ContentRef, Edges, Rect};
use std::sync::Arc;

#[derive(Debug, Clone, PartialEq)]
pub enum FragmentContent {
    Container,
    Text(TextStr),
    Replaced(ContentRef),
}

#[derive(Debug, Clone)]
pub struct Fragment {
    pub kind: BoxKind,
    pub style: Arc<ComputedStyle>,
    /// Border box in page coordinates (page top-left is the origin).
    pub border_box: Rect,
    pub padding: Edges,
    pub border: Edges,
    /// Baseline offset from the content-box top, for text and line
    /// fragments.
    pub baseline: Option<f32>,
    pub content: FragmentContent,
    pub children: Vec<Fragment>,
    /// The box continues from the previous page; its top edge is a break,
    /// so top border and padding are not painted.
    pub continues_before: bool,
    /// The box continues onto the next page.
    pub continues_after: bool,
    /// Re-emitted content (repeated table headers/footers, fixed-position
    /// boxes after their first page); excluded from content accounting.
    pub synthesized: bool,
}

impl Fragment {
    pub fn content_rect(&self) -> Rect {
        self.border_box.inset(&self.border).inset(&self.padding)
    }

    pub fn is_leaf_content(&self) -> bool {
        !matches!(self.content, FragmentContent::Container)
    }

    /// Depth-first visit of this fragment and everything below it.
    pub fn visit<'a>(&'a self, f: &mut impl FnMut(&'a Fragment)) {
        f(self);
        for child in &self.children {
            child.visit(f);
        }
    }
}

/// One finished page. Immutable once pagination has produced it.
#[derive(Debug, Clone)]
pub struct Page {
    pub index: usize,
    /// The content area in page coordinates.
    pub content_area: Rect,
    pub fragments: Vec<Fragment>,
}

impl Page {
    pub fn fragments(&self) -> &[Fragment] {
        &self.fragments
    }

    /// All text/replaced leaves on the page in paint order.
    pub fn leaf_fragments(&self) -> Vec<&Fragment> {
        let mut leaves = Vec::new();
        for fragment in &self.fragments {
            fragment.visit(&mut |f| {
                if f.is_leaf_content() {
                    leaves.push(f);
                }
            });
        }
        leaves
    }

    /// Concatenated text content of the page, for assertions and
    /// extraction.
    pub fn text_content(&self) -> String {
        let mut out = String::new();
        for fragment in &self.fragments {
            fragment.visit(&mut |f| {
                if let FragmentContent::Text(text) = &f.content {
                    if !f.synthesized {
                        out.push_str(text);
                        out.push(' ');
                    }
                }
            });
        }
        out
    }
}
