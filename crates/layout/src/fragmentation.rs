//! Fragmentation: slicing the laid-out tree into pages.
//!
//! A sequential cursor walks the tree in block order, translating document
//! coordinates onto the current page. A box that does not fit is either
//! moved to the next page whole (break-inside: avoid, orphan/widow
//! protection) or split at an allowed break point: between block siblings,
//! between line boxes, or between table rows. Content is never dropped;
//! whatever cannot stay on a page is relocated, and a box taller than a
//! page overflows rather than disappearing.

use crate::config::PageConfig;
use crate::output::{Fragment, FragmentContent, Page};
use crate::tree::{BoxContent, BoxId, BoxKind, BoxTree, RowGroupKind};
use folio_style::Position;
use folio_types::{Edges, Rect};
use std::sync::Arc;

const EPS: f32 = 0.01;

/// Splits a laid-out tree into pages. An empty document still produces
/// exactly one page.
pub fn paginate(tree: &BoxTree, config: &PageConfig) -> Vec<Page> {
    let content_area = config.content_area();
    let mut paginator = Paginator {
        tree,
        config,
        content_area,
        pages: Vec::new(),
        page_fragments: Vec::new(),
        stack: Vec::new(),
        offset: content_area.y,
        page_has_content: false,
        break_pending: false,
        forced_inside: vec![false; tree.len()],
    };
    compute_forced_breaks(tree, tree.root, &mut paginator.forced_inside);

    let root = tree.root;
    paginator.emit_box(root);
    paginator.finish()
}

/// Marks boxes whose subtree contains a forced page break between in-flow
/// descendants, so "fits on this page" never swallows one.
fn compute_forced_breaks(tree: &BoxTree, id: BoxId, flags: &mut [bool]) -> bool {
    let mut found = false;
    for &child in &tree.get(id).children {
        if tree.get(child).kind.is_out_of_flow() {
            continue;
        }
        let style = &tree.get(child).style;
        if style.breaks.break_before.is_forced() || style.breaks.break_after.is_forced() {
            found = true;
        }
        if compute_forced_breaks(tree, child, flags) {
            found = true;
        }
    }
    flags[id.index()] = found;
    found
}

struct OpenFrame {
    kind: BoxKind,
    style: Arc<crate::style::ComputedStyle>,
    padding: Edges,
    border: Edges,
    /// Page x and border-box width; horizontal placement never changes
    /// across pages.
    x: f32,
    width: f32,
    /// Page y of the border-box top on the current page.
    top: f32,
    /// Document y of the box's true bottom edge.
    doc_bottom: f32,
    continues_before: bool,
    children: Vec<Fragment>,
}

struct Paginator<'t> {
    tree: &'t BoxTree,
    config: &'t PageConfig,
    content_area: Rect,
    pages: Vec<Page>,
    page_fragments: Vec<Fragment>,
    stack: Vec<OpenFrame>,
    /// Maps document y to page y for content currently being emitted.
    offset: f32,
    page_has_content: bool,
    break_pending: bool,
    forced_inside: Vec<bool>,
}

impl Paginator<'_> {
    fn limit(&self) -> f32 {
        self.content_area.bottom()
    }

    fn page_height(&self) -> f32 {
        self.content_area.height
    }

    fn emit_box(&mut self, id: BoxId) {
        let node = self.tree.get(id);
        match node.kind {
            BoxKind::Positioned(Position::Fixed) => return,
            BoxKind::Positioned(Position::Absolute)
            | BoxKind::Floated(_)
            | BoxKind::ListMarker => {
                self.emit_atomic(id, false);
                return;
            }
            _ => {}
        }

        let style = node.style.clone();
        let bb = node.geom.border_box();

        if (self.break_pending || style.breaks.break_before.is_forced()) && self.page_has_content
        {
            self.new_page(bb.y);
        }
        self.break_pending = false;

        let bottom = bb.bottom() + self.offset;
        let fits = bottom <= self.limit() + EPS;
        let has_forced_inside = self.forced_inside[id.index()];

        if fits && !has_forced_inside {
            self.emit_atomic(id, false);
            self.after_box(&style);
            return;
        }

        // Unbreakable content moves to the next page whole; if it is
        // taller than a page it overflows there instead of vanishing.
        let avoid = style.breaks.break_inside == folio_style::BreakInside::Avoid;
        let movable = bb.height <= self.page_height() + EPS;
        if !fits && avoid && movable && self.page_has_content && !has_forced_inside {
            self.new_page(bb.y);
            self.emit_atomic(id, false);
            self.after_box(&style);
            return;
        }

        if !self.splittable(id) {
            if !fits && self.page_has_content && movable {
                self.new_page(bb.y);
                self.emit_atomic(id, false);
            } else if !fits
                && !movable
                && matches!(node.kind, BoxKind::Block | BoxKind::AnonymousBlock)
            {
                // A leaf block taller than a page: slice it across pages
                // rather than drop or overflow anything.
                self.emit_sliced(id);
            } else {
                self.emit_atomic(id, false);
            }
            self.after_box(&style);
            return;
        }

        // Orphan protection: when too few of a text block's lines would
        // land on this page, the whole block starts on the next one.
        if let Some(lines) = self.line_children(id) {
            let (orphans, widows) = self.line_minimums(&style);
            let total = lines.len();
            let fitting = lines
                .iter()
                .take_while(|&&line| {
                    self.tree.get(line).geom.content.bottom() + self.offset
                        <= self.limit() + EPS
                })
                .count();
            let no_split = total < orphans + widows;
            let starved = fitting < orphans.min(total);
            if (no_split || starved) && self.page_has_content {
                self.new_page(bb.y);
                if bb.bottom() + self.offset <= self.limit() + EPS && !has_forced_inside {
                    self.emit_atomic(id, false);
                    self.after_box(&style);
                    return;
                }
            }
            if no_split {
                // Never split below the minimum; place whole, overflowing
                // if it must.
                self.emit_atomic(id, false);
                self.after_box(&style);
                return;
            }
        }

        match node.kind {
            BoxKind::Table => self.emit_table(id),
            _ => {
                self.open_frame(id);
                if let Some(lines) = self.line_children(id) {
                    self.emit_line_block(id, &lines);
                } else {
                    for child in &self.tree.get(id).children {
                        self.emit_box(*child);
                    }
                }
                self.close_frame();
            }
        }
        self.after_box(&style);
    }

    fn after_box(&mut self, style: &crate::style::ComputedStyle) {
        if style.breaks.break_after.is_forced() {
            self.break_pending = true;
        }
    }

    fn splittable(&self, id: BoxId) -> bool {
        let node = self.tree.get(id);
        match node.kind {
            BoxKind::Block | BoxKind::AnonymousBlock | BoxKind::TableCell => {
                !node.children.is_empty()
            }
            BoxKind::Table => true,
            _ => false,
        }
    }

    /// The block's line boxes, when it is an inline formatting context.
    fn line_children(&self, id: BoxId) -> Option<Vec<BoxId>> {
        let children = &self.tree.get(id).children;
        let lines: Vec<BoxId> = children
            .iter()
            .copied()
            .filter(|&c| self.tree.get(c).kind == BoxKind::Line)
            .collect();
        if lines.is_empty() { None } else { Some(lines) }
    }

    fn line_minimums(&self, style: &crate::style::ComputedStyle) -> (usize, usize) {
        let orphans = style.breaks.orphans.unwrap_or(self.config.orphans).max(1) as usize;
        let widows = style.breaks.widows.unwrap_or(self.config.widows).max(1) as usize;
        (orphans, widows)
    }

    /// Emits an IFC block's lines page by page, honoring orphan/widow
    /// minimums. Out-of-line children (floats, markers) land on the page
    /// their document position maps to.
    fn emit_line_block(&mut self, id: BoxId, lines: &[BoxId]) {
        let style = self.tree.get(id).style.clone();
        let (orphans, widows) = self.line_minimums(&style);
        let total = lines.len();

        let mut atomics: Vec<BoxId> = self
            .tree
            .get(id)
            .children
            .iter()
            .copied()
            .filter(|&c| {
                let kind = self.tree.get(c).kind;
                kind != BoxKind::Line && kind != BoxKind::Positioned(Position::Fixed)
            })
            .collect();

        let tree = self.tree;
        let line_top = |line: BoxId| tree.get(line).geom.content.y;
        let line_bottom = |line: BoxId| tree.get(line).geom.content.bottom();

        let mut idx = 0usize;
        while idx < total {
            let mut fit_end = idx;
            while fit_end < total
                && line_bottom(lines[fit_end]) + self.offset <= self.limit() + EPS
            {
                fit_end += 1;
            }

            if fit_end >= total {
                for &line in &lines[idx..] {
                    self.emit_atomic(line, false);
                }
                idx = total;
                self.emit_due_atomics(&mut atomics);
                break;
            }

            // Break before `fit_end`, pulled back so at least `widows`
            // lines continue, pushed forward so at least one line makes
            // progress on an otherwise empty page.
            let mut break_idx = fit_end.min(total - widows);
            if break_idx < idx + orphans {
                break_idx = if self.page_has_content && idx == 0 {
                    // Handled by the pre-check in emit_box; keep the
                    // lines together as a fallback.
                    idx + orphans.min(total - idx)
                } else {
                    fit_end.max(idx + 1)
                };
            }
            break_idx = break_idx.clamp(idx + 1, total);

            for &line in &lines[idx..break_idx] {
                self.emit_atomic(line, false);
            }
            self.emit_due_atomics(&mut atomics);
            if break_idx >= total {
                idx = total;
                break;
            }
            self.new_page(line_top(lines[break_idx]));
            idx = break_idx;
        }

        // Anything left over (floats below the last line, for instance).
        let rest = std::mem::take(&mut atomics);
        for atomic in rest {
            self.emit_atomic(atomic, false);
        }
    }

    /// Emits the atomic companions of a line run whose document position
    /// falls on the current page.
    fn emit_due_atomics(&mut self, atomics: &mut Vec<BoxId>) {
        let due: Vec<BoxId> = atomics
            .iter()
            .copied()
            .filter(|&a| self.tree.get(a).geom.border_box().y + self.offset < self.limit() - EPS)
            .collect();
        atomics.retain(|a| !due.contains(a));
        for atomic in due {
            self.emit_atomic(atomic, false);
        }
    }

    /// Emits a table row by row. Header and footer row groups are
    /// re-emitted on every page the table spans, marked `synthesized`,
    /// and the page capacity shrinks accordingly.
    fn emit_table(&mut self, id: BoxId) {
        let spacing = self.tree.get(id).style.table.border_spacing.max(0.0);
        let groups = self.tree.children(id);
        let header = groups
            .iter()
            .copied()
            .find(|&g| self.tree.get(g).kind == BoxKind::TableRowGroup(RowGroupKind::Header));
        let footer = groups
            .iter()
            .copied()
            .find(|&g| self.tree.get(g).kind == BoxKind::TableRowGroup(RowGroupKind::Footer));
        let header_height = header
            .map(|h| self.tree.get(h).geom.content.height + spacing)
            .unwrap_or(0.0);
        let footer_height = footer
            .map(|f| self.tree.get(f).geom.content.height + spacing)
            .unwrap_or(0.0);

        self.open_frame(id);

        let mut rows_on_page = 0usize;
        let mut last_row_bottom_page = self.tree.get(id).geom.content.y + self.offset;

        for group in groups {
            let is_footer =
                self.tree.get(group).kind == BoxKind::TableRowGroup(RowGroupKind::Footer);
            self.open_frame(group);
            for row in self.tree.children(group) {
                let row_rect = self.tree.get(row).geom.content;
                let reserve = if is_footer { 0.0 } else { footer_height };
                let row_bottom = row_rect.bottom() + self.offset;

                if row_bottom > self.limit() - reserve + EPS && self.page_has_content {
                    if rows_on_page > 0 {
                        // Repeat the footer at the bottom of this page's
                        // slice, then continue on a fresh page under a
                        // repeated header.
                        if let Some(footer_id) = footer {
                            if !is_footer {
                                let footer_doc_top = self.tree.get(footer_id).geom.content.y;
                                let dy = last_row_bottom_page + spacing - footer_doc_top;
                                let copy =
                                    self.snapshot(footer_id, self.content_area.x, dy, true);
                                self.push_into_table_frame(copy);
                            }
                        }
                        self.new_page(row_rect.y);
                        rows_on_page = 0;
                        if let Some(header_id) = header {
                            let header_doc_top = self.tree.get(header_id).geom.content.y;
                            let dy = self.content_area.y - header_doc_top;
                            let copy = self.snapshot(header_id, self.content_area.x, dy, true);
                            self.push_into_table_frame(copy);
                            self.offset += header_height;
                        }
                    } else {
                        // The table opened too low on a busy page: move
                        // its start to the next page before the first
                        // row lands.
                        self.new_page(row_rect.y);
                    }
                }

                self.emit_atomic(row, false);
                rows_on_page += 1;
                last_row_bottom_page = self.tree.get(row).geom.content.bottom() + self.offset;
            }
            self.close_frame();
        }

        self.close_frame();
    }

    /// Cuts a box with no inner break opportunities into page-height
    /// slices. Each page receives a contiguous vertical slice; together
    /// the slices reconstruct the full border box.
    fn emit_sliced(&mut self, id: BoxId) {
        let bb = self.tree.get(id).geom.border_box();
        let mut slice_top_doc = bb.y;
        let mut first = true;
        loop {
            let top_page = slice_top_doc + self.offset;
            if top_page >= self.limit() - EPS && self.page_has_content {
                self.new_page(slice_top_doc);
                continue;
            }
            let natural_bottom = bb.bottom() + self.offset;
            if natural_bottom <= self.limit() + EPS {
                let mut fragment = self.snapshot(id, self.content_area.x, self.offset, false);
                fragment.border_box = Rect::new(
                    bb.x + self.content_area.x,
                    slice_top_doc + self.offset,
                    bb.width,
                    natural_bottom - (slice_top_doc + self.offset),
                );
                fragment.continues_before = !first;
                self.push_fragment(fragment);
                self.page_has_content = true;
                return;
            }

            let mut fragment = self.snapshot(id, self.content_area.x, self.offset, false);
            fragment.border_box = Rect::new(
                bb.x + self.content_area.x,
                slice_top_doc + self.offset,
                bb.width,
                self.limit() - (slice_top_doc + self.offset),
            );
            fragment.continues_before = !first;
            fragment.continues_after = true;
            fragment.children.clear();
            self.push_fragment(fragment);
            self.page_has_content = true;

            let cut_doc = self.limit() - self.offset;
            self.new_page(cut_doc);
            slice_top_doc = cut_doc;
            first = false;
        }
    }

    /// Repeated header/footer copies become siblings of the row groups,
    /// directly under the table fragment.
    fn push_into_table_frame(&mut self, fragment: Fragment) {
        let len = self.stack.len();
        if len >= 2 {
            self.stack[len - 2].children.push(fragment);
        } else {
            self.push_fragment(fragment);
        }
        self.page_has_content = true;
    }

    /// Emits a whole subtree at the current offset as one fragment.
    fn emit_atomic(&mut self, id: BoxId, synthesized: bool) {
        let fragment = self.snapshot(id, self.content_area.x, self.offset, synthesized);
        self.push_fragment(fragment);
        self.page_has_content = true;
    }

    fn snapshot(&self, id: BoxId, dx: f32, dy: f32, synthesized: bool) -> Fragment {
        let node = self.tree.get(id);
        let children = node
            .children
            .iter()
            .copied()
            .filter(|&c| self.tree.get(c).kind != BoxKind::Positioned(Position::Fixed))
            .map(|c| self.snapshot(c, dx, dy, synthesized))
            .collect();
        Fragment {
            kind: node.kind,
            style: node.style.clone(),
            border_box: node.geom.border_box().translated(dx, dy),
            padding: node.geom.padding,
            border: node.geom.border,
            baseline: node.geom.baseline,
            content: match &node.content {
                BoxContent::None => FragmentContent::Container,
                BoxContent::Text(text) => FragmentContent::Text(text.clone()),
                BoxContent::Replaced(reference) => FragmentContent::Replaced(reference.clone()),
            },
            children,
            continues_before: false,
            continues_after: false,
            synthesized,
        }
    }

    fn push_fragment(&mut self, fragment: Fragment) {
        match self.stack.last_mut() {
            Some(frame) => frame.children.push(fragment),
            None => self.page_fragments.push(fragment),
        }
    }

    fn open_frame(&mut self, id: BoxId) {
        let node = self.tree.get(id);
        let bb = node.geom.border_box();
        self.stack.push(OpenFrame {
            kind: node.kind,
            style: node.style.clone(),
            padding: node.geom.padding,
            border: node.geom.border,
            x: bb.x + self.content_area.x,
            width: bb.width,
            top: bb.y + self.offset,
            doc_bottom: bb.bottom(),
            continues_before: false,
            children: Vec::new(),
        });
    }

    /// Closes the innermost frame at its natural bottom. Trailing space
    /// that would poke past the page edge is truncated, the way margins
    /// vanish at a fragmentation break; overflowing leaf fragments keep
    /// their full extent.
    fn close_frame(&mut self) {
        let frame = self.stack.pop().expect("unbalanced frame stack");
        let bottom = (frame.doc_bottom + self.offset).min(self.limit());
        let fragment = Self::frame_fragment(frame, bottom, false);
        self.push_fragment(fragment);
    }

    fn frame_fragment(frame: OpenFrame, bottom_page_y: f32, continues_after: bool) -> Fragment {
        Fragment {
            kind: frame.kind,
            style: frame.style,
            border_box: Rect::new(
                frame.x,
                frame.top,
                frame.width,
                (bottom_page_y - frame.top).max(0.0),
            ),
            padding: frame.padding,
            border: frame.border,
            baseline: None,
            content: FragmentContent::Container,
            children: frame.children,
            continues_before: frame.continues_before,
            continues_after,
            synthesized: false,
        }
    }

    /// Closes the current page: open frames are cut at the page edge and
    /// re-opened (as continuations) on the fresh page, and the document
    /// position `resume_doc` is mapped to the top of the new page.
    fn new_page(&mut self, resume_doc: f32) {
        let limit = self.limit();

        // Remember how to reopen the chain.
        let reopen: Vec<(BoxKind, Arc<crate::style::ComputedStyle>, Edges, Edges, f32, f32, f32)> =
            self.stack
                .iter()
                .map(|f| (f.kind, f.style.clone(), f.padding, f.border, f.x, f.width, f.doc_bottom))
                .collect();

        // Collapse the open chain into nested fragments, outermost last.
        let mut inner: Option<Fragment> = None;
        while let Some(frame) = self.stack.pop() {
            let natural_bottom = frame.doc_bottom + self.offset;
            let continues = natural_bottom > limit + EPS;
            let cut = natural_bottom.min(limit);
            let mut fragment = Self::frame_fragment(frame, cut, continues);
            if let Some(child) = inner.take() {
                fragment.children.push(child);
            }
            inner = Some(fragment);
        }
        if let Some(top) = inner {
            self.page_fragments.push(top);
        }

        self.flush_page();

        // Fresh page: the resume point maps to the content top and every
        // open box continues with its top edge at the break.
        self.offset = self.content_area.y - resume_doc;
        for (kind, style, padding, border, x, width, doc_bottom) in reopen {
            self.stack.push(OpenFrame {
                kind,
                style,
                padding,
                border,
                x,
                width,
                top: self.content_area.y,
                doc_bottom,
                continues_before: true,
                children: Vec::new(),
            });
        }
    }

    fn flush_page(&mut self) {
        let fragments = std::mem::take(&mut self.page_fragments);
        self.pages.push(Page {
            index: self.pages.len(),
            content_area: self.content_area,
            fragments,
        });
        self.page_has_content = false;
    }

    fn finish(mut self) -> Vec<Page> {
        while !self.stack.is_empty() {
            self.close_frame();
        }
        if !self.page_fragments.is_empty() || self.pages.is_empty() {
            self.flush_page();
        }

        // Fixed-position boxes repeat on every page; copies after the
        // first are synthesized re-emissions.
        let fixed = collect_fixed(self.tree, self.tree.root);
        if !fixed.is_empty() {
            for page in self.pages.iter_mut() {
                for &id in &fixed {
                    let synthesized = page.index > 0;
                    let snap = snapshot_fixed(self.tree, id, synthesized);
                    page.fragments.push(snap);
                }
            }
        }
        self.pages
    }
}

/// Fixed boxes carry page coordinates already; snapshot without offset.
fn snapshot_fixed(tree: &BoxTree, id: BoxId, synthesized: bool) -> Fragment {
    let node = tree.get(id);
    Fragment {
        kind: node.kind,
        style: node.style.clone(),
        border_box: node.geom.border_box(),
        padding: node.geom.padding,
        border: node.geom.border,
        baseline: node.geom.baseline,
        content: match &node.content {
            BoxContent::None => FragmentContent::Container,
            BoxContent::Text(text) => FragmentContent::Text(text.clone()),
            BoxContent::Replaced(reference) => FragmentContent::Replaced(reference.clone()),
        },
        children: node
            .children
            .iter()
            .map(|&c| snapshot_fixed(tree, c, synthesized))
            .collect(),
        continues_before: false,
        continues_after: false,
        synthesized,
    }
}

fn collect_fixed(tree: &BoxTree, id: BoxId) -> Vec<BoxId> {
    let mut found = Vec::new();
    let mut stack = vec![id];
    while let Some(current) = stack.pop() {
        let node = tree.get(current);
        if node.kind == BoxKind::Positioned(Position::Fixed) {
            found.push(current);
            continue;
        }
        for &child in node.children.iter().rev() {
            stack.push(child);
        }
    }
    found
}

#[cfg(test)]
mod tests {
    use crate::output::FragmentContent;
    use crate::test_utils::*;
    use crate::tree::BoxKind;

    #[test]
    fn empty_document_still_yields_one_page() {
        let doc = element("body", &[], vec![]);
        let pages = paginate_doc(&doc, 200.0, 100.0);
        assert_eq!(pages.len(), 1);
    }

    #[test]
    fn short_document_stays_on_one_page() {
        let doc = element(
            "body",
            &[],
            vec![element("div", &[("height", len(40.0))], vec![])],
        );
        let pages = paginate_doc(&doc, 200.0, 100.0);
        assert_eq!(pages.len(), 1);
    }

    #[test]
    fn blocks_flow_onto_following_pages() {
        let doc = element(
            "body",
            &[],
            vec![
                element("div", &[("height", len(60.0))], vec![]),
                element("div", &[("height", len(60.0))], vec![]),
                element("div", &[("height", len(60.0))], vec![]),
            ],
        );
        let pages = paginate_doc(&doc, 200.0, 100.0);
        assert_eq!(pages.len(), 3);
        for page in &pages {
            // Each page carries the body continuation with one block.
            let body = &page.fragments[0];
            assert_eq!(body.children.len(), 1);
            assert_eq!(body.children[0].border_box.y, 0.0);
        }
        assert!(pages[0].fragments[0].continues_after);
        assert!(pages[1].fragments[0].continues_before);
    }

    #[test]
    fn tall_leaf_block_is_sliced_with_heights_preserved() {
        let doc = element(
            "body",
            &[],
            vec![element("div", &[("height", len(250.0))], vec![])],
        );
        let pages = paginate_doc(&doc, 200.0, 100.0);
        assert!(pages.len() >= 3);
        let mut total = 0.0;
        let mut tops = Vec::new();
        for page in &pages {
            let body = &page.fragments[0];
            if let Some(slice) = body.children.first() {
                total += slice.border_box.height;
                tops.push(slice.border_box.y);
            }
        }
        assert!((total - 250.0).abs() < 0.1);
        // Every slice starts at its page's top.
        for top in tops {
            assert_eq!(top, 0.0);
        }
    }

    #[test]
    fn forced_break_starts_a_new_page() {
        let doc = element(
            "body",
            &[],
            vec![
                element("div", &[("height", len(10.0))], vec![]),
                element(
                    "div",
                    &[("break-before", kw("page")), ("height", len(10.0))],
                    vec![],
                ),
            ],
        );
        let pages = paginate_doc(&doc, 200.0, 100.0);
        assert_eq!(pages.len(), 2);
    }

    #[test]
    fn break_inside_avoid_moves_the_box_whole() {
        let doc = element(
            "body",
            &[],
            vec![
                element("div", &[("height", len(70.0))], vec![]),
                element(
                    "div",
                    &[("break-inside", kw("avoid")), ("height", len(60.0))],
                    vec![],
                ),
            ],
        );
        let pages = paginate_doc(&doc, 200.0, 100.0);
        assert_eq!(pages.len(), 2);
        let second = &pages[1].fragments[0];
        let moved = &second.children[0];
        assert_eq!(moved.border_box.y, 0.0);
        assert_eq!(moved.border_box.height, 60.0);
        assert!(!moved.continues_before);
    }

    #[test]
    fn text_splits_between_lines_and_preserves_content() {
        // 12 lines of 10pt in a 45pt page: orphans/widows permitting,
        // lines spread over several pages with nothing lost.
        let mut words = Vec::new();
        for i in 0..12 {
            words.push(format!("w{:02}aaaaaaaaaaaaaaaaaa", i));
        }
        let doc = element(
            "body",
            &[("font-size", len(10.0)), ("line-height", len(10.0))],
            vec![element("p", &[], vec![text(&words.join(" "))])],
        );
        // 20 chars * 5pt = 100pt per word: one word per 110pt line.
        let pages = paginate_doc(&doc, 110.0, 45.0);
        assert!(pages.len() > 1);

        let mut seen = Vec::new();
        for page in &pages {
            for leaf in page.leaf_fragments() {
                if let FragmentContent::Text(text) = &leaf.content {
                    if !leaf.synthesized {
                        for word in text.split_whitespace() {
                            seen.push(word.to_string());
                        }
                    }
                }
            }
        }
        assert_eq!(seen, words, "pagination must neither drop nor duplicate text");
    }

    #[test]
    fn orphan_minimum_moves_the_block_start() {
        // 35pt used, 10pt left on page one: a single line would be
        // stranded, so the whole paragraph starts on page two.
        let doc = element(
            "body",
            &[("font-size", len(10.0)), ("line-height", len(10.0))],
            vec![
                element("div", &[("height", len(35.0))], vec![]),
                element("p", &[], vec![text("aa aa aa aa aa aa aa aa aa aa aa aa")]),
            ],
        );
        let pages = paginate_doc(&doc, 30.0, 45.0);
        assert!(pages.len() >= 2);
        // No line of the paragraph may sit on page one.
        let page_one_lines: Vec<_> = pages[0]
            .fragments
            .iter()
            .flat_map(|f| {
                let mut lines = Vec::new();
                f.visit(&mut |frag| {
                    if frag.kind == BoxKind::Line {
                        lines.push(frag.border_box);
                    }
                });
                lines
            })
            .collect();
        assert!(page_one_lines.is_empty());
    }

    #[test]
    fn table_header_repeats_on_every_table_page() {
        let mut rows = vec![element(
            "tr",
            &[],
            vec![element("td", &[], vec![text("head")])],
        )];
        let header = element("thead", &[], rows.drain(..).collect());
        let mut body_rows = Vec::new();
        for i in 0..8 {
            body_rows.push(element(
                "tr",
                &[],
                vec![element("td", &[], vec![text(&format!("row{}", i))])],
            ));
        }
        let doc = element(
            "body",
            &[("font-size", len(10.0)), ("line-height", len(10.0))],
            vec![element(
                "table",
                &[("width", len(100.0))],
                vec![header, element("tbody", &[], body_rows)],
            )],
        );
        let pages = paginate_doc(&doc, 200.0, 45.0);
        assert!(pages.len() > 1, "table must span pages");

        for (index, page) in pages.iter().enumerate() {
            let mut header_texts = 0;
            let mut synthesized_headers = 0;
            for leaf in page.leaf_fragments() {
                if let FragmentContent::Text(text) = &leaf.content {
                    if text.contains("head") {
                        header_texts += 1;
                        if leaf.synthesized {
                            synthesized_headers += 1;
                        }
                    }
                }
            }
            assert_eq!(header_texts, 1, "page {} must show the header once", index);
            if index > 0 {
                assert_eq!(synthesized_headers, 1);
            }
        }
    }

    #[test]
    fn pagination_is_deterministic() {
        let doc = element(
            "body",
            &[("font-size", len(10.0))],
            vec![
                element("p", &[], vec![text("aa aa aa aa aa aa aa aa")]),
                element("div", &[("height", len(120.0))], vec![]),
                element("p", &[], vec![text("bb bb bb bb")]),
            ],
        );
        let first = paginate_doc(&doc, 100.0, 80.0);
        let second = paginate_doc(&doc, 100.0, 80.0);
        assert_eq!(first.len(), second.len());
        for (a, b) in first.iter().zip(second.iter()) {
            let left: Vec<_> = a
                .leaf_fragments()
                .iter()
                .map(|f| (f.border_box, f.content.clone()))
                .collect();
            let right: Vec<_> = b
                .leaf_fragments()
                .iter()
                .map(|f| (f.border_box, f.content.clone()))
                .collect();
            assert_eq!(left, right);
        }
    }
}
