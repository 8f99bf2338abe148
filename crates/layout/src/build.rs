//! Box generation: styled tree in, normalized box tree out.
//!
//! This stage applies the CSS box-generation rules: `display: none`
//! elimination, anonymous block wrapping where inline- and block-level
//! siblings mix, table fixup into the canonical
//! table → row-group → row → cell shape, generated content, list markers,
//! and whitespace collapsing. The returned tree is geometry-free; the
//! formatting context engine fills geometry in afterwards.

use crate::style::ComputedStyle;
use crate::tree::{BoxContent, BoxId, BoxKind, BoxTree, LayoutBox, RowGroupKind};
use folio_dom::{ElementNode, PseudoContent, StyledNode};
use folio_style::{Display, Float, ListStylePosition, WhiteSpace};
use itertools::Itertools;
use log::warn;
use std::sync::Arc;

/// Builds the box tree for a validated styled tree.
pub fn build_box_tree(root: &StyledNode) -> BoxTree {
    let mut builder = Builder {
        tree: BoxTree::with_root(LayoutBox::new(
            BoxKind::Block,
            Arc::new(ComputedStyle::default()),
        )),
        source: 0,
    };

    if let StyledNode::Element(el) = root {
        let style = Arc::new(ComputedStyle::resolve(&el.tag, &el.properties, None));
        if style.flow.display != Display::None {
            if let Some(id) = builder.build_element(el, style, ParentContext::Normal, 0) {
                builder.tree.root = id;
            }
        }
    }
    builder.tree
}

/// What kind of parent the children being built will be attached to;
/// controls whether table-internal display values are honored or degraded.
#[derive(Debug, Clone, Copy, PartialEq)]
enum ParentContext {
    Normal,
    Table,
    RowGroup,
    Row,
}

/// Classification used by the anonymous-block fixup.
#[derive(Debug, Clone, Copy, PartialEq)]
enum RunClass {
    BlockLevel,
    InlineLevel,
    /// Out-of-flow boxes and outside list markers; they never trigger
    /// anonymous wrapping on their own.
    Neutral,
}

struct Builder {
    tree: BoxTree,
    source: usize,
}

impl Builder {
    fn next_source(&mut self) -> usize {
        let s = self.source;
        self.source += 1;
        s
    }

    fn build_children(
        &mut self,
        el: &ElementNode,
        style: &Arc<ComputedStyle>,
        context: ParentContext,
    ) -> Vec<BoxId> {
        let mut out = Vec::new();
        let mut list_counter = 0usize;

        if let Some(before) = &el.before {
            if let Some(id) = self.build_pseudo(before, style) {
                out.push(id);
            }
        }

        for child in &el.children {
            match child {
                StyledNode::Text(text) => {
                    if let Some(id) = self.build_text(&text.text, style) {
                        out.push(id);
                    }
                }
                StyledNode::Element(child_el) => {
                    let child_style = Arc::new(ComputedStyle::resolve(
                        &child_el.tag,
                        &child_el.properties,
                        Some(style),
                    ));
                    if child_style.flow.display == Display::ListItem {
                        list_counter += 1;
                    }
                    if let Some(id) =
                        self.build_element(child_el, child_style, context, list_counter)
                    {
                        out.push(id);
                    }
                }
            }
        }

        if let Some(after) = &el.after {
            if let Some(id) = self.build_pseudo(after, style) {
                out.push(id);
            }
        }

        out
    }

    fn build_text(&mut self, text: &str, parent_style: &Arc<ComputedStyle>) -> Option<BoxId> {
        let collapsed = collapse_whitespace(text, parent_style.text.white_space);
        if collapsed.is_empty() {
            return None;
        }
        // Text runs share the parent element's style wholesale; a text box
        // consults only the text and inline-alignment groups, and keeping
        // the same Arc lets adjacent fragments merge per line.
        let style = parent_style.clone();
        let source = self.next_source();
        let mut node = LayoutBox::with_content(BoxKind::Inline, style, BoxContent::Text(collapsed));
        node.source = Some(source);
        Some(self.tree.alloc(node))
    }

    fn build_pseudo(
        &mut self,
        pseudo: &PseudoContent,
        parent_style: &Arc<ComputedStyle>,
    ) -> Option<BoxId> {
        let style = Arc::new(ComputedStyle::resolve(
            "::pseudo",
            &pseudo.properties,
            Some(parent_style),
        ));
        let collapsed = collapse_whitespace(&pseudo.text, style.text.white_space);
        if collapsed.is_empty() {
            return None;
        }
        Some(self.tree.alloc(LayoutBox::with_content(
            BoxKind::Inline,
            style,
            BoxContent::Text(collapsed),
        )))
    }

    fn build_element(
        &mut self,
        el: &ElementNode,
        style: Arc<ComputedStyle>,
        context: ParentContext,
        list_index: usize,
    ) -> Option<BoxId> {
        let display = style.flow.display;
        if display == Display::None {
            return None;
        }
        let source = self.next_source();

        let content = match &el.content {
            Some(reference) => BoxContent::Replaced(reference.clone()),
            None => BoxContent::None,
        };

        // Kind precedence: positioning scheme, then float, then replaced
        // content, then the display type.
        let kind = if style.flow.position.is_out_of_flow() {
            BoxKind::Positioned(style.flow.position)
        } else if style.flow.float != Float::None {
            BoxKind::Floated(style.flow.float)
        } else if el.content.is_some() {
            BoxKind::Replaced
        } else {
            match display {
                Display::Block | Display::ListItem => BoxKind::Block,
                Display::Inline => BoxKind::Inline,
                Display::InlineBlock => BoxKind::InlineBlock,
                Display::Table => BoxKind::Table,
                Display::TableHeaderGroup if context == ParentContext::Table => {
                    BoxKind::TableRowGroup(RowGroupKind::Header)
                }
                Display::TableRowGroup if context == ParentContext::Table => {
                    BoxKind::TableRowGroup(RowGroupKind::Body)
                }
                Display::TableFooterGroup if context == ParentContext::Table => {
                    BoxKind::TableRowGroup(RowGroupKind::Footer)
                }
                Display::TableRow
                    if matches!(context, ParentContext::Table | ParentContext::RowGroup) =>
                {
                    BoxKind::TableRow
                }
                Display::TableCell if context != ParentContext::Normal => BoxKind::TableCell,
                other if other.is_table_internal() => {
                    warn!(
                        "table-internal display {:?} outside a table on <{}>, degrading to block",
                        other, el.tag
                    );
                    BoxKind::Block
                }
                Display::None => unreachable!("display:none filtered above"),
                _ => BoxKind::Block,
            }
        };

        let mut node = LayoutBox::with_content(kind, style.clone(), content);
        node.source = Some(source);
        let id = self.tree.alloc(node);

        // Replaced boxes are leaves; any markup children are ignored.
        if el.content.is_some() {
            return Some(id);
        }

        let child_context = match kind {
            BoxKind::Table => ParentContext::Table,
            BoxKind::TableRowGroup(_) => ParentContext::RowGroup,
            BoxKind::TableRow => ParentContext::Row,
            _ => ParentContext::Normal,
        };
        let mut children = self.build_children(el, &style, child_context);

        if display == Display::ListItem {
            if let Some(marker) = self.build_marker(&style, list_index) {
                children.insert(0, marker);
            }
        }

        let children = match kind {
            BoxKind::Table => self.fixup_table_children(children, &style),
            BoxKind::TableRowGroup(_) => self.fixup_row_group_children(children, &style),
            BoxKind::TableRow => self.fixup_row_children(children, &style),
            BoxKind::Inline => self.fixup_inline_children(children, el),
            _ => self.fixup_block_children(children, &style),
        };

        self.tree.get_mut(id).children = children;
        Some(id)
    }

    fn build_marker(&mut self, item_style: &Arc<ComputedStyle>, index: usize) -> Option<BoxId> {
        let text = item_style.list.style_type.marker_text(index)?;
        let style = Arc::new(item_style.inherited_only());
        Some(self.tree.alloc(LayoutBox::with_content(
            BoxKind::ListMarker,
            style,
            BoxContent::Text(text),
        )))
    }

    /// A block-level box nested inside an inline box would normally split
    /// the inline into anonymous pieces; that rarely occurs in print
    /// documents, so the block degrades to inline-block instead.
    fn fixup_inline_children(&mut self, children: Vec<BoxId>, el: &ElementNode) -> Vec<BoxId> {
        for &child in &children {
            if self.tree.get(child).kind.is_block_level() {
                warn!(
                    "block-level box inside inline <{}>, degrading to inline-block",
                    el.tag
                );
                self.tree.get_mut(child).kind = BoxKind::InlineBlock;
            }
        }
        children
    }

    /// Wraps runs of inline-level children in anonymous blocks when they
    /// mix with block-level siblings. Inline-only and block-only child
    /// lists pass through untouched.
    fn fixup_block_children(
        &mut self,
        children: Vec<BoxId>,
        parent_style: &Arc<ComputedStyle>,
    ) -> Vec<BoxId> {
        let has_block = children
            .iter()
            .any(|&id| self.classify(id) == RunClass::BlockLevel);
        let has_inline = children
            .iter()
            .any(|&id| self.classify(id) == RunClass::InlineLevel);
        if !(has_block && has_inline) {
            return children;
        }

        let runs: Vec<(bool, Vec<BoxId>)> = children
            .iter()
            .copied()
            .chunk_by(|&id| self.classify(id) != RunClass::BlockLevel)
            .into_iter()
            .map(|(inline_run, group)| (inline_run, group.collect()))
            .collect();

        let mut out = Vec::new();
        for (inline_run, run) in runs {
            if !inline_run {
                out.extend(run);
                continue;
            }
            // Whitespace-only runs between blocks generate no box; any
            // out-of-flow members are hoisted to direct children.
            if run.iter().all(|&id| !self.is_inline_content(id)) {
                out.extend(
                    run.into_iter()
                        .filter(|&id| self.classify(id) == RunClass::Neutral),
                );
                continue;
            }
            let style = Arc::new(ComputedStyle::anonymous(parent_style, Display::Block));
            let mut anon = LayoutBox::new(BoxKind::AnonymousBlock, style);
            anon.children = run;
            out.push(self.tree.alloc(anon));
        }
        out
    }

    /// Canonicalizes a table's child list into row groups ordered header,
    /// body, footer.
    fn fixup_table_children(
        &mut self,
        children: Vec<BoxId>,
        table_style: &Arc<ComputedStyle>,
    ) -> Vec<BoxId> {
        let mut groups = Vec::new();
        let mut stray: Vec<BoxId> = Vec::new();

        let children: Vec<BoxId> = children
            .into_iter()
            .filter(|&id| !self.is_droppable_whitespace(id))
            .collect();

        for id in children {
            match self.tree.get(id).kind {
                BoxKind::TableRowGroup(_) => {
                    self.flush_stray_rows(&mut stray, &mut groups, table_style);
                    let fixed = {
                        let group_children = self.tree.children(id);
                        self.fixup_row_group_children(group_children, table_style)
                    };
                    self.tree.get_mut(id).children = fixed;
                    groups.push(id);
                }
                _ => stray.push(id),
            }
        }
        self.flush_stray_rows(&mut stray, &mut groups, table_style);

        // Header groups lay out and paint first, footers last.
        let order = |kind: &BoxKind| match kind {
            BoxKind::TableRowGroup(RowGroupKind::Header) => 0,
            BoxKind::TableRowGroup(RowGroupKind::Footer) => 2,
            _ => 1,
        };
        groups.sort_by_key(|&id| order(&self.tree.get(id).kind));
        groups
    }

    /// Wraps a run of stray rows/cells/content into an anonymous body
    /// row-group.
    fn flush_stray_rows(
        &mut self,
        stray: &mut Vec<BoxId>,
        groups: &mut Vec<BoxId>,
        table_style: &Arc<ComputedStyle>,
    ) {
        if stray.is_empty() {
            return;
        }
        let members = std::mem::take(stray);
        let rows = self.fixup_row_group_children(members, table_style);
        if rows.is_empty() {
            return;
        }
        let style = Arc::new(ComputedStyle::anonymous(table_style, Display::TableRowGroup));
        let mut group = LayoutBox::new(BoxKind::TableRowGroup(RowGroupKind::Body), style);
        group.children = rows;
        groups.push(self.tree.alloc(group));
    }

    /// Ensures every child of a row group is a row.
    fn fixup_row_group_children(
        &mut self,
        children: Vec<BoxId>,
        parent_style: &Arc<ComputedStyle>,
    ) -> Vec<BoxId> {
        let mut rows = Vec::new();
        let mut stray: Vec<BoxId> = Vec::new();

        for id in children {
            if self.is_droppable_whitespace(id) {
                continue;
            }
            if self.tree.get(id).kind == BoxKind::TableRow {
                self.flush_stray_cells(&mut stray, &mut rows, parent_style);
                let fixed = {
                    let row_children = self.tree.children(id);
                    self.fixup_row_children(row_children, parent_style)
                };
                self.tree.get_mut(id).children = fixed;
                rows.push(id);
            } else {
                stray.push(id);
            }
        }
        self.flush_stray_cells(&mut stray, &mut rows, parent_style);
        rows
    }

    fn flush_stray_cells(
        &mut self,
        stray: &mut Vec<BoxId>,
        rows: &mut Vec<BoxId>,
        parent_style: &Arc<ComputedStyle>,
    ) {
        if stray.is_empty() {
            return;
        }
        let members = std::mem::take(stray);
        let cells = self.fixup_row_children(members, parent_style);
        if cells.is_empty() {
            return;
        }
        let style = Arc::new(ComputedStyle::anonymous(parent_style, Display::TableRow));
        let mut row = LayoutBox::new(BoxKind::TableRow, style);
        row.children = cells;
        rows.push(self.tree.alloc(row));
    }

    /// Ensures every child of a row is a cell; consecutive non-cell
    /// content is gathered into one anonymous cell.
    fn fixup_row_children(
        &mut self,
        children: Vec<BoxId>,
        parent_style: &Arc<ComputedStyle>,
    ) -> Vec<BoxId> {
        let mut cells = Vec::new();
        let mut stray: Vec<BoxId> = Vec::new();

        for id in children {
            if self.is_droppable_whitespace(id) {
                continue;
            }
            if self.tree.get(id).kind == BoxKind::TableCell {
                self.wrap_stray_cell(&mut stray, &mut cells, parent_style);
                cells.push(id);
            } else {
                stray.push(id);
            }
        }
        self.wrap_stray_cell(&mut stray, &mut cells, parent_style);
        cells
    }

    fn wrap_stray_cell(
        &mut self,
        stray: &mut Vec<BoxId>,
        cells: &mut Vec<BoxId>,
        parent_style: &Arc<ComputedStyle>,
    ) {
        if stray.is_empty() {
            return;
        }
        let members = std::mem::take(stray);
        let style = Arc::new(ComputedStyle::anonymous(parent_style, Display::TableCell));
        let fixed = self.fixup_block_children(members, &style);
        let mut cell = LayoutBox::new(BoxKind::TableCell, style);
        cell.children = fixed;
        cells.push(self.tree.alloc(cell));
    }

    fn classify(&self, id: BoxId) -> RunClass {
        let node = self.tree.get(id);
        match node.kind {
            BoxKind::Floated(_) | BoxKind::Positioned(_) => RunClass::Neutral,
            BoxKind::ListMarker => {
                if node.style.list.style_position == ListStylePosition::Outside {
                    RunClass::Neutral
                } else {
                    RunClass::InlineLevel
                }
            }
            BoxKind::Inline | BoxKind::InlineBlock | BoxKind::Replaced => RunClass::InlineLevel,
            _ => RunClass::BlockLevel,
        }
    }

    /// Whether the box is inline content that would actually render (used
    /// to decide if a run between blocks deserves an anonymous box).
    fn is_inline_content(&self, id: BoxId) -> bool {
        let node = self.tree.get(id);
        match &node.content {
            BoxContent::Text(text) => !text.trim().is_empty(),
            BoxContent::Replaced(_) => true,
            BoxContent::None => matches!(
                node.kind,
                BoxKind::Inline | BoxKind::InlineBlock | BoxKind::Replaced
            ),
        }
    }

    /// Whitespace-only text boxes between table-internal siblings never
    /// generate content.
    fn is_droppable_whitespace(&self, id: BoxId) -> bool {
        let node = self.tree.get(id);
        matches!(&node.content, BoxContent::Text(text) if text.trim().is_empty())
    }
}

/// Collapses whitespace per the `white-space` mode resolved upstream of
/// line breaking. `Normal` folds any whitespace run into a single space;
/// `Pre` keeps the text verbatim so newlines become forced line breaks.
pub fn collapse_whitespace(text: &str, mode: WhiteSpace) -> String {
    match mode {
        WhiteSpace::Pre => text.to_string(),
        WhiteSpace::Normal => {
            let mut out = String::with_capacity(text.len());
            let mut in_space = false;
            for ch in text.chars() {
                if ch.is_whitespace() {
                    if !in_space {
                        out.push(' ');
                        in_space = true;
                    }
                } else {
                    out.push(ch);
                    in_space = false;
                }
            }
            out
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use folio_style::PropertyValue;

    fn props(entries: &[(&str, &str)]) -> folio_style::PropertyMap {
        entries
            .iter()
            .map(|(k, v)| (k.to_string(), PropertyValue::Keyword(v.to_string())))
            .collect()
    }

    #[test]
    fn whitespace_runs_collapse_to_single_spaces() {
        assert_eq!(
            collapse_whitespace("a \t\n  b", WhiteSpace::Normal),
            "a b"
        );
        assert_eq!(collapse_whitespace("a\nb", WhiteSpace::Pre), "a\nb");
    }

    #[test]
    fn display_none_generates_no_box() {
        let doc = StyledNode::element(
            "body",
            vec![
                StyledNode::element_with("div", props(&[("display", "none")]), vec![]),
                StyledNode::element("p", vec![StyledNode::text("kept")]),
            ],
        );
        let tree = build_box_tree(&doc);
        assert_eq!(tree.children(tree.root).len(), 1);
    }

    #[test]
    fn mixed_siblings_get_anonymous_blocks() {
        let doc = StyledNode::element(
            "body",
            vec![
                StyledNode::text("leading text"),
                StyledNode::element("p", vec![StyledNode::text("a paragraph")]),
                StyledNode::text("trailing text"),
            ],
        );
        let tree = build_box_tree(&doc);
        let children = tree.children(tree.root);
        assert_eq!(children.len(), 3);
        assert_eq!(tree.get(children[0]).kind, BoxKind::AnonymousBlock);
        assert_eq!(tree.get(children[1]).kind, BoxKind::Block);
        assert_eq!(tree.get(children[2]).kind, BoxKind::AnonymousBlock);
    }

    #[test]
    fn inline_only_children_stay_unwrapped() {
        let doc = StyledNode::element(
            "p",
            vec![
                StyledNode::text("one "),
                StyledNode::element("span", vec![StyledNode::text("two")]),
            ],
        );
        let tree = build_box_tree(&doc);
        let children = tree.children(tree.root);
        assert_eq!(children.len(), 2);
        assert!(tree.get(children[0]).kind.is_inline_level());
        assert!(tree.get(children[1]).kind.is_inline_level());
    }

    #[test]
    fn bare_cells_get_synthesized_row_and_group() {
        let doc = StyledNode::element(
            "table",
            vec![
                StyledNode::element("td", vec![StyledNode::text("a")]),
                StyledNode::element("td", vec![StyledNode::text("b")]),
            ],
        );
        let tree = build_box_tree(&doc);
        let groups = tree.children(tree.root);
        assert_eq!(groups.len(), 1);
        assert_eq!(
            tree.get(groups[0]).kind,
            BoxKind::TableRowGroup(RowGroupKind::Body)
        );
        let rows = tree.children(groups[0]);
        assert_eq!(rows.len(), 1);
        assert_eq!(tree.get(rows[0]).kind, BoxKind::TableRow);
        assert_eq!(tree.children(rows[0]).len(), 2);
    }

    #[test]
    fn header_groups_order_before_bodies() {
        let doc = StyledNode::element(
            "table",
            vec![
                StyledNode::element(
                    "tbody",
                    vec![StyledNode::element(
                        "tr",
                        vec![StyledNode::element("td", vec![StyledNode::text("body")])],
                    )],
                ),
                StyledNode::element(
                    "thead",
                    vec![StyledNode::element(
                        "tr",
                        vec![StyledNode::element("td", vec![StyledNode::text("head")])],
                    )],
                ),
            ],
        );
        let tree = build_box_tree(&doc);
        let groups = tree.children(tree.root);
        assert_eq!(
            tree.get(groups[0]).kind,
            BoxKind::TableRowGroup(RowGroupKind::Header)
        );
        assert_eq!(
            tree.get(groups[1]).kind,
            BoxKind::TableRowGroup(RowGroupKind::Body)
        );
    }

    #[test]
    fn list_items_get_numbered_markers() {
        let ol = StyledNode::element_with(
            "ol",
            props(&[("list-style-type", "decimal")]),
            vec![
                StyledNode::element("li", vec![StyledNode::text("first")]),
                StyledNode::element("li", vec![StyledNode::text("second")]),
            ],
        );
        let tree = build_box_tree(&ol);
        let items = tree.children(tree.root);
        assert_eq!(items.len(), 2);
        let second_children = tree.children(items[1]);
        let marker = tree.get(second_children[0]);
        assert_eq!(marker.kind, BoxKind::ListMarker);
        assert_eq!(marker.content, BoxContent::Text("2. ".to_string()));
    }

    #[test]
    fn pseudo_content_becomes_inline_boxes() {
        let mut el = ElementNode {
            tag: "p".to_string(),
            ..Default::default()
        };
        el.children = vec![StyledNode::text("middle")];
        el.before = Some(PseudoContent {
            text: "« ".to_string(),
            properties: Default::default(),
        });
        el.after = Some(PseudoContent {
            text: " »".to_string(),
            properties: Default::default(),
        });
        let tree = build_box_tree(&StyledNode::Element(el));
        let children = tree.children(tree.root);
        assert_eq!(children.len(), 3);
        assert!(matches!(
            &tree.get(children[0]).content,
            BoxContent::Text(t) if t.starts_with('«')
        ));
    }
}
