//! Inline formatting context: greedy line breaking over measured items.
//!
//! The inline subtree is flattened into a stream of words, collapsible
//! spaces, forced breaks and atomic boxes (inline-blocks, inline replaced
//! boxes). Lines fill greedily against the float exclusion band at their
//! vertical position; each finished line becomes a `Line` box whose
//! children are per-line fragments.

use crate::block;
use crate::engine::{ContainingBlock, LayoutEngine};
use crate::floats::FloatContext;
use crate::intrinsic;
use crate::style::ComputedStyle;
use crate::tree::{BoxContent, BoxId, BoxKind, BoxTree, LayoutBox};
use folio_style::{Float, ListStylePosition, TextAlign, VerticalAlign};
use folio_traits::BreakClass;
use folio_types::{Rect, Size};
use log::warn;
use std::sync::Arc;

enum InlineItem {
    Word {
        text: String,
        width: f32,
        ascent: f32,
        descent: f32,
        style: Arc<ComputedStyle>,
        source: Option<usize>,
    },
    Space {
        width: f32,
        ascent: f32,
        descent: f32,
        style: Arc<ComputedStyle>,
    },
    HardBreak,
    Atom {
        id: BoxId,
        size: Size,
    },
    FloatChild {
        id: BoxId,
        side: Float,
    },
}

enum FragKind {
    Text {
        text: String,
        style: Arc<ComputedStyle>,
        ascent: f32,
        descent: f32,
        is_space: bool,
        source: Option<usize>,
    },
    Atom {
        id: BoxId,
        size: Size,
    },
}

struct PendingFrag {
    kind: FragKind,
    x: f32,
    width: f32,
}

impl PendingFrag {
    fn is_space(&self) -> bool {
        matches!(&self.kind, FragKind::Text { is_space: true, .. })
    }
}

/// Lays out the inline content of `block_id` into line boxes. Returns the
/// stacked height of the lines.
pub(crate) fn layout_ifc(
    eng: &LayoutEngine,
    tree: &mut BoxTree,
    block_id: BoxId,
    content_rect: &Rect,
    floats: &mut FloatContext,
) -> f32 {
    let block_style = tree.get(block_id).style.clone();
    let cb = ContainingBlock {
        rect: *content_rect,
        height: None,
    };

    let mut items = Vec::new();
    let mut markers = Vec::new();
    let mut positioned = Vec::new();
    let children = tree.children(block_id);
    for &child in &children {
        collect_items(eng, tree, child, &cb, &mut items, &mut markers, &mut positioned);
    }

    let mut assembler = LineAssembler {
        eng,
        tree,
        block_style: block_style.as_ref(),
        content: *content_rect,
        floats,
        y: content_rect.y,
        lines: Vec::new(),
        frags: Vec::new(),
        width: 0.0,
        max_ascent: 0.0,
        max_descent: 0.0,
        pending_floats: Vec::new(),
        placed_floats: Vec::new(),
        first_baseline: None,
    };

    let total = items.len();
    for (index, item) in items.into_iter().enumerate() {
        let is_last = index + 1 == total;
        assembler.push(item, is_last);
    }
    assembler.flush(true);
    assembler.place_deferred_floats();

    let height = assembler.y - content_rect.y;
    let lines = assembler.lines;
    let placed_floats = assembler.placed_floats;
    let first_baseline = assembler.first_baseline;

    // Hang outside markers against the content edge, aligned with the
    // first line's baseline.
    for &marker in &markers {
        layout_marker(eng, tree, marker, content_rect, first_baseline);
    }

    // Positioned children keep their static-position hint and wait for
    // the out-of-flow pass.
    for &id in &positioned {
        let geom = &mut tree.get_mut(id).geom;
        geom.content.x = content_rect.x;
        geom.content.y = content_rect.y;
    }

    // Rebuild the child list: markers, then lines, then the out-of-flow
    // boxes (floats and positioned descendants are hoisted to direct
    // children so painting and pagination can reach them).
    let mut new_children = markers;
    new_children.extend(lines.iter().copied());
    new_children.extend(placed_floats);
    new_children.extend(positioned.iter().copied());
    tree.get_mut(block_id).children = new_children;

    height
}

fn collect_items(
    eng: &LayoutEngine,
    tree: &mut BoxTree,
    id: BoxId,
    cb: &ContainingBlock,
    items: &mut Vec<InlineItem>,
    markers: &mut Vec<BoxId>,
    positioned: &mut Vec<BoxId>,
) {
    let kind = tree.get(id).kind;
    match kind {
        BoxKind::Positioned(_) => positioned.push(id),
        BoxKind::Floated(side) => items.push(InlineItem::FloatChild { id, side }),
        BoxKind::ListMarker => {
            let node = tree.get(id);
            if node.style.list.style_position == ListStylePosition::Outside {
                markers.push(id);
            } else if let BoxContent::Text(text) = node.content.clone() {
                let style = node.style.clone();
                let source = node.source;
                split_text(eng, &text, &style, source, items);
            }
        }
        BoxKind::Inline => {
            let node = tree.get(id);
            match node.content.clone() {
                BoxContent::Text(text) => {
                    let style = node.style.clone();
                    let source = node.source;
                    split_text(eng, &text, &style, source, items);
                }
                _ => {
                    for child in tree.children(id) {
                        collect_items(eng, tree, child, cb, items, markers, positioned);
                    }
                }
            }
        }
        BoxKind::InlineBlock | BoxKind::Replaced => {
            let size = layout_atom(eng, tree, id, cb);
            items.push(InlineItem::Atom { id, size });
        }
        other => {
            warn!("{:?} box in inline flow, skipping", other);
        }
    }
}

/// Measures one text run and splits it at break opportunities.
fn split_text(
    eng: &LayoutEngine,
    text: &str,
    style: &Arc<ComputedStyle>,
    source: Option<usize>,
    items: &mut Vec<InlineItem>,
) {
    let run = eng.measurer.measure(text, &style.font());
    let mut word = String::new();
    let mut word_width = 0.0f32;

    for ((ch, advance), class) in text
        .chars()
        .zip(run.advances.iter().copied())
        .zip(run.breaks.iter().copied())
    {
        match class {
            BreakClass::None => {
                word.push(ch);
                word_width += advance;
            }
            BreakClass::Opportunity => {
                if ch.is_whitespace() {
                    if !word.is_empty() {
                        items.push(InlineItem::Word {
                            text: std::mem::take(&mut word),
                            width: word_width,
                            ascent: run.ascent,
                            descent: run.descent,
                            style: style.clone(),
                            source,
                        });
                        word_width = 0.0;
                    }
                    items.push(InlineItem::Space {
                        width: advance,
                        ascent: run.ascent,
                        descent: run.descent,
                        style: style.clone(),
                    });
                } else {
                    // A break opportunity after a visible character (a
                    // hyphen, say) ends the word with it.
                    word.push(ch);
                    word_width += advance;
                    items.push(InlineItem::Word {
                        text: std::mem::take(&mut word),
                        width: word_width,
                        ascent: run.ascent,
                        descent: run.descent,
                        style: style.clone(),
                        source,
                    });
                    word_width = 0.0;
                }
            }
            BreakClass::Mandatory => {
                if !word.is_empty() {
                    items.push(InlineItem::Word {
                        text: std::mem::take(&mut word),
                        width: word_width,
                        ascent: run.ascent,
                        descent: run.descent,
                        style: style.clone(),
                        source,
                    });
                    word_width = 0.0;
                }
                items.push(InlineItem::HardBreak);
            }
        }
    }
    if !word.is_empty() {
        items.push(InlineItem::Word {
            text: word,
            width: word_width,
            ascent: run.ascent,
            descent: run.descent,
            style: style.clone(),
            source,
        });
    }
}

/// Lays out an atomic inline-level box (inline-block or inline replaced)
/// with its margin box at the origin; the assembler moves it into place.
fn layout_atom(eng: &LayoutEngine, tree: &mut BoxTree, id: BoxId, cb: &ContainingBlock) -> Size {
    let style = tree.get(id).style.clone();
    let edges = style.border_edges().horizontal() + style.padding_edges(cb.rect.width).horizontal();
    let margin = style.box_model.margin.resolve(cb.rect.width);

    let content_width = match &tree.get(id).content {
        BoxContent::Replaced(reference) => {
            eng.replaced_used_size(&style, reference, cb.rect.width).width
        }
        _ => match style.box_model.width.resolve(cb.rect.width) {
            Some(w) => w.max(0.0),
            None => {
                let available = cb.rect.width - margin.horizontal();
                let preferred = intrinsic::shrink_to_fit(eng, tree, id, available);
                (preferred - edges).max(0.0)
            }
        },
    };

    block::layout_independent(eng, tree, id, cb, (0.0, 0.0), content_width)
}

fn layout_marker(
    eng: &LayoutEngine,
    tree: &mut BoxTree,
    id: BoxId,
    content_rect: &Rect,
    first_baseline: Option<f32>,
) {
    let style = tree.get(id).style.clone();
    let text = match &tree.get(id).content {
        BoxContent::Text(text) => text.clone(),
        _ => return,
    };
    let run = eng.measurer.measure(&text, &style.font());
    let width = run.total_advance();
    let y = match first_baseline {
        Some(baseline) => content_rect.y + baseline - run.ascent,
        None => content_rect.y,
    };
    let geom = &mut tree.get_mut(id).geom;
    geom.content = Rect::new(content_rect.x - width, y, width, run.ascent + run.descent);
    geom.baseline = Some(run.ascent);
}

struct LineAssembler<'a, 'e> {
    eng: &'a LayoutEngine<'e>,
    tree: &'a mut BoxTree,
    block_style: &'a ComputedStyle,
    content: Rect,
    floats: &'a mut FloatContext,
    y: f32,
    lines: Vec<BoxId>,
    frags: Vec<PendingFrag>,
    width: f32,
    max_ascent: f32,
    max_descent: f32,
    pending_floats: Vec<(BoxId, Float)>,
    placed_floats: Vec<BoxId>,
    first_baseline: Option<f32>,
}

impl LineAssembler<'_, '_> {
    fn strut(&self) -> f32 {
        self.block_style.text.line_height.max(0.0)
    }

    fn band(&self) -> (f32, f32) {
        let band = self.floats.exclusion_band(self.y, self.strut().max(1.0));
        let left = band.left.max(self.content.x);
        let right = band.right.min(self.content.right());
        (left, right)
    }

    fn available(&self) -> f32 {
        let (left, right) = self.band();
        (right - left).max(0.0)
    }

    fn push(&mut self, item: InlineItem, is_last: bool) {
        match item {
            InlineItem::HardBreak => self.flush(is_last),
            InlineItem::Space {
                width,
                ascent,
                descent,
                style,
            } => {
                // Collapsed spaces never start a line.
                if self.frags.is_empty() {
                    return;
                }
                self.place_frag(
                    FragKind::Text {
                        text: " ".to_string(),
                        style,
                        ascent,
                        descent,
                        is_space: true,
                        source: None,
                    },
                    width,
                    ascent,
                    descent,
                );
            }
            InlineItem::Word {
                text,
                width,
                ascent,
                descent,
                style,
                source,
            } => {
                self.break_if_needed(width);
                self.place_frag(
                    FragKind::Text {
                        text,
                        style,
                        ascent,
                        descent,
                        is_space: false,
                        source,
                    },
                    width,
                    ascent,
                    descent,
                );
            }
            InlineItem::Atom { id, size } => {
                self.break_if_needed(size.width);
                // Atom baseline sits at its bottom margin edge.
                self.place_frag(FragKind::Atom { id, size }, size.width, size.height, 0.0);
            }
            InlineItem::FloatChild { id, side } => {
                if self.frags.is_empty() {
                    self.place_float(id, side);
                } else {
                    // Mid-line floats wait for the line to finish, then
                    // take the next band.
                    self.pending_floats.push((id, side));
                }
            }
        }
    }

    /// Starts a new line when the item would overflow, unless it is the
    /// first item of the line, which is placed regardless. When floats
    /// narrow the band, an item that would fit at full width drops below
    /// them instead of overflowing.
    fn break_if_needed(&mut self, item_width: f32) {
        if !self.frags.is_empty() && self.width + item_width > self.available() + 0.01 {
            self.flush(false);
        }
        if self.frags.is_empty() && item_width > self.available() + 0.01 {
            let needed = item_width.min(self.content.width);
            if needed > 0.0 && self.available() + 0.01 < needed {
                let (_, y) = self.floats.avoid_overlap(needed, self.y);
                self.y = y;
            }
        }
    }

    fn place_frag(&mut self, kind: FragKind, width: f32, ascent: f32, descent: f32) {
        self.frags.push(PendingFrag {
            kind,
            x: self.width,
            width,
        });
        self.width += width;
        self.max_ascent = self.max_ascent.max(ascent);
        self.max_descent = self.max_descent.max(descent);
    }

    fn place_float(&mut self, id: BoxId, side: Float) {
        let cb = ContainingBlock {
            rect: self.content,
            height: None,
        };
        let style = self.tree.get(id).style.clone();
        let padding = style.padding_edges(self.content.width);
        let border = style.border_edges();
        let margin = style.box_model.margin.resolve(self.content.width);
        let edges = padding.horizontal() + border.horizontal();

        let content_width = match style.box_model.width.resolve(self.content.width) {
            Some(w) => w.max(0.0),
            None => {
                let available = self.content.width - margin.horizontal();
                let preferred = intrinsic::shrink_to_fit(self.eng, self.tree, id, available);
                (preferred - edges).max(0.0)
            }
        };

        let size = block::layout_independent(self.eng, self.tree, id, &cb, (0.0, 0.0), content_width);
        let target = self.floats.place(size, side, self.y);
        self.tree.translate_subtree(id, target.x, target.y);
        self.floats.register(target, side);
        self.placed_floats.push(id);
    }

    fn place_deferred_floats(&mut self) {
        let deferred = std::mem::take(&mut self.pending_floats);
        for (id, side) in deferred {
            self.place_float(id, side);
        }
    }

    /// Finishes the current line: trims trailing spaces, aligns, creates
    /// the line box and its fragment children, and advances the y cursor.
    fn flush(&mut self, is_last: bool) {
        while self.frags.last().map(|f| f.is_space()).unwrap_or(false) {
            let frag = self.frags.pop().unwrap();
            self.width -= frag.width;
        }
        if self.frags.is_empty() {
            // A hard break on an empty line still advances it.
            if !is_last {
                self.advance_empty_line();
            }
            self.width = 0.0;
            self.max_ascent = 0.0;
            self.max_descent = 0.0;
            self.place_deferred_floats();
            return;
        }

        let (line_left, line_right) = self.band();
        let avail = (line_right - line_left).max(0.0);
        let natural = self.max_ascent + self.max_descent;
        let line_height = self.strut().max(natural);
        let leading = (line_height - natural).max(0.0);
        let baseline = self.max_ascent + leading / 2.0;
        if self.first_baseline.is_none() {
            self.first_baseline = Some((self.y - self.content.y) + baseline);
        }

        let free = (avail - self.width).max(0.0);
        let align = self.block_style.text.text_align;
        let (offset, justify_gap) = match align {
            TextAlign::Left => (0.0, 0.0),
            TextAlign::Center => (free / 2.0, 0.0),
            TextAlign::Right => (free, 0.0),
            TextAlign::Justify => {
                let gaps = self.frags.iter().filter(|f| f.is_space()).count();
                if is_last || gaps == 0 || free <= 0.0 {
                    (0.0, 0.0)
                } else {
                    (0.0, free / gaps as f32)
                }
            }
        };

        let line_style = Arc::new(ComputedStyle::anonymous(
            self.block_style,
            folio_style::Display::Block,
        ));
        let mut line_box = LayoutBox::new(BoxKind::Line, line_style);
        line_box.geom.content = Rect::new(line_left, self.y, avail, line_height);
        line_box.geom.baseline = Some(baseline);
        let line_id = self.tree.alloc(line_box);

        let frags = std::mem::take(&mut self.frags);
        let mut extra = 0.0f32;
        let mut children = Vec::new();
        let mut merged: Vec<(FragKind, f32, f32)> = Vec::new();

        for frag in frags {
            let x = frag.x + offset + extra;
            if let FragKind::Text { is_space: true, .. } = &frag.kind {
                extra += justify_gap;
            }
            // Merge runs that share a style and abut, keeping fragment
            // counts low; disabled while justifying to keep gaps intact.
            if justify_gap == 0.0 {
                if let (
                    Some((
                        FragKind::Text {
                            text: prev_text,
                            style: prev_style,
                            ..
                        },
                        _,
                        prev_width,
                    )),
                    FragKind::Text {
                        text,
                        style,
                        is_space: _,
                        ..
                    },
                ) = (merged.last_mut(), &frag.kind)
                {
                    if Arc::ptr_eq(prev_style, style) {
                        prev_text.push_str(text);
                        *prev_width += frag.width;
                        continue;
                    }
                }
            }
            merged.push((frag.kind, x, frag.width));
        }

        for (kind, x, width) in merged {
            match kind {
                FragKind::Text {
                    text,
                    style,
                    ascent,
                    descent,
                    source,
                    ..
                } => {
                    let frag_y = self.y
                        + match style.flow.vertical_align {
                            VerticalAlign::Baseline => baseline - ascent,
                            VerticalAlign::Top => 0.0,
                            VerticalAlign::Middle => (line_height - (ascent + descent)) / 2.0,
                            VerticalAlign::Bottom => line_height - (ascent + descent),
                        };
                    let mut frag =
                        LayoutBox::with_content(BoxKind::Inline, style, BoxContent::Text(text));
                    frag.geom.content = Rect::new(x, frag_y, width, ascent + descent);
                    frag.geom.baseline = Some(ascent);
                    frag.source = source;
                    children.push(self.tree.alloc(frag));
                }
                FragKind::Atom { id, size } => {
                    let style = self.tree.get(id).style.clone();
                    let target_y = self.y
                        + match style.flow.vertical_align {
                            VerticalAlign::Baseline => baseline - size.height,
                            VerticalAlign::Top => 0.0,
                            VerticalAlign::Middle => (line_height - size.height) / 2.0,
                            VerticalAlign::Bottom => line_height - size.height,
                        };
                    self.tree.translate_subtree(id, x, target_y);
                    children.push(id);
                }
            }
        }

        self.tree.get_mut(line_id).children = children;
        self.lines.push(line_id);
        self.y += line_height;
        self.width = 0.0;
        self.max_ascent = 0.0;
        self.max_descent = 0.0;

        let deferred = std::mem::take(&mut self.pending_floats);
        for (id, side) in deferred {
            self.place_float(id, side);
        }
    }

    fn advance_empty_line(&mut self) {
        self.y += self.strut();
    }
}
