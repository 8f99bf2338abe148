// crates/layout/src/style.rs
//
// Used-value resolution from the per-element property maps handed over by
// upstream cascade processing. Missing properties fall back to CSS initial
// values; invalid values fall back the same way and leave a diagnostic in
// the log, so one bad declaration never takes down layout.

use folio_style::{
    Border, BorderStyle, BreakBetween, BreakInside, Clear, Dimension, Display, Float, FontStyle,
    FontWeight, ListStylePosition, ListStyleType, Overflow, Position, PropertyMap, PropertyValue,
    TableLayout, TextAlign, TextDecoration, VerticalAlign, WhiteSpace,
};
use folio_traits::FontProperties;
use folio_types::{Color, Edges};
use log::warn;
use std::sync::Arc;

/// Dimensions for the four sides of an edge property (margins, paddings,
/// inset offsets), prior to resolution against a containing block.
#[derive(Debug, Clone, PartialEq)]
pub struct EdgeDimensions {
    pub top: Dimension,
    pub right: Dimension,
    pub bottom: Dimension,
    pub left: Dimension,
}

impl EdgeDimensions {
    pub fn zero() -> Self {
        Self {
            top: Dimension::Pt(0.0),
            right: Dimension::Pt(0.0),
            bottom: Dimension::Pt(0.0),
            left: Dimension::Pt(0.0),
        }
    }

    /// Resolves all four sides against a base length, treating `auto` as 0.
    pub fn resolve(&self, base: f32) -> Edges {
        Edges {
            top: self.top.resolve_or(base, 0.0),
            right: self.right.resolve_or(base, 0.0),
            bottom: self.bottom.resolve_or(base, 0.0),
            left: self.left.resolve_or(base, 0.0),
        }
    }
}

impl Default for EdgeDimensions {
    fn default() -> Self {
        Self::zero()
    }
}

// Grouped style structures, one per layout concern.

#[derive(Debug, Clone, PartialEq, Default)]
pub struct BoxModel {
    pub margin: EdgeDimensions,
    pub padding: EdgeDimensions,
    pub width: Dimension,
    pub height: Dimension,
    pub min_width: Dimension,
    pub min_height: Dimension,
    pub max_width: Dimension,
    pub max_height: Dimension,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct BorderModel {
    pub top: Border,
    pub right: Border,
    pub bottom: Border,
    pub left: Border,
}

impl BorderModel {
    /// Used border widths; a side with `style: none` contributes nothing.
    pub fn edges(&self) -> Edges {
        Edges {
            top: self.top.used_width(),
            right: self.right.used_width(),
            bottom: self.bottom.used_width(),
            left: self.left.used_width(),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct TextModel {
    pub font_family: Arc<String>,
    pub font_size: f32,
    pub font_weight: FontWeight,
    pub font_style: FontStyle,
    pub line_height: f32,
    pub text_align: TextAlign,
    pub white_space: WhiteSpace,
    pub text_decoration: TextDecoration,
    pub color: Color,
}

impl Default for TextModel {
    fn default() -> Self {
        Self {
            font_family: Arc::new("Helvetica".to_string()),
            font_size: 12.0,
            font_weight: FontWeight::Regular,
            font_style: FontStyle::Normal,
            line_height: 14.4,
            text_align: TextAlign::Left,
            white_space: WhiteSpace::Normal,
            text_decoration: TextDecoration::None,
            color: Color::default(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct FlowModel {
    pub display: Display,
    pub position: Position,
    pub float: Float,
    pub clear: Clear,
    pub overflow: Overflow,
    pub vertical_align: VerticalAlign,
    /// `top`/`right`/`bottom`/`left` inset offsets for positioned boxes.
    pub offset: EdgeDimensions,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct BreakModel {
    pub break_before: BreakBetween,
    pub break_after: BreakBetween,
    pub break_inside: BreakInside,
    /// Explicit per-element orphans/widows; `None` defers to the page
    /// configuration's document-wide minimums.
    pub orphans: Option<u32>,
    pub widows: Option<u32>,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct ListModel {
    pub style_type: ListStyleType,
    pub style_position: ListStylePosition,
}

#[derive(Debug, Clone, PartialEq)]
pub struct TableModel {
    pub layout: TableLayout,
    pub border_spacing: f32,
    /// Column span for table-cell boxes; 1 everywhere else.
    pub col_span: u32,
}

impl Default for TableModel {
    fn default() -> Self {
        Self {
            layout: TableLayout::Auto,
            border_spacing: 0.0,
            col_span: 1,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct MiscModel {
    pub background_color: Option<Color>,
}

/// Fully resolved style for one box.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ComputedStyle {
    pub box_model: BoxModel,
    pub border: BorderModel,
    pub text: TextModel,
    pub flow: FlowModel,
    pub breaks: BreakModel,
    pub list: ListModel,
    pub table: TableModel,
    pub misc: MiscModel,
}

impl ComputedStyle {
    /// Resolves an element's property map into used-value groups.
    ///
    /// `parent` supplies inherited values; `None` means the element is the
    /// root and inherits from the initial values.
    pub fn resolve(tag: &str, props: &PropertyMap, parent: Option<&ComputedStyle>) -> Self {
        let inherited = parent.map(|p| p.inherited_only()).unwrap_or_default();

        let display = match props.get("display") {
            None => default_display_for_tag(tag),
            Some(value) => match value.as_keyword().and_then(Display::from_keyword) {
                Some(d) => d,
                None => {
                    warn!(
                        "unsupported display value {:?} on <{}>, substituting {:?}",
                        value,
                        tag,
                        default_display_for_tag(tag)
                    );
                    default_display_for_tag(tag)
                }
            },
        };

        let font_size = length_prop(props, "font-size").unwrap_or(inherited.text.font_size);
        let line_height = match props.get("line-height") {
            None => {
                if props.contains_key("font-size") {
                    font_size * 1.2
                } else {
                    inherited.text.line_height
                }
            }
            Some(PropertyValue::Length(v)) => *v,
            Some(PropertyValue::Keyword(k)) if k == "normal" => font_size * 1.2,
            Some(other) => {
                warn!("unsupported line-height value {:?}, using normal", other);
                font_size * 1.2
            }
        };

        ComputedStyle {
            text: TextModel {
                font_family: props
                    .get("font-family")
                    .and_then(|v| v.as_keyword())
                    .map(|s| Arc::new(s.to_string()))
                    .unwrap_or_else(|| inherited.text.font_family.clone()),
                font_size,
                font_weight: keyword_prop(
                    props,
                    "font-weight",
                    FontWeight::from_keyword,
                    inherited.text.font_weight.clone(),
                ),
                font_style: keyword_prop(
                    props,
                    "font-style",
                    FontStyle::from_keyword,
                    inherited.text.font_style.clone(),
                ),
                line_height,
                text_align: keyword_prop(
                    props,
                    "text-align",
                    TextAlign::from_keyword,
                    inherited.text.text_align,
                ),
                white_space: keyword_prop(
                    props,
                    "white-space",
                    WhiteSpace::from_keyword,
                    inherited.text.white_space,
                ),
                text_decoration: keyword_prop(
                    props,
                    "text-decoration",
                    TextDecoration::from_keyword,
                    inherited.text.text_decoration,
                ),
                color: color_prop(props, "color").unwrap_or(inherited.text.color),
            },
            list: ListModel {
                style_type: keyword_prop(
                    props,
                    "list-style-type",
                    ListStyleType::from_keyword,
                    inherited.list.style_type,
                ),
                style_position: keyword_prop(
                    props,
                    "list-style-position",
                    ListStylePosition::from_keyword,
                    inherited.list.style_position,
                ),
            },
            breaks: BreakModel {
                break_before: keyword_prop(
                    props,
                    "break-before",
                    BreakBetween::from_keyword,
                    BreakBetween::Auto,
                ),
                break_after: keyword_prop(
                    props,
                    "break-after",
                    BreakBetween::from_keyword,
                    BreakBetween::Auto,
                ),
                break_inside: keyword_prop(
                    props,
                    "break-inside",
                    BreakInside::from_keyword,
                    BreakInside::Auto,
                ),
                orphans: count_prop(props, "orphans").or(inherited.breaks.orphans),
                widows: count_prop(props, "widows").or(inherited.breaks.widows),
            },
            table: TableModel {
                layout: keyword_prop(
                    props,
                    "table-layout",
                    TableLayout::from_keyword,
                    TableLayout::Auto,
                ),
                border_spacing: length_prop(props, "border-spacing")
                    .unwrap_or(inherited.table.border_spacing),
                col_span: count_prop(props, "colspan").unwrap_or(1).max(1),
            },
            // Non-inherited groups.
            box_model: BoxModel {
                margin: edge_dimensions(props, "margin", Dimension::Pt(0.0)),
                padding: edge_dimensions(props, "padding", Dimension::Pt(0.0)),
                width: dimension_prop(props, "width").unwrap_or(Dimension::Auto),
                height: dimension_prop(props, "height").unwrap_or(Dimension::Auto),
                min_width: dimension_prop(props, "min-width").unwrap_or(Dimension::Pt(0.0)),
                min_height: dimension_prop(props, "min-height").unwrap_or(Dimension::Pt(0.0)),
                max_width: dimension_prop(props, "max-width").unwrap_or(Dimension::Auto),
                max_height: dimension_prop(props, "max-height").unwrap_or(Dimension::Auto),
            },
            border: resolve_borders(props),
            flow: FlowModel {
                display,
                position: keyword_prop(
                    props,
                    "position",
                    Position::from_keyword,
                    Position::Static,
                ),
                float: keyword_prop(props, "float", Float::from_keyword, Float::None),
                clear: keyword_prop(props, "clear", Clear::from_keyword, Clear::None),
                overflow: keyword_prop(props, "overflow", Overflow::from_keyword, Overflow::Visible),
                vertical_align: keyword_prop(
                    props,
                    "vertical-align",
                    VerticalAlign::from_keyword,
                    VerticalAlign::Baseline,
                ),
                offset: EdgeDimensions {
                    top: dimension_prop(props, "top").unwrap_or(Dimension::Auto),
                    right: dimension_prop(props, "right").unwrap_or(Dimension::Auto),
                    bottom: dimension_prop(props, "bottom").unwrap_or(Dimension::Auto),
                    left: dimension_prop(props, "left").unwrap_or(Dimension::Auto),
                },
            },
            misc: MiscModel {
                background_color: color_prop(props, "background-color"),
            },
        }
    }

    /// Style for an anonymous box: inherited values are kept, everything
    /// else resets to its initial value.
    pub fn inherited_only(&self) -> ComputedStyle {
        ComputedStyle {
            text: self.text.clone(),
            list: self.list.clone(),
            breaks: BreakModel {
                orphans: self.breaks.orphans,
                widows: self.breaks.widows,
                ..Default::default()
            },
            table: TableModel {
                border_spacing: self.table.border_spacing,
                ..Default::default()
            },
            ..Default::default()
        }
    }

    /// Anonymous style with a specific display, inheriting from `parent`.
    pub fn anonymous(parent: &ComputedStyle, display: Display) -> ComputedStyle {
        let mut style = parent.inherited_only();
        style.flow.display = display;
        style
    }

    pub fn padding_edges(&self, base: f32) -> Edges {
        self.box_model.padding.resolve(base)
    }

    pub fn border_edges(&self) -> Edges {
        self.border.edges()
    }

    /// Whether this box starts a new block formatting context for its
    /// descendants, isolating floats and blocking margin collapse.
    pub fn establishes_bfc(&self) -> bool {
        self.flow.float != Float::None
            || self.flow.position.is_out_of_flow()
            || self.flow.overflow != Overflow::Visible
            || matches!(
                self.flow.display,
                Display::InlineBlock | Display::Table | Display::TableCell
            )
    }

    pub fn font(&self) -> FontProperties {
        FontProperties {
            family: self.text.font_family.clone(),
            size: self.text.font_size,
            weight: self.text.font_weight.clone(),
            style: self.text.font_style.clone(),
        }
    }
}

/// User-agent default display for common HTML tags, consulted when the
/// property map omits `display`.
pub fn default_display_for_tag(tag: &str) -> Display {
    match tag {
        "html" | "body" | "div" | "p" | "h1" | "h2" | "h3" | "h4" | "h5" | "h6" | "ul" | "ol"
        | "blockquote" | "pre" | "address" | "section" | "article" | "header" | "footer"
        | "nav" | "aside" | "figure" | "figcaption" | "hr" | "fieldset" => Display::Block,
        "li" => Display::ListItem,
        "table" => Display::Table,
        "thead" => Display::TableHeaderGroup,
        "tbody" => Display::TableRowGroup,
        "tfoot" => Display::TableFooterGroup,
        "tr" => Display::TableRow,
        "td" | "th" => Display::TableCell,
        _ => Display::Inline,
    }
}

fn keyword_prop<T>(
    props: &PropertyMap,
    name: &str,
    parse: impl Fn(&str) -> Option<T>,
    fallback: T,
) -> T {
    match props.get(name) {
        None => fallback,
        Some(value) => match value.as_keyword().and_then(|k| parse(k)) {
            Some(parsed) => parsed,
            None => {
                warn!("unsupported value {:?} for '{}', substituting initial", value, name);
                fallback
            }
        },
    }
}

fn length_prop(props: &PropertyMap, name: &str) -> Option<f32> {
    match props.get(name) {
        None => None,
        Some(PropertyValue::Length(v)) => Some(*v),
        Some(PropertyValue::Int(v)) => Some(*v as f32),
        Some(other) => {
            warn!("expected a length for '{}', got {:?}", name, other);
            None
        }
    }
}

fn dimension_prop(props: &PropertyMap, name: &str) -> Option<Dimension> {
    match props.get(name) {
        None => None,
        Some(PropertyValue::Length(v)) => Some(Dimension::Pt(*v)),
        Some(PropertyValue::Int(v)) => Some(Dimension::Pt(*v as f32)),
        Some(PropertyValue::Percent(p)) => Some(Dimension::Percent(*p)),
        Some(PropertyValue::Keyword(k)) if k == "auto" => Some(Dimension::Auto),
        Some(other) => {
            warn!("unsupported value {:?} for '{}', substituting initial", other, name);
            None
        }
    }
}

fn color_prop(props: &PropertyMap, name: &str) -> Option<Color> {
    match props.get(name) {
        None => None,
        Some(PropertyValue::Color(c)) => Some(c.clone()),
        Some(PropertyValue::Keyword(k)) => match Color::parse_hex(k) {
            Ok(c) => Some(c),
            Err(_) => {
                warn!("unsupported color {:?} for '{}'", k, name);
                None
            }
        },
        Some(other) => {
            warn!("expected a color for '{}', got {:?}", name, other);
            None
        }
    }
}

fn count_prop(props: &PropertyMap, name: &str) -> Option<u32> {
    match props.get(name) {
        None => None,
        Some(value) => match value.as_int() {
            Some(n) if n >= 0 => Some(n as u32),
            _ => {
                warn!("expected a non-negative integer for '{}', got {:?}", name, value);
                None
            }
        },
    }
}

/// Reads `margin-top`..`margin-left` (or the padding equivalents), with a
/// single-value `margin`/`padding` entry applying to all four sides.
fn edge_dimensions(props: &PropertyMap, base_name: &str, initial: Dimension) -> EdgeDimensions {
    let all = dimension_prop(props, base_name).unwrap_or(initial);
    let side = |suffix: &str| {
        dimension_prop(props, &format!("{}-{}", base_name, suffix)).unwrap_or(all)
    };
    EdgeDimensions {
        top: side("top"),
        right: side("right"),
        bottom: side("bottom"),
        left: side("left"),
    }
}

fn resolve_borders(props: &PropertyMap) -> BorderModel {
    let all_width = length_prop(props, "border-width");
    let all_style = props
        .get("border-style")
        .and_then(|v| v.as_keyword())
        .and_then(BorderStyle::from_keyword);
    let all_color = color_prop(props, "border-color");
    let fallback_color = color_prop(props, "color").unwrap_or_default();

    let side = |name: &str| {
        let style = props
            .get(&format!("border-{}-style", name))
            .and_then(|v| v.as_keyword())
            .and_then(BorderStyle::from_keyword)
            .or(all_style)
            .unwrap_or(BorderStyle::None);
        // CSS initial border-width is `medium`; 3pt is its conventional
        // used value when a style is set.
        let width = length_prop(props, &format!("border-{}-width", name))
            .or(all_width)
            .unwrap_or(3.0);
        let color = color_prop(props, &format!("border-{}-color", name))
            .or_else(|| all_color.clone())
            .unwrap_or_else(|| fallback_color.clone());
        Border {
            width,
            style,
            color,
        }
    };

    BorderModel {
        top: side("top"),
        right: side("right"),
        bottom: side("bottom"),
        left: side("left"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use folio_style::PropertyValue;

    fn props(entries: &[(&str, PropertyValue)]) -> PropertyMap {
        entries
            .iter()
            .map(|(k, v)| (k.to_string(), v.clone()))
            .collect()
    }

    #[test]
    fn missing_display_uses_tag_default() {
        let style = ComputedStyle::resolve("p", &PropertyMap::new(), None);
        assert_eq!(style.flow.display, Display::Block);
        let style = ComputedStyle::resolve("span", &PropertyMap::new(), None);
        assert_eq!(style.flow.display, Display::Inline);
        let style = ComputedStyle::resolve("li", &PropertyMap::new(), None);
        assert_eq!(style.flow.display, Display::ListItem);
    }

    #[test]
    fn invalid_display_degrades_to_tag_default() {
        let p = props(&[("display", PropertyValue::Keyword("sparkle".into()))]);
        let style = ComputedStyle::resolve("div", &p, None);
        assert_eq!(style.flow.display, Display::Block);
    }

    #[test]
    fn inherited_properties_flow_down() {
        let parent_props = props(&[
            ("font-size", PropertyValue::Length(20.0)),
            ("color", PropertyValue::Color(Color::rgb(200, 0, 0))),
        ]);
        let parent = ComputedStyle::resolve("div", &parent_props, None);
        let child = ComputedStyle::resolve("span", &PropertyMap::new(), Some(&parent));
        assert_eq!(child.text.font_size, 20.0);
        assert_eq!(child.text.color, Color::rgb(200, 0, 0));
        // Box properties do not inherit.
        assert_eq!(child.box_model.width, Dimension::Auto);
    }

    #[test]
    fn margin_shorthand_and_side_override() {
        let p = props(&[
            ("margin", PropertyValue::Length(10.0)),
            ("margin-left", PropertyValue::Keyword("auto".into())),
        ]);
        let style = ComputedStyle::resolve("div", &p, None);
        assert_eq!(style.box_model.margin.top, Dimension::Pt(10.0));
        assert_eq!(style.box_model.margin.left, Dimension::Auto);
    }

    #[test]
    fn border_without_style_has_no_used_width() {
        let p = props(&[("border-width", PropertyValue::Length(4.0))]);
        let style = ComputedStyle::resolve("div", &p, None);
        assert_eq!(style.border_edges(), Edges::zero());

        let p = props(&[
            ("border-width", PropertyValue::Length(4.0)),
            ("border-style", PropertyValue::Keyword("solid".into())),
        ]);
        let style = ComputedStyle::resolve("div", &p, None);
        assert_eq!(style.border_edges(), Edges::all(4.0));
    }

    #[test]
    fn line_height_tracks_font_size_when_unset() {
        let p = props(&[("font-size", PropertyValue::Length(10.0))]);
        let style = ComputedStyle::resolve("div", &p, None);
        assert_eq!(style.text.line_height, 12.0);
    }

    #[test]
    fn bfc_establishment() {
        let p = props(&[("float", PropertyValue::Keyword("left".into()))]);
        assert!(ComputedStyle::resolve("div", &p, None).establishes_bfc());
        let p = props(&[("overflow", PropertyValue::Keyword("hidden".into()))]);
        assert!(ComputedStyle::resolve("div", &p, None).establishes_bfc());
        assert!(!ComputedStyle::resolve("div", &PropertyMap::new(), None).establishes_bfc());
    }
}
