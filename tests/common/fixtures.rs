//! Builders and helpers shared by the integration tests.
//!
//! Documents are built with the deterministic `CharGridMeasurer`
//! (0.5 × font-size per character), so geometry in assertions can be
//! computed by hand.

#![allow(dead_code)]

use folio::adapters::{CharGridMeasurer, InMemoryReplacedStore};
use folio::{
    ElementNode, Fragment, Margins, Page, PageConfig, PageSize, PropertyValue, StyledNode,
};

pub fn element(
    tag: &str,
    props: &[(&str, PropertyValue)],
    children: Vec<StyledNode>,
) -> StyledNode {
    StyledNode::element_with(
        tag,
        props
            .iter()
            .map(|(name, value)| (name.to_string(), value.clone()))
            .collect(),
        children,
    )
}

pub fn text(content: &str) -> StyledNode {
    StyledNode::text(content)
}

pub fn image(reference: &str, props: &[(&str, PropertyValue)]) -> StyledNode {
    StyledNode::Element(ElementNode {
        tag: "img".to_string(),
        properties: props
            .iter()
            .map(|(name, value)| (name.to_string(), value.clone()))
            .collect(),
        content: Some(reference.into()),
        ..Default::default()
    })
}

pub fn paragraph(content: &str) -> StyledNode {
    element("p", &[], vec![text(content)])
}

pub fn len(value: f32) -> PropertyValue {
    PropertyValue::Length(value)
}

pub fn kw(keyword: &str) -> PropertyValue {
    PropertyValue::Keyword(keyword.to_string())
}

pub fn int(value: i64) -> PropertyValue {
    PropertyValue::Int(value)
}

pub fn percent(value: f32) -> PropertyValue {
    PropertyValue::Percent(value)
}

/// Page configuration with zero margins: the content area is exactly the
/// page, which keeps expected geometry easy to compute by hand.
pub fn bare_config(width: f32, height: f32) -> PageConfig {
    PageConfig {
        size: PageSize::Custom { width, height },
        margins: Margins::all(0.0),
        ..Default::default()
    }
}

pub fn render(doc: &StyledNode, config: &PageConfig) -> Vec<Page> {
    let measurer = CharGridMeasurer::default();
    let sizer = InMemoryReplacedStore::new();
    folio::paginate(doc, config, &measurer, &sizer).expect("valid test document")
}

pub fn render_with_images(
    doc: &StyledNode,
    config: &PageConfig,
    images: &[(&str, f32, f32)],
) -> Vec<Page> {
    let measurer = CharGridMeasurer::default();
    let mut sizer = InMemoryReplacedStore::new();
    for (reference, width, height) in images {
        sizer.register(*reference, *width, *height);
    }
    folio::paginate(doc, config, &measurer, &sizer).expect("valid test document")
}

/// All fragments of a page, flattened depth-first.
pub fn all_fragments(page: &Page) -> Vec<&Fragment> {
    let mut out = Vec::new();
    for fragment in page.fragments() {
        fragment.visit(&mut |f| out.push(f));
    }
    out
}

/// Finds the first text fragment containing `needle`.
pub fn find_text<'a>(page: &'a Page, needle: &str) -> Option<&'a Fragment> {
    all_fragments(page).into_iter().find(|f| {
        matches!(&f.content, folio::FragmentContent::Text(t) if t.contains(needle))
    })
}

pub fn page_count_with_text(pages: &[Page], needle: &str) -> usize {
    pages.iter().filter(|p| find_text(p, needle).is_some()).count()
}
