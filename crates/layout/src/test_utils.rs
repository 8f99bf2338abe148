//! Shared fixtures for the in-crate layout tests.

use crate::config::PageConfig;
use crate::engine::LayoutEngine;
use crate::output::Page;
use crate::tree::BoxTree;
use folio_dom::{ElementNode, StyledNode};
use folio_style::{Margins, PageSize, PropertyValue};
use folio_traits::{CharGridMeasurer, InMemoryReplacedStore};

pub fn len(value: f32) -> PropertyValue {
    PropertyValue::Length(value)
}

pub fn kw(keyword: &str) -> PropertyValue {
    PropertyValue::Keyword(keyword.to_string())
}

pub fn int(value: i64) -> PropertyValue {
    PropertyValue::Int(value)
}

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

pub fn image(reference: &str) -> StyledNode {
    StyledNode::Element(ElementNode {
        tag: "img".to_string(),
        content: Some(reference.into()),
        ..Default::default()
    })
}

/// A page configuration with no margins, so the content area is exactly
/// the requested size.
pub fn test_config(width: f32, height: f32) -> PageConfig {
    PageConfig {
        size: PageSize::Custom { width, height },
        margins: Margins::all(0.0),
        ..Default::default()
    }
}

pub fn layout_doc(root: &StyledNode, width: f32, height: f32) -> BoxTree {
    let measurer = CharGridMeasurer::default();
    let sizer = InMemoryReplacedStore::new();
    let mut tree = crate::build::build_box_tree(root);
    LayoutEngine::new(&measurer, &sizer).layout(&mut tree, &test_config(width, height));
    tree
}

pub fn layout_doc_with_image(
    root: &StyledNode,
    width: f32,
    height: f32,
    reference: &str,
    image_width: f32,
    image_height: f32,
) -> BoxTree {
    let measurer = CharGridMeasurer::default();
    let mut sizer = InMemoryReplacedStore::new();
    sizer.register(reference, image_width, image_height);
    let mut tree = crate::build::build_box_tree(root);
    LayoutEngine::new(&measurer, &sizer).layout(&mut tree, &test_config(width, height));
    tree
}

pub fn paginate_doc(root: &StyledNode, width: f32, height: f32) -> Vec<Page> {
    let measurer = CharGridMeasurer::default();
    let sizer = InMemoryReplacedStore::new();
    let config = test_config(width, height);
    let mut tree = crate::build::build_box_tree(root);
    LayoutEngine::new(&measurer, &sizer).layout(&mut tree, &config);
    crate::fragmentation::paginate(&tree, &config)
}
