//! The styled-tree input boundary.
//!
//! This crate defines the in-memory representation of a document after
//! upstream markup parsing and cascade resolution, immediately before
//! layout. Every element carries a mapping from CSS property names to
//! already-resolved values; nothing here performs selector matching or
//! inheritance.

use folio_style::{PropertyMap, PropertyValue};
use folio_types::ContentRef;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// A string type for document text content.
pub type TextStr = String;

/// Structural problems in the styled tree. This is the only error class
/// that aborts the pipeline; everything downstream degrades locally.
#[derive(Error, Debug)]
pub enum TreeError {
    #[error("document root must be an element, found a bare text node")]
    TextRoot,
    #[error("styled tree exceeds the maximum supported depth of {0}")]
    TooDeep(usize),
}

/// Upper bound on tree depth, guarding the recursive layout passes
/// against degenerate input.
pub const MAX_TREE_DEPTH: usize = 512;

/// A node of the styled tree handed over by upstream style resolution.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum StyledNode {
    Element(ElementNode),
    Text(TextNode),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct ElementNode {
    pub tag: TextStr,
    /// CSS property name → cascade-resolved value.
    #[serde(default, skip_serializing_if = "PropertyMap::is_empty")]
    pub properties: PropertyMap,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<StyledNode>,
    /// Reference to replaced content; its presence makes the element a
    /// replaced element regardless of tag.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content: Option<ContentRef>,
    /// Generated content for the `::before` pseudo-element.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub before: Option<PseudoContent>,
    /// Generated content for the `::after` pseudo-element.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub after: Option<PseudoContent>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TextNode {
    pub text: TextStr,
}

/// Cascade-resolved content and style for a `::before`/`::after` box.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct PseudoContent {
    pub text: TextStr,
    #[serde(default, skip_serializing_if = "PropertyMap::is_empty")]
    pub properties: PropertyMap,
}

impl StyledNode {
    pub fn element(tag: impl Into<TextStr>, children: Vec<StyledNode>) -> Self {
        StyledNode::Element(ElementNode {
            tag: tag.into(),
            children,
            ..Default::default()
        })
    }

    pub fn element_with(
        tag: impl Into<TextStr>,
        properties: PropertyMap,
        children: Vec<StyledNode>,
    ) -> Self {
        StyledNode::Element(ElementNode {
            tag: tag.into(),
            properties,
            children,
            ..Default::default()
        })
    }

    pub fn text(text: impl Into<TextStr>) -> Self {
        StyledNode::Text(TextNode { text: text.into() })
    }

    pub fn property(&self, name: &str) -> Option<&PropertyValue> {
        match self {
            StyledNode::Element(el) => el.properties.get(name),
            StyledNode::Text(_) => None,
        }
    }

    pub fn is_text(&self) -> bool {
        matches!(self, StyledNode::Text(_))
    }
}

/// Validates the tree structure before layout begins.
///
/// Ownership makes reference cycles unrepresentable, so the checks left
/// are a non-element root and runaway nesting depth.
pub fn validate(root: &StyledNode) -> Result<(), TreeError> {
    if root.is_text() {
        return Err(TreeError::TextRoot);
    }
    check_depth(root, 0)
}

fn check_depth(node: &StyledNode, depth: usize) -> Result<(), TreeError> {
    if depth > MAX_TREE_DEPTH {
        return Err(TreeError::TooDeep(MAX_TREE_DEPTH));
    }
    if let StyledNode::Element(el) = node {
        for child in &el.children {
            check_depth(child, depth + 1)?;
        }
    }
    Ok(())
}
