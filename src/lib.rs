//! folio: a batch layout and pagination engine.
//!
//! The pipeline takes a styled document tree (markup already parsed,
//! cascade already resolved), builds a normalized box tree, lays it out
//! with the CSS visual formatting model, and slices the result into
//! fixed-size pages of absolutely positioned fragments for a painting or
//! serialization backend.
//!
//! ```no_run
//! use folio::{paginate, PageConfig, StyledNode};
//! use folio::adapters::{CharGridMeasurer, InMemoryReplacedStore};
//!
//! let doc = StyledNode::element(
//!     "body",
//!     vec![StyledNode::element("p", vec![StyledNode::text("Hello, page.")])],
//! );
//! let measurer = CharGridMeasurer::default();
//! let sizer = InMemoryReplacedStore::new();
//! let pages = paginate(&doc, &PageConfig::default(), &measurer, &sizer).unwrap();
//! assert_eq!(pages.len(), 1);
//! ```

pub use folio_dom::{ElementNode, PseudoContent, StyledNode, TextNode, TreeError};
pub use folio_layout::{
    BoxContent, BoxId, BoxKind, BoxTree, ComputedStyle, Fragment, FragmentContent, LayoutEngine,
    LayoutError as Error, Page, PageConfig, RowGroupKind, build_box_tree,
};
pub use folio_style::{
    Clear, Display, Float, Margins, Overflow, PageSize, Position, PropertyMap, PropertyValue,
};
pub use folio_types::{Color, ContentRef, Edges, Rect, Size};

/// Adapter traits and their in-memory reference implementations.
pub mod adapters {
    pub use folio_traits::{
        BreakClass, CharGridMeasurer, FontProperties, InMemoryReplacedStore, IntrinsicSize,
        MeasuredRun, ReplacedSizer, TextMeasurer,
    };
}

/// Runs the full pipeline: validation, box generation, layout, and
/// pagination. The returned pages are the terminal, immutable output.
pub fn paginate(
    root: &StyledNode,
    config: &PageConfig,
    measurer: &dyn adapters::TextMeasurer,
    sizer: &dyn adapters::ReplacedSizer,
) -> Result<Vec<Page>, Error> {
    folio_dom::validate(root)?;

    let mut tree = build_box_tree(root);
    let engine = LayoutEngine::new(measurer, sizer);
    engine.layout(&mut tree, config);

    Ok(folio_layout::paginate(&tree, config))
}

/// Builds and lays out the box tree without paginating, for callers that
/// want the continuous document geometry.
pub fn layout_tree(
    root: &StyledNode,
    config: &PageConfig,
    measurer: &dyn adapters::TextMeasurer,
    sizer: &dyn adapters::ReplacedSizer,
) -> Result<BoxTree, Error> {
    folio_dom::validate(root)?;
    let mut tree = build_box_tree(root);
    LayoutEngine::new(measurer, sizer).layout(&mut tree, config);
    Ok(tree)
}
