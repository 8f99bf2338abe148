use thiserror::Error;

/// Pipeline failure. Only structurally invalid input stops a run; every
/// recoverable problem inside layout degrades locally instead.
#[derive(Error, Debug)]
pub enum LayoutError {
    #[error("invalid styled tree: {0}")]
    InvalidInput(#[from] folio_dom::TreeError),
}

pub mod build;
pub mod config;
pub mod engine;
pub mod floats;
pub mod fragmentation;
pub mod margin;
pub mod output;
pub mod style;
pub mod tree;

pub(crate) mod block;
pub(crate) mod inline;
pub(crate) mod intrinsic;
pub(crate) mod positioned;
pub(crate) mod table;

pub use self::build::build_box_tree;
pub use self::config::PageConfig;
pub use self::engine::LayoutEngine;
pub use self::floats::{Band, FloatContext};
pub use self::fragmentation::paginate;
pub use self::output::{Fragment, FragmentContent, Page};
pub use self::style::ComputedStyle;
pub use self::tree::{BoxContent, BoxId, BoxKind, BoxTree, LayoutBox, RowGroupKind};

#[cfg(test)]
mod test_utils;
