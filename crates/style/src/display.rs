//! The `display` property and its box-generation classification.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, Default)]
#[serde(rename_all = "kebab-case")]
pub enum Display {
    #[default]
    Block,
    Inline,
    InlineBlock,
    ListItem,
    Table,
    TableRowGroup,
    TableHeaderGroup,
    TableFooterGroup,
    TableRow,
    TableCell,
    None,
}

impl Display {
    pub fn from_keyword(s: &str) -> Option<Self> {
        match s {
            "block" => Some(Display::Block),
            "inline" => Some(Display::Inline),
            "inline-block" => Some(Display::InlineBlock),
            "list-item" => Some(Display::ListItem),
            "table" => Some(Display::Table),
            "table-row-group" => Some(Display::TableRowGroup),
            "table-header-group" => Some(Display::TableHeaderGroup),
            "table-footer-group" => Some(Display::TableFooterGroup),
            "table-row" => Some(Display::TableRow),
            "table-cell" => Some(Display::TableCell),
            "none" => Some(Display::None),
            _ => None,
        }
    }

    /// Whether boxes generated for this display participate in block layout
    /// as siblings (stacked along the block axis).
    pub fn is_block_level(&self) -> bool {
        matches!(
            self,
            Display::Block | Display::ListItem | Display::Table
        )
    }

    pub fn is_inline_level(&self) -> bool {
        matches!(self, Display::Inline | Display::InlineBlock)
    }

    /// Table-internal display types, subject to table fixup.
    pub fn is_table_internal(&self) -> bool {
        matches!(
            self,
            Display::TableRowGroup
                | Display::TableHeaderGroup
                | Display::TableFooterGroup
                | Display::TableRow
                | Display::TableCell
        )
    }
}
