//! Table-specific properties.

use serde::{Deserialize, Serialize};

/// The `table-layout` column sizing algorithm selector.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, Default)]
#[serde(rename_all = "kebab-case")]
pub enum TableLayout {
    #[default]
    Auto,
    Fixed,
}

impl TableLayout {
    pub fn from_keyword(s: &str) -> Option<Self> {
        match s {
            "auto" => Some(TableLayout::Auto),
            "fixed" => Some(TableLayout::Fixed),
            _ => None,
        }
    }
}
