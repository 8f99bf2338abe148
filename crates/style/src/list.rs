//! Defines enums for CSS List properties.
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, Default)]
#[serde(rename_all = "kebab-case")]
pub enum ListStyleType {
    #[default]
    Disc,
    Circle,
    Square,
    Decimal,
    None,
}

impl ListStyleType {
    pub fn from_keyword(s: &str) -> Option<Self> {
        match s {
            "disc" => Some(ListStyleType::Disc),
            "circle" => Some(ListStyleType::Circle),
            "square" => Some(ListStyleType::Square),
            "decimal" => Some(ListStyleType::Decimal),
            "none" => Some(ListStyleType::None),
            _ => None,
        }
    }

    /// Marker text for the item at 1-based position `index`.
    pub fn marker_text(&self, index: usize) -> Option<String> {
        match self {
            ListStyleType::Disc => Some("\u{2022} ".to_string()),
            ListStyleType::Circle => Some("\u{25E6} ".to_string()),
            ListStyleType::Square => Some("\u{25AA} ".to_string()),
            ListStyleType::Decimal => Some(format!("{}. ", index)),
            ListStyleType::None => None,
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, Default)]
#[serde(rename_all = "kebab-case")]
pub enum ListStylePosition {
    Inside,
    #[default]
    Outside,
}

impl ListStylePosition {
    pub fn from_keyword(s: &str) -> Option<Self> {
        match s {
            "inside" => Some(ListStylePosition::Inside),
            "outside" => Some(ListStylePosition::Outside),
            _ => None,
        }
    }
}
