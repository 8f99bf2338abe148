//! Positioning-scheme and flow-control properties.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, Default)]
#[serde(rename_all = "kebab-case")]
pub enum Float {
    #[default]
    None,
    Left,
    Right,
}

impl Float {
    pub fn from_keyword(s: &str) -> Option<Self> {
        match s {
            "none" => Some(Float::None),
            "left" => Some(Float::Left),
            "right" => Some(Float::Right),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, Default)]
#[serde(rename_all = "kebab-case")]
pub enum Clear {
    #[default]
    None,
    Left,
    Right,
    Both,
}

impl Clear {
    pub fn from_keyword(s: &str) -> Option<Self> {
        match s {
            "none" => Some(Clear::None),
            "left" => Some(Clear::Left),
            "right" => Some(Clear::Right),
            "both" => Some(Clear::Both),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, Default)]
#[serde(rename_all = "kebab-case")]
pub enum Position {
    #[default]
    Static,
    Relative,
    Absolute,
    Fixed,
}

impl Position {
    pub fn from_keyword(s: &str) -> Option<Self> {
        match s {
            "static" => Some(Position::Static),
            "relative" => Some(Position::Relative),
            "absolute" => Some(Position::Absolute),
            "fixed" => Some(Position::Fixed),
            _ => None,
        }
    }

    /// Whether a box with this position is taken out of normal flow.
    pub fn is_out_of_flow(&self) -> bool {
        matches!(self, Position::Absolute | Position::Fixed)
    }

    /// Whether a box with this position establishes a containing block for
    /// absolutely positioned descendants.
    pub fn is_positioned(&self) -> bool {
        !matches!(self, Position::Static)
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, Default)]
#[serde(rename_all = "kebab-case")]
pub enum Overflow {
    #[default]
    Visible,
    Hidden,
}

impl Overflow {
    pub fn from_keyword(s: &str) -> Option<Self> {
        match s {
            "visible" => Some(Overflow::Visible),
            "hidden" => Some(Overflow::Hidden),
            _ => None,
        }
    }
}
