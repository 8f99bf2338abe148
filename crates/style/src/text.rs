use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, Default)]
#[serde(rename_all = "kebab-case")]
pub enum TextAlign {
    #[default]
    Left,
    Right,
    Center,
    Justify,
}

impl TextAlign {
    pub fn from_keyword(s: &str) -> Option<Self> {
        match s {
            "left" => Some(TextAlign::Left),
            "right" => Some(TextAlign::Right),
            "center" => Some(TextAlign::Center),
            "justify" => Some(TextAlign::Justify),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, Default)]
#[serde(rename_all = "kebab-case")]
pub enum TextDecoration {
    #[default]
    None,
    Underline,
    LineThrough,
}

impl TextDecoration {
    pub fn from_keyword(s: &str) -> Option<Self> {
        match s {
            "none" => Some(TextDecoration::None),
            "underline" => Some(TextDecoration::Underline),
            "line-through" => Some(TextDecoration::LineThrough),
            _ => None,
        }
    }
}

/// Whitespace processing mode. `Normal` collapses runs of whitespace to a
/// single space during box generation; `Pre` preserves spaces and turns
/// newlines into forced line breaks.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, Default)]
#[serde(rename_all = "kebab-case")]
pub enum WhiteSpace {
    #[default]
    Normal,
    Pre,
}

impl WhiteSpace {
    pub fn from_keyword(s: &str) -> Option<Self> {
        match s {
            "normal" => Some(WhiteSpace::Normal),
            "pre" => Some(WhiteSpace::Pre),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, Default)]
#[serde(rename_all = "kebab-case")]
pub enum VerticalAlign {
    #[default]
    Baseline,
    Top,
    Middle,
    Bottom,
}

impl VerticalAlign {
    pub fn from_keyword(s: &str) -> Option<Self> {
        match s {
            "baseline" => Some(VerticalAlign::Baseline),
            "top" => Some(VerticalAlign::Top),
            "middle" => Some(VerticalAlign::Middle),
            "bottom" => Some(VerticalAlign::Bottom),
            _ => None,
        }
    }
}
