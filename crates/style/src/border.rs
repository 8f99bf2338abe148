use folio_types::Color;
use serde::{Deserialize, Serialize};
use std::hash::{Hash, Hasher};

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, Default)]
#[serde(rename_all = "kebab-case")]
pub enum BorderStyle {
    #[default]
    None,
    Solid,
    Dashed,
    Dotted,
}

impl BorderStyle {
    pub fn from_keyword(s: &str) -> Option<Self> {
        match s {
            "none" => Some(BorderStyle::None),
            "solid" => Some(BorderStyle::Solid),
            "dashed" => Some(BorderStyle::Dashed),
            "dotted" => Some(BorderStyle::Dotted),
            _ => None,
        }
    }
}

/// One side of a box border. A border with `style: None` contributes no
/// width to layout regardless of its `width` value.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct Border {
    pub width: f32,
    #[serde(default)]
    pub style: BorderStyle,
    #[serde(default)]
    pub color: Color,
}

impl Border {
    /// The width the border contributes to the box model.
    pub fn used_width(&self) -> f32 {
        if self.style == BorderStyle::None {
            0.0
        } else {
            self.width.max(0.0)
        }
    }
}

impl Eq for Border {}

impl Hash for Border {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.width.to_bits().hash(state);
        self.style.hash(state);
        self.color.hash(state);
    }
}
