//! Fragmentation-control properties.

use serde::{Deserialize, Serialize};

/// `break-before` / `break-after` values.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, Default)]
#[serde(rename_all = "kebab-case")]
pub enum BreakBetween {
    #[default]
    Auto,
    Avoid,
    Page,
}

impl BreakBetween {
    pub fn from_keyword(s: &str) -> Option<Self> {
        match s {
            "auto" => Some(BreakBetween::Auto),
            "avoid" => Some(BreakBetween::Avoid),
            // `always` is the CSS2 spelling of a forced page break.
            "page" | "always" => Some(BreakBetween::Page),
            _ => None,
        }
    }

    pub fn is_forced(&self) -> bool {
        matches!(self, BreakBetween::Page)
    }
}

/// `break-inside` values.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, Default)]
#[serde(rename_all = "kebab-case")]
pub enum BreakInside {
    #[default]
    Auto,
    Avoid,
}

impl BreakInside {
    pub fn from_keyword(s: &str) -> Option<Self> {
        match s {
            "auto" => Some(BreakInside::Auto),
            "avoid" => Some(BreakInside::Avoid),
            _ => None,
        }
    }
}
