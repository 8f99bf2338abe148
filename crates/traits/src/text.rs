//! Text measurement boundary.

use folio_style::{FontStyle, FontWeight};
use std::sync::Arc;

/// The font selection relevant to measuring a run of text.
#[derive(Debug, Clone, PartialEq)]
pub struct FontProperties {
    pub family: Arc<String>,
    pub size: f32,
    pub weight: FontWeight,
    pub style: FontStyle,
}

/// Line-break classification at the position immediately after a character.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BreakClass {
    /// No break permitted here.
    None,
    /// A soft wrap opportunity.
    Opportunity,
    /// A forced break; a new line must start after this character.
    Mandatory,
}

/// Measurement result for one text run.
///
/// `advances` and `breaks` have one entry per `char` of the measured text,
/// in order. The break entry describes the position *after* that character.
#[derive(Debug, Clone)]
pub struct MeasuredRun {
    pub advances: Vec<f32>,
    pub breaks: Vec<BreakClass>,
    pub ascent: f32,
    pub descent: f32,
}

impl MeasuredRun {
    pub fn total_advance(&self) -> f32 {
        self.advances.iter().sum()
    }
}

/// Synchronous text measurement, implemented outside the layout core by a
/// shaping engine. Measurement is a pure query: equal inputs must produce
/// equal outputs within a layout pass.
pub trait TextMeasurer: Send + Sync {
    fn measure(&self, text: &str, font: &FontProperties) -> MeasuredRun;
}

/// Deterministic measurer that places every character on a fixed-advance
/// grid derived from the font size. Not typographically accurate, but
/// stable, which is what tests and headless geometry extraction need.
#[derive(Debug, Clone)]
pub struct CharGridMeasurer {
    /// Horizontal advance of one character as a fraction of the font size.
    pub advance_ratio: f32,
    /// Ascent as a fraction of the font size.
    pub ascent_ratio: f32,
    /// Descent as a fraction of the font size.
    pub descent_ratio: f32,
}

impl Default for CharGridMeasurer {
    fn default() -> Self {
        Self {
            advance_ratio: 0.5,
            ascent_ratio: 0.8,
            descent_ratio: 0.2,
        }
    }
}

impl CharGridMeasurer {
    pub fn new(advance_ratio: f32) -> Self {
        Self {
            advance_ratio,
            ..Default::default()
        }
    }
}

impl TextMeasurer for CharGridMeasurer {
    fn measure(&self, text: &str, font: &FontProperties) -> MeasuredRun {
        let advance = font.size * self.advance_ratio;
        let mut advances = Vec::with_capacity(text.len());
        let mut breaks = Vec::with_capacity(text.len());
        for ch in text.chars() {
            match ch {
                '\n' => {
                    advances.push(0.0);
                    breaks.push(BreakClass::Mandatory);
                }
                c if c.is_whitespace() => {
                    advances.push(advance);
                    breaks.push(BreakClass::Opportunity);
                }
                _ => {
                    advances.push(advance);
                    breaks.push(BreakClass::None);
                }
            }
        }
        MeasuredRun {
            advances,
            breaks,
            ascent: font.size * self.ascent_ratio,
            descent: font.size * self.descent_ratio,
        }
    }
}
