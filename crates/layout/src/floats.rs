//! Per-BFC float tracking and exclusion-band queries.
//!
//! Each block formatting context owns one `FloatContext`. Floats are
//! registered in source order; in-flow content asks for the widest
//! unobstructed horizontal band at a given vertical extent, and `clear`
//! resolves against the registered floats' bottom edges.

use folio_style::{Clear, Float};
use folio_types::{Rect, Size};

/// The unobstructed horizontal span available at some vertical position.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Band {
    pub left: f32,
    pub right: f32,
}

impl Band {
    pub fn width(&self) -> f32 {
        (self.right - self.left).max(0.0)
    }
}

#[derive(Debug, Clone)]
struct PlacedFloat {
    /// Margin box of the float, in document coordinates.
    rect: Rect,
    side: Float,
}

#[derive(Debug)]
pub struct FloatContext {
    /// Content-box edges of the establishing block.
    left_edge: f32,
    right_edge: f32,
    floats: Vec<PlacedFloat>,
}

impl FloatContext {
    pub fn new(left_edge: f32, right_edge: f32) -> Self {
        Self {
            left_edge,
            right_edge,
            floats: Vec::new(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.floats.is_empty()
    }

    pub fn left_edge(&self) -> f32 {
        self.left_edge
    }

    pub fn right_edge(&self) -> f32 {
        self.right_edge
    }

    /// Registers an already-placed float. Floats must be registered in
    /// source order; placement never reorders them.
    pub fn register(&mut self, rect: Rect, side: Float) {
        debug_assert!(side != Float::None);
        self.floats.push(PlacedFloat { rect, side });
    }

    /// The available band over the vertical extent `[y, y + height)`.
    pub fn exclusion_band(&self, y: f32, height: f32) -> Band {
        let bottom = y + height.max(0.0);
        let mut band = Band {
            left: self.left_edge,
            right: self.right_edge,
        };
        for float in &self.floats {
            if float.rect.bottom() <= y || float.rect.y >= bottom {
                continue;
            }
            match float.side {
                Float::Left => band.left = band.left.max(float.rect.right()),
                Float::Right => band.right = band.right.min(float.rect.x),
                Float::None => {}
            }
        }
        band
    }

    /// The lowest bottom edge of the floats a `clear` value must pass.
    /// Returns `f32::NEG_INFINITY` when there is nothing to clear.
    pub fn clearance_for(&self, clear: Clear) -> f32 {
        let mut bottom = f32::NEG_INFINITY;
        for float in &self.floats {
            let relevant = match clear {
                Clear::None => false,
                Clear::Left => float.side == Float::Left,
                Clear::Right => float.side == Float::Right,
                Clear::Both => true,
            };
            if relevant {
                bottom = bottom.max(float.rect.bottom());
            }
        }
        bottom
    }

    /// Bottom edge of all registered floats; the establishing BFC's height
    /// must extend at least this far.
    pub fn floats_bottom(&self) -> f32 {
        self.floats
            .iter()
            .map(|f| f.rect.bottom())
            .fold(f32::NEG_INFINITY, f32::max)
    }

    /// Finds the position for a new float of the given margin-box size, no
    /// higher than `min_y`. The float is not registered; callers register
    /// the returned rect once the float's subtree has been moved there.
    pub fn place(&self, size: Size, side: Float, min_y: f32) -> Rect {
        let mut y = min_y;
        // A later same-side float may never sit above an earlier one.
        for float in &self.floats {
            if float.side == side {
                y = y.max(float.rect.y);
            }
        }
        loop {
            let band = self.exclusion_band(y, size.height.max(1.0));
            if band.width() + 0.01 >= size.width {
                let x = match side {
                    Float::Right => band.right - size.width,
                    _ => band.left,
                };
                return Rect::new(x, y, size.width, size.height);
            }
            match self.next_band_change(y) {
                // Wider than every band: place against the context edge
                // at the first position below all floats and overflow.
                None => {
                    let x = match side {
                        Float::Right => self.right_edge - size.width,
                        _ => self.left_edge,
                    };
                    return Rect::new(x, y, size.width, size.height);
                }
                Some(next_y) => y = next_y,
            }
        }
    }

    /// Position for a box that must not overlap floats (a BFC root in this
    /// context): the left edge and y of the first band at least `width`
    /// wide, starting no higher than `min_y`. Falls back to below all
    /// floats when no band ever fits.
    pub(crate) fn avoid_overlap(&self, width: f32, min_y: f32) -> (f32, f32) {
        let mut y = min_y;
        loop {
            let band = self.exclusion_band(y, 1.0);
            if band.width() + 0.01 >= width {
                return (band.left, y);
            }
            match self.next_band_change(y) {
                Some(next_y) => y = next_y,
                None => return (self.left_edge, y),
            }
        }
    }

    /// First y below `y` at which some float ends, i.e. where the band can
    /// widen. `None` when no float extends past `y`.
    fn next_band_change(&self, y: f32) -> Option<f32> {
        self.floats
            .iter()
            .map(|f| f.rect.bottom())
            .filter(|&bottom| bottom > y + 0.01)
            .min_by(|a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal))
    }
}
