//! Replaced-content sizing boundary.

use folio_types::ContentRef;
use std::collections::HashMap;

/// Intrinsic dimensions reported for a piece of replaced content.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct IntrinsicSize {
    pub width: f32,
    pub height: f32,
    pub aspect_ratio: Option<f32>,
}

impl IntrinsicSize {
    pub fn new(width: f32, height: f32) -> Self {
        let aspect_ratio = if height > 0.0 {
            Some(width / height)
        } else {
            None
        };
        Self {
            width,
            height,
            aspect_ratio,
        }
    }
}

/// Pure, side-effect-free sizing query for replaced content. A `None`
/// result means the reference could not be resolved; layout substitutes a
/// zero-by-zero size and carries on.
pub trait ReplacedSizer: Send + Sync {
    fn intrinsic_size(&self, content: &ContentRef) -> Option<IntrinsicSize>;
}

/// Sizer backed by a pre-registered map of references, for tests and for
/// callers that resolve all content up front.
#[derive(Debug, Default)]
pub struct InMemoryReplacedStore {
    sizes: HashMap<ContentRef, IntrinsicSize>,
}

impl InMemoryReplacedStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&mut self, content: impl Into<ContentRef>, width: f32, height: f32) {
        self.sizes
            .insert(content.into(), IntrinsicSize::new(width, height));
    }
}

impl ReplacedSizer for InMemoryReplacedStore {
    fn intrinsic_size(&self, content: &ContentRef) -> Option<IntrinsicSize> {
        self.sizes.get(content).copied()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unknown_content_is_none() {
        let store = InMemoryReplacedStore::new();
        assert!(store.intrinsic_size(&ContentRef::from("missing.png")).is_none());
    }

    #[test]
    fn registered_content_reports_aspect_ratio() {
        let mut store = InMemoryReplacedStore::new();
        store.register("logo.png", 200.0, 100.0);
        let size = store
            .intrinsic_size(&ContentRef::from("logo.png"))
            .unwrap();
        assert_eq!(size.aspect_ratio, Some(2.0));
    }
}
