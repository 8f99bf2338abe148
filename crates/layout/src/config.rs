use folio_style::{Margins, PageSize};
use folio_types::{Rect, Size};
use serde::{Deserialize, Serialize};

/// Page geometry and break-policy configuration for one pagination run.
///
/// This is the only process-wide state the engine consumes; it is passed
/// explicitly into the pagination entry point, never read from globals.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PageConfig {
    pub size: PageSize,
    pub margins: Margins,
    /// Document-wide minimum lines kept at the bottom of a page when a
    /// block of lines splits. Elements may override via `orphans`.
    pub orphans: u32,
    /// Minimum lines carried onto the next page. Overridable via `widows`.
    pub widows: u32,
}

impl Default for PageConfig {
    fn default() -> Self {
        Self {
            size: PageSize::default(),
            margins: Margins::all(36.0),
            // CSS initial values.
            orphans: 2,
            widows: 2,
        }
    }
}

impl PageConfig {
    pub fn with_size(width: f32, height: f32) -> Self {
        Self {
            size: PageSize::Custom { width, height },
            ..Default::default()
        }
    }

    pub fn page_size(&self) -> Size {
        let (w, h) = self.size.dimensions_pt();
        Size::new(w, h)
    }

    /// The content area in page coordinates (page top-left is the origin).
    pub fn content_area(&self) -> Rect {
        let (w, h) = self.size.dimensions_pt();
        Rect {
            x: self.margins.left,
            y: self.margins.top,
            width: (w - self.margins.left - self.margins.right).max(0.0),
            height: (h - self.margins.top - self.margins.bottom).max(0.0),
        }
    }

    pub fn content_size(&self) -> Size {
        self.content_area().size()
    }
}
