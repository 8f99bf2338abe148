pub mod color;
pub mod content;
pub mod geometry;

pub use color::Color;
pub use content::ContentRef;
pub use geometry::{BoxConstraints, Edges, Rect, Size};
