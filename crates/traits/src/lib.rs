//! Adapter interfaces the layout core consumes.
//!
//! Text shaping and replaced-content decoding live outside this system;
//! these traits are the narrow, synchronous boundary through which layout
//! asks for the few facts it needs. In-memory implementations suitable for
//! tests and headless use are provided alongside the traits.

pub mod replaced;
pub mod text;

pub use replaced::{InMemoryReplacedStore, IntrinsicSize, ReplacedSizer};
pub use text::{BreakClass, CharGridMeasurer, FontProperties, MeasuredRun, TextMeasurer};
