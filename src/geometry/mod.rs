//! Provider-agnostic geometry.
//!
//! Every detection backend reduces its response to an ordered list of
//! [`Point`]s; cropping only ever needs the [`Rect`] bounding them.

mod point;
mod rect;

pub use point::Point;
pub use rect::Rect;
