//! Axis-aligned bounding rectangles over detected points.

use super::point::Point;

/// An axis-aligned rectangle given by its upper-left (`min`) and lower-right
/// (`max`) corners.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Rect {
    pub min: Point,
    pub max: Point,
}

impl Rect {
    /// Creates a rectangle from explicit corners. Corners are not reordered.
    #[inline]
    pub fn new(min: Point, max: Point) -> Self {
        Self { min, max }
    }

    /// Smallest rectangle containing every point, or `None` when there are
    /// no points.
    pub fn bounding(points: &[Point]) -> Option<Self> {
        let (first, rest) = points.split_first()?;
        let mut min = *first;
        let mut max = *first;
        for point in rest {
            min.x = min.x.min(point.x);
            min.y = min.y.min(point.y);
            max.x = max.x.max(point.x);
            max.y = max.y.max(point.y);
        }
        Some(Self { min, max })
    }

    #[inline]
    pub fn width(&self) -> i64 {
        self.max.x.saturating_sub(self.min.x)
    }

    #[inline]
    pub fn height(&self) -> i64 {
        self.max.y.saturating_sub(self.min.y)
    }
}
