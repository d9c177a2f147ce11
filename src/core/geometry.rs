//=========================================================================
// Geometry
//=========================================================================
//
// Axis-aligned rectangles used by the collision engine.
//
// Area zero is the "no overlap" sentinel everywhere: intersecting two
// disjoint rectangles yields a rectangle with zero width or height,
// never an error or an `Option`.
//
//=========================================================================

//=== Rectangle ===========================================================

/// Axis-aligned rectangle with its origin at the top-left corner.
///
/// Width and height are never negative once produced by
/// [`Rectangle::intersection`].
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Rectangle {
    pub x: f64,
    pub y: f64,
    pub w: f64,
    pub h: f64,
}

impl Rectangle {
    /// The explicit "no collision" rectangle.
    pub const ZERO: Self = Self {
        x: 0.0,
        y: 0.0,
        w: 0.0,
        h: 0.0,
    };

    pub const fn new(x: f64, y: f64, w: f64, h: f64) -> Self {
        Self { x, y, w, h }
    }

    #[inline]
    pub fn right(&self) -> f64 {
        self.x + self.w
    }

    #[inline]
    pub fn bottom(&self) -> f64 {
        self.y + self.h
    }

    #[inline]
    pub fn area(&self) -> f64 {
        self.w * self.h
    }

    /// Returns `true` if the area is zero (or negative for malformed input).
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.area() <= 0.0
    }

    /// Overlapping region of `self` and `other`.
    ///
    /// Disjoint or merely touching rectangles produce a zero-area result
    /// anchored at the would-be overlap origin.
    pub fn intersection(&self, other: &Rectangle) -> Rectangle {
        let x = self.x.max(other.x);
        let y = self.y.max(other.y);
        let w = (self.right().min(other.right()) - x).max(0.0);
        let h = (self.bottom().min(other.bottom()) - y).max(0.0);

        if w == 0.0 || h == 0.0 {
            return Rectangle::new(x, y, 0.0, 0.0);
        }

        Rectangle::new(x, y, w, h)
    }
}

//=========================================================================
// Unit Tests
//=========================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn overlapping_rectangles_intersect() {
        let a = Rectangle::new(0.0, 0.0, 10.0, 10.0);
        let b = Rectangle::new(5.0, 5.0, 10.0, 10.0);

        let r = a.intersection(&b);

        assert_eq!(r, Rectangle::new(5.0, 5.0, 5.0, 5.0));
        assert_eq!(r.area(), 25.0);
    }

    #[test]
    fn intersection_is_symmetric() {
        let a = Rectangle::new(2.0, 1.0, 4.0, 8.0);
        let b = Rectangle::new(0.0, 3.0, 5.0, 2.0);

        assert_eq!(a.intersection(&b), b.intersection(&a));
    }

    #[test]
    fn disjoint_rectangles_have_zero_area() {
        let a = Rectangle::new(0.0, 0.0, 10.0, 10.0);
        let b = Rectangle::new(20.0, 20.0, 5.0, 5.0);

        let r = a.intersection(&b);

        assert_eq!(r.area(), 0.0);
        assert!(r.is_empty());
    }

    #[test]
    fn touching_edges_do_not_overlap() {
        let a = Rectangle::new(0.0, 0.0, 10.0, 10.0);
        let b = Rectangle::new(10.0, 0.0, 10.0, 10.0);

        assert!(a.intersection(&b).is_empty());
    }

    #[test]
    fn contained_rectangle_is_its_own_intersection() {
        let outer = Rectangle::new(0.0, 0.0, 100.0, 100.0);
        let inner = Rectangle::new(10.0, 20.0, 5.0, 5.0);

        assert_eq!(outer.intersection(&inner), inner);
    }

    #[test]
    fn zero_constant_is_empty() {
        assert!(Rectangle::ZERO.is_empty());
        assert_eq!(Rectangle::default(), Rectangle::ZERO);
    }
}
