//! Geometry primitives
use std::cmp::max;

/// An x,y coordinate pair relative to the root window.
///
/// Coordinates are signed: a window dragged half way off the left hand edge
/// of a screen has a negative x position.
#[derive(Default, Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub struct Point {
    /// An absolute x coordinate relative to the root window
    pub x: i32,
    /// An absolute y coordinate relative to the root window
    pub y: i32,
}

impl Point {
    /// Create a new Point.
    pub fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }
}

impl From<(i32, i32)> for Point {
    fn from(raw: (i32, i32)) -> Self {
        let (x, y) = raw;

        Self { x, y }
    }
}

// A Rect converts to its top left corner
impl From<Rect> for Point {
    fn from(r: Rect) -> Self {
        let Rect { x, y, .. } = r;

        Self { x, y }
    }
}

/// An X window / screen position: top left corner + extent
#[derive(Default, Debug, PartialEq, Eq, Clone, Copy, Hash)]
pub struct Rect {
    /// The x-coordinate of the top left corner of this rect
    pub x: i32,
    /// The y-coordinate of the top left corner of this rect
    pub y: i32,
    /// The width of this rect
    pub w: u32,
    /// The height of this rect
    pub h: u32,
}

impl Rect {
    /// Create a new Rect.
    pub const fn new(x: i32, y: i32, w: u32, h: u32) -> Rect {
        Rect { x, y, w, h }
    }

    /// The x-coordinate one past the right hand edge of this rect.
    pub fn right(&self) -> i32 {
        self.x + self.w as i32
    }

    /// The y-coordinate one past the bottom edge of this rect.
    pub fn bottom(&self) -> i32 {
        self.y + self.h as i32
    }

    /// The midpoint of this rectangle.
    ///
    /// Odd side lengths will lead to a truncated point towards the top left
    /// corner in order to maintain integer coordinates.
    /// ```
    /// # use escher::pure::geometry::{Rect, Point};
    /// let r = Rect::new(0, 0, 100, 200);
    ///
    /// assert_eq!(r.midpoint(), Point { x: 50, y: 100 });
    /// ```
    pub fn midpoint(&self) -> Point {
        Point {
            x: self.x + self.w as i32 / 2,
            y: self.y + self.h as i32 / 2,
        }
    }

    /// Update the width and height of this [Rect] by specified deltas.
    ///
    /// Minimum size is clamped at 1x1.
    pub fn resize(&mut self, dw: i32, dh: i32) {
        self.w = max(1, (self.w as i32) + dw) as u32;
        self.h = max(1, (self.h as i32) + dh) as u32;
    }

    /// Update the position of this [Rect] by specified deltas.
    pub fn reposition(&mut self, dx: i32, dy: i32) {
        self.x += dx;
        self.y += dy;
    }

    /// Check whether this Rect contains `other` as a sub-Rect
    pub fn contains(&self, other: &Rect) -> bool {
        other.x >= self.x
            && other.right() <= self.right()
            && other.y >= self.y
            && other.bottom() <= self.bottom()
    }

    /// Check whether this Rect contains `p`
    pub fn contains_point<P>(&self, p: P) -> bool
    where
        P: Into<Point>,
    {
        let p = p.into();

        (self.x..=self.right()).contains(&p.x) && (self.y..=self.bottom()).contains(&p.y)
    }

    /// The intersection area between this Rect and `other`, in pixels.
    ///
    /// Used to decide which monitor a window "mostly" occupies.
    pub fn intersection_area(&self, other: &Rect) -> u64 {
        let dx = max(0, self.right().min(other.right()) - self.x.max(other.x)) as u64;
        let dy = max(0, self.bottom().min(other.bottom()) - self.y.max(other.y)) as u64;

        dx * dy
    }

    /// Center this Rect inside of `enclosing`.
    ///
    /// Returns `None` if this Rect can not fit inside enclosing
    pub fn centered_in(&self, enclosing: &Rect) -> Option<Self> {
        if self.w > enclosing.w || self.h > enclosing.h {
            return None;
        }

        Some(Self {
            x: enclosing.x + ((enclosing.w - self.w) / 2) as i32,
            y: enclosing.y + ((enclosing.h - self.h) / 2) as i32,
            ..*self
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use simple_test_case::test_case;

    fn r(x: i32, y: i32, w: u32, h: u32) -> Rect {
        Rect::new(x, y, w, h)
    }

    fn p(x: i32, y: i32) -> Point {
        Point { x, y }
    }

    #[test_case(r(0, 0, 10, 20), p(5, 10); "even both")]
    #[test_case(r(0, 0, 10, 21), p(5, 10); "even width")]
    #[test_case(r(0, 0, 11, 20), p(5, 10); "even height")]
    #[test_case(r(-10, -20, 10, 20), p(-5, -10); "negative origin")]
    #[test]
    fn midpoint_works(r: Rect, p: Point) {
        assert_eq!(r.midpoint(), p);
    }

    #[test_case(1, 2, r(0, 0, 11, 22); "increase")]
    #[test_case(-1, -2, r(0, 0, 9, 18); "decrease")]
    #[test_case(-100, -100, r(0, 0, 1, 1); "clamp at 1x1")]
    #[test]
    fn resize_works(dw: i32, dh: i32, expected: Rect) {
        let mut r = Rect::new(0, 0, 10, 20);
        r.resize(dw, dh);

        assert_eq!(r, expected);
    }

    #[test]
    fn contains_rect() {
        let r1 = Rect::new(10, 10, 50, 50);
        let r2 = Rect::new(0, 0, 100, 100);

        assert!(r2.contains(&r1));
        assert!(!r1.contains(&r2));
    }

    #[test_case(p(0, 0), false; "outside")]
    #[test_case(p(30, 20), true; "inside")]
    #[test_case(p(10, 20), true; "top left")]
    #[test_case(p(40, 60), true; "bottom right")]
    #[test]
    fn contains_point(p: Point, expected: bool) {
        let r = Rect::new(10, 20, 30, 40);

        assert_eq!(r.contains_point(p), expected);
    }

    #[test_case(r(0, 0, 100, 100), r(50, 50, 100, 100), 2500; "overlapping")]
    #[test_case(r(0, 0, 100, 100), r(100, 100, 10, 10), 0; "touching corner")]
    #[test_case(r(0, 0, 100, 100), r(200, 0, 10, 10), 0; "disjoint")]
    #[test_case(r(0, 0, 100, 100), r(10, 10, 20, 20), 400; "contained")]
    #[test]
    fn intersection_area(a: Rect, b: Rect, expected: u64) {
        assert_eq!(a.intersection_area(&b), expected);
        assert_eq!(b.intersection_area(&a), expected);
    }

    #[test_case(r(0, 0, 10, 10), Some(r(5, 5, 10, 10)); "fits")]
    #[test_case(r(100, 100, 10, 10), Some(r(5, 5, 10, 10)); "fits but not contained")]
    #[test_case(r(0, 0, 100, 100), None; "doesn't fit")]
    #[test]
    fn centered_in(inner: Rect, expected: Option<Rect>) {
        let outer = Rect::new(0, 0, 20, 20);

        assert_eq!(inner.centered_in(&outer), expected);
    }
}
