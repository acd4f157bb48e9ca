use serde::{Deserialize, Serialize};

/// Integer point in world space (y grows downward).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Point {
    pub x: i32,
    pub y: i32,
}

impl Point {
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }
}

/// Axis-aligned integer rectangle.
///
/// Width and height may go zero or negative while collision code shrinks a
/// sweep span; such rectangles never overlap anything and must not be drawn.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Rectangle {
    pub x: i32,
    pub y: i32,
    pub w: i32,
    pub h: i32,
}

impl Rectangle {
    pub const fn new(x: i32, y: i32, w: i32, h: i32) -> Self {
        Self { x, y, w, h }
    }

    /// Right edge (exclusive).
    pub fn right(&self) -> i32 {
        self.x + self.w
    }

    /// Bottom edge (exclusive).
    pub fn bottom(&self) -> i32 {
        self.y + self.h
    }

    pub fn move_by(&self, dx: i32, dy: i32) -> Self {
        Self::new(self.x + dx, self.y + dy, self.w, self.h)
    }

    pub fn move_to(&self, x: i32, y: i32) -> Self {
        Self::new(x, y, self.w, self.h)
    }

    /// Open intersection test. Rectangles that only share an edge do not
    /// overlap.
    pub fn overlaps(&self, other: &Rectangle) -> bool {
        self.right() > other.x
            && self.bottom() > other.y
            && other.right() > self.x
            && other.bottom() > self.y
    }

    /// True if `inner` lies entirely within this rectangle's closed bounds.
    pub fn contains(&self, inner: &Rectangle) -> bool {
        inner.x >= self.x
            && inner.y >= self.y
            && inner.right() <= self.right()
            && inner.bottom() <= self.bottom()
    }

    /// Center point, rounded toward the top-left like integer halving.
    pub fn center(&self) -> Point {
        Point::new(self.x + self.w / 2, self.y + self.h / 2)
    }

    /// Copy grown by `margin` on every side.
    pub fn add_margin(&self, margin: i32) -> Self {
        Self::new(
            self.x - margin,
            self.y - margin,
            self.w + 2 * margin,
            self.h + 2 * margin,
        )
    }
}
