use crate::backend::Camera;
use crate::geometry::{Point, Rectangle};

/// Half-extent of the default camera bounds, large enough to be unbounded
/// in practice.
const UNBOUNDED: i32 = 999_999;

/// A window-sized view that follows a point and stays inside `bounds`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WindowCamera {
    view: Rectangle,
    bounds: Rectangle,
}

impl WindowCamera {
    pub fn new(window_w: i32, window_h: i32) -> Self {
        let mut cam = Self {
            view: Rectangle::default(),
            bounds: Rectangle::new(-UNBOUNDED, -UNBOUNDED, 2 * UNBOUNDED, 2 * UNBOUNDED),
        };
        cam.set_window_size(window_w, window_h);
        cam
    }

    /// Resize the view, keeping it centered where it was.
    pub fn set_window_size(&mut self, w: i32, h: i32) {
        let center = self.view.center();
        self.view.w = w;
        self.view.h = h;
        self.center_on(center);
    }

    /// The visible world rectangle.
    pub fn view(&self) -> Rectangle {
        self.view
    }

    /// Translation to apply to world coordinates when drawing.
    pub fn offset(&self) -> Point {
        Point::new(-self.view.x, -self.view.y)
    }
}

impl Camera for WindowCamera {
    fn center_around(&mut self, x: i32, y: i32) {
        self.view.x = x - self.view.w / 2;
        self.view.y = y - self.view.h / 2;

        // Left/top clamps first; a view larger than the bounds ends up
        // aligned to the right/bottom edge.
        if self.view.x < self.bounds.x {
            self.view.x = self.bounds.x;
        }
        if self.view.y < self.bounds.y {
            self.view.y = self.bounds.y;
        }
        if self.view.right() > self.bounds.right() {
            self.view.x = self.bounds.right() - self.view.w;
        }
        if self.view.bottom() > self.bounds.bottom() {
            self.view.y = self.bounds.bottom() - self.view.h;
        }
    }

    fn set_bounds(&mut self, bounds: Rectangle) {
        self.bounds = bounds;
    }
}
