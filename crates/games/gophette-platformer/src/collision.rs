use serde::{Deserialize, Serialize};

use gophette_core::geometry::Rectangle;

/// How an obstacle blocks movement.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Solidity {
    /// Blocks from every side; a body never overlaps it.
    Solid,
    /// Only stops a body landing on its top edge. Walk through it sideways,
    /// jump through it from below.
    TopSolid,
}

/// An immovable obstacle in the level.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CollisionObject {
    pub bounds: Rectangle,
    pub solidity: Solidity,
}

impl CollisionObject {
    pub fn solid(bounds: Rectangle) -> Self {
        Self {
            bounds,
            solidity: Solidity::Solid,
        }
    }

    pub fn top_solid(bounds: Rectangle) -> Self {
        Self {
            bounds,
            solidity: Solidity::TopSolid,
        }
    }

    fn is_solid(&self) -> bool {
        self.solidity == Solidity::Solid
    }
}

/// Single-axis movement resolution against static obstacles.
pub trait Collider {
    /// Move `bounds` horizontally by up to `dx`. Returns the new bounds and
    /// whether the move was cut short.
    fn move_in_x(&self, bounds: Rectangle, dx: i32) -> (Rectangle, bool);

    /// Move `bounds` vertically by up to `dy`. Returns the new bounds and
    /// whether the move was cut short.
    fn move_in_y(&self, bounds: Rectangle, dy: i32) -> (Rectangle, bool);
}

/// Ordered list of level obstacles, scanned linearly.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CollisionWorld {
    objects: Vec<CollisionObject>,
}

impl CollisionWorld {
    pub fn new(objects: Vec<CollisionObject>) -> Self {
        Self { objects }
    }

    pub fn objects(&self) -> &[CollisionObject] {
        &self.objects
    }

    fn solids(&self) -> impl Iterator<Item = &CollisionObject> {
        self.objects.iter().filter(|o| o.is_solid())
    }
}

// Every pass builds a sweep rectangle covering the whole path and shrinks it
// in place as obstacles are found, so later obstacles are tested against the
// already-shortened sweep and the nearest one wins regardless of list order.
impl Collider for CollisionWorld {
    fn move_in_x(&self, bounds: Rectangle, dx: i32) -> (Rectangle, bool) {
        let mut collided = false;
        match dx {
            0 => (bounds, false),
            dx if dx < 0 => {
                let mut sweep = bounds;
                sweep.x += dx;
                sweep.w -= dx;
                for obj in self.solids() {
                    if obj.bounds.overlaps(&sweep) {
                        collided = true;
                        let overlap = obj.bounds.right() - sweep.x;
                        sweep.x += overlap;
                        sweep.w -= overlap;
                    }
                }
                (bounds.move_to(sweep.x, sweep.y), collided)
            },
            dx => {
                let mut sweep = bounds;
                sweep.w += dx;
                for obj in self.solids() {
                    if obj.bounds.overlaps(&sweep) {
                        collided = true;
                        sweep.w -= sweep.right() - obj.bounds.x;
                    }
                }
                (bounds.move_to(sweep.right() - bounds.w, sweep.y), collided)
            },
        }
    }

    fn move_in_y(&self, bounds: Rectangle, dy: i32) -> (Rectangle, bool) {
        let mut collided = false;
        match dy {
            0 => (bounds, false),
            dy if dy < 0 => {
                // Rising bodies pass through top-solid platforms.
                let mut sweep = bounds;
                sweep.y += dy;
                sweep.h -= dy;
                for obj in self.solids() {
                    if obj.bounds.overlaps(&sweep) {
                        collided = true;
                        let overlap = obj.bounds.bottom() - sweep.y;
                        sweep.y += overlap;
                        sweep.h -= overlap;
                    }
                }
                (bounds.move_to(sweep.x, sweep.y), collided)
            },
            dy => {
                // Only the span below the body's feet is swept. A top-solid
                // platform is reduced to its top edge so a body already below
                // that edge is never caught by it.
                let mut sweep = Rectangle::new(bounds.x, bounds.bottom(), bounds.w, dy);
                for obj in &self.objects {
                    let mut surface = obj.bounds;
                    if !obj.is_solid() {
                        surface.h = 1;
                    }
                    if surface.overlaps(&sweep) {
                        collided = true;
                        sweep.h -= sweep.bottom() - obj.bounds.y;
                    }
                }
                (bounds.move_by(0, sweep.h), collided)
            },
        }
    }
}
