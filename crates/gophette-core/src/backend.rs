//! Capability contracts the game core drives.
//!
//! Concrete backends (SDL, web, headless) implement these; the core never
//! decodes image data, plays audio itself, or reads the camera back.

use std::cell::RefCell;
use std::rc::Rc;

use crate::geometry::{Point, Rectangle};

/// A drawable image. Coordinates are world space; the backend applies the
/// camera translation.
pub trait Image {
    fn draw_at(&self, x: i32, y: i32);

    /// Width and height in pixels.
    fn size(&self) -> (i32, i32);
}

/// Fire-and-forget sound effect.
pub trait Sound {
    fn play_once(&self);
}

/// Shared handle to a loaded image.
pub type ImageHandle = Rc<dyn Image>;
/// Shared handle to a loaded sound.
pub type SoundHandle = Rc<dyn Sound>;

/// Resolves asset identifiers to handles.
///
/// Identifiers form a closed set known at build time. Implementations may
/// return a cached handle for repeated ids and must panic on an unknown id.
pub trait AssetLoader {
    fn load_image(&mut self, id: &str) -> ImageHandle;
    fn load_sound(&mut self, id: &str) -> SoundHandle;
}

/// RGBA colour for debug rectangle fills.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Rgba {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl Rgba {
    pub const fn new(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }
}

/// Primitive drawing used by placeholder/debug rendering.
pub trait Graphics {
    fn fill_rect(&mut self, rect: Rectangle, color: Rgba);
    fn clear_screen(&mut self, r: u8, g: u8, b: u8);
}

/// Write-only camera steering.
pub trait Camera {
    fn center_around(&mut self, x: i32, y: i32);
    fn set_bounds(&mut self, bounds: Rectangle);

    fn center_on(&mut self, point: Point) {
        self.center_around(point.x, point.y);
    }
}

/// Lets the host keep reading a camera (for draw offsets) that the game
/// steers.
impl<C: Camera + ?Sized> Camera for Rc<RefCell<C>> {
    fn center_around(&mut self, x: i32, y: i32) {
        self.borrow_mut().center_around(x, y);
    }

    fn set_bounds(&mut self, bounds: Rectangle) {
        self.borrow_mut().set_bounds(bounds);
    }
}
