pub mod backend;
pub mod camera;
pub mod game_trait;
pub mod geometry;
pub mod input;

#[cfg(any(test, feature = "test-helpers"))]
pub mod test_helpers {
    use std::cell::RefCell;
    use std::collections::{HashMap, HashSet};
    use std::rc::Rc;

    use crate::backend::{
        AssetLoader, Camera, Graphics, Image, ImageHandle, Rgba, Sound, SoundHandle,
    };
    use crate::game_trait::FrameGame;
    use crate::geometry::{Point, Rectangle};

    /// Size every mock image reports.
    pub const MOCK_IMAGE_SIZE: (i32, i32) = (64, 48);

    /// One recorded `Image::draw_at` call.
    #[derive(Debug, Clone, PartialEq, Eq)]
    pub struct DrawCall {
        pub id: String,
        pub x: i32,
        pub y: i32,
    }

    struct MockImage {
        id: String,
        log: Rc<RefCell<Vec<DrawCall>>>,
    }

    impl Image for MockImage {
        fn draw_at(&self, x: i32, y: i32) {
            self.log.borrow_mut().push(DrawCall {
                id: self.id.clone(),
                x,
                y,
            });
        }

        fn size(&self) -> (i32, i32) {
            MOCK_IMAGE_SIZE
        }
    }

    struct MockSound {
        id: String,
        log: Rc<RefCell<Vec<String>>>,
    }

    impl Sound for MockSound {
        fn play_once(&self) {
            self.log.borrow_mut().push(self.id.clone());
        }
    }

    /// Caching asset loader that logs draws and sound plays.
    ///
    /// With `with_known_ids` it panics on ids outside the given set, like a
    /// real loader backed by a resource table.
    #[derive(Default)]
    pub struct MockAssets {
        known: Option<HashSet<String>>,
        images: HashMap<String, ImageHandle>,
        sounds: HashMap<String, SoundHandle>,
        draws: Rc<RefCell<Vec<DrawCall>>>,
        plays: Rc<RefCell<Vec<String>>>,
        loads: usize,
    }

    impl MockAssets {
        /// Accepts any id.
        pub fn new() -> Self {
            Self::default()
        }

        pub fn with_known_ids<'a>(ids: impl IntoIterator<Item = &'a str>) -> Self {
            Self {
                known: Some(ids.into_iter().map(str::to_string).collect()),
                ..Self::default()
            }
        }

        fn check_known(&self, id: &str) {
            if let Some(known) = &self.known {
                assert!(known.contains(id), "unknown asset id: {id}");
            }
        }

        /// Draw calls so far, in order.
        pub fn draws(&self) -> Vec<DrawCall> {
            self.draws.borrow().clone()
        }

        pub fn clear_draws(&self) {
            self.draws.borrow_mut().clear();
        }

        /// Sound ids played so far, in order.
        pub fn plays(&self) -> Vec<String> {
            self.plays.borrow().clone()
        }

        /// Number of distinct assets actually created (cache misses).
        pub fn load_count(&self) -> usize {
            self.loads
        }
    }

    impl AssetLoader for MockAssets {
        fn load_image(&mut self, id: &str) -> ImageHandle {
            self.check_known(id);
            if let Some(image) = self.images.get(id) {
                return Rc::clone(image);
            }
            self.loads += 1;
            let image: ImageHandle = Rc::new(MockImage {
                id: id.to_string(),
                log: Rc::clone(&self.draws),
            });
            self.images.insert(id.to_string(), Rc::clone(&image));
            image
        }

        fn load_sound(&mut self, id: &str) -> SoundHandle {
            self.check_known(id);
            if let Some(sound) = self.sounds.get(id) {
                return Rc::clone(sound);
            }
            self.loads += 1;
            let sound: SoundHandle = Rc::new(MockSound {
                id: id.to_string(),
                log: Rc::clone(&self.plays),
            });
            self.sounds.insert(id.to_string(), Rc::clone(&sound));
            sound
        }
    }

    /// Camera that remembers every request.
    #[derive(Debug, Default)]
    pub struct RecordingCamera {
        pub centers: Vec<Point>,
        pub bounds: Option<Rectangle>,
    }

    impl RecordingCamera {
        pub fn shared() -> Rc<RefCell<RecordingCamera>> {
            Rc::new(RefCell::new(Self::default()))
        }

        pub fn last_center(&self) -> Option<Point> {
            self.centers.last().copied()
        }
    }

    impl Camera for RecordingCamera {
        fn center_around(&mut self, x: i32, y: i32) {
            self.centers.push(Point::new(x, y));
        }

        fn set_bounds(&mut self, bounds: Rectangle) {
            self.bounds = Some(bounds);
        }
    }

    /// Graphics backend that records fills and clears.
    #[derive(Debug, Default)]
    pub struct RecordingGraphics {
        pub fills: Vec<(Rectangle, Rgba)>,
        pub clears: Vec<(u8, u8, u8)>,
    }

    impl Graphics for RecordingGraphics {
        fn fill_rect(&mut self, rect: Rectangle, color: Rgba) {
            self.fills.push((rect, color));
        }

        fn clear_screen(&mut self, r: u8, g: u8, b: u8) {
            self.clears.push((r, g, b));
        }
    }

    /// Run `n` updates, returning all accumulated events.
    pub fn run_frames<G: FrameGame>(game: &mut G, n: usize) -> Vec<G::Event> {
        let mut all_events = Vec::new();
        for _ in 0..n {
            all_events.extend(game.update());
        }
        all_events
    }

    /// Assert that the game's serialized state differs from `before`.
    pub fn assert_game_state_changed<G: FrameGame>(game: &G, before: &[u8]) {
        let after = game.serialize_state();
        assert_ne!(
            before,
            &after[..],
            "Game state should have changed after operation"
        );
    }

}
