//! Backends for running without a window or an audio device.

use std::cell::{Cell, RefCell};
use std::collections::{BTreeMap, HashMap, HashSet};
use std::rc::Rc;

use gophette_core::backend::{AssetLoader, Graphics, Image, ImageHandle, Rgba, Sound, SoundHandle};
use gophette_core::geometry::Rectangle;

/// Size every headless image reports.
pub const HEADLESS_IMAGE_SIZE: (i32, i32) = (128, 128);

struct HeadlessImage {
    draws: Rc<Cell<u64>>,
}

impl Image for HeadlessImage {
    fn draw_at(&self, _x: i32, _y: i32) {
        self.draws.set(self.draws.get() + 1);
    }

    fn size(&self) -> (i32, i32) {
        HEADLESS_IMAGE_SIZE
    }
}

struct HeadlessSound {
    id: String,
    plays: Rc<RefCell<BTreeMap<String, u32>>>,
}

impl Sound for HeadlessSound {
    fn play_once(&self) {
        tracing::debug!(sound = %self.id, "Playing sound");
        *self.plays.borrow_mut().entry(self.id.clone()).or_default() += 1;
    }
}

/// Asset loader over a closed id set that counts draws and sound plays.
pub struct HeadlessAssets {
    known: HashSet<String>,
    images: HashMap<String, ImageHandle>,
    sounds: HashMap<String, SoundHandle>,
    draws: Rc<Cell<u64>>,
    plays: Rc<RefCell<BTreeMap<String, u32>>>,
}

impl HeadlessAssets {
    pub fn new(known: impl IntoIterator<Item = String>) -> Self {
        Self {
            known: known.into_iter().collect(),
            images: HashMap::new(),
            sounds: HashMap::new(),
            draws: Rc::new(Cell::new(0)),
            plays: Rc::new(RefCell::new(BTreeMap::new())),
        }
    }

    fn check_known(&self, id: &str) {
        if !self.known.contains(id) {
            panic!("unknown asset id: {id}");
        }
    }

    pub fn draw_count(&self) -> u64 {
        self.draws.get()
    }

    /// Plays per sound id.
    pub fn sound_counts(&self) -> BTreeMap<String, u32> {
        self.plays.borrow().clone()
    }
}

impl AssetLoader for HeadlessAssets {
    fn load_image(&mut self, id: &str) -> ImageHandle {
        self.check_known(id);
        let draws = &self.draws;
        let image = self.images.entry(id.to_string()).or_insert_with(|| {
            Rc::new(HeadlessImage {
                draws: Rc::clone(draws),
            }) as ImageHandle
        });
        Rc::clone(image)
    }

    fn load_sound(&mut self, id: &str) -> SoundHandle {
        self.check_known(id);
        let plays = &self.plays;
        let sound = self.sounds.entry(id.to_string()).or_insert_with(|| {
            Rc::new(HeadlessSound {
                id: id.to_string(),
                plays: Rc::clone(plays),
            }) as SoundHandle
        });
        Rc::clone(sound)
    }
}

/// Graphics backend that only counts calls.
#[derive(Debug, Default)]
pub struct CountingGraphics {
    pub fills: u64,
    pub clears: u64,
}

impl Graphics for CountingGraphics {
    fn fill_rect(&mut self, _rect: Rectangle, _color: Rgba) {
        self.fills += 1;
    }

    fn clear_screen(&mut self, _r: u8, _g: u8, _b: u8) {
        self.clears += 1;
    }
}
