use gophette_core::backend::{AssetLoader, ImageHandle};
use gophette_core::geometry::{Point, Rectangle};

use crate::character::{Character, bottom_centered};

/// Art of one character kind. Per-direction tables are indexed with
/// [`Direction::index`](crate::character::Direction::index): left, then right.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CharacterArchetype {
    /// Collision rectangle in sprite space. Its origin is the offset from
    /// the sprite's top-left corner to the collision bounds.
    pub collision_rect: Rectangle,
    pub run_frames: [&'static [&'static str]; 2],
    pub stand_frames: [&'static str; 2],
    pub jump_frames: [&'static str; 2],
}

impl CharacterArchetype {
    pub const HERO: Self = Self {
        collision_rect: Rectangle::new(28, 18, 42, 80),
        run_frames: [
            &[
                "gophette_left_run1",
                "gophette_left_run2",
                "gophette_left_run1",
                "gophette_left_run3",
            ],
            &[
                "gophette_right_run1",
                "gophette_right_run2",
                "gophette_right_run1",
                "gophette_right_run3",
            ],
        ],
        stand_frames: ["gophette_left_run1", "gophette_right_run1"],
        jump_frames: ["gophette_left_jump", "gophette_right_jump"],
    };

    pub const COMPANION: Self = Self {
        collision_rect: Rectangle::new(36, 22, 54, 116),
        run_frames: [
            &[
                "barney_left_run1",
                "barney_left_run2",
                "barney_left_run3",
                "barney_left_run4",
                "barney_left_run5",
                "barney_left_run6",
            ],
            &[
                "barney_right_run1",
                "barney_right_run2",
                "barney_right_run3",
                "barney_right_run4",
                "barney_right_run5",
                "barney_right_run6",
            ],
        ],
        stand_frames: ["barney_left_stand", "barney_right_stand"],
        jump_frames: ["barney_left_jump", "barney_right_jump"],
    };

    pub fn run_frame_count(&self) -> usize {
        self.run_frames[0].len()
    }

    /// Collision bounds in world space with the bottom-center at `at`.
    pub fn spawn_rect(&self, at: Point) -> Rectangle {
        let size = Rectangle::new(0, 0, self.collision_rect.w, self.collision_rect.h);
        bottom_centered(size, at.x, at.y)
    }

    /// Every image id this archetype uses, with repeats.
    pub fn image_ids(&self) -> impl Iterator<Item = &'static str> {
        let [left, right] = self.run_frames;
        left.iter()
            .chain(right.iter())
            .copied()
            .chain(self.stand_frames)
            .chain(self.jump_frames)
    }
}

/// Loaded frames of one character.
pub struct CharacterSprites {
    collision_rect: Rectangle,
    run: [Vec<ImageHandle>; 2],
    stand: [ImageHandle; 2],
    jump: [ImageHandle; 2],
}

impl CharacterSprites {
    pub fn load(archetype: &CharacterArchetype, assets: &mut dyn AssetLoader) -> Self {
        let run: [Vec<ImageHandle>; 2] = archetype
            .run_frames
            .map(|ids| ids.iter().map(|id| assets.load_image(id)).collect());
        let stand = archetype.stand_frames.map(|id| assets.load_image(id));
        let jump = archetype.jump_frames.map(|id| assets.load_image(id));
        Self {
            collision_rect: archetype.collision_rect,
            run,
            stand,
            jump,
        }
    }

    /// Jump frame in the air, stand frame when still, else the run cycle.
    pub fn frame_for(&self, character: &Character) -> &ImageHandle {
        let dir = character.direction.index();
        if character.in_air {
            &self.jump[dir]
        } else if character.speed_x == 0 {
            &self.stand[dir]
        } else {
            &self.run[dir][character.run_frame()]
        }
    }

    /// Draw `character`, offsetting the sprite so its collision rectangle
    /// lands on the character's bounds.
    pub fn draw(&self, character: &Character) {
        self.frame_for(character).draw_at(
            character.position.x - self.collision_rect.x,
            character.position.y - self.collision_rect.y,
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::character::{CharacterParams, Direction};
    use gophette_core::test_helpers::{DrawCall, MockAssets};

    fn hero() -> Character {
        let arch = CharacterArchetype::HERO;
        Character::new(
            CharacterParams::HERO,
            arch.spawn_rect(Point::new(500, 537)),
            Direction::Right,
            arch.run_frame_count(),
        )
    }

    fn drawn_id(assets: &MockAssets, sprites: &CharacterSprites, c: &Character) -> String {
        assets.clear_draws();
        sprites.draw(c);
        assets.draws()[0].id.clone()
    }

    #[test]
    fn direction_tables_have_matching_lengths() {
        for arch in [CharacterArchetype::HERO, CharacterArchetype::COMPANION] {
            assert_eq!(arch.run_frames[0].len(), arch.run_frames[1].len());
            assert!(arch.run_frame_count() > 0);
        }
        assert_eq!(CharacterArchetype::HERO.run_frame_count(), 4);
        assert_eq!(CharacterArchetype::COMPANION.run_frame_count(), 6);
    }

    #[test]
    fn spawn_rect_is_bottom_centered() {
        let r = CharacterArchetype::HERO.spawn_rect(Point::new(500, 537));
        assert_eq!(r, Rectangle::new(479, 457, 42, 80));
    }

    #[test]
    fn repeated_ids_load_once() {
        let mut assets = MockAssets::new();
        CharacterSprites::load(&CharacterArchetype::HERO, &mut assets);
        // run1 doubles as stand frame and second run frame.
        assert_eq!(assets.load_count(), 8);
    }

    #[test]
    fn picks_stand_run_and_jump_frames() {
        let mut assets = MockAssets::new();
        let sprites = CharacterSprites::load(&CharacterArchetype::HERO, &mut assets);
        let mut c = hero();

        assert_eq!(drawn_id(&assets, &sprites, &c), "gophette_right_run1");

        c.direction = Direction::Left;
        c.in_air = true;
        assert_eq!(drawn_id(&assets, &sprites, &c), "gophette_left_jump");

        c.in_air = false;
        c.speed_x = -4;
        c.direction = Direction::Left;
        assert_eq!(drawn_id(&assets, &sprites, &c), "gophette_left_run1");
    }

    #[test]
    fn draw_offsets_by_collision_origin() {
        let mut assets = MockAssets::new();
        let sprites = CharacterSprites::load(&CharacterArchetype::HERO, &mut assets);
        let c = hero();
        sprites.draw(&c);
        assert_eq!(
            assets.draws(),
            vec![DrawCall {
                id: "gophette_right_run1".to_string(),
                x: 479 - 28,
                y: 457 - 18,
            }]
        );
    }

    #[test]
    fn image_ids_cover_every_frame() {
        let ids: Vec<_> = CharacterArchetype::COMPANION.image_ids().collect();
        assert_eq!(ids.len(), 6 + 6 + 2 + 2);
        assert!(ids.contains(&"barney_left_stand"));
    }
}
