use serde::{Deserialize, Serialize};

use gophette_core::geometry::Rectangle;

use crate::collision::Collider;
use crate::input::InputState;

/// Per-archetype movement tuning. All values are per frame, y grows
/// downward.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CharacterParams {
    pub acceleration_x: i32,
    pub deceleration_x: i32,
    pub max_speed_x: i32,
    /// Terminal falling speed.
    pub max_speed_y: i32,
    /// Vertical speed set by a jump (negative = upward).
    pub initial_jump_speed_y: i32,
    pub high_gravity: i32,
    /// Gravity while rising with jump held.
    pub low_gravity: i32,
    /// Frames between run-cycle frames.
    pub run_frame_delay: i32,
}

impl CharacterParams {
    /// Quick hero; tops out around 253 pixels of jump height.
    pub const HERO: Self = Self {
        acceleration_x: 2,
        deceleration_x: 1,
        max_speed_x: 10,
        max_speed_y: 32,
        initial_jump_speed_y: -23,
        high_gravity: 2,
        low_gravity: 1,
        run_frame_delay: 3,
    };

    /// Faster, higher-jumping companion with a slower run animation.
    pub const COMPANION: Self = Self {
        acceleration_x: 2,
        deceleration_x: 1,
        max_speed_x: 12,
        max_speed_y: 32,
        initial_jump_speed_y: -25,
        high_gravity: 2,
        low_gravity: 1,
        run_frame_delay: 5,
    };
}

/// Facing direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Direction {
    Left,
    Right,
}

impl Direction {
    /// Index into per-direction sprite tables.
    pub fn index(self) -> usize {
        match self {
            Direction::Left => 0,
            Direction::Right => 1,
        }
    }
}

/// Physics and animation state of one character.
///
/// `position` is the collision rectangle and is authoritative; sprites are
/// drawn offset from it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Character {
    pub direction: Direction,
    pub position: Rectangle,
    pub speed_x: i32,
    pub speed_y: i32,
    pub in_air: bool,
    pub params: CharacterParams,
    spawn: Rectangle,
    run_frame: usize,
    run_frame_countdown: i32,
    run_frame_count: usize,
}

impl Character {
    /// Create a character resting at `spawn`.
    ///
    /// # Panics
    /// If `run_frame_count` is zero.
    pub fn new(
        params: CharacterParams,
        spawn: Rectangle,
        direction: Direction,
        run_frame_count: usize,
    ) -> Self {
        assert!(run_frame_count > 0, "a run cycle needs at least one frame");
        Self {
            direction,
            position: spawn,
            speed_x: 0,
            speed_y: 0,
            in_air: false,
            params,
            spawn,
            run_frame: 0,
            run_frame_countdown: 0,
            run_frame_count,
        }
    }

    pub fn spawn(&self) -> Rectangle {
        self.spawn
    }

    /// Current index into the run cycle.
    pub fn run_frame(&self) -> usize {
        self.run_frame
    }

    /// Place the collision rectangle so its bottom-center sits at `(x, y)`.
    pub fn set_bottom_center_to(&mut self, x: i32, y: i32) {
        self.position = bottom_centered(self.position, x, y);
    }

    /// Stop in place: zero velocity, clear the run cycle, face `direction`.
    pub fn halt(&mut self, direction: Direction) {
        self.direction = direction;
        self.speed_x = 0;
        self.speed_y = 0;
        self.run_frame = 0;
        self.run_frame_countdown = 0;
    }

    /// Return to the spawn rectangle and halt there.
    pub fn reset(&mut self, direction: Direction) {
        self.position = self.spawn;
        self.in_air = false;
        self.halt(direction);
    }

    /// Turn held buttons into velocity: decelerate, accelerate, jump,
    /// gravity. Consumes the jump trigger whether or not it fired.
    pub fn apply_controls(&mut self, input: &mut InputState) {
        let p = self.params;

        if self.speed_x > 0 {
            self.speed_x = (self.speed_x - p.deceleration_x).max(0);
        } else if self.speed_x < 0 {
            self.speed_x = (self.speed_x + p.deceleration_x).min(0);
        }

        match input.horizontal() {
            -1 => self.speed_x = (self.speed_x - p.acceleration_x).max(-p.max_speed_x),
            1 => self.speed_x = (self.speed_x + p.acceleration_x).min(p.max_speed_x),
            _ => {},
        }

        if input.take_jump_trigger() && !self.in_air {
            self.speed_y = p.initial_jump_speed_y;
        }

        let rising = self.speed_y < 0;
        self.speed_y += if rising && input.jump_down {
            p.low_gravity
        } else {
            p.high_gravity
        };
        self.speed_y = self.speed_y.min(p.max_speed_y);
    }

    /// Face, animate, then move: vertical first, horizontal second, and
    /// finally clamp to the world floor.
    pub fn step<C: Collider + ?Sized>(&mut self, collider: &C, world_floor: i32) {
        if self.speed_x < 0 {
            self.direction = Direction::Left;
        } else if self.speed_x > 0 {
            self.direction = Direction::Right;
        }

        // Animated before collision so the run cycle keeps going while
        // pushing against a wall.
        if self.speed_x == 0 {
            self.run_frame = 0;
            self.run_frame_countdown = 0;
        } else {
            self.run_frame_countdown -= 1;
            if self.run_frame_countdown <= 0 {
                self.run_frame = (self.run_frame + 1) % self.run_frame_count;
                self.run_frame_countdown = self.params.run_frame_delay;
            }
        }

        // Y before X: a body level with a platform at the top of its jump is
        // lifted above it first, so the horizontal pass lands it on top
        // instead of hitting the platform's side.
        self.in_air = true;
        let (position, collided) = collider.move_in_y(self.position, self.speed_y);
        self.position = position;
        if collided {
            if self.speed_y > 0 {
                self.in_air = false;
            }
            self.speed_y = 0;
        }

        let (position, collided) = collider.move_in_x(self.position, self.speed_x);
        self.position = position;
        if collided {
            self.speed_x = 0;
        }

        if self.position.bottom() > world_floor {
            self.position.y = world_floor - self.position.h;
            self.speed_y = 0;
            self.in_air = false;
        }
    }

    /// One full physics step.
    pub fn tick<C: Collider + ?Sized>(
        &mut self,
        input: &mut InputState,
        collider: &C,
        world_floor: i32,
    ) {
        self.apply_controls(input);
        self.step(collider, world_floor);
    }
}

/// `rect` moved so its bottom-center is at `(x, y)`.
pub fn bottom_centered(rect: Rectangle, x: i32, y: i32) -> Rectangle {
    rect.move_to(x - rect.w / 2, y - rect.h)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::collision::{CollisionObject, CollisionWorld};
    use gophette_core::input::InputAction;

    const FLOOR: i32 = 800;

    fn params() -> CharacterParams {
        CharacterParams {
            acceleration_x: 2,
            deceleration_x: 1,
            max_speed_x: 10,
            max_speed_y: 32,
            initial_jump_speed_y: -23,
            high_gravity: 2,
            low_gravity: 1,
            run_frame_delay: 3,
        }
    }

    fn character_at(x: i32, y: i32) -> Character {
        Character::new(params(), Rectangle::new(x, y, 40, 100), Direction::Right, 4)
    }

    fn grounded_on_floor() -> (Character, CollisionWorld) {
        let world = CollisionWorld::new(vec![CollisionObject::solid(Rectangle::new(
            -1000, 500, 5000, 100,
        ))]);
        let mut c = character_at(0, 400);
        c.tick(&mut InputState::default(), &world, FLOOR);
        assert!(!c.in_air);
        (c, world)
    }

    #[test]
    fn gravity_accelerates_a_falling_body() {
        let world = CollisionWorld::default();
        let mut c = character_at(0, 0);
        c.tick(&mut InputState::default(), &world, FLOOR);
        assert_eq!(c.speed_y, 2);
        assert_eq!(c.position.y, 2);
        assert!(c.in_air);
    }

    #[test]
    fn world_floor_catches_a_falling_body() {
        let world = CollisionWorld::default();
        let mut c = character_at(0, 600);
        let mut input = InputState::default();
        for _ in 0..100 {
            c.tick(&mut input, &world, FLOOR);
            assert!(c.position.bottom() <= FLOOR);
        }
        assert_eq!(c.position.bottom(), FLOOR);
        assert_eq!(c.speed_y, 0);
        assert!(!c.in_air);
    }

    #[test]
    fn terminal_velocity_caps_falling_speed() {
        let world = CollisionWorld::default();
        let mut c = character_at(0, -100_000);
        let mut input = InputState::default();
        for _ in 0..40 {
            c.tick(&mut input, &world, FLOOR);
        }
        assert_eq!(c.speed_y, 32);
    }

    #[test]
    fn acceleration_clamps_at_max_speed() {
        let (mut c, world) = grounded_on_floor();
        let mut input = InputState::default();
        input.apply(InputAction::MoveLeft, true);

        c.tick(&mut input, &world, FLOOR);
        assert_eq!(c.speed_x, -2);
        // Deceleration still runs while held, so the net gain is one per frame.
        c.tick(&mut input, &world, FLOOR);
        assert_eq!(c.speed_x, -3);
        for _ in 0..20 {
            c.tick(&mut input, &world, FLOOR);
            assert!(c.speed_x >= -10);
        }
        assert_eq!(c.speed_x, -10);
        assert_eq!(c.direction, Direction::Left);
    }

    #[test]
    fn both_directions_held_only_decelerates() {
        let (mut c, world) = grounded_on_floor();
        c.speed_x = 5;
        let mut input = InputState::default();
        input.apply(InputAction::MoveLeft, true);
        input.apply(InputAction::MoveRight, true);

        let mut seen = Vec::new();
        for _ in 0..7 {
            c.tick(&mut input, &world, FLOOR);
            seen.push(c.speed_x);
        }
        assert_eq!(seen, vec![4, 3, 2, 1, 0, 0, 0]);
    }

    #[test]
    fn facing_is_kept_while_idle() {
        let (mut c, world) = grounded_on_floor();
        c.speed_x = -1;
        let mut input = InputState::default();
        c.tick(&mut input, &world, FLOOR);
        assert_eq!(c.speed_x, 0);
        assert_eq!(c.direction, Direction::Right, "deceleration ran first");

        c.speed_x = -3;
        c.tick(&mut input, &world, FLOOR);
        assert_eq!(c.direction, Direction::Left);
        c.tick(&mut input, &world, FLOOR);
        c.tick(&mut input, &world, FLOOR);
        assert_eq!(c.speed_x, 0);
        assert_eq!(c.direction, Direction::Left);
    }

    #[test]
    fn held_jump_fires_exactly_once() {
        let (mut c, world) = grounded_on_floor();
        let mut input = InputState::default();
        input.apply(InputAction::Jump, true);

        let mut impulses = 0;
        for _ in 0..200 {
            let before = c.speed_y;
            c.tick(&mut input, &world, FLOOR);
            if before >= 0 && c.speed_y < 0 {
                impulses += 1;
            }
        }
        assert_eq!(impulses, 1);
        assert!(!c.in_air, "landed again while still holding jump");

        input.apply(InputAction::Jump, false);
        c.tick(&mut input, &world, FLOOR);
        input.apply(InputAction::Jump, true);
        c.tick(&mut input, &world, FLOOR);
        assert!(c.speed_y < 0, "release then press jumps again");
    }

    #[test]
    fn jump_trigger_is_consumed_even_in_air() {
        let world = CollisionWorld::default();
        let mut c = character_at(0, 0);
        c.in_air = true;
        let mut input = InputState::default();
        input.apply(InputAction::Jump, true);
        c.tick(&mut input, &world, FLOOR);
        assert!(!input.jump_triggered);
        assert!(c.speed_y > 0, "no mid-air jump");
    }

    #[test]
    fn holding_jump_floats_higher() {
        fn apex(hold: bool) -> i32 {
            let (mut c, world) = grounded_on_floor();
            let mut input = InputState::default();
            input.apply(InputAction::Jump, true);
            if !hold {
                input.apply(InputAction::Jump, false);
            }
            let mut top = c.position.y;
            for _ in 0..100 {
                c.tick(&mut input, &world, FLOOR);
                top = top.min(c.position.y);
            }
            top
        }
        assert!(apex(true) < apex(false));
    }

    #[test]
    fn ceiling_hit_zeroes_vertical_speed_but_stays_airborne() {
        let world = CollisionWorld::new(vec![
            CollisionObject::solid(Rectangle::new(-1000, 500, 5000, 100)),
            CollisionObject::solid(Rectangle::new(-1000, 350, 5000, 10)),
        ]);
        let mut c = character_at(0, 400);
        c.speed_y = -60;
        c.tick(&mut InputState::default(), &world, FLOOR);
        assert_eq!(c.position.y, 360);
        assert_eq!(c.speed_y, 0);
        assert!(c.in_air);
    }

    #[test]
    fn wall_hit_zeroes_horizontal_speed_but_run_cycle_continues() {
        let world = CollisionWorld::new(vec![
            CollisionObject::solid(Rectangle::new(-1000, 500, 5000, 100)),
            CollisionObject::solid(Rectangle::new(45, 0, 10, 500)),
        ]);
        let mut c = character_at(0, 400);
        let mut input = InputState::default();
        input.apply(InputAction::MoveRight, true);
        let mut frames = Vec::new();
        for _ in 0..12 {
            c.tick(&mut input, &world, FLOOR);
            frames.push(c.run_frame());
        }
        assert_eq!(c.position.right(), 45);
        assert!(frames.iter().any(|&f| f > 0));
    }

    #[test]
    fn run_cycle_advances_every_delay_frames_and_wraps() {
        let (mut c, world) = grounded_on_floor();
        let mut input = InputState::default();
        input.apply(InputAction::MoveRight, true);
        let mut frames = Vec::new();
        for _ in 0..14 {
            c.tick(&mut input, &world, FLOOR);
            frames.push(c.run_frame());
        }
        assert_eq!(frames, vec![1, 1, 1, 2, 2, 2, 3, 3, 3, 0, 0, 0, 1, 1]);

        input.apply(InputAction::MoveRight, false);
        for _ in 0..20 {
            c.tick(&mut input, &world, FLOOR);
        }
        assert_eq!(c.run_frame(), 0);
    }

    #[test]
    fn lands_on_platform_at_max_jump_height() {
        // Block top exactly where the rising body's feet peak. The body rises
        // pressed against the block's side; moving Y first puts it level with
        // the top, and X then carries it onto the block.
        let floor = CollisionObject::solid(Rectangle::new(-1000, 500, 5000, 100));
        let (mut probe, probe_world) = grounded_on_floor();
        let mut input = InputState::default();
        input.apply(InputAction::Jump, true);
        let mut peak_bottom = probe.position.bottom();
        for _ in 0..60 {
            probe.tick(&mut input, &probe_world, FLOOR);
            peak_bottom = peak_bottom.min(probe.position.bottom());
        }

        let ledge =
            CollisionObject::solid(Rectangle::new(45, peak_bottom, 5000, 500 - peak_bottom));
        let world = CollisionWorld::new(vec![floor, ledge]);
        let mut c = character_at(0, 400);
        c.tick(&mut InputState::default(), &world, FLOOR);
        let mut input = InputState::default();
        input.apply(InputAction::Jump, true);
        input.apply(InputAction::MoveRight, true);
        for _ in 0..120 {
            c.tick(&mut input, &world, FLOOR);
        }
        assert_eq!(c.position.bottom(), peak_bottom);
        assert!(!c.in_air);
    }

    #[test]
    fn reset_restores_spawn_in_place() {
        let world = CollisionWorld::default();
        let mut c = character_at(10, 20);
        let mut input = InputState::default();
        input.apply(InputAction::MoveLeft, true);
        for _ in 0..10 {
            c.tick(&mut input, &world, FLOOR);
        }
        assert_ne!(c.position, c.spawn());

        c.reset(Direction::Right);
        assert_eq!(c.position, Rectangle::new(10, 20, 40, 100));
        assert_eq!((c.speed_x, c.speed_y), (0, 0));
        assert_eq!(c.direction, Direction::Right);
        assert_eq!(c.run_frame(), 0);
    }

    #[test]
    fn halt_keeps_position() {
        let mut c = character_at(10, 20);
        c.position = c.position.move_by(300, -7);
        c.speed_x = 9;
        c.speed_y = -4;
        c.halt(Direction::Left);
        assert_eq!(c.position, Rectangle::new(310, 13, 40, 100));
        assert_eq!((c.speed_x, c.speed_y), (0, 0));
        assert_eq!(c.direction, Direction::Left);
    }

    #[test]
    fn bottom_center_placement() {
        let r = bottom_centered(Rectangle::new(0, 0, 41, 100), 500, 537);
        assert_eq!(r, Rectangle::new(480, 437, 41, 100));
    }

    mod proptests {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            #[test]
            fn speeds_stay_within_limits(
                presses in proptest::collection::vec((0u8..3, any::<bool>()), 1..200)
            ) {
                let world = CollisionWorld::new(vec![
                    CollisionObject::solid(Rectangle::new(-10_000, 500, 20_000, 100)),
                    CollisionObject::top_solid(Rectangle::new(-300, 300, 600, 20)),
                ]);
                let mut c = character_at(0, 400);
                let mut input = InputState::default();
                for (button, pressed) in presses {
                    let action = match button {
                        0 => InputAction::MoveLeft,
                        1 => InputAction::MoveRight,
                        _ => InputAction::Jump,
                    };
                    input.apply(action, pressed);
                    c.tick(&mut input, &world, FLOOR);
                    prop_assert!(c.speed_x.abs() <= c.params.max_speed_x);
                    prop_assert!(c.speed_y <= c.params.max_speed_y);
                    prop_assert!(c.position.bottom() <= 500);
                }
            }
        }
    }
}
