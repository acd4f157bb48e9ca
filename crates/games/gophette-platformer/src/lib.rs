pub mod character;
pub mod collision;
pub mod config;
pub mod error;
pub mod input;
pub mod level;
pub mod replay;
pub mod sprites;

use std::mem::discriminant;

use serde::{Deserialize, Serialize};

use gophette_core::backend::{AssetLoader, Camera, Graphics, ImageHandle, Rgba, SoundHandle};
use gophette_core::frame_game_boilerplate;
use gophette_core::game_trait::FrameGame;
use gophette_core::geometry::Point;
use gophette_core::input::{InputAction, InputEvent};

use character::{Character, Direction};
use collision::{CollisionWorld, Solidity};
use config::GameConfig;
use input::InputState;
use level::Level;
use replay::{InputRecord, InputRecorder, ReplayQueue, ReplayScript};
use sprites::{CharacterArchetype, CharacterSprites};

/// Index of the hero in [`MatchState::characters`].
pub const HERO: usize = 0;
/// Index of the companion in [`MatchState::characters`].
pub const COMPANION: usize = 1;

const SOUND_WIN: &str = "win";
const SOUND_LOSE: &str = "lose";
const SOUND_FALL: &str = "fall";
const SOUND_OPPONENT_WINS: &str = "barney wins";
const SOUND_WHISTLE: &str = "whistle";
const SOUND_INTRO_TEXT: &str = "barney intro text";
const SOUND_INSTRUCTIONS: &str = "instructions";

const IMAGE_INTRO_PC_1: &str = "intro pc 1";
const IMAGE_INTRO_PC_2: &str = "intro pc 2";
const IMAGE_INTRO_HERO: &str = "intro gophette";

// Intro cues, in frames since the intro started.
const INTRO_TALK_AT: u32 = 100;
const INTRO_FLICKER_EVERY: u32 = 10;
const INTRO_SHOW_HERO_AT: u32 = 580;
const INTRO_LOSE_SOUND_AT: u32 = 620;
const INTRO_INSTRUCTIONS_AT: u32 = 700;

const DEBUG_SOLID: Rgba = Rgba::new(96, 96, 96, 255);
const DEBUG_TOP_SOLID: Rgba = Rgba::new(64, 160, 64, 255);
const DEBUG_GOAL: Rgba = Rgba::new(240, 200, 40, 96);
const DEBUG_CHARACTERS: [Rgba; 2] = [Rgba::new(220, 80, 160, 255), Rgba::new(80, 120, 220, 255)];

/// Match phase. Every phase except `Playing` carries a frame counter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GameState {
    /// Counts up to `intro_frames`.
    IntroScene { elapsed: u32 },
    PrePlaying { remaining: u32 },
    Playing,
    PlayerDying { remaining: u32 },
    PlayerWinning { remaining: u32 },
    PlayerRealizingLoss { remaining: u32 },
    CameraShowsOpponentWinning { remaining: u32 },
}

impl GameState {
    pub fn name(&self) -> &'static str {
        match self {
            Self::IntroScene { .. } => "intro_scene",
            Self::PrePlaying { .. } => "pre_playing",
            Self::Playing => "playing",
            Self::PlayerDying { .. } => "player_dying",
            Self::PlayerWinning { .. } => "player_winning",
            Self::PlayerRealizingLoss { .. } => "player_realizing_loss",
            Self::CameraShowsOpponentWinning { .. } => "camera_shows_opponent_winning",
        }
    }
}

/// Which picture the intro shows.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum IntroImage {
    #[default]
    Computer,
    ComputerFlicker,
    Hero,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct IntroProgress {
    pub image: IntroImage,
    pub companion_talking: bool,
}

/// Deterministic simulation state, as encoded by `serialize_state`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MatchState {
    pub state: GameState,
    /// Frames spent in `Playing` since the last level reset.
    pub frame: u32,
    pub characters: [Character; 2],
    pub inputs: [InputState; 2],
    pub intro: IntroProgress,
    pub replay: ReplayQueue,
}

/// Things that happened during one update.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GameEvent {
    StateChanged(GameState),
    PlayerFell,
    PlayerReachedGoal,
    OpponentReachedGoal,
    LevelReset,
}

struct Sounds {
    win: SoundHandle,
    lose: SoundHandle,
    fall: SoundHandle,
    opponent_wins: SoundHandle,
    whistle: SoundHandle,
    intro_text: SoundHandle,
    instructions: SoundHandle,
}

impl Sounds {
    fn load(assets: &mut dyn AssetLoader) -> Self {
        Self {
            win: assets.load_sound(SOUND_WIN),
            lose: assets.load_sound(SOUND_LOSE),
            fall: assets.load_sound(SOUND_FALL),
            opponent_wins: assets.load_sound(SOUND_OPPONENT_WINS),
            whistle: assets.load_sound(SOUND_WHISTLE),
            intro_text: assets.load_sound(SOUND_INTRO_TEXT),
            instructions: assets.load_sound(SOUND_INSTRUCTIONS),
        }
    }
}

struct IntroImages {
    computer: ImageHandle,
    computer_flicker: ImageHandle,
    hero: ImageHandle,
}

/// The two-character race: physics, replayed opponent, match phases.
pub struct Game {
    state: MatchState,
    config: GameConfig,
    world: CollisionWorld,
    level_images: Vec<(ImageHandle, Point)>,
    camera: Box<dyn Camera>,
    sounds: Sounds,
    intro_images: IntroImages,
    sprites: [CharacterSprites; 2],
    script: ReplayScript,
    recorder: Option<InputRecorder>,
    recording: Option<ReplayScript>,
    running: bool,
}

impl Game {
    /// Set up a match on `level` with the opponent driven by `script`.
    ///
    /// # Panics
    /// If `config.primary_character` is not 0 or 1, or the asset loader
    /// rejects an id.
    pub fn new(
        assets: &mut dyn AssetLoader,
        mut camera: Box<dyn Camera>,
        level: &Level,
        script: ReplayScript,
        config: GameConfig,
    ) -> Self {
        assert!(
            config.primary_character <= 1,
            "primary character must be 0 or 1, got {}",
            config.primary_character
        );
        camera.set_bounds(config.layout.camera_bounds);

        let archetypes = [CharacterArchetype::HERO, CharacterArchetype::COMPANION];
        let params = [config.hero, config.companion];
        let spawns = [config.layout.hero_spawn, config.layout.companion_spawn];
        let characters = [HERO, COMPANION].map(|i| {
            Character::new(
                params[i],
                archetypes[i].spawn_rect(spawns[i]),
                Direction::Right,
                archetypes[i].run_frame_count(),
            )
        });
        let sprites = archetypes.map(|a| CharacterSprites::load(&a, assets));

        let level_images: Vec<(ImageHandle, Point)> = level
            .images
            .iter()
            .map(|img| (assets.load_image(&img.id), Point::new(img.x, img.y)))
            .collect();
        let intro_images = IntroImages {
            computer: assets.load_image(IMAGE_INTRO_PC_1),
            computer_flicker: assets.load_image(IMAGE_INTRO_PC_2),
            hero: assets.load_image(IMAGE_INTRO_HERO),
        };

        let state = if config.skip_intro {
            GameState::PrePlaying {
                remaining: config.timings.pre_play_frames,
            }
        } else {
            GameState::IntroScene { elapsed: 0 }
        };

        tracing::info!(
            objects = level.objects.len(),
            images = level.images.len(),
            script_records = script.len(),
            primary = config.primary_character,
            "Level loaded"
        );

        Self {
            state: MatchState {
                state,
                frame: 0,
                characters,
                inputs: [InputState::default(); 2],
                intro: IntroProgress::default(),
                replay: ReplayQueue::new(&script),
            },
            world: level.collision_world(),
            level_images,
            camera,
            sounds: Sounds::load(assets),
            intro_images,
            sprites,
            recorder: config.record_input.then(InputRecorder::new),
            recording: None,
            script,
            config,
            running: true,
        }
    }

    /// The built-in demo level with its companion run.
    pub fn demo(
        assets: &mut dyn AssetLoader,
        camera: Box<dyn Camera>,
        config: GameConfig,
    ) -> Self {
        Self::new(
            assets,
            camera,
            &Level::builtin(),
            Level::builtin_companion_script(),
            config,
        )
    }

    /// Every asset id a game on `level` loads.
    pub fn asset_ids(level: &Level) -> Vec<String> {
        let sounds = [
            SOUND_WIN,
            SOUND_LOSE,
            SOUND_FALL,
            SOUND_OPPONENT_WINS,
            SOUND_WHISTLE,
            SOUND_INTRO_TEXT,
            SOUND_INSTRUCTIONS,
        ];
        let intro = [IMAGE_INTRO_PC_1, IMAGE_INTRO_PC_2, IMAGE_INTRO_HERO];
        let mut ids: Vec<String> = CharacterArchetype::HERO
            .image_ids()
            .chain(CharacterArchetype::COMPANION.image_ids())
            .chain(intro)
            .chain(sounds)
            .map(str::to_string)
            .chain(level.images.iter().map(|img| img.id.clone()))
            .collect();
        ids.sort();
        ids.dedup();
        ids
    }

    pub fn match_state(&self) -> &MatchState {
        &self.state
    }

    pub fn state(&self) -> GameState {
        self.state.state
    }

    pub fn frame(&self) -> u32 {
        self.state.frame
    }

    pub fn character(&self, index: usize) -> &Character {
        &self.state.characters[index]
    }

    pub fn config(&self) -> &GameConfig {
        &self.config
    }

    pub fn world(&self) -> &CollisionWorld {
        &self.world
    }

    pub fn is_recording(&self) -> bool {
        self.recorder.is_some()
    }

    /// The input recorded up to a quit, once. `None` before a quit, when
    /// recording is off, or after it was taken.
    pub fn take_recording(&mut self) -> Option<ReplayScript> {
        self.recording.take()
    }

    fn primary(&self) -> &Character {
        &self.state.characters[self.config.primary_character]
    }

    fn opponent(&self) -> &Character {
        &self.state.characters[self.config.opponent_character()]
    }

    /// Put both characters back on their spawns, reload the opponent's
    /// script and restart the pre-play countdown. The player's held buttons
    /// are kept, and a running recording restarts from them.
    pub fn reset_level(&mut self) {
        for c in &mut self.state.characters {
            c.reset(Direction::Right);
        }
        self.state.inputs[self.config.opponent_character()] = InputState::default();
        self.state.replay.reload(&self.script);
        self.state.frame = 0;
        self.state.state = GameState::PrePlaying {
            remaining: self.config.timings.pre_play_frames,
        };
        if let Some(recorder) = &mut self.recorder {
            recorder.restart(&self.state.inputs[self.config.primary_character]);
        }
        tracing::info!(script_records = self.script.len(), "Level reset");
    }

    fn apply_replayed(&mut self, record: InputRecord) {
        if record.action == InputAction::Quit {
            return;
        }
        let opponent = self.config.opponent_character();
        tracing::trace!(
            frame = record.frame,
            action = ?record.action,
            pressed = record.pressed,
            "Replaying input"
        );
        self.state.inputs[opponent].apply(record.action, record.pressed);
    }

    fn update_intro(&mut self, elapsed: u32) -> GameState {
        let elapsed = elapsed + 1;
        let intro = &mut self.state.intro;
        self.camera.center_on(self.config.layout.intro_focus);

        if elapsed == INTRO_TALK_AT {
            intro.companion_talking = true;
            self.sounds.intro_text.play_once();
        }
        if intro.image != IntroImage::Hero && elapsed % INTRO_FLICKER_EVERY == 0 {
            intro.image = match intro.image {
                IntroImage::Computer => IntroImage::ComputerFlicker,
                _ => IntroImage::Computer,
            };
        }
        if elapsed == INTRO_SHOW_HERO_AT {
            intro.image = IntroImage::Hero;
        }
        if elapsed == INTRO_LOSE_SOUND_AT {
            self.sounds.lose.play_once();
        }
        if elapsed == INTRO_INSTRUCTIONS_AT {
            self.sounds.instructions.play_once();
        }

        if elapsed >= self.config.timings.intro_frames {
            GameState::PrePlaying {
                remaining: self.config.timings.pre_play_frames,
            }
        } else {
            GameState::IntroScene { elapsed }
        }
    }

    fn update_pre_playing(&mut self, remaining: u32) -> GameState {
        let center = self.primary().position.center();
        self.camera.center_on(center);
        let remaining = remaining.saturating_sub(1);
        if remaining == self.config.timings.whistle_at {
            self.sounds.whistle.play_once();
        }
        if remaining == 0 {
            GameState::Playing
        } else {
            GameState::PrePlaying { remaining }
        }
    }

    fn update_playing(&mut self, events: &mut Vec<GameEvent>) -> GameState {
        for record in self.state.replay.due(self.state.frame) {
            self.apply_replayed(record);
        }
        self.state.frame += 1;

        let floor = self.config.layout.world_floor;
        for (character, input) in self
            .state
            .characters
            .iter_mut()
            .zip(self.state.inputs.iter_mut())
        {
            character.tick(input, &self.world, floor);
        }

        let layout = &self.config.layout;
        let timings = &self.config.timings;
        let primary = self.primary().position;
        let opponent = self.opponent().position;
        let mut next = GameState::Playing;

        if !layout.alive_bounds().overlaps(&primary) {
            self.sounds.fall.play_once();
            events.push(GameEvent::PlayerFell);
            tracing::info!(frame = self.state.frame, "Player fell out of the level");
            next = GameState::PlayerDying {
                remaining: timings.player_dying_frames,
            };
        }

        if layout.goal_bounds.contains(&primary) {
            self.sounds.win.play_once();
            events.push(GameEvent::PlayerReachedGoal);
            tracing::info!(frame = self.state.frame, "Player reached the goal");
            next = GameState::PlayerWinning {
                remaining: timings.player_win_frames,
            };
        } else if layout.goal_bounds.contains(&opponent) {
            self.sounds.lose.play_once();
            events.push(GameEvent::OpponentReachedGoal);
            tracing::info!(frame = self.state.frame, "Opponent reached the goal");
            next = GameState::PlayerRealizingLoss {
                remaining: timings.losing_sound_frames,
            };
        }

        if let GameState::PlayerWinning { .. } = next {
            let (primary, opponent) = self.both_mut();
            primary.halt(Direction::Left);
            opponent.halt(Direction::Right);
        }

        self.camera.center_on(primary.center());
        next
    }

    fn both_mut(&mut self) -> (&mut Character, &mut Character) {
        let [hero, companion] = &mut self.state.characters;
        if self.config.primary_character == HERO {
            (hero, companion)
        } else {
            (companion, hero)
        }
    }

    fn update_realizing_loss(&mut self, remaining: u32) -> GameState {
        let remaining = remaining.saturating_sub(1);
        if remaining > 0 {
            return GameState::PlayerRealizingLoss { remaining };
        }
        let (_, opponent) = self.both_mut();
        opponent.halt(Direction::Left);
        self.sounds.opponent_wins.play_once();
        GameState::CameraShowsOpponentWinning {
            remaining: self.config.timings.opponent_win_frames,
        }
    }

    /// Count down a phase that ends in a level reset.
    fn count_down_to_reset(
        &mut self,
        remaining: u32,
        events: &mut Vec<GameEvent>,
        phase: fn(u32) -> GameState,
    ) -> GameState {
        let remaining = remaining.saturating_sub(1);
        if remaining > 0 {
            return phase(remaining);
        }
        self.reset_level();
        events.push(GameEvent::LevelReset);
        self.state.state
    }

    /// Fill raw collision rectangles, the goal and character bounds instead
    /// of drawing art.
    pub fn render_debug(&self, graphics: &mut dyn Graphics) {
        graphics.clear_screen(0, 0, 0);
        for object in self.world.objects() {
            let color = match object.solidity {
                Solidity::Solid => DEBUG_SOLID,
                Solidity::TopSolid => DEBUG_TOP_SOLID,
            };
            graphics.fill_rect(object.bounds, color);
        }
        graphics.fill_rect(self.config.layout.goal_bounds, DEBUG_GOAL);
        for (character, color) in self.state.characters.iter().zip(DEBUG_CHARACTERS) {
            graphics.fill_rect(character.position, color);
        }
    }

    fn render_intro(&self, graphics: &mut dyn Graphics) {
        graphics.clear_screen(0, 0, 0);
        let intro = &self.state.intro;
        let image = match intro.image {
            IntroImage::Hero => &self.intro_images.hero,
            IntroImage::ComputerFlicker if intro.companion_talking => {
                &self.intro_images.computer_flicker
            },
            _ => &self.intro_images.computer,
        };
        let (w, h) = image.size();
        let focus = self.config.layout.intro_focus;
        image.draw_at(focus.x - w / 2, focus.y - h / 2);
    }
}

impl FrameGame for Game {
    type Event = GameEvent;

    fn handle_input(&mut self, event: InputEvent) {
        if let Some(recorder) = &mut self.recorder {
            recorder.record(self.state.frame, &event);
        }

        if event.action == InputAction::Quit {
            self.running = false;
            if let Some(recorder) = self.recorder.take() {
                let recording = recorder.finish();
                tracing::info!(records = recording.len(), "Input recording finished");
                self.recording = Some(recording);
            }
            return;
        }

        self.state.inputs[event.character_index].apply(event.action, event.pressed);
    }

    fn update(&mut self) -> Vec<GameEvent> {
        let mut events = Vec::new();
        let current = self.state.state;
        let next = match current {
            GameState::IntroScene { elapsed } => self.update_intro(elapsed),
            GameState::PrePlaying { remaining } => self.update_pre_playing(remaining),
            GameState::Playing => self.update_playing(&mut events),
            GameState::PlayerDying { remaining } => {
                self.count_down_to_reset(remaining, &mut events, |remaining| {
                    GameState::PlayerDying { remaining }
                })
            },
            GameState::PlayerWinning { remaining } => {
                self.count_down_to_reset(remaining, &mut events, |remaining| {
                    GameState::PlayerWinning { remaining }
                })
            },
            GameState::PlayerRealizingLoss { remaining } => self.update_realizing_loss(remaining),
            GameState::CameraShowsOpponentWinning { remaining } => {
                let center = self.opponent().position.center();
                self.camera.center_on(center);
                self.count_down_to_reset(remaining, &mut events, |remaining| {
                    GameState::CameraShowsOpponentWinning { remaining }
                })
            },
        };

        if discriminant(&current) != discriminant(&next) {
            tracing::debug!(
                from = current.name(),
                to = next.name(),
                frame = self.state.frame,
                "State transition"
            );
            events.push(GameEvent::StateChanged(next));
        }
        self.state.state = next;
        events
    }

    fn render(&self, graphics: &mut dyn Graphics) {
        if let GameState::IntroScene { .. } = self.state.state {
            self.render_intro(graphics);
            return;
        }
        for (image, at) in &self.level_images {
            image.draw_at(at.x, at.y);
        }
        let opponent = self.config.opponent_character();
        let primary = self.config.primary_character;
        self.sprites[opponent].draw(&self.state.characters[opponent]);
        self.sprites[primary].draw(&self.state.characters[primary]);
    }

    frame_game_boilerplate!(state_type: MatchState);
}
