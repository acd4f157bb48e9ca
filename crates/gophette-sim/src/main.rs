mod headless;

use std::cell::RefCell;
use std::collections::BTreeMap;
use std::path::PathBuf;
use std::rc::Rc;

use serde::Serialize;
use tracing_subscriber::EnvFilter;

use gophette_core::camera::WindowCamera;
use gophette_core::game_trait::FrameGame;
use gophette_core::geometry::Rectangle;
use gophette_core::input::{InputAction, InputEvent};
use gophette_platformer::config::GameConfig;
use gophette_platformer::error::DataError;
use gophette_platformer::level::Level;
use gophette_platformer::replay::{ReplayQueue, ReplayScript};
use gophette_platformer::{COMPANION, Game, GameEvent, GameState, HERO};

use headless::{CountingGraphics, HeadlessAssets};

const WINDOW_W: i32 = 800;
const WINDOW_H: i32 = 600;
const DEFAULT_FRAMES: u32 = 2_000;

#[derive(Debug, Clone, PartialEq, Eq)]
struct Args {
    frames: u32,
    config: Option<PathBuf>,
    level: Option<PathBuf>,
    /// Input for the player's character, keyed by match frame.
    player_script: Option<PathBuf>,
    /// Replaces the built-in opponent run.
    opponent_script: Option<PathBuf>,
    record: Option<PathBuf>,
    debug_render: bool,
}

impl Default for Args {
    fn default() -> Self {
        Self {
            frames: DEFAULT_FRAMES,
            config: None,
            level: None,
            player_script: None,
            opponent_script: None,
            record: None,
            debug_render: false,
        }
    }
}

impl Args {
    fn parse(args: impl IntoIterator<Item = String>) -> Self {
        let mut parsed = Self::default();
        for arg in args {
            if let Some(v) = arg.strip_prefix("--frames=")
                && let Ok(n) = v.parse::<u32>()
            {
                parsed.frames = n;
            } else if let Some(v) = arg.strip_prefix("--config=") {
                parsed.config = Some(PathBuf::from(v));
            } else if let Some(v) = arg.strip_prefix("--level=") {
                parsed.level = Some(PathBuf::from(v));
            } else if let Some(v) = arg.strip_prefix("--player-script=") {
                parsed.player_script = Some(PathBuf::from(v));
            } else if let Some(v) = arg.strip_prefix("--opponent-script=") {
                parsed.opponent_script = Some(PathBuf::from(v));
            } else if let Some(v) = arg.strip_prefix("--record=") {
                parsed.record = Some(PathBuf::from(v));
            } else if arg == "--debug-render" {
                parsed.debug_render = true;
            } else {
                tracing::warn!("Ignoring unrecognized argument: {arg}");
            }
        }
        parsed
    }
}

/// What a run did, printed as JSON when it ends.
#[derive(Debug, Default, Serialize)]
struct RunSummary {
    frames_run: u32,
    final_state: &'static str,
    match_frame: u32,
    running: bool,
    hero: Rectangle,
    companion: Rectangle,
    camera_view: Rectangle,
    player_falls: u32,
    player_wins: u32,
    opponent_wins: u32,
    level_resets: u32,
    image_draws: u64,
    debug_fills: u64,
    sounds: BTreeMap<String, u32>,
    recorded_inputs: Option<usize>,
    /// Frame of the player script's last record, 0 without a script.
    player_script_end: u32,
}

fn run(args: &Args) -> Result<RunSummary, DataError> {
    let mut config = match &args.config {
        Some(path) => GameConfig::load_from(path),
        None => GameConfig::load(),
    };
    config.record_input |= args.record.is_some();
    let level = match &args.level {
        Some(path) => Level::load(path)?,
        None => Level::builtin(),
    };
    let opponent_script = match &args.opponent_script {
        Some(path) => ReplayScript::load(path)?,
        None => Level::builtin_companion_script(),
    };
    let player_script = match &args.player_script {
        Some(path) => ReplayScript::load(path)?,
        None => ReplayScript::default(),
    };

    let primary = config.primary_character;
    let mut assets = HeadlessAssets::new(Game::asset_ids(&level));
    let camera = Rc::new(RefCell::new(WindowCamera::new(WINDOW_W, WINDOW_H)));
    let mut game = Game::new(
        &mut assets,
        Box::new(Rc::clone(&camera)),
        &level,
        opponent_script,
        config,
    );
    let mut player = ReplayQueue::new(&player_script);
    let mut graphics = CountingGraphics::default();
    let mut summary = RunSummary {
        player_script_end: player_script.last_frame(),
        ..RunSummary::default()
    };

    while summary.frames_run < args.frames && game.running() {
        if game.state() == GameState::Playing {
            for record in player.due(game.frame()) {
                game.handle_input(record.event_for(primary));
            }
            if !game.running() {
                break;
            }
        }
        for event in game.update() {
            match event {
                GameEvent::PlayerFell => summary.player_falls += 1,
                GameEvent::PlayerReachedGoal => summary.player_wins += 1,
                GameEvent::OpponentReachedGoal => summary.opponent_wins += 1,
                GameEvent::LevelReset => {
                    summary.level_resets += 1;
                    player.reload(&player_script);
                },
                GameEvent::StateChanged(_) => {},
            }
        }
        if args.debug_render {
            game.render_debug(&mut graphics);
        } else {
            game.render(&mut graphics);
        }
        summary.frames_run += 1;
    }

    if let Some(path) = &args.record {
        if game.running() {
            game.handle_input(InputEvent::press(InputAction::Quit, primary));
        }
        if let Some(recording) = game.take_recording() {
            std::fs::write(path, recording.to_toml_string()?)?;
            tracing::info!(
                path = %path.display(),
                records = recording.len(),
                "Saved input recording"
            );
            summary.recorded_inputs = Some(recording.len());
        }
    }

    summary.final_state = game.state().name();
    summary.match_frame = game.frame();
    summary.running = game.running();
    summary.hero = game.character(HERO).position;
    summary.companion = game.character(COMPANION).position;
    summary.camera_view = camera.borrow().view();
    summary.image_draws = assets.draw_count();
    summary.debug_fills = graphics.fills;
    summary.sounds = assets.sound_counts();
    Ok(summary)
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse(std::env::args().skip(1));
    tracing::info!(frames = args.frames, "Starting headless run");

    let summary = match run(&args) {
        Ok(summary) => summary,
        Err(e) => {
            tracing::error!("Run failed: {e}");
            std::process::exit(1);
        },
    };
    match serde_json::to_string_pretty(&summary) {
        Ok(json) => println!("{json}"),
        Err(e) => {
            tracing::error!("Failed to encode run summary: {e}");
            std::process::exit(1);
        },
    }
}
