use std::path::Path;

use serde::{Deserialize, Serialize};

use gophette_core::geometry::{Point, Rectangle};

use crate::character::CharacterParams;
use crate::error::DataError;

/// Env var naming the config file.
pub const CONFIG_ENV: &str = "GOPHETTE_CONFIG";
/// Config path used when the env var is unset.
pub const DEFAULT_CONFIG_PATH: &str = "config/gophette.toml";

/// Match configuration, loaded from TOML with every field optional.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GameConfig {
    pub timings: Timings,
    pub layout: MatchLayout,
    pub hero: CharacterParams,
    pub companion: CharacterParams,
    /// Character the player controls and the camera follows (0 hero,
    /// 1 companion). The other one is driven by the replay script.
    pub primary_character: usize,
    /// Start in the pre-play countdown instead of the intro scene.
    pub skip_intro: bool,
    /// Record externally handled input for later replay.
    pub record_input: bool,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            timings: Timings::default(),
            layout: MatchLayout::default(),
            hero: CharacterParams::HERO,
            companion: CharacterParams::COMPANION,
            primary_character: 0,
            skip_intro: false,
            record_input: false,
        }
    }
}

/// Phase lengths, in frames.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Timings {
    pub intro_frames: u32,
    pub pre_play_frames: u32,
    /// Pre-play countdown value at which the whistle sounds.
    pub whistle_at: u32,
    pub player_dying_frames: u32,
    pub player_win_frames: u32,
    /// How long the losing sound plays before the camera shows the winner.
    pub losing_sound_frames: u32,
    pub opponent_win_frames: u32,
}

impl Default for Timings {
    fn default() -> Self {
        Self {
            intro_frames: 930,
            pre_play_frames: 100,
            whistle_at: 30,
            player_dying_frames: 100,
            player_win_frames: 80,
            losing_sound_frames: 90,
            opponent_win_frames: 100,
        }
    }
}

/// Where things are in the world.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct MatchLayout {
    /// Bottom-center spawn point of the hero.
    pub hero_spawn: Point,
    /// Bottom-center spawn point of the companion.
    pub companion_spawn: Point,
    pub camera_bounds: Rectangle,
    /// Margin around the camera bounds outside of which the primary
    /// character dies.
    pub die_margin: i32,
    pub goal_bounds: Rectangle,
    /// Absolute floor line no character falls below.
    pub world_floor: i32,
    /// Point the camera looks at during the intro.
    pub intro_focus: Point,
}

impl Default for MatchLayout {
    fn default() -> Self {
        Self {
            hero_spawn: Point::new(500, 537),
            companion_spawn: Point::new(300, 537),
            camera_bounds: Rectangle::new(200, -1399, 9150, 2100),
            die_margin: 200,
            goal_bounds: Rectangle::new(9200, -1000, 1000, 350),
            world_floor: 800,
            intro_focus: Point::new(1000, 0),
        }
    }
}

impl MatchLayout {
    /// Region the primary character must stay overlapping to live.
    pub fn alive_bounds(&self) -> Rectangle {
        self.camera_bounds.add_margin(self.die_margin)
    }
}

impl GameConfig {
    /// Load from the file named by `GOPHETTE_CONFIG`, or from
    /// `config/gophette.toml`, falling back to defaults.
    pub fn load() -> Self {
        let path =
            std::env::var(CONFIG_ENV).unwrap_or_else(|_| DEFAULT_CONFIG_PATH.to_string());
        Self::load_from(path)
    }

    /// Load from `path`. A missing file yields defaults; an invalid one
    /// logs a warning and yields defaults.
    pub fn load_from(path: impl AsRef<Path>) -> Self {
        let path = path.as_ref();
        match std::fs::read_to_string(path) {
            Ok(contents) => match Self::from_toml_str(&contents) {
                Ok(config) => {
                    tracing::info!(path = %path.display(), "Loaded game configuration");
                    config
                },
                Err(e) => {
                    tracing::warn!(
                        path = %path.display(),
                        "Failed to parse game config: {e}, using defaults"
                    );
                    Self::default()
                },
            },
            Err(_) => {
                tracing::info!(path = %path.display(), "No game config found, using defaults");
                Self::default()
            },
        }
    }

    pub fn from_toml_str(s: &str) -> Result<Self, DataError> {
        let config: Self = toml::from_str(s)?;
        if config.primary_character > 1 {
            return Err(DataError::Parse(format!(
                "primary_character must be 0 or 1, got {}",
                config.primary_character
            )));
        }
        Ok(config)
    }

    /// Index of the scripted character.
    pub fn opponent_character(&self) -> usize {
        1 - self.primary_character
    }
}
