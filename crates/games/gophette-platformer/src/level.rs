use serde::{Deserialize, Serialize};

use gophette_core::geometry::Rectangle;

use crate::collision::{CollisionObject, CollisionWorld, Solidity};
use crate::error::DataError;
use crate::replay::ReplayScript;

const BUILTIN_LEVEL: &str = include_str!("../levels/level1.toml");
const BUILTIN_COMPANION_SCRIPT: &str = include_str!("../levels/companion.toml");

/// Static obstacle as stored in level data.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct LevelObject {
    pub x: i32,
    pub y: i32,
    pub w: i32,
    pub h: i32,
    /// Blocks from every side when set, otherwise only landings on top.
    #[serde(default)]
    pub solid: bool,
}

impl LevelObject {
    pub fn bounds(&self) -> Rectangle {
        Rectangle::new(self.x, self.y, self.w, self.h)
    }

    pub fn solidity(&self) -> Solidity {
        if self.solid {
            Solidity::Solid
        } else {
            Solidity::TopSolid
        }
    }
}

/// Background image placed at a fixed world position.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LevelImage {
    pub id: String,
    pub x: i32,
    pub y: i32,
}

/// Obstacles and decoration of one level, in draw/scan order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Level {
    #[serde(default)]
    pub objects: Vec<LevelObject>,
    #[serde(default)]
    pub images: Vec<LevelImage>,
}

impl Level {
    /// Parse a level from TOML with `[[objects]]` and `[[images]]` lists.
    /// Objects must have a positive width and height.
    pub fn from_toml_str(s: &str) -> Result<Self, DataError> {
        let level: Self = toml::from_str(s)?;
        if let Some((index, _)) = level
            .objects
            .iter()
            .enumerate()
            .find(|(_, o)| o.w <= 0 || o.h <= 0)
        {
            return Err(DataError::Parse(format!(
                "object {index} has an empty extent"
            )));
        }
        Ok(level)
    }

    pub fn load(path: impl AsRef<std::path::Path>) -> Result<Self, DataError> {
        let contents = std::fs::read_to_string(path)?;
        Self::from_toml_str(&contents)
    }

    /// The demo course shipped with the crate.
    ///
    /// # Panics
    /// If the embedded level data is malformed.
    pub fn builtin() -> Self {
        match Self::from_toml_str(BUILTIN_LEVEL) {
            Ok(level) => level,
            Err(e) => panic!("built-in level is malformed: {e}"),
        }
    }

    /// Companion run that goes with [`Level::builtin`].
    ///
    /// # Panics
    /// If the embedded script is malformed.
    pub fn builtin_companion_script() -> ReplayScript {
        match ReplayScript::from_toml_str(BUILTIN_COMPANION_SCRIPT) {
            Ok(script) => script,
            Err(e) => panic!("built-in companion script is malformed: {e}"),
        }
    }

    pub fn collision_world(&self) -> CollisionWorld {
        CollisionWorld::new(
            self.objects
                .iter()
                .map(|o| CollisionObject {
                    bounds: o.bounds(),
                    solidity: o.solidity(),
                })
                .collect(),
        )
    }
}
